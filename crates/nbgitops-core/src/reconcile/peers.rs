// ── Peer reconciliation ──
//
// Peers enroll themselves; this step only updates them. Peers missing from
// configuration are locked down (SSH off, login expiration on).

use std::collections::HashMap;

use tracing::debug;

use super::Reconciler;
use crate::error::CoreError;
use crate::model::{DesiredState, Peer};
use crate::remote::ManagementApi;

impl<A: ManagementApi> Reconciler<'_, A> {
    /// Reconcile peers and return every known remote peer keyed by id.
    pub async fn reconcile_peers(
        &self,
        desired: &DesiredState,
    ) -> Result<HashMap<String, Peer>, CoreError> {
        let wanted: HashMap<&str, &Peer> =
            desired.peers.iter().map(|p| (p.id.as_str(), p)).collect();

        let mut known = HashMap::new();
        for mut peer in self.api.list_peers().await? {
            match wanted.get(peer.id.as_str()) {
                None if peer.is_locked_down() => {
                    debug!(id = %peer.id, "untracked peer already locked down");
                }
                None => {
                    self.announce(&format!(
                        "Peer {} doesn't exist in source control: disabling SSH and enabling login expiration",
                        peer.id
                    ));
                    peer.ssh_enabled = false;
                    peer.login_expiration_enabled = true;
                    self.api.update_peer(&peer).await?;
                }
                Some(want) if peer.matches(want) => {
                    debug!(id = %peer.id, name = %peer.name, "peer matches");
                }
                Some(want) => {
                    self.announce(&format!(
                        "Updating peer {}: name {:?} -> {:?}, ssh {} -> {}, login expiration {} -> {}",
                        peer.id,
                        peer.name,
                        want.name,
                        peer.ssh_enabled,
                        want.ssh_enabled,
                        peer.login_expiration_enabled,
                        want.login_expiration_enabled,
                    ));
                    peer.name.clone_from(&want.name);
                    peer.ssh_enabled = want.ssh_enabled;
                    peer.login_expiration_enabled = want.login_expiration_enabled;
                    peer.groups.clone_from(&want.groups);
                    self.api.update_peer(&peer).await?;
                }
            }
            known.insert(peer.id.clone(), peer);
        }

        for id in wanted.keys() {
            if !known.contains_key(*id) {
                self.report(&format!(
                    "Peer {id} exists in Git but not in NetBird, deleted from upstream?"
                ));
            }
        }

        Ok(known)
    }
}
