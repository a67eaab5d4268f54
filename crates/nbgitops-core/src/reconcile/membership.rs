// ── Peer-group membership ──
//
// Membership is recomputed wholesale every pass: the desired member set of
// each group is derived from configuration and written in a single call
// whenever it differs from what the service reports.

use std::collections::{BTreeSet, HashMap};

use tracing::debug;

use super::{GroupIndex, Reconciler};
use crate::error::CoreError;
use crate::model::{DesiredState, Peer, User};
use crate::remote::ManagementApi;

/// Group id → desired member peer ids.
pub type Memberships = HashMap<String, BTreeSet<String>>;

/// Derive desired group membership.
///
/// With `individualPeerGroups` every configured peer lists its own groups.
/// Otherwise setup-key peers (no owner) use their configured groups and
/// owned peers inherit their owner's groups from `users`.
pub fn desired_memberships(
    desired: &DesiredState,
    groups: &GroupIndex,
    users: &HashMap<String, User>,
    peers: &HashMap<String, Peer>,
) -> Result<Memberships, CoreError> {
    let configured: HashMap<&str, &Peer> =
        desired.peers.iter().map(|p| (p.id.as_str(), p)).collect();
    let mut out = Memberships::new();

    if desired.settings.individual_peer_groups {
        for peer in &desired.peers {
            for group_id in groups.ids(&peer.groups)? {
                out.entry(group_id).or_default().insert(peer.id.clone());
            }
        }
        return Ok(out);
    }

    for peer in peers.values() {
        let group_ids = if peer.user_id.is_empty() {
            match configured.get(peer.id.as_str()) {
                Some(entry) => groups.ids(&entry.groups)?,
                None => Vec::new(),
            }
        } else {
            users
                .get(&peer.user_id)
                .map(|u| u.groups.clone())
                .unwrap_or_default()
        };
        debug!(peer = %peer.id, groups = ?group_ids, "desired peer groups");
        for group_id in group_ids {
            out.entry(group_id).or_default().insert(peer.id.clone());
        }
    }
    Ok(out)
}

/// Additions and removals for one group, restricted to known peers.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct MembershipDelta {
    pub to_add: BTreeSet<String>,
    pub to_remove: BTreeSet<String>,
}

impl MembershipDelta {
    pub fn is_empty(&self) -> bool {
        self.to_add.is_empty() && self.to_remove.is_empty()
    }
}

/// Compare desired and current members; ids outside `known` are ignored.
pub fn membership_delta(
    desired: &BTreeSet<String>,
    current: &[String],
    known: &HashMap<String, Peer>,
) -> MembershipDelta {
    let current: BTreeSet<String> = current.iter().cloned().collect();
    let is_known = |id: &&String| known.contains_key(id.as_str());

    MembershipDelta {
        to_add: desired.difference(&current).filter(is_known).cloned().collect(),
        to_remove: current.difference(desired).filter(is_known).cloned().collect(),
    }
}

impl<A: ManagementApi> Reconciler<'_, A> {
    /// Bring every group's member list (except `All`) in line with configuration.
    pub async fn reconcile_memberships(
        &self,
        desired: &DesiredState,
        groups: &GroupIndex,
        users: &HashMap<String, User>,
        peers: &HashMap<String, Peer>,
    ) -> Result<(), CoreError> {
        let wanted = desired_memberships(desired, groups, users, peers)?;
        let empty = BTreeSet::new();

        for group in self.api.list_groups().await? {
            if group.is_all() {
                continue;
            }
            let members = wanted.get(&group.id).unwrap_or(&empty);
            let delta = membership_delta(members, &group.peers, peers);
            if delta.is_empty() {
                debug!(group = %group.name, "group peers match");
                continue;
            }

            if !delta.to_add.is_empty() {
                self.announce(&format!(
                    "Adding peers {:?} to group {}",
                    delta.to_add, group.name
                ));
            }
            if !delta.to_remove.is_empty() {
                self.announce(&format!(
                    "Removing peers {:?} from group {}",
                    delta.to_remove, group.name
                ));
            }

            let replacement: Vec<String> = members
                .iter()
                .filter(|id| peers.contains_key(id.as_str()))
                .cloned()
                .collect();
            self.api.set_group_peers(&group, &replacement).await?;
        }
        Ok(())
    }
}
