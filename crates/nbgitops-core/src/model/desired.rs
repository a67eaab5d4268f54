// ── Desired state ──
//
// The union of every configuration document in the managed directory.
// Rebuilt from the checkout on every pass and never persisted.

use serde::Deserialize;
use strum::Display;

use super::{DnsSettings, Nameserver, NetworkRoute, Peer, Policy, PostureCheck, User};

/// Whether passes after the first may mutate remote state.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Display, Deserialize)]
#[serde(rename_all = "lowercase")]
#[strum(serialize_all = "lowercase")]
pub enum AutoSyncMode {
    /// Every pass after the first is a dry run.
    #[default]
    Manual,
    /// A pass is live when new commits touched the managed path.
    Update,
    /// Every pass is live.
    Enforce,
}

/// The `config:` block.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SyncSettings {
    #[serde(default)]
    pub auto_sync: AutoSyncMode,
    /// Peers list their own groups instead of inheriting their owner's.
    #[serde(default)]
    pub individual_peer_groups: bool,
}

/// The merged desired configuration.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct DesiredState {
    pub settings: SyncSettings,
    pub nameservers: Vec<Nameserver>,
    pub dns: DnsSettings,
    pub peers: Vec<Peer>,
    pub policies: Vec<Policy>,
    pub posture_checks: Vec<PostureCheck>,
    pub network_routes: Vec<NetworkRoute>,
    pub users: Vec<User>,
}

/// One YAML document; any subset of the top-level keys may be present.
#[derive(Debug, Default, Deserialize)]
pub struct DesiredDocument {
    #[serde(default)]
    pub config: Option<SyncSettings>,
    #[serde(default)]
    pub nameservers: Vec<Nameserver>,
    #[serde(default)]
    pub dns: Option<DnsSettings>,
    #[serde(default)]
    pub peers: Vec<Peer>,
    #[serde(default)]
    pub policies: Vec<Policy>,
    #[serde(default)]
    pub posture_checks: Vec<PostureCheck>,
    #[serde(default)]
    pub network_routes: Vec<NetworkRoute>,
    #[serde(default)]
    pub users: Vec<User>,
}

impl DesiredState {
    /// Every group name referenced anywhere in the configuration.
    pub fn referenced_groups(&self) -> impl Iterator<Item = &String> {
        self.dns
            .disabled_management_groups
            .iter()
            .chain(self.network_routes.iter().flat_map(NetworkRoute::group_refs))
            .chain(self.peers.iter().flat_map(|p| &p.groups))
            .chain(
                self.policies
                    .iter()
                    .flat_map(|p| p.sources.iter().chain(&p.destinations)),
            )
            .chain(self.users.iter().flat_map(|u| &u.groups))
            .chain(self.nameservers.iter().flat_map(|ns| &ns.groups))
    }
}
