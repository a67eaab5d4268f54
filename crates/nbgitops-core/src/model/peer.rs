// ── Peer domain type ──

use serde::Deserialize;

/// A peer. Natural key: `id`; peers are never matched by name.
///
/// `user_id` is empty for peers enrolled with a setup key.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
#[serde(from = "PeerEntry")]
pub struct Peer {
    pub id: String,
    pub name: String,
    pub user_id: String,
    pub ssh_enabled: bool,
    pub login_expiration_enabled: bool,
    /// Group names in configuration, group identifiers on remote records.
    pub groups: Vec<String>,
}

impl Peer {
    /// SSH off and login expiration on: the state untracked peers are forced into.
    pub fn is_locked_down(&self) -> bool {
        !self.ssh_enabled && self.login_expiration_enabled
    }

    /// Whether the fields this engine manages match `desired`.
    pub fn matches(&self, desired: &Peer) -> bool {
        self.name == desired.name
            && self.ssh_enabled == desired.ssh_enabled
            && self.login_expiration_enabled == desired.login_expiration_enabled
    }
}

/// Configuration shape: expiration is expressed as an opt-out.
#[derive(Deserialize)]
struct PeerEntry {
    id: String,
    #[serde(default)]
    name: String,
    #[serde(default)]
    groups: Vec<String>,
    #[serde(default)]
    ssh_enabled: bool,
    #[serde(default)]
    expiration_disabled: bool,
}

impl From<PeerEntry> for Peer {
    fn from(entry: PeerEntry) -> Self {
        Self {
            id: entry.id,
            name: entry.name,
            user_id: String::new(),
            ssh_enabled: entry.ssh_enabled,
            login_expiration_enabled: !entry.expiration_disabled,
            groups: entry.groups,
        }
    }
}
