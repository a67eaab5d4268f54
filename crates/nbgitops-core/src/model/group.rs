// ── Group domain type ──

/// Name of the default group every peer belongs to. Never created,
/// re-membered or deleted by the reconciler.
pub const ALL_GROUP: &str = "All";

/// A remote group and the identifiers of its member peers.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Group {
    pub id: String,
    pub name: String,
    pub peers: Vec<String>,
}

impl Group {
    pub fn is_all(&self) -> bool {
        self.name == ALL_GROUP
    }
}
