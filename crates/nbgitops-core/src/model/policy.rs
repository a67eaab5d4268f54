// ── Policy domain type ──
//
// The wire format nests exactly one rule inside each policy. This flat form
// is what configuration uses and what every comparison runs on; see
// `convert.rs` for the flatten / re-nest step.

use serde::Deserialize;

use super::set::same_set;

/// An access policy. Natural key: `name`.
///
/// `sources`, `destinations` and `source_posture_checks` hold names in
/// configuration and identifiers once resolved.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
pub struct Policy {
    #[serde(skip)]
    pub id: String,
    pub name: String,
    #[serde(default)]
    pub enabled: bool,
    #[serde(default)]
    pub description: String,
    #[serde(default = "default_action")]
    pub action: String,
    #[serde(default)]
    pub bidirectional: bool,
    #[serde(default = "default_protocol")]
    pub protocol: String,
    #[serde(default)]
    pub ports: Vec<String>,
    #[serde(default)]
    pub sources: Vec<String>,
    #[serde(default)]
    pub destinations: Vec<String>,
    #[serde(default)]
    pub source_posture_checks: Vec<String>,
}

fn default_action() -> String {
    "accept".into()
}

fn default_protocol() -> String {
    "all".into()
}

impl Policy {
    /// Structural equality ignoring `id` and list order.
    pub fn matches(&self, other: &Policy) -> bool {
        self.name == other.name
            && self.description == other.description
            && self.enabled == other.enabled
            && self.action == other.action
            && self.bidirectional == other.bidirectional
            && self.protocol == other.protocol
            && same_set(&self.ports, &other.ports)
            && same_set(&self.sources, &other.sources)
            && same_set(&self.destinations, &other.destinations)
            && same_set(&self.source_posture_checks, &other.source_posture_checks)
    }
}
