// ── DNS settings and nameserver groups ──

use nbgitops_api::types::NameserverServer;
use serde::Deserialize;

use super::set::same_set;

/// Account-wide DNS settings (a singleton).
#[derive(Debug, Clone, Default, PartialEq, Eq, Deserialize)]
pub struct DnsSettings {
    /// Groups whose peers skip DNS management.
    #[serde(default, rename = "disableFor")]
    pub disabled_management_groups: Vec<String>,
}

/// A nameserver group. Natural key: `name`.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
pub struct Nameserver {
    #[serde(skip)]
    pub id: String,
    pub name: String,
    #[serde(default)]
    pub description: String,
    #[serde(default, rename = "nameservers")]
    pub servers: Vec<NameserverServer>,
    #[serde(default)]
    pub enabled: bool,
    #[serde(default)]
    pub groups: Vec<String>,
    #[serde(default)]
    pub primary: bool,
    #[serde(default)]
    pub domains: Vec<String>,
    #[serde(default)]
    pub search_domains_enabled: bool,
}

impl Nameserver {
    /// Structural equality ignoring `id` and list order.
    pub fn matches(&self, other: &Nameserver) -> bool {
        self.name == other.name
            && self.description == other.description
            && same_set(&self.servers, &other.servers)
            && self.enabled == other.enabled
            && same_set(&self.groups, &other.groups)
            && self.primary == other.primary
            && same_set(&self.domains, &other.domains)
            && self.search_domains_enabled == other.search_domains_enabled
    }
}
