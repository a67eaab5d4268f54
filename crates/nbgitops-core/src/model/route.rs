// ── Network route domain types ──

use serde::Deserialize;

use super::set::same_set;

/// Who routes the traffic: a single peer or every peer in a set of groups.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum RoutingPeer {
    Peer(String),
    Groups(Vec<String>),
}

/// What is routed: a literal CIDR or a list of domains.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum RouteTarget {
    Network(String),
    Domains(Vec<String>),
}

/// A network route. Natural key: `network_id`.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
#[serde(try_from = "RouteEntry")]
pub struct NetworkRoute {
    pub id: String,
    /// Server-derived (`IPv4`, `IPv6`, `Domain`); empty in configuration means "don't care".
    pub network_type: String,
    pub description: String,
    pub network_id: String,
    pub enabled: bool,
    pub metric: i32,
    pub masquerade: bool,
    pub keep_route: bool,
    pub groups: Vec<String>,
    pub routing: RoutingPeer,
    pub target: RouteTarget,
}

impl NetworkRoute {
    /// Every group name this route references (distribution and routing groups).
    pub fn group_refs(&self) -> impl Iterator<Item = &String> {
        let routing: &[String] = match &self.routing {
            RoutingPeer::Groups(groups) => groups,
            RoutingPeer::Peer(_) => &[],
        };
        self.groups.iter().chain(routing)
    }

    /// Structural equality ignoring `id` and list order.
    ///
    /// `self` is the desired route; an empty desired `network_type` matches
    /// whatever the server derived.
    pub fn matches(&self, remote: &NetworkRoute) -> bool {
        let routing = match (&self.routing, &remote.routing) {
            (RoutingPeer::Peer(a), RoutingPeer::Peer(b)) => a == b,
            (RoutingPeer::Groups(a), RoutingPeer::Groups(b)) => same_set(a, b),
            _ => false,
        };
        let target = match (&self.target, &remote.target) {
            (RouteTarget::Network(a), RouteTarget::Network(b)) => a == b,
            (RouteTarget::Domains(a), RouteTarget::Domains(b)) => same_set(a, b),
            _ => false,
        };

        (self.network_type.is_empty() || self.network_type == remote.network_type)
            && self.description == remote.description
            && self.network_id == remote.network_id
            && self.enabled == remote.enabled
            && self.metric == remote.metric
            && self.masquerade == remote.masquerade
            && self.keep_route == remote.keep_route
            && same_set(&self.groups, &remote.groups)
            && routing
            && target
    }
}

/// Configuration shape with the flat, mutually exclusive field pairs.
#[derive(Deserialize)]
struct RouteEntry {
    #[serde(default)]
    network_type: String,
    #[serde(default)]
    description: String,
    network_id: String,
    #[serde(default)]
    enabled: bool,
    #[serde(default)]
    peer: Option<String>,
    #[serde(default)]
    peer_groups: Option<Vec<String>>,
    #[serde(default)]
    network: Option<String>,
    #[serde(default)]
    domains: Option<Vec<String>>,
    #[serde(default = "default_metric")]
    metric: i32,
    #[serde(default)]
    masquerade: bool,
    #[serde(default)]
    groups: Vec<String>,
    #[serde(default)]
    keep_route: bool,
}

fn default_metric() -> i32 {
    9999
}

impl TryFrom<RouteEntry> for NetworkRoute {
    type Error = String;

    fn try_from(entry: RouteEntry) -> Result<Self, Self::Error> {
        let id = &entry.network_id;
        let routing = match (entry.peer, entry.peer_groups) {
            (Some(peer), None) => RoutingPeer::Peer(peer),
            (None, Some(groups)) => RoutingPeer::Groups(groups),
            (Some(_), Some(_)) => {
                return Err(format!(
                    "route {id}: `peer` and `peer_groups` are mutually exclusive"
                ));
            }
            (None, None) => {
                return Err(format!("route {id}: one of `peer` or `peer_groups` is required"));
            }
        };
        let target = match (entry.network, entry.domains) {
            (Some(network), None) => RouteTarget::Network(network),
            (None, Some(domains)) => RouteTarget::Domains(domains),
            (Some(_), Some(_)) => {
                return Err(format!(
                    "route {id}: `network` and `domains` are mutually exclusive"
                ));
            }
            (None, None) => {
                return Err(format!("route {id}: one of `network` or `domains` is required"));
            }
        };

        Ok(Self {
            id: String::new(),
            network_type: entry.network_type,
            description: entry.description,
            network_id: entry.network_id,
            enabled: entry.enabled,
            metric: entry.metric,
            masquerade: entry.masquerade,
            keep_route: entry.keep_route,
            groups: entry.groups,
            routing,
            target,
        })
    }
}
