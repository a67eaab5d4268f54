// ── API-to-domain type conversions ──
//
// Bridges raw `nbgitops_api::types` into `nbgitops_core::model` and back.
// Reads normalize nested shapes into the flat domain form; writes build the
// request bodies the management API expects.

use nbgitops_api::types;

use crate::error::CoreError;
use crate::model::{
    DnsSettings, Group, Nameserver, NetworkRoute, Peer, Policy, PostureCheck, Role, RouteTarget,
    RoutingPeer, User,
};

// ── Groups ──────────────────────────────────────────────────────────

impl From<types::GroupResponse> for Group {
    fn from(g: types::GroupResponse) -> Self {
        Self {
            id: g.id,
            name: g.name,
            peers: g.peers.into_iter().map(|p| p.id).collect(),
        }
    }
}

// ── Peers ───────────────────────────────────────────────────────────

impl From<types::PeerResponse> for Peer {
    fn from(p: types::PeerResponse) -> Self {
        Self {
            id: p.id,
            name: p.name,
            user_id: p.user_id,
            ssh_enabled: p.ssh_enabled,
            login_expiration_enabled: p.login_expiration_enabled,
            groups: p.groups.into_iter().map(|g| g.id).collect(),
        }
    }
}

impl From<&Peer> for types::PeerRequest {
    fn from(p: &Peer) -> Self {
        Self {
            name: p.name.clone(),
            ssh_enabled: p.ssh_enabled,
            login_expiration_enabled: p.login_expiration_enabled,
        }
    }
}

// ── Users ───────────────────────────────────────────────────────────

impl From<types::UserResponse> for User {
    fn from(u: types::UserResponse) -> Self {
        Self {
            id: u.id,
            email: u.email,
            role: Role::parse_lenient(&u.role),
            groups: u.auto_groups,
            blocked: u.is_blocked,
            service_user: u.is_service_user,
        }
    }
}

impl From<&User> for types::UserRequest {
    fn from(u: &User) -> Self {
        Self {
            role: u.role.to_string(),
            auto_groups: u.groups.clone(),
            is_blocked: u.blocked,
        }
    }
}

// ── Policies ────────────────────────────────────────────────────────

/// Flatten a one-rule wire policy.
///
/// The rule's description stands in when the policy's own is empty; group
/// objects are reduced to their identifiers.
impl TryFrom<types::PolicyResponse> for Policy {
    type Error = CoreError;

    fn try_from(p: types::PolicyResponse) -> Result<Self, Self::Error> {
        let rule_count = p.rules.len();
        let Ok([rule]) = <[types::PolicyRuleResponse; 1]>::try_from(p.rules) else {
            return Err(CoreError::validation(format!(
                "policy {} should have exactly 1 rule, found {rule_count}",
                p.name
            )));
        };

        let description = if p.description.is_empty() {
            rule.description
        } else {
            p.description
        };

        Ok(Self {
            id: p.id,
            name: p.name,
            enabled: p.enabled,
            description,
            action: rule.action,
            bidirectional: rule.bidirectional,
            protocol: rule.protocol,
            ports: rule.ports,
            sources: rule.sources.into_iter().map(|g| g.id).collect(),
            destinations: rule.destinations.into_iter().map(|g| g.id).collect(),
            source_posture_checks: p.source_posture_checks,
        })
    }
}

/// Re-nest a flat policy into the one-rule request shape.
impl From<&Policy> for types::PolicyRequest {
    fn from(p: &Policy) -> Self {
        Self {
            name: p.name.clone(),
            description: p.description.clone(),
            enabled: p.enabled,
            source_posture_checks: p.source_posture_checks.clone(),
            rules: vec![types::PolicyRuleRequest {
                name: p.name.clone(),
                description: p.description.clone(),
                enabled: p.enabled,
                action: p.action.clone(),
                bidirectional: p.bidirectional,
                protocol: p.protocol.clone(),
                ports: p.ports.clone(),
                sources: p.sources.clone(),
                destinations: p.destinations.clone(),
            }],
        }
    }
}

// ── Posture checks ──────────────────────────────────────────────────

impl From<types::PostureCheckResponse> for PostureCheck {
    fn from(pc: types::PostureCheckResponse) -> Self {
        Self {
            id: pc.id,
            name: pc.name,
            description: pc.description,
            checks: pc.checks,
        }
    }
}

impl From<&PostureCheck> for types::PostureCheckRequest {
    fn from(pc: &PostureCheck) -> Self {
        Self {
            name: pc.name.clone(),
            description: pc.description.clone(),
            checks: pc.checks.clone(),
        }
    }
}

// ── Network routes ──────────────────────────────────────────────────

impl From<types::RouteResponse> for NetworkRoute {
    fn from(r: types::RouteResponse) -> Self {
        let routing = match r.peer.filter(|p| !p.is_empty()) {
            Some(peer) => RoutingPeer::Peer(peer),
            None => RoutingPeer::Groups(r.peer_groups.unwrap_or_default()),
        };
        // Domain routes still carry a placeholder `network` on the wire.
        let target = match r.domains.filter(|d| !d.is_empty()) {
            Some(domains) => RouteTarget::Domains(domains),
            None => RouteTarget::Network(r.network.unwrap_or_default()),
        };

        Self {
            id: r.id,
            network_type: r.network_type,
            description: r.description,
            network_id: r.network_id,
            enabled: r.enabled,
            metric: r.metric,
            masquerade: r.masquerade,
            keep_route: r.keep_route,
            groups: r.groups,
            routing,
            target,
        }
    }
}

impl From<&NetworkRoute> for types::RouteRequest {
    fn from(r: &NetworkRoute) -> Self {
        let (peer, peer_groups) = match &r.routing {
            RoutingPeer::Peer(p) => (Some(p.clone()), None),
            RoutingPeer::Groups(g) => (None, Some(g.clone())),
        };
        let (network, domains) = match &r.target {
            RouteTarget::Network(n) => (Some(n.clone()), None),
            RouteTarget::Domains(d) => (None, Some(d.clone())),
        };

        Self {
            description: r.description.clone(),
            network_id: r.network_id.clone(),
            enabled: r.enabled,
            peer,
            peer_groups,
            network,
            domains,
            metric: r.metric,
            masquerade: r.masquerade,
            groups: r.groups.clone(),
            keep_route: r.keep_route,
        }
    }
}

// ── DNS ─────────────────────────────────────────────────────────────

impl From<types::DnsSettingsBody> for DnsSettings {
    fn from(body: types::DnsSettingsBody) -> Self {
        Self {
            disabled_management_groups: body.disabled_management_groups,
        }
    }
}

impl From<&DnsSettings> for types::DnsSettingsBody {
    fn from(dns: &DnsSettings) -> Self {
        Self {
            disabled_management_groups: dns.disabled_management_groups.clone(),
        }
    }
}

impl From<types::NameserverGroupResponse> for Nameserver {
    fn from(ns: types::NameserverGroupResponse) -> Self {
        Self {
            id: ns.id,
            name: ns.name,
            description: ns.description,
            servers: ns.nameservers,
            enabled: ns.enabled,
            groups: ns.groups,
            primary: ns.primary,
            domains: ns.domains,
            search_domains_enabled: ns.search_domains_enabled,
        }
    }
}

impl From<&Nameserver> for types::NameserverGroupRequest {
    fn from(ns: &Nameserver) -> Self {
        Self {
            name: ns.name.clone(),
            description: ns.description.clone(),
            nameservers: ns.servers.clone(),
            enabled: ns.enabled,
            groups: ns.groups.clone(),
            primary: ns.primary,
            domains: ns.domains.clone(),
            search_domains_enabled: ns.search_domains_enabled,
        }
    }
}
