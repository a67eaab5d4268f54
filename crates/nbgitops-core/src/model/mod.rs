// ── Domain model ──
//
// Canonical in-memory shapes for every managed resource. Desired entries
// are deserialized straight from configuration YAML; remote entries are
// converted from the wire types in `convert.rs`. Comparisons are the
// `matches` methods, which ignore identifiers and list order.

pub mod desired;
pub mod dns;
pub mod group;
pub mod peer;
pub mod policy;
pub mod posture_check;
pub mod route;
pub mod set;
pub mod user;

// ── Re-exports ──────────────────────────────────────────────────────

pub use desired::{AutoSyncMode, DesiredDocument, DesiredState, SyncSettings};
pub use dns::{DnsSettings, Nameserver};
pub use group::{ALL_GROUP, Group};
pub use nbgitops_api::types::NameserverServer;
pub use peer::Peer;
pub use policy::Policy;
pub use posture_check::{PostureCheck, PostureChecks};
pub use route::{NetworkRoute, RouteTarget, RoutingPeer};
pub use user::{Role, User};
