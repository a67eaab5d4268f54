// Wire types for the NetBird management API.
//
// Response types mirror what the server returns; request types mirror what
// it accepts. Field names are the snake_case names used on the wire.

use serde::{Deserialize, Deserializer, Serialize};

/// Read an explicit `null` the same as a missing field. The server encodes
/// empty lists as `null`.
fn null_as_empty<'de, D, T>(deserializer: D) -> Result<T, D::Error>
where
    D: Deserializer<'de>,
    T: Default + Deserialize<'de>,
{
    Option::<T>::deserialize(deserializer).map(Option::unwrap_or_default)
}

// ── Groups ───────────────────────────────────────────────────────────

/// Minimal group reference, as embedded in peers and policy rules.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct GroupMinimum {
    pub id: String,
    #[serde(default)]
    pub name: String,
}

/// Minimal peer reference, as embedded in groups.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PeerMinimum {
    pub id: String,
    #[serde(default)]
    pub name: String,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct GroupResponse {
    pub id: String,
    pub name: String,
    #[serde(default, deserialize_with = "null_as_empty")]
    pub peers: Vec<PeerMinimum>,
}

#[derive(Debug, Clone, Serialize)]
pub struct GroupRequest {
    pub name: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub peers: Option<Vec<String>>,
}

// ── Peers ────────────────────────────────────────────────────────────

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PeerResponse {
    pub id: String,
    #[serde(default)]
    pub name: String,
    #[serde(default)]
    pub ssh_enabled: bool,
    #[serde(default)]
    pub login_expiration_enabled: bool,
    #[serde(default)]
    pub user_id: String,
    #[serde(default, deserialize_with = "null_as_empty")]
    pub groups: Vec<GroupMinimum>,
}

#[derive(Debug, Clone, Serialize)]
pub struct PeerRequest {
    pub name: String,
    pub ssh_enabled: bool,
    pub login_expiration_enabled: bool,
}

// ── Users ────────────────────────────────────────────────────────────

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct UserResponse {
    pub id: String,
    #[serde(default)]
    pub email: String,
    #[serde(default)]
    pub role: String,
    #[serde(default, deserialize_with = "null_as_empty")]
    pub auto_groups: Vec<String>,
    #[serde(default)]
    pub is_blocked: bool,
    #[serde(default)]
    pub is_service_user: bool,
}

#[derive(Debug, Clone, Serialize)]
pub struct UserRequest {
    pub role: String,
    pub auto_groups: Vec<String>,
    pub is_blocked: bool,
}

// ── Policies ─────────────────────────────────────────────────────────

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PolicyRuleResponse {
    #[serde(default)]
    pub id: Option<String>,
    #[serde(default)]
    pub name: String,
    #[serde(default)]
    pub description: String,
    #[serde(default)]
    pub enabled: bool,
    #[serde(default)]
    pub action: String,
    #[serde(default)]
    pub bidirectional: bool,
    #[serde(default)]
    pub protocol: String,
    #[serde(default, deserialize_with = "null_as_empty")]
    pub ports: Vec<String>,
    #[serde(default, deserialize_with = "null_as_empty")]
    pub sources: Vec<GroupMinimum>,
    #[serde(default, deserialize_with = "null_as_empty")]
    pub destinations: Vec<GroupMinimum>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PolicyResponse {
    pub id: String,
    pub name: String,
    #[serde(default)]
    pub description: String,
    #[serde(default)]
    pub enabled: bool,
    #[serde(default, deserialize_with = "null_as_empty")]
    pub source_posture_checks: Vec<String>,
    #[serde(default, deserialize_with = "null_as_empty")]
    pub rules: Vec<PolicyRuleResponse>,
}

#[derive(Debug, Clone, Serialize)]
pub struct PolicyRuleRequest {
    pub name: String,
    pub description: String,
    pub enabled: bool,
    pub action: String,
    pub bidirectional: bool,
    pub protocol: String,
    pub ports: Vec<String>,
    pub sources: Vec<String>,
    pub destinations: Vec<String>,
}

#[derive(Debug, Clone, Serialize)]
pub struct PolicyRequest {
    pub name: String,
    pub description: String,
    pub enabled: bool,
    pub source_posture_checks: Vec<String>,
    pub rules: Vec<PolicyRuleRequest>,
}

// ── Posture checks ───────────────────────────────────────────────────

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct MinVersionCheck {
    #[serde(default)]
    pub min_version: String,
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct MinKernelVersionCheck {
    #[serde(default)]
    pub min_kernel_version: String,
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct OsVersionCheck {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub android: Option<MinVersionCheck>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub ios: Option<MinVersionCheck>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub darwin: Option<MinVersionCheck>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub linux: Option<MinKernelVersionCheck>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub windows: Option<MinKernelVersionCheck>,
}

#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub struct GeoLocation {
    pub country_code: String,
    #[serde(default)]
    pub city_name: String,
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct GeoLocationCheck {
    #[serde(default, deserialize_with = "null_as_empty")]
    pub locations: Vec<GeoLocation>,
    #[serde(default = "default_check_action")]
    pub action: String,
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct PeerNetworkRangeCheck {
    #[serde(default, deserialize_with = "null_as_empty")]
    pub ranges: Vec<String>,
    #[serde(default = "default_check_action")]
    pub action: String,
}

fn default_check_action() -> String {
    "allow".into()
}

#[derive(Debug, Clone, Default, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub struct Process {
    #[serde(default)]
    pub linux_path: String,
    #[serde(default)]
    pub mac_path: String,
    #[serde(default)]
    pub windows_path: String,
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct ProcessCheck {
    #[serde(default, deserialize_with = "null_as_empty")]
    pub processes: Vec<Process>,
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct PostureCheckSet {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub nb_version_check: Option<MinVersionCheck>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub os_version_check: Option<OsVersionCheck>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub geo_location_check: Option<GeoLocationCheck>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub peer_network_range_check: Option<PeerNetworkRangeCheck>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub process_check: Option<ProcessCheck>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PostureCheckResponse {
    pub id: String,
    pub name: String,
    #[serde(default)]
    pub description: String,
    #[serde(default)]
    pub checks: PostureCheckSet,
}

#[derive(Debug, Clone, Serialize)]
pub struct PostureCheckRequest {
    pub name: String,
    pub description: String,
    pub checks: PostureCheckSet,
}

// ── Network routes ───────────────────────────────────────────────────

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RouteResponse {
    pub id: String,
    #[serde(default)]
    pub network_type: String,
    #[serde(default)]
    pub description: String,
    pub network_id: String,
    #[serde(default)]
    pub enabled: bool,
    #[serde(default)]
    pub peer: Option<String>,
    #[serde(default)]
    pub peer_groups: Option<Vec<String>>,
    #[serde(default)]
    pub network: Option<String>,
    #[serde(default)]
    pub domains: Option<Vec<String>>,
    #[serde(default)]
    pub metric: i32,
    #[serde(default)]
    pub masquerade: bool,
    #[serde(default, deserialize_with = "null_as_empty")]
    pub groups: Vec<String>,
    #[serde(default)]
    pub keep_route: bool,
}

/// Route create/update body. Exactly one of `peer`/`peer_groups` and one of
/// `network`/`domains` is set; the others are omitted from the JSON.
#[derive(Debug, Clone, Serialize)]
pub struct RouteRequest {
    pub description: String,
    pub network_id: String,
    pub enabled: bool,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub peer: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub peer_groups: Option<Vec<String>>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub network: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub domains: Option<Vec<String>>,
    pub metric: i32,
    pub masquerade: bool,
    pub groups: Vec<String>,
    pub keep_route: bool,
}

// ── DNS ──────────────────────────────────────────────────────────────

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct DnsSettingsBody {
    #[serde(default, deserialize_with = "null_as_empty")]
    pub disabled_management_groups: Vec<String>,
}

/// Older management servers wrap the settings in an `items` object.
#[derive(Debug, Clone, Deserialize)]
#[serde(untagged)]
pub enum DnsSettingsResponse {
    Wrapped { items: DnsSettingsBody },
    Flat(DnsSettingsBody),
}

impl DnsSettingsResponse {
    pub fn into_body(self) -> DnsSettingsBody {
        match self {
            Self::Wrapped { items } => items,
            Self::Flat(body) => body,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub struct NameserverServer {
    pub ip: String,
    #[serde(default = "default_ns_type")]
    pub ns_type: String,
    #[serde(default = "default_ns_port")]
    pub port: u16,
}

fn default_ns_type() -> String {
    "udp".into()
}
fn default_ns_port() -> u16 {
    53
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct NameserverGroupResponse {
    pub id: String,
    pub name: String,
    #[serde(default)]
    pub description: String,
    #[serde(default, deserialize_with = "null_as_empty")]
    pub nameservers: Vec<NameserverServer>,
    #[serde(default)]
    pub enabled: bool,
    #[serde(default, deserialize_with = "null_as_empty")]
    pub groups: Vec<String>,
    #[serde(default)]
    pub primary: bool,
    #[serde(default, deserialize_with = "null_as_empty")]
    pub domains: Vec<String>,
    #[serde(default)]
    pub search_domains_enabled: bool,
}

#[derive(Debug, Clone, Serialize)]
pub struct NameserverGroupRequest {
    pub name: String,
    pub description: String,
    pub nameservers: Vec<NameserverServer>,
    pub enabled: bool,
    pub groups: Vec<String>,
    pub primary: bool,
    pub domains: Vec<String>,
    pub search_domains_enabled: bool,
}
