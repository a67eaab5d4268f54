// ── User domain types ──

use serde::{Deserialize, Serialize};
use strum::{Display, EnumString};

/// Account role. Anything unrecognised collapses to [`Role::User`].
#[derive(
    Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Display, EnumString, Serialize, Deserialize,
)]
#[strum(serialize_all = "lowercase")]
#[serde(from = "String", into = "String")]
pub enum Role {
    Admin,
    #[default]
    User,
    Owner,
}

impl Role {
    /// Lenient parse used for both configuration and remote records.
    pub fn parse_lenient(raw: &str) -> Self {
        raw.parse().unwrap_or_default()
    }
}

impl From<String> for Role {
    fn from(raw: String) -> Self {
        Self::parse_lenient(&raw)
    }
}

impl From<Role> for String {
    fn from(role: Role) -> Self {
        role.to_string()
    }
}

/// A user account. Natural key: `email`.
///
/// In configuration `groups` holds group names; on remote records and after
/// reconciliation it holds group identifiers.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
pub struct User {
    #[serde(skip)]
    pub id: String,
    pub email: String,
    #[serde(default)]
    pub role: Role,
    #[serde(default)]
    pub groups: Vec<String>,
    #[serde(skip)]
    pub blocked: bool,
    #[serde(skip)]
    pub service_user: bool,
}

impl User {
    /// Blocked, no groups, plain role: the state untracked users are forced into.
    pub fn is_locked_down(&self) -> bool {
        self.blocked && self.groups.is_empty() && self.role == Role::User
    }
}
