// ── Runtime controller configuration ──
//
// These types describe *where* desired state comes from and *which*
// management API it is applied to. The binary builds a `ControllerConfig`
// from flags and environment and hands it in; core never reads them itself.

use std::path::PathBuf;
use std::time::Duration;

use secrecy::SecretString;
use url::Url;

/// How to authenticate against the git remote.
#[derive(Debug, Clone, Default)]
pub enum GitAuth {
    /// Anonymous access (public repositories, local paths).
    #[default]
    None,
    /// HTTP basic auth (username + password or token).
    Basic {
        username: String,
        password: SecretString,
    },
    /// SSH private key, optionally protected by a passphrase.
    SshKey {
        private_key: PathBuf,
        passphrase: Option<SecretString>,
    },
}

/// The git repository holding desired state.
#[derive(Debug, Clone)]
pub struct RepositoryConfig {
    pub url: String,
    pub branch: String,
    /// Directory inside the repository holding the YAML files.
    pub relative_path: PathBuf,
    pub auth: GitAuth,
}

/// Everything the controller needs for a run.
#[derive(Debug, Clone)]
pub struct ControllerConfig {
    pub repository: RepositoryConfig,
    /// Management service URL (e.g., `https://api.netbird.io`).
    pub api_url: Url,
    pub api_token: SecretString,
    /// Delay between reconciliation passes.
    pub poll_interval: Duration,
    /// Run a single live pass and exit instead of polling.
    pub sync_once: bool,
    /// Extra CA certificate (PEM) for self-hosted management servers.
    pub ca_cert: Option<PathBuf>,
}
