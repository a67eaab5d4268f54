//! Clap derive structures for the `nbgitops` binary.
//!
//! Every option also reads an environment variable so the controller can be
//! configured entirely from a container environment.

use std::path::PathBuf;
use std::time::Duration;

use clap::builder::PossibleValuesParser;
use clap::{Args, Parser, ValueEnum};
use secrecy::SecretString;

use nbgitops_config::StartupSettings;

// ── Top-Level CLI ────────────────────────────────────────────────────

/// nbgitops -- reconcile a NetBird account against YAML in git
#[derive(Debug, Parser)]
#[command(
    name = "nbgitops",
    version,
    about = "Keep a NetBird account in sync with YAML configuration stored in git",
    long_about = "Clones a git repository, reads the NetBird configuration under a\n\
        relative path and reconciles groups, users, peers, policies, posture\n\
        checks, routes and DNS against the management API on a schedule."
)]
pub struct Cli {
    #[command(flatten)]
    pub git: GitOpts,

    #[command(flatten)]
    pub netbird: NetbirdOpts,

    #[command(flatten)]
    pub sync: SyncOpts,

    #[command(flatten)]
    pub log: LogOpts,
}

// ── Git source ───────────────────────────────────────────────────────

#[derive(Debug, Args)]
#[command(next_help_heading = "Git")]
pub struct GitOpts {
    /// Git repository URL (ssh/https)
    #[arg(long, env = "GIT_REPO_URL")]
    pub git_repo_url: Option<String>,

    /// Directory of the NetBird configuration inside the repository
    #[arg(long, env = "GIT_RELATIVE_PATH")]
    pub git_relative_path: Option<PathBuf>,

    /// Branch to pull changes from
    #[arg(long, env = "GIT_BRANCH", default_value = "main")]
    pub git_branch: String,

    /// Git authentication method
    #[arg(
        long,
        env = "GIT_AUTH_METHOD",
        default_value = "none",
        value_parser = PossibleValuesParser::new(["none", "basic", "ssh"])
    )]
    pub git_auth_method: String,

    /// Username for basic auth
    #[arg(long, env = "GIT_USERNAME")]
    pub git_username: Option<String>,

    /// Password or access token for basic auth
    #[arg(long, env = "GIT_PASSWORD", hide_env_values = true)]
    pub git_password: Option<String>,

    /// SSH private key for ssh auth
    #[arg(long, env = "GIT_PRIVATE_KEY_PATH")]
    pub git_private_key_path: Option<PathBuf>,

    /// Passphrase of the SSH private key (if any)
    #[arg(long, env = "GIT_PRIVATE_KEY_PASSWORD", hide_env_values = true)]
    pub git_private_key_password: Option<String>,
}

// ── Management API ───────────────────────────────────────────────────

#[derive(Debug, Args)]
#[command(next_help_heading = "NetBird")]
pub struct NetbirdOpts {
    /// Management API token
    #[arg(long, env = "NETBIRD_TOKEN", hide_env_values = true)]
    pub netbird_token: Option<String>,

    /// Management API URL
    #[arg(long, env = "NETBIRD_MANAGEMENT_API")]
    pub netbird_mgmt_api: Option<String>,

    /// Extra CA certificate (PEM) for a self-hosted management server
    #[arg(long, env = "NETBIRD_CA_CERT")]
    pub netbird_ca_cert: Option<PathBuf>,
}

// ── Scheduling & notifications ───────────────────────────────────────

#[derive(Debug, Args)]
#[command(next_help_heading = "Sync")]
pub struct SyncOpts {
    /// Time between syncs (e.g. 1m, 30s)
    #[arg(long, default_value = "1m", value_parser = humantime::parse_duration)]
    pub sync_frequency: Duration,

    /// Run one live sync and exit
    #[arg(long)]
    pub sync_and_exit: bool,

    /// Notification services configuration file
    #[arg(long, default_value = "notify.yaml")]
    pub notify_services_path: PathBuf,
}

// ── Logging ──────────────────────────────────────────────────────────

#[derive(Debug, Args)]
#[command(next_help_heading = "Logging")]
pub struct LogOpts {
    /// Log level (trace, debug, info, warn, error); RUST_LOG takes precedence
    #[arg(long, env = "LOG_LEVEL", default_value = "info")]
    pub log_level: String,

    /// Log output format
    #[arg(long, env = "LOG_FORMAT", default_value = "text")]
    pub log_format: LogFormat,
}

#[derive(Debug, Clone, Copy, ValueEnum)]
pub enum LogFormat {
    /// Human-readable lines
    Text,
    /// One JSON object per line
    Json,
}

impl Cli {
    /// Raw settings for validation by `nbgitops-config`.
    pub fn startup_settings(&self) -> StartupSettings {
        StartupSettings {
            repo_url: self.git.git_repo_url.clone(),
            relative_path: self.git.git_relative_path.clone(),
            branch: self.git.git_branch.clone(),
            auth_method: self.git.git_auth_method.clone(),
            username: self.git.git_username.clone(),
            password: self.git.git_password.clone().map(SecretString::from),
            private_key_path: self.git.git_private_key_path.clone(),
            private_key_password: self
                .git
                .git_private_key_password
                .clone()
                .map(SecretString::from),
            api_url: self.netbird.netbird_mgmt_api.clone(),
            api_token: self.netbird.netbird_token.clone().map(SecretString::from),
            sync_frequency: self.sync.sync_frequency,
            sync_once: self.sync.sync_and_exit,
            ca_cert: self.netbird.netbird_ca_cert.clone(),
        }
    }
}
