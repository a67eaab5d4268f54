//! CLI error types with miette diagnostics.
//!
//! Maps `ConfigError` and `CoreError` into user-facing errors with
//! actionable help text and a process exit code.

use miette::Diagnostic;
use thiserror::Error;

use nbgitops_config::ConfigError;
use nbgitops_core::{CoreError, SyncStage};

/// Process exit codes.
pub mod exit_code {
    pub const GENERAL: i32 = 1;
    pub const USAGE: i32 = 2;
    pub const AUTH: i32 = 3;
    pub const SOURCE: i32 = 4;
    pub const SYNC: i32 = 5;
    pub const CONNECTION: i32 = 7;
}

#[derive(Debug, Error, Diagnostic)]
pub enum CliError {
    // ── Startup settings ─────────────────────────────────────────────

    #[error("{field} is required")]
    #[diagnostic(
        code(nbgitops::missing_setting),
        help("Pass {field} or set its environment variable. See: nbgitops --help")
    )]
    MissingSetting { field: &'static str },

    #[error("Invalid value for {field}: {reason}")]
    #[diagnostic(code(nbgitops::validation))]
    Validation { field: &'static str, reason: String },

    // ── Git source ───────────────────────────────────────────────────

    #[error("Git repository error: {message}")]
    #[diagnostic(
        code(nbgitops::git),
        help("Check --git-repo-url, --git-branch and the configured git credentials.")
    )]
    Git { message: String },

    // ── Desired state ────────────────────────────────────────────────

    #[error("Invalid NetBird configuration")]
    #[diagnostic(
        code(nbgitops::desired_state),
        help("Fix the YAML under --git-relative-path and push again.")
    )]
    DesiredState {
        #[source]
        source: CoreError,
    },

    // ── Management API ───────────────────────────────────────────────

    #[error("Management API rejected the credentials: {message}")]
    #[diagnostic(
        code(nbgitops::auth_failed),
        help("Verify NETBIRD_TOKEN is a valid personal access token for this account.")
    )]
    AuthFailed { message: String },

    #[error("Management API request failed: {message}")]
    #[diagnostic(
        code(nbgitops::api_error),
        help("Check --netbird-mgmt-api and that the management service is reachable.")
    )]
    Api {
        message: String,
        status: Option<u16>,
    },

    // ── Reconciliation ───────────────────────────────────────────────

    #[error("Sync failed during {stage}")]
    #[diagnostic(code(nbgitops::sync_failed))]
    SyncFailed {
        stage: SyncStage,
        #[source]
        source: Box<CliError>,
    },

    // ── IO ───────────────────────────────────────────────────────────

    #[error(transparent)]
    #[diagnostic(code(nbgitops::io))]
    Io(#[from] std::io::Error),
}

impl CliError {
    /// Map this error to an exit code for process termination.
    pub fn exit_code(&self) -> i32 {
        match self {
            Self::MissingSetting { .. } | Self::Validation { .. } => exit_code::USAGE,
            Self::AuthFailed { .. } => exit_code::AUTH,
            Self::Git { .. } | Self::DesiredState { .. } => exit_code::SOURCE,
            Self::Api { status: None, .. } => exit_code::CONNECTION,
            Self::SyncFailed { source, .. } => match source.exit_code() {
                exit_code::AUTH => exit_code::AUTH,
                _ => exit_code::SYNC,
            },
            _ => exit_code::GENERAL,
        }
    }
}

// ── ConfigError → CliError mapping ───────────────────────────────────

impl From<ConfigError> for CliError {
    fn from(err: ConfigError) -> Self {
        match err {
            ConfigError::Missing { field } => CliError::MissingSetting { field },
            ConfigError::Validation { field, reason } => CliError::Validation { field, reason },
            ConfigError::Figment(e) => CliError::Validation {
                field: "--notify-services-path",
                reason: e.to_string(),
            },
        }
    }
}

// ── CoreError → CliError mapping ─────────────────────────────────────

impl From<CoreError> for CliError {
    fn from(err: CoreError) -> Self {
        match err {
            CoreError::StageFailed { stage, source } => CliError::SyncFailed {
                stage,
                source: Box::new(CliError::from(*source)),
            },

            CoreError::AuthenticationFailed { message } => CliError::AuthFailed { message },

            CoreError::Api { message, status } => CliError::Api { message, status },

            CoreError::Git { message } => CliError::Git { message },

            CoreError::Io { path, source } => CliError::Io(std::io::Error::new(
                source.kind(),
                format!("{path}: {source}"),
            )),

            err @ (CoreError::Config { .. }
            | CoreError::Yaml { .. }
            | CoreError::Validation { .. }) => CliError::DesiredState { source: err },
        }
    }
}
