// ── Core error types ──
//
// Errors surfaced by the reconciliation engine. Transport-level failures from
// `nbgitops-api` are folded into `CoreError::Api` by the `From` impl below so
// reconcilers only ever propagate one type with `?`.

use thiserror::Error;

use crate::sync::SyncStage;

/// Unified error type for the core crate.
#[derive(Debug, Error)]
pub enum CoreError {
    // ── Desired state ────────────────────────────────────────────────
    #[error("Configuration error: {message}")]
    Config { message: String },

    #[error("Failed to parse {file}: {source}")]
    Yaml {
        file: String,
        #[source]
        source: serde_yaml::Error,
    },

    #[error("Validation failed: {message}")]
    Validation { message: String },

    // ── Git source ───────────────────────────────────────────────────
    #[error("Git error: {message}")]
    Git { message: String },

    #[error("I/O error at {path}: {source}")]
    Io {
        path: String,
        #[source]
        source: std::io::Error,
    },

    // ── Management API ───────────────────────────────────────────────
    #[error("Authentication failed: {message}")]
    AuthenticationFailed { message: String },

    #[error("API error: {message}")]
    Api {
        message: String,
        /// HTTP status code (if applicable).
        status: Option<u16>,
    },

    // ── Pass-level ───────────────────────────────────────────────────
    #[error("Sync stage {stage} failed: {source}")]
    StageFailed {
        stage: SyncStage,
        #[source]
        source: Box<CoreError>,
    },
}

impl CoreError {
    pub fn validation(message: impl Into<String>) -> Self {
        Self::Validation {
            message: message.into(),
        }
    }

    pub fn config(message: impl Into<String>) -> Self {
        Self::Config {
            message: message.into(),
        }
    }

    /// The stage a pass failed in, if this error came out of the orchestrator.
    pub fn stage(&self) -> Option<SyncStage> {
        match self {
            Self::StageFailed { stage, .. } => Some(*stage),
            _ => None,
        }
    }
}

impl From<git2::Error> for CoreError {
    fn from(err: git2::Error) -> Self {
        CoreError::Git {
            message: err.message().to_owned(),
        }
    }
}

// ── Conversion from transport-layer errors ───────────────────────────

impl From<nbgitops_api::Error> for CoreError {
    fn from(err: nbgitops_api::Error) -> Self {
        match err {
            nbgitops_api::Error::InvalidToken => CoreError::AuthenticationFailed {
                message: "management API rejected the token".into(),
            },
            nbgitops_api::Error::Authentication { message } => {
                CoreError::AuthenticationFailed { message }
            }
            nbgitops_api::Error::InvalidUrl(e) => CoreError::Config {
                message: format!("Invalid URL: {e}"),
            },
            nbgitops_api::Error::Tls(message) => CoreError::Api {
                message: format!("TLS error: {message}"),
                status: None,
            },
            nbgitops_api::Error::Transport(e) => CoreError::Api {
                status: e.status().map(|s| s.as_u16()),
                message: e.to_string(),
            },
            nbgitops_api::Error::Api {
                operation,
                status,
                message,
            } => CoreError::Api {
                message: format!("{operation}: {message}"),
                status: Some(status),
            },
            nbgitops_api::Error::Deserialization { message, body: _ } => CoreError::Api {
                message: format!("Deserialization error: {message}"),
                status: None,
            },
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn api_status_is_preserved() {
        let err: CoreError = nbgitops_api::Error::Api {
            operation: "groups",
            status: 500,
            message: "boom".into(),
        }
        .into();
        assert!(matches!(
            err,
            CoreError::Api {
                status: Some(500),
                ..
            }
        ));
        assert_eq!(err.to_string(), "API error: groups: boom");
    }

    #[test]
    fn invalid_token_is_authentication_failure() {
        let err: CoreError = nbgitops_api::Error::InvalidToken.into();
        assert!(matches!(err, CoreError::AuthenticationFailed { .. }));
    }

    #[test]
    fn stage_failed_names_stage() {
        let err = CoreError::StageFailed {
            stage: SyncStage::Policies,
            source: Box::new(CoreError::validation("bad")),
        };
        assert_eq!(err.stage(), Some(SyncStage::Policies));
        assert_eq!(
            err.to_string(),
            "Sync stage policies failed: Validation failed: bad"
        );
    }
}
