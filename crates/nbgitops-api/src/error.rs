use thiserror::Error;

/// Top-level error type for the `nbgitops-api` crate.
///
/// `nbgitops-core` folds these into its own error type; HTTP failures keep
/// their status in [`Error::Api`].
#[derive(Debug, Error)]
pub enum Error {
    // ── Authentication ──────────────────────────────────────────────
    /// Token rejected by the management service (HTTP 401).
    #[error("Invalid API token")]
    InvalidToken,

    /// Token could not be turned into a header value.
    #[error("Authentication setup failed: {message}")]
    Authentication { message: String },

    // ── Transport ───────────────────────────────────────────────────
    /// HTTP transport error (connection refused, DNS failure, etc.)
    #[error("HTTP transport error: {0}")]
    Transport(#[from] reqwest::Error),

    /// URL parsing error.
    #[error("Invalid URL: {0}")]
    InvalidUrl(#[from] url::ParseError),

    /// TLS or client builder failure.
    #[error("TLS error: {0}")]
    Tls(String),

    // ── Management API ──────────────────────────────────────────────
    /// Non-2xx response from the management API.
    #[error("Management API error (HTTP {status}) on {operation}: {message}")]
    Api {
        operation: &'static str,
        status: u16,
        message: String,
    },

    // ── Data ────────────────────────────────────────────────────────
    /// JSON deserialization failed, with the raw body for debugging.
    #[error("Deserialization error: {message}")]
    Deserialization { message: String, body: String },
}
