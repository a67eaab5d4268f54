// Shared transport configuration for building reqwest::Client instances.
//
// Keeps TLS and default-header handling in one place so the management
// client only deals with URLs and payloads. No request timeout is set.

use std::path::PathBuf;

use reqwest::header::HeaderMap;

use crate::error::Error;

/// TLS verification mode.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub enum TlsMode {
    /// Use the system certificate store.
    #[default]
    System,
    /// Also trust the CA certificate in this PEM file (self-hosted management
    /// servers behind a private CA).
    CustomCa(PathBuf),
}

/// Shared transport configuration for building HTTP clients.
#[derive(Debug, Clone, Default)]
pub struct TransportConfig {
    pub tls: TlsMode,
}

impl TransportConfig {
    /// Transport trusting `ca_cert` in addition to the system store.
    pub fn with_ca_cert(ca_cert: Option<PathBuf>) -> Self {
        Self {
            tls: ca_cert.map_or(TlsMode::System, TlsMode::CustomCa),
        }
    }

    /// Build a `reqwest::Client` with the given default headers.
    ///
    /// Used by the management client to inject the `Authorization` header.
    pub fn build_client_with_headers(&self, headers: HeaderMap) -> Result<reqwest::Client, Error> {
        let mut builder = reqwest::Client::builder()
            .user_agent(concat!("nbgitops/", env!("CARGO_PKG_VERSION")))
            .default_headers(headers);

        if let TlsMode::CustomCa(path) = &self.tls {
            let cert_pem = std::fs::read(path).map_err(|e| {
                Error::Tls(format!("failed to read CA cert {}: {e}", path.display()))
            })?;
            let cert = reqwest::Certificate::from_pem(&cert_pem)
                .map_err(|e| Error::Tls(format!("invalid CA cert: {e}")))?;
            builder = builder.add_root_certificate(cert);
        }

        builder
            .build()
            .map_err(|e| Error::Tls(format!("failed to build HTTP client: {e}")))
    }
}
