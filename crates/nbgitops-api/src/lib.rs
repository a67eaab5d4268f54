// nbgitops-api: Async Rust client for the NetBird management API

pub mod auth;
pub mod client;
pub mod error;
pub mod transport;
pub mod types;

pub use client::ManagementClient;
pub use error::Error;
pub use transport::{TlsMode, TransportConfig};
