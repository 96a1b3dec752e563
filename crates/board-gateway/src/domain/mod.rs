//! Domain types for the gateway.
//!
//! Stores, the signing protocol, configuration and error handling. Nothing
//! here knows about HTTP except the error-to-status mapping.

pub mod config;
pub mod credentials;
pub mod error;
pub mod messages;
pub mod signing;
pub mod types;

// Re-exports for convenience
pub use config::{GatewayConfig, Operation};
pub use credentials::CredentialStore;
pub use error::{ApiError, ApiResult, AuthError, GatewayError, StoreError};
pub use messages::MessageStore;
pub use signing::{SignatureVerifier, SignedRequest};
pub use types::*;
