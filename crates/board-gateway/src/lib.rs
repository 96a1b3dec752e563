//! Board Gateway - credential registration, a tag-searchable message store,
//! and HMAC-SHA256 request signing.
//!
//! # Architecture
//!
//! ```text
//! ┌──────────────────────────────────────────────────────────┐
//! │                      BOARD GATEWAY                       │
//! ├──────────────────────────────────────────────────────────┤
//! │   CORS → Tracing → Router ──┬── SignatureGuard (opt-in)  │
//! │                             │                            │
//! │        ┌────────────────────┴──────────────┐             │
//! │        ▼                                   ▼             │
//! │  CredentialStore ◄── SignatureVerifier   MessageStore    │
//! └──────────────────────────────────────────────────────────┘
//! ```
//!
//! # Signing
//!
//! A client registers `(key, shared_secret)` once, then signs requests with
//! HMAC-SHA256 over the canonical string built by
//! [`domain::signing::canonical_string`] and sends `x-key`, `x-route` and
//! `x-signature`. See [`sign_request`].
//!
//! # Security
//!
//! - `GET /credentials` returns every secret in clear text. It stays mounted
//!   by default for compatibility; turn it off with
//!   `debug.expose_credentials = false`.
//! - The signed payload carries no nonce or timestamp, so captured requests
//!   can be replayed.
//! - The route label is chosen by the client and is not bound to the endpoint.
//!
//! # Usage
//!
//! ```ignore
//! use board_gateway::{BoardGatewayService, GatewayConfig};
//!
//! let service = BoardGatewayService::new(GatewayConfig::default())?;
//! service.start(async { let _ = tokio::signal::ctrl_c().await; }).await?;
//! ```

#![warn(clippy::all)]
#![deny(unsafe_code)]

pub mod api;
pub mod domain;
pub mod middleware;
pub mod router;
pub mod service;

// Re-exports for public API
pub use domain::config::{GatewayConfig, Operation};
pub use domain::error::{ApiError, ApiResult, AuthError, GatewayError, StoreError};
pub use domain::signing::{canonical_string, compute_signature, sign_request, SignatureVerifier};
pub use domain::types::*;
pub use domain::{CredentialStore, MessageStore};
pub use middleware::GatewayMetrics;
pub use router::{build_router, AppState};
pub use service::BoardGatewayService;

/// Crate version
pub const VERSION: &str = env!("CARGO_PKG_VERSION");
