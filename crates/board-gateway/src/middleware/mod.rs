//! Middleware stack for the gateway.
//!
//! Layer order: Request → CORS → Tracing → Router → (SignatureGuard, per route) → Handler

pub mod cors;
pub mod metrics;
pub mod signature;
pub mod tracing;

pub use cors::create_cors_layer;
pub use metrics::GatewayMetrics;
pub use signature::SignatureLayer;
pub use tracing::TracingLayer;
