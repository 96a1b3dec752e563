//! Request counters reported by `GET /health`.

use std::sync::atomic::{AtomicU64, Ordering};

/// Gateway metrics
#[derive(Debug, Default)]
pub struct GatewayMetrics {
    pub requests_total: AtomicU64,
    pub requests_error: AtomicU64,
    /// Requests rejected by the signature guard
    pub auth_failures: AtomicU64,
}

impl GatewayMetrics {
    pub fn new() -> Self {
        Self::default()
    }

    /// Record a finished request
    pub fn record_request(&self, success: bool) {
        self.requests_total.fetch_add(1, Ordering::Relaxed);
        if !success {
            self.requests_error.fetch_add(1, Ordering::Relaxed);
        }
    }

    pub fn record_auth_failure(&self) {
        self.auth_failures.fetch_add(1, Ordering::Relaxed);
    }

    /// Export as JSON
    pub fn to_json(&self) -> serde_json::Value {
        serde_json::json!({
            "requests": self.requests_total.load(Ordering::Relaxed),
            "errors": self.requests_error.load(Ordering::Relaxed),
            "auth_failures": self.auth_failures.load(Ordering::Relaxed),
        })
    }
}
