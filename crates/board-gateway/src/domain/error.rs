//! Gateway error types and their HTTP mapping.
//!
//! Every failure is terminal for the request and is answered with a 4xx status
//! and a short plain-text message. No structured error body is produced.

use axum::{
    http::StatusCode,
    response::{IntoResponse, Response},
};

/// Errors raised by the in-memory stores.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum StoreError {
    /// A credential with this key is already registered
    #[error("key already exists: {0}")]
    AlreadyExists(String),

    /// No entry under this identifier
    #[error("not found: {0}")]
    NotFound(String),
}

/// Reasons the signature verifier rejects a request.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum AuthError {
    /// One of `x-key`, `x-route` or `x-signature` is absent
    #[error("missing authentication headers")]
    MissingHeaders,

    /// `x-key` names no registered credential
    #[error("unknown credential: {0}")]
    UnknownCredential(String),

    /// Recomputed signature differs from `x-signature`
    #[error("invalid signature")]
    InvalidSignature,
}

impl AuthError {
    /// Short label used in logs and metrics
    pub fn kind(&self) -> &'static str {
        match self {
            AuthError::MissingHeaders => "missing_headers",
            AuthError::UnknownCredential(_) => "unknown_credential",
            AuthError::InvalidSignature => "invalid_signature",
        }
    }
}

/// Error returned by HTTP handlers and the signature guard.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum ApiError {
    /// Authentication failure (always 403)
    #[error(transparent)]
    Auth(#[from] AuthError),

    /// Credential key already taken
    #[error("key already exists")]
    AlreadyExists,

    /// Message id not present
    #[error("message not found")]
    NotFound,

    /// Body could not be interpreted
    #[error("bad request: {0}")]
    BadRequest(String),

    /// Body larger than the configured limit
    #[error("payload too large: {0}")]
    PayloadTooLarge(String),
}

impl ApiError {
    /// HTTP status for this error
    pub fn status(&self) -> StatusCode {
        match self {
            // Duplicate keys answer 403, not 409
            ApiError::Auth(_) | ApiError::AlreadyExists => StatusCode::FORBIDDEN,
            ApiError::NotFound => StatusCode::NOT_FOUND,
            ApiError::BadRequest(_) => StatusCode::BAD_REQUEST,
            ApiError::PayloadTooLarge(_) => StatusCode::PAYLOAD_TOO_LARGE,
        }
    }

    /// Message sent to the client. Unknown keys are not echoed back.
    fn public_message(&self) -> String {
        match self {
            ApiError::Auth(AuthError::UnknownCredential(_)) => "unknown credential".to_string(),
            other => other.to_string(),
        }
    }
}

impl From<StoreError> for ApiError {
    fn from(e: StoreError) -> Self {
        match e {
            StoreError::AlreadyExists(_) => ApiError::AlreadyExists,
            StoreError::NotFound(_) => ApiError::NotFound,
        }
    }
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        (self.status(), self.public_message()).into_response()
    }
}

/// Result type for handler operations
pub type ApiResult<T> = Result<T, ApiError>;

/// Service-level errors (startup and serving, not per request)
#[derive(Debug, thiserror::Error)]
pub enum GatewayError {
    /// Configuration rejected by validation
    #[error("configuration error: {0}")]
    Config(#[from] crate::domain::config::ConfigError),

    /// Server socket bind error
    #[error("server bind error: {0}")]
    Bind(std::io::Error),

    /// HTTP server stopped with an error
    #[error("server error: {0}")]
    Serve(std::io::Error),
}
