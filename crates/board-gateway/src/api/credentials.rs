//! Credential registration and the debug dump.

use crate::domain::error::{ApiError, ApiResult};
use crate::domain::types::{Credential, RegisterCredentialRequest, SharedSecret};
use crate::router::AppState;
use axum::{extract::State, http::StatusCode, Json};
use std::collections::BTreeMap;
use tracing::{info, instrument, warn};

/// `PUT /credential` - register a new key and shared secret
#[instrument(skip(state, request), fields(key = %request.key))]
pub async fn register_credential(
    State(state): State<AppState>,
    Json(request): Json<RegisterCredentialRequest>,
) -> ApiResult<StatusCode> {
    if request.key.is_empty() || request.shared_secret.is_empty() {
        return Err(ApiError::BadRequest(
            "key and shared_secret are required".into(),
        ));
    }

    state
        .credentials
        .register(&request.key, SharedSecret::new(request.shared_secret))?;

    info!("Credential registered");
    Ok(StatusCode::NO_CONTENT)
}

/// `GET /credentials` - every credential with its secret.
///
/// INSECURE debug affordance, mounted only while
/// `debug.expose_credentials` is on.
pub async fn list_credentials(
    State(state): State<AppState>,
) -> Json<BTreeMap<String, Credential>> {
    warn!("Credential dump requested; response contains shared secrets");
    Json(state.credentials.list_all())
}
