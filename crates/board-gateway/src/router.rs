//! Route table and guard placement.
//!
//! | Method | Path            | Operation             |
//! |--------|-----------------|-----------------------|
//! | PUT    | /credential     | `register_credential` |
//! | GET    | /credentials    | `list_credentials`    |
//! | POST   | /message        | `create_message`      |
//! | GET    | /message/:id    | `get_message`         |
//! | GET    | /messages/:tag  | `search_messages`     |
//! | DELETE | /message/:id    | `delete_message`      |
//! | GET    | /health         | never guarded         |
//!
//! An operation listed in `auth.protected_routes` gets the signature guard as
//! a route layer. Nothing is guarded by default.

use crate::api;
use crate::domain::config::{GatewayConfig, Operation};
use crate::domain::credentials::CredentialStore;
use crate::domain::error::GatewayError;
use crate::domain::messages::MessageStore;
use crate::domain::signing::SignatureVerifier;
use crate::middleware::{create_cors_layer, GatewayMetrics, SignatureLayer, TracingLayer};
use axum::routing::{delete, get, post, put, MethodRouter};
use axum::Router;
use std::sync::Arc;
use tracing::info;

/// Application state shared across handlers
#[derive(Clone)]
pub struct AppState {
    pub credentials: Arc<CredentialStore>,
    pub messages: Arc<MessageStore>,
    pub metrics: Arc<GatewayMetrics>,
}

impl AppState {
    pub fn new() -> Self {
        Self {
            credentials: Arc::new(CredentialStore::new()),
            messages: Arc::new(MessageStore::new()),
            metrics: Arc::new(GatewayMetrics::new()),
        }
    }
}

impl Default for AppState {
    fn default() -> Self {
        Self::new()
    }
}

/// Build the HTTP router for `config` over `state`
pub fn build_router(config: &GatewayConfig, state: AppState) -> Result<Router, GatewayError> {
    config.validate()?;

    let guard = SignatureLayer::new(
        SignatureVerifier::new(Arc::clone(&state.credentials)),
        config.limits.max_request_size,
        Arc::clone(&state.metrics),
    );

    let guarded = |op: Operation, route: MethodRouter<AppState>| {
        if config.is_protected(op) {
            info!(operation = op.as_str(), "Signature guard enabled");
            route.route_layer(guard.clone())
        } else {
            route
        }
    };

    let mut router = Router::new()
        .route(
            "/credential",
            guarded(Operation::RegisterCredential, put(api::register_credential)),
        )
        .route(
            "/message",
            guarded(Operation::CreateMessage, post(api::create_message)),
        )
        .route(
            "/message/:id",
            guarded(Operation::GetMessage, get(api::get_message)),
        )
        .route(
            "/message/:id",
            guarded(Operation::DeleteMessage, delete(api::delete_message)),
        )
        .route(
            "/messages/:tag",
            guarded(Operation::SearchMessages, get(api::search_messages)),
        )
        .route("/health", get(api::health_check));

    if config.debug.expose_credentials {
        router = router.route(
            "/credentials",
            guarded(Operation::ListCredentials, get(api::list_credentials)),
        );
    } else {
        info!("Credential dump disabled");
    }

    Ok(router
        .layer(TracingLayer::new(Arc::clone(&state.metrics)))
        .layer(create_cors_layer(&config.cors)?)
        .with_state(state))
}
