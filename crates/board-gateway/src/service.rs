//! Gateway service - binds the listener and serves the router.

use crate::domain::config::GatewayConfig;
use crate::domain::error::GatewayError;
use crate::router::{build_router, AppState};
use axum::Router;
use std::future::Future;
use tokio::net::TcpListener;
use tracing::info;

/// Board gateway service
pub struct BoardGatewayService {
    config: GatewayConfig,
    state: AppState,
}

impl BoardGatewayService {
    /// Create a new service with empty stores
    pub fn new(config: GatewayConfig) -> Result<Self, GatewayError> {
        config.validate()?;
        Ok(Self {
            config,
            state: AppState::new(),
        })
    }

    /// Shared state (stores and metrics)
    pub fn state(&self) -> &AppState {
        &self.state
    }

    pub fn config(&self) -> &GatewayConfig {
        &self.config
    }

    /// Build the HTTP router
    pub fn router(&self) -> Result<Router, GatewayError> {
        build_router(&self.config, self.state.clone())
    }

    /// Bind the configured address and serve until `shutdown` resolves
    pub async fn start<F>(self, shutdown: F) -> Result<(), GatewayError>
    where
        F: Future<Output = ()> + Send + 'static,
    {
        let addr = self.config.http_addr();
        let listener = TcpListener::bind(addr)
            .await
            .map_err(GatewayError::Bind)?;
        self.serve(listener, shutdown).await
    }

    /// Serve on an already bound listener until `shutdown` resolves
    pub async fn serve<F>(self, listener: TcpListener, shutdown: F) -> Result<(), GatewayError>
    where
        F: Future<Output = ()> + Send + 'static,
    {
        let router = self.router()?;
        let addr = listener.local_addr().map_err(GatewayError::Bind)?;

        info!(addr = %addr, "Board gateway listening");
        axum::serve(listener, router)
            .with_graceful_shutdown(shutdown)
            .await
            .map_err(GatewayError::Serve)?;

        info!("Board gateway stopped");
        Ok(())
    }
}
