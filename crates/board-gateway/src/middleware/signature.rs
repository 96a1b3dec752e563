//! Signature guard middleware.
//!
//! Wraps individual routes with the [`SignatureVerifier`]. Which routes get
//! wrapped is deployment configuration (`auth.protected_routes`); see
//! [`crate::router::build_router`].

use crate::domain::error::ApiError;
use crate::domain::signing::{
    SignatureVerifier, SignedRequest, KEY_HEADER, ROUTE_HEADER, SIGNATURE_HEADER,
};
use crate::middleware::GatewayMetrics;
use axum::{
    body::{Body, Bytes},
    extract::{FromRequestParts, Path},
    http::{header, request::Parts, HeaderMap, Request},
    response::{IntoResponse, Response},
};
use futures::StreamExt;
use std::sync::Arc;
use tower::{Layer, Service};
use tracing::warn;

/// Signature guard layer
#[derive(Clone)]
pub struct SignatureLayer {
    verifier: SignatureVerifier,
    max_body_size: usize,
    metrics: Arc<GatewayMetrics>,
}

impl SignatureLayer {
    pub fn new(
        verifier: SignatureVerifier,
        max_body_size: usize,
        metrics: Arc<GatewayMetrics>,
    ) -> Self {
        Self {
            verifier,
            max_body_size,
            metrics,
        }
    }
}

impl<S> Layer<S> for SignatureLayer {
    type Service = SignatureService<S>;

    fn layer(&self, inner: S) -> Self::Service {
        SignatureService {
            inner,
            verifier: self.verifier.clone(),
            max_body_size: self.max_body_size,
            metrics: Arc::clone(&self.metrics),
        }
    }
}

/// Signature guard service
#[derive(Clone)]
pub struct SignatureService<S> {
    inner: S,
    verifier: SignatureVerifier,
    max_body_size: usize,
    metrics: Arc<GatewayMetrics>,
}

impl<S> Service<Request<Body>> for SignatureService<S>
where
    S: Service<Request<Body>, Response = Response> + Clone + Send + 'static,
    S::Future: Send,
{
    type Response = Response;
    type Error = S::Error;
    type Future = std::pin::Pin<
        Box<dyn std::future::Future<Output = Result<Self::Response, Self::Error>> + Send>,
    >;

    fn poll_ready(
        &mut self,
        cx: &mut std::task::Context<'_>,
    ) -> std::task::Poll<Result<(), Self::Error>> {
        self.inner.poll_ready(cx)
    }

    fn call(&mut self, req: Request<Body>) -> Self::Future {
        let verifier = self.verifier.clone();
        let max_body_size = self.max_body_size;
        let metrics = Arc::clone(&self.metrics);
        let mut inner = self.inner.clone();

        Box::pin(async move {
            let (mut parts, body) = req.into_parts();

            // Only JSON bodies take part in signing. Anything else passes
            // through unread and signs as no fields.
            let (body, body_json) = if is_json(&parts.headers) {
                let bytes = match read_body(body, max_body_size).await {
                    Ok(bytes) => bytes,
                    Err(e) => return Ok(e.into_response()),
                };
                let value = match parse_body(&bytes) {
                    Ok(value) => value,
                    Err(e) => return Ok(e.into_response()),
                };
                (Body::from(bytes), value)
            } else {
                (body, None)
            };

            let params = path_params(&mut parts).await;

            let header = |name: &str| {
                parts
                    .headers
                    .get(name)
                    .and_then(|v| v.to_str().ok())
                    .map(str::to_string)
            };
            let key = header(KEY_HEADER);
            let route = header(ROUTE_HEADER);
            let signature = header(SIGNATURE_HEADER);

            let signed = SignedRequest {
                key: key.as_deref(),
                route: route.as_deref(),
                signature: signature.as_deref(),
                body: body_json.as_ref(),
                params: &params,
            };

            if let Err(e) = verifier.verify(&signed) {
                metrics.record_auth_failure();
                warn!(
                    path = %parts.uri.path(),
                    reason = e.kind(),
                    "Request rejected by signature guard"
                );
                return Ok(ApiError::from(e).into_response());
            }

            inner.call(Request::from_parts(parts, body)).await
        })
    }
}

/// `application/json` or any `+json` media type
fn is_json(headers: &HeaderMap) -> bool {
    let Some(content_type) = headers
        .get(header::CONTENT_TYPE)
        .and_then(|v| v.to_str().ok())
    else {
        return false;
    };
    let essence = content_type
        .split(';')
        .next()
        .unwrap_or_default()
        .trim()
        .to_ascii_lowercase();
    essence == "application/json"
        || (essence.starts_with("application/") && essence.ends_with("+json"))
}

/// Buffer the body, failing once it grows past `limit` bytes.
async fn read_body(body: Body, limit: usize) -> Result<Bytes, ApiError> {
    let mut stream = body.into_data_stream();
    let mut buf = Vec::new();

    while let Some(chunk) = stream.next().await {
        let chunk = chunk.map_err(|e| {
            warn!(error = %e, "Failed to read body for signature check");
            ApiError::BadRequest(format!("failed to read body: {}", e))
        })?;
        if buf.len() + chunk.len() > limit {
            return Err(ApiError::PayloadTooLarge(format!(
                "body exceeds {} bytes",
                limit
            )));
        }
        buf.extend_from_slice(&chunk);
    }

    Ok(Bytes::from(buf))
}

/// Parse the buffered body. An empty body signs as no fields; a bare scalar
/// is not accepted as a body.
fn parse_body(bytes: &Bytes) -> Result<Option<serde_json::Value>, ApiError> {
    if bytes.iter().all(|b| b.is_ascii_whitespace()) {
        return Ok(None);
    }
    let value: serde_json::Value = serde_json::from_slice(bytes)
        .map_err(|e| ApiError::BadRequest(format!("invalid JSON body: {}", e)))?;
    if !(value.is_object() || value.is_array()) {
        return Err(ApiError::BadRequest(
            "JSON body must be an object or an array".into(),
        ));
    }
    Ok(Some(value))
}

/// Matched path parameters in route order. Routes without parameters yield
/// an empty list.
async fn path_params(parts: &mut Parts) -> Vec<(String, String)> {
    Path::<Vec<(String, String)>>::from_request_parts(parts, &())
        .await
        .map(|Path(params)| params)
        .unwrap_or_default()
}
