//! Health check endpoint.

use crate::router::AppState;
use axum::{extract::State, Json};

/// `GET /health` - liveness plus store sizes and request counters
pub async fn health_check(State(state): State<AppState>) -> Json<serde_json::Value> {
    let mut body = serde_json::json!({
        "status": "healthy",
        "service": "board-gateway",
        "version": crate::VERSION,
        "credentials": state.credentials.len(),
        "messages": state.messages.len(),
    });
    if let (Some(obj), serde_json::Value::Object(counters)) =
        (body.as_object_mut(), state.metrics.to_json())
    {
        obj.extend(counters);
    }
    Json(body)
}
