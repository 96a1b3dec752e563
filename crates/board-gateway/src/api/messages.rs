//! Message create, read, search and delete.

use crate::domain::error::{ApiError, ApiResult};
use crate::domain::types::{CreatedMessage, Message, MessageId};
use crate::router::AppState;
use axum::{
    extract::{Path, State},
    http::StatusCode,
    Json,
};
use tracing::instrument;

/// `POST /message`
#[instrument(skip_all)]
pub async fn create_message(
    State(state): State<AppState>,
    Json(message): Json<Message>,
) -> Json<CreatedMessage> {
    let message_id = state.messages.create(message);
    Json(CreatedMessage { message_id })
}

/// `GET /message/:id`
#[instrument(skip(state))]
pub async fn get_message(
    State(state): State<AppState>,
    Path(id): Path<String>,
) -> ApiResult<Json<Message>> {
    let id = parse_id(&id)?;
    Ok(Json(state.messages.get(&id)?))
}

/// `GET /messages/:tag` - possibly empty
#[instrument(skip(state))]
pub async fn search_messages(
    State(state): State<AppState>,
    Path(tag): Path<String>,
) -> Json<Vec<Message>> {
    Json(state.messages.search_by_tag(&tag))
}

/// `DELETE /message/:id`
#[instrument(skip(state))]
pub async fn delete_message(
    State(state): State<AppState>,
    Path(id): Path<String>,
) -> ApiResult<StatusCode> {
    let id = parse_id(&id)?;
    state.messages.delete(&id)?;
    Ok(StatusCode::NO_CONTENT)
}

/// Strings that are not an issued id verbatim are simply not found
fn parse_id(raw: &str) -> ApiResult<MessageId> {
    MessageId::parse(raw).ok_or(ApiError::NotFound)
}
