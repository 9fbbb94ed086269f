use axum::{
    Json,
    extract::{Path, Query, State},
    http::StatusCode,
    response::IntoResponse,
};
use serde::Deserialize;
use tracing::info;

use murmur_types::api::{MessageResponse, SendMessageRequest};

use crate::convert::message_response;
use crate::error::ApiError;
use crate::service::{AppState, ChatService, MessageKind, now, require_content};

/// Page size of the public feed.
pub const FEED_LIMIT: u32 = 50;
/// Page size when the feed is filtered to one author.
pub const AUTHOR_FEED_LIMIT: u32 = 20;

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct MessageQuery {
    pub user_id: Option<i64>,
}

impl ChatService {
    /// Stores a public message, then annotates it. The message is readable
    /// as soon as the insert lands; a missing annotation never fails the send.
    pub async fn create_message(&self, user_id: i64, content: String) -> Result<MessageResponse, ApiError> {
        require_content(&content)?;

        let author = self
            .blocking(move |db| db.get_user_by_id(user_id))
            .await?
            .ok_or_else(ApiError::user_not_found)?;

        let sent_at = now();
        let text = content.clone();
        let id = self
            .blocking(move |db| db.insert_message(user_id, &text, sent_at))
            .await?;

        info!("New message {} by {}", id, author.username);

        let annotation = self.annotate_and_store(MessageKind::Public, id, &content).await;

        Ok(MessageResponse {
            id,
            content,
            sent_at,
            user_id,
            username: author.username,
            sentiment: annotation.as_ref().map(|a| a.label),
            sentiment_confidence: annotation.as_ref().map(|a| a.confidence),
            sentiment_scores: annotation.map(|a| a.scores),
        })
    }

    pub async fn get_message(&self, id: i64) -> Result<MessageResponse, ApiError> {
        let row = self
            .blocking(move |db| db.get_message(id))
            .await?
            .ok_or_else(|| ApiError::NotFound("message not found".into()))?;

        Ok(message_response(row))
    }

    /// Newest first; 50 for the whole feed, 20 for a single author.
    pub async fn list_messages(&self, user_id: Option<i64>) -> Result<Vec<MessageResponse>, ApiError> {
        let limit = if user_id.is_some() { AUTHOR_FEED_LIMIT } else { FEED_LIMIT };
        let rows = self.blocking(move |db| db.list_messages(user_id, limit)).await?;
        Ok(rows.into_iter().map(message_response).collect())
    }
}

pub async fn send_message(
    State(state): State<AppState>,
    Json(req): Json<SendMessageRequest>,
) -> Result<impl IntoResponse, ApiError> {
    let message = state.create_message(req.user_id, req.content).await?;
    Ok((StatusCode::CREATED, Json(message)))
}

pub async fn get_messages(
    State(state): State<AppState>,
    Query(query): Query<MessageQuery>,
) -> Result<impl IntoResponse, ApiError> {
    Ok(Json(state.list_messages(query.user_id).await?))
}

pub async fn get_messages_by_user(
    State(state): State<AppState>,
    Path(user_id): Path<i64>,
) -> Result<impl IntoResponse, ApiError> {
    Ok(Json(state.list_messages(Some(user_id)).await?))
}

pub async fn get_message(
    State(state): State<AppState>,
    Path(id): Path<i64>,
) -> Result<impl IntoResponse, ApiError> {
    Ok(Json(state.get_message(id).await?))
}
