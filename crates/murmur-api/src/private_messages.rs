use axum::{
    Json,
    extract::{Path, State},
    http::StatusCode,
    response::IntoResponse,
};
use tracing::{info, warn};

use murmur_db::models::StatusUpdate;
use murmur_types::api::{
    ConversationSummary, PrivateMessageResponse, SendPrivateMessageRequest, UpdateStatusRequest,
};
use murmur_types::models::MessageStatus;

use crate::convert::{conversation_summary, private_message_response};
use crate::error::ApiError;
use crate::service::{AppState, ChatService, MessageKind, now, require_content};

impl ChatService {
    pub async fn create_private_message(
        &self,
        sender_id: i64,
        receiver_id: i64,
        content: String,
    ) -> Result<PrivateMessageResponse, ApiError> {
        require_content(&content)?;
        if sender_id == receiver_id {
            return Err(ApiError::validation("sender and receiver must be different users"));
        }

        let (sender, receiver) = self
            .blocking(move |db| Ok((db.get_user_by_id(sender_id)?, db.get_user_by_id(receiver_id)?)))
            .await?;
        let (Some(sender), Some(receiver)) = (sender, receiver) else {
            warn!("Private message rejected, unknown user: sender={} receiver={}", sender_id, receiver_id);
            return Err(ApiError::user_not_found());
        };

        let sent_at = now();
        let text = content.clone();
        let id = self
            .blocking(move |db| db.insert_private_message(sender_id, receiver_id, &text, sent_at))
            .await?;

        info!("Private message {} from {} to {}", id, sender.username, receiver.username);

        let annotation = self.annotate_and_store(MessageKind::Private, id, &content).await;

        Ok(PrivateMessageResponse {
            id,
            content,
            sent_at,
            sender_id,
            sender_username: sender.username,
            receiver_id,
            receiver_username: receiver.username,
            status: MessageStatus::Sent,
            read_at: None,
            sentiment: annotation.as_ref().map(|a| a.label),
            sentiment_confidence: annotation.as_ref().map(|a| a.confidence),
            sentiment_scores: annotation.map(|a| a.scores),
        })
    }

    /// Every message between two users, oldest first.
    pub async fn conversation(&self, user_a: i64, user_b: i64) -> Result<Vec<PrivateMessageResponse>, ApiError> {
        let rows = self.blocking(move |db| db.get_conversation(user_a, user_b)).await?;
        Ok(rows.into_iter().map(private_message_response).collect())
    }

    /// Inbox for `user_id`: one summary per counterpart, latest activity first.
    pub async fn conversations(&self, user_id: i64) -> Result<Vec<ConversationSummary>, ApiError> {
        let rows = self.blocking(move |db| db.list_conversations(user_id)).await?;
        Ok(rows.into_iter().map(conversation_summary).collect())
    }

    /// `reader_id` has seen everything `sender_id` sent them. Idempotent.
    pub async fn mark_conversation_read(&self, reader_id: i64, sender_id: i64) -> Result<usize, ApiError> {
        let read_at = now();
        let changed = self
            .blocking(move |db| db.mark_conversation_read(reader_id, sender_id, read_at))
            .await?;

        info!("Marked {} messages from {} to {} as read", changed, sender_id, reader_id);
        Ok(changed)
    }

    /// Advances one message. Re-applying the current status is accepted;
    /// moving backwards is rejected.
    pub async fn set_message_status(&self, id: i64, status: MessageStatus) -> Result<(), ApiError> {
        let at = now();
        let outcome = self
            .blocking(move |db| db.set_private_message_status(id, status, at))
            .await?;

        match outcome {
            StatusUpdate::Applied => {
                info!("Private message {} status set to {:?}", id, status);
                Ok(())
            }
            StatusUpdate::NotFound => Err(ApiError::NotFound("private message not found".into())),
            StatusUpdate::Regression { current } => {
                let current = MessageStatus::from_code(current)
                    .map(|s| format!("{:?}", s))
                    .unwrap_or_else(|| current.to_string());
                Err(ApiError::validation(format!(
                    "message status cannot move back from {} to {:?}",
                    current, status
                )))
            }
        }
    }
}

pub async fn send_private_message(
    State(state): State<AppState>,
    Json(req): Json<SendPrivateMessageRequest>,
) -> Result<impl IntoResponse, ApiError> {
    let message = state
        .create_private_message(req.sender_id, req.receiver_id, req.content)
        .await?;
    Ok((StatusCode::CREATED, Json(message)))
}

pub async fn get_conversation(
    State(state): State<AppState>,
    Path((user_a, user_b)): Path<(i64, i64)>,
) -> Result<impl IntoResponse, ApiError> {
    Ok(Json(state.conversation(user_a, user_b).await?))
}

pub async fn get_conversations(
    State(state): State<AppState>,
    Path(user_id): Path<i64>,
) -> Result<impl IntoResponse, ApiError> {
    Ok(Json(state.conversations(user_id).await?))
}

pub async fn update_status(
    State(state): State<AppState>,
    Path(id): Path<i64>,
    Json(req): Json<UpdateStatusRequest>,
) -> Result<impl IntoResponse, ApiError> {
    state.set_message_status(id, req.status).await?;
    Ok(StatusCode::NO_CONTENT)
}

/// PUT /api/privatemessages/conversation/{reader}/{sender}/read
pub async fn mark_read(
    State(state): State<AppState>,
    Path((reader_id, sender_id)): Path<(i64, i64)>,
) -> Result<impl IntoResponse, ApiError> {
    state.mark_conversation_read(reader_id, sender_id).await?;
    Ok(StatusCode::NO_CONTENT)
}
