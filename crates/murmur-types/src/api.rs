use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::models::{MessageStatus, Sentiment, SentimentScores};

// -- Users --

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase", deny_unknown_fields)]
pub struct RegisterRequest {
    pub username: String,
    /// Admin tooling creates users by name only.
    #[serde(default)]
    pub password: String,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase", deny_unknown_fields)]
pub struct LoginRequest {
    pub username: String,
    pub password: String,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct UserResponse {
    pub id: i64,
    pub username: String,
    pub created_at: DateTime<Utc>,
    /// Only filled by the user listing.
    pub avg_sentiment: Option<Sentiment>,
    pub avg_sentiment_confidence: Option<f64>,
}

// -- Public messages --

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase", deny_unknown_fields)]
pub struct SendMessageRequest {
    pub content: String,
    #[serde(alias = "authorUserId")]
    pub user_id: i64,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct MessageResponse {
    pub id: i64,
    pub content: String,
    pub sent_at: DateTime<Utc>,
    pub user_id: i64,
    pub username: String,
    pub sentiment: Option<Sentiment>,
    pub sentiment_confidence: Option<f64>,
    pub sentiment_scores: Option<SentimentScores>,
}

// -- Private messages --

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase", deny_unknown_fields)]
pub struct SendPrivateMessageRequest {
    pub content: String,
    pub sender_id: i64,
    pub receiver_id: i64,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PrivateMessageResponse {
    pub id: i64,
    pub content: String,
    pub sent_at: DateTime<Utc>,
    pub sender_id: i64,
    pub sender_username: String,
    pub receiver_id: i64,
    pub receiver_username: String,
    pub status: MessageStatus,
    pub read_at: Option<DateTime<Utc>>,
    pub sentiment: Option<Sentiment>,
    pub sentiment_confidence: Option<f64>,
    pub sentiment_scores: Option<SentimentScores>,
}

/// Older clients also send the message id in the body; the path wins.
#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct UpdateStatusRequest {
    pub status: MessageStatus,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ConversationSummary {
    pub other_user_id: i64,
    pub other_username: String,
    pub last_message_at: DateTime<Utc>,
    pub last_message_content: String,
    pub unread_count: u32,
}

// -- Errors --

#[derive(Debug, Serialize, Deserialize)]
pub struct ErrorResponse {
    pub error: String,
}
