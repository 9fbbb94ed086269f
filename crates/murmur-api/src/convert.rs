//! Row → response mapping. Corrupt values are logged and replaced rather
//! than failing the whole listing.

use chrono::{DateTime, Utc};
use tracing::warn;

use murmur_db::models::{ConversationRow, MessageRow, PrivateMessageRow, UserRow};
use murmur_db::timestamp;
use murmur_sentiment::SentimentTally;
use murmur_types::api::{ConversationSummary, MessageResponse, PrivateMessageResponse, UserResponse};
use murmur_types::models::{MessageStatus, Sentiment, SentimentScores};

pub(crate) fn parse_time(raw: &str, field: &str, id: i64) -> DateTime<Utc> {
    timestamp::from_db(raw).unwrap_or_else(|e| {
        warn!("Corrupt {} '{}' on row {}: {}", field, raw, id, e);
        DateTime::default()
    })
}

pub(crate) fn parse_label(raw: &str, id: i64) -> Option<Sentiment> {
    raw.parse()
        .map_err(|e| warn!("Corrupt sentiment on row {}: {}", id, e))
        .ok()
}

fn parse_scores(raw: &str, id: i64) -> Option<SentimentScores> {
    serde_json::from_str(raw)
        .map_err(|e| warn!("Corrupt sentiment scores on row {}: {}", id, e))
        .ok()
}

pub(crate) fn user_response(row: UserRow, tally: Option<&SentimentTally>) -> UserResponse {
    let dominant = tally.and_then(SentimentTally::dominant);

    UserResponse {
        id: row.id,
        created_at: parse_time(&row.created_at, "created_at", row.id),
        username: row.username,
        avg_sentiment: dominant.map(|(label, _)| label),
        avg_sentiment_confidence: dominant.map(|(_, fraction)| fraction),
    }
}

pub(crate) fn message_response(row: MessageRow) -> MessageResponse {
    MessageResponse {
        id: row.id,
        sent_at: parse_time(&row.sent_at, "sent_at", row.id),
        sentiment: row.sentiment.as_deref().and_then(|s| parse_label(s, row.id)),
        sentiment_confidence: row.sentiment_confidence,
        sentiment_scores: row.sentiment_scores.as_deref().and_then(|s| parse_scores(s, row.id)),
        content: row.content,
        user_id: row.user_id,
        username: row.username,
    }
}

pub(crate) fn private_message_response(row: PrivateMessageRow) -> PrivateMessageResponse {
    let status = MessageStatus::from_code(row.status).unwrap_or_else(|| {
        warn!("Corrupt status {} on private message {}", row.status, row.id);
        MessageStatus::Sent
    });

    PrivateMessageResponse {
        id: row.id,
        sent_at: parse_time(&row.sent_at, "sent_at", row.id),
        status,
        read_at: row.read_at.as_deref().map(|raw| parse_time(raw, "read_at", row.id)),
        sentiment: row.sentiment.as_deref().and_then(|s| parse_label(s, row.id)),
        sentiment_confidence: row.sentiment_confidence,
        sentiment_scores: row.sentiment_scores.as_deref().and_then(|s| parse_scores(s, row.id)),
        content: row.content,
        sender_id: row.sender_id,
        sender_username: row.sender_username,
        receiver_id: row.receiver_id,
        receiver_username: row.receiver_username,
    }
}

pub(crate) fn conversation_summary(row: ConversationRow) -> ConversationSummary {
    ConversationSummary {
        last_message_at: parse_time(&row.last_message_at, "last_message_at", row.other_user_id),
        other_user_id: row.other_user_id,
        other_username: row.other_username,
        last_message_content: row.last_message_content,
        unread_count: row.unread_count.try_into().unwrap_or_default(),
    }
}
