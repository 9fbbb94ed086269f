/// Database row types, mapped directly from SQLite rows.
/// Distinct from murmur-types API models to keep the DB layer independent.

pub struct UserRow {
    pub id: i64,
    pub username: String,
    pub password: String,
    pub created_at: String,
}

pub struct MessageRow {
    pub id: i64,
    pub content: String,
    pub sent_at: String,
    pub user_id: i64,
    pub username: String,
    pub sentiment: Option<String>,
    pub sentiment_confidence: Option<f64>,
    pub sentiment_scores: Option<String>,
}

pub struct PrivateMessageRow {
    pub id: i64,
    pub content: String,
    pub sent_at: String,
    pub sender_id: i64,
    pub sender_username: String,
    pub receiver_id: i64,
    pub receiver_username: String,
    pub status: i64,
    pub read_at: Option<String>,
    pub sentiment: Option<String>,
    pub sentiment_confidence: Option<f64>,
    pub sentiment_scores: Option<String>,
}

pub struct ConversationRow {
    pub other_user_id: i64,
    pub other_username: String,
    pub last_message_at: String,
    pub last_message_content: String,
    pub unread_count: i64,
}

/// Number of messages a user authored with a given sentiment label, public
/// and sent private messages combined.
pub struct SentimentCountRow {
    pub user_id: i64,
    pub sentiment: String,
    pub count: i64,
}

/// Sentiment fields written by the follow-up step after a message insert.
pub struct SentimentPatch<'a> {
    pub label: &'a str,
    pub confidence: f64,
    pub scores_json: &'a str,
}

/// Outcome of a single-message status change.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum StatusUpdate {
    Applied,
    NotFound,
    /// The message is already past the requested status; nothing was written.
    Regression { current: i64 },
}
