use std::sync::Arc;

use chrono::{DateTime, SubsecRound, Utc};
use tracing::{error, info, warn};

use murmur_db::Database;
use murmur_db::models::SentimentPatch;
use murmur_sentiment::{Annotation, Annotator};

use crate::error::ApiError;

pub type AppState = Arc<ChatService>;

/// Shared request-handling state: the store plus the sentiment annotator.
/// Operations live next to their handlers in `messages`, `private_messages`,
/// `users` and `auth`.
pub struct ChatService {
    db: Arc<Database>,
    annotator: Annotator,
}

#[derive(Debug, Clone, Copy)]
pub(crate) enum MessageKind {
    Public,
    Private,
}

impl ChatService {
    pub fn new(db: Database, annotator: Annotator) -> Self {
        Self {
            db: Arc::new(db),
            annotator,
        }
    }

    pub fn db(&self) -> &Database {
        &self.db
    }

    /// Run blocking DB work off the async runtime.
    pub(crate) async fn blocking<F, T>(&self, f: F) -> Result<T, ApiError>
    where
        F: FnOnce(&Database) -> anyhow::Result<T> + Send + 'static,
        T: Send + 'static,
    {
        let db = self.db.clone();
        tokio::task::spawn_blocking(move || f(&db))
            .await
            .map_err(|e| {
                error!("spawn_blocking join error: {}", e);
                ApiError::Internal(anyhow::anyhow!("blocking task failed"))
            })?
            .map_err(ApiError::Internal)
    }

    /// Second half of a send. The row already exists and stays readable
    /// without sentiment if the annotator gives up or the patch fails.
    pub(crate) async fn annotate_and_store(
        &self,
        kind: MessageKind,
        id: i64,
        content: &str,
    ) -> Option<Annotation> {
        let Some(annotation) = self.annotator.annotate(content).await else {
            warn!("No sentiment for {:?} message {}", kind, id);
            return None;
        };

        let scores_json = match serde_json::to_string(&annotation.scores) {
            Ok(json) => json,
            Err(e) => {
                warn!("Could not encode sentiment scores for message {}: {}", id, e);
                return None;
            }
        };
        let label = annotation.label.as_str();
        let confidence = annotation.confidence;

        let stored = self
            .blocking(move |db| {
                let patch = SentimentPatch { label, confidence, scores_json: &scores_json };
                match kind {
                    MessageKind::Public => db.set_message_sentiment(id, &patch),
                    MessageKind::Private => db.set_private_message_sentiment(id, &patch),
                }
            })
            .await;

        match stored {
            Ok(()) => {
                info!("Sentiment for {:?} message {}: {}", kind, id, annotation.label);
                Some(annotation)
            }
            Err(e) => {
                warn!("Could not store sentiment for message {}: {}", id, e);
                None
            }
        }
    }
}

/// Current time at the precision the store keeps, so a freshly created
/// record reads back identical.
pub(crate) fn now() -> DateTime<Utc> {
    Utc::now().trunc_subsecs(6)
}

pub(crate) fn require_content(content: &str) -> Result<(), ApiError> {
    if content.trim().is_empty() {
        return Err(ApiError::validation("message content must not be empty"));
    }
    Ok(())
}
