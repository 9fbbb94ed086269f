use thiserror::Error;

use murmur_types::models::UnknownSentiment;

#[derive(Debug, Error)]
pub enum SentimentError {
    #[error("cannot classify empty text")]
    EmptyText,

    #[error("classifier request failed: {0}")]
    Http(#[from] reqwest::Error),

    #[error("classifier reported an error: {0}")]
    Remote(String),

    #[error("malformed classifier response: {0}")]
    Malformed(String),

    #[error(transparent)]
    UnknownLabel(#[from] UnknownSentiment),
}
