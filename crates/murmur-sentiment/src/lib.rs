//! Sentiment annotation for chat messages.
//!
//! A [`SentimentClassifier`] turns text into an [`Annotation`]. The
//! [`Annotator`] wraps one with a time limit and swallows every failure:
//! callers get `Some(annotation)` or carry on without one.

pub mod aggregate;
pub mod error;
pub mod keyword;
pub mod remote;

use std::sync::Arc;
use std::time::Duration;

use async_trait::async_trait;
use tracing::{debug, warn};

use murmur_types::models::{Sentiment, SentimentScores};

pub use aggregate::SentimentTally;
pub use error::SentimentError;
pub use keyword::KeywordClassifier;
pub use remote::HttpClassifier;

#[derive(Debug, Clone, PartialEq)]
pub struct Annotation {
    pub label: Sentiment,
    /// Confidence in `label`, within `0.0..=1.0`.
    pub confidence: f64,
    /// Score per label. Not required to sum to exactly 1.
    pub scores: SentimentScores,
}

impl Annotation {
    fn is_well_formed(&self) -> bool {
        (0.0..=1.0).contains(&self.confidence)
            && self.scores.values().all(|s| s.is_finite() && *s >= 0.0)
    }
}

#[async_trait]
pub trait SentimentClassifier: Send + Sync {
    async fn classify(&self, text: &str) -> Result<Annotation, SentimentError>;
}

#[derive(Clone)]
pub struct Annotator {
    classifier: Arc<dyn SentimentClassifier>,
    timeout: Duration,
}

impl Annotator {
    pub fn new(classifier: Arc<dyn SentimentClassifier>, timeout: Duration) -> Self {
        Self { classifier, timeout }
    }

    /// Best effort: errors, timeouts and out-of-range results all come back
    /// as `None`.
    pub async fn annotate(&self, text: &str) -> Option<Annotation> {
        let annotation = match tokio::time::timeout(self.timeout, self.classifier.classify(text)).await {
            Ok(Ok(annotation)) => annotation,
            Ok(Err(e)) => {
                warn!("Sentiment analysis unavailable: {}", e);
                return None;
            }
            Err(_) => {
                warn!("Sentiment analysis timed out after {:?}", self.timeout);
                return None;
            }
        };

        if !annotation.is_well_formed() {
            warn!("Discarding out-of-range sentiment result: {:?}", annotation);
            return None;
        }

        debug!("Sentiment {} ({:.2})", annotation.label, annotation.confidence);
        Some(annotation)
    }
}
