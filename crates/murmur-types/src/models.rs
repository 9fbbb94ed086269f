use std::collections::BTreeMap;
use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};
use thiserror::Error;

/// Per-label score distribution attached to an annotated message.
pub type SentimentScores = BTreeMap<Sentiment, f64>;

/// Sentiment labels. The wire and storage names are the Turkish labels the
/// clients display.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub enum Sentiment {
    #[serde(rename = "pozitif")]
    Positive,
    #[serde(rename = "nötr")]
    Neutral,
    #[serde(rename = "negatif")]
    Negative,
}

impl Sentiment {
    pub const ALL: [Sentiment; 3] = [Sentiment::Positive, Sentiment::Neutral, Sentiment::Negative];

    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Positive => "pozitif",
            Self::Neutral => "nötr",
            Self::Negative => "negatif",
        }
    }
}

impl fmt::Display for Sentiment {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Error)]
#[error("unknown sentiment label: {0}")]
pub struct UnknownSentiment(pub String);

impl FromStr for Sentiment {
    type Err = UnknownSentiment;

    /// Accepts the stored Turkish labels as well as the English names external
    /// classifiers tend to return.
    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_lowercase().as_str() {
            "pozitif" | "positive" => Ok(Self::Positive),
            "nötr" | "notr" | "neutral" => Ok(Self::Neutral),
            "negatif" | "negative" => Ok(Self::Negative),
            _ => Err(UnknownSentiment(s.to_string())),
        }
    }
}

/// Delivery state of a private message. Only ever advances.
///
/// Serialized as its integer code (`0`, `1`, `2`), which is what the mobile and
/// web clients compare against.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(into = "u8", try_from = "u8")]
#[repr(u8)]
pub enum MessageStatus {
    Sent = 0,
    Delivered = 1,
    Read = 2,
}

impl MessageStatus {
    pub fn code(self) -> i64 {
        self as i64
    }

    pub fn from_code(code: i64) -> Option<Self> {
        match code {
            0 => Some(Self::Sent),
            1 => Some(Self::Delivered),
            2 => Some(Self::Read),
            _ => None,
        }
    }
}

impl From<MessageStatus> for u8 {
    fn from(status: MessageStatus) -> Self {
        status as u8
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Error)]
#[error("invalid message status code: {0}")]
pub struct InvalidStatus(pub u8);

impl TryFrom<u8> for MessageStatus {
    type Error = InvalidStatus;

    fn try_from(code: u8) -> Result<Self, Self::Error> {
        Self::from_code(code as i64).ok_or(InvalidStatus(code))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn sentiment_parses_turkish_and_english_labels() {
        assert_eq!("pozitif".parse::<Sentiment>().unwrap(), Sentiment::Positive);
        assert_eq!("NEGATIVE".parse::<Sentiment>().unwrap(), Sentiment::Negative);
        assert_eq!("nötr".parse::<Sentiment>().unwrap(), Sentiment::Neutral);
        assert!("LABEL_7".parse::<Sentiment>().is_err());
    }

    #[test]
    fn scores_serialize_with_label_keys() {
        let mut scores = SentimentScores::new();
        scores.insert(Sentiment::Positive, 0.85);
        scores.insert(Sentiment::Negative, 0.05);

        let json = serde_json::to_string(&scores).unwrap();
        assert_eq!(json, r#"{"pozitif":0.85,"negatif":0.05}"#);

        let back: SentimentScores = serde_json::from_str(&json).unwrap();
        assert_eq!(back, scores);
    }

    #[test]
    fn status_uses_integer_codes_on_the_wire() {
        assert_eq!(serde_json::to_string(&MessageStatus::Read).unwrap(), "2");
        let status: MessageStatus = serde_json::from_str("1").unwrap();
        assert_eq!(status, MessageStatus::Delivered);
        assert!(serde_json::from_str::<MessageStatus>("5").is_err());
    }

    #[test]
    fn status_order_follows_delivery() {
        assert!(MessageStatus::Sent < MessageStatus::Delivered);
        assert!(MessageStatus::Delivered < MessageStatus::Read);
    }
}
