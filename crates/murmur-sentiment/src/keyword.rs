use async_trait::async_trait;

use murmur_types::models::{Sentiment, SentimentScores};

use crate::{Annotation, SentimentClassifier, SentimentError};

const DEFAULT_POSITIVE: &[&str] = &["harika", "mutlu", "güzel", "iyi", "mükemmel", "süper"];
const DEFAULT_NEGATIVE: &[&str] = &["kötü", "üzgün", "memnun değil", "istemiyorum", "berbat", "kızgın"];

const MATCHED_SCORE: f64 = 0.85;
const OTHER_SCORE: f64 = 0.05;

/// Substring keyword matcher. Positive keywords win over negative ones;
/// no match is neutral.
#[derive(Debug, Clone)]
pub struct KeywordClassifier {
    positive: Vec<String>,
    negative: Vec<String>,
}

impl KeywordClassifier {
    pub fn new<P, N>(positive: P, negative: N) -> Self
    where
        P: IntoIterator,
        P::Item: AsRef<str>,
        N: IntoIterator,
        N::Item: AsRef<str>,
    {
        Self {
            positive: positive.into_iter().map(|k| fold_case(k.as_ref())).collect(),
            negative: negative.into_iter().map(|k| fold_case(k.as_ref())).collect(),
        }
    }

    pub fn label(&self, text: &str) -> Sentiment {
        let text = fold_case(text);

        if self.positive.iter().any(|k| text.contains(k.as_str())) {
            Sentiment::Positive
        } else if self.negative.iter().any(|k| text.contains(k.as_str())) {
            Sentiment::Negative
        } else {
            Sentiment::Neutral
        }
    }
}

/// Lowercases one char at a time. `İ` becomes a plain `i`, not `i` plus
/// a combining dot.
fn fold_case(text: &str) -> String {
    text.chars()
        .flat_map(|c| match c {
            'İ' => 'i'.to_lowercase(),
            c => c.to_lowercase(),
        })
        .collect()
}

impl Default for KeywordClassifier {
    fn default() -> Self {
        Self::new(DEFAULT_POSITIVE, DEFAULT_NEGATIVE)
    }
}

#[async_trait]
impl SentimentClassifier for KeywordClassifier {
    async fn classify(&self, text: &str) -> Result<Annotation, SentimentError> {
        if text.trim().is_empty() {
            return Err(SentimentError::EmptyText);
        }

        let label = self.label(text);
        let scores: SentimentScores = Sentiment::ALL
            .into_iter()
            .map(|s| (s, if s == label { MATCHED_SCORE } else { OTHER_SCORE }))
            .collect();

        Ok(Annotation { label, confidence: MATCHED_SCORE, scores })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn matches_case_insensitively() {
        let classifier = KeywordClassifier::default();
        assert_eq!(classifier.label("Gerçekten SÜPER oldu"), Sentiment::Positive);
        assert_eq!(classifier.label("Çok KÖTÜ bir hafta"), Sentiment::Negative);
        assert_eq!(classifier.label("Normal bir gün geçirdim."), Sentiment::Neutral);
    }

    #[test]
    fn turkish_dotted_capital_i() {
        let classifier = KeywordClassifier::default();
        assert_eq!(classifier.label("İyi günler"), Sentiment::Positive);
        assert_eq!(classifier.label("İSTEMİYORUM"), Sentiment::Negative);
        assert_eq!(classifier.label("HARİKA"), Sentiment::Positive);
    }

    #[test]
    fn positive_beats_negative() {
        let classifier = KeywordClassifier::default();
        assert_eq!(classifier.label("berbat başladı ama güzel bitti"), Sentiment::Positive);
    }

    #[test]
    fn multi_word_keywords() {
        let classifier = KeywordClassifier::default();
        assert_eq!(classifier.label("Bu durumdan hiç memnun değilim."), Sentiment::Negative);
    }

    #[test]
    fn keyword_sets_are_replaceable() {
        let classifier = KeywordClassifier::new(["great"], ["awful"]);
        assert_eq!(classifier.label("What a GREAT day"), Sentiment::Positive);
        assert_eq!(classifier.label("awful"), Sentiment::Negative);
        assert_eq!(classifier.label("harika"), Sentiment::Neutral);
    }

    #[tokio::test]
    async fn scores_favour_the_chosen_label() {
        let annotation = KeywordClassifier::default().classify("üzgünüm").await.unwrap();
        assert_eq!(annotation.label, Sentiment::Negative);
        assert_eq!(annotation.confidence, 0.85);
        assert_eq!(annotation.scores[&Sentiment::Negative], 0.85);
        assert_eq!(annotation.scores[&Sentiment::Positive], 0.05);
        assert_eq!(annotation.scores[&Sentiment::Neutral], 0.05);
    }

    #[tokio::test]
    async fn blank_text_is_an_error() {
        let result = KeywordClassifier::default().classify("   ").await;
        assert!(matches!(result, Err(SentimentError::EmptyText)));
    }
}
