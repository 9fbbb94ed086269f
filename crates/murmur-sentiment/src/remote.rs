use std::collections::HashMap;

use async_trait::async_trait;
use serde::Deserialize;
use serde_json::{Value, json};

use murmur_types::models::{Sentiment, SentimentScores};

use crate::{Annotation, SentimentClassifier, SentimentError};

/// Classifier backed by the hosted sentiment model (a Gradio-style
/// `/api/predict` endpoint).
///
/// Request: `{"data": ["<text>"]}`. Response: `{"data": [result]}` where
/// `result` is the prediction object or that object encoded as a JSON string.
#[derive(Debug, Clone)]
pub struct HttpClassifier {
    client: reqwest::Client,
    url: String,
}

impl HttpClassifier {
    pub fn new(url: impl Into<String>) -> Self {
        Self {
            client: reqwest::Client::new(),
            url: url.into(),
        }
    }
}

#[async_trait]
impl SentimentClassifier for HttpClassifier {
    async fn classify(&self, text: &str) -> Result<Annotation, SentimentError> {
        if text.trim().is_empty() {
            return Err(SentimentError::EmptyText);
        }

        let body: Value = self
            .client
            .post(&self.url)
            .json(&json!({ "data": [text] }))
            .send()
            .await?
            .error_for_status()?
            .json()
            .await?;

        parse_prediction(body)
    }
}

#[derive(Debug, Deserialize)]
struct Prediction {
    sentiment: Option<String>,
    confidence: Option<f64>,
    #[serde(default)]
    scores: HashMap<String, f64>,
    error: Option<String>,
}

fn parse_prediction(body: Value) -> Result<Annotation, SentimentError> {
    let result = match body.get("data").and_then(|data| data.get(0)) {
        Some(result) => result.clone(),
        None => body,
    };

    let prediction: Prediction = match result {
        Value::String(encoded) => serde_json::from_str(&encoded),
        other => serde_json::from_value(other),
    }
    .map_err(|e| SentimentError::Malformed(e.to_string()))?;

    if let Some(error) = prediction.error {
        return Err(SentimentError::Remote(error));
    }

    let label: Sentiment = prediction
        .sentiment
        .ok_or_else(|| SentimentError::Malformed("missing sentiment".into()))?
        .parse()?;

    let scores = prediction
        .scores
        .iter()
        .map(|(name, score)| -> Result<(Sentiment, f64), SentimentError> {
            Ok((name.parse()?, *score))
        })
        .collect::<Result<SentimentScores, _>>()?;

    let confidence = prediction
        .confidence
        .or_else(|| scores.get(&label).copied())
        .ok_or_else(|| SentimentError::Malformed("missing confidence".into()))?;

    Ok(Annotation { label, confidence, scores })
}
