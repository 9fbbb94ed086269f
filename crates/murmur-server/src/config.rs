use std::path::PathBuf;
use std::time::Duration;

use anyhow::{Context, Result};

#[derive(Debug, Clone, PartialEq)]
pub struct Config {
    pub host: String,
    pub port: u16,
    pub db_path: PathBuf,
    /// Remote model endpoint. `None` selects the built-in keyword classifier.
    pub sentiment_url: Option<String>,
    pub sentiment_timeout: Duration,
    pub seed_demo: bool,
}

impl Config {
    pub fn from_env() -> Result<Self> {
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    fn from_lookup(var: impl Fn(&str) -> Option<String>) -> Result<Self> {
        let host = var("MURMUR_HOST").unwrap_or_else(|| "0.0.0.0".into());
        let port: u16 = var("MURMUR_PORT")
            .unwrap_or_else(|| "5000".into())
            .parse()
            .context("MURMUR_PORT must be a port number")?;
        let db_path: PathBuf = var("MURMUR_DB_PATH")
            .unwrap_or_else(|| "murmur.db".into())
            .into();
        let sentiment_url = var("MURMUR_SENTIMENT_URL").filter(|url| !url.trim().is_empty());
        let timeout_ms: u64 = var("MURMUR_SENTIMENT_TIMEOUT_MS")
            .unwrap_or_else(|| "2000".into())
            .parse()
            .context("MURMUR_SENTIMENT_TIMEOUT_MS must be a number of milliseconds")?;
        let seed_demo = var("MURMUR_SEED_DEMO")
            .map(|v| matches!(v.to_ascii_lowercase().as_str(), "1" | "true" | "yes"))
            .unwrap_or(false);

        Ok(Self {
            host,
            port,
            db_path,
            sentiment_url,
            sentiment_timeout: Duration::from_millis(timeout_ms),
            seed_demo,
        })
    }
}

#[cfg(test)]
mod tests {
    use std::collections::HashMap;

    use super::*;

    fn load(pairs: &[(&str, &str)]) -> Result<Config> {
        let vars: HashMap<String, String> = pairs
            .iter()
            .map(|(k, v)| (k.to_string(), v.to_string()))
            .collect();
        Config::from_lookup(|key| vars.get(key).cloned())
    }

    #[test]
    fn defaults() {
        let config = load(&[]).unwrap();
        assert_eq!(config.host, "0.0.0.0");
        assert_eq!(config.port, 5000);
        assert_eq!(config.db_path, PathBuf::from("murmur.db"));
        assert_eq!(config.sentiment_url, None);
        assert_eq!(config.sentiment_timeout, Duration::from_secs(2));
        assert!(!config.seed_demo);
    }

    #[test]
    fn overrides() {
        let config = load(&[
            ("MURMUR_PORT", "8080"),
            ("MURMUR_SENTIMENT_URL", "http://localhost:7860/api/predict"),
            ("MURMUR_SENTIMENT_TIMEOUT_MS", "500"),
            ("MURMUR_SEED_DEMO", "TRUE"),
        ])
        .unwrap();
        assert_eq!(config.port, 8080);
        assert_eq!(config.sentiment_url.as_deref(), Some("http://localhost:7860/api/predict"));
        assert_eq!(config.sentiment_timeout, Duration::from_millis(500));
        assert!(config.seed_demo);
    }

    #[test]
    fn blank_url_means_keyword_classifier() {
        let config = load(&[("MURMUR_SENTIMENT_URL", "  ")]).unwrap();
        assert_eq!(config.sentiment_url, None);
    }

    #[test]
    fn bad_numbers_fail() {
        assert!(load(&[("MURMUR_PORT", "http")]).is_err());
        assert!(load(&[("MURMUR_SENTIMENT_TIMEOUT_MS", "-1")]).is_err());
    }
}
