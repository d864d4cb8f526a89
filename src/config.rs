use std::env;
use std::time::Duration;

use crate::error::{AppError, AppResult};

const DEFAULT_GITHUB_API_URL: &str = "https://api.github.com";
const DEFAULT_JAMAI_BASE_URL: &str = "https://api.jamaibase.com/api/v1";
const DEFAULT_BOT_VERSION: &str = "v1";
const DEFAULT_BOT_NAME: &str = "prwarden";
const DEFAULT_TIMEOUT_SECS: u64 = 120;

#[derive(Debug, Clone)]
pub struct AppConfig {
    pub github_token: Option<String>,
    pub github_api_url: String,
    pub jamai_base_url: String,
    pub jamai_api_key: Option<String>,
    pub jamai_project_id: Option<String>,
    pub bot_version: String,
    pub bot_name: String,
    pub request_timeout: Duration,
    pub scan_concurrency: usize,
    pub generation: GenerationConfig,
}

/// Model parameters applied to every generated column of a table.
#[derive(Debug, Clone, PartialEq)]
pub struct GenerationConfig {
    pub model: String,
    pub embedding_model: String,
    pub temperature: f32,
    pub max_tokens: u32,
    pub top_p: f32,
    pub rag: RagConfig,
}

#[derive(Debug, Clone, PartialEq)]
pub struct RagConfig {
    pub k: u32,
    pub reranking_model: String,
}

impl Default for GenerationConfig {
    fn default() -> Self {
        Self {
            model: "ellm/Qwen/Qwen2.5-72B-w8a8".to_string(),
            embedding_model: "ellm/BAAI/bge-m3".to_string(),
            temperature: 0.01,
            max_tokens: 2000,
            top_p: 0.001,
            rag: RagConfig {
                k: 5,
                reranking_model: "ellm/BAAI/bge-reranker-v2-m3".to_string(),
            },
        }
    }
}

impl AppConfig {
    pub fn load() -> AppResult<Self> {
        Self::from_lookup(|key| env::var(key).ok())
    }

    pub fn from_lookup<F>(lookup: F) -> AppResult<Self>
    where
        F: Fn(&str) -> Option<String>,
    {
        let read = |key: &str| {
            lookup(key)
                .map(|value| value.trim().to_string())
                .filter(|value| !value.is_empty())
        };

        // Applies per connect and per read of a response, not to the whole call.
        let request_timeout = match read("PRWARDEN_REQUEST_TIMEOUT_SECS") {
            Some(raw) => Duration::from_secs(parse_number(&raw, "PRWARDEN_REQUEST_TIMEOUT_SECS")?),
            None => Duration::from_secs(DEFAULT_TIMEOUT_SECS),
        };
        let scan_concurrency = match read("PRWARDEN_SCAN_CONCURRENCY") {
            Some(raw) => parse_number(&raw, "PRWARDEN_SCAN_CONCURRENCY")?.max(1) as usize,
            None => 1,
        };

        Ok(Self {
            github_token: read("PRWARDEN_GITHUB_TOKEN").or_else(|| read("GITHUB_TOKEN")),
            github_api_url: read("PRWARDEN_GITHUB_API_URL")
                .unwrap_or_else(|| DEFAULT_GITHUB_API_URL.to_string()),
            jamai_base_url: read("PRWARDEN_JAMAI_BASE_URL")
                .unwrap_or_else(|| DEFAULT_JAMAI_BASE_URL.to_string()),
            jamai_api_key: read("PRWARDEN_JAMAI_API_KEY"),
            jamai_project_id: read("PRWARDEN_JAMAI_PROJECT_ID"),
            bot_version: read("PRWARDEN_BOT_VERSION")
                .unwrap_or_else(|| DEFAULT_BOT_VERSION.to_string()),
            bot_name: read("PRWARDEN_BOT_NAME").unwrap_or_else(|| DEFAULT_BOT_NAME.to_string()),
            request_timeout,
            scan_concurrency,
            generation: GenerationConfig::default(),
        })
    }

    pub fn require_github_token(&self) -> AppResult<&str> {
        self.github_token.as_deref().ok_or_else(|| {
            AppError::Configuration(
                "GitHub token not configured (set PRWARDEN_GITHUB_TOKEN or GITHUB_TOKEN)"
                    .to_string(),
            )
        })
    }
}

fn parse_number(raw: &str, key: &str) -> AppResult<u64> {
    raw.parse::<u64>()
        .map_err(|err| AppError::Configuration(format!("{key} must be a number: {err}")))
}

#[cfg(test)]
mod tests {
    use std::collections::HashMap;

    use super::*;

    fn config_from(pairs: &[(&str, &str)]) -> AppResult<AppConfig> {
        let values: HashMap<String, String> = pairs
            .iter()
            .map(|(key, value)| (key.to_string(), value.to_string()))
            .collect();
        AppConfig::from_lookup(|key| values.get(key).cloned())
    }

    #[test]
    fn applies_defaults_when_environment_is_empty() {
        let config = config_from(&[]).expect("defaults should load");

        assert_eq!(config.github_api_url, DEFAULT_GITHUB_API_URL);
        assert_eq!(config.jamai_base_url, DEFAULT_JAMAI_BASE_URL);
        assert_eq!(config.bot_version, "v1");
        assert_eq!(config.scan_concurrency, 1);
        assert_eq!(config.request_timeout, Duration::from_secs(120));
        assert!(config.github_token.is_none());
        assert!(config.require_github_token().is_err());
    }

    #[test]
    fn falls_back_to_plain_github_token() {
        let config = config_from(&[("GITHUB_TOKEN", "ghp_plain")]).expect("config should load");
        assert_eq!(config.require_github_token().ok(), Some("ghp_plain"));

        let config = config_from(&[
            ("GITHUB_TOKEN", "ghp_plain"),
            ("PRWARDEN_GITHUB_TOKEN", "ghp_specific"),
        ])
        .expect("config should load");
        assert_eq!(config.github_token.as_deref(), Some("ghp_specific"));
    }

    #[test]
    fn clamps_concurrency_and_rejects_garbage_numbers() {
        let config = config_from(&[("PRWARDEN_SCAN_CONCURRENCY", "0")]).expect("config should load");
        assert_eq!(config.scan_concurrency, 1);

        let error = config_from(&[("PRWARDEN_REQUEST_TIMEOUT_SECS", "soon")])
            .expect_err("non-numeric timeout should fail");
        assert!(matches!(error, AppError::Configuration(_)));
    }

    #[test]
    fn blank_values_count_as_unset() {
        let config = config_from(&[("PRWARDEN_BOT_NAME", "   ")]).expect("config should load");
        assert_eq!(config.bot_name, "prwarden");
    }
}
