//! Environment-driven configuration
//!
//! Loaded once at startup (after `.env`, when present) and passed explicitly
//! to whatever needs it.

use crate::llm::OpenAIConfig;
use crate::tools::CatApiConfig;
use std::path::PathBuf;
use std::str::FromStr;
use std::time::Duration;
use thiserror::Error;

const DEFAULT_DB_PATH: &str = "./chat_history.db";
const DEFAULT_PORT: u16 = 5000;
const DEFAULT_CORS_ORIGIN: &str = "http://localhost:3000";
const DEFAULT_LLM_TIMEOUT_SECS: u64 = 60;
const DEFAULT_CAT_API_TIMEOUT_SECS: u64 = 10;
const DEFAULT_TURN_TIMEOUT_SECS: u64 = 120;

#[derive(Debug, Error, PartialEq, Eq)]
pub enum ConfigError {
    #[error("Missing required environment variable {0}")]
    MissingVar(&'static str),
}

#[derive(Debug, Clone)]
pub struct AppConfig {
    pub openai: OpenAIConfig,
    /// Model for the follow-up call after a tool result
    pub followup_model: Option<String>,
    pub cat_api: CatApiConfig,
    pub db_path: PathBuf,
    pub port: u16,
    pub cors_allowed_origins: Vec<String>,
    /// Outer deadline for one chat turn
    pub turn_timeout: Duration,
}

impl AppConfig {
    /// Load configuration from environment variables
    pub fn from_env() -> Result<Self, ConfigError> {
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    fn from_lookup(lookup: impl Fn(&str) -> Option<String>) -> Result<Self, ConfigError> {
        // Blank values count as unset
        let var = |key: &str| lookup(key).filter(|v| !v.trim().is_empty());

        let api_key = var("OPENAI_API_KEY").ok_or(ConfigError::MissingVar("OPENAI_API_KEY"))?;
        let mut openai = OpenAIConfig::new(api_key);
        if let Some(url) = var("OPENAI_BASE_URL") {
            openai.base_url = url;
        }
        if let Some(model) = var("OPENAI_MODEL") {
            openai.model = model;
        }
        openai.timeout = secs(parsed(&var, "LLM_TIMEOUT_SECS", DEFAULT_LLM_TIMEOUT_SECS));

        let mut cat_api = CatApiConfig {
            api_key: var("CAT_API_KEY"),
            timeout: secs(parsed(&var, "CAT_API_TIMEOUT_SECS", DEFAULT_CAT_API_TIMEOUT_SECS)),
            ..CatApiConfig::default()
        };
        if let Some(url) = var("CAT_API_BASE_URL") {
            cat_api.base_url = url;
        }

        let cors_allowed_origins = var("CORS_ALLOWED_ORIGINS")
            .unwrap_or_else(|| DEFAULT_CORS_ORIGIN.to_string())
            .split(',')
            .map(str::trim)
            .filter(|o| !o.is_empty())
            .map(String::from)
            .collect();

        Ok(Self {
            openai,
            followup_model: var("OPENAI_FOLLOWUP_MODEL"),
            cat_api,
            db_path: PathBuf::from(
                var("CATBOT_DB_PATH").unwrap_or_else(|| DEFAULT_DB_PATH.to_string()),
            ),
            port: parsed(&var, "CATBOT_PORT", DEFAULT_PORT),
            cors_allowed_origins,
            turn_timeout: secs(parsed(&var, "TURN_TIMEOUT_SECS", DEFAULT_TURN_TIMEOUT_SECS)),
        })
    }
}

/// Parse a numeric setting, falling back to the default when unparseable
fn parsed<T: FromStr>(var: &impl Fn(&str) -> Option<String>, key: &str, default: T) -> T {
    match var(key) {
        Some(raw) => raw.trim().parse().unwrap_or_else(|_| {
            tracing::warn!(key = %key, value = %raw, "Ignoring unparseable setting");
            default
        }),
        None => default,
    }
}

fn secs(n: u64) -> Duration {
    Duration::from_secs(n)
}
