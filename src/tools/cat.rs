//! Random cat lookup backed by `TheCatAPI`

use super::{Tool, ToolOutput};
use async_trait::async_trait;
use reqwest::Client;
use serde::{Deserialize, Serialize};
use serde_json::{json, Value};
use std::time::Duration;
use thiserror::Error;

pub const DEFAULT_CAT_API_BASE_URL: &str = "https://api.thecatapi.com";

const MIN_LIMIT: u8 = 1;
const MAX_LIMIT: u8 = 10;

const RANDOM_CAT_TEXT: &str = "Here's a cute random cat!";
const FALLBACK_TEXT: &str = "Could not fetch any cats right now 😿";

#[derive(Debug, Error)]
pub enum CatApiError {
    #[error("Cat API request failed: {0}")]
    Request(#[from] reqwest::Error),
    #[error("Cat API returned HTTP {status}: {body}")]
    Status { status: u16, body: String },
    #[error("Cat API returned an undecodable body: {0}")]
    Decode(#[from] serde_json::Error),
    #[error("Cat API returned no images")]
    Empty,
}

/// One entry of a tool result
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum CatResult {
    /// Image with breed metadata (first listed breed only)
    Breed {
        name: String,
        description: String,
        origin: String,
        image_url: String,
    },
    /// Uncataloged image
    Image { text: String, image_url: String },
    /// Upstream failure, with user-facing text
    Error { error: String },
}

impl CatResult {
    pub fn fallback() -> Self {
        CatResult::Error {
            error: FALLBACK_TEXT.to_string(),
        }
    }

    fn from_item(item: CatApiImage) -> Self {
        match item.breeds.unwrap_or_default().into_iter().next() {
            Some(breed) => CatResult::Breed {
                name: breed.name,
                description: breed.description,
                origin: breed.origin.unwrap_or_else(|| "Unknown".to_string()),
                image_url: item.url,
            },
            None => CatResult::Image {
                text: RANDOM_CAT_TEXT.to_string(),
                image_url: item.url,
            },
        }
    }
}

/// Parsed `get_random_cat` arguments
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct CatSearchArgs {
    pub limit: u8,
}

impl Default for CatSearchArgs {
    fn default() -> Self {
        Self { limit: MIN_LIMIT }
    }
}

impl CatSearchArgs {
    /// Lenient parse. Integers, whole-number strings like `"3"` and floats
    /// (truncated toward zero) are clamped into `[1, 10]`. Anything else,
    /// or no `limit` at all, is 1.
    pub fn from_arguments(arguments: Option<&Value>) -> Self {
        let Some(limit) = arguments.and_then(|a| a.get("limit")) else {
            return Self::default();
        };

        let Some(n) = integer_limit(limit) else {
            tracing::debug!(limit = %limit, "Non-numeric limit, using default");
            return Self::default();
        };

        let clamped = n.clamp(i64::from(MIN_LIMIT), i64::from(MAX_LIMIT));
        Self {
            limit: u8::try_from(clamped).unwrap_or(MIN_LIMIT),
        }
    }
}

#[allow(clippy::cast_possible_truncation)] // Float to int casts saturate
fn integer_limit(value: &Value) -> Option<i64> {
    match value {
        Value::Number(n) => n
            .as_i64()
            .or_else(|| n.as_u64().map(|_| i64::MAX))
            .or_else(|| n.as_f64().filter(|f| f.is_finite()).map(|f| f.trunc() as i64)),
        Value::String(s) => s.trim().parse().ok(),
        _ => None,
    }
}

/// Connection settings for `TheCatAPI`
#[derive(Debug, Clone)]
pub struct CatApiConfig {
    /// Sent as `x-api-key` when present
    pub api_key: Option<String>,
    pub base_url: String,
    pub timeout: Duration,
}

impl Default for CatApiConfig {
    fn default() -> Self {
        Self {
            api_key: None,
            base_url: DEFAULT_CAT_API_BASE_URL.to_string(),
            timeout: Duration::from_secs(10),
        }
    }
}

/// HTTP client for the image search endpoint
#[derive(Clone)]
pub struct CatApiClient {
    client: Client,
    endpoint: String,
    api_key: Option<String>,
}

impl CatApiClient {
    pub fn new(config: CatApiConfig) -> Result<Self, CatApiError> {
        let client = Client::builder().timeout(config.timeout).build()?;
        Ok(Self {
            client,
            endpoint: format!(
                "{}/v1/images/search",
                config.base_url.trim_end_matches('/')
            ),
            api_key: config.api_key,
        })
    }

    /// Fetch `limit` random images. No retries.
    pub async fn search(&self, limit: u8) -> Result<Vec<CatResult>, CatApiError> {
        let mut request = self
            .client
            .get(&self.endpoint)
            .query(&[("limit", limit)]);
        if let Some(key) = &self.api_key {
            request = request.header("x-api-key", key);
        }

        let response = request.send().await?;
        let status = response.status();
        let body = response.text().await?;

        if !status.is_success() {
            return Err(CatApiError::Status {
                status: status.as_u16(),
                body,
            });
        }

        let images: Vec<CatApiImage> = serde_json::from_str(&body)?;
        if images.is_empty() {
            return Err(CatApiError::Empty);
        }

        Ok(images.into_iter().map(CatResult::from_item).collect())
    }
}

#[derive(Debug, Deserialize)]
struct CatApiImage {
    url: String,
    #[serde(default)]
    breeds: Option<Vec<CatApiBreed>>,
}

#[derive(Debug, Deserialize)]
struct CatApiBreed {
    name: String,
    #[serde(default)]
    description: String,
    #[serde(default)]
    origin: Option<String>,
}

/// The `get_random_cat` tool
pub struct CatTool {
    client: CatApiClient,
}

impl CatTool {
    pub fn new(client: CatApiClient) -> Self {
        Self { client }
    }
}

#[async_trait]
impl Tool for CatTool {
    fn name(&self) -> &'static str {
        "get_random_cat"
    }

    fn description(&self) -> String {
        "Get random cat images and breed info from TheCatAPI. \
         Use when the user asks to see a cat or wants to know about cat breeds."
            .to_string()
    }

    fn input_schema(&self) -> Value {
        json!({
            "type": "object",
            "properties": {
                "limit": {
                    "type": "integer",
                    "description": "How many cat images to fetch",
                    "minimum": MIN_LIMIT,
                    "maximum": MAX_LIMIT
                }
            },
            "required": []
        })
    }

    async fn run(&self, arguments: Option<Value>) -> ToolOutput {
        let args = CatSearchArgs::from_arguments(arguments.as_ref());

        match self.client.search(args.limit).await {
            Ok(results) => match serde_json::to_string(&results) {
                Ok(payload) => ToolOutput::success(payload),
                Err(e) => ToolOutput::error(format!("Failed to encode cat results: {e}")),
            },
            Err(e) => {
                tracing::warn!(error = %e, limit = args.limit, "Cat lookup failed");
                match serde_json::to_string(&CatResult::fallback()) {
                    Ok(payload) => ToolOutput::error(payload),
                    Err(_) => ToolOutput::error(FALLBACK_TEXT),
                }
            }
        }
    }
}
