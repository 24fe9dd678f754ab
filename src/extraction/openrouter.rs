use std::fmt;

use async_trait::async_trait;
use serde::{Deserialize, Serialize};

use crate::common::Frame;
use crate::config::VisionConfig;
use crate::error::{ExtractionError, ScanError};
use crate::extraction::{ImagePayload, NameExtractor, UNKNOWN_NAME};

pub const EXTRACTION_PROMPT: &str = "Analyze this image of an ID card or badge.
1. Extract the full name of the person shown.
2. Usually, it's the most prominent name on the card.
3. Return ONLY the name. No other text or explanation.
4. If no name can be found, return \"Unknown\".";

pub const MISSING_KEY_MESSAGE: &str =
    "OCR Service not configured. Please add OPENROUTER_API_KEY to your environment.";

const FALLBACK_API_ERROR: &str = "Failed to communicate with OpenRouter.";

/// Chat-completions vision client (OpenRouter or any compatible endpoint).
pub struct OpenRouterExtractor {
    http: reqwest::Client,
    endpoint: String,
    model: String,
    api_key: Option<String>,
    referer: String,
    title: String,
}

impl fmt::Debug for OpenRouterExtractor {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("OpenRouterExtractor")
            .field("endpoint", &self.endpoint)
            .field("model", &self.model)
            .field("api_key", &self.api_key.as_ref().map(|_| "<redacted>"))
            .finish()
    }
}

#[derive(Serialize)]
struct ChatRequest<'a> {
    model: &'a str,
    messages: Vec<ChatMessage<'a>>,
}

#[derive(Serialize)]
struct ChatMessage<'a> {
    role: &'static str,
    content: Vec<ContentPart<'a>>,
}

#[derive(Serialize)]
#[serde(tag = "type", rename_all = "snake_case")]
enum ContentPart<'a> {
    Text { text: &'a str },
    ImageUrl { image_url: ImageUrl },
}

#[derive(Serialize)]
struct ImageUrl {
    url: String,
}

#[derive(Deserialize)]
struct ChatResponse {
    #[serde(default)]
    choices: Vec<Choice>,
}

#[derive(Deserialize)]
struct Choice {
    #[serde(default)]
    message: Option<ChoiceMessage>,
}

#[derive(Deserialize)]
struct ChoiceMessage {
    #[serde(default)]
    content: Option<String>,
}

#[derive(Deserialize)]
struct ErrorBody {
    #[serde(default)]
    error: Option<ErrorDetail>,
}

#[derive(Deserialize)]
struct ErrorDetail {
    #[serde(default)]
    message: Option<String>,
}

impl OpenRouterExtractor {
    pub fn new(config: &VisionConfig) -> Self {
        Self {
            http: reqwest::Client::new(),
            endpoint: config.endpoint.clone(),
            model: config.model.clone(),
            api_key: config
                .api_key
                .clone()
                .filter(|key| !key.trim().is_empty()),
            referer: config.referer.clone(),
            title: config.title.clone(),
        }
    }

    fn api_key(&self) -> Result<&str, ScanError> {
        self.api_key
            .as_deref()
            .ok_or_else(|| ScanError::Configuration(MISSING_KEY_MESSAGE.to_string()))
    }

    /// Sends an already encoded still and returns the model's raw answer.
    pub async fn extract_payload(&self, payload: &ImagePayload) -> Result<String, ExtractionError> {
        let api_key = self
            .api_key()
            .map_err(|e| ExtractionError::Api(e.to_string()))?;

        let request = ChatRequest {
            model: &self.model,
            messages: vec![ChatMessage {
                role: "user",
                content: vec![
                    ContentPart::Text {
                        text: EXTRACTION_PROMPT,
                    },
                    ContentPart::ImageUrl {
                        image_url: ImageUrl {
                            url: payload.to_data_uri(),
                        },
                    },
                ],
            }],
        };

        let response = self
            .http
            .post(&self.endpoint)
            .bearer_auth(api_key)
            .header("HTTP-Referer", &self.referer)
            .header("X-Title", &self.title)
            .json(&request)
            .send()
            .await?;

        let status = response.status();
        if !status.is_success() {
            let message = response
                .json::<ErrorBody>()
                .await
                .ok()
                .and_then(|body| body.error)
                .and_then(|detail| detail.message)
                .unwrap_or_else(|| FALLBACK_API_ERROR.to_string());
            tracing::error!("Vision endpoint returned {}: {}", status, message);
            return Err(ExtractionError::Api(message));
        }

        let body = response.text().await?;
        let content = serde_json::from_str::<ChatResponse>(&body)
            .map_err(|e| ExtractionError::Api(format!("Malformed response from vision endpoint: {e}")))?
            .choices
            .into_iter()
            .next()
            .and_then(|choice| choice.message)
            .and_then(|message| message.content)
            .map(|content| content.trim().to_string())
            .filter(|content| !content.is_empty());

        Ok(content.unwrap_or_else(|| UNKNOWN_NAME.to_string()))
    }

    /// Convenience for callers holding a browser-style screenshot string.
    pub async fn extract_data_uri(&self, data_uri: &str) -> Result<String, ExtractionError> {
        let payload = ImagePayload::from_data_uri(data_uri)?;
        self.extract_payload(&payload).await
    }
}

#[async_trait]
impl NameExtractor for OpenRouterExtractor {
    fn ensure_configured(&self) -> Result<(), ScanError> {
        self.api_key().map(|_| ())
    }

    async fn extract(&self, frame: Frame) -> Result<String, ExtractionError> {
        let payload = ImagePayload::from_frame(&frame)?;
        drop(frame);
        self.extract_payload(&payload).await
    }

    fn name(&self) -> &'static str {
        "OpenRouterExtractor"
    }
}
