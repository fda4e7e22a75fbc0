//! Client for an OpenAI-compatible model gateway.
//!
//! Both article drafting (chat completion) and header image generation
//! (image-and-text completion with an inline base64 payload) go through
//! the same `/v1/chat/completions` endpoint. The base URL is injected so
//! tests can point the client at a local mock server.

use base64::Engine;
use base64::engine::general_purpose::STANDARD as BASE64;
use reqwest::Client;
use serde::{Deserialize, Serialize};
use serde_json::json;
use thiserror::Error;
use tracing::instrument;

#[derive(Error, Debug)]
pub enum LlmError {
    #[error("gateway returned {status}: {body}")]
    Http { status: reqwest::StatusCode, body: String },

    #[error("gateway request failed: {0}")]
    Request(#[from] reqwest::Error),

    #[error("completion contained no text content")]
    EmptyCompletion,

    #[error("completion contained no image payload")]
    MissingImage,

    #[error("image payload is not valid base64: {0}")]
    ImageDecode(#[from] base64::DecodeError),
}

pub struct LlmClient {
    http: Client,
    base_url: String,
    api_key: String,
    text_model: String,
    image_model: String,
}

#[derive(Debug, Serialize)]
struct ChatMessage<'a> {
    role: &'a str,
    content: &'a str,
}

#[derive(Debug, Deserialize)]
struct ChatResponse {
    choices: Vec<Choice>,
}

#[derive(Debug, Deserialize)]
struct Choice {
    message: CompletionMessage,
}

#[derive(Debug, Deserialize)]
struct CompletionMessage {
    #[serde(default)]
    content: Option<String>,
    #[serde(default)]
    images: Vec<ImagePart>,
}

#[derive(Debug, Deserialize)]
struct ImagePart {
    image_url: ImageUrl,
}

#[derive(Debug, Deserialize)]
struct ImageUrl {
    /// A `data:image/png;base64,...` URL.
    url: String,
}

impl LlmClient {
    pub fn new(
        http: Client,
        base_url: &str,
        api_key: &str,
        text_model: &str,
        image_model: &str,
    ) -> Self {
        Self {
            http,
            base_url: base_url.trim_end_matches('/').to_string(),
            api_key: api_key.to_string(),
            text_model: text_model.to_string(),
            image_model: image_model.to_string(),
        }
    }

    /// One system/user exchange, returning the raw completion text.
    #[instrument(skip_all, fields(model = %self.text_model))]
    pub async fn chat(&self, system: &str, user: &str) -> Result<String, LlmError> {
        let body = json!({
            "model": self.text_model,
            "messages": [
                ChatMessage { role: "system", content: system },
                ChatMessage { role: "user", content: user },
            ],
        });

        let response = self.send(&body).await?;
        response
            .choices
            .into_iter()
            .next()
            .and_then(|c| c.message.content)
            .filter(|content| !content.is_empty())
            .ok_or(LlmError::EmptyCompletion)
    }

    /// Request an image-and-text completion and decode the inline base64
    /// image from the first choice.
    #[instrument(skip_all, fields(model = %self.image_model))]
    pub async fn generate_image(&self, prompt: &str) -> Result<Vec<u8>, LlmError> {
        let body = json!({
            "model": self.image_model,
            "messages": [ChatMessage { role: "user", content: prompt }],
            "modalities": ["image", "text"],
        });

        let response = self.send(&body).await?;
        let data_url = response
            .choices
            .into_iter()
            .next()
            .and_then(|c| c.message.images.into_iter().next())
            .map(|part| part.image_url.url)
            .ok_or(LlmError::MissingImage)?;

        let encoded = data_url
            .split_once("base64,")
            .map(|(_, rest)| rest)
            .ok_or(LlmError::MissingImage)?;

        Ok(BASE64.decode(encoded)?)
    }

    async fn send(&self, body: &serde_json::Value) -> Result<ChatResponse, LlmError> {
        let response = self
            .http
            .post(format!("{}/v1/chat/completions", self.base_url))
            .bearer_auth(&self.api_key)
            .json(body)
            .send()
            .await?;

        let status = response.status();
        if !status.is_success() {
            let body = response.text().await.unwrap_or_default();
            return Err(LlmError::Http { status, body });
        }

        Ok(response.json::<ChatResponse>().await?)
    }
}
