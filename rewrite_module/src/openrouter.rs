use reqwest::StatusCode;
use serde::Serialize;
use serde_json::{json, Value};
use tracing::error;

pub const OPENROUTER_API_BASE: &str = "https://openrouter.ai/api/v1";
const OPENROUTER_REFERER: &str = "https://digitalriver-droplet.example";
const OPENROUTER_TITLE: &str = "Notion Rewriter";

#[derive(Debug, thiserror::Error)]
pub enum OpenRouterError {
    #[error("http error: {0}")]
    Http(#[from] reqwest::Error),
    #[error("openrouter api error: HTTP {status}: {body}")]
    Api { status: StatusCode, body: String },
    #[error("received empty response from language model")]
    EmptyCompletion,
}

#[derive(Debug, Clone, Serialize)]
pub struct ChatMessage {
    pub role: String,
    pub content: String,
}

impl ChatMessage {
    pub fn system(content: impl Into<String>) -> Self {
        Self {
            role: "system".to_string(),
            content: content.into(),
        }
    }

    pub fn user(content: impl Into<String>) -> Self {
        Self {
            role: "user".to_string(),
            content: content.into(),
        }
    }
}

/// Client for the OpenRouter chat-completions endpoint.
#[derive(Debug, Clone)]
pub struct OpenRouterClient {
    http: reqwest::Client,
    api_key: String,
    model: String,
    base_url: String,
}

impl OpenRouterClient {
    pub fn new(api_key: impl Into<String>, model: impl Into<String>) -> Self {
        Self::with_base_url(api_key, model, OPENROUTER_API_BASE)
    }

    pub fn with_base_url(
        api_key: impl Into<String>,
        model: impl Into<String>,
        base_url: impl Into<String>,
    ) -> Self {
        Self {
            http: reqwest::Client::new(),
            api_key: api_key.into(),
            model: model.into(),
            base_url: base_url.into().trim_end_matches('/').to_string(),
        }
    }

    /// Run one chat completion and return the textual completion. Fails if
    /// the response carries no non-empty string content.
    pub async fn chat_completion(
        &self,
        messages: &[ChatMessage],
        temperature: f64,
    ) -> Result<String, OpenRouterError> {
        let payload = json!({
            "model": self.model,
            "messages": messages,
            "temperature": temperature,
        });

        let response = self
            .http
            .post(format!("{}/chat/completions", self.base_url))
            .bearer_auth(&self.api_key)
            .header("HTTP-Referer", OPENROUTER_REFERER)
            .header("X-Title", OPENROUTER_TITLE)
            .json(&payload)
            .send()
            .await?;

        if !response.status().is_success() {
            let status = response.status();
            let body = response.text().await.unwrap_or_default();
            error!("openrouter chat completion failed: {} - {}", status, body);
            return Err(OpenRouterError::Api { status, body });
        }

        let body: Value = response.json().await?;
        body.get("choices")
            .and_then(|choices| choices.get(0))
            .and_then(|choice| choice.get("message"))
            .and_then(|message| message.get("content"))
            .and_then(Value::as_str)
            .map(str::to_string)
            .filter(|content| !content.is_empty())
            .ok_or(OpenRouterError::EmptyCompletion)
    }
}
