use super::response::parse_result;
use super::traits::RewriteEngine;
use crate::config::EngineConfig;
use crate::cycle::{RewriteRequest, RewriteResult};
use crate::error::CycleError;
use crate::util::api_error_message;
use async_trait::async_trait;
use reqwest::Client;
use serde::{Deserialize, Serialize};
use std::time::Duration;

/// OpenAI-compatible chat-completions client. Works against api.openai.com
/// and any endpoint speaking the same `/chat/completions` format.
pub struct OpenAiEngine {
    /// Pre-computed `"Bearer <key>"` header value (avoids `format!` per request).
    cached_auth_header: Option<String>,
    /// Pre-computed chat completions URL.
    cached_chat_url: String,
    model: String,
    temperature: f64,
    max_tokens: u32,
    client: Client,
}

#[derive(Debug, Serialize)]
struct ChatRequest {
    model: String,
    messages: Vec<Message>,
    temperature: f64,
    max_tokens: u32,
    #[serde(skip_serializing_if = "Option::is_none")]
    response_format: Option<ResponseFormat>,
}

#[derive(Debug, Serialize)]
struct Message {
    role: &'static str,
    content: String,
}

#[derive(Debug, Serialize)]
struct ResponseFormat {
    #[serde(rename = "type")]
    kind: &'static str,
}

#[derive(Debug, Deserialize)]
struct ChatResponse {
    choices: Vec<Choice>,
}

#[derive(Debug, Deserialize)]
struct Choice {
    message: ResponseMessage,
}

#[derive(Debug, Deserialize)]
struct ResponseMessage {
    content: Option<String>,
}

impl OpenAiEngine {
    pub fn new(config: &EngineConfig) -> Self {
        let base_url = config.base_url.trim_end_matches('/');
        let cached_chat_url = if base_url.contains("chat/completions") {
            base_url.to_string()
        } else {
            format!("{base_url}/chat/completions")
        };

        Self {
            cached_auth_header: config.api_key.as_deref().map(|k| format!("Bearer {k}")),
            cached_chat_url,
            model: config.model.clone(),
            temperature: config.temperature,
            max_tokens: config.max_tokens,
            client: Client::builder()
                .timeout(Duration::from_secs(config.timeout_secs))
                .connect_timeout(Duration::from_secs(10))
                .build()
                .unwrap_or_else(|_| Client::new()),
        }
    }

    fn build_request(&self, request: &RewriteRequest) -> ChatRequest {
        ChatRequest {
            model: self.model.clone(),
            messages: vec![
                Message {
                    role: "system",
                    content: request.instructions.clone(),
                },
                Message {
                    role: "user",
                    content: request.input.clone(),
                },
            ],
            temperature: self.temperature,
            max_tokens: self.max_tokens,
            response_format: request
                .mode
                .expects_json()
                .then_some(ResponseFormat { kind: "json_object" }),
        }
    }

    fn extract_text(response: ChatResponse) -> Result<String, CycleError> {
        response
            .choices
            .into_iter()
            .next()
            .and_then(|c| c.message.content)
            .ok_or_else(|| CycleError::rewrite("rewrite engine returned no completion"))
    }
}

#[async_trait]
impl RewriteEngine for OpenAiEngine {
    async fn complete(&self, request: &RewriteRequest) -> Result<RewriteResult, CycleError> {
        let auth_header = self.cached_auth_header.as_ref().ok_or_else(|| {
            CycleError::rewrite("engine API key not set. Set OPENAI_API_KEY or edit config.toml.")
        })?;

        let body = self.build_request(request);
        let response = self
            .client
            .post(&self.cached_chat_url)
            .header("Authorization", auth_header)
            .json(&body)
            .send()
            .await
            .map_err(|e| CycleError::rewrite(format!("rewrite engine request failed: {e}")))?;

        if !response.status().is_success() {
            return Err(CycleError::rewrite(
                api_error_message("rewrite engine", response).await,
            ));
        }

        let chat: ChatResponse = response.json().await.map_err(|e| {
            CycleError::rewrite(format!("rewrite engine response JSON decode failed: {e}"))
        })?;

        let text = Self::extract_text(chat)?;
        parse_result(&text, request.mode)
    }
}
