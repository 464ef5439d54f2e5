use std::time::Duration;

use async_trait::async_trait;
use quill_common::{QuillError, Result};
use serde::{Deserialize, Serialize};

use crate::generator::{ChatMessage, Role, TextGenerator};

const DEFAULT_BASE_URL: &str = "http://localhost:11434";
const DEFAULT_TIMEOUT_MS: u64 = 180_000;

#[derive(Serialize)]
struct OllamaRequest {
    model: String,
    messages: Vec<OllamaMessage>,
    options: OllamaOptions,
    stream: bool,
}

#[derive(Serialize, Deserialize, Debug, Clone)]
struct OllamaMessage {
    role: String,
    content: String,
}

#[derive(Serialize)]
struct OllamaOptions {
    temperature: f32,
}

#[derive(Deserialize)]
struct OllamaResponse {
    message: OllamaMessage,
}

/// Generation backend speaking the native Ollama chat protocol.
pub struct OllamaGenerator {
    base_url: String,
    model: String,
    http_client: reqwest::Client,
}

impl OllamaGenerator {
    pub fn new(base_url: Option<String>, model: String, timeout_ms: Option<u64>) -> Self {
        let timeout = Duration::from_millis(timeout_ms.unwrap_or(DEFAULT_TIMEOUT_MS));
        Self {
            base_url: base_url.unwrap_or_else(|| DEFAULT_BASE_URL.to_string()),
            model,
            http_client: reqwest::Client::builder()
                .timeout(timeout)
                .build()
                .unwrap_or_else(|_| reqwest::Client::new()),
        }
    }

    fn role_to_string(role: &Role) -> &'static str {
        match role {
            Role::System => "system",
            Role::User => "user",
            Role::Assistant => "assistant",
        }
    }

    fn build_body(&self, messages: &[ChatMessage], temperature: f32) -> OllamaRequest {
        OllamaRequest {
            model: self.model.clone(),
            messages: messages
                .iter()
                .map(|msg| OllamaMessage {
                    role: Self::role_to_string(&msg.role).to_string(),
                    content: msg.content.clone(),
                })
                .collect(),
            options: OllamaOptions { temperature },
            stream: false,
        }
    }
}

#[async_trait]
impl TextGenerator for OllamaGenerator {
    async fn generate(&self, messages: &[ChatMessage], temperature: f32) -> Result<String> {
        let url = format!("{}/api/chat", self.base_url);
        let body = self.build_body(messages, temperature);

        let response = self
            .http_client
            .post(&url)
            .json(&body)
            .send()
            .await
            .map_err(|e| QuillError::Generation(format!("Ollama request failed: {e}")))?;

        let status = response.status();
        if !status.is_success() {
            let body_text = response.text().await.unwrap_or_default();
            return Err(QuillError::Generation(format!(
                "Ollama API error {status}: {body_text}"
            )));
        }

        let ollama_response: OllamaResponse = response
            .json()
            .await
            .map_err(|e| QuillError::Generation(format!("Failed to parse Ollama response: {e}")))?;

        Ok(ollama_response.message.content)
    }

    fn model_name(&self) -> &str {
        &self.model
    }
}
