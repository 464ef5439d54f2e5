use async_trait::async_trait;
use quill_common::Result;
use serde::{Deserialize, Serialize};
use tracing::warn;

use crate::generator::{ChatMessage, TextGenerator};

/// Retry policy for a wrapped generator.
///
/// The default is zero retries: a single attempt per call. Callers that want
/// resilience opt in through configuration.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RetryConfig {
    pub max_retries: u32,
    pub initial_delay_ms: u64,
    pub max_delay_ms: u64,
}

impl Default for RetryConfig {
    fn default() -> Self {
        Self {
            max_retries: 0,
            initial_delay_ms: 500,
            max_delay_ms: 30_000,
        }
    }
}

pub struct RetryingGenerator<T: TextGenerator> {
    inner: T,
    config: RetryConfig,
}

impl<T: TextGenerator> RetryingGenerator<T> {
    pub fn new(inner: T, config: RetryConfig) -> Self {
        Self { inner, config }
    }

    fn is_retryable(error_msg: &str) -> bool {
        let lower = error_msg.to_lowercase();
        lower.contains("429")
            || lower.contains("rate limit")
            || lower.contains("500")
            || lower.contains("502")
            || lower.contains("503")
            || lower.contains("timed out")
            || lower.contains("connection")
    }

    fn compute_delay(&self, attempt: u32) -> u64 {
        let delay = self
            .config
            .initial_delay_ms
            .saturating_mul(2u64.saturating_pow(attempt));
        delay.min(self.config.max_delay_ms)
    }
}

#[async_trait]
impl<T: TextGenerator> TextGenerator for RetryingGenerator<T> {
    async fn generate(&self, messages: &[ChatMessage], temperature: f32) -> Result<String> {
        let mut last_error = None;

        for attempt in 0..=self.config.max_retries {
            match self.inner.generate(messages, temperature).await {
                Ok(text) => return Ok(text),
                Err(e) => {
                    let error_msg = e.to_string();

                    if attempt == self.config.max_retries || !Self::is_retryable(&error_msg) {
                        return Err(e);
                    }

                    let delay = self.compute_delay(attempt);
                    warn!(
                        attempt = attempt + 1,
                        max_retries = self.config.max_retries,
                        delay_ms = delay,
                        error = %error_msg,
                        "Retrying generation request"
                    );

                    tokio::time::sleep(tokio::time::Duration::from_millis(delay)).await;
                    last_error = Some(e);
                }
            }
        }

        Err(last_error.unwrap())
    }

    fn model_name(&self) -> &str {
        self.inner.model_name()
    }
}
