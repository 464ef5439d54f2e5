use std::sync::Arc;

use quill_common::{QuillError, Result};
use serde::{Deserialize, Serialize};

use crate::generator::TextGenerator;
use crate::ollama::OllamaGenerator;
use crate::retry::{RetryConfig, RetryingGenerator};

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct GeneratorConfig {
    #[serde(default = "default_provider")]
    pub provider: String,

    #[serde(default = "default_model")]
    pub model: String,

    /// Backend endpoint. Defaults to the local Ollama daemon.
    #[serde(default)]
    pub api_url: Option<String>,

    #[serde(default = "default_temperature")]
    pub temperature: f32,

    #[serde(default)]
    pub timeout_ms: Option<u64>,

    #[serde(default)]
    pub retry: RetryConfig,
}

fn default_provider() -> String {
    "ollama".into()
}

fn default_model() -> String {
    "llama3.1:8b".into()
}

fn default_temperature() -> f32 {
    0.2
}

impl Default for GeneratorConfig {
    fn default() -> Self {
        Self {
            provider: default_provider(),
            model: default_model(),
            api_url: None,
            temperature: default_temperature(),
            timeout_ms: None,
            retry: RetryConfig::default(),
        }
    }
}

impl GeneratorConfig {
    /// Apply `OLLAMA_URL` / `OLLAMA_MODEL` environment overrides on top of
    /// whatever the config file provided.
    pub fn with_env_overrides(mut self) -> Self {
        if self.api_url.is_none() {
            self.api_url = std::env::var("OLLAMA_URL").ok().filter(|v| !v.is_empty());
        }
        if let Ok(model) = std::env::var("OLLAMA_MODEL") {
            if !model.is_empty() {
                self.model = model;
            }
        }
        self
    }
}

pub fn build_generator(config: &GeneratorConfig) -> Result<Arc<dyn TextGenerator>> {
    let base: Box<dyn TextGenerator> = match config.provider.as_str() {
        "ollama" => Box::new(OllamaGenerator::new(
            config.api_url.clone(),
            config.model.clone(),
            config.timeout_ms,
        )),
        other => {
            return Err(QuillError::Config(format!(
                "Unknown generation provider: {other}"
            )));
        }
    };

    Ok(Arc::new(RetryingGenerator::new(base, config.retry.clone())))
}

#[cfg(test)]
mod tests {
    use super::*;

    const TOML_CONFIG: &str = r#"
provider = "ollama"
model = "llama3.1:8b"
api_url = "http://localhost:11434"
temperature = 0.1

[retry]
max_retries = 2
initial_delay_ms = 250
max_delay_ms = 10000
"#;

    #[test]
    fn deserialize_config_from_toml() {
        let config: GeneratorConfig = toml::from_str(TOML_CONFIG).unwrap();
        assert_eq!(config.provider, "ollama");
        assert_eq!(config.model, "llama3.1:8b");
        assert_eq!(config.api_url.as_deref(), Some("http://localhost:11434"));
        assert!((config.temperature - 0.1).abs() < f32::EPSILON);
        assert_eq!(config.retry.max_retries, 2);
    }

    #[test]
    fn deserialize_config_defaults() {
        let config: GeneratorConfig = toml::from_str("").unwrap();
        assert_eq!(config.provider, "ollama");
        assert_eq!(config.model, "llama3.1:8b");
        assert!(config.api_url.is_none());
        assert_eq!(config.retry.max_retries, 0);
    }

    #[test]
    fn build_ollama_generator() {
        let config = GeneratorConfig::default();
        let generator = build_generator(&config).unwrap();
        assert_eq!(generator.model_name(), "llama3.1:8b");
    }

    #[test]
    fn build_unknown_provider_fails() {
        let config = GeneratorConfig {
            provider: "gemini".to_string(),
            ..Default::default()
        };
        assert!(build_generator(&config).is_err());
    }
}
