//! Configuration for the quill binary.

use std::path::{Path, PathBuf};

use quill_llm::GeneratorConfig;
use serde::{Deserialize, Serialize};
use tracing::info;

const DEFAULT_CONFIG_FILE: &str = "quill.toml";

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct QuillConfig {
    #[serde(default)]
    pub generator: GeneratorConfig,

    #[serde(default)]
    pub search: SearchConfig,

    #[serde(default)]
    pub workflow: WorkflowConfig,

    #[serde(default)]
    pub memory: MemoryConfig,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct SearchConfig {
    /// Search API key. Falls back to the `TAVILY_API_KEY` environment
    /// variable; absent entirely, searches return no hits.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub api_key: Option<String>,
}

impl SearchConfig {
    pub fn resolve_api_key(&self) -> Option<String> {
        if let Some(ref key) = self.api_key {
            if !key.is_empty() {
                return Some(key.clone());
            }
        }
        std::env::var("TAVILY_API_KEY").ok().filter(|k| !k.is_empty())
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct WorkflowConfig {
    /// The policy document injected into every generation call. Missing
    /// file is startup-fatal.
    #[serde(default = "default_policy_path")]
    pub policy_path: PathBuf,
}

impl Default for WorkflowConfig {
    fn default() -> Self {
        Self {
            policy_path: default_policy_path(),
        }
    }
}

fn default_policy_path() -> PathBuf {
    PathBuf::from("policy.txt")
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct MemoryConfig {
    /// Folder indexed into recall memory.
    #[serde(default = "default_docs_folder")]
    pub docs_folder: PathBuf,
}

impl Default for MemoryConfig {
    fn default() -> Self {
        Self {
            docs_folder: default_docs_folder(),
        }
    }
}

fn default_docs_folder() -> PathBuf {
    PathBuf::from("data/user_docs")
}

impl QuillConfig {
    pub fn from_file(path: &Path) -> anyhow::Result<Self> {
        let content = std::fs::read_to_string(path).map_err(|e| {
            anyhow::anyhow!("Failed to read config file '{}': {e}", path.display())
        })?;
        let config: Self = toml::from_str(&content)?;
        Ok(config)
    }

    /// Explicit path, else `quill.toml` in the working directory if present,
    /// else built-in defaults.
    pub fn load(path: Option<&Path>) -> anyhow::Result<Self> {
        if let Some(path) = path {
            info!(path = %path.display(), "Loading configuration");
            return Self::from_file(path);
        }

        let default = Path::new(DEFAULT_CONFIG_FILE);
        if default.exists() {
            info!(path = DEFAULT_CONFIG_FILE, "Loading configuration");
            return Self::from_file(default);
        }

        info!("Using default configuration");
        Ok(Self::default())
    }
}
