//! The operator-authored policy document.

use std::path::Path;
use std::sync::Arc;

use quill_common::{QuillError, Result};
use tracing::info;

/// Behavioral contract injected into every generation call as standing
/// instructions. Read once at startup, never mutated, shared read-only by
/// all workflow stages.
#[derive(Debug, Clone)]
pub struct Policy {
    text: Arc<str>,
}

impl Policy {
    /// Load the policy document. A missing policy is startup-fatal: every
    /// generation call depends on it.
    pub fn load(path: impl AsRef<Path>) -> Result<Self> {
        let path = path.as_ref();
        let text = std::fs::read_to_string(path).map_err(|e| {
            QuillError::Config(format!(
                "Cannot read policy file '{}': {e}",
                path.display()
            ))
        })?;

        info!(path = %path.display(), chars = text.len(), "Policy loaded");
        Ok(Self { text: text.into() })
    }

    pub fn from_text(text: impl Into<String>) -> Self {
        Self {
            text: text.into().into(),
        }
    }

    pub fn as_str(&self) -> &str {
        &self.text
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn missing_policy_file_is_fatal() {
        let err = Policy::load("/no/such/policy.txt").unwrap_err();
        assert!(matches!(err, QuillError::Config(_)));
        assert!(err.to_string().contains("policy.txt"));
    }

    #[test]
    fn policy_is_cheap_to_share() {
        let policy = Policy::from_text("Always cite sources.");
        let clone = policy.clone();
        assert_eq!(policy.as_str(), clone.as_str());
    }
}
