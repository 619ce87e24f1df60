//! Process configuration.
//!
//! Read once from the environment in `main` and passed down by value.

use notify::NotifyConfig;

use crate::ai::{ChatClient, DEFAULT_BASE_URL, DEFAULT_MODEL};

/// Chat completion settings used for the overview paragraph.
#[derive(Clone)]
pub struct LlmConfig {
    pub api_key: String,
    pub base_url: String,
    pub model: String,
}

impl std::fmt::Debug for LlmConfig {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("LlmConfig")
            .field("api_key", &"<redacted>")
            .field("base_url", &self.base_url)
            .field("model", &self.model)
            .finish()
    }
}

impl LlmConfig {
    /// Build a client from these settings.
    pub fn client(&self) -> ChatClient {
        ChatClient::new(self.api_key.clone())
            .with_base_url(self.base_url.clone())
            .with_model(self.model.clone())
    }
}

/// Everything a run needs from the environment.
#[derive(Debug, Clone, Default)]
pub struct Settings {
    /// `None` when `LLM_API_KEY` is unset; the overview is then skipped.
    pub llm: Option<LlmConfig>,
    pub notify: NotifyConfig,
}

impl Settings {
    /// Create settings from environment variables.
    ///
    /// # Environment Variables
    /// - `LLM_API_KEY`: enables the overview paragraph
    /// - `LLM_BASE_URL`: OpenAI-compatible endpoint (default: `https://api.openai.com/v1`)
    /// - `LLM_MODEL`: model name (default: `gpt-4o-mini`)
    /// - channel variables, see [`NotifyConfig::from_env`]
    pub fn from_env() -> Self {
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    /// Create settings from an arbitrary key lookup.
    pub fn from_lookup<F>(lookup: F) -> Self
    where
        F: Fn(&str) -> Option<String>,
    {
        let get = |key: &str| {
            lookup(key)
                .map(|v| v.trim().to_string())
                .filter(|v| !v.is_empty())
        };

        let llm = get("LLM_API_KEY").map(|api_key| LlmConfig {
            api_key,
            base_url: get("LLM_BASE_URL").unwrap_or_else(|| DEFAULT_BASE_URL.to_string()),
            model: get("LLM_MODEL").unwrap_or_else(|| DEFAULT_MODEL.to_string()),
        });

        Self {
            llm,
            notify: NotifyConfig::from_lookup(&lookup),
        }
    }
}
