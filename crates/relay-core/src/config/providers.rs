use serde::{Deserialize, Serialize};

use super::defaults::*;

/// OpenAI-compatible completion provider config.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ProviderConfig {
    #[serde(default)]
    pub api_key: String,
    #[serde(default = "default_openai_base_url")]
    pub base_url: String,
    #[serde(default = "default_openai_model")]
    pub model: String,
    /// Sampling temperature. Kept low for determinism-leaning replies.
    #[serde(default = "default_temperature")]
    pub temperature: f32,
    /// Reply sent to the user when the completion request fails.
    #[serde(default = "default_fallback_reply")]
    pub fallback_reply: String,
}

impl Default for ProviderConfig {
    fn default() -> Self {
        Self {
            api_key: String::new(),
            base_url: default_openai_base_url(),
            model: default_openai_model(),
            temperature: default_temperature(),
            fallback_reply: default_fallback_reply(),
        }
    }
}

/// External context source config (e.g. a Google Apps Script endpoint).
///
/// An empty `url` disables context fetching; prompts then carry only the date/time line.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ContextConfig {
    #[serde(default)]
    pub url: String,
    #[serde(default = "default_context_timeout_secs")]
    pub timeout_secs: u64,
}

impl Default for ContextConfig {
    fn default() -> Self {
        Self {
            url: String::new(),
            timeout_secs: default_context_timeout_secs(),
        }
    }
}
