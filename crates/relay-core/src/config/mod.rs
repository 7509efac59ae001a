mod channels;
mod defaults;
mod providers;

#[cfg(test)]
mod tests;

pub use channels::*;
pub use providers::*;

use serde::{Deserialize, Serialize};
use std::path::Path;
use tracing::{info, warn};

use crate::error::RelayError;
use defaults::*;

/// Top-level Relay configuration.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct Config {
    #[serde(default)]
    pub relay: RelayConfig,
    #[serde(default)]
    pub provider: ProviderConfig,
    #[serde(default)]
    pub whatsapp: WhatsAppConfig,
    #[serde(default)]
    pub context: ContextConfig,
    #[serde(default)]
    pub memory: MemoryConfig,
    #[serde(default)]
    pub api: ApiConfig,
    #[serde(default)]
    pub locale: LocaleConfig,
}

/// General settings.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RelayConfig {
    #[serde(default = "default_name")]
    pub name: String,
    #[serde(default = "default_data_dir")]
    pub data_dir: String,
    #[serde(default = "default_log_level")]
    pub log_level: String,
}

impl Default for RelayConfig {
    fn default() -> Self {
        Self {
            name: default_name(),
            data_dir: default_data_dir(),
            log_level: default_log_level(),
        }
    }
}

/// Transcript store and in-memory history bounds.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct MemoryConfig {
    #[serde(default = "default_db_path")]
    pub db_path: String,
    /// Oldest turns beyond this count are dropped from a sender's prompt history.
    #[serde(default = "default_max_turns_per_sender")]
    pub max_turns_per_sender: usize,
    /// Least recently active senders beyond this count are evicted from history.
    #[serde(default = "default_max_senders")]
    pub max_senders: usize,
}

impl Default for MemoryConfig {
    fn default() -> Self {
        Self {
            db_path: default_db_path(),
            max_turns_per_sender: default_max_turns_per_sender(),
            max_senders: default_max_senders(),
        }
    }
}

/// HTTP server configuration (webhook + dashboard API).
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ApiConfig {
    #[serde(default = "default_api_host")]
    pub host: String,
    #[serde(default = "default_api_port")]
    pub port: u16,
}

impl Default for ApiConfig {
    fn default() -> Self {
        Self {
            host: default_api_host(),
            port: default_api_port(),
        }
    }
}

/// Timezone used for prompt date/time and live-event timestamps.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct LocaleConfig {
    #[serde(default = "default_timezone")]
    pub timezone: String,
    /// Place name used in the "current time in ..." prompt line.
    #[serde(default = "default_location_label")]
    pub location_label: String,
}

impl Default for LocaleConfig {
    fn default() -> Self {
        Self {
            timezone: default_timezone(),
            location_label: default_location_label(),
        }
    }
}

impl Config {
    /// Apply environment overrides. Values from the environment win over the file.
    ///
    /// `lookup` is `std::env::var` in production; tests pass a map.
    pub fn apply_env<F>(&mut self, lookup: F)
    where
        F: Fn(&str) -> Option<String>,
    {
        let get = |key: &str| lookup(key).filter(|v| !v.trim().is_empty());

        if let Some(v) = get("OPENAI_API_KEY") {
            self.provider.api_key = v;
        }
        if let Some(v) = get("META_ACCESS_TOKEN") {
            self.whatsapp.access_token = v;
        }
        if let Some(v) = get("WHATSAPP_PHONE_NUMBER_ID") {
            self.whatsapp.phone_number_id = v;
        }
        if let Some(v) = get("WHATSAPP_API_URL") {
            self.whatsapp.messages_url = Some(v);
        }
        if let Some(v) = get("VERIFY_TOKEN") {
            self.whatsapp.verify_token = v;
        }
        if let Some(v) = get("GOOGLE_SHEETS_URL") {
            self.context.url = v;
        }
        if let Some(v) = get("DATABASE_PATH") {
            self.memory.db_path = v;
        }
        if let Some(v) = get("PORT") {
            match v.trim().parse::<u16>() {
                Ok(port) => self.api.port = port,
                Err(e) => warn!("ignoring invalid PORT '{v}': {e}"),
            }
        }
    }

    /// Check that every secret required to serve traffic is present.
    pub fn validate(&self) -> Result<(), RelayError> {
        let mut missing = Vec::new();
        if self.provider.api_key.is_empty() {
            missing.push("provider.api_key (OPENAI_API_KEY)");
        }
        if self.whatsapp.access_token.is_empty() {
            missing.push("whatsapp.access_token (META_ACCESS_TOKEN)");
        }
        let has_url_override = self
            .whatsapp
            .messages_url
            .as_ref()
            .is_some_and(|u| !u.is_empty());
        if self.whatsapp.phone_number_id.is_empty() && !has_url_override {
            missing.push("whatsapp.phone_number_id (WHATSAPP_PHONE_NUMBER_ID)");
        }
        if self.whatsapp.verify_token.is_empty() {
            missing.push("whatsapp.verify_token (VERIFY_TOKEN)");
        }
        if !missing.is_empty() {
            return Err(RelayError::Config(format!(
                "missing required settings: {}",
                missing.join(", ")
            )));
        }
        crate::locale::parse_timezone(&self.locale.timezone)?;
        Ok(())
    }
}

/// Expand `~` to home directory.
pub fn shellexpand(path: &str) -> String {
    if let Some(rest) = path.strip_prefix("~/") {
        if let Some(home) = std::env::var_os("HOME") {
            return format!("{}/{rest}", home.to_string_lossy());
        }
    }
    path.to_string()
}

/// Load configuration from a TOML file.
///
/// Falls back to defaults if the file does not exist. Environment overrides
/// are not applied here; see [`Config::apply_env`].
pub fn load(path: &str) -> Result<Config, RelayError> {
    let path = Path::new(path);
    if !path.exists() {
        info!(
            "Config file not found at {}, using defaults",
            path.display()
        );
        return Ok(Config::default());
    }

    let content = std::fs::read_to_string(path)
        .map_err(|e| RelayError::Config(format!("failed to read {}: {}", path.display(), e)))?;

    let config: Config = toml::from_str(&content)
        .map_err(|e| RelayError::Config(format!("failed to parse config: {}", e)))?;

    Ok(config)
}
