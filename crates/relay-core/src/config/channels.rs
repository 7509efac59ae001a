use serde::{Deserialize, Serialize};

use super::defaults::*;

/// WhatsApp Cloud API config.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct WhatsAppConfig {
    /// Bearer token for the Graph API.
    #[serde(default)]
    pub access_token: String,
    /// Business phone number id the messages are sent from.
    #[serde(default)]
    pub phone_number_id: String,
    #[serde(default = "default_whatsapp_api_base_url")]
    pub api_base_url: String,
    #[serde(default = "default_whatsapp_api_version")]
    pub api_version: String,
    /// Full messages endpoint. Overrides `api_base_url`/`api_version`/`phone_number_id`.
    #[serde(default)]
    pub messages_url: Option<String>,
    /// Secret echoed by Meta during the webhook verification handshake.
    #[serde(default)]
    pub verify_token: String,
}

impl Default for WhatsAppConfig {
    fn default() -> Self {
        Self {
            access_token: String::new(),
            phone_number_id: String::new(),
            api_base_url: default_whatsapp_api_base_url(),
            api_version: default_whatsapp_api_version(),
            messages_url: None,
            verify_token: String::new(),
        }
    }
}

impl WhatsAppConfig {
    /// Resolve the endpoint outbound messages are POSTed to.
    pub fn messages_url(&self) -> String {
        match &self.messages_url {
            Some(url) if !url.is_empty() => url.clone(),
            _ => format!(
                "{}/{}/{}/messages",
                self.api_base_url.trim_end_matches('/'),
                self.api_version,
                self.phone_number_id
            ),
        }
    }
}
