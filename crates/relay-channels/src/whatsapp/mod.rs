//! WhatsApp channel using the WhatsApp Business Cloud API.
//!
//! Outbound messages are POSTed to the Graph API messages endpoint with a
//! bearer token. Inbound messages arrive through the webhook handled by the
//! binary's HTTP server; [`webhook`] turns those payloads into typed events.

mod types;
pub mod webhook;


pub use webhook::{parse_webhook, verify_subscription, WebhookEvent};

use async_trait::async_trait;
use relay_core::{
    config::WhatsAppConfig, error::RelayError, message::ProviderReceipt, traits::Channel,
};
use tracing::{debug, info};
use types::{SendResponse, SendTextRequest, TextBody};

/// WhatsApp channel using the Cloud API.
pub struct WhatsAppChannel {
    client: reqwest::Client,
    messages_url: String,
    access_token: String,
}

impl WhatsAppChannel {
    /// Create a new WhatsApp channel from config.
    pub fn new(config: &WhatsAppConfig) -> Self {
        Self {
            client: reqwest::Client::new(),
            messages_url: config.messages_url(),
            access_token: config.access_token.clone(),
        }
    }
}

#[async_trait]
impl Channel for WhatsAppChannel {
    fn name(&self) -> &str {
        "whatsapp"
    }

    async fn send(&self, to: &str, text: &str) -> Result<ProviderReceipt, RelayError> {
        let body = SendTextRequest {
            messaging_product: "whatsapp",
            to,
            text: TextBody { body: text },
        };

        debug!("whatsapp: POST {} to={to}", self.messages_url);
        let resp = self
            .client
            .post(&self.messages_url)
            .bearer_auth(&self.access_token)
            .json(&body)
            .send()
            .await
            .map_err(|e| RelayError::Channel(format!("whatsapp request failed: {e}")))?;

        if !resp.status().is_success() {
            let status = resp.status();
            let text = resp.text().await.unwrap_or_default();
            return Err(RelayError::Channel(format!(
                "whatsapp returned {status}: {text}"
            )));
        }

        // The receipt is informational; an unexpected body does not undo delivery.
        let parsed: SendResponse = resp.json().await.unwrap_or_default();
        let message_id = parsed.messages.into_iter().next().map(|m| m.id);

        info!("whatsapp: delivered to {to} (id: {message_id:?})");
        Ok(ProviderReceipt { message_id })
    }
}
