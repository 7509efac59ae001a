//! WhatsApp Cloud API wire types.

use serde::{Deserialize, Serialize};

#[derive(Debug, Serialize)]
pub(crate) struct SendTextRequest<'a> {
    pub messaging_product: &'static str,
    pub to: &'a str,
    pub text: TextBody<'a>,
}

#[derive(Debug, Serialize)]
pub(crate) struct TextBody<'a> {
    pub body: &'a str,
}

#[derive(Debug, Default, Deserialize)]
pub(crate) struct SendResponse {
    #[serde(default)]
    pub messages: Vec<SentMessage>,
}

#[derive(Debug, Deserialize)]
pub(crate) struct SentMessage {
    pub id: String,
}

/// Top-level webhook notification body.
#[derive(Debug, Deserialize)]
pub(crate) struct WebhookPayload {
    #[serde(default)]
    pub entry: Vec<WebhookEntry>,
}

#[derive(Debug, Deserialize)]
pub(crate) struct WebhookEntry {
    #[serde(default)]
    pub changes: Vec<WebhookChange>,
}

#[derive(Debug, Deserialize)]
pub(crate) struct WebhookChange {
    pub value: Option<ChangeValue>,
}

#[derive(Debug, Deserialize)]
pub(crate) struct ChangeValue {
    #[serde(default)]
    pub messages: Vec<WaMessage>,
}

#[derive(Debug, Deserialize)]
pub(crate) struct WaMessage {
    pub from: Option<String>,
    pub id: Option<String>,
    pub text: Option<WaText>,
}

#[derive(Debug, Deserialize)]
pub(crate) struct WaText {
    pub body: Option<String>,
}
