use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// An inbound text message delivered by the messaging channel.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct InboundMessage {
    /// Sender identity (phone number). Key for all per-sender state.
    pub sender_id: String,
    /// Message text content.
    pub text: String,
    /// Platform message id, when the webhook carried one.
    #[serde(default)]
    pub message_id: Option<String>,
    pub received_at: DateTime<Utc>,
}

impl InboundMessage {
    pub fn new(sender_id: impl Into<String>, text: impl Into<String>) -> Self {
        Self {
            sender_id: sender_id.into(),
            text: text.into(),
            message_id: None,
            received_at: Utc::now(),
        }
    }
}

/// What the outbound transport reported after accepting a message.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct ProviderReceipt {
    /// Platform-assigned id of the sent message (if returned).
    pub message_id: Option<String>,
}

/// A push notification for dashboard observers reflecting a new exchange.
///
/// Field names match the persisted `conversations` columns so the dashboard
/// can render live events and stored rows the same way.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct LiveEvent {
    pub phone_number: String,
    pub incoming_message: String,
    pub response_message: String,
    pub timestamp: String,
}

impl LiveEvent {
    /// Name of the event on the live channel.
    pub const NAME: &'static str = "new_message";

    /// An inbound-only event, emitted as soon as a customer message arrives.
    pub fn inbound(phone_number: &str, incoming: &str, timestamp: String) -> Self {
        Self {
            phone_number: phone_number.to_string(),
            incoming_message: incoming.to_string(),
            response_message: String::new(),
            timestamp,
        }
    }

    /// An outbound-only event (bot reply or operator message).
    pub fn outbound(phone_number: &str, response: &str, timestamp: String) -> Self {
        Self {
            phone_number: phone_number.to_string(),
            incoming_message: String::new(),
            response_message: response.to_string(),
            timestamp,
        }
    }
}
