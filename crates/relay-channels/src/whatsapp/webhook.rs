//! WhatsApp webhook handling: subscription handshake and payload parsing.

use super::types::WebhookPayload;
use chrono::Utc;
use relay_core::message::InboundMessage;
use std::fmt;

/// Result of parsing a webhook notification.
///
/// Not every notification carries a user message (delivery receipts, status
/// updates, media), so anything that is not a text message is `Ignored`.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum WebhookEvent {
    Message(InboundMessage),
    Ignored(IgnoreReason),
}

/// Why a webhook notification produced no message.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum IgnoreReason {
    /// Body is not JSON or does not have the notification shape.
    Malformed,
    /// No `entry[0].changes[0].value.messages[0]`.
    NoMessage,
    /// The message has no sender.
    NoSender,
    /// The message has no text body (media, reaction, ...).
    NotText,
}

impl fmt::Display for IgnoreReason {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let s = match self {
            Self::Malformed => "malformed payload",
            Self::NoMessage => "no message",
            Self::NoSender => "no sender",
            Self::NotText => "not a text message",
        };
        f.write_str(s)
    }
}

/// Parse a raw webhook body into a typed event.
///
/// Only the first message of the first change of the first entry is
/// considered.
pub fn parse_webhook(body: &[u8]) -> WebhookEvent {
    let payload: WebhookPayload = match serde_json::from_slice(body) {
        Ok(p) => p,
        Err(_) => return WebhookEvent::Ignored(IgnoreReason::Malformed),
    };

    let Some(message) = payload
        .entry
        .into_iter()
        .next()
        .and_then(|e| e.changes.into_iter().next())
        .and_then(|c| c.value)
        .and_then(|v| v.messages.into_iter().next())
    else {
        return WebhookEvent::Ignored(IgnoreReason::NoMessage);
    };

    let Some(sender_id) = message.from.filter(|f| !f.is_empty()) else {
        return WebhookEvent::Ignored(IgnoreReason::NoSender);
    };

    let Some(text) = message.text.and_then(|t| t.body) else {
        return WebhookEvent::Ignored(IgnoreReason::NotText);
    };

    WebhookEvent::Message(InboundMessage {
        sender_id,
        text,
        message_id: message.id,
        received_at: Utc::now(),
    })
}

/// Verify a webhook subscription (GET handshake).
///
/// Meta sends `hub.mode=subscribe`, `hub.verify_token` and `hub.challenge`.
/// Returns the challenge to echo back when the token matches.
pub fn verify_subscription(
    mode: Option<&str>,
    token: Option<&str>,
    challenge: Option<&str>,
    verify_token: &str,
) -> Option<String> {
    let mode = mode?;
    let token = token?;
    let challenge = challenge?;

    // An unset secret must never verify.
    if verify_token.is_empty() {
        return None;
    }

    if mode == "subscribe" && constant_time_eq(token, verify_token) {
        Some(challenge.to_string())
    } else {
        None
    }
}

/// Constant-time string comparison.
fn constant_time_eq(a: &str, b: &str) -> bool {
    if a.len() != b.len() {
        return false;
    }
    a.bytes()
        .zip(b.bytes())
        .fold(0u8, |acc, (x, y)| acc | (x ^ y))
        == 0
}
