use crate::{
    context::Context,
    error::RelayError,
    message::{LiveEvent, ProviderReceipt},
};
use async_trait::async_trait;

/// AI completion provider.
///
/// Implementations issue exactly one completion request per call. Fallback
/// replies are the caller's concern, so failures are surfaced as errors.
#[async_trait]
pub trait Provider: Send + Sync {
    /// Human-readable provider name.
    fn name(&self) -> &str;

    /// Send the context to the provider and return the first candidate's text.
    async fn complete(&self, context: &Context) -> Result<String, RelayError>;

    /// Check if the provider is configured and ready.
    async fn is_available(&self) -> bool;
}

/// Source of free-text situational context (business hours, FAQ data, ...).
#[async_trait]
pub trait ContextSource: Send + Sync {
    /// Fetch the current context string.
    async fn fetch(&self) -> Result<String, RelayError>;
}

/// Outbound messaging transport.
#[async_trait]
pub trait Channel: Send + Sync {
    /// Human-readable channel name.
    fn name(&self) -> &str;

    /// Deliver `text` to the participant identified by `to`.
    async fn send(&self, to: &str, text: &str) -> Result<ProviderReceipt, RelayError>;
}

/// Receiver of live events for dashboard observers.
///
/// Emitting is fire-and-forget: having no observers is not an error.
pub trait EventSink: Send + Sync {
    fn emit(&self, event: LiveEvent);
}
