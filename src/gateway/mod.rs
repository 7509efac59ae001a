//! Gateway — owns the collaborators and serializes work per sender.
//!
//! Inbound messages for the same sender are processed strictly in arrival
//! order; different senders run concurrently on the runtime.

mod pipeline;

#[cfg(test)]
pub(crate) mod mocks;

pub use pipeline::InboundOutcome;

use chrono::Utc;
use chrono_tz::Tz;
use relay_core::{
    config::Config,
    error::RelayError,
    locale,
    message::InboundMessage,
    traits::{Channel, ContextSource, EventSink, Provider},
};
use relay_memory::{ConversationHistory, Store};
use std::collections::{HashMap, VecDeque};
use std::sync::Arc;
use tokio::sync::Mutex;
use tracing::{error, info};

/// Per-deployment settings the pipeline needs at request time.
#[derive(Debug, Clone)]
pub struct GatewaySettings {
    pub timezone: Tz,
    pub location_label: String,
    /// Sent to the user when the completion request fails.
    pub fallback_reply: String,
}

impl GatewaySettings {
    pub fn from_config(cfg: &Config) -> Result<Self, RelayError> {
        Ok(Self {
            timezone: locale::parse_timezone(&cfg.locale.timezone)?,
            location_label: cfg.locale.location_label.clone(),
            fallback_reply: cfg.provider.fallback_reply.clone(),
        })
    }
}

/// The central gateway connecting the channel, memory, and provider.
pub struct Gateway {
    pub(super) provider: Arc<dyn Provider>,
    pub(super) context_source: Arc<dyn ContextSource>,
    pub(super) channel: Arc<dyn Channel>,
    pub(super) events: Arc<dyn EventSink>,
    pub(super) memory: Store,
    pub(super) history: ConversationHistory,
    pub(super) settings: GatewaySettings,
    /// Senders with a message in flight. Later messages wait here in order.
    active_senders: Mutex<HashMap<String, VecDeque<InboundMessage>>>,
}

impl Gateway {
    pub fn new(
        provider: Arc<dyn Provider>,
        context_source: Arc<dyn ContextSource>,
        channel: Arc<dyn Channel>,
        events: Arc<dyn EventSink>,
        memory: Store,
        history: ConversationHistory,
        settings: GatewaySettings,
    ) -> Self {
        Self {
            provider,
            context_source,
            channel,
            events,
            memory,
            history,
            settings,
            active_senders: Mutex::new(HashMap::new()),
        }
    }

    pub fn memory(&self) -> &Store {
        &self.memory
    }

    /// Accept an inbound message for background processing.
    ///
    /// Returns once the message is queued; the pipeline runs on a spawned task.
    /// If the sender already has a message in flight, this one is queued
    /// behind it instead.
    pub async fn submit(self: &Arc<Self>, incoming: InboundMessage) {
        {
            let mut active = self.active_senders.lock().await;
            if let Some(queue) = active.get_mut(&incoming.sender_id) {
                info!(
                    "queued message from {} ({} waiting)",
                    incoming.sender_id,
                    queue.len() + 1
                );
                queue.push_back(incoming);
                return;
            }
            active.insert(incoming.sender_id.clone(), VecDeque::new());
        }

        let gw = Arc::clone(self);
        tokio::spawn(async move {
            gw.drain_sender(incoming).await;
        });
    }

    /// Number of senders with a message in flight.
    pub async fn busy_senders(&self) -> usize {
        self.active_senders.lock().await.len()
    }

    /// Process `first`, then every message queued for the same sender.
    async fn drain_sender(self: Arc<Self>, first: InboundMessage) {
        let sender = first.sender_id.clone();
        let mut next = Some(first);

        while let Some(incoming) = next {
            self.supervise(incoming).await;

            next = {
                let mut active = self.active_senders.lock().await;
                match active.get_mut(&sender).and_then(|q| q.pop_front()) {
                    Some(msg) => Some(msg),
                    None => {
                        active.remove(&sender);
                        None
                    }
                }
            };
        }
    }

    /// Run one message through the pipeline on its own task and log the result.
    ///
    /// A panic inside the pipeline is contained to this message; the sender's
    /// queue keeps draining.
    async fn supervise(self: &Arc<Self>, incoming: InboundMessage) {
        let sender = incoming.sender_id.clone();
        let received_at = incoming.received_at;
        let gw = Arc::clone(self);
        let handle = tokio::spawn(async move { gw.handle_inbound(&incoming).await });

        match handle.await {
            Ok(Ok(InboundOutcome::BotInactive)) => {
                info!("bot inactive for {sender}, message ignored");
            }
            Ok(Ok(InboundOutcome::Replied { receipt, .. })) => {
                let latency = Utc::now() - received_at;
                info!(
                    "replied to {sender} {}ms after receipt (id: {:?})",
                    latency.num_milliseconds(),
                    receipt.message_id
                );
            }
            Ok(Err(e)) => error!("pipeline failed for {sender}: {e}"),
            Err(e) => error!("pipeline task for {sender} aborted: {e}"),
        }
    }
}
