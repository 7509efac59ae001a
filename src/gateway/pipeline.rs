//! Message processing pipeline: inbound exchanges and operator messages.

use super::Gateway;
use chrono::Utc;
use relay_core::{
    context::{Context, Role},
    error::RelayError,
    locale,
    message::{InboundMessage, LiveEvent, ProviderReceipt},
};
use std::fmt;
use tracing::{debug, error, warn};

/// Terminal result of one inbound message.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum InboundOutcome {
    /// The bot is switched off for this sender; nothing was done.
    BotInactive,
    Replied {
        reply: String,
        receipt: ProviderReceipt,
    },
}

/// Pipeline stages, in order.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Stage {
    ToggleChecked,
    ContextFetched,
    HistoryUpdated,
    Completed,
    Persisted,
    Broadcast,
    Dispatched,
}

impl fmt::Display for Stage {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let s = match self {
            Self::ToggleChecked => "toggle_checked",
            Self::ContextFetched => "context_fetched",
            Self::HistoryUpdated => "history_updated",
            Self::Completed => "completed",
            Self::Persisted => "persisted",
            Self::Broadcast => "broadcast",
            Self::Dispatched => "dispatched",
        };
        f.write_str(s)
    }
}

fn reached(sender: &str, stage: Stage) {
    debug!(sender, %stage, "pipeline stage");
}

impl Gateway {
    /// Process one inbound message end to end.
    ///
    /// Context and completion failures degrade to an empty context and the
    /// fallback reply. Persistence and dispatch failures abort the remaining
    /// stages and are returned.
    pub async fn handle_inbound(
        &self,
        incoming: &InboundMessage,
    ) -> Result<InboundOutcome, RelayError> {
        let sender = incoming.sender_id.as_str();

        // --- 1. TOGGLE ---
        if !self.memory.get_active(sender).await? {
            return Ok(InboundOutcome::BotInactive);
        }
        reached(sender, Stage::ToggleChecked);

        // --- 2. CONTEXT ---
        let now = Utc::now().with_timezone(&self.settings.timezone);
        let fetched = self.fetch_context().await;
        let system_prompt =
            locale::system_context(&fetched, &now, &self.settings.location_label);
        reached(sender, Stage::ContextFetched);

        // --- 3. USER TURN ---
        self.history.append_turn(sender, Role::User, &incoming.text);
        reached(sender, Stage::HistoryUpdated);

        // --- 4. COMPLETION ---
        let context = Context::new(system_prompt, self.history.turns(sender));
        let reply = match self.provider.complete(&context).await {
            Ok(text) => text,
            Err(e) => {
                warn!("completion failed for {sender}, sending fallback: {e}");
                self.settings.fallback_reply.clone()
            }
        };
        reached(sender, Stage::Completed);

        // --- 5. PERSIST ---
        if let Err(e) = self.memory.append(sender, &incoming.text, &reply).await {
            error!("failed to persist exchange for {sender}: {e}");
            return Err(e);
        }
        reached(sender, Stage::Persisted);

        // --- 6. LIVE EVENT ---
        self.emit_outbound(sender, &reply);
        reached(sender, Stage::Broadcast);

        // --- 7. ASSISTANT TURN ---
        self.history.append_turn(sender, Role::Assistant, &reply);

        // --- 8. DISPATCH ---
        let receipt = match self.channel.send(sender, &reply).await {
            Ok(r) => r,
            Err(e) => {
                error!("reply to {sender} persisted but not delivered: {e}");
                return Err(e);
            }
        };
        reached(sender, Stage::Dispatched);

        Ok(InboundOutcome::Replied { reply, receipt })
    }

    /// Send a message typed by a dashboard operator.
    ///
    /// Persists an outbound-only record, emits the live event, then
    /// dispatches. No completion and no history turns are involved.
    pub async fn handle_operator_message(
        &self,
        sender: &str,
        text: &str,
    ) -> Result<ProviderReceipt, RelayError> {
        self.memory.append(sender, "", text).await?;
        reached(sender, Stage::Persisted);

        self.emit_outbound(sender, text);
        reached(sender, Stage::Broadcast);

        let receipt = self.channel.send(sender, text).await?;
        reached(sender, Stage::Dispatched);
        Ok(receipt)
    }

    /// Tell dashboard observers a customer message arrived.
    ///
    /// Fires for every inbound text regardless of the bot toggle, so an
    /// operator still sees messages the bot will not answer.
    pub fn announce_inbound(&self, incoming: &InboundMessage) {
        self.events.emit(LiveEvent::inbound(
            &incoming.sender_id,
            &incoming.text,
            self.event_time(),
        ));
    }

    /// Fetch the external context, degrading any failure to an empty string.
    pub(super) async fn fetch_context(&self) -> String {
        match self.context_source.fetch().await {
            Ok(ctx) => ctx,
            Err(e) => {
                warn!("context fetch failed, continuing without it: {e}");
                String::new()
            }
        }
    }

    fn emit_outbound(&self, sender: &str, text: &str) {
        self.events
            .emit(LiveEvent::outbound(sender, text, self.event_time()));
    }

    fn event_time(&self) -> String {
        let now = Utc::now().with_timezone(&self.settings.timezone);
        locale::event_timestamp(&now)
    }
}
