//! Recording collaborators shared by gateway and API tests.

use super::{Gateway, GatewaySettings};
use crate::events::EventBus;
use async_trait::async_trait;
use relay_core::{
    context::Context,
    error::RelayError,
    locale,
    message::{LiveEvent, ProviderReceipt},
    traits::{Channel, ContextSource, EventSink, Provider},
};
use relay_memory::{ConversationHistory, Store};
use std::sync::{Arc, Mutex};
use std::time::Duration;

pub const FALLBACK: &str = "Lo siento, hubo un error al procesar tu mensaje.";

pub struct MockProvider {
    pub reply: Option<String>,
    pub delay: Option<Duration>,
    pub calls: Mutex<Vec<Context>>,
}

impl MockProvider {
    pub fn replying(reply: &str) -> Self {
        Self {
            reply: Some(reply.to_string()),
            delay: None,
            calls: Mutex::new(Vec::new()),
        }
    }

    pub fn failing() -> Self {
        Self {
            reply: None,
            delay: None,
            calls: Mutex::new(Vec::new()),
        }
    }

    pub fn call_count(&self) -> usize {
        self.calls.lock().unwrap().len()
    }
}

#[async_trait]
impl Provider for MockProvider {
    fn name(&self) -> &str {
        "mock"
    }

    async fn complete(&self, context: &Context) -> Result<String, RelayError> {
        self.calls.lock().unwrap().push(context.clone());
        if let Some(d) = self.delay {
            tokio::time::sleep(d).await;
        }
        match &self.reply {
            Some(r) => {
                // Echo the last user turn so ordering is observable.
                let last = context.turns.last().map(|t| t.content.as_str()).unwrap_or("");
                Ok(r.replace("{input}", last))
            }
            None => Err(RelayError::Provider("429 rate limited".into())),
        }
    }

    async fn is_available(&self) -> bool {
        true
    }
}

pub struct MockContext {
    pub result: Result<String, String>,
}

impl MockContext {
    pub fn ok(ctx: &str) -> Self {
        Self {
            result: Ok(ctx.to_string()),
        }
    }

    pub fn failing() -> Self {
        Self {
            result: Err("connection refused".into()),
        }
    }
}

#[async_trait]
impl ContextSource for MockContext {
    async fn fetch(&self) -> Result<String, RelayError> {
        self.result.clone().map_err(RelayError::Context)
    }
}

#[derive(Default)]
pub struct MockChannel {
    pub fail: bool,
    pub sent: Mutex<Vec<(String, String)>>,
}

impl MockChannel {
    pub fn failing() -> Self {
        Self {
            fail: true,
            sent: Mutex::new(Vec::new()),
        }
    }

    pub fn sent(&self) -> Vec<(String, String)> {
        self.sent.lock().unwrap().clone()
    }
}

#[async_trait]
impl Channel for MockChannel {
    fn name(&self) -> &str {
        "mock"
    }

    async fn send(&self, to: &str, text: &str) -> Result<ProviderReceipt, RelayError> {
        if self.fail {
            return Err(RelayError::Channel("send failed: 500".into()));
        }
        let mut sent = self.sent.lock().unwrap();
        sent.push((to.to_string(), text.to_string()));
        Ok(ProviderReceipt {
            message_id: Some(format!("wamid.{}", sent.len())),
        })
    }
}

#[derive(Default)]
pub struct MockSink {
    pub events: Mutex<Vec<LiveEvent>>,
    /// Recorded events are also published here, as the real bus would.
    pub bus: Option<EventBus>,
}

impl MockSink {
    pub fn events(&self) -> Vec<LiveEvent> {
        self.events.lock().unwrap().clone()
    }
}

impl EventSink for MockSink {
    fn emit(&self, event: LiveEvent) {
        self.events.lock().unwrap().push(event.clone());
        if let Some(bus) = &self.bus {
            bus.emit(event);
        }
    }
}

/// A gateway over mocks and an in-memory store, with handles to every mock.
pub struct Harness {
    pub gateway: Arc<Gateway>,
    pub provider: Arc<MockProvider>,
    pub channel: Arc<MockChannel>,
    pub sink: Arc<MockSink>,
    pub store: Store,
}

pub async fn harness(
    provider: MockProvider,
    context: MockContext,
    channel: MockChannel,
) -> Harness {
    build_harness(provider, context, channel, None).await
}

/// Like [`harness`], but every emitted event also reaches `bus`.
pub async fn harness_on_bus(
    provider: MockProvider,
    context: MockContext,
    channel: MockChannel,
    bus: EventBus,
) -> Harness {
    build_harness(provider, context, channel, Some(bus)).await
}

async fn build_harness(
    provider: MockProvider,
    context: MockContext,
    channel: MockChannel,
    bus: Option<EventBus>,
) -> Harness {
    let store = Store::in_memory().await.unwrap();
    let provider = Arc::new(provider);
    let channel = Arc::new(channel);
    let sink = Arc::new(MockSink {
        events: Mutex::new(Vec::new()),
        bus,
    });
    let settings = GatewaySettings {
        timezone: locale::parse_timezone("America/Santiago").unwrap(),
        location_label: "Santiago de Chile".into(),
        fallback_reply: FALLBACK.into(),
    };
    let gateway = Arc::new(Gateway::new(
        provider.clone(),
        Arc::new(context),
        channel.clone(),
        sink.clone(),
        store.clone(),
        ConversationHistory::new(0, 0),
        settings,
    ));
    Harness {
        gateway,
        provider,
        channel,
        sink,
        store,
    }
}
