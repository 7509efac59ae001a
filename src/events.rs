//! Live event bus for dashboard observers.

use relay_core::{message::LiveEvent, traits::EventSink};
use tokio::sync::broadcast;
use tracing::debug;

/// Default number of events buffered per observer before it starts lagging.
pub const DEFAULT_CAPACITY: usize = 256;

/// Broadcast fan-out of [`LiveEvent`]s. Cloning shares the same bus.
#[derive(Clone)]
pub struct EventBus {
    tx: broadcast::Sender<LiveEvent>,
}

impl EventBus {
    pub fn new(capacity: usize) -> Self {
        let (tx, _) = broadcast::channel(capacity.max(1));
        Self { tx }
    }

    /// Register a new observer.
    pub fn subscribe(&self) -> broadcast::Receiver<LiveEvent> {
        self.tx.subscribe()
    }
}

impl Default for EventBus {
    fn default() -> Self {
        Self::new(DEFAULT_CAPACITY)
    }
}

impl EventSink for EventBus {
    fn emit(&self, event: LiveEvent) {
        match self.tx.send(event) {
            Ok(n) => debug!("live event delivered to {n} observer(s)"),
            Err(_) => debug!("live event dropped: no observers"),
        }
    }
}
