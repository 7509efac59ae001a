//! In-memory per-sender conversation history used to build completion prompts.
//!
//! Not persisted: the durable transcript lives in [`crate::Store`]. History is
//! bounded two ways so a long-running process cannot grow without limit:
//! each sender keeps at most `max_turns_per_sender` turns (oldest dropped
//! first, and the kept window always starts with a user turn), and at most
//! `max_senders` senders are tracked (least recently active evicted).

use lru::LruCache;
use relay_core::config::MemoryConfig;
use relay_core::context::{Role, Turn};
use std::collections::VecDeque;
use std::num::NonZeroUsize;
use std::sync::{Mutex, MutexGuard};
use tracing::debug;

/// Process-wide map from sender id to their ordered turns.
pub struct ConversationHistory {
    entries: Mutex<LruCache<String, VecDeque<Turn>>>,
    max_turns_per_sender: usize,
}

impl ConversationHistory {
    /// Create an empty history. A bound of `0` means unbounded.
    pub fn new(max_turns_per_sender: usize, max_senders: usize) -> Self {
        let cache = match NonZeroUsize::new(max_senders) {
            Some(cap) => LruCache::new(cap),
            None => LruCache::unbounded(),
        };
        Self {
            entries: Mutex::new(cache),
            max_turns_per_sender,
        }
    }

    pub fn from_config(config: &MemoryConfig) -> Self {
        Self::new(config.max_turns_per_sender, config.max_senders)
    }

    fn lock(&self) -> MutexGuard<'_, LruCache<String, VecDeque<Turn>>> {
        // A panic while holding the lock cannot leave a half-written turn, so
        // the data is still usable.
        self.entries.lock().unwrap_or_else(|e| e.into_inner())
    }

    /// Append a turn, creating the sender's sequence on first use.
    pub fn append_turn(&self, sender_id: &str, role: Role, content: &str) {
        let mut entries = self.lock();
        if !entries.contains(sender_id) {
            if let Some((evicted, _)) = entries.push(sender_id.to_string(), VecDeque::new()) {
                if evicted != sender_id {
                    debug!("history: evicted least recently active sender {evicted}");
                }
            }
        }
        let Some(turns) = entries.get_mut(sender_id) else {
            return;
        };
        turns.push_back(Turn::new(role, content));

        if self.max_turns_per_sender > 0 && turns.len() > self.max_turns_per_sender {
            while turns.len() > self.max_turns_per_sender {
                turns.pop_front();
            }
            while turns.front().is_some_and(|t| t.role != Role::User) {
                turns.pop_front();
            }
        }
    }

    /// The sender's turns in chronological order (empty if unknown).
    pub fn turns(&self, sender_id: &str) -> Vec<Turn> {
        self.lock()
            .get(sender_id)
            .map(|turns| turns.iter().cloned().collect())
            .unwrap_or_default()
    }

    /// Number of senders currently tracked.
    pub fn sender_count(&self) -> usize {
        self.lock().len()
    }
}

impl Default for ConversationHistory {
    fn default() -> Self {
        Self::from_config(&MemoryConfig::default())
    }
}
