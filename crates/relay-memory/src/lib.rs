//! # relay-memory
//!
//! Durable transcript store (SQLite) and in-memory conversation history.

pub mod history;
pub mod store;

pub use history::ConversationHistory;
pub use store::{Contact, ConversationRecord, Store};
