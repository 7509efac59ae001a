//! # relay-providers
//!
//! AI completion provider and context source implementations for Relay.

pub mod context_source;
pub mod openai;

pub use context_source::HttpContextSource;
pub use openai::OpenAiProvider;
