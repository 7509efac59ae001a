//! # relay-core
//!
//! Core types, traits, configuration, and error handling for Relay.

pub mod config;
pub mod context;
pub mod error;
pub mod locale;
pub mod message;
pub mod traits;

pub use config::shellexpand;
