//! Shared types for the guru gateway: configuration, errors, conversation
//! messages and structured trace events.

pub mod config;
pub mod error;
pub mod message;
pub mod trace;
