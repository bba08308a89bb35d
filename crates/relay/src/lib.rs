//! Authenticated pass-through to the backend REST API.
//!
//! The relay injects server-held credentials and normalizes the upstream
//! body into JSON or a typed error; it never interprets backend semantics.

pub mod error;
pub mod forwarder;

pub use error::RelayError;
pub use forwarder::{RelayForwarder, RelayResponse};
