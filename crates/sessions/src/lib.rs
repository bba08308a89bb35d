//! Session management for the guru gateway.
//!
//! Sessions are in-memory and live for the process lifetime: each caller
//! token maps to a bounded rolling window of turns plus a context digest.

pub mod session_key;
pub mod store;

pub use session_key::{resolve_session_id, DEFAULT_SESSION_ID};
pub use store::SessionStore;
