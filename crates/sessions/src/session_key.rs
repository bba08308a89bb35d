//! Session id resolution for inbound chat requests.
//!
//! Precedence: explicit client id, then the caller's network address, then
//! a shared fallback. This is the only partitioning mechanism, so the order
//! must not change.

use std::net::IpAddr;

/// Session used when neither a client id nor a peer address is known.
pub const DEFAULT_SESSION_ID: &str = "default";

/// Pick the session id for a request.
///
/// Blank client ids are treated as absent.
pub fn resolve_session_id(client_id: Option<&str>, peer: Option<IpAddr>) -> String {
    if let Some(id) = client_id.filter(|id| !id.is_empty()) {
        return id.to_owned();
    }
    match peer {
        Some(ip) => ip.to_string(),
        None => DEFAULT_SESSION_ID.to_owned(),
    }
}
