use serde::Serialize;

/// Structured trace events emitted across all guru crates.
#[derive(Debug, Clone, Serialize)]
#[serde(tag = "event")]
pub enum TraceEvent {
    SessionResolved {
        session_id: String,
        is_new: bool,
    },
    DigestUpdated {
        session_id: String,
        digest_chars: usize,
    },
    DigestRetained {
        session_id: String,
        reason: String,
    },
    LlmRequest {
        provider: String,
        model: String,
        role: String,
        duration_ms: u64,
        prompt_tokens: Option<u32>,
        completion_tokens: Option<u32>,
    },
    BackendRelay {
        method: String,
        path: String,
        status: Option<u16>,
        duration_ms: u64,
    },
    KeepAlivePing {
        url: String,
        ok: bool,
    },
}

impl TraceEvent {
    pub fn emit(&self) {
        let json = serde_json::to_string(self).unwrap_or_default();
        tracing::info!(trace_event = %json, "guru_event");
    }
}
