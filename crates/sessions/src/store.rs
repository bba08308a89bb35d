//! Gateway-owned session store.
//!
//! Each session id maps to a rolling window of at most `max_history` turns
//! and a one-line context digest. Nothing is persisted: a restart starts
//! every session from scratch.

use std::collections::{HashMap, VecDeque};

use parking_lot::RwLock;

use guru_domain::config::SessionsConfig;
use guru_domain::message::Turn;
use guru_domain::trace::TraceEvent;

// ━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━
// Session entry
// ━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━

struct SessionEntry {
    history: VecDeque<Turn>,
    digest: String,
}

impl SessionEntry {
    fn new(digest: &str) -> Self {
        Self {
            history: VecDeque::new(),
            digest: digest.to_owned(),
        }
    }
}

// ━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━
// Session store
// ━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━

/// Process-wide map of session id to bounded history and digest.
///
/// Every method takes the lock only for the duration of a map operation;
/// callers that need a whole turn to be atomic serialize on a per-session
/// lock outside the store.
pub struct SessionStore {
    max_history: usize,
    default_digest: String,
    sessions: RwLock<HashMap<String, SessionEntry>>,
}

impl SessionStore {
    pub fn new(max_history: usize, default_digest: impl Into<String>) -> Self {
        Self {
            max_history: max_history.max(1),
            default_digest: default_digest.into(),
            sessions: RwLock::new(HashMap::new()),
        }
    }

    pub fn from_config(cfg: &SessionsConfig) -> Self {
        Self::new(cfg.max_history, cfg.default_digest.clone())
    }

    pub fn max_history(&self) -> usize {
        self.max_history
    }

    /// Make sure `session_id` exists. Returns `true` when it was just created.
    pub fn get_or_create(&self, session_id: &str) -> bool {
        // Fast path: session already exists.
        if self.sessions.read().contains_key(session_id) {
            return false;
        }

        // Slow path: another task may have created it between the locks.
        let mut sessions = self.sessions.write();
        let mut is_new = false;
        sessions.entry(session_id.to_owned()).or_insert_with(|| {
            is_new = true;
            SessionEntry::new(&self.default_digest)
        });
        drop(sessions);

        if is_new {
            TraceEvent::SessionResolved {
                session_id: session_id.to_owned(),
                is_new: true,
            }
            .emit();
        }

        is_new
    }

    /// Append a turn, then drop the oldest turns beyond `max_history`.
    pub fn append_turn(&self, session_id: &str, turn: Turn) {
        let mut sessions = self.sessions.write();
        let entry = sessions
            .entry(session_id.to_owned())
            .or_insert_with(|| SessionEntry::new(&self.default_digest));

        entry.history.push_back(turn);
        while entry.history.len() > self.max_history {
            entry.history.pop_front();
        }
    }

    /// Replace the session's context digest.
    pub fn set_digest(&self, session_id: &str, digest: impl Into<String>) {
        let mut sessions = self.sessions.write();
        let entry = sessions
            .entry(session_id.to_owned())
            .or_insert_with(|| SessionEntry::new(&self.default_digest));
        entry.digest = digest.into();
    }

    /// Current digest, or the neutral default for unknown sessions.
    pub fn digest(&self, session_id: &str) -> String {
        self.sessions
            .read()
            .get(session_id)
            .map(|entry| entry.digest.clone())
            .unwrap_or_else(|| self.default_digest.clone())
    }

    /// Current history in insertion order (empty for unknown sessions).
    pub fn history(&self, session_id: &str) -> Vec<Turn> {
        self.sessions
            .read()
            .get(session_id)
            .map(|entry| entry.history.iter().cloned().collect())
            .unwrap_or_default()
    }

    /// Number of live sessions.
    pub fn len(&self) -> usize {
        self.sessions.read().len()
    }

    pub fn is_empty(&self) -> bool {
        self.sessions.read().is_empty()
    }
}

// ━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━
// Tests
// ━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━
