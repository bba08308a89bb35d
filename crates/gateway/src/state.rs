use std::sync::Arc;

use guru_domain::config::Config;
use guru_providers::LlmProvider;
use guru_relay::RelayForwarder;
use guru_sessions::SessionStore;

use crate::runtime::persona::Persona;
use crate::runtime::session_lock::SessionLockMap;
use crate::runtime::{ChatPipeline, ReplyEngine, Summarizer};

/// Shared application state passed to all API handlers.
#[derive(Clone)]
pub struct AppState {
    // ── Core services ─────────────────────────────────────────────────
    pub config: Arc<Config>,
    pub relay: Arc<RelayForwarder>,

    // ── Session management ────────────────────────────────────────────
    pub sessions: Arc<SessionStore>,

    // ── Runtime ───────────────────────────────────────────────────────
    pub pipeline: Arc<ChatPipeline>,
}

impl AppState {
    /// Wire the runtime around an already-built model provider and relay.
    pub fn new(
        config: Arc<Config>,
        llm: Arc<dyn LlmProvider>,
        persona: Persona,
        relay: RelayForwarder,
    ) -> Self {
        let sessions = Arc::new(SessionStore::from_config(&config.sessions));
        let summarizer = Summarizer::new(llm.clone(), &config.llm.summarizer);
        let engine = ReplyEngine::new(
            llm,
            Arc::new(persona),
            config.llm.reply.clone(),
            sessions.clone(),
        );
        let pipeline = Arc::new(ChatPipeline::new(
            sessions.clone(),
            Arc::new(SessionLockMap::new()),
            summarizer,
            engine,
        ));

        Self {
            config,
            relay: Arc::new(relay),
            sessions,
            pipeline,
        }
    }
}
