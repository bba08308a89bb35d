//! AppState construction and background-task spawning, shared by `serve`
//! and the integration tests.

use std::sync::Arc;
use std::time::Duration;

use anyhow::Context;

use guru_domain::config::{Config, ConfigSeverity};
use guru_providers::{LlmProvider, OpenAiCompatProvider};
use guru_relay::RelayForwarder;

use crate::runtime::keepalive;
use crate::runtime::persona::Persona;
use crate::state::AppState;

/// Validate config, resolve secrets from the environment and return a
/// fully-wired [`AppState`]. Any missing secret aborts startup.
pub fn build_app_state(config: Arc<Config>) -> anyhow::Result<AppState> {
    // ── Config validation ────────────────────────────────────────────
    let issues = config.validate();
    for issue in &issues {
        match issue.severity {
            ConfigSeverity::Warning => tracing::warn!("config: {issue}"),
            ConfigSeverity::Error => tracing::error!("config: {issue}"),
        }
    }
    let error_count = issues
        .iter()
        .filter(|i| i.severity == ConfigSeverity::Error)
        .count();
    if error_count > 0 {
        anyhow::bail!("config validation failed with {error_count} error(s)");
    }

    // ── Model provider ───────────────────────────────────────────────
    let llm: Arc<dyn LlmProvider> = Arc::new(
        OpenAiCompatProvider::from_config(
            &config.llm.provider,
            Duration::from_millis(config.llm.timeout_ms),
        )
        .context("initializing model provider")?,
    );
    tracing::info!(
        provider = %config.llm.provider.id,
        base_url = %config.llm.provider.base_url,
        summarizer_model = %config.llm.summarizer.model,
        reply_model = %config.llm.reply.model,
        "model provider ready"
    );

    // ── Backend relay ────────────────────────────────────────────────
    let relay = RelayForwarder::from_config(&config.backend).context("initializing backend relay")?;
    tracing::info!(base_url = %relay.base_url(), "backend relay ready");

    // ── Persona ──────────────────────────────────────────────────────
    let persona = Persona::load_or_bundled(&config.persona.path).context("loading persona")?;

    let state = AppState::new(config.clone(), llm, persona, relay);
    tracing::info!(
        max_history = state.sessions.max_history(),
        "session store ready"
    );

    Ok(state)
}

/// Spawn the loops that run for the life of the server.
pub fn spawn_background_tasks(state: &AppState) {
    if keepalive::spawn(&state.config.keepalive).is_none() {
        tracing::debug!("keepalive ping disabled");
    }
}
