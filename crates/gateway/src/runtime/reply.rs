//! Reply generation in the persona's voice.

use std::sync::Arc;
use std::time::Instant;

use guru_domain::config::ReplyConfig;
use guru_domain::error::Result;
use guru_domain::message::{Message, Turn, TurnRole};
use guru_domain::trace::TraceEvent;
use guru_providers::{ChatRequest, LlmProvider};
use guru_sessions::SessionStore;

use super::persona::Persona;

/// Stored and returned when the model produces no text.
pub const NO_REPLY_PLACEHOLDER: &str = "(no reply)";

pub struct ReplyEngine {
    llm: Arc<dyn LlmProvider>,
    persona: Arc<Persona>,
    cfg: ReplyConfig,
    sessions: Arc<SessionStore>,
}

impl ReplyEngine {
    pub fn new(
        llm: Arc<dyn LlmProvider>,
        persona: Arc<Persona>,
        cfg: ReplyConfig,
        sessions: Arc<SessionStore>,
    ) -> Self {
        Self {
            llm,
            persona,
            cfg,
            sessions,
        }
    }

    /// Prompt order: persona, digest note, prior turns, new message.
    pub fn compose_prompt(&self, digest: &str, history: &[Turn], message: &str) -> Vec<Message> {
        let mut messages = Vec::with_capacity(history.len() + 3);
        messages.push(Message::system(self.persona.text()));
        messages.push(Message::system(format!("Context summary: {digest}")));
        messages.extend(history.iter().map(Message::from));
        messages.push(Message::user(message));
        messages
    }

    fn build_request(&self, messages: Vec<Message>) -> ChatRequest {
        ChatRequest {
            messages,
            temperature: Some(self.cfg.temperature),
            presence_penalty: Some(self.cfg.presence_penalty),
            max_tokens: Some(self.cfg.max_tokens),
            stop: self.cfg.stop.clone(),
            model: self.cfg.model.clone(),
        }
    }

    /// Generate the reply for `message` and append it to the session as an
    /// assistant turn. The user turn is expected to be stored already.
    ///
    /// On error nothing is appended.
    pub async fn reply(&self, session_id: &str, message: &str) -> Result<String> {
        let history = self.sessions.history(session_id);
        let digest = self.sessions.digest(session_id);
        let prompt = self.compose_prompt(&digest, prior_turns(&history, message), message);
        let req = self.build_request(prompt);

        let start = Instant::now();
        let resp = self.llm.chat(&req).await?;

        TraceEvent::LlmRequest {
            provider: self.llm.provider_id().to_owned(),
            model: resp.model.clone(),
            role: "reply".into(),
            duration_ms: start.elapsed().as_millis() as u64,
            prompt_tokens: resp.usage.map(|u| u.prompt_tokens),
            completion_tokens: resp.usage.map(|u| u.completion_tokens),
        }
        .emit();

        let text = resp.content.unwrap_or_else(|| {
            tracing::warn!(session_id, "model returned no reply text");
            NO_REPLY_PLACEHOLDER.to_owned()
        });

        self.sessions.append_turn(session_id, Turn::assistant(text.clone()));
        Ok(text)
    }
}

/// History without the trailing copy of `message`, so the new message
/// appears exactly once at the end of the prompt.
pub(crate) fn prior_turns<'a>(history: &'a [Turn], message: &str) -> &'a [Turn] {
    match history.split_last() {
        Some((last, rest)) if last.role == TurnRole::User && last.content == message => rest,
        _ => history,
    }
}
