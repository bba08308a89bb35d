//! Context digest: one short sentence about the user's emotional state
//! and topic, produced by a small model before each reply.

use std::sync::Arc;
use std::time::Instant;

use guru_domain::config::SummarizerConfig;
use guru_domain::error::{Error, Result};
use guru_domain::message::{Message, Turn};
use guru_domain::trace::TraceEvent;
use guru_providers::{ChatRequest, LlmProvider};

pub const DIGEST_INSTRUCTION: &str = "Summarise the emotional state and main topic of this \
exchange in one short sentence.\nKeep tone factual, e.g., \"User feels anxious about finances \
and wants reassurance.\"";

pub struct Summarizer {
    llm: Arc<dyn LlmProvider>,
    model: String,
    max_tokens: u32,
}

impl Summarizer {
    pub fn new(llm: Arc<dyn LlmProvider>, cfg: &SummarizerConfig) -> Self {
        Self {
            llm,
            model: cfg.model.clone(),
            max_tokens: cfg.max_tokens,
        }
    }

    /// Instruction, then prior history, then the new message.
    pub fn build_request(&self, history: &[Turn], new_message: &str) -> ChatRequest {
        let mut messages = Vec::with_capacity(history.len() + 2);
        messages.push(Message::system(DIGEST_INSTRUCTION));
        messages.extend(history.iter().map(Message::from));
        messages.push(Message::user(new_message));

        ChatRequest {
            messages,
            max_tokens: Some(self.max_tokens),
            model: self.model.clone(),
            ..Default::default()
        }
    }

    /// Produce a fresh digest. An empty completion counts as a failure so
    /// the caller keeps its previous digest.
    pub async fn summarize(&self, history: &[Turn], new_message: &str) -> Result<String> {
        let req = self.build_request(history, new_message);

        let start = Instant::now();
        let resp = self.llm.chat(&req).await?;

        TraceEvent::LlmRequest {
            provider: self.llm.provider_id().to_owned(),
            model: resp.model.clone(),
            role: "summarizer".into(),
            duration_ms: start.elapsed().as_millis() as u64,
            prompt_tokens: resp.usage.map(|u| u.prompt_tokens),
            completion_tokens: resp.usage.map(|u| u.completion_tokens),
        }
        .emit();

        resp.content.ok_or_else(|| Error::Provider {
            provider: self.llm.provider_id().to_owned(),
            message: "empty digest completion".into(),
        })
    }
}
