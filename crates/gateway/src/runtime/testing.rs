//! In-memory model double for pipeline and API tests.

use std::sync::Arc;
use std::time::Duration;

use guru_domain::error::{Error, Result};
use guru_providers::{ChatRequest, ChatResponse, LlmProvider};
use parking_lot::Mutex;

type Handler = Box<dyn Fn(&ChatRequest) -> Result<ChatResponse> + Send + Sync>;

/// Answers every request through a closure and records what it was sent.
pub(crate) struct ScriptedProvider {
    handler: Handler,
    delay: Option<Duration>,
    requests: Mutex<Vec<ChatRequest>>,
}

impl ScriptedProvider {
    pub(crate) fn new(
        handler: impl Fn(&ChatRequest) -> Result<ChatResponse> + Send + Sync + 'static,
    ) -> Self {
        Self {
            handler: Box::new(handler),
            delay: None,
            requests: Mutex::new(Vec::new()),
        }
    }

    /// Digest requests (by model name) get `digest`, everything else `reply`.
    pub(crate) fn two_stage(
        summarizer_model: &str,
        digest: Result<&'static str>,
        reply: &'static str,
    ) -> Self {
        let summarizer_model = summarizer_model.to_owned();
        let digest = digest.map_err(|e| e.to_string());
        Self::new(move |req| {
            if req.model == summarizer_model {
                match &digest {
                    Ok(text) => Ok(text_response(text)),
                    Err(msg) => Err(Error::Timeout(msg.clone())),
                }
            } else {
                Ok(text_response(reply))
            }
        })
    }

    pub(crate) fn with_delay(mut self, delay: Duration) -> Self {
        self.delay = Some(delay);
        self
    }

    pub(crate) fn into_arc(self) -> Arc<Self> {
        Arc::new(self)
    }

    pub(crate) fn calls(&self) -> usize {
        self.requests.lock().len()
    }

    pub(crate) fn requests(&self) -> Vec<ChatRequest> {
        self.requests.lock().clone()
    }
}

#[async_trait::async_trait]
impl LlmProvider for ScriptedProvider {
    async fn chat(&self, req: &ChatRequest) -> Result<ChatResponse> {
        self.requests.lock().push(req.clone());
        if let Some(delay) = self.delay {
            tokio::time::sleep(delay).await;
        }
        (self.handler)(req)
    }

    fn provider_id(&self) -> &str {
        "scripted"
    }
}

pub(crate) fn text_response(text: &str) -> ChatResponse {
    ChatResponse {
        content: Some(text.to_owned()).filter(|t| !t.is_empty()),
        usage: None,
        model: "scripted".into(),
        finish_reason: Some("stop".into()),
    }
}
