//! One chat turn: store the user message, refresh the digest, reply.

use std::sync::Arc;

use guru_domain::error::Result;
use guru_domain::message::Turn;
use guru_domain::trace::TraceEvent;
use guru_sessions::SessionStore;

use super::reply::{prior_turns, ReplyEngine};
use super::session_lock::SessionLockMap;
use super::summarizer::Summarizer;

/// Outcome of a step whose failure must not fail the turn.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum BestEffort<T> {
    Done(T),
    Degraded { reason: String },
}

pub struct ChatPipeline {
    sessions: Arc<SessionStore>,
    locks: Arc<SessionLockMap>,
    summarizer: Summarizer,
    engine: ReplyEngine,
}

impl ChatPipeline {
    pub fn new(
        sessions: Arc<SessionStore>,
        locks: Arc<SessionLockMap>,
        summarizer: Summarizer,
        engine: ReplyEngine,
    ) -> Self {
        Self {
            sessions,
            locks,
            summarizer,
            engine,
        }
    }

    pub fn sessions(&self) -> &Arc<SessionStore> {
        &self.sessions
    }

    /// Run a full turn for `session_id`. Turns on the same session are
    /// serialized; the digest step never fails the turn, the reply step does.
    pub async fn run_turn(&self, session_id: &str, message: &str) -> Result<String> {
        let _turn = self.locks.acquire(session_id).await;

        if self.sessions.get_or_create(session_id) {
            tracing::debug!(session_id, "new session");
        }
        self.sessions.append_turn(session_id, Turn::user(message));

        if let BestEffort::Degraded { reason } = self.refresh_digest(session_id, message).await {
            tracing::warn!(
                session_id,
                reason = %reason,
                "digest refresh failed, keeping previous digest"
            );
        }

        self.engine.reply(session_id, message).await
    }

    async fn refresh_digest(&self, session_id: &str, message: &str) -> BestEffort<String> {
        let history = self.sessions.history(session_id);
        match self
            .summarizer
            .summarize(prior_turns(&history, message), message)
            .await
        {
            Ok(digest) => {
                TraceEvent::DigestUpdated {
                    session_id: session_id.to_owned(),
                    digest_chars: digest.chars().count(),
                }
                .emit();
                self.sessions.set_digest(session_id, digest.clone());
                BestEffort::Done(digest)
            }
            Err(e) => {
                let reason = e.to_string();
                TraceEvent::DigestRetained {
                    session_id: session_id.to_owned(),
                    reason: reason.clone(),
                }
                .emit();
                BestEffort::Degraded { reason }
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::time::Duration;

    use crate::runtime::persona::Persona;
    use crate::runtime::testing::{text_response, ScriptedProvider};
    use guru_domain::config::{ReplyConfig, SummarizerConfig};
    use guru_domain::error::Error;
    use guru_domain::message::TurnRole;

    const NEUTRAL: &str = "User begins the session calm and curious.";

    fn pipeline(provider: Arc<ScriptedProvider>) -> ChatPipeline {
        let sessions = Arc::new(SessionStore::new(6, NEUTRAL));
        let persona = Arc::new(Persona::new("Speak softly.").unwrap());
        ChatPipeline::new(
            sessions.clone(),
            Arc::new(SessionLockMap::new()),
            Summarizer::new(provider.clone(), &SummarizerConfig::default()),
            ReplyEngine::new(provider, persona, ReplyConfig::default(), sessions),
        )
    }

    #[tokio::test]
    async fn digest_runs_before_reply_and_feeds_it() {
        let provider =
            ScriptedProvider::two_stage("gpt-4o-mini", Ok("User feels lost."), "You are found.")
                .into_arc();
        let pipeline = pipeline(provider.clone());

        let reply = pipeline.run_turn("s1", "I feel lost").await.unwrap();
        assert_eq!(reply, "You are found.");

        let reqs = provider.requests();
        assert_eq!(reqs.len(), 2);
        assert_eq!(reqs[0].model, "gpt-4o-mini");
        assert_eq!(reqs[1].model, "gpt-4o");
        assert_eq!(reqs[1].messages[1].content, "Context summary: User feels lost.");
        assert_eq!(pipeline.sessions().digest("s1"), "User feels lost.");
        assert_eq!(
            pipeline.sessions().history("s1"),
            vec![Turn::user("I feel lost"), Turn::assistant("You are found.")]
        );
    }

    #[tokio::test]
    async fn digest_failure_keeps_previous_digest_and_still_replies() {
        let provider = ScriptedProvider::two_stage(
            "gpt-4o-mini",
            Err(Error::Timeout("summarizer".into())),
            "Still here.",
        )
        .into_arc();
        let pipeline = pipeline(provider.clone());

        let reply = pipeline.run_turn("s1", "hello").await.unwrap();
        assert_eq!(reply, "Still here.");
        assert_eq!(pipeline.sessions().digest("s1"), NEUTRAL);
        assert_eq!(
            provider.requests()[1].messages[1].content,
            format!("Context summary: {NEUTRAL}")
        );
    }

    #[tokio::test]
    async fn reply_failure_fails_the_turn_but_keeps_user_turn() {
        let provider = ScriptedProvider::new(|req| {
            if req.model == "gpt-4o-mini" {
                Ok(text_response("User says hello."))
            } else {
                Err(Error::Provider {
                    provider: "scripted".into(),
                    message: "HTTP 500".into(),
                })
            }
        })
        .into_arc();
        let pipeline = pipeline(provider);

        assert!(pipeline.run_turn("s1", "hello").await.is_err());
        assert_eq!(pipeline.sessions().history("s1"), vec![Turn::user("hello")]);
    }

    #[tokio::test]
    async fn history_stays_capped_across_turns() {
        let provider = ScriptedProvider::two_stage("gpt-4o-mini", Ok("d"), "ok").into_arc();
        let pipeline = pipeline(provider);

        for i in 0..5 {
            pipeline.run_turn("s1", &format!("m{i}")).await.unwrap();
        }

        let history = pipeline.sessions().history("s1");
        assert_eq!(history.len(), 6);
        assert_eq!(history[0], Turn::user("m2"));
        assert_eq!(history[5], Turn::assistant("ok"));
    }

    #[tokio::test]
    async fn sessions_do_not_see_each_other() {
        let provider = ScriptedProvider::two_stage("gpt-4o-mini", Ok("d"), "ok").into_arc();
        let pipeline = pipeline(provider.clone());

        pipeline.run_turn("alice", "my secret is blue").await.unwrap();
        pipeline.run_turn("bob", "hi").await.unwrap();

        let bob_reqs: Vec<_> = provider.requests().into_iter().skip(2).collect();
        for req in bob_reqs {
            assert!(req.messages.iter().all(|m| !m.content.contains("blue")));
        }
        assert_eq!(pipeline.sessions().history("bob").len(), 2);
    }

    #[tokio::test]
    async fn concurrent_turns_on_one_session_do_not_interleave() {
        let provider = ScriptedProvider::two_stage("gpt-4o-mini", Ok("d"), "ok")
            .with_delay(Duration::from_millis(20))
            .into_arc();
        let pipeline = Arc::new(pipeline(provider));

        let a = {
            let p = pipeline.clone();
            tokio::spawn(async move { p.run_turn("s1", "first").await })
        };
        let b = {
            let p = pipeline.clone();
            tokio::spawn(async move { p.run_turn("s1", "second").await })
        };
        a.await.unwrap().unwrap();
        b.await.unwrap().unwrap();

        let roles: Vec<_> = pipeline
            .sessions()
            .history("s1")
            .into_iter()
            .map(|t| t.role)
            .collect();
        assert_eq!(
            roles,
            vec![
                TurnRole::User,
                TurnRole::Assistant,
                TurnRole::User,
                TurnRole::Assistant
            ]
        );
    }
}
