//! Chat runtime: the per-turn pipeline that ties the session store, the
//! digest summarizer and the reply engine together.
//!
//! Entry point: [`ChatPipeline::run_turn`].

pub mod keepalive;
pub mod persona;
pub mod pipeline;
pub mod reply;
pub mod session_lock;
pub mod summarizer;

#[cfg(test)]
pub(crate) mod testing;

pub use pipeline::{BestEffort, ChatPipeline};
pub use reply::{ReplyEngine, NO_REPLY_PLACEHOLDER};
pub use summarizer::Summarizer;
