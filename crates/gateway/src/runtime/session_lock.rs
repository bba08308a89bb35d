//! Per-session turn serialization.
//!
//! A chat turn reads and writes the session's history and digest across two
//! model calls, so turns on one session must not overlap. Turns on different
//! sessions run freely.

use std::collections::HashMap;
use std::sync::Arc;

use parking_lot::Mutex;
use tokio::sync::{Mutex as TurnMutex, OwnedMutexGuard};

/// Held for the duration of one turn; releases on drop.
pub type TurnGuard = OwnedMutexGuard<()>;

/// Idle entries are swept once the map grows past this many sessions.
const PRUNE_THRESHOLD: usize = 1024;

#[derive(Default)]
pub struct SessionLockMap {
    locks: Mutex<HashMap<String, Arc<TurnMutex<()>>>>,
}

impl SessionLockMap {
    pub fn new() -> Self {
        Self::default()
    }

    /// Wait until no other turn holds `session_id`, then take it.
    /// Waiters are served in arrival order.
    pub async fn acquire(&self, session_id: &str) -> TurnGuard {
        let turn_lock = {
            let mut locks = self.locks.lock();
            if locks.len() >= PRUNE_THRESHOLD {
                prune(&mut locks);
            }
            locks
                .entry(session_id.to_owned())
                .or_insert_with(|| Arc::new(TurnMutex::new(())))
                .clone()
        };
        turn_lock.lock_owned().await
    }
}

// Drop entries nobody holds or waits on. The map's own reference is the
// only one left when a lock is idle.
fn prune(locks: &mut HashMap<String, Arc<TurnMutex<()>>>) {
    locks.retain(|_, lock| Arc::strong_count(lock) > 1);
}
