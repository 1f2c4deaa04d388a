//! Per-chat serialization.
//!
//! The store alone only makes single `get`/`set` calls atomic; two workers
//! handling events from the same chat could still interleave their
//! load → mutate → store sequences and lose an update. The dispatcher takes
//! the chat's lock before invoking any handler and holds it until the handler
//! finishes, so events for one chat execute strictly one at a time while
//! different chats proceed in parallel.

use {
    std::{
        collections::HashMap,
        sync::{Arc, Mutex},
    },
    tokio::sync::{Mutex as AsyncMutex, OwnedMutexGuard},
};

/// Lazily-populated map of chat id → async mutex.
///
/// The outer std mutex guards the map itself and is never held across an
/// `.await`; the inner tokio mutex is the one held for the duration of an
/// event's handling. Entries are never pruned.
#[derive(Debug, Default)]
pub struct ChatLocks {
    inner: Mutex<HashMap<i64, Arc<AsyncMutex<()>>>>,
}

impl ChatLocks {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Acquire the chat's lock, waiting behind any event for the same chat
    /// that is already being handled.
    pub async fn lock(&self, chat_id: i64) -> OwnedMutexGuard<()> {
        let cell = {
            let mut map = self.inner.lock().unwrap_or_else(|e| e.into_inner());
            Arc::clone(map.entry(chat_id).or_default())
        };
        cell.lock_owned().await
    }
}
