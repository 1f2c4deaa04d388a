//! In-memory session map.
//!
//! std `RwLock` because every operation is a synchronous map access, never
//! held across an `.await` point. The lock only makes individual calls
//! atomic; multi-step read-then-write sequences rely on the per-chat
//! serialization in [`crate::guard::ChatLocks`].

use {
    std::collections::HashMap,
    std::sync::RwLock,
    tracing::debug,
};

use crate::session::Session;

/// Concurrent chat-id → [`Session`] map. All state is process memory; a
/// restart loses every session and chats restart their flows from scratch.
#[derive(Debug, Default)]
pub struct SessionStore {
    inner: RwLock<HashMap<i64, Session>>,
}

impl SessionStore {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Copy of the chat's session, or `None` when the chat has no active
    /// session (callers reply "please /start").
    #[must_use]
    pub fn get(&self, chat_id: i64) -> Option<Session> {
        self.inner
            .read()
            .unwrap_or_else(|e| e.into_inner())
            .get(&chat_id)
            .cloned()
    }

    /// Replace the chat's whole record.
    pub fn set(&self, chat_id: i64, session: Session) {
        self.inner
            .write()
            .unwrap_or_else(|e| e.into_inner())
            .insert(chat_id, session);
    }

    /// Drop the chat's session. Used only by the sign-in failure rollback.
    pub fn remove(&self, chat_id: i64) {
        let removed = self
            .inner
            .write()
            .unwrap_or_else(|e| e.into_inner())
            .remove(&chat_id)
            .is_some();
        if removed {
            debug!(chat_id, "session removed");
        }
    }

    #[must_use]
    pub fn count(&self) -> usize {
        self.inner.read().unwrap_or_else(|e| e.into_inner()).len()
    }

    /// Chat ids with an active session, for diagnostics.
    #[must_use]
    pub fn chat_ids(&self) -> Vec<i64> {
        self.inner
            .read()
            .unwrap_or_else(|e| e.into_inner())
            .keys()
            .copied()
            .collect()
    }
}
