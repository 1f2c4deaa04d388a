use {crate::session::FlowState, thiserror::Error};

#[derive(Debug, Error)]
pub enum Error {
    /// No session exists for the chat. Callers reply "please /start".
    #[error("no active session for chat {chat_id}")]
    NotFound { chat_id: i64 },

    /// The operation's allow-set does not contain the session's current state.
    /// The session is guaranteed untouched when this is returned.
    #[error("operation not allowed in state {current:?}")]
    InvalidState { current: FlowState },
}

pub type Result<T> = std::result::Result<T, Error>;
