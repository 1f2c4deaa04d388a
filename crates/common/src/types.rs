//! Inbound event shape shared by the dispatcher and the transport layer.

use serde::{Deserialize, Serialize};

/// One inbound unit from the messaging platform. Exactly one variant per update.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub enum Event {
    /// A plain text message typed by the user.
    Message {
        chat_id: i64,
        message_id: i32,
        user_id: u64,
        text: String,
    },
    /// An inline keyboard button press carrying a callback-data payload.
    Callback {
        chat_id: i64,
        message_id: i32,
        user_id: u64,
        query_id: String,
        data: String,
    },
}

impl Event {
    /// The conversation this event belongs to. Per-chat serialization keys on this.
    #[must_use]
    pub fn chat_id(&self) -> i64 {
        match self {
            Self::Message { chat_id, .. } | Self::Callback { chat_id, .. } => *chat_id,
        }
    }

    #[must_use]
    pub fn message_id(&self) -> i32 {
        match self {
            Self::Message { message_id, .. } | Self::Callback { message_id, .. } => *message_id,
        }
    }
}
