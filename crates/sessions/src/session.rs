//! The per-chat session record and the state-machine guard.

use {
    serde::{Deserialize, Serialize},
    crate::error::{Error, Result},
};

/// Which side of the booking the chat belongs to.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Role {
    Client,
    Professional,
}

impl Role {
    #[must_use]
    pub fn as_str(self) -> &'static str {
        match self {
            Self::Client => "client",
            Self::Professional => "professional",
        }
    }
}

/// Current step of the chat's active flow.
///
/// A session runs at most one flow at a time; every flow starts from `Idle`
/// and returns to `Idle` on completion or cancellation, which is what lets
/// one field multiplex all flows safely.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum FlowState {
    #[default]
    Idle,
    // Client registration
    AwaitingFirstName,
    AwaitingLastName,
    AwaitingPhone,
    // Professional sign-in
    AwaitingUsername,
    AwaitingPassword,
    // Booking
    AwaitingProfessionalSelection,
    AwaitingDateSelection,
    AwaitingTimeSelection,
    // Cancellation
    AwaitingCancellationReason,
    // Unavailable period
    AwaitingUnavailableDate,
    AwaitingUnavailableStartTime,
    AwaitingUnavailableEndTime,
    AwaitingUnavailableDescription,
}

/// One chat's conversation state. Created on first contact, owned by the
/// [`SessionStore`](crate::store::SessionStore), mutated only through
/// load → edit local copy → store.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Session {
    /// Backend user id, set once registration / sign-in succeeds.
    pub backend_id: String,
    pub role: Option<Role>,
    pub state: FlowState,

    // Profile collected during registration / sign-in.
    pub username: String,
    pub first_name: String,
    pub last_name: String,
    pub phone_number: Option<String>,

    // Transient selections for the flow in progress.
    pub selected_professional_id: String,
    pub selected_date: String,
    pub selected_time: String,
    pub selected_appointment_id: String,
    pub selected_client_id: String,
    pub unavailable_start: String,
    pub unavailable_end: String,
    pub unavailable_description: String,

    /// Most recent keyboard message, replaced as the flow advances.
    pub last_message_id: Option<i32>,
    /// Keyboard messages to delete when the chat returns to a dashboard.
    pub messages_to_delete: Vec<i32>,
}

impl Session {
    /// Fresh session entering a flow with the given role.
    #[must_use]
    pub fn with_role(role: Role, state: FlowState) -> Self {
        Self {
            role: Some(role),
            state,
            ..Self::default()
        }
    }

    /// Guard: succeed only when the current state is in the operation's
    /// allow-set. On failure the session is untouched and the caller must
    /// emit the state-violation reply instead of the normal result.
    pub fn ensure_state(&self, allowed: &[FlowState]) -> Result<()> {
        if allowed.contains(&self.state) {
            Ok(())
        } else {
            Err(Error::InvalidState {
                current: self.state,
            })
        }
    }

    /// Return to `Idle` and drop every transient selection. Profile fields,
    /// the cleanup list, and `last_message_id` survive.
    pub fn clear_flow(&mut self) {
        self.state = FlowState::Idle;
        self.selected_professional_id.clear();
        self.selected_date.clear();
        self.selected_time.clear();
        self.selected_appointment_id.clear();
        self.selected_client_id.clear();
        self.unavailable_start.clear();
        self.unavailable_end.clear();
        self.unavailable_description.clear();
    }

    /// Record a sent keyboard message for later cleanup. Ids are tracked at
    /// most once so no flow inherits duplicates from an earlier one.
    pub fn track_message(&mut self, message_id: i32) {
        self.last_message_id = Some(message_id);
        if !self.messages_to_delete.contains(&message_id) {
            self.messages_to_delete.push(message_id);
        }
    }

    /// Drain the cleanup list. The caller deletes the returned ids; the list
    /// is empty afterwards either way.
    pub fn take_cleanup(&mut self) -> Vec<i32> {
        self.last_message_id = None;
        std::mem::take(&mut self.messages_to_delete)
    }
}
