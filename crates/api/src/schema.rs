//! Wire types shared with the booking backend.
//!
//! All timestamps travel as RFC 3339 strings, dates as `YYYY-MM-DD`, months
//! as `YYYY-MM`; the bot formats them for display but never re-interprets
//! them beyond that.

use serde::{Deserialize, Serialize};

/// A registered user as the backend reports it.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct ApiUser {
    pub id: String,
    #[serde(default)]
    pub chat_id: Option<i64>,
    #[serde(default)]
    pub username: String,
    pub first_name: String,
    pub last_name: String,
    /// "client" or "professional".
    pub role: String,
    #[serde(default)]
    pub phone_number: Option<String>,
}

/// Client or professional details embedded in an appointment payload.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct Person {
    pub id: String,
    pub first_name: String,
    pub last_name: String,
    #[serde(default)]
    pub phone_number: Option<String>,
    #[serde(default)]
    pub chat_id: Option<i64>,
}

/// An appointment in any status; cancellation fields are present only on
/// cancelled ones and counterparty refs only where the endpoint embeds them.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct Appointment {
    pub id: String,
    #[serde(default, rename = "type")]
    pub kind: String,
    pub start_time: String,
    pub end_time: String,
    pub status: String,
    #[serde(default)]
    pub description: Option<String>,
    #[serde(default)]
    pub cancellation_reason: Option<String>,
    #[serde(default)]
    pub client: Option<Person>,
    #[serde(default)]
    pub professional: Option<Person>,
}

/// Create / confirm / cancel responses all return the appointment plus both
/// parties, which the handlers use for counterparty notifications.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct AppointmentEnvelope {
    pub appointment: Appointment,
    #[serde(default)]
    pub client: Option<Person>,
    #[serde(default)]
    pub professional: Option<Person>,
}

/// A client who has booked with the professional before, as the history
/// picker lists them.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct ClientSummary {
    pub id: String,
    pub first_name: String,
    pub last_name: String,
}

/// One entry of a client's appointment history with a professional.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct PreviousAppointment {
    pub id: String,
    pub start_time: String,
    pub end_time: String,
    #[serde(default)]
    pub description: Option<String>,
}

/// One bookable slot of a professional's day.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct TimeSlot {
    pub start_time: String,
    pub end_time: String,
    pub available: bool,
    /// "appointment", "unavailable", or absent when free.
    #[serde(default, rename = "type")]
    pub kind: Option<String>,
    #[serde(default)]
    pub description: Option<String>,
}

/// A professional's slots for one date. Also the shape of the timetable
/// endpoint.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct Availability {
    pub date: String,
    pub slots: Vec<TimeSlot>,
}

#[derive(Debug, Clone, Serialize)]
pub struct RegisterRequest {
    pub first_name: String,
    pub last_name: String,
    pub chat_id: i64,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub phone_number: Option<String>,
    pub role: String,
}

#[derive(Debug, Clone, Serialize)]
pub struct SignInRequest {
    pub username: String,
    pub password: String,
    pub chat_id: i64,
}

#[derive(Debug, Clone, Serialize)]
pub struct CreateAppointmentRequest {
    pub client_id: String,
    pub professional_id: String,
    pub start_time: String,
    pub end_time: String,
}

#[derive(Debug, Clone, Serialize)]
pub struct CreateUnavailableRequest {
    pub professional_id: String,
    pub start_at: String,
    pub end_at: String,
    pub description: String,
}
