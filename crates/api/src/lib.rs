//! Client for the backend booking service.
//!
//! [`BookingApi`] is the seam the flow handlers program against; the
//! [`HttpBookingApi`] implementation speaks JSON over REST to the booking
//! backend, forwarding each event's request id as `X-Request-ID` so backend
//! logs correlate with bot logs. Token *signing* lives outside this crate:
//! the client is handed a ready bearer token at construction.

pub mod client;
pub mod error;
pub mod schema;

pub use {
    client::{BookingApi, HttpBookingApi},
    error::{Error, Result},
    schema::{
        ApiUser, Appointment, AppointmentEnvelope, Availability, ClientSummary,
        CreateAppointmentRequest, CreateUnavailableRequest, Person, PreviousAppointment,
        RegisterRequest, SignInRequest, TimeSlot,
    },
};
