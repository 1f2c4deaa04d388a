//! Callback-data vocabulary.
//!
//! Keyboards build payloads from these constants and the router resolves
//! them, so the two sides can never drift apart.

// Exact tokens.
pub const CLIENT: &str = "client";
pub const PROFESSIONAL: &str = "professional";
pub const BOOK_APPOINTMENT: &str = "book_appointment";
pub const PENDING_APPOINTMENTS: &str = "pending_appointments";
pub const UPCOMING_APPOINTMENTS: &str = "upcoming_appointments";
pub const CANCEL_BOOKING: &str = "cancel_booking";
pub const PROFESSIONAL_PENDING_APPOINTMENTS: &str = "professional_pending_appointments";
pub const PROFESSIONAL_UPCOMING_APPOINTMENTS: &str = "professional_upcoming_appointments";
pub const PROFESSIONAL_TIMETABLE: &str = "professional_timetable";
pub const PROFESSIONAL_PREVIOUS_APPOINTMENTS: &str = "professional_previous_appointments";
pub const SET_UNAVAILABLE: &str = "set_unavailable";
pub const CANCEL_UNAVAILABLE: &str = "cancel_unavailable";
pub const BACK_TO_DASHBOARD: &str = "back_to_dashboard";

// Prefixes; the remainder after the prefix is the handler parameter.
pub const PREV_MONTH: &str = "prev_month_";
pub const NEXT_MONTH: &str = "next_month_";
pub const SELECT_PROFESSIONAL: &str = "select_professional_";
pub const SELECT_DATE: &str = "select_date_";
pub const SELECT_TIME: &str = "select_time_";
pub const CANCEL_APPOINTMENT: &str = "cancel_appointment_";
pub const CONFIRM_APPOINTMENT: &str = "confirm_appointment_";
pub const CANCEL_PROF_APPOINTMENT: &str = "cancel_prof_appt_";
pub const SELECT_CLIENT: &str = "select_client_";
pub const PREV_PREVIOUS_MONTH: &str = "prev_previous_month_";
pub const NEXT_PREVIOUS_MONTH: &str = "next_previous_month_";
pub const PREV_UPCOMING_MONTH: &str = "prev_upcoming_month_";
pub const NEXT_UPCOMING_MONTH: &str = "next_upcoming_month_";
pub const SELECT_UPCOMING_DATE: &str = "select_upcoming_date_";
pub const PREV_TIMETABLE_DAY: &str = "prev_timetable_day_";
pub const NEXT_TIMETABLE_DAY: &str = "next_timetable_day_";
pub const PREV_UNAVAILABLE_MONTH: &str = "prev_unavailable_month_";
pub const NEXT_UNAVAILABLE_MONTH: &str = "next_unavailable_month_";
pub const SELECT_UNAVAILABLE_DATE: &str = "select_unavailable_date_";
pub const SELECT_UNAVAILABLE_START: &str = "select_unavailable_start_";
pub const SELECT_UNAVAILABLE_END: &str = "select_unavailable_end_";

/// Build a payload from a prefix and its parameter.
#[must_use]
pub fn callback_data(prefix: &str, param: &str) -> String {
    format!("{prefix}{param}")
}
