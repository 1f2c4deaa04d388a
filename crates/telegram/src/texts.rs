//! User-facing message copy.
//!
//! Kept in one place so flows stay consistent about wording and emoji use.

use {
    bookline_api::{Appointment, Availability, PreviousAppointment},
    chrono::NaiveDate,
};

pub const WELCOME: &str = "👋 Welcome to the Booking Bot!\n\nPlease choose how you want to continue:";
pub const UNKNOWN_COMMAND: &str = "❓ Unknown command\n\nPlease use /start to begin.";
pub const SESSION_NOT_FOUND: &str = "❌ User session not found. Please use /start to begin.";
pub const INVALID_STATE: &str =
    "❌ This action is not available in your current state. Please use /start to begin a new session.";

pub const CLIENT_REGISTRATION: &str = "👤 Client Registration\n\nPlease enter your first name:";
pub const FIRST_NAME_SAVED: &str = "✅ First name saved!\n\nPlease enter your last name:";
pub const LAST_NAME_SAVED: &str =
    "✅ Last name saved!\n\nPlease enter your phone number (optional, or type \"skip\" to skip):";

pub const PROFESSIONAL_SIGN_IN: &str = "👨‍💼 Professional Sign In\n\nPlease enter your username:";
pub const USERNAME_SAVED: &str = "✅ Username saved!\n\nPlease enter your password:";

pub const SELECT_PROFESSIONAL: &str = "👨‍💼 Please select a professional:";
pub const NO_PROFESSIONALS: &str = "❌ No professionals available at the moment.";
pub const PAST_TIME_NOT_ALLOWED: &str =
    "❌ Cannot book appointments in the past. Please select a future time.";
pub const INVALID_TIME_FORMAT: &str = "❌ Invalid time format";
pub const INVALID_DATE_FORMAT: &str = "❌ Invalid date format";
pub const BOOKING_CANCELLED: &str = "❌ Booking cancelled. Returning to dashboard.";
pub const UNAVAILABLE_CANCELLED: &str =
    "❌ Unavailable appointment setting cancelled. Returning to dashboard.";

pub const NO_PENDING_APPOINTMENTS: &str = "📋 You have no pending appointments.";
pub const NO_UPCOMING_APPOINTMENTS: &str = "📋 You have no upcoming appointments.";
pub const PENDING_APPOINTMENTS_HEADER: &str = "⏳ Your Pending Appointments:\n\n";
pub const UPCOMING_APPOINTMENTS_HEADER: &str = "📋 Your Upcoming Appointments:\n\n";
pub const CANCELLATION_REASON: &str = "Please provide a reason for cancelling this appointment:";
pub const SELECT_UPCOMING_DATE: &str =
    "📅 Here are the dates with upcoming appointments. Select a date to view upcoming appointments:";
pub const NO_AVAILABLE_END_SLOTS: &str =
    "❌ No available time slots before your next unavailable period.";
pub const SELECT_CLIENT: &str = "👥 Select a client to view their previous appointments:";
pub const NO_CLIENTS: &str = "No clients found.";
pub const NO_APPOINTMENTS_FOR_MONTH: &str = "No appointments found for this month.";

/// Splits an RFC 3339 timestamp pair into (date, start, end) display parts.
/// Backend timestamps are already in the business timezone.
pub fn split_appointment_time(start_time: &str, end_time: &str) -> (String, String, String) {
    (
        slice_or_empty(start_time, 0, 10),
        slice_or_empty(start_time, 11, 16),
        slice_or_empty(end_time, 11, 16),
    )
}

fn slice_or_empty(s: &str, from: usize, to: usize) -> String {
    s.get(from..to).unwrap_or_default().to_string()
}

pub fn welcome_back(first_name: &str, role: &str) -> String {
    format!("👋 Welcome back, {first_name}!\n\nYou are registered as a {role}.\n\nWhat would you like to do?")
}

pub fn registration_successful(first_name: &str, last_name: &str, role: &str, chat_id: i64) -> String {
    format!("✅ Registration successful!\n\nWelcome, {first_name} {last_name}!\nRole: {role}\nChat ID: {chat_id}")
}

pub fn sign_in_successful(
    first_name: &str,
    last_name: &str,
    role: &str,
    username: &str,
    chat_id: i64,
) -> String {
    format!(
        "✅ Sign in successful!\n\nWelcome back, {first_name} {last_name}!\nRole: {role}\nUsername: {username}\nChat ID: {chat_id}"
    )
}

pub fn select_date(month_name: &str, year: i32) -> String {
    format!("📅 Select a date ({month_name} {year}):")
}

pub fn select_time(date: &str) -> String {
    format!("🕐 Select a time slot for {date}:")
}

pub fn select_unavailable_date(month_name: &str, year: i32) -> String {
    format!("📅 Select a date for unavailable time ({month_name} {year}):")
}

pub fn select_unavailable_start(date: &str) -> String {
    format!("🕐 Select start time for unavailable period on {date}:")
}

pub fn select_unavailable_end(start_time: &str) -> String {
    format!("🕐 Select end time for unavailable period (starting at {start_time}):")
}

pub fn unavailable_description_prompt(date: &str, start: &str, end: &str) -> String {
    format!(
        "📝 Please provide a description for your unavailable period:\n\n📅 Date: {date}\n🕐 Time: {start} - {end}\n\nExample: \"Personal break\", \"Lunch time\", \"Out of office\", etc."
    )
}

pub fn unavailable_slot_warning(limit: &str, slot_details: &str) -> String {
    format!("⚠️ You can only select times before {limit} ({slot_details})")
}

pub fn appointment_booked(date: &str, start: &str, end: &str, prof_first: &str, prof_last: &str) -> String {
    format!(
        "✅ Appointment booked successfully!\n\n📅 Date: {date}\n🕐 Time: {start} - {end}\n👨‍💼 Professional: {prof_first} {prof_last}\n\nYour appointment is pending confirmation."
    )
}

pub fn appointment_cancelled(
    date: &str,
    start: &str,
    end: &str,
    counterparty: &str,
    reason: &str,
) -> String {
    format!(
        "✅ Appointment cancelled successfully!\n\n📅 Date: {date}\n🕐 Time: {start} - {end}\n👨‍💼 {counterparty}\n📝 Reason: {reason}"
    )
}

pub fn appointment_confirmed(date: &str, start: &str, end: &str, client_first: &str, client_last: &str) -> String {
    format!(
        "✅ Appointment confirmed successfully!\n\n📅 Date: {date}\n🕐 Time: {start} - {end}\n👤 Client: {client_first} {client_last}"
    )
}

pub fn unavailable_period_set(date: &str, start: &str, end: &str, description: &str) -> String {
    format!(
        "✅ Unavailable period set successfully!\n\n📅 Date: {date}\n🕐 Time: {start} - {end}\n📝 Description: {description}"
    )
}

pub fn new_appointment_request(appointment: &Appointment, client_first: &str, client_last: &str) -> String {
    let (date, start, end) = split_appointment_time(&appointment.start_time, &appointment.end_time);
    let description = appointment.description.as_deref().unwrap_or_default();
    format!(
        "🔔 New Appointment Request!\n\n👤 Client: {client_first} {client_last}\n📅 Date: {date}\n🕐 Time: {start} - {end}\n📝 Description: {description}\n\nPlease confirm or cancel this appointment."
    )
}

pub fn appointment_cancelled_by_client(
    appointment: &Appointment,
    client_first: &str,
    client_last: &str,
) -> String {
    let (date, start, end) = split_appointment_time(&appointment.start_time, &appointment.end_time);
    let reason = appointment.cancellation_reason.as_deref().unwrap_or_default();
    format!(
        "🔔 Appointment Cancelled\n\n👤 Client: {client_first} {client_last}\n📅 Date: {date}\n🕐 Time: {start} - {end}\n📝 Reason: {reason}"
    )
}

pub fn appointment_confirmed_for_client(
    appointment: &Appointment,
    prof_first: &str,
    prof_last: &str,
) -> String {
    let (date, start, end) = split_appointment_time(&appointment.start_time, &appointment.end_time);
    format!(
        "✅ Appointment Confirmed!\n\n📅 Date: {date}\n🕐 Time: {start} - {end}\n👨‍💼 Professional: {prof_first} {prof_last}\n\nYour appointment has been confirmed."
    )
}

pub fn appointment_cancelled_by_professional(
    appointment: &Appointment,
    prof_first: &str,
    prof_last: &str,
) -> String {
    let (date, start, end) = split_appointment_time(&appointment.start_time, &appointment.end_time);
    let reason = appointment.cancellation_reason.as_deref().unwrap_or_default();
    format!(
        "🔔 Appointment Cancelled by Professional\n\n📅 Date: {date}\n🕐 Time: {start} - {end}\n👨‍💼 Professional: {prof_first} {prof_last}\n📝 Reason: {reason}"
    )
}

pub fn upcoming_appointments_for(date_display: &str) -> String {
    format!("📅 Upcoming Appointments for {date_display}:\n\n")
}

/// Header of the per-client history view; `month` is `YYYY-MM`.
pub fn previous_appointments_header(month: &str) -> String {
    let display = NaiveDate::parse_from_str(&format!("{month}-01"), "%Y-%m-%d")
        .map(|d| d.format("%B %Y").to_string())
        .unwrap_or_else(|_| month.to_string());
    format!("📅 Previous appointments for {display}:\n\n")
}

/// One history entry; the description line is omitted when empty.
pub fn previous_appointment_entry(appointment: &PreviousAppointment) -> String {
    let (date, start, end) =
        split_appointment_time(&appointment.start_time, &appointment.end_time);
    let date_display = NaiveDate::parse_from_str(&date, "%Y-%m-%d")
        .map(|d| d.format("%B %-d, %Y").to_string())
        .unwrap_or(date);
    let mut entry = format!("📅 {date_display}\n🕐 {start} - {end}\n");
    if let Some(description) = appointment.description.as_deref().filter(|d| !d.is_empty()) {
        entry.push_str(&format!("📝 {description}\n"));
    }
    entry.push('\n');
    entry
}

/// Numbered appointment line for list views. The counterparty label differs
/// between the client and professional views.
pub fn appointment_entry(appointment: &Appointment, index: usize, for_professional: bool) -> String {
    let (date, start, end) = split_appointment_time(&appointment.start_time, &appointment.end_time);
    let description = appointment.description.as_deref().unwrap_or_default();
    let counterparty = if for_professional {
        appointment
            .client
            .as_ref()
            .map(|c| format!("👤 Client: {} {}", c.first_name, c.last_name))
            .unwrap_or_default()
    } else {
        appointment
            .professional
            .as_ref()
            .map(|p| format!("👨‍💼 {} {}", p.first_name, p.last_name))
            .unwrap_or_default()
    };
    format!(
        "✍️ Appointment #{}:\n📅 {date}\n🕐 {start} - {end}\n{counterparty}\n📝 {description}\n\n",
        index + 1
    )
}

/// Renders a full timetable view, or the empty-day message.
pub fn timetable(date_display: &str, timetable: &Availability) -> String {
    if timetable.slots.is_empty() {
        return format!("📋 No activities scheduled for this day({date_display}).");
    }
    let mut text = format!("📋 Your Timetable for {date_display}:\n\n");
    for (i, slot) in timetable.slots.iter().enumerate() {
        let start = slice_or_empty(&slot.start_time, 11, 16);
        let end = slice_or_empty(&slot.end_time, 11, 16);
        let description = slot.description.as_deref().unwrap_or_default();
        text.push_str(&format!(
            "📅 Slot #{}:\n🕐 {start} - {end}\n📝 {description}\n\n",
            i + 1
        ));
    }
    text
}

#[cfg(test)]
mod tests {
    use bookline_api::TimeSlot;

    use super::*;

    #[test]
    fn appointment_time_splits_into_display_parts() {
        let (date, start, end) =
            split_appointment_time("2026-09-01T09:00:00+03:00", "2026-09-01T10:00:00+03:00");
        assert_eq!(date, "2026-09-01");
        assert_eq!(start, "09:00");
        assert_eq!(end, "10:00");
    }

    #[test]
    fn malformed_timestamps_render_empty_parts() {
        let (date, start, end) = split_appointment_time("bad", "");
        assert_eq!(date, "");
        assert_eq!(start, "");
        assert_eq!(end, "");
    }

    #[test]
    fn history_entry_skips_empty_description() {
        let with_description = PreviousAppointment {
            id: "a1".into(),
            start_time: "2026-07-03T09:00:00Z".into(),
            end_time: "2026-07-03T10:00:00Z".into(),
            description: Some("follow-up".into()),
        };
        let entry = previous_appointment_entry(&with_description);
        assert!(entry.contains("📅 July 3, 2026"));
        assert!(entry.contains("🕐 09:00 - 10:00"));
        assert!(entry.contains("📝 follow-up"));

        let without = PreviousAppointment {
            description: None,
            ..with_description
        };
        assert!(!previous_appointment_entry(&without).contains("📝"));
    }

    #[test]
    fn history_header_names_month_and_year() {
        assert_eq!(
            previous_appointments_header("2026-07"),
            "📅 Previous appointments for July 2026:\n\n"
        );
    }

    #[test]
    fn timetable_lists_slots_in_order() {
        let day = Availability {
            date: "2026-09-01".into(),
            slots: vec![
                TimeSlot {
                    start_time: "2026-09-01T09:00:00Z".into(),
                    end_time: "2026-09-01T10:00:00Z".into(),
                    available: false,
                    kind: Some("appointment".into()),
                    description: Some("Checkup".into()),
                },
                TimeSlot {
                    start_time: "2026-09-01T12:00:00Z".into(),
                    end_time: "2026-09-01T13:00:00Z".into(),
                    available: false,
                    kind: Some("unavailable".into()),
                    description: Some("Lunch".into()),
                },
            ],
        };
        let text = timetable("Tuesday, September 1, 2026", &day);
        assert!(text.contains("Slot #1"));
        assert!(text.contains("09:00 - 10:00"));
        assert!(text.contains("Lunch"));
    }

    #[test]
    fn empty_timetable_uses_empty_day_message() {
        let day = Availability {
            date: "2026-09-01".into(),
            slots: vec![],
        };
        assert!(timetable("Tuesday, September 1, 2026", &day).contains("No activities"));
    }
}
