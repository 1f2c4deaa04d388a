//! Exact- and prefix-match route table.

use {std::collections::HashMap, tracing::debug};

use crate::{command::Command, patterns};

/// A resolved route: the command and the payload remainder after its pattern.
/// Exact matches carry an empty parameter.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Match<'a> {
    pub command: Command,
    pub param: &'a str,
}

/// Static route registry, built once during startup and immutable afterwards.
/// Lookups therefore need no locking.
#[derive(Debug, Default)]
pub struct CallbackRouter {
    exact: HashMap<&'static str, Command>,
    prefix: Vec<(&'static str, Command)>,
}

impl CallbackRouter {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// The full route table of the bot.
    #[must_use]
    pub fn standard() -> Self {
        let mut r = Self::new();
        // Role selection
        r.register_exact(patterns::CLIENT, Command::StartClientRegistration);
        r.register_exact(patterns::PROFESSIONAL, Command::StartProfessionalSignIn);
        // Client dashboard
        r.register_exact(patterns::BOOK_APPOINTMENT, Command::BookAppointment);
        r.register_exact(patterns::PENDING_APPOINTMENTS, Command::PendingAppointments);
        r.register_exact(patterns::UPCOMING_APPOINTMENTS, Command::UpcomingAppointments);
        r.register_exact(patterns::CANCEL_BOOKING, Command::CancelBooking);
        // Professional dashboard
        r.register_exact(
            patterns::PROFESSIONAL_PENDING_APPOINTMENTS,
            Command::ProfessionalPendingAppointments,
        );
        r.register_exact(
            patterns::PROFESSIONAL_UPCOMING_APPOINTMENTS,
            Command::ProfessionalUpcomingAppointments,
        );
        r.register_exact(patterns::PROFESSIONAL_TIMETABLE, Command::ProfessionalTimetable);
        r.register_exact(
            patterns::PROFESSIONAL_PREVIOUS_APPOINTMENTS,
            Command::ProfessionalPreviousAppointments,
        );
        r.register_exact(patterns::SET_UNAVAILABLE, Command::SetUnavailable);
        r.register_exact(patterns::CANCEL_UNAVAILABLE, Command::CancelUnavailable);
        r.register_exact(patterns::BACK_TO_DASHBOARD, Command::BackToDashboard);
        // Booking flow
        r.register_prefix(patterns::PREV_MONTH, Command::PrevMonth);
        r.register_prefix(patterns::NEXT_MONTH, Command::NextMonth);
        r.register_prefix(patterns::SELECT_PROFESSIONAL, Command::SelectProfessional);
        r.register_prefix(patterns::SELECT_DATE, Command::SelectDate);
        r.register_prefix(patterns::SELECT_TIME, Command::SelectTime);
        // Appointment actions
        r.register_prefix(patterns::CANCEL_APPOINTMENT, Command::CancelAppointment);
        r.register_prefix(patterns::CONFIRM_APPOINTMENT, Command::ConfirmAppointment);
        r.register_prefix(
            patterns::CANCEL_PROF_APPOINTMENT,
            Command::CancelProfessionalAppointment,
        );
        // Previous-appointments browsing
        r.register_prefix(patterns::SELECT_CLIENT, Command::SelectClient);
        r.register_prefix(patterns::PREV_PREVIOUS_MONTH, Command::PrevPreviousMonth);
        r.register_prefix(patterns::NEXT_PREVIOUS_MONTH, Command::NextPreviousMonth);
        // Professional upcoming navigation
        r.register_prefix(patterns::PREV_UPCOMING_MONTH, Command::PrevUpcomingMonth);
        r.register_prefix(patterns::NEXT_UPCOMING_MONTH, Command::NextUpcomingMonth);
        r.register_prefix(patterns::SELECT_UPCOMING_DATE, Command::SelectUpcomingDate);
        // Timetable navigation
        r.register_prefix(patterns::PREV_TIMETABLE_DAY, Command::PrevTimetableDay);
        r.register_prefix(patterns::NEXT_TIMETABLE_DAY, Command::NextTimetableDay);
        // Unavailable flow
        r.register_prefix(patterns::PREV_UNAVAILABLE_MONTH, Command::PrevUnavailableMonth);
        r.register_prefix(patterns::NEXT_UNAVAILABLE_MONTH, Command::NextUnavailableMonth);
        r.register_prefix(patterns::SELECT_UNAVAILABLE_DATE, Command::SelectUnavailableDate);
        r.register_prefix(patterns::SELECT_UNAVAILABLE_START, Command::SelectUnavailableStart);
        r.register_prefix(patterns::SELECT_UNAVAILABLE_END, Command::SelectUnavailableEnd);
        r
    }

    pub fn register_exact(&mut self, pattern: &'static str, command: Command) {
        debug!(pattern, ?command, "registered exact route");
        self.exact.insert(pattern, command);
    }

    /// Prefix routes keep registration order; when two registered prefixes
    /// both match a payload, the first registered wins.
    pub fn register_prefix(&mut self, pattern: &'static str, command: Command) {
        debug!(pattern, ?command, "registered prefix route");
        self.prefix.push((pattern, command));
    }

    /// Resolve a payload. `None` means no route matched and the caller sends
    /// the unrecognized-command fallback.
    #[must_use]
    pub fn resolve<'a>(&self, data: &'a str) -> Option<Match<'a>> {
        if let Some(&command) = self.exact.get(data) {
            return Some(Match { command, param: "" });
        }
        for &(pattern, command) in &self.prefix {
            if let Some(param) = data.strip_prefix(pattern) {
                return Some(Match { command, param });
            }
        }
        None
    }

    /// (exact, prefix) route counts, logged at startup.
    #[must_use]
    pub fn stats(&self) -> (usize, usize) {
        (self.exact.len(), self.prefix.len())
    }
}
