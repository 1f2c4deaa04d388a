//! The tagged command each route resolves to.

/// One variant per registered route (34 in the standard table). The
/// transport layer dispatches on this with an exhaustive `match`, so adding a
/// route without wiring its handler fails to compile.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Command {
    // Role selection
    StartClientRegistration,
    StartProfessionalSignIn,
    // Client dashboard
    BookAppointment,
    PendingAppointments,
    UpcomingAppointments,
    CancelBooking,
    // Professional dashboard
    ProfessionalPendingAppointments,
    ProfessionalUpcomingAppointments,
    ProfessionalTimetable,
    ProfessionalPreviousAppointments,
    SetUnavailable,
    CancelUnavailable,
    // Common
    BackToDashboard,
    // Booking flow (param-carrying)
    PrevMonth,
    NextMonth,
    SelectProfessional,
    SelectDate,
    SelectTime,
    // Appointment actions
    CancelAppointment,
    ConfirmAppointment,
    CancelProfessionalAppointment,
    // Previous-appointments browsing
    SelectClient,
    PrevPreviousMonth,
    NextPreviousMonth,
    // Professional upcoming navigation
    PrevUpcomingMonth,
    NextUpcomingMonth,
    SelectUpcomingDate,
    // Timetable navigation
    PrevTimetableDay,
    NextTimetableDay,
    // Unavailable flow
    PrevUnavailableMonth,
    NextUnavailableMonth,
    SelectUnavailableDate,
    SelectUnavailableStart,
    SelectUnavailableEnd,
}
