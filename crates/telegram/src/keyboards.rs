//! Inline keyboard builders.
//!
//! Every callback payload is built from the routing vocabulary so the router
//! can always resolve what these keyboards emit.

use {
    chrono::{Datelike, Months, NaiveDate},
    teloxide::types::{InlineKeyboardButton, InlineKeyboardMarkup},
};

use {
    bookline_api::{ApiUser, Appointment, Availability, ClientSummary},
    bookline_routing::patterns::{self, callback_data},
};

const DAYS_PER_ROW: usize = 7;
const TIME_SLOTS_PER_ROW: usize = 3;

const BTN_PREV: &str = "⬅️ Previous";
const BTN_NEXT: &str = "Next ➡️";
const BTN_CANCEL: &str = "❌ Cancel";
const BTN_BACK_TO_DASHBOARD: &str = "🏠 Back to Dashboard";

pub fn role_select() -> InlineKeyboardMarkup {
    InlineKeyboardMarkup::new(vec![vec![
        InlineKeyboardButton::callback("👤 Client", patterns::CLIENT),
        InlineKeyboardButton::callback("👨‍💼 Professional", patterns::PROFESSIONAL),
    ]])
}

pub fn client_dashboard() -> InlineKeyboardMarkup {
    InlineKeyboardMarkup::new(vec![
        vec![InlineKeyboardButton::callback(
            "📅 Book Appointment",
            patterns::BOOK_APPOINTMENT,
        )],
        vec![
            InlineKeyboardButton::callback("⏳ My Pending Appointments", patterns::PENDING_APPOINTMENTS),
            InlineKeyboardButton::callback(
                "✅ My Upcoming Appointments",
                patterns::UPCOMING_APPOINTMENTS,
            ),
        ],
    ])
}

pub fn professional_dashboard() -> InlineKeyboardMarkup {
    InlineKeyboardMarkup::new(vec![
        vec![
            InlineKeyboardButton::callback(
                "⏳ Pending Appointments",
                patterns::PROFESSIONAL_PENDING_APPOINTMENTS,
            ),
            InlineKeyboardButton::callback(
                "📋 Upcoming Appointments",
                patterns::PROFESSIONAL_UPCOMING_APPOINTMENTS,
            ),
        ],
        vec![
            InlineKeyboardButton::callback("📅 My Timetable", patterns::PROFESSIONAL_TIMETABLE),
            InlineKeyboardButton::callback(
                "📜 Previous Appointments",
                patterns::PROFESSIONAL_PREVIOUS_APPOINTMENTS,
            ),
        ],
        vec![InlineKeyboardButton::callback(
            "🚫 Set Unavailable",
            patterns::SET_UNAVAILABLE,
        )],
    ])
}

pub fn registration_success() -> InlineKeyboardMarkup {
    InlineKeyboardMarkup::new(vec![vec![InlineKeyboardButton::callback(
        "🏠 Go to Dashboard",
        patterns::BACK_TO_DASHBOARD,
    )]])
}

pub fn back_to_dashboard() -> InlineKeyboardMarkup {
    InlineKeyboardMarkup::new(vec![vec![InlineKeyboardButton::callback(
        BTN_BACK_TO_DASHBOARD,
        patterns::BACK_TO_DASHBOARD,
    )]])
}

pub fn professionals(professionals: &[ApiUser]) -> InlineKeyboardMarkup {
    let mut rows: Vec<Vec<InlineKeyboardButton>> = professionals
        .iter()
        .map(|p| {
            vec![InlineKeyboardButton::callback(
                format!("👨‍💼 {} {}", p.first_name, p.last_name),
                callback_data(patterns::SELECT_PROFESSIONAL, &p.id),
            )]
        })
        .collect();
    rows.push(vec![InlineKeyboardButton::callback(
        "❌ Cancel Booking",
        patterns::CANCEL_BOOKING,
    )]);
    InlineKeyboardMarkup::new(rows)
}

/// Day grid for the booking flow, one button per remaining day of `month`.
pub fn booking_dates(month: NaiveDate, today: NaiveDate) -> InlineKeyboardMarkup {
    month_grid(
        month,
        today,
        patterns::SELECT_DATE,
        patterns::PREV_MONTH,
        patterns::NEXT_MONTH,
        "❌ Cancel Booking",
        patterns::CANCEL_BOOKING,
    )
}

/// Same grid as the booking flow with the unavailable-period vocabulary.
pub fn unavailable_dates(month: NaiveDate, today: NaiveDate) -> InlineKeyboardMarkup {
    month_grid(
        month,
        today,
        patterns::SELECT_UNAVAILABLE_DATE,
        patterns::PREV_UNAVAILABLE_MONTH,
        patterns::NEXT_UNAVAILABLE_MONTH,
        BTN_CANCEL,
        patterns::CANCEL_UNAVAILABLE,
    )
}

fn month_grid(
    month: NaiveDate,
    today: NaiveDate,
    select_prefix: &str,
    prev_prefix: &str,
    next_prefix: &str,
    cancel_label: &str,
    cancel_callback: &str,
) -> InlineKeyboardMarkup {
    let mut rows: Vec<Vec<InlineKeyboardButton>> = Vec::new();
    let mut current_row: Vec<InlineKeyboardButton> = Vec::new();

    let mut day = month.with_day(1).unwrap_or(month);
    while day.month() == month.month() {
        if day >= today {
            current_row.push(InlineKeyboardButton::callback(
                day.day().to_string(),
                callback_data(select_prefix, &day.format("%Y-%m-%d").to_string()),
            ));
            if current_row.len() == DAYS_PER_ROW {
                rows.push(std::mem::take(&mut current_row));
            }
        }
        day = match day.succ_opt() {
            Some(next) => next,
            None => break,
        };
    }
    if !current_row.is_empty() {
        rows.push(current_row);
    }

    let month_param = month.format("%Y-%m").to_string();
    let mut nav = Vec::new();
    // No navigating into the past beyond the current month.
    if (month.year(), month.month()) != (today.year(), today.month()) {
        nav.push(InlineKeyboardButton::callback(
            BTN_PREV,
            callback_data(prev_prefix, &month_param),
        ));
    }
    nav.push(InlineKeyboardButton::callback(
        BTN_NEXT,
        callback_data(next_prefix, &month_param),
    ));
    rows.push(nav);

    rows.push(vec![InlineKeyboardButton::callback(
        cancel_label,
        cancel_callback,
    )]);
    InlineKeyboardMarkup::new(rows)
}

/// Available booking slots, three per row. The payload carries the local
/// `HH:MM` start so the handler can rebuild the full timestamp from the
/// stored date.
pub fn time_slots(availability: &Availability) -> InlineKeyboardMarkup {
    let mut rows: Vec<Vec<InlineKeyboardButton>> = Vec::new();
    let mut current_row: Vec<InlineKeyboardButton> = Vec::new();

    for slot in availability.slots.iter().filter(|s| s.available) {
        let Some(display) = slot.start_time.get(11..16) else {
            continue;
        };
        current_row.push(InlineKeyboardButton::callback(
            display,
            callback_data(patterns::SELECT_TIME, display),
        ));
        if current_row.len() == TIME_SLOTS_PER_ROW {
            rows.push(std::mem::take(&mut current_row));
        }
    }
    if !current_row.is_empty() {
        rows.push(current_row);
    }

    rows.push(vec![InlineKeyboardButton::callback(
        "❌ Cancel Booking",
        patterns::CANCEL_BOOKING,
    )]);
    InlineKeyboardMarkup::new(rows)
}

pub fn unavailable_start_slots(availability: &Availability) -> InlineKeyboardMarkup {
    slot_grid(availability, patterns::SELECT_UNAVAILABLE_START, |_| true)
}

/// End-time options: available slots strictly after `start`, cut off at the
/// first already-unavailable slot so periods cannot overlap existing ones.
pub fn unavailable_end_slots(start: &str, availability: &Availability) -> InlineKeyboardMarkup {
    let limit = first_unavailable_after(start, availability);
    let start = start.to_string();
    slot_grid(availability, patterns::SELECT_UNAVAILABLE_END, move |time| {
        time > start.as_str() && limit.as_deref().is_none_or(|l| time <= l)
    })
}

/// The `HH:MM` start of the first unavailable slot after `start`, if any.
pub fn first_unavailable_after(start: &str, availability: &Availability) -> Option<String> {
    availability
        .slots
        .iter()
        .filter(|s| !s.available)
        .filter_map(|s| s.start_time.get(11..16))
        .find(|time| *time > start)
        .map(str::to_string)
}

fn slot_grid(
    availability: &Availability,
    select_prefix: &str,
    mut include: impl FnMut(&str) -> bool,
) -> InlineKeyboardMarkup {
    let mut rows: Vec<Vec<InlineKeyboardButton>> = Vec::new();
    let mut current_row: Vec<InlineKeyboardButton> = Vec::new();

    for slot in availability.slots.iter().filter(|s| s.available) {
        let Some(display) = slot.start_time.get(11..16) else {
            continue;
        };
        if !include(display) {
            continue;
        }
        current_row.push(InlineKeyboardButton::callback(
            display,
            callback_data(select_prefix, display),
        ));
        if current_row.len() == TIME_SLOTS_PER_ROW {
            rows.push(std::mem::take(&mut current_row));
        }
    }
    if !current_row.is_empty() {
        rows.push(current_row);
    }

    rows.push(vec![InlineKeyboardButton::callback(
        BTN_CANCEL,
        patterns::CANCEL_UNAVAILABLE,
    )]);
    InlineKeyboardMarkup::new(rows)
}

/// Whether a slot keyboard offers nothing but its cancel row.
#[must_use]
pub fn only_cancel(keyboard: &InlineKeyboardMarkup) -> bool {
    keyboard.inline_keyboard.len() == 1
}

/// Cancel buttons for a client's appointment list, one per entry.
pub fn client_appointments(appointments: &[Appointment]) -> InlineKeyboardMarkup {
    let mut rows: Vec<Vec<InlineKeyboardButton>> = appointments
        .iter()
        .enumerate()
        .map(|(i, apt)| {
            vec![InlineKeyboardButton::callback(
                format!("❌ Cancel Appointment #{}", i + 1),
                callback_data(patterns::CANCEL_APPOINTMENT, &apt.id),
            )]
        })
        .collect();
    rows.push(vec![InlineKeyboardButton::callback(
        BTN_BACK_TO_DASHBOARD,
        patterns::BACK_TO_DASHBOARD,
    )]);
    InlineKeyboardMarkup::new(rows)
}

/// Action buttons for a professional's appointment list. Pending lists get a
/// confirm button next to each cancel.
pub fn professional_appointments(
    appointments: &[Appointment],
    with_confirm: bool,
) -> InlineKeyboardMarkup {
    let mut rows: Vec<Vec<InlineKeyboardButton>> = appointments
        .iter()
        .enumerate()
        .map(|(i, apt)| {
            let mut row = Vec::new();
            if with_confirm {
                row.push(InlineKeyboardButton::callback(
                    format!("✅ Confirm Appointment #{}", i + 1),
                    callback_data(patterns::CONFIRM_APPOINTMENT, &apt.id),
                ));
            }
            row.push(InlineKeyboardButton::callback(
                format!("❌ Cancel Appointment #{}", i + 1),
                callback_data(patterns::CANCEL_PROF_APPOINTMENT, &apt.id),
            ));
            row
        })
        .collect();
    rows.push(vec![InlineKeyboardButton::callback(
        BTN_BACK_TO_DASHBOARD,
        patterns::BACK_TO_DASHBOARD,
    )]);
    InlineKeyboardMarkup::new(rows)
}

/// Confirm / cancel prompt attached to a new-appointment notification.
pub fn appointment_request(appointment_id: &str) -> InlineKeyboardMarkup {
    InlineKeyboardMarkup::new(vec![vec![
        InlineKeyboardButton::callback(
            "✅ Confirm",
            callback_data(patterns::CONFIRM_APPOINTMENT, appointment_id),
        ),
        InlineKeyboardButton::callback(
            BTN_CANCEL,
            callback_data(patterns::CANCEL_PROF_APPOINTMENT, appointment_id),
        ),
        InlineKeyboardButton::callback(BTN_BACK_TO_DASHBOARD, patterns::BACK_TO_DASHBOARD),
    ]])
}

/// Dates that carry upcoming appointments, plus month navigation.
pub fn upcoming_dates(dates: &[String], month: &str) -> InlineKeyboardMarkup {
    let mut rows: Vec<Vec<InlineKeyboardButton>> = dates
        .iter()
        .map(|date| {
            vec![InlineKeyboardButton::callback(
                format!("📅 {date}"),
                callback_data(patterns::SELECT_UPCOMING_DATE, date),
            )]
        })
        .collect();
    rows.push(vec![
        InlineKeyboardButton::callback(BTN_PREV, callback_data(patterns::PREV_UPCOMING_MONTH, month)),
        InlineKeyboardButton::callback(BTN_NEXT, callback_data(patterns::NEXT_UPCOMING_MONTH, month)),
    ]);
    rows.push(vec![InlineKeyboardButton::callback(
        BTN_BACK_TO_DASHBOARD,
        patterns::BACK_TO_DASHBOARD,
    )]);
    InlineKeyboardMarkup::new(rows)
}

/// Client picker for the history view, one client per row.
pub fn clients(clients: &[ClientSummary]) -> InlineKeyboardMarkup {
    let mut rows: Vec<Vec<InlineKeyboardButton>> = clients
        .iter()
        .map(|c| {
            vec![InlineKeyboardButton::callback(
                format!("{} {}", c.first_name, c.last_name),
                callback_data(patterns::SELECT_CLIENT, &c.id),
            )]
        })
        .collect();
    rows.push(vec![InlineKeyboardButton::callback(
        BTN_BACK_TO_DASHBOARD,
        patterns::BACK_TO_DASHBOARD,
    )]);
    InlineKeyboardMarkup::new(rows)
}

/// Month navigation under the history view. Both payloads already carry the
/// target month; the next button disappears once `month` reaches `current`.
pub fn previous_months_nav(month: &str, current: &str) -> InlineKeyboardMarkup {
    let mut nav = Vec::new();
    if let Some(prev) = shift_month(month, false) {
        nav.push(InlineKeyboardButton::callback(
            BTN_PREV,
            callback_data(patterns::PREV_PREVIOUS_MONTH, &prev),
        ));
    }
    // YYYY-MM tokens order lexicographically.
    if let Some(next) = shift_month(month, true).filter(|next| next.as_str() <= current) {
        nav.push(InlineKeyboardButton::callback(
            BTN_NEXT,
            callback_data(patterns::NEXT_PREVIOUS_MONTH, &next),
        ));
    }
    InlineKeyboardMarkup::new(vec![
        nav,
        vec![InlineKeyboardButton::callback(
            BTN_BACK_TO_DASHBOARD,
            patterns::BACK_TO_DASHBOARD,
        )],
    ])
}

pub fn timetable_nav(date: &str) -> InlineKeyboardMarkup {
    InlineKeyboardMarkup::new(vec![
        vec![
            InlineKeyboardButton::callback(
                "⬅️ Previous Day",
                callback_data(patterns::PREV_TIMETABLE_DAY, date),
            ),
            InlineKeyboardButton::callback(
                "Next Day ➡️",
                callback_data(patterns::NEXT_TIMETABLE_DAY, date),
            ),
        ],
        vec![InlineKeyboardButton::callback(
            BTN_BACK_TO_DASHBOARD,
            patterns::BACK_TO_DASHBOARD,
        )],
    ])
}

/// Shift a `YYYY-MM` month token by one, clamped at chrono's range.
pub fn shift_month(month: &str, forward: bool) -> Option<String> {
    let first = NaiveDate::parse_from_str(&format!("{month}-01"), "%Y-%m-%d").ok()?;
    let shifted = if forward {
        first.checked_add_months(Months::new(1))?
    } else {
        first.checked_sub_months(Months::new(1))?
    };
    Some(shifted.format("%Y-%m").to_string())
}

/// Shift a `YYYY-MM-DD` date token by one day.
pub fn shift_day(date: &str, forward: bool) -> Option<String> {
    let parsed = NaiveDate::parse_from_str(date, "%Y-%m-%d").ok()?;
    let shifted = if forward { parsed.succ_opt()? } else { parsed.pred_opt()? };
    Some(shifted.format("%Y-%m-%d").to_string())
}

#[cfg(test)]
mod tests {
    use bookline_api::TimeSlot;

    use super::*;

    fn slot(start: &str, available: bool) -> TimeSlot {
        TimeSlot {
            start_time: format!("2026-09-01T{start}:00+03:00"),
            end_time: format!("2026-09-01T{start}:00+03:00"),
            available,
            kind: None,
            description: None,
        }
    }

    fn labels(keyboard: &InlineKeyboardMarkup) -> Vec<String> {
        keyboard
            .inline_keyboard
            .iter()
            .flatten()
            .map(|b| b.text.clone())
            .collect()
    }

    fn payloads(keyboard: &InlineKeyboardMarkup) -> Vec<String> {
        use teloxide::types::InlineKeyboardButtonKind;
        keyboard
            .inline_keyboard
            .iter()
            .flatten()
            .filter_map(|b| match &b.kind {
                InlineKeyboardButtonKind::CallbackData(data) => Some(data.clone()),
                _ => None,
            })
            .collect()
    }

    #[test]
    fn booking_grid_skips_past_days() {
        let month = NaiveDate::from_ymd_opt(2026, 9, 1).unwrap();
        let today = NaiveDate::from_ymd_opt(2026, 9, 20).unwrap();
        let keyboard = booking_dates(month, today);
        let labels = labels(&keyboard);
        assert!(!labels.contains(&"19".to_string()));
        assert!(labels.contains(&"20".to_string()));
        assert!(labels.contains(&"30".to_string()));
    }

    #[test]
    fn current_month_has_no_previous_button() {
        let month = NaiveDate::from_ymd_opt(2026, 9, 1).unwrap();
        let today = NaiveDate::from_ymd_opt(2026, 9, 1).unwrap();
        let labels = labels(&booking_dates(month, today));
        assert!(!labels.contains(&BTN_PREV.to_string()));
        assert!(labels.contains(&BTN_NEXT.to_string()));
    }

    #[test]
    fn later_month_gains_previous_button() {
        let month = NaiveDate::from_ymd_opt(2026, 10, 1).unwrap();
        let today = NaiveDate::from_ymd_opt(2026, 9, 1).unwrap();
        assert!(labels(&booking_dates(month, today)).contains(&BTN_PREV.to_string()));
    }

    #[test]
    fn time_slots_only_lists_available() {
        let availability = Availability {
            date: "2026-09-01".into(),
            slots: vec![slot("09:00", true), slot("10:00", false), slot("11:00", true)],
        };
        let labels = labels(&time_slots(&availability));
        assert!(labels.contains(&"09:00".to_string()));
        assert!(!labels.contains(&"10:00".to_string()));
        assert!(labels.contains(&"11:00".to_string()));
    }

    #[test]
    fn end_slots_stop_at_next_unavailable_period() {
        let availability = Availability {
            date: "2026-09-01".into(),
            slots: vec![
                slot("09:00", true),
                slot("10:00", true),
                slot("11:00", false),
                slot("12:00", true),
            ],
        };
        let keyboard = unavailable_end_slots("09:00", &availability);
        let labels = labels(&keyboard);
        assert!(labels.contains(&"10:00".to_string()));
        assert!(!labels.contains(&"09:00".to_string()));
        assert!(!labels.contains(&"12:00".to_string()));
    }

    #[test]
    fn end_slots_without_options_reduce_to_cancel_row() {
        let availability = Availability {
            date: "2026-09-01".into(),
            slots: vec![slot("09:00", true)],
        };
        let keyboard = unavailable_end_slots("09:00", &availability);
        assert!(only_cancel(&keyboard));
    }

    #[test]
    fn month_shift_crosses_year_boundaries() {
        assert_eq!(shift_month("2026-12", true).as_deref(), Some("2027-01"));
        assert_eq!(shift_month("2026-01", false).as_deref(), Some("2025-12"));
        assert!(shift_month("garbage", true).is_none());
    }

    #[test]
    fn day_shift_crosses_month_boundaries() {
        assert_eq!(shift_day("2026-09-30", true).as_deref(), Some("2026-10-01"));
        assert_eq!(shift_day("2026-09-01", false).as_deref(), Some("2026-08-31"));
    }

    #[test]
    fn client_picker_targets_each_client() {
        let list = vec![ClientSummary {
            id: "c7".into(),
            first_name: "Ada".into(),
            last_name: "Lovelace".into(),
        }];
        let keyboard = clients(&list);
        assert!(labels(&keyboard).contains(&"Ada Lovelace".to_string()));
        assert!(payloads(&keyboard).contains(&"select_client_c7".to_string()));
    }

    #[test]
    fn history_nav_payloads_carry_target_months() {
        let payloads = payloads(&previous_months_nav("2026-06", "2026-08"));
        assert!(payloads.contains(&"prev_previous_month_2026-05".to_string()));
        assert!(payloads.contains(&"next_previous_month_2026-07".to_string()));
    }

    #[test]
    fn history_nav_hides_next_at_current_month() {
        let labels = labels(&previous_months_nav("2026-08", "2026-08"));
        assert!(labels.contains(&BTN_PREV.to_string()));
        assert!(!labels.contains(&BTN_NEXT.to_string()));
    }

    #[test]
    fn pending_list_pairs_confirm_with_cancel() {
        let appointments = vec![Appointment {
            id: "a1".into(),
            ..Appointment::default()
        }];
        let keyboard = professional_appointments(&appointments, true);
        let first_row = &keyboard.inline_keyboard[0];
        assert_eq!(first_row.len(), 2);
    }
}
