//! Professional-side flows: sign-in, appointment management, timetable, and
//! unavailable periods.

use {
    chrono::{Datelike, Local, NaiveDate},
    tracing::warn,
};

use {
    bookline_api::{CreateUnavailableRequest, SignInRequest},
    bookline_common::RequestContext,
    bookline_sessions::{FlowState, Role, Session},
};

use crate::{
    error::Result,
    handlers::{BotHandler, local_datetime, long_date},
    keyboards, texts,
};

impl BotHandler {
    pub(crate) async fn start_sign_in(&self, chat_id: i64) -> Result<()> {
        self.sessions.set(
            chat_id,
            Session::with_role(Role::Professional, FlowState::AwaitingUsername),
        );
        self.outbound.send(chat_id, texts::PROFESSIONAL_SIGN_IN).await?;
        Ok(())
    }

    pub(crate) async fn username_input(&self, chat_id: i64, username: &str) -> Result<()> {
        let Some(mut session) = self.session_or_prompt(chat_id).await? else {
            return Ok(());
        };
        session.username = username.trim().to_string();
        session.state = FlowState::AwaitingPassword;
        self.sessions.set(chat_id, session);

        self.outbound.send(chat_id, texts::USERNAME_SAVED).await?;
        Ok(())
    }

    /// Complete sign-in. A rejected attempt removes the half-built session so
    /// the chat starts over from `/start` instead of looping on passwords.
    pub(crate) async fn password_input(
        &self,
        ctx: &RequestContext,
        chat_id: i64,
        password: &str,
    ) -> Result<()> {
        let Some(session) = self.session_or_prompt(chat_id).await? else {
            return Ok(());
        };

        let req = SignInRequest {
            username: session.username.clone(),
            password: password.to_string(),
            chat_id,
        };
        let user = match self.api.sign_in_professional(ctx, &req).await {
            Ok(user) => user,
            Err(e) => {
                self.sessions.remove(chat_id);
                return self.send_api_error(chat_id, "Sign in failed", &e).await;
            },
        };

        self.seed_session(chat_id, &user);
        let text = texts::sign_in_successful(
            &user.first_name,
            &user.last_name,
            &user.role,
            &user.username,
            chat_id,
        );
        self.outbound.send(chat_id, &text).await?;
        self.show_dashboard(ctx, chat_id).await
    }

    pub(crate) async fn professional_pending_appointments(
        &self,
        ctx: &RequestContext,
        chat_id: i64,
    ) -> Result<()> {
        let Some(session) = self.session_or_prompt(chat_id).await? else {
            return Ok(());
        };

        let appointments = match self
            .api
            .professional_appointments(ctx, &session.backend_id, "pending", None)
            .await
        {
            Ok(appointments) => appointments,
            Err(e) => {
                return self
                    .send_api_error(chat_id, "Failed to load pending appointments", &e)
                    .await;
            },
        };
        if appointments.is_empty() {
            self.outbound.send(chat_id, texts::NO_PENDING_APPOINTMENTS).await?;
            return self.show_dashboard(ctx, chat_id).await;
        }

        let mut text = texts::PENDING_APPOINTMENTS_HEADER.to_string();
        for (i, apt) in appointments.iter().enumerate() {
            text.push_str(&texts::appointment_entry(apt, i, true));
        }
        self.send_flow_keyboard(
            chat_id,
            &text,
            keyboards::professional_appointments(&appointments, true),
        )
        .await
    }

    /// Upcoming appointments start from a month picker over the dates that
    /// actually have confirmed bookings.
    pub(crate) async fn professional_upcoming_appointments(
        &self,
        ctx: &RequestContext,
        chat_id: i64,
    ) -> Result<()> {
        let Some(session) = self.session_or_prompt(chat_id).await? else {
            return Ok(());
        };
        let month = Local::now().format("%Y-%m").to_string();
        self.show_upcoming_picker(ctx, chat_id, &session, &month).await
    }

    async fn show_upcoming_picker(
        &self,
        ctx: &RequestContext,
        chat_id: i64,
        session: &Session,
        month: &str,
    ) -> Result<()> {
        let dates = match self
            .api
            .appointment_dates(ctx, &session.backend_id, "confirmed", month)
            .await
        {
            Ok(dates) => dates,
            Err(e) => {
                return self
                    .send_api_error(chat_id, "Failed to load upcoming appointments", &e)
                    .await;
            },
        };
        if dates.is_empty() {
            self.outbound.send(chat_id, texts::NO_UPCOMING_APPOINTMENTS).await?;
            return self.show_dashboard(ctx, chat_id).await;
        }

        self.send_flow_keyboard(
            chat_id,
            texts::SELECT_UPCOMING_DATE,
            keyboards::upcoming_dates(&dates, month),
        )
        .await
    }

    /// Month navigation for the upcoming picker. An empty target month falls
    /// back to the month the chat was looking at.
    pub(crate) async fn upcoming_month_nav(
        &self,
        ctx: &RequestContext,
        chat_id: i64,
        month: &str,
        forward: bool,
    ) -> Result<()> {
        let Some(session) = self.session_or_prompt(chat_id).await? else {
            return Ok(());
        };
        let Some(target) = keyboards::shift_month(month, forward) else {
            self.outbound.send(chat_id, texts::INVALID_DATE_FORMAT).await?;
            return Ok(());
        };

        let dates = match self
            .api
            .appointment_dates(ctx, &session.backend_id, "confirmed", &target)
            .await
        {
            Ok(dates) => dates,
            Err(e) => {
                return self
                    .send_api_error(chat_id, "Failed to load upcoming appointments", &e)
                    .await;
            },
        };
        if dates.is_empty() {
            self.outbound.send(chat_id, texts::NO_UPCOMING_APPOINTMENTS).await?;
            return self.show_upcoming_picker(ctx, chat_id, &session, month).await;
        }

        self.send_flow_keyboard(
            chat_id,
            texts::SELECT_UPCOMING_DATE,
            keyboards::upcoming_dates(&dates, &target),
        )
        .await
    }

    pub(crate) async fn upcoming_date_selection(
        &self,
        ctx: &RequestContext,
        chat_id: i64,
        date: &str,
    ) -> Result<()> {
        let Some(session) = self.session_or_prompt(chat_id).await? else {
            return Ok(());
        };

        let appointments = match self
            .api
            .professional_appointments(ctx, &session.backend_id, "confirmed", Some(date))
            .await
        {
            Ok(appointments) => appointments,
            Err(e) => {
                return self
                    .send_api_error(chat_id, "Failed to load upcoming appointments", &e)
                    .await;
            },
        };
        if appointments.is_empty() {
            self.outbound.send(chat_id, texts::NO_UPCOMING_APPOINTMENTS).await?;
            return self.show_dashboard(ctx, chat_id).await;
        }

        let mut text = texts::upcoming_appointments_for(&long_date(date));
        for (i, apt) in appointments.iter().enumerate() {
            text.push_str(&texts::appointment_entry(apt, i, true));
        }
        self.send_flow_keyboard(
            chat_id,
            &text,
            keyboards::professional_appointments(&appointments, false),
        )
        .await
    }

    /// Appointment history starts from a client picker; month browsing is
    /// per selected client.
    pub(crate) async fn previous_appointments(
        &self,
        ctx: &RequestContext,
        chat_id: i64,
    ) -> Result<()> {
        let Some(session) = self.session_or_prompt(chat_id).await? else {
            return Ok(());
        };

        let clients = match self.api.professional_clients(ctx, &session.backend_id).await {
            Ok(clients) => clients,
            Err(e) => {
                return self.send_api_error(chat_id, "Failed to load clients", &e).await;
            },
        };
        if clients.is_empty() {
            self.outbound.send(chat_id, texts::NO_CLIENTS).await?;
            return self.show_dashboard(ctx, chat_id).await;
        }

        self.send_flow_keyboard(chat_id, texts::SELECT_CLIENT, keyboards::clients(&clients))
            .await
    }

    pub(crate) async fn client_selection(
        &self,
        ctx: &RequestContext,
        chat_id: i64,
        client_id: &str,
    ) -> Result<()> {
        let Some(mut session) = self.session_or_prompt(chat_id).await? else {
            return Ok(());
        };
        session.selected_client_id = client_id.to_string();
        self.sessions.set(chat_id, session.clone());

        let month = Local::now().format("%Y-%m").to_string();
        self.show_client_history(ctx, chat_id, &session, &month).await
    }

    /// The nav payloads already carry the target month, so both directions
    /// land here with the month to show.
    pub(crate) async fn previous_month_nav(
        &self,
        ctx: &RequestContext,
        chat_id: i64,
        month: &str,
    ) -> Result<()> {
        let Some(session) = self.session_or_prompt(chat_id).await? else {
            return Ok(());
        };
        if session.selected_client_id.is_empty() {
            self.outbound.send(chat_id, texts::INVALID_STATE).await?;
            return Ok(());
        }
        self.show_client_history(ctx, chat_id, &session, month).await
    }

    async fn show_client_history(
        &self,
        ctx: &RequestContext,
        chat_id: i64,
        session: &Session,
        month: &str,
    ) -> Result<()> {
        let history = match self
            .api
            .previous_appointments_by_client(
                ctx,
                &session.backend_id,
                &session.selected_client_id,
                month,
            )
            .await
        {
            Ok(history) => history,
            Err(e) => {
                return self
                    .send_api_error(chat_id, "Failed to load previous appointments", &e)
                    .await;
            },
        };

        let mut text = texts::previous_appointments_header(month);
        if history.is_empty() {
            text.push_str(texts::NO_APPOINTMENTS_FOR_MONTH);
        } else {
            for appointment in &history {
                text.push_str(&texts::previous_appointment_entry(appointment));
            }
        }

        let current = Local::now().format("%Y-%m").to_string();
        self.send_flow_keyboard(chat_id, &text, keyboards::previous_months_nav(month, &current))
            .await
    }

    pub(crate) async fn confirm_appointment(
        &self,
        ctx: &RequestContext,
        chat_id: i64,
        appointment_id: &str,
    ) -> Result<()> {
        let Some(session) = self.session_or_prompt(chat_id).await? else {
            return Ok(());
        };

        let envelope = match self
            .api
            .confirm_appointment(ctx, &session.backend_id, appointment_id)
            .await
        {
            Ok(envelope) => envelope,
            Err(e) => {
                return self
                    .send_api_error(chat_id, "Failed to confirm appointment", &e)
                    .await;
            },
        };

        let (date, start, end) = texts::split_appointment_time(
            &envelope.appointment.start_time,
            &envelope.appointment.end_time,
        );
        let (client_first, client_last) = envelope
            .client
            .as_ref()
            .map(|c| (c.first_name.as_str(), c.last_name.as_str()))
            .unwrap_or_default();
        let text = texts::appointment_confirmed(&date, &start, &end, client_first, client_last);
        self.outbound.send(chat_id, &text).await?;

        if let Some(client_chat) = envelope.client.as_ref().and_then(|c| c.chat_id) {
            let notice = texts::appointment_confirmed_for_client(
                &envelope.appointment,
                &session.first_name,
                &session.last_name,
            );
            if let Err(e) = self.outbound.send(client_chat, &notice).await {
                warn!(chat_id = client_chat, error = %e, "failed to notify client");
            }
        }

        self.show_dashboard(ctx, chat_id).await
    }

    pub(crate) async fn professional_cancel_appointment(
        &self,
        chat_id: i64,
        appointment_id: &str,
    ) -> Result<()> {
        let Some(mut session) = self.session_or_prompt(chat_id).await? else {
            return Ok(());
        };
        session.state = FlowState::AwaitingCancellationReason;
        session.selected_appointment_id = appointment_id.to_string();

        let message_id = self.outbound.send(chat_id, texts::CANCELLATION_REASON).await?;
        session.track_message(message_id);
        self.sessions.set(chat_id, session);
        Ok(())
    }

    pub(crate) async fn professional_cancellation_reason(
        &self,
        ctx: &RequestContext,
        chat_id: i64,
        reason: &str,
    ) -> Result<()> {
        let Some(mut session) = self.session_or_prompt(chat_id).await? else {
            return Ok(());
        };
        let appointment_id = session.selected_appointment_id.clone();

        let envelope = match self
            .api
            .cancel_professional_appointment(ctx, &session.backend_id, &appointment_id, reason)
            .await
        {
            Ok(envelope) => envelope,
            Err(e) => {
                return self
                    .send_api_error(chat_id, "Failed to cancel appointment", &e)
                    .await;
            },
        };

        session.clear_flow();
        self.sessions.set(chat_id, session.clone());

        let (date, start, end) = texts::split_appointment_time(
            &envelope.appointment.start_time,
            &envelope.appointment.end_time,
        );
        let counterparty = envelope
            .client
            .as_ref()
            .map(|c| format!("Client: {} {}", c.first_name, c.last_name))
            .unwrap_or_default();
        let reason_display = envelope
            .appointment
            .cancellation_reason
            .as_deref()
            .unwrap_or(reason);
        let text = texts::appointment_cancelled(&date, &start, &end, &counterparty, reason_display);
        self.outbound.send(chat_id, &text).await?;

        if let Some(client_chat) = envelope.client.as_ref().and_then(|c| c.chat_id) {
            let notice = texts::appointment_cancelled_by_professional(
                &envelope.appointment,
                &session.first_name,
                &session.last_name,
            );
            if let Err(e) = self.outbound.send(client_chat, &notice).await {
                warn!(chat_id = client_chat, error = %e, "failed to notify client");
            }
        }

        self.show_dashboard(ctx, chat_id).await
    }

    pub(crate) async fn timetable(&self, ctx: &RequestContext, chat_id: i64) -> Result<()> {
        let Some(session) = self.session_or_prompt(chat_id).await? else {
            return Ok(());
        };
        let today = Local::now().format("%Y-%m-%d").to_string();
        self.show_timetable(ctx, chat_id, &session, &today).await
    }

    async fn show_timetable(
        &self,
        ctx: &RequestContext,
        chat_id: i64,
        session: &Session,
        date: &str,
    ) -> Result<()> {
        let day = match self.api.timetable(ctx, &session.backend_id, date).await {
            Ok(day) => day,
            Err(e) => {
                return self
                    .send_api_error(chat_id, "Failed to load appointments", &e)
                    .await;
            },
        };

        let text = texts::timetable(&long_date(date), &day);
        self.send_flow_keyboard(chat_id, &text, keyboards::timetable_nav(date))
            .await
    }

    pub(crate) async fn timetable_nav(
        &self,
        ctx: &RequestContext,
        chat_id: i64,
        date: &str,
        forward: bool,
    ) -> Result<()> {
        let Some(session) = self.session_or_prompt(chat_id).await? else {
            return Ok(());
        };
        let Some(target) = keyboards::shift_day(date, forward) else {
            self.outbound.send(chat_id, texts::INVALID_DATE_FORMAT).await?;
            return Ok(());
        };
        self.show_timetable(ctx, chat_id, &session, &target).await
    }

    pub(crate) async fn set_unavailable(&self, _ctx: &RequestContext, chat_id: i64) -> Result<()> {
        let Some(mut session) = self.guarded_session(chat_id, &[FlowState::Idle]).await? else {
            return Ok(());
        };
        session.state = FlowState::AwaitingUnavailableDate;
        self.sessions.set(chat_id, session);

        self.show_unavailable_dates(chat_id, Local::now().date_naive()).await
    }

    async fn show_unavailable_dates(&self, chat_id: i64, month: NaiveDate) -> Result<()> {
        let text = texts::select_unavailable_date(&month.format("%B").to_string(), month.year());
        let keyboard = keyboards::unavailable_dates(month, Local::now().date_naive());
        self.send_flow_keyboard(chat_id, &text, keyboard).await
    }

    pub(crate) async fn unavailable_month_nav(
        &self,
        _ctx: &RequestContext,
        chat_id: i64,
        month: &str,
        forward: bool,
    ) -> Result<()> {
        if self
            .guarded_session(chat_id, &[FlowState::AwaitingUnavailableDate])
            .await?
            .is_none()
        {
            return Ok(());
        }
        let Some(shifted) = keyboards::shift_month(month, forward) else {
            self.outbound.send(chat_id, texts::INVALID_DATE_FORMAT).await?;
            return Ok(());
        };
        match NaiveDate::parse_from_str(&format!("{shifted}-01"), "%Y-%m-%d") {
            Ok(first) => self.show_unavailable_dates(chat_id, first).await,
            Err(_) => {
                self.outbound.send(chat_id, texts::INVALID_DATE_FORMAT).await?;
                Ok(())
            },
        }
    }

    pub(crate) async fn unavailable_date_selection(
        &self,
        ctx: &RequestContext,
        chat_id: i64,
        date: &str,
    ) -> Result<()> {
        let Some(mut session) = self
            .guarded_session(chat_id, &[FlowState::AwaitingUnavailableDate])
            .await?
        else {
            return Ok(());
        };
        session.state = FlowState::AwaitingUnavailableStartTime;
        session.selected_date = date.to_string();
        let backend_id = session.backend_id.clone();
        self.sessions.set(chat_id, session);

        let availability = match self.api.availability(ctx, &backend_id, date).await {
            Ok(availability) => availability,
            Err(e) => {
                return self
                    .send_api_error(chat_id, "Failed to load availability", &e)
                    .await;
            },
        };

        self.send_flow_keyboard(
            chat_id,
            &texts::select_unavailable_start(&availability.date),
            keyboards::unavailable_start_slots(&availability),
        )
        .await
    }

    pub(crate) async fn unavailable_start_selection(
        &self,
        ctx: &RequestContext,
        chat_id: i64,
        start: &str,
    ) -> Result<()> {
        let Some(mut session) = self
            .guarded_session(chat_id, &[FlowState::AwaitingUnavailableStartTime])
            .await?
        else {
            return Ok(());
        };
        session.state = FlowState::AwaitingUnavailableEndTime;
        session.unavailable_start = start.to_string();
        let backend_id = session.backend_id.clone();
        let date = session.selected_date.clone();
        self.sessions.set(chat_id, session);

        let availability = match self.api.availability(ctx, &backend_id, &date).await {
            Ok(availability) => availability,
            Err(e) => {
                return self
                    .send_api_error(chat_id, "Failed to load availability", &e)
                    .await;
            },
        };

        let mut text = texts::select_unavailable_end(start);
        if let Some(limit) = keyboards::first_unavailable_after(start, &availability) {
            let details = availability
                .slots
                .iter()
                .find(|s| !s.available && s.start_time.get(11..16) == Some(limit.as_str()))
                .map(|s| {
                    let mut d = format!("Unavailable slot at {limit}");
                    if let Some(kind) = s.kind.as_deref() {
                        d.push_str(&format!(" ({kind})"));
                    }
                    if let Some(description) = s.description.as_deref() {
                        d.push_str(&format!(" - {description}"));
                    }
                    d
                })
                .unwrap_or_else(|| format!("Unavailable slot at {limit}"));
            text.push_str("\n\n");
            text.push_str(&texts::unavailable_slot_warning(&limit, &details));
        }

        let keyboard = keyboards::unavailable_end_slots(start, &availability);
        if keyboards::only_cancel(&keyboard) {
            text.push_str("\n\n");
            text.push_str(texts::NO_AVAILABLE_END_SLOTS);
        }
        self.send_flow_keyboard(chat_id, &text, keyboard).await
    }

    pub(crate) async fn unavailable_end_selection(&self, chat_id: i64, end: &str) -> Result<()> {
        let Some(mut session) = self
            .guarded_session(chat_id, &[FlowState::AwaitingUnavailableEndTime])
            .await?
        else {
            return Ok(());
        };
        session.state = FlowState::AwaitingUnavailableDescription;
        session.unavailable_end = end.to_string();
        let date = session.selected_date.clone();
        let start = session.unavailable_start.clone();
        self.sessions.set(chat_id, session);

        let text = texts::unavailable_description_prompt(&date, &start, end);
        self.outbound.send(chat_id, &text).await?;
        Ok(())
    }

    pub(crate) async fn unavailable_description(
        &self,
        ctx: &RequestContext,
        chat_id: i64,
        description: &str,
    ) -> Result<()> {
        let Some(mut session) = self
            .guarded_session(chat_id, &[FlowState::AwaitingUnavailableDescription])
            .await?
        else {
            return Ok(());
        };

        let (Some(start_at), Some(end_at)) = (
            local_datetime(&session.selected_date, &session.unavailable_start),
            local_datetime(&session.selected_date, &session.unavailable_end),
        ) else {
            self.outbound.send(chat_id, texts::INVALID_DATE_FORMAT).await?;
            return Ok(());
        };

        let req = CreateUnavailableRequest {
            professional_id: session.backend_id.clone(),
            start_at: start_at.to_rfc3339(),
            end_at: end_at.to_rfc3339(),
            description: description.to_string(),
        };
        let appointment = match self.api.create_unavailable(ctx, &req).await {
            Ok(appointment) => appointment,
            Err(e) => {
                return self
                    .send_api_error(chat_id, "Failed to create unavailable appointment", &e)
                    .await;
            },
        };

        let date = session.selected_date.clone();
        let start = session.unavailable_start.clone();
        let end = session.unavailable_end.clone();
        session.clear_flow();
        self.sessions.set(chat_id, session);

        let text = texts::unavailable_period_set(
            &date,
            &start,
            &end,
            appointment.description.as_deref().unwrap_or(description),
        );
        self.outbound.send(chat_id, &text).await?;
        self.show_dashboard(ctx, chat_id).await
    }

    pub(crate) async fn cancel_unavailable(&self, ctx: &RequestContext, chat_id: i64) -> Result<()> {
        let Some(mut session) = self.session_or_prompt(chat_id).await? else {
            return Ok(());
        };
        session.clear_flow();
        self.sessions.set(chat_id, session);

        self.outbound.send(chat_id, texts::UNAVAILABLE_CANCELLED).await?;
        self.show_dashboard(ctx, chat_id).await
    }
}
