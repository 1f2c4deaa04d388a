//! Client-side flows: registration, booking, and appointment lists.

use {
    chrono::{Datelike, Duration, Local, NaiveDate},
    tracing::warn,
};

use {
    bookline_api::{CreateAppointmentRequest, RegisterRequest},
    bookline_common::RequestContext,
    bookline_sessions::{FlowState, Role, Session},
};

use crate::{
    error::Result,
    handlers::{BotHandler, local_datetime},
    keyboards, texts,
};

impl BotHandler {
    pub(crate) async fn start_registration(&self, chat_id: i64) -> Result<()> {
        self.sessions.set(
            chat_id,
            Session::with_role(Role::Client, FlowState::AwaitingFirstName),
        );
        self.outbound.send(chat_id, texts::CLIENT_REGISTRATION).await?;
        Ok(())
    }

    pub(crate) async fn first_name_input(&self, chat_id: i64, first_name: &str) -> Result<()> {
        let Some(mut session) = self.session_or_prompt(chat_id).await? else {
            return Ok(());
        };
        session.first_name = first_name.trim().to_string();
        session.state = FlowState::AwaitingLastName;
        self.sessions.set(chat_id, session);

        self.outbound.send(chat_id, texts::FIRST_NAME_SAVED).await?;
        Ok(())
    }

    pub(crate) async fn last_name_input(&self, chat_id: i64, last_name: &str) -> Result<()> {
        let Some(mut session) = self.session_or_prompt(chat_id).await? else {
            return Ok(());
        };
        session.last_name = last_name.trim().to_string();
        session.state = FlowState::AwaitingPhone;
        self.sessions.set(chat_id, session);

        self.outbound.send(chat_id, texts::LAST_NAME_SAVED).await?;
        Ok(())
    }

    /// Last registration step; "skip" or an empty reply registers without a
    /// phone number.
    pub(crate) async fn phone_input(
        &self,
        ctx: &RequestContext,
        chat_id: i64,
        phone: &str,
    ) -> Result<()> {
        let Some(session) = self.session_or_prompt(chat_id).await? else {
            return Ok(());
        };

        let phone = phone.trim();
        let phone_number = (!phone.is_empty() && !phone.eq_ignore_ascii_case("skip"))
            .then(|| phone.to_string());

        let req = RegisterRequest {
            first_name: session.first_name.clone(),
            last_name: session.last_name.clone(),
            chat_id,
            phone_number,
            role: Role::Client.as_str().to_string(),
        };
        let user = match self.api.register_client(ctx, &req).await {
            Ok(user) => user,
            Err(e) => return self.send_api_error(chat_id, "Registration failed", &e).await,
        };

        self.seed_session(chat_id, &user);
        let text = texts::registration_successful(&user.first_name, &user.last_name, &user.role, chat_id);
        self.outbound
            .send_with_keyboard(chat_id, &text, keyboards::registration_success())
            .await?;
        Ok(())
    }

    pub(crate) async fn book_appointment(&self, ctx: &RequestContext, chat_id: i64) -> Result<()> {
        let Some(mut session) = self.guarded_session(chat_id, &[FlowState::Idle]).await? else {
            return Ok(());
        };
        session.state = FlowState::AwaitingProfessionalSelection;
        self.sessions.set(chat_id, session);

        let professionals = match self.api.professionals(ctx).await {
            Ok(professionals) => professionals,
            Err(e) => {
                return self
                    .send_api_error(chat_id, "Failed to load professionals", &e)
                    .await;
            },
        };
        if professionals.is_empty() {
            self.outbound.send(chat_id, texts::NO_PROFESSIONALS).await?;
            return self.show_dashboard(ctx, chat_id).await;
        }

        self.send_flow_keyboard(
            chat_id,
            texts::SELECT_PROFESSIONAL,
            keyboards::professionals(&professionals),
        )
        .await
    }

    pub(crate) async fn professional_selection(
        &self,
        _ctx: &RequestContext,
        chat_id: i64,
        professional_id: &str,
    ) -> Result<()> {
        let Some(mut session) = self
            .guarded_session(chat_id, &[FlowState::AwaitingProfessionalSelection])
            .await?
        else {
            return Ok(());
        };
        session.state = FlowState::AwaitingDateSelection;
        session.selected_professional_id = professional_id.to_string();
        self.sessions.set(chat_id, session);

        self.show_booking_dates(chat_id, Local::now().date_naive()).await
    }

    async fn show_booking_dates(&self, chat_id: i64, month: NaiveDate) -> Result<()> {
        let text = texts::select_date(&month.format("%B").to_string(), month.year());
        let keyboard = keyboards::booking_dates(month, Local::now().date_naive());
        self.send_flow_keyboard(chat_id, &text, keyboard).await
    }

    pub(crate) async fn booking_month_nav(
        &self,
        _ctx: &RequestContext,
        chat_id: i64,
        month: &str,
        forward: bool,
    ) -> Result<()> {
        if self
            .guarded_session(chat_id, &[FlowState::AwaitingDateSelection])
            .await?
            .is_none()
        {
            return Ok(());
        }
        let Some(shifted) = keyboards::shift_month(month, forward) else {
            self.outbound.send(chat_id, texts::INVALID_DATE_FORMAT).await?;
            return Ok(());
        };
        let Some(first) = NaiveDate::parse_from_str(&format!("{shifted}-01"), "%Y-%m-%d").ok() else {
            self.outbound.send(chat_id, texts::INVALID_DATE_FORMAT).await?;
            return Ok(());
        };
        self.show_booking_dates(chat_id, first).await
    }

    pub(crate) async fn date_selection(
        &self,
        ctx: &RequestContext,
        chat_id: i64,
        date: &str,
    ) -> Result<()> {
        let Some(mut session) = self
            .guarded_session(chat_id, &[FlowState::AwaitingDateSelection])
            .await?
        else {
            return Ok(());
        };
        session.state = FlowState::AwaitingTimeSelection;
        session.selected_date = date.to_string();
        let professional_id = session.selected_professional_id.clone();
        self.sessions.set(chat_id, session);

        let availability = match self.api.availability(ctx, &professional_id, date).await {
            Ok(availability) => availability,
            Err(e) => {
                return self
                    .send_api_error(chat_id, "Failed to load availability", &e)
                    .await;
            },
        };

        self.send_flow_keyboard(
            chat_id,
            &texts::select_time(&availability.date),
            keyboards::time_slots(&availability),
        )
        .await
    }

    /// Book the selected slot. Slots are one hour; the end time is derived.
    pub(crate) async fn time_selection(
        &self,
        ctx: &RequestContext,
        chat_id: i64,
        start: &str,
    ) -> Result<()> {
        let Some(mut session) = self
            .guarded_session(chat_id, &[FlowState::AwaitingTimeSelection])
            .await?
        else {
            return Ok(());
        };

        let Some(start_at) = local_datetime(&session.selected_date, start) else {
            self.outbound.send(chat_id, texts::INVALID_TIME_FORMAT).await?;
            return Ok(());
        };
        let end_at = start_at + Duration::hours(1);
        if start_at <= Local::now() {
            self.outbound.send(chat_id, texts::PAST_TIME_NOT_ALLOWED).await?;
            return Ok(());
        }

        let req = CreateAppointmentRequest {
            client_id: session.backend_id.clone(),
            professional_id: session.selected_professional_id.clone(),
            start_time: start_at.to_rfc3339(),
            end_time: end_at.to_rfc3339(),
        };
        let envelope = match self.api.create_appointment(ctx, &req).await {
            Ok(envelope) => envelope,
            Err(e) => {
                return self
                    .send_api_error(chat_id, "Failed to create appointment", &e)
                    .await;
            },
        };

        let date = session.selected_date.clone();
        session.clear_flow();
        self.sessions.set(chat_id, session.clone());

        let (prof_first, prof_last) = envelope
            .professional
            .as_ref()
            .map(|p| (p.first_name.as_str(), p.last_name.as_str()))
            .unwrap_or_default();
        let text = texts::appointment_booked(
            &date,
            start,
            &end_at.format("%H:%M").to_string(),
            prof_first,
            prof_last,
        );
        self.outbound.send(chat_id, &text).await?;

        self.notify_professional_new_appointment(&envelope, &session).await;
        self.show_dashboard(ctx, chat_id).await
    }

    /// Tell the professional a booking arrived, with confirm / cancel
    /// buttons. Notification failures never fail the client's flow.
    async fn notify_professional_new_appointment(
        &self,
        envelope: &bookline_api::AppointmentEnvelope,
        session: &Session,
    ) {
        let Some(prof_chat) = envelope.professional.as_ref().and_then(|p| p.chat_id) else {
            return;
        };
        let text = texts::new_appointment_request(
            &envelope.appointment,
            &session.first_name,
            &session.last_name,
        );
        let keyboard = keyboards::appointment_request(&envelope.appointment.id);
        if let Err(e) = self.outbound.send_with_keyboard(prof_chat, &text, keyboard).await {
            warn!(chat_id = prof_chat, error = %e, "failed to notify professional");
        }
    }

    pub(crate) async fn cancel_booking(&self, ctx: &RequestContext, chat_id: i64) -> Result<()> {
        let Some(mut session) = self
            .guarded_session(
                chat_id,
                &[
                    FlowState::AwaitingProfessionalSelection,
                    FlowState::AwaitingDateSelection,
                    FlowState::AwaitingTimeSelection,
                ],
            )
            .await?
        else {
            return Ok(());
        };
        session.clear_flow();
        self.sessions.set(chat_id, session);

        self.outbound.send(chat_id, texts::BOOKING_CANCELLED).await?;
        self.show_dashboard(ctx, chat_id).await
    }

    pub(crate) async fn client_pending_appointments(
        &self,
        ctx: &RequestContext,
        chat_id: i64,
    ) -> Result<()> {
        self.client_appointment_list(
            ctx,
            chat_id,
            "pending",
            texts::PENDING_APPOINTMENTS_HEADER,
            texts::NO_PENDING_APPOINTMENTS,
        )
        .await
    }

    pub(crate) async fn client_upcoming_appointments(
        &self,
        ctx: &RequestContext,
        chat_id: i64,
    ) -> Result<()> {
        self.client_appointment_list(
            ctx,
            chat_id,
            "confirmed",
            texts::UPCOMING_APPOINTMENTS_HEADER,
            texts::NO_UPCOMING_APPOINTMENTS,
        )
        .await
    }

    async fn client_appointment_list(
        &self,
        ctx: &RequestContext,
        chat_id: i64,
        status: &str,
        header: &str,
        empty_message: &str,
    ) -> Result<()> {
        let Some(session) = self.session_or_prompt(chat_id).await? else {
            return Ok(());
        };

        let appointments = match self
            .api
            .client_appointments(ctx, &session.backend_id, status)
            .await
        {
            Ok(appointments) => appointments,
            Err(e) => {
                return self
                    .send_api_error(chat_id, "Failed to load appointments", &e)
                    .await;
            },
        };
        if appointments.is_empty() {
            self.outbound.send(chat_id, empty_message).await?;
            return self.show_dashboard(ctx, chat_id).await;
        }

        let mut text = header.to_string();
        for (i, apt) in appointments.iter().enumerate() {
            text.push_str(&texts::appointment_entry(apt, i, false));
        }
        self.send_flow_keyboard(chat_id, &text, keyboards::client_appointments(&appointments))
            .await
    }

    pub(crate) async fn client_cancel_appointment(
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

    pub(crate) async fn client_cancellation_reason(
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
            .cancel_client_appointment(ctx, &session.backend_id, &appointment_id, reason)
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
            .professional
            .as_ref()
            .map(|p| format!("Professional: {} {}", p.first_name, p.last_name))
            .unwrap_or_default();
        let reason_display = envelope
            .appointment
            .cancellation_reason
            .as_deref()
            .unwrap_or(reason);
        let text = texts::appointment_cancelled(&date, &start, &end, &counterparty, reason_display);
        self.outbound.send(chat_id, &text).await?;

        if let Some(prof_chat) = envelope.professional.as_ref().and_then(|p| p.chat_id) {
            let notice = texts::appointment_cancelled_by_client(
                &envelope.appointment,
                &session.first_name,
                &session.last_name,
            );
            if let Err(e) = self.outbound.send(prof_chat, &notice).await {
                warn!(chat_id = prof_chat, error = %e, "failed to notify professional");
            }
        }

        self.show_dashboard(ctx, chat_id).await
    }
}
