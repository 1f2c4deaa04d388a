//! Event handling for the booking flows.
//!
//! `BotHandler` is the dispatcher's [`EventHandler`]: messages are routed by
//! the chat's flow state, callbacks by the [`CallbackRouter`]. Client and
//! professional flows live in their own submodules; everything here is the
//! shared plumbing they run on.

mod client;
mod professional;

use std::sync::Arc;

use {
    async_trait::async_trait,
    chrono::{DateTime, Local, NaiveDate, NaiveTime, TimeZone},
    tracing::{info, warn},
};

use {
    bookline_api::BookingApi,
    bookline_common::{Event, RequestContext},
    bookline_dispatch::EventHandler,
    bookline_routing::{CallbackRouter, Command},
    bookline_sessions::{FlowState, Role, Session, SessionStore},
};

use crate::{error::Result, keyboards, outbound::Outbound, texts};

/// Booking bot logic behind the dispatcher.
pub struct BotHandler {
    outbound: Arc<dyn Outbound>,
    api: Arc<dyn BookingApi>,
    sessions: Arc<SessionStore>,
    router: CallbackRouter,
}

#[async_trait]
impl EventHandler for BotHandler {
    async fn handle(&self, ctx: RequestContext, event: Event) -> anyhow::Result<()> {
        match event {
            Event::Message { chat_id, text, .. } => {
                info!(chat_id, text = %text, "received message");
                if text.trim() == "/start" {
                    self.handle_start(&ctx, chat_id).await?;
                } else {
                    self.handle_user_input(&ctx, chat_id, &text).await?;
                }
            },
            Event::Callback {
                chat_id,
                query_id,
                data,
                ..
            } => {
                info!(chat_id, callback_data = %data, "received callback query");
                if let Err(e) = self.outbound.answer_callback(&query_id).await {
                    warn!(chat_id, error = %e, "failed to answer callback query");
                }
                match self.router.resolve(&data) {
                    Some(m) => self.dispatch(&ctx, chat_id, m.command, m.param).await?,
                    None => {
                        warn!(chat_id, callback_data = %data, "no route for callback");
                        self.outbound.send(chat_id, texts::UNKNOWN_COMMAND).await?;
                    },
                }
            },
        }
        Ok(())
    }
}

impl BotHandler {
    #[must_use]
    pub fn new(
        outbound: Arc<dyn Outbound>,
        api: Arc<dyn BookingApi>,
        sessions: Arc<SessionStore>,
    ) -> Self {
        let router = CallbackRouter::standard();
        let (exact, prefix) = router.stats();
        info!(exact_routes = exact, prefix_routes = prefix, "callback router ready");
        Self {
            outbound,
            api,
            sessions,
            router,
        }
    }

    async fn dispatch(
        &self,
        ctx: &RequestContext,
        chat_id: i64,
        command: Command,
        param: &str,
    ) -> Result<()> {
        match command {
            Command::StartClientRegistration => self.start_registration(chat_id).await,
            Command::StartProfessionalSignIn => self.start_sign_in(chat_id).await,
            Command::BookAppointment => self.book_appointment(ctx, chat_id).await,
            Command::PendingAppointments => self.client_pending_appointments(ctx, chat_id).await,
            Command::UpcomingAppointments => self.client_upcoming_appointments(ctx, chat_id).await,
            Command::CancelBooking => self.cancel_booking(ctx, chat_id).await,
            Command::ProfessionalPendingAppointments => {
                self.professional_pending_appointments(ctx, chat_id).await
            },
            Command::ProfessionalUpcomingAppointments => {
                self.professional_upcoming_appointments(ctx, chat_id).await
            },
            Command::ProfessionalTimetable => self.timetable(ctx, chat_id).await,
            Command::ProfessionalPreviousAppointments => {
                self.previous_appointments(ctx, chat_id).await
            },
            Command::SetUnavailable => self.set_unavailable(ctx, chat_id).await,
            Command::CancelUnavailable => self.cancel_unavailable(ctx, chat_id).await,
            Command::BackToDashboard => self.show_dashboard(ctx, chat_id).await,
            Command::PrevMonth => self.booking_month_nav(ctx, chat_id, param, false).await,
            Command::NextMonth => self.booking_month_nav(ctx, chat_id, param, true).await,
            Command::SelectProfessional => self.professional_selection(ctx, chat_id, param).await,
            Command::SelectDate => self.date_selection(ctx, chat_id, param).await,
            Command::SelectTime => self.time_selection(ctx, chat_id, param).await,
            Command::CancelAppointment => self.client_cancel_appointment(chat_id, param).await,
            Command::ConfirmAppointment => self.confirm_appointment(ctx, chat_id, param).await,
            Command::CancelProfessionalAppointment => {
                self.professional_cancel_appointment(chat_id, param).await
            },
            Command::SelectClient => self.client_selection(ctx, chat_id, param).await,
            // Both history nav payloads already name the month to show.
            Command::PrevPreviousMonth | Command::NextPreviousMonth => {
                self.previous_month_nav(ctx, chat_id, param).await
            },
            Command::PrevUpcomingMonth => self.upcoming_month_nav(ctx, chat_id, param, false).await,
            Command::NextUpcomingMonth => self.upcoming_month_nav(ctx, chat_id, param, true).await,
            Command::SelectUpcomingDate => self.upcoming_date_selection(ctx, chat_id, param).await,
            Command::PrevTimetableDay => self.timetable_nav(ctx, chat_id, param, false).await,
            Command::NextTimetableDay => self.timetable_nav(ctx, chat_id, param, true).await,
            Command::PrevUnavailableMonth => {
                self.unavailable_month_nav(ctx, chat_id, param, false).await
            },
            Command::NextUnavailableMonth => {
                self.unavailable_month_nav(ctx, chat_id, param, true).await
            },
            Command::SelectUnavailableDate => {
                self.unavailable_date_selection(ctx, chat_id, param).await
            },
            Command::SelectUnavailableStart => {
                self.unavailable_start_selection(ctx, chat_id, param).await
            },
            Command::SelectUnavailableEnd => {
                self.unavailable_end_selection(chat_id, param).await
            },
        }
    }

    /// `/start`: returning users land on their dashboard, new chats pick a
    /// role.
    async fn handle_start(&self, ctx: &RequestContext, chat_id: i64) -> Result<()> {
        match self.api.user_by_chat(ctx, chat_id).await {
            Ok(Some(user)) => {
                self.seed_session(chat_id, &user);
                self.show_dashboard(ctx, chat_id).await
            },
            Ok(None) => {
                self.outbound
                    .send_with_keyboard(chat_id, texts::WELCOME, keyboards::role_select())
                    .await?;
                Ok(())
            },
            Err(e) => {
                warn!(chat_id, error = %e, "user lookup failed, treating chat as unregistered");
                self.outbound
                    .send_with_keyboard(chat_id, texts::WELCOME, keyboards::role_select())
                    .await?;
                Ok(())
            },
        }
    }

    /// Free-text input is meaningful only while a flow is waiting for it.
    async fn handle_user_input(&self, ctx: &RequestContext, chat_id: i64, text: &str) -> Result<()> {
        let Some(session) = self.sessions.get(chat_id) else {
            self.outbound.send(chat_id, texts::UNKNOWN_COMMAND).await?;
            return Ok(());
        };

        match session.state {
            FlowState::AwaitingFirstName => self.first_name_input(chat_id, text).await,
            FlowState::AwaitingLastName => self.last_name_input(chat_id, text).await,
            FlowState::AwaitingPhone => self.phone_input(ctx, chat_id, text).await,
            FlowState::AwaitingUsername => self.username_input(chat_id, text).await,
            FlowState::AwaitingPassword => self.password_input(ctx, chat_id, text).await,
            FlowState::AwaitingCancellationReason => match session.role {
                Some(Role::Professional) => {
                    self.professional_cancellation_reason(ctx, chat_id, text).await
                },
                _ => self.client_cancellation_reason(ctx, chat_id, text).await,
            },
            FlowState::AwaitingUnavailableDescription => {
                self.unavailable_description(ctx, chat_id, text).await
            },
            _ => {
                self.outbound.send(chat_id, texts::UNKNOWN_COMMAND).await?;
                Ok(())
            },
        }
    }

    /// Role-appropriate dashboard. Flushes the flow's keyboard messages and
    /// resets the session to `Idle` first.
    pub(crate) async fn show_dashboard(&self, _ctx: &RequestContext, chat_id: i64) -> Result<()> {
        let Some(mut session) = self.session_or_prompt(chat_id).await? else {
            return Ok(());
        };

        for message_id in session.take_cleanup() {
            if let Err(e) = self.outbound.delete_message(chat_id, message_id).await {
                warn!(chat_id, message_id, error = %e, "failed to delete flow message");
            }
        }
        session.clear_flow();
        self.sessions.set(chat_id, session.clone());

        match session.role {
            Some(Role::Professional) => {
                let text = texts::welcome_back(&session.last_name, Role::Professional.as_str());
                self.outbound
                    .send_with_keyboard(chat_id, &text, keyboards::professional_dashboard())
                    .await?;
            },
            _ => {
                let text = texts::welcome_back(&session.first_name, Role::Client.as_str());
                self.outbound
                    .send_with_keyboard(chat_id, &text, keyboards::client_dashboard())
                    .await?;
            },
        }
        Ok(())
    }

    /// Replace the chat's session with the registered profile the backend
    /// reported. Cleanup bookkeeping survives so stale keyboards still get
    /// deleted.
    pub(crate) fn seed_session(&self, chat_id: i64, user: &bookline_api::ApiUser) {
        let mut session = self.sessions.get(chat_id).unwrap_or_default();
        session.backend_id = user.id.clone();
        session.role = Some(if user.role == Role::Professional.as_str() {
            Role::Professional
        } else {
            Role::Client
        });
        session.state = FlowState::Idle;
        session.username = user.username.clone();
        session.first_name = user.first_name.clone();
        session.last_name = user.last_name.clone();
        session.phone_number = user.phone_number.clone();
        self.sessions.set(chat_id, session);
    }

    /// The chat's session, or a "please /start" prompt when there is none.
    pub(crate) async fn session_or_prompt(&self, chat_id: i64) -> Result<Option<Session>> {
        match self.sessions.get(chat_id) {
            Some(session) => Ok(Some(session)),
            None => {
                self.outbound.send(chat_id, texts::SESSION_NOT_FOUND).await?;
                Ok(None)
            },
        }
    }

    /// State-machine guard: the session, but only when its state is in the
    /// operation's allow-set. Replies with the violation message otherwise.
    pub(crate) async fn guarded_session(
        &self,
        chat_id: i64,
        allowed: &[FlowState],
    ) -> Result<Option<Session>> {
        let Some(session) = self.session_or_prompt(chat_id).await? else {
            return Ok(None);
        };
        if let Err(e) = session.ensure_state(allowed) {
            warn!(chat_id, error = %e, "operation rejected by state guard");
            self.outbound.send(chat_id, texts::INVALID_STATE).await?;
            return Ok(None);
        }
        Ok(Some(session))
    }

    /// Send a flow keyboard and record the message for dashboard cleanup.
    pub(crate) async fn send_flow_keyboard(
        &self,
        chat_id: i64,
        text: &str,
        keyboard: teloxide::types::InlineKeyboardMarkup,
    ) -> Result<()> {
        let message_id = self.outbound.send_with_keyboard(chat_id, text, keyboard).await?;
        if let Some(mut session) = self.sessions.get(chat_id) {
            session.track_message(message_id);
            self.sessions.set(chat_id, session);
        }
        Ok(())
    }

    /// Report a failed backend call to the chat and keep the flow alive.
    pub(crate) async fn send_api_error(
        &self,
        chat_id: i64,
        label: &str,
        err: &bookline_api::Error,
    ) -> Result<()> {
        warn!(chat_id, error = %err, "{label}");
        self.outbound
            .send(chat_id, &format!("❌ {label}: {err}"))
            .await?;
        Ok(())
    }
}

/// Combine a stored `YYYY-MM-DD` date and `HH:MM` time into a local
/// timestamp. `None` for malformed parts or nonexistent local times.
pub(crate) fn local_datetime(date: &str, time: &str) -> Option<DateTime<Local>> {
    let date = NaiveDate::parse_from_str(date, "%Y-%m-%d").ok()?;
    let time = NaiveTime::parse_from_str(time, "%H:%M").ok()?;
    Local.from_local_datetime(&date.and_time(time)).earliest()
}

/// `Monday, January 2, 2026` style display for a `YYYY-MM-DD` token.
pub(crate) fn long_date(date: &str) -> String {
    NaiveDate::parse_from_str(date, "%Y-%m-%d")
        .map(|d| d.format("%A, %B %-d, %Y").to_string())
        .unwrap_or_else(|_| date.to_string())
}

#[cfg(test)]
mod tests {
    use std::sync::Mutex;

    use {
        bookline_api::{
            ApiUser, Appointment, AppointmentEnvelope, Availability, ClientSummary,
            CreateAppointmentRequest, CreateUnavailableRequest, PreviousAppointment,
            RegisterRequest, SignInRequest,
        },
        bookline_routing::patterns,
    };

    use super::*;

    #[derive(Debug)]
    enum Sent {
        Text(i64, String),
        Keyboard(i64, String, Vec<String>),
        Deleted(i64, i32),
    }

    #[derive(Default)]
    struct RecordingOutbound {
        sent: Mutex<Vec<Sent>>,
        next_id: Mutex<i32>,
    }

    impl RecordingOutbound {
        fn texts(&self) -> Vec<String> {
            self.sent
                .lock()
                .unwrap()
                .iter()
                .filter_map(|s| match s {
                    Sent::Text(_, text) | Sent::Keyboard(_, text, _) => Some(text.clone()),
                    Sent::Deleted(..) => None,
                })
                .collect()
        }

        fn last_buttons(&self) -> Vec<String> {
            self.sent
                .lock()
                .unwrap()
                .iter()
                .rev()
                .find_map(|s| match s {
                    Sent::Keyboard(_, _, buttons) => Some(buttons.clone()),
                    _ => None,
                })
                .unwrap_or_default()
        }
    }

    #[async_trait]
    impl Outbound for RecordingOutbound {
        async fn send(&self, chat_id: i64, text: &str) -> Result<i32> {
            self.sent.lock().unwrap().push(Sent::Text(chat_id, text.into()));
            let mut id = self.next_id.lock().unwrap();
            *id += 1;
            Ok(*id)
        }

        async fn send_with_keyboard(
            &self,
            chat_id: i64,
            text: &str,
            keyboard: teloxide::types::InlineKeyboardMarkup,
        ) -> Result<i32> {
            let buttons = keyboard
                .inline_keyboard
                .iter()
                .flatten()
                .map(|b| b.text.clone())
                .collect();
            self.sent
                .lock()
                .unwrap()
                .push(Sent::Keyboard(chat_id, text.into(), buttons));
            let mut id = self.next_id.lock().unwrap();
            *id += 1;
            Ok(*id)
        }

        async fn delete_message(&self, chat_id: i64, message_id: i32) -> Result<()> {
            self.sent.lock().unwrap().push(Sent::Deleted(chat_id, message_id));
            Ok(())
        }

        async fn answer_callback(&self, _query_id: &str) -> Result<()> {
            Ok(())
        }
    }

    #[derive(Default)]
    struct StubApi {
        user: Option<ApiUser>,
        registered: Option<ApiUser>,
        signed_in: Option<ApiUser>,
        professionals: Vec<ApiUser>,
        appointments: Vec<Appointment>,
        availability: Availability,
        dates: Vec<String>,
        envelope: AppointmentEnvelope,
        clients: Vec<ClientSummary>,
        history: Vec<PreviousAppointment>,
    }

    #[async_trait]
    impl BookingApi for StubApi {
        async fn user_by_chat(
            &self,
            _ctx: &RequestContext,
            _chat_id: i64,
        ) -> bookline_api::Result<Option<ApiUser>> {
            Ok(self.user.clone())
        }

        async fn register_client(
            &self,
            _ctx: &RequestContext,
            _req: &RegisterRequest,
        ) -> bookline_api::Result<ApiUser> {
            self.registered.clone().ok_or(bookline_api::Error::Api {
                status: 422,
                message: "registration rejected".into(),
                request_id: None,
            })
        }

        async fn sign_in_professional(
            &self,
            _ctx: &RequestContext,
            _req: &SignInRequest,
        ) -> bookline_api::Result<ApiUser> {
            self.signed_in.clone().ok_or(bookline_api::Error::Api {
                status: 401,
                message: "invalid credentials".into(),
                request_id: None,
            })
        }

        async fn professionals(&self, _ctx: &RequestContext) -> bookline_api::Result<Vec<ApiUser>> {
            Ok(self.professionals.clone())
        }

        async fn availability(
            &self,
            _ctx: &RequestContext,
            _professional_id: &str,
            _date: &str,
        ) -> bookline_api::Result<Availability> {
            Ok(self.availability.clone())
        }

        async fn create_appointment(
            &self,
            _ctx: &RequestContext,
            _req: &CreateAppointmentRequest,
        ) -> bookline_api::Result<AppointmentEnvelope> {
            Ok(self.envelope.clone())
        }

        async fn client_appointments(
            &self,
            _ctx: &RequestContext,
            _client_id: &str,
            _status: &str,
        ) -> bookline_api::Result<Vec<Appointment>> {
            Ok(self.appointments.clone())
        }

        async fn cancel_client_appointment(
            &self,
            _ctx: &RequestContext,
            _client_id: &str,
            _appointment_id: &str,
            _reason: &str,
        ) -> bookline_api::Result<AppointmentEnvelope> {
            Ok(self.envelope.clone())
        }

        async fn professional_appointments(
            &self,
            _ctx: &RequestContext,
            _professional_id: &str,
            _status: &str,
            _date: Option<&str>,
        ) -> bookline_api::Result<Vec<Appointment>> {
            Ok(self.appointments.clone())
        }

        async fn appointment_dates(
            &self,
            _ctx: &RequestContext,
            _professional_id: &str,
            _status: &str,
            _month: &str,
        ) -> bookline_api::Result<Vec<String>> {
            Ok(self.dates.clone())
        }

        async fn professional_clients(
            &self,
            _ctx: &RequestContext,
            _professional_id: &str,
        ) -> bookline_api::Result<Vec<ClientSummary>> {
            Ok(self.clients.clone())
        }

        async fn previous_appointments_by_client(
            &self,
            _ctx: &RequestContext,
            _professional_id: &str,
            _client_id: &str,
            _month: &str,
        ) -> bookline_api::Result<Vec<PreviousAppointment>> {
            Ok(self.history.clone())
        }

        async fn confirm_appointment(
            &self,
            _ctx: &RequestContext,
            _professional_id: &str,
            _appointment_id: &str,
        ) -> bookline_api::Result<AppointmentEnvelope> {
            Ok(self.envelope.clone())
        }

        async fn cancel_professional_appointment(
            &self,
            _ctx: &RequestContext,
            _professional_id: &str,
            _appointment_id: &str,
            _reason: &str,
        ) -> bookline_api::Result<AppointmentEnvelope> {
            Ok(self.envelope.clone())
        }

        async fn create_unavailable(
            &self,
            _ctx: &RequestContext,
            _req: &CreateUnavailableRequest,
        ) -> bookline_api::Result<Appointment> {
            Ok(self.envelope.appointment.clone())
        }

        async fn timetable(
            &self,
            _ctx: &RequestContext,
            _professional_id: &str,
            _date: &str,
        ) -> bookline_api::Result<Availability> {
            Ok(self.availability.clone())
        }
    }

    struct Harness {
        handler: BotHandler,
        outbound: Arc<RecordingOutbound>,
        sessions: Arc<SessionStore>,
    }

    fn harness(api: StubApi) -> Harness {
        let outbound = Arc::new(RecordingOutbound::default());
        let sessions = Arc::new(SessionStore::new());
        let handler = BotHandler::new(
            Arc::clone(&outbound) as Arc<dyn Outbound>,
            Arc::new(api),
            Arc::clone(&sessions),
        );
        Harness {
            handler,
            outbound,
            sessions,
        }
    }

    fn message(chat_id: i64, text: &str) -> Event {
        Event::Message {
            chat_id,
            message_id: 1,
            user_id: 7,
            text: text.into(),
        }
    }

    fn callback(chat_id: i64, data: &str) -> Event {
        Event::Callback {
            chat_id,
            message_id: 1,
            user_id: 7,
            query_id: "q".into(),
            data: data.into(),
        }
    }

    fn client_user() -> ApiUser {
        ApiUser {
            id: "u1".into(),
            chat_id: Some(42),
            first_name: "Ada".into(),
            last_name: "Lovelace".into(),
            role: "client".into(),
            ..ApiUser::default()
        }
    }

    #[tokio::test]
    async fn start_offers_role_choice_to_unregistered_chat() {
        let h = harness(StubApi::default());
        h.handler
            .handle(RequestContext::new(), message(42, "/start"))
            .await
            .unwrap();
        assert!(h.outbound.texts().iter().any(|t| t == texts::WELCOME));
        assert_eq!(h.outbound.last_buttons(), vec!["👤 Client", "👨‍💼 Professional"]);
    }

    #[tokio::test]
    async fn start_shows_dashboard_to_registered_client() {
        let h = harness(StubApi {
            user: Some(client_user()),
            ..StubApi::default()
        });
        h.handler
            .handle(RequestContext::new(), message(42, "/start"))
            .await
            .unwrap();
        let session = h.sessions.get(42).unwrap();
        assert_eq!(session.backend_id, "u1");
        assert_eq!(session.role, Some(Role::Client));
        assert!(h.outbound.texts().iter().any(|t| t.contains("Welcome back, Ada")));
    }

    #[tokio::test]
    async fn registration_walks_name_phone_then_registers() {
        let h = harness(StubApi {
            registered: Some(client_user()),
            ..StubApi::default()
        });
        let drive = [
            callback(42, patterns::CLIENT),
            message(42, "Ada"),
            message(42, "Lovelace"),
            message(42, "skip"),
        ];
        for event in drive {
            h.handler.handle(RequestContext::new(), event).await.unwrap();
        }

        let session = h.sessions.get(42).unwrap();
        assert_eq!(session.backend_id, "u1");
        assert_eq!(session.state, FlowState::Idle);
        assert!(
            h.outbound
                .texts()
                .iter()
                .any(|t| t.contains("Registration successful"))
        );
    }

    #[tokio::test]
    async fn unroutable_callback_reports_unknown_command() {
        let h = harness(StubApi::default());
        h.handler
            .handle(RequestContext::new(), callback(42, "definitely_not_a_route"))
            .await
            .unwrap();
        assert_eq!(h.outbound.texts(), vec![texts::UNKNOWN_COMMAND]);
    }

    #[tokio::test]
    async fn free_text_without_session_reports_unknown_command() {
        let h = harness(StubApi::default());
        h.handler
            .handle(RequestContext::new(), message(42, "hello"))
            .await
            .unwrap();
        assert_eq!(h.outbound.texts(), vec![texts::UNKNOWN_COMMAND]);
    }

    #[tokio::test]
    async fn booking_is_rejected_mid_sign_in() {
        let h = harness(StubApi::default());
        h.sessions.set(
            42,
            Session::with_role(Role::Professional, FlowState::AwaitingPassword),
        );
        h.handler
            .handle(RequestContext::new(), callback(42, patterns::BOOK_APPOINTMENT))
            .await
            .unwrap();
        assert_eq!(h.outbound.texts(), vec![texts::INVALID_STATE]);
        // Guard rejection leaves the session untouched.
        assert_eq!(h.sessions.get(42).unwrap().state, FlowState::AwaitingPassword);
    }

    #[tokio::test]
    async fn failed_sign_in_rolls_back_the_temporary_session() {
        let h = harness(StubApi::default());
        let drive = [
            callback(42, patterns::PROFESSIONAL),
            message(42, "doc"),
            message(42, "wrong-password"),
        ];
        for event in drive {
            h.handler.handle(RequestContext::new(), event).await.unwrap();
        }

        assert!(h.sessions.get(42).is_none());
        assert!(h.outbound.texts().iter().any(|t| t.contains("Sign in failed")));
    }

    #[tokio::test]
    async fn dashboard_flushes_tracked_flow_messages() {
        let h = harness(StubApi {
            user: Some(client_user()),
            ..StubApi::default()
        });
        let mut session = Session::with_role(Role::Client, FlowState::AwaitingDateSelection);
        session.first_name = "Ada".into();
        session.track_message(30);
        session.track_message(31);
        h.sessions.set(42, session);

        h.handler
            .handle(RequestContext::new(), callback(42, patterns::BACK_TO_DASHBOARD))
            .await
            .unwrap();

        let sent = h.outbound.sent.lock().unwrap();
        let deleted: Vec<i32> = sent
            .iter()
            .filter_map(|s| match s {
                Sent::Deleted(_, id) => Some(*id),
                _ => None,
            })
            .collect();
        drop(sent);
        assert_eq!(deleted, vec![30, 31]);
        assert!(h.sessions.get(42).unwrap().messages_to_delete.is_empty());
    }

    #[tokio::test]
    async fn history_walks_client_picker_then_month_view() {
        let h = harness(StubApi {
            clients: vec![ClientSummary {
                id: "c7".into(),
                first_name: "Ada".into(),
                last_name: "Lovelace".into(),
            }],
            history: vec![PreviousAppointment {
                id: "a1".into(),
                start_time: "2026-07-03T09:00:00Z".into(),
                end_time: "2026-07-03T10:00:00Z".into(),
                description: Some("follow-up".into()),
            }],
            ..StubApi::default()
        });
        let mut session = Session::with_role(Role::Professional, FlowState::Idle);
        session.backend_id = "p1".into();
        h.sessions.set(42, session);

        h.handler
            .handle(
                RequestContext::new(),
                callback(42, patterns::PROFESSIONAL_PREVIOUS_APPOINTMENTS),
            )
            .await
            .unwrap();
        assert!(h.outbound.texts().iter().any(|t| t == texts::SELECT_CLIENT));
        assert!(h.outbound.last_buttons().contains(&"Ada Lovelace".to_string()));

        h.handler
            .handle(RequestContext::new(), callback(42, "select_client_c7"))
            .await
            .unwrap();
        assert_eq!(h.sessions.get(42).unwrap().selected_client_id, "c7");
        assert!(
            h.outbound
                .texts()
                .iter()
                .any(|t| t.contains("Previous appointments for"))
        );

        // Nav payloads carry the target month directly.
        h.handler
            .handle(RequestContext::new(), callback(42, "prev_previous_month_2026-07"))
            .await
            .unwrap();
        assert!(
            h.outbound
                .texts()
                .iter()
                .any(|t| t.contains("July 2026") && t.contains("follow-up"))
        );
    }

    #[tokio::test]
    async fn history_month_nav_without_selected_client_is_rejected() {
        let h = harness(StubApi::default());
        let mut session = Session::with_role(Role::Professional, FlowState::Idle);
        session.backend_id = "p1".into();
        h.sessions.set(42, session);

        h.handler
            .handle(RequestContext::new(), callback(42, "next_previous_month_2026-07"))
            .await
            .unwrap();
        assert_eq!(h.outbound.texts(), vec![texts::INVALID_STATE]);
    }

    #[tokio::test]
    async fn cancellation_prompts_are_tracked_for_cleanup() {
        let h = harness(StubApi::default());
        let mut client = Session::with_role(Role::Client, FlowState::Idle);
        client.backend_id = "u1".into();
        h.sessions.set(42, client);
        let mut professional = Session::with_role(Role::Professional, FlowState::Idle);
        professional.backend_id = "p1".into();
        h.sessions.set(43, professional);

        h.handler
            .handle(RequestContext::new(), callback(42, "cancel_appointment_a1"))
            .await
            .unwrap();
        h.handler
            .handle(RequestContext::new(), callback(43, "cancel_prof_appt_a1"))
            .await
            .unwrap();

        for chat_id in [42, 43] {
            let session = h.sessions.get(chat_id).unwrap();
            assert_eq!(session.state, FlowState::AwaitingCancellationReason);
            assert_eq!(session.messages_to_delete.len(), 1, "chat {chat_id}");
        }
    }

    #[test]
    fn local_datetime_rejects_malformed_parts() {
        assert!(local_datetime("2026-09-01", "09:00").is_some());
        assert!(local_datetime("2026-13-01", "09:00").is_none());
        assert!(local_datetime("2026-09-01", "9am").is_none());
    }

    #[test]
    fn long_date_renders_weekday_and_month() {
        assert_eq!(long_date("2026-09-01"), "Tuesday, September 1, 2026");
        assert_eq!(long_date("garbage"), "garbage");
    }
}
