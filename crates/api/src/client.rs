use {
    async_trait::async_trait,
    reqwest::{Method, StatusCode},
    secrecy::{ExposeSecret, Secret},
    serde::{Deserialize, de::DeserializeOwned, Serialize},
    tracing::debug,
};

use bookline_common::RequestContext;

use crate::{
    error::{Error, Result},
    schema::{
        ApiUser, Appointment, AppointmentEnvelope, Availability, ClientSummary,
        CreateAppointmentRequest, CreateUnavailableRequest, PreviousAppointment, RegisterRequest,
        SignInRequest,
    },
};

/// Everything the bot asks of the booking backend.
///
/// Handlers depend on this trait rather than on `HttpBookingApi` so tests can
/// substitute canned responses without a live server. Every call carries the
/// request context so the backend sees the same request id the bot logs.
#[async_trait]
pub trait BookingApi: Send + Sync {
    /// Look up the user bound to a chat, `Ok(None)` when unregistered.
    async fn user_by_chat(&self, ctx: &RequestContext, chat_id: i64) -> Result<Option<ApiUser>>;

    async fn register_client(&self, ctx: &RequestContext, req: &RegisterRequest)
        -> Result<ApiUser>;

    async fn sign_in_professional(
        &self,
        ctx: &RequestContext,
        req: &SignInRequest,
    ) -> Result<ApiUser>;

    async fn professionals(&self, ctx: &RequestContext) -> Result<Vec<ApiUser>>;

    /// Slots for one professional on one `YYYY-MM-DD` date.
    async fn availability(
        &self,
        ctx: &RequestContext,
        professional_id: &str,
        date: &str,
    ) -> Result<Availability>;

    async fn create_appointment(
        &self,
        ctx: &RequestContext,
        req: &CreateAppointmentRequest,
    ) -> Result<AppointmentEnvelope>;

    /// A client's appointments filtered by status ("pending", "upcoming", ...).
    async fn client_appointments(
        &self,
        ctx: &RequestContext,
        client_id: &str,
        status: &str,
    ) -> Result<Vec<Appointment>>;

    async fn cancel_client_appointment(
        &self,
        ctx: &RequestContext,
        client_id: &str,
        appointment_id: &str,
        reason: &str,
    ) -> Result<AppointmentEnvelope>;

    /// A professional's appointments by status, optionally narrowed to a date.
    async fn professional_appointments(
        &self,
        ctx: &RequestContext,
        professional_id: &str,
        status: &str,
        date: Option<&str>,
    ) -> Result<Vec<Appointment>>;

    /// Dates in a `YYYY-MM` month on which the professional has appointments
    /// of the given status.
    async fn appointment_dates(
        &self,
        ctx: &RequestContext,
        professional_id: &str,
        status: &str,
        month: &str,
    ) -> Result<Vec<String>>;

    /// Clients the professional has seen, for the history picker.
    async fn professional_clients(
        &self,
        ctx: &RequestContext,
        professional_id: &str,
    ) -> Result<Vec<ClientSummary>>;

    /// One client's past appointments with the professional in a `YYYY-MM`
    /// month.
    async fn previous_appointments_by_client(
        &self,
        ctx: &RequestContext,
        professional_id: &str,
        client_id: &str,
        month: &str,
    ) -> Result<Vec<PreviousAppointment>>;

    async fn confirm_appointment(
        &self,
        ctx: &RequestContext,
        professional_id: &str,
        appointment_id: &str,
    ) -> Result<AppointmentEnvelope>;

    async fn cancel_professional_appointment(
        &self,
        ctx: &RequestContext,
        professional_id: &str,
        appointment_id: &str,
        reason: &str,
    ) -> Result<AppointmentEnvelope>;

    async fn create_unavailable(
        &self,
        ctx: &RequestContext,
        req: &CreateUnavailableRequest,
    ) -> Result<Appointment>;

    /// Full day view (appointments plus unavailable blocks) for one date.
    async fn timetable(
        &self,
        ctx: &RequestContext,
        professional_id: &str,
        date: &str,
    ) -> Result<Availability>;
}

/// REST client for the booking backend.
#[derive(Debug)]
pub struct HttpBookingApi {
    base_url: String,
    token: Secret<String>,
    client: reqwest::Client,
}

#[derive(Deserialize)]
struct UserEnvelope {
    user: ApiUser,
}

#[derive(Deserialize)]
struct ProfessionalsEnvelope {
    professionals: Vec<ApiUser>,
}

#[derive(Deserialize)]
struct AppointmentsEnvelope {
    appointments: Vec<Appointment>,
}

#[derive(Deserialize)]
struct SingleAppointmentEnvelope {
    appointment: Appointment,
}

#[derive(Deserialize)]
struct DatesEnvelope {
    dates: Vec<String>,
}

#[derive(Deserialize)]
struct ClientsEnvelope {
    clients: Vec<ClientSummary>,
}

#[derive(Deserialize)]
struct PreviousAppointmentsEnvelope {
    appointments: Vec<PreviousAppointment>,
}

#[derive(Serialize)]
struct CancelBody<'a> {
    cancellation_reason: &'a str,
}

impl HttpBookingApi {
    pub fn new(base_url: impl Into<String>, token: Secret<String>) -> Result<Self> {
        let base_url = base_url.into();
        let trimmed = base_url.trim_end_matches('/');
        if !trimmed.starts_with("http://") && !trimmed.starts_with("https://") {
            return Err(Error::BaseUrl(base_url));
        }
        Ok(Self {
            base_url: trimmed.to_string(),
            token,
            client: reqwest::Client::new(),
        })
    }

    async fn execute<T: DeserializeOwned>(
        &self,
        ctx: &RequestContext,
        method: Method,
        path: &str,
        query: &[(&str, &str)],
        body: Option<&impl Serialize>,
    ) -> Result<T> {
        let url = format!("{}{path}", self.base_url);
        debug!(method = %method, %url, "backend request");

        let mut request = self
            .client
            .request(method, &url)
            .bearer_auth(self.token.expose_secret())
            .header("X-Request-ID", ctx.request_id());
        if !query.is_empty() {
            request = request.query(query);
        }
        if let Some(body) = body {
            request = request.json(body);
        }

        let response = request.send().await?;
        let status = response.status();
        if !status.is_success() {
            let body = response.text().await.unwrap_or_default();
            return Err(Error::from_response(status.as_u16(), &body));
        }
        Ok(response.json().await?)
    }
}

// Body type for calls that carry none. `Option<&()>` would serialize as
// `null`, so the helper is always handed `NO_BODY` instead.
const NO_BODY: Option<&()> = None;

#[async_trait]
impl BookingApi for HttpBookingApi {
    async fn user_by_chat(&self, ctx: &RequestContext, chat_id: i64) -> Result<Option<ApiUser>> {
        let result: Result<UserEnvelope> = self
            .execute(ctx, Method::GET, &format!("/api/users/{chat_id}"), &[], NO_BODY)
            .await;
        match result {
            Ok(envelope) => Ok(Some(envelope.user)),
            Err(Error::Api { status, .. }) if status == StatusCode::NOT_FOUND.as_u16() => Ok(None),
            Err(err) => Err(err),
        }
    }

    async fn register_client(
        &self,
        ctx: &RequestContext,
        req: &RegisterRequest,
    ) -> Result<ApiUser> {
        let envelope: UserEnvelope = self
            .execute(ctx, Method::POST, "/api/clients/register", &[], Some(req))
            .await?;
        Ok(envelope.user)
    }

    async fn sign_in_professional(
        &self,
        ctx: &RequestContext,
        req: &SignInRequest,
    ) -> Result<ApiUser> {
        let envelope: UserEnvelope = self
            .execute(ctx, Method::POST, "/api/professionals/sign_in", &[], Some(req))
            .await?;
        Ok(envelope.user)
    }

    async fn professionals(&self, ctx: &RequestContext) -> Result<Vec<ApiUser>> {
        let envelope: ProfessionalsEnvelope = self
            .execute(ctx, Method::GET, "/api/professionals", &[], NO_BODY)
            .await?;
        Ok(envelope.professionals)
    }

    async fn availability(
        &self,
        ctx: &RequestContext,
        professional_id: &str,
        date: &str,
    ) -> Result<Availability> {
        self.execute(
            ctx,
            Method::GET,
            &format!("/api/professionals/{professional_id}/availability"),
            &[("date", date)],
            NO_BODY,
        )
        .await
    }

    async fn create_appointment(
        &self,
        ctx: &RequestContext,
        req: &CreateAppointmentRequest,
    ) -> Result<AppointmentEnvelope> {
        self.execute(ctx, Method::POST, "/api/appointments", &[], Some(req))
            .await
    }

    async fn client_appointments(
        &self,
        ctx: &RequestContext,
        client_id: &str,
        status: &str,
    ) -> Result<Vec<Appointment>> {
        let envelope: AppointmentsEnvelope = self
            .execute(
                ctx,
                Method::GET,
                &format!("/api/clients/{client_id}/appointments"),
                &[("status", status)],
                NO_BODY,
            )
            .await?;
        Ok(envelope.appointments)
    }

    async fn cancel_client_appointment(
        &self,
        ctx: &RequestContext,
        client_id: &str,
        appointment_id: &str,
        reason: &str,
    ) -> Result<AppointmentEnvelope> {
        self.execute(
            ctx,
            Method::PATCH,
            &format!("/api/clients/{client_id}/appointments/{appointment_id}/cancel"),
            &[],
            Some(&CancelBody {
                cancellation_reason: reason,
            }),
        )
        .await
    }

    async fn professional_appointments(
        &self,
        ctx: &RequestContext,
        professional_id: &str,
        status: &str,
        date: Option<&str>,
    ) -> Result<Vec<Appointment>> {
        let mut query = vec![("status", status)];
        if let Some(date) = date {
            query.push(("date", date));
        }
        let envelope: AppointmentsEnvelope = self
            .execute(
                ctx,
                Method::GET,
                &format!("/api/professionals/{professional_id}/appointments"),
                &query,
                NO_BODY,
            )
            .await?;
        Ok(envelope.appointments)
    }

    async fn appointment_dates(
        &self,
        ctx: &RequestContext,
        professional_id: &str,
        status: &str,
        month: &str,
    ) -> Result<Vec<String>> {
        let envelope: DatesEnvelope = self
            .execute(
                ctx,
                Method::GET,
                &format!("/api/professionals/{professional_id}/appointment_dates"),
                &[("status", status), ("month", month)],
                NO_BODY,
            )
            .await?;
        Ok(envelope.dates)
    }

    async fn professional_clients(
        &self,
        ctx: &RequestContext,
        professional_id: &str,
    ) -> Result<Vec<ClientSummary>> {
        let envelope: ClientsEnvelope = self
            .execute(
                ctx,
                Method::GET,
                &format!("/api/professionals/{professional_id}/clients"),
                &[],
                NO_BODY,
            )
            .await?;
        Ok(envelope.clients)
    }

    async fn previous_appointments_by_client(
        &self,
        ctx: &RequestContext,
        professional_id: &str,
        client_id: &str,
        month: &str,
    ) -> Result<Vec<PreviousAppointment>> {
        let envelope: PreviousAppointmentsEnvelope = self
            .execute(
                ctx,
                Method::GET,
                &format!(
                    "/api/professionals/{professional_id}/clients/{client_id}/previous_appointments"
                ),
                &[("month", month)],
                NO_BODY,
            )
            .await?;
        Ok(envelope.appointments)
    }

    async fn confirm_appointment(
        &self,
        ctx: &RequestContext,
        professional_id: &str,
        appointment_id: &str,
    ) -> Result<AppointmentEnvelope> {
        self.execute(
            ctx,
            Method::PATCH,
            &format!("/api/professionals/{professional_id}/appointments/{appointment_id}/confirm"),
            &[],
            NO_BODY,
        )
        .await
    }

    async fn cancel_professional_appointment(
        &self,
        ctx: &RequestContext,
        professional_id: &str,
        appointment_id: &str,
        reason: &str,
    ) -> Result<AppointmentEnvelope> {
        self.execute(
            ctx,
            Method::PATCH,
            &format!("/api/professionals/{professional_id}/appointments/{appointment_id}/cancel"),
            &[],
            Some(&CancelBody {
                cancellation_reason: reason,
            }),
        )
        .await
    }

    async fn create_unavailable(
        &self,
        ctx: &RequestContext,
        req: &CreateUnavailableRequest,
    ) -> Result<Appointment> {
        let path = format!(
            "/api/professionals/{}/unavailable_appointments",
            req.professional_id
        );
        let envelope: SingleAppointmentEnvelope = self
            .execute(ctx, Method::POST, &path, &[], Some(req))
            .await?;
        Ok(envelope.appointment)
    }

    async fn timetable(
        &self,
        ctx: &RequestContext,
        professional_id: &str,
        date: &str,
    ) -> Result<Availability> {
        self.execute(
            ctx,
            Method::GET,
            &format!("/api/professionals/{professional_id}/timetable"),
            &[("date", date)],
            NO_BODY,
        )
        .await
    }
}

#[cfg(test)]
mod tests {
    use {mockito::Server, secrecy::Secret};

    use super::*;

    fn api(server: &Server) -> HttpBookingApi {
        HttpBookingApi::new(server.url(), Secret::new("token-123".into())).unwrap()
    }

    #[test]
    fn rejects_non_http_base_url() {
        let err = HttpBookingApi::new("localhost:8080", Secret::new("t".into())).unwrap_err();
        assert!(matches!(err, Error::BaseUrl(_)));
    }

    #[tokio::test]
    async fn user_lookup_sends_auth_and_request_id() {
        let mut server = Server::new_async().await;
        let ctx = RequestContext::new();
        let mock = server
            .mock("GET", "/api/users/42")
            .match_header("authorization", "Bearer token-123")
            .match_header("x-request-id", ctx.request_id())
            .with_status(200)
            .with_body(
                r#"{"user":{"id":"u1","chat_id":42,"first_name":"Ada","last_name":"Lovelace","role":"client"}}"#,
            )
            .create_async()
            .await;

        let user = api(&server).user_by_chat(&ctx, 42).await.unwrap().unwrap();
        assert_eq!(user.id, "u1");
        assert_eq!(user.role, "client");
        mock.assert_async().await;
    }

    #[tokio::test]
    async fn missing_user_maps_to_none() {
        let mut server = Server::new_async().await;
        server
            .mock("GET", "/api/users/7")
            .with_status(404)
            .with_body(r#"{"error":"not_found","message":"user not found"}"#)
            .create_async()
            .await;

        let user = api(&server).user_by_chat(&RequestContext::new(), 7).await.unwrap();
        assert!(user.is_none());
    }

    #[tokio::test]
    async fn backend_error_carries_status_and_message() {
        let mut server = Server::new_async().await;
        server
            .mock("POST", "/api/professionals/sign_in")
            .with_status(401)
            .with_body(r#"{"error":"unauthorized","message":"invalid credentials"}"#)
            .create_async()
            .await;

        let req = SignInRequest {
            username: "doc".into(),
            password: "wrong".into(),
            chat_id: 5,
        };
        let err = api(&server)
            .sign_in_professional(&RequestContext::new(), &req)
            .await
            .unwrap_err();
        match err {
            Error::Api { status, message, .. } => {
                assert_eq!(status, 401);
                assert_eq!(message, "invalid credentials");
            },
            other => panic!("unexpected error: {other}"),
        }
    }

    #[tokio::test]
    async fn availability_passes_date_query() {
        let mut server = Server::new_async().await;
        server
            .mock("GET", "/api/professionals/p1/availability")
            .match_query(mockito::Matcher::UrlEncoded("date".into(), "2026-09-01".into()))
            .with_status(200)
            .with_body(
                r#"{"date":"2026-09-01","slots":[{"start_time":"2026-09-01T09:00:00Z","end_time":"2026-09-01T10:00:00Z","available":true}]}"#,
            )
            .create_async()
            .await;

        let availability = api(&server)
            .availability(&RequestContext::new(), "p1", "2026-09-01")
            .await
            .unwrap();
        assert_eq!(availability.date, "2026-09-01");
        assert_eq!(availability.slots.len(), 1);
        assert!(availability.slots[0].available);
    }

    #[tokio::test]
    async fn cancellation_posts_reason_body() {
        let mut server = Server::new_async().await;
        let mock = server
            .mock("PATCH", "/api/clients/c1/appointments/a1/cancel")
            .match_body(mockito::Matcher::Json(serde_json::json!({
                "cancellation_reason": "sick"
            })))
            .with_status(200)
            .with_body(
                r#"{"appointment":{"id":"a1","start_time":"2026-09-01T09:00:00Z","end_time":"2026-09-01T10:00:00Z","status":"cancelled","cancellation_reason":"sick"},"professional":{"id":"p1","first_name":"Greg","last_name":"House","chat_id":9}}"#,
            )
            .create_async()
            .await;

        let envelope = api(&server)
            .cancel_client_appointment(&RequestContext::new(), "c1", "a1", "sick")
            .await
            .unwrap();
        assert_eq!(envelope.appointment.status, "cancelled");
        assert_eq!(envelope.professional.unwrap().chat_id, Some(9));
        mock.assert_async().await;
    }

    #[tokio::test]
    async fn client_history_passes_month_query() {
        let mut server = Server::new_async().await;
        server
            .mock("GET", "/api/professionals/p1/clients")
            .with_status(200)
            .with_body(r#"{"clients":[{"id":"c1","first_name":"Ada","last_name":"Lovelace"}]}"#)
            .create_async()
            .await;
        server
            .mock("GET", "/api/professionals/p1/clients/c1/previous_appointments")
            .match_query(mockito::Matcher::UrlEncoded("month".into(), "2026-07".into()))
            .with_status(200)
            .with_body(
                r#"{"appointments":[{"id":"a1","start_time":"2026-07-03T09:00:00Z","end_time":"2026-07-03T10:00:00Z","description":"follow-up"}]}"#,
            )
            .create_async()
            .await;

        let ctx = RequestContext::new();
        let clients = api(&server).professional_clients(&ctx, "p1").await.unwrap();
        assert_eq!(clients.len(), 1);
        assert_eq!(clients[0].first_name, "Ada");

        let history = api(&server)
            .previous_appointments_by_client(&ctx, "p1", "c1", "2026-07")
            .await
            .unwrap();
        assert_eq!(history.len(), 1);
        assert_eq!(history[0].description.as_deref(), Some("follow-up"));
    }

    #[tokio::test]
    async fn appointment_dates_unwraps_envelope() {
        let mut server = Server::new_async().await;
        server
            .mock("GET", "/api/professionals/p1/appointment_dates")
            .match_query(mockito::Matcher::AllOf(vec![
                mockito::Matcher::UrlEncoded("status".into(), "upcoming".into()),
                mockito::Matcher::UrlEncoded("month".into(), "2026-09".into()),
            ]))
            .with_status(200)
            .with_body(r#"{"dates":["2026-09-02","2026-09-10"]}"#)
            .create_async()
            .await;

        let dates = api(&server)
            .appointment_dates(&RequestContext::new(), "p1", "upcoming", "2026-09")
            .await
            .unwrap();
        assert_eq!(dates, vec!["2026-09-02", "2026-09-10"]);
    }
}
