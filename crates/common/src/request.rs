//! Request-scoped tracing context.
//!
//! One [`RequestContext`] is minted per inbound event, before any handler
//! runs, and passed by value through the whole call chain for that event.
//! Every log line and every backend call tied to the event shares the same
//! request id for offline correlation; nothing looks the context up ambiently.

use {tracing::Span, uuid::Uuid};

/// Immutable per-event context: a fresh request id and a span bound to it.
#[derive(Debug, Clone)]
pub struct RequestContext {
    request_id: String,
    span: Span,
}

impl RequestContext {
    /// Mint a context with a fresh v4 request id.
    #[must_use]
    pub fn new() -> Self {
        let request_id = Uuid::new_v4().to_string();
        let span = tracing::info_span!("request", request_id = %request_id);
        Self { request_id, span }
    }

    #[must_use]
    pub fn request_id(&self) -> &str {
        &self.request_id
    }

    /// The span carrying the request id. Handler futures run instrumented
    /// with a clone of this span so nested log lines inherit the id.
    #[must_use]
    pub fn span(&self) -> Span {
        self.span.clone()
    }
}

impl Default for RequestContext {
    fn default() -> Self {
        Self::new()
    }
}
