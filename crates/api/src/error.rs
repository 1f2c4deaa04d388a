use thiserror::Error;

#[derive(Debug, Error)]
pub enum Error {
    #[error(transparent)]
    Http(#[from] reqwest::Error),

    /// Structured error returned by the backend. The request id (when the
    /// backend echoes one) goes into user-facing support messages.
    #[error("{message}")]
    Api {
        status: u16,
        message: String,
        request_id: Option<String>,
    },

    #[error("invalid base url: {0}")]
    BaseUrl(String),
}

/// Backend error envelope.
#[derive(Debug, serde::Deserialize)]
struct ErrorBody {
    #[serde(default)]
    message: String,
    #[serde(default)]
    request_id: Option<String>,
}

impl Error {
    /// Decode a non-2xx response body; unparseable bodies fall back to the
    /// raw text.
    #[must_use]
    pub fn from_response(status: u16, body: &str) -> Self {
        match serde_json::from_str::<ErrorBody>(body) {
            Ok(parsed) if !parsed.message.is_empty() => Self::Api {
                status,
                message: parsed.message,
                request_id: parsed.request_id,
            },
            _ => Self::Api {
                status,
                message: format!("backend returned status {status}: {}", body.trim()),
                request_id: None,
            },
        }
    }
}

pub type Result<T> = std::result::Result<T, Error>;
