use serde_json::{Map, Value as JsonValue};

/// Structured failure built from a non-2xx response.
///
/// Carries the HTTP status plus whatever the error body contained.
#[derive(Clone, Debug, PartialEq, thiserror::Error)]
#[error("{status} {status_text}{suffix}", suffix = message_suffix(.message))]
pub struct ApiError {
    /// HTTP status code.
    pub status: u16,
    /// Canonical reason phrase for `status`, empty when unknown.
    pub status_text: String,
    /// `message` field of the error body, if any.
    pub message: Option<String>,
    /// `errors` array of the error body, empty when absent.
    pub errors: Vec<JsonValue>,
    /// Any other fields present in the error body.
    pub fields: Map<String, JsonValue>,
}

fn message_suffix(message: &Option<String>) -> String {
    match message {
        Some(message) => format!(": {message}"),
        None => String::new(),
    }
}

impl ApiError {
    pub(crate) fn from_body(status: u16, status_text: impl Into<String>, body: &str) -> Self {
        let mut fields = match serde_json::from_str::<JsonValue>(body) {
            Ok(JsonValue::Object(map)) => map,
            _ => Map::new(),
        };
        let message = match fields.remove("message") {
            Some(JsonValue::String(message)) => Some(message),
            Some(other) if !other.is_null() => Some(other.to_string()),
            _ => None,
        };
        let errors = match fields.remove("errors") {
            Some(JsonValue::Array(errors)) => errors,
            _ => Vec::new(),
        };
        Self {
            status,
            status_text: status_text.into(),
            message,
            errors,
            fields,
        }
    }
}

/// Error type returned by this crate.
#[derive(Debug, thiserror::Error)]
pub enum PlaceKitError {
    /// Malformed input to a configuration or operation call.
    #[error("invalid argument: {0}")]
    InvalidArgument(String),
    /// The attempt was cancelled because `timeout` elapsed.
    #[error("request to {url} timed out")]
    Timeout { url: String },
    /// The API answered with a 5xx status.
    #[error("server error {0}")]
    Server(ApiError),
    /// The API answered with a 4xx (or other non-success, non-5xx) status.
    #[error("client error {0}")]
    Client(ApiError),
    /// Network or request execution error from `reqwest`.
    #[error("transport error: {0}")]
    Transport(reqwest::Error),
    /// Response decoding error.
    #[error("decode error: {0}")]
    Decode(String),
    /// Device location lookup failed or is unavailable.
    #[error("geolocation error ({code}): {message}")]
    Geolocation { code: u16, message: String },
}

impl PlaceKitError {
    /// HTTP status of API failures.
    pub fn status(&self) -> Option<u16> {
        self.api_error().map(|err| err.status)
    }

    /// Structured error body of API failures.
    pub fn api_error(&self) -> Option<&ApiError> {
        match self {
            Self::Server(err) | Self::Client(err) => Some(err),
            _ => None,
        }
    }

    pub fn is_timeout(&self) -> bool {
        matches!(self, Self::Timeout { .. })
    }

    pub(crate) fn invalid(message: impl Into<String>) -> Self {
        Self::InvalidArgument(message.into())
    }
}
