use quill_core::error::Retryable;

/// Message shown for server failures and network errors, whose details are
/// not meaningful to the user.
pub const GENERIC_FAILURE_MESSAGE: &str = "Something went wrong. Please try again.";

/// Errors from the remote data client.
#[derive(Debug, thiserror::Error)]
pub enum ApiError {
    /// The HTTP request itself failed (network, DNS, TLS, timeout).
    #[error("HTTP request failed: {0}")]
    Request(#[from] reqwest::Error),

    /// The backend answered with a non-2xx status other than 401.
    #[error("API error ({status}): {message}")]
    Api {
        /// HTTP status code.
        status: u16,
        /// Server-provided message, or the raw body when none was given.
        message: String,
    },

    /// The credential was rejected; the auth context has been cleared.
    #[error("Session expired or credential invalid")]
    Unauthorized,

    /// A 2xx response whose body did not match the expected shape.
    #[error("Unexpected response body: {0}")]
    Decode(#[from] serde_json::Error),
}

impl ApiError {
    pub fn status(&self) -> Option<u16> {
        match self {
            ApiError::Api { status, .. } => Some(*status),
            ApiError::Unauthorized => Some(401),
            ApiError::Request(err) => err.status().map(|s| s.as_u16()),
            ApiError::Decode(_) => None,
        }
    }

    /// `true` for 4xx rejections, which carry a message meant for the user.
    pub fn is_client_error(&self) -> bool {
        matches!(self.status(), Some(400..=499))
    }

    /// Text for the global notification: the server message for 4xx, a
    /// generic message for 5xx and network failures.
    pub fn user_message(&self) -> String {
        match self {
            ApiError::Api { status, message } if (400..500).contains(status) => message.clone(),
            ApiError::Unauthorized => "Your session has expired. Please sign in again.".to_string(),
            _ => GENERIC_FAILURE_MESSAGE.to_string(),
        }
    }
}

impl Retryable for ApiError {
    /// 5xx responses and transport failures are transient; everything else
    /// would fail the same way again.
    fn is_retryable(&self) -> bool {
        match self {
            ApiError::Api { status, .. } => *status >= 500,
            ApiError::Request(err) => {
                err.is_timeout() || err.is_connect() || err.is_request() || err.is_body()
            }
            ApiError::Unauthorized | ApiError::Decode(_) => false,
        }
    }
}

/// Pull a human-readable message out of an error body.
///
/// Accepts `{"message": ".."}`, `{"error": ".."}` and
/// `{"error": {"message": ".."}}`; anything else yields the trimmed body.
pub(crate) fn extract_message(body: &str) -> String {
    if let Ok(value) = serde_json::from_str::<serde_json::Value>(body) {
        let candidates = [
            value.get("message"),
            value.get("error"),
            value.get("error").and_then(|e| e.get("message")),
        ];
        if let Some(message) = candidates
            .into_iter()
            .flatten()
            .find_map(|v| v.as_str().filter(|s| !s.is_empty()))
        {
            return message.to_string();
        }
    }
    let trimmed = body.trim();
    if trimmed.is_empty() {
        "<empty body>".to_string()
    } else {
        trimmed.to_string()
    }
}
