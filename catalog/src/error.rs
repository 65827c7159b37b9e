//! Error types for the food catalog

use thiserror::Error;

/// Failure of a remote data client call.
///
/// Callers only ever show the `Display` message; the variant exists so logs
/// can tell the causes apart.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ApiError {
    /// The server answered with a non-success status
    #[error("API Error {status}: {message}")]
    Server {
        /// HTTP status code
        status: u16,
        /// Server-supplied `message`, or the transport message
        message: String,
    },

    /// The request went out but no response arrived (timeout, connection loss)
    #[error("Network Error: No response from server")]
    Network,

    /// The request could not be built or sent
    #[error("Request Error: {0}")]
    Request(String),

    /// A success response whose body was not the expected JSON
    #[error("Response Error: {0}")]
    InvalidResponse(String),
}

/// Coarse classification of an [`ApiError`], for logs
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ApiErrorKind {
    /// Non-success status
    Server,
    /// No response
    Network,
    /// Request never sent
    Request,
    /// Unreadable success body
    InvalidResponse,
}

impl ApiError {
    /// Classify this error
    #[must_use]
    pub const fn kind(&self) -> ApiErrorKind {
        match self {
            Self::Server { .. } => ApiErrorKind::Server,
            Self::Network => ApiErrorKind::Network,
            Self::Request(_) => ApiErrorKind::Request,
            Self::InvalidResponse(_) => ApiErrorKind::InvalidResponse,
        }
    }

    /// Build a server error from a status and the raw response body.
    ///
    /// Uses the body's `message` field when present and non-empty, otherwise
    /// the generic transport message for the status.
    #[must_use]
    pub fn from_status(status: u16, body: &str) -> Self {
        let message = serde_json::from_str::<serde_json::Value>(body)
            .ok()
            .and_then(|value| {
                value
                    .get("message")
                    .and_then(serde_json::Value::as_str)
                    .map(str::to_owned)
            })
            .filter(|message| !message.is_empty())
            .unwrap_or_else(|| format!("Request failed with status code {status}"));

        Self::Server { status, message }
    }
}

impl From<reqwest::Error> for ApiError {
    fn from(error: reqwest::Error) -> Self {
        if error.is_builder() {
            Self::Request(error.to_string())
        } else if error.is_decode() {
            Self::InvalidResponse(error.to_string())
        } else if let Some(status) = error.status() {
            Self::from_status(status.as_u16(), "")
        } else {
            // timeout, connect, request and body failures all mean no usable response
            Self::Network
        }
    }
}

/// Invalid client configuration
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ConfigError {
    /// The base URL is not an absolute http(s) URL
    #[error("Invalid API base URL {url:?}: {reason}")]
    InvalidBaseUrl {
        /// The rejected value
        url: String,
        /// Why it was rejected
        reason: String,
    },

    /// The timeout is not a positive whole number of seconds
    #[error("Invalid API timeout {0:?}: expected a positive number of seconds")]
    InvalidTimeout(String),
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn server_error_prefers_body_message() {
        let error = ApiError::from_status(404, r#"{"message":"Not found"}"#);
        assert_eq!(error.to_string(), "API Error 404: Not found");
        assert_eq!(error.kind(), ApiErrorKind::Server);
    }

    #[test]
    fn server_error_falls_back_to_transport_message() {
        let error = ApiError::from_status(500, "<html>oops</html>");
        assert_eq!(
            error.to_string(),
            "API Error 500: Request failed with status code 500"
        );

        let error = ApiError::from_status(400, r#"{"message":""}"#);
        assert_eq!(
            error.to_string(),
            "API Error 400: Request failed with status code 400"
        );
    }

    #[test]
    fn network_and_request_messages() {
        assert_eq!(
            ApiError::Network.to_string(),
            "Network Error: No response from server"
        );
        assert_eq!(
            ApiError::Request("relative URL without a base".into()).to_string(),
            "Request Error: relative URL without a base"
        );
    }
}
