//! Error types for the Trust Lifecycle Manager client.
//!
//! # Design
//! The API reports failures in two shapes. A 4xx/5xx with a JSON object body
//! decodes into [`ApiError`] (vendor `code`, `message`, optional `details`
//! and `request_id`). Anything else (an HTML error page from a proxy, an
//! empty body, plain text) becomes [`Error::Http`] with the raw body. The
//! status helpers look through both shapes so callers rarely need to match.

use serde::Deserialize;

/// Decoded JSON error body of a non-2xx response.
#[derive(Debug, Clone, Default, PartialEq, Eq, Deserialize)]
pub struct ApiError {
    /// HTTP status of the response the body came from.
    #[serde(skip)]
    pub status: u16,
    #[serde(default)]
    pub code: String,
    #[serde(default)]
    pub message: String,
    #[serde(default)]
    pub details: Vec<String>,
    #[serde(default)]
    pub request_id: Option<String>,
}

impl std::fmt::Display for ApiError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        if self.code.is_empty() {
            write!(f, "tlm: {} (status: {})", self.message, self.status)
        } else {
            write!(
                f,
                "tlm: {} (code: {}, status: {})",
                self.message, self.code, self.status
            )
        }
    }
}

impl std::error::Error for ApiError {}

/// Errors returned by every client operation.
#[derive(Debug, thiserror::Error)]
pub enum Error {
    /// Non-2xx response with a decodable JSON error body.
    #[error(transparent)]
    Api(#[from] ApiError),

    /// Non-2xx response whose body is not a JSON error object.
    #[error("tlm: HTTP {status}: {message}")]
    Http { status: u16, message: String },

    /// A 2xx body could not be decoded into the expected type.
    #[error("failed to decode response: {0}")]
    Decode(String),

    /// The request payload could not be serialized to JSON.
    #[error("failed to encode request body: {0}")]
    Encode(String),

    /// The transport gave up waiting for the server.
    #[error("request timeout: {0}")]
    Timeout(String),

    /// Connection, TLS or I/O failure below HTTP.
    #[error("transport error: {0}")]
    Transport(String),

    /// A caller-supplied argument cannot be sent; no request was made.
    #[error("invalid argument: {0}")]
    InvalidArgument(String),

    /// The client was configured with unusable settings.
    #[error("invalid configuration: {0}")]
    Config(String),
}

impl Error {
    /// HTTP status for the two response-shaped variants.
    pub fn status(&self) -> Option<u16> {
        match self {
            Error::Api(e) => Some(e.status),
            Error::Http { status, .. } => Some(*status),
            _ => None,
        }
    }

    pub fn is_not_found(&self) -> bool {
        self.status() == Some(404)
    }

    pub fn is_unauthorized(&self) -> bool {
        self.status() == Some(401)
    }

    pub fn is_forbidden(&self) -> bool {
        self.status() == Some(403)
    }

    /// The decoded vendor error, if the server sent one.
    pub fn api_error(&self) -> Option<&ApiError> {
        match self {
            Error::Api(e) => Some(e),
            _ => None,
        }
    }
}
