//! Error types for reconciliation operations.

use thiserror::Error;

/// Maximum length of a response body kept inside an error (to avoid leaking sensitive data)
const MAX_ERROR_BODY_LENGTH: usize = 200;

/// Errors that can occur while reconciling a resource against its backend.
#[derive(Debug, Error)]
pub enum ReconcileError {
    /// The resource could not be turned into a wire payload.
    #[error("Cannot encode {kind}: {reason}")]
    Encode { kind: &'static str, reason: String },

    /// The request never produced an HTTP response (DNS, refused connection, timeout).
    #[error("Transport error: {0}")]
    Transport(#[from] reqwest::Error),

    /// The backend rejected the request with a well-formed error envelope.
    #[error("api error response message \"{message}\"")]
    Api {
        message: String,
        /// Status code reported inside the envelope
        status_code: u16,
        /// Status code of the HTTP response itself
        http_status: u16,
    },

    /// The backend rejected the request and its body is not an error envelope.
    #[error("Request failed with HTTP {http_status} and an undecodable error body: {source}")]
    MalformedFailure {
        http_status: u16,
        #[source]
        source: serde_json::Error,
        body: String,
    },

    /// The backend accepted the request but its body is not the expected shape.
    #[error("Unexpected response body: {source}")]
    MalformedSuccess {
        #[source]
        source: serde_json::Error,
        body: String,
    },

    /// The operation needs a server-assigned identifier and the resource has none.
    #[error("{kind} has no identifier; it must be created first")]
    Unmanaged { kind: &'static str },

    /// Create was requested for a resource that already holds an identifier.
    #[error("{kind} is already managed with identifier {id}")]
    AlreadyManaged { kind: &'static str, id: String },

    /// The resource kind does not support this operation.
    #[error("{operation} is not implemented for {kind}")]
    Unimplemented {
        kind: &'static str,
        operation: &'static str,
    },

    /// The connection configuration is incomplete or invalid.
    #[error("Configuration error: {0}")]
    Config(String),
}

impl ReconcileError {
    pub(crate) fn encode(kind: &'static str, reason: impl Into<String>) -> Self {
        Self::Encode {
            kind,
            reason: reason.into(),
        }
    }

    pub(crate) fn malformed_failure(http_status: u16, source: serde_json::Error, body: &str) -> Self {
        Self::MalformedFailure {
            http_status,
            source,
            body: truncate_body(body),
        }
    }

    pub(crate) fn malformed_success(source: serde_json::Error, body: &str) -> Self {
        Self::MalformedSuccess {
            source,
            body: truncate_body(body),
        }
    }

    /// HTTP status of the response that caused this error, if there was one.
    pub fn http_status(&self) -> Option<u16> {
        match self {
            Self::Api { http_status, .. } | Self::MalformedFailure { http_status, .. } => {
                Some(*http_status)
            }
            Self::Transport(err) => err.status().map(|s| s.as_u16()),
            _ => None,
        }
    }

    /// True when the backend answered and said no, as opposed to a local or network failure.
    pub fn is_api_error(&self) -> bool {
        matches!(self, Self::Api { .. })
    }
}

/// Truncate a body for inclusion in an error or a log line
pub(crate) fn truncate_body(body: &str) -> String {
    let cleaned: String = body
        .chars()
        .filter(|c| c.is_ascii_graphic() || *c == ' ')
        .collect();

    if cleaned.len() > MAX_ERROR_BODY_LENGTH {
        format!(
            "{}... [truncated, {} bytes total]",
            &cleaned[..MAX_ERROR_BODY_LENGTH],
            body.len()
        )
    } else {
        cleaned
    }
}
