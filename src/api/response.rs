//! Response interpretation shared by every resource kind.
//!
//! 200 is the only success code. Anything else is decoded as the backend's
//! error envelope; an error body that is not an envelope is its own failure,
//! as is a success body that is not the expected shape.

use crate::error::{truncate_body, ReconcileError};
use reqwest::{Response, StatusCode};
use serde::de::DeserializeOwned;
use serde::Deserialize;

/// The structured body a backend returns with a failed request
pub trait ErrorEnvelope: DeserializeOwned {
    /// Human readable message from the backend
    fn message(&self) -> String;
    /// Status code reported in the body (may differ from the HTTP status)
    fn status_code(&self) -> u16;
}

/// Kibana error body: `{"statusCode": 403, "error": "Forbidden", "message": "..."}`
#[derive(Debug, Clone, Deserialize)]
pub struct KibanaError {
    pub message: String,
    #[serde(rename = "statusCode")]
    pub status_code: u16,
}

impl ErrorEnvelope for KibanaError {
    fn message(&self) -> String {
        self.message.clone()
    }

    fn status_code(&self) -> u16 {
        self.status_code
    }
}

/// Elasticsearch error body: `{"error": {"type": "...", "reason": "..."}, "status": 400}`
#[derive(Debug, Clone, Deserialize)]
pub struct ElasticsearchError {
    pub error: ElasticsearchCause,
    pub status: u16,
}

/// The `error` member is an object on modern clusters and a bare string on some paths
#[derive(Debug, Clone, Deserialize)]
#[serde(untagged)]
pub enum ElasticsearchCause {
    Detailed {
        #[serde(rename = "type")]
        kind: String,
        #[serde(default)]
        reason: Option<String>,
    },
    Plain(String),
}

impl ErrorEnvelope for ElasticsearchError {
    fn message(&self) -> String {
        match &self.error {
            ElasticsearchCause::Detailed {
                kind,
                reason: Some(reason),
            } => format!("{}: {}", kind, reason),
            ElasticsearchCause::Detailed { kind, reason: None } => kind.clone(),
            ElasticsearchCause::Plain(message) => message.clone(),
        }
    }

    fn status_code(&self) -> u16 {
        self.status
    }
}

/// Read the full body and decode it as `T`, or as the error envelope `E`.
pub async fn decode_success<T, E>(response: Response) -> Result<T, ReconcileError>
where
    T: DeserializeOwned,
    E: ErrorEnvelope,
{
    let (status, body) = read_body(response).await?;
    interpret::<T, E>(status, &body)
}

/// Like [`decode_success`] for calls whose success body carries nothing we need.
pub async fn expect_success<E: ErrorEnvelope>(response: Response) -> Result<(), ReconcileError> {
    let (status, body) = read_body(response).await?;
    if status != StatusCode::OK {
        return Err(failure::<E>(status, &body));
    }
    Ok(())
}

/// Classify a status/body pair.
pub fn interpret<T, E>(status: StatusCode, body: &str) -> Result<T, ReconcileError>
where
    T: DeserializeOwned,
    E: ErrorEnvelope,
{
    if status != StatusCode::OK {
        return Err(failure::<E>(status, body));
    }

    serde_json::from_str(body).map_err(|e| {
        tracing::debug!("Undecodable success body: {}", truncate_body(body));
        ReconcileError::malformed_success(e, body)
    })
}

/// Decode a non-200 body into the error envelope `E`
pub fn failure<E: ErrorEnvelope>(status: StatusCode, body: &str) -> ReconcileError {
    // Security: Only log sanitized/truncated error body to avoid leaking sensitive data
    tracing::debug!("API error: {} - {}", status, truncate_body(body));

    match serde_json::from_str::<E>(body) {
        Ok(envelope) => ReconcileError::Api {
            message: envelope.message(),
            status_code: envelope.status_code(),
            http_status: status.as_u16(),
        },
        Err(e) => ReconcileError::malformed_failure(status.as_u16(), e, body),
    }
}

/// Consume the response, always releasing the connection
async fn read_body(response: Response) -> Result<(StatusCode, String), ReconcileError> {
    let status = response.status();
    let body = response.text().await?;
    Ok((status, body))
}
