//! Backend Authentication
//!
//! Handles the credential attached to every request: HTTP Basic
//! (username/password) or an Elastic API key.

use crate::error::ReconcileError;
use reqwest::RequestBuilder;
use std::fmt;

/// Credential sent with every request
#[derive(Clone, PartialEq, Eq)]
pub enum Credential {
    /// HTTP Basic authentication
    Basic { username: String, password: String },
    /// `Authorization: ApiKey <key>` (base64 encoded id:key as issued by Elasticsearch)
    ApiKey(String),
}

impl Credential {
    /// Pick a credential from the optional pieces of a connection config.
    /// An API key wins over username/password.
    pub fn from_parts(
        username: Option<&str>,
        password: Option<&str>,
        api_key: Option<&str>,
    ) -> Result<Self, ReconcileError> {
        if let Some(key) = api_key.filter(|k| !k.is_empty()) {
            return Ok(Self::ApiKey(key.to_string()));
        }

        match (username.filter(|u| !u.is_empty()), password) {
            (Some(username), Some(password)) => Ok(Self::Basic {
                username: username.to_string(),
                password: password.to_string(),
            }),
            (Some(_), None) => Err(ReconcileError::Config(
                "username is set but password is missing".to_string(),
            )),
            _ => Err(ReconcileError::Config(
                "no credential configured: set username/password or api_key".to_string(),
            )),
        }
    }

    /// Attach this credential to a request
    pub fn apply(&self, request: RequestBuilder) -> RequestBuilder {
        match self {
            Self::Basic { username, password } => request.basic_auth(username, Some(password)),
            Self::ApiKey(key) => request.header(reqwest::header::AUTHORIZATION, format!("ApiKey {}", key)),
        }
    }
}

// Security: never print secrets, even in debug output
impl fmt::Debug for Credential {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Basic { username, .. } => f
                .debug_struct("Basic")
                .field("username", username)
                .field("password", &"***")
                .finish(),
            Self::ApiKey(_) => f.debug_tuple("ApiKey").field(&"***").finish(),
        }
    }
}
