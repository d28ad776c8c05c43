//! Resource kinds
//!
//! Each kind the client can reconcile implements [`ResourceKind`]: where it
//! lives on the backend, how it is encoded for each operation, and how its
//! identifier is recovered from a successful create.
//!
//! # Kinds
//!
//! - [`rule`] - Kibana alerting rules (`/api/alerting/rule`)
//! - [`connector`] - Kibana index connectors (`/api/actions/connector`)
//! - [`role_mapping`] - Elasticsearch role mappings (`/_security/role_mapping`)
//!
//! The wire encoders translate the typed fields into the backend's exact key
//! names. Each encoder destructures its struct, so a field added to a
//! parameter bag cannot be silently dropped from the payload.

pub mod connector;
pub mod role_mapping;
pub mod rule;

use crate::api::response::ErrorEnvelope;
use crate::error::ReconcileError;
use reqwest::Method;
use serde::de::DeserializeOwned;
use serde::Deserialize;
use serde_json::{Map, Value};

pub use connector::{IndexConnector, IndexConnectorConfig};
pub use role_mapping::RoleMapping;
pub use rule::{Rule, RuleParams, Schedule};

/// Request body sent to the backend, built fresh for every call
pub type WirePayload = Map<String, Value>;

/// Which mutation a payload is being built for
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Operation {
    Create,
    Update,
}

/// Capability interface implemented by every reconcilable resource kind
pub trait ResourceKind {
    /// Short name used in errors, logs and state keys
    const KIND: &'static str;

    /// Body of a successful create
    type Created: DeserializeOwned;
    /// Body of a successful read
    type Remote: DeserializeOwned;
    /// Body of a failed request
    type Envelope: ErrorEnvelope;

    /// Server-assigned identifier, empty until created
    fn id(&self) -> &str;

    fn set_id(&mut self, id: String);

    /// Build the request body for `operation`
    fn encode(&self, operation: Operation) -> Result<WirePayload, ReconcileError>;

    fn create_path(&self) -> String;

    fn create_method(&self) -> Method {
        Method::POST
    }

    fn update_path(&self, id: &str) -> String {
        format!("{}/{}", self.create_path(), encode_segment(id))
    }

    fn update_method(&self) -> Method {
        Method::PUT
    }

    /// Recover the identifier from a successful create
    fn identifier_from(&self, created: Self::Created) -> Result<String, ReconcileError>;

    /// Path for reading the resource, `None` when the kind has no read support
    fn read_path(&self, _id: &str) -> Option<String> {
        None
    }

    /// Path for deleting the resource, `None` when the kind has no delete support
    fn delete_path(&self, _id: &str) -> Option<String> {
        None
    }

    /// Overwrite local fields with the remote representation.
    /// Returns false when the body shows the resource no longer exists.
    fn refresh(&mut self, _remote: Self::Remote) -> bool {
        false
    }
}

/// Success body of Kibana create calls; only the id is needed
#[derive(Debug, Clone, Deserialize)]
pub struct Identified {
    pub id: String,
}

impl Identified {
    pub(crate) fn into_identifier(self) -> Result<String, ReconcileError> {
        if self.id.is_empty() {
            return Err(ReconcileError::MalformedSuccess {
                source: serde::de::Error::custom("response carries an empty id"),
                body: String::new(),
            });
        }
        Ok(self.id)
    }
}

/// Percent-encode a value used as a single path segment
pub fn encode_segment(value: &str) -> String {
    urlencoding::encode(value).into_owned()
}

/// Insert `value` under `key` when it is set
pub(crate) fn put<T: Into<Value>>(payload: &mut WirePayload, key: &str, value: Option<T>) {
    if let Some(value) = value {
        payload.insert(key.to_string(), value.into());
    }
}
