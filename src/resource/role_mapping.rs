//! Elasticsearch role mappings
//!
//! Role mappings are keyed by name and written with a single PUT, so create
//! and update share one request shape. The backend returns no separate id:
//! once a PUT is acknowledged the acknowledged name becomes the identifier.

use super::{encode_segment, Operation, ResourceKind, WirePayload};
use crate::api::response::ElasticsearchError;
use crate::error::ReconcileError;
use reqwest::Method;
use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};
use std::collections::HashMap;

/// Role mapping API base path
pub const ROLE_MAPPING_PATH: &str = "/_security/role_mapping";

/// Maps users matching `rules` to `roles`
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RoleMapping {
    #[serde(default, skip_serializing_if = "String::is_empty")]
    pub id: String,
    pub name: String,
    /// Disabled mappings are ignored during role mapping
    #[serde(default = "default_enabled")]
    pub enabled: bool,
    pub roles: Vec<String>,
    /// Rule tree, e.g. `{"field": {"username": "*"}}`
    pub rules: Value,
    /// Keys beginning with `_` are reserved for system usage
    #[serde(default = "empty_object")]
    pub metadata: Value,
}

fn default_enabled() -> bool {
    true
}

fn empty_object() -> Value {
    Value::Object(Map::new())
}

/// Body of a successful PUT
#[derive(Debug, Clone, Deserialize)]
pub struct PutAck {
    pub role_mapping: PutStatus,
}

#[derive(Debug, Clone, Deserialize)]
pub struct PutStatus {
    /// False when an existing mapping was overwritten
    pub created: bool,
}

/// One entry of a GET response, which is keyed by mapping name
#[derive(Debug, Clone, Deserialize)]
pub struct RemoteRoleMapping {
    #[serde(default = "default_enabled")]
    pub enabled: bool,
    #[serde(default)]
    pub roles: Vec<String>,
    #[serde(default = "empty_object")]
    pub rules: Value,
    #[serde(default = "empty_object")]
    pub metadata: Value,
}

impl RoleMapping {
    fn path_for(name: &str) -> String {
        format!("{}/{}", ROLE_MAPPING_PATH, encode_segment(name))
    }
}

impl ResourceKind for RoleMapping {
    const KIND: &'static str = "role_mapping";

    type Created = PutAck;
    type Remote = HashMap<String, RemoteRoleMapping>;
    type Envelope = ElasticsearchError;

    fn id(&self) -> &str {
        &self.id
    }

    fn set_id(&mut self, id: String) {
        self.id = id;
    }

    fn encode(&self, _operation: Operation) -> Result<WirePayload, ReconcileError> {
        if self.name.trim().is_empty() {
            return Err(ReconcileError::encode(Self::KIND, "name must not be empty"));
        }
        if !self.rules.is_object() {
            return Err(ReconcileError::encode(Self::KIND, "rules must be a JSON object"));
        }
        if !self.metadata.is_object() {
            return Err(ReconcileError::encode(Self::KIND, "metadata must be a JSON object"));
        }

        let mut body = WirePayload::new();
        body.insert("enabled".into(), Value::Bool(self.enabled));
        body.insert("roles".into(), Value::from(self.roles.clone()));
        body.insert("rules".into(), self.rules.clone());
        body.insert("metadata".into(), self.metadata.clone());
        Ok(body)
    }

    fn create_path(&self) -> String {
        Self::path_for(&self.name)
    }

    fn create_method(&self) -> Method {
        Method::PUT
    }

    fn update_path(&self, id: &str) -> String {
        Self::path_for(id)
    }

    fn identifier_from(&self, created: PutAck) -> Result<String, ReconcileError> {
        tracing::debug!(
            "role mapping {} acknowledged (created: {})",
            self.name,
            created.role_mapping.created
        );
        Ok(self.name.clone())
    }

    fn read_path(&self, id: &str) -> Option<String> {
        Some(Self::path_for(id))
    }

    fn delete_path(&self, id: &str) -> Option<String> {
        Some(Self::path_for(id))
    }

    fn refresh(&mut self, mut remote: Self::Remote) -> bool {
        let Some(mapping) = remote.remove(&self.id) else {
            return false;
        };

        self.name = self.id.clone();
        self.enabled = mapping.enabled;
        self.roles = mapping.roles;
        self.rules = mapping.rules;
        self.metadata = mapping.metadata;
        true
    }
}
