//! Kibana index connectors

use super::{put, Identified, Operation, ResourceKind, WirePayload};
use crate::api::response::KibanaError;
use crate::error::ReconcileError;
use serde::de::IgnoredAny;
use serde::{Deserialize, Serialize};
use serde_json::Value;

/// Connector API base path
pub const CONNECTOR_PATH: &str = "/api/actions/connector";

/// A connector that writes alert documents into an index
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct IndexConnector {
    /// Assigned by Kibana on create
    #[serde(default, skip_serializing_if = "String::is_empty")]
    pub id: String,
    /// Display name
    pub name: String,
    /// e.g. `.index`
    pub connector_type_id: String,
    #[serde(default)]
    pub config: IndexConnectorConfig,
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct IndexConnectorConfig {
    pub index: String,
    /// Refresh the index after each write
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub refresh: Option<bool>,
    #[serde(
        default,
        alias = "executionTimeField",
        skip_serializing_if = "Option::is_none"
    )]
    pub execution_time_field: Option<String>,
}

/// Every key [`IndexConnectorConfig::to_wire`] can produce
pub const CONNECTOR_CONFIG_KEYS: &[&str] = &["index", "refresh", "executionTimeField"];

impl IndexConnectorConfig {
    /// Translate to Kibana's config names. Unset fields are omitted.
    pub fn to_wire(&self) -> WirePayload {
        let IndexConnectorConfig {
            index,
            refresh,
            execution_time_field,
        } = self;

        let mut config = WirePayload::new();
        config.insert("index".into(), Value::from(index.clone()));
        put(&mut config, "refresh", *refresh);
        put(&mut config, "executionTimeField", execution_time_field.clone());
        config
    }
}

impl ResourceKind for IndexConnector {
    const KIND: &'static str = "connector";

    type Created = Identified;
    type Remote = IgnoredAny;
    type Envelope = KibanaError;

    fn id(&self) -> &str {
        &self.id
    }

    fn set_id(&mut self, id: String) {
        self.id = id;
    }

    fn encode(&self, operation: Operation) -> Result<WirePayload, ReconcileError> {
        let mut body = WirePayload::new();
        body.insert("name".into(), Value::from(self.name.clone()));
        body.insert("config".into(), Value::Object(self.config.to_wire()));

        // The connector type cannot be changed after creation
        if operation == Operation::Create {
            body.insert(
                "connector_type_id".into(),
                Value::from(self.connector_type_id.clone()),
            );
        }

        Ok(body)
    }

    fn create_path(&self) -> String {
        CONNECTOR_PATH.to_string()
    }

    fn identifier_from(&self, created: Identified) -> Result<String, ReconcileError> {
        created.into_identifier()
    }
}
