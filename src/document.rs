//! Resource documents
//!
//! A document is one resource as written by a user, in YAML or JSON, tagged
//! with its kind:
//!
//! ```yaml
//! kind: connector
//! name: idx-conn
//! connector_type_id: .index
//! config:
//!   index: .test-index
//! ```

use crate::api::client::{ReadOutcome, ReconcileClient};
use crate::error::ReconcileError;
use crate::resource::{IndexConnector, Operation, ResourceKind, RoleMapping, Rule, WirePayload};
use crate::state::StateStore;
use anyhow::{Context, Result};
use serde::{Deserialize, Serialize};
use std::path::Path;

/// Which backend serves a resource kind
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Backend {
    Kibana,
    Elasticsearch,
}

/// What [`ResourceDocument::apply`] did
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Applied {
    Created,
    Updated,
}

/// Any resource kind the client can reconcile
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum ResourceDocument {
    Rule(Rule),
    Connector(IndexConnector),
    RoleMapping(RoleMapping),
}

/// Run the same expression against whichever resource the document holds
macro_rules! each_kind {
    ($doc:expr, $r:ident => $body:expr) => {
        match $doc {
            ResourceDocument::Rule($r) => $body,
            ResourceDocument::Connector($r) => $body,
            ResourceDocument::RoleMapping($r) => $body,
        }
    };
}

impl ResourceDocument {
    /// Load a document; `.json` files are read as JSON, anything else as YAML
    pub fn load(path: &Path) -> Result<Self> {
        let content = std::fs::read_to_string(path)
            .with_context(|| format!("Failed to read {}", path.display()))?;

        let is_json = path
            .extension()
            .map(|ext| ext.eq_ignore_ascii_case("json"))
            .unwrap_or(false);

        if is_json {
            serde_json::from_str(&content)
                .with_context(|| format!("Failed to parse {}", path.display()))
        } else {
            Self::from_yaml(&content).with_context(|| format!("Failed to parse {}", path.display()))
        }
    }

    pub fn from_yaml(content: &str) -> Result<Self> {
        Ok(serde_yaml::from_str(content)?)
    }

    pub fn to_yaml(&self) -> Result<String> {
        Ok(serde_yaml::to_string(self)?)
    }

    pub fn kind(&self) -> &'static str {
        match self {
            Self::Rule(_) => Rule::KIND,
            Self::Connector(_) => IndexConnector::KIND,
            Self::RoleMapping(_) => RoleMapping::KIND,
        }
    }

    pub fn name(&self) -> &str {
        each_kind!(self, r => &r.name)
    }

    pub fn backend(&self) -> Backend {
        match self {
            Self::Rule(_) | Self::Connector(_) => Backend::Kibana,
            Self::RoleMapping(_) => Backend::Elasticsearch,
        }
    }

    /// Key under which the identifier is stored between runs
    pub fn state_key(&self) -> String {
        format!("{}/{}", self.kind(), self.name())
    }

    pub fn id(&self) -> &str {
        each_kind!(self, r => r.id())
    }

    pub fn set_id(&mut self, id: String) {
        each_kind!(self, r => r.set_id(id))
    }

    /// Wire payload for `operation`, without any I/O
    pub fn encode(&self, operation: Operation) -> Result<WirePayload, ReconcileError> {
        each_kind!(self, r => r.encode(operation))
    }

    pub async fn create(&mut self, client: &ReconcileClient) -> Result<(), ReconcileError> {
        each_kind!(self, r => client.create(r).await)
    }

    pub async fn update(&self, client: &ReconcileClient) -> Result<(), ReconcileError> {
        each_kind!(self, r => client.update(r).await)
    }

    pub async fn read(&mut self, client: &ReconcileClient) -> Result<ReadOutcome, ReconcileError> {
        each_kind!(self, r => client.read(r).await)
    }

    pub async fn delete(&mut self, client: &ReconcileClient) -> Result<(), ReconcileError> {
        each_kind!(self, r => client.delete(r).await)
    }

    /// Fill in the identifier recorded for this document, unless it already
    /// carries one
    pub fn restore_id(&mut self, state: &StateStore) {
        if self.id().is_empty() {
            if let Some(id) = state.id(&self.state_key()) {
                self.set_id(id.to_string());
            }
        }
    }

    /// Create the resource and record the assigned identifier.
    ///
    /// A failed create leaves the store untouched. If the create succeeds but
    /// the store cannot be written, the error carries the new identifier so
    /// it is not lost.
    pub async fn create_and_record(
        &mut self,
        client: &ReconcileClient,
        state: &mut StateStore,
    ) -> Result<()> {
        self.create(client).await?;

        let key = self.state_key();
        state.record(&key, self.id()).with_context(|| {
            format!(
                "created {} {} but could not record it in {}",
                key,
                self.id(),
                state.path().display()
            )
        })
    }

    /// Update when the store (or the document) has an identifier, create and
    /// record otherwise
    pub async fn apply(&mut self, client: &ReconcileClient, state: &mut StateStore) -> Result<Applied> {
        self.restore_id(state);

        if self.id().is_empty() {
            self.create_and_record(client, state).await?;
            Ok(Applied::Created)
        } else {
            self.update(client).await?;
            Ok(Applied::Updated)
        }
    }
}
