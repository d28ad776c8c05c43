//! esrec
//!
//! Reconciles declaratively described Kibana and Elasticsearch resources
//! (alerting rules, index connectors, role mappings) against their management
//! APIs, and keeps the identifier the backend assigns to each one.
//!
//! - [`api`] - transport, response interpretation, reconciliation client
//! - [`resource`] - resource kinds and their wire encoders
//! - [`document`] - user-facing resource documents (YAML/JSON)
//! - [`config`] - connection configuration
//! - [`state`] - identifiers persisted between runs

pub mod api;
pub mod config;
pub mod document;
pub mod error;
pub mod resource;
pub mod state;

pub use api::client::{ReadOutcome, ReconcileClient};
pub use config::{Config, ConnectionConfig};
pub use document::{Applied, Backend, ResourceDocument};
pub use error::ReconcileError;
pub use resource::{Operation, ResourceKind};
