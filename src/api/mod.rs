//! Backend API interaction module
//!
//! This module provides the core functionality for talking to the Kibana and
//! Elasticsearch management APIs.
//!
//! # Module Structure
//!
//! - [`auth`] - Credentials (basic or API key) attached to every request
//! - [`http`] - Transport: base endpoint, fixed headers, timeout
//! - [`response`] - Success/failure classification and error envelopes
//! - [`client`] - Reconciliation client generic over resource kinds
//!
//! # Example
//!
//! ```ignore
//! use esrec::api::client::ReconcileClient;
//! use esrec::resource::Rule;
//!
//! async fn example(config: &esrec::config::ConnectionConfig, rule: &mut Rule) -> anyhow::Result<()> {
//!     let client = ReconcileClient::new(config)?;
//!     client.create(rule).await?;
//!     println!("created {}", rule.id);
//!     Ok(())
//! }
//! ```

pub mod auth;
pub mod client;
pub mod http;
pub mod response;
