//! Reconciliation Client
//!
//! Drives create/update/read/delete for any [`ResourceKind`], combining the
//! wire encoder, the transport and the response interpreter.
//!
//! A resource moves between two states: unmanaged (empty identifier) and
//! managed (identifier assigned by the backend). Every failure leaves the
//! resource exactly as it was.

use super::http::Transport;
use super::response;
use crate::config::ConnectionConfig;
use crate::error::ReconcileError;
use crate::resource::{Operation, ResourceKind};
use reqwest::{Method, StatusCode};

/// Result of reading a managed resource
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ReadOutcome {
    /// The resource exists and the local copy was refreshed
    Present,
    /// The backend no longer has the resource; its identifier was cleared
    Gone,
}

/// Client for one backend. Cheap to clone and share between tasks.
#[derive(Clone, Debug)]
pub struct ReconcileClient {
    transport: Transport,
}

impl ReconcileClient {
    /// Create a client from a connection config
    pub fn new(config: &ConnectionConfig) -> Result<Self, ReconcileError> {
        Ok(Self::from_transport(Transport::new(config)?))
    }

    pub fn from_transport(transport: Transport) -> Self {
        Self { transport }
    }

    /// Create the resource and assign the backend's identifier to it.
    ///
    /// Not idempotent on the backend: calling it twice creates two objects,
    /// so a resource that already holds an identifier is refused.
    pub async fn create<R: ResourceKind>(&self, resource: &mut R) -> Result<(), ReconcileError> {
        if !resource.id().is_empty() {
            return Err(ReconcileError::AlreadyManaged {
                kind: R::KIND,
                id: resource.id().to_string(),
            });
        }

        let payload = resource.encode(Operation::Create)?;
        let response = self
            .transport
            .send(resource.create_method(), &resource.create_path(), Some(&payload))
            .await?;

        let created = response::decode_success::<R::Created, R::Envelope>(response).await?;
        let id = resource.identifier_from(created)?;

        tracing::info!("Created {} {}", R::KIND, id);
        resource.set_id(id);
        Ok(())
    }

    /// Push the mutable fields of a managed resource to the backend
    pub async fn update<R: ResourceKind>(&self, resource: &R) -> Result<(), ReconcileError> {
        let id = require_id(resource)?;

        let payload = resource.encode(Operation::Update)?;
        let response = self
            .transport
            .send(resource.update_method(), &resource.update_path(id), Some(&payload))
            .await?;

        response::expect_success::<R::Envelope>(response).await?;

        tracing::info!("Updated {} {}", R::KIND, id);
        Ok(())
    }

    /// Refresh a managed resource from the backend
    pub async fn read<R: ResourceKind>(&self, resource: &mut R) -> Result<ReadOutcome, ReconcileError> {
        let path = resource
            .read_path(resource.id())
            .ok_or(ReconcileError::Unimplemented {
                kind: R::KIND,
                operation: "read",
            })?;
        require_id(resource)?;

        let response = self.transport.send(Method::GET, &path, None).await?;
        if response.status() == StatusCode::NOT_FOUND {
            tracing::info!("{} {} no longer exists", R::KIND, resource.id());
            resource.set_id(String::new());
            return Ok(ReadOutcome::Gone);
        }

        let remote = response::decode_success::<R::Remote, R::Envelope>(response).await?;
        if resource.refresh(remote) {
            Ok(ReadOutcome::Present)
        } else {
            resource.set_id(String::new());
            Ok(ReadOutcome::Gone)
        }
    }

    /// Delete a managed resource; it becomes unmanaged again.
    ///
    /// A resource that is already gone counts as deleted.
    pub async fn delete<R: ResourceKind>(&self, resource: &mut R) -> Result<(), ReconcileError> {
        let path = resource
            .delete_path(resource.id())
            .ok_or(ReconcileError::Unimplemented {
                kind: R::KIND,
                operation: "delete",
            })?;
        require_id(resource)?;

        let response = self.transport.send(Method::DELETE, &path, None).await?;
        if response.status() != StatusCode::NOT_FOUND {
            response::expect_success::<R::Envelope>(response).await?;
        }

        tracing::info!("Deleted {} {}", R::KIND, resource.id());
        resource.set_id(String::new());
        Ok(())
    }
}

fn require_id<R: ResourceKind>(resource: &R) -> Result<&str, ReconcileError> {
    match resource.id() {
        "" => Err(ReconcileError::Unmanaged { kind: R::KIND }),
        id => Ok(id),
    }
}
