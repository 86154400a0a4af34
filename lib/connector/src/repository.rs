//! Connector persistence abstraction.

use crate::connector::Connector;
use async_trait::async_trait;
use connector_service_core::{ConnectorId, Result};
use std::fmt;

/// Errors from connector repository operations.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum RepositoryError {
    /// The database could not be reached.
    Unavailable { reason: String },
    /// A statement failed.
    Query {
        operation: &'static str,
        reason: String,
    },
    /// A stored row could not be converted into a connector.
    Decode { reason: String },
}

impl fmt::Display for RepositoryError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Unavailable { reason } => write!(f, "database unavailable: {reason}"),
            Self::Query { operation, reason } => {
                write!(f, "connector {operation} failed: {reason}")
            }
            Self::Decode { reason } => write!(f, "invalid connector row: {reason}"),
        }
    }
}

impl std::error::Error for RepositoryError {}

/// Trait for connector persistence.
#[async_trait]
pub trait ConnectorRepository: Send + Sync {
    /// Inserts a new connector.
    async fn create(&self, connector: &Connector) -> Result<(), RepositoryError>;

    /// Finds a connector by id. `Ok(None)` means no row exists.
    async fn find_by_id(&self, id: ConnectorId) -> Result<Option<Connector>, RepositoryError>;

    /// Deletes a connector. Deleting an absent connector succeeds.
    async fn delete(&self, id: ConnectorId) -> Result<(), RepositoryError>;
}
