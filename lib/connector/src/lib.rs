//! Connector lifecycle for connector-service.
//!
//! A connector binds a tenant's workspace to a default messaging channel.
//! Its record lives in the repository and its access token in the secret
//! store; the [`ConnectorOrchestrator`] keeps the two in step.

pub mod connector;
pub mod error;
pub mod orchestrator;
pub mod repository;
#[cfg(any(test, feature = "testing"))]
pub mod testing;

pub use connector::{Connector, NewConnector};
pub use error::{ConnectorError, ErrorKind};
pub use orchestrator::ConnectorOrchestrator;
pub use repository::{ConnectorRepository, RepositoryError};
