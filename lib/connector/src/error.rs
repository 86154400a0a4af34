//! Classified failures of connector operations.
//!
//! Every orchestrator failure is exactly one [`ConnectorError`]. The
//! collaborator report that caused it stays attached as the report's
//! child, but callers should branch only on the classification.

use std::fmt;

/// Classification of a failed connector operation.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ErrorKind {
    /// Malformed or missing input, or an unresolvable channel name.
    InvalidArgument,
    /// The connector does not exist.
    NotFound,
    /// The connector already exists.
    AlreadyExists,
    /// A collaborator failed.
    Internal,
}

/// Errors returned by [`ConnectorOrchestrator`](crate::ConnectorOrchestrator).
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ConnectorError {
    /// The request was rejected before or during validation.
    InvalidArgument { reason: String },
    /// No connector exists with the id.
    NotFound { id: String },
    /// Reserved: identifiers are generated, so no operation raises this.
    AlreadyExists { id: String },
    /// A collaborator call failed.
    Internal { operation: &'static str },
}

impl ConnectorError {
    /// Returns the classification of this error.
    #[must_use]
    pub fn kind(&self) -> ErrorKind {
        match self {
            Self::InvalidArgument { .. } => ErrorKind::InvalidArgument,
            Self::NotFound { .. } => ErrorKind::NotFound,
            Self::AlreadyExists { .. } => ErrorKind::AlreadyExists,
            Self::Internal { .. } => ErrorKind::Internal,
        }
    }

    /// Returns a message that is safe to show to callers.
    ///
    /// Collaborator detail is never part of it; only the rejected input
    /// is described.
    #[must_use]
    pub fn message(&self) -> String {
        match self {
            Self::InvalidArgument { reason } => reason.clone(),
            Self::NotFound { .. } => "connector not found".to_string(),
            Self::AlreadyExists { .. } => "connector already exists".to_string(),
            Self::Internal { .. } => "internal error".to_string(),
        }
    }

    pub(crate) fn invalid(reason: impl Into<String>) -> Self {
        Self::InvalidArgument {
            reason: reason.into(),
        }
    }
}

impl fmt::Display for ConnectorError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::InvalidArgument { reason } => write!(f, "invalid argument: {reason}"),
            Self::NotFound { id } => write!(f, "connector '{id}' not found"),
            Self::AlreadyExists { id } => write!(f, "connector '{id}' already exists"),
            Self::Internal { operation } => write!(f, "internal error during {operation}"),
        }
    }
}

impl std::error::Error for ConnectorError {}
