//! Error types for the integration crate.
//!
//! Errors are designed for layered context using rootcause:
//! - `SecretStoreError`: Errors from credential storage and retrieval
//! - `MessagingError`: Errors from the messaging provider API
//!
//! Neither type carries credential material.

use std::fmt;

/// Errors from secret store operations.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SecretStoreError {
    /// No secret is stored under the key.
    NotFound { key: String },
    /// The stored secret has no string payload.
    InvalidPayload { key: String },
    /// The secret store rejected or failed the request.
    RequestFailed {
        operation: &'static str,
        reason: String,
    },
}

impl fmt::Display for SecretStoreError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::NotFound { key } => write!(f, "secret not found: {key}"),
            Self::InvalidPayload { key } => {
                write!(f, "secret '{key}' has no string payload")
            }
            Self::RequestFailed { operation, reason } => {
                write!(f, "secret store '{operation}' failed: {reason}")
            }
        }
    }
}

impl std::error::Error for SecretStoreError {}

/// Errors from messaging provider operations.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum MessagingError {
    /// No channel with the requested name is visible to the token.
    ChannelNotFound { name: String },
    /// The provider answered but reported a logical failure.
    Api { method: &'static str, code: String },
    /// The provider answered with a non-success HTTP status.
    Http {
        method: &'static str,
        status: u16,
        body: String,
    },
    /// The request could not be sent or no response arrived.
    RequestFailed {
        method: &'static str,
        reason: String,
    },
    /// The response body could not be decoded.
    InvalidResponse {
        method: &'static str,
        reason: String,
    },
}

impl fmt::Display for MessagingError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::ChannelNotFound { name } => write!(f, "channel '{name}' not found"),
            Self::Api { method, code } => write!(f, "{method} returned error '{code}'"),
            Self::Http {
                method,
                status,
                body,
            } => write!(f, "{method} returned HTTP {status}: {body}"),
            Self::RequestFailed { method, reason } => {
                write!(f, "{method} request failed: {reason}")
            }
            Self::InvalidResponse { method, reason } => {
                write!(f, "{method} returned an undecodable response: {reason}")
            }
        }
    }
}

impl std::error::Error for MessagingError {}
