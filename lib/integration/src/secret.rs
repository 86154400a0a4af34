//! Secret store abstraction for connector credentials.
//!
//! Each connector owns exactly one stored credential, the messaging
//! provider access token, addressed by a key derived from the connector
//! id. Every code path that touches a connector's credential must derive
//! the key through [`SecretKey::for_connector`].

use crate::error::SecretStoreError;
use async_trait::async_trait;
use connector_service_core::{ConnectorId, Result};
use secrecy::SecretString;
use std::fmt;

/// Namespace under which connector credentials are stored.
const CONNECTOR_NAMESPACE: &str = "slack-connector";

/// Key identifying a stored secret.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct SecretKey(String);

impl SecretKey {
    /// Returns the key holding the access token of a connector.
    #[must_use]
    pub fn for_connector(id: ConnectorId) -> Self {
        Self(format!("{CONNECTOR_NAMESPACE}/{id}"))
    }

    /// Returns the key as a string slice.
    #[must_use]
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for SecretKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

/// Trait for credential storage.
///
/// Implementations must never log secret values.
#[async_trait]
pub trait SecretStore: Send + Sync {
    /// Stores a secret, overwriting any value already held under the key.
    ///
    /// # Errors
    ///
    /// Returns an error if the store rejects the write.
    async fn store(&self, key: &SecretKey, value: &SecretString) -> Result<(), SecretStoreError>;

    /// Retrieves a secret.
    ///
    /// # Errors
    ///
    /// Returns [`SecretStoreError::NotFound`] if nothing is stored under the
    /// key, or another variant if the store fails.
    async fn get(&self, key: &SecretKey) -> Result<SecretString, SecretStoreError>;

    /// Deletes a secret. Deleting an absent secret succeeds.
    ///
    /// # Errors
    ///
    /// Returns an error if the store fails.
    async fn delete(&self, key: &SecretKey) -> Result<(), SecretStoreError>;
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn key_is_namespaced_by_connector() {
        let id = ConnectorId::new();
        let key = SecretKey::for_connector(id);
        assert_eq!(key.as_str(), format!("slack-connector/{id}"));
    }

    #[test]
    fn key_is_stable_for_a_connector() {
        let id = ConnectorId::new();
        assert_eq!(SecretKey::for_connector(id), SecretKey::for_connector(id));
        assert_ne!(
            SecretKey::for_connector(id),
            SecretKey::for_connector(ConnectorId::new())
        );
    }
}
