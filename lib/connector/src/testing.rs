//! In-memory collaborators for exercising the orchestrator.
//!
//! All three doubles can share one [`CallLog`], which records every call
//! in the order it was made. Each double can be told to fail a specific
//! operation before it is handed to the orchestrator.

use crate::connector::Connector;
use crate::repository::{ConnectorRepository, RepositoryError};
use async_trait::async_trait;
use connector_service_core::{ConnectorId, Result};
use connector_service_integration::{
    MessagingError, MessagingProvider, SecretKey, SecretStore, SecretStoreError,
};
use secrecy::{ExposeSecret, SecretString};
use std::collections::HashMap;
use std::sync::{Arc, Mutex, MutexGuard, PoisonError};

fn lock<T>(mutex: &Mutex<T>) -> MutexGuard<'_, T> {
    mutex.lock().unwrap_or_else(PoisonError::into_inner)
}

/// A collaborator call, as recorded by the in-memory doubles.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Call {
    /// `SecretStore::store`.
    StoreSecret { key: String, value: String },
    /// `SecretStore::get`.
    GetSecret { key: String },
    /// `SecretStore::delete`.
    DeleteSecret { key: String },
    /// `MessagingProvider::resolve_channel`.
    ResolveChannel { token: String, name: String },
    /// `MessagingProvider::post_message`.
    PostMessage {
        token: String,
        channel_id: String,
        text: String,
    },
    /// `ConnectorRepository::create`.
    CreateConnector { id: ConnectorId },
    /// `ConnectorRepository::find_by_id`.
    FindConnector { id: ConnectorId },
    /// `ConnectorRepository::delete`.
    DeleteConnector { id: ConnectorId },
}

/// Ordered record of collaborator calls.
#[derive(Debug, Clone, Default)]
pub struct CallLog(Arc<Mutex<Vec<Call>>>);

impl CallLog {
    /// Creates an empty log.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    fn record(&self, call: Call) {
        lock(&self.0).push(call);
    }

    /// Returns every call recorded so far.
    #[must_use]
    pub fn calls(&self) -> Vec<Call> {
        lock(&self.0).clone()
    }

    /// Counts recorded calls matching a predicate.
    pub fn count(&self, predicate: impl Fn(&Call) -> bool) -> usize {
        lock(&self.0).iter().filter(|call| predicate(call)).count()
    }

    /// Returns true if no call was recorded.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        lock(&self.0).is_empty()
    }
}

/// In-memory secret store.
#[derive(Debug, Clone, Default)]
pub struct InMemorySecretStore {
    log: CallLog,
    secrets: Arc<Mutex<HashMap<String, String>>>,
    fail_store: bool,
    fail_get: bool,
    fail_delete: bool,
}

impl InMemorySecretStore {
    /// Creates an empty store recording into `log`.
    #[must_use]
    pub fn new(log: CallLog) -> Self {
        Self {
            log,
            ..Self::default()
        }
    }

    /// Makes every `store` call fail.
    #[must_use]
    pub fn failing_store(mut self) -> Self {
        self.fail_store = true;
        self
    }

    /// Makes every `get` call fail.
    #[must_use]
    pub fn failing_get(mut self) -> Self {
        self.fail_get = true;
        self
    }

    /// Makes every `delete` call fail.
    #[must_use]
    pub fn failing_delete(mut self) -> Self {
        self.fail_delete = true;
        self
    }

    /// Puts a secret in place without recording a call.
    pub fn insert(&self, key: &SecretKey, value: &str) {
        lock(&self.secrets).insert(key.to_string(), value.to_string());
    }

    /// Returns the stored value, if any.
    #[must_use]
    pub fn value(&self, key: &SecretKey) -> Option<String> {
        lock(&self.secrets).get(key.as_str()).cloned()
    }

    /// Returns the number of stored secrets.
    #[must_use]
    pub fn len(&self) -> usize {
        lock(&self.secrets).len()
    }

    /// Returns true if no secret is stored.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        lock(&self.secrets).is_empty()
    }
}

fn injected(operation: &'static str) -> SecretStoreError {
    SecretStoreError::RequestFailed {
        operation,
        reason: "injected failure".to_string(),
    }
}

#[async_trait]
impl SecretStore for InMemorySecretStore {
    async fn store(&self, key: &SecretKey, value: &SecretString) -> Result<(), SecretStoreError> {
        self.log.record(Call::StoreSecret {
            key: key.to_string(),
            value: value.expose_secret().clone(),
        });
        if self.fail_store {
            return Err(injected("store").into());
        }
        lock(&self.secrets).insert(key.to_string(), value.expose_secret().clone());
        Ok(())
    }

    async fn get(&self, key: &SecretKey) -> Result<SecretString, SecretStoreError> {
        self.log.record(Call::GetSecret {
            key: key.to_string(),
        });
        if self.fail_get {
            return Err(injected("get").into());
        }
        lock(&self.secrets)
            .get(key.as_str())
            .map(|value| SecretString::new(value.clone()))
            .ok_or_else(|| {
                SecretStoreError::NotFound {
                    key: key.to_string(),
                }
                .into()
            })
    }

    async fn delete(&self, key: &SecretKey) -> Result<(), SecretStoreError> {
        self.log.record(Call::DeleteSecret {
            key: key.to_string(),
        });
        if self.fail_delete {
            return Err(injected("delete").into());
        }
        lock(&self.secrets).remove(key.as_str());
        Ok(())
    }
}

/// In-memory messaging provider with a fixed channel directory.
#[derive(Debug, Clone, Default)]
pub struct InMemoryMessaging {
    log: CallLog,
    channels: HashMap<String, String>,
    fail_resolve: bool,
    stall_resolve: bool,
    fail_post: bool,
}

impl InMemoryMessaging {
    /// Creates a provider with no channels, recording into `log`.
    #[must_use]
    pub fn new(log: CallLog) -> Self {
        Self {
            log,
            ..Self::default()
        }
    }

    /// Adds a channel that `resolve_channel` can find.
    #[must_use]
    pub fn with_channel(mut self, name: &str, id: &str) -> Self {
        self.channels.insert(name.to_string(), id.to_string());
        self
    }

    /// Makes every `resolve_channel` call fail with a transport error.
    #[must_use]
    pub fn failing_resolve(mut self) -> Self {
        self.fail_resolve = true;
        self
    }

    /// Makes every `resolve_channel` call wait forever.
    #[must_use]
    pub fn stalled_resolve(mut self) -> Self {
        self.stall_resolve = true;
        self
    }

    /// Makes every `post_message` call fail.
    #[must_use]
    pub fn failing_post(mut self) -> Self {
        self.fail_post = true;
        self
    }
}

#[async_trait]
impl MessagingProvider for InMemoryMessaging {
    async fn resolve_channel(
        &self,
        token: &SecretString,
        name: &str,
    ) -> Result<String, MessagingError> {
        self.log.record(Call::ResolveChannel {
            token: token.expose_secret().clone(),
            name: name.to_string(),
        });
        if self.stall_resolve {
            std::future::pending::<()>().await;
        }
        if self.fail_resolve {
            return Err(MessagingError::RequestFailed {
                method: "conversations.list",
                reason: "injected failure".to_string(),
            }
            .into());
        }
        self.channels.get(name).cloned().ok_or_else(|| {
            MessagingError::ChannelNotFound {
                name: name.to_string(),
            }
            .into()
        })
    }

    async fn post_message(
        &self,
        token: &SecretString,
        channel_id: &str,
        text: &str,
    ) -> Result<(), MessagingError> {
        self.log.record(Call::PostMessage {
            token: token.expose_secret().clone(),
            channel_id: channel_id.to_string(),
            text: text.to_string(),
        });
        if self.fail_post {
            return Err(MessagingError::Api {
                method: "chat.postMessage",
                code: "injected_failure".to_string(),
            }
            .into());
        }
        Ok(())
    }
}

/// In-memory connector repository.
#[derive(Debug, Clone, Default)]
pub struct InMemoryConnectorRepository {
    log: CallLog,
    rows: Arc<Mutex<HashMap<ConnectorId, Connector>>>,
    fail_create: bool,
    fail_find: bool,
    fail_delete: bool,
}

impl InMemoryConnectorRepository {
    /// Creates an empty repository recording into `log`.
    #[must_use]
    pub fn new(log: CallLog) -> Self {
        Self {
            log,
            ..Self::default()
        }
    }

    /// Makes every `create` call fail.
    #[must_use]
    pub fn failing_create(mut self) -> Self {
        self.fail_create = true;
        self
    }

    /// Makes every `find_by_id` call fail with a connectivity error.
    #[must_use]
    pub fn failing_find(mut self) -> Self {
        self.fail_find = true;
        self
    }

    /// Makes every `delete` call fail.
    #[must_use]
    pub fn failing_delete(mut self) -> Self {
        self.fail_delete = true;
        self
    }

    /// Puts a row in place without recording a call.
    pub fn insert(&self, connector: Connector) {
        lock(&self.rows).insert(connector.id, connector);
    }

    /// Returns the stored row, if any.
    #[must_use]
    pub fn row(&self, id: ConnectorId) -> Option<Connector> {
        lock(&self.rows).get(&id).cloned()
    }

    /// Returns the number of stored rows.
    #[must_use]
    pub fn len(&self) -> usize {
        lock(&self.rows).len()
    }

    /// Returns true if no row is stored.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        lock(&self.rows).is_empty()
    }
}

#[async_trait]
impl ConnectorRepository for InMemoryConnectorRepository {
    async fn create(&self, connector: &Connector) -> Result<(), RepositoryError> {
        self.log.record(Call::CreateConnector { id: connector.id });
        if self.fail_create {
            return Err(RepositoryError::Query {
                operation: "create",
                reason: "injected failure".to_string(),
            }
            .into());
        }
        lock(&self.rows).insert(connector.id, connector.clone());
        Ok(())
    }

    async fn find_by_id(&self, id: ConnectorId) -> Result<Option<Connector>, RepositoryError> {
        self.log.record(Call::FindConnector { id });
        if self.fail_find {
            return Err(RepositoryError::Unavailable {
                reason: "injected failure".to_string(),
            }
            .into());
        }
        Ok(lock(&self.rows).get(&id).cloned())
    }

    async fn delete(&self, id: ConnectorId) -> Result<(), RepositoryError> {
        self.log.record(Call::DeleteConnector { id });
        if self.fail_delete {
            return Err(RepositoryError::Query {
                operation: "delete",
                reason: "injected failure".to_string(),
            }
            .into());
        }
        lock(&self.rows).remove(&id);
        Ok(())
    }
}
