//! Connector lifecycle orchestration.
//!
//! The orchestrator coordinates three independently failing systems: the
//! secret store (access token), the messaging provider (channel lookup and
//! delivery) and the repository (connector record). There is no
//! transaction spanning them. Consistency comes from call ordering:
//!
//! - create: store secret, resolve channel, persist record. A record is
//!   only written once its credential is stored and its channel resolved.
//!   A failure after the first step leaves an orphaned secret.
//! - delete: remove record, then remove secret. The record removal is the
//!   state transition; a failed secret removal leaves an orphaned secret
//!   behind an already unreachable connector.
//!
//! Orphaned secrets are logged and never cleaned up automatically. Each
//! collaborator is called at most once per operation, and completed steps
//! are not undone when the caller cancels by dropping the future.

use crate::connector::{Connector, NewConnector};
use crate::error::ConnectorError;
use crate::repository::ConnectorRepository;
use connector_service_core::{ConnectorId, Result};
use connector_service_integration::{MessagingProvider, SecretKey, SecretStore};
use rootcause::prelude::Report;
use std::sync::Arc;
use tracing::{debug, error, info, instrument, warn};

/// Coordinates connector creation, lookup, deletion and message delivery.
///
/// Holds no state between calls; clones share the same collaborators.
#[derive(Clone)]
pub struct ConnectorOrchestrator {
    repository: Arc<dyn ConnectorRepository>,
    secrets: Arc<dyn SecretStore>,
    messaging: Arc<dyn MessagingProvider>,
}

impl ConnectorOrchestrator {
    /// Creates an orchestrator over the given collaborators.
    #[must_use]
    pub fn new(
        repository: Arc<dyn ConnectorRepository>,
        secrets: Arc<dyn SecretStore>,
        messaging: Arc<dyn MessagingProvider>,
    ) -> Self {
        Self {
            repository,
            secrets,
            messaging,
        }
    }

    /// Creates a connector.
    ///
    /// # Errors
    ///
    /// - `InvalidArgument` if any input is empty (no collaborator is
    ///   called) or the channel name does not resolve
    /// - `Internal` if storing the token or persisting the record fails
    #[instrument(
        skip(self, request),
        fields(workspace_id = %request.workspace_id, tenant_id = %request.tenant_id)
    )]
    pub async fn create(&self, request: NewConnector) -> Result<Connector, ConnectorError> {
        if let Some(field) = request.first_empty_field() {
            return Err(ConnectorError::invalid(format!("{field} must not be empty")).into());
        }

        let id = ConnectorId::new();
        let key = SecretKey::for_connector(id);

        self.secrets
            .store(&key, &request.access_token)
            .await
            .map_err(|report| {
                error!(connector_id = %id, error = %report, "failed to store access token");
                report.context(ConnectorError::Internal {
                    operation: "store_secret",
                })
            })?;

        let channel_id = self
            .messaging
            .resolve_channel(&request.access_token, &request.default_channel_name)
            .await
            .map_err(|report| {
                error!(
                    connector_id = %id,
                    channel_name = %request.default_channel_name,
                    error = %report,
                    "failed to resolve default channel"
                );
                warn!(
                    connector_id = %id,
                    secret_key = %key,
                    "access token stored without a connector record"
                );
                report.context(ConnectorError::invalid(format!(
                    "channel '{}' could not be resolved",
                    request.default_channel_name
                )))
            })?;

        let connector = Connector::new(id, request.workspace_id, request.tenant_id, channel_id);

        self.repository.create(&connector).await.map_err(|report| {
            error!(connector_id = %id, error = %report, "failed to persist connector");
            warn!(
                connector_id = %id,
                secret_key = %key,
                "access token stored without a connector record"
            );
            report.context(ConnectorError::Internal {
                operation: "create_connector",
            })
        })?;

        info!(
            connector_id = %id,
            default_channel_id = %connector.default_channel_id,
            "connector created"
        );
        Ok(connector)
    }

    /// Fetches a connector.
    ///
    /// # Errors
    ///
    /// - `InvalidArgument` if `id` is not a connector id
    /// - `NotFound` if no such connector exists
    /// - `Internal` if the repository fails
    #[instrument(skip(self))]
    pub async fn get(&self, id: &str) -> Result<Connector, ConnectorError> {
        let id = parse_id(id)?;
        self.find(id).await
    }

    /// Deletes a connector and its stored access token.
    ///
    /// # Errors
    ///
    /// - `InvalidArgument` if `id` is not a connector id
    /// - `Internal` if either deletion fails. When the secret deletion
    ///   fails the record is already gone.
    #[instrument(skip(self))]
    pub async fn delete(&self, id: &str) -> Result<(), ConnectorError> {
        let id = parse_id(id)?;

        self.repository.delete(id).await.map_err(|report| {
            error!(connector_id = %id, error = %report, "failed to delete connector");
            report.context(ConnectorError::Internal {
                operation: "delete_connector",
            })
        })?;

        let key = SecretKey::for_connector(id);
        self.secrets.delete(&key).await.map_err(|report| {
            error!(connector_id = %id, error = %report, "failed to delete access token");
            warn!(
                connector_id = %id,
                secret_key = %key,
                "connector deleted but its access token remains"
            );
            report.context(ConnectorError::Internal {
                operation: "delete_secret",
            })
        })?;

        info!(connector_id = %id, "connector deleted");
        Ok(())
    }

    /// Posts `text` to the connector's default channel.
    ///
    /// # Errors
    ///
    /// - `InvalidArgument` if `id` or `text` is empty or `id` is not a
    ///   connector id (no collaborator is called)
    /// - `NotFound` if no such connector exists
    /// - `Internal` if the repository, secret store or provider fails
    #[instrument(skip(self, text))]
    pub async fn send_message(&self, id: &str, text: &str) -> Result<(), ConnectorError> {
        if id.is_empty() {
            return Err(ConnectorError::invalid("connector id must not be empty").into());
        }
        if text.is_empty() {
            return Err(ConnectorError::invalid("message must not be empty").into());
        }
        let id = parse_id(id)?;

        let connector = self.find(id).await?;

        let token = self
            .secrets
            .get(&SecretKey::for_connector(id))
            .await
            .map_err(|report| {
                error!(connector_id = %id, error = %report, "failed to read access token");
                report.context(ConnectorError::Internal {
                    operation: "get_secret",
                })
            })?;

        self.messaging
            .post_message(&token, &connector.default_channel_id, text)
            .await
            .map_err(|report| {
                error!(
                    connector_id = %id,
                    channel_id = %connector.default_channel_id,
                    error = %report,
                    "failed to post message"
                );
                report.context(ConnectorError::Internal {
                    operation: "post_message",
                })
            })?;

        debug!(connector_id = %id, "message sent");
        Ok(())
    }

    async fn find(&self, id: ConnectorId) -> Result<Connector, ConnectorError> {
        match self.repository.find_by_id(id).await {
            Ok(Some(connector)) => Ok(connector),
            Ok(None) => Err(ConnectorError::NotFound { id: id.to_string() }.into()),
            Err(report) => {
                error!(connector_id = %id, error = %report, "failed to load connector");
                Err(report.context(ConnectorError::Internal {
                    operation: "find_connector",
                }))
            }
        }
    }
}

fn parse_id(id: &str) -> Result<ConnectorId, ConnectorError> {
    id.parse().map_err(|e| {
        Report::from(ConnectorError::invalid(format!("malformed connector id: {e}")))
    })
}
