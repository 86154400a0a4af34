//! PostgreSQL repository for connector records.

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use connector_service_connector::{Connector, ConnectorRepository, RepositoryError};
use connector_service_core::{ConnectorId, Result};
use sqlx::{FromRow, PgPool};
use std::str::FromStr;
use tracing::instrument;

/// Row type for connector queries.
#[derive(FromRow)]
struct ConnectorRow {
    id: String,
    tenant_id: String,
    workspace_id: String,
    default_channel_id: String,
    created_at: DateTime<Utc>,
    updated_at: DateTime<Utc>,
}

impl ConnectorRow {
    fn try_into_connector(self) -> std::result::Result<Connector, RepositoryError> {
        let id = ConnectorId::from_str(&self.id).map_err(|e| RepositoryError::Decode {
            reason: format!("invalid connector id '{}': {}", self.id, e),
        })?;

        Ok(Connector {
            id,
            workspace_id: self.workspace_id,
            tenant_id: self.tenant_id,
            default_channel_id: self.default_channel_id,
            created_at: self.created_at,
            updated_at: self.updated_at,
        })
    }
}

fn classify(operation: &'static str, err: sqlx::Error) -> RepositoryError {
    match err {
        sqlx::Error::PoolTimedOut | sqlx::Error::PoolClosed | sqlx::Error::Io(_) => {
            RepositoryError::Unavailable {
                reason: err.to_string(),
            }
        }
        other => RepositoryError::Query {
            operation,
            reason: other.to_string(),
        },
    }
}

/// Repository for connector records.
#[derive(Debug, Clone)]
pub struct PgConnectorRepository {
    pool: PgPool,
}

impl PgConnectorRepository {
    /// Creates a new repository.
    #[must_use]
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }
}

#[async_trait]
impl ConnectorRepository for PgConnectorRepository {
    #[instrument(skip(self, connector), fields(connector_id = %connector.id))]
    async fn create(&self, connector: &Connector) -> Result<(), RepositoryError> {
        sqlx::query(
            r#"
            INSERT INTO connectors
                (id, tenant_id, workspace_id, default_channel_id, created_at, updated_at)
            VALUES ($1, $2, $3, $4, $5, $6)
            "#,
        )
        .bind(connector.id.to_string())
        .bind(&connector.tenant_id)
        .bind(&connector.workspace_id)
        .bind(&connector.default_channel_id)
        .bind(connector.created_at)
        .bind(connector.updated_at)
        .execute(&self.pool)
        .await
        .map_err(|e| classify("create", e))?;

        Ok(())
    }

    #[instrument(skip(self))]
    async fn find_by_id(&self, id: ConnectorId) -> Result<Option<Connector>, RepositoryError> {
        let row: Option<ConnectorRow> = sqlx::query_as(
            r#"
            SELECT id, tenant_id, workspace_id, default_channel_id, created_at, updated_at
            FROM connectors
            WHERE id = $1
            "#,
        )
        .bind(id.to_string())
        .fetch_optional(&self.pool)
        .await
        .map_err(|e| classify("find", e))?;

        match row {
            Some(r) => Ok(Some(r.try_into_connector()?)),
            None => Ok(None),
        }
    }

    #[instrument(skip(self))]
    async fn delete(&self, id: ConnectorId) -> Result<(), RepositoryError> {
        sqlx::query(
            r#"
            DELETE FROM connectors
            WHERE id = $1
            "#,
        )
        .bind(id.to_string())
        .execute(&self.pool)
        .await
        .map_err(|e| classify("delete", e))?;

        Ok(())
    }
}
