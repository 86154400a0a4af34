//! AWS Secrets Manager backed [`SecretStore`].

use crate::error::SecretStoreError;
use crate::secret::{SecretKey, SecretStore};
use async_trait::async_trait;
use aws_config::{BehaviorVersion, Region};
use aws_credential_types::Credentials;
use aws_sdk_secretsmanager::Client;
use aws_sdk_secretsmanager::error::DisplayErrorContext;
use connector_service_core::Result;
use secrecy::{ExposeSecret, SecretString};
use serde::Deserialize;
use tracing::{debug, instrument};

/// Connection settings for AWS Secrets Manager.
#[derive(Debug, Deserialize)]
pub struct SecretsConfig {
    /// AWS region.
    #[serde(default = "default_region")]
    pub region: String,

    /// Endpoint override, e.g. a LocalStack URL for development.
    #[serde(default)]
    pub endpoint_url: Option<String>,

    /// Static access key id. Used only together with `secret_access_key`;
    /// otherwise the default AWS credential chain applies.
    #[serde(default)]
    pub access_key_id: Option<String>,

    /// Static secret access key.
    #[serde(default)]
    pub secret_access_key: Option<SecretString>,
}

fn default_region() -> String {
    "us-east-1".to_string()
}

impl Default for SecretsConfig {
    fn default() -> Self {
        Self {
            region: default_region(),
            endpoint_url: None,
            access_key_id: None,
            secret_access_key: None,
        }
    }
}

/// Secret store backed by AWS Secrets Manager.
#[derive(Clone, Debug)]
pub struct AwsSecretsManager {
    client: Client,
}

impl AwsSecretsManager {
    /// Creates a store from an existing SDK client.
    #[must_use]
    pub fn new(client: Client) -> Self {
        Self { client }
    }

    /// Builds a client from configuration.
    pub async fn from_config(config: &SecretsConfig) -> Self {
        let mut loader = aws_config::defaults(BehaviorVersion::latest())
            .region(Region::new(config.region.clone()));

        if let Some(endpoint) = &config.endpoint_url {
            loader = loader.endpoint_url(endpoint);
        }

        if let (Some(access_key_id), Some(secret_access_key)) =
            (&config.access_key_id, &config.secret_access_key)
        {
            loader = loader.credentials_provider(Credentials::new(
                access_key_id,
                secret_access_key.expose_secret(),
                None,
                None,
                "connector-service-config",
            ));
        }

        let sdk_config = loader.load().await;
        Self::new(Client::new(&sdk_config))
    }
}

fn request_failed(operation: &'static str, err: impl std::error::Error) -> SecretStoreError {
    SecretStoreError::RequestFailed {
        operation,
        reason: DisplayErrorContext(err).to_string(),
    }
}

#[async_trait]
impl SecretStore for AwsSecretsManager {
    #[instrument(skip(self, value), fields(key = %key))]
    async fn store(&self, key: &SecretKey, value: &SecretString) -> Result<(), SecretStoreError> {
        let created = self
            .client
            .create_secret()
            .name(key.as_str())
            .secret_string(value.expose_secret())
            .send()
            .await;

        match created {
            Ok(_) => {
                debug!("secret created");
                Ok(())
            }
            Err(err)
                if err
                    .as_service_error()
                    .is_some_and(|e| e.is_resource_exists_exception()) =>
            {
                self.client
                    .put_secret_value()
                    .secret_id(key.as_str())
                    .secret_string(value.expose_secret())
                    .send()
                    .await
                    .map_err(|e| request_failed("put_secret_value", e))?;
                debug!("existing secret overwritten");
                Ok(())
            }
            Err(err) => Err(request_failed("create_secret", err).into()),
        }
    }

    #[instrument(skip(self), fields(key = %key))]
    async fn get(&self, key: &SecretKey) -> Result<SecretString, SecretStoreError> {
        let output = self
            .client
            .get_secret_value()
            .secret_id(key.as_str())
            .send()
            .await
            .map_err(|err| {
                if err
                    .as_service_error()
                    .is_some_and(|e| e.is_resource_not_found_exception())
                {
                    SecretStoreError::NotFound {
                        key: key.to_string(),
                    }
                } else {
                    request_failed("get_secret_value", err)
                }
            })?;

        let value = output
            .secret_string()
            .ok_or_else(|| SecretStoreError::InvalidPayload {
                key: key.to_string(),
            })?;

        Ok(SecretString::new(value.to_string()))
    }

    #[instrument(skip(self), fields(key = %key))]
    async fn delete(&self, key: &SecretKey) -> Result<(), SecretStoreError> {
        let deleted = self
            .client
            .delete_secret()
            .secret_id(key.as_str())
            .force_delete_without_recovery(true)
            .send()
            .await;

        match deleted {
            Ok(_) => {
                debug!("secret deleted");
                Ok(())
            }
            Err(err)
                if err
                    .as_service_error()
                    .is_some_and(|e| e.is_resource_not_found_exception()) =>
            {
                debug!("secret already absent");
                Ok(())
            }
            Err(err) => Err(request_failed("delete_secret", err).into()),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;
    use wiremock::matchers::{body_partial_json, header, method};
    use wiremock::{Mock, MockServer, ResponseTemplate};

    const AMZ_JSON: &str = "application/x-amz-json-1.1";

    async fn store_for(server: &MockServer) -> AwsSecretsManager {
        AwsSecretsManager::from_config(&SecretsConfig {
            region: "us-east-1".to_string(),
            endpoint_url: Some(server.uri()),
            access_key_id: Some("AKIDEXAMPLE".to_string()),
            secret_access_key: Some(SecretString::new("test-secret".to_string())),
        })
        .await
    }

    fn target(operation: &str) -> wiremock::matchers::HeaderExactMatcher {
        header("x-amz-target", format!("secretsmanager.{operation}").as_str())
    }

    fn ok(body: serde_json::Value) -> ResponseTemplate {
        ResponseTemplate::new(200).set_body_raw(body.to_string(), AMZ_JSON)
    }

    fn service_error(error_type: &str) -> ResponseTemplate {
        ResponseTemplate::new(400)
            .insert_header("x-amzn-errortype", error_type)
            .set_body_raw(
                json!({"__type": error_type, "message": "mocked"}).to_string(),
                AMZ_JSON,
            )
    }

    fn key() -> SecretKey {
        SecretKey::for_connector(connector_service_core::ConnectorId::new())
    }

    #[tokio::test]
    async fn store_creates_new_secret() {
        let server = MockServer::start().await;
        let key = key();
        Mock::given(method("POST"))
            .and(target("CreateSecret"))
            .and(body_partial_json(json!({"Name": key.as_str(), "SecretString": "tok-abc"})))
            .respond_with(ok(json!({"ARN": "arn:secret", "Name": key.as_str()})))
            .expect(1)
            .mount(&server)
            .await;
        Mock::given(method("POST"))
            .and(target("PutSecretValue"))
            .respond_with(ok(json!({})))
            .expect(0)
            .mount(&server)
            .await;

        store_for(&server)
            .await
            .store(&key, &SecretString::new("tok-abc".to_string()))
            .await
            .unwrap();
    }

    #[tokio::test]
    async fn store_overwrites_existing_secret() {
        let server = MockServer::start().await;
        let key = key();
        Mock::given(method("POST"))
            .and(target("CreateSecret"))
            .respond_with(service_error("ResourceExistsException"))
            .expect(1)
            .mount(&server)
            .await;
        Mock::given(method("POST"))
            .and(target("PutSecretValue"))
            .and(body_partial_json(json!({"SecretId": key.as_str(), "SecretString": "tok-new"})))
            .respond_with(ok(json!({"ARN": "arn:secret", "Name": key.as_str()})))
            .expect(1)
            .mount(&server)
            .await;

        store_for(&server)
            .await
            .store(&key, &SecretString::new("tok-new".to_string()))
            .await
            .unwrap();
    }

    #[tokio::test]
    async fn store_reports_other_failures() {
        let server = MockServer::start().await;
        Mock::given(method("POST"))
            .and(target("CreateSecret"))
            .respond_with(service_error("InvalidRequestException"))
            .mount(&server)
            .await;

        let err = store_for(&server)
            .await
            .store(&key(), &SecretString::new("tok-abc".to_string()))
            .await
            .unwrap_err();

        assert!(matches!(
            err.current_context(),
            SecretStoreError::RequestFailed {
                operation: "create_secret",
                ..
            }
        ));
    }

    #[tokio::test]
    async fn get_returns_secret_string() {
        let server = MockServer::start().await;
        let key = key();
        Mock::given(method("POST"))
            .and(target("GetSecretValue"))
            .and(body_partial_json(json!({"SecretId": key.as_str()})))
            .respond_with(ok(json!({"Name": key.as_str(), "SecretString": "tok-abc"})))
            .expect(1)
            .mount(&server)
            .await;

        let value = store_for(&server).await.get(&key).await.unwrap();

        assert_eq!(value.expose_secret(), "tok-abc");
    }

    #[tokio::test]
    async fn get_missing_secret_is_not_found() {
        let server = MockServer::start().await;
        let key = key();
        Mock::given(method("POST"))
            .and(target("GetSecretValue"))
            .respond_with(service_error("ResourceNotFoundException"))
            .mount(&server)
            .await;

        let err = store_for(&server).await.get(&key).await.unwrap_err();

        assert_eq!(
            err.current_context(),
            &SecretStoreError::NotFound {
                key: key.to_string()
            }
        );
    }

    #[tokio::test]
    async fn get_without_secret_string_is_invalid_payload() {
        let server = MockServer::start().await;
        let key = key();
        Mock::given(method("POST"))
            .and(target("GetSecretValue"))
            .respond_with(ok(json!({"Name": key.as_str(), "SecretBinary": "dG9r"})))
            .mount(&server)
            .await;

        let err = store_for(&server).await.get(&key).await.unwrap_err();

        assert_eq!(
            err.current_context(),
            &SecretStoreError::InvalidPayload {
                key: key.to_string()
            }
        );
    }

    #[tokio::test]
    async fn delete_forces_removal() {
        let server = MockServer::start().await;
        let key = key();
        Mock::given(method("POST"))
            .and(target("DeleteSecret"))
            .and(body_partial_json(json!({
                "SecretId": key.as_str(),
                "ForceDeleteWithoutRecovery": true,
            })))
            .respond_with(ok(json!({"Name": key.as_str()})))
            .expect(1)
            .mount(&server)
            .await;

        store_for(&server).await.delete(&key).await.unwrap();
    }

    #[tokio::test]
    async fn delete_of_absent_secret_succeeds() {
        let server = MockServer::start().await;
        Mock::given(method("POST"))
            .and(target("DeleteSecret"))
            .respond_with(service_error("ResourceNotFoundException"))
            .expect(1)
            .mount(&server)
            .await;

        store_for(&server).await.delete(&key()).await.unwrap();
    }

    #[test]
    fn secrets_config_defaults() {
        let config = SecretsConfig::default();
        assert_eq!(config.region, "us-east-1");
        assert!(config.endpoint_url.is_none());
        assert!(config.access_key_id.is_none());
    }

    #[test]
    fn secrets_config_debug_redacts_secret_key() {
        let config: SecretsConfig = serde_json::from_value(serde_json::json!({
            "region": "eu-west-1",
            "access_key_id": "AKIDEXAMPLE",
            "secret_access_key": "wJalrXUtnFEMI",
        }))
        .expect("deserialize");

        assert_eq!(config.region, "eu-west-1");
        assert!(!format!("{config:?}").contains("wJalrXUtnFEMI"));
    }
}
