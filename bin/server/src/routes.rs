//! HTTP routes for connector lifecycle operations.

use crate::error::ApiError;
use axum::extract::rejection::JsonRejection;
use axum::extract::{Path, State};
use axum::http::StatusCode;
use axum::routing::{get, post};
use axum::{Json, Router};
use connector_service_connector::{Connector, ConnectorOrchestrator, NewConnector};
use serde::{Deserialize, Serialize};
use std::time::Duration;
use tower_http::timeout::TimeoutLayer;
use tower_http::trace::TraceLayer;

/// Request body for `POST /connectors`.
///
/// Missing fields deserialize as empty so that the orchestrator rejects
/// them with the same error as explicitly empty ones.
#[derive(Deserialize)]
pub struct CreateConnectorBody {
    #[serde(default)]
    workspace_id: String,
    #[serde(default)]
    tenant_id: String,
    #[serde(default)]
    default_channel_name: String,
    #[serde(default)]
    access_token: String,
}

impl From<CreateConnectorBody> for NewConnector {
    fn from(body: CreateConnectorBody) -> Self {
        NewConnector::new(
            body.workspace_id,
            body.tenant_id,
            body.default_channel_name,
            body.access_token,
        )
    }
}

/// Request body for `POST /connectors/{id}/messages`.
#[derive(Debug, Deserialize)]
pub struct SendMessageBody {
    #[serde(default)]
    text: String,
}

/// Response carrying a single connector.
#[derive(Debug, Serialize)]
pub struct ConnectorResponse {
    pub connector: Connector,
}

/// Response for operations without a payload.
#[derive(Debug, Serialize)]
pub struct SuccessResponse {
    pub success: bool,
}

impl SuccessResponse {
    fn ok() -> Json<Self> {
        Json(Self { success: true })
    }
}

/// Builds the application router.
pub fn router(orchestrator: ConnectorOrchestrator, request_timeout: Duration) -> Router {
    Router::new()
        .route("/health", get(health))
        .route("/connectors", post(create_connector))
        .route(
            "/connectors/{id}",
            get(get_connector).delete(delete_connector),
        )
        .route("/connectors/{id}/messages", post(send_message))
        .layer(TimeoutLayer::new(request_timeout))
        .layer(TraceLayer::new_for_http())
        .with_state(orchestrator)
}

async fn health() -> &'static str {
    "ok"
}

async fn create_connector(
    State(orchestrator): State<ConnectorOrchestrator>,
    body: Result<Json<CreateConnectorBody>, JsonRejection>,
) -> Result<(StatusCode, Json<ConnectorResponse>), ApiError> {
    let Json(body) = body?;
    let connector = orchestrator.create(body.into()).await?;
    Ok((StatusCode::CREATED, Json(ConnectorResponse { connector })))
}

async fn get_connector(
    State(orchestrator): State<ConnectorOrchestrator>,
    Path(id): Path<String>,
) -> Result<Json<ConnectorResponse>, ApiError> {
    let connector = orchestrator.get(&id).await?;
    Ok(Json(ConnectorResponse { connector }))
}

async fn delete_connector(
    State(orchestrator): State<ConnectorOrchestrator>,
    Path(id): Path<String>,
) -> Result<Json<SuccessResponse>, ApiError> {
    orchestrator.delete(&id).await?;
    Ok(SuccessResponse::ok())
}

async fn send_message(
    State(orchestrator): State<ConnectorOrchestrator>,
    Path(id): Path<String>,
    body: Result<Json<SendMessageBody>, JsonRejection>,
) -> Result<Json<SuccessResponse>, ApiError> {
    let Json(body) = body?;
    orchestrator.send_message(&id, &body.text).await?;
    Ok(SuccessResponse::ok())
}

#[cfg(test)]
mod tests {
    use super::*;
    use axum::body::Body;
    use axum::http::{Method, Request, header};
    use connector_service_connector::testing::{
        Call, CallLog, InMemoryConnectorRepository, InMemoryMessaging, InMemorySecretStore,
    };
    use serde_json::{Value, json};
    use std::sync::Arc;
    use tower::ServiceExt;

    struct TestApp {
        log: CallLog,
        router: Router,
    }

    fn app() -> TestApp {
        let log = CallLog::new();
        let orchestrator = ConnectorOrchestrator::new(
            Arc::new(InMemoryConnectorRepository::new(log.clone())),
            Arc::new(InMemorySecretStore::new(log.clone())),
            Arc::new(InMemoryMessaging::new(log.clone()).with_channel("general", "C999")),
        );
        TestApp {
            log,
            router: router(orchestrator, Duration::from_secs(5)),
        }
    }

    async fn send(
        router: &Router,
        method: Method,
        uri: &str,
        body: Option<Value>,
    ) -> (StatusCode, Value) {
        let mut request = Request::builder().method(method).uri(uri);
        let body = match body {
            Some(json) => {
                request = request.header(header::CONTENT_TYPE, "application/json");
                Body::from(json.to_string())
            }
            None => Body::empty(),
        };
        let response = router
            .clone()
            .oneshot(request.body(body).unwrap())
            .await
            .unwrap();
        let status = response.status();
        let bytes = axum::body::to_bytes(response.into_body(), usize::MAX)
            .await
            .unwrap();
        let json = if bytes.is_empty() {
            Value::Null
        } else {
            serde_json::from_slice(&bytes).unwrap_or(Value::Null)
        };
        (status, json)
    }

    fn create_body() -> Value {
        json!({
            "workspace_id": "ws-1",
            "tenant_id": "tenant-1",
            "default_channel_name": "general",
            "access_token": "tok-abc",
        })
    }

    #[tokio::test]
    async fn health_returns_ok() {
        let app = app();
        let response = app
            .router
            .oneshot(Request::get("/health").body(Body::empty()).unwrap())
            .await
            .unwrap();
        assert_eq!(response.status(), StatusCode::OK);
        let bytes = axum::body::to_bytes(response.into_body(), usize::MAX)
            .await
            .unwrap();
        assert_eq!(&bytes[..], b"ok");
    }

    #[tokio::test]
    async fn connector_lifecycle_over_http() {
        let app = app();

        let (status, created) =
            send(&app.router, Method::POST, "/connectors", Some(create_body())).await;
        assert_eq!(status, StatusCode::CREATED);
        let connector = &created["connector"];
        assert_eq!(connector["workspace_id"], "ws-1");
        assert_eq!(connector["tenant_id"], "tenant-1");
        assert_eq!(connector["default_channel_id"], "C999");
        assert!(connector.get("access_token").is_none());
        let id = connector["id"].as_str().unwrap().to_string();

        let (status, fetched) =
            send(&app.router, Method::GET, &format!("/connectors/{id}"), None).await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(fetched["connector"], *connector);

        let (status, sent) = send(
            &app.router,
            Method::POST,
            &format!("/connectors/{id}/messages"),
            Some(json!({ "text": "hello" })),
        )
        .await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(sent, json!({ "success": true }));
        assert_eq!(
            app.log.count(|c| *c
                == Call::PostMessage {
                    token: "tok-abc".to_string(),
                    channel_id: "C999".to_string(),
                    text: "hello".to_string(),
                }),
            1
        );

        let (status, deleted) =
            send(&app.router, Method::DELETE, &format!("/connectors/{id}"), None).await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(deleted, json!({ "success": true }));

        let (status, _) = send(&app.router, Method::GET, &format!("/connectors/{id}"), None).await;
        assert_eq!(status, StatusCode::NOT_FOUND);
    }

    #[tokio::test]
    async fn missing_field_is_bad_request() {
        let app = app();

        let (status, body) = send(
            &app.router,
            Method::POST,
            "/connectors",
            Some(json!({
                "workspace_id": "ws-1",
                "tenant_id": "tenant-1",
                "default_channel_name": "general",
            })),
        )
        .await;

        assert_eq!(status, StatusCode::BAD_REQUEST);
        assert!(body["error"].as_str().unwrap().contains("access_token"));
        assert!(app.log.is_empty());
    }

    #[tokio::test]
    async fn malformed_json_is_bad_request() {
        let app = app();
        let request = Request::post("/connectors")
            .header(header::CONTENT_TYPE, "application/json")
            .body(Body::from("{not json"))
            .unwrap();

        let response = app.router.oneshot(request).await.unwrap();

        assert_eq!(response.status(), StatusCode::BAD_REQUEST);
        assert!(app.log.is_empty());
    }

    #[tokio::test]
    async fn unresolvable_channel_is_bad_request() {
        let app = app();
        let mut body = create_body();
        body["default_channel_name"] = json!("missing");

        let (status, _) = send(&app.router, Method::POST, "/connectors", Some(body)).await;

        assert_eq!(status, StatusCode::BAD_REQUEST);
    }

    #[tokio::test]
    async fn malformed_id_is_bad_request() {
        let app = app();

        let (status, _) = send(&app.router, Method::GET, "/connectors/not-an-id", None).await;

        assert_eq!(status, StatusCode::BAD_REQUEST);
        assert!(app.log.is_empty());
    }

    #[tokio::test]
    async fn empty_message_is_bad_request() {
        let app = app();
        let (_, created) =
            send(&app.router, Method::POST, "/connectors", Some(create_body())).await;
        let id = created["connector"]["id"].as_str().unwrap().to_string();

        let (status, _) = send(
            &app.router,
            Method::POST,
            &format!("/connectors/{id}/messages"),
            Some(json!({ "text": "" })),
        )
        .await;

        assert_eq!(status, StatusCode::BAD_REQUEST);
        assert_eq!(app.log.count(|c| matches!(c, Call::PostMessage { .. })), 0);
    }

    #[tokio::test]
    async fn internal_failure_hides_detail() {
        let log = CallLog::new();
        let orchestrator = ConnectorOrchestrator::new(
            Arc::new(InMemoryConnectorRepository::new(log.clone()).failing_create()),
            Arc::new(InMemorySecretStore::new(log.clone())),
            Arc::new(InMemoryMessaging::new(log).with_channel("general", "C999")),
        );
        let router = router(orchestrator, Duration::from_secs(5));

        let (status, body) = send(&router, Method::POST, "/connectors", Some(create_body())).await;

        assert_eq!(status, StatusCode::INTERNAL_SERVER_ERROR);
        assert_eq!(body, json!({ "error": "internal error" }));
    }
}
