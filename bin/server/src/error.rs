//! HTTP rendering of connector errors.
//!
//! Only the classification and its user-safe message reach the response.
//! The full report, including collaborator detail, has already been
//! logged by the orchestrator.

use axum::Json;
use axum::extract::rejection::JsonRejection;
use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use connector_service_connector::{ConnectorError, ErrorKind};
use rootcause::prelude::Report;
use serde_json::json;

/// A failed request, rendered as `{"error": "<message>"}`.
#[derive(Debug)]
pub struct ApiError(Report<ConnectorError>);

impl ApiError {
    /// Returns the classified error.
    #[must_use]
    pub fn error(&self) -> &ConnectorError {
        self.0.current_context()
    }

    /// Returns the status code for the error's kind.
    #[must_use]
    pub fn status(&self) -> StatusCode {
        match self.error().kind() {
            ErrorKind::InvalidArgument => StatusCode::BAD_REQUEST,
            ErrorKind::NotFound => StatusCode::NOT_FOUND,
            ErrorKind::AlreadyExists => StatusCode::CONFLICT,
            ErrorKind::Internal => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }
}

impl From<Report<ConnectorError>> for ApiError {
    fn from(report: Report<ConnectorError>) -> Self {
        Self(report)
    }
}

impl From<JsonRejection> for ApiError {
    fn from(rejection: JsonRejection) -> Self {
        Self(Report::from(ConnectorError::InvalidArgument {
            reason: rejection.body_text(),
        }))
    }
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        let body = Json(json!({ "error": self.error().message() }));
        (self.status(), body).into_response()
    }
}
