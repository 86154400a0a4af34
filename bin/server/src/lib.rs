//! HTTP server for the connector lifecycle service.
//!
//! Wires the [`ConnectorOrchestrator`](connector_service_connector::ConnectorOrchestrator)
//! to AWS Secrets Manager, the Slack Web API and PostgreSQL, and exposes
//! it over HTTP.

pub mod config;
pub mod db;
pub mod error;
pub mod routes;
