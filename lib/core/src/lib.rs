//! Core types shared across the connector-service crates.
//!
//! This crate provides the `Result` alias used for layered error reports
//! and the strongly-typed identifiers of persisted entities.

pub mod error;
pub mod id;

pub use error::Result;
pub use id::{ConnectorId, ParseIdError};
