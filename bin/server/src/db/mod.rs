//! Database repositories for the connector service.

pub mod connector;

pub use connector::PgConnectorRepository;
