//! External capability providers used by the connector orchestrator.
//!
//! This crate provides:
//!
//! - **Secret store**: credential storage keyed by connector, backed by
//!   AWS Secrets Manager
//! - **Messaging provider**: channel resolution and message delivery,
//!   backed by the Slack Web API

pub mod aws;
pub mod error;
pub mod messaging;
pub mod secret;
pub mod slack;

pub use aws::{AwsSecretsManager, SecretsConfig};
pub use error::{MessagingError, SecretStoreError};
pub use messaging::MessagingProvider;
pub use secret::{SecretKey, SecretStore};
pub use slack::{Channel, SlackClient, SlackConfig};
