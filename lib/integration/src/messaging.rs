//! Messaging provider abstraction.

use crate::error::MessagingError;
use async_trait::async_trait;
use connector_service_core::Result;
use secrecy::SecretString;

/// Trait for messaging providers.
///
/// Every call authenticates with the caller-supplied access token; the
/// provider holds no per-connector state.
#[async_trait]
pub trait MessagingProvider: Send + Sync {
    /// Resolves a human-readable channel name to the provider's channel id.
    ///
    /// # Errors
    ///
    /// Returns [`MessagingError::ChannelNotFound`] if no channel matches, or
    /// another variant if the provider call fails.
    async fn resolve_channel(&self, token: &SecretString, name: &str)
    -> Result<String, MessagingError>;

    /// Posts a plain-text message to a channel.
    ///
    /// # Errors
    ///
    /// Returns an error if the provider rejects or fails the call.
    async fn post_message(
        &self,
        token: &SecretString,
        channel_id: &str,
        text: &str,
    ) -> Result<(), MessagingError>;
}
