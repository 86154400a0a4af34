//! Slack Web API backed [`MessagingProvider`].
//!
//! Slack reports most failures as HTTP 200 with `"ok": false` and an
//! error code, so every response is checked for the `ok` flag before the
//! payload is decoded.

use crate::error::MessagingError;
use crate::messaging::MessagingProvider;
use async_trait::async_trait;
use connector_service_core::Result;
use futures::{Stream, TryStreamExt, stream};
use secrecy::{ExposeSecret, SecretString};
use serde::Deserialize;
use serde::de::{DeserializeOwned, IgnoredAny};
use serde_json::Value as JsonValue;
use std::pin::pin;
use std::time::Duration;
use tracing::{debug, instrument, warn};

const CONVERSATIONS_LIST: &str = "conversations.list";
const CHAT_POST_MESSAGE: &str = "chat.postMessage";

/// Channels requested per `conversations.list` page.
const PAGE_LIMIT: u32 = 200;

/// Slack client configuration.
#[derive(Debug, Clone, Deserialize)]
pub struct SlackConfig {
    /// Base URL of the Web API.
    #[serde(default = "default_base_url")]
    pub base_url: String,

    /// Per-request timeout in seconds.
    #[serde(default = "default_timeout_seconds")]
    pub timeout_seconds: u64,

    /// Upper bound on channel pages fetched while resolving a name.
    #[serde(default = "default_max_pages")]
    pub max_pages: usize,
}

fn default_base_url() -> String {
    "https://slack.com/api".to_string()
}

fn default_timeout_seconds() -> u64 {
    10
}

fn default_max_pages() -> usize {
    50
}

impl Default for SlackConfig {
    fn default() -> Self {
        Self {
            base_url: default_base_url(),
            timeout_seconds: default_timeout_seconds(),
            max_pages: default_max_pages(),
        }
    }
}

/// A conversation visible to the token.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
pub struct Channel {
    /// Provider channel id, e.g. `C0123456789`.
    pub id: String,
    /// Channel name without the leading `#`.
    pub name: String,
}

#[derive(Deserialize)]
struct ConversationsListResponse {
    #[serde(default)]
    channels: Vec<Channel>,
    #[serde(default)]
    response_metadata: Option<ResponseMetadata>,
}

#[derive(Deserialize)]
struct ResponseMetadata {
    #[serde(default)]
    next_cursor: String,
}

impl ConversationsListResponse {
    fn next_cursor(&self) -> Option<String> {
        self.response_metadata
            .as_ref()
            .map(|meta| meta.next_cursor.clone())
            .filter(|cursor| !cursor.is_empty())
    }
}

/// Position of a channel listing between pages.
enum PageCursor {
    Start,
    Next(String),
    Exhausted,
}

/// Slack Web API client.
#[derive(Debug, Clone)]
pub struct SlackClient {
    http: reqwest::Client,
    base_url: String,
    max_pages: usize,
}

impl SlackClient {
    /// Creates a client from configuration.
    ///
    /// # Errors
    ///
    /// Returns an error if the HTTP client cannot be built.
    pub fn new(config: &SlackConfig) -> Result<Self, MessagingError> {
        let http = reqwest::Client::builder()
            .timeout(Duration::from_secs(config.timeout_seconds))
            .build()
            .map_err(|e| MessagingError::RequestFailed {
                method: "client",
                reason: e.to_string(),
            })?;

        Ok(Self {
            http,
            base_url: config.base_url.trim_end_matches('/').to_string(),
            max_pages: config.max_pages,
        })
    }

    fn url(&self, method: &str) -> String {
        format!("{}/{method}", self.base_url)
    }

    /// Lists the channels visible to `token`, one page per item.
    ///
    /// The listing is fetched lazily: a page is requested only when the
    /// previous one has been consumed. It ends when Slack returns no
    /// further cursor or after `max_pages` pages. A listing cannot be
    /// resumed; call again to start over.
    pub fn channel_pages<'a>(
        &'a self,
        token: &'a SecretString,
    ) -> impl Stream<Item = Result<Vec<Channel>, MessagingError>> + 'a {
        stream::try_unfold((PageCursor::Start, 0usize), move |(cursor, fetched)| {
            self.next_page(token, cursor, fetched)
        })
    }

    async fn next_page(
        &self,
        token: &SecretString,
        cursor: PageCursor,
        fetched: usize,
    ) -> Result<Option<(Vec<Channel>, (PageCursor, usize))>, MessagingError> {
        let cursor = match cursor {
            PageCursor::Exhausted => return Ok(None),
            PageCursor::Start => None,
            PageCursor::Next(cursor) => Some(cursor),
        };

        if fetched >= self.max_pages {
            warn!(
                max_pages = self.max_pages,
                "channel listing stopped at page limit"
            );
            return Ok(None);
        }

        let page = self.list_conversations(token, cursor.as_deref()).await?;
        let next = match page.next_cursor() {
            Some(cursor) => PageCursor::Next(cursor),
            None => PageCursor::Exhausted,
        };

        Ok(Some((page.channels, (next, fetched + 1))))
    }

    async fn list_conversations(
        &self,
        token: &SecretString,
        cursor: Option<&str>,
    ) -> Result<ConversationsListResponse, MessagingError> {
        let mut query = vec![
            ("limit", PAGE_LIMIT.to_string()),
            ("exclude_archived", "true".to_string()),
            ("types", "public_channel,private_channel".to_string()),
        ];
        if let Some(cursor) = cursor {
            query.push(("cursor", cursor.to_string()));
        }

        let response = self
            .http
            .get(self.url(CONVERSATIONS_LIST))
            .bearer_auth(token.expose_secret())
            .query(&query)
            .send()
            .await
            .map_err(|e| MessagingError::RequestFailed {
                method: CONVERSATIONS_LIST,
                reason: e.to_string(),
            })?;

        decode(CONVERSATIONS_LIST, response).await
    }
}

/// Checks the HTTP status and the `ok` flag, then decodes the payload.
async fn decode<T: DeserializeOwned>(
    method: &'static str,
    response: reqwest::Response,
) -> Result<T, MessagingError> {
    let status = response.status();
    if !status.is_success() {
        let body = response.text().await.unwrap_or_default();
        return Err(MessagingError::Http {
            method,
            status: status.as_u16(),
            body,
        }
        .into());
    }

    let value: JsonValue = response
        .json()
        .await
        .map_err(|e| MessagingError::InvalidResponse {
            method,
            reason: e.to_string(),
        })?;

    if !value.get("ok").and_then(JsonValue::as_bool).unwrap_or(false) {
        let code = value
            .get("error")
            .and_then(JsonValue::as_str)
            .unwrap_or("unknown_error")
            .to_string();
        return Err(MessagingError::Api { method, code }.into());
    }

    serde_json::from_value(value).map_err(|e| {
        MessagingError::InvalidResponse {
            method,
            reason: e.to_string(),
        }
        .into()
    })
}

#[async_trait]
impl MessagingProvider for SlackClient {
    #[instrument(skip(self, token))]
    async fn resolve_channel(
        &self,
        token: &SecretString,
        name: &str,
    ) -> Result<String, MessagingError> {
        let wanted = name.strip_prefix('#').unwrap_or(name);
        let mut pages = pin!(self.channel_pages(token));

        while let Some(page) = pages.try_next().await? {
            if let Some(channel) = page.into_iter().find(|c| c.name == wanted) {
                debug!(channel_id = %channel.id, "channel resolved");
                return Ok(channel.id);
            }
        }

        Err(MessagingError::ChannelNotFound {
            name: wanted.to_string(),
        }
        .into())
    }

    #[instrument(skip(self, token, text))]
    async fn post_message(
        &self,
        token: &SecretString,
        channel_id: &str,
        text: &str,
    ) -> Result<(), MessagingError> {
        let response = self
            .http
            .post(self.url(CHAT_POST_MESSAGE))
            .bearer_auth(token.expose_secret())
            .json(&serde_json::json!({
                "channel": channel_id,
                "text": text,
            }))
            .send()
            .await
            .map_err(|e| MessagingError::RequestFailed {
                method: CHAT_POST_MESSAGE,
                reason: e.to_string(),
            })?;

        let _: IgnoredAny = decode(CHAT_POST_MESSAGE, response).await?;
        debug!("message posted");
        Ok(())
    }
}
