//! Slack Web API collaborators.
//!
//! The tool handler only sees the [`UserDirectory`] and [`MessageSender`]
//! traits; [`SlackClient`] implements both over HTTP.

use std::fmt;

use async_trait::async_trait;
use serde::{Deserialize, Serialize};

use crate::config::ServerConfig;

#[derive(Debug, thiserror::Error)]
pub enum SlackError {
    #[error("HTTP request failed: {0}")]
    Http(#[from] reqwest::Error),
    #[error("HTTP {0}")]
    Status(u16),
    #[error("slack API error: {0}")]
    Api(String),
    #[error("user '{0}' not found")]
    UserNotFound(String),
}

/// A message accepted by Slack.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PostedMessage {
    pub channel: String,
    /// Remote timestamp, which doubles as the message id.
    pub ts: Option<String>,
}

/// Resolves a user's email address to a conversation Slack accepts as a
/// `chat.postMessage` channel.
#[async_trait]
pub trait UserDirectory: Send + Sync {
    async fn resolve_by_email(&self, email: &str) -> Result<String, SlackError>;
}

/// Posts a message to a channel, optionally as a threaded reply.
#[async_trait]
pub trait MessageSender: Send + Sync {
    async fn post(
        &self,
        destination: &str,
        text: &str,
        thread_ts: Option<&str>,
    ) -> Result<PostedMessage, SlackError>;
}

#[derive(Debug, Deserialize)]
struct LookupResponse {
    ok: bool,
    #[serde(default)]
    error: Option<String>,
    #[serde(default)]
    user: Option<SlackUser>,
}

#[derive(Debug, Deserialize)]
struct SlackUser {
    #[serde(default)]
    id: String,
}

#[derive(Debug, Serialize)]
struct PostMessageRequest<'a> {
    channel: &'a str,
    text: &'a str,
    #[serde(skip_serializing_if = "Option::is_none")]
    thread_ts: Option<&'a str>,
    mrkdwn: bool,
}

#[derive(Debug, Deserialize)]
struct PostMessageResponse {
    ok: bool,
    #[serde(default)]
    error: Option<String>,
    #[serde(default)]
    channel: Option<String>,
    #[serde(default)]
    ts: Option<String>,
}

fn api_error(error: Option<String>) -> SlackError {
    SlackError::Api(
        error
            .filter(|e| !e.is_empty())
            .unwrap_or_else(|| "unknown error".to_string()),
    )
}

/// Slack Web API client authenticated with a bot or user token.
///
/// Built once at startup and shared with the tool handler.
pub struct SlackClient {
    http: reqwest::Client,
    api_url: String,
    token: String,
}

impl fmt::Debug for SlackClient {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("SlackClient")
            .field("api_url", &self.api_url)
            .finish_non_exhaustive()
    }
}

impl SlackClient {
    pub fn new(token: impl Into<String>, config: &ServerConfig) -> Result<Self, SlackError> {
        let http = reqwest::Client::builder()
            .timeout(config.request_timeout)
            .user_agent(concat!("slack-mcp-server/", env!("CARGO_PKG_VERSION")))
            .build()?;

        Ok(Self {
            http,
            api_url: config.api_url.trim_end_matches('/').to_string(),
            token: token.into(),
        })
    }

    fn endpoint(&self, method: &str) -> String {
        format!("{}/{method}", self.api_url)
    }
}

#[async_trait]
impl UserDirectory for SlackClient {
    async fn resolve_by_email(&self, email: &str) -> Result<String, SlackError> {
        let resp = self
            .http
            .get(self.endpoint("users.lookupByEmail"))
            .query(&[("email", email)])
            .bearer_auth(&self.token)
            .send()
            .await?;

        let status = resp.status();
        if !status.is_success() {
            return Err(SlackError::Status(status.as_u16()));
        }

        let body: LookupResponse = resp.json().await?;
        if !body.ok {
            return Err(api_error(body.error));
        }

        match body.user {
            Some(user) if !user.id.is_empty() => {
                tracing::debug!(email, user_id = %user.id, "resolved user by email");
                Ok(user.id)
            }
            _ => Err(SlackError::UserNotFound(email.to_string())),
        }
    }
}

#[async_trait]
impl MessageSender for SlackClient {
    async fn post(
        &self,
        destination: &str,
        text: &str,
        thread_ts: Option<&str>,
    ) -> Result<PostedMessage, SlackError> {
        let payload = PostMessageRequest {
            channel: destination,
            text,
            thread_ts,
            mrkdwn: true,
        };

        let resp = self
            .http
            .post(self.endpoint("chat.postMessage"))
            .bearer_auth(&self.token)
            .json(&payload)
            .send()
            .await?;

        let status = resp.status();
        if !status.is_success() {
            return Err(SlackError::Status(status.as_u16()));
        }

        let body: PostMessageResponse = resp.json().await?;
        if !body.ok {
            return Err(api_error(body.error));
        }

        Ok(PostedMessage {
            channel: body.channel.unwrap_or_else(|| destination.to_string()),
            ts: body.ts,
        })
    }
}
