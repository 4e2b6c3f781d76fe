use std::sync::Arc;

use async_trait::async_trait;
use serde_json::{Map, Value};

use crate::mrkdwn::markdown_to_mrkdwn;
use crate::protocol::{SendMessageParams, ToolResult};
use crate::slack::{MessageSender, PostedMessage, SlackError, UserDirectory};
use crate::tools::{Tool, ToolHandler, ToolParam};

pub const TOOL_NAME: &str = "send_message";

#[derive(Debug, thiserror::Error)]
pub enum SendMessageError {
    #[error("failed to look up user '{email}': {source}")]
    Lookup {
        email: String,
        #[source]
        source: SlackError,
    },
    #[error("failed to send message: {0}")]
    Send(#[source] SlackError),
}

/// A failed send is a tool-level failure: the RPC itself still succeeds.
impl From<SendMessageError> for ToolResult {
    fn from(err: SendMessageError) -> Self {
        Self::error(format!("Error: {err}"))
    }
}

/// The `send_message` tool: resolve the destination, convert the Markdown
/// body to mrkdwn and post it.
pub struct SendMessageTool {
    directory: Arc<dyn UserDirectory>,
    sender: Arc<dyn MessageSender>,
}

impl SendMessageTool {
    pub fn new(directory: Arc<dyn UserDirectory>, sender: Arc<dyn MessageSender>) -> Self {
        Self { directory, sender }
    }

    pub fn definition() -> Tool {
        Tool {
            name: TOOL_NAME,
            description: "Send a message to a Slack channel or user. You can specify either a \
                channel ID or a user's email address. The message supports Markdown formatting \
                which will be automatically converted to Slack's Mrkdwn format.",
            params: vec![
                ToolParam::required(
                    "identifier",
                    "The Slack channel ID (e.g., 'C1234567890') or user email address \
                     (e.g., 'user@example.com')",
                ),
                ToolParam::required(
                    "message",
                    "The message to send. Supports Markdown formatting.",
                ),
                ToolParam::optional(
                    "thread_ts",
                    "Timestamp of the parent message to reply to in a thread. Omit to post \
                     a top-level message.",
                ),
            ],
        }
    }

    /// Destination id for an identifier: emails go through the user
    /// directory, anything else is taken as a channel id.
    async fn destination(&self, identifier: &str) -> Result<String, SendMessageError> {
        if !identifier.contains('@') {
            return Ok(identifier.to_string());
        }

        self.directory
            .resolve_by_email(identifier)
            .await
            .map_err(|source| SendMessageError::Lookup {
                email: identifier.to_string(),
                source,
            })
    }

    pub async fn send(&self, params: &SendMessageParams) -> Result<PostedMessage, SendMessageError> {
        let destination = self.destination(&params.identifier).await?;
        let text = markdown_to_mrkdwn(&params.message);

        self.sender
            .post(&destination, &text, params.thread_ts.as_deref())
            .await
            .map_err(SendMessageError::Send)
    }
}

fn delivery_summary(identifier: &str, posted: &PostedMessage) -> String {
    match &posted.ts {
        Some(ts) => format!(
            "Message sent successfully to {identifier} (channel {}, ts {ts})",
            posted.channel
        ),
        None => format!("Message sent successfully to {identifier}"),
    }
}

#[async_trait]
impl ToolHandler for SendMessageTool {
    async fn call(&self, arguments: Map<String, Value>) -> ToolResult {
        let params: SendMessageParams = match serde_json::from_value(Value::Object(arguments)) {
            Ok(p) => p,
            Err(e) => return ToolResult::error(format!("Error: invalid arguments for {TOOL_NAME}: {e}")),
        };

        match self.send(&params).await {
            Ok(posted) => {
                tracing::info!(channel = %posted.channel, threaded = params.thread_ts.is_some(), "message sent");
                ToolResult::text(delivery_summary(&params.identifier, &posted))
            }
            Err(err) => {
                tracing::warn!(identifier = %params.identifier, error = %err, "send_message failed");
                err.into()
            }
        }
    }
}
