//! MCP server for sending Slack messages.
//!
//! Exposes a `send_message` tool over JSON-RPC 2.0 stdio transport,
//! compatible with any MCP-aware AI agent. Message bodies are written in
//! Markdown and converted to Slack mrkdwn before posting.

pub mod config;
pub mod credentials;
pub mod handlers;
pub mod mrkdwn;
pub mod protocol;
pub mod server;
pub mod slack;
pub mod tools;

pub mod schema;
