use serde_json::{json, Value};

use super::{Dispatcher, HandlerFuture};
use crate::protocol::{InitializeParams, JsonRpcError};

/// MCP protocol revision this server speaks.
pub const PROTOCOL_VERSION: &str = "2024-11-05";

pub const SERVER_NAME: &str = "slack-cli-mcp-server";
pub const SERVER_VERSION: &str = env!("CARGO_PKG_VERSION");

/// Notifications the server understands. They never get a response.
pub const NOTIFICATIONS: &[&str] = &["notifications/initialized", "notifications/cancelled"];

/// `initialize`: accept the client's announcement and describe the server.
///
/// The result does not depend on what the client declares.
pub fn initialize<'a>(_: &'a Dispatcher, params: Option<&'a Value>) -> HandlerFuture<'a> {
    Box::pin(async move {
        let params: InitializeParams = match params {
            Some(Value::Null) | None => InitializeParams::default(),
            Some(v) => serde_json::from_value(v.clone()).map_err(|e| {
                JsonRpcError::invalid_params(format!("Invalid initialize params: {e}"))
            })?,
        };

        let client = params.client_info.as_ref();
        tracing::info!(
            client = client.and_then(|c| c.name.as_deref()).unwrap_or("unknown"),
            client_version = client.and_then(|c| c.version.as_deref()).unwrap_or("unknown"),
            requested_protocol = params.protocol_version.as_deref().unwrap_or("unspecified"),
            "initialize"
        );

        Ok(json!({
            "protocolVersion": PROTOCOL_VERSION,
            "capabilities": {
                "tools": {}
            },
            "serverInfo": {
                "name": SERVER_NAME,
                "version": SERVER_VERSION
            }
        }))
    })
}

/// `ping`: liveness check with an empty result.
pub fn ping<'a>(_: &'a Dispatcher, _: Option<&'a Value>) -> HandlerFuture<'a> {
    Box::pin(std::future::ready(Ok(json!({}))))
}
