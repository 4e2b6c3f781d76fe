pub mod lifecycle;
pub mod send_message;
pub mod tool_calls;

use std::collections::{HashMap, HashSet};
use std::future::Future;
use std::pin::Pin;
use std::sync::Arc;

use serde_json::Value;

use crate::protocol::{JsonRpcError, JsonRpcRequest, JsonRpcResponse};
use crate::slack::{MessageSender, UserDirectory};
use crate::tools::{RegistryError, ToolRegistry};

use self::send_message::SendMessageTool;

/// Outcome of a method handler: the `result` value or a protocol error.
pub type HandlerFuture<'a> = Pin<Box<dyn Future<Output = Result<Value, JsonRpcError>> + 'a>>;

/// Entry in the method table.
pub type MethodHandler = for<'a> fn(&'a Dispatcher, Option<&'a Value>) -> HandlerFuture<'a>;

/// Routes parsed JSON-RPC requests to handlers through a method-name table.
///
/// Holds no session state: the only thing it owns is the immutable tool
/// registry, so repeated `initialize` calls are harmless.
pub struct Dispatcher {
    registry: ToolRegistry,
    methods: HashMap<&'static str, MethodHandler>,
    notifications: HashSet<&'static str>,
}

impl Dispatcher {
    pub fn new(registry: ToolRegistry) -> Self {
        let mut methods: HashMap<&'static str, MethodHandler> = HashMap::new();
        methods.insert("initialize", lifecycle::initialize);
        methods.insert("ping", lifecycle::ping);
        methods.insert("tools/list", tool_calls::list_tools);
        methods.insert("tools/call", tool_calls::call_tool);

        Self {
            registry,
            methods,
            notifications: lifecycle::NOTIFICATIONS.iter().copied().collect(),
        }
    }

    pub fn registry(&self) -> &ToolRegistry {
        &self.registry
    }

    /// Parse one raw message and dispatch it.
    ///
    /// Returns `None` for notifications. Unparseable input yields a
    /// parse error response with a `null` id.
    pub async fn handle_message(&self, raw: &[u8]) -> Option<JsonRpcResponse> {
        let req: JsonRpcRequest = match serde_json::from_slice(raw) {
            Ok(r) => r,
            Err(e) => {
                tracing::warn!(error = %e, "parse error");
                return Some(JsonRpcResponse::error(None, JsonRpcError::parse_error()));
            }
        };

        self.dispatch(&req).await
    }

    /// Dispatch a JSON-RPC request to the appropriate handler.
    ///
    /// Returns `None` for notifications (no response required).
    pub async fn dispatch(&self, req: &JsonRpcRequest) -> Option<JsonRpcResponse> {
        if req.id.as_ref().is_some_and(|id| !id.is_valid()) {
            tracing::warn!(method = %req.method, "request id is neither string, number nor null");
            return Some(JsonRpcResponse::error(
                None,
                JsonRpcError::invalid_request("Invalid Request: id must be a string, number or null"),
            ));
        }

        if req.jsonrpc != "2.0" {
            tracing::warn!(version = %req.jsonrpc, method = %req.method, "unsupported jsonrpc version");
            if req.is_notification() {
                return None;
            }
            return Some(JsonRpcResponse::error(
                req.id.clone(),
                JsonRpcError::invalid_request("Invalid Request: jsonrpc must be \"2.0\""),
            ));
        }

        if req.is_notification() {
            if self.notifications.contains(req.method.as_str()) {
                tracing::debug!(method = %req.method, "notification received");
            } else {
                tracing::debug!(method = %req.method, "ignoring unsolicited notification");
            }
            return None;
        }

        tracing::debug!(method = %req.method, id = ?req.id, "request");

        let outcome = match self.methods.get(req.method.as_str()) {
            Some(handler) => handler(self, req.params.as_ref()).await,
            None => Err(JsonRpcError::method_not_found(&req.method)),
        };

        if let Err(err) = &outcome {
            tracing::info!(method = %req.method, code = err.code, message = %err.message, "request failed");
        }

        Some(JsonRpcResponse::from_outcome(req.id.clone(), outcome))
    }
}

/// Registry holding the `send_message` tool wired to the given collaborators.
pub fn default_registry(
    directory: Arc<dyn UserDirectory>,
    sender: Arc<dyn MessageSender>,
) -> Result<ToolRegistry, RegistryError> {
    let mut registry = ToolRegistry::new();
    registry.register(
        SendMessageTool::definition(),
        Arc::new(SendMessageTool::new(directory, sender)),
    )?;
    Ok(registry)
}
