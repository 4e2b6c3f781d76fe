use serde_json::{json, Value};

use super::{Dispatcher, HandlerFuture};
use crate::protocol::{JsonRpcError, ToolCallParams};

/// `tools/list`: every registered tool, in registration order.
pub fn list_tools<'a>(dispatcher: &'a Dispatcher, _: Option<&'a Value>) -> HandlerFuture<'a> {
    Box::pin(async move {
        let tools = dispatcher.registry.definitions();
        serde_json::to_value(&tools)
            .map(|tools| json!({ "tools": tools }))
            .map_err(|e| JsonRpcError::internal_error(format!("Cannot serialize tool list: {e}")))
    })
}

/// `tools/call`: look up the tool, validate its arguments, run it.
///
/// Unknown tools and bad arguments are protocol errors. Whatever the handler
/// returns, including a failed send, is the successful result.
pub fn call_tool<'a>(dispatcher: &'a Dispatcher, params: Option<&'a Value>) -> HandlerFuture<'a> {
    Box::pin(async move {
        let params: ToolCallParams = match params {
            Some(v) => serde_json::from_value(v.clone()).map_err(|e| {
                JsonRpcError::invalid_params(format!("Invalid tools/call params: {e}"))
            })?,
            None => return Err(JsonRpcError::invalid_params("Missing params for tools/call")),
        };

        let tool = dispatcher
            .registry
            .get(&params.name)
            .ok_or_else(|| JsonRpcError::tool_not_found(&params.name))?;

        let arguments = params.arguments.unwrap_or_default();
        tool.validate(&arguments).map_err(|e| {
            JsonRpcError::invalid_params(e.to_string())
                .with_data(json!({ "tool": params.name, "argument": e.argument() }))
        })?;

        let result = tool.call(arguments).await;
        tracing::info!(tool = %params.name, is_error = result.is_error, "tool call finished");

        serde_json::to_value(&result)
            .map_err(|e| JsonRpcError::internal_error(format!("Cannot serialize tool result: {e}")))
    })
}
