use serde::{Deserialize, Deserializer, Serialize};
use serde_json::Value;

/// JSON-RPC 2.0 ID, echoed back exactly as received.
///
/// Numbers keep their JSON form, so `1.5` or `18446744073709551615` come
/// back unchanged. An explicit `null` is an id too.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct RpcId(pub Value);

impl RpcId {
    /// Strings, numbers and `null` are the id shapes JSON-RPC allows.
    pub fn is_valid(&self) -> bool {
        matches!(self.0, Value::String(_) | Value::Number(_) | Value::Null)
    }
}

impl From<i64> for RpcId {
    fn from(id: i64) -> Self {
        Self(Value::from(id))
    }
}

impl From<&str> for RpcId {
    fn from(id: &str) -> Self {
        Self(Value::from(id))
    }
}

impl From<Value> for RpcId {
    fn from(id: Value) -> Self {
        Self(id)
    }
}

/// Maps a present `id` member, `null` included, to `Some`.
fn present_id<'de, D>(deserializer: D) -> Result<Option<RpcId>, D::Error>
where
    D: Deserializer<'de>,
{
    RpcId::deserialize(deserializer).map(Some)
}

/// JSON-RPC 2.0 request envelope.
///
/// Only an absent `id` member marks the message as a notification.
#[derive(Debug, Clone, Deserialize)]
pub struct JsonRpcRequest {
    pub jsonrpc: String,
    #[serde(default, deserialize_with = "present_id")]
    pub id: Option<RpcId>,
    pub method: String,
    #[serde(default)]
    pub params: Option<Value>,
}

impl JsonRpcRequest {
    pub fn is_notification(&self) -> bool {
        self.id.is_none()
    }
}

/// MCP `initialize` params.
///
/// Every field is optional: the announcement is accepted whatever the client
/// declares, only its shape is checked.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct InitializeParams {
    #[serde(rename = "protocolVersion")]
    pub protocol_version: Option<String>,
    pub capabilities: Option<Value>,
    #[serde(rename = "clientInfo")]
    pub client_info: Option<ClientInfo>,
}

/// Client information sent during `initialize`.
#[derive(Debug, Clone, Deserialize)]
pub struct ClientInfo {
    pub name: Option<String>,
    pub version: Option<String>,
}

/// Parameters for `tools/call`.
#[derive(Debug, Clone, Deserialize)]
pub struct ToolCallParams {
    pub name: String,
    #[serde(default)]
    pub arguments: Option<serde_json::Map<String, Value>>,
}

/// Arguments of the `send_message` tool, decoded after schema validation.
#[derive(Debug, Clone, Deserialize)]
pub struct SendMessageParams {
    pub identifier: String,
    pub message: String,
    #[serde(default)]
    pub thread_ts: Option<String>,
}
