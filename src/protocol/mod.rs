pub mod request;
pub mod response;

pub use request::{
    ClientInfo, InitializeParams, JsonRpcRequest, RpcId, SendMessageParams, ToolCallParams,
};
pub use response::{
    JsonRpcError, JsonRpcResponse, ToolResult, ToolResultContent, INTERNAL_ERROR,
    INVALID_PARAMS, INVALID_REQUEST, METHOD_NOT_FOUND, PARSE_ERROR,
};
