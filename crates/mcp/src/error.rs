//! Error types for the MCP crate.

use ts_pkg_distro_tool_runtime::RegistryError;

use crate::types::{error_codes, JsonRpcError};

/// Errors that can occur during MCP operations.
#[derive(Debug, thiserror::Error)]
pub enum McpError {
    /// Failed to parse JSON.
    #[error("JSON parse error: {0}")]
    JsonParse(#[from] serde_json::Error),

    /// Transport I/O error.
    #[error("Transport error: {0}")]
    Transport(#[from] std::io::Error),

    /// Valid JSON that is not a JSON-RPC request.
    #[error("Invalid request: {0}")]
    InvalidRequest(String),

    /// The requested method is not supported.
    #[error("Method not found: {0}")]
    MethodNotFound(String),

    /// Invalid parameters for a method.
    #[error("Invalid params: {0}")]
    InvalidParams(String),

    /// The requested tool was not found in the registry.
    #[error("Tool not found: {0}")]
    ToolNotFound(String),

    /// No resource is registered under the URI.
    #[error("Resource not found: {0}")]
    ResourceNotFound(String),

    /// Two tools or resources share a name.
    #[error("Registration failed: {0}")]
    Registry(#[from] RegistryError),
}

impl McpError {
    /// Convert to a JSON-RPC error object.
    pub fn to_rpc_error(&self) -> JsonRpcError {
        let (code, message) = match self {
            McpError::JsonParse(_) => (error_codes::PARSE_ERROR, self.to_string()),
            McpError::InvalidRequest(_) => (error_codes::INVALID_REQUEST, self.to_string()),
            McpError::MethodNotFound(_) => (error_codes::METHOD_NOT_FOUND, self.to_string()),
            McpError::InvalidParams(_) => (error_codes::INVALID_PARAMS, self.to_string()),
            McpError::ToolNotFound(_) => (error_codes::INVALID_PARAMS, self.to_string()),
            McpError::ResourceNotFound(_) => (error_codes::INVALID_PARAMS, self.to_string()),
            _ => (error_codes::INTERNAL_ERROR, self.to_string()),
        };
        JsonRpcError {
            code,
            message,
            data: None,
        }
    }
}
