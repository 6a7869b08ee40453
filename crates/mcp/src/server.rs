//! MCP server implementation.
//!
//! Wraps a `ToolRegistry` and a `ResourceRegistry` and answers JSON-RPC
//! requests against them. Registrations are fixed once the server is built.

use serde::Serialize;
use serde_json::Value;

use ts_pkg_distro_tool_runtime::{ResourceRegistry, ToolError, ToolRegistry};

use crate::error::McpError;
use crate::transport::McpTransport;
use crate::types::*;

/// MCP server that exposes registered tools and resources.
pub struct McpServer {
    tools: ToolRegistry,
    resources: ResourceRegistry,
    server_name: String,
    server_version: String,
}

impl McpServer {
    pub fn new(tools: ToolRegistry, resources: ResourceRegistry) -> Self {
        Self {
            tools,
            resources,
            server_name: "ts-pkg-distro".to_string(),
            server_version: env!("CARGO_PKG_VERSION").to_string(),
        }
    }

    /// Set the server name.
    pub fn with_name(mut self, name: impl Into<String>) -> Self {
        self.server_name = name.into();
        self
    }

    pub fn name(&self) -> &str {
        &self.server_name
    }

    pub fn version(&self) -> &str {
        &self.server_version
    }

    pub fn tools(&self) -> &ToolRegistry {
        &self.tools
    }

    pub fn resources(&self) -> &ResourceRegistry {
        &self.resources
    }

    /// Run the server loop, reading from and writing to the transport.
    ///
    /// Processes JSON-RPC messages until the transport is closed.
    pub async fn run<T: McpTransport>(&self, transport: &mut T) -> Result<(), McpError> {
        tracing::debug!(server = %self.server_name, "MCP server loop starting");

        while let Some(line) = transport.receive().await? {
            if let Some(response) = self.handle_message(&line).await {
                let json = serde_json::to_string(&response)?;
                tracing::trace!(response = %json, "Sending response");
                transport.send(&json).await?;
            }
        }

        tracing::info!("Transport closed, shutting down");
        Ok(())
    }

    /// Handle one raw message. Notifications produce no response.
    pub async fn handle_message(&self, line: &str) -> Option<JsonRpcResponse> {
        tracing::trace!(message = %line, "Received message");

        // Distinguish requests (have "id") from notifications (no "id")
        // by parsing as generic Value first.
        let raw: Value = match serde_json::from_str(line) {
            Ok(v) => v,
            Err(e) => {
                tracing::warn!(error = %e, "Failed to parse JSON");
                return Some(error_response(RpcId::Null, McpError::JsonParse(e)));
            }
        };

        if !raw.is_object() {
            return Some(error_response(
                RpcId::Null,
                McpError::InvalidRequest("message is not a JSON object".to_string()),
            ));
        }

        if raw.get("id").is_none() {
            if let Ok(notif) = serde_json::from_value::<JsonRpcNotification>(raw) {
                self.handle_notification(&notif);
            }
            return None;
        }

        // Echo the id when it is usable, even if the rest of the request is not.
        let id = raw
            .get("id")
            .and_then(|v| serde_json::from_value::<RpcId>(v.clone()).ok())
            .unwrap_or(RpcId::Null);

        match serde_json::from_value::<JsonRpcRequest>(raw) {
            Ok(request) if request.id != RpcId::Null => Some(self.handle_request(&request).await),
            Ok(_) => Some(error_response(
                RpcId::Null,
                McpError::InvalidRequest("id must be a string or a number".to_string()),
            )),
            Err(e) => {
                tracing::warn!(error = %e, "Invalid JSON-RPC request");
                Some(error_response(id, McpError::InvalidRequest(e.to_string())))
            }
        }
    }

    /// Handle a single JSON-RPC request and produce a response.
    pub async fn handle_request(&self, request: &JsonRpcRequest) -> JsonRpcResponse {
        let id = request.id.clone();

        let outcome = match request.method.as_str() {
            "initialize" => to_result(self.handle_initialize(&request.params)),
            "ping" => Ok(serde_json::json!({})),
            "tools/list" => to_result(self.handle_list_tools()),
            "tools/call" => self
                .handle_call_tool(&request.params)
                .await
                .and_then(to_result),
            "resources/list" => to_result(self.handle_list_resources()),
            "resources/read" => self
                .handle_read_resource(&request.params)
                .await
                .and_then(to_result),
            method => {
                tracing::warn!(method = %method, "Unknown method");
                Err(McpError::MethodNotFound(method.to_string()))
            }
        };

        match outcome {
            Ok(val) => JsonRpcResponse::success(id, val),
            Err(err) => {
                let rpc = err.to_rpc_error();
                JsonRpcResponse::error(id, rpc.code, rpc.message)
            }
        }
    }

    fn handle_notification(&self, notif: &JsonRpcNotification) {
        match notif.method.as_str() {
            "notifications/initialized" => {
                tracing::info!("Client confirmed initialization");
            }
            "notifications/cancelled" => {
                tracing::debug!("Client cancelled a request");
            }
            method => {
                tracing::debug!(method = %method, "Unknown notification, ignoring");
            }
        }
    }

    fn handle_initialize(&self, params: &Option<Value>) -> InitializeResult {
        let client = params
            .as_ref()
            .and_then(|p| serde_json::from_value::<InitializeParams>(p.clone()).ok());
        match client {
            Some(p) => tracing::info!(
                client = %p.client_info.name,
                protocol = %p.protocol_version,
                "Handling initialize"
            ),
            None => tracing::info!("Handling initialize"),
        }

        InitializeResult {
            protocol_version: PROTOCOL_VERSION.to_string(),
            capabilities: ServerCapabilities {
                tools: Some(ToolsCapability { list_changed: false }),
                resources: Some(ResourcesCapability::default()),
            },
            server_info: ServerInfo {
                name: self.server_name.clone(),
                version: Some(self.server_version.clone()),
            },
        }
    }

    fn handle_list_tools(&self) -> ListToolsResult {
        tracing::debug!("Handling tools/list");
        ListToolsResult {
            tools: self.tools.list().into_iter().map(ToolInfo::from).collect(),
        }
    }

    async fn handle_call_tool(&self, params: &Option<Value>) -> Result<CallToolResult, McpError> {
        let params = params
            .as_ref()
            .ok_or_else(|| McpError::InvalidParams("missing params".to_string()))?;
        let call_params: CallToolParams = serde_json::from_value(params.clone())
            .map_err(|e| McpError::InvalidParams(e.to_string()))?;

        tracing::debug!(tool = %call_params.name, "Handling tools/call");

        let tool = self
            .tools
            .get(&call_params.name)
            .ok_or_else(|| McpError::ToolNotFound(call_params.name.clone()))?;

        match tool.execute(call_params.arguments).await {
            Ok(tool_result) => Ok(CallToolResult {
                content: vec![ToolContent::Text {
                    text: tool_result.content,
                }],
                is_error: false,
            }),
            Err(ToolError::InvalidInput(msg)) => Err(McpError::InvalidParams(msg)),
        }
    }

    fn handle_list_resources(&self) -> ListResourcesResult {
        tracing::debug!("Handling resources/list");
        ListResourcesResult {
            resources: self
                .resources
                .list()
                .into_iter()
                .map(ResourceInfo::from)
                .collect(),
        }
    }

    async fn handle_read_resource(
        &self,
        params: &Option<Value>,
    ) -> Result<ReadResourceResult, McpError> {
        let params = params
            .as_ref()
            .ok_or_else(|| McpError::InvalidParams("missing params".to_string()))?;
        let read: ReadResourceParams = serde_json::from_value(params.clone())
            .map_err(|e| McpError::InvalidParams(e.to_string()))?;

        tracing::debug!(uri = %read.uri, "Handling resources/read");

        let resource = self
            .resources
            .get(&read.uri)
            .ok_or_else(|| McpError::ResourceNotFound(read.uri.clone()))?;
        let def = resource.definition();

        Ok(ReadResourceResult {
            contents: vec![ResourceContents {
                uri: def.uri,
                mime_type: def.mime_type,
                text: resource.read().await,
            }],
        })
    }
}

fn to_result<T: Serialize>(value: T) -> Result<Value, McpError> {
    serde_json::to_value(value).map_err(McpError::JsonParse)
}

fn error_response(id: RpcId, err: McpError) -> JsonRpcResponse {
    JsonRpcResponse {
        jsonrpc: "2.0".to_string(),
        id,
        result: None,
        error: Some(err.to_rpc_error()),
    }
}
