use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use serde_json::Value;
use std::fmt;

/// Describes a tool's interface for protocol peers.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ToolDefinition {
    /// Unique tool name (e.g., "get_guide", "list_guides")
    pub name: String,
    /// Human-readable description
    pub description: String,
    /// JSON Schema describing the expected input
    pub input_schema: Value,
}

/// Result of executing a tool.
///
/// Guide tools always produce text: unreadable files are replaced by the
/// loader's fallback body and navigation edges are plain messages.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ToolResult {
    /// Result content (markdown text)
    pub content: String,
}

impl ToolResult {
    pub fn text(content: impl Into<String>) -> Self {
        Self {
            content: content.into(),
        }
    }
}

/// The primary extension point: all tools implement this trait.
///
/// Tools are object-safe, Send + Sync, and async.
#[async_trait]
pub trait Tool: Send + Sync {
    /// Returns the tool's definition (name, description, JSON Schema).
    fn definition(&self) -> ToolDefinition;

    /// Execute the tool with the given JSON input.
    async fn execute(&self, input: Value) -> Result<ToolResult, ToolError>;
}

#[derive(Debug, thiserror::Error)]
pub enum ToolError {
    /// The caller broke the input contract (missing field, value outside the enum).
    #[error("Invalid input: {0}")]
    InvalidInput(String),
}

impl fmt::Display for ToolDefinition {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}({})", self.name, self.description)
    }
}

/// JSON Schema for a tool that takes no arguments.
pub fn empty_schema() -> Value {
    serde_json::json!({
        "type": "object",
        "properties": {}
    })
}

/// JSON Schema for a tool taking one required string restricted to `values`.
pub fn enum_schema(field: &str, description: &str, values: &[&str]) -> Value {
    serde_json::json!({
        "type": "object",
        "properties": {
            field: {
                "type": "string",
                "enum": values,
                "description": description
            }
        },
        "required": [field]
    })
}

/// Extract a required string field from tool input.
pub fn required_str<'a>(input: &'a Value, field: &str) -> Result<&'a str, ToolError> {
    input
        .get(field)
        .and_then(|v| v.as_str())
        .ok_or_else(|| ToolError::InvalidInput(format!("missing '{field}' field")))
}
