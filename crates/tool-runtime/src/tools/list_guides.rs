use async_trait::async_trait;
use serde_json::Value;
use std::sync::Arc;

use crate::library::GuideLibrary;
use crate::tool::{empty_schema, Tool, ToolDefinition, ToolError, ToolResult};

/// Lists every guide in reading order.
pub struct ListGuidesTool {
    library: Arc<GuideLibrary>,
}

impl ListGuidesTool {
    pub fn new(library: Arc<GuideLibrary>) -> Self {
        Self { library }
    }
}

#[async_trait]
impl Tool for ListGuidesTool {
    fn definition(&self) -> ToolDefinition {
        ToolDefinition {
            name: "list_guides".to_string(),
            description: "List all available guides".to_string(),
            input_schema: empty_schema(),
        }
    }

    async fn execute(&self, _input: Value) -> Result<ToolResult, ToolError> {
        Ok(ToolResult::text(self.library.list_markdown()))
    }
}
