use async_trait::async_trait;
use serde_json::Value;
use std::sync::Arc;
use tracing::debug;

use crate::library::GuideLibrary;
use crate::tool::{enum_schema, required_str, Tool, ToolDefinition, ToolError, ToolResult};

/// Returns the guide that follows `current_guide`.
///
/// Reaching the end of the sequence, or naming an unknown guide, is answered
/// with a plain message rather than an error.
pub struct NextGuideTool {
    library: Arc<GuideLibrary>,
}

impl NextGuideTool {
    pub fn new(library: Arc<GuideLibrary>) -> Self {
        Self { library }
    }
}

#[async_trait]
impl Tool for NextGuideTool {
    fn definition(&self) -> ToolDefinition {
        let ids: Vec<&str> = self.library.catalog().ids().collect();
        ToolDefinition {
            name: "get_next_guide".to_string(),
            description: "Get the next guide in sequence after the current one".to_string(),
            input_schema: enum_schema("current_guide", "The name of the current guide", &ids),
        }
    }

    async fn execute(&self, input: Value) -> Result<ToolResult, ToolError> {
        let current = required_str(&input, "current_guide")?;
        debug!(current = %current, "get_next_guide");
        Ok(ToolResult::text(self.library.next_guide_markdown(current)))
    }
}
