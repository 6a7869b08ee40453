use async_trait::async_trait;
use serde_json::Value;
use std::sync::Arc;

use ts_pkg_distro_catalog::GuideEntry;

use crate::library::GuideLibrary;
use crate::tool::{empty_schema, Tool, ToolDefinition, ToolError, ToolResult};

/// Returns one fixed guide. One instance is registered per catalog entry.
pub struct GuideTool {
    entry: &'static GuideEntry,
    library: Arc<GuideLibrary>,
}

impl GuideTool {
    pub fn new(entry: &'static GuideEntry, library: Arc<GuideLibrary>) -> Self {
        Self { entry, library }
    }
}

#[async_trait]
impl Tool for GuideTool {
    fn definition(&self) -> ToolDefinition {
        ToolDefinition {
            name: self.entry.tool_name(),
            description: format!("Get the {} guide content", self.entry.display_name()),
            input_schema: empty_schema(),
        }
    }

    async fn execute(&self, _input: Value) -> Result<ToolResult, ToolError> {
        Ok(ToolResult::text(self.library.guide_markdown(self.entry)))
    }
}
