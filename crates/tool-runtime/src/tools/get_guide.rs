use async_trait::async_trait;
use serde_json::Value;
use std::sync::Arc;
use tracing::debug;

use crate::library::GuideLibrary;
use crate::tool::{enum_schema, required_str, Tool, ToolDefinition, ToolError, ToolResult};

/// Returns a guide chosen by id. Ids outside the catalog are rejected.
pub struct GetGuideTool {
    library: Arc<GuideLibrary>,
}

impl GetGuideTool {
    pub fn new(library: Arc<GuideLibrary>) -> Self {
        Self { library }
    }
}

#[async_trait]
impl Tool for GetGuideTool {
    fn definition(&self) -> ToolDefinition {
        let ids: Vec<&str> = self.library.catalog().ids().collect();
        ToolDefinition {
            name: "get_guide".to_string(),
            description: "Get a specific guide by name".to_string(),
            input_schema: enum_schema("guide", "The name of the guide to retrieve", &ids),
        }
    }

    async fn execute(&self, input: Value) -> Result<ToolResult, ToolError> {
        let id = required_str(&input, "guide")?;
        debug!(guide = %id, "get_guide");

        self.library
            .guide_by_id(id)
            .map(ToolResult::text)
            .ok_or_else(|| ToolError::InvalidInput(format!("unknown guide '{id}'")))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use ts_pkg_distro_catalog::{Catalog, MarkdownLoader};

    fn tool(dir: &std::path::Path) -> GetGuideTool {
        GetGuideTool::new(Arc::new(GuideLibrary::new(
            Catalog::standard(),
            MarkdownLoader::new(dir),
        )))
    }

    #[test]
    fn test_schema_lists_every_id() {
        let dir = tempfile::tempdir().unwrap();
        let def = tool(dir.path()).definition();
        let values = def.input_schema["properties"]["guide"]["enum"]
            .as_array()
            .unwrap()
            .len();
        assert_eq!(values, 10);
    }

    #[tokio::test]
    async fn test_known_guide() {
        let dir = tempfile::tempdir().unwrap();
        std::fs::write(dir.path().join("08-Publishing-to-npm.md"), "publish").unwrap();
        let result = tool(dir.path())
            .execute(serde_json::json!({"guide": "publishing-to-npm"}))
            .await
            .unwrap();
        assert_eq!(result.content, "publish");
    }

    #[tokio::test]
    async fn test_unknown_guide_is_invalid_input() {
        let dir = tempfile::tempdir().unwrap();
        let err = tool(dir.path())
            .execute(serde_json::json!({"guide": "nope"}))
            .await
            .unwrap_err();
        assert!(matches!(err, ToolError::InvalidInput(_)));
    }

    #[tokio::test]
    async fn test_missing_argument_is_invalid_input() {
        let dir = tempfile::tempdir().unwrap();
        let err = tool(dir.path()).execute(serde_json::json!({})).await.unwrap_err();
        assert!(matches!(err, ToolError::InvalidInput(_)));
    }
}
