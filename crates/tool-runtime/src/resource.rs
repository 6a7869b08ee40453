use async_trait::async_trait;
use serde::{Deserialize, Serialize};

pub const MARKDOWN_MIME: &str = "text/markdown";

/// Describes a readable resource.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ResourceDefinition {
    pub uri: String,
    pub name: String,
    pub description: Option<String>,
    pub mime_type: String,
}

/// A URI-addressable document. Reads never fail; missing content is
/// reported inside the returned text.
#[async_trait]
pub trait Resource: Send + Sync {
    fn definition(&self) -> ResourceDefinition;

    async fn read(&self) -> String;
}
