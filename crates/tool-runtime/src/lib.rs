pub mod library;
pub mod registry;
pub mod resource;
pub mod resources;
pub mod tool;
pub mod tools;

pub use library::GuideLibrary;
pub use registry::{RegistryError, ResourceRegistry, ToolRegistry};
pub use resource::{Resource, ResourceDefinition};
pub use resources::{GuideResource, IndexResource, RootResource};
pub use tool::{Tool, ToolDefinition, ToolError, ToolResult};
pub use tools::{GetGuideTool, GuideTool, ListGuidesTool, NextGuideTool};
