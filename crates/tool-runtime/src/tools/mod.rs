//! Guide tools exposed over MCP.

mod get_guide;
mod guide;
mod list_guides;
mod next_guide;

pub use get_guide::GetGuideTool;
pub use guide::GuideTool;
pub use list_guides::ListGuidesTool;
pub use next_guide::NextGuideTool;
