//! MCP (Model Context Protocol) server for the packaging guides.
//!
//! Implements MCP over JSON-RPC 2.0 and serves the guide catalog as tools
//! and resources.
//!
//! # Architecture
//!
//! - **types**: JSON-RPC 2.0 and MCP-specific protocol types
//! - **transport**: Line transports (stdio, channels)
//! - **http**: HTTP and SSE transports on axum
//! - **server**: MCP server wrapping the tool and resource registries
//! - **bootstrap**: Builds the server from an `EffectiveConfig` and runs it
//! - **error**: Unified error types
//!
//! # Usage
//!
//! ```no_run
//! use ts_pkg_distro_core::EffectiveConfig;
//!
//! # async fn example() {
//! let config = EffectiveConfig::default();
//! ts_pkg_distro_mcp::bootstrap::start(&config).await.unwrap();
//! # }
//! ```

pub mod bootstrap;
pub mod error;
pub mod http;
pub mod server;
pub mod transport;
pub mod types;

pub use bootstrap::{build_server, start, start_with, TransportKind, DEFAULT_SERVER_NAME};
pub use error::McpError;
pub use server::McpServer;
pub use transport::{ChannelTransport, McpTransport, StdioTransport};
pub use types::*;
