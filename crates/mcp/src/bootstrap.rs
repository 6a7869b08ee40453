//! Builds the guide server from an effective config and runs its transport.

use std::fmt;
use std::sync::Arc;

use serde_json::Value;
use tracing::{debug, info, warn};

use ts_pkg_distro_core::EffectiveConfig;
use ts_pkg_distro_tool_runtime::{
    GetGuideTool, GuideLibrary, GuideResource, GuideTool, IndexResource, ListGuidesTool,
    NextGuideTool, ResourceRegistry, RootResource, ToolRegistry,
};

use crate::error::McpError;
use crate::http;
use crate::server::McpServer;
use crate::transport::StdioTransport;

/// Name reported when the config does not set one.
pub const DEFAULT_SERVER_NAME: &str = "TS-PKG-Distro";

pub const DEFAULT_HTTP_HOST: &str = "127.0.0.1";
pub const DEFAULT_HTTP_PORT: u16 = 8080;

/// The transport selected by `transport_type` and `transport_options`.
///
/// Both HTTP kinds are served by the same router; they differ in the
/// endpoint a client is pointed at.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum TransportKind {
    Stdio,
    /// `POST /mcp`, one JSON response per request.
    Http { host: String, port: u16 },
    /// `GET /sse` event stream plus `POST /messages`.
    Sse { host: String, port: u16 },
}

impl TransportKind {
    /// Unknown transport types fall back to stdio with a warning.
    pub fn from_config(config: &EffectiveConfig) -> Self {
        match config.transport_type.as_str() {
            "stdio" => TransportKind::Stdio,
            "http" | "httpStream" => {
                let (host, port) = http_address(config);
                TransportKind::Http { host, port }
            }
            "sse" => {
                let (host, port) = http_address(config);
                TransportKind::Sse { host, port }
            }
            other => {
                warn!(transport = %other, "Unsupported transport type, falling back to stdio");
                TransportKind::Stdio
            }
        }
    }
}

impl fmt::Display for TransportKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            TransportKind::Stdio => write!(f, "stdio"),
            TransportKind::Http { host, port } => write!(f, "http://{host}:{port}/mcp"),
            TransportKind::Sse { host, port } => write!(f, "http://{host}:{port}/sse"),
        }
    }
}

fn http_address(config: &EffectiveConfig) -> (String, u16) {
    let host = config
        .transport_option("host")
        .and_then(Value::as_str)
        .unwrap_or(DEFAULT_HTTP_HOST)
        .to_string();
    let port = config
        .transport_option("port")
        .and_then(port_from_value)
        .unwrap_or(DEFAULT_HTTP_PORT);
    (host, port)
}

fn port_from_value(value: &Value) -> Option<u16> {
    match value {
        Value::Number(n) => n.as_u64().and_then(|p| u16::try_from(p).ok()),
        Value::String(s) => s.parse().ok(),
        _ => None,
    }
}

/// Register one tool and one resource per guide, then the cross-cutting
/// tools (`get_guide`, `list_guides`, `get_next_guide`) and the root and
/// index resources.
pub fn build_server(
    config: &EffectiveConfig,
    library: Arc<GuideLibrary>,
) -> Result<McpServer, McpError> {
    let mut tools = ToolRegistry::new();
    let mut resources = ResourceRegistry::new();

    for entry in library.catalog().entries() {
        tools.register(GuideTool::new(entry, library.clone()))?;
        resources.register(GuideResource::new(entry, library.clone()))?;
    }

    tools.register(GetGuideTool::new(library.clone()))?;
    tools.register(ListGuidesTool::new(library.clone()))?;
    tools.register(NextGuideTool::new(library.clone()))?;

    if let Some(root) = RootResource::new(library.clone()) {
        resources.register(root)?;
    }
    resources.register(IndexResource::new(library))?;

    if let Some(version) = &config.server_version {
        debug!(configured = %version, "Ignoring configured server version; package version is reported");
    }

    let name = config
        .server_name
        .clone()
        .unwrap_or_else(|| DEFAULT_SERVER_NAME.to_string());

    debug!(
        tools = tools.len(),
        resources = resources.len(),
        "Registered guide tools and resources"
    );
    Ok(McpServer::new(tools, resources).with_name(name))
}

/// Build the server over the bundled guides and run it until the transport closes.
pub async fn start(config: &EffectiveConfig) -> Result<(), McpError> {
    start_with(config, Arc::new(GuideLibrary::standard())).await
}

pub async fn start_with(
    config: &EffectiveConfig,
    library: Arc<GuideLibrary>,
) -> Result<(), McpError> {
    let server = build_server(config, library)?;
    let kind = TransportKind::from_config(config);

    match kind {
        TransportKind::Stdio => {
            let mut transport = StdioTransport::new();
            announce(&server, &kind, config);
            server.run(&mut transport).await
        }
        TransportKind::Http { ref host, port } | TransportKind::Sse { ref host, port } => {
            let listener = http::bind(host, port).await?;
            announce(&server, &kind, config);
            info!("Listening on {}", kind);
            http::serve(Arc::new(server), listener).await
        }
    }
}

fn announce(server: &McpServer, kind: &TransportKind, config: &EffectiveConfig) {
    let transport = match kind {
        TransportKind::Stdio => "stdio",
        TransportKind::Http { .. } | TransportKind::Sse { .. } => config.transport_type.as_str(),
    };
    info!(
        "{} MCP server v{} running (transport: {})",
        server.name(),
        server.version(),
        transport
    );

    if config.is_verbose() {
        info!("Server started with name: {}", server.name());
        info!("Server version: {}", server.version());
        info!("Transport type: {}", config.transport_type);
        if let Some(org) = &config.npm_org {
            info!("npm organization: {}", org);
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::Map;

    fn with_transport(kind: &str, options: Option<Value>) -> EffectiveConfig {
        EffectiveConfig {
            transport_type: kind.to_string(),
            transport_options: options.and_then(|v| v.as_object().cloned()),
            ..EffectiveConfig::default()
        }
    }

    #[test]
    fn test_default_transport_is_stdio() {
        assert_eq!(
            TransportKind::from_config(&EffectiveConfig::default()),
            TransportKind::Stdio
        );
    }

    #[test]
    fn test_http_options() {
        let config = with_transport(
            "http",
            Some(serde_json::json!({"host": "0.0.0.0", "port": 9001})),
        );
        assert_eq!(
            TransportKind::from_config(&config),
            TransportKind::Http {
                host: "0.0.0.0".to_string(),
                port: 9001
            }
        );
    }

    #[test]
    fn test_sse_selects_event_stream_endpoint() {
        let config = with_transport("sse", Some(serde_json::json!({"port": 9100})));
        let kind = TransportKind::from_config(&config);
        assert_eq!(
            kind,
            TransportKind::Sse {
                host: DEFAULT_HTTP_HOST.to_string(),
                port: 9100
            }
        );
        assert_eq!(kind.to_string(), "http://127.0.0.1:9100/sse");
    }

    #[test]
    fn test_http_defaults_and_string_port() {
        let config = with_transport("httpStream", None);
        let kind = TransportKind::from_config(&config);
        assert_eq!(
            kind,
            TransportKind::Http {
                host: DEFAULT_HTTP_HOST.to_string(),
                port: DEFAULT_HTTP_PORT
            }
        );
        assert_eq!(kind.to_string(), "http://127.0.0.1:8080/mcp");

        let mut options = Map::new();
        options.insert("port".to_string(), Value::from("7070"));
        let config = EffectiveConfig {
            transport_type: "http".to_string(),
            transport_options: Some(options),
            ..EffectiveConfig::default()
        };
        assert!(matches!(
            TransportKind::from_config(&config),
            TransportKind::Http { port: 7070, .. }
        ));
    }

    #[test]
    fn test_unknown_transport_falls_back() {
        let config = with_transport("websocket", None);
        assert_eq!(TransportKind::from_config(&config), TransportKind::Stdio);
    }

    #[test]
    fn test_build_server_registrations() {
        let server =
            build_server(&EffectiveConfig::default(), Arc::new(GuideLibrary::standard())).unwrap();
        assert_eq!(server.name(), DEFAULT_SERVER_NAME);
        assert_eq!(server.version(), env!("CARGO_PKG_VERSION"));
        assert_eq!(server.tools().len(), 13);
        assert_eq!(server.resources().len(), 12);
        assert!(server.tools().get("get_orchestrator_guide").is_some());
        assert!(server.tools().get("get_npm_organizations_guide_guide").is_some());
        assert!(server.resources().get("ts-pkg-distro://").is_some());
        assert!(server.resources().get("ts-pkg-distro://resource/index").is_some());
    }

    #[test]
    fn test_configured_name_used() {
        let config = EffectiveConfig {
            server_name: Some("Custom".to_string()),
            server_version: Some("0.0.1".to_string()),
            ..EffectiveConfig::default()
        };
        let server = build_server(&config, Arc::new(GuideLibrary::standard())).unwrap();
        assert_eq!(server.name(), "Custom");
        assert_eq!(server.version(), env!("CARGO_PKG_VERSION"));
    }
}
