use clap::Parser;

/// MCP server serving guides for packaging a TypeScript project for npm.
///
/// Flags are accepted as `--name=value`, `--name value`, or a bare `--name`
/// (meaning `true`). Unrecognised flags are ignored.
#[derive(Parser, Debug)]
#[command(
    name = "ts-pkg-distro",
    version,
    about = "MCP server for TypeScript package distribution guides",
    after_help = "Flags:\n  \
        --config <path>           Config file (default: ./mcp-config.json)\n  \
        --server-name <name>      Name reported to clients\n  \
        --transport-type <type>   stdio (default), http, httpStream, or sse\n  \
        --transport-host <host>   Bind host for the http transport\n  \
        --transport-port <port>   Bind port for the http transport\n  \
        --npm-org <org>           npm organization\n  \
        --verbose                 Trace-level logging\n\n\
        Environment variables prefixed with TS_PKG_DISTRO_ override the config file;\n\
        flags override both."
)]
pub struct CliArgs {
    /// Configuration flags
    #[arg(
        trailing_var_arg = true,
        allow_hyphen_values = true,
        value_name = "FLAGS"
    )]
    pub flags: Vec<String>,
}
