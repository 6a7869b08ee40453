mod cli;

use anyhow::{Context, Result};
use clap::Parser;
use tracing::debug;

use ts_pkg_distro_core::config::{env_snapshot, load_dotenv};
use ts_pkg_distro_core::{apply_verbose_side_effects, verbose_requested, ArgMap, ConfigResolver};
use ts_pkg_distro_mcp::bootstrap;

use crate::cli::CliArgs;

#[tokio::main(flavor = "current_thread")]
async fn main() -> Result<()> {
    let cli = CliArgs::parse();
    load_dotenv();

    let args = ArgMap::parse(&cli.flags);

    // Verbose mode raises the log level, so it has to land before the
    // subscriber reads RUST_LOG.
    let verbose = verbose_requested(&args, &env_snapshot());
    apply_verbose_side_effects(verbose);

    // Stdout carries protocol messages; all logs go to stderr.
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new("info")),
        )
        .with_target(false)
        .with_writer(std::io::stderr)
        .init();

    if verbose {
        debug!("Verbose mode enabled");
    }

    let config = ConfigResolver::from_current_dir().resolve_args(&args, &env_snapshot(), None);
    config.log_summary();

    bootstrap::start(&config)
        .await
        .context("MCP server terminated with an error")?;

    Ok(())
}
