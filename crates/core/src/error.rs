use std::path::PathBuf;

use thiserror::Error;

/// Failures while reading the optional JSON config file.
///
/// The resolver never propagates these: they are logged and the file is
/// treated as absent.
#[derive(Error, Debug)]
pub enum ConfigError {
    #[error("failed to read {path}: {source}")]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("failed to parse {path}: {source}")]
    Parse {
        path: PathBuf,
        #[source]
        source: serde_json::Error,
    },
}
