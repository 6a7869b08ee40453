//! Reads guide markdown from the bundled resources directory.

use std::path::{Path, PathBuf};

use tracing::{debug, error, warn};

/// Directory shipped alongside this crate's sources.
const CRATE_MARKDOWN_DIR: &str = concat!(env!("CARGO_MANIFEST_DIR"), "/markdown");

#[derive(Debug, thiserror::Error)]
#[error("failed to read markdown resource {}: {source}", path.display())]
pub struct LoadError {
    pub path: PathBuf,
    #[source]
    pub source: std::io::Error,
}

/// Body returned in place of a guide that could not be read.
pub fn fallback_body(filename: &str) -> String {
    format!("# Error\n\nUnable to load {filename} resource.")
}

/// Loads markdown files by name from a fixed directory.
#[derive(Debug, Clone)]
pub struct MarkdownLoader {
    dir: PathBuf,
}

impl MarkdownLoader {
    pub fn new(dir: impl Into<PathBuf>) -> Self {
        Self { dir: dir.into() }
    }

    /// `markdown/` next to the running executable if present, otherwise the
    /// directory bundled with this crate's sources.
    ///
    /// An installed binary must ship `markdown/` beside itself; the source
    /// directory only exists on the machine that built it.
    pub fn bundled() -> Self {
        let beside_exe = std::env::current_exe()
            .ok()
            .and_then(|exe| exe.parent().map(|p| p.join("markdown")));
        Self::new(locate_dir(beside_exe, PathBuf::from(CRATE_MARKDOWN_DIR)))
    }

    pub fn dir(&self) -> &Path {
        &self.dir
    }

    pub fn try_load(&self, filename: &str) -> Result<String, LoadError> {
        let path = self.dir.join(filename);
        std::fs::read_to_string(&path).map_err(|source| LoadError { path, source })
    }

    /// Read `filename`, substituting [`fallback_body`] on any I/O failure.
    pub fn load(&self, filename: &str) -> String {
        match self.try_load(filename) {
            Ok(text) => text,
            Err(e) => {
                error!(resource = %filename, error = %e, "Error reading markdown resource");
                fallback_body(filename)
            }
        }
    }
}

/// First existing directory of `beside_exe` and `source_dir`. When neither
/// exists every guide will be served as its fallback body, so say so loudly.
fn locate_dir(beside_exe: Option<PathBuf>, source_dir: PathBuf) -> PathBuf {
    if let Some(dir) = beside_exe.as_ref().filter(|dir| dir.is_dir()) {
        debug!(dir = %dir.display(), "Using markdown directory beside executable");
        return dir.clone();
    }
    if source_dir.is_dir() {
        debug!(dir = %source_dir.display(), "Using bundled markdown directory");
        return source_dir;
    }

    let dir = beside_exe.unwrap_or(source_dir);
    warn!(
        dir = %dir.display(),
        "Markdown directory not found; install it as `markdown/` next to the executable"
    );
    dir
}

impl Default for MarkdownLoader {
    fn default() -> Self {
        Self::bundled()
    }
}
