use std::collections::BTreeMap;
use std::env;
use std::path::{Path, PathBuf};

use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};
use tracing::{debug, info, warn};

use crate::args::{parse_bool, ArgMap};
use crate::error::ConfigError;

/// Prefix for environment variables that feed the config.
pub const ENV_PREFIX: &str = "TS_PKG_DISTRO_";

/// Dedicated verbose switch, also exported to child processes.
pub const VERBOSE_ENV: &str = "TS_PKG_DISTRO_VERBOSE";

/// Log-level variable read by the tracing `EnvFilter`.
pub const LOG_LEVEL_ENV: &str = "RUST_LOG";

/// Config file looked up in the working directory when `--config` is absent.
pub const DEFAULT_CONFIG_FILE: &str = "mcp-config.json";

pub const DEFAULT_TRANSPORT: &str = "stdio";

/// Snapshot of the process environment handed to the resolver.
pub type EnvVars = BTreeMap<String, String>;

/// Load .env file (silently ignores if missing).
pub fn load_dotenv() {
    dotenvy::dotenv().ok();
}

/// Capture the current process environment.
pub fn env_snapshot() -> EnvVars {
    env::vars().collect()
}

// ── Effective config ──────────────────────────────────────────

/// The merged result of defaults, config file, environment, and CLI flags.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct EffectiveConfig {
    pub server_name: Option<String>,
    pub server_version: Option<String>,
    pub transport_type: String,
    pub transport_options: Option<Map<String, Value>>,
    pub npm_org: Option<String>,
    pub verbose: Option<bool>,
}

impl Default for EffectiveConfig {
    fn default() -> Self {
        Self {
            server_name: None,
            server_version: None,
            transport_type: DEFAULT_TRANSPORT.to_string(),
            transport_options: None,
            npm_org: None,
            verbose: None,
        }
    }
}

impl EffectiveConfig {
    pub fn is_verbose(&self) -> bool {
        self.verbose.unwrap_or(false)
    }

    pub fn transport_option(&self, key: &str) -> Option<&Value> {
        self.transport_options.as_ref().and_then(|opts| opts.get(key))
    }

    /// Print a summary for startup logs.
    pub fn log_summary(&self) {
        debug!("Effective configuration:");
        debug!("  server:     name={}", self.server_name.as_deref().unwrap_or("(default)"));
        debug!("  transport:  type={}", self.transport_type);
        if let Some(opts) = &self.transport_options {
            debug!(options = ?opts, "  transport options");
        }
        debug!("  npm-org:    {}", self.npm_org.as_deref().unwrap_or("(none)"));
        debug!("  verbose:    {}", self.is_verbose());
    }
}

// ── Layers ────────────────────────────────────────────────────

/// A partial update produced by one config source.
///
/// Applying a layer only touches the fields it sets; transport options are
/// merged key by key.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct ConfigLayer {
    pub server_name: Option<String>,
    pub server_version: Option<String>,
    pub transport_type: Option<String>,
    pub transport_options: Map<String, Value>,
    pub npm_org: Option<String>,
    pub verbose: Option<bool>,
}

impl ConfigLayer {
    pub fn apply(self, config: &mut EffectiveConfig) {
        if let Some(name) = self.server_name {
            config.server_name = Some(name);
        }
        if let Some(version) = self.server_version {
            config.server_version = Some(version);
        }
        if let Some(kind) = self.transport_type {
            config.transport_type = kind;
        }
        if !self.transport_options.is_empty() {
            config
                .transport_options
                .get_or_insert_with(Map::new)
                .extend(self.transport_options);
        }
        if let Some(org) = self.npm_org {
            config.npm_org = Some(org);
        }
        if let Some(verbose) = self.verbose {
            config.verbose = Some(verbose);
        }
    }

    /// Read the JSON config file. A missing file yields `Ok(None)`.
    pub fn from_file(path: &Path) -> Result<Option<Self>, ConfigError> {
        if !path.exists() {
            debug!(path = %path.display(), "No configuration file found, using defaults");
            return Ok(None);
        }

        let content = std::fs::read_to_string(path).map_err(|source| ConfigError::Io {
            path: path.to_path_buf(),
            source,
        })?;
        let file: FileConfig =
            serde_json::from_str(&content).map_err(|source| ConfigError::Parse {
                path: path.to_path_buf(),
                source,
            })?;

        info!(path = %path.display(), "Loaded configuration");
        if let Some(server) = &file.server {
            info!(name = ?server.name, "Using server configuration");
        }
        if let Some(org) = &file.npm_org {
            info!(npm_org = %org, "Using npm organization");
        }
        if file.verbose == Some(true) {
            info!("Verbose logging enabled by config file");
        }

        Ok(Some(file.into()))
    }

    /// Collect `TS_PKG_DISTRO_*` variables.
    ///
    /// The suffix is lowercased and split at the first underscore into a
    /// section and a property (`SERVER_NAME` -> `server.name`).
    pub fn from_env(env: &EnvVars) -> Self {
        let mut layer = Self::default();

        for (key, value) in env {
            let Some(suffix) = key.strip_prefix(ENV_PREFIX) else {
                continue;
            };
            if value.is_empty() {
                continue;
            }
            let suffix = suffix.to_lowercase();

            match suffix.split_once('_') {
                Some(("server", "name")) => layer.server_name = Some(value.clone()),
                Some(("server", "version")) => layer.server_version = Some(value.clone()),
                Some(("transport", "type")) => layer.transport_type = Some(value.clone()),
                Some(("transport", "port")) => {
                    let port = value
                        .parse::<u16>()
                        .map(Value::from)
                        .unwrap_or_else(|_| Value::String(value.clone()));
                    layer.transport_options.insert("port".to_string(), port);
                }
                Some(("transport", "host")) => {
                    layer
                        .transport_options
                        .insert("host".to_string(), Value::String(value.clone()));
                }
                Some(("npm", "org")) => layer.npm_org = Some(value.clone()),
                None if suffix == "verbose" => match parse_bool(value) {
                    Some(verbose) => layer.verbose = Some(verbose),
                    None => warn!(variable = %key, value = %value, "Ignoring non-boolean value"),
                },
                _ => debug!(variable = %key, "Unrecognized config variable, ignoring"),
            }
        }

        layer
    }

    /// Map recognized command-line flags.
    pub fn from_args(args: &ArgMap) -> Self {
        let mut layer = Self::default();
        let non_empty = |key: &str| args.get(key).filter(|v| !v.is_empty()).map(str::to_string);

        layer.server_name = non_empty("server-name");
        layer.transport_type = non_empty("transport-type");
        layer.npm_org = non_empty("npm-org");

        if let Some(port) = non_empty("transport-port") {
            match port.parse::<u16>() {
                Ok(port) => {
                    layer.transport_options.insert("port".to_string(), Value::from(port));
                }
                Err(e) => warn!(value = %port, error = %e, "Ignoring invalid --transport-port"),
            }
        }
        if let Some(host) = non_empty("transport-host") {
            layer
                .transport_options
                .insert("host".to_string(), Value::String(host));
        }
        if let Some(verbose) = args.get("verbose") {
            match parse_bool(verbose) {
                Some(v) => layer.verbose = Some(v),
                None => warn!(value = %verbose, "Ignoring non-boolean --verbose"),
            }
        }

        for (key, _) in args.iter() {
            if !KNOWN_FLAGS.contains(&key) {
                debug!(flag = %key, "Unrecognized flag, ignoring");
            }
        }

        layer
    }
}

const KNOWN_FLAGS: &[&str] = &[
    "config",
    "server-name",
    "transport-type",
    "transport-port",
    "transport-host",
    "npm-org",
    "verbose",
];

// ── File format ───────────────────────────────────────────────

#[derive(Debug, Default, Deserialize)]
struct FileConfig {
    #[serde(default)]
    server: Option<FileServer>,
    #[serde(default)]
    transport: Option<FileTransport>,
    #[serde(default, rename = "npm-org")]
    npm_org: Option<String>,
    #[serde(default)]
    verbose: Option<bool>,
}

#[derive(Debug, Default, Deserialize)]
struct FileServer {
    #[serde(default)]
    name: Option<String>,
    #[serde(default)]
    version: Option<String>,
}

#[derive(Debug, Default, Deserialize)]
struct FileTransport {
    #[serde(default, rename = "type")]
    kind: Option<String>,
    #[serde(default)]
    options: Option<Map<String, Value>>,
}

impl From<FileConfig> for ConfigLayer {
    fn from(file: FileConfig) -> Self {
        let (server_name, server_version) = match file.server {
            Some(server) => (server.name, server.version),
            None => (None, None),
        };
        let (transport_type, transport_options) = match file.transport {
            Some(transport) => (transport.kind, transport.options.unwrap_or_default()),
            None => (None, Map::new()),
        };
        Self {
            server_name,
            server_version,
            transport_type,
            transport_options,
            npm_org: file.npm_org,
            verbose: file.verbose,
        }
    }
}

// ── Resolver ──────────────────────────────────────────────────

/// Merges defaults, config file, environment, and CLI flags, in that order.
#[derive(Debug, Clone)]
pub struct ConfigResolver {
    working_dir: PathBuf,
}

impl ConfigResolver {
    /// Relative config paths and the default config file are looked up in `working_dir`.
    pub fn new(working_dir: impl Into<PathBuf>) -> Self {
        Self {
            working_dir: working_dir.into(),
        }
    }

    pub fn from_current_dir() -> Self {
        Self::new(env::current_dir().unwrap_or_else(|_| PathBuf::from(".")))
    }

    /// Config file path: explicit override, else `--config`, else `mcp-config.json`.
    pub fn config_path(&self, args: &ArgMap, config_override: Option<&Path>) -> PathBuf {
        let chosen = config_override
            .map(Path::to_path_buf)
            .or_else(|| args.get("config").map(PathBuf::from));
        match chosen {
            Some(path) if path.is_absolute() => path,
            Some(path) => self.working_dir.join(path),
            None => self.working_dir.join(DEFAULT_CONFIG_FILE),
        }
    }

    pub fn resolve<S: AsRef<str>>(
        &self,
        args: &[S],
        env: &EnvVars,
        config_override: Option<&Path>,
    ) -> EffectiveConfig {
        self.resolve_args(&ArgMap::parse(args), env, config_override)
    }

    pub fn resolve_args(
        &self,
        args: &ArgMap,
        env: &EnvVars,
        config_override: Option<&Path>,
    ) -> EffectiveConfig {
        let path = self.config_path(args, config_override);
        let file_layer = match ConfigLayer::from_file(&path) {
            Ok(layer) => layer,
            Err(e) => {
                warn!(error = %e, "Error loading configuration, ignoring file");
                None
            }
        };

        let layers = file_layer
            .into_iter()
            .chain([ConfigLayer::from_env(env), ConfigLayer::from_args(args)]);

        let mut config = EffectiveConfig::default();
        for layer in layers {
            layer.apply(&mut config);
        }
        config
    }
}

/// Resolve against the current working directory.
pub fn resolve<S: AsRef<str>>(
    args: &[S],
    env: &EnvVars,
    config_override: Option<&Path>,
) -> EffectiveConfig {
    ConfigResolver::from_current_dir().resolve(args, env, config_override)
}

// ── Verbose side effects ──────────────────────────────────────

/// Whether `--verbose` or the dedicated verbose variable asks for verbose mode.
pub fn verbose_requested(args: &ArgMap, env: &EnvVars) -> bool {
    args.is_true("verbose")
        || env
            .get(VERBOSE_ENV)
            .and_then(|v| parse_bool(v))
            .unwrap_or(false)
}

/// Export verbose mode to child processes and raise the log level to `trace`.
///
/// This is the only place that mutates the process environment.
pub fn apply_verbose_side_effects(verbose: bool) {
    if !verbose {
        return;
    }
    env::set_var(VERBOSE_ENV, "true");
    env::set_var(LOG_LEVEL_ENV, "trace");
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;

    fn env_of(pairs: &[(&str, &str)]) -> EnvVars {
        pairs
            .iter()
            .map(|(k, v)| (k.to_string(), v.to_string()))
            .collect()
    }

    fn write_config(dir: &Path, body: &str) -> PathBuf {
        let path = dir.join(DEFAULT_CONFIG_FILE);
        let mut f = std::fs::File::create(&path).unwrap();
        f.write_all(body.as_bytes()).unwrap();
        path
    }

    #[test]
    fn test_defaults_when_nothing_set() {
        let dir = tempfile::tempdir().unwrap();
        let config = ConfigResolver::new(dir.path()).resolve::<&str>(&[], &EnvVars::new(), None);
        assert_eq!(config, EffectiveConfig::default());
        assert_eq!(config.transport_type, "stdio");
        assert!(config.server_name.is_none());
        assert!(config.transport_options.is_none());
        assert!(config.npm_org.is_none());
        assert!(config.verbose.is_none());
    }

    #[test]
    fn test_file_layer_fields() {
        let dir = tempfile::tempdir().unwrap();
        write_config(
            dir.path(),
            r#"{
                "server": {"name": "Docs", "version": "9.9.9"},
                "transport": {"type": "http", "options": {"port": 3000}},
                "npm-org": "acme",
                "verbose": true
            }"#,
        );
        let config = ConfigResolver::new(dir.path()).resolve::<&str>(&[], &EnvVars::new(), None);
        assert_eq!(config.server_name.as_deref(), Some("Docs"));
        assert_eq!(config.server_version.as_deref(), Some("9.9.9"));
        assert_eq!(config.transport_type, "http");
        assert_eq!(config.transport_option("port"), Some(&Value::from(3000)));
        assert_eq!(config.npm_org.as_deref(), Some("acme"));
        assert!(config.is_verbose());
    }

    #[test]
    fn test_env_section_mapping() {
        let layer = ConfigLayer::from_env(&env_of(&[
            ("TS_PKG_DISTRO_SERVER_NAME", "FromEnv"),
            ("TS_PKG_DISTRO_TRANSPORT_TYPE", "http"),
            ("TS_PKG_DISTRO_TRANSPORT_PORT", "8181"),
            ("TS_PKG_DISTRO_TRANSPORT_HOST", "0.0.0.0"),
            ("TS_PKG_DISTRO_NPM_ORG", "envorg"),
            ("TS_PKG_DISTRO_VERBOSE", "true"),
            ("UNRELATED", "x"),
        ]));
        assert_eq!(layer.server_name.as_deref(), Some("FromEnv"));
        assert_eq!(layer.transport_type.as_deref(), Some("http"));
        assert_eq!(layer.transport_options.get("port"), Some(&Value::from(8181)));
        assert_eq!(
            layer.transport_options.get("host"),
            Some(&Value::String("0.0.0.0".to_string()))
        );
        assert_eq!(layer.npm_org.as_deref(), Some("envorg"));
        assert_eq!(layer.verbose, Some(true));
    }

    #[test]
    fn test_env_empty_and_unknown_ignored() {
        let layer = ConfigLayer::from_env(&env_of(&[
            ("TS_PKG_DISTRO_SERVER_NAME", ""),
            ("TS_PKG_DISTRO_SOMETHING_ELSE", "x"),
        ]));
        assert_eq!(layer, ConfigLayer::default());
    }

    #[test]
    fn test_cli_port_is_integer() {
        let layer = ConfigLayer::from_args(&ArgMap::parse(&["--transport-port", "8080"]));
        assert_eq!(layer.transport_options.get("port"), Some(&Value::from(8080)));
        assert!(layer.transport_options["port"].is_u64());
    }

    #[test]
    fn test_cli_invalid_port_ignored() {
        let layer = ConfigLayer::from_args(&ArgMap::parse(&["--transport-port=abc"]));
        assert!(layer.transport_options.is_empty());
    }

    #[test]
    fn test_cli_config_flag_not_stored() {
        let layer = ConfigLayer::from_args(&ArgMap::parse(&["--config", "other.json"]));
        assert_eq!(layer, ConfigLayer::default());
    }

    #[test]
    fn test_absent_fields_do_not_clear() {
        let mut config = EffectiveConfig {
            server_name: Some("Kept".to_string()),
            ..EffectiveConfig::default()
        };
        ConfigLayer {
            npm_org: Some("org".to_string()),
            ..ConfigLayer::default()
        }
        .apply(&mut config);
        assert_eq!(config.server_name.as_deref(), Some("Kept"));
        assert_eq!(config.npm_org.as_deref(), Some("org"));
    }

    #[test]
    fn test_transport_options_merge_by_key() {
        let mut config = EffectiveConfig::default();
        let mut first = ConfigLayer::default();
        first
            .transport_options
            .insert("host".to_string(), Value::from("localhost"));
        first.apply(&mut config);

        let mut second = ConfigLayer::default();
        second.transport_options.insert("port".to_string(), Value::from(9000));
        second.apply(&mut config);

        assert_eq!(config.transport_option("host"), Some(&Value::from("localhost")));
        assert_eq!(config.transport_option("port"), Some(&Value::from(9000)));
    }

    #[test]
    fn test_config_path_selection() {
        let resolver = ConfigResolver::new("/work");
        let none = ArgMap::default();
        assert_eq!(
            resolver.config_path(&none, None),
            PathBuf::from("/work/mcp-config.json")
        );

        let flagged = ArgMap::parse(&["--config", "custom.json"]);
        assert_eq!(
            resolver.config_path(&flagged, None),
            PathBuf::from("/work/custom.json")
        );
        assert_eq!(
            resolver.config_path(&flagged, Some(Path::new("/abs/override.json"))),
            PathBuf::from("/abs/override.json")
        );
    }

    #[test]
    fn test_missing_file_is_not_an_error() {
        let dir = tempfile::tempdir().unwrap();
        let result = ConfigLayer::from_file(&dir.path().join("absent.json")).unwrap();
        assert!(result.is_none());
    }

    #[test]
    fn test_malformed_file_reports_parse_error() {
        let dir = tempfile::tempdir().unwrap();
        let path = write_config(dir.path(), "{ not json");
        let err = ConfigLayer::from_file(&path).unwrap_err();
        assert!(matches!(err, ConfigError::Parse { .. }));
    }

    #[test]
    fn test_verbose_requested() {
        assert!(verbose_requested(&ArgMap::parse(&["--verbose"]), &EnvVars::new()));
        assert!(verbose_requested(
            &ArgMap::default(),
            &env_of(&[(VERBOSE_ENV, "true")])
        ));
        assert!(!verbose_requested(
            &ArgMap::default(),
            &env_of(&[(VERBOSE_ENV, "false")])
        ));
        assert!(!verbose_requested(&ArgMap::default(), &EnvVars::new()));
    }

    #[test]
    fn test_log_summary_with_transport_options() {
        let mut options = Map::new();
        options.insert("port".to_string(), Value::from(9000));
        let config = EffectiveConfig {
            transport_type: "http".to_string(),
            transport_options: Some(options),
            ..EffectiveConfig::default()
        };
        config.log_summary();
        EffectiveConfig::default().log_summary();
    }

    #[test]
    fn test_apply_verbose_side_effects() {
        apply_verbose_side_effects(true);
        assert_eq!(env::var(VERBOSE_ENV).as_deref(), Ok("true"));
        assert_eq!(env::var(LOG_LEVEL_ENV).as_deref(), Ok("trace"));
    }
}
