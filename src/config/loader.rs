//! Configuration file loading with precedence handling.

use crate::parser::ParserKind;
use crate::tailer::{
    batch::{DEFAULT_IDLE_DELAY, DEFAULT_MAX_BATCH},
    window::DEFAULT_WINDOW_SIZE,
    BatchConfig, TailConfig, TailTarget, DEFAULT_FOLLOW_TAIL_LINES, DEFAULT_RECONNECT_DELAY,
    DEFAULT_TAIL_LINES,
};
use crate::source::kubectl::DEFAULT_READ_TIMEOUT;
use serde::Deserialize;
use std::path::PathBuf;
use std::time::Duration;
use thiserror::Error;

/// Environment variable naming an explicit config file.
pub const CONFIG_ENV: &str = "PODTAIL_CONFIG";
/// Environment variable overriding the namespace.
pub const NAMESPACE_ENV: &str = "PODTAIL_NAMESPACE";
/// Environment variable overriding the parser.
pub const PARSER_ENV: &str = "PODTAIL_PARSER";

/// Errors that can occur during config loading.
#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum ConfigError {
    /// Failed to read config file (file may not exist or have permission issues).
    #[error("Failed to read config file at {path}: {reason}")]
    ReadError {
        /// Path that failed to read.
        path: PathBuf,
        /// Reason for failure.
        reason: String,
    },

    /// Config file contains invalid TOML syntax or unknown fields.
    #[error("Invalid TOML in {path}: {reason}")]
    ParseError {
        /// Path with invalid TOML.
        path: PathBuf,
        /// Parse error details.
        reason: String,
    },

    /// An environment variable holds a value that cannot be used.
    #[error("Invalid value in {name}: {reason}")]
    InvalidEnv {
        /// Variable name.
        name: &'static str,
        /// Why the value was rejected.
        reason: String,
    },
}

/// TOML configuration file structure.
///
/// All fields are optional - if not specified, hardcoded defaults are used.
/// Corresponds to `~/.config/podtail/config.toml`.
#[derive(Debug, Clone, Default, Deserialize, PartialEq)]
#[serde(deny_unknown_fields)]
pub struct ConfigFile {
    /// Namespace of the pod.
    #[serde(default)]
    pub namespace: Option<String>,

    /// Pod to tail when none is given on the command line.
    #[serde(default)]
    pub pod: Option<String>,

    /// History lines requested when a session starts.
    #[serde(default)]
    pub tail_lines: Option<usize>,

    /// Lines re-requested by each follow connection.
    #[serde(default)]
    pub follow_tail_lines: Option<usize>,

    /// Recent lines remembered for overlap detection.
    #[serde(default)]
    pub resync_window: Option<usize>,

    /// Pause before reconnecting after a follow connection closes.
    #[serde(default)]
    pub reconnect_delay_ms: Option<u64>,

    /// Silence after which a connection counts as timed out.
    #[serde(default)]
    pub read_timeout_ms: Option<u64>,

    /// Idle time that flushes a pending display batch.
    #[serde(default)]
    pub flush_delay_ms: Option<u64>,

    /// Maximum records per display batch.
    #[serde(default)]
    pub max_batch: Option<usize>,

    /// Line parser (`json` or `plain`).
    #[serde(default)]
    pub parser: Option<ParserKind>,

    /// Path to log file for tracing output.
    #[serde(default)]
    pub log_file_path: Option<PathBuf>,

    /// Path to the `kubectl` binary.
    #[serde(default)]
    pub kubectl: Option<PathBuf>,
}

/// Resolved configuration after applying precedence rules.
///
/// Created by merging defaults, config file, env vars, and CLI args.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ResolvedConfig {
    /// Namespace of the pod.
    pub namespace: String,
    /// Pod to tail, if known.
    pub pod: Option<String>,
    /// History lines requested when a session starts.
    pub tail_lines: usize,
    /// Lines re-requested by each follow connection.
    pub follow_tail_lines: usize,
    /// Recent lines remembered for overlap detection.
    pub resync_window: usize,
    /// Pause before reconnecting after EOF.
    pub reconnect_delay: Duration,
    /// Silence after which a connection counts as timed out.
    pub read_timeout: Duration,
    /// Idle time that flushes a pending display batch.
    pub flush_delay: Duration,
    /// Maximum records per display batch.
    pub max_batch: usize,
    /// Line parser.
    pub parser: ParserKind,
    /// Path to log file for tracing output.
    pub log_file_path: PathBuf,
    /// Path to the `kubectl` binary.
    pub kubectl: PathBuf,
}

impl Default for ResolvedConfig {
    fn default() -> Self {
        Self {
            namespace: "default".to_string(),
            pod: None,
            tail_lines: DEFAULT_TAIL_LINES,
            follow_tail_lines: DEFAULT_FOLLOW_TAIL_LINES,
            resync_window: DEFAULT_WINDOW_SIZE,
            reconnect_delay: DEFAULT_RECONNECT_DELAY,
            read_timeout: DEFAULT_READ_TIMEOUT,
            flush_delay: DEFAULT_IDLE_DELAY,
            max_batch: DEFAULT_MAX_BATCH,
            parser: ParserKind::default(),
            log_file_path: default_log_path(),
            kubectl: PathBuf::from("kubectl"),
        }
    }
}

impl ResolvedConfig {
    /// Reconnect protocol parameters.
    pub fn tail_config(&self) -> TailConfig {
        TailConfig {
            window_size: self.resync_window,
            follow_tail_lines: self.follow_tail_lines,
            reconnect_delay: self.reconnect_delay,
        }
    }

    /// Display batching parameters.
    pub fn batch_config(&self) -> BatchConfig {
        BatchConfig {
            idle_delay: self.flush_delay,
            max_batch: self.max_batch,
        }
    }

    /// The pod to tail, if one was configured.
    pub fn tail_target(&self) -> Option<TailTarget> {
        let pod = self.pod.as_ref()?;
        Some(TailTarget::new(self.namespace.clone(), pod.clone()).with_tail_lines(self.tail_lines))
    }
}

/// Resolve default log file path.
///
/// Returns `~/.local/state/podtail/podtail.log` on Linux, or the
/// platform's state/data directory elsewhere.
///
/// If no such directory can be determined, falls back to current directory.
pub fn default_log_path() -> PathBuf {
    dirs::state_dir()
        .or_else(dirs::data_local_dir)
        .map(|dir| dir.join("podtail").join("podtail.log"))
        .unwrap_or_else(|| PathBuf::from("podtail.log"))
}

/// Load configuration file from a specific path.
///
/// Returns `Ok(None)` if file doesn't exist (not an error - use defaults).
///
/// # Errors
///
/// Returns error if file exists but has read or parse errors.
pub fn load_config_file(path: impl Into<PathBuf>) -> Result<Option<ConfigFile>, ConfigError> {
    let path = path.into();

    // Missing file is not an error - use defaults
    if !path.exists() {
        return Ok(None);
    }

    let contents = std::fs::read_to_string(&path).map_err(|e| ConfigError::ReadError {
        path: path.clone(),
        reason: e.to_string(),
    })?;

    let config: ConfigFile = toml::from_str(&contents).map_err(|e| ConfigError::ParseError {
        path: path.clone(),
        reason: e.to_string(),
    })?;

    Ok(Some(config))
}

/// Resolve default config file path.
///
/// Returns `~/.config/podtail/config.toml` on Linux, appropriate path on
/// other platforms. Returns `None` if no config directory is known.
pub fn default_config_path() -> Option<PathBuf> {
    dirs::config_dir().map(|dir| dir.join("podtail").join("config.toml"))
}

/// Load configuration with precedence handling.
///
/// Precedence (highest to lowest):
/// 1. Explicit `config_path` argument (CLI `--config`)
/// 2. `PODTAIL_CONFIG` environment variable
/// 3. Default path `~/.config/podtail/config.toml`
///
/// Missing config files are NOT errors - defaults are used.
///
/// # Errors
///
/// Returns error only if a config file exists but cannot be read or parsed.
pub fn load_config_with_precedence(
    config_path: Option<PathBuf>,
) -> Result<Option<ConfigFile>, ConfigError> {
    if let Some(path) = config_path {
        return load_config_file(path);
    }

    if let Ok(env_path) = std::env::var(CONFIG_ENV) {
        return load_config_file(PathBuf::from(env_path));
    }

    match default_config_path() {
        Some(default_path) => load_config_file(default_path),
        None => Ok(None),
    }
}

/// Merge config file into defaults to create resolved config.
///
/// For each field in `ConfigFile`, if `Some(value)`, use it; otherwise use default.
pub fn merge_config(config_file: Option<ConfigFile>) -> ResolvedConfig {
    let defaults = ResolvedConfig::default();

    let Some(config) = config_file else {
        return defaults;
    };

    let millis = |value: Option<u64>, default: Duration| {
        value.map(Duration::from_millis).unwrap_or(default)
    };

    ResolvedConfig {
        namespace: config.namespace.unwrap_or(defaults.namespace),
        pod: config.pod.or(defaults.pod),
        tail_lines: config.tail_lines.unwrap_or(defaults.tail_lines),
        follow_tail_lines: config
            .follow_tail_lines
            .unwrap_or(defaults.follow_tail_lines),
        resync_window: config.resync_window.unwrap_or(defaults.resync_window),
        reconnect_delay: millis(config.reconnect_delay_ms, defaults.reconnect_delay),
        read_timeout: millis(config.read_timeout_ms, defaults.read_timeout),
        flush_delay: millis(config.flush_delay_ms, defaults.flush_delay),
        max_batch: config.max_batch.unwrap_or(defaults.max_batch),
        parser: config.parser.unwrap_or(defaults.parser),
        log_file_path: config.log_file_path.unwrap_or(defaults.log_file_path),
        kubectl: config.kubectl.unwrap_or(defaults.kubectl),
    }
}

/// Apply environment variable overrides to resolved config.
///
/// Checks for:
/// - `PODTAIL_NAMESPACE`: Override namespace
/// - `PODTAIL_PARSER`: Override parser (`json` or `plain`)
///
/// # Errors
///
/// Returns [`ConfigError::InvalidEnv`] if `PODTAIL_PARSER` names an
/// unknown parser.
pub fn apply_env_overrides(mut config: ResolvedConfig) -> Result<ResolvedConfig, ConfigError> {
    if let Ok(namespace) = std::env::var(NAMESPACE_ENV) {
        config.namespace = namespace;
    }

    if let Ok(parser) = std::env::var(PARSER_ENV) {
        config.parser = parser.parse().map_err(|reason| ConfigError::InvalidEnv {
            name: PARSER_ENV,
            reason,
        })?;
    }

    Ok(config)
}

/// Overrides taken from command-line flags. `None` means "not given".
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct CliOverrides {
    /// `<POD>` positional argument.
    pub pod: Option<String>,
    /// `--namespace`.
    pub namespace: Option<String>,
    /// `--tail`.
    pub tail_lines: Option<usize>,
    /// `--parser`.
    pub parser: Option<ParserKind>,
}

/// Apply CLI argument overrides to resolved config.
///
/// CLI args have the highest precedence and override all other sources.
///
/// Precedence chain: Defaults → Config File → Env Vars → CLI Args (highest)
pub fn apply_cli_overrides(mut config: ResolvedConfig, cli: CliOverrides) -> ResolvedConfig {
    if let Some(pod) = cli.pod {
        config.pod = Some(pod);
    }
    if let Some(namespace) = cli.namespace {
        config.namespace = namespace;
    }
    if let Some(tail_lines) = cli.tail_lines {
        config.tail_lines = tail_lines;
    }
    if let Some(parser) = cli.parser {
        config.parser = parser;
    }
    config
}

#[cfg(test)]
#[path = "loader_tests.rs"]
mod tests;
