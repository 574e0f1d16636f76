//! Configuration loading.
//!
//! Settings resolve through four layers, lowest to highest: built-in
//! defaults, the TOML config file, `PODTAIL_*` environment variables,
//! and command-line flags.

pub mod loader;

pub use loader::{
    apply_cli_overrides, apply_env_overrides, default_config_path, default_log_path,
    load_config_file, load_config_with_precedence, merge_config, CliOverrides, ConfigError,
    ConfigFile, ResolvedConfig,
};

/// Resolve the full configuration for a run.
///
/// # Errors
///
/// Returns [`ConfigError`] if a config file exists but cannot be read or
/// parsed, or if an environment override is invalid.
pub fn resolve(
    config_path: Option<std::path::PathBuf>,
    cli: CliOverrides,
) -> Result<ResolvedConfig, ConfigError> {
    let file = load_config_with_precedence(config_path)?;
    let config = apply_env_overrides(merge_config(file))?;
    Ok(apply_cli_overrides(config, cli))
}
