//! Tests for config file loading and precedence handling.

use super::*;
use serial_test::serial;
use std::io::Write;

/// RAII guard that clears an env var on creation and on drop.
struct EnvGuard(&'static str);

impl EnvGuard {
    fn new(name: &'static str) -> Self {
        std::env::remove_var(name);
        Self(name)
    }

    fn set(&self, value: &str) {
        std::env::set_var(self.0, value);
    }
}

impl Drop for EnvGuard {
    fn drop(&mut self) {
        std::env::remove_var(self.0);
    }
}

fn write_config(contents: &str) -> tempfile::NamedTempFile {
    let mut file = tempfile::NamedTempFile::new().expect("create temp file");
    file.write_all(contents.as_bytes()).expect("write temp file");
    file
}

// ===== load_config_file =====

#[test]
fn missing_file_is_not_an_error() {
    let result = load_config_file("/nonexistent/podtail/config.toml");
    assert_eq!(result, Ok(None));
}

#[test]
fn empty_file_yields_all_none() {
    let file = write_config("");
    let config = load_config_file(file.path()).unwrap().unwrap();
    assert_eq!(config, ConfigFile::default());
}

#[test]
fn full_file_parses_every_field() {
    let file = write_config(
        r#"
namespace = "payments"
pod = "api-7c9f"
tail_lines = 200
follow_tail_lines = 4
resync_window = 16
reconnect_delay_ms = 250
read_timeout_ms = 30000
flush_delay_ms = 100
max_batch = 50
parser = "plain"
log_file_path = "/tmp/podtail.log"
kubectl = "/usr/local/bin/kubectl"
"#,
    );

    let config = load_config_file(file.path()).unwrap().unwrap();

    assert_eq!(config.namespace.as_deref(), Some("payments"));
    assert_eq!(config.pod.as_deref(), Some("api-7c9f"));
    assert_eq!(config.tail_lines, Some(200));
    assert_eq!(config.follow_tail_lines, Some(4));
    assert_eq!(config.resync_window, Some(16));
    assert_eq!(config.reconnect_delay_ms, Some(250));
    assert_eq!(config.read_timeout_ms, Some(30000));
    assert_eq!(config.flush_delay_ms, Some(100));
    assert_eq!(config.max_batch, Some(50));
    assert_eq!(config.parser, Some(ParserKind::Plain));
    assert_eq!(config.log_file_path, Some(PathBuf::from("/tmp/podtail.log")));
    assert_eq!(config.kubectl, Some(PathBuf::from("/usr/local/bin/kubectl")));
}

#[test]
fn invalid_toml_is_parse_error() {
    let file = write_config("namespace = ");
    let result = load_config_file(file.path());
    assert!(matches!(result, Err(ConfigError::ParseError { .. })));
}

#[test]
fn unknown_field_is_rejected() {
    let file = write_config("theme = \"dark\"\n");
    let result = load_config_file(file.path());
    match result {
        Err(ConfigError::ParseError { reason, .. }) => assert!(reason.contains("theme")),
        other => panic!("expected ParseError, got {other:?}"),
    }
}

#[test]
fn unknown_parser_name_is_rejected() {
    let file = write_config("parser = \"yaml\"\n");
    let result = load_config_file(file.path());
    assert!(matches!(result, Err(ConfigError::ParseError { .. })));
}

// ===== load_config_with_precedence =====

#[test]
#[serial(podtail_env)]
fn explicit_path_wins_over_env() {
    let env = EnvGuard::new(CONFIG_ENV);
    let from_env = write_config("namespace = \"from-env\"\n");
    let explicit = write_config("namespace = \"explicit\"\n");
    env.set(from_env.path().to_str().unwrap());

    let config = load_config_with_precedence(Some(explicit.path().to_path_buf()))
        .unwrap()
        .unwrap();

    assert_eq!(config.namespace.as_deref(), Some("explicit"));
}

#[test]
#[serial(podtail_env)]
fn env_path_used_without_explicit_path() {
    let env = EnvGuard::new(CONFIG_ENV);
    let from_env = write_config("namespace = \"from-env\"\n");
    env.set(from_env.path().to_str().unwrap());

    let config = load_config_with_precedence(None).unwrap().unwrap();

    assert_eq!(config.namespace.as_deref(), Some("from-env"));
}

#[test]
#[serial(podtail_env)]
fn env_path_to_missing_file_yields_none() {
    let env = EnvGuard::new(CONFIG_ENV);
    env.set("/nonexistent/podtail.toml");

    assert_eq!(load_config_with_precedence(None), Ok(None));
}

// ===== merge_config =====

#[test]
fn merge_without_file_gives_defaults() {
    assert_eq!(merge_config(None), ResolvedConfig::default());
}

#[test]
fn merge_keeps_defaults_for_unset_fields() {
    let file = ConfigFile {
        namespace: Some("payments".into()),
        flush_delay_ms: Some(50),
        ..ConfigFile::default()
    };

    let resolved = merge_config(Some(file));

    assert_eq!(resolved.namespace, "payments");
    assert_eq!(resolved.flush_delay, Duration::from_millis(50));
    assert_eq!(resolved.tail_lines, DEFAULT_TAIL_LINES);
    assert_eq!(resolved.resync_window, DEFAULT_WINDOW_SIZE);
    assert_eq!(resolved.reconnect_delay, DEFAULT_RECONNECT_DELAY);
    assert_eq!(resolved.parser, ParserKind::Json);
}

#[test]
fn defaults_match_tailer_constants() {
    let resolved = ResolvedConfig::default();
    assert_eq!(resolved.namespace, "default");
    assert_eq!(resolved.pod, None);
    assert_eq!(resolved.tail_lines, 500);
    assert_eq!(resolved.follow_tail_lines, 2);
    assert_eq!(resolved.resync_window, 10);
    assert_eq!(resolved.max_batch, 100);
    assert_eq!(resolved.kubectl, PathBuf::from("kubectl"));
}

// ===== apply_env_overrides =====

#[test]
#[serial(podtail_env)]
fn env_namespace_overrides_file() {
    let ns = EnvGuard::new(NAMESPACE_ENV);
    let _parser = EnvGuard::new(PARSER_ENV);
    ns.set("from-env");

    let file = ConfigFile {
        namespace: Some("from-file".into()),
        ..ConfigFile::default()
    };
    let resolved = apply_env_overrides(merge_config(Some(file))).unwrap();

    assert_eq!(resolved.namespace, "from-env");
}

#[test]
#[serial(podtail_env)]
fn env_parser_overrides_default() {
    let _ns = EnvGuard::new(NAMESPACE_ENV);
    let parser = EnvGuard::new(PARSER_ENV);
    parser.set("plain");

    let resolved = apply_env_overrides(ResolvedConfig::default()).unwrap();

    assert_eq!(resolved.parser, ParserKind::Plain);
}

#[test]
#[serial(podtail_env)]
fn env_parser_rejects_unknown_value() {
    let _ns = EnvGuard::new(NAMESPACE_ENV);
    let parser = EnvGuard::new(PARSER_ENV);
    parser.set("xml");

    let result = apply_env_overrides(ResolvedConfig::default());

    assert!(matches!(
        result,
        Err(ConfigError::InvalidEnv { name: PARSER_ENV, .. })
    ));
}

#[test]
#[serial(podtail_env)]
fn no_env_leaves_config_untouched() {
    let _ns = EnvGuard::new(NAMESPACE_ENV);
    let _parser = EnvGuard::new(PARSER_ENV);

    let resolved = apply_env_overrides(ResolvedConfig::default()).unwrap();

    assert_eq!(resolved, ResolvedConfig::default());
}

// ===== apply_cli_overrides =====

#[test]
fn cli_overrides_win() {
    let file = ConfigFile {
        namespace: Some("from-file".into()),
        pod: Some("file-pod".into()),
        tail_lines: Some(10),
        ..ConfigFile::default()
    };
    let cli = CliOverrides {
        pod: Some("cli-pod".into()),
        namespace: Some("from-cli".into()),
        tail_lines: Some(42),
        parser: Some(ParserKind::Plain),
    };

    let resolved = apply_cli_overrides(merge_config(Some(file)), cli);

    assert_eq!(resolved.pod.as_deref(), Some("cli-pod"));
    assert_eq!(resolved.namespace, "from-cli");
    assert_eq!(resolved.tail_lines, 42);
    assert_eq!(resolved.parser, ParserKind::Plain);
}

#[test]
fn empty_cli_keeps_lower_layers() {
    let file = ConfigFile {
        pod: Some("file-pod".into()),
        ..ConfigFile::default()
    };

    let resolved = apply_cli_overrides(merge_config(Some(file)), CliOverrides::default());

    assert_eq!(resolved.pod.as_deref(), Some("file-pod"));
}

// ===== derived settings =====

#[test]
fn tail_target_requires_pod() {
    assert_eq!(ResolvedConfig::default().tail_target(), None);
}

#[test]
fn tail_target_carries_namespace_and_tail_lines() {
    let resolved = ResolvedConfig {
        namespace: "payments".into(),
        pod: Some("api-7c9f".into()),
        tail_lines: 20,
        ..ResolvedConfig::default()
    };

    let target = resolved.tail_target().unwrap();

    assert_eq!(target, TailTarget::new("payments", "api-7c9f").with_tail_lines(20));
}

#[test]
fn tail_and_batch_configs_follow_resolved_values() {
    let resolved = ResolvedConfig {
        resync_window: 3,
        follow_tail_lines: 7,
        reconnect_delay: Duration::from_millis(5),
        flush_delay: Duration::from_millis(9),
        max_batch: 11,
        ..ResolvedConfig::default()
    };

    let tail = resolved.tail_config();
    assert_eq!(tail.window_size, 3);
    assert_eq!(tail.follow_tail_lines, 7);
    assert_eq!(tail.reconnect_delay, Duration::from_millis(5));

    let batch = resolved.batch_config();
    assert_eq!(batch.idle_delay, Duration::from_millis(9));
    assert_eq!(batch.max_batch, 11);
}

#[test]
fn default_log_path_ends_in_podtail_log() {
    let path = default_log_path();
    assert!(path.ends_with("podtail.log"));
}
