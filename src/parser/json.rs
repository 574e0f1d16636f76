//! Structured JSON (ECS-style) log line parser.
//!
//! Well-known keys are rendered first, in a fixed order:
//!
//! | Key | Rendering |
//! |---|---|
//! | `@timestamp` | local time `YYYY-MM-DD HH:MM:SS`, grey |
//! | `log.level` | `[level     ]`, red/yellow/green by severity |
//! | `message` | padded to 40 columns |
//! | `logger` | `[logger]`, blue |
//!
//! Every other key follows as `key=value`, and `exception` comes last on
//! its own line. Lines that are not JSON objects fall back to the
//! [`PlainTextParser`] with a red `[!E] ` prefix.

use super::plain::PlainTextParser;
use crate::model::{Record, StyledText};
use chrono::{DateTime, Local};
use ratatui::style::{Color, Style};
use serde_json::{Map, Value};

const TIMESTAMP_KEY: &str = "@timestamp";
const LEVEL_KEY: &str = "log.level";
const MESSAGE_KEY: &str = "message";
const LOGGER_KEY: &str = "logger";
const EXCEPTION_KEY: &str = "exception";

/// Output format for timestamps, in local time.
const DATETIME_OUTPUT: &str = "%Y-%m-%d %H:%M:%S";

/// Marker placed in front of lines that could not be parsed as JSON.
pub const FALLBACK_PREFIX: &str = "[!E] ";

/// Parser for one-JSON-object-per-line logs.
#[derive(Debug, Clone, Copy, Default)]
pub struct JsonLineParser {
    plain: PlainTextParser,
}

impl JsonLineParser {
    /// Create the parser.
    pub fn new() -> Self {
        Self::default()
    }

    /// Render a decoded JSON object.
    pub fn render_object(&self, object: &Map<String, Value>) -> StyledText {
        let first = [TIMESTAMP_KEY, LEVEL_KEY, MESSAGE_KEY, LOGGER_KEY]
            .into_iter()
            .filter_map(|key| object.get(key).map(|value| render_field(key, value)));

        let rest = object
            .iter()
            .filter(|(key, _)| !is_well_known(key))
            .map(|(key, value)| render_general(key, value));

        let last = object
            .get(EXCEPTION_KEY)
            .map(|value| StyledText::raw(format!("\n{}", value_text(value))));

        let items = first
            .chain(rest)
            .chain(last)
            .filter(|item| !item.is_empty());
        StyledText::join(" ", items)
    }

    fn fallback(&self, raw: &str) -> Record {
        let mut display = StyledText::styled(FALLBACK_PREFIX, Style::default().fg(Color::Red));
        display.append(self.plain.style(raw));
        Record::fallback(raw, display)
    }
}

impl super::LineParser for JsonLineParser {
    fn parse(&self, raw: &str) -> Record {
        match serde_json::from_str::<Value>(raw) {
            Ok(Value::Object(object)) => Record::parsed(raw, self.render_object(&object)),
            _ => self.fallback(raw),
        }
    }
}

fn is_well_known(key: &str) -> bool {
    matches!(
        key,
        TIMESTAMP_KEY | LEVEL_KEY | MESSAGE_KEY | LOGGER_KEY | EXCEPTION_KEY
    )
}

fn render_field(key: &str, value: &Value) -> StyledText {
    let text = value_text(value);
    match key {
        TIMESTAMP_KEY => render_timestamp(&text),
        LEVEL_KEY => StyledText::styled(
            format!("[{text:<10}]"),
            Style::default().fg(level_color(&text)),
        ),
        MESSAGE_KEY if text.is_empty() => StyledText::new(),
        MESSAGE_KEY => StyledText::raw(format!("{text:<40}")),
        LOGGER_KEY => StyledText::styled(format!("[{text}]"), Style::default().fg(Color::Blue)),
        _ => render_general(key, value),
    }
}

fn render_timestamp(text: &str) -> StyledText {
    let grey = Style::default().fg(Color::Rgb(0x99, 0x99, 0x99));
    match DateTime::parse_from_rfc3339(text) {
        Ok(ts) => StyledText::styled(
            ts.with_timezone(&Local).format(DATETIME_OUTPUT).to_string(),
            grey,
        ),
        Err(_) => StyledText::styled(text.to_string(), grey),
    }
}

fn level_color(level: &str) -> Color {
    match level.to_ascii_lowercase().as_str() {
        "error" | "critical" | "fatal" => Color::Red,
        "warning" | "warn" => Color::Yellow,
        _ => Color::Green,
    }
}

fn render_general(key: &str, value: &Value) -> StyledText {
    let mut text = StyledText::styled(key.to_string(), Style::default().fg(Color::Green));
    text.push("=", Style::default());
    text.push(value_text(value), Style::default().fg(Color::Magenta));
    text
}

/// Strings render without quotes; everything else as compact JSON.
fn value_text(value: &Value) -> String {
    match value {
        Value::String(s) => s.clone(),
        other => other.to_string(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::parser::LineParser;

    fn local(ts: &str) -> String {
        DateTime::parse_from_rfc3339(ts)
            .unwrap()
            .with_timezone(&Local)
            .format(DATETIME_OUTPUT)
            .to_string()
    }

    #[test]
    fn full_ecs_line_renders_in_fixed_order() {
        let raw = r#"{"@timestamp":"2022-12-27T11:04:22.329Z","log.level":"info","message":"A log message","ecs":{"version":"1.6.0"},"extra":"test","logger":"__main__"}"#;

        let record = JsonLineParser::new().parse(raw);

        let expected = format!(
            "{} [info      ] A log message                            [__main__] ecs={{\"version\":\"1.6.0\"}} extra=test",
            local("2022-12-27T11:04:22.329Z")
        );
        assert_eq!(record.display().plain(), expected);
        assert!(!record.is_fallback());
    }

    #[test]
    fn extra_keys_keep_line_order() {
        let raw = r#"{"zeta":1,"message":"hi","alpha":2,"mid":{"y":1,"x":2}}"#;
        let record = JsonLineParser::new().parse(raw);
        assert_eq!(
            record.display().plain(),
            format!("{:<40} zeta=1 alpha=2 mid={{\"y\":1,\"x\":2}}", "hi")
        );
    }

    #[test]
    fn missing_logger_is_skipped() {
        let raw = r#"{"log.level":"info","message":"hi","extra":"test"}"#;
        let record = JsonLineParser::new().parse(raw);
        assert_eq!(
            record.display().plain(),
            format!("[info      ] {:<40} extra=test", "hi")
        );
    }

    #[test]
    fn long_message_is_not_truncated() {
        let message = "A log message ".repeat(5);
        let raw = serde_json::json!({ "message": message }).to_string();
        let record = JsonLineParser::new().parse(&raw);
        assert_eq!(record.display().plain(), message);
    }

    #[test]
    fn exception_goes_last_on_its_own_line() {
        let raw = r#"{"message":"boom","exception":"Traceback\n  line 1","a":1}"#;
        let record = JsonLineParser::new().parse(raw);
        let lines = record.display().split_lines();
        assert_eq!(lines.len(), 3, "message line plus two exception lines");
        assert!(record.display().plain().ends_with("Traceback\n  line 1"));
        assert!(record.display().plain().contains("a=1"));
    }

    #[test]
    fn level_colors_follow_severity() {
        assert_eq!(level_color("error"), Color::Red);
        assert_eq!(level_color("warning"), Color::Yellow);
        assert_eq!(level_color("info"), Color::Green);
    }

    #[test]
    fn invalid_json_falls_back_with_marker() {
        let record = JsonLineParser::new().parse("not json at all");
        assert!(record.is_fallback());
        assert_eq!(record.raw(), "not json at all");
        assert_eq!(record.display().plain(), "[!E] not json at all");
        assert_eq!(record.display().spans()[0].style.fg, Some(Color::Red));
    }

    #[test]
    fn json_scalar_falls_back() {
        let record = JsonLineParser::new().parse("42");
        assert!(record.is_fallback());
    }

    #[test]
    fn unparseable_timestamp_is_shown_verbatim() {
        let record = JsonLineParser::new().parse(r#"{"@timestamp":"yesterday"}"#);
        assert_eq!(record.display().plain(), "yesterday");
    }
}
