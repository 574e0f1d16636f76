//! Log line parsers.
//!
//! A parser turns one raw log line into a [`Record`]. Parsing is total:
//! a line the parser does not understand still becomes a record (tagged
//! [`RecordKind::Fallback`](crate::model::RecordKind::Fallback)) so the
//! pipeline never stalls on malformed input.

pub mod json;
pub mod plain;

pub use json::JsonLineParser;
pub use plain::PlainTextParser;

use crate::model::Record;
use serde::Deserialize;
use std::sync::Arc;

/// Turns a raw log line into a display record.
///
/// Implementations must be deterministic and must never panic on any
/// input string.
pub trait LineParser: Send + Sync {
    /// Parse one raw line.
    fn parse(&self, raw: &str) -> Record;
}

impl<F> LineParser for F
where
    F: Fn(&str) -> Record + Send + Sync,
{
    fn parse(&self, raw: &str) -> Record {
        self(raw)
    }
}

/// Selectable parser, as named in configuration and on the command line.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Deserialize, clap::ValueEnum)]
#[serde(rename_all = "lowercase")]
pub enum ParserKind {
    /// Structured JSON log lines, falling back to plain text.
    #[default]
    Json,
    /// Plain text with warning/error keyword colouring.
    Plain,
}

impl ParserKind {
    /// Build a shareable parser instance.
    pub fn build(self) -> Arc<dyn LineParser> {
        match self {
            ParserKind::Json => Arc::new(JsonLineParser::new()),
            ParserKind::Plain => Arc::new(PlainTextParser::new()),
        }
    }
}

impl std::str::FromStr for ParserKind {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "json" => Ok(ParserKind::Json),
            "plain" => Ok(ParserKind::Plain),
            other => Err(format!("unknown parser '{other}' (expected json or plain)")),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn closures_are_parsers() {
        let parser = |raw: &str| Record::plain(raw.to_uppercase());
        assert_eq!(parser.parse("abc").raw(), "ABC");
    }

    #[test]
    fn parser_kind_from_str_is_case_insensitive() {
        assert_eq!("JSON".parse::<ParserKind>(), Ok(ParserKind::Json));
        assert_eq!(" plain ".parse::<ParserKind>(), Ok(ParserKind::Plain));
        assert!("xml".parse::<ParserKind>().is_err());
    }

    #[test]
    fn built_parsers_handle_plain_lines() {
        for kind in [ParserKind::Json, ParserKind::Plain] {
            let record = kind.build().parse("just some text");
            assert_eq!(record.raw(), "just some text");
            assert!(record.display().plain().contains("just some text"));
        }
    }
}
