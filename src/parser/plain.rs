//! Plain-text parser with keyword colouring.

use crate::model::{Record, StyledText};
use ratatui::style::{Color, Style};
use regex::Regex;
use std::sync::LazyLock;

static KEYWORDS: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(
        r"(?P<warn>\[\s*warn\w*\s*\]|\bwarn(?:ing)?\b)|(?P<err>\[\s*err\w*\s*\]|\berr(?:or)?\b)",
    )
    .expect("keyword pattern is valid")
});

/// Renders a line as-is, colouring warning keywords yellow and error
/// keywords red.
///
/// Matches `warn`, `warning` and bracketed forms like `[warning]`, and the
/// same for `err`/`error`. Matching is case-sensitive.
#[derive(Debug, Clone, Copy, Default)]
pub struct PlainTextParser;

impl PlainTextParser {
    /// Create the parser.
    pub fn new() -> Self {
        Self
    }

    /// Style a line without wrapping it in a record.
    pub fn style(&self, raw: &str) -> StyledText {
        let mut styled = StyledText::new();
        let mut last = 0;

        for caps in KEYWORDS.captures_iter(raw) {
            let (m, color) = match (caps.name("warn"), caps.name("err")) {
                (Some(m), _) => (m, Color::Yellow),
                (None, Some(m)) => (m, Color::Red),
                (None, None) => continue,
            };
            styled.push(&raw[last..m.start()], Style::default());
            styled.push(m.as_str(), Style::default().fg(color));
            last = m.end();
        }
        styled.push(&raw[last..], Style::default());
        styled
    }
}

impl super::LineParser for PlainTextParser {
    fn parse(&self, raw: &str) -> Record {
        Record::parsed(raw, self.style(raw))
    }
}
