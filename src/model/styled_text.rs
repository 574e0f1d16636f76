//! Styled text: plain text plus styled ranges.
//!
//! `StyledText` is the parsed display form of a log record. It is a flat
//! sequence of ratatui spans whose contents may contain line breaks; layout
//! into physical lines happens later via [`StyledText::split_lines`].

use ratatui::style::Style;
use ratatui::text::{Line, Span};

/// Text with optional styled ranges.
///
/// Line breaks may appear anywhere inside span contents. An empty
/// `StyledText` still lays out as one (blank) line.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct StyledText {
    spans: Vec<Span<'static>>,
}

impl StyledText {
    /// Create empty styled text.
    pub fn new() -> Self {
        Self::default()
    }

    /// Create unstyled text.
    pub fn raw(text: impl Into<String>) -> Self {
        Self::styled(text, Style::default())
    }

    /// Create text with a single style applied to all of it.
    pub fn styled(text: impl Into<String>, style: Style) -> Self {
        let mut styled = Self::new();
        styled.push(text, style);
        styled
    }

    /// Append a run of text with the given style.
    ///
    /// Empty runs are dropped.
    pub fn push(&mut self, text: impl Into<String>, style: Style) {
        let text = text.into();
        if !text.is_empty() {
            self.spans.push(Span::styled(text, style));
        }
    }

    /// Append all spans of another styled text.
    pub fn append(&mut self, other: StyledText) {
        self.spans.extend(other.spans);
    }

    /// Join items with an unstyled separator.
    pub fn join(separator: &str, items: impl IntoIterator<Item = StyledText>) -> Self {
        let mut joined = Self::new();
        for (i, item) in items.into_iter().enumerate() {
            if i > 0 {
                joined.push(separator, Style::default());
            }
            joined.append(item);
        }
        joined
    }

    /// The styled spans, in order.
    pub fn spans(&self) -> &[Span<'static>] {
        &self.spans
    }

    /// True if there is no text at all.
    pub fn is_empty(&self) -> bool {
        self.spans.iter().all(|s| s.content.is_empty())
    }

    /// Drop one trailing `\n` or `\r\n`, so a terminated line lays out
    /// like the same line without its terminator.
    pub fn trim_line_terminator(&mut self) {
        while self.spans.last().is_some_and(|s| s.content.is_empty()) {
            self.spans.pop();
        }
        let Some(last) = self.spans.last_mut() else {
            return;
        };
        let Some(trimmed) = last.content.strip_suffix('\n') else {
            return;
        };
        let trimmed = trimmed.strip_suffix('\r').unwrap_or(trimmed).to_string();
        if trimmed.is_empty() {
            self.spans.pop();
        } else {
            last.content = trimmed.into();
        }
    }

    /// The text without any styling.
    pub fn plain(&self) -> String {
        self.spans.iter().map(|s| s.content.as_ref()).collect()
    }

    /// Split into physical lines at every `\n`.
    ///
    /// Blank lines are kept: `n` line breaks always give `n + 1` lines, so
    /// empty text gives exactly one empty line. A `\r` directly before a
    /// line break is dropped.
    pub fn split_lines(&self) -> Vec<Line<'static>> {
        let mut lines = Vec::new();
        let mut current: Vec<Span<'static>> = Vec::new();

        for span in &self.spans {
            let mut pieces = span.content.split('\n').peekable();
            while let Some(piece) = pieces.next() {
                let has_break = pieces.peek().is_some();
                let piece = if has_break {
                    piece.strip_suffix('\r').unwrap_or(piece)
                } else {
                    piece
                };
                if !piece.is_empty() {
                    current.push(Span::styled(piece.to_string(), span.style));
                }
                if has_break {
                    lines.push(Line::from(std::mem::take(&mut current)));
                }
            }
        }
        lines.push(Line::from(current));
        lines
    }
}

impl From<&str> for StyledText {
    fn from(text: &str) -> Self {
        Self::raw(text)
    }
}

impl From<String> for StyledText {
    fn from(text: String) -> Self {
        Self::raw(text)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use ratatui::style::Color;

    fn line_text(line: &Line<'_>) -> String {
        line.spans.iter().map(|s| s.content.as_ref()).collect()
    }

    #[test]
    fn empty_text_splits_into_one_blank_line() {
        let lines = StyledText::new().split_lines();
        assert_eq!(lines.len(), 1);
        assert_eq!(line_text(&lines[0]), "");
    }

    #[test]
    fn lone_terminator_trims_to_one_blank_line() {
        let mut text = StyledText::raw("\n");
        text.trim_line_terminator();
        let lines = text.split_lines();
        assert_eq!(lines.len(), 1);
        assert_eq!(line_text(&lines[0]), "");
    }

    #[test]
    fn trim_removes_only_one_terminator() {
        let mut text = StyledText::raw("abc\r\n");
        text.trim_line_terminator();
        assert_eq!(text.plain(), "abc");

        let mut text = StyledText::raw("a\n\n");
        text.trim_line_terminator();
        assert_eq!(text.plain(), "a\n");
    }

    #[test]
    fn trim_reaches_into_last_styled_span() {
        let red = Style::default().fg(Color::Red);
        let mut text = StyledText::styled("err", red);
        text.push("\n", Style::default());
        text.trim_line_terminator();

        assert_eq!(text.spans().len(), 1);
        assert_eq!(text.spans()[0].style, red);
        assert_eq!(text.split_lines().len(), 1);
    }

    #[test]
    fn split_keeps_blank_lines_between_text() {
        let lines = StyledText::raw("a\n\nb").split_lines();
        let texts: Vec<String> = lines.iter().map(line_text).collect();
        assert_eq!(texts, vec!["a", "", "b"]);
    }

    #[test]
    fn split_preserves_styles_across_break() {
        let red = Style::default().fg(Color::Red);
        let mut text = StyledText::styled("one\ntwo", red);
        text.push(" three", Style::default());

        let lines = text.split_lines();

        assert_eq!(lines.len(), 2);
        assert_eq!(lines[0].spans[0].style, red);
        assert_eq!(lines[1].spans[0].content, "two");
        assert_eq!(lines[1].spans[0].style, red);
        assert_eq!(lines[1].spans[1].content, " three");
    }

    #[test]
    fn split_drops_carriage_return_before_break() {
        let lines = StyledText::raw("a\r\nb").split_lines();
        assert_eq!(line_text(&lines[0]), "a");
        assert_eq!(line_text(&lines[1]), "b");
    }

    #[test]
    fn join_inserts_separator_between_items_only() {
        let joined = StyledText::join(" ", ["a".into(), "b".into(), "c".into()]);
        assert_eq!(joined.plain(), "a b c");
    }

    #[test]
    fn push_ignores_empty_runs() {
        let mut text = StyledText::new();
        text.push("", Style::default());
        assert!(text.spans().is_empty());
        assert!(text.is_empty());
    }
}
