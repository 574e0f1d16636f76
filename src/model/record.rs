//! A single log record: raw line plus parsed display form.

use super::styled_text::StyledText;

/// How a record's display form was produced.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RecordKind {
    /// The configured parser understood the line.
    Parsed,
    /// The parser rejected the line; the display is the plain-text
    /// rendering tagged as an error.
    Fallback,
}

/// An immutable log record.
///
/// Created by a [`LineParser`](crate::parser::LineParser) when a raw line
/// is taken off the tailer queue.
#[derive(Debug, Clone, PartialEq)]
pub struct Record {
    raw: String,
    display: StyledText,
    kind: RecordKind,
}

impl Record {
    /// Create a record from a successfully parsed line.
    pub fn parsed(raw: impl Into<String>, display: StyledText) -> Self {
        Self {
            raw: raw.into(),
            display,
            kind: RecordKind::Parsed,
        }
    }

    /// Create a record for a line the parser could not handle.
    pub fn fallback(raw: impl Into<String>, display: StyledText) -> Self {
        Self {
            raw: raw.into(),
            display,
            kind: RecordKind::Fallback,
        }
    }

    /// Create an unstyled record whose display equals its raw text.
    pub fn plain(raw: impl Into<String>) -> Self {
        let raw = raw.into();
        let display = StyledText::raw(raw.clone());
        Self::parsed(raw, display)
    }

    /// The original line, before parsing.
    pub fn raw(&self) -> &str {
        &self.raw
    }

    /// The parsed display form.
    pub fn display(&self) -> &StyledText {
        &self.display
    }

    /// How the display form was produced.
    pub fn kind(&self) -> RecordKind {
        self.kind
    }

    /// True if this record is a parser fallback.
    pub fn is_fallback(&self) -> bool {
        self.kind == RecordKind::Fallback
    }
}
