//! Entry view with per-entry state and cached rendering.

use super::highlight::{apply_selection, fit_to_width, highlight_matches, RenderStyles};
use super::types::LineOffset;
use crate::model::Record;
use ratatui::style::Style;
use ratatui::text::Line;

/// Fingerprint of the inputs that produced the cached styled lines.
#[derive(Debug, Clone, PartialEq, Eq)]
struct RenderKey {
    width: usize,
    selected: bool,
    expanded: bool,
    search_text: String,
}

/// A log record with its presentation state and cached layout.
///
/// Rendering happens in two stages:
/// - the **plain** stage splits the display text (plus the raw line when
///   expanded) into physical lines. It only reruns when `expanded` flips,
///   and it alone decides [`line_count`](Self::line_count).
/// - the **styled** stage applies search highlighting, width fitting and
///   selection to the plain lines. Its result is cached until the render
///   key `(width, selected, expanded, search_text)` changes.
///
/// Width never changes the line count: long lines are truncated, not
/// wrapped, and the view scrolls horizontally instead.
#[derive(Debug, Clone)]
pub struct LogEntryView {
    /// The record (owned).
    record: Record,
    /// Whether the raw line is shown below the display text.
    expanded: bool,
    /// Whether the entry is under the cursor.
    selected: bool,
    /// First global line this entry occupies. Maintained by the line index.
    line_offset: LineOffset,
    /// Unstyled physical lines (plain stage output).
    plain_lines: Vec<Line<'static>>,
    /// Display width of the widest plain line.
    max_width: usize,
    /// Styled lines (styled stage output).
    rendered: Vec<Line<'static>>,
    /// Key of `rendered`, `None` when stale.
    render_key: Option<RenderKey>,
}

impl LogEntryView {
    /// Create a collapsed, unselected entry at line offset 0.
    pub fn new(record: Record) -> Self {
        let mut view = Self {
            record,
            expanded: false,
            selected: false,
            line_offset: LineOffset::default(),
            plain_lines: Vec::new(),
            max_width: 0,
            rendered: Vec::new(),
            render_key: None,
        };
        view.layout();
        view
    }

    /// The record behind this entry.
    pub fn record(&self) -> &Record {
        &self.record
    }

    /// Whether the raw line is shown.
    pub fn is_expanded(&self) -> bool {
        self.expanded
    }

    /// Whether the entry is selected.
    pub fn is_selected(&self) -> bool {
        self.selected
    }

    /// First global line of this entry.
    pub fn line_offset(&self) -> LineOffset {
        self.line_offset
    }

    pub(crate) fn set_line_offset(&mut self, offset: LineOffset) {
        self.line_offset = offset;
    }

    /// Number of physical lines. Always at least 1.
    pub fn line_count(&self) -> usize {
        self.plain_lines.len()
    }

    /// Display width of the widest line.
    pub fn max_width(&self) -> usize {
        self.max_width
    }

    /// Unstyled physical lines.
    pub fn plain_lines(&self) -> &[Line<'static>] {
        &self.plain_lines
    }

    /// Show or hide the raw line. Returns true if the state changed.
    pub fn set_expanded(&mut self, expanded: bool) -> bool {
        if self.expanded == expanded {
            return false;
        }
        self.expanded = expanded;
        self.layout();
        true
    }

    /// Flip the expanded state and return the new state.
    pub fn toggle_expand(&mut self) -> bool {
        self.set_expanded(!self.expanded);
        self.expanded
    }

    /// Select or deselect. The styled cache is refreshed on the next render.
    pub fn set_selected(&mut self, selected: bool) {
        self.selected = selected;
    }

    /// Number of non-overlapping occurrences of `text` in the unstyled
    /// display text. Empty text has no occurrences.
    pub fn search(&self, text: &str) -> usize {
        if text.is_empty() {
            return 0;
        }
        self.record.display().plain().matches(text).count()
    }

    /// Styled lines for the given width, search text and styles.
    ///
    /// Returns the cached lines when nothing in the render key changed.
    pub fn render(
        &mut self,
        width: usize,
        styles: &RenderStyles,
        search_text: &str,
    ) -> &[Line<'static>] {
        let key = RenderKey {
            width,
            selected: self.selected,
            expanded: self.expanded,
            search_text: search_text.to_string(),
        };
        if self.render_key.as_ref() != Some(&key) {
            let selected = self.selected;
            self.rendered = self
                .plain_lines
                .iter()
                .cloned()
                .map(|line| {
                    let line = highlight_matches(line, search_text, styles.search_match);
                    let line = fit_to_width(line, width);
                    if selected {
                        apply_selection(line, styles.selected)
                    } else {
                        line
                    }
                })
                .collect();
            self.render_key = Some(key);
        }
        &self.rendered
    }

    /// Plain stage: rebuild the physical lines from the record.
    fn layout(&mut self) {
        let mut text = self.record.display().clone();
        text.trim_line_terminator();
        if self.expanded {
            text.push("\n\n", Style::default());
            text.push(pretty_raw(self.record.raw()), Style::default());
            text.push("\n", Style::default());
        }
        self.plain_lines = text.split_lines();
        self.max_width = self.plain_lines.iter().map(Line::width).max().unwrap_or(0);
        self.render_key = None;
    }
}

/// Pretty-print the raw line if it is JSON, else return it unchanged.
fn pretty_raw(raw: &str) -> String {
    serde_json::from_str::<serde_json::Value>(raw)
        .ok()
        .and_then(|value| serde_json::to_string_pretty(&value).ok())
        .unwrap_or_else(|| raw.to_string())
}
