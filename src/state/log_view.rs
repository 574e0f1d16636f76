//! Headless log viewer state.
//!
//! `LogView` is everything a log pane needs except drawing: a [`LineIndex`]
//! of received records, an entry cursor, the vertical scroll position and
//! the active search. It never touches a terminal, so every interaction
//! is testable by calling methods and inspecting [`visible_lines`].
//!
//! [`visible_lines`]: LogView::visible_lines

use crate::model::Record;
use crate::view_state::highlight::{fit_to_width, skip_columns};
use crate::view_state::{
    scroll_to_reveal, EntryIndex, LayoutChange, LineIndex, RenderStyles, ViewportDimensions,
};
use ratatui::text::Line;
use std::collections::BTreeMap;
use tracing::debug;

/// Cursor, scroll and search state over a [`LineIndex`].
#[derive(Debug, Clone, Default)]
pub struct LogView {
    index: LineIndex,
    cursor: Option<EntryIndex>,
    scroll_top: usize,
    viewport: ViewportDimensions,
    search_counts: BTreeMap<EntryIndex, usize>,
}

impl LogView {
    /// Create an empty view for the given viewport.
    pub fn new(viewport: ViewportDimensions) -> Self {
        Self {
            viewport,
            ..Self::default()
        }
    }

    /// Create an empty view with custom render styles.
    pub fn with_styles(viewport: ViewportDimensions, styles: RenderStyles) -> Self {
        Self {
            index: LineIndex::with_styles(styles),
            viewport,
            ..Self::default()
        }
    }

    /// The underlying line index.
    pub fn index(&self) -> &LineIndex {
        &self.index
    }

    /// Entry under the cursor, if any entry was selected yet.
    pub fn cursor(&self) -> Option<EntryIndex> {
        self.cursor
    }

    /// First global line shown at the top of the viewport.
    pub fn scroll_top(&self) -> usize {
        self.scroll_top
    }

    /// Current viewport size.
    pub fn viewport(&self) -> ViewportDimensions {
        self.viewport
    }

    /// Resize the viewport, keeping the scroll position in range.
    pub fn set_viewport(&mut self, viewport: ViewportDimensions) {
        self.viewport = viewport;
        self.scroll_top = self.scroll_top.min(self.max_scroll());
    }

    /// Scroll so `line` is the top row, clamped to the content.
    pub fn scroll_to(&mut self, line: usize) {
        self.scroll_top = line.min(self.max_scroll());
    }

    fn max_scroll(&self) -> usize {
        self.index
            .line_count()
            .saturating_sub(usize::from(self.viewport.height))
    }

    /// Width lines are rendered at: the viewport width or the widest
    /// entry, whichever is larger.
    pub fn render_width(&self) -> usize {
        usize::from(self.viewport.width).max(self.index.max_width())
    }

    /// Append a batch of records. Returns `(max_width, total_lines)`.
    ///
    /// Search counts are extended for the new entries.
    pub fn append(&mut self, records: Vec<Record>) -> (usize, usize) {
        let first_new = self.index.entry_count();
        let size = self.index.append(records);

        let search = self.index.search_text().to_string();
        if !search.is_empty() {
            for (i, view) in self.index.entries().iter().enumerate().skip(first_new) {
                let count = view.search(&search);
                if count > 0 {
                    self.search_counts.insert(EntryIndex::new(i), count);
                }
            }
        }
        size
    }

    /// Move the cursor to the next entry. The first move selects entry 0.
    pub fn cursor_down(&mut self) {
        let count = self.index.entry_count();
        let next = match self.cursor {
            None if count > 0 => EntryIndex::new(0),
            Some(current) if current.get() + 1 < count => current.next(),
            _ => return,
        };
        self.move_cursor(next);
    }

    /// Move the cursor to the previous entry. Stops at entry 0.
    pub fn cursor_up(&mut self) {
        if let Some(current) = self.cursor.filter(|current| current.get() > 0) {
            self.move_cursor(current.prev());
        }
    }

    /// Move the cursor to the entry shown at viewport row `row`.
    ///
    /// Returns the selected entry, or `None` if the row is past the end of
    /// the log.
    pub fn select_at_line(&mut self, row: usize) -> Option<EntryIndex> {
        let line = self.scroll_top + row;
        let slot = self.index.slot(line)?;
        self.move_cursor(slot.entry);
        Some(slot.entry)
    }

    fn move_cursor(&mut self, to: EntryIndex) {
        if let Some(previous) = self.cursor.filter(|&previous| previous != to) {
            self.index.set_selected(previous, false);
        }
        self.index.set_selected(to, true);
        self.cursor = Some(to);
        self.reveal(to);
    }

    /// Scroll the minimum needed to show the whole entry.
    fn reveal(&mut self, entry: EntryIndex) {
        let Some(view) = self.index.entry(entry) else {
            return;
        };
        let entry_top = view.line_offset().get();
        let entry_bottom = entry_top + view.line_count();
        // One past the last visible row, so an entry ending exactly at the
        // bottom edge counts as visible.
        let view_bottom = self.scroll_top + usize::from(self.viewport.height);

        if let Some(top) = scroll_to_reveal(self.scroll_top, view_bottom, entry_top, entry_bottom) {
            debug!(entry = entry.get(), from = self.scroll_top, to = top, "Scrolling cursor into view");
            self.scroll_top = top.min(self.max_scroll());
        }
    }

    /// Expand or collapse the entry under the cursor.
    pub fn toggle_expand_current(&mut self) -> Option<LayoutChange> {
        let cursor = self.cursor?;
        let change = self.index.toggle_expand(cursor);
        self.scroll_top = self.scroll_top.min(self.max_scroll());
        Some(change)
    }

    /// Highlight `text` and recount matches per entry.
    ///
    /// An empty string clears the search.
    pub fn set_search_text(&mut self, text: impl Into<String>) -> &BTreeMap<EntryIndex, usize> {
        let text = text.into();
        self.search_counts = if text.is_empty() {
            BTreeMap::new()
        } else {
            self.index.search_counts(&text)
        };
        self.index.set_search_text(text);
        &self.search_counts
    }

    /// Matches per entry for the active search.
    pub fn search_counts(&self) -> &BTreeMap<EntryIndex, usize> {
        &self.search_counts
    }

    /// Total matches for the active search.
    pub fn total_matches(&self) -> usize {
        self.search_counts.values().sum()
    }

    /// Rows currently in the viewport, horizontally scrolled by `scroll_x`
    /// columns. Rows past the end of the log are blank.
    pub fn visible_lines(&mut self, scroll_x: usize) -> Vec<Line<'static>> {
        let width = usize::from(self.viewport.width);
        let render_width = self.render_width();
        let line_count = self.index.line_count();

        (self.scroll_top..self.scroll_top + usize::from(self.viewport.height))
            .map(|line| {
                if line < line_count {
                    let rendered = self.index.line_at(line, render_width).clone();
                    fit_to_width(skip_columns(rendered, scroll_x), width)
                } else {
                    fit_to_width(Line::default(), width)
                }
            })
            .collect()
    }

    /// Rendered global lines `range`, at the render width and without
    /// viewport cropping. The range is clamped to the log.
    pub fn render_lines(&mut self, range: std::ops::Range<usize>) -> Vec<Line<'static>> {
        let width = self.render_width();
        let end = range.end.min(self.index.line_count());
        (range.start.min(end)..end)
            .map(|line| self.index.line_at(line, width).clone())
            .collect()
    }

    /// Expand or collapse one entry.
    pub fn set_expanded(&mut self, entry: EntryIndex, expanded: bool) -> LayoutChange {
        let change = self.index.set_expanded(entry, expanded);
        self.scroll_top = self.scroll_top.min(self.max_scroll());
        change
    }

    /// Drop all entries and reset cursor, scroll and match counts. The
    /// search text stays active for new records.
    pub fn clear(&mut self) {
        self.index.clear();
        self.cursor = None;
        self.scroll_top = 0;
        self.search_counts.clear();
    }
}
