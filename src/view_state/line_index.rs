//! LineIndex - flat global line addressing over variable-height entries
//!
//! The viewport scrolls over a single sequence of physical lines, while
//! the data is a sequence of entries of varying height. `LineIndex` keeps
//! both views in step:
//!
//! - `entries[i].line_offset()` is the first global line of entry `i`
//! - `slots[g]` names the entry and intra-entry line of global line `g`
//!
//! # Invariants
//!
//! After every operation, for every entry `i`:
//! `entries[i].line_offset() == Σ_{j<i} entries[j].line_count()`, and
//! `slots.len() == Σ entries[j].line_count()`.
//!
//! # Complexity
//!
//! - `append`: O(new lines)
//! - `line_at`: O(1) on a cache hit, O(entry height) otherwise
//! - `entry_index_for_line`: O(1)
//! - `mutate_entry`: O(lines from the mutated entry to the end)

use super::entry_view::LogEntryView;
use super::highlight::RenderStyles;
use super::types::{EntryIndex, LineOffset};
use crate::model::Record;
use ratatui::text::Line;
use std::collections::BTreeMap;

/// Owner of one global line.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct LineSlot {
    /// Entry owning the line.
    pub entry: EntryIndex,
    /// Line offset within that entry.
    pub line: usize,
}

/// Outcome of [`LineIndex::mutate_entry`].
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct LayoutChange {
    /// The mutated entry.
    pub entry: EntryIndex,
    /// Line count before the mutation.
    pub old_lines: usize,
    /// Line count after the mutation.
    pub new_lines: usize,
}

impl LayoutChange {
    /// True if the entry's height changed and later entries moved.
    pub fn reflowed(&self) -> bool {
        self.old_lines != self.new_lines
    }

    /// Signed change in line count.
    pub fn delta(&self) -> isize {
        self.new_lines as isize - self.old_lines as isize
    }
}

/// Ordered entries plus the global line → entry mapping.
#[derive(Debug, Clone, Default)]
pub struct LineIndex {
    entries: Vec<LogEntryView>,
    slots: Vec<LineSlot>,
    max_width: usize,
    search_text: String,
    styles: RenderStyles,
}

impl LineIndex {
    /// Create an empty index with default styles.
    pub fn new() -> Self {
        Self::default()
    }

    /// Create an empty index with the given styles.
    pub fn with_styles(styles: RenderStyles) -> Self {
        Self {
            styles,
            ..Self::default()
        }
    }

    /// Append records as new entries at the end.
    ///
    /// Returns `(max_width, total_lines)` after the append.
    ///
    /// # Examples
    ///
    /// ```
    /// # use podtail::model::Record;
    /// # use podtail::view_state::line_index::LineIndex;
    /// let mut index = LineIndex::new();
    /// let (width, lines) = index.append(vec![Record::plain("abc"), Record::plain("de\nf")]);
    /// assert_eq!((width, lines), (3, 3));
    /// ```
    pub fn append(&mut self, records: Vec<Record>) -> (usize, usize) {
        self.entries.reserve(records.len());
        for record in records {
            let mut view = LogEntryView::new(record);
            let entry = EntryIndex::new(self.entries.len());
            view.set_line_offset(LineOffset::new(self.slots.len()));
            self.slots
                .extend((0..view.line_count()).map(|line| LineSlot { entry, line }));
            self.max_width = self.max_width.max(view.max_width());
            self.entries.push(view);
        }
        (self.max_width, self.slots.len())
    }

    /// Total number of global lines.
    pub fn line_count(&self) -> usize {
        self.slots.len()
    }

    /// Number of entries.
    pub fn entry_count(&self) -> usize {
        self.entries.len()
    }

    /// True if there are no entries.
    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// Display width of the widest line of any entry.
    pub fn max_width(&self) -> usize {
        self.max_width
    }

    /// The entry at `index`, if any.
    pub fn entry(&self, index: EntryIndex) -> Option<&LogEntryView> {
        self.entries.get(index.get())
    }

    /// All entries in arrival order.
    pub fn entries(&self) -> &[LogEntryView] {
        &self.entries
    }

    /// Owner of global line `line`, if it exists.
    pub fn slot(&self, line: usize) -> Option<LineSlot> {
        self.slots.get(line).copied()
    }

    /// The entry owning global line `line`.
    ///
    /// # Panics
    ///
    /// Panics if `line >= line_count()`.
    pub fn entry_index_for_line(&self, line: usize) -> EntryIndex {
        assert!(
            line < self.slots.len(),
            "line {} out of bounds (line_count: {})",
            line,
            self.slots.len()
        );
        self.slots[line].entry
    }

    /// Styled global line `line`, rendered at `width`.
    ///
    /// Renders the owning entry on a cache miss.
    ///
    /// # Panics
    ///
    /// Panics if `line >= line_count()`.
    pub fn line_at(&mut self, line: usize, width: usize) -> &Line<'static> {
        assert!(
            line < self.slots.len(),
            "line {} out of bounds (line_count: {})",
            line,
            self.slots.len()
        );
        let slot = self.slots[line];
        let rendered =
            self.entries[slot.entry.get()].render(width, &self.styles, &self.search_text);
        &rendered[slot.line]
    }

    /// Apply `mutate` to one entry, then reindex from that entry forward
    /// if its line count changed. Entries before it are untouched.
    ///
    /// # Panics
    ///
    /// Panics if `index >= entry_count()`.
    pub fn mutate_entry<F>(&mut self, index: EntryIndex, mutate: F) -> LayoutChange
    where
        F: FnOnce(&mut LogEntryView),
    {
        assert!(
            index.get() < self.entries.len(),
            "entry {} out of bounds (entry_count: {})",
            index.get(),
            self.entries.len()
        );
        let view = &mut self.entries[index.get()];
        let old_lines = view.line_count();
        let old_width = view.max_width();
        mutate(view);
        let new_lines = view.line_count();
        let new_width = view.max_width();

        if new_lines != old_lines {
            self.reindex_from(index);
        }
        if new_width > self.max_width {
            self.max_width = new_width;
        } else if new_width < old_width && old_width == self.max_width {
            self.max_width = self.entries.iter().map(LogEntryView::max_width).max().unwrap_or(0);
        }

        LayoutChange {
            entry: index,
            old_lines,
            new_lines,
        }
    }

    /// Rebuild line offsets and slots for `from` and every later entry.
    fn reindex_from(&mut self, from: EntryIndex) {
        let start = self.entries[from.get()].line_offset().get();
        self.slots.truncate(start);

        for (i, view) in self.entries.iter_mut().enumerate().skip(from.get()) {
            let entry = EntryIndex::new(i);
            view.set_line_offset(LineOffset::new(self.slots.len()));
            self.slots
                .extend((0..view.line_count()).map(|line| LineSlot { entry, line }));
        }
    }

    /// Expand or collapse an entry.
    pub fn set_expanded(&mut self, index: EntryIndex, expanded: bool) -> LayoutChange {
        self.mutate_entry(index, |view| {
            view.set_expanded(expanded);
        })
    }

    /// Flip an entry's expanded state.
    pub fn toggle_expand(&mut self, index: EntryIndex) -> LayoutChange {
        self.mutate_entry(index, |view| {
            view.toggle_expand();
        })
    }

    /// Select or deselect an entry.
    pub fn set_selected(&mut self, index: EntryIndex, selected: bool) -> LayoutChange {
        self.mutate_entry(index, |view| view.set_selected(selected))
    }

    /// Current search text.
    pub fn search_text(&self) -> &str {
        &self.search_text
    }

    /// Highlight `text` in every entry. An empty string clears highlighting.
    ///
    /// Line counts do not change; each entry restyles lazily on its next
    /// render.
    pub fn set_search_text(&mut self, text: impl Into<String>) {
        self.search_text = text.into();
    }

    /// Occurrences of `text` per entry, for entries with at least one.
    pub fn search_counts(&self, text: &str) -> BTreeMap<EntryIndex, usize> {
        self.entries
            .iter()
            .enumerate()
            .filter_map(|(i, view)| {
                let count = view.search(text);
                (count > 0).then_some((EntryIndex::new(i), count))
            })
            .collect()
    }

    /// Drop all entries. Styles and search text are kept.
    pub fn clear(&mut self) {
        self.entries.clear();
        self.slots.clear();
        self.max_width = 0;
    }
}
