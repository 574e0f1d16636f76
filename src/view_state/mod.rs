//! View-state layer - rendering cache, line addressing and scroll policy
//!
//! Pure, synchronous state owned by the consumer task. Nothing here does
//! I/O or knows about the tailer.
//!
//! # Module Structure
//!
//! - `types`: Core newtypes (LineOffset, EntryIndex, ViewportDimensions)
//! - `highlight`: Per-line styling passes (search, width fitting, selection)
//! - `entry_view`: LogEntryView - one record with cached rendered lines
//! - `line_index`: LineIndex - global line addressing with partial reindex
//! - `scroll`: scroll_to_reveal - pure cursor scroll policy

pub mod entry_view;
pub mod highlight;
pub mod line_index;
pub mod scroll;
pub mod types;

pub use entry_view::LogEntryView;
pub use highlight::RenderStyles;
pub use line_index::{LayoutChange, LineIndex, LineSlot};
pub use scroll::scroll_to_reveal;
pub use types::{EntryIndex, LineOffset, ViewportDimensions};
