//! Overlap detection across follow reconnects.
//!
//! Every delivered line is remembered in a small FIFO window. When a new
//! follow connection opens, its first lines are compared against the
//! window to find where the previous connection left off:
//!
//! ```text
//!                  line in window?   window empty?
//! AwaitingOverlap ──── yes ────────────────────────► InSync    (skip)
//!        │ ─────────── no ─────────── yes ────────► InSync    (deliver)
//!        └──────────── no ─────────── no ─────────► Resynced  (gap, deliver)
//! InSync ───────────── yes ───────────────────────► InSync    (skip)
//!        └──────────── no ────────────────────────► Resynced  (deliver)
//! Resynced ───────────────────────────────────────► Resynced  (deliver)
//! ```

use crate::source::RawLine;
use std::collections::VecDeque;

/// Default number of recent lines remembered for overlap detection.
pub const DEFAULT_WINDOW_SIZE: usize = 10;

/// Bounded FIFO of the most recently delivered raw lines.
///
/// Compared by bytes, not decoded text. Oldest lines are evicted first.
#[derive(Debug, Clone)]
pub struct RecentLines {
    lines: VecDeque<RawLine>,
    capacity: usize,
}

impl RecentLines {
    /// Create an empty window. A capacity of zero is raised to one.
    pub fn new(capacity: usize) -> Self {
        let capacity = capacity.max(1);
        Self {
            lines: VecDeque::with_capacity(capacity),
            capacity,
        }
    }

    /// Remember a delivered line, evicting the oldest when full.
    pub fn push(&mut self, line: RawLine) {
        if self.lines.len() == self.capacity {
            self.lines.pop_front();
        }
        self.lines.push_back(line);
    }

    /// True if an identical line is in the window.
    pub fn contains(&self, line: &[u8]) -> bool {
        self.lines.iter().any(|l| l.as_slice() == line)
    }

    /// Number of remembered lines.
    pub fn len(&self) -> usize {
        self.lines.len()
    }

    /// True if nothing has been delivered yet.
    pub fn is_empty(&self) -> bool {
        self.lines.is_empty()
    }

    /// Maximum number of remembered lines.
    pub fn capacity(&self) -> usize {
        self.capacity
    }
}

impl Default for RecentLines {
    fn default() -> Self {
        Self::new(DEFAULT_WINDOW_SIZE)
    }
}

/// Position of a follow connection relative to already delivered lines.
///
/// Reset to `AwaitingOverlap` at the start of every follow connection.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum ReadingState {
    /// No line of this connection has been seen yet.
    #[default]
    AwaitingOverlap,
    /// Lines so far repeated the previous connection.
    InSync,
    /// Past the overlap; every line is new.
    Resynced,
}

/// What to do with one incoming follow line.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LineVerdict {
    /// New content: deliver it.
    Deliver,
    /// Already delivered by a previous connection: drop it.
    Duplicate,
    /// No overlap with the previous connection: announce a possible gap,
    /// then deliver the line.
    Gap,
}

impl ReadingState {
    /// Classify the next line of the connection and advance the state.
    pub fn classify(&mut self, line: &[u8], window: &RecentLines) -> LineVerdict {
        match *self {
            ReadingState::AwaitingOverlap if window.is_empty() => {
                *self = ReadingState::InSync;
                LineVerdict::Deliver
            }
            ReadingState::AwaitingOverlap if window.contains(line) => {
                *self = ReadingState::InSync;
                LineVerdict::Duplicate
            }
            ReadingState::AwaitingOverlap => {
                *self = ReadingState::Resynced;
                LineVerdict::Gap
            }
            ReadingState::InSync if window.contains(line) => LineVerdict::Duplicate,
            ReadingState::InSync => {
                *self = ReadingState::Resynced;
                LineVerdict::Deliver
            }
            ReadingState::Resynced => LineVerdict::Deliver,
        }
    }
}
