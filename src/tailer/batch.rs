//! Debounced batching of records for the display.
//!
//! Appending one record at a time makes the view reindex and redraw for
//! every line during a burst. The batcher collects records until the
//! stream has been idle for `idle_delay` or `max_batch` records are
//! pending, whichever comes first.

use crate::model::Record;
use futures_util::{Stream, StreamExt};
use std::time::Duration;

/// Default idle period that flushes a pending batch.
pub const DEFAULT_IDLE_DELAY: Duration = Duration::from_millis(200);

/// Default maximum number of records per batch.
pub const DEFAULT_MAX_BATCH: usize = 100;

/// Batching parameters.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct BatchConfig {
    /// Flush once no record arrived for this long.
    pub idle_delay: Duration,
    /// Flush once this many records are pending.
    pub max_batch: usize,
}

impl Default for BatchConfig {
    fn default() -> Self {
        Self {
            idle_delay: DEFAULT_IDLE_DELAY,
            max_batch: DEFAULT_MAX_BATCH,
        }
    }
}

/// Groups a record stream into batches.
#[derive(Debug)]
pub struct RecordBatcher<S> {
    records: S,
    config: BatchConfig,
    finished: bool,
}

impl<S> RecordBatcher<S>
where
    S: Stream<Item = Record> + Unpin,
{
    /// Batch the given stream.
    pub fn new(records: S, config: BatchConfig) -> Self {
        Self {
            records,
            config,
            finished: false,
        }
    }

    /// Wait for the next non-empty batch.
    ///
    /// Returns `None` once the underlying stream has ended and every
    /// record was handed out.
    pub async fn next_batch(&mut self) -> Option<Vec<Record>> {
        if self.finished {
            return None;
        }
        let Some(first) = self.records.next().await else {
            self.finished = true;
            return None;
        };

        let max_batch = self.config.max_batch.max(1);
        let mut batch = vec![first];
        while batch.len() < max_batch {
            match tokio::time::timeout(self.config.idle_delay, self.records.next()).await {
                Ok(Some(record)) => batch.push(record),
                Ok(None) => {
                    self.finished = true;
                    break;
                }
                Err(_) => break,
            }
        }
        Some(batch)
    }
}
