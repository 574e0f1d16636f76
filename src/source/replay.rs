//! File-backed log source for demos and offline viewing.
//!
//! History requests return the last `tail_lines` lines of the file. Follow
//! requests first re-send the last `tail_lines` lines (like a real
//! `--tail=N --follow` connection) and then cycle through the whole file
//! forever, one line per `delay`.

use super::{trim_line_terminator, LineStream, LogRequest, LogSource, RawLine};
use crate::model::SourceError;
use async_trait::async_trait;
use futures_util::stream::{self, StreamExt};
use std::path::PathBuf;
use std::sync::Arc;
use std::time::Duration;

/// Default pause between replayed lines on a follow connection.
pub const DEFAULT_REPLAY_DELAY: Duration = Duration::from_millis(500);

/// Serves log lines from a local file.
#[derive(Debug, Clone)]
pub struct ReplaySource {
    path: PathBuf,
    delay: Duration,
}

impl ReplaySource {
    /// Replay the given file.
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self {
            path: path.into(),
            delay: DEFAULT_REPLAY_DELAY,
        }
    }

    /// Set the pause between lines on follow connections.
    pub fn with_delay(mut self, delay: Duration) -> Self {
        self.delay = delay;
        self
    }

    async fn load_lines(&self) -> Result<Arc<Vec<RawLine>>, SourceError> {
        let bytes = tokio::fs::read(&self.path).await?;
        let lines: Vec<RawLine> = bytes
            .split_inclusive(|b| *b == b'\n')
            .map(|line| trim_line_terminator(line.to_vec()))
            .collect();
        Ok(Arc::new(lines))
    }
}

#[async_trait]
impl LogSource for ReplaySource {
    async fn fetch_log(&self, request: &LogRequest) -> Result<LineStream, SourceError> {
        let lines = self.load_lines().await?;
        let tail_start = lines.len().saturating_sub(request.tail_lines);

        if !request.follow {
            let history: Vec<Result<RawLine, SourceError>> =
                lines[tail_start..].iter().cloned().map(Ok).collect();
            return Ok(stream::iter(history).boxed());
        }

        if lines.is_empty() {
            return Ok(stream::pending::<Result<RawLine, SourceError>>().boxed());
        }

        let len = lines.len();
        let overlap = len - tail_start;
        let positions = (tail_start..len).chain((0..len).cycle());
        let delay = self.delay;

        Ok(stream::iter(positions.enumerate())
            .then(move |(sent, position)| {
                let lines = Arc::clone(&lines);
                async move {
                    if sent >= overlap {
                        tokio::time::sleep(delay).await;
                    }
                    Ok::<RawLine, SourceError>(lines[position].clone())
                }
            })
            .boxed())
    }
}
