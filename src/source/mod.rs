//! Log sources.
//!
//! A [`LogSource`] opens log connections for one pod. Each connection is a
//! [`LineStream`] of raw byte lines; the tailer owns reconnecting and
//! deduplicating across connections.
//!
//! - [`KubectlSource`] - shells out to `kubectl logs`
//! - [`ReplaySource`] - serves lines from a local file (demos, offline use)

use crate::model::SourceError;
use async_trait::async_trait;
use futures_util::stream::BoxStream;

pub mod kubectl;
pub mod replay;

pub use kubectl::KubectlSource;
pub use replay::ReplaySource;

/// One raw log line as delivered by a source, without its line terminator.
pub type RawLine = Vec<u8>;

/// A single log connection.
///
/// Ends at EOF. Yields `Err(SourceError::Timeout)` when the connection
/// stalls; the stream should not be polled after yielding an error.
pub type LineStream = BoxStream<'static, Result<RawLine, SourceError>>;

/// Parameters of one log request.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct LogRequest {
    /// Pod name.
    pub pod: String,
    /// Namespace of the pod.
    pub namespace: String,
    /// Number of history lines to include.
    pub tail_lines: usize,
    /// Keep the connection open and stream new lines.
    pub follow: bool,
}

/// An external source of pod log lines.
#[async_trait]
pub trait LogSource: Send + Sync + 'static {
    /// Open a log connection.
    ///
    /// # Errors
    ///
    /// Returns a [`SourceError`] if the connection cannot be established.
    /// A `Timeout` here is treated like a timeout while reading.
    async fn fetch_log(&self, request: &LogRequest) -> Result<LineStream, SourceError>;
}

/// Strip one trailing `\n` or `\r\n`.
pub(crate) fn trim_line_terminator(mut line: RawLine) -> RawLine {
    if line.last() == Some(&b'\n') {
        line.pop();
        if line.last() == Some(&b'\r') {
            line.pop();
        }
    }
    line
}
