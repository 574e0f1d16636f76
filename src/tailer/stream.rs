//! Consumer side of the tailer queue.

use crate::model::Record;
use crate::parser::LineParser;
use futures_util::Stream;
use std::pin::Pin;
use std::sync::Arc;
use std::task::{Context, Poll};
use tokio::sync::mpsc;

/// Lazy, unbounded stream of parsed records for one tail session.
///
/// Raw lines are parsed as they are taken off the queue. The stream ends
/// once the session's reading task has finished and every queued line has
/// been yielded.
pub struct RecordStream {
    queue: Option<mpsc::UnboundedReceiver<String>>,
    parser: Arc<dyn LineParser>,
}

impl RecordStream {
    pub(crate) fn new(
        queue: Option<mpsc::UnboundedReceiver<String>>,
        parser: Arc<dyn LineParser>,
    ) -> Self {
        Self { queue, parser }
    }

    /// Take the next record if one is already queued, without waiting.
    ///
    /// Useful for draining the queue from a synchronous render loop.
    pub fn try_next(&mut self) -> Option<Record> {
        let raw = self.queue.as_mut()?.try_recv().ok()?;
        Some(self.parser.parse(&raw))
    }

    /// True if this stream was handed out without a queue (another
    /// consumer already owns the session) and will never yield.
    pub fn is_detached(&self) -> bool {
        self.queue.is_none()
    }
}

impl Stream for RecordStream {
    type Item = Record;

    fn poll_next(self: Pin<&mut Self>, cx: &mut Context<'_>) -> Poll<Option<Record>> {
        let this = self.get_mut();
        let Some(queue) = this.queue.as_mut() else {
            return Poll::Ready(None);
        };
        let parser = &this.parser;
        queue
            .poll_recv(cx)
            .map(|raw| raw.map(|raw| parser.parse(&raw)))
    }
}

impl std::fmt::Debug for RecordStream {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("RecordStream")
            .field("detached", &self.is_detached())
            .finish()
    }
}
