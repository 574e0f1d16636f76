//! Reconnecting pod log tailer.
//!
//! A [`LogTailer`] owns one tail session at a time. [`start`](LogTailer::start)
//! spawns a reading task that fetches the history batch once, then keeps
//! reopening short follow connections, using a [`RecentLines`] window to
//! drop the overlap each reconnect re-sends and to flag real gaps. Decoded
//! lines go onto an unbounded queue; [`read`](LogTailer::read) hands the
//! consumer a [`RecordStream`] that parses them lazily.
//!
//! The reading task is the only writer of the queue and the only owner of
//! the window. Cancellation goes through a [`CancellationToken`], and
//! [`stop`](LogTailer::stop) awaits the task so no line is queued after it
//! returns.

pub mod batch;
pub mod stream;
pub mod window;

pub use batch::{BatchConfig, RecordBatcher};
pub use stream::RecordStream;
pub use window::{LineVerdict, ReadingState, RecentLines};

use crate::model::{SourceError, TailError};
use crate::parser::{LineParser, ParserKind};
use crate::source::{LogRequest, LogSource, RawLine};
use futures_util::{FutureExt, StreamExt};
use std::sync::Arc;
use std::time::Duration;
use tokio::sync::{mpsc, watch};
use tokio::task::JoinHandle;
use tokio_util::sync::CancellationToken;
use tracing::{debug, error, info, trace, warn};

/// Marker line queued when a follow connection shares no line with the
/// previously delivered ones.
pub const GAP_MARKER: &str = "WARNING. MIGHT HAVE LOST A LOGLINE";

/// Prefix of the marker line queued in place of undecodable bytes.
pub const DECODE_ERROR_PREFIX: &str = "[error] Unable to parse incoming logline: ";

/// Default number of history lines requested when a session starts.
pub const DEFAULT_TAIL_LINES: usize = 500;

/// Default number of lines re-requested by each follow connection.
pub const DEFAULT_FOLLOW_TAIL_LINES: usize = 2;

/// Default pause before reopening a follow connection that reached EOF.
pub const DEFAULT_RECONNECT_DELAY: Duration = Duration::from_millis(500);

/// The pod being tailed.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TailTarget {
    /// Namespace of the pod.
    pub namespace: String,
    /// Pod name.
    pub pod: String,
    /// History lines requested when a session starts.
    pub tail_lines: usize,
}

impl TailTarget {
    /// Target a pod with the default history size.
    pub fn new(namespace: impl Into<String>, pod: impl Into<String>) -> Self {
        Self {
            namespace: namespace.into(),
            pod: pod.into(),
            tail_lines: DEFAULT_TAIL_LINES,
        }
    }

    /// Set the number of history lines.
    pub fn with_tail_lines(mut self, tail_lines: usize) -> Self {
        self.tail_lines = tail_lines;
        self
    }

    fn request(&self, tail_lines: usize, follow: bool) -> LogRequest {
        LogRequest {
            pod: self.pod.clone(),
            namespace: self.namespace.clone(),
            tail_lines,
            follow,
        }
    }
}

/// Protocol parameters of the reading task.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TailConfig {
    /// Capacity of the overlap window.
    pub window_size: usize,
    /// Lines re-requested by each follow connection. Must stay below
    /// `window_size` for overlap detection to work.
    pub follow_tail_lines: usize,
    /// Pause before reopening a follow connection after EOF.
    pub reconnect_delay: Duration,
}

impl Default for TailConfig {
    fn default() -> Self {
        Self {
            window_size: window::DEFAULT_WINDOW_SIZE,
            follow_tail_lines: DEFAULT_FOLLOW_TAIL_LINES,
            reconnect_delay: DEFAULT_RECONNECT_DELAY,
        }
    }
}

/// Lifecycle of the current session.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub enum TailStatus {
    /// No session was started yet.
    #[default]
    Idle,
    /// The reading task is running.
    Reading,
    /// The session was stopped.
    Stopped,
    /// The session ended with an error.
    Failed(String),
}

/// Published state of a tailer.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TailSnapshot {
    /// The pod being tailed.
    pub target: TailTarget,
    /// Lifecycle of the current session.
    pub status: TailStatus,
}

struct ReadTask {
    handle: JoinHandle<Result<(), TailError>>,
    cancel: CancellationToken,
}

/// Tails one pod's log across reconnects.
pub struct LogTailer {
    source: Arc<dyn LogSource>,
    parser: Arc<dyn LineParser>,
    config: TailConfig,
    state: Arc<watch::Sender<TailSnapshot>>,
    queue_tx: Option<mpsc::UnboundedSender<String>>,
    queue_rx: Option<mpsc::UnboundedReceiver<String>>,
    task: Option<ReadTask>,
}

impl LogTailer {
    /// Create an idle tailer with the JSON parser and default protocol
    /// parameters.
    pub fn new(source: Arc<dyn LogSource>, target: TailTarget) -> Self {
        let (state, _) = watch::channel(TailSnapshot {
            target,
            status: TailStatus::Idle,
        });
        let (queue_tx, queue_rx) = mpsc::unbounded_channel();
        Self {
            source,
            parser: ParserKind::default().build(),
            config: TailConfig::default(),
            state: Arc::new(state),
            queue_tx: Some(queue_tx),
            queue_rx: Some(queue_rx),
            task: None,
        }
    }

    /// Use a different line parser for records handed out by [`read`](Self::read).
    pub fn with_parser(mut self, parser: Arc<dyn LineParser>) -> Self {
        self.parser = parser;
        self
    }

    /// Use different protocol parameters.
    pub fn with_config(mut self, config: TailConfig) -> Self {
        self.config = config;
        self
    }

    /// Start a tail session.
    ///
    /// Starting while a session is running is ignored with a warning; stop
    /// the running session first. A session that already ended on its own
    /// is discarded and a new one starts.
    ///
    /// # Panics
    ///
    /// Panics if called outside a Tokio runtime.
    pub fn start(&mut self) {
        self.reap_ended();
        if self.task.is_some() {
            warn!("Tail session already started, ignoring start");
            return;
        }

        let queue = match self.queue_tx.take() {
            Some(tx) => tx,
            None => self.fresh_queue(),
        };
        let target = self.target();
        info!(pod = %target.pod, namespace = %target.namespace, "Starting tail session");
        self.set_status(TailStatus::Reading);

        let reader = Reader {
            source: Arc::clone(&self.source),
            target,
            config: self.config.clone(),
            recent: RecentLines::new(self.config.window_size),
            queue,
        };
        let cancel = CancellationToken::new();
        let token = cancel.clone();
        let state = Arc::clone(&self.state);

        let handle = tokio::spawn(async move {
            let result = tokio::select! {
                _ = token.cancelled() => {
                    debug!("Tail session cancelled");
                    Ok(())
                }
                result = reader.run() => result,
            };
            let status = match &result {
                Ok(()) => TailStatus::Stopped,
                Err(err) => {
                    error!(error = %err, "Tail session failed");
                    TailStatus::Failed(err.to_string())
                }
            };
            state.send_modify(|snapshot| snapshot.status = status);
            result
        });

        self.task = Some(ReadTask { handle, cancel });
    }

    /// Cancel the session and wait for the reading task to finish.
    ///
    /// Safe to call when no session is running. Lines queued before the
    /// call still drain from the consumer's stream, and no line is queued
    /// after this returns.
    ///
    /// # Errors
    ///
    /// Returns the session's failure if the reading task ended with an
    /// error that was not reported yet.
    pub async fn stop(&mut self) -> Result<(), TailError> {
        let Some(task) = self.task.take() else {
            return Ok(());
        };
        task.cancel.cancel();
        self.join(task.handle).await
    }

    /// Wait for the session to end on its own, without cancelling it.
    ///
    /// # Errors
    ///
    /// Returns the session's failure, as [`stop`](Self::stop) does.
    pub async fn wait(&mut self) -> Result<(), TailError> {
        let Some(task) = self.task.take() else {
            return Ok(());
        };
        self.join(task.handle).await
    }

    async fn join(&self, handle: JoinHandle<Result<(), TailError>>) -> Result<(), TailError> {
        let result = match handle.await {
            Ok(result) => result,
            Err(err) => {
                let err = TailError::TaskPanicked(err.to_string());
                self.set_status(TailStatus::Failed(err.to_string()));
                Err(err)
            }
        };
        if self.is_reading() {
            self.set_status(TailStatus::Stopped);
        }
        result
    }

    /// The consumer side of the current session.
    ///
    /// Only one stream per session receives lines; later calls during the
    /// same session return a stream that ends immediately. After a session
    /// was stopped, the next call prepares the queue for the next
    /// [`start`](Self::start).
    pub fn read(&mut self) -> RecordStream {
        self.reap_ended();
        if self.queue_rx.is_none() && self.queue_tx.is_none() && self.task.is_none() {
            let tx = self.fresh_queue();
            self.queue_tx = Some(tx);
        }
        RecordStream::new(self.queue_rx.take(), Arc::clone(&self.parser))
    }

    /// Drop a reading task that already ended on its own.
    ///
    /// Its failure was published on the status bus; it is logged here
    /// instead of being returned from a later `stop` or `wait`.
    fn reap_ended(&mut self) {
        let ended = self
            .task
            .as_ref()
            .is_some_and(|task| task.handle.is_finished() || !self.is_reading());
        if !ended {
            return;
        }
        let Some(task) = self.task.take() else {
            return;
        };
        match task.handle.now_or_never() {
            Some(Ok(Err(err))) => warn!(error = %err, "Discarding failed tail session"),
            Some(Err(err)) => warn!(error = %err, "Discarding panicked tail session"),
            _ => debug!("Discarding ended tail session"),
        }
        if self.is_reading() {
            self.set_status(TailStatus::Stopped);
        }
    }

    fn fresh_queue(&mut self) -> mpsc::UnboundedSender<String> {
        let (tx, rx) = mpsc::unbounded_channel();
        self.queue_rx = Some(rx);
        tx
    }

    /// True while the reading task is running.
    pub fn is_reading(&self) -> bool {
        self.state.borrow().status == TailStatus::Reading
    }

    /// Current lifecycle status.
    pub fn status(&self) -> TailStatus {
        self.state.borrow().status.clone()
    }

    /// The pod being tailed.
    pub fn target(&self) -> TailTarget {
        self.state.borrow().target.clone()
    }

    /// Change the pod for the next session and notify subscribers.
    ///
    /// A running session keeps tailing its original target.
    pub fn set_target(&self, target: TailTarget) {
        self.state.send_modify(|snapshot| snapshot.target = target);
    }

    /// Receive every target and status change. Dropping the receiver
    /// unsubscribes.
    pub fn subscribe(&self) -> watch::Receiver<TailSnapshot> {
        self.state.subscribe()
    }

    fn set_status(&self, status: TailStatus) {
        self.state.send_modify(|snapshot| snapshot.status = status);
    }
}

impl Drop for LogTailer {
    fn drop(&mut self) {
        if let Some(task) = self.task.take() {
            task.cancel.cancel();
        }
    }
}

/// State owned by the reading task.
struct Reader {
    source: Arc<dyn LogSource>,
    target: TailTarget,
    config: TailConfig,
    recent: RecentLines,
    queue: mpsc::UnboundedSender<String>,
}

impl Reader {
    async fn run(mut self) -> Result<(), TailError> {
        let history = self.target.request(self.target.tail_lines, false);
        let mut lines = self.source.fetch_log(&history).await?;
        while let Some(line) = lines.next().await {
            self.publish(line?);
        }
        debug!(lines = self.recent.len(), "History batch delivered");

        loop {
            match self.follow_once().await {
                Ok(()) => {
                    debug!("Follow connection closed, reconnecting");
                    tokio::time::sleep(self.config.reconnect_delay).await;
                }
                Err(err) if err.is_timeout() => {
                    info!(pod = %self.target.pod, "Follow connection timed out, reconnecting");
                }
                Err(err) => return Err(err.into()),
            }
        }
    }

    /// Read one follow connection until it ends.
    async fn follow_once(&mut self) -> Result<(), SourceError> {
        let request = self.target.request(self.config.follow_tail_lines, true);
        let mut lines = self.source.fetch_log(&request).await?;
        let mut state = ReadingState::default();

        while let Some(line) = lines.next().await {
            let line = line?;
            match state.classify(&line, &self.recent) {
                LineVerdict::Deliver => self.publish(line),
                LineVerdict::Duplicate => trace!("Skipping line from previous connection"),
                LineVerdict::Gap => {
                    warn!(pod = %self.target.pod, "No overlap with previous connection, lines may be lost");
                    self.send(GAP_MARKER.to_string());
                    self.publish(line);
                }
            }
        }
        Ok(())
    }

    /// Queue a line and remember it, or queue a marker if it is not UTF-8.
    fn publish(&mut self, line: RawLine) {
        match String::from_utf8(line) {
            Ok(text) => {
                self.send(text.clone());
                self.recent.push(text.into_bytes());
            }
            Err(err) => {
                error!(error = %err.utf8_error(), "Unable to decode log line");
                let lossy = String::from_utf8_lossy(err.as_bytes());
                self.send(format!("{DECODE_ERROR_PREFIX}{lossy}"));
            }
        }
    }

    fn send(&self, line: String) {
        if self.queue.send(line).is_err() {
            trace!("Consumer is gone, dropping line");
        }
    }
}
