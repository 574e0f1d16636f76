//! Test harness for tailer and view tests
//!
//! Provides a scripted [`LogSource`] that plays back a fixed sequence of
//! connection events, plus helpers for turning rendered lines into strings
//! for snapshot testing.

use crate::model::SourceError;
use crate::source::{LineStream, LogRequest, LogSource, RawLine};
use async_trait::async_trait;
use futures_util::stream::{self, StreamExt};
use ratatui::text::Line;
use std::collections::VecDeque;
use std::sync::{Arc, Mutex};
use tokio::sync::Notify;

/// One scripted event on a log connection.
#[derive(Debug, Clone)]
pub enum Scripted {
    /// A raw line arrives.
    Line(RawLine),
    /// The connection stalls and times out.
    Timeout,
    /// The connection closes normally.
    Eof,
    /// The connection fails with a non-retryable error.
    Fail(&'static str),
}

/// Shorthand for a UTF-8 [`Scripted::Line`].
pub fn line(text: &str) -> Scripted {
    Scripted::Line(text.as_bytes().to_vec())
}

/// Scripted log source.
///
/// History requests (`follow == false`) replay `history` and end. Follow
/// connections share one cursor over `follow`: each connection consumes
/// events until `Eof`, `Timeout` or `Fail` ends it, and the next
/// connection picks up after that event. Once the follow script is used
/// up the connection stays open forever and [`exhausted`](Self::exhausted)
/// is notified.
pub struct ScriptedSource {
    history: Vec<Scripted>,
    follow: Arc<Mutex<VecDeque<Scripted>>>,
    requests: Arc<Mutex<Vec<LogRequest>>>,
    exhausted: Arc<Notify>,
}

impl ScriptedSource {
    /// Create a source from a history batch and a follow script.
    pub fn new(history: Vec<Scripted>, follow: Vec<Scripted>) -> Self {
        Self {
            history,
            follow: Arc::new(Mutex::new(follow.into())),
            requests: Arc::new(Mutex::new(Vec::new())),
            exhausted: Arc::new(Notify::new()),
        }
    }

    /// Notified once a follow connection runs out of script.
    pub fn exhausted(&self) -> Arc<Notify> {
        Arc::clone(&self.exhausted)
    }

    /// Shared log of every request made so far.
    pub fn requests(&self) -> Arc<Mutex<Vec<LogRequest>>> {
        Arc::clone(&self.requests)
    }

    fn history_stream(&self) -> LineStream {
        let mut items = Vec::new();
        for event in &self.history {
            match event {
                Scripted::Line(bytes) => items.push(Ok(bytes.clone())),
                Scripted::Timeout => {
                    items.push(Err(SourceError::Timeout));
                    break;
                }
                Scripted::Fail(msg) => {
                    items.push(Err(SourceError::Other((*msg).to_string())));
                    break;
                }
                Scripted::Eof => break,
            }
        }
        stream::iter(items).boxed()
    }

    fn follow_stream(&self) -> LineStream {
        let script = Arc::clone(&self.follow);
        let exhausted = Arc::clone(&self.exhausted);

        stream::unfold(true, move |open| {
            let script = Arc::clone(&script);
            let exhausted = Arc::clone(&exhausted);
            async move {
                if !open {
                    return None;
                }
                let next = script.lock().unwrap().pop_front();
                match next {
                    Some(Scripted::Line(bytes)) => Some((Ok(bytes), true)),
                    Some(Scripted::Timeout) => Some((Err(SourceError::Timeout), false)),
                    Some(Scripted::Fail(msg)) => {
                        Some((Err(SourceError::Other(msg.to_string())), false))
                    }
                    Some(Scripted::Eof) => None,
                    None => {
                        exhausted.notify_one();
                        std::future::pending::<Option<(Result<RawLine, SourceError>, bool)>>()
                            .await
                    }
                }
            }
        })
        .boxed()
    }
}

#[async_trait]
impl LogSource for ScriptedSource {
    async fn fetch_log(&self, request: &LogRequest) -> Result<LineStream, SourceError> {
        self.requests.lock().unwrap().push(request.clone());
        if request.follow {
            Ok(self.follow_stream())
        } else {
            Ok(self.history_stream())
        }
    }
}

/// Render lines as plain text, one per row, for snapshot testing.
///
/// Trailing whitespace is trimmed so padded rows stay readable.
pub fn lines_to_string(lines: &[Line<'_>]) -> String {
    lines
        .iter()
        .map(|line| {
            let text: String = line.spans.iter().map(|s| s.content.as_ref()).collect();
            text.trim_end().to_string()
        })
        .collect::<Vec<_>>()
        .join("\n")
}
