//! Error types for podtail.
//!
//! This module defines the error taxonomy using `thiserror`. Errors compose
//! via `?` and `From` conversions.
//!
//! # Error Hierarchy
//!
//! - [`AppError`] - Top-level binary error wrapping all domain failures
//!   - [`TailError`] - A tail session ended with a failure
//!     - [`SourceError`] - The external log source failed
//!   - [`ConfigError`] - Configuration file could not be read or parsed
//!   - [`LoggingError`] - Tracing subscriber could not be installed
//!   - `std::io::Error` - Writing output failed
//!
//! # Recovery Strategy
//!
//! | Failure | Where handled | Outcome |
//! |---|---|---|
//! | `SourceError::Timeout` on a follow connection | tailer | reconnect, invisible to consumer |
//! | undecodable bytes | tailer | inline marker line, session continues |
//! | missing overlap after reconnect | tailer | inline warning line, session continues |
//! | any other `SourceError` | tailer | session ends, [`TailError`] reported once |
//! | cancellation | tailer | normal stop, not an error |

use crate::config::ConfigError;
use crate::logging::LoggingError;
use thiserror::Error;

/// Top-level application error.
///
/// Returned from the binary's main loop. Library code returns the more
/// specific error types below.
#[derive(Debug, Error)]
pub enum AppError {
    /// Configuration could not be loaded.
    #[error("Configuration error: {0}")]
    Config(#[from] ConfigError),

    /// The tracing subscriber could not be installed.
    #[error("Logging setup failed: {0}")]
    Logging(#[from] LoggingError),

    /// The tail session failed.
    #[error("Tail session failed: {0}")]
    Tail(#[from] TailError),

    /// Neither the command line nor the config file names a pod.
    #[error("No pod given: pass <POD> or set `pod` in the config file")]
    NoPod,

    /// Writing output failed.
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
}

/// Errors raised by a [`LogSource`](crate::source::LogSource) while opening
/// or reading a log connection.
#[derive(Debug, Error)]
pub enum SourceError {
    /// No data arrived within the read timeout.
    ///
    /// On a follow connection this is a retry signal, not a failure: the
    /// platform routinely severs idle log streams.
    #[error("Timed out waiting for log data")]
    Timeout,

    /// I/O failure talking to the source.
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    /// The log-producing process exited unsuccessfully.
    #[error("Log process exited with status {code:?}: {stderr}")]
    Exited {
        /// Exit code, if the process was not killed by a signal.
        code: Option<i32>,
        /// Captured standard error, trimmed.
        stderr: String,
    },

    /// Any other source failure.
    #[error("{0}")]
    Other(String),
}

impl SourceError {
    /// True for the retryable timeout case.
    pub fn is_timeout(&self) -> bool {
        matches!(self, SourceError::Timeout)
    }
}

/// A tail session ended with a failure.
///
/// Reported exactly once, from [`LogTailer::stop`](crate::tailer::LogTailer::stop)
/// or [`LogTailer::wait`](crate::tailer::LogTailer::wait).
#[derive(Debug, Error)]
pub enum TailError {
    /// The log source failed in a non-retryable way.
    #[error("Log source failed: {0}")]
    Source(#[from] SourceError),

    /// The reading task panicked.
    #[error("Log reading task panicked: {0}")]
    TaskPanicked(String),
}
