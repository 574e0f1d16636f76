//! Log source backed by the `kubectl logs` command.

use super::{trim_line_terminator, LineStream, LogRequest, LogSource, RawLine};
use crate::model::SourceError;
use async_trait::async_trait;
use futures_util::stream::{self, StreamExt};
use std::path::PathBuf;
use std::process::Stdio;
use std::time::Duration;
use tokio::io::{AsyncBufReadExt, AsyncReadExt, BufReader};
use tokio::process::{Child, ChildStdout, Command};
use tokio::task::JoinHandle;
use tracing::debug;

/// Default time a connection may stay silent before it counts as timed out.
pub const DEFAULT_READ_TIMEOUT: Duration = Duration::from_secs(60);

/// Runs `kubectl logs <pod> -n <namespace> --tail=<n> [-f]` per connection.
///
/// The child process is killed when its stream is dropped, so cancelling
/// a tail session tears the connection down.
#[derive(Debug, Clone)]
pub struct KubectlSource {
    binary: PathBuf,
    read_timeout: Duration,
}

impl KubectlSource {
    /// Use the given `kubectl` binary.
    pub fn new(binary: impl Into<PathBuf>) -> Self {
        Self {
            binary: binary.into(),
            read_timeout: DEFAULT_READ_TIMEOUT,
        }
    }

    /// Set how long a connection may stay silent before yielding
    /// [`SourceError::Timeout`].
    pub fn with_read_timeout(mut self, read_timeout: Duration) -> Self {
        self.read_timeout = read_timeout;
        self
    }

    /// Command-line arguments for a request.
    pub fn args(request: &LogRequest) -> Vec<String> {
        let mut args = vec![
            "logs".to_string(),
            request.pod.clone(),
            "--namespace".to_string(),
            request.namespace.clone(),
            format!("--tail={}", request.tail_lines),
        ];
        if request.follow {
            args.push("--follow".to_string());
        }
        args
    }
}

impl Default for KubectlSource {
    fn default() -> Self {
        Self::new("kubectl")
    }
}

#[async_trait]
impl LogSource for KubectlSource {
    async fn fetch_log(&self, request: &LogRequest) -> Result<LineStream, SourceError> {
        let args = Self::args(request);
        debug!(binary = ?self.binary, ?args, "Spawning kubectl");

        let mut child = Command::new(&self.binary)
            .args(&args)
            .stdin(Stdio::null())
            .stdout(Stdio::piped())
            .stderr(Stdio::piped())
            .kill_on_drop(true)
            .spawn()?;

        let stdout = child
            .stdout
            .take()
            .ok_or_else(|| SourceError::Other("kubectl stdout was not captured".into()))?;

        // Drained concurrently so a chatty stderr cannot fill its pipe and
        // stall the process.
        let stderr = child.stderr.take().map(|mut pipe| {
            tokio::spawn(async move {
                let mut text = String::new();
                let _ = pipe.read_to_string(&mut text).await;
                text
            })
        });

        let connection = Connection {
            child,
            stdout: BufReader::new(stdout),
            stderr,
            read_timeout: self.read_timeout,
        };

        Ok(stream::unfold(Some(connection), |state| async move {
            let mut connection = state?;
            match connection.next_line().await {
                Ok(Some(line)) => Some((Ok(line), Some(connection))),
                Ok(None) => None,
                Err(err) => Some((Err(err), None)),
            }
        })
        .boxed())
    }
}

/// One running `kubectl logs` process.
struct Connection {
    child: Child,
    stdout: BufReader<ChildStdout>,
    stderr: Option<JoinHandle<String>>,
    read_timeout: Duration,
}

impl Connection {
    async fn next_line(&mut self) -> Result<Option<RawLine>, SourceError> {
        let mut buf = Vec::new();
        let read = tokio::time::timeout(self.read_timeout, self.stdout.read_until(b'\n', &mut buf))
            .await
            .map_err(|_| SourceError::Timeout)??;

        if read == 0 {
            self.finish().await?;
            return Ok(None);
        }
        Ok(Some(trim_line_terminator(buf)))
    }

    /// Reap the process at EOF, turning a failed exit into an error.
    async fn finish(&mut self) -> Result<(), SourceError> {
        let status = self.child.wait().await?;
        if status.success() {
            return Ok(());
        }

        let stderr = match self.stderr.take() {
            Some(task) => task.await.unwrap_or_default(),
            None => String::new(),
        };
        Err(SourceError::Exited {
            code: status.code(),
            stderr: stderr.trim().to_string(),
        })
    }
}
