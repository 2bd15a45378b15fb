//! Process handle — direct process spawning with stdio capture.
//!
//! Owns the child's stdin write-end and fans stdout/stderr lines into a
//! single bounded channel. The channel receiver is taken exactly once per
//! spawn; line order within each stream is preserved.

use std::path::Path;
use std::process::Stdio;
use std::sync::Arc;

use tokio::io::{AsyncBufReadExt, AsyncWriteExt, BufReader};
use tokio::process::{ChildStdin, Command as TokioCommand};
use tokio::sync::{mpsc, watch, Mutex};

use super::error::SupervisorError;

/// Capacity of the merged output channel. Readers apply backpressure to the
/// child's pipes once the consumer falls this far behind.
const OUTPUT_CHANNEL_CAPACITY: usize = 256;

/// A spawned server process and its stdio plumbing.
#[derive(Debug)]
pub struct ProcessHandle {
    pub pid: u32,
    stdin: Arc<Mutex<ChildStdin>>,
    output_rx: Option<mpsc::Receiver<String>>,
    running_rx: watch::Receiver<bool>,
}

impl ProcessHandle {
    /// Spawn `program` with `args` in `working_dir`, stdin piped, stdout and
    /// stderr merged into one line channel.
    pub async fn spawn(
        program: &str,
        args: &[String],
        working_dir: &Path,
    ) -> Result<Self, SupervisorError> {
        let mut cmd = TokioCommand::new(program);
        cmd.args(args)
            .current_dir(working_dir)
            .stdin(Stdio::piped())
            .stdout(Stdio::piped())
            .stderr(Stdio::piped())
            .kill_on_drop(false);

        let mut child = cmd.spawn().map_err(|e| SupervisorError::Launch {
            reason: format!("failed to spawn '{}': {}", program, e),
        })?;

        let pid = child.id().ok_or_else(|| SupervisorError::Launch {
            reason: "spawned process has no pid".to_string(),
        })?;

        let (line_tx, line_rx) = mpsc::channel::<String>(OUTPUT_CHANNEL_CAPACITY);
        let (running_tx, running_rx) = watch::channel(true);

        let stdout = child.stdout.take();
        let stderr = child.stderr.take();
        let stdin = child.stdin.take().ok_or_else(|| SupervisorError::Launch {
            reason: "spawned process has no stdin pipe".to_string(),
        })?;

        // stdout reader. Runs until pipe EOF even if the consumer is gone;
        // abandoning the pipe would SIGPIPE a detached server.
        if let Some(stdout) = stdout {
            let tx = line_tx.clone();
            tokio::spawn(async move {
                let mut lines = BufReader::new(stdout).lines();
                while let Ok(Some(line)) = lines.next_line().await {
                    let _ = tx.send(line).await;
                }
            });
        }

        // stderr reader
        if let Some(stderr) = stderr {
            let tx = line_tx.clone();
            tokio::spawn(async move {
                let mut lines = BufReader::new(stderr).lines();
                while let Ok(Some(line)) = lines.next_line().await {
                    let _ = tx.send(line).await;
                }
            });
        }
        // Drop the original sender so the channel closes once both readers
        // finish — that is how consumers observe process exit.
        drop(line_tx);

        // process waiter
        tokio::spawn(async move {
            match child.wait().await {
                Ok(status) => tracing::info!("server process {} exited with {}", pid, status),
                Err(e) => tracing::warn!("failed to wait for process {}: {}", pid, e),
            }
            let _ = running_tx.send(false);
        });

        Ok(Self {
            pid,
            stdin: Arc::new(Mutex::new(stdin)),
            output_rx: Some(line_rx),
            running_rx,
        })
    }

    /// Write one line to the child's stdin and flush immediately.
    ///
    /// A trailing newline is appended when missing; nothing else about the
    /// line is inspected.
    pub async fn write_line(&self, line: &str) -> Result<(), SupervisorError> {
        let data = if line.ends_with('\n') {
            line.to_string()
        } else {
            format!("{}\n", line)
        };
        let mut stdin = self.stdin.lock().await;
        stdin.write_all(data.as_bytes()).await?;
        stdin.flush().await?;
        Ok(())
    }

    /// Take the merged output receiver. Yields `None` after the first call.
    pub fn take_output(&mut self) -> Option<mpsc::Receiver<String>> {
        self.output_rx.take()
    }

    /// Whether the process is still running.
    pub fn is_running(&self) -> bool {
        *self.running_rx.borrow()
    }

    /// Wait until the waiter task observes process exit.
    #[allow(dead_code)]
    pub async fn wait_for_exit(&mut self) {
        while self.is_running() {
            if self.running_rx.changed().await.is_err() {
                break;
            }
        }
    }
}
