//! Process supervisor — owns at most one live Minecraft server process and
//! mediates every interaction with it.
//!
//! One supervisor exists per console session, never process-wide. `start`
//! transitions Idle → Running; the state returns to Idle only once the
//! process is observed to have exited. `stop` is a cooperative shutdown
//! request through the server's own command console, not a kill.

pub mod error;
pub mod launch;
pub mod process;

use std::path::PathBuf;

use tokio::sync::{mpsc, Mutex};

pub use error::SupervisorError;
pub use launch::LaunchConfig;
use process::ProcessHandle;

pub struct Supervisor {
    servers_root: PathBuf,
    java_bin: String,
    handle: Mutex<Option<ProcessHandle>>,
}

impl Supervisor {
    pub fn new(servers_root: impl Into<PathBuf>, java_bin: impl Into<String>) -> Self {
        Self {
            servers_root: servers_root.into(),
            java_bin: java_bin.into(),
            handle: Mutex::new(None),
        }
    }

    /// Launch the server selected by `config`.
    ///
    /// Fails with `AlreadyRunning` while a live process exists; a handle
    /// whose process has exited is replaced. The eula acceptance marker is
    /// rewritten before every spawn.
    pub async fn start(&self, config: &LaunchConfig) -> Result<(), SupervisorError> {
        let mut handle = self.handle.lock().await;
        if let Some(existing) = handle.as_ref() {
            if existing.is_running() {
                return Err(SupervisorError::AlreadyRunning);
            }
        }

        config.validate()?;
        let dir = config.resolve_dir(&self.servers_root)?;
        launch::accept_eula(&dir)?;

        let spawned = ProcessHandle::spawn(&self.java_bin, &config.java_args(), &dir).await?;
        tracing::info!(
            pid = spawned.pid,
            server = %config.server_name,
            "server process started"
        );
        *handle = Some(spawned);
        Ok(())
    }

    /// Request cooperative shutdown by writing `stop` to the server console.
    ///
    /// Returns as soon as the line is flushed; the process exits on its own
    /// schedule and the handle stays in place until exit is observed.
    pub async fn stop(&self) -> Result<(), SupervisorError> {
        let handle = self.handle.lock().await;
        match handle.as_ref().filter(|h| h.is_running()) {
            Some(h) => h.write_line("stop").await,
            None => Err(SupervisorError::NotRunning),
        }
    }

    /// Forward one console command verbatim, newline-terminated.
    ///
    /// Content is not inspected; whatever the server console accepts goes
    /// through.
    pub async fn send_command(&self, line: &str) -> Result<(), SupervisorError> {
        let handle = self.handle.lock().await;
        match handle.as_ref().filter(|h| h.is_running()) {
            Some(h) => h.write_line(line).await,
            None => Err(SupervisorError::NotRunning),
        }
    }

    /// Take the merged stdout/stderr line receiver of the current process.
    ///
    /// Single-shot per spawn: the first caller owns the stream until the
    /// process exits and the channel drains.
    pub async fn take_output(&self) -> Option<mpsc::Receiver<String>> {
        let mut handle = self.handle.lock().await;
        handle.as_mut()?.take_output()
    }

    /// Whether a live process is currently owned by this supervisor.
    pub async fn is_running(&self) -> bool {
        let handle = self.handle.lock().await;
        handle.as_ref().is_some_and(|h| h.is_running())
    }

    /// PID of the current process, if one is live.
    #[allow(dead_code)]
    pub async fn pid(&self) -> Option<u32> {
        let handle = self.handle.lock().await;
        handle.as_ref().filter(|h| h.is_running()).map(|h| h.pid)
    }
}
