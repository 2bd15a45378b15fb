//! Console session — bridges one WebSocket connection onto one supervisor.
//!
//! Inbound frames carry control messages (`start`, `stop`, `command`);
//! outbound frames are raw server output lines in production order. The two
//! directions share the socket but are otherwise independent: pumping output
//! never blocks receipt of the next control message.

use axum::extract::ws::{Message, WebSocket};
use serde::Deserialize;
use tokio::sync::mpsc;
use uuid::Uuid;

use crate::supervisor::{LaunchConfig, Supervisor, SupervisorError};

/// One inbound control message. Consumed once, never persisted.
#[derive(Debug, Clone, Deserialize, PartialEq, Eq)]
#[serde(tag = "action", rename_all = "lowercase")]
pub enum ControlMessage {
    Start {
        min_ram: u32,
        max_ram: u32,
        server_name: String,
    },
    Stop,
    Command {
        command: String,
    },
}

/// A live console session. Owns its supervisor for the connection lifetime;
/// the underlying process deliberately outlives the session (detach).
pub struct ConsoleSession {
    id: Uuid,
    supervisor: Supervisor,
}

impl ConsoleSession {
    pub fn new(supervisor: Supervisor) -> Self {
        Self {
            id: Uuid::new_v4(),
            supervisor,
        }
    }

    /// Drive the session until the client disconnects.
    ///
    /// A single `select!` multiplexes inbound frames with the output line
    /// channel; the blocking per-line reads happen in the process handle's
    /// reader tasks, so a quiet server never stalls control handling.
    pub async fn run(self, mut socket: WebSocket) {
        tracing::info!(session = %self.id, "console session opened");
        let mut output: Option<mpsc::Receiver<String>> = None;

        loop {
            tokio::select! {
                frame = socket.recv() => {
                    match frame {
                        Some(Ok(Message::Text(text))) => {
                            if let Some(rx) = self.handle_text(&text).await {
                                output = Some(rx);
                            }
                        }
                        Some(Ok(Message::Close(_))) | None => break,
                        Some(Ok(_)) => {} // binary/ping/pong: nothing to do
                        Some(Err(e)) => {
                            tracing::debug!(session = %self.id, "socket error: {}", e);
                            break;
                        }
                    }
                }
                line = recv_line(&mut output), if output.is_some() => {
                    match line {
                        Some(line) => {
                            if socket.send(Message::Text(line)).await.is_err() {
                                // Client is gone; the process keeps running.
                                break;
                            }
                        }
                        None => {
                            tracing::info!(session = %self.id, "server output stream ended");
                            output = None;
                        }
                    }
                }
            }
        }

        let process_running = self.supervisor.is_running().await;
        tracing::info!(
            session = %self.id,
            process_running,
            "console session closed"
        );
    }

    /// Parse and dispatch one inbound frame. Malformed input fails the
    /// message, never the session.
    async fn handle_text(&self, text: &str) -> Option<mpsc::Receiver<String>> {
        match serde_json::from_str::<ControlMessage>(text) {
            Ok(msg) => self.dispatch(msg).await,
            Err(e) => {
                tracing::warn!(session = %self.id, "ignoring malformed control message: {}", e);
                None
            }
        }
    }

    /// Apply one control message to the supervisor. Returns the output
    /// receiver when a freshly started process should begin streaming.
    pub async fn dispatch(&self, msg: ControlMessage) -> Option<mpsc::Receiver<String>> {
        match msg {
            ControlMessage::Start {
                min_ram,
                max_ram,
                server_name,
            } => {
                let config = LaunchConfig::new(min_ram, max_ram, server_name);
                match self.supervisor.start(&config).await {
                    Ok(()) => self.supervisor.take_output().await,
                    Err(SupervisorError::AlreadyRunning) => {
                        // The running process already has its pump; starting
                        // a second one is the one thing this must never do.
                        tracing::warn!(session = %self.id, "start ignored: already running");
                        None
                    }
                    Err(e) => {
                        tracing::error!(
                            session = %self.id,
                            code = e.error_code(),
                            "start failed: {}", e
                        );
                        None
                    }
                }
            }
            ControlMessage::Stop => {
                match self.supervisor.stop().await {
                    Ok(()) => tracing::info!(session = %self.id, "stop requested"),
                    // Stopping an idle server is not a caller-visible failure.
                    Err(SupervisorError::NotRunning) => {
                        tracing::debug!(session = %self.id, "stop ignored: not running")
                    }
                    Err(e) => tracing::warn!(session = %self.id, "stop failed: {}", e),
                }
                None
            }
            ControlMessage::Command { command } => {
                if let Err(e) = self.supervisor.send_command(&command).await {
                    tracing::warn!(
                        session = %self.id,
                        code = e.error_code(),
                        "command failed: {}", e
                    );
                }
                None
            }
        }
    }
}

/// Receive the next output line. Only polled while a receiver is armed; the
/// caller guards with `output.is_some()`.
async fn recv_line(output: &mut Option<mpsc::Receiver<String>>) -> Option<String> {
    match output.as_mut() {
        Some(rx) => rx.recv().await,
        None => None,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn session() -> ConsoleSession {
        ConsoleSession::new(Supervisor::new("/nonexistent", "java"))
    }

    #[test]
    fn test_parse_start_message() {
        let msg: ControlMessage =
            serde_json::from_str(r#"{"action":"start","min_ram":1,"max_ram":2,"server_name":"s1"}"#)
                .unwrap();
        assert_eq!(
            msg,
            ControlMessage::Start {
                min_ram: 1,
                max_ram: 2,
                server_name: "s1".to_string()
            }
        );
    }

    #[test]
    fn test_parse_stop_and_command() {
        let msg: ControlMessage = serde_json::from_str(r#"{"action":"stop"}"#).unwrap();
        assert_eq!(msg, ControlMessage::Stop);

        let msg: ControlMessage =
            serde_json::from_str(r#"{"action":"command","command":"say hi"}"#).unwrap();
        assert_eq!(
            msg,
            ControlMessage::Command {
                command: "say hi".to_string()
            }
        );
    }

    #[test]
    fn test_parse_rejects_unknown_action() {
        assert!(serde_json::from_str::<ControlMessage>(r#"{"action":"restart"}"#).is_err());
    }

    #[test]
    fn test_parse_rejects_missing_fields() {
        assert!(serde_json::from_str::<ControlMessage>(r#"{"action":"command"}"#).is_err());
        assert!(
            serde_json::from_str::<ControlMessage>(r#"{"action":"start","min_ram":1}"#).is_err()
        );
        assert!(serde_json::from_str::<ControlMessage>(r#"{}"#).is_err());
    }

    #[tokio::test]
    async fn test_dispatch_stop_on_idle_is_swallowed() {
        // NotRunning must be absorbed, not propagated to the session.
        assert!(session().dispatch(ControlMessage::Stop).await.is_none());
    }

    #[tokio::test]
    async fn test_dispatch_command_on_idle_is_logged_not_fatal() {
        let out = session()
            .dispatch(ControlMessage::Command {
                command: "list".to_string(),
            })
            .await;
        assert!(out.is_none());
    }

    #[tokio::test]
    async fn test_dispatch_start_failure_yields_no_pump() {
        let out = session()
            .dispatch(ControlMessage::Start {
                min_ram: 1,
                max_ram: 2,
                server_name: "ghost".to_string(),
            })
            .await;
        assert!(out.is_none());
    }

    #[tokio::test]
    async fn test_malformed_text_is_ignored() {
        let s = session();
        assert!(s.handle_text("not json").await.is_none());
        assert!(s.handle_text(r#"{"action":"launch"}"#).await.is_none());
    }
}
