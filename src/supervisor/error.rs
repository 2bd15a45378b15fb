//! Supervisor error types. Variants are distinguished so callers can decide
//! which failures are recoverable and which must be surfaced to the client.

/// Errors raised by supervisor operations.
#[derive(thiserror::Error, Debug)]
pub enum SupervisorError {
    #[error("server is already running")]
    AlreadyRunning,

    #[error("server is not running")]
    NotRunning,

    #[error("invalid launch config: {0}")]
    InvalidConfig(String),

    #[error("failed to launch server: {reason}")]
    Launch { reason: String },

    #[error("i/o error: {0}")]
    Io(#[from] std::io::Error),
}

impl SupervisorError {
    /// Machine-readable error code, logged alongside session ids.
    pub fn error_code(&self) -> &'static str {
        match self {
            Self::AlreadyRunning => "ALREADY_RUNNING",
            Self::NotRunning => "NOT_RUNNING",
            Self::InvalidConfig(_) => "INVALID_CONFIG",
            Self::Launch { .. } => "LAUNCH_FAILED",
            Self::Io(_) => "IO_ERROR",
        }
    }
}
