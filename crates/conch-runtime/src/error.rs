//! Runtime error types.

use thiserror::Error;

pub use crate::config::error::{ConfigError, ConfigResult};

/// Errors that can occur while starting or driving an interpreter.
#[derive(Error, Debug)]
pub enum RuntimeError {
    /// The worker thread could not be spawned.
    #[error("Failed to spawn interpreter worker: {0}")]
    Spawn(#[from] std::io::Error),

    /// The worker has already shut down and accepts no more input.
    #[error("Interpreter has already stopped")]
    Stopped,

    /// The worker thread panicked.
    #[error("Interpreter worker panicked: {0}")]
    WorkerPanicked(String),

    /// Configuration could not be loaded.
    #[error(transparent)]
    Config(#[from] ConfigError),
}

impl From<conch_core::QueueClosed> for RuntimeError {
    fn from(_: conch_core::QueueClosed) -> Self {
        Self::Stopped
    }
}

/// Result type for runtime operations.
pub type RuntimeResult<T> = Result<T, RuntimeError>;
