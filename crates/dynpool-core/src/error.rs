//! Error types for the worker pool

use crate::config::ConfigError;
use core::fmt;

/// Result type for pool operations
pub type PoolResult<T> = Result<T, PoolError>;

/// Result delivered through a `TaskHandle`
pub type TaskResult<T> = Result<T, TaskError>;

/// Errors reported synchronously by the pool
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum PoolError {
    /// Pool was terminated; the task was not enqueued
    Terminated,

    /// Configuration rejected at construction
    InvalidConfiguration(ConfigError),

    /// OS refused to create a worker thread and no worker is left to run the task
    SpawnFailed(String),
}

impl fmt::Display for PoolError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            PoolError::Terminated => write!(f, "thread pool is terminated"),
            PoolError::InvalidConfiguration(e) => write!(f, "{}", e),
            PoolError::SpawnFailed(msg) => write!(f, "failed to spawn worker thread: {}", msg),
        }
    }
}

impl std::error::Error for PoolError {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        match self {
            PoolError::InvalidConfiguration(e) => Some(e),
            _ => None,
        }
    }
}

impl From<ConfigError> for PoolError {
    fn from(e: ConfigError) -> Self {
        PoolError::InvalidConfiguration(e)
    }
}

/// Failure of an individual task, observed through its handle
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum TaskError {
    /// Task panicked; carries the panic message
    Panicked(String),

    /// Task was still queued when the pool terminated and never ran
    Abandoned,
}

impl TaskError {
    /// Build a `Panicked` from a `catch_unwind` payload.
    pub fn from_panic(payload: Box<dyn std::any::Any + Send>) -> Self {
        let msg = if let Some(s) = payload.downcast_ref::<&'static str>() {
            (*s).to_string()
        } else if let Some(s) = payload.downcast_ref::<String>() {
            s.clone()
        } else {
            "non-string panic payload".to_string()
        };
        TaskError::Panicked(msg)
    }
}

impl fmt::Display for TaskError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            TaskError::Panicked(msg) => write!(f, "task panicked: {}", msg),
            TaskError::Abandoned => write!(f, "task abandoned at pool termination"),
        }
    }
}

impl std::error::Error for TaskError {}
