//! # dynpool-core
//!
//! Core types for the dynpool worker pool.
//!
//! This crate holds everything the pool controller needs that is not the
//! controller itself. The thread lifecycle lives in `dynpool`.
//!
//! ## Modules
//!
//! - `config` - Pool bounds with env overrides and validation
//! - `error` - Pool and task error types
//! - `handle` - One-shot result handle returned by `submit`
//! - `state` - Per-worker lifecycle state
//! - `status` - Read-only pool snapshot
//! - `kprint` - Kernel-style debug printing macros
//! - `env` - Environment variable utilities

pub mod config;
pub mod error;
pub mod handle;
pub mod state;
pub mod status;
pub mod kprint;
pub mod env;

// Re-exports for convenience
pub use config::{ConfigError, PoolConfig, UNBOUNDED_QUEUE};
pub use error::{PoolError, PoolResult, TaskError, TaskResult};
pub use handle::{task_channel, Completer, TaskHandle};
pub use state::WorkerState;
pub use status::PoolStatus;
pub use env::{env_get, env_get_bool, env_get_opt, env_get_str, env_is_set};
