//! Pool configuration
//!
//! Library defaults with runtime environment overrides.
//!
//! # Configuration Priority (highest wins)
//!
//! 1. Builder calls
//! 2. Environment variables (`from_env()` only)
//! 3. Library defaults
//!
//! # Example
//!
//! ```rust,ignore
//! use dynpool_core::PoolConfig;
//!
//! let config = PoolConfig::from_env()
//!     .min_workers(2)
//!     .max_workers(16)
//!     .max_queue_size(256);
//! config.validate()?;
//! ```

use crate::env::{env_get, env_get_opt, env_get_str, env_is_set};

/// Queue bound meaning "never apply backpressure".
pub const UNBOUNDED_QUEUE: usize = usize::MAX;

/// Library defaults.
pub mod defaults {
    /// Workers kept alive while idle
    pub const MIN_WORKERS: usize = 4;
    /// Hard cap on concurrently running workers
    pub const MAX_WORKERS: usize = 8;
    /// Pending tasks before `submit` blocks
    pub const MAX_QUEUE_SIZE: usize = 100;
    /// Worker threads are named `<prefix>-<slot>`
    pub const THREAD_NAME_PREFIX: &str = "dynpool-worker";
}

/// Pool configuration with builder pattern.
///
/// Immutable once handed to a pool.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PoolConfig {
    /// Workers spawned at construction and never retired while running
    pub min_workers: usize,
    /// Upper bound on active workers
    pub max_workers: usize,
    /// Maximum pending tasks; `UNBOUNDED_QUEUE` disables backpressure
    pub max_queue_size: usize,
    /// Prefix for worker thread names
    pub thread_name_prefix: String,
}

impl Default for PoolConfig {
    fn default() -> Self {
        Self::from_env()
    }
}

/// Numeric override; a set but unparsable value is reported and ignored.
fn env_count(key: &str, default: usize) -> usize {
    if env_is_set(key) && env_get_opt::<usize>(key).is_none() {
        crate::kwarn!("ignoring malformed {}, using {}", key, default);
    }
    env_get(key, default)
}

impl PoolConfig {
    /// Create config from defaults with environment overrides.
    ///
    /// Environment variables (all optional):
    /// - `DYNPOOL_MIN_WORKERS`
    /// - `DYNPOOL_MAX_WORKERS`
    /// - `DYNPOOL_MAX_QUEUE_SIZE`
    /// - `DYNPOOL_THREAD_NAME`
    pub fn from_env() -> Self {
        Self {
            min_workers: env_count("DYNPOOL_MIN_WORKERS", defaults::MIN_WORKERS),
            max_workers: env_count("DYNPOOL_MAX_WORKERS", defaults::MAX_WORKERS),
            max_queue_size: env_count("DYNPOOL_MAX_QUEUE_SIZE", defaults::MAX_QUEUE_SIZE),
            thread_name_prefix: env_get_str("DYNPOOL_THREAD_NAME", defaults::THREAD_NAME_PREFIX),
        }
    }

    /// Create config with explicit defaults (no env override).
    pub fn new() -> Self {
        Self {
            min_workers: defaults::MIN_WORKERS,
            max_workers: defaults::MAX_WORKERS,
            max_queue_size: defaults::MAX_QUEUE_SIZE,
            thread_name_prefix: defaults::THREAD_NAME_PREFIX.to_string(),
        }
    }

    // Builder methods

    pub fn min_workers(mut self, n: usize) -> Self {
        self.min_workers = n;
        self
    }

    pub fn max_workers(mut self, n: usize) -> Self {
        self.max_workers = n;
        self
    }

    pub fn max_queue_size(mut self, n: usize) -> Self {
        self.max_queue_size = n;
        self
    }

    pub fn unbounded_queue(mut self) -> Self {
        self.max_queue_size = UNBOUNDED_QUEUE;
        self
    }

    pub fn thread_name_prefix(mut self, prefix: impl Into<String>) -> Self {
        self.thread_name_prefix = prefix.into();
        self
    }

    #[inline]
    pub fn is_unbounded(&self) -> bool {
        self.max_queue_size == UNBOUNDED_QUEUE
    }

    /// Validate configuration and return errors if invalid.
    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.max_workers == 0 {
            return Err(ConfigError::InvalidValue("max_workers must be > 0"));
        }
        if self.min_workers > self.max_workers {
            return Err(ConfigError::InvalidValue(
                "min_workers must be <= max_workers",
            ));
        }
        if self.max_queue_size == 0 {
            return Err(ConfigError::InvalidValue("max_queue_size must be > 0"));
        }
        Ok(())
    }

    /// Print configuration (for debugging)
    pub fn print(&self) {
        eprintln!("dynpool configuration:");
        eprintln!("  min_workers:         {}", self.min_workers);
        eprintln!("  max_workers:         {}", self.max_workers);
        if self.is_unbounded() {
            eprintln!("  max_queue_size:      unbounded");
        } else {
            eprintln!("  max_queue_size:      {}", self.max_queue_size);
        }
        eprintln!("  thread_name_prefix:  {}", self.thread_name_prefix);
    }
}

/// Configuration error
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ConfigError {
    InvalidValue(&'static str),
}

impl std::fmt::Display for ConfigError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            ConfigError::InvalidValue(msg) => write!(f, "invalid config: {}", msg),
        }
    }
}

impl std::error::Error for ConfigError {}
