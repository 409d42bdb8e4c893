//! # dynpool - Dynamically sized worker-thread pool
//!
//! A bounded FIFO task queue served by OS worker threads whose number
//! floats between `min_workers` and `max_workers`.
//!
//! ## Features
//!
//! - **Backpressure**: `submit` blocks while the queue is full
//! - **Elastic**: a worker is added only when no idle worker can take a new task
//! - **Self-shrinking**: idle workers above `min_workers` retire on their own
//! - **Isolated failures**: a panicking task resolves its own handle, the worker survives
//! - **Clean shutdown**: dropping the pool terminates it and joins every thread
//!
//! ## Quick Start
//!
//! ```ignore
//! use dynpool::ThreadPool;
//!
//! fn main() -> Result<(), dynpool::PoolError> {
//!     let pool = ThreadPool::new(2, 8, 64)?;
//!
//!     let handles: Vec<_> = (0..10u64)
//!         .map(|i| pool.submit(move || i * i))
//!         .collect::<Result<_, _>>()?;
//!
//!     for handle in handles {
//!         println!("{:?}", handle.wait());
//!     }
//!     println!("{}", pool.status());
//!     Ok(())
//! }
//! ```
//!
//! ## Architecture
//!
//! ```text
//!   submit() ──► [ space_ready ] ──► VecDeque<Job> ──► [ task_ready ] ──► worker loop
//!      ▲              (wait while full)        │        (wait while empty)       │
//!      │                                       │                                 ▼
//!   TaskHandle ◄──────────── Completer ◄───────┴──────────────── job() outside the lock
//! ```

mod pool;
mod slot;
mod worker;

pub use pool::ThreadPool;
pub use worker::current_worker_slot;

// Re-export core types
pub use dynpool_core::{
    ConfigError,
    PoolConfig,
    PoolError,
    PoolResult,
    PoolStatus,
    TaskError,
    TaskHandle,
    TaskResult,
    WorkerState,
    UNBOUNDED_QUEUE,
};

// Re-export kprint macros for debug logging
pub use dynpool_core::{kprint, kprintln, kerror, kwarn, kinfo, kdebug, ktrace};
pub use dynpool_core::kprint::{LogLevel, init as init_logging, set_log_level, set_flush_enabled, set_tid_enabled};
