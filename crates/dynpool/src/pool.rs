//! Pool controller
//!
//! One mutex guards all pool state. Two condition variables coordinate the
//! two sides of the queue:
//!
//! - `task_ready`: the queue has a task, or the pool is terminated (workers wait)
//! - `space_ready`: the queue has room, or the pool is terminated (submitters wait)
//!
//! Growth happens in `submit`: one worker is added when nobody is idle and
//! the pool is below `max_workers`. Shrinking happens in the workers
//! themselves: a worker that finds the queue empty while the pool is above
//! `min_workers` retires. There is no reaper thread.

use crate::slot::{join_all, WorkerSlots};
use crate::worker::spawn_worker;
use dynpool_core::{
    kdebug, kerror, kinfo, kwarn, task_channel, PoolConfig, PoolError, PoolResult, PoolStatus,
    TaskError, TaskHandle,
};
use std::collections::VecDeque;
use std::panic::{self, AssertUnwindSafe};
use std::sync::{Arc, Condvar, Mutex, MutexGuard, PoisonError};
use std::thread;

/// A queued unit of work. Result delivery is baked into the closure.
pub(crate) type Job = Box<dyn FnOnce() + Send + 'static>;

/// Everything guarded by the pool lock
pub(crate) struct PoolState {
    pub(crate) queue: VecDeque<Job>,
    /// Active workers, `min_workers..=max_workers` while running
    pub(crate) num_workers: usize,
    /// Workers blocked on `task_ready`
    pub(crate) free_workers: usize,
    /// One-way flag
    pub(crate) terminated: bool,
    pub(crate) slots: WorkerSlots,
}

/// State shared between the pool handle and its workers
pub(crate) struct Shared {
    pub(crate) config: PoolConfig,
    pub(crate) state: Mutex<PoolState>,
    pub(crate) task_ready: Condvar,
    pub(crate) space_ready: Condvar,
    /// Makes `spawn_worker` fail
    #[cfg(test)]
    pub(crate) fail_spawn: std::sync::atomic::AtomicBool,
}

impl Shared {
    /// Jobs never run under the lock, so poisoning only follows a bug in
    /// the pool itself. The state is still consistent at every unlock.
    #[inline]
    pub(crate) fn lock(&self) -> MutexGuard<'_, PoolState> {
        self.state.lock().unwrap_or_else(PoisonError::into_inner)
    }
}

/// Dynamically sized worker-thread pool
///
/// # Example
///
/// ```ignore
/// use dynpool::ThreadPool;
///
/// let pool = ThreadPool::new(2, 4, 16)?;
/// let handle = pool.submit(|| 6 * 7)?;
/// assert_eq!(handle.wait(), Ok(42));
/// ```
///
/// Dropping the pool terminates it and joins every worker it started.
pub struct ThreadPool {
    shared: Arc<Shared>,
}

impl ThreadPool {
    /// Create a pool and start `min_workers` workers.
    ///
    /// Fails with `InvalidConfiguration` if `min_workers > max_workers`,
    /// `max_workers == 0` or `max_queue_size == 0`. Pass
    /// `dynpool_core::UNBOUNDED_QUEUE` to disable backpressure.
    pub fn new(min_workers: usize, max_workers: usize, max_queue_size: usize) -> PoolResult<Self> {
        Self::with_config(
            PoolConfig::new()
                .min_workers(min_workers)
                .max_workers(max_workers)
                .max_queue_size(max_queue_size),
        )
    }

    /// Create a pool from a full configuration.
    pub fn with_config(config: PoolConfig) -> PoolResult<Self> {
        config.validate()?;

        let shared = Arc::new(Shared {
            state: Mutex::new(PoolState {
                queue: VecDeque::new(),
                num_workers: 0,
                free_workers: 0,
                terminated: false,
                slots: WorkerSlots::new(config.max_workers),
            }),
            config,
            task_ready: Condvar::new(),
            space_ready: Condvar::new(),
            #[cfg(test)]
            fail_spawn: std::sync::atomic::AtomicBool::new(false),
        });
        let pool = ThreadPool { shared };

        // Spawn under one lock so no worker observes a partial pool.
        let spawned = {
            let mut state = pool.shared.lock();
            (0..pool.shared.config.min_workers)
                .try_for_each(|_| spawn_worker(&pool.shared, &mut state).map(drop))
        };
        // On failure `pool` drops here, which stops the workers already started.
        spawned.map_err(|e| PoolError::SpawnFailed(e.to_string()))?;

        kdebug!(
            "pool started: min={} max={} queue={}",
            pool.shared.config.min_workers,
            pool.shared.config.max_workers,
            pool.shared.config.max_queue_size
        );
        Ok(pool)
    }

    /// Submit a task and get a handle to its result.
    ///
    /// Blocks while the queue is full. Fails with `PoolError::Terminated`
    /// if the pool is terminated before the task could be enqueued.
    ///
    /// A panic inside `f` is caught and delivered as `TaskError::Panicked`;
    /// the worker keeps running.
    pub fn submit<F, T>(&self, f: F) -> PoolResult<TaskHandle<T>>
    where
        F: FnOnce() -> T + Send + 'static,
        T: Send + 'static,
    {
        let (completer, handle) = task_channel();
        let job: Job = Box::new(move || {
            let result = panic::catch_unwind(AssertUnwindSafe(f)).map_err(|payload| {
                let err = TaskError::from_panic(payload);
                kwarn!("{}", err);
                err
            });
            completer.complete(result);
        });
        self.enqueue(job)?;
        Ok(handle)
    }

    /// Submit a task whose result is not needed.
    pub fn execute<F>(&self, f: F) -> PoolResult<()>
    where
        F: FnOnce() + Send + 'static,
    {
        self.enqueue(Box::new(move || {
            if let Err(payload) = panic::catch_unwind(AssertUnwindSafe(f)) {
                kwarn!("{}", TaskError::from_panic(payload));
            }
        }))
    }

    fn enqueue(&self, job: Job) -> PoolResult<()> {
        let config = &self.shared.config;
        let mut state = self.shared.lock();

        if state.terminated {
            return Err(PoolError::Terminated);
        }

        // Backpressure: producers move at consumer speed.
        state = self
            .shared
            .space_ready
            .wait_while(state, |s| s.queue.len() >= config.max_queue_size && !s.terminated)
            .unwrap_or_else(PoisonError::into_inner);

        if state.terminated {
            return Err(PoolError::Terminated);
        }

        state.queue.push_back(job);

        let mut finished = Vec::new();
        if state.free_workers == 0 && state.num_workers < config.max_workers {
            finished = state.slots.take_finished();
            if let Err(e) = spawn_worker(&self.shared, &mut state) {
                if state.num_workers == 0 {
                    // Nobody could ever run it
                    let job = state.queue.pop_back();
                    drop(state);
                    drop(job);
                    join_all(finished);
                    return Err(PoolError::SpawnFailed(e.to_string()));
                }
                kwarn!(
                    "could not grow pool past {} workers: {}",
                    state.num_workers,
                    e
                );
            }
        }

        debug_assert!(state.free_workers <= state.num_workers);
        debug_assert_eq!(state.slots.active_count(), state.num_workers);

        self.shared.task_ready.notify_one();
        drop(state);
        join_all(finished);
        Ok(())
    }

    /// Stop accepting tasks and wake every waiting thread.
    ///
    /// Idempotent. Tasks already running finish; tasks still queued are
    /// dropped and their handles resolve to `TaskError::Abandoned`.
    /// Does not wait for workers to exit; dropping the pool does.
    pub fn terminate(&self) {
        let abandoned = {
            let mut state = self.shared.lock();
            if state.terminated {
                return;
            }
            state.terminated = true;
            std::mem::take(&mut state.queue)
        };

        self.shared.task_ready.notify_all();
        self.shared.space_ready.notify_all();

        kinfo!("pool terminated, {} queued tasks abandoned", abandoned.len());
        // Dropped outside the lock: captured values may run arbitrary Drop code.
        drop(abandoned);
    }

    #[inline]
    pub fn is_terminated(&self) -> bool {
        self.shared.lock().terminated
    }

    /// Pool configuration
    #[inline]
    pub fn config(&self) -> &PoolConfig {
        &self.shared.config
    }

    /// Snapshot of the pool, taken under the lock.
    pub fn status(&self) -> PoolStatus {
        let config = &self.shared.config;
        let state = self.shared.lock();
        PoolStatus {
            terminated: state.terminated,
            min_workers: config.min_workers,
            max_workers: config.max_workers,
            max_queue_size: config.max_queue_size,
            queue_len: state.queue.len(),
            num_workers: state.num_workers,
            free_workers: state.free_workers,
            slot_active: state.slots.active_flags(),
            slot_states: state.slots.states(),
        }
    }
}

impl Drop for ThreadPool {
    fn drop(&mut self) {
        self.terminate();

        let handles = self.shared.lock().slots.take_handles();
        let me = thread::current().id();
        for handle in handles {
            // The last owner may be a task running on one of our own workers.
            if handle.thread().id() == me {
                continue;
            }
            if handle.join().is_err() {
                kerror!("worker thread panicked outside a task");
            }
        }
    }
}

impl std::fmt::Debug for ThreadPool {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ThreadPool")
            .field("config", &self.shared.config)
            .finish_non_exhaustive()
    }
}
