//! Worker thread lifecycle
//!
//! Each worker owns one slot for its whole life. The loop below is the
//! consumer half of the pool monitor; `ThreadPool::submit` is the producer
//! half. All bookkeeping happens under the pool lock, task execution does
//! not.

use crate::pool::{PoolState, Shared};
use dynpool_core::{kdebug, ktrace, WorkerState};
use std::io;
use std::sync::Arc;
use std::thread;

thread_local! {
    static CURRENT_SLOT: std::cell::Cell<Option<usize>> = const { std::cell::Cell::new(None) };
}

/// Slot id of the pool worker running the caller, if any.
///
/// `None` outside pool worker threads.
#[inline]
pub fn current_worker_slot() -> Option<usize> {
    CURRENT_SLOT.with(|cell| cell.get())
}

/// Start a worker in the lowest free slot.
///
/// Must be called with the pool lock held and `num_workers < max_workers`.
/// The new thread blocks on the lock until the caller releases it, so the
/// slot entry is always in place before the worker can touch it.
pub(crate) fn spawn_worker(shared: &Arc<Shared>, state: &mut PoolState) -> io::Result<usize> {
    #[cfg(test)]
    if shared.fail_spawn.load(std::sync::atomic::Ordering::SeqCst) {
        return Err(io::Error::other("spawning disabled"));
    }

    let slot = state
        .slots
        .claim()
        .ok_or_else(|| io::Error::other("no free worker slot"))?;

    let worker_shared = Arc::clone(shared);
    let handle = thread::Builder::new()
        .name(format!("{}-{}", shared.config.thread_name_prefix, slot))
        .spawn(move || worker_loop(worker_shared, slot))?;

    state.slots.occupy(slot, handle);
    state.num_workers += 1;
    kdebug!("worker {} spawned ({} active)", slot, state.num_workers);
    Ok(slot)
}

/// Drop the worker from the bookkeeping. Lock held.
fn leave(state: &mut PoolState, slot: usize, why: WorkerState) {
    debug_assert!(!why.is_active());
    state.slots.vacate(slot);
    state.num_workers -= 1;
    match why {
        WorkerState::Retiring => {
            kdebug!("worker {} retired ({} active)", slot, state.num_workers)
        }
        _ => ktrace!("worker {} {} ({} active)", slot, why, state.num_workers),
    }
}

fn worker_loop(shared: Arc<Shared>, slot: usize) {
    CURRENT_SLOT.with(|cell| cell.set(Some(slot)));

    loop {
        let job = {
            let mut state = shared.lock();

            if state.terminated {
                leave(&mut state, slot, WorkerState::Stopped);
                return;
            }

            // Shrink decision and its state change form one critical section,
            // otherwise two workers could both see num_workers > min.
            if state.queue.is_empty() && state.num_workers > shared.config.min_workers {
                leave(&mut state, slot, WorkerState::Retiring);
                return;
            }

            state.free_workers += 1;
            state.slots.set_state(slot, WorkerState::Waiting);

            let mut state = shared
                .task_ready
                .wait_while(state, |s| s.queue.is_empty() && !s.terminated)
                .unwrap_or_else(std::sync::PoisonError::into_inner);

            state.free_workers -= 1;

            if state.terminated {
                leave(&mut state, slot, WorkerState::Stopped);
                return;
            }

            let job = state.queue.pop_front();
            state.slots.set_state(slot, WorkerState::Running);
            shared.space_ready.notify_one();
            job
        };

        if let Some(job) = job {
            job();
        }
    }
}
