//! Worker lifecycle state

use core::fmt;

/// State of a pool worker
///
/// ```text
/// Starting -> { Waiting <-> Running } -> Retiring
///                                     -> Stopped   (pool terminated)
/// ```
///
/// Only the active states are ever stored in a slot. `Retiring` and
/// `Stopped` name the way a worker left; the slot is vacated in the same
/// critical section, so they show up in log lines but never in a
/// `PoolStatus` snapshot.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[repr(u8)]
pub enum WorkerState {
    /// Thread spawned, has not taken the pool lock yet
    Starting = 0,

    /// Blocked on the task-available condition
    Waiting = 1,

    /// Executing a task outside the lock
    Running = 2,

    /// Found the queue empty above `min_workers` and is exiting
    Retiring = 3,

    /// Exiting because the pool was terminated
    Stopped = 4,
}

impl WorkerState {
    /// Whether a worker in this state occupies its slot
    #[inline]
    pub const fn is_active(&self) -> bool {
        matches!(
            self,
            WorkerState::Starting | WorkerState::Waiting | WorkerState::Running
        )
    }

    /// Single-letter tag used in status output
    pub const fn tag(&self) -> char {
        match self {
            WorkerState::Starting => 'S',
            WorkerState::Waiting => 'W',
            WorkerState::Running => 'R',
            WorkerState::Retiring => 'x',
            WorkerState::Stopped => '-',
        }
    }
}

impl fmt::Display for WorkerState {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            WorkerState::Starting => "starting",
            WorkerState::Waiting => "waiting",
            WorkerState::Running => "running",
            WorkerState::Retiring => "retiring",
            WorkerState::Stopped => "stopped",
        };
        f.write_str(name)
    }
}
