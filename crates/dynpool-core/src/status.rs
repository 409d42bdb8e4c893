//! Read-only pool snapshot

use crate::config::UNBOUNDED_QUEUE;
use crate::state::WorkerState;
use core::fmt;

/// Point-in-time view of a pool, taken under the pool lock
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PoolStatus {
    pub terminated: bool,
    pub min_workers: usize,
    pub max_workers: usize,
    pub max_queue_size: usize,
    /// Pending (not yet dispatched) tasks
    pub queue_len: usize,
    /// Active workers
    pub num_workers: usize,
    /// Workers blocked waiting for a task
    pub free_workers: usize,
    /// One flag per slot, `max_workers` long
    pub slot_active: Vec<bool>,
    /// State of the worker holding each slot, `None` for vacant slots
    pub slot_states: Vec<Option<WorkerState>>,
}

impl PoolStatus {
    /// Workers currently executing or about to execute a task
    #[inline]
    pub fn busy_workers(&self) -> usize {
        self.num_workers - self.free_workers
    }
}

impl fmt::Display for PoolStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        if self.terminated {
            return writeln!(f, "Thread-Pool is terminated");
        }
        writeln!(f, "=== Thread-Pool status ===")?;
        writeln!(f, "min workers: {}", self.min_workers)?;
        writeln!(f, "max workers: {}", self.max_workers)?;
        if self.max_queue_size == UNBOUNDED_QUEUE {
            writeln!(f, "tasks queue size: {} (unbounded)", self.queue_len)?;
        } else {
            writeln!(f, "tasks queue size: {}/{}", self.queue_len, self.max_queue_size)?;
        }
        writeln!(f, "num workers: {}", self.num_workers)?;
        writeln!(f, "free workers: {}", self.free_workers)?;
        write!(f, "workers pool:")?;
        for active in &self.slot_active {
            write!(f, " {}", u8::from(*active))?;
        }
        writeln!(f)?;
        write!(f, "worker states:")?;
        for state in &self.slot_states {
            write!(f, " {}", state.map_or('.', |s| s.tag()))?;
        }
        writeln!(f)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn sample() -> PoolStatus {
        PoolStatus {
            terminated: false,
            min_workers: 1,
            max_workers: 3,
            max_queue_size: 10,
            queue_len: 2,
            num_workers: 2,
            free_workers: 1,
            slot_active: vec![true, true, false],
            slot_states: vec![Some(WorkerState::Waiting), Some(WorkerState::Running), None],
        }
    }

    #[test]
    fn test_display_running() {
        let text = sample().to_string();
        assert!(text.starts_with("=== Thread-Pool status ===\n"));
        assert!(text.contains("tasks queue size: 2/10\n"));
        assert!(text.contains("workers pool: 1 1 0\n"));
        assert!(text.contains("worker states: W R .\n"));
        assert_eq!(sample().busy_workers(), 1);
    }

    #[test]
    fn test_display_terminated() {
        let status = PoolStatus { terminated: true, ..sample() };
        assert_eq!(status.to_string(), "Thread-Pool is terminated\n");
    }
}
