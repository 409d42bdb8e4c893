//! Worker slot table
//!
//! Tracks which of the `max_workers` slot ids are held by a live worker,
//! together with that worker's join handle and lifecycle state. Ids are
//! claimed lowest-first so status output stays compact.
//!
//! A worker that retires hands its own join handle to the `retired` list.
//! Finished ones are taken out under the lock and joined after it is
//! released, since a thread reports finished before its thread-local
//! destructors have run. Whatever is left is joined when the pool is dropped.
//!
//! Every method is called with the pool lock held, except `join_all`.

use dynpool_core::WorkerState;
use std::collections::BTreeMap;
use std::thread::JoinHandle;

struct SlotEntry {
    handle: Option<JoinHandle<()>>,
    state: WorkerState,
}

pub(crate) struct WorkerSlots {
    capacity: usize,
    active: BTreeMap<usize, SlotEntry>,
    retired: Vec<JoinHandle<()>>,
}

impl WorkerSlots {
    pub(crate) fn new(capacity: usize) -> Self {
        Self {
            capacity,
            active: BTreeMap::new(),
            retired: Vec::new(),
        }
    }

    /// Lowest slot id not held by a live worker
    pub(crate) fn claim(&self) -> Option<usize> {
        (0..self.capacity).find(|id| !self.active.contains_key(id))
    }

    /// Record a freshly spawned worker in `slot`.
    pub(crate) fn occupy(&mut self, slot: usize, handle: JoinHandle<()>) {
        debug_assert!(slot < self.capacity);
        let previous = self.active.insert(
            slot,
            SlotEntry {
                handle: Some(handle),
                state: WorkerState::Starting,
            },
        );
        debug_assert!(previous.is_none(), "slot {} occupied twice", slot);
    }

    pub(crate) fn set_state(&mut self, slot: usize, state: WorkerState) {
        debug_assert!(state.is_active(), "{} is not a slot state", state);
        if let Some(entry) = self.active.get_mut(&slot) {
            entry.state = state;
        }
    }

    /// Vacate `slot`. The departing thread's handle is kept for joining.
    pub(crate) fn vacate(&mut self, slot: usize) {
        if let Some(entry) = self.active.remove(&slot) {
            if let Some(handle) = entry.handle {
                self.retired.push(handle);
            }
        }
    }

    /// Take the retired handles whose threads have finished their work.
    /// Join them with `join_all` once the pool lock is released.
    pub(crate) fn take_finished(&mut self) -> Vec<JoinHandle<()>> {
        let (done, pending): (Vec<_>, Vec<_>) =
            self.retired.drain(..).partition(|h| h.is_finished());
        self.retired = pending;
        done
    }

    /// Take every join handle, live and retired.
    pub(crate) fn take_handles(&mut self) -> Vec<JoinHandle<()>> {
        let mut handles: Vec<_> = self.retired.drain(..).collect();
        handles.extend(self.active.values_mut().filter_map(|e| e.handle.take()));
        handles
    }

    #[inline]
    pub(crate) fn is_active(&self, slot: usize) -> bool {
        self.active.contains_key(&slot)
    }

    #[inline]
    pub(crate) fn active_count(&self) -> usize {
        self.active.len()
    }

    pub(crate) fn active_flags(&self) -> Vec<bool> {
        (0..self.capacity).map(|id| self.is_active(id)).collect()
    }

    pub(crate) fn states(&self) -> Vec<Option<WorkerState>> {
        (0..self.capacity)
            .map(|id| self.active.get(&id).map(|e| e.state))
            .collect()
    }
}

/// Join `handles`. Never call with the pool lock held.
pub(crate) fn join_all(handles: Vec<JoinHandle<()>>) {
    for handle in handles {
        let _ = handle.join();
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::thread;

    fn idle_thread() -> JoinHandle<()> {
        thread::spawn(|| {})
    }

    #[test]
    fn test_claim_lowest_free() {
        let mut slots = WorkerSlots::new(3);
        assert_eq!(slots.claim(), Some(0));
        slots.occupy(0, idle_thread());
        slots.occupy(1, idle_thread());
        assert_eq!(slots.claim(), Some(2));

        slots.vacate(0);
        assert_eq!(slots.claim(), Some(0));
        assert_eq!(slots.active_flags(), vec![false, true, false]);

        slots.occupy(0, idle_thread());
        slots.occupy(2, idle_thread());
        assert_eq!(slots.claim(), None);
        assert_eq!(slots.active_count(), 3);

        for handle in slots.take_handles() {
            handle.join().unwrap();
        }
    }

    #[test]
    fn test_states_follow_slots() {
        let mut slots = WorkerSlots::new(2);
        slots.occupy(1, idle_thread());
        assert_eq!(slots.states(), vec![None, Some(WorkerState::Starting)]);
        slots.set_state(1, WorkerState::Running);
        assert_eq!(slots.states(), vec![None, Some(WorkerState::Running)]);

        // Unknown slot is ignored
        slots.set_state(0, WorkerState::Waiting);
        assert_eq!(slots.states()[0], None);

        slots.vacate(1);
        assert_eq!(slots.states(), vec![None, None]);
        assert_eq!(slots.take_handles().len(), 1);
    }

    #[test]
    fn test_reap_keeps_running_threads() {
        let (tx, rx) = std::sync::mpsc::channel::<()>();
        let mut slots = WorkerSlots::new(2);
        slots.occupy(0, idle_thread());
        slots.occupy(1, thread::spawn(move || {
            let _ = rx.recv();
        }));
        slots.vacate(0);
        slots.vacate(1);

        // Give the idle thread time to exit
        let deadline = std::time::Instant::now() + std::time::Duration::from_secs(2);
        while slots.retired.iter().filter(|h| h.is_finished()).count() == 0
            && std::time::Instant::now() < deadline
        {
            thread::sleep(std::time::Duration::from_millis(5));
        }
        let finished = slots.take_finished();
        assert_eq!(finished.len(), 1);
        assert_eq!(slots.retired.len(), 1);
        join_all(finished);

        tx.send(()).unwrap();
        for handle in slots.take_handles() {
            handle.join().unwrap();
        }
    }
}
