//! One-shot result handle
//!
//! `submit` returns a `TaskHandle` and keeps the matching `Completer` inside
//! the queued job. The worker that runs the job completes it exactly once.
//! If the job is dropped without running (pool terminated with the job still
//! queued), the completer's `Drop` resolves the handle with
//! `TaskError::Abandoned` so no reader waits forever.

use crate::error::{TaskError, TaskResult};
use std::sync::{Arc, Condvar, Mutex, PoisonError};
use std::time::{Duration, Instant};

/// Shared cell between one writer and one reader
struct Completion<T> {
    result: Mutex<Option<TaskResult<T>>>,
    ready: Condvar,
}

impl<T> Completion<T> {
    fn store(&self, result: TaskResult<T>) {
        let mut slot = self.result.lock().unwrap_or_else(PoisonError::into_inner);
        if slot.is_none() {
            *slot = Some(result);
        }
        drop(slot);
        self.ready.notify_all();
    }
}

/// Create a linked completer / handle pair.
pub fn task_channel<T>() -> (Completer<T>, TaskHandle<T>) {
    let inner = Arc::new(Completion {
        result: Mutex::new(None),
        ready: Condvar::new(),
    });
    (
        Completer { inner: Some(Arc::clone(&inner)) },
        TaskHandle { inner },
    )
}

/// Writer side, owned by the queued job
pub struct Completer<T> {
    inner: Option<Arc<Completion<T>>>,
}

impl<T> Completer<T> {
    /// Deliver the task's outcome and wake the reader.
    pub fn complete(mut self, result: TaskResult<T>) {
        if let Some(inner) = self.inner.take() {
            inner.store(result);
        }
    }
}

impl<T> Drop for Completer<T> {
    fn drop(&mut self) {
        if let Some(inner) = self.inner.take() {
            inner.store(Err(TaskError::Abandoned));
        }
    }
}

/// Reader side, returned by `ThreadPool::submit`
///
/// Every retrieval method consumes the handle, so a result is observed
/// at most once. The polling variants hand the handle back when the
/// result is not ready yet.
pub struct TaskHandle<T> {
    inner: Arc<Completion<T>>,
}

impl<T> TaskHandle<T> {
    /// Check whether the result is available without taking it.
    pub fn is_finished(&self) -> bool {
        self.inner
            .result
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .is_some()
    }

    /// Block until the task finishes.
    pub fn wait(self) -> TaskResult<T> {
        let mut slot = self.inner.result.lock().unwrap_or_else(PoisonError::into_inner);
        loop {
            if let Some(result) = slot.take() {
                return result;
            }
            slot = self
                .inner
                .ready
                .wait(slot)
                .unwrap_or_else(PoisonError::into_inner);
        }
    }

    /// Block for at most `timeout`. Returns the handle if it expires first.
    ///
    /// A timeout too large to represent as a deadline waits without limit.
    pub fn wait_timeout(self, timeout: Duration) -> Result<TaskResult<T>, Self> {
        let deadline = match Instant::now().checked_add(timeout) {
            Some(deadline) => deadline,
            None => return Ok(self.wait()),
        };
        let mut slot = self.inner.result.lock().unwrap_or_else(PoisonError::into_inner);
        loop {
            if let Some(result) = slot.take() {
                return Ok(result);
            }
            let now = Instant::now();
            if now >= deadline {
                drop(slot);
                return Err(self);
            }
            let (guard, _) = self
                .inner
                .ready
                .wait_timeout(slot, deadline - now)
                .unwrap_or_else(PoisonError::into_inner);
            slot = guard;
        }
    }

    /// Take the result if it is ready, otherwise return the handle.
    pub fn try_wait(self) -> Result<TaskResult<T>, Self> {
        let taken = self
            .inner
            .result
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .take();
        match taken {
            Some(result) => Ok(result),
            None => Err(self),
        }
    }
}

impl<T> std::fmt::Debug for TaskHandle<T> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("TaskHandle")
            .field("finished", &self.is_finished())
            .finish()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::thread;

    #[test]
    fn test_complete_then_wait() {
        let (tx, rx) = task_channel();
        tx.complete(Ok(5));
        assert!(rx.is_finished());
        assert_eq!(rx.wait(), Ok(5));
    }

    #[test]
    fn test_wait_across_threads() {
        let (tx, rx) = task_channel();
        let writer = thread::spawn(move || {
            thread::sleep(Duration::from_millis(20));
            tx.complete(Ok("done".to_string()));
        });
        assert_eq!(rx.wait(), Ok("done".to_string()));
        writer.join().unwrap();
    }

    #[test]
    fn test_dropped_completer_abandons() {
        let (tx, rx) = task_channel::<u32>();
        drop(tx);
        assert_eq!(rx.wait(), Err(TaskError::Abandoned));
    }

    #[test]
    fn test_try_wait_returns_handle_until_ready() {
        let (tx, rx) = task_channel::<u8>();
        let rx = match rx.try_wait() {
            Ok(_) => panic!("result before completion"),
            Err(rx) => rx,
        };
        tx.complete(Err(TaskError::Panicked("x".into())));
        assert_eq!(rx.try_wait().ok(), Some(Err(TaskError::Panicked("x".into()))));
    }

    #[test]
    fn test_wait_timeout_expires() {
        let (tx, rx) = task_channel::<()>();
        let start = Instant::now();
        let rx = rx.wait_timeout(Duration::from_millis(30)).unwrap_err();
        assert!(start.elapsed() >= Duration::from_millis(30));
        tx.complete(Ok(()));
        assert_eq!(rx.wait_timeout(Duration::from_secs(1)).ok(), Some(Ok(())));
    }

    #[test]
    fn test_wait_timeout_unrepresentable_deadline() {
        let (tx, rx) = task_channel::<u32>();
        tx.complete(Ok(1));
        assert_eq!(rx.wait_timeout(Duration::MAX).ok(), Some(Ok(1)));

        let (tx, rx) = task_channel::<u32>();
        let writer = thread::spawn(move || {
            thread::sleep(Duration::from_millis(20));
            tx.complete(Ok(2));
        });
        assert_eq!(rx.wait_timeout(Duration::MAX).ok(), Some(Ok(2)));
        writer.join().unwrap();
    }
}
