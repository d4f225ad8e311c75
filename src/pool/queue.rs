//! The thread pool's FIFO task queue.
//!
//! A mutex-guarded `VecDeque` of type-erased closures, plus a condition
//! variable workers wait on when it's empty. `append` and `merge` round out
//! the queue's surface but sit off the hot path — exercised only by unit
//! tests.

use std::collections::VecDeque;
use std::sync::atomic::{AtomicBool, AtomicUsize, Ordering};

use parking_lot::{Condvar, Mutex};

/// A queued unit of work. Receives the index of the worker running it and
/// that worker's own cancel flag — perpetual tasks (`add_infinite_task`)
/// need the latter to know when to stop looping.
pub(crate) type Task = Box<dyn FnOnce(usize, &AtomicBool) + Send>;

pub(crate) struct TaskQueue {
    inner: Mutex<VecDeque<Task>>,
    condvar: Condvar,
    idle: AtomicUsize,
}

impl TaskQueue {
    pub fn new() -> Self {
        TaskQueue {
            inner: Mutex::new(VecDeque::new()),
            condvar: Condvar::new(),
            idle: AtomicUsize::new(0),
        }
    }

    /// Appends a task and wakes one waiting worker. Always succeeds — the
    /// no-op-on-halted-pool behavior lives one layer up, in `ThreadPool`,
    /// which is what actually knows about the finish/halt flags.
    pub fn push(&self, task: Task) -> bool {
        self.inner.lock().push_back(task);
        self.condvar.notify_one();
        true
    }

    pub fn pop(&self) -> Option<Task> {
        self.inner.lock().pop_front()
    }

    pub fn is_empty(&self) -> bool {
        self.inner.lock().is_empty()
    }

    pub fn len(&self) -> usize {
        self.inner.lock().len()
    }

    pub fn clear(&self) {
        self.inner.lock().clear();
    }

    pub fn idle_count(&self) -> usize {
        self.idle.load(Ordering::Acquire)
    }

    pub fn notify_all(&self) {
        let _guard = self.inner.lock();
        self.condvar.notify_all();
    }

    /// Drains `other` into the back of `self`, in order.
    pub fn append(&self, other: &TaskQueue) {
        let mut theirs = other.inner.lock();
        let mut mine = self.inner.lock();
        mine.extend(theirs.drain(..));
    }

    /// Zip-interleaves `other` into `self`: `self[0], other[0], self[1],
    /// other[1], ...`, trailing off with whichever queue is longer.
    pub fn merge(&self, other: &TaskQueue) {
        let mut theirs = other.inner.lock();
        let mut mine = self.inner.lock();
        let a: Vec<Task> = mine.drain(..).collect();
        let b: Vec<Task> = theirs.drain(..).collect();
        let mut merged = VecDeque::with_capacity(a.len() + b.len());
        let mut a = a.into_iter();
        let mut b = b.into_iter();
        loop {
            match (a.next(), b.next()) {
                (Some(x), Some(y)) => {
                    merged.push_back(x);
                    merged.push_back(y);
                }
                (Some(x), None) => merged.push_back(x),
                (None, Some(y)) => merged.push_back(y),
                (None, None) => break,
            }
        }
        *mine = merged;
    }

    /// Pops a task if one is queued; otherwise blocks until either a task
    /// arrives or one of `finish`/`cancel` is set, whichever happens
    /// first. Returns `None` only when woken with no task and a stop
    /// condition set — the worker's cue to exit its loop for good.
    pub fn wait_for_work(&self, cancel: &AtomicBool, finish: &AtomicBool) -> Option<Task> {
        let mut guard = self.inner.lock();
        loop {
            if let Some(task) = guard.pop_front() {
                return Some(task);
            }
            if finish.load(Ordering::Acquire) || cancel.load(Ordering::Acquire) {
                return None;
            }
            self.idle.fetch_add(1, Ordering::AcqRel);
            self.condvar.wait(&mut guard);
            self.idle.fetch_sub(1, Ordering::AcqRel);
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn fifo_order() {
        let q = TaskQueue::new();
        let log = std::sync::Arc::new(Mutex::new(Vec::new()));
        let no_cancel = AtomicBool::new(false);
        for i in 0..3 {
            let log = log.clone();
            q.push(Box::new(move |_, _| log.lock().push(i)));
        }
        while let Some(t) = q.pop() {
            t(0, &no_cancel);
        }
        assert_eq!(*log.lock(), vec![0, 1, 2]);
    }

    #[test]
    fn append_drains_in_order() {
        let a = TaskQueue::new();
        let b = TaskQueue::new();
        a.push(Box::new(|_, _| {}));
        b.push(Box::new(|_, _| {}));
        b.push(Box::new(|_, _| {}));
        a.append(&b);
        assert_eq!(a.len(), 3);
        assert!(b.is_empty());
    }

    #[test]
    fn merge_interleaves() {
        let a = TaskQueue::new();
        let b = TaskQueue::new();
        let order = std::sync::Arc::new(Mutex::new(Vec::new()));
        let no_cancel = AtomicBool::new(false);
        for (label, q) in [("a", &a), ("a", &a), ("b", &b)] {
            let order = order.clone();
            q.push(Box::new(move |_, _| order.lock().push(label)));
        }
        a.merge(&b);
        while let Some(t) = a.pop() {
            t(0, &no_cancel);
        }
        assert_eq!(*order.lock(), vec!["a", "b", "a"]);
    }
}
