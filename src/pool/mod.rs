//! Fixed-then-resizable worker thread pool.
//!
//! Tasks are type-erased closures run on whichever worker pops them; this
//! module owns no knowledge of components or entities at all — the system
//! dispatcher (`crate::dispatch`) is the only caller that knows what a
//! "task" actually does. One-shot tasks via [`ThreadPool::add_task`],
//! perpetual tasks via [`ThreadPool::add_infinite_task`], both returning a
//! [`TaskHandle`] that resolves once.

mod queue;
mod worker;

use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::mpsc;
use std::sync::Arc;

use queue::TaskQueue;
use worker::WorkerSlot;

/// A handle to a task's eventual result — a single-producer,
/// single-consumer channel of one value.
pub struct TaskHandle<T> {
    rx: mpsc::Receiver<T>,
}

impl<T> TaskHandle<T> {
    /// Blocks until the task completes. Returns `None` if the task was
    /// never run (submission happened after `halt`/`finish`, or the pool
    /// was torn down before the task's turn came up).
    pub fn join(self) -> Option<T> {
        self.rx.recv().ok()
    }

    fn empty() -> Self {
        let (_tx, rx) = mpsc::channel();
        TaskHandle { rx }
    }
}

pub struct ThreadPool {
    workers: Vec<WorkerSlot>,
    queue: Arc<TaskQueue>,
    finish: Arc<AtomicBool>,
    halt: Arc<AtomicBool>,
    infinite_halt: Arc<AtomicBool>,
    original_size: usize,
}

impl ThreadPool {
    /// Builds a pool with `size` worker threads (minimum 1).
    pub fn new(size: usize) -> Self {
        let size = size.max(1);
        let queue = Arc::new(TaskQueue::new());
        let finish = Arc::new(AtomicBool::new(false));
        let halt = Arc::new(AtomicBool::new(false));
        let infinite_halt = Arc::new(AtomicBool::new(false));
        let workers = (0..size)
            .map(|i| worker::spawn(i, queue.clone(), finish.clone()))
            .collect();
        ThreadPool {
            workers,
            queue,
            finish,
            halt,
            infinite_halt,
            original_size: size,
        }
    }

    /// Current number of live workers — the `W` the dispatcher partitions
    /// entities across.
    pub fn size(&self) -> usize {
        self.workers.len()
    }

    pub fn queued_len(&self) -> usize {
        self.queue.len()
    }

    pub fn idle_count(&self) -> usize {
        self.queue.idle_count()
    }

    pub fn is_halted(&self) -> bool {
        self.halt.load(Ordering::Acquire)
    }

    pub fn is_infinite_halted(&self) -> bool {
        self.infinite_halt.load(Ordering::Acquire)
    }

    /// Grows or shrinks the pool to `new_size` workers.
    ///
    /// Growing spawns new workers sharing the existing queue. Shrinking
    /// sets the tail workers' cancel flags, wakes everyone, and detaches
    /// those workers — they exit on their own once they observe the
    /// cancel flag, rather than being joined here.
    pub fn resize(&mut self, new_size: usize) {
        let new_size = new_size.max(1);
        match new_size.cmp(&self.workers.len()) {
            std::cmp::Ordering::Greater => {
                for i in self.workers.len()..new_size {
                    self.workers
                        .push(worker::spawn(i, self.queue.clone(), self.finish.clone()));
                }
            }
            std::cmp::Ordering::Less => {
                let keep = new_size;
                for worker in self.workers.split_off(keep) {
                    worker.cancel.store(true, Ordering::Release);
                    // detached: handle dropped without joining, the worker
                    // exits on its own once it observes the cancel flag.
                }
                self.queue.notify_all();
            }
            std::cmp::Ordering::Equal => {}
        }
    }

    /// Submits a one-shot task. `f` receives the index of the worker that
    /// ran it. No-op (returns an already-resolved-empty handle) if the
    /// pool is mid-`halt`/`finish`.
    pub fn add_task<F, T>(&self, f: F) -> TaskHandle<T>
    where
        F: FnOnce(usize) -> T + Send + 'static,
        T: Send + 'static,
    {
        if self.halt.load(Ordering::Acquire) || self.finish.load(Ordering::Acquire) {
            log::warn!("add_task submitted after halt/finish; ignored");
            return TaskHandle::empty();
        }
        let (tx, rx) = mpsc::channel();
        self.queue.push(Box::new(move |idx, _cancel| {
            let _ = tx.send(f(idx));
        }));
        TaskHandle { rx }
    }

    /// As [`add_task`](Self::add_task), but `f` ignores the worker index.
    pub fn add_task_plain<F, T>(&self, mut f: F) -> TaskHandle<T>
    where
        F: FnMut() -> T + Send + 'static,
        T: Send + 'static,
    {
        self.add_task(move |_idx| f())
    }

    /// Submits a perpetual task: `f` is called repeatedly until either
    /// this task's worker observes the pool's cancel flag (set by
    /// `resize`/`halt`) or the infinite-halt flag (`halt_infinite`). The
    /// handle resolves with the result of the *last* invocation.
    pub fn add_infinite_task<F, T>(&self, mut f: F) -> TaskHandle<T>
    where
        F: FnMut(usize) -> T + Send + 'static,
        T: Send + 'static,
    {
        if self.halt.load(Ordering::Acquire) || self.finish.load(Ordering::Acquire) {
            log::warn!("add_infinite_task submitted after halt/finish; ignored");
            return TaskHandle::empty();
        }
        let infinite_halt = self.infinite_halt.clone();
        let (tx, rx) = mpsc::channel();
        self.queue.push(Box::new(move |idx, cancel| {
            let mut last = f(idx);
            while !cancel.load(Ordering::Acquire) && !infinite_halt.load(Ordering::Acquire) {
                last = f(idx);
            }
            let _ = tx.send(last);
        }));
        TaskHandle { rx }
    }

    pub fn add_infinite_task_plain<F, T>(&self, mut f: F) -> TaskHandle<T>
    where
        F: FnMut() -> T + Send + 'static,
        T: Send + 'static,
    {
        self.add_infinite_task(move |_idx| f())
    }

    /// Hard stop: cancels every worker, drops queued tasks, joins.
    pub fn halt(&mut self) {
        self.halt.store(true, Ordering::Release);
        for w in &self.workers {
            w.cancel.store(true, Ordering::Release);
        }
        self.queue.clear();
        self.queue.notify_all();
        self.join_all();
    }

    /// Soft stop: queued tasks run to completion, then workers exit.
    pub fn halt_drain(&mut self) {
        self.finish.store(true, Ordering::Release);
        self.queue.notify_all();
        self.join_all();
    }

    /// Breaks perpetual tasks without tearing down workers or disabling
    /// the queue for new one-shot submissions.
    pub fn halt_infinite(&self) {
        self.infinite_halt.store(true, Ordering::Release);
    }

    /// Equivalent to `halt_drain` followed by resetting every flag and
    /// respawning workers back to the pool's constructed size.
    pub fn restart(&mut self) {
        self.halt_drain();
        self.halt.store(false, Ordering::Release);
        self.finish.store(false, Ordering::Release);
        self.infinite_halt.store(false, Ordering::Release);
        self.queue.clear();
        for i in 0..self.original_size {
            self.workers
                .push(worker::spawn(i, self.queue.clone(), self.finish.clone()));
        }
    }

    fn join_all(&mut self) {
        for w in self.workers.drain(..) {
            if let Some(handle) = w.handle {
                let _ = handle.join();
            }
        }
    }
}

impl Drop for ThreadPool {
    fn drop(&mut self) {
        if !self.workers.is_empty() {
            self.halt_drain();
        }
    }
}
