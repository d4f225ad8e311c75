//! Worker loop.

use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;
use std::thread;

use super::queue::TaskQueue;

pub(crate) struct WorkerSlot {
    pub handle: Option<thread::JoinHandle<()>>,
    pub cancel: Arc<AtomicBool>,
}

/// Spawns one worker thread: pop and run tasks until the queue is empty,
/// then idle-wait on the queue's condvar for a new task or a stop signal.
pub(crate) fn spawn(
    index: usize,
    queue: Arc<TaskQueue>,
    finish: Arc<AtomicBool>,
) -> WorkerSlot {
    let cancel = Arc::new(AtomicBool::new(false));
    let worker_cancel = cancel.clone();
    let handle = thread::Builder::new()
        .name(format!("ecs-core-worker-{index}"))
        .spawn(move || {
            log::trace!("worker {index} starting");
            loop {
                match queue.wait_for_work(&worker_cancel, &finish) {
                    Some(task) => {
                        task(index, &worker_cancel);
                        if worker_cancel.load(Ordering::Acquire) {
                            break;
                        }
                    }
                    None => break,
                }
            }
            log::trace!("worker {index} exiting");
        })
        .expect("failed to spawn worker thread");

    WorkerSlot {
        handle: Some(handle),
        cancel,
    }
}
