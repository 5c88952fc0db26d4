//! Fixed-size worker pool draining a pre-filled task queue

use std::future::Future;
use std::sync::Arc;

use tokio::sync::{Mutex, mpsc};
use tokio::task::JoinSet;
use tokio_util::sync::CancellationToken;
use tracing::{debug, error};

/// Summary of a finished pool run
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct PoolReport {
    pub workers_spawned: usize,
    /// Tasks whose `process` call returned (panicked tasks are not counted)
    pub tasks_processed: usize,
}

/// Shared FIFO of tasks, filled once and drained to empty.
///
/// Every task is handed to exactly one `pop` caller.
pub struct WorkQueue<T> {
    receiver: Arc<Mutex<mpsc::Receiver<T>>>,
}

impl<T> Clone for WorkQueue<T> {
    fn clone(&self) -> Self {
        Self {
            receiver: Arc::clone(&self.receiver),
        }
    }
}

impl<T: Send> WorkQueue<T> {
    /// Enqueue all tasks up front; the queue is never refilled
    pub fn new(tasks: Vec<T>) -> Self {
        let (sender, receiver) = mpsc::channel(tasks.len().max(1));
        for task in tasks {
            // Capacity equals the task count and the receiver is alive
            if let Err(e) = sender.try_send(task) {
                error!("Failed to enqueue task: {}", e);
            }
        }

        Self {
            receiver: Arc::new(Mutex::new(receiver)),
        }
    }

    /// Take the next task; `None` once the queue is empty or the run is cancelled
    pub async fn pop(&self, cancel: &CancellationToken) -> Option<T> {
        if cancel.is_cancelled() {
            return None;
        }
        self.receiver.lock().await.try_recv().ok()
    }
}

/// Number of workers for `task_count` tasks: `min(concurrency, task_count)`,
/// at least one when there is any task
pub fn worker_count(concurrency: usize, task_count: usize) -> usize {
    if task_count == 0 {
        0
    } else {
        concurrency.clamp(1, task_count)
    }
}

/// Process every task on a fixed set of workers and wait for all of them.
///
/// Each worker pops one task at a time and awaits `process` on it until the
/// queue is empty or `cancel` fires. A panicking task takes its worker down
/// with it; the remaining workers keep draining the queue.
pub async fn run<T, F, Fut>(
    tasks: Vec<T>,
    concurrency: usize,
    cancel: CancellationToken,
    process: F,
) -> PoolReport
where
    T: Send + 'static,
    F: Fn(T) -> Fut + Send + Sync + 'static,
    Fut: Future<Output = ()> + Send + 'static,
{
    let workers = worker_count(concurrency, tasks.len());
    if workers == 0 {
        return PoolReport::default();
    }

    let queue = WorkQueue::new(tasks);
    let process = Arc::new(process);
    let mut set = JoinSet::new();

    for worker_id in 0..workers {
        let queue = queue.clone();
        let process = Arc::clone(&process);
        let cancel = cancel.clone();
        set.spawn(async move {
            let mut processed = 0;
            while let Some(task) = queue.pop(&cancel).await {
                process(task).await;
                processed += 1;
            }
            debug!("Worker {} finished after {} tasks", worker_id, processed);
            processed
        });
    }

    let mut report = PoolReport {
        workers_spawned: workers,
        tasks_processed: 0,
    };
    while let Some(result) = set.join_next().await {
        match result {
            Ok(processed) => report.tasks_processed += processed,
            Err(e) => error!("Worker terminated abnormally: {}", e),
        }
    }

    report
}
