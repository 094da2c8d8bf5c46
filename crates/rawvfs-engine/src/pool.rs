//! Fixed-size worker pool.

use std::thread::{self, JoinHandle};

use crossbeam_channel::{Receiver, Sender};
use tracing::{debug, trace};

type Task = Box<dyn FnOnce() + Send + 'static>;

/// A fixed set of worker threads draining a shared task queue.
///
/// Dropping the pool closes the queue and joins every worker; tasks
/// already submitted run to completion first. Workers keep thread-local
/// state (decoder caches) that is torn down with the thread.
pub struct WorkerPool {
    name: &'static str,
    task_tx: Option<Sender<Task>>,
    workers: Vec<JoinHandle<()>>,
}

impl WorkerPool {
    /// Spawn `size` workers named after the pool.
    pub fn new(name: &'static str, size: usize) -> Self {
        let size = size.max(1);
        let (task_tx, task_rx): (Sender<Task>, Receiver<Task>) = crossbeam_channel::unbounded();

        let workers = (0..size)
            .map(|index| {
                let task_rx = task_rx.clone();
                thread::spawn(move || {
                    trace!(worker = index, "Worker started");
                    while let Ok(task) = task_rx.recv() {
                        task();
                    }
                    trace!(worker = index, "Worker exiting");
                })
            })
            .collect();

        debug!(name, size, "Worker pool started");

        Self {
            name,
            task_tx: Some(task_tx),
            workers,
        }
    }

    /// Queue a task for execution on any worker.
    pub fn execute<F>(&self, task: F)
    where
        F: FnOnce() + Send + 'static,
    {
        if let Some(task_tx) = &self.task_tx {
            // The receiver outlives the sender by construction.
            let _ = task_tx.send(Box::new(task));
        }
    }

    /// Number of worker threads.
    pub fn size(&self) -> usize {
        self.workers.len()
    }
}

impl Drop for WorkerPool {
    fn drop(&mut self) {
        // Closing the channel lets workers drain the remaining queue and
        // stop; join so no task outlives the pool.
        self.task_tx.take();
        for worker in self.workers.drain(..) {
            let _ = worker.join();
        }
        debug!(name = self.name, "Worker pool stopped");
    }
}
