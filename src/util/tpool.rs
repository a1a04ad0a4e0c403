//! Fixed-size worker pool.
//!
//! Workers pull boxed jobs from a shared channel; each enqueued job hands
//! back its result through a one-shot channel. Worker panics are caught and
//! surfaced to the consumer of the job handle.

use crossbeam_channel::{bounded, unbounded, Receiver, Sender, TryRecvError};
use std::panic::{catch_unwind, AssertUnwindSafe};
use std::thread;

type Job = Box<dyn FnOnce() + Send + 'static>;

pub struct ThreadPool {
    tx: Option<Sender<Job>>,
    workers: Vec<thread::JoinHandle<()>>,
}

/// Completion handle of an enqueued job.
pub struct JobHandle<T> {
    rx: Receiver<thread::Result<T>>,
}

impl<T> JobHandle<T> {
    /// Non-blocking poll; `Some` exactly once when the job has finished.
    /// An `Err` payload carries a worker panic.
    pub fn try_take(&mut self) -> Option<thread::Result<T>> {
        match self.rx.try_recv() {
            Ok(r) => Some(r),
            Err(TryRecvError::Empty) => None,
            Err(TryRecvError::Disconnected) => None,
        }
    }

    /// Blocks until the job finishes.
    pub fn wait(self) -> thread::Result<T> {
        match self.rx.recv() {
            Ok(r) => r,
            Err(_) => Err(Box::new("worker dropped the job")),
        }
    }
}

impl ThreadPool {
    /// Spawns `threads` workers (at least one).
    pub fn new(threads: usize) -> Self {
        let threads = threads.max(1);
        let (tx, rx) = unbounded::<Job>();

        let workers = (0..threads)
            .map(|i| {
                let rx = rx.clone();
                thread::Builder::new()
                    .name(format!("wt-worker-{i}"))
                    .spawn(move || {
                        while let Ok(job) = rx.recv() {
                            job();
                        }
                    })
                    .expect("failed to spawn worker thread")
            })
            .collect();

        Self {
            tx: Some(tx),
            workers,
        }
    }

    /// A pool sized to the available hardware parallelism.
    pub fn with_available_parallelism() -> Self {
        let n = thread::available_parallelism().map_or(1, |n| n.get());
        Self::new(n)
    }

    #[inline]
    pub fn thread_count(&self) -> usize {
        self.workers.len()
    }

    /// Enqueues a job and returns its completion handle.
    pub fn enqueue<T, F>(&self, f: F) -> JobHandle<T>
    where
        T: Send + 'static,
        F: FnOnce() -> T + Send + 'static,
    {
        let (tx, rx) = bounded(1);
        let job: Job = Box::new(move || {
            let r = catch_unwind(AssertUnwindSafe(f));
            let _ = tx.send(r);
        });
        self.tx
            .as_ref()
            .expect("pool is shutting down")
            .send(job)
            .expect("worker channel closed");
        JobHandle { rx }
    }
}

impl Drop for ThreadPool {
    fn drop(&mut self) {
        // closing the channel lets the workers drain and exit
        self.tx = None;
        for w in self.workers.drain(..) {
            let _ = w.join();
        }
    }
}
