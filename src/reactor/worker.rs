//! Fixed-size pool of named background threads

use std::panic::{catch_unwind, AssertUnwindSafe};
use std::sync::mpsc::{self, Receiver, Sender};
use std::sync::{Arc, Condvar, Mutex, MutexGuard, PoisonError};
use std::thread::{self, JoinHandle};

use anyhow::{Context, Result};

type Job = Box<dyn FnOnce() + Send + 'static>;

/// Count of queued plus running jobs
#[derive(Default)]
struct Pending {
    count: Mutex<usize>,
    idle: Condvar,
}

impl Pending {
    fn lock(&self) -> MutexGuard<'_, usize> {
        self.count.lock().unwrap_or_else(PoisonError::into_inner)
    }

    fn add(&self) {
        *self.lock() += 1;
    }

    fn done(&self) {
        let mut count = self.lock();
        *count = count.saturating_sub(1);
        if *count == 0 {
            self.idle.notify_all();
        }
    }
}

pub struct WorkerPool {
    sender: Option<Sender<Job>>,
    workers: Vec<JoinHandle<()>>,
    pending: Arc<Pending>,
}

impl WorkerPool {
    /// Spawn `threads` workers (at least one)
    pub fn new(threads: usize) -> Result<Self> {
        let (sender, receiver) = mpsc::channel::<Job>();
        let receiver = Arc::new(Mutex::new(receiver));
        let pending = Arc::new(Pending::default());

        let workers = (0..threads.max(1))
            .map(|i| {
                let receiver = Arc::clone(&receiver);
                let pending = Arc::clone(&pending);
                thread::Builder::new()
                    .name(format!("occurrences-{}", i))
                    .spawn(move || worker_loop(&receiver, &pending))
                    .with_context(|| format!("failed to spawn occurrence worker {}", i))
            })
            .collect::<Result<Vec<_>>>()?;

        Ok(Self {
            sender: Some(sender),
            workers,
            pending,
        })
    }

    pub fn thread_count(&self) -> usize {
        self.workers.len()
    }

    /// Queue `job`; returns immediately
    pub fn execute(&self, job: impl FnOnce() + Send + 'static) {
        let Some(sender) = &self.sender else {
            return;
        };
        self.pending.add();
        if sender.send(Box::new(job)).is_err() {
            tracing::warn!("Occurrence workers are gone, dropping job");
            self.pending.done();
        }
    }

    /// Block until every queued job has finished
    pub fn wait_idle(&self) {
        let mut count = self.pending.lock();
        while *count > 0 {
            count = self
                .pending
                .idle
                .wait(count)
                .unwrap_or_else(PoisonError::into_inner);
        }
    }
}

fn worker_loop(receiver: &Mutex<Receiver<Job>>, pending: &Pending) {
    loop {
        let job = {
            let receiver = receiver.lock().unwrap_or_else(PoisonError::into_inner);
            receiver.recv()
        };
        let Ok(job) = job else {
            break;
        };

        if catch_unwind(AssertUnwindSafe(job)).is_err() {
            tracing::warn!(
                "Job panicked on {}",
                thread::current().name().unwrap_or("occurrence worker")
            );
        }
        pending.done();
    }
}

impl Drop for WorkerPool {
    fn drop(&mut self) {
        // Closing the channel ends every worker loop
        self.sender.take();
        for worker in self.workers.drain(..) {
            if worker.join().is_err() {
                tracing::warn!("Occurrence worker exited with a panic");
            }
        }
    }
}
