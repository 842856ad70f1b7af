//! Execution contexts for asynchronous delivery.
//!
//! An [`Executor`] accepts [`Job`]s, each of which delivers one published
//! event to all of its subscribers. The default is a
//! [`SingleThreadExecutor`]: one dedicated worker thread, so jobs run one at a
//! time in submission order.

use herald_core::ExecutorError;
use std::{
    fmt, io,
    sync::Arc,
    thread::{self, JoinHandle},
};
use tokio::{
    runtime::{Handle, TryCurrentError},
    sync::mpsc,
};
use tracing::{debug, warn};

/// A unit of work submitted to an [`Executor`].
pub type Job = Box<dyn FnOnce() + Send + 'static>;

/// Runs delivery jobs.
#[diagnostic::on_unimplemented(
    message = "`{Self}` cannot run delivery jobs",
    label = "missing `Executor` implementation",
    note = "Implement `execute` to hand jobs to a thread, pool or runtime."
)]
pub trait Executor: Send + Sync {
    /// Accept a job for execution.
    ///
    /// Returning `Ok` does not mean the job has run, only that it will.
    fn execute(&self, job: Job) -> Result<(), ExecutorError>;
}

impl<E: Executor + ?Sized> Executor for Arc<E> {
    fn execute(&self, job: Job) -> Result<(), ExecutorError> {
        (**self).execute(job)
    }
}

impl<E: Executor + ?Sized> Executor for Box<E> {
    fn execute(&self, job: Job) -> Result<(), ExecutorError> {
        (**self).execute(job)
    }
}

/// Runs each job immediately on the submitting thread.
#[derive(Debug, Clone, Copy, Default)]
pub struct InlineExecutor;

impl Executor for InlineExecutor {
    fn execute(&self, job: Job) -> Result<(), ExecutorError> {
        job();
        Ok(())
    }
}

/// Name of the default worker thread.
pub const DEFAULT_WORKER_NAME: &str = "herald-dispatch";

/// One dedicated worker thread draining a FIFO queue.
///
/// Dropping the executor closes the queue; the worker finishes the jobs
/// already queued and exits. [`shutdown`](Self::shutdown) does the same and
/// waits for the worker.
pub struct SingleThreadExecutor {
    sender: Option<mpsc::UnboundedSender<Job>>,
    worker: Option<JoinHandle<()>>,
    name: String,
}

impl SingleThreadExecutor {
    /// Start a worker named [`DEFAULT_WORKER_NAME`].
    pub fn new() -> io::Result<Self> {
        Self::named(DEFAULT_WORKER_NAME)
    }

    /// Start a worker with the given thread name.
    pub fn named(name: impl Into<String>) -> io::Result<Self> {
        let name = name.into();
        let (sender, mut receiver) = mpsc::unbounded_channel::<Job>();
        let worker = thread::Builder::new().name(name.clone()).spawn(move || {
            while let Some(job) = receiver.blocking_recv() {
                job();
            }
            debug!("dispatch worker stopped");
        })?;
        debug!(worker = %name, "dispatch worker started");

        Ok(Self {
            sender: Some(sender),
            worker: Some(worker),
            name,
        })
    }

    /// The worker thread name.
    pub fn name(&self) -> &str {
        &self.name
    }

    /// Stop accepting jobs, let the worker drain its queue and wait for it.
    pub fn shutdown(&mut self) {
        self.sender.take();
        if let Some(worker) = self.worker.take() {
            if worker.thread().id() == thread::current().id() {
                return;
            }
            if worker.join().is_err() {
                warn!(worker = %self.name, "dispatch worker panicked");
            }
        }
    }
}

impl Executor for SingleThreadExecutor {
    fn execute(&self, job: Job) -> Result<(), ExecutorError> {
        let sender = self.sender.as_ref().ok_or(ExecutorError::Shutdown)?;
        sender.send(job).map_err(|_| ExecutorError::Shutdown)
    }
}

impl Drop for SingleThreadExecutor {
    fn drop(&mut self) {
        self.sender.take();
    }
}

impl fmt::Debug for SingleThreadExecutor {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("SingleThreadExecutor")
            .field("name", &self.name)
            .field("running", &self.sender.is_some())
            .finish()
    }
}

/// Runs jobs on the blocking pool of a tokio runtime.
///
/// Each job still delivers its own event sequentially, but jobs from
/// different publish calls may run in parallel.
#[derive(Debug, Clone)]
pub struct TokioExecutor {
    handle: Handle,
}

impl TokioExecutor {
    /// Use the runtime behind `handle`.
    pub fn new(handle: Handle) -> Self {
        Self { handle }
    }

    /// Use the runtime the caller is running in.
    pub fn try_current() -> Result<Self, TryCurrentError> {
        Handle::try_current().map(Self::new)
    }
}

impl Executor for TokioExecutor {
    fn execute(&self, job: Job) -> Result<(), ExecutorError> {
        // Detached: completion is reported through the job itself.
        drop(self.handle.spawn_blocking(job));
        Ok(())
    }
}
