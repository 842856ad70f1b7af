//! Testing utilities for Herald.
//!
//! This module provides small fixtures that make it easy to observe what
//! handlers did and to control when delivery jobs run.
//!
//! # Features
//!
//! - [`Counter`]: A shared counter for event payloads or listeners
//! - [`Flag`]: A shared boolean for event payloads or listeners
//! - [`RecordingListener`]: A listener that records every event it receives
//! - [`ManualExecutor`]: An executor that only runs jobs when told to

use crate::executor::{Executor, Job};
use herald_core::{Event, ExecutorError, HandlerMethod, Listener};
use std::{
    collections::VecDeque,
    fmt,
    sync::{
        Arc, Mutex,
        atomic::{AtomicBool, AtomicUsize, Ordering},
    },
};

// ============================================================================
// Counter
// ============================================================================

/// A counter shared between clones.
///
/// # Example
///
/// ```rust,ignore
/// let hits = Counter::new();
/// publisher.publish(Hit { counter: hits.clone() })?.wait()?;
/// assert_eq!(hits.get(), 1);
/// ```
#[derive(Clone, Default)]
pub struct Counter {
    count: Arc<AtomicUsize>,
}

impl Counter {
    /// Create a counter at zero.
    pub fn new() -> Self {
        Self::default()
    }

    /// Add one, returning the previous value.
    pub fn increment(&self) -> usize {
        self.count.fetch_add(1, Ordering::SeqCst)
    }

    /// Current value.
    pub fn get(&self) -> usize {
        self.count.load(Ordering::SeqCst)
    }

    /// Reset to zero.
    pub fn reset(&self) {
        self.count.store(0, Ordering::SeqCst);
    }
}

impl fmt::Debug for Counter {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_tuple("Counter").field(&self.get()).finish()
    }
}

// ============================================================================
// Flag
// ============================================================================

/// A boolean shared between clones.
#[derive(Clone, Default)]
pub struct Flag {
    value: Arc<AtomicBool>,
}

impl Flag {
    /// Create an unset flag.
    pub fn new() -> Self {
        Self::default()
    }

    /// Set the flag.
    pub fn set(&self) {
        self.value.store(true, Ordering::SeqCst);
    }

    /// Returns `true` if the flag was set.
    pub fn is_set(&self) -> bool {
        self.value.load(Ordering::SeqCst)
    }
}

impl fmt::Debug for Flag {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_tuple("Flag").field(&self.is_set()).finish()
    }
}

// ============================================================================
// Recording Listener
// ============================================================================

/// A listener that records a clone of every `E` it receives.
///
/// Clones share the same record.
///
/// # Example
///
/// ```rust,ignore
/// let recorder = RecordingListener::<Shipped>::new();
/// publisher.register(recorder.clone())?;
///
/// publisher.publish(Shipped { id: 3 })?.wait()?;
/// assert_eq!(recorder.events(), vec![Shipped { id: 3 }]);
/// ```
pub struct RecordingListener<E: Clone> {
    events: Arc<Mutex<Vec<E>>>,
}

impl<E: Clone> RecordingListener<E> {
    /// Create a listener with an empty record.
    pub fn new() -> Self {
        Self {
            events: Arc::new(Mutex::new(Vec::new())),
        }
    }

    /// Handler bound to `E`.
    pub fn record(&self, event: &E) {
        self.events.lock().unwrap().push(event.clone());
    }

    /// Get a clone of the recorded events.
    pub fn events(&self) -> Vec<E> {
        self.events.lock().unwrap().clone()
    }

    /// Get the number of recorded events.
    pub fn count(&self) -> usize {
        self.events.lock().unwrap().len()
    }

    /// Clear all recorded events.
    pub fn clear(&self) {
        self.events.lock().unwrap().clear();
    }
}

impl<E: Clone> Default for RecordingListener<E> {
    fn default() -> Self {
        Self::new()
    }
}

impl<E: Clone> Clone for RecordingListener<E> {
    fn clone(&self) -> Self {
        Self {
            events: self.events.clone(),
        }
    }
}

impl<E: Event + Clone> Listener for RecordingListener<E> {
    fn handler_methods() -> Vec<HandlerMethod<Self>> {
        vec![HandlerMethod::subscribe("record", Self::record)]
    }
}

impl<E: Clone> fmt::Debug for RecordingListener<E> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("RecordingListener")
            .field("count", &self.count())
            .finish()
    }
}

// ============================================================================
// Manual Executor
// ============================================================================

/// An executor that queues jobs until [`run_pending`](Self::run_pending).
///
/// Useful for checking what a completion handle looks like before delivery
/// has happened.
#[derive(Clone, Default)]
pub struct ManualExecutor {
    queue: Arc<Mutex<VecDeque<Job>>>,
    closed: Arc<AtomicBool>,
}

impl ManualExecutor {
    /// Create an empty executor.
    pub fn new() -> Self {
        Self::default()
    }

    /// Number of queued jobs.
    pub fn pending(&self) -> usize {
        self.queue.lock().unwrap().len()
    }

    /// Run queued jobs in order, returning how many ran.
    pub fn run_pending(&self) -> usize {
        let mut ran = 0;
        loop {
            // Released before the job runs so jobs may submit more jobs.
            let Some(job) = self.queue.lock().unwrap().pop_front() else {
                return ran;
            };
            job();
            ran += 1;
        }
    }

    /// Drop queued jobs without running them, returning how many were dropped.
    pub fn discard_pending(&self) -> usize {
        let mut queue = self.queue.lock().unwrap();
        let dropped = queue.len();
        queue.clear();
        dropped
    }

    /// Refuse all further jobs.
    pub fn close(&self) {
        self.closed.store(true, Ordering::SeqCst);
    }
}

impl Executor for ManualExecutor {
    fn execute(&self, job: Job) -> Result<(), ExecutorError> {
        if self.closed.load(Ordering::SeqCst) {
            return Err(ExecutorError::Shutdown);
        }
        self.queue.lock().unwrap().push_back(job);
        Ok(())
    }
}

impl fmt::Debug for ManualExecutor {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ManualExecutor")
            .field("pending", &self.pending())
            .field("closed", &self.closed.load(Ordering::SeqCst))
            .finish()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn counter_is_shared_between_clones() {
        let counter = Counter::new();
        let clone = counter.clone();
        assert_eq!(clone.increment(), 0);
        assert_eq!(counter.get(), 1);
        counter.reset();
        assert_eq!(clone.get(), 0);
    }

    #[derive(Debug, Clone, PartialEq)]
    struct Note(&'static str);
    impl Event for Note {}

    #[test]
    fn recording_listener_records_through_its_descriptor() {
        let recorder = RecordingListener::<Note>::new();
        let methods = RecordingListener::<Note>::handler_methods();
        let invoke = methods[0].invoker().unwrap();

        invoke(&recorder, &Note("a")).unwrap();
        invoke(&recorder.clone(), &Note("b")).unwrap();

        assert_eq!(recorder.events(), vec![Note("a"), Note("b")]);
        recorder.clear();
        assert_eq!(recorder.count(), 0);
    }

    #[test]
    fn manual_executor_runs_only_when_asked() {
        let executor = ManualExecutor::new();
        let counter = Counter::new();

        for _ in 0..3 {
            let counter = counter.clone();
            executor
                .execute(Box::new(move || {
                    counter.increment();
                }))
                .unwrap();
        }
        assert_eq!(executor.pending(), 3);
        assert_eq!(counter.get(), 0);

        assert_eq!(executor.run_pending(), 3);
        assert_eq!(counter.get(), 3);
    }

    #[test]
    fn closed_manual_executor_rejects_jobs() {
        let executor = ManualExecutor::new();
        executor.close();
        assert_eq!(
            executor.execute(Box::new(|| {})),
            Err(ExecutorError::Shutdown)
        );
    }
}
