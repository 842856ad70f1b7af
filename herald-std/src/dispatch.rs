//! Delivery of one event to its subscribers.
//!
//! A [`Dispatch`] owns an event and a snapshot of the subscribers resolved
//! for its exact kind. Running it calls every subscriber in order; a failing
//! subscriber is logged, counted and skipped. The outcome is a
//! [`DeliveryReport`], observed through a [`Delivery`] handle.

use crate::{executor::Executor, registry::Subscriber};
use herald_core::{DeliveryError, Event, ExecutorError};
use std::{
    fmt,
    future::Future,
    pin::Pin,
    sync::Arc,
    task::{Context, Poll},
};
use tokio::sync::oneshot;
use tracing::{debug, warn};

/// Outcome of delivering one event.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DeliveryReport {
    /// Event type name.
    pub event: &'static str,
    /// Subscribers resolved for the event.
    pub subscribers: usize,
    /// Subscribers that returned normally.
    pub delivered: usize,
    /// Subscribers that failed.
    pub failed: usize,
}

impl DeliveryReport {
    /// Report for an event nobody subscribed to.
    pub fn empty(event: &'static str) -> Self {
        Self {
            event,
            subscribers: 0,
            delivered: 0,
            failed: 0,
        }
    }

    /// Returns `true` if no subscriber failed.
    pub fn is_clean(&self) -> bool {
        self.failed == 0
    }
}

/// Call `subscribers` with `event` in order, isolating failures.
pub fn deliver(event: &dyn Event, subscribers: &[Arc<Subscriber>]) -> DeliveryReport {
    let mut report = DeliveryReport::empty(event.event_name());
    report.subscribers = subscribers.len();

    for subscriber in subscribers {
        match subscriber.invoke(event) {
            Ok(()) => report.delivered += 1,
            Err(error) => {
                warn!(
                    event = report.event,
                    listener = subscriber.listener(),
                    method = subscriber.method(),
                    %error,
                    "subscriber failed"
                );
                report.failed += 1;
            }
        }
    }

    debug!(
        event = report.event,
        delivered = report.delivered,
        failed = report.failed,
        "event delivered"
    );
    report
}

/// An event paired with the subscribers it will be delivered to.
pub struct Dispatch {
    event: Arc<dyn Event>,
    subscribers: Vec<Arc<Subscriber>>,
}

impl Dispatch {
    /// Create a dispatch over a snapshot of subscribers.
    pub fn new(event: Arc<dyn Event>, subscribers: Vec<Arc<Subscriber>>) -> Self {
        Self { event, subscribers }
    }

    /// Deliver on the calling thread.
    pub fn run(self) -> DeliveryReport {
        deliver(&*self.event, &self.subscribers)
    }

    /// Deliver as a single job on `executor`.
    ///
    /// The whole chain runs inside one job, so the subscribers of this
    /// dispatch never run concurrently with each other.
    pub fn spawn(self, executor: &dyn Executor) -> Result<Delivery, ExecutorError> {
        let (tx, rx) = oneshot::channel();
        executor.execute(Box::new(move || {
            let report = self.run();
            // The caller may have dropped its handle.
            let _ = tx.send(report);
        }))?;
        Ok(Delivery::pending(rx))
    }
}

impl fmt::Debug for Dispatch {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Dispatch")
            .field("event", &self.event.kind())
            .field("subscribers", &self.subscribers.len())
            .finish()
    }
}

enum State {
    Ready(Option<DeliveryReport>),
    Pending(oneshot::Receiver<DeliveryReport>),
}

/// Completion handle for a published event.
///
/// Resolves once every subscriber resolved for the event has run. A handle
/// from a synchronous publish is already resolved.
///
/// # Example
///
/// ```rust,ignore
/// let report = publisher.publish(OrderPlaced { id: 7 })?.await?;
/// assert!(report.is_clean());
/// ```
#[must_use = "a Delivery does nothing unless awaited or waited on"]
pub struct Delivery {
    state: State,
}

impl Delivery {
    /// A handle that is already resolved.
    pub fn ready(report: DeliveryReport) -> Self {
        Self {
            state: State::Ready(Some(report)),
        }
    }

    fn pending(rx: oneshot::Receiver<DeliveryReport>) -> Self {
        Self {
            state: State::Pending(rx),
        }
    }

    /// Block the current thread until delivery completes.
    ///
    /// # Panics
    ///
    /// Panics when called from within an asynchronous execution context;
    /// `.await` the handle there instead.
    pub fn wait(self) -> Result<DeliveryReport, DeliveryError> {
        match self.state {
            State::Ready(report) => report.ok_or(DeliveryError::Abandoned),
            State::Pending(rx) => rx.blocking_recv().map_err(|_| DeliveryError::Abandoned),
        }
    }

    /// The report, if delivery has completed. Does not block.
    pub fn try_report(&mut self) -> Option<Result<DeliveryReport, DeliveryError>> {
        match &mut self.state {
            State::Ready(report) => Some(report.take().ok_or(DeliveryError::Abandoned)),
            State::Pending(rx) => match rx.try_recv() {
                Ok(report) => Some(Ok(report)),
                Err(oneshot::error::TryRecvError::Empty) => None,
                Err(oneshot::error::TryRecvError::Closed) => Some(Err(DeliveryError::Abandoned)),
            },
        }
    }
}

impl Future for Delivery {
    type Output = Result<DeliveryReport, DeliveryError>;

    fn poll(mut self: Pin<&mut Self>, cx: &mut Context<'_>) -> Poll<Self::Output> {
        match &mut self.state {
            State::Ready(report) => Poll::Ready(report.take().ok_or(DeliveryError::Abandoned)),
            State::Pending(rx) => Pin::new(rx)
                .poll(cx)
                .map_err(|_| DeliveryError::Abandoned),
        }
    }
}

impl fmt::Debug for Delivery {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let state = match &self.state {
            State::Ready(_) => "ready",
            State::Pending(_) => "pending",
        };
        f.debug_struct("Delivery").field("state", &state).finish()
    }
}
