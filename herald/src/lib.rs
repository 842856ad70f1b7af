//! # herald - In-Process Event Publishing
//!
//! `herald` delivers events to the handler methods of registered listeners.
//! Routing is by **exact type**: a handler written for `OrderPlaced` sees
//! every `OrderPlaced` and nothing else. Handlers are isolated from each
//! other; one that panics is logged and counted, and the rest still run.
//!
//! ## Quick Start
//!
//! ```rust,ignore
//! use herald::prelude::*;
//!
//! #[derive(Event)]
//! struct OrderPlaced {
//!     id: u64,
//! }
//!
//! struct Mailer;
//!
//! #[listener]
//! impl Mailer {
//!     #[subscribe]
//!     pub fn on_order(&self, event: &OrderPlaced) {
//!         println!("receipt for order {}", event.id);
//!     }
//! }
//!
//! let mut publisher = EventPublisher::new()?;
//! publisher.register(Mailer)?;
//!
//! let report = publisher.publish(OrderPlaced { id: 7 })?.wait()?;
//! assert_eq!(report.delivered, 1);
//! ```
//!
//! ## Dispatch Modes
//!
//! - **Asynchronous** (default): each `publish` becomes one job on an
//!   [`Executor`]. The default executor is a single dedicated worker thread.
//! - **Synchronous**: handlers run on the publishing thread before `publish`
//!   returns.
//!
//! Either way `publish` returns a [`Delivery`] that resolves to a
//! [`DeliveryReport`] once every handler has run.
//!
//! ## Handler Rules
//!
//! A handler is a `pub fn name(&self, event: &E)` returning `()`, where `E`
//! is a concrete type implementing [`Event`]. Methods marked `#[subscribe]`
//! that break these rules make `register` fail with a
//! [`RegistrationError`].

#![deny(clippy::wildcard_imports)]
#![warn(missing_docs)]

mod publisher;

pub use publisher::{DispatchMode, EventPublisher, PublisherBuilder, PublisherConfig};

pub use herald_core::{
    // Error types
    BoxError,
    DeliveryError,
    // Event
    Event,
    EventKind,
    ExecutorError,
    HandlerError,
    // Listener
    HandlerMethod,
    HandlerSignature,
    HeraldError,
    Invoke,
    Listener,
    Param,
    PublishError,
    Receiver,
    RegistrationError,
    Returns,
    ShapeViolation,
    Visibility,
};

// Registration and dispatch
pub use herald_std::{
    DEFAULT_WORKER_NAME, Delivery, DeliveryReport, Dispatch, Executor, InlineExecutor, Job,
    RegistrationPolicy, Registry, SingleThreadExecutor, Subscriber, TokioExecutor, deliver,
    validate,
};

#[doc(hidden)]
pub use herald_core::__private;

/// Testing utilities.
pub mod testing {
    #![allow(clippy::wildcard_imports)]
    pub use herald_std::testing::*;
}

/// Prelude module - common imports for Herald.
///
/// # Usage
///
/// ```rust,ignore
/// use herald::prelude::*;
/// ```
pub mod prelude {
    pub use crate::{
        Delivery, DeliveryReport, Event, EventPublisher, HeraldError, Listener, PublishError,
        RegistrationError,
    };

    #[cfg(feature = "macros")]
    pub use crate::{listener, subscribe};
}

#[cfg(feature = "macros")]
pub use herald_macros::{Event, listener, subscribe};
