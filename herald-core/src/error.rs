//! Error types for Herald.
//!
//! This module provides a structured error hierarchy using `thiserror`:
//!
//! - [`HeraldError`] - Top-level error type for all Herald operations
//! - [`RegistrationError`] - A listener offered a malformed handler
//! - [`PublishError`] - An event could not be handed to the dispatcher
//! - [`HandlerError`] - A single handler invocation failed
//! - [`DeliveryError`] - A completion handle lost its delivery

use crate::event::Event;
use std::fmt;
use thiserror::Error;

/// A boxed error type for dynamic error handling.
pub type BoxError = Box<dyn std::error::Error + Send + Sync + 'static>;

/// Top-level error type for all Herald operations.
#[derive(Error, Debug)]
pub enum HeraldError {
    /// A listener could not be registered.
    #[error("registration error: {0}")]
    Registration(#[from] RegistrationError),

    /// An event could not be published.
    #[error("publish error: {0}")]
    Publish(#[from] PublishError),

    /// The dispatch worker could not be started.
    #[error("failed to start dispatch worker: {0}")]
    Worker(#[from] std::io::Error),

    /// A custom error occurred.
    #[error(transparent)]
    Custom(BoxError),
}

/// Errors raised by `register`.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum RegistrationError {
    /// A marked method does not have the shape of a handler.
    #[error("invalid handler `{listener}::{method}`: {violation}")]
    InvalidHandlerShape {
        /// Listener type name.
        listener: &'static str,
        /// Offending method.
        method: &'static str,
        /// The rule that was broken.
        violation: ShapeViolation,
    },
}

impl RegistrationError {
    /// The broken rule.
    pub fn violation(&self) -> &ShapeViolation {
        match self {
            RegistrationError::InvalidHandlerShape { violation, .. } => violation,
        }
    }

    /// The offending method.
    pub fn method(&self) -> &'static str {
        match self {
            RegistrationError::InvalidHandlerShape { method, .. } => method,
        }
    }
}

/// The handler rule a marked method breaks.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ShapeViolation {
    /// The method is not `pub`.
    NotPublic,
    /// The method does not take `&self`.
    Receiver,
    /// The method returns a value.
    ReturnsValue(&'static str),
    /// The method is `async`.
    ReturnsFuture,
    /// The method does not take exactly one parameter besides `&self`.
    ParameterCount(usize),
    /// The parameter is not a shared reference.
    NotBorrowed(&'static str),
    /// The parameter type is open (trait object, `impl Trait` or generic).
    NotSealed(&'static str),
    /// The parameter type does not implement `Event`.
    NotAnEvent(&'static str),
    /// The descriptor carries no invoker.
    MissingInvoker,
}

impl fmt::Display for ShapeViolation {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ShapeViolation::NotPublic => f.write_str("handler must be `pub`"),
            ShapeViolation::Receiver => f.write_str("handler must take `&self`"),
            ShapeViolation::ReturnsValue(ty) => {
                write!(f, "handler must not return a value, found `{ty}`")
            }
            ShapeViolation::ReturnsFuture => f.write_str("handler must not be `async`"),
            ShapeViolation::ParameterCount(n) => {
                write!(f, "handler must take exactly one event parameter, found {n}")
            }
            ShapeViolation::NotBorrowed(ty) => {
                write!(f, "event parameter must be a shared reference, found `{ty}`")
            }
            ShapeViolation::NotSealed(ty) => {
                write!(f, "event parameter must name a concrete type, found `{ty}`")
            }
            ShapeViolation::NotAnEvent(ty) => {
                write!(f, "event parameter `{ty}` does not implement `Event`")
            }
            ShapeViolation::MissingInvoker => f.write_str("handler descriptor has no invoker"),
        }
    }
}

/// Errors raised by `publish`.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum PublishError {
    /// No event was supplied.
    #[error("no event supplied")]
    MissingEvent,

    /// The executor refused the delivery job.
    #[error(transparent)]
    Executor(#[from] ExecutorError),
}

/// Errors raised by an executor when accepting a job.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum ExecutorError {
    /// The executor no longer accepts jobs.
    #[error("executor has been shut down")]
    Shutdown,
}

/// A single handler invocation failed.
///
/// These never reach the caller of `publish`; the dispatcher logs them and
/// moves on to the next subscriber.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum HandlerError {
    /// The invoker received an event of a different type.
    #[error("handler expected `{expected}` but received `{actual}`")]
    EventMismatch {
        /// Type the handler was written for.
        expected: &'static str,
        /// Type that was delivered.
        actual: &'static str,
    },

    /// The handler panicked.
    #[error("handler panicked: {0}")]
    Panicked(String),
}

impl HandlerError {
    /// Mismatch between a handler for `T` and the delivered event.
    pub fn mismatch<T: ?Sized>(event: &dyn Event) -> Self {
        HandlerError::EventMismatch {
            expected: std::any::type_name::<T>(),
            actual: event.event_name(),
        }
    }
}

/// A completion handle could not observe its delivery.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum DeliveryError {
    /// The executor dropped the delivery job before it ran.
    #[error("delivery was abandoned before completion")]
    Abandoned,
}

// Convenience conversions
impl From<BoxError> for HeraldError {
    fn from(err: BoxError) -> Self {
        HeraldError::Custom(err)
    }
}
