//! # herald-core
//!
//! Core traits for the Herald event publisher.
//!
//! This crate has minimal dependencies and is designed to be imported by
//! crates that declare events or listeners without needing the dispatch
//! machinery in `herald-std`.
//!
//! # Building Blocks
//!
//! - [`Event`]: marker for publishable values; [`EventKind`] identifies the
//!   exact runtime type used for routing.
//! - [`Listener`]: an object offering handler methods, each described by a
//!   [`HandlerMethod`] (a [`HandlerSignature`] plus an invoker).
//!
//! # Error Types
//!
//! - [`HeraldError`] - Top-level error type
//! - [`RegistrationError`] - Malformed handler shapes
//! - [`PublishError`] - Publish-time failures
//! - [`HandlerError`] - Isolated handler failures

#![deny(clippy::wildcard_imports)]
#![warn(missing_docs)]

mod error;
mod event;
mod listener;

// Re-exports
pub use error::{
    BoxError, DeliveryError, ExecutorError, HandlerError, HeraldError, PublishError,
    RegistrationError, ShapeViolation,
};
pub use event::{Event, EventKind};
pub use listener::{
    HandlerMethod, HandlerSignature, Invoke, Listener, Param, Receiver, Returns, Visibility,
};

#[doc(hidden)]
pub use listener::__private;
