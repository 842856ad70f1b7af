//! # herald-std
//!
//! Standard implementations for the Herald event publisher.
//!
//! This crate provides:
//! - **Registration**: [`Registry`], shape [`validate`]ion and [`Subscriber`]s
//! - **Dispatch**: [`Dispatch`], [`deliver`], [`Delivery`] handles and
//!   [`DeliveryReport`]s
//! - **Executors**: [`SingleThreadExecutor`], [`TokioExecutor`],
//!   [`InlineExecutor`]
//! - **Testing**: counters, flags, a recording listener and a manually
//!   driven executor

#![deny(clippy::wildcard_imports)]
#![warn(missing_docs)]

// Re-export core traits
pub use herald_core;

// Modules
pub mod dispatch;
pub mod executor;
pub mod registry;
pub mod testing;

pub use dispatch::{Delivery, DeliveryReport, Dispatch, deliver};
pub use executor::{
    DEFAULT_WORKER_NAME, Executor, InlineExecutor, Job, SingleThreadExecutor, TokioExecutor,
};
pub use registry::{Registry, RegistrationPolicy, Subscriber, validate};
