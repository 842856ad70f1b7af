//! The event publisher.
//!
//! An [`EventPublisher`] owns a [`Registry`] and a [`DispatchMode`].
//! Registration needs `&mut self`; publishing only needs `&self`.

use herald_core::{Event, HeraldError, Listener, PublishError, RegistrationError};
use herald_std::{
    DEFAULT_WORKER_NAME, Delivery, DeliveryReport, Dispatch, Executor, RegistrationPolicy,
    Registry, SingleThreadExecutor,
};
use std::{fmt, sync::Arc};
use tracing::debug;

/// Where subscribers run.
#[derive(Clone)]
pub enum DispatchMode {
    /// On the publishing thread, before `publish` returns.
    Sync,
    /// As one job per publish call on an executor.
    Async(Arc<dyn Executor>),
}

impl fmt::Debug for DispatchMode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            DispatchMode::Sync => f.write_str("Sync"),
            DispatchMode::Async(_) => f.write_str("Async"),
        }
    }
}

/// Plain configuration for an [`EventPublisher`].
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PublisherConfig {
    /// Deliver on the publishing thread instead of a worker.
    pub synchronous: bool,
    /// Thread name of the default worker.
    pub worker_name: String,
    /// How registration treats listeners with invalid methods.
    pub registration_policy: RegistrationPolicy,
}

impl Default for PublisherConfig {
    fn default() -> Self {
        Self {
            synchronous: false,
            worker_name: DEFAULT_WORKER_NAME.to_owned(),
            registration_policy: RegistrationPolicy::default(),
        }
    }
}

/// Builder for constructing an [`EventPublisher`].
///
/// # Example
///
/// ```rust,ignore
/// let publisher = EventPublisher::builder()
///     .worker_name("audit-events")
///     .registration_policy(RegistrationPolicy::Atomic)
///     .build()?;
/// ```
#[derive(Default)]
pub struct PublisherBuilder {
    config: PublisherConfig,
    executor: Option<Arc<dyn Executor>>,
}

impl PublisherBuilder {
    /// Create a builder with the default configuration.
    pub fn new() -> Self {
        Self::default()
    }

    /// Deliver on the publishing thread. Overrides any executor.
    pub fn synchronous(mut self) -> Self {
        self.config.synchronous = true;
        self.executor = None;
        self
    }

    /// Deliver on `executor` instead of a dedicated worker thread.
    pub fn executor(mut self, executor: impl Executor + 'static) -> Self {
        self.config.synchronous = false;
        self.executor = Some(Arc::new(executor));
        self
    }

    /// Name the default worker thread.
    pub fn worker_name(mut self, name: impl Into<String>) -> Self {
        self.config.worker_name = name.into();
        self
    }

    /// Set the registration policy.
    pub fn registration_policy(mut self, policy: RegistrationPolicy) -> Self {
        self.config.registration_policy = policy;
        self
    }

    /// Build the publisher, starting the default worker if one is needed.
    pub fn build(self) -> Result<EventPublisher, HeraldError> {
        let Self { config, executor } = self;
        let mode = match (config.synchronous, executor) {
            (true, _) => DispatchMode::Sync,
            (false, Some(executor)) => DispatchMode::Async(executor),
            (false, None) => {
                DispatchMode::Async(Arc::new(SingleThreadExecutor::named(config.worker_name)?))
            }
        };

        Ok(EventPublisher {
            registry: Registry::with_policy(config.registration_policy),
            mode,
        })
    }
}

impl From<PublisherConfig> for PublisherBuilder {
    fn from(config: PublisherConfig) -> Self {
        Self {
            config,
            executor: None,
        }
    }
}

/// Publishes events to the handlers of registered listeners.
///
/// Every event reaches exactly the handlers declared for its own type. A
/// handler that fails is logged and counted in the [`DeliveryReport`]; it
/// never affects the publisher's caller or the remaining handlers.
///
/// # Example
///
/// ```rust,ignore
/// let mut publisher = EventPublisher::new()?;
/// publisher.register(Mailer::default())?;
///
/// let report = publisher.publish(OrderPlaced { id: 7 })?.await?;
/// assert_eq!(report.delivered, 1);
/// ```
pub struct EventPublisher {
    registry: Registry,
    mode: DispatchMode,
}

impl EventPublisher {
    /// Asynchronous publisher with one dedicated worker thread.
    pub fn new() -> Result<Self, HeraldError> {
        Self::from_config(PublisherConfig::default())
    }

    /// Publisher that delivers on the publishing thread.
    pub fn synchronous() -> Self {
        Self {
            registry: Registry::new(),
            mode: DispatchMode::Sync,
        }
    }

    /// Asynchronous publisher delivering on `executor`.
    pub fn with_executor(executor: impl Executor + 'static) -> Self {
        Self {
            registry: Registry::new(),
            mode: DispatchMode::Async(Arc::new(executor)),
        }
    }

    /// Publisher described by `config`.
    pub fn from_config(config: PublisherConfig) -> Result<Self, HeraldError> {
        PublisherBuilder::from(config).build()
    }

    /// Start building a publisher.
    pub fn builder() -> PublisherBuilder {
        PublisherBuilder::new()
    }

    /// Register the handlers of `listener`.
    ///
    /// Returns the number of handlers bound.
    pub fn register<L: Listener>(&mut self, listener: L) -> Result<usize, RegistrationError> {
        self.register_shared(Arc::new(listener))
    }

    /// Register the handlers of a shared listener instance.
    ///
    /// Registering the same instance twice binds its handlers twice.
    pub fn register_shared<L: Listener>(
        &mut self,
        listener: Arc<L>,
    ) -> Result<usize, RegistrationError> {
        self.registry.register(listener)
    }

    /// Publish `event` to the handlers declared for its type.
    pub fn publish<E: Event>(&self, event: E) -> Result<Delivery, PublishError> {
        self.dispatch(Arc::new(event))
    }

    /// Publish an already shared, type-erased event.
    ///
    /// Fails with [`PublishError::MissingEvent`] when `event` is `None`.
    pub fn publish_shared(&self, event: Option<Arc<dyn Event>>) -> Result<Delivery, PublishError> {
        let event = event.ok_or(PublishError::MissingEvent)?;
        self.dispatch(event)
    }

    fn dispatch(&self, event: Arc<dyn Event>) -> Result<Delivery, PublishError> {
        let subscribers = self.registry.subscribers(event.kind());
        if subscribers.is_empty() {
            debug!(event = event.event_name(), "no subscribers");
            return Ok(Delivery::ready(DeliveryReport::empty(event.event_name())));
        }

        let dispatch = Dispatch::new(event, subscribers.to_vec());
        match &self.mode {
            DispatchMode::Sync => Ok(Delivery::ready(dispatch.run())),
            DispatchMode::Async(executor) => Ok(dispatch.spawn(&**executor)?),
        }
    }

    /// Number of handlers bound to `E`.
    pub fn subscriber_count<E: Event>(&self) -> usize {
        self.registry.subscriber_count::<E>()
    }

    /// Returns `true` if no handler is registered.
    pub fn is_empty(&self) -> bool {
        self.registry.is_empty()
    }

    /// The underlying registry.
    pub fn registry(&self) -> &Registry {
        &self.registry
    }

    /// The dispatch mode.
    pub fn mode(&self) -> &DispatchMode {
        &self.mode
    }
}

impl fmt::Debug for EventPublisher {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("EventPublisher")
            .field("registry", &self.registry)
            .field("mode", &self.mode)
            .finish()
    }
}
