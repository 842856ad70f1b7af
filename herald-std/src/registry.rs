//! Exact-type registry of subscribers.
//!
//! Registration turns the [`HandlerMethod`] descriptors of a listener into
//! [`Subscriber`]s, after checking that every method has the shape of a
//! handler. Subscribers are keyed by the [`EventKind`] of their parameter and
//! kept in registration order.

use herald_core::{
    Event, EventKind, HandlerError, HandlerMethod, HandlerSignature, Invoke, Listener, Receiver,
    RegistrationError, Returns, ShapeViolation, Visibility,
};
use std::{
    any::Any,
    collections::HashMap,
    fmt,
    panic::{self, AssertUnwindSafe},
    sync::Arc,
};
use tracing::{info, warn};

/// What happens to the valid methods of a listener when another of its
/// methods is rejected.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum RegistrationPolicy {
    /// Methods are bound as they are validated; methods before the rejected
    /// one stay bound.
    #[default]
    Incremental,
    /// Every method is validated first; nothing is bound if any is rejected.
    Atomic,
}

/// A listener method bound to one event type.
pub struct Subscriber {
    listener: &'static str,
    method: &'static str,
    kind: EventKind,
    call: Box<dyn Fn(&dyn Event) -> Result<(), HandlerError> + Send + Sync>,
}

impl Subscriber {
    /// Bind `invoke` to a listener instance.
    pub fn bind<L: Listener>(
        listener: Arc<L>,
        method: &'static str,
        kind: EventKind,
        invoke: Invoke<L>,
    ) -> Self {
        Self {
            listener: L::listener_name(),
            method,
            kind,
            call: Box::new(move |event: &dyn Event| invoke(&*listener, event)),
        }
    }

    /// Listener type name.
    pub fn listener(&self) -> &'static str {
        self.listener
    }

    /// Method name.
    pub fn method(&self) -> &'static str {
        self.method
    }

    /// The event kind this subscriber is bound to.
    pub fn kind(&self) -> EventKind {
        self.kind
    }

    /// Call the handler. Panics inside the handler are caught and returned
    /// as [`HandlerError::Panicked`].
    pub fn invoke(&self, event: &dyn Event) -> Result<(), HandlerError> {
        match panic::catch_unwind(AssertUnwindSafe(|| (self.call)(event))) {
            Ok(result) => result,
            Err(payload) => Err(HandlerError::Panicked(panic_message(&*payload))),
        }
    }
}

impl fmt::Debug for Subscriber {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Subscriber")
            .field("listener", &self.listener)
            .field("method", &self.method)
            .field("kind", &self.kind)
            .finish()
    }
}

fn panic_message(payload: &(dyn Any + Send)) -> String {
    if let Some(message) = payload.downcast_ref::<&'static str>() {
        (*message).to_owned()
    } else if let Some(message) = payload.downcast_ref::<String>() {
        message.clone()
    } else {
        "non-string panic payload".to_owned()
    }
}

/// Check that a marked method has the shape of a handler.
///
/// Returns the event kind the method handles. Rules are checked in order:
/// visibility, receiver, return type, parameter count, borrowing, concrete
/// parameter type, event capability.
pub fn validate(signature: &HandlerSignature) -> Result<EventKind, ShapeViolation> {
    if signature.visibility != Visibility::Public {
        return Err(ShapeViolation::NotPublic);
    }
    if signature.receiver != Receiver::Shared {
        return Err(ShapeViolation::Receiver);
    }
    match signature.returns {
        Returns::Unit => {}
        Returns::Value(ty) => return Err(ShapeViolation::ReturnsValue(ty)),
        Returns::Future => return Err(ShapeViolation::ReturnsFuture),
    }
    let [param] = signature.params.as_slice() else {
        return Err(ShapeViolation::ParameterCount(signature.params.len()));
    };
    if !param.by_ref {
        return Err(ShapeViolation::NotBorrowed(param.ty));
    }
    if !param.concrete {
        return Err(ShapeViolation::NotSealed(param.ty));
    }
    param.event.ok_or(ShapeViolation::NotAnEvent(param.ty))
}

/// Subscribers keyed by exact event kind.
///
/// Mutation requires `&mut self`, so registration cannot race with a
/// dispatch that borrows the registry.
#[derive(Default)]
pub struct Registry {
    subscribers: HashMap<EventKind, Vec<Arc<Subscriber>>>,
    policy: RegistrationPolicy,
}

impl Registry {
    /// Create an empty registry with the incremental policy.
    pub fn new() -> Self {
        Self::default()
    }

    /// Create an empty registry with the given policy.
    pub fn with_policy(policy: RegistrationPolicy) -> Self {
        Self {
            subscribers: HashMap::new(),
            policy,
        }
    }

    /// The registration policy.
    pub fn policy(&self) -> RegistrationPolicy {
        self.policy
    }

    /// Register every marked method of `listener`.
    ///
    /// Returns the number of subscribers bound. Registering the same instance
    /// again binds its methods again.
    pub fn register<L: Listener>(&mut self, listener: Arc<L>) -> Result<usize, RegistrationError> {
        let methods = L::handler_methods();
        match self.policy {
            RegistrationPolicy::Incremental => {
                let mut bound = 0;
                for method in &methods {
                    let subscriber = prepare(&listener, method)?;
                    self.insert(subscriber);
                    bound += 1;
                }
                Ok(bound)
            }
            RegistrationPolicy::Atomic => {
                let subscribers = methods
                    .iter()
                    .map(|method| prepare(&listener, method))
                    .collect::<Result<Vec<_>, _>>()?;
                let bound = subscribers.len();
                for subscriber in subscribers {
                    self.insert(subscriber);
                }
                Ok(bound)
            }
        }
    }

    fn insert(&mut self, subscriber: Subscriber) {
        info!(
            event = %subscriber.kind(),
            listener = subscriber.listener(),
            method = subscriber.method(),
            "registering subscriber"
        );
        self.subscribers
            .entry(subscriber.kind())
            .or_default()
            .push(Arc::new(subscriber));
    }

    /// Subscribers bound to exactly `kind`, in registration order.
    pub fn subscribers(&self, kind: EventKind) -> &[Arc<Subscriber>] {
        self.subscribers
            .get(&kind)
            .map(Vec::as_slice)
            .unwrap_or(&[])
    }

    /// Number of subscribers bound to `E`.
    pub fn subscriber_count<E: Event>(&self) -> usize {
        self.subscriber_count_of(EventKind::of::<E>())
    }

    /// Number of subscribers bound to exactly `kind`.
    pub fn subscriber_count_of(&self, kind: EventKind) -> usize {
        self.subscribers(kind).len()
    }

    /// Total number of subscribers.
    pub fn len(&self) -> usize {
        self.subscribers.values().map(Vec::len).sum()
    }

    /// Returns `true` if nothing is registered.
    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// Event kinds with at least one subscriber.
    pub fn event_kinds(&self) -> impl Iterator<Item = EventKind> + '_ {
        self.subscribers.keys().copied()
    }
}

impl fmt::Debug for Registry {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Registry")
            .field("kinds", &self.subscribers.len())
            .field("subscribers", &self.len())
            .field("policy", &self.policy)
            .finish()
    }
}

fn prepare<L: Listener>(
    listener: &Arc<L>,
    method: &HandlerMethod<L>,
) -> Result<Subscriber, RegistrationError> {
    let signature = method.signature();
    let kind = validate(signature).map_err(|violation| rejected::<L>(signature, violation))?;
    let invoke = method
        .invoker()
        .ok_or_else(|| rejected::<L>(signature, ShapeViolation::MissingInvoker))?;
    Ok(Subscriber::bind(
        Arc::clone(listener),
        signature.name,
        kind,
        Arc::clone(invoke),
    ))
}

fn rejected<L: Listener>(
    signature: &HandlerSignature,
    violation: ShapeViolation,
) -> RegistrationError {
    warn!(
        listener = L::listener_name(),
        method = signature.name,
        %violation,
        "rejecting handler"
    );
    RegistrationError::InvalidHandlerShape {
        listener: L::listener_name(),
        method: signature.name,
        violation,
    }
}
