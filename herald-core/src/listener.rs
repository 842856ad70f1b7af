//! # Listeners and handler descriptors
//!
//! A listener is any object that offers handler methods. The publisher never
//! inspects listener types directly; instead a listener describes each of its
//! marked methods with a [`HandlerMethod`]: the method's [`HandlerSignature`]
//! (what it looks like) plus an invoker (how to call it).
//!
//! Descriptors are normally produced by the `#[listener]` attribute, which
//! records every method marked with `#[subscribe]` exactly as it was written.
//! Whether the shape is acceptable is decided later, when the listener is
//! registered.
//!
//! Hand-written listeners use [`HandlerMethod::subscribe`], which can only
//! describe well-formed handlers.

use crate::{
    error::HandlerError,
    event::{Event, EventKind},
};
use std::{fmt, sync::Arc};

/// Visibility of a marked method.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Visibility {
    /// `pub`
    Public,
    /// `pub(crate)`, `pub(super)`, `pub(in path)`
    Restricted,
    /// No visibility modifier.
    Private,
}

/// How a marked method takes its receiver.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Receiver {
    /// `&self`
    Shared,
    /// `&mut self`
    Exclusive,
    /// `self`, `self: Box<Self>` and other typed receivers.
    Owned,
    /// An associated function without a receiver.
    None,
}

/// What a marked method returns.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Returns {
    /// No return type, or `()`.
    Unit,
    /// Any other return type, spelled as written.
    Value(&'static str),
    /// An `async fn`.
    Future,
}

/// A non-receiver parameter of a marked method.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Param {
    /// The parameter type, spelled as written.
    pub ty: &'static str,
    /// Whether the parameter is a shared reference `&T`.
    pub by_ref: bool,
    /// Whether `T` names one concrete type, as opposed to a trait object,
    /// `impl Trait` or a generic parameter of the method.
    pub concrete: bool,
    /// The kind of `T` when it implements [`Event`].
    pub event: Option<EventKind>,
}

impl Param {
    /// A `&E` parameter for a concrete event type.
    pub fn event<E: Event>() -> Self {
        Self {
            ty: std::any::type_name::<E>(),
            by_ref: true,
            concrete: true,
            event: Some(EventKind::of::<E>()),
        }
    }
}

/// The observable shape of a marked method.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct HandlerSignature {
    /// Method name.
    pub name: &'static str,
    /// Declared visibility.
    pub visibility: Visibility,
    /// Receiver form.
    pub receiver: Receiver,
    /// Return shape.
    pub returns: Returns,
    /// Parameters after the receiver, in declaration order.
    pub params: Vec<Param>,
}

impl HandlerSignature {
    /// Signature of `pub fn name(&self, event: &E)`.
    pub fn of<E: Event>(name: &'static str) -> Self {
        Self {
            name,
            visibility: Visibility::Public,
            receiver: Receiver::Shared,
            returns: Returns::Unit,
            params: vec![Param::event::<E>()],
        }
    }
}

/// Type-erased call into a handler method of `L`.
pub type Invoke<L> = Arc<dyn Fn(&L, &dyn Event) -> Result<(), HandlerError> + Send + Sync>;

/// A marked method of listener type `L`.
pub struct HandlerMethod<L> {
    signature: HandlerSignature,
    invoke: Option<Invoke<L>>,
}

impl<L> HandlerMethod<L> {
    /// Describe a method by its signature and, when it can be called, an
    /// invoker.
    pub fn new(signature: HandlerSignature, invoke: Option<Invoke<L>>) -> Self {
        Self { signature, invoke }
    }

    /// The method's shape.
    pub fn signature(&self) -> &HandlerSignature {
        &self.signature
    }

    /// The method's invoker, if the descriptor carries one.
    pub fn invoker(&self) -> Option<&Invoke<L>> {
        self.invoke.as_ref()
    }
}

impl<L: 'static> HandlerMethod<L> {
    /// A well-formed handler for events of type `E`.
    ///
    /// # Example
    ///
    /// ```rust,ignore
    /// impl Listener for Audit {
    ///     fn handler_methods() -> Vec<HandlerMethod<Self>> {
    ///         vec![HandlerMethod::subscribe("on_login", Audit::on_login)]
    ///     }
    /// }
    /// ```
    pub fn subscribe<E, F>(name: &'static str, handler: F) -> Self
    where
        E: Event,
        F: Fn(&L, &E) + Send + Sync + 'static,
    {
        let invoke: Invoke<L> = Arc::new(move |listener: &L, event: &dyn Event| {
            match event.downcast_ref::<E>() {
                Some(event) => {
                    handler(listener, event);
                    Ok(())
                }
                None => Err(HandlerError::mismatch::<E>(event)),
            }
        });
        Self::new(HandlerSignature::of::<E>(name), Some(invoke))
    }
}

impl<L> Clone for HandlerMethod<L> {
    fn clone(&self) -> Self {
        Self {
            signature: self.signature.clone(),
            invoke: self.invoke.clone(),
        }
    }
}

impl<L> fmt::Debug for HandlerMethod<L> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("HandlerMethod")
            .field("signature", &self.signature)
            .field("invocable", &self.invoke.is_some())
            .finish()
    }
}

/// An object offering handler methods.
///
/// Usually implemented by `#[listener]` on an inherent `impl` block.
///
/// # Example
///
/// ```rust,ignore
/// struct Greeter;
///
/// #[listener]
/// impl Greeter {
///     #[subscribe]
///     pub fn on_join(&self, event: &UserJoined) {
///         println!("welcome, {}", event.name);
///     }
/// }
/// ```
#[diagnostic::on_unimplemented(
    message = "`{Self}` is not a `Listener`",
    label = "missing `Listener` implementation",
    note = "Annotate an `impl {Self}` block with `#[listener]` and mark handlers with `#[subscribe]`."
)]
pub trait Listener: Send + Sync + 'static {
    /// The marked methods of this listener, in declaration order.
    fn handler_methods() -> Vec<HandlerMethod<Self>>
    where
        Self: Sized;

    /// Name used in diagnostics.
    fn listener_name() -> &'static str
    where
        Self: Sized,
    {
        std::any::type_name::<Self>()
    }
}

/// Support code for `herald-macros`. Not public API.
#[doc(hidden)]
pub mod __private {
    use super::{HandlerMethod, Invoke};
    use crate::event::{Event, EventKind};
    use std::marker::PhantomData;

    /// Carries a listener type and a parameter type so the event capability
    /// of the parameter can be decided by method resolution.
    ///
    /// `(&&HandlerProbe::<L, T>::new()).event_kind()` resolves to [`ViaEvent`]
    /// when `T: Event` and to [`ViaAny`] otherwise.
    pub struct HandlerProbe<L, T: ?Sized>(PhantomData<(fn() -> L, fn() -> *const T)>);

    impl<L, T: ?Sized> HandlerProbe<L, T> {
        pub const fn new() -> Self {
            Self(PhantomData)
        }
    }

    impl<L, T: ?Sized> Default for HandlerProbe<L, T> {
        fn default() -> Self {
            Self::new()
        }
    }

    pub trait ViaEvent {
        type Listener;
        type Param: ?Sized;

        fn event_kind(&self) -> Option<EventKind>;

        fn invoker<F>(&self, handler: F) -> Option<Invoke<Self::Listener>>
        where
            F: Fn(&Self::Listener, &Self::Param) + Send + Sync + 'static;
    }

    impl<L: 'static, T: Event> ViaEvent for &HandlerProbe<L, T> {
        type Listener = L;
        type Param = T;

        fn event_kind(&self) -> Option<EventKind> {
            Some(EventKind::of::<T>())
        }

        fn invoker<F>(&self, handler: F) -> Option<Invoke<L>>
        where
            F: Fn(&L, &T) + Send + Sync + 'static,
        {
            HandlerMethod::subscribe("", handler).invoke
        }
    }

    pub trait ViaAny {
        type Listener;
        type Param: ?Sized;

        fn event_kind(&self) -> Option<EventKind>;

        fn invoker<F>(&self, handler: F) -> Option<Invoke<Self::Listener>>
        where
            F: Fn(&Self::Listener, &Self::Param) + Send + Sync + 'static;
    }

    impl<L, T: ?Sized> ViaAny for HandlerProbe<L, T> {
        type Listener = L;
        type Param = T;

        fn event_kind(&self) -> Option<EventKind> {
            None
        }

        fn invoker<F>(&self, _handler: F) -> Option<Invoke<L>>
        where
            F: Fn(&L, &T) + Send + Sync + 'static,
        {
            None
        }
    }
}

#[cfg(test)]
mod tests {
    use super::__private::{HandlerProbe, ViaAny, ViaEvent};
    use super::*;
    use std::sync::atomic::{AtomicUsize, Ordering};

    struct Tick;
    impl Event for Tick {}

    struct Tock;
    impl Event for Tock {}

    struct NotAnEvent;

    #[derive(Default)]
    struct Clock {
        ticks: AtomicUsize,
    }

    impl Clock {
        fn on_tick(&self, _event: &Tick) {
            self.ticks.fetch_add(1, Ordering::SeqCst);
        }
    }

    #[test]
    fn probe_detects_event_capability() {
        assert_eq!(
            (&&HandlerProbe::<Clock, Tick>::new()).event_kind(),
            Some(EventKind::of::<Tick>())
        );
        assert_eq!((&&HandlerProbe::<Clock, NotAnEvent>::new()).event_kind(), None);
        assert_eq!((&&HandlerProbe::<Clock, dyn Event>::new()).event_kind(), None);
        assert_eq!((&&HandlerProbe::<Clock, str>::new()).event_kind(), None);
    }

    #[test]
    fn probe_only_builds_invokers_for_events() {
        let invoke = (&&HandlerProbe::<Clock, Tick>::new())
            .invoker(|clock: &Clock, event: &Tick| clock.on_tick(event));
        assert!(invoke.is_some());

        let invoke = (&&HandlerProbe::<Clock, NotAnEvent>::new())
            .invoker(|_: &Clock, _: &NotAnEvent| {});
        assert!(invoke.is_none());
    }

    #[test]
    fn subscribe_builds_well_formed_descriptor() {
        let method = HandlerMethod::subscribe("on_tick", Clock::on_tick);
        let signature = method.signature();

        assert_eq!(signature.name, "on_tick");
        assert_eq!(signature.visibility, Visibility::Public);
        assert_eq!(signature.receiver, Receiver::Shared);
        assert_eq!(signature.returns, Returns::Unit);
        assert_eq!(signature.params.len(), 1);
        assert_eq!(signature.params[0].event, Some(EventKind::of::<Tick>()));
        assert!(method.invoker().is_some());
    }

    #[test]
    fn invoker_calls_through_and_rejects_other_events() {
        let clock = Clock::default();
        let method = HandlerMethod::subscribe("on_tick", Clock::on_tick);
        let invoke = method.invoker().unwrap();

        invoke(&clock, &Tick).unwrap();
        assert_eq!(clock.ticks.load(Ordering::SeqCst), 1);

        let err = invoke(&clock, &Tock).unwrap_err();
        assert!(matches!(err, HandlerError::EventMismatch { .. }));
        assert_eq!(clock.ticks.load(Ordering::SeqCst), 1);
    }
}
