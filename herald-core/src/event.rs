//! Event marker trait and exact-type identifiers.

use std::{
    any::{Any, TypeId},
    fmt,
    hash::{Hash, Hasher},
};

/// A marker trait for values that can be published.
///
/// Events must be `Send + Sync + 'static` so they can be shared with every
/// subscriber, including subscribers running on a dispatch worker.
///
/// # Example
///
/// ```rust,ignore
/// struct UserCreated { id: u64 }
///
/// impl Event for UserCreated {}
/// ```
#[diagnostic::on_unimplemented(
    message = "`{Self}` is not a valid Event",
    label = "must implement `Event`",
    note = "Derive it with `#[derive(Event)]` or write `impl Event for {Self} {}`."
)]
pub trait Event: Any + Send + Sync {
    /// Human readable name of the concrete event type.
    fn event_name(&self) -> &'static str {
        std::any::type_name::<Self>()
    }
}

impl dyn Event {
    /// The exact runtime kind of this event.
    pub fn kind(&self) -> EventKind {
        let any: &dyn Any = self;
        EventKind {
            id: any.type_id(),
            name: self.event_name(),
        }
    }

    /// Returns `true` if the concrete type of this event is `E`.
    pub fn is<E: Event>(&self) -> bool {
        let any: &dyn Any = self;
        any.is::<E>()
    }

    /// Borrows the event as its concrete type, if it is exactly `E`.
    pub fn downcast_ref<E: Event>(&self) -> Option<&E> {
        let any: &dyn Any = self;
        any.downcast_ref::<E>()
    }
}

/// Identifies the exact runtime type of an event.
///
/// Two kinds are equal only when they describe the same concrete type; there
/// is no notion of a super- or subtype. The name is carried for diagnostics
/// and does not take part in comparisons.
#[derive(Clone, Copy)]
pub struct EventKind {
    id: TypeId,
    name: &'static str,
}

impl EventKind {
    /// The kind of event type `E`.
    pub fn of<E: Event>() -> Self {
        Self {
            id: TypeId::of::<E>(),
            name: std::any::type_name::<E>(),
        }
    }

    /// The type name of this kind.
    pub fn name(&self) -> &'static str {
        self.name
    }

    /// The underlying [`TypeId`].
    pub fn type_id(&self) -> TypeId {
        self.id
    }
}

impl PartialEq for EventKind {
    fn eq(&self, other: &Self) -> bool {
        self.id == other.id
    }
}

impl Eq for EventKind {}

impl Hash for EventKind {
    fn hash<H: Hasher>(&self, state: &mut H) {
        self.id.hash(state);
    }
}

impl fmt::Debug for EventKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_tuple("EventKind").field(&self.name).finish()
    }
}

impl fmt::Display for EventKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::Arc;

    struct Ping;
    impl Event for Ping {}

    struct Pong;
    impl Event for Pong {}

    impl<E: Event> Event for Box<E> {}

    #[test]
    fn kind_is_exact() {
        assert_eq!(EventKind::of::<Ping>(), EventKind::of::<Ping>());
        assert_ne!(EventKind::of::<Ping>(), EventKind::of::<Pong>());
        assert_ne!(EventKind::of::<Ping>(), EventKind::of::<Box<Ping>>());
    }

    #[test]
    fn dyn_event_reports_concrete_kind() {
        let event: Arc<dyn Event> = Arc::new(Ping);
        assert_eq!(event.kind(), EventKind::of::<Ping>());
        assert!(event.is::<Ping>());
        assert!(!event.is::<Pong>());
        assert!(event.downcast_ref::<Ping>().is_some());
        assert!(event.downcast_ref::<Pong>().is_none());
    }

    #[test]
    fn name_comes_from_concrete_type() {
        let event: Box<dyn Event> = Box::new(Pong);
        assert!(event.event_name().ends_with("Pong"));
        assert_eq!(format!("{}", event.kind()), event.event_name());
    }
}
