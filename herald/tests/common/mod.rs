#![allow(dead_code)]

use herald::{
    Event, listener, subscribe,
    testing::{Counter, Flag},
};

// ============================================================================
// Test Event Types
// ============================================================================

#[derive(Clone, Debug, Default, Event)]
pub struct Toggled {
    pub flag: Flag,
}

#[derive(Clone, Debug, Default, Event)]
pub struct Counted {
    pub counter: Counter,
}

/// Carries a `Counted` without being one.
#[derive(Clone, Debug, Default, Event)]
pub struct Envelope {
    pub inner: Counted,
}

/// Not an event.
#[derive(Clone, Debug, Default)]
pub struct Plain {
    pub counter: Counter,
}

// ============================================================================
// Well-Formed Listeners
// ============================================================================

/// One handler per event type.
pub struct Toggler;

#[listener]
impl Toggler {
    #[subscribe]
    pub fn on_toggled(&self, event: &Toggled) {
        event.flag.set();
    }

    #[subscribe]
    pub fn on_counted(&self, event: &Counted) {
        event.counter.increment();
    }
}

/// Two handlers for the same event type.
pub struct DoubleCounter;

#[listener]
impl DoubleCounter {
    #[subscribe]
    pub fn first(&self, event: &Counted) {
        event.counter.increment();
    }

    #[subscribe]
    pub fn second(&self, event: &Counted) {
        event.counter.increment();
    }
}

/// Counts deliveries in its own state.
#[derive(Clone, Default)]
pub struct Tally {
    pub seen: Counter,
}

#[listener]
impl Tally {
    #[subscribe]
    pub fn on_counted(&self, _event: &Counted) {
        self.seen.increment();
    }
}

/// Always panics.
pub struct Exploding;

#[listener]
impl Exploding {
    #[subscribe]
    pub fn on_counted(&self, _event: &Counted) {
        panic!("handler exploded");
    }
}

/// Handles the wrapper type only.
pub struct EnvelopeOpener {
    pub opened: Counter,
}

#[listener]
impl EnvelopeOpener {
    #[subscribe]
    pub fn on_envelope(&self, event: &Envelope) {
        self.opened.increment();
        event.inner.counter.increment();
    }
}

// ============================================================================
// Listeners Without Handlers
// ============================================================================

/// Has a handler-shaped method that is not marked.
pub struct Unmarked;

#[listener]
impl Unmarked {
    pub fn on_counted(&self, event: &Counted) {
        event.counter.increment();
    }
}

/// Has no methods at all.
pub struct Empty;

#[listener]
impl Empty {}

/// Marks nothing and handles nothing.
pub struct Helper;

#[listener]
impl Helper {
    pub fn describe(&self) -> &'static str {
        "helper"
    }
}

// ============================================================================
// Malformed Listeners
// ============================================================================

pub struct PrivateHandler;

#[listener]
impl PrivateHandler {
    #[subscribe]
    fn on_counted(&self, event: &Counted) {
        event.counter.increment();
    }
}

pub struct ValueHandler;

#[listener]
impl ValueHandler {
    #[subscribe]
    pub fn on_counted(&self, event: &Counted) -> usize {
        event.counter.increment()
    }
}

pub struct TwoParams;

#[listener]
impl TwoParams {
    #[subscribe]
    pub fn on_counted(&self, event: &Counted, _twice: bool) {
        event.counter.increment();
    }
}

pub struct NoParams;

#[listener]
impl NoParams {
    #[subscribe]
    pub fn on_nothing(&self) {}
}

pub struct PlainParam;

#[listener]
impl PlainParam {
    #[subscribe]
    pub fn on_plain(&self, event: &Plain) {
        event.counter.increment();
    }
}

pub struct ByValue;

#[listener]
impl ByValue {
    #[subscribe]
    pub fn on_counted(&self, event: Counted) {
        event.counter.increment();
    }
}

pub struct OpenParam;

#[listener]
impl OpenParam {
    #[subscribe]
    pub fn on_any(&self, _event: &dyn Event) {}
}

pub struct GenericParam;

#[listener]
impl GenericParam {
    #[subscribe]
    pub fn on_any<E: Event>(&self, _event: &E) {}
}

pub struct AsyncHandler;

#[listener]
impl AsyncHandler {
    #[subscribe]
    pub async fn on_counted(&self, event: &Counted) {
        event.counter.increment();
    }
}

pub struct ExclusiveHandler;

#[listener]
impl ExclusiveHandler {
    #[subscribe]
    pub fn on_counted(&mut self, event: &Counted) {
        event.counter.increment();
    }
}

pub struct StaticHandler;

#[listener]
impl StaticHandler {
    #[subscribe]
    pub fn on_counted(event: &Counted) {
        event.counter.increment();
    }
}

/// A valid handler followed by an invalid one.
pub struct HalfValid;

#[listener]
impl HalfValid {
    #[subscribe]
    pub fn on_counted(&self, event: &Counted) {
        event.counter.increment();
    }

    #[subscribe]
    pub fn on_toggled(&self, event: &Toggled) -> bool {
        event.flag.set();
        true
    }
}
