use herald::{Event, EventPublisher, PublishError, testing::Counter};
use std::sync::Arc;

mod common;
use common::{
    Counted, DoubleCounter, Empty, Envelope, EnvelopeOpener, Exploding, Helper, Tally, Toggled,
    Toggler, Unmarked,
};

#[test]
fn test_each_event_reaches_its_own_handler() {
    let mut publisher = EventPublisher::synchronous();
    assert_eq!(publisher.register(Toggler).unwrap(), 2);

    let toggled = Toggled::default();
    let counted = Counted::default();
    publisher.publish(toggled.clone()).unwrap().wait().unwrap();
    publisher.publish(counted.clone()).unwrap().wait().unwrap();

    assert!(toggled.flag.is_set());
    assert_eq!(counted.counter.get(), 1);
}

#[test]
fn test_every_registration_is_delivered() {
    let mut publisher = EventPublisher::synchronous();
    publisher.register(Toggler).unwrap();
    publisher.register(Toggler).unwrap();

    let event = Counted::default();
    let report = publisher.publish(event.clone()).unwrap().wait().unwrap();

    assert_eq!(event.counter.get(), 2);
    assert_eq!(report.delivered, 2);
}

#[test]
fn test_same_instance_registered_twice() {
    let mut publisher = EventPublisher::synchronous();
    let tally = Arc::new(Tally::default());
    publisher.register_shared(tally.clone()).unwrap();
    publisher.register_shared(tally.clone()).unwrap();

    publisher.publish(Counted::default()).unwrap().wait().unwrap();

    assert_eq!(tally.seen.get(), 2);
}

#[test]
fn test_multiple_handlers_on_one_listener() {
    let mut publisher = EventPublisher::synchronous();
    publisher.register(DoubleCounter).unwrap();

    let event = Counted::default();
    publisher.publish(event.clone()).unwrap().wait().unwrap();

    assert_eq!(event.counter.get(), 2);
}

#[test]
fn test_no_listeners() {
    let publisher = EventPublisher::synchronous();

    let event = Counted::default();
    let report = publisher.publish(event.clone()).unwrap().wait().unwrap();

    assert_eq!(event.counter.get(), 0);
    assert_eq!(report.subscribers, 0);
    assert!(report.is_clean());
}

#[test]
fn test_listeners_without_handlers() {
    let mut publisher = EventPublisher::synchronous();
    assert_eq!(publisher.register(Unmarked).unwrap(), 0);
    assert_eq!(publisher.register(Empty).unwrap(), 0);
    assert_eq!(publisher.register(Helper).unwrap(), 0);
    assert!(publisher.is_empty());

    let event = Counted::default();
    publisher.publish(event.clone()).unwrap().wait().unwrap();

    assert_eq!(event.counter.get(), 0);
}

#[test]
fn test_panicking_handler_is_isolated() {
    let mut publisher = EventPublisher::synchronous();
    let first = Tally::default();
    let last = Tally::default();
    publisher.register(first.clone()).unwrap();
    publisher.register(Exploding).unwrap();
    publisher.register(last.clone()).unwrap();

    let report = publisher.publish(Counted::default()).unwrap().wait().unwrap();

    assert_eq!(first.seen.get(), 1);
    assert_eq!(last.seen.get(), 1);
    assert_eq!(report.subscribers, 3);
    assert_eq!(report.delivered, 2);
    assert_eq!(report.failed, 1);
}

#[test]
fn test_many_events() {
    let mut publisher = EventPublisher::synchronous();
    for _ in 0..3 {
        publisher.register(Toggler).unwrap();
    }

    let event = Counted::default();
    for _ in 0..1000 {
        publisher.publish(event.clone()).unwrap().wait().unwrap();
    }

    assert_eq!(event.counter.get(), 3000);
}

#[test]
fn test_routing_is_by_exact_type() {
    let mut publisher = EventPublisher::synchronous();
    let opener = EnvelopeOpener {
        opened: Counter::new(),
    };
    let opened = opener.opened.clone();
    publisher.register(opener).unwrap();
    publisher.register(Toggler).unwrap();

    let envelope = Envelope::default();
    publisher.publish(envelope.clone()).unwrap().wait().unwrap();

    // Only the envelope handler ran; the `Counted` handler did not see the
    // inner value.
    assert_eq!(opened.get(), 1);
    assert_eq!(envelope.inner.counter.get(), 1);

    publisher
        .publish(envelope.inner.clone())
        .unwrap()
        .wait()
        .unwrap();
    assert_eq!(opened.get(), 1);
    assert_eq!(envelope.inner.counter.get(), 2);
}

#[test]
fn test_shared_events_route_by_concrete_type() {
    let mut publisher = EventPublisher::synchronous();
    publisher.register(Toggler).unwrap();

    let event = Counted::default();
    let shared: Arc<dyn Event> = Arc::new(event.clone());
    let report = publisher.publish_shared(Some(shared)).unwrap().wait().unwrap();

    assert_eq!(event.counter.get(), 1);
    assert_eq!(report.event, std::any::type_name::<Counted>());
}

#[test]
fn test_missing_event() {
    let mut publisher = EventPublisher::synchronous();
    publisher.register(Toggler).unwrap();

    assert_eq!(
        publisher.publish_shared(None).unwrap_err(),
        PublishError::MissingEvent
    );
}
