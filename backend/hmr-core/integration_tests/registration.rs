use crate::helpers::{ASSET_PREFIX, CountingReloader, RecordingTransport, TestDocument, restart};

use hmr_core::{ClientOptions, CoreError, HmrClient, RegistrationSlot};

use models::{ChunkPath, ServerMessage};

use std::cell::RefCell;
use std::rc::Rc;

fn counter(count: &Rc<RefCell<usize>>) -> hmr_core::ChunkUpdateCallback {
    let count = Rc::clone(count);
    Rc::new(move |_update: &ServerMessage| {
        *count.borrow_mut() += 1;
        Ok(())
    })
}

/// **VALUE**: Verifies the page-wide slot end to end: a script registers before the client
/// loads, the client connects through [`HmrClient::connect`], and the early registration
/// receives updates exactly once.
///
/// **WHY THIS MATTERS**: Script load order on a page is not under the client's control.
/// Registrations that arrive early must neither be lost nor registered twice.
///
/// **BUG THIS CATCHES**: Would catch `connect` using a private slot instead of the global one,
/// or draining the queue twice.
#[test]
fn given_registration_before_connect_when_update_arrives_then_callback_runs_once() {
    // GIVEN: A registration pushed before any client exists
    let hits = Rc::new(RefCell::new(0));
    RegistrationSlot::global().push(ChunkPath::new("early.js").unwrap(), counter(&hits));

    // WHEN: The client connects and an update for that chunk arrives
    let transport = Rc::new(RecordingTransport::default());
    let client = HmrClient::connect(
        &ClientOptions::new(ASSET_PREFIX),
        transport.clone(),
        &TestDocument::with_stylesheets(&[]),
        Rc::new(CountingReloader::default()),
    )
    .expect("Client should connect");
    client.handle_event(restart("early.js")).unwrap();

    // THEN: Subscribed once, invoked once
    assert_eq!(transport.take_subscriptions(), vec!["early.js"]);
    assert_eq!(*hits.borrow(), 1);
    assert_eq!(client.callback_count("early.js"), 1);
}

#[test]
fn given_connected_client_when_pushing_through_slot_then_registers_immediately() {
    let slot = RegistrationSlot::new();
    let transport = Rc::new(RecordingTransport::default());
    let client = HmrClient::connect_with_slot(
        &slot,
        &ClientOptions::new(ASSET_PREFIX),
        transport.clone(),
        &TestDocument::with_stylesheets(&[]),
        Rc::new(CountingReloader::default()),
    )
    .unwrap();
    let hits = Rc::new(RefCell::new(0));

    slot.push(ChunkPath::new("late.js").unwrap(), counter(&hits));
    client.handle_event(restart("late.js")).unwrap();

    assert_eq!(transport.take_subscriptions(), vec!["late.js"]);
    assert_eq!(*hits.borrow(), 1);
    assert_eq!(client.subscribed_chunks(), vec![ChunkPath::new("late.js").unwrap()]);
}

/// **VALUE**: Verifies that a slot owned by a different hot-reload handler is a fatal conflict.
///
/// **WHY THIS MATTERS**: Two independent handlers operating on one page would corrupt
/// dispatch; failing loudly at startup is the only safe answer.
///
/// **BUG THIS CATCHES**: Would catch `connect` overwriting a foreign owner.
#[test]
fn given_foreign_handler_in_slot_when_connecting_then_fails_with_conflict() {
    // GIVEN: Another handler owns the slot
    let slot = RegistrationSlot::new();
    slot.occupy("legacy-hot-reloader").unwrap();

    // WHEN: Connecting
    let result = HmrClient::connect_with_slot(
        &slot,
        &ClientOptions::new(ASSET_PREFIX),
        Rc::new(RecordingTransport::default()),
        &TestDocument::with_stylesheets(&[]),
        Rc::new(CountingReloader::default()),
    );

    // THEN: Bridge conflict naming the other handler
    match result {
        Err(CoreError::Bridge(e)) => {
            assert!(e.to_string().contains("A separate HMR handler was already registered"));
        }
        Err(other) => panic!("Expected bridge conflict, got {other}"),
        Ok(_) => panic!("Expected bridge conflict, connected instead"),
    }
}

#[test]
fn given_client_dropped_when_reconnecting_with_same_slot_then_fresh_client_owns_it() {
    // A full reload drops the client; the next instance starts from scratch
    let slot = RegistrationSlot::new();
    let options = ClientOptions::new(ASSET_PREFIX);
    let first = HmrClient::connect_with_slot(
        &slot,
        &options,
        Rc::new(RecordingTransport::default()),
        &TestDocument::with_stylesheets(&["/_next/a.css"]),
        Rc::new(CountingReloader::default()),
    )
    .unwrap();
    drop(first);

    let second = HmrClient::connect_with_slot(
        &slot,
        &options,
        Rc::new(RecordingTransport::default()),
        &TestDocument::with_stylesheets(&["/_next/b.css"]),
        Rc::new(CountingReloader::default()),
    )
    .unwrap();

    assert_eq!(second.subscribed_chunks(), vec![ChunkPath::new("b.css").unwrap()]);
}
