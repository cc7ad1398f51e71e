use crate::helpers::{
    ASSET_PREFIX, CountingReloader, RecordingTransport, TestDocument, partial, restart,
};

use hmr_core::transport::TransportEvent;
use hmr_core::{ClientOptions, DispatchOutcome, EventOutcome, HmrClient, RegistrationSlot};

use models::{ChunkPath, ServerMessage};

use std::cell::RefCell;
use std::rc::Rc;

/// **VALUE**: Walks a page through a dev session: initial CSS subscriptions, a server restart
/// (disconnect + reconnect), then a stylesheet edit.
///
/// **WHY THIS MATTERS**: This is the everyday loop the client exists for. Each step depends
/// on the previous one leaving the registry in the right state.
///
/// **BUG THIS CATCHES**: Would catch regressions in any of: the CSS scan, replay after
/// reconnect, or restart handling for stylesheets.
#[test]
fn given_page_with_css_chunks_when_server_restarts_and_css_changes_then_link_is_refetched() {
    // GIVEN: A page with two chunk stylesheets and one third-party stylesheet
    let document = TestDocument::with_stylesheets(&[
        "/_next/static/css/app.css",
        "/_next/static/css/layout.css",
        "https://fonts.example.com/inter.css",
    ]);
    let transport = Rc::new(RecordingTransport::default());
    let reloader = Rc::new(CountingReloader::default());
    let client = HmrClient::connect_with_slot(
        &RegistrationSlot::new(),
        &ClientOptions::new(ASSET_PREFIX),
        transport.clone(),
        &document,
        reloader.clone(),
    )
    .expect("Client should connect");

    // THEN: Only the chunk stylesheets were subscribed
    assert_eq!(
        transport.take_subscriptions(),
        vec!["static/css/app.css", "static/css/layout.css"]
    );

    // WHEN: The socket comes (back) up
    let outcome = client.handle_event(TransportEvent::Connected).unwrap();

    // THEN: Both subscriptions are replayed
    assert_eq!(outcome, EventOutcome::Resubscribed { chunks: 2 });
    assert_eq!(
        transport.take_subscriptions(),
        vec!["static/css/app.css", "static/css/layout.css"]
    );

    // WHEN: layout.css is rebuilt
    let outcome = client
        .handle_event(restart("static/css/layout.css"))
        .unwrap();

    // THEN: Only that link was refetched and the page stays put
    assert_eq!(
        outcome,
        EventOutcome::Dispatched(DispatchOutcome::Applied { callbacks: 1 })
    );
    assert_eq!(document.link(0).generation(), 0);
    assert_eq!(document.link(1).generation(), 1);
    assert_eq!(reloader.reloads(), 0);
}

#[test]
fn given_css_chunk_when_partial_update_arrives_then_page_reloads() {
    let document = TestDocument::with_stylesheets(&["/_next/app.css"]);
    let reloader = Rc::new(CountingReloader::default());
    let client = HmrClient::connect_with_slot(
        &RegistrationSlot::new(),
        &ClientOptions::new(ASSET_PREFIX),
        Rc::new(RecordingTransport::default()),
        &document,
        reloader.clone(),
    )
    .unwrap();

    client.handle_event(partial("app.css")).unwrap();

    assert_eq!(reloader.reloads(), 1);
    assert_eq!(document.link(0).generation(), 0);
}

/// **VALUE**: Verifies that application callbacks receive the update record, including the
/// partial-update instruction, untouched.
///
/// **BUG THIS CATCHES**: Would catch the client rewriting or dropping the opaque instruction
/// payload before handing it to callbacks.
#[test]
fn given_app_callback_when_partial_update_arrives_then_receives_instruction() {
    // GIVEN: An application callback for a JS chunk
    let client = HmrClient::connect_with_slot(
        &RegistrationSlot::new(),
        &ClientOptions::default(),
        Rc::new(RecordingTransport::default()),
        &TestDocument::with_stylesheets(&[]),
        Rc::new(CountingReloader::default()),
    )
    .unwrap();
    let received = Rc::new(RefCell::new(Vec::new()));
    let sink = Rc::clone(&received);
    client.on_chunk_update(
        ChunkPath::new("static/chunks/page.js").unwrap(),
        Rc::new(move |update: &ServerMessage| {
            sink.borrow_mut().push(update.clone());
            Ok(())
        }),
    );

    // WHEN: A partial update arrives
    client
        .handle_event(TransportEvent::Message(
            r#"{"type":"partial","chunkPath":"static/chunks/page.js","instruction":{"modules":[1,2]}}"#
                .to_string(),
        ))
        .unwrap();

    // THEN: The callback saw the full record
    let received = received.borrow();
    assert_eq!(received.len(), 1);
    match &received[0] {
        ServerMessage::Partial { instruction, .. } => {
            assert_eq!(instruction["modules"], serde_json::json!([1, 2]));
        }
        other => panic!("Expected partial update, got {other:?}"),
    }
}

#[test]
fn given_update_for_unknown_chunk_when_handled_then_nothing_happens() {
    let reloader = Rc::new(CountingReloader::default());
    let client = HmrClient::connect_with_slot(
        &RegistrationSlot::new(),
        &ClientOptions::default(),
        Rc::new(RecordingTransport::default()),
        &TestDocument::with_stylesheets(&[]),
        reloader.clone(),
    )
    .unwrap();

    let outcome = client.handle_event(restart("ghost.js")).unwrap();

    assert_eq!(
        outcome,
        EventOutcome::Dispatched(DispatchOutcome::NoSubscribers)
    );
    assert_eq!(reloader.reloads(), 0);
}
