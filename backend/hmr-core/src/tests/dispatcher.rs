use crate::client::{DispatchOutcome, SubscriptionRegistry, dispatch};
use crate::error::UpdateError;
use crate::tests::support::{
    RecordingTransport, ReloadCounter, chunk, failing_callback, recording_callback,
};

use models::ServerMessage;

use std::cell::RefCell;
use std::rc::Rc;

fn restart(path: &str) -> ServerMessage {
    ServerMessage::Restart {
        chunk_path: chunk(path),
    }
}

fn registry() -> RefCell<SubscriptionRegistry> {
    RefCell::new(SubscriptionRegistry::new(Rc::new(
        RecordingTransport::default(),
    )))
}

/// **VALUE**: Verifies fan-out: every callback for the chunk runs once, in registration order.
///
/// **WHY THIS MATTERS**: Several components can watch the same chunk. Skipping or reordering
/// one of them leaves the page partially updated.
///
/// **BUG THIS CATCHES**: Would catch early returns after the first callback or a reordered
/// callback list.
#[test]
fn given_two_callbacks_when_dispatching_then_invokes_both_in_order() {
    // GIVEN: c1 then c2 registered for "a"
    let registry = registry();
    let log = Rc::new(RefCell::new(Vec::new()));
    registry
        .borrow_mut()
        .register(chunk("a"), recording_callback(&log, "c1"));
    registry
        .borrow_mut()
        .register(chunk("a"), recording_callback(&log, "c2"));
    let reloader = ReloadCounter::default();

    // WHEN: Dispatching an update for "a"
    let outcome = dispatch(&registry, &restart("a"), &reloader);

    // THEN: c1 then c2, once each, no reload
    assert_eq!(outcome, DispatchOutcome::Applied { callbacks: 2 });
    assert_eq!(*log.borrow(), vec!["c1", "c2"]);
    assert_eq!(reloader.count.get(), 0);
}

#[test]
fn given_no_callbacks_when_dispatching_then_silently_ignores_update() {
    let registry = registry();
    let reloader = ReloadCounter::default();

    let outcome = dispatch(&registry, &restart("nobody.css"), &reloader);

    assert_eq!(outcome, DispatchOutcome::NoSubscribers);
    assert_eq!(reloader.count.get(), 0);
}

/// **VALUE**: Verifies the failure path: the failing callback triggers exactly one reload and
/// the callbacks after it are skipped.
///
/// **WHY THIS MATTERS**: After a failed incremental update the page state is unknown. Running
/// more callbacks against it can only make things worse; a full reload is the only safe
/// recovery.
///
/// **BUG THIS CATCHES**: Would catch best-effort continuation past a failing callback, or a
/// missing reload.
#[test]
fn given_first_callback_fails_when_dispatching_then_reloads_and_skips_rest() {
    // GIVEN: c1 (fails) then c2 registered for "a"
    let registry = registry();
    let log = Rc::new(RefCell::new(Vec::new()));
    registry
        .borrow_mut()
        .register(chunk("a"), failing_callback(&log, "c1"));
    registry
        .borrow_mut()
        .register(chunk("a"), recording_callback(&log, "c2"));
    let reloader = ReloadCounter::default();

    // WHEN: Dispatching
    let outcome = dispatch(&registry, &restart("a"), &reloader);

    // THEN: c1 ran, c2 did not, one reload
    assert_eq!(
        outcome,
        DispatchOutcome::Reloaded {
            chunk_path: chunk("a")
        }
    );
    assert_eq!(*log.borrow(), vec!["c1"]);
    assert_eq!(reloader.count.get(), 1);
}

#[test]
fn given_failure_on_other_chunk_when_dispatching_then_unaffected_chunk_applies() {
    let registry = registry();
    let log = Rc::new(RefCell::new(Vec::new()));
    registry
        .borrow_mut()
        .register(chunk("bad"), failing_callback(&log, "bad"));
    registry
        .borrow_mut()
        .register(chunk("good"), recording_callback(&log, "good"));
    let reloader = ReloadCounter::default();

    let outcome = dispatch(&registry, &restart("good"), &reloader);

    assert_eq!(outcome, DispatchOutcome::Applied { callbacks: 1 });
    assert_eq!(*log.borrow(), vec!["good"]);
    assert_eq!(reloader.count.get(), 0);
}

/// **VALUE**: Verifies that a callback may register new callbacks while it is being dispatched.
///
/// **BUG THIS CATCHES**: Would catch dispatch holding the registry borrow across callback
/// invocation, which panics with `BorrowMutError`.
#[test]
fn given_callback_that_registers_when_dispatching_then_does_not_panic() {
    // GIVEN: A callback that registers another callback for a new chunk
    let registry = Rc::new(registry());
    let log = Rc::new(RefCell::new(Vec::new()));
    let inner_registry = Rc::clone(&registry);
    let inner_log = Rc::clone(&log);
    registry.borrow_mut().register(
        chunk("lazy.js"),
        Rc::new(move |_update: &ServerMessage| {
            inner_registry
                .borrow_mut()
                .register(chunk("split.js"), recording_callback(&inner_log, "split"));
            Ok(())
        }),
    );

    // WHEN: Dispatching the outer update
    let outcome = dispatch(&registry, &restart("lazy.js"), &ReloadCounter::default());

    // THEN: Dispatch completes and the new chunk is registered, but not invoked yet
    assert_eq!(outcome, DispatchOutcome::Applied { callbacks: 1 });
    assert_eq!(registry.borrow().callback_count("split.js"), 1);
    assert!(log.borrow().is_empty());
}

/// **VALUE**: Verifies that a panicking callback is treated like a failing one.
///
/// **WHY THIS MATTERS**: Application callbacks are foreign code. A panic in one of them must
/// end in the same full reload as an error, not unwind out of the event handler and take
/// the connection loop down with it.
///
/// **BUG THIS CATCHES**: Would catch callbacks being invoked without a panic guard.
#[test]
fn given_callback_panics_when_dispatching_then_reloads_and_skips_rest() {
    // GIVEN: A panicking callback followed by a healthy one
    let registry = registry();
    let log = Rc::new(RefCell::new(Vec::new()));
    registry.borrow_mut().register(
        chunk("a.js"),
        Rc::new(|_update: &ServerMessage| -> Result<(), UpdateError> {
            panic!("module factory missing")
        }),
    );
    registry
        .borrow_mut()
        .register(chunk("a.js"), recording_callback(&log, "second"));
    let reloader = ReloadCounter::default();

    // WHEN: Dispatching an update for the chunk
    let outcome = dispatch(&registry, &restart("a.js"), &reloader);

    // THEN: One reload, the second callback never ran, and the registry is still usable
    assert_eq!(
        outcome,
        DispatchOutcome::Reloaded {
            chunk_path: chunk("a.js")
        }
    );
    assert_eq!(reloader.count.get(), 1);
    assert!(log.borrow().is_empty());
    assert_eq!(registry.borrow().callback_count("a.js"), 2);
}
