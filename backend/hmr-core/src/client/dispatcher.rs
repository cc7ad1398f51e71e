use crate::client::registry::{ChunkUpdateCallback, SubscriptionRegistry};
use crate::error::update::UpdateError;
use crate::page::PageReloader;

use common::ErrorLocation;
use models::{ChunkPath, ServerMessage};

use std::any::Any;
use std::cell::RefCell;
use std::panic::{AssertUnwindSafe, Location, catch_unwind};

use log::{error, trace};

/// What happened to one inbound update.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum DispatchOutcome {
    /// Nobody registered for the chunk; the update was dropped.
    NoSubscribers,

    /// Every callback for the chunk ran successfully.
    Applied { callbacks: usize },

    /// A callback failed and a full page reload was requested.
    Reloaded { chunk_path: ChunkPath },
}

/// Run every callback registered for the update's chunk, in registration order.
///
/// The first failing callback stops dispatch for this update: the error is
/// logged with the chunk path and `reloader` is asked for a full page reload
/// right away. Callbacks after the failing one are not invoked. A callback
/// that panics counts as failing.
pub fn dispatch(
    registry: &RefCell<SubscriptionRegistry>,
    update: &ServerMessage,
    reloader: &dyn PageReloader,
) -> DispatchOutcome {
    let chunk_path = update.chunk_path();

    // Snapshot, so a callback may register more callbacks while it runs
    let callbacks = registry.borrow().callbacks_for(chunk_path.as_str());
    let Some(callbacks) = callbacks else {
        trace!(
            "Ignoring {} update for unsubscribed chunk `{chunk_path}`",
            update.kind()
        );
        return DispatchOutcome::NoSubscribers;
    };

    for callback in &callbacks {
        if let Err(e) = run_callback(callback, update) {
            error!("An error occurred during the update of chunk `{chunk_path}`: {e}");
            reloader.reload();
            return DispatchOutcome::Reloaded {
                chunk_path: chunk_path.clone(),
            };
        }
    }

    DispatchOutcome::Applied {
        callbacks: callbacks.len(),
    }
}

fn run_callback(callback: &ChunkUpdateCallback, update: &ServerMessage) -> Result<(), UpdateError> {
    catch_unwind(AssertUnwindSafe(|| callback(update))).unwrap_or_else(|payload| {
        Err(UpdateError::Callback {
            message: format!("callback panicked: {}", panic_message(payload.as_ref())),
            location: ErrorLocation::from(Location::caller()),
        })
    })
}

fn panic_message(payload: &(dyn Any + Send)) -> &str {
    if let Some(message) = payload.downcast_ref::<&str>() {
        *message
    } else if let Some(message) = payload.downcast_ref::<String>() {
        message.as_str()
    } else {
        "non-string panic payload"
    }
}
