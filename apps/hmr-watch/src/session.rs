//! Drives hot reload clients for the headless page.
//!
//! One [`HmrClient`] lives per page load. When an update forces a full
//! reload, the client is dropped, the page HTML is reloaded from disk and a
//! fresh client takes over the same transport.

use crate::error::WatchError;
use crate::page::PageSource;

use hmr_core::page::PageReloader;
use hmr_core::transport::{Transport, TransportEvent};
use hmr_core::{ClientOptions, HmrClient};

use std::cell::Cell;
use std::rc::Rc;

use log::{debug, error, info, warn};
use tokio::sync::mpsc::UnboundedReceiver;

/// Records that the current page asked to be reloaded.
#[derive(Debug, Default)]
pub struct ReloadSignal {
    requested: Cell<bool>,
}

impl ReloadSignal {
    /// Clear the request, returning whether one was pending.
    pub fn take(&self) -> bool {
        self.requested.replace(false)
    }
}

impl PageReloader for ReloadSignal {
    fn reload(&self) {
        warn!("Full page reload requested");
        self.requested.set(true);
    }
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct SessionSummary {
    /// Number of times the page was rebuilt.
    pub reloads: u32,
}

/// Run until the transport's event channel closes.
///
/// Malformed update payloads are logged and skipped; the session keeps going.
///
/// # Errors
///
/// - [`WatchError::Page`] if the page HTML cannot be (re)loaded
/// - [`WatchError::Core`] if a client cannot be created
pub async fn run_session(
    options: &ClientOptions,
    source: &PageSource,
    transport: Rc<dyn Transport>,
    mut events: UnboundedReceiver<TransportEvent>,
) -> Result<SessionSummary, WatchError> {
    let mut summary = SessionSummary::default();

    loop {
        let page = source.load()?;
        let signal = Rc::new(ReloadSignal::default());
        let client = HmrClient::connect(
            options,
            Rc::clone(&transport),
            &page,
            Rc::clone(&signal) as Rc<dyn PageReloader>,
        )?;

        loop {
            let Some(event) = events.recv().await else {
                info!("Transport closed after {} page reloads", summary.reloads);
                return Ok(summary);
            };

            match client.handle_event(event) {
                Ok(outcome) => debug!("Handled transport event: {outcome:?}"),
                Err(e) => error!("Ignoring transport event: {e}"),
            }

            if signal.take() {
                break;
            }
        }

        drop(client);
        summary.reloads += 1;
        info!("Reloading page from {}", source.html_path.display());
    }
}
