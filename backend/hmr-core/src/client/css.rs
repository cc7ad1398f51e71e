//! CSS chunks cannot carry the code to accept their own updates, so the
//! client reloads them itself. Stylesheets present when the client connects
//! are found by scanning the document head once.

use crate::client::registry::{ChunkUpdateCallback, SubscriptionRegistry};
use crate::error::update::UpdateError;
use crate::page::{Document, StylesheetLink};

use common::ErrorLocation;
use models::{ChunkPath, ServerMessage};

use std::cell::RefCell;
use std::panic::Location;
use std::rc::Rc;

use log::{debug, info};
use url::Url;

/// Subscribe to updates for every CSS chunk linked from the document head.
///
/// Only links on the page's own origin whose path starts with
/// `"{asset_prefix}/"` are chunks; the remainder of the path is the chunk
/// path. Links added to the document later are not picked up.
///
/// Returns the number of links registered.
pub fn subscribe_to_initial_css_chunks(
    registry: &RefCell<SubscriptionRegistry>,
    document: &dyn Document,
    asset_prefix: &str,
) -> usize {
    let css_chunk_prefix = format!("{asset_prefix}/");
    let page_origin = document.location().origin().ascii_serialization();

    let mut registered = 0;
    for link in document.stylesheet_links() {
        let Some(chunk_path) = css_chunk_path(link.as_ref(), &page_origin, &css_chunk_prefix)
        else {
            continue;
        };

        let callback = css_chunk_callback(chunk_path.clone(), link);
        registry.borrow_mut().register(chunk_path, callback);
        registered += 1;
    }

    registered
}

fn css_chunk_path(
    link: &dyn StylesheetLink,
    page_origin: &str,
    css_chunk_prefix: &str,
) -> Option<ChunkPath> {
    let href = link.href()?;

    let url = match Url::parse(&href) {
        Ok(url) => url,
        Err(e) => {
            debug!("Skipping stylesheet with unparsable href `{href}`: {e}");
            return None;
        }
    };

    // Serialized, so two opaque origins (`file:` pages) compare as "null" == "null"
    if url.origin().ascii_serialization() != page_origin {
        debug!("Skipping cross-origin stylesheet {href}");
        return None;
    }

    let Some(chunk_path) = url.path().strip_prefix(css_chunk_prefix) else {
        debug!("Skipping stylesheet outside {css_chunk_prefix}: {href}");
        return None;
    };

    ChunkPath::new(chunk_path).ok()
}

fn css_chunk_callback(chunk_path: ChunkPath, link: Rc<dyn StylesheetLink>) -> ChunkUpdateCallback {
    Rc::new(move |update: &ServerMessage| match update {
        ServerMessage::Restart { .. } => {
            info!("Reloading CSS chunk `{chunk_path}`");
            link.replace()
        }
        ServerMessage::Partial { .. } => Err(UpdateError::Unsupported {
            message: format!(
                "partial CSS chunk updates are not supported (chunk `{chunk_path}`)"
            ),
            location: ErrorLocation::from(Location::caller()),
        }),
        ServerMessage::Unknown { kind, .. } => Err(UpdateError::Unsupported {
            message: format!("unknown update type `{kind}` for CSS chunk `{chunk_path}`"),
            location: ErrorLocation::from(Location::caller()),
        }),
    })
}
