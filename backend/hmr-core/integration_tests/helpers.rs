//! Test helpers for hot reload integration tests.
//!
//! In-memory stand-ins for the collaborators the core talks to:
//! - A transport that records outbound payloads
//! - A document with a fixed set of stylesheet links
//! - A reloader that counts full page reloads

use hmr_core::error::transport::TransportError;
use hmr_core::error::update::UpdateError;
use hmr_core::page::{Document, PageReloader, StylesheetLink};
use hmr_core::transport::{Transport, TransportEvent};

use models::ClientMessage;

use std::cell::{Cell, RefCell};
use std::rc::Rc;

use url::Url;

/// Page the fake document pretends to be.
pub const PAGE_URL: &str = "http://127.0.0.1:3000/";

/// Asset prefix used by every test.
pub const ASSET_PREFIX: &str = "/_next";

#[derive(Default)]
pub struct RecordingTransport {
    sent: RefCell<Vec<String>>,
}

impl RecordingTransport {
    /// Drain and decode everything sent so far.
    pub fn take_subscriptions(&self) -> Vec<String> {
        self.sent
            .borrow_mut()
            .drain(..)
            .map(|payload| {
                let message: ClientMessage =
                    serde_json::from_str(&payload).expect("Client sent invalid JSON");
                match message {
                    ClientMessage::Subscribe { chunk_path } => chunk_path.to_string(),
                }
            })
            .collect()
    }
}

impl Transport for RecordingTransport {
    fn send(&self, payload: String) -> Result<(), TransportError> {
        self.sent.borrow_mut().push(payload);
        Ok(())
    }
}

#[derive(Default)]
pub struct CountingReloader {
    count: Cell<usize>,
}

impl CountingReloader {
    pub fn reloads(&self) -> usize {
        self.count.get()
    }
}

impl PageReloader for CountingReloader {
    fn reload(&self) {
        self.count.set(self.count.get() + 1);
    }
}

pub struct TestLink {
    href: String,
    generation: Cell<u32>,
}

impl TestLink {
    pub fn generation(&self) -> u32 {
        self.generation.get()
    }
}

impl StylesheetLink for TestLink {
    fn href(&self) -> Option<String> {
        Some(self.href.clone())
    }

    fn replace(&self) -> Result<(), UpdateError> {
        self.generation.set(self.generation.get() + 1);
        Ok(())
    }
}

pub struct TestDocument {
    links: Vec<Rc<TestLink>>,
}

impl TestDocument {
    /// Document whose head links each of `hrefs`, resolved against [`PAGE_URL`].
    pub fn with_stylesheets(hrefs: &[&str]) -> Self {
        let base = Url::parse(PAGE_URL).expect("valid page URL");
        let links = hrefs
            .iter()
            .map(|href| {
                Rc::new(TestLink {
                    href: base.join(href).expect("valid href").to_string(),
                    generation: Cell::new(0),
                })
            })
            .collect();
        Self { links }
    }

    pub fn link(&self, index: usize) -> Rc<TestLink> {
        Rc::clone(&self.links[index])
    }
}

impl Document for TestDocument {
    fn location(&self) -> Url {
        Url::parse(PAGE_URL).expect("valid page URL")
    }

    fn stylesheet_links(&self) -> Vec<Rc<dyn StylesheetLink>> {
        self.links
            .iter()
            .map(|link| Rc::clone(link) as Rc<dyn StylesheetLink>)
            .collect()
    }
}

pub fn restart(chunk_path: &str) -> TransportEvent {
    TransportEvent::Message(format!(
        r#"{{"type":"restart","chunkPath":"{chunk_path}"}}"#
    ))
}

pub fn partial(chunk_path: &str) -> TransportEvent {
    TransportEvent::Message(format!(
        r#"{{"type":"partial","chunkPath":"{chunk_path}","instruction":{{}}}}"#
    ))
}
