// Test doubles for the transport, document and reload collaborators

use crate::client::ChunkUpdateCallback;
use crate::error::transport::TransportError;
use crate::error::update::UpdateError;
use crate::page::{Document, PageReloader, StylesheetLink};
use crate::transport::Transport;

use common::ErrorLocation;
use models::{ChunkPath, ClientMessage, ServerMessage};

use std::cell::{Cell, RefCell};
use std::rc::Rc;

use url::Url;

pub const PAGE_URL: &str = "http://localhost:3000/dashboard";

#[derive(Default)]
pub struct RecordingTransport {
    pub sent: RefCell<Vec<String>>,
    pub fail: Cell<bool>,
}

impl RecordingTransport {
    /// Chunk paths of every subscribe message sent so far, in order.
    pub fn subscriptions(&self) -> Vec<String> {
        self.sent
            .borrow()
            .iter()
            .map(|payload| match serde_json::from_str::<ClientMessage>(payload).unwrap() {
                ClientMessage::Subscribe { chunk_path } => chunk_path.to_string(),
            })
            .collect()
    }

    pub fn clear(&self) {
        self.sent.borrow_mut().clear();
    }
}

impl Transport for RecordingTransport {
    fn send(&self, payload: String) -> Result<(), TransportError> {
        if self.fail.get() {
            return Err(TransportError::Closed {
                message: String::from("socket is down"),
                location: ErrorLocation::caller(),
            });
        }
        self.sent.borrow_mut().push(payload);
        Ok(())
    }
}

#[derive(Default)]
pub struct ReloadCounter {
    pub count: Cell<usize>,
}

impl PageReloader for ReloadCounter {
    fn reload(&self) {
        self.count.set(self.count.get() + 1);
    }
}

pub struct FakeLink {
    pub href: Option<String>,
    pub replacements: Cell<usize>,
}

impl FakeLink {
    pub fn new(href: &str) -> Rc<Self> {
        Rc::new(Self {
            href: Some(href.to_string()),
            replacements: Cell::new(0),
        })
    }

    pub fn without_href() -> Rc<Self> {
        Rc::new(Self {
            href: None,
            replacements: Cell::new(0),
        })
    }
}

impl StylesheetLink for FakeLink {
    fn href(&self) -> Option<String> {
        self.href.clone()
    }

    fn replace(&self) -> Result<(), UpdateError> {
        self.replacements.set(self.replacements.get() + 1);
        Ok(())
    }
}

pub struct FakeDocument {
    pub location: Url,
    pub links: Vec<Rc<FakeLink>>,
}

impl FakeDocument {
    pub fn new(links: Vec<Rc<FakeLink>>) -> Self {
        Self {
            location: Url::parse(PAGE_URL).unwrap(),
            links,
        }
    }

    pub fn empty() -> Self {
        Self::new(Vec::new())
    }
}

impl Document for FakeDocument {
    fn location(&self) -> Url {
        self.location.clone()
    }

    fn stylesheet_links(&self) -> Vec<Rc<dyn StylesheetLink>> {
        self.links
            .iter()
            .map(|link| Rc::clone(link) as Rc<dyn StylesheetLink>)
            .collect()
    }
}

pub fn chunk(path: &str) -> ChunkPath {
    ChunkPath::new(path).unwrap()
}

/// Callback that appends `label` to `log` every time it runs.
pub fn recording_callback(log: &Rc<RefCell<Vec<String>>>, label: &str) -> ChunkUpdateCallback {
    let log = Rc::clone(log);
    let label = label.to_string();
    Rc::new(move |_update: &ServerMessage| {
        log.borrow_mut().push(label.clone());
        Ok(())
    })
}

/// Callback that records `label` and then fails.
pub fn failing_callback(log: &Rc<RefCell<Vec<String>>>, label: &str) -> ChunkUpdateCallback {
    let log = Rc::clone(log);
    let label = label.to_string();
    Rc::new(move |_update: &ServerMessage| {
        log.borrow_mut().push(label.clone());
        Err(UpdateError::Callback {
            message: format!("{label} exploded"),
            location: ErrorLocation::caller(),
        })
    })
}
