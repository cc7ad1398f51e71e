//! A page without a browser.
//!
//! The HTML snapshot is parsed for `<link rel="stylesheet">` elements in the
//! head; replacing a link counts a refetch instead of touching a real DOM.

use crate::error::WatchError;

use common::ErrorLocation;
use hmr_core::error::update::UpdateError;
use hmr_core::page::{Document, StylesheetLink};

use std::cell::Cell;
use std::panic::Location;
use std::path::PathBuf;
use std::rc::Rc;

use log::{debug, info};
use scraper::{Html, Selector};
use url::Url;

/// `rel` is a token list, so `~=` also matches `rel="alternate stylesheet"`.
const STYLESHEET_SELECTOR: &str = "head link[rel~=stylesheet][href]";

/// Where a page comes from: the URL it claims to be served at and the HTML
/// file standing in for its document.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PageSource {
    pub location: Url,
    pub html_path: PathBuf,
}

impl PageSource {
    /// Read the HTML file and build a fresh page from it.
    pub fn load(&self) -> Result<HeadlessPage, WatchError> {
        let html = std::fs::read_to_string(&self.html_path).map_err(|e| WatchError::Page {
            message: format!("Failed to read {}: {e}", self.html_path.display()),
            location: ErrorLocation::from(Location::caller()),
        })?;

        let page = HeadlessPage::parse(self.location.clone(), &html)?;
        debug!(
            "Loaded {} with {} stylesheets",
            self.html_path.display(),
            page.links().len()
        );
        Ok(page)
    }
}

pub struct HeadlessLink {
    href: String,
    refetches: Cell<u32>,
}

impl HeadlessLink {
    pub fn href(&self) -> &str {
        &self.href
    }

    /// How many times the stylesheet was refetched since the page loaded.
    pub fn refetches(&self) -> u32 {
        self.refetches.get()
    }
}

impl StylesheetLink for HeadlessLink {
    fn href(&self) -> Option<String> {
        Some(self.href.clone())
    }

    fn replace(&self) -> Result<(), UpdateError> {
        self.refetches.set(self.refetches.get() + 1);
        info!("Refetching stylesheet {}", self.href);
        Ok(())
    }
}

pub struct HeadlessPage {
    location: Url,
    links: Vec<Rc<HeadlessLink>>,
}

impl HeadlessPage {
    /// Build a page from an HTML string.
    ///
    /// The HTML is parsed the way a browser parses it, so links inside
    /// comments or scripts are not stylesheets, and stray `<link>`s before
    /// `<body>` end up in the head. Hrefs are resolved against `location`,
    /// the way a browser resolves `link.href`; unresolvable ones are skipped.
    ///
    /// # Errors
    ///
    /// Returns [`WatchError::Page`] if the stylesheet selector cannot be built.
    pub fn parse(location: Url, html: &str) -> Result<Self, WatchError> {
        let selector = Selector::parse(STYLESHEET_SELECTOR).map_err(|e| WatchError::Page {
            message: format!("Invalid stylesheet selector {STYLESHEET_SELECTOR}: {e}"),
            location: ErrorLocation::from(Location::caller()),
        })?;

        let document = Html::parse_document(html);
        let links = document
            .select(&selector)
            .filter_map(|element| element.value().attr("href"))
            .filter_map(|href| match location.join(href.trim()) {
                Ok(url) => Some(Rc::new(HeadlessLink {
                    href: url.to_string(),
                    refetches: Cell::new(0),
                })),
                Err(e) => {
                    debug!("Skipping stylesheet with unresolvable href `{href}`: {e}");
                    None
                }
            })
            .collect();

        Ok(Self { location, links })
    }

    pub fn links(&self) -> &[Rc<HeadlessLink>] {
        &self.links
    }
}

impl Document for HeadlessPage {
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
