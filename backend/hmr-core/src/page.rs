//! Boundary with the document the client runs in.

use crate::error::update::UpdateError;

use std::rc::Rc;

use url::Url;

/// A stylesheet `<link>` element in the document head.
pub trait StylesheetLink {
    /// Absolute URL the link points at, if it has one.
    fn href(&self) -> Option<String>;

    /// Swap the element for an equivalent one, forcing the stylesheet to be
    /// fetched and applied again.
    fn replace(&self) -> Result<(), UpdateError>;
}

pub trait Document {
    /// URL of the page itself. Its origin decides which links are ours.
    fn location(&self) -> Url;

    /// Stylesheet links currently in the head, in document order.
    fn stylesheet_links(&self) -> Vec<Rc<dyn StylesheetLink>>;
}

/// Forces a full page reload.
pub trait PageReloader {
    fn reload(&self);
}
