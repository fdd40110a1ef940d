//! DOM Mount Utilities
//!
//! Server-rendered pages already contain the markup; components only attach
//! handlers to it and splice fragments in. [`DomMount`] is the seam between
//! that behaviour and the real document.

use std::rc::Rc;

mod document;
#[cfg(feature = "memory")]
mod memory;

pub use document::DocumentMount;
#[cfg(feature = "memory")]
pub use memory::MemoryDom;

/// Errors raised while touching the DOM
#[derive(Debug, Clone, PartialEq, thiserror::Error)]
pub enum MountError {
    #[error("element not found: {0}")]
    MissingElement(String),
    #[error("no window or document available")]
    NoDocument,
    #[error("dom call failed: {0}")]
    Js(String),
}

/// Click/submit callback. Shared so it can be re-armed on replacement nodes.
pub type Handler = Rc<dyn Fn()>;

/// An element lifted out of a document or fragment, ready to be re-inserted
#[derive(Debug, Clone, PartialEq)]
pub struct DetachedElement {
    pub id: String,
    pub outer_html: String,
    pub attributes: Vec<(String, String)>,
}

impl DetachedElement {
    pub fn attribute(&self, name: &str) -> Option<&str> {
        self.attributes
            .iter()
            .find(|(key, _)| key == name)
            .map(|(_, value)| value.as_str())
    }
}

/// A server fragment split into appendable rows and the (optional) control
/// that was embedded in it
#[derive(Debug, Clone, PartialEq, Default)]
pub struct FragmentParts {
    pub rows_html: String,
    pub control: Option<DetachedElement>,
}

/// Operations components need from the page.
///
/// Elements are addressed by id, except insertion slots which take a CSS
/// selector (the slot is styling markup without an id).
pub trait DomMount {
    fn exists(&self, id: &str) -> bool;

    fn attribute(&self, id: &str, name: &str) -> Option<String>;

    fn text(&self, id: &str) -> Option<String>;

    fn set_text(&self, id: &str, text: &str) -> Result<(), MountError>;

    /// Remove the element from the document and hand it back
    fn take(&self, id: &str) -> Option<DetachedElement>;

    /// Append a detached element as last child of the first `slot` match
    fn insert(&self, slot: &str, element: &DetachedElement) -> Result<(), MountError>;

    fn append_html(&self, container_id: &str, html: &str) -> Result<(), MountError>;

    fn prepend_html(&self, container_id: &str, html: &str) -> Result<(), MountError>;

    /// Separate the element `control_id` from the rest of `html`
    fn split_fragment(&self, html: &str, control_id: &str) -> FragmentParts;

    /// Name/value pairs of a form's successful controls, in document order
    fn form_fields(&self, form_id: &str) -> Result<Vec<(String, String)>, MountError>;

    fn reset_form(&self, form_id: &str) -> Result<(), MountError>;

    /// Replace the element's click handler
    fn on_click(&self, id: &str, handler: Handler) -> Result<(), MountError>;

    /// Install a submit handler; default navigation is always prevented
    fn on_submit(&self, form_id: &str, handler: Handler) -> Result<(), MountError>;

    fn cookie(&self, name: &str) -> Option<String>;
}

/// Pick one cookie out of a `document.cookie` style string
pub fn find_cookie(cookies: &str, name: &str) -> Option<String> {
    cookies.split(';').find_map(|pair| {
        let (key, value) = pair.trim().split_once('=')?;
        (key == name).then(|| value.to_string())
    })
}
