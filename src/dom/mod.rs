//! Element-tree abstraction shared by both widgets.
//!
//! Both the incremental filter and the glow engine are written against
//! [`ElementTree`], a small selection/mutation surface that a host page
//! implements. Two hosts ship with the crate:
//!
//! - [`Document`]: an in-memory tree with a selector subset, used by tests
//!   and by non-browser hosts
//! - `web::WebTree` (feature `wasm`): the live browser document via `web-sys`

pub mod document;
pub mod selector;

#[cfg(feature = "wasm")]
pub mod web;

pub use document::{Document, El, NodeId};
pub use selector::Selector;

use std::fmt;

use crate::error::Result;

/// Namespace of a created element.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Namespace {
    Html,
    Svg,
}

impl Namespace {
    pub fn uri(self) -> &'static str {
        match self {
            Namespace::Html => "http://www.w3.org/1999/xhtml",
            Namespace::Svg => "http://www.w3.org/2000/svg",
        }
    }
}

/// Events the widgets react to.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum EventKind {
    KeyUp,
    Submit,
    Click,
}

impl EventKind {
    /// DOM event type name.
    pub fn as_str(self) -> &'static str {
        match self {
            EventKind::KeyUp => "keyup",
            EventKind::Submit => "submit",
            EventKind::Click => "click",
        }
    }
}

/// An event delivered to a node.
#[derive(Debug, Clone, PartialEq)]
pub struct Event<N> {
    pub kind: EventKind,
    pub target: N,
}

impl<N> Event<N> {
    pub fn new(kind: EventKind, target: N) -> Self {
        Event { kind, target }
    }
}

/// Selection and mutation surface a host page provides.
///
/// Cosmetic mutations (classes, styles, attributes) are infallible: a host
/// that cannot apply one logs and moves on. Structural mutations return
/// [`Result`] since a failed insert leaves nothing sensible to continue with.
pub trait ElementTree {
    type Node: Clone + PartialEq + fmt::Debug;

    /// All elements in the document matching `selector`, in document order.
    fn select(&self, selector: &str) -> Vec<Self::Node>;

    /// Descendants of `root` matching `selector`, in document order.
    fn select_within(&self, root: &Self::Node, selector: &str) -> Vec<Self::Node>;

    /// Text content of the element and its descendants.
    fn text(&self, node: &Self::Node) -> String;

    /// Current value of a form control.
    fn value(&self, node: &Self::Node) -> String;
    fn set_value(&mut self, node: &Self::Node, value: &str);

    fn has_class(&self, node: &Self::Node, class: &str) -> bool;
    fn add_class(&mut self, node: &Self::Node, class: &str);
    fn remove_class(&mut self, node: &Self::Node, class: &str);

    fn attribute(&self, node: &Self::Node, name: &str) -> Option<String>;
    fn set_attribute(&mut self, node: &Self::Node, name: &str, value: &str);
    fn remove_attribute(&mut self, node: &Self::Node, name: &str);

    fn set_style(&mut self, node: &Self::Node, property: &str, value: &str);

    /// Show or hide an element (`display`).
    fn set_displayed(&mut self, node: &Self::Node, displayed: bool);

    /// Rendered width and height of an image-like element.
    fn image_size(&self, node: &Self::Node) -> (f32, f32);

    fn create_element(&mut self, namespace: Namespace, tag: &str) -> Result<Self::Node>;

    /// Deep copy of `node` and its subtree. The copy is detached and carries
    /// no listeners or default suppressions, as with `cloneNode(true)`.
    fn clone_deep(&mut self, node: &Self::Node) -> Result<Self::Node>;

    fn append_child(&mut self, parent: &Self::Node, child: &Self::Node) -> Result<()>;

    /// Insert `node` as the next sibling of `reference`.
    fn insert_after(&mut self, reference: &Self::Node, node: &Self::Node) -> Result<()>;

    /// Put `wrapper` where `node` is and move `node` inside it.
    fn wrap(&mut self, node: &Self::Node, wrapper: &Self::Node) -> Result<()>;

    /// Register interest in `kind` events on `node`.
    fn listen(&mut self, node: &Self::Node, kind: EventKind);

    /// Prevent the default action of `kind` events on `node`.
    ///
    /// For [`EventKind::Submit`] the suppression goes on the form that owns
    /// `node`, since that is where browsers fire the event.
    fn suppress_default(&mut self, node: &Self::Node, kind: EventKind);

    /// Reveal a hidden element with an opacity transition.
    fn fade_in(&mut self, node: &Self::Node, duration_ms: u32);
}
