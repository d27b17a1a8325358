//! [`ElementTree`] over the live browser document.
//!
//! Host failures on cosmetic mutations are logged with `warn!` and
//! swallowed. Listener registration is recorded rather than wired here:
//! the binding layer owns the closures and the state they call into, see
//! [`WebTree::take_listeners`].

use std::fmt;

use js_sys::Reflect;
use tracing::warn;
use wasm_bindgen::prelude::*;
use wasm_bindgen::JsCast;
use web_sys::{Element, HtmlElement, HtmlImageElement, HtmlInputElement, Node, SvgElement};

use super::{ElementTree, EventKind, Namespace};
use crate::error::{Error, Result};
use crate::glow::{CapabilityProbe, CssFilterProperty};

pub(crate) fn host_error(value: JsValue) -> Error {
    Error::Host(
        value
            .as_string()
            .unwrap_or_else(|| format!("{:?}", value)),
    )
}

fn log_failure(operation: &str, result: std::result::Result<(), JsValue>) {
    if let Err(e) = result {
        warn!(operation, error = %host_error(e), "host mutation failed");
    }
}

/// The browser document as an element tree.
#[derive(Clone)]
pub struct WebTree {
    document: web_sys::Document,
    pending: Vec<(Element, EventKind)>,
}

impl fmt::Debug for WebTree {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("WebTree")
            .field("pending", &self.pending.len())
            .finish()
    }
}

impl WebTree {
    pub fn new(document: web_sys::Document) -> Self {
        WebTree {
            document,
            pending: Vec::new(),
        }
    }

    /// The window's document.
    pub fn from_window() -> Result<Self> {
        let document = web_sys::window()
            .and_then(|w| w.document())
            .ok_or_else(|| Error::Host("no document".to_string()))?;
        Ok(Self::new(document))
    }

    pub fn document(&self) -> &web_sys::Document {
        &self.document
    }

    /// Listener registrations made since the last call.
    pub fn take_listeners(&mut self) -> Vec<(Element, EventKind)> {
        std::mem::take(&mut self.pending)
    }

    fn collect(list: std::result::Result<web_sys::NodeList, JsValue>, selector: &str) -> Vec<Element> {
        match list {
            Ok(list) => (0..list.length())
                .filter_map(|i| list.item(i))
                .filter_map(|node| node.dyn_into::<Element>().ok())
                .collect(),
            Err(e) => {
                warn!(selector, error = %host_error(e), "selector rejected by host");
                Vec::new()
            }
        }
    }

    fn style_of(node: &Element) -> Option<web_sys::CssStyleDeclaration> {
        if let Some(html) = node.dyn_ref::<HtmlElement>() {
            Some(html.style())
        } else {
            node.dyn_ref::<SvgElement>().map(SvgElement::style)
        }
    }
}

impl ElementTree for WebTree {
    type Node = Element;

    fn select(&self, selector: &str) -> Vec<Element> {
        Self::collect(self.document.query_selector_all(selector), selector)
    }

    fn select_within(&self, root: &Element, selector: &str) -> Vec<Element> {
        Self::collect(root.query_selector_all(selector), selector)
    }

    fn text(&self, node: &Element) -> String {
        node.text_content().unwrap_or_default()
    }

    fn value(&self, node: &Element) -> String {
        match node.dyn_ref::<HtmlInputElement>() {
            Some(input) => input.value(),
            None => self.text(node),
        }
    }

    fn set_value(&mut self, node: &Element, value: &str) {
        match node.dyn_ref::<HtmlInputElement>() {
            Some(input) => input.set_value(value),
            None => node.set_text_content(Some(value)),
        }
    }

    fn has_class(&self, node: &Element, class: &str) -> bool {
        node.class_list().contains(class)
    }

    fn add_class(&mut self, node: &Element, class: &str) {
        log_failure("add_class", node.class_list().add_1(class));
    }

    fn remove_class(&mut self, node: &Element, class: &str) {
        log_failure("remove_class", node.class_list().remove_1(class));
    }

    fn attribute(&self, node: &Element, name: &str) -> Option<String> {
        node.get_attribute(name)
    }

    fn set_attribute(&mut self, node: &Element, name: &str, value: &str) {
        log_failure("set_attribute", node.set_attribute(name, value));
    }

    fn remove_attribute(&mut self, node: &Element, name: &str) {
        log_failure("remove_attribute", node.remove_attribute(name));
    }

    fn set_style(&mut self, node: &Element, property: &str, value: &str) {
        match Self::style_of(node) {
            Some(style) => log_failure("set_style", style.set_property(property, value)),
            None => warn!(property, "element has no inline style"),
        }
    }

    fn set_displayed(&mut self, node: &Element, displayed: bool) {
        self.set_style(node, "display", if displayed { "" } else { "none" });
    }

    fn image_size(&self, node: &Element) -> (f32, f32) {
        match node.dyn_ref::<HtmlImageElement>() {
            Some(img) => (img.width() as f32, img.height() as f32),
            None => (node.client_width() as f32, node.client_height() as f32),
        }
    }

    fn create_element(&mut self, namespace: Namespace, tag: &str) -> Result<Element> {
        self.document
            .create_element_ns(Some(namespace.uri()), tag)
            .map_err(host_error)
    }

    fn clone_deep(&mut self, node: &Element) -> Result<Element> {
        node.clone_node_with_deep(true)
            .map_err(host_error)?
            .dyn_into::<Element>()
            .map_err(|_| Error::Host("clone is not an element".to_string()))
    }

    fn append_child(&mut self, parent: &Element, child: &Element) -> Result<()> {
        parent.append_child(child).map_err(host_error)?;
        Ok(())
    }

    fn insert_after(&mut self, reference: &Element, node: &Element) -> Result<()> {
        let parent = reference
            .parent_node()
            .ok_or_else(|| Error::Host("reference node is detached".to_string()))?;
        let next = reference.next_sibling();
        parent
            .insert_before(node, next.as_ref())
            .map_err(host_error)?;
        Ok(())
    }

    fn wrap(&mut self, node: &Element, wrapper: &Element) -> Result<()> {
        if let Some(parent) = node.parent_node() {
            parent
                .insert_before(wrapper, Some(node.as_ref()))
                .map_err(host_error)?;
        }
        wrapper.append_child(node).map_err(host_error)?;
        Ok(())
    }

    fn listen(&mut self, node: &Element, kind: EventKind) {
        self.pending.push((node.clone(), kind));
    }

    fn suppress_default(&mut self, node: &Element, kind: EventKind) {
        // Submit fires on the owning form, not on the control
        let target = match kind {
            EventKind::Submit => node
                .dyn_ref::<HtmlInputElement>()
                .and_then(HtmlInputElement::form)
                .map(Element::from)
                .or_else(|| node.closest("form").ok().flatten())
                .unwrap_or_else(|| node.clone()),
            _ => node.clone(),
        };
        let handler = Closure::<dyn FnMut(web_sys::Event)>::new(|event: web_sys::Event| {
            event.prevent_default();
        });
        log_failure(
            "suppress_default",
            target.add_event_listener_with_callback(kind.as_str(), handler.as_ref().unchecked_ref()),
        );
        // Lives as long as the page
        handler.forget();
    }

    fn fade_in(&mut self, node: &Element, duration_ms: u32) {
        if duration_ms == 0 {
            self.set_displayed(node, true);
            return;
        }
        self.set_style(node, "opacity", "0");
        self.set_style(node, "transition", &format!("opacity {duration_ms}ms"));
        self.set_displayed(node, true);

        // The transition only runs if opacity changes after a style flush
        let target: Node = node.clone().into();
        let reveal = Closure::once_into_js(move || {
            if let Some(style) = target.dyn_ref::<Element>().and_then(WebTree::style_of) {
                log_failure("fade_in", style.set_property("opacity", "1"));
            }
        });
        let scheduled = web_sys::window()
            .ok_or_else(|| JsValue::from_str("no window"))
            .and_then(|w| {
                w.set_timeout_with_callback_and_timeout_and_arguments_0(reveal.unchecked_ref(), 0)
            });
        if let Err(e) = scheduled {
            warn!(error = %host_error(e), "fade-in not scheduled");
            self.set_style(node, "opacity", "1");
        }
    }
}

/// Feature probe against the browser's rendering engine.
#[derive(Clone)]
pub struct WebProbe {
    document: web_sys::Document,
}

impl WebProbe {
    pub fn new(document: web_sys::Document) -> Self {
        WebProbe { document }
    }

    fn accepts_filter(&self, property: CssFilterProperty) -> bool {
        let Ok(probe) = self.document.create_element("div") else {
            return false;
        };
        let Some(style) = WebTree::style_of(&probe) else {
            return false;
        };
        if style.set_property(property.name(), "blur(2px)").is_err() {
            return false;
        }
        style
            .get_property_value(property.name())
            .map(|v| !v.is_empty())
            .unwrap_or(false)
    }
}

impl CapabilityProbe for WebProbe {
    fn css_filter(&self) -> Option<CssFilterProperty> {
        [CssFilterProperty::Prefixed, CssFilterProperty::Standard]
            .into_iter()
            .find(|&property| self.accepts_filter(property))
    }

    fn svg_blur(&self) -> bool {
        self.document
            .create_element_ns(Some(Namespace::Svg.uri()), "feGaussianBlur")
            .ok()
            .and_then(|el| Reflect::has(&el, &JsValue::from_str("setStdDeviation")).ok())
            .unwrap_or(false)
    }
}
