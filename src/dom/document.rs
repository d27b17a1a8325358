//! In-memory element tree.
//!
//! Nodes live in an arena indexed by [`NodeId`]. Detached nodes (fresh
//! elements, clones) stay in the arena but are not reachable from the
//! root, so they never show up in selections or in [`Document::node_count`].

use std::collections::BTreeMap;

use tracing::warn;

use super::selector::{MatchContext, Selector};
use super::{ElementTree, Event, EventKind, Namespace};
use crate::error::{Error, Result};

/// Handle to an element of a [`Document`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct NodeId(usize);

#[derive(Debug, Clone)]
struct NodeData {
    tag: String,
    namespace: Namespace,
    classes: Vec<String>,
    attributes: BTreeMap<String, String>,
    style: BTreeMap<String, String>,
    text: String,
    value: String,
    displayed: bool,
    fade_ms: Option<u32>,
    listeners: Vec<EventKind>,
    suppressed: Vec<EventKind>,
    parent: Option<NodeId>,
    children: Vec<NodeId>,
}

impl NodeData {
    fn new(namespace: Namespace, tag: &str) -> Self {
        NodeData {
            tag: tag.to_string(),
            namespace,
            classes: Vec::new(),
            attributes: BTreeMap::new(),
            style: BTreeMap::new(),
            text: String::new(),
            value: String::new(),
            displayed: true,
            fade_ms: None,
            listeners: Vec::new(),
            suppressed: Vec::new(),
            parent: None,
            children: Vec::new(),
        }
    }
}

/// What happened when an event was dispatched.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct Dispatch {
    /// A listener is registered for this kind on the target.
    pub delivered: bool,
    /// The default action was suppressed.
    pub default_prevented: bool,
}

/// Declarative element description for building test pages.
#[derive(Debug, Clone, Default)]
pub struct El {
    tag: String,
    id: Option<String>,
    classes: Vec<String>,
    attributes: Vec<(String, String)>,
    text: String,
    value: String,
    children: Vec<El>,
}

impl El {
    pub fn new(tag: &str) -> Self {
        El {
            tag: tag.to_string(),
            ..Default::default()
        }
    }

    pub fn id(mut self, id: &str) -> Self {
        self.id = Some(id.to_string());
        self
    }

    pub fn class(mut self, class: &str) -> Self {
        self.classes.push(class.to_string());
        self
    }

    pub fn attr(mut self, name: &str, value: &str) -> Self {
        self.attributes.push((name.to_string(), value.to_string()));
        self
    }

    pub fn text(mut self, text: &str) -> Self {
        self.text = text.to_string();
        self
    }

    pub fn value(mut self, value: &str) -> Self {
        self.value = value.to_string();
        self
    }

    pub fn child(mut self, child: El) -> Self {
        self.children.push(child);
        self
    }

    pub fn children(mut self, children: impl IntoIterator<Item = El>) -> Self {
        self.children.extend(children);
        self
    }
}

/// Arena-backed element tree.
#[derive(Debug, Clone)]
pub struct Document {
    nodes: Vec<NodeData>,
    root: NodeId,
}

impl Default for Document {
    fn default() -> Self {
        Self::new()
    }
}

impl Document {
    /// Empty document with a `body` root.
    pub fn new() -> Self {
        Document {
            nodes: vec![NodeData::new(Namespace::Html, "body")],
            root: NodeId(0),
        }
    }

    pub fn root(&self) -> NodeId {
        self.root
    }

    fn data(&self, node: NodeId) -> &NodeData {
        &self.nodes[node.0]
    }

    fn data_mut(&mut self, node: NodeId) -> &mut NodeData {
        &mut self.nodes[node.0]
    }

    fn alloc(&mut self, data: NodeData) -> NodeId {
        self.nodes.push(data);
        NodeId(self.nodes.len() - 1)
    }

    /// Create a detached HTML element.
    pub fn create(&mut self, tag: &str) -> NodeId {
        self.alloc(NodeData::new(Namespace::Html, tag))
    }

    /// Build `el` and its subtree under `parent`.
    pub fn build(&mut self, parent: NodeId, el: El) -> NodeId {
        let node = self.create(&el.tag);
        {
            let data = self.data_mut(node);
            if let Some(id) = el.id {
                data.attributes.insert("id".to_string(), id);
            }
            data.classes = el.classes;
            for (name, value) in el.attributes {
                data.attributes.insert(name, value);
            }
            data.text = el.text;
            data.value = el.value;
        }
        self.attach(parent, node);
        for child in el.children {
            self.build(node, child);
        }
        node
    }

    fn detach(&mut self, node: NodeId) {
        if let Some(parent) = self.data(node).parent {
            self.data_mut(parent).children.retain(|&c| c != node);
            self.data_mut(node).parent = None;
        }
    }

    fn attach(&mut self, parent: NodeId, child: NodeId) {
        self.detach(child);
        self.data_mut(parent).children.push(child);
        self.data_mut(child).parent = Some(parent);
    }

    fn is_ancestor_or_self(&self, ancestor: NodeId, mut node: NodeId) -> bool {
        loop {
            if node == ancestor {
                return true;
            }
            match self.data(node).parent {
                Some(p) => node = p,
                None => return false,
            }
        }
    }

    pub fn set_text(&mut self, node: NodeId, text: &str) {
        self.data_mut(node).text = text.to_string();
    }

    pub fn tag(&self, node: NodeId) -> &str {
        &self.data(node).tag
    }

    pub fn namespace(&self, node: NodeId) -> Namespace {
        self.data(node).namespace
    }

    pub fn classes(&self, node: NodeId) -> &[String] {
        &self.data(node).classes
    }

    pub fn style(&self, node: NodeId, property: &str) -> Option<&str> {
        self.data(node).style.get(property).map(String::as_str)
    }

    pub fn is_displayed(&self, node: NodeId) -> bool {
        self.data(node).displayed
    }

    /// Duration of the last fade-in applied to `node`.
    pub fn fade_duration(&self, node: NodeId) -> Option<u32> {
        self.data(node).fade_ms
    }

    pub fn parent(&self, node: NodeId) -> Option<NodeId> {
        self.data(node).parent
    }

    pub fn children(&self, node: NodeId) -> &[NodeId] {
        &self.data(node).children
    }

    /// Pre-order descendants of `node`, excluding `node`.
    pub fn descendants(&self, node: NodeId) -> Vec<NodeId> {
        let mut out = Vec::new();
        let mut stack: Vec<NodeId> = self.data(node).children.iter().rev().copied().collect();
        while let Some(n) = stack.pop() {
            out.push(n);
            stack.extend(self.data(n).children.iter().rev().copied());
        }
        out
    }

    /// Number of elements reachable from the root, root included.
    pub fn node_count(&self) -> usize {
        self.descendants(self.root).len() + 1
    }

    /// Strict selection: parse errors are returned instead of logged.
    pub fn query(&self, selector: &str) -> Result<Vec<NodeId>> {
        let selector = Selector::parse(selector)?;
        Ok(self.select_parsed(self.root, &selector))
    }

    /// Deliver an event and report how the host would treat it.
    pub fn dispatch(&self, event: &Event<NodeId>) -> Dispatch {
        let data = self.data(event.target);
        Dispatch {
            delivered: data.listeners.contains(&event.kind),
            default_prevented: data.suppressed.contains(&event.kind),
        }
    }

    fn select_parsed(&self, root: NodeId, selector: &Selector) -> Vec<NodeId> {
        let cx = Matching(self);
        self.descendants(root)
            .into_iter()
            .filter(|&n| selector.matches(&cx, n))
            .collect()
    }

    /// `node` itself if it is a form, else its nearest form ancestor.
    fn owning_form(&self, node: NodeId) -> Option<NodeId> {
        let mut current = Some(node);
        while let Some(n) = current {
            if self.data(n).tag.eq_ignore_ascii_case("form") {
                return Some(n);
            }
            current = self.data(n).parent;
        }
        None
    }

    fn sibling(&self, node: NodeId, step: isize) -> Option<NodeId> {
        let siblings = &self.data(self.data(node).parent?).children;
        let index = siblings.iter().position(|&n| n == node)?;
        siblings.get(index.checked_add_signed(step)?).copied()
    }

    fn copy_subtree(&mut self, node: NodeId) -> NodeId {
        let mut data = self.data(node).clone();
        let children = std::mem::take(&mut data.children);
        data.parent = None;
        data.listeners.clear();
        data.suppressed.clear();
        let copy = self.alloc(data);
        for child in children {
            let child_copy = self.copy_subtree(child);
            self.attach(copy, child_copy);
        }
        copy
    }
}

/// Selector matching view of a [`Document`].
struct Matching<'a>(&'a Document);

impl MatchContext for Matching<'_> {
    type Node = NodeId;

    fn tag(&self, node: NodeId) -> &str {
        &self.0.data(node).tag
    }

    fn id(&self, node: NodeId) -> Option<&str> {
        self.0.data(node).attributes.get("id").map(String::as_str)
    }

    fn classes(&self, node: NodeId) -> &[String] {
        &self.0.data(node).classes
    }

    fn attribute(&self, node: NodeId, name: &str) -> Option<String> {
        self.0.attribute(&node, name)
    }

    fn parent(&self, node: NodeId) -> Option<NodeId> {
        self.0.data(node).parent
    }

    fn previous_sibling(&self, node: NodeId) -> Option<NodeId> {
        self.0.sibling(node, -1)
    }

    fn next_sibling(&self, node: NodeId) -> Option<NodeId> {
        self.0.sibling(node, 1)
    }

    fn child_count(&self, node: NodeId) -> usize {
        self.0.data(node).children.len()
    }
}

impl ElementTree for Document {
    type Node = NodeId;

    fn select(&self, selector: &str) -> Vec<NodeId> {
        self.select_within(&self.root, selector)
    }

    fn select_within(&self, root: &NodeId, selector: &str) -> Vec<NodeId> {
        match Selector::parse(selector) {
            Ok(parsed) => self.select_parsed(*root, &parsed),
            Err(e) => {
                warn!("{}", e);
                Vec::new()
            }
        }
    }

    fn text(&self, node: &NodeId) -> String {
        let mut out = self.data(*node).text.clone();
        for child in self.descendants(*node) {
            out.push_str(&self.data(child).text);
        }
        out
    }

    fn value(&self, node: &NodeId) -> String {
        self.data(*node).value.clone()
    }

    fn set_value(&mut self, node: &NodeId, value: &str) {
        self.data_mut(*node).value = value.to_string();
    }

    fn has_class(&self, node: &NodeId, class: &str) -> bool {
        self.data(*node).classes.iter().any(|c| c == class)
    }

    fn add_class(&mut self, node: &NodeId, class: &str) {
        if !self.has_class(node, class) {
            self.data_mut(*node).classes.push(class.to_string());
        }
    }

    fn remove_class(&mut self, node: &NodeId, class: &str) {
        self.data_mut(*node).classes.retain(|c| c != class);
    }

    fn attribute(&self, node: &NodeId, name: &str) -> Option<String> {
        let data = self.data(*node);
        if name == "class" {
            if data.classes.is_empty() {
                return None;
            }
            return Some(data.classes.join(" "));
        }
        data.attributes.get(name).cloned()
    }

    fn set_attribute(&mut self, node: &NodeId, name: &str, value: &str) {
        let data = self.data_mut(*node);
        if name == "class" {
            data.classes = value.split_whitespace().map(str::to_string).collect();
        } else {
            data.attributes.insert(name.to_string(), value.to_string());
        }
    }

    fn remove_attribute(&mut self, node: &NodeId, name: &str) {
        let data = self.data_mut(*node);
        if name == "class" {
            data.classes.clear();
        } else {
            data.attributes.remove(name);
        }
    }

    fn set_style(&mut self, node: &NodeId, property: &str, value: &str) {
        self.data_mut(*node)
            .style
            .insert(property.to_string(), value.to_string());
    }

    fn set_displayed(&mut self, node: &NodeId, displayed: bool) {
        self.data_mut(*node).displayed = displayed;
    }

    fn image_size(&self, node: &NodeId) -> (f32, f32) {
        let dim = |name: &str| {
            self.data(*node)
                .attributes
                .get(name)
                .and_then(|v| v.trim_end_matches("px").parse::<f32>().ok())
                .unwrap_or(0.0)
        };
        (dim("width"), dim("height"))
    }

    fn create_element(&mut self, namespace: Namespace, tag: &str) -> Result<NodeId> {
        Ok(self.alloc(NodeData::new(namespace, tag)))
    }

    fn clone_deep(&mut self, node: &NodeId) -> Result<NodeId> {
        Ok(self.copy_subtree(*node))
    }

    fn append_child(&mut self, parent: &NodeId, child: &NodeId) -> Result<()> {
        if self.is_ancestor_or_self(*child, *parent) {
            return Err(Error::Host("cannot append a node into its own subtree".to_string()));
        }
        self.attach(*parent, *child);
        Ok(())
    }

    fn insert_after(&mut self, reference: &NodeId, node: &NodeId) -> Result<()> {
        let parent = self
            .data(*reference)
            .parent
            .ok_or_else(|| Error::Host("cannot insert after a detached node".to_string()))?;
        if self.is_ancestor_or_self(*node, parent) {
            return Err(Error::Host("cannot insert a node into its own subtree".to_string()));
        }
        self.detach(*node);
        let siblings = &self.data(parent).children;
        let index = siblings
            .iter()
            .position(|c| c == reference)
            .map(|i| i + 1)
            .unwrap_or(siblings.len());
        self.data_mut(parent).children.insert(index, *node);
        self.data_mut(*node).parent = Some(parent);
        Ok(())
    }

    fn wrap(&mut self, node: &NodeId, wrapper: &NodeId) -> Result<()> {
        if self.is_ancestor_or_self(*node, *wrapper) {
            return Err(Error::Host("cannot wrap a node in its own descendant".to_string()));
        }
        self.detach(*wrapper);
        if let Some(parent) = self.data(*node).parent {
            let index = self
                .data(parent)
                .children
                .iter()
                .position(|c| c == node)
                .unwrap_or(0);
            self.data_mut(parent).children[index] = *wrapper;
            self.data_mut(*wrapper).parent = Some(parent);
            self.data_mut(*node).parent = None;
        }
        self.attach(*wrapper, *node);
        Ok(())
    }

    fn listen(&mut self, node: &NodeId, kind: EventKind) {
        let data = self.data_mut(*node);
        if !data.listeners.contains(&kind) {
            data.listeners.push(kind);
        }
    }

    fn suppress_default(&mut self, node: &NodeId, kind: EventKind) {
        // Submit fires on the owning form, not on the control
        let target = match kind {
            EventKind::Submit => self.owning_form(*node).unwrap_or(*node),
            _ => *node,
        };
        let data = self.data_mut(target);
        if !data.suppressed.contains(&kind) {
            data.suppressed.push(kind);
        }
    }

    fn fade_in(&mut self, node: &NodeId, duration_ms: u32) {
        let data = self.data_mut(*node);
        data.displayed = true;
        data.fade_ms = Some(duration_ms);
    }
}
