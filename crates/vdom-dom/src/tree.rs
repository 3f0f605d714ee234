//! The node arena and its structural mutations.
//!
//! Every node of every document, fragment or detached subtree lives in one
//! [`Tree`]. A node's parent is just another [`NodeId`]; children are owned by
//! position in their parent's child list. Nodes are never freed: `remove`
//! detaches a subtree, which stays valid and can be re-inserted.

use tracing::{trace, warn};
use vdom_css::SelectorMatcher;
use vdom_html::AttrValue;

use crate::element::stored_name;
use crate::node::{DocType, ElementData, NodeData, NodeId, NodeKind, TextData};
use crate::DomError;

/// Anything that can be inserted into a node's child list.
///
/// A fragment node contributes its children (leaving it empty); text becomes a
/// new Text node.
#[derive(Debug, Clone, PartialEq)]
pub enum Content {
    Node(NodeId),
    Nodes(Vec<NodeId>),
    Text(String),
    List(Vec<Content>),
}

impl From<NodeId> for Content {
    fn from(id: NodeId) -> Self {
        Content::Node(id)
    }
}

impl From<Vec<NodeId>> for Content {
    fn from(ids: Vec<NodeId>) -> Self {
        Content::Nodes(ids)
    }
}

impl From<&[NodeId]> for Content {
    fn from(ids: &[NodeId]) -> Self {
        Content::Nodes(ids.to_vec())
    }
}

impl From<&str> for Content {
    fn from(text: &str) -> Self {
        Content::Text(text.to_string())
    }
}

impl From<String> for Content {
    fn from(text: String) -> Self {
        Content::Text(text)
    }
}

impl From<Vec<Content>> for Content {
    fn from(items: Vec<Content>) -> Self {
        Content::List(items)
    }
}

/// Arena of nodes plus the selector matcher used by its queries.
#[derive(Debug, Default)]
pub struct Tree {
    nodes: Vec<NodeData>,
    matcher: SelectorMatcher,
}

impl Tree {
    pub fn new() -> Self {
        Self::default()
    }

    /// Number of nodes ever created in this tree, attached or not.
    pub fn len(&self) -> usize {
        self.nodes.len()
    }

    pub fn is_empty(&self) -> bool {
        self.nodes.is_empty()
    }

    pub(crate) fn matcher(&self) -> &SelectorMatcher {
        &self.matcher
    }

    fn push(&mut self, kind: NodeKind) -> NodeId {
        let id = NodeId::new(self.nodes.len());
        self.nodes.push(NodeData::new(kind));
        id
    }

    // Creation

    /// An empty document without a doctype.
    pub fn create_document(&mut self) -> NodeId {
        self.push(NodeKind::Document { doctype: None })
    }

    pub fn create_fragment(&mut self) -> NodeId {
        self.push(NodeKind::Fragment)
    }

    pub fn create_element(&mut self, tag: &str) -> NodeId {
        self.push(NodeKind::Element(ElementData::new(tag)))
    }

    pub fn create_text(&mut self, text: impl Into<String>) -> NodeId {
        self.push(NodeKind::Text(TextData {
            text: text.into(),
            raw: false,
        }))
    }

    /// A Text node holding already-serialized markup, rendered verbatim.
    pub fn create_markup(&mut self, markup: impl Into<String>) -> NodeId {
        self.push(NodeKind::Text(TextData {
            text: markup.into(),
            raw: true,
        }))
    }

    pub fn create_doctype(&mut self) -> NodeId {
        self.push(NodeKind::DocType(DocType::default()))
    }

    pub(crate) fn create_element_from(&mut self, tag: &str, attrs: Vec<(String, AttrValue)>) -> NodeId {
        let mut data = ElementData::new(tag);
        for (name, value) in attrs {
            data.set_attribute(stored_name(&name), value);
        }
        self.push(NodeKind::Element(data))
    }

    // Access

    /// The node behind `id`.
    ///
    /// # Panics
    ///
    /// Panics if `id` was minted by a different tree.
    pub fn get(&self, id: NodeId) -> &NodeData {
        &self.nodes[id.raw()]
    }

    pub(crate) fn get_mut(&mut self, id: NodeId) -> &mut NodeData {
        &mut self.nodes[id.raw()]
    }

    pub fn kind(&self, id: NodeId) -> &NodeKind {
        &self.get(id).kind
    }

    pub fn element(&self, id: NodeId) -> Option<&ElementData> {
        self.get(id).as_element()
    }

    pub(crate) fn element_mut(&mut self, id: NodeId) -> Option<&mut ElementData> {
        match &mut self.get_mut(id).kind {
            NodeKind::Element(el) => Some(el),
            _ => None,
        }
    }

    pub fn is_element(&self, id: NodeId) -> bool {
        self.element(id).is_some()
    }

    pub fn node_type(&self, id: NodeId) -> u16 {
        self.kind(id).node_type()
    }

    pub fn node_name(&self, id: NodeId) -> &str {
        self.kind(id).node_name()
    }

    /// Text payload of a Text node.
    pub fn node_value(&self, id: NodeId) -> Option<&str> {
        self.get(id).as_text().map(|t| t.text.as_str())
    }

    /// Canonical upper-case tag name of an element.
    pub fn tag_name(&self, id: NodeId) -> Option<&str> {
        self.element(id).map(ElementData::tag_name)
    }

    // Navigation

    pub fn parent(&self, id: NodeId) -> Option<NodeId> {
        self.get(id).parent
    }

    pub fn children(&self, id: NodeId) -> &[NodeId] {
        &self.get(id).children
    }

    pub fn element_children(&self, id: NodeId) -> Vec<NodeId> {
        self.children(id)
            .iter()
            .copied()
            .filter(|&c| self.is_element(c))
            .collect()
    }

    pub fn first_child(&self, id: NodeId) -> Option<NodeId> {
        self.children(id).first().copied()
    }

    pub fn last_child(&self, id: NodeId) -> Option<NodeId> {
        self.children(id).last().copied()
    }

    /// Position of `id` in its parent's child list.
    pub fn index_in_parent(&self, id: NodeId) -> Option<usize> {
        let parent = self.parent(id)?;
        self.children(parent).iter().position(|&c| c == id)
    }

    pub fn next_sibling(&self, id: NodeId) -> Option<NodeId> {
        let parent = self.parent(id)?;
        let index = self.index_in_parent(id)?;
        self.children(parent).get(index + 1).copied()
    }

    pub fn previous_sibling(&self, id: NodeId) -> Option<NodeId> {
        let parent = self.parent(id)?;
        let index = self.index_in_parent(id)?;
        index
            .checked_sub(1)
            .map(|i| self.children(parent)[i])
    }

    pub fn next_element_sibling(&self, id: NodeId) -> Option<NodeId> {
        let parent = self.parent(id)?;
        let index = self.index_in_parent(id)?;
        self.children(parent)[index + 1..]
            .iter()
            .copied()
            .find(|&c| self.is_element(c))
    }

    pub fn previous_element_sibling(&self, id: NodeId) -> Option<NodeId> {
        let parent = self.parent(id)?;
        let index = self.index_in_parent(id)?;
        self.children(parent)[..index]
            .iter()
            .rev()
            .copied()
            .find(|&c| self.is_element(c))
    }

    /// Iterator over the strict ancestors of `id`, nearest first.
    pub fn ancestors(&self, id: NodeId) -> impl Iterator<Item = NodeId> + '_ {
        std::iter::successors(self.parent(id), move |&p| self.parent(p))
    }

    /// Topmost ancestor, or `id` itself when detached.
    pub fn root(&self, id: NodeId) -> NodeId {
        self.ancestors(id).last().unwrap_or(id)
    }

    /// Nearest inclusive ancestor that is a document or fragment.
    pub fn owner_document(&self, id: NodeId) -> Option<NodeId> {
        std::iter::once(id)
            .chain(self.ancestors(id))
            .find(|&n| matches!(self.kind(n), NodeKind::Document { .. } | NodeKind::Fragment))
    }

    /// Whether `other` is `id` or one of its descendants.
    pub fn contains(&self, id: NodeId, other: NodeId) -> bool {
        other == id || self.ancestors(other).any(|a| a == id)
    }

    /// Elements of the subtree in document order, `id` first if it is one.
    pub fn flatten(&self, id: NodeId) -> Vec<NodeId> {
        self.flatten_nodes(id)
            .into_iter()
            .filter(|&n| self.is_element(n))
            .collect()
    }

    /// All nodes of the subtree in document order, starting with `id`.
    pub fn flatten_nodes(&self, id: NodeId) -> Vec<NodeId> {
        let mut out = Vec::new();
        let mut stack = vec![id];
        while let Some(node) = stack.pop() {
            out.push(node);
            stack.extend(self.children(node).iter().rev().copied());
        }
        out
    }

    // Mutation

    fn resolve(&mut self, content: Content, out: &mut Vec<NodeId>) {
        match content {
            Content::Node(id) => self.resolve_node(id, out),
            Content::Nodes(ids) => {
                for id in ids {
                    self.resolve_node(id, out);
                }
            }
            Content::Text(text) => {
                let id = self.create_text(text);
                out.push(id);
            }
            Content::List(items) => {
                for item in items {
                    self.resolve(item, out);
                }
            }
        }
    }

    fn resolve_node(&self, id: NodeId, out: &mut Vec<NodeId>) {
        match self.kind(id) {
            NodeKind::Fragment => out.extend_from_slice(self.children(id)),
            _ => out.push(id),
        }
    }

    fn check_insertion(&self, parent: NodeId, nodes: &[NodeId]) -> Result<(), DomError> {
        if !self.kind(parent).is_container() {
            return Err(DomError::HierarchyRequest);
        }
        if nodes.iter().any(|&n| self.contains(n, parent)) {
            return Err(DomError::HierarchyRequest);
        }
        Ok(())
    }

    /// Unlink `id` from its parent. The subtree under `id` is untouched.
    fn detach(&mut self, id: NodeId) {
        if let Some(parent) = self.get_mut(id).parent.take() {
            self.get_mut(parent).children.retain(|&c| c != id);
        }
    }

    fn splice(&mut self, parent: NodeId, index: usize, nodes: &[NodeId]) {
        let index = index.min(self.children(parent).len());
        self.get_mut(parent)
            .children
            .splice(index..index, nodes.iter().copied());
        for &n in nodes {
            self.get_mut(n).parent = Some(parent);
        }
    }

    /// Append a freshly created, parentless node.
    pub(crate) fn push_child(&mut self, parent: NodeId, child: NodeId) {
        self.get_mut(parent).children.push(child);
        self.get_mut(child).parent = Some(parent);
    }

    fn dedup(nodes: &mut Vec<NodeId>) {
        let mut seen = Vec::with_capacity(nodes.len());
        nodes.retain(|n| {
            if seen.contains(n) {
                false
            } else {
                seen.push(*n);
                true
            }
        });
    }

    /// Append `content` to `parent`, detaching nodes from any prior parent.
    ///
    /// Fails without changing anything if a node would become its own
    /// ancestor or `parent` cannot hold children.
    pub fn try_append_child(&mut self, parent: NodeId, content: impl Into<Content>) -> Result<(), DomError> {
        let mut nodes = Vec::new();
        self.resolve(content.into(), &mut nodes);
        Self::dedup(&mut nodes);
        self.check_insertion(parent, &nodes)?;
        for &n in &nodes {
            self.detach(n);
        }
        let end = self.children(parent).len();
        self.splice(parent, end, &nodes);
        Ok(())
    }

    /// Like [`Tree::try_append_child`], but a rejected insertion is logged and ignored.
    pub fn append_child(&mut self, parent: NodeId, content: impl Into<Content>) {
        if let Err(err) = self.try_append_child(parent, content) {
            warn!(parent = parent.raw(), error = %err, "append rejected");
        }
    }

    /// Insert `content` before `reference`. With no reference, or one that is
    /// not a child of `parent`, the content goes to the front.
    pub fn try_insert_before(
        &mut self,
        parent: NodeId,
        content: impl Into<Content>,
        reference: Option<NodeId>,
    ) -> Result<(), DomError> {
        let mut nodes = Vec::new();
        self.resolve(content.into(), &mut nodes);
        nodes.retain(|&n| Some(n) != reference);
        Self::dedup(&mut nodes);
        self.check_insertion(parent, &nodes)?;
        for &n in &nodes {
            self.detach(n);
        }
        let index = reference
            .filter(|&r| self.parent(r) == Some(parent))
            .and_then(|r| self.index_in_parent(r))
            .unwrap_or(0);
        self.splice(parent, index, &nodes);
        Ok(())
    }

    /// Like [`Tree::try_insert_before`], but a rejected insertion is logged and ignored.
    pub fn insert_before(&mut self, parent: NodeId, content: impl Into<Content>, reference: Option<NodeId>) {
        if let Err(err) = self.try_insert_before(parent, content, reference) {
            warn!(parent = parent.raw(), error = %err, "insert rejected");
        }
    }

    /// Detach `child` if it is a child of `parent`; otherwise do nothing.
    pub fn remove_child(&mut self, parent: NodeId, child: NodeId) {
        if self.parent(child) == Some(parent) {
            self.detach(child);
        }
    }

    /// Detach `id` from its parent, keeping its subtree.
    pub fn remove(&mut self, id: NodeId) {
        self.detach(id);
    }

    /// Replace every child of `parent` with `content`.
    pub fn replace_children(&mut self, parent: NodeId, content: impl Into<Content>) -> Result<(), DomError> {
        let mut nodes = Vec::new();
        self.resolve(content.into(), &mut nodes);
        Self::dedup(&mut nodes);
        self.check_insertion(parent, &nodes)?;
        for &n in &nodes {
            self.detach(n);
        }
        let old = std::mem::take(&mut self.get_mut(parent).children);
        for n in old {
            self.get_mut(n).parent = None;
        }
        self.splice(parent, 0, &nodes);
        Ok(())
    }

    /// Put `content` where `id` is and detach `id`. A detached `id` is left alone.
    pub fn replace_with(&mut self, id: NodeId, content: impl Into<Content>) -> Result<(), DomError> {
        let Some(parent) = self.parent(id) else {
            trace!(node = id.raw(), "replace_with on detached node");
            return Ok(());
        };
        let mut nodes = Vec::new();
        self.resolve(content.into(), &mut nodes);
        Self::dedup(&mut nodes);
        self.check_insertion(parent, &nodes)?;
        for &n in &nodes {
            if n != id {
                self.detach(n);
            }
        }
        let index = self.index_in_parent(id).unwrap_or(0);
        self.detach(id);
        self.splice(parent, index, &nodes);
        Ok(())
    }

    // Text

    /// Concatenated text of all descendant Text nodes.
    pub fn text_content(&self, id: NodeId) -> String {
        let mut out = String::new();
        for n in self.flatten_nodes(id) {
            if let Some(text) = self.get(n).as_text() {
                out.push_str(&text.text);
            }
        }
        out
    }

    /// Replace the text of a Text node, or all children of a container with a
    /// single Text node (none for an empty string).
    pub fn set_text_content(&mut self, id: NodeId, text: &str) {
        if let NodeKind::Text(data) = &mut self.get_mut(id).kind {
            data.text = text.to_string();
            return;
        }
        if !self.kind(id).is_container() {
            return;
        }
        let content = if text.is_empty() {
            Content::Nodes(Vec::new())
        } else {
            Content::Text(text.to_string())
        };
        // A fresh text node can never be an ancestor, so this cannot fail.
        let _ = self.replace_children(id, content);
    }

    /// Copy `id`. A shallow clone copies the node's own data; a deep clone
    /// copies the whole subtree. The copy is detached.
    pub fn clone_node(&mut self, id: NodeId, deep: bool) -> NodeId {
        let copy = self.copy_data(id);
        if !deep {
            return copy;
        }
        // (original, copy) pairs whose children still need copying.
        let mut pending = vec![(id, copy)];
        while let Some((source, target)) = pending.pop() {
            let children = self.children(source).to_vec();
            for child in children {
                let child_copy = self.copy_data(child);
                self.push_child(target, child_copy);
                pending.push((child, child_copy));
            }
        }
        copy
    }

    fn copy_data(&mut self, id: NodeId) -> NodeId {
        let kind = self.kind(id).clone();
        self.push(kind)
    }

    /// Record or clear the doctype marker of a document.
    pub fn set_doctype(&mut self, id: NodeId, doctype: Option<DocType>) {
        if let NodeKind::Document { doctype: slot } = &mut self.get_mut(id).kind {
            *slot = doctype;
        }
    }

    pub fn doctype(&self, id: NodeId) -> Option<&DocType> {
        match self.kind(id) {
            NodeKind::Document { doctype } => doctype.as_ref(),
            _ => None,
        }
    }
}
