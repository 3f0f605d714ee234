//! Node storage types.

use std::cell::OnceCell;

use vdom_css::StyleMap;
use vdom_html::AttrValue;

pub const ELEMENT_NODE: u16 = 1;
pub const TEXT_NODE: u16 = 3;
pub const DOCUMENT_NODE: u16 = 9;
pub const DOCUMENT_TYPE_NODE: u16 = 10;
pub const DOCUMENT_FRAGMENT_NODE: u16 = 11;

/// Unique identifier for a node within its [`Tree`](crate::Tree).
///
/// Handles are only minted by the tree that owns the node and stay valid for
/// the tree's lifetime; detached nodes keep their handle.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct NodeId(usize);

impl NodeId {
    pub(crate) fn new(id: usize) -> Self {
        Self(id)
    }

    /// Get the raw ID value.
    pub fn raw(&self) -> usize {
        self.0
    }
}

/// The `<!DOCTYPE html>` marker.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DocType {
    pub name: String,
}

impl Default for DocType {
    fn default() -> Self {
        Self {
            name: "html".to_string(),
        }
    }
}

/// Text payload. `raw` text is already-serialized markup and is never escaped.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TextData {
    pub text: String,
    pub raw: bool,
}

/// Element payload.
#[derive(Debug, Clone)]
pub struct ElementData {
    local_name: String,
    tag_name: String,
    attrs: Vec<(String, AttrValue)>,
    style: OnceCell<StyleMap>,
}

impl ElementData {
    pub fn new(tag: &str) -> Self {
        Self {
            local_name: tag.to_string(),
            tag_name: tag.to_uppercase(),
            attrs: Vec::new(),
            style: OnceCell::new(),
        }
    }

    /// The tag as written.
    pub fn local_name(&self) -> &str {
        &self.local_name
    }

    /// Canonical upper-case tag name.
    pub fn tag_name(&self) -> &str {
        &self.tag_name
    }

    pub fn attributes(&self) -> &[(String, AttrValue)] {
        &self.attrs
    }

    fn position(&self, name: &str) -> Option<usize> {
        self.attrs
            .iter()
            .position(|(k, _)| k.eq_ignore_ascii_case(name))
    }

    /// Case-insensitive lookup of the raw value.
    pub fn attribute_value(&self, name: &str) -> Option<&AttrValue> {
        self.position(name).map(|i| &self.attrs[i].1)
    }

    /// Case-insensitive lookup; a bare attribute reads as `""`.
    pub fn get_attribute(&self, name: &str) -> Option<&str> {
        self.attribute_value(name).map(AttrValue::as_str)
    }

    pub fn has_attribute(&self, name: &str) -> bool {
        self.position(name).is_some()
    }

    /// Set an attribute. An existing entry keeps its position but takes the
    /// name casing of this write.
    pub fn set_attribute(&mut self, name: &str, value: AttrValue) {
        self.style.take();
        match self.position(name) {
            Some(i) => self.attrs[i] = (name.to_string(), value),
            None => self.attrs.push((name.to_string(), value)),
        }
    }

    pub fn remove_attribute(&mut self, name: &str) -> Option<AttrValue> {
        let index = self.position(name)?;
        self.style.take();
        Some(self.attrs.remove(index).1)
    }

    /// Style projection, computed on first use after the last attribute write.
    pub fn style(&self) -> &StyleMap {
        self.style
            .get_or_init(|| StyleMap::for_element(&self.local_name, self.get_attribute("style")))
    }
}

impl PartialEq for ElementData {
    fn eq(&self, other: &Self) -> bool {
        self.local_name == other.local_name && self.attrs == other.attrs
    }
}

/// Node kind and its payload.
#[derive(Debug, Clone, PartialEq)]
pub enum NodeKind {
    Document { doctype: Option<DocType> },
    Fragment,
    Element(ElementData),
    Text(TextData),
    DocType(DocType),
}

impl NodeKind {
    pub fn node_type(&self) -> u16 {
        match self {
            NodeKind::Document { .. } => DOCUMENT_NODE,
            NodeKind::Fragment => DOCUMENT_FRAGMENT_NODE,
            NodeKind::Element(_) => ELEMENT_NODE,
            NodeKind::Text(_) => TEXT_NODE,
            NodeKind::DocType(_) => DOCUMENT_TYPE_NODE,
        }
    }

    /// `#document`, `#text`, a doctype's name or the upper-case tag.
    pub fn node_name(&self) -> &str {
        match self {
            NodeKind::Document { .. } => "#document",
            NodeKind::Fragment => "#document-fragment",
            NodeKind::Element(el) => el.tag_name(),
            NodeKind::Text(_) => "#text",
            NodeKind::DocType(doctype) => &doctype.name,
        }
    }

    /// Whether this kind holds children (documents, fragments and elements).
    pub fn is_container(&self) -> bool {
        matches!(
            self,
            NodeKind::Document { .. } | NodeKind::Fragment | NodeKind::Element(_)
        )
    }
}

/// A slot in the arena.
#[derive(Debug, Clone)]
pub struct NodeData {
    pub kind: NodeKind,
    pub(crate) parent: Option<NodeId>,
    pub(crate) children: Vec<NodeId>,
}

impl NodeData {
    pub(crate) fn new(kind: NodeKind) -> Self {
        Self {
            kind,
            parent: None,
            children: Vec::new(),
        }
    }

    pub fn parent(&self) -> Option<NodeId> {
        self.parent
    }

    pub fn children(&self) -> &[NodeId] {
        &self.children
    }

    pub fn as_element(&self) -> Option<&ElementData> {
        match &self.kind {
            NodeKind::Element(el) => Some(el),
            _ => None,
        }
    }

    pub fn as_text(&self) -> Option<&TextData> {
        match &self.kind {
            NodeKind::Text(text) => Some(text),
            _ => None,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_attribute_lookup_is_case_insensitive() {
        let mut el = ElementData::new("Div");
        assert_eq!(el.tag_name(), "DIV");
        assert_eq!(el.local_name(), "Div");

        el.set_attribute("dataId", AttrValue::Text("1".into()));
        el.set_attribute("hidden", AttrValue::Present);
        assert_eq!(el.get_attribute("DATAID"), Some("1"));
        assert_eq!(el.get_attribute("hidden"), Some(""));
        assert!(el.get_attribute("missing").is_none());

        el.set_attribute("DATAID", AttrValue::Text("2".into()));
        assert_eq!(el.attributes()[0].0, "DATAID");
        assert_eq!(el.attributes().len(), 2);

        assert_eq!(el.remove_attribute("dataid"), Some(AttrValue::Text("2".into())));
        assert!(!el.has_attribute("dataId"));
    }

    #[test]
    fn test_style_is_invalidated_by_writes() {
        let mut el = ElementData::new("b");
        assert_eq!(el.style().get("font-weight"), Some("bold"));

        el.set_attribute("style", AttrValue::Text("font-weight: 200; color: red".into()));
        assert_eq!(el.style().get("fontWeight"), Some("200"));
        assert_eq!(el.style().get("color"), Some("red"));

        el.remove_attribute("style");
        assert_eq!(el.style().get("font-weight"), Some("bold"));
        assert!(el.style().get("color").is_none());
    }

    #[test]
    fn test_node_names() {
        assert_eq!(NodeKind::Fragment.node_name(), "#document-fragment");
        assert_eq!(NodeKind::DocType(DocType::default()).node_name(), "html");
        assert_eq!(NodeKind::Document { doctype: None }.node_type(), DOCUMENT_NODE);
        assert!(!NodeKind::DocType(DocType::default()).is_container());
    }
}
