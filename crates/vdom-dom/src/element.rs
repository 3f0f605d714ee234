//! Element attributes, class list and style access.

use tracing::debug;
use vdom_css::StyleMap;
use vdom_html::markup::{format_class, is_class_name, normalize_attribute, Value};
use vdom_html::AttrValue;

use crate::node::{ElementData, NodeId};
use crate::tree::Tree;
use crate::DomError;

/// Normalize a construction-time value into a stored attribute, or `None`
/// when the attribute should be absent.
fn to_attr_value(name: &str, value: &Value) -> Option<AttrValue> {
    normalize_attribute(name, value).map(|v| match v {
        Some(text) => AttrValue::Text(text),
        None => AttrValue::Present,
    })
}

/// Name an attribute is kept under; `className` variants become `class`.
pub(crate) fn stored_name(name: &str) -> &str {
    if is_class_name(name) {
        "class"
    } else {
        name
    }
}

impl Tree {
    /// Create an element from loosely typed attributes.
    ///
    /// `Null` and `false` values are omitted, `true` makes a bare attribute,
    /// class maps and lists fold into a class string and style maps are
    /// formatted as declarations.
    pub fn create_element_with<K, V, I>(&mut self, tag: &str, attrs: I) -> NodeId
    where
        K: AsRef<str>,
        V: Into<Value>,
        I: IntoIterator<Item = (K, V)>,
    {
        let attrs = attrs
            .into_iter()
            .filter_map(|(name, value)| {
                let name = name.as_ref();
                to_attr_value(name, &value.into()).map(|v| (stored_name(name).to_string(), v))
            })
            .collect();
        self.create_element_from(tag, attrs)
    }

    fn require_element(&self, id: NodeId) -> Result<&ElementData, DomError> {
        self.element(id).ok_or(DomError::NotAnElement(id))
    }

    fn require_element_mut(&mut self, id: NodeId) -> Result<&mut ElementData, DomError> {
        self.element_mut(id).ok_or(DomError::NotAnElement(id))
    }

    /// Attribute value, looked up case-insensitively. Bare attributes read as `""`.
    pub fn get_attribute(&self, id: NodeId, name: &str) -> Option<&str> {
        self.element(id)?.get_attribute(name)
    }

    pub fn has_attribute(&self, id: NodeId, name: &str) -> bool {
        self.element(id).map_or(false, |el| el.has_attribute(name))
    }

    pub fn attributes(&self, id: NodeId) -> &[(String, AttrValue)] {
        self.element(id)
            .map(ElementData::attributes)
            .unwrap_or_default()
    }

    /// Set an attribute from a loosely typed value. `Null` or `false` removes
    /// it and `true` makes it bare.
    pub fn set_attribute(&mut self, id: NodeId, name: &str, value: impl Into<Value>) -> Result<(), DomError> {
        let value = value.into();
        let el = self.require_element_mut(id)?;
        match to_attr_value(name, &value) {
            Some(v) => el.set_attribute(stored_name(name), v),
            None => {
                el.remove_attribute(stored_name(name));
            }
        }
        Ok(())
    }

    pub fn remove_attribute(&mut self, id: NodeId, name: &str) -> Option<AttrValue> {
        self.element_mut(id)?.remove_attribute(name)
    }

    pub fn id(&self, id: NodeId) -> Option<&str> {
        self.get_attribute(id, "id").filter(|v| !v.is_empty())
    }

    /// Set or, with `None`, remove the `id` attribute.
    pub fn set_id(&mut self, id: NodeId, value: Option<&str>) -> Result<(), DomError> {
        self.set_attribute(id, "id", value)
    }

    pub fn src(&self, id: NodeId) -> Option<&str> {
        self.get_attribute(id, "src")
    }

    /// The class attribute, or `""`.
    pub fn class_name(&self, id: NodeId) -> &str {
        self.get_attribute(id, "class").unwrap_or("")
    }

    /// Set the class attribute from a string, list or flag map.
    pub fn set_class_name(&mut self, id: NodeId, value: impl Into<Value>) -> Result<(), DomError> {
        let value = value.into();
        let el = self.require_element_mut(id)?;
        let text = format_class(&value).unwrap_or_default();
        el.set_attribute("class", AttrValue::Text(text));
        Ok(())
    }

    pub fn has_class(&self, id: NodeId, class: &str) -> bool {
        self.class_name(id).split_whitespace().any(|c| c == class)
    }

    /// Mutable handle over the element's space-delimited class attribute.
    pub fn class_list(&mut self, id: NodeId) -> Result<ClassList<'_>, DomError> {
        self.require_element(id)?;
        Ok(ClassList { tree: self, id })
    }

    /// Inline style projection: tag defaults overridden by the `style` attribute.
    pub fn style(&self, id: NodeId) -> Option<&StyleMap> {
        self.element(id).map(ElementData::style)
    }

    /// Original-case tag of an element.
    pub fn local_name(&self, id: NodeId) -> Option<&str> {
        self.element(id).map(ElementData::local_name)
    }
}

/// Class list handle returned by [`Tree::class_list`].
#[derive(Debug)]
pub struct ClassList<'a> {
    tree: &'a mut Tree,
    id: NodeId,
}

impl ClassList<'_> {
    fn names(&self) -> Vec<String> {
        self.tree
            .class_name(self.id)
            .split_whitespace()
            .map(str::to_string)
            .collect()
    }

    fn store(&mut self, names: &[String]) {
        let class = names.join(" ");
        debug!(node = self.id.raw(), class = %class, "class list updated");
        if let Some(el) = self.tree.element_mut(self.id) {
            el.set_attribute("class", AttrValue::Text(class));
        }
    }

    pub fn contains(&self, class: &str) -> bool {
        self.tree.has_class(self.id, class)
    }

    /// Add `class` unless present.
    pub fn add(&mut self, class: &str) {
        let mut names = self.names();
        if !names.iter().any(|n| n == class) {
            names.push(class.to_string());
            self.store(&names);
        }
    }

    /// Remove `class` if present.
    pub fn remove(&mut self, class: &str) {
        let mut names = self.names();
        let before = names.len();
        names.retain(|n| n != class);
        if names.len() != before {
            self.store(&names);
        }
    }

    /// Flip `class`; returns whether it is now present.
    pub fn toggle(&mut self, class: &str) -> bool {
        if self.contains(class) {
            self.remove(class);
            false
        } else {
            self.add(class);
            true
        }
    }

    pub fn iter(&self) -> std::vec::IntoIter<String> {
        self.names().into_iter()
    }

    pub fn len(&self) -> usize {
        self.names().len()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_create_element_with_shorthands() {
        let mut tree = Tree::new();
        let el = tree.create_element_with(
            "input",
            vec![
                ("disabled", Value::Bool(true)),
                ("checked", Value::Bool(false)),
                ("value", Value::Null),
                ("size", Value::from(10)),
                (
                    "className",
                    Value::map(vec![
                        ("-active", Value::Bool(true)),
                        ("foo", Value::from("bar")),
                        ("bar", Value::from("")),
                        ("hidden", Value::Null),
                    ]),
                ),
            ],
        );
        assert_eq!(tree.get_attribute(el, "disabled"), Some(""));
        assert!(!tree.has_attribute(el, "checked"));
        assert!(!tree.has_attribute(el, "value"));
        assert_eq!(tree.get_attribute(el, "size"), Some("10"));
        assert_eq!(tree.class_name(el), "-active foo");
    }

    #[test]
    fn test_set_attribute_values() {
        let mut tree = Tree::new();
        let el = tree.create_element("div");
        tree.set_attribute(el, "Title", "hello").unwrap();
        assert_eq!(tree.get_attribute(el, "title"), Some("hello"));
        assert_eq!(tree.attributes(el)[0].0, "Title");

        tree.set_attribute(el, "title", false).unwrap();
        assert!(!tree.has_attribute(el, "Title"));

        tree.set_id(el, Some("main")).unwrap();
        assert_eq!(tree.id(el), Some("main"));
        tree.set_id(el, None).unwrap();
        assert_eq!(tree.id(el), None);

        let text = tree.create_text("x");
        assert!(matches!(
            tree.set_attribute(text, "a", "b"),
            Err(DomError::NotAnElement(_))
        ));
        assert_eq!(tree.get_attribute(text, "a"), None);
    }

    #[test]
    fn test_class_list() {
        let mut tree = Tree::new();
        let el = tree.create_element_with("p", [("class", "a  b")]);
        {
            let mut list = tree.class_list(el).unwrap();
            assert!(list.contains("a"));
            list.add("c");
            list.add("a");
            list.remove("b");
            assert!(!list.toggle("a"));
            assert!(list.toggle("d"));
            assert_eq!(list.iter().collect::<Vec<_>>(), vec!["c", "d"]);
        }
        assert_eq!(tree.class_name(el), "c d");

        tree.set_class_name(el, Value::List(vec!["x".into(), Value::Null, "y".into()]))
            .unwrap();
        assert_eq!(tree.class_name(el), "x y");
    }

    #[test]
    fn test_style_projection() {
        let mut tree = Tree::new();
        let el = tree.create_element_with(
            "strong",
            [(
                "style",
                Value::map(vec![("fontSize", Value::from(12)), ("color", Value::from("red"))]),
            )],
        );
        assert_eq!(tree.get_attribute(el, "style"), Some("font-size:12px;color:red"));
        let style = tree.style(el).unwrap();
        assert_eq!(style.get("fontSize"), Some("12px"));
        assert_eq!(style.get("font-weight"), Some("bold"));

        tree.set_attribute(el, "style", "color: blue").unwrap();
        assert_eq!(tree.style(el).unwrap().get("color"), Some("blue"));
        assert!(tree.style(el).unwrap().get("font-size").is_none());
    }
}
