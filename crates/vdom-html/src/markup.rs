//! Markup encoder.
//!
//! Turns a tag, its attributes and already-rendered children into markup in
//! either the HTML or the XML dialect.

use std::fmt;

use crate::entities::escape;
use crate::tokenizer::{AttrValue, RAW_TEXT_ELEMENTS};

/// Elements that never have children or an end tag in HTML.
pub const VOID_ELEMENTS: &[&str] = &[
    "area", "base", "br", "col", "embed", "hr", "img", "input", "keygen", "link", "meta", "param",
    "source", "track", "wbr", "command",
];

/// Check whether `tag` is a void element (any casing).
pub fn is_void_element(tag: &str) -> bool {
    VOID_ELEMENTS.iter().any(|v| v.eq_ignore_ascii_case(tag))
}

/// Check whether `tag` holds raw text (any casing).
pub fn is_raw_text_element(tag: &str) -> bool {
    RAW_TEXT_ELEMENTS.iter().any(|v| v.eq_ignore_ascii_case(tag))
}

/// Output dialect.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum Dialect {
    /// `<br>`, void elements never closed.
    #[default]
    Html,
    /// `<br />`, childless elements self-close.
    Xml,
}

impl Dialect {
    /// The declaration line a whole file in this dialect starts with.
    pub fn first_line(self) -> &'static str {
        match self {
            Dialect::Html => "<!DOCTYPE html>",
            Dialect::Xml => r#"<?xml version="1.0" encoding="utf-8"?>"#,
        }
    }
}

/// Loosely typed attribute value accepted by [`markup`] and element
/// construction.
#[derive(Debug, Clone, PartialEq)]
pub enum Value {
    Null,
    Bool(bool),
    Number(f64),
    Text(String),
    /// Property map: style declarations, or class flags.
    Map(Vec<(String, Value)>),
    List(Vec<Value>),
}

impl Value {
    pub fn is_truthy(&self) -> bool {
        match self {
            Value::Null => false,
            Value::Bool(b) => *b,
            Value::Number(n) => *n != 0.0 && !n.is_nan(),
            Value::Text(s) => !s.is_empty(),
            Value::Map(_) | Value::List(_) => true,
        }
    }

    /// Build a map value from pairs.
    pub fn map<K, V, I>(pairs: I) -> Self
    where
        K: Into<String>,
        V: Into<Value>,
        I: IntoIterator<Item = (K, V)>,
    {
        Value::Map(pairs.into_iter().map(|(k, v)| (k.into(), v.into())).collect())
    }
}

impl fmt::Display for Value {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Value::Null => Ok(()),
            Value::Bool(b) => write!(f, "{b}"),
            Value::Number(n) => write!(f, "{n}"),
            Value::Text(s) => f.write_str(s),
            Value::Map(_) => f.write_str("[object]"),
            Value::List(items) => {
                for (i, item) in items.iter().enumerate() {
                    if i > 0 {
                        f.write_str(",")?;
                    }
                    write!(f, "{item}")?;
                }
                Ok(())
            }
        }
    }
}

impl From<&str> for Value {
    fn from(s: &str) -> Self {
        Value::Text(s.to_string())
    }
}

impl From<String> for Value {
    fn from(s: String) -> Self {
        Value::Text(s)
    }
}

impl From<bool> for Value {
    fn from(b: bool) -> Self {
        Value::Bool(b)
    }
}

impl From<f64> for Value {
    fn from(n: f64) -> Self {
        Value::Number(n)
    }
}

impl From<i32> for Value {
    fn from(n: i32) -> Self {
        Value::Number(f64::from(n))
    }
}

impl<T: Into<Value>> From<Option<T>> for Value {
    fn from(v: Option<T>) -> Self {
        v.map_or(Value::Null, Into::into)
    }
}

impl From<&AttrValue> for Value {
    fn from(v: &AttrValue) -> Self {
        match v {
            AttrValue::Text(s) => Value::Text(s.clone()),
            AttrValue::Present => Value::Bool(true),
        }
    }
}

/// A rendered child passed to the encoder.
#[derive(Debug, Clone, Copy)]
pub enum Child<'a> {
    /// Plain text, escaped unless the tag holds raw text.
    Text(&'a str),
    /// Already-serialized markup, emitted verbatim.
    Markup(&'a str),
}

/// Format a style property map as `key:value;key:value`.
///
/// Null entries are dropped, numbers get a `px` suffix and camel-case keys
/// become hyphenated. Returns `None` when nothing is left.
pub fn format_style(props: &[(String, Value)]) -> Option<String> {
    let parts: Vec<String> = props
        .iter()
        .filter(|(_, v)| !matches!(v, Value::Null | Value::Bool(false)))
        .map(|(k, v)| match v {
            Value::Number(n) => format!("{}:{n}px", hyphenate(k)),
            other => format!("{}:{other}", hyphenate(k)),
        })
        .collect();
    (!parts.is_empty()).then(|| parts.join(";"))
}

/// `backgroundColor` to `background-color`.
pub fn hyphenate(name: &str) -> String {
    let mut out = String::with_capacity(name.len() + 4);
    for ch in name.chars() {
        if ch.is_ascii_uppercase() {
            out.push('-');
            out.push(ch.to_ascii_lowercase());
        } else {
            out.push(ch);
        }
    }
    out
}

/// Fold a class value (string, flag map or list) into a class string.
pub fn format_class(value: &Value) -> Option<String> {
    let names: Vec<String> = match value {
        Value::Map(flags) => flags
            .iter()
            .filter(|(_, on)| on.is_truthy())
            .map(|(name, _)| name.clone())
            .collect(),
        Value::List(items) => items
            .iter()
            .filter(|v| v.is_truthy())
            .map(|v| v.to_string())
            .collect(),
        Value::Text(s) => s.split_whitespace().map(str::to_string).collect(),
        Value::Number(_) => vec![value.to_string()],
        Value::Null | Value::Bool(_) => Vec::new(),
    };
    (!names.is_empty()).then(|| names.join(" "))
}

/// Whether `name` addresses the class attribute (`class`, `className`, ...).
pub fn is_class_name(name: &str) -> bool {
    name.eq_ignore_ascii_case("class") || name.eq_ignore_ascii_case("classname")
}

/// Normalize one attribute for output.
///
/// The outer `None` omits the attribute; `Some(None)` renders a bare name.
pub fn normalize_attribute(name: &str, value: &Value) -> Option<Option<String>> {
    match value {
        Value::Null | Value::Bool(false) => None,
        Value::Bool(true) => Some(None),
        _ if is_class_name(name) => format_class(value).map(Some),
        Value::Map(props) if name.eq_ignore_ascii_case("style") => format_style(props).map(Some),
        Value::Map(_) => {
            tracing::debug!(attribute = name, "dropping map value on attribute");
            None
        }
        Value::List(items) => Some(Some(
            items
                .iter()
                .map(|v| v.to_string())
                .collect::<Vec<_>>()
                .join(" "),
        )),
        other => Some(Some(other.to_string())),
    }
}

fn output_name(name: &str) -> String {
    if is_class_name(name) {
        "class".to_string()
    } else {
        name.replace("__", ":")
    }
}

/// The text an element contributes around its children.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ElementFrame {
    pub open: String,
    pub close: String,
    /// Whether children are emitted at all (false for HTML void tags and
    /// XML self-closing tags).
    pub emit_children: bool,
    /// Whether Text children go out verbatim.
    pub raw_children: bool,
}

/// Split an element into the markup before and after its children, so
/// callers walking a tree can stream the children in between.
pub fn element_frame(
    dialect: Dialect,
    tag: &str,
    attrs: &[(&str, Option<&str>)],
    has_children: bool,
) -> ElementFrame {
    let lower = tag.to_ascii_lowercase();
    if lower == "cdata" {
        return ElementFrame {
            open: "<![CDATA[".to_string(),
            close: "]]>".to_string(),
            emit_children: true,
            raw_children: true,
        };
    }
    if lower.is_empty() || lower == "noop" || lower == "fragment" {
        return ElementFrame {
            open: String::new(),
            close: String::new(),
            emit_children: true,
            raw_children: false,
        };
    }

    let tag_name = tag.replace("__", ":");
    let mut open = String::new();
    open.push('<');
    open.push_str(&tag_name);
    for (name, value) in attrs {
        open.push(' ');
        open.push_str(&output_name(name));
        if let Some(v) = value {
            open.push_str("=\"");
            open.push_str(&escape(v));
            open.push('"');
        }
    }

    if dialect == Dialect::Xml && !has_children {
        open.push_str(" />");
        return ElementFrame {
            open,
            close: String::new(),
            emit_children: false,
            raw_children: false,
        };
    }
    open.push('>');
    if dialect == Dialect::Html && is_void_element(&lower) {
        return ElementFrame {
            open,
            close: String::new(),
            emit_children: false,
            raw_children: false,
        };
    }

    ElementFrame {
        open,
        close: format!("</{tag_name}>"),
        emit_children: true,
        raw_children: is_raw_text_element(&lower),
    }
}

/// Render an element from normalized attributes (`None` value means bare).
pub fn render_element(
    dialect: Dialect,
    tag: &str,
    attrs: &[(&str, Option<&str>)],
    children: &[Child<'_>],
) -> String {
    let frame = element_frame(dialect, tag, attrs, !children.is_empty());
    let mut out = frame.open;
    if frame.emit_children {
        push_children(&mut out, children, frame.raw_children);
    }
    out.push_str(&frame.close);
    out
}

fn push_children(out: &mut String, children: &[Child<'_>], raw: bool) {
    for child in children {
        match child {
            Child::Text(text) if !raw => out.push_str(&escape(text)),
            Child::Text(text) | Child::Markup(text) => out.push_str(text),
        }
    }
}

/// Encode a tag with loosely typed attributes and rendered children.
pub fn markup(
    dialect: Dialect,
    tag: &str,
    attrs: &[(String, Value)],
    children: &[Child<'_>],
) -> String {
    let normalized: Vec<(&str, Option<String>)> = attrs
        .iter()
        .filter_map(|(name, value)| normalize_attribute(name, value).map(|v| (name.as_str(), v)))
        .collect();
    let borrowed: Vec<(&str, Option<&str>)> = normalized
        .iter()
        .map(|(name, value)| (*name, value.as_deref()))
        .collect();
    render_element(dialect, tag, &borrowed, children)
}
