//! Inline style projection.
//!
//! Parses a `style` attribute into a flat property map. There is no cascade:
//! the map holds the tag's built-in presentation defaults overridden by the
//! element's own declarations.

use smallvec::SmallVec;

const BOLD: &[(&str, &str)] = &[("font-weight", "bold")];
const ITALIC: &[(&str, &str)] = &[("font-style", "italic")];
const MARKED: &[(&str, &str)] = &[("background-color", "rgb(255, 250, 165)")];
const UNDERLINE: &[(&str, &str)] = &[("text-decoration", "underline")];
const STRIKE: &[(&str, &str)] = &[("text-decoration", "line-through")];

fn tag_defaults(tag: &str) -> &'static [(&'static str, &'static str)] {
    match tag.to_ascii_lowercase().as_str() {
        "b" | "strong" => BOLD,
        "i" | "em" => ITALIC,
        "mark" | "ins" => MARKED,
        "u" | "a" => UNDERLINE,
        "s" | "del" | "strike" => STRIKE,
        _ => &[],
    }
}

/// `font-size` to `fontSize`.
pub fn camel_case(name: &str) -> String {
    let mut out = String::with_capacity(name.len());
    let mut upper_next = false;
    for ch in name.chars() {
        if ch.is_ascii_alphanumeric() {
            if upper_next && !out.is_empty() {
                out.push(ch.to_ascii_uppercase());
            } else {
                out.push(ch.to_ascii_lowercase());
            }
            upper_next = false;
        } else {
            upper_next = true;
        }
    }
    out
}

fn is_property_name(name: &str) -> bool {
    !name.is_empty() && name.chars().all(|c| c.is_alphanumeric() || c == '_' || c == '-')
}

/// Flat style property map.
///
/// Properties are kept in declaration order under their hyphenated name and
/// can be read back by either the hyphenated or the camel-case name.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct StyleMap {
    entries: SmallVec<[(String, String); 4]>,
}

impl StyleMap {
    pub fn new() -> Self {
        Self::default()
    }

    /// Parse `prop: value; prop: value` declarations.
    pub fn parse(text: &str) -> Self {
        let mut map = Self::new();
        map.extend_from_declarations(text);
        map
    }

    /// The projection for an element: tag defaults, then its `style` attribute.
    pub fn for_element(tag: &str, style_attribute: Option<&str>) -> Self {
        let mut map = Self::new();
        for (name, value) in tag_defaults(tag) {
            map.set(name, value);
        }
        if let Some(text) = style_attribute {
            map.extend_from_declarations(text);
        }
        map
    }

    fn extend_from_declarations(&mut self, text: &str) {
        for declaration in text.split(';') {
            let Some((name, value)) = declaration.split_once(':') else {
                continue;
            };
            let name = name.trim();
            let value = value.trim();
            if is_property_name(name) && !value.is_empty() {
                self.set(name, value);
            }
        }
    }

    /// Set a property; `fontSize` and `font-size` address the same entry.
    pub fn set(&mut self, name: &str, value: &str) {
        let key = hyphenated(name);
        match self.entries.iter_mut().find(|(k, _)| *k == key) {
            Some(entry) => entry.1 = value.to_string(),
            None => self.entries.push((key, value.to_string())),
        }
    }

    /// Look a property up by hyphenated or camel-case name.
    pub fn get(&self, name: &str) -> Option<&str> {
        let key = hyphenated(name);
        self.entries
            .iter()
            .find(|(k, _)| *k == key)
            .map(|(_, v)| v.as_str())
    }

    pub fn remove(&mut self, name: &str) -> Option<String> {
        let key = hyphenated(name);
        let index = self.entries.iter().position(|(k, _)| *k == key)?;
        Some(self.entries.remove(index).1)
    }

    /// Properties in declaration order, hyphenated.
    pub fn iter(&self) -> impl Iterator<Item = (&str, &str)> {
        self.entries.iter().map(|(k, v)| (k.as_str(), v.as_str()))
    }

    /// Every property under both its hyphenated and camel-case key.
    pub fn both_forms(&self) -> Vec<(String, String)> {
        let mut out = Vec::with_capacity(self.entries.len() * 2);
        for (key, value) in &self.entries {
            out.push((key.clone(), value.clone()));
            let camel = camel_case(key);
            if camel != *key {
                out.push((camel, value.clone()));
            }
        }
        out
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// Serialize back to `prop:value;prop:value`.
    pub fn to_css_text(&self) -> String {
        self.entries
            .iter()
            .map(|(k, v)| format!("{k}:{v}"))
            .collect::<Vec<_>>()
            .join(";")
    }
}

fn hyphenated(name: &str) -> String {
    let mut out = String::with_capacity(name.len() + 2);
    for ch in name.trim().chars() {
        if ch.is_ascii_uppercase() {
            out.push('-');
            out.push(ch.to_ascii_lowercase());
        } else {
            out.push(ch);
        }
    }
    out
}
