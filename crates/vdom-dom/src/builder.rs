//! Tree construction from tokenizer events.
//!
//! The builder keeps a stack of open elements. There is no insertion-mode
//! machinery: an end tag closes whatever is open, whatever its name, and
//! text that fails to tokenize as markup is kept as text.

use tracing::{debug, trace};
use vdom_html::markup::{is_raw_text_element, is_void_element};
use vdom_html::{scan_with, unescape, AttrValue, Attributes, Scanner, TokenizerOptions};

use crate::node::{DocType, NodeId, NodeKind};
use crate::tree::Tree;
use crate::DomError;

/// Parser options.
#[derive(Debug, Clone, Copy)]
pub struct ParseOptions {
    /// Drop text runs that are whitespace only.
    pub ignore_whitespace_text: bool,
    /// Record `<!DOCTYPE ...>` on the document root.
    pub keep_doctype: bool,
}

impl Default for ParseOptions {
    fn default() -> Self {
        Self {
            ignore_whitespace_text: false,
            keep_doctype: true,
        }
    }
}

struct TreeBuilder<'t> {
    tree: &'t mut Tree,
    stack: Vec<NodeId>,
    keep_doctype: bool,
}

impl TreeBuilder<'_> {
    fn current(&self) -> NodeId {
        // The stack never drops below the root.
        self.stack[self.stack.len() - 1]
    }

    fn root(&self) -> NodeId {
        self.stack[0]
    }
}

impl Scanner for TreeBuilder<'_> {
    fn start_element(&mut self, name: &str, attrs: Attributes, self_closing: bool, _raw: &str) {
        if name.eq_ignore_ascii_case("!doctype") {
            if self.keep_doctype {
                self.tree.set_doctype(self.root(), Some(DocType::default()));
            }
            return;
        }

        let attrs = attrs
            .into_iter()
            .map(|(key, value)| match value {
                AttrValue::Text(text) => (key, AttrValue::Text(unescape(&text))),
                AttrValue::Present => (key, AttrValue::Present),
            })
            .collect();
        let element = self.tree.create_element_from(name, attrs);
        let parent = self.current();
        self.tree.push_child(parent, element);

        if !self_closing && !is_void_element(name) {
            self.stack.push(element);
        }
    }

    fn end_element(&mut self, name: &str) {
        if self.stack.len() > 1 {
            self.stack.pop();
        } else {
            trace!(tag = %name, "stray end tag at root");
        }
    }

    fn characters(&mut self, text: &str) {
        let parent = self.current();
        let raw_parent = self
            .tree
            .local_name(parent)
            .map_or(false, is_raw_text_element);
        let text = if raw_parent {
            text.to_string()
        } else {
            unescape(text)
        };

        if let Some(last) = self.tree.last_child(parent) {
            if let NodeKind::Text(data) = &mut self.tree.get_mut(last).kind {
                if !data.raw {
                    data.text.push_str(&text);
                    return;
                }
            }
        }
        let node = self.tree.create_text(text);
        self.tree.push_child(parent, node);
    }
}

impl Tree {
    /// Parse `html` into this tree and return the new root.
    ///
    /// The root is a document when the input starts with `<!`, otherwise a
    /// fragment. Parsing never fails.
    pub fn parse_html_with(&mut self, html: &str, options: ParseOptions) -> NodeId {
        let root = if html.starts_with("<!") {
            self.create_document()
        } else {
            self.create_fragment()
        };
        let mut builder = TreeBuilder {
            tree: self,
            stack: vec![root],
            keep_doctype: options.keep_doctype,
        };
        let tokenizer_options = TokenizerOptions {
            ignore_whitespace_text: options.ignore_whitespace_text,
        };
        scan_with(html, tokenizer_options, &mut builder);
        debug!(len = html.len(), nodes = self.len(), "parsed markup");
        root
    }

    pub fn parse_html(&mut self, html: &str) -> NodeId {
        self.parse_html_with(html, ParseOptions::default())
    }

    /// Replace the children of `id` with the nodes parsed from `html`.
    pub fn set_inner_html(&mut self, id: NodeId, html: &str) -> Result<(), DomError> {
        if !self.kind(id).is_container() {
            return Err(DomError::NotAnElement(id));
        }
        let root = self.parse_html(html);
        let nodes = self.children(root).to_vec();
        self.replace_children(id, nodes)
    }
}

/// Parse `html` into a fresh tree.
pub fn parse_html(html: &str) -> (Tree, NodeId) {
    let mut tree = Tree::new();
    let root = tree.parse_html(html);
    (tree, root)
}
