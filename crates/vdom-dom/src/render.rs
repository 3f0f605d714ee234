//! Serialization of (sub)trees back to markup.
//!
//! The walk keeps its own stack, so nesting depth is bounded by memory
//! rather than by the thread's stack.

use vdom_html::markup::{element_frame, is_raw_text_element, Dialect};
use vdom_html::{escape, AttrValue};

use crate::node::{NodeId, NodeKind};
use crate::tree::Tree;

const DOCTYPE: &str = "<!DOCTYPE html>";

enum Step {
    /// Render a node; the flag marks Text that goes out verbatim.
    Node(NodeId, bool),
    /// Closing markup of an element whose children were all emitted.
    Close(String),
}

impl Tree {
    /// Serialize `id` and its subtree.
    ///
    /// Documents with a recorded doctype start with `<!DOCTYPE html>`.
    pub fn render(&self, id: NodeId, dialect: Dialect) -> String {
        let mut out = String::new();
        let raw = self.parent_holds_raw_text(id);
        self.render_into(&mut out, vec![Step::Node(id, raw)], dialect);
        out
    }

    fn render_children(&self, id: NodeId, dialect: Dialect) -> String {
        let raw = self.local_name(id).map_or(false, holds_raw_text);
        let mut out = String::new();
        let stack = self.children(id).iter().rev().map(|&c| Step::Node(c, raw)).collect();
        self.render_into(&mut out, stack, dialect);
        out
    }

    fn render_into(&self, out: &mut String, mut stack: Vec<Step>, dialect: Dialect) {
        let push_children = |stack: &mut Vec<Step>, id: NodeId, raw: bool| {
            stack.extend(self.children(id).iter().rev().map(|&c| Step::Node(c, raw)));
        };

        while let Some(step) = stack.pop() {
            let (id, raw) = match step {
                Step::Close(close) => {
                    out.push_str(&close);
                    continue;
                }
                Step::Node(id, raw) => (id, raw),
            };
            match self.kind(id) {
                NodeKind::Document { doctype } => {
                    if doctype.is_some() {
                        out.push_str(DOCTYPE);
                    }
                    push_children(&mut stack, id, false);
                }
                NodeKind::Fragment => push_children(&mut stack, id, false),
                NodeKind::DocType(_) => out.push_str(DOCTYPE),
                NodeKind::Text(text) if text.raw || raw => out.push_str(&text.text),
                NodeKind::Text(text) => out.push_str(&escape(&text.text)),
                NodeKind::Element(el) => {
                    let attrs: Vec<(&str, Option<&str>)> = el
                        .attributes()
                        .iter()
                        .map(|(name, value)| match value {
                            AttrValue::Text(text) => (name.as_str(), Some(text.as_str())),
                            AttrValue::Present => (name.as_str(), None),
                        })
                        .collect();
                    let has_children = !self.children(id).is_empty();
                    let frame = element_frame(dialect, el.local_name(), &attrs, has_children);
                    out.push_str(&frame.open);
                    if frame.emit_children {
                        stack.push(Step::Close(frame.close));
                        push_children(&mut stack, id, frame.raw_children);
                    } else {
                        out.push_str(&frame.close);
                    }
                }
            }
        }
    }

    fn parent_holds_raw_text(&self, id: NodeId) -> bool {
        self.parent(id)
            .and_then(|p| self.local_name(p))
            .map_or(false, holds_raw_text)
    }

    /// The children of `id` rendered as HTML.
    pub fn inner_html(&self, id: NodeId) -> String {
        self.render_children(id, Dialect::Html)
    }

    /// `id` itself rendered as HTML.
    pub fn outer_html(&self, id: NodeId) -> String {
        self.render(id, Dialect::Html)
    }
}

fn holds_raw_text(tag: &str) -> bool {
    is_raw_text_element(tag) || tag.eq_ignore_ascii_case("cdata")
}
