//! Whole-document rewriting helpers.

use tracing::debug;
use vdom_html::Dialect;

use crate::node::NodeId;
use crate::tree::Tree;
use crate::DomError;

/// Block-level elements that [`Tree::tidy`] puts on their own lines.
pub const BLOCK_ELEMENTS: &str = "meta,link,script,p,h1,h2,h3,h4,h5,h6,blockquote,div,ul,ol,li,\
     article,section,footer,head,body,title,nav,hr,form";

/// Subtrees whose whitespace is significant.
const KEEP_CONTENT: &[&str] = &["PRE", "CODE", "SCRIPT", "STYLE", "TT"];

/// Parse `html`, let `f` mutate the tree, and render the result back.
pub fn handle_html<F>(html: &str, f: F) -> String
where
    F: FnOnce(&mut Tree, NodeId),
{
    let mut tree = Tree::new();
    let root = tree.parse_html(html);
    f(&mut tree, root);
    tree.render(root, Dialect::Html)
}

impl Tree {
    fn indent(&self, id: NodeId) -> String {
        "  ".repeat(self.ancestors(id).count().saturating_sub(1))
    }

    fn keeps_content(&self, id: NodeId) -> bool {
        std::iter::once(id)
            .chain(self.ancestors(id))
            .any(|n| self.tag_name(n).map_or(false, |tag| KEEP_CONTENT.contains(&tag)))
    }

    fn text_matches(&self, id: Option<NodeId>, pred: impl Fn(&str) -> bool) -> bool {
        id.and_then(|n| self.node_value(n)).map_or(false, pred)
    }

    /// Re-indent block-level elements under `root` with newline and indent
    /// text nodes. Content of `pre`, `code`, `script`, `style` and `tt` is
    /// left alone.
    pub fn tidy(&mut self, root: NodeId) -> Result<(), DomError> {
        let count = self.handle(root, BLOCK_ELEMENTS, |tree, el, _| {
            if tree.keeps_content(el) {
                return;
            }
            let Some(parent) = tree.parent(el) else {
                return;
            };
            let indent = tree.indent(el);

            if !tree.text_matches(tree.previous_sibling(el), |t| t.ends_with('\n')) {
                let newline = tree.create_text("\n");
                tree.insert_before(parent, newline, Some(el));
            }
            if !indent.is_empty() {
                let pad = tree.create_text(indent.clone());
                tree.insert_before(parent, pad, Some(el));
            }

            let next = tree.next_sibling(el);
            if !tree.text_matches(next, |t| t.starts_with('\n')) {
                let newline = tree.create_text("\n");
                match next {
                    Some(next) => tree.insert_before(parent, newline, Some(next)),
                    None => tree.append_child(parent, newline),
                }
            }

            if let Some(first) = tree.first_child(el) {
                if tree.node_value(first).is_some() {
                    let lead = tree.create_text(format!("\n{indent}  "));
                    tree.insert_before(el, lead, Some(first));
                }
                let tail = tree.create_text(format!("\n{indent}"));
                tree.append_child(el, tail);
            }
        })?;
        debug!(elements = count, "tidied");
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_handle_html() {
        let html = "<!DOCTYPE html>\n<html lang=\"de\">\n  <body>\n    <p class=\"img-wrapper\"><img src=\"/a@2x.png\" alt=\"\" width=\"621\"></p>\n  </body>\n</html>\n";
        let out = handle_html(html, |tree, root| {
            let img = tree.query_selector(root, ".img-wrapper img").unwrap().unwrap();
            tree.set_attribute(img, "title", "hello").unwrap();
        });
        assert_eq!(out, html.replace("width=\"621\">", "width=\"621\" title=\"hello\">"));
    }

    #[test]
    fn test_handle_html_without_changes_round_trips() {
        let html = "<div><p>a</p></div>";
        assert_eq!(handle_html(html, |_, _| {}), html);
    }

    #[test]
    fn test_tidy() {
        let mut tree = Tree::new();
        let root = tree.parse_html("<div><p>a</p><pre><p>x</p></pre></div>");
        tree.tidy(root).unwrap();
        assert_eq!(
            tree.render(root, Dialect::Html),
            "\n<div>\n  <p>\n    a\n  </p>\n<pre><p>x</p></pre>\n</div>\n"
        );
    }
}
