//! # vdom DOM
//!
//! Arena-backed node model for the vdom engine.
//!
//! A [`Tree`] owns every node; callers hold [`NodeId`] handles. Markup is
//! parsed with a tolerant tree builder on top of the `vdom-html` tokenizer,
//! queried with CSS selectors through `vdom-css`, mutated with DOM-like
//! operations and rendered back to HTML or XML.
//!
//! ```
//! use vdom_dom::{parse_html, Dialect};
//!
//! let (mut tree, root) = parse_html("<ul><li>a</li><li>b</li></ul>");
//! let second = tree.query_selector(root, "li + li").unwrap().unwrap();
//! tree.set_attribute(second, "class", "last").unwrap();
//! assert_eq!(
//!     tree.render(root, Dialect::Html),
//!     r#"<ul><li>a</li><li class="last">b</li></ul>"#
//! );
//! ```

pub mod builder;
pub mod document;
pub mod element;
pub mod manipulate;
pub mod node;
pub mod query;
pub mod render;
pub mod tree;

pub use builder::{parse_html, ParseOptions};
pub use element::ClassList;
pub use manipulate::{handle_html, BLOCK_ELEMENTS};
pub use node::{
    DocType, ElementData, NodeData, NodeId, NodeKind, TextData, DOCUMENT_FRAGMENT_NODE, DOCUMENT_NODE,
    DOCUMENT_TYPE_NODE, ELEMENT_NODE, TEXT_NODE,
};
pub use query::NodeRef;
pub use tree::{Content, Tree};
pub use vdom_css::StyleMap;
pub use vdom_cssparser::SelectorError;
pub use vdom_html::{AttrValue, Dialect, Value};

use thiserror::Error;

/// Errors that can occur in DOM operations.
#[derive(Error, Debug, Clone, PartialEq)]
pub enum DomError {
    #[error("Invalid selector: {0}")]
    Selector(#[from] SelectorError),

    #[error("Node {} is not an element", .0.raw())]
    NotAnElement(NodeId),

    #[error("Node cannot be inserted at this position")]
    HierarchyRequest,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_tree_is_send() {
        fn assert_send<T: Send>() {}
        assert_send::<Tree>();
    }

    #[test]
    fn test_error_display() {
        let err = DomError::from(SelectorError::DanglingCombinator);
        assert!(err.to_string().starts_with("Invalid selector"));
        assert_eq!(
            DomError::NotAnElement(NodeId::new(3)).to_string(),
            "Node 3 is not an element"
        );
    }

    #[test]
    fn test_parse_query_mutate_render() {
        let (mut tree, root) = parse_html("<div><p class=a>One</p><p>Two</p></div>");
        let paragraphs = tree.query_selector_all(root, "div > p").unwrap();
        assert_eq!(paragraphs.len(), 2);

        let extra = tree.create_element_with("p", [("hidden", true)]);
        tree.append_child(extra, "Three");
        let div = tree.children(root)[0];
        tree.insert_before(div, extra, Some(paragraphs[1]));
        tree.remove(paragraphs[0]);

        assert_eq!(
            tree.render(root, Dialect::Html),
            "<div><p hidden>Three</p><p>Two</p></div>"
        );
        assert_eq!(tree.render(paragraphs[0], Dialect::Html), r#"<p class="a">One</p>"#);
    }
}
