//! HTML document helpers.

use crate::node::{DocType, NodeId};
use crate::tree::Tree;

impl Tree {
    /// `<!DOCTYPE html><html><head><title></title></head><body></body></html>`
    pub fn create_html_document(&mut self) -> NodeId {
        let doc = self.create_document();
        self.set_doctype(doc, Some(DocType::default()));
        let html = self.create_element("html");
        let head = self.create_element("head");
        let title = self.create_element("title");
        let body = self.create_element("body");
        self.push_child(doc, html);
        self.push_child(html, head);
        self.push_child(head, title);
        self.push_child(html, body);
        doc
    }

    /// First element child of a document.
    pub fn document_element(&self, doc: NodeId) -> Option<NodeId> {
        self.children(doc)
            .iter()
            .copied()
            .find(|&c| self.is_element(c))
    }

    fn first_by_tag(&self, root: NodeId, tag: &str) -> Option<NodeId> {
        self.get_elements_by_tag_name(root, tag).into_iter().next()
    }

    pub fn head(&self, doc: NodeId) -> Option<NodeId> {
        self.first_by_tag(doc, "head")
    }

    pub fn body(&self, doc: NodeId) -> Option<NodeId> {
        self.first_by_tag(doc, "body")
    }

    fn ensure_html(&mut self, doc: NodeId) -> NodeId {
        if let Some(html) = self.first_by_tag(doc, "html") {
            return html;
        }
        let html = self.create_element("html");
        self.push_child(doc, html);
        html
    }

    /// The `head` element, created under `html` (itself created if needed)
    /// when missing.
    pub fn head_or_create(&mut self, doc: NodeId) -> NodeId {
        if let Some(head) = self.head(doc) {
            return head;
        }
        let html = self.ensure_html(doc);
        let head = self.create_element("head");
        self.insert_before(html, head, None);
        head
    }

    /// The `body` element, appended to `html` (itself created if needed)
    /// when missing.
    pub fn body_or_create(&mut self, doc: NodeId) -> NodeId {
        if let Some(body) = self.body(doc) {
            return body;
        }
        let html = self.ensure_html(doc);
        let body = self.create_element("body");
        self.push_child(html, body);
        body
    }

    /// Text of the first `title` element, or `""`.
    pub fn title(&self, doc: NodeId) -> String {
        self.first_by_tag(doc, "title")
            .map(|t| self.text_content(t))
            .unwrap_or_default()
    }

    /// Set the text of the first `title` element. Returns `false` if there is none.
    pub fn set_title(&mut self, doc: NodeId, title: &str) -> bool {
        match self.first_by_tag(doc, "title") {
            Some(t) => {
                self.set_text_content(t, title);
                true
            }
            None => false,
        }
    }

    /// Strip the document scaffolding from `root`.
    ///
    /// When the subtree has a `head` or `body`, their children move (head's
    /// first) into a new fragment, which is returned. Otherwise `root` is
    /// returned as is.
    pub fn remove_body_container(&mut self, root: NodeId) -> NodeId {
        let head = self.head(root);
        let body = self.body(root);
        if head.is_none() && body.is_none() {
            return root;
        }
        let fragment = self.create_fragment();
        for container in [head, body].into_iter().flatten() {
            let children = self.children(container).to_vec();
            self.append_child(fragment, children);
        }
        fragment
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::tree::Content;
    use vdom_html::Dialect;

    #[test]
    fn test_html_document() {
        let mut tree = Tree::new();
        let doc = tree.create_html_document();
        let html = tree.document_element(doc).unwrap();
        assert_eq!(tree.tag_name(html), Some("HTML"));
        assert_eq!(tree.parent(tree.head(doc).unwrap()), Some(html));
        assert_eq!(tree.title(doc), "");

        assert!(tree.set_title(doc, "Hello Title"));
        assert_eq!(tree.title(doc), "Hello Title");

        let body = tree.body(doc).unwrap();
        tree.append_child(body, Content::List(vec!["Hello ".into(), "world".into()]));
        assert_eq!(
            tree.render(doc, Dialect::Html),
            "<!DOCTYPE html><html><head><title>Hello Title</title></head><body>Hello world</body></html>"
        );

        let stripped = tree.remove_body_container(doc);
        assert_eq!(tree.render(stripped, Dialect::Html), "<title>Hello Title</title>Hello world");
    }

    #[test]
    fn test_remove_body_container_without_scaffolding() {
        let mut tree = Tree::new();
        let root = tree.parse_html("<p>x</p>");
        assert_eq!(tree.remove_body_container(root), root);
    }

    #[test]
    fn test_missing_containers_are_created() {
        let mut tree = Tree::new();
        let doc = tree.create_document();
        let body = tree.body_or_create(doc);
        let head = tree.head_or_create(doc);
        assert_eq!(tree.body_or_create(doc), body);
        assert!(!tree.set_title(doc, "x"));
        assert_eq!(tree.render(doc, Dialect::Html), "<html><head></head><body></body></html>");
        assert_eq!(tree.parent(head), tree.parent(body));
    }
}
