//! Element lookup and selector queries.

use vdom_css::Element;

use crate::node::{NodeId, NodeKind};
use crate::tree::Tree;
use crate::DomError;

/// Borrowed view of a tree node for the selector matcher.
#[derive(Debug, Clone, Copy)]
pub struct NodeRef<'a> {
    tree: &'a Tree,
    id: NodeId,
}

impl<'a> NodeRef<'a> {
    pub fn new(tree: &'a Tree, id: NodeId) -> Self {
        Self { tree, id }
    }

    pub fn id(&self) -> NodeId {
        self.id
    }

    fn at(&self, id: NodeId) -> Self {
        Self::new(self.tree, id)
    }
}

impl<'a> Element for NodeRef<'a> {
    fn parent_element(&self) -> Option<Self> {
        self.tree
            .parent(self.id)
            .filter(|&p| self.tree.is_element(p))
            .map(|p| self.at(p))
    }

    fn element_siblings(&self) -> Option<(Vec<Self>, usize)> {
        let parent = self.tree.parent(self.id)?;
        let mut index = None;
        let mut siblings = Vec::new();
        for &child in self.tree.children(parent) {
            if child == self.id {
                index = Some(siblings.len());
            }
            if self.tree.is_element(child) {
                siblings.push(self.at(child));
            }
        }
        Some((siblings, index?))
    }

    fn element_index(&self) -> Option<(usize, usize)> {
        let parent = self.tree.parent(self.id)?;
        let mut index = None;
        let mut count = 0;
        for &child in self.tree.children(parent) {
            if child == self.id {
                index = Some(count);
            }
            if self.tree.is_element(child) {
                count += 1;
            }
        }
        Some((index?, count))
    }

    fn local_name(&self) -> &str {
        self.tree.local_name(self.id).unwrap_or("")
    }

    fn attribute(&self, name: &str) -> Option<&str> {
        self.tree.get_attribute(self.id, name)
    }
}

impl Tree {
    /// Whether element `id` matches `selector`. Non-elements never match.
    pub fn matches(&self, id: NodeId, selector: &str) -> Result<bool, DomError> {
        let list = self.matcher().compile(selector)?;
        Ok(self.is_element(id) && vdom_css::matches_selector_list(&list, &NodeRef::new(self, id)))
    }

    /// Every element of the subtree (including `root`) matching `selector`,
    /// in document order.
    pub fn query_selector_all(&self, root: NodeId, selector: &str) -> Result<Vec<NodeId>, DomError> {
        let list = self.matcher().compile(selector)?;
        Ok(self
            .flatten(root)
            .into_iter()
            .filter(|&id| vdom_css::matches_selector_list(&list, &NodeRef::new(self, id)))
            .collect())
    }

    /// First element of the subtree matching `selector`.
    pub fn query_selector(&self, root: NodeId, selector: &str) -> Result<Option<NodeId>, DomError> {
        let list = self.matcher().compile(selector)?;
        Ok(self
            .flatten(root)
            .into_iter()
            .find(|&id| vdom_css::matches_selector_list(&list, &NodeRef::new(self, id))))
    }

    /// Nearest inclusive ancestor matching `selector`.
    pub fn closest(&self, id: NodeId, selector: &str) -> Result<Option<NodeId>, DomError> {
        let list = self.matcher().compile(selector)?;
        Ok(std::iter::once(id)
            .chain(self.ancestors(id))
            .filter(|&n| self.is_element(n))
            .find(|&n| vdom_css::matches_selector_list(&list, &NodeRef::new(self, n))))
    }

    /// Call `f(tree, element, index)` for every match under `root`.
    ///
    /// Matches are collected up front, so `f` may mutate the tree freely.
    pub fn handle<F>(&mut self, root: NodeId, selector: &str, mut f: F) -> Result<usize, DomError>
    where
        F: FnMut(&mut Tree, NodeId, usize),
    {
        let matches = self.query_selector_all(root, selector)?;
        for (index, &id) in matches.iter().enumerate() {
            f(self, id, index);
        }
        Ok(matches.len())
    }

    pub fn get_element_by_id(&self, root: NodeId, id: &str) -> Option<NodeId> {
        self.flatten(root)
            .into_iter()
            .find(|&n| self.get_attribute(n, "id") == Some(id))
    }

    pub fn get_elements_by_class_name(&self, root: NodeId, class: &str) -> Vec<NodeId> {
        self.flatten(root)
            .into_iter()
            .filter(|&n| self.has_class(n, class))
            .collect()
    }

    /// Elements with the given tag (any casing); `*` returns every element.
    pub fn get_elements_by_tag_name(&self, root: NodeId, tag: &str) -> Vec<NodeId> {
        let elements = self.flatten(root);
        if tag == "*" {
            return elements;
        }
        elements
            .into_iter()
            .filter(|&n| match self.kind(n) {
                NodeKind::Element(el) => el.tag_name().eq_ignore_ascii_case(tag),
                _ => false,
            })
            .collect()
    }
}
