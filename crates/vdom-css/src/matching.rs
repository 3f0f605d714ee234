//! Right-to-left selector matching.

use vdom_cssparser::{
    AttrOperator, AttributeSelector, Combinator, Component, Compound, PseudoClass, Selector,
    SelectorList,
};

/// Tree navigation needed to match selectors against an element.
///
/// Sibling accessors only ever see elements; text nodes and other
/// non-element nodes are skipped. Both sibling accessors return `None` when
/// the node has no parent at all, and should cost one pass over the parent's
/// children.
pub trait Element: Sized {
    /// The parent, if it is an element.
    fn parent_element(&self) -> Option<Self>;

    /// The parent's element children in order, and the index of `self` among them.
    fn element_siblings(&self) -> Option<(Vec<Self>, usize)>;

    /// 0-based index of `self` among the parent's element children, and
    /// their count.
    fn element_index(&self) -> Option<(usize, usize)>;

    /// Tag name as written in the source.
    fn local_name(&self) -> &str;

    /// Attribute value looked up case-insensitively; bare attributes read as `""`.
    fn attribute(&self, name: &str) -> Option<&str>;
}

/// Whether any alternative of `list` matches `element`. An empty list never matches.
pub fn matches_selector_list<E: Element>(list: &SelectorList, element: &E) -> bool {
    list.selectors.iter().any(|s| matches_selector(s, element))
}

/// Match one chain, starting at its rightmost compound.
pub fn matches_selector<E: Element>(selector: &Selector, element: &E) -> bool {
    matches_compound(&selector.subject, element) && matches_chain(&selector.ancestors, element)
}

fn matches_chain<E: Element>(chain: &[(Combinator, Compound)], element: &E) -> bool {
    let Some(((combinator, compound), rest)) = chain.split_first() else {
        return true;
    };
    let step = |candidate: &E| matches_compound(compound, candidate) && matches_chain(rest, candidate);

    match combinator {
        Combinator::Descendant => {
            let mut current = element.parent_element();
            while let Some(ancestor) = current {
                if step(&ancestor) {
                    return true;
                }
                current = ancestor.parent_element();
            }
            false
        }
        Combinator::Child => element.parent_element().map_or(false, |p| step(&p)),
        Combinator::Adjacent => element
            .element_siblings()
            .and_then(|(siblings, index)| index.checked_sub(1).map(|i| step(&siblings[i])))
            .unwrap_or(false),
        Combinator::Sibling => element
            .element_siblings()
            .map_or(false, |(siblings, index)| siblings[..index].iter().rev().any(step)),
    }
}

/// Whether every simple selector of `compound` matches `element`.
pub fn matches_compound<E: Element>(compound: &Compound, element: &E) -> bool {
    compound
        .components
        .iter()
        .all(|component| matches_component(component, element))
}

fn matches_component<E: Element>(component: &Component, element: &E) -> bool {
    match component {
        Component::Universal => true,
        Component::Tag(name) => element.local_name().eq_ignore_ascii_case(name),
        Component::Attribute(attr) => matches_attribute(attr, element),
        Component::Pseudo(pseudo) => matches_pseudo(pseudo, element),
    }
}

fn matches_attribute<E: Element>(attr: &AttributeSelector, element: &E) -> bool {
    let Some(actual) = element.attribute(&attr.name) else {
        return false;
    };
    if attr.operator == AttrOperator::Exists {
        return true;
    }

    let (actual, expected) = if attr.case_insensitive {
        (actual.to_lowercase(), attr.value.to_lowercase())
    } else {
        (actual.to_string(), attr.value.clone())
    };

    match attr.operator {
        AttrOperator::Exists => true,
        AttrOperator::Equals => actual == expected,
        AttrOperator::Prefix => !expected.is_empty() && actual.starts_with(&expected),
        AttrOperator::Suffix => !expected.is_empty() && actual.ends_with(&expected),
        AttrOperator::Substring => !expected.is_empty() && actual.contains(&expected),
        AttrOperator::Includes => {
            !expected.is_empty()
                && !expected.contains(char::is_whitespace)
                && actual.split_whitespace().any(|token| token == expected)
        }
        AttrOperator::DashMatch => {
            actual == expected
                || actual
                    .strip_prefix(&expected)
                    .map_or(false, |rest| rest.starts_with('-'))
        }
    }
}

fn matches_pseudo<E: Element>(pseudo: &PseudoClass, element: &E) -> bool {
    match pseudo {
        PseudoClass::Not(inner) => !inner.iter().any(|c| matches_compound(c, element)),
        PseudoClass::FirstChild => element.element_index().map_or(false, |(index, _)| index == 0),
        PseudoClass::LastChild => element
            .element_index()
            .map_or(false, |(index, count)| index + 1 == count),
        PseudoClass::NthChild(pattern) => element
            .element_index()
            .map_or(false, |(index, _)| pattern.matches(index + 1)),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use vdom_cssparser::parse_selector_list;

    struct TestNode {
        tag: Option<&'static str>,
        attrs: Vec<(&'static str, &'static str)>,
        parent: Option<usize>,
        children: Vec<usize>,
    }

    #[derive(Default)]
    struct TestTree {
        nodes: Vec<TestNode>,
    }

    impl TestTree {
        fn add(&mut self, parent: Option<usize>, tag: Option<&'static str>, attrs: Vec<(&'static str, &'static str)>) -> usize {
            let id = self.nodes.len();
            self.nodes.push(TestNode {
                tag,
                attrs,
                parent,
                children: Vec::new(),
            });
            if let Some(p) = parent {
                self.nodes[p].children.push(id);
            }
            id
        }

        fn el(&self, id: usize) -> TestElement<'_> {
            TestElement { tree: self, id }
        }
    }

    #[derive(Clone, Copy)]
    struct TestElement<'a> {
        tree: &'a TestTree,
        id: usize,
    }

    impl<'a> TestElement<'a> {
        fn node(&self) -> &'a TestNode {
            &self.tree.nodes[self.id]
        }

        fn sibling_elements(&self) -> Vec<usize> {
            match self.node().parent {
                Some(p) => self.tree.nodes[p]
                    .children
                    .iter()
                    .copied()
                    .filter(|&c| self.tree.nodes[c].tag.is_some())
                    .collect(),
                None => vec![self.id],
            }
        }
    }

    impl<'a> Element for TestElement<'a> {
        fn parent_element(&self) -> Option<Self> {
            let p = self.node().parent?;
            self.tree.nodes[p].tag.map(|_| self.tree.el(p))
        }

        fn element_siblings(&self) -> Option<(Vec<Self>, usize)> {
            self.node().parent?;
            let siblings = self.sibling_elements();
            let index = siblings.iter().position(|&s| s == self.id)?;
            Some((siblings.into_iter().map(|s| self.tree.el(s)).collect(), index))
        }

        fn element_index(&self) -> Option<(usize, usize)> {
            self.node().parent?;
            let siblings = self.sibling_elements();
            let index = siblings.iter().position(|&s| s == self.id)?;
            Some((index, siblings.len()))
        }

        fn local_name(&self) -> &str {
            self.node().tag.unwrap_or("")
        }

        fn attribute(&self, name: &str) -> Option<&str> {
            self.node()
                .attrs
                .iter()
                .find(|(k, _)| k.eq_ignore_ascii_case(name))
                .map(|(_, v)| *v)
        }
    }

    fn matches(selector: &str, element: &TestElement<'_>) -> bool {
        let list = parse_selector_list(selector).unwrap();
        matches_selector_list(&list, element)
    }

    /// fragment > div > (p, "text", span, div > (p, span))
    fn combinator_tree() -> (TestTree, [usize; 6]) {
        let mut tree = TestTree::default();
        let root = tree.add(None, None, vec![]);
        let outer = tree.add(Some(root), Some("DIV"), vec![("id", "outer")]);
        let p1 = tree.add(Some(outer), Some("p"), vec![]);
        tree.add(Some(outer), None, vec![]);
        let span1 = tree.add(Some(outer), Some("span"), vec![]);
        let inner = tree.add(Some(outer), Some("div"), vec![]);
        let p2 = tree.add(Some(inner), Some("p"), vec![]);
        let span2 = tree.add(Some(inner), Some("span"), vec![]);
        (tree, [outer, p1, span1, inner, p2, span2])
    }

    #[test]
    fn test_combinators() {
        let (tree, [outer, p1, span1, inner, p2, span2]) = combinator_tree();
        assert!(matches("div > p", &tree.el(p1)));
        assert!(matches("div > p", &tree.el(p2)));
        assert!(!matches("#outer > p", &tree.el(p2)));
        assert!(matches("#outer p", &tree.el(p2)));
        assert!(matches("span + div", &tree.el(inner)));
        assert!(matches("p + span", &tree.el(span1)));
        assert!(!matches("p + div", &tree.el(inner)));
        assert!(matches("p ~ div", &tree.el(inner)));
        assert!(!matches("div ~ p", &tree.el(p1)));
        assert!(matches("div div > p + span", &tree.el(span2)));
        assert!(!matches("div > div > div", &tree.el(inner)));
        assert!(!matches("p", &tree.el(outer)));
    }

    #[test]
    fn test_positional_pseudo_classes_skip_text() {
        let (tree, [outer, p1, span1, inner, _, span2]) = combinator_tree();
        assert!(matches(":first-child", &tree.el(p1)));
        assert!(matches("span:nth-child(2)", &tree.el(span1)));
        assert!(matches(":last-child", &tree.el(inner)));
        assert!(matches(":last-child", &tree.el(span2)));
        assert!(!matches(":last-child", &tree.el(span1)));
        assert!(matches(":nth-child(odd)", &tree.el(inner)));
        // The outer div's parent is a fragment, which still counts as a parent.
        assert!(matches(":first-child:last-child", &tree.el(outer)));
    }

    #[test]
    fn test_attribute_selectors() {
        let mut tree = TestTree::default();
        let root = tree.add(None, None, vec![]);
        let el = tree.add(
            Some(root),
            Some("div"),
            vec![
                ("id", "foo"),
                ("class", "foo bar"),
                ("foo", "bar"),
                ("data-lang", "en-US"),
                ("title", "abcdefg"),
                ("hidden", ""),
            ],
        );
        let el = tree.el(el);
        for selector in [
            "#foo",
            ".foo",
            ".foo.bar",
            "div",
            "DIV",
            "[id=foo]",
            "[id]",
            "div, p",
            ":not(h1)",
            "*[data-lang]",
            "[data-lang|=en]",
            "[title^=abc]",
            "[title$=efg]",
            "[title*=cde]",
            "[class~=bar]",
            "[FOO=bar]",
            "[hidden]",
            "[title=ABCDEFG i]",
        ] {
            assert!(matches(selector, &el), "{selector} should match");
        }
        for selector in [
            "h1",
            "#bar",
            ".baz",
            "[title~=cd]",
            "[title=ABCDEFG]",
            "[data-lang|=US]",
            ":not(.bar)",
            ":not(p, div)",
            "[title^='']",
        ] {
            assert!(!matches(selector, &el), "{selector} should not match");
        }
    }

    #[test]
    fn test_empty_list_matches_nothing() {
        let mut tree = TestTree::default();
        let el = tree.add(None, Some("div"), vec![]);
        assert!(!matches("   ", &tree.el(el)));
        // No parent: positional pseudo-classes never match.
        assert!(!matches(":first-child", &tree.el(el)));
    }
}
