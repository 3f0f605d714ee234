//! # vdom CSS
//!
//! Selector matching and inline style handling for the vdom engine.
//!
//! Matching is written against the [`Element`] navigation trait so it does not
//! depend on a particular tree representation. Selectors are compiled once
//! through a [`SelectorCache`] and reused by source text.

pub mod cache;
pub mod matching;
pub mod style;

pub use cache::{SelectorCache, SelectorMatcher};
pub use matching::{matches_compound, matches_selector, matches_selector_list, Element};
pub use style::{camel_case, StyleMap};
pub use vdom_cssparser::{parse_selector_list, SelectorError, SelectorList};
