//! Compiled selector cache.

use std::collections::HashMap;
use std::sync::{Arc, Mutex, PoisonError};

use tracing::{debug, trace};
use vdom_cssparser::{parse_selector_list, SelectorError, SelectorList};

use crate::matching::{matches_selector_list, Element};

/// Compiled selectors keyed by their source text.
///
/// Only successful parses are stored. Racing inserts of the same key are
/// harmless since equal text always compiles to an equal list.
#[derive(Debug, Default)]
pub struct SelectorCache {
    entries: Mutex<HashMap<String, Arc<SelectorList>>>,
}

impl SelectorCache {
    pub fn new() -> Self {
        Self::default()
    }

    /// Return the compiled form of `selector`, parsing it on first use.
    pub fn get_or_parse(&self, selector: &str) -> Result<Arc<SelectorList>, SelectorError> {
        if let Some(hit) = self.lock().get(selector) {
            trace!(selector = %selector, "selector cache hit");
            return Ok(Arc::clone(hit));
        }

        debug!(selector = %selector, "compiling selector");
        let compiled = Arc::new(parse_selector_list(selector)?);
        self.lock()
            .insert(selector.to_string(), Arc::clone(&compiled));
        Ok(compiled)
    }

    pub fn len(&self) -> usize {
        self.lock().len()
    }

    pub fn is_empty(&self) -> bool {
        self.lock().is_empty()
    }

    pub fn clear(&self) {
        self.lock().clear();
    }

    fn lock(&self) -> std::sync::MutexGuard<'_, HashMap<String, Arc<SelectorList>>> {
        self.entries.lock().unwrap_or_else(PoisonError::into_inner)
    }
}

/// Matches selector text against elements, compiling through its own cache.
#[derive(Debug, Default)]
pub struct SelectorMatcher {
    cache: SelectorCache,
}

impl SelectorMatcher {
    pub fn new() -> Self {
        Self::default()
    }

    /// Compile `selector` (cached).
    pub fn compile(&self, selector: &str) -> Result<Arc<SelectorList>, SelectorError> {
        self.cache.get_or_parse(selector)
    }

    /// Whether `element` matches `selector`.
    pub fn matches<E: Element>(&self, selector: &str, element: &E) -> Result<bool, SelectorError> {
        let list = self.compile(selector)?;
        Ok(matches_selector_list(&list, element))
    }

    pub fn cache(&self) -> &SelectorCache {
        &self.cache
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_cache_reuses_compiled_selectors() {
        let cache = SelectorCache::new();
        let first = cache.get_or_parse("div > p").unwrap();
        let second = cache.get_or_parse("div > p").unwrap();
        assert!(Arc::ptr_eq(&first, &second));
        assert_eq!(cache.len(), 1);

        cache.get_or_parse("p").unwrap();
        assert_eq!(cache.len(), 2);
    }

    #[test]
    fn test_cache_skips_errors() {
        let cache = SelectorCache::new();
        assert!(cache.get_or_parse("div >").is_err());
        assert!(cache.is_empty());
    }

    #[test]
    fn test_independent_caches() {
        let a = SelectorMatcher::new();
        let b = SelectorMatcher::new();
        a.compile("span").unwrap();
        assert_eq!(a.cache().len(), 1);
        assert!(b.cache().is_empty());
        a.cache().clear();
        assert!(a.cache().is_empty());
    }
}
