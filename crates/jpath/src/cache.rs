//! Memoization of root-anchored sub-evaluations within one top-level call.
use crate::value::EvalValue;
use std::collections::HashMap;

/// Maps a selector instance id to the value it produced earlier in the same
/// evaluation call. A fresh cache is created for every call and dropped with it.
#[derive(Debug, Default)]
pub struct EvalCache<'a> {
    entries: HashMap<usize, EvalValue<'a>>,
    hits: usize,
    misses: usize,
}

impl<'a> EvalCache<'a> {
    pub fn new() -> Self {
        Self::default()
    }

    /// Looks up a previously stored result, counting the hit or miss.
    pub fn try_get(&mut self, id: usize) -> Option<EvalValue<'a>> {
        match self.entries.get(&id) {
            Some(value) => {
                self.hits += 1;
                log::trace!("cache hit for selector #{}", id);
                Some(value.clone())
            }
            None => {
                self.misses += 1;
                log::trace!("cache miss for selector #{}", id);
                None
            }
        }
    }

    pub fn put(&mut self, id: usize, value: EvalValue<'a>) {
        self.entries.insert(id, value);
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// Lookups answered from the cache.
    pub fn hits(&self) -> usize {
        self.hits
    }

    /// Lookups that had to be computed.
    pub fn misses(&self) -> usize {
        self.misses
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_get_put_and_counters() {
        let doc = json!([1, 2]);
        let mut cache = EvalCache::new();
        assert!(cache.try_get(7).is_none());
        cache.put(7, EvalValue::Node(&doc));
        assert_eq!(cache.try_get(7), Some(EvalValue::Node(&doc)));
        assert_eq!(cache.try_get(7).and_then(|v| v.as_node()), Some(&doc));
        assert!(cache.try_get(8).is_none());
        assert_eq!(cache.len(), 1);
        assert_eq!(cache.hits(), 2);
        assert_eq!(cache.misses(), 2);
    }
}
