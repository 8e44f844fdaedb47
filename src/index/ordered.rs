//! Ordered Container
//!
//! Sorted associative container keyed by `String`. The same primitive is used
//! at all three index levels (tag → value → metric), and its ascending cursor
//! is what gives `list_tags` and `stat_tag` their deterministic order.

use std::collections::btree_map::{self, BTreeMap};

/// Sorted string-keyed map with a restartable ascending cursor
#[derive(Debug, Clone)]
pub struct OrderedContainer<V> {
    entries: BTreeMap<String, V>,
}

impl<V> Default for OrderedContainer<V> {
    fn default() -> Self {
        Self {
            entries: BTreeMap::new(),
        }
    }
}

impl<V> OrderedContainer<V> {
    /// Create an empty container
    pub fn new() -> Self {
        Self::default()
    }

    /// Point lookup
    pub fn get(&self, key: &str) -> Option<&V> {
        self.entries.get(key)
    }

    /// Mutable point lookup
    pub fn get_mut(&mut self, key: &str) -> Option<&mut V> {
        self.entries.get_mut(key)
    }

    /// Insert or replace the value stored under `key`
    pub fn set(&mut self, key: impl Into<String>, value: V) {
        self.entries.insert(key.into(), value);
    }

    /// Return the value under `key`, creating it with `make` on first sight
    ///
    /// The key is only allocated when the entry is missing.
    pub fn get_or_insert_with(&mut self, key: &str, make: impl FnOnce() -> V) -> &mut V {
        if !self.entries.contains_key(key) {
            self.entries.insert(key.to_string(), make());
        }
        self.entries
            .get_mut(key)
            .unwrap_or_else(|| unreachable!("entry inserted above"))
    }

    /// Number of entries
    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// Cursor positioned before the smallest key
    pub fn cursor(&self) -> Cursor<'_, V> {
        Cursor {
            container: self,
            inner: self.entries.iter(),
        }
    }

    /// Iterate values in ascending key order
    pub fn values(&self) -> btree_map::Values<'_, String, V> {
        self.entries.values()
    }
}

/// Lazy ascending walk over an [`OrderedContainer`]
///
/// Finite, and restartable through [`Cursor::rewind`].
pub struct Cursor<'a, V> {
    container: &'a OrderedContainer<V>,
    inner: btree_map::Iter<'a, String, V>,
}

impl<'a, V> Cursor<'a, V> {
    /// Reposition the cursor before the smallest key
    pub fn rewind(&mut self) {
        self.inner = self.container.entries.iter();
    }
}

impl<'a, V> Iterator for Cursor<'a, V> {
    type Item = (&'a str, &'a V);

    fn next(&mut self) -> Option<Self::Item> {
        self.inner.next().map(|(k, v)| (k.as_str(), v))
    }

    fn size_hint(&self) -> (usize, Option<usize>) {
        self.inner.size_hint()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_get_and_set() {
        let mut container = OrderedContainer::new();
        container.set("dc", 1);
        container.set("rack", 2);

        assert_eq!(container.get("dc"), Some(&1));
        assert_eq!(container.get("missing"), None);

        container.set("dc", 10);
        assert_eq!(container.get("dc"), Some(&10));
        assert_eq!(container.len(), 2);
    }

    #[test]
    fn test_cursor_is_ascending() {
        let mut container = OrderedContainer::new();
        for key in ["zone", "dc", "rack", "host", "app"] {
            container.set(key, ());
        }

        let keys: Vec<&str> = container.cursor().map(|(k, _)| k).collect();
        assert_eq!(keys, vec!["app", "dc", "host", "rack", "zone"]);
    }

    #[test]
    fn test_cursor_rewind() {
        let mut container = OrderedContainer::new();
        container.set("b", 2);
        container.set("a", 1);

        let mut cursor = container.cursor();
        assert_eq!(cursor.next(), Some(("a", &1)));
        assert_eq!(cursor.next(), Some(("b", &2)));
        assert_eq!(cursor.next(), None);

        cursor.rewind();
        assert_eq!(cursor.next(), Some(("a", &1)));
    }

    #[test]
    fn test_empty_cursor() {
        let container: OrderedContainer<u8> = OrderedContainer::new();
        assert!(container.is_empty());
        assert_eq!(container.cursor().next(), None);
    }

    #[test]
    fn test_get_or_insert_with_only_creates_once() {
        let mut container: OrderedContainer<Vec<u32>> = OrderedContainer::new();

        container.get_or_insert_with("ams", Vec::new).push(1);
        container.get_or_insert_with("ams", || vec![99]).push(2);

        assert_eq!(container.get("ams"), Some(&vec![1, 2]));
        assert_eq!(container.len(), 1);
    }
}
