//! String Interner
//!
//! Bidirectional string ↔ id table. Each `TagIndex` owns three of these
//! (metric names, series paths, tag values), so ids are only meaningful
//! within the interner that issued them.
//!
//! Ids start at 0, grow monotonically and are never reclaimed.

use std::collections::HashMap;

/// Bidirectional string ↔ `u64` table
#[derive(Debug, Default)]
pub struct StringInterner {
    next_id: u64,
    ids: HashMap<String, u64>,
    strings: HashMap<u64, String>,
}

impl StringInterner {
    /// Create an empty interner
    pub fn new() -> Self {
        Self::default()
    }

    /// Return the id for `s`, assigning the next free id on first sight
    pub fn get_or_create_id(&mut self, s: &str) -> u64 {
        if let Some(&id) = self.ids.get(s) {
            return id;
        }

        let id = self.next_id;
        self.next_id += 1;
        self.ids.insert(s.to_string(), id);
        self.strings.insert(id, s.to_string());
        id
    }

    /// Look up the id of an already interned string without interning it
    pub fn id_of(&self, s: &str) -> Option<u64> {
        self.ids.get(s).copied()
    }

    /// Resolve an id back to its string
    ///
    /// `None` only for ids this interner never issued.
    pub fn lookup(&self, id: u64) -> Option<&str> {
        self.strings.get(&id).map(String::as_str)
    }

    /// Number of distinct strings interned so far
    pub fn len(&self) -> usize {
        self.ids.len()
    }

    pub fn is_empty(&self) -> bool {
        self.ids.is_empty()
    }
}
