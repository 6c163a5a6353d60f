#![forbid(unsafe_code)]

//! The catalog: every entry a user can pick from.
//!
//! # Invariants
//!
//! 1. No two entries share a `value`.
//! 2. Preview entries are never stored.
//! 3. Order is insertion order; merges only append.
//! 4. A host entry merged over a user-created one with the same value
//!    replaces it in place and becomes predefined.

use tagpick_core::{debug, trace};

use crate::entry::{Entry, EntrySpec};

/// Ordered collection of entries, unique by value.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Catalog {
    entries: Vec<Entry>,
}

impl Catalog {
    /// Create an empty catalog.
    pub fn new() -> Self {
        Self::default()
    }

    /// Build a catalog from host specs, keeping the first entry for each value.
    pub fn from_specs<I, S>(specs: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<EntrySpec>,
    {
        let mut catalog = Self::new();
        catalog.merge(specs);
        catalog
    }

    /// Number of entries.
    pub fn len(&self) -> usize {
        self.entries.len()
    }

    /// Whether the catalog has no entries.
    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// All entries in order.
    pub fn entries(&self) -> &[Entry] {
        &self.entries
    }

    /// Iterate over entries in order.
    pub fn iter(&self) -> std::slice::Iter<'_, Entry> {
        self.entries.iter()
    }

    /// Look up an entry by value.
    pub fn get(&self, value: &str) -> Option<&Entry> {
        self.entries.iter().find(|e| e.value() == value)
    }

    /// Whether an entry with this value exists.
    pub fn contains_value(&self, value: &str) -> bool {
        self.get(value).is_some()
    }

    /// First entry whose text equals `text` exactly.
    pub fn find_by_text(&self, text: &str) -> Option<&Entry> {
        self.entries.iter().find(|e| e.text() == text)
    }

    /// Append host-supplied entries, skipping values already present.
    ///
    /// Existing predefined entries are never touched. A user-created entry
    /// with the same value is taken over by the host entry, so unselecting it
    /// later keeps it. Returns how many entries were added or taken over.
    pub fn merge<I, S>(&mut self, specs: I) -> usize
    where
        I: IntoIterator<Item = S>,
        S: Into<EntrySpec>,
    {
        let mut changed = 0;
        for spec in specs {
            let entry = spec.into().into_entry();
            if self.adopt(&entry) || self.insert(entry) {
                changed += 1;
            }
        }
        changed
    }

    /// Replace a user-created entry with the host entry of the same value.
    fn adopt(&mut self, entry: &Entry) -> bool {
        let Some(slot) = self
            .entries
            .iter_mut()
            .find(|e| e.value() == entry.value() && e.is_new())
        else {
            return false;
        };
        debug!(value = entry.value(), "created entry adopted by host catalog");
        *slot = entry.clone();
        true
    }

    /// Append an entry unless its value is taken or it is a preview.
    pub(crate) fn insert(&mut self, entry: Entry) -> bool {
        if entry.is_preview() {
            return false;
        }
        if self.contains_value(entry.value()) {
            trace!(value = entry.value(), "catalog insert skipped: duplicate value");
            return false;
        }
        self.entries.push(entry);
        true
    }

    /// Remove the entry with this value.
    pub(crate) fn remove(&mut self, value: &str) -> Option<Entry> {
        let index = self.entries.iter().position(|e| e.value() == value)?;
        let removed = self.entries.remove(index);
        debug!(value, "catalog entry removed");
        Some(removed)
    }
}

impl<'a> IntoIterator for &'a Catalog {
    type Item = &'a Entry;
    type IntoIter = std::slice::Iter<'a, Entry>;

    fn into_iter(self) -> Self::IntoIter {
        self.iter()
    }
}
