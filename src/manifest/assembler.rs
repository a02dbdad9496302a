//! Manifest assembly: merge entries by path and order them

use crate::manifest::entry::Entry;
use crate::manifest::Manifest;
use std::collections::HashMap;

/// Path-keyed collection of finalized entries
#[derive(Debug, Default)]
pub struct Assembler {
    by_path: HashMap<String, Entry>,
}

impl Assembler {
    pub fn new() -> Self {
        Self::default()
    }

    /// Add an entry produced directly by the classifier. An existing entry
    /// for the same path is kept.
    pub fn insert_classified(&mut self, entry: Entry) {
        self.by_path.entry(entry.path.clone()).or_insert(entry);
    }

    /// Add entries produced by hard-link resolution. These replace any
    /// classifier entry with the same path.
    pub fn insert_resolved<I>(&mut self, entries: I)
    where
        I: IntoIterator<Item = Entry>,
    {
        for entry in entries {
            self.by_path.insert(entry.path.clone(), entry);
        }
    }

    pub fn len(&self) -> usize {
        self.by_path.len()
    }

    pub fn is_empty(&self) -> bool {
        self.by_path.is_empty()
    }

    /// Sort by path (byte-wise) and seal into a manifest
    pub fn finish(self) -> Manifest {
        let mut entries: Vec<Entry> = self.by_path.into_values().collect();
        entries.sort_unstable_by(|a, b| a.path.as_bytes().cmp(b.path.as_bytes()));
        Manifest::from_sorted(entries)
    }
}
