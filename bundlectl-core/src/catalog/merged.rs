//! Merged view over several indexes
//!
//! Later indexes shadow earlier ones for identically named entries, and
//! every entry in the view remembers the index it was taken from.

use std::collections::HashMap;

use super::{Entry, EntryId, Index};

/// Aggregate of several indexes with per-entry provenance
#[derive(Debug, Clone, Default)]
pub struct MergedIndexes {
    index: Index,
    sources: Vec<Index>,
    /// Position in `sources` of the index each aggregated entry came from
    index_by_entry: HashMap<EntryId, usize>,
}

impl MergedIndexes {
    pub fn new() -> Self {
        Self::default()
    }

    /// Merge `indexes` into the view, in the given order
    ///
    /// Order matters: pass the lowest priority index first (for configured
    /// indexes, the oldest). On a name collision the entry of the later
    /// index replaces the earlier one and takes over its provenance.
    pub fn merge<I>(&mut self, indexes: I)
    where
        I: IntoIterator<Item = Index>,
    {
        for index in indexes {
            let source = self.sources.len();
            let mut shadowed = 0usize;

            for entry in index.iter() {
                if let Some(previous) = self.index.upsert(entry.clone()) {
                    self.index_by_entry.remove(&previous.id());
                    shadowed += 1;
                }
                self.index_by_entry.insert(entry.id(), source);
            }

            tracing::debug!(
                index = %index.name(),
                entries = index.len(),
                shadowed,
                "Merged index"
            );
            self.sources.push(index);
        }
    }

    /// The index `entry` was merged from
    ///
    /// `None` if the entry is not part of the merged view, including entries
    /// that were shadowed by a later index.
    pub fn index_by_entry(&self, entry: &Entry) -> Option<&Index> {
        self.index_by_entry
            .get(&entry.id())
            .and_then(|&source| self.sources.get(source))
    }

    pub fn entry_by_name(&self, name: &str) -> Option<&Entry> {
        self.index.entry_by_name(name)
    }

    pub fn entries(&self) -> &[Entry] {
        self.index.entries()
    }

    pub fn iter(&self) -> std::slice::Iter<'_, Entry> {
        self.index.iter()
    }

    pub fn len(&self) -> usize {
        self.index.len()
    }

    pub fn is_empty(&self) -> bool {
        self.index.is_empty()
    }

    /// The merged indexes, in merge order
    pub fn sources(&self) -> &[Index] {
        &self.sources
    }

    /// See [`Index::search_by_keywords`]
    pub fn search_by_keywords<S: AsRef<str>>(&self, min_score: f64, keywords: &[S]) -> Vec<&Entry> {
        self.index.search_by_keywords(min_score, keywords)
    }
}
