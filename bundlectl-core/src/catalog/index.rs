//! Index file parsing and management
//!
//! An index file is a YAML sequence of [`Entry`] records, one per artifact
//! name. Written indexes are always in canonical form (sorted by name) so
//! that a digest of the file identifies its content.

use std::collections::HashMap;
use std::fs;
use std::io::Write;
use std::path::Path;

use tempfile::NamedTempFile;

use super::error::{IndexError, Result};
use super::fuzzy;
use super::Entry;

/// File mode for written index files
#[cfg(unix)]
const WRITE_PERMISSIONS: u32 = 0o600;

/// An ordered collection of entries, unique by name
#[derive(Debug, Clone, Default)]
pub struct Index {
    name: String,
    entries: Vec<Entry>,
    /// Position of each entry in `entries`, keyed by name
    entry_by_name: HashMap<String, usize>,
}

impl Index {
    /// Create a new empty index
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            entries: Vec::new(),
            entry_by_name: HashMap::new(),
        }
    }

    /// Create an index named `name` from the file at `path`
    pub fn from_file(name: impl Into<String>, path: impl AsRef<Path>) -> Result<Self> {
        let mut index = Self::new(name);
        index.read(path)?;
        Ok(index)
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn entries(&self) -> &[Entry] {
        &self.entries
    }

    pub fn iter(&self) -> std::slice::Iter<'_, Entry> {
        self.entries.iter()
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// Add a new entry or replace the one with the same name in place
    ///
    /// Returns the replaced entry, if any.
    pub fn upsert(&mut self, entry: Entry) -> Option<Entry> {
        if let Some(&position) = self.entry_by_name.get(entry.name()) {
            return Some(std::mem::replace(&mut self.entries[position], entry));
        }

        self.entry_by_name
            .insert(entry.name().to_string(), self.entries.len());
        self.entries.push(entry);
        None
    }

    /// Remove the entry with the identity of `entry`
    ///
    /// Matching is by identity, not by name: an equal-looking entry that was
    /// never stored here is not found.
    pub fn remove(&mut self, entry: &Entry) -> Result<Entry> {
        let position = self
            .entries
            .iter()
            .position(|e| e.id() == entry.id())
            .ok_or_else(|| IndexError::NotFound {
                name: entry.name().to_string(),
            })?;

        let removed = self.entries.remove(position);
        self.entry_by_name.remove(removed.name());
        for p in self.entry_by_name.values_mut() {
            if *p > position {
                *p -= 1;
            }
        }

        Ok(removed)
    }

    /// Get an entry by name
    pub fn entry_by_name(&self, name: &str) -> Option<&Entry> {
        self.entry_by_name
            .get(name)
            .and_then(|&position| self.entries.get(position))
    }

    /// Normalize the index to its canonical form: entries sorted by name,
    /// byte-wise, ascending
    ///
    /// Fails without modifying anything if the name lookup and the entry
    /// sequence disagree.
    pub fn normalize(&mut self) -> Result<()> {
        if self.entry_by_name.len() != self.entries.len() {
            return Err(IndexError::inconsistent(format!(
                "{} names for {} entries",
                self.entry_by_name.len(),
                self.entries.len()
            )));
        }

        for (position, entry) in self.entries.iter().enumerate() {
            if self.entry_by_name.get(entry.name()) != Some(&position) {
                return Err(IndexError::inconsistent(format!(
                    "entry {} is not indexed by name",
                    entry.name()
                )));
            }
        }

        self.entries.sort_by(|a, b| a.name().as_bytes().cmp(b.name().as_bytes()));
        self.reindex();

        Ok(())
    }

    /// Write the normalized entries to `path`
    ///
    /// The content is written to a temporary file next to `path` and then
    /// renamed over it.
    pub fn write(&mut self, path: impl AsRef<Path>) -> Result<()> {
        let path = path.as_ref();
        self.normalize()?;

        let content = serde_yaml_ng::to_string(&self.entries)
            .map_err(|source| IndexError::Marshal { source })?;

        let dir = match path.parent() {
            Some(parent) if !parent.as_os_str().is_empty() => parent,
            _ => Path::new("."),
        };

        let mut tmp = NamedTempFile::new_in(dir).map_err(|e| IndexError::io(path, e))?;
        tmp.write_all(content.as_bytes())
            .and_then(|_| tmp.flush())
            .map_err(|e| IndexError::io(path, e))?;

        #[cfg(unix)]
        {
            use std::os::unix::fs::PermissionsExt;
            tmp.as_file()
                .set_permissions(fs::Permissions::from_mode(WRITE_PERMISSIONS))
                .map_err(|e| IndexError::io(path, e))?;
        }

        tmp.persist(path)
            .map_err(|e| IndexError::io(path, e.error))?;

        tracing::debug!(
            index = %self.name,
            path = %path.display(),
            entries = self.entries.len(),
            "Wrote index"
        );
        Ok(())
    }

    /// Replace the entries with those read from `path`
    ///
    /// Fails on duplicate names. On failure the index is left unchanged.
    pub fn read(&mut self, path: impl AsRef<Path>) -> Result<()> {
        let path = path.as_ref();
        let content = fs::read_to_string(path).map_err(|e| IndexError::io(path, e))?;

        let entries: Vec<Entry> = if content.trim().is_empty() {
            Vec::new()
        } else {
            serde_yaml_ng::from_str(&content).map_err(|source| IndexError::Parse {
                path: path.to_path_buf(),
                source,
            })?
        };

        let mut entry_by_name = HashMap::with_capacity(entries.len());
        for (position, entry) in entries.iter().enumerate() {
            if entry_by_name.insert(entry.name().to_string(), position).is_some() {
                return Err(IndexError::Duplicate {
                    name: entry.name().to_string(),
                    path: path.to_path_buf(),
                });
            }
        }

        self.entries = entries;
        self.entry_by_name = entry_by_name;

        tracing::debug!(
            index = %self.name,
            path = %path.display(),
            entries = self.entries.len(),
            "Read index"
        );
        Ok(())
    }

    /// Search entries matching any of the given keywords
    ///
    /// An entry matches a keyword when the similarity between the keyword and
    /// the entry name reaches `min_score`, or, failing that, when the keyword
    /// appears verbatim (case-sensitive) in the entry's space-joined keywords.
    /// Matches are returned in index order, each entry at most once.
    pub fn search_by_keywords<S: AsRef<str>>(&self, min_score: f64, keywords: &[S]) -> Vec<&Entry> {
        self.entries
            .iter()
            .filter(|entry| {
                let entry_keywords = entry.keywords.join(" ");
                keywords.iter().any(|keyword| {
                    let keyword = keyword.as_ref();
                    fuzzy::score(entry.name(), keyword) >= min_score
                        || entry_keywords.contains(keyword)
                })
            })
            .collect()
    }

    fn reindex(&mut self) {
        self.entry_by_name = self
            .entries
            .iter()
            .enumerate()
            .map(|(position, entry)| (entry.name().to_string(), position))
            .collect();
    }
}
