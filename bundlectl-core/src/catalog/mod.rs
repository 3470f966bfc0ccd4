//! bundlectl Catalog - artifact index caching, merging and search
//!
//! This module provides the data structures behind `bundlectl index` and
//! `bundlectl artifact`: individual index files describing rules bundles and
//! plugins, and a merged view over every configured index.
//!
//! # Overview
//!
//! The catalog system allows users to:
//! - Keep a local, canonical copy of each configured index
//! - Merge all indexes into one view while remembering where each entry came from
//! - Look up artifacts by name and search them by keyword
//!
//! # Architecture
//!
//! ```text
//! <config dir>/
//!     ├── indexes.yaml          ← IndexConfig: configured indexes, oldest first
//!     └── indexes/<name>.yaml   ← one normalized Index per configured name
//!            │
//!            ▼  load_merged()
//!     MergedIndexes             ← later indexes shadow earlier ones by name
//!            │
//!            ▼
//!     entry_by_name / search_by_keywords / index_by_entry
//! ```

mod config;
mod entry;
mod error;
mod fuzzy;
mod index;
mod merged;

pub use config::{load_merged, IndexConfig, IndexConfigEntry, Paths, INDEXES_DIR, INDEXES_FILE};
pub use entry::{ArtifactType, Entry, EntryId, Maintainer};
pub use error::{IndexError, Result};
pub use fuzzy::{edit_distance, score};
pub use index::Index;
pub use merged::MergedIndexes;
