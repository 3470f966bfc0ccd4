//! Index configuration (indexes.yaml)
//!
//! Records which indexes are configured, where each was imported from and
//! when. The cached copy of every configured index lives in the indexes
//! directory as `<name>.yaml`.

use anyhow::{Context, Result};
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};

use super::{Index, MergedIndexes};

/// Configuration file name inside the root directory
pub const INDEXES_FILE: &str = "indexes.yaml";

/// Directory holding the cached index files inside the root directory
pub const INDEXES_DIR: &str = "indexes";

/// A configured index
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct IndexConfigEntry {
    /// Index name, also the cache file stem
    pub name: String,

    /// Path the index was imported from
    pub source: PathBuf,

    pub added_timestamp: DateTime<Utc>,

    pub updated_timestamp: DateTime<Utc>,
}

impl IndexConfigEntry {
    /// Path of the cached copy of this index inside `dir`
    pub fn file_in(&self, dir: &Path) -> PathBuf {
        index_file(dir, &self.name)
    }
}

/// Index configuration file
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct IndexConfig {
    #[serde(default)]
    pub configs: Vec<IndexConfigEntry>,
}

impl IndexConfig {
    /// Load the configuration, or an empty one if `path` does not exist
    pub fn load(path: &Path) -> Result<Self> {
        if !path.exists() {
            return Ok(Self::default());
        }

        let content = std::fs::read_to_string(path)
            .with_context(|| format!("Failed to read index config: {}", path.display()))?;

        if content.trim().is_empty() {
            return Ok(Self::default());
        }

        serde_yaml_ng::from_str(&content)
            .with_context(|| format!("Failed to parse index config: {}", path.display()))
    }

    /// Save the configuration to `path`
    pub fn save(&self, path: &Path) -> Result<()> {
        let content =
            serde_yaml_ng::to_string(self).context("Failed to serialize index config")?;

        if let Some(parent) = path.parent() {
            std::fs::create_dir_all(parent).with_context(|| {
                format!("Failed to create config directory: {}", parent.display())
            })?;
        }

        std::fs::write(path, content)
            .with_context(|| format!("Failed to write index config: {}", path.display()))?;

        Ok(())
    }

    pub fn get(&self, name: &str) -> Option<&IndexConfigEntry> {
        self.configs.iter().find(|c| c.name == name)
    }

    /// Add an index, or refresh the source and update time of an existing one
    pub fn upsert(&mut self, name: &str, source: &Path) -> Result<&IndexConfigEntry> {
        validate_name(name)?;
        let now = Utc::now();

        let position = match self.configs.iter().position(|c| c.name == name) {
            Some(position) => {
                let config = &mut self.configs[position];
                config.source = source.to_path_buf();
                config.updated_timestamp = now;
                position
            }
            None => {
                self.configs.push(IndexConfigEntry {
                    name: name.to_string(),
                    source: source.to_path_buf(),
                    added_timestamp: now,
                    updated_timestamp: now,
                });
                self.configs.len() - 1
            }
        };

        Ok(&self.configs[position])
    }

    /// Remove an index by name
    pub fn remove(&mut self, name: &str) -> Result<IndexConfigEntry> {
        let position = self
            .configs
            .iter()
            .position(|c| c.name == name)
            .with_context(|| format!("Index '{name}' not found"))?;

        Ok(self.configs.remove(position))
    }

    /// Configured indexes, oldest first
    pub fn by_added_time(&self) -> Vec<&IndexConfigEntry> {
        let mut configs: Vec<&IndexConfigEntry> = self.configs.iter().collect();
        configs.sort_by_key(|c| c.added_timestamp);
        configs
    }
}

/// Read every configured index from `dir` and merge them, oldest first
pub fn load_merged(config: &IndexConfig, dir: &Path) -> Result<MergedIndexes> {
    let mut indexes = Vec::with_capacity(config.configs.len());

    for entry in config.by_added_time() {
        let path = entry.file_in(dir);
        let index = Index::from_file(entry.name.as_str(), &path).with_context(|| {
            format!(
                "Failed to load index '{}'. Run 'bundlectl index update {}' to refresh it",
                entry.name, entry.name
            )
        })?;
        indexes.push(index);
    }

    let mut merged = MergedIndexes::new();
    merged.merge(indexes);

    tracing::debug!(
        indexes = merged.sources().len(),
        entries = merged.len(),
        "Loaded merged indexes"
    );
    Ok(merged)
}

/// Filesystem layout of the bundlectl configuration
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Paths {
    root: PathBuf,
}

impl Paths {
    pub fn new(root: impl Into<PathBuf>) -> Self {
        Self { root: root.into() }
    }

    /// Use `root` if given, otherwise the platform configuration directory
    pub fn discover(root: Option<PathBuf>) -> Result<Self> {
        if let Some(root) = root {
            return Ok(Self::new(root));
        }

        let root = directories::ProjectDirs::from("dev", "bundlectl", "bundlectl")
            .map(|dirs| dirs.config_dir().to_path_buf())
            .context("Could not determine config directory")?;

        Ok(Self::new(root))
    }

    pub fn root(&self) -> &Path {
        &self.root
    }

    pub fn indexes_file(&self) -> PathBuf {
        self.root.join(INDEXES_FILE)
    }

    pub fn indexes_dir(&self) -> PathBuf {
        self.root.join(INDEXES_DIR)
    }

    /// Path of the cached copy of index `name`
    pub fn index_file(&self, name: &str) -> PathBuf {
        index_file(&self.indexes_dir(), name)
    }

    /// Create the root and indexes directories
    pub fn ensure_dirs(&self) -> Result<()> {
        let dir = self.indexes_dir();
        std::fs::create_dir_all(&dir)
            .with_context(|| format!("Failed to create indexes directory: {}", dir.display()))
    }
}

fn index_file(dir: &Path, name: &str) -> PathBuf {
    dir.join(format!("{name}.yaml"))
}

fn validate_name(name: &str) -> Result<()> {
    if name.is_empty() {
        anyhow::bail!("Index name is required");
    }

    if name.starts_with('.')
        || !name
            .chars()
            .all(|c| c.is_ascii_alphanumeric() || c == '-' || c == '_' || c == '.')
    {
        anyhow::bail!(
            "Index name '{}' must be alphanumeric with '-', '_' or '.' and must not start with '.'",
            name
        );
    }

    Ok(())
}

#[cfg(test)]
mod config_tests {
    use super::*;
    use crate::catalog::{ArtifactType, Entry};
    use chrono::TimeZone;
    use tempfile::TempDir;

    fn at(secs: i64) -> DateTime<Utc> {
        Utc.timestamp_opt(secs, 0).unwrap()
    }

    fn write_index(dir: &Path, name: &str, entries: &[(&str, &str)]) {
        let mut index = Index::new(name);
        for (entry_name, registry) in entries {
            index.upsert(Entry::new(
                *entry_name,
                ArtifactType::Plugin,
                *registry,
                format!("plugins/{entry_name}"),
            ));
        }
        index.write(index_file(dir, name)).unwrap();
    }

    #[test]
    fn test_load_missing_is_empty() {
        let temp_dir = TempDir::new().unwrap();
        let config = IndexConfig::load(&temp_dir.path().join(INDEXES_FILE)).unwrap();
        assert!(config.configs.is_empty());
    }

    #[test]
    fn test_save_and_load() {
        let temp_dir = TempDir::new().unwrap();
        let path = temp_dir.path().join("nested").join(INDEXES_FILE);

        let mut config = IndexConfig::default();
        config.upsert("falcosecurity", Path::new("/tmp/index.yaml")).unwrap();
        config.save(&path).unwrap();

        let content = std::fs::read_to_string(&path).unwrap();
        assert!(content.contains("addedTimestamp"));
        assert!(content.contains("updatedTimestamp"));

        let loaded = IndexConfig::load(&path).unwrap();
        assert_eq!(loaded, config);
    }

    #[test]
    fn test_save_reports_unwritable_parent() {
        let temp_dir = TempDir::new().unwrap();
        let blocker = temp_dir.path().join("blocker");
        std::fs::write(&blocker, "").unwrap();

        let err = IndexConfig::default()
            .save(&blocker.join("sub").join(INDEXES_FILE))
            .unwrap_err();
        assert!(err.to_string().contains("Failed to create config directory"));
        assert!(err.to_string().contains("blocker"));
    }

    #[test]
    fn test_load_invalid_yaml() {
        let temp_dir = TempDir::new().unwrap();
        let path = temp_dir.path().join(INDEXES_FILE);
        std::fs::write(&path, "configs: [not, valid").unwrap();

        let err = IndexConfig::load(&path).unwrap_err();
        assert!(err.to_string().contains("Failed to parse index config"));
    }

    #[test]
    fn test_upsert_existing_keeps_added_time() {
        let mut config = IndexConfig::default();
        config.configs.push(IndexConfigEntry {
            name: "local".to_string(),
            source: PathBuf::from("/old/index.yaml"),
            added_timestamp: at(1_000),
            updated_timestamp: at(1_000),
        });

        let updated = config.upsert("local", Path::new("/new/index.yaml")).unwrap();
        assert_eq!(updated.source, PathBuf::from("/new/index.yaml"));
        assert_eq!(updated.added_timestamp, at(1_000));
        assert!(updated.updated_timestamp > at(1_000));
        assert_eq!(config.configs.len(), 1);
    }

    #[test]
    fn test_upsert_rejects_bad_names() {
        let mut config = IndexConfig::default();
        for name in ["", "../escape", "a/b", ".hidden", "with space"] {
            assert!(config.upsert(name, Path::new("x")).is_err(), "{name:?}");
        }
        assert!(config.upsert("my-index_v1.2", Path::new("x")).is_ok());
    }

    #[test]
    fn test_remove() {
        let mut config = IndexConfig::default();
        config.upsert("a", Path::new("a.yaml")).unwrap();
        config.upsert("b", Path::new("b.yaml")).unwrap();

        let removed = config.remove("a").unwrap();
        assert_eq!(removed.name, "a");
        assert!(config.get("a").is_none());
        assert!(config.get("b").is_some());

        let err = config.remove("a").unwrap_err();
        assert!(err.to_string().contains("not found"));
    }

    #[test]
    fn test_load_merged_orders_by_added_time() {
        let temp_dir = TempDir::new().unwrap();
        let dir = temp_dir.path();
        write_index(dir, "newer", &[("shared", "r-newer"), ("only-newer", "r-newer")]);
        write_index(dir, "older", &[("shared", "r-older"), ("only-older", "r-older")]);

        let config = IndexConfig {
            configs: vec![
                IndexConfigEntry {
                    name: "newer".to_string(),
                    source: PathBuf::from("newer.yaml"),
                    added_timestamp: at(2_000),
                    updated_timestamp: at(2_000),
                },
                IndexConfigEntry {
                    name: "older".to_string(),
                    source: PathBuf::from("older.yaml"),
                    added_timestamp: at(1_000),
                    updated_timestamp: at(3_000),
                },
            ],
        };

        let merged = load_merged(&config, dir).unwrap();
        assert_eq!(merged.len(), 3);

        let shared = merged.entry_by_name("shared").unwrap();
        assert_eq!(shared.registry, "r-newer");
        assert_eq!(merged.index_by_entry(shared).unwrap().name(), "newer");

        let sources: Vec<&str> = merged.sources().iter().map(|i| i.name()).collect();
        assert_eq!(sources, vec!["older", "newer"]);
    }

    #[test]
    fn test_load_merged_missing_cache_file() {
        let temp_dir = TempDir::new().unwrap();
        let mut config = IndexConfig::default();
        config.upsert("gone", Path::new("gone.yaml")).unwrap();

        let err = load_merged(&config, temp_dir.path()).unwrap_err();
        assert!(err.to_string().contains("Failed to load index 'gone'"));
    }

    #[test]
    fn test_paths_layout() {
        let paths = Paths::new("/etc/bundlectl");
        assert_eq!(paths.indexes_file(), PathBuf::from("/etc/bundlectl/indexes.yaml"));
        assert_eq!(paths.indexes_dir(), PathBuf::from("/etc/bundlectl/indexes"));
        assert_eq!(
            paths.index_file("falcosecurity"),
            PathBuf::from("/etc/bundlectl/indexes/falcosecurity.yaml")
        );

        let explicit = Paths::discover(Some(PathBuf::from("/opt/b"))).unwrap();
        assert_eq!(explicit.root(), Path::new("/opt/b"));
    }
}
