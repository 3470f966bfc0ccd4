//! bundlectl index commands
//!
//! Import, refresh, remove and list the locally cached indexes.

use anyhow::{Context, Result};
use clap::{Parser, Subcommand};
use std::path::{Path, PathBuf};
use tabled::{
    settings::{object::Rows, Alignment, Modify, Style},
    Table, Tabled,
};

use bundlectl_core::catalog::{Index, IndexConfig, Paths};

/// Index subcommand for managing the configured indexes
#[derive(Parser, Debug)]
pub struct IndexCommand {
    #[clap(subcommand)]
    pub command: IndexSubcommand,
}

#[derive(Subcommand, Debug)]
pub enum IndexSubcommand {
    /// Add an index from a local index file
    Add {
        /// Index name (e.g., "falcosecurity")
        name: String,
        /// Path of the index file to import
        path: PathBuf,
    },

    /// Re-import indexes from the files they were added from
    Update {
        /// Index names (updates all if omitted)
        names: Vec<String>,
    },

    /// Remove an index
    Remove {
        /// Index name
        name: String,
    },

    /// List configured indexes
    #[clap(alias = "ls")]
    List {
        /// Output as JSON
        #[clap(long)]
        json: bool,
    },
}

impl IndexCommand {
    pub fn execute(self, paths: &Paths) -> Result<()> {
        match self.command {
            IndexSubcommand::Add { name, path } => execute_add(paths, &name, &path),
            IndexSubcommand::Update { names } => execute_update(paths, &names),
            IndexSubcommand::Remove { name } => execute_remove(paths, &name),
            IndexSubcommand::List { json } => execute_list(paths, json),
        }
    }
}

/// Read and validate the index file at `source`
fn read_source(name: &str, source: &Path) -> Result<Index> {
    Index::from_file(name, source).with_context(|| {
        format!(
            "Failed to import index '{}' from {}",
            name,
            source.display()
        )
    })
}

/// Store the normalized copy of `index` in the indexes directory
fn store_index(paths: &Paths, mut index: Index) -> Result<usize> {
    paths.ensure_dirs()?;
    index.write(paths.index_file(index.name()))?;

    tracing::info!(index = index.name(), entries = index.len(), "Imported index");
    Ok(index.len())
}

fn execute_add(paths: &Paths, name: &str, source: &Path) -> Result<()> {
    let config_path = paths.indexes_file();
    let mut config = IndexConfig::load(&config_path)?;

    if config.get(name).is_some() {
        anyhow::bail!(
            "Index '{}' already exists. Use 'bundlectl index update {}' to refresh it",
            name,
            name
        );
    }

    let source = std::path::absolute(source)
        .with_context(|| format!("Invalid index path: {}", source.display()))?;

    // Validates the name before anything is written
    config.upsert(name, &source)?;
    let count = store_index(paths, read_source(name, &source)?)?;
    config.save(&config_path)?;

    println!("Added index '{name}' with {count} artifact(s)");
    Ok(())
}

fn execute_update(paths: &Paths, names: &[String]) -> Result<()> {
    let config_path = paths.indexes_file();
    let mut config = IndexConfig::load(&config_path)?;

    let targets: Vec<String> = if names.is_empty() {
        config.configs.iter().map(|c| c.name.clone()).collect()
    } else {
        names.to_vec()
    };

    if targets.is_empty() {
        println!("No indexes configured.");
        println!("\nRun 'bundlectl index add <name> <path>' to add one.");
        return Ok(());
    }

    // Every source must read cleanly before any cached copy is replaced
    let mut indexes = Vec::with_capacity(targets.len());
    for name in &targets {
        let source = config
            .get(name)
            .map(|c| c.source.clone())
            .with_context(|| format!("Index '{name}' not found"))?;

        indexes.push((read_source(name, &source)?, source));
    }

    for (index, source) in indexes {
        let name = index.name().to_string();
        let count = store_index(paths, index)?;
        config.upsert(&name, &source)?;
        config.save(&config_path)?;
        println!("Updated index '{name}' ({count} artifact(s))");
    }

    Ok(())
}

fn execute_remove(paths: &Paths, name: &str) -> Result<()> {
    let config_path = paths.indexes_file();
    let mut config = IndexConfig::load(&config_path)?;

    config.remove(name)?;

    let index_path = paths.index_file(name);
    if index_path.exists() {
        std::fs::remove_file(&index_path)
            .with_context(|| format!("Failed to remove index file: {}", index_path.display()))?;
    }

    config.save(&config_path)?;

    println!("Removed index '{name}'");
    Ok(())
}

/// Table row for configured indexes
#[derive(Tabled)]
struct IndexRow {
    #[tabled(rename = "Name")]
    name: String,
    #[tabled(rename = "Source")]
    source: String,
    #[tabled(rename = "Added")]
    added: String,
    #[tabled(rename = "Updated")]
    updated: String,
}

fn execute_list(paths: &Paths, json_output: bool) -> Result<()> {
    let config = IndexConfig::load(&paths.indexes_file())?;

    if json_output {
        println!("{}", serde_json::to_string_pretty(&config.configs)?);
        return Ok(());
    }

    if config.configs.is_empty() {
        println!("No indexes configured.");
        println!("\nRun 'bundlectl index add <name> <path>' to add one.");
        return Ok(());
    }

    let table_rows: Vec<IndexRow> = config
        .configs
        .iter()
        .map(|c| IndexRow {
            name: c.name.clone(),
            source: c.source.display().to_string(),
            added: c.added_timestamp.format("%Y-%m-%d %H:%M:%S").to_string(),
            updated: c.updated_timestamp.format("%Y-%m-%d %H:%M:%S").to_string(),
        })
        .collect();

    let table = Table::new(&table_rows)
        .with(Style::rounded())
        .with(Modify::new(Rows::first()).with(Alignment::center()))
        .to_string();

    println!("{table}");
    Ok(())
}
