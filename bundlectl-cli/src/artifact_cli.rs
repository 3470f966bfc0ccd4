//! bundlectl artifact commands
//!
//! List, search and inspect the artifacts of all configured indexes.

use anyhow::{Context, Result};
use clap::{Parser, Subcommand};
use tabled::{
    settings::{object::Rows, Alignment, Modify, Style},
    Table, Tabled,
};

use bundlectl_core::catalog::{load_merged, ArtifactType, Entry, IndexConfig, MergedIndexes, Paths};

/// Default minimum score for a keyword to match an artifact name
pub const DEFAULT_MIN_SCORE: f64 = 0.65;

/// Artifact subcommand for browsing the merged indexes
#[derive(Parser, Debug)]
pub struct ArtifactCommand {
    #[clap(subcommand)]
    pub command: ArtifactSubcommand,
}

#[derive(Subcommand, Debug)]
pub enum ArtifactSubcommand {
    /// List all artifacts
    #[clap(alias = "ls")]
    List {
        /// Only list artifacts of a specific type ("rulesfile", "plugin", "asset")
        #[clap(long = "type", value_name = "TYPE")]
        artifact_type: Option<ArtifactType>,

        /// Only display artifacts from a configured index
        #[clap(long)]
        index: Option<String>,

        /// Output as JSON
        #[clap(long)]
        json: bool,
    },

    /// Search artifacts by keywords
    Search {
        /// Keywords matched against artifact names and keywords
        #[clap(required = true)]
        keywords: Vec<String>,

        /// Minimum score (0 to 1) for a keyword to match an artifact name
        #[clap(long, default_value_t = DEFAULT_MIN_SCORE, value_parser = parse_min_score)]
        min_score: f64,

        /// Only show artifacts of a specific type
        #[clap(long = "type", value_name = "TYPE")]
        artifact_type: Option<ArtifactType>,

        /// Output as JSON
        #[clap(long)]
        json: bool,
    },

    /// Show detailed information about an artifact
    Info {
        /// Artifact name
        name: String,

        /// Output as JSON
        #[clap(long)]
        json: bool,
    },
}

impl ArtifactCommand {
    pub fn execute(self, paths: &Paths) -> Result<()> {
        let config = IndexConfig::load(&paths.indexes_file())?;
        let merged = load_merged(&config, &paths.indexes_dir())?;

        match self.command {
            ArtifactSubcommand::List {
                artifact_type,
                index,
                json,
            } => execute_list(&merged, artifact_type, index.as_deref(), json),
            ArtifactSubcommand::Search {
                keywords,
                min_score,
                artifact_type,
                json,
            } => execute_search(&merged, &keywords, min_score, artifact_type, json),
            ArtifactSubcommand::Info { name, json } => execute_info(&merged, &name, json),
        }
    }
}

fn parse_min_score(s: &str) -> Result<f64, String> {
    let score: f64 = s
        .parse()
        .map_err(|_| format!("Invalid score: {s}"))?;

    if !(0.0..=1.0).contains(&score) {
        return Err(format!("Score must be between 0 and 1, got {s}"));
    }

    Ok(score)
}

/// Table row for artifacts
#[derive(Tabled)]
struct ArtifactRow {
    #[tabled(rename = "Index")]
    index: String,
    #[tabled(rename = "Artifact")]
    name: String,
    #[tabled(rename = "Type")]
    artifact_type: String,
    #[tabled(rename = "Registry")]
    registry: String,
    #[tabled(rename = "Repository")]
    repository: String,
}

fn index_name<'a>(merged: &'a MergedIndexes, entry: &Entry) -> &'a str {
    merged
        .index_by_entry(entry)
        .map(|index| index.name())
        .unwrap_or_default()
}

fn print_artifacts(merged: &MergedIndexes, entries: &[&Entry], json_output: bool) -> Result<()> {
    if json_output {
        let json_results: Vec<serde_json::Value> = entries
            .iter()
            .map(|entry| {
                serde_json::json!({
                    "index": index_name(merged, entry),
                    "name": entry.name(),
                    "type": entry.artifact_type,
                    "registry": entry.registry,
                    "repository": entry.repository,
                })
            })
            .collect();

        println!("{}", serde_json::to_string_pretty(&json_results)?);
        return Ok(());
    }

    if entries.is_empty() {
        println!("No artifacts found.");
        return Ok(());
    }

    let table_rows: Vec<ArtifactRow> = entries
        .iter()
        .map(|entry| ArtifactRow {
            index: index_name(merged, entry).to_string(),
            name: entry.name().to_string(),
            artifact_type: entry.artifact_type.to_string(),
            registry: entry.registry.clone(),
            repository: entry.repository.clone(),
        })
        .collect();

    let table = Table::new(&table_rows)
        .with(Style::rounded())
        .with(Modify::new(Rows::first()).with(Alignment::center()))
        .to_string();

    println!("{table}");
    Ok(())
}

fn execute_list(
    merged: &MergedIndexes,
    artifact_type: Option<ArtifactType>,
    index: Option<&str>,
    json_output: bool,
) -> Result<()> {
    if let Some(name) = index {
        if !merged.sources().iter().any(|i| i.name() == name) {
            anyhow::bail!("Index '{}' not found", name);
        }
    }

    let entries: Vec<&Entry> = merged
        .iter()
        .filter(|entry| artifact_type.map_or(true, |t| entry.artifact_type == t))
        .filter(|entry| index.map_or(true, |name| index_name(merged, entry) == name))
        .collect();

    print_artifacts(merged, &entries, json_output)
}

fn execute_search(
    merged: &MergedIndexes,
    keywords: &[String],
    min_score: f64,
    artifact_type: Option<ArtifactType>,
    json_output: bool,
) -> Result<()> {
    let mut results = merged.search_by_keywords(min_score, keywords);
    results.retain(|entry| artifact_type.map_or(true, |t| entry.artifact_type == t));

    // Sort by name
    results.sort_by(|a, b| a.name().cmp(b.name()));

    tracing::debug!(
        keywords = ?keywords,
        min_score,
        matches = results.len(),
        "Searched artifacts"
    );

    print_artifacts(merged, &results, json_output)
}

fn execute_info(merged: &MergedIndexes, name: &str, json_output: bool) -> Result<()> {
    let entry = merged
        .entry_by_name(name)
        .with_context(|| format!("Artifact '{name}' not found in the configured indexes"))?;
    let index = index_name(merged, entry);

    if json_output {
        let output = serde_json::json!({
            "index": index,
            "entry": entry,
        });
        println!("{}", serde_json::to_string_pretty(&output)?);
        return Ok(());
    }

    println!("Artifact:   {}", entry.name());
    println!("Type:       {}", entry.artifact_type);
    println!("Index:      {index}");
    println!("Reference:  {}", entry.reference());

    if !entry.license.is_empty() {
        println!("License:    {}", entry.license);
    }
    if !entry.home.is_empty() {
        println!("Home:       {}", entry.home);
    }
    if !entry.keywords.is_empty() {
        println!("Keywords:   {}", entry.keywords.join(", "));
    }

    if !entry.description.is_empty() {
        println!();
        println!("Description:");
        for line in entry.description.lines() {
            println!("  {line}");
        }
    }

    if !entry.maintainers.is_empty() {
        println!();
        println!("Maintainers:");
        for maintainer in &entry.maintainers {
            if maintainer.email.is_empty() {
                println!("  {}", maintainer.name);
            } else {
                println!("  {} <{}>", maintainer.name, maintainer.email);
            }
        }
    }

    if !entry.sources.is_empty() {
        println!();
        println!("Sources:");
        for source in &entry.sources {
            println!("  {source}");
        }
    }

    Ok(())
}
