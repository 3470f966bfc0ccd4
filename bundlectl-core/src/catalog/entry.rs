//! Index entries: one artifact descriptor per name

use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;
use uuid::Uuid;

/// Artifact kinds an index can describe
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ArtifactType {
    Rulesfile,
    Plugin,
    Asset,
}

impl ArtifactType {
    /// All accepted values, in display order
    pub const ALL: [ArtifactType; 3] = [
        ArtifactType::Rulesfile,
        ArtifactType::Plugin,
        ArtifactType::Asset,
    ];

    pub fn as_str(&self) -> &'static str {
        match self {
            ArtifactType::Rulesfile => "rulesfile",
            ArtifactType::Plugin => "plugin",
            ArtifactType::Asset => "asset",
        }
    }
}

impl fmt::Display for ArtifactType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for ArtifactType {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        ArtifactType::ALL
            .into_iter()
            .find(|t| t.as_str().eq_ignore_ascii_case(s))
            .ok_or_else(|| {
                format!(
                    "Invalid artifact type '{s}'. Allowed values: \"rulesfile\", \"plugin\", \"asset\""
                )
            })
    }
}

/// Stable identity of an entry
///
/// Assigned when an entry is created or decoded and never serialized.
/// Clones share the identity of their original; [`Entry::with_name`] gives
/// the renamed entry a new one.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct EntryId(Uuid);

impl EntryId {
    fn fresh() -> Self {
        EntryId(Uuid::now_v7())
    }
}

impl Default for EntryId {
    fn default() -> Self {
        Self::fresh()
    }
}

impl fmt::Display for EntryId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        self.0.fmt(f)
    }
}

/// Maintainer information
#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize, Deserialize)]
pub struct Maintainer {
    #[serde(default)]
    pub name: String,

    #[serde(default)]
    pub email: String,
}

/// An artifact descriptor stored in an index
///
/// Equality compares content only; use [`Entry::id`] for identity.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Entry {
    #[serde(skip)]
    id: EntryId,

    // Mandatory fields
    /// Artifact name, unique within an index
    name: String,

    /// Kind of artifact
    #[serde(rename = "type")]
    pub artifact_type: ArtifactType,

    /// OCI registry hosting the artifact
    pub registry: String,

    /// Repository of the artifact inside the registry
    pub repository: String,

    // Optional fields
    /// Human-readable description
    #[serde(default)]
    pub description: String,

    /// Project homepage
    #[serde(default)]
    pub home: String,

    /// Searchable keywords
    #[serde(default)]
    pub keywords: Vec<String>,

    /// SPDX license identifier
    #[serde(default)]
    pub license: String,

    /// People responsible for the artifact
    #[serde(default)]
    pub maintainers: Vec<Maintainer>,

    /// Source URLs
    #[serde(default)]
    pub sources: Vec<String>,
}

impl Entry {
    /// Create an entry with the mandatory fields and a fresh identity
    pub fn new(
        name: impl Into<String>,
        artifact_type: ArtifactType,
        registry: impl Into<String>,
        repository: impl Into<String>,
    ) -> Self {
        Self {
            id: EntryId::fresh(),
            name: name.into(),
            artifact_type,
            registry: registry.into(),
            repository: repository.into(),
            description: String::new(),
            home: String::new(),
            keywords: Vec::new(),
            license: String::new(),
            maintainers: Vec::new(),
            sources: Vec::new(),
        }
    }

    pub fn id(&self) -> EntryId {
        self.id
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    /// Rename the entry
    ///
    /// A renamed entry is a different record, so it gets a fresh identity.
    pub fn with_name(mut self, name: impl Into<String>) -> Self {
        self.name = name.into();
        self.id = EntryId::fresh();
        self
    }

    pub fn with_description(mut self, description: impl Into<String>) -> Self {
        self.description = description.into();
        self
    }

    pub fn with_home(mut self, home: impl Into<String>) -> Self {
        self.home = home.into();
        self
    }

    pub fn with_keywords<I, S>(mut self, keywords: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.keywords = keywords.into_iter().map(Into::into).collect();
        self
    }

    pub fn with_license(mut self, license: impl Into<String>) -> Self {
        self.license = license.into();
        self
    }

    pub fn with_maintainer(mut self, name: impl Into<String>, email: impl Into<String>) -> Self {
        self.maintainers.push(Maintainer {
            name: name.into(),
            email: email.into(),
        });
        self
    }

    pub fn with_sources<I, S>(mut self, sources: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.sources = sources.into_iter().map(Into::into).collect();
        self
    }

    /// Location of the artifact content, `registry/repository`
    pub fn reference(&self) -> String {
        format!("{}/{}", self.registry, self.repository)
    }
}

impl PartialEq for Entry {
    fn eq(&self, other: &Self) -> bool {
        self.name == other.name
            && self.artifact_type == other.artifact_type
            && self.registry == other.registry
            && self.repository == other.repository
            && self.description == other.description
            && self.home == other.home
            && self.keywords == other.keywords
            && self.license == other.license
            && self.maintainers == other.maintainers
            && self.sources == other.sources
    }
}

impl Eq for Entry {}

#[cfg(test)]
mod entry_tests {
    use super::*;

    #[test]
    fn test_artifact_type_parse() {
        assert_eq!("rulesfile".parse::<ArtifactType>(), Ok(ArtifactType::Rulesfile));
        assert_eq!("Plugin".parse::<ArtifactType>(), Ok(ArtifactType::Plugin));
        assert_eq!("asset".parse::<ArtifactType>(), Ok(ArtifactType::Asset));

        let err = "library".parse::<ArtifactType>().unwrap_err();
        assert!(err.contains("library"));
        assert!(err.contains("rulesfile"));
    }

    #[test]
    fn test_new_entries_get_distinct_ids() {
        let a = Entry::new("k8saudit", ArtifactType::Plugin, "ghcr.io", "falco/k8saudit");
        let b = Entry::new("k8saudit", ArtifactType::Plugin, "ghcr.io", "falco/k8saudit");

        assert_eq!(a, b);
        assert_ne!(a.id(), b.id());
        assert_eq!(a.clone().id(), a.id());
    }

    #[test]
    fn test_with_name_mints_fresh_id() {
        let original = Entry::new("cloudtrail", ArtifactType::Plugin, "ghcr.io", "plugins/cloudtrail");
        let renamed = original.clone().with_name("cloudtrail-fork");

        assert_eq!(renamed.name(), "cloudtrail-fork");
        assert_eq!(renamed.registry, original.registry);
        assert_ne!(renamed.id(), original.id());
    }

    #[test]
    fn test_decode_optional_fields_default() {
        let yaml = r#"
name: cloudtrail
type: plugin
registry: ghcr.io
repository: falcosecurity/plugins/plugin/cloudtrail
"#;
        let entry: Entry = serde_yaml_ng::from_str(yaml).unwrap();
        assert_eq!(entry.artifact_type, ArtifactType::Plugin);
        assert!(entry.description.is_empty());
        assert!(entry.keywords.is_empty());
        assert!(entry.maintainers.is_empty());
        assert_eq!(
            entry.reference(),
            "ghcr.io/falcosecurity/plugins/plugin/cloudtrail"
        );
    }

    #[test]
    fn test_decode_rejects_unknown_type() {
        let yaml = "name: x\ntype: library\nregistry: r\nrepository: p\n";
        assert!(serde_yaml_ng::from_str::<Entry>(yaml).is_err());
    }

    #[test]
    fn test_encode_uses_declared_field_names() {
        let entry = Entry::new("cloudtrail", ArtifactType::Plugin, "ghcr.io", "plugins/cloudtrail")
            .with_keywords(["audit", "aws"])
            .with_maintainer("The Falco Authors", "cncf-falco-dev@lists.cncf.io");

        let yaml = serde_yaml_ng::to_string(&entry).unwrap();
        for key in [
            "name:",
            "type: plugin",
            "registry:",
            "repository:",
            "description:",
            "home:",
            "keywords:",
            "license:",
            "maintainers:",
            "email:",
            "sources:",
        ] {
            assert!(yaml.contains(key), "missing {key} in:\n{yaml}");
        }
        assert!(!yaml.contains("id:"));
    }
}
