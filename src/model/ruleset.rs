//! Ruleset: the catalogue of metadata and structure types.

use crate::error::{Error, Result};
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

/// A declared metadata type.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct MetadataType {
    /// Internal name (e.g., "TitleDocMain")
    pub name: String,

    /// Whether values of this type are stored as persons
    #[serde(default)]
    pub person: bool,
}

impl MetadataType {
    /// Declare a literal metadata type.
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            person: false,
        }
    }

    /// Declare a person metadata type.
    pub fn person(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            person: true,
        }
    }
}

/// A declared structure type.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct StructureType {
    /// Internal name (e.g., "Chapter")
    pub name: String,

    /// Whether elements of this type wrap the actual work (series, periodical)
    #[serde(default)]
    pub anchor: bool,

    /// Display labels keyed by language code
    #[serde(default)]
    pub labels: BTreeMap<String, String>,
}

impl StructureType {
    /// Declare a structure type without labels.
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            anchor: false,
            labels: BTreeMap::new(),
        }
    }

    /// Mark the type as anchor.
    pub fn anchor(mut self) -> Self {
        self.anchor = true;
        self
    }

    /// Add a label for a language.
    pub fn with_label(mut self, language: impl Into<String>, label: impl Into<String>) -> Self {
        self.labels.insert(language.into(), label.into());
        self
    }
}

/// Ruleset of a work.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct Ruleset {
    /// Metadata types
    #[serde(default)]
    pub metadata: Vec<MetadataType>,

    /// Structure types
    #[serde(default)]
    pub structures: Vec<StructureType>,
}

impl Ruleset {
    /// Create an empty ruleset.
    pub fn new() -> Self {
        Self::default()
    }

    /// Parse a ruleset from JSON.
    pub fn from_json(json: &str) -> Result<Self> {
        serde_json::from_str(json)
            .map_err(|e| Error::Configuration(format!("The ruleset is not valid: {}", e)))
    }

    /// Declare a metadata type.
    pub fn add_metadata_type(&mut self, metadata_type: MetadataType) {
        self.metadata.push(metadata_type);
    }

    /// Declare a structure type.
    pub fn add_structure_type(&mut self, structure_type: StructureType) {
        self.structures.push(structure_type);
    }

    /// Builder variant of [`Ruleset::add_metadata_type`].
    pub fn with_metadata_type(mut self, metadata_type: MetadataType) -> Self {
        self.add_metadata_type(metadata_type);
        self
    }

    /// Builder variant of [`Ruleset::add_structure_type`].
    pub fn with_structure_type(mut self, structure_type: StructureType) -> Self {
        self.add_structure_type(structure_type);
        self
    }

    /// Look up a metadata type by name.
    pub fn metadata_type(&self, name: &str) -> Option<&MetadataType> {
        self.metadata.iter().find(|t| t.name == name)
    }

    /// Look up a structure type by name.
    pub fn structure_type(&self, name: &str) -> Option<&StructureType> {
        self.structures.iter().find(|t| t.name == name)
    }

    /// Check if a structure type is declared as anchor.
    pub fn is_anchor(&self, type_name: &str) -> bool {
        self.structure_type(type_name).is_some_and(|t| t.anchor)
    }

    /// Label of a structure type in a language.
    ///
    /// Falls back to the internal type name when the type or the translation
    /// is unknown.
    pub fn label<'a>(&'a self, type_name: &'a str, language: &str) -> &'a str {
        self.structure_type(type_name)
            .and_then(|t| t.labels.get(language))
            .map(String::as_str)
            .unwrap_or(type_name)
    }

    /// Check if the ruleset declares nothing at all.
    pub fn is_empty(&self) -> bool {
        self.metadata.is_empty() && self.structures.is_empty()
    }
}
