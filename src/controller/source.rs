//! Where the document structure of a run comes from.

use crate::error::{Error, Result};
use crate::model::DocumentStructure;
use std::borrow::Cow;
use std::fs;
use std::path::{Path, PathBuf};

/// Provides the document structure of the work being stamped.
pub trait StructureSource {
    /// Load the structure. Any failure is a metadata read error.
    fn load(&self) -> Result<Cow<'_, DocumentStructure>>;
}

impl StructureSource for DocumentStructure {
    fn load(&self) -> Result<Cow<'_, DocumentStructure>> {
        self.validate()?;
        Ok(Cow::Borrowed(self))
    }
}

/// A document structure stored as JSON on disk.
#[derive(Debug, Clone)]
pub struct StructureFile {
    path: PathBuf,
}

impl StructureFile {
    /// Point at a structure file.
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }

    /// Path of the file.
    pub fn path(&self) -> &Path {
        &self.path
    }
}

impl StructureSource for StructureFile {
    fn load(&self) -> Result<Cow<'_, DocumentStructure>> {
        let json = fs::read_to_string(&self.path).map_err(|e| {
            Error::MetadataRead(format!("cannot read {}: {}", self.path.display(), e))
        })?;
        DocumentStructure::from_json(&json).map(Cow::Owned)
    }
}
