//! # xmpstamp
//!
//! Write descriptive metadata into the headers of digitized images.
//!
//! A run takes the document structure of a digitized work (logical sections,
//! an optional anchor for series, and the physical sequence of pages), a
//! declarative field configuration, and one or more image folders. Every
//! image gets a list of `name=value` tokens which are passed to an external
//! header writer such as exiftool.
//!
//! ## Quick Start
//!
//! ```no_run
//! use xmpstamp::{load_config, load_ruleset, Controller, FolderImageSource, StructureFile};
//! use xmpstamp::journal::LogJournal;
//! use xmpstamp::writer::CommandWriter;
//!
//! fn main() -> xmpstamp::Result<()> {
//!     let selected = load_config("xmpstamp.toml", "Digitization", "Write headers")?;
//!     let ruleset = load_ruleset("ruleset.json")?;
//!
//!     let controller =
//!         Controller::from_selected(selected, ruleset, FolderImageSource::new("images"));
//!     let report = controller.run(
//!         &StructureFile::new("structure.json"),
//!         &mut CommandWriter::new(),
//!         &mut LogJournal,
//!     )?;
//!
//!     println!("{} images written", report.images_written());
//!     Ok(())
//! }
//! ```
//!
//! ## Features
//!
//! - **Source kinds**: metadata, structure type labels, static text, process
//!   properties, file names and variable expressions
//! - **Scopes**: physical root, top logical node, anchor, page and the
//!   logical sections claiming a page
//! - **Reconciliation**: per-page values when images and pages line up, a
//!   default field set otherwise
//! - **Pluggable boundaries**: structure source, image listing, header writer
//!   and journal are traits

pub mod config;
pub mod controller;
pub mod error;
pub mod images;
pub mod journal;
pub mod model;
pub mod render;
pub mod resolve;
pub mod variables;
pub mod writer;

// Re-export commonly used types
pub use config::{ConfigFile, OutputField, RunConfig, Scope, SelectedConfig, SourceSpec};
pub use controller::{Controller, RenderMode, RunReport, StructureFile, StructureSource};
pub use error::{Error, ErrorKind, Result};
pub use images::{FolderImageSource, ImageSource};
pub use journal::{Journal, JournalEntry, LogType};
pub use model::{DocStruct, DocumentStructure, NodeId, ProcessProperties, Ruleset};
pub use resolve::{Context, Resolver};
pub use variables::{VariableReplacer, VariableResolver};
pub use writer::{CommandWriter, DryRunWriter, HeaderWriter};

use std::fs;
use std::path::Path;

/// Load a configuration file and select the block for a project and step.
///
/// # Example
///
/// ```no_run
/// use xmpstamp::load_config;
///
/// let selected = load_config("xmpstamp.toml", "Prints", "Export").unwrap();
/// println!("{} fields", selected.config.fields.len());
/// ```
pub fn load_config<P: AsRef<Path>>(path: P, project: &str, step: &str) -> Result<SelectedConfig> {
    ConfigFile::load(path)?.select(project, step)
}

/// Load a ruleset from a JSON file.
pub fn load_ruleset<P: AsRef<Path>>(path: P) -> Result<Ruleset> {
    let path = path.as_ref();
    let json = fs::read_to_string(path)
        .map_err(|e| Error::Configuration(format!("cannot read {}: {}", path.display(), e)))?;
    Ruleset::from_json(&json)
}

/// Load process properties from a JSON file.
pub fn load_properties<P: AsRef<Path>>(path: P) -> Result<ProcessProperties> {
    let path = path.as_ref();
    let json = fs::read_to_string(path)
        .map_err(|e| Error::MetadataRead(format!("cannot read {}: {}", path.display(), e)))?;
    ProcessProperties::from_json(&json)
}

/// Load a document structure from a JSON file.
pub fn load_structure<P: AsRef<Path>>(path: P) -> Result<DocumentStructure> {
    StructureFile::new(path.as_ref())
        .load()
        .map(std::borrow::Cow::into_owned)
}
