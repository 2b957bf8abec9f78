//! Declarative field configuration.
//!
//! A run is driven by a [`RunConfig`]: the folders to stamp, the header-writer
//! command with its parameter template, and the ordered [`OutputField`]s. Each
//! field is assembled from an ordered list of [`SourceSpec`]s.
//!
//! Configurations are read from TOML with [`ConfigFile`], which also picks
//! the block matching a project and step:
//!
//! ```no_run
//! use xmpstamp::config::ConfigFile;
//!
//! let file = ConfigFile::load("xmpstamp.toml")?;
//! let selected = file.select("Digitization", "Write headers")?;
//! println!("{} fields", selected.config.fields.len());
//! # Ok::<(), xmpstamp::Error>(())
//! ```

mod field;
mod file;
mod run;

pub use field::{
    DocstructSource, DocstructUse, MetadataSource, OutputField, PropertySource, Scope, SourceSpec,
};
pub use file::{ConfigBlock, ConfigFile, SelectedConfig, WILDCARD};
pub use run::{RunConfig, FILE_PLACEHOLDER, PARAM_PLACEHOLDER};

/// Separator used wherever none is configured.
pub const DEFAULT_SEPARATOR: &str = " ";

pub(crate) fn default_separator() -> String {
    DEFAULT_SEPARATOR.to_string()
}

pub(crate) fn default_true() -> bool {
    true
}

/// Replace the escaped-space notation used in older configurations.
pub(crate) fn unescape_spaces(value: &str) -> String {
    value.replace("\\u0020", " ")
}
