//! Run configuration.

use serde::{Deserialize, Serialize};

use super::OutputField;

/// Parameter token replaced by all rendered field tokens.
pub const PARAM_PLACEHOLDER: &str = "{PARAM}";

/// Parameter token replaced by the image path.
pub const FILE_PLACEHOLDER: &str = "{FILE}";

/// Everything one run needs to know about what to write and how.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct RunConfig {
    /// Folder identifiers, processed in order
    #[serde(default, alias = "folder")]
    pub folders: Vec<String>,

    /// Path of the header-writing executable
    #[serde(default)]
    pub command: String,

    /// Parameter template with `{PARAM}` and `{FILE}` placeholders
    #[serde(default, alias = "parameter")]
    pub parameters: Vec<String>,

    /// Output fields in order
    #[serde(default, rename = "field", alias = "imageMetadataField")]
    pub fields: Vec<OutputField>,
}

impl RunConfig {
    /// Create an empty configuration.
    pub fn new() -> Self {
        Self::default()
    }

    /// Add a folder identifier.
    pub fn with_folder(mut self, folder: impl Into<String>) -> Self {
        self.folders.push(folder.into());
        self
    }

    /// Set the command.
    pub fn with_command(mut self, command: impl Into<String>) -> Self {
        self.command = command.into();
        self
    }

    /// Set the parameter template.
    pub fn with_parameters<I, S>(mut self, parameters: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.parameters = parameters.into_iter().map(Into::into).collect();
        self
    }

    /// Add an output field.
    pub fn with_field(mut self, field: OutputField) -> Self {
        self.fields.push(field);
        self
    }

    /// Check whether the parameter template carries the field tokens somewhere.
    pub fn has_param_placeholder(&self) -> bool {
        self.parameters.iter().any(|p| p == PARAM_PLACEHOLDER)
    }

    /// Check whether the parameter template carries the image path somewhere.
    pub fn has_file_placeholder(&self) -> bool {
        self.parameters.iter().any(|p| p == FILE_PLACEHOLDER)
    }

    /// Placeholders the parameter template does not contain.
    pub fn missing_placeholders(&self) -> Vec<&'static str> {
        let mut missing = Vec::new();
        if !self.has_param_placeholder() {
            missing.push(PARAM_PLACEHOLDER);
        }
        if !self.has_file_placeholder() {
            missing.push(FILE_PLACEHOLDER);
        }
        missing
    }

    pub(crate) fn normalize(&mut self) {
        for field in &mut self.fields {
            field.normalize();
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_run_config_builder() {
        let config = RunConfig::new()
            .with_folder("media")
            .with_folder("master")
            .with_command("/usr/bin/exiftool")
            .with_parameters(["-overwrite_original", "{PARAM}", "{FILE}"])
            .with_field(OutputField::new("-xmp-dc:title"));

        assert_eq!(config.folders, vec!["media", "master"]);
        assert_eq!(config.parameters.len(), 3);
        assert!(config.has_param_placeholder());
        assert!(config.missing_placeholders().is_empty());
        assert_eq!(config.fields[0].separator, " ");
    }

    #[test]
    fn test_missing_placeholders() {
        let config = RunConfig::new().with_parameters(["-overwrite_original", "{FILE}"]);
        assert!(!config.has_param_placeholder());
        assert!(config.has_file_placeholder());
        assert_eq!(config.missing_placeholders(), vec![PARAM_PLACEHOLDER]);

        // substrings do not count
        let config = RunConfig::new().with_parameters(["-tag={PARAM}", "file:{FILE}"]);
        assert_eq!(config.missing_placeholders(), vec![PARAM_PLACEHOLDER, FILE_PLACEHOLDER]);
    }
}
