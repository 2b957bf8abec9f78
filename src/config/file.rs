//! TOML configuration files and block selection.

use crate::error::{Error, Result};
use log::debug;
use serde::{Deserialize, Serialize};
use std::fs;
use std::path::Path;

use super::RunConfig;

/// Project or step value matching anything.
pub const WILDCARD: &str = "*";

const DEFAULT_BLOCK: &str = "default";

/// A configuration block: selector plus run configuration.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct ConfigBlock {
    /// Project name or `*` (missing means `*`)
    #[serde(default)]
    pub project: Option<String>,

    /// Step name or `*` (missing means `*`)
    #[serde(default)]
    pub step: Option<String>,

    /// Block type; `default` marks the fallback block
    #[serde(default, rename = "type")]
    pub kind: Option<String>,

    /// The configuration itself
    #[serde(flatten)]
    pub run: RunConfig,
}

impl ConfigBlock {
    /// Check if this is the fallback block.
    pub fn is_default(&self) -> bool {
        self.kind.as_deref() == Some(DEFAULT_BLOCK)
    }

    fn project(&self) -> &str {
        self.project.as_deref().unwrap_or(WILDCARD)
    }

    fn step(&self) -> &str {
        self.step.as_deref().unwrap_or(WILDCARD)
    }

    /// Match rank for a project and step; lower is better, `None` is no match.
    ///
    /// 0: exact project and step, 1: any project with exact step,
    /// 2: exact project with any step, 3: any project and step.
    fn rank(&self, project: &str, step: &str) -> Option<u8> {
        let project_exact = self.project() == project;
        let project_any = self.project() == WILDCARD;
        let step_exact = self.step() == step;
        let step_any = self.step() == WILDCARD;

        if project_exact && step_exact {
            Some(0)
        } else if project_any && step_exact {
            Some(1)
        } else if project_exact && step_any {
            Some(2)
        } else if project_any && step_any {
            Some(3)
        } else {
            None
        }
    }
}

/// The result of selecting blocks for a project and step.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SelectedConfig {
    /// Main configuration
    pub config: RunConfig,
    /// Fallback configuration used on page/image count mismatch
    pub default_config: Option<RunConfig>,
}

/// A parsed configuration file.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct ConfigFile {
    /// All blocks in file order
    #[serde(default, rename = "config")]
    pub blocks: Vec<ConfigBlock>,
}

impl ConfigFile {
    /// Parse a configuration from TOML text.
    pub fn from_toml(text: &str) -> Result<Self> {
        let mut file: ConfigFile = toml::from_str(text)?;
        for block in &mut file.blocks {
            block.run.normalize();
        }
        Ok(file)
    }

    /// Read and parse a configuration file.
    pub fn load<P: AsRef<Path>>(path: P) -> Result<Self> {
        let path = path.as_ref();
        let text = fs::read_to_string(path).map_err(|e| {
            Error::Configuration(format!("cannot read {}: {}", path.display(), e))
        })?;
        Self::from_toml(&text)
    }

    /// Pick the block for a project and step, plus the default block if present.
    ///
    /// Precedence: exact project and step, then `*` project with exact step,
    /// then exact project with `*` step, then `*` for both. Among blocks of the
    /// same rank the first one in the file wins.
    pub fn select(&self, project: &str, step: &str) -> Result<SelectedConfig> {
        let block = self
            .blocks
            .iter()
            .filter(|b| !b.is_default())
            .filter_map(|b| b.rank(project, step).map(|rank| (rank, b)))
            .min_by_key(|(rank, _)| *rank)
            .map(|(_, b)| b)
            .ok_or_else(|| {
                Error::Configuration(format!(
                    "no configuration block matches project '{}' and step '{}'",
                    project, step
                ))
            })?;

        debug!(
            "selected configuration block project={} step={}",
            block.project(),
            block.step()
        );

        let default_config = self
            .blocks
            .iter()
            .find(|b| b.is_default())
            .map(|b| b.run.clone());
        if default_config.is_none() {
            debug!("no default block configured");
        }

        Ok(SelectedConfig {
            config: block.run.clone(),
            default_config,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::{DocstructUse, Scope, SourceSpec};

    const SAMPLE: &str = r#"
[[config]]
project = "*"
step = "*"
folders = ["media"]
command = "/usr/bin/exiftool"
parameters = ["-overwrite_original", "{PARAM}", "{FILE}"]

[[config.field]]
name = "-xmp-dc:title"

[[config.field.source]]
type = "docstruct"
language = "en"

[[config.field.source]]
type = "metadata"
name = "TitleDocMain"
scope = "logical"
useFirst = false
separator = ' ; '

[[config]]
project = "Manuscripts"
step = "*"
folders = ["master"]
command = "/bin/true"

[[config]]
project = "*"
step = "Write headers"
folders = ["media", "master"]
command = "/bin/true"

[[config]]
type = "default"
folders = []
command = ""

[[config.field]]
name = "-xmp-dc:rights"

[[config.field.source]]
type = "staticText"
text = "CC0"
"#;

    #[test]
    fn test_parse_sources() {
        let file = ConfigFile::from_toml(SAMPLE).unwrap();
        assert_eq!(file.blocks.len(), 4);

        let field = &file.blocks[0].run.fields[0];
        assert_eq!(field.separator, " ");
        match &field.sources[0] {
            SourceSpec::Docstruct(d) => {
                assert_eq!(d.language, "en");
                assert_eq!(d.usage, DocstructUse::Last);
            }
            other => panic!("unexpected source {:?}", other),
        }
        match &field.sources[1] {
            SourceSpec::Metadata(m) => {
                assert_eq!(m.scope, Scope::Logical);
                assert!(!m.use_first);
                assert_eq!(m.separator, " ; ");
            }
            other => panic!("unexpected source {:?}", other),
        }
    }

    #[test]
    fn test_selection_precedence() {
        let file = ConfigFile::from_toml(SAMPLE).unwrap();

        // step match beats project match
        let selected = file.select("Manuscripts", "Write headers").unwrap();
        assert_eq!(selected.config.folders, vec!["media", "master"]);

        let selected = file.select("Manuscripts", "Export").unwrap();
        assert_eq!(selected.config.folders, vec!["master"]);

        let selected = file.select("Prints", "Export").unwrap();
        assert_eq!(selected.config.folders, vec!["media"]);
        assert!(selected.default_config.is_some());
    }

    #[test]
    fn test_exact_match_wins() {
        let text = r#"
[[config]]
folders = ["any"]
[[config]]
project = "P"
step = "S"
folders = ["exact"]
"#;
        let file = ConfigFile::from_toml(text).unwrap();
        let selected = file.select("P", "S").unwrap();
        assert_eq!(selected.config.folders, vec!["exact"]);
        assert!(selected.default_config.is_none());
    }

    #[test]
    fn test_no_match_is_configuration_error() {
        let text = r#"
[[config]]
project = "P"
step = "S"
"#;
        let file = ConfigFile::from_toml(text).unwrap();
        let err = file.select("Q", "S").unwrap_err();
        assert!(matches!(err, Error::Configuration(_)));
    }

    #[test]
    fn test_unknown_source_type_fails() {
        let text = r#"
[[config]]
[[config.field]]
name = "x"
[[config.field.source]]
type = "barcode"
"#;
        let err = ConfigFile::from_toml(text).unwrap_err();
        assert!(matches!(err, Error::ConfigParse(_)));
    }
}
