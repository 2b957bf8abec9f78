//! Output fields and their source specifications.

use serde::{Deserialize, Serialize};

use super::{default_separator, default_true, unescape_spaces};

/// One destination field, e.g. `-xmp-dc:title`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct OutputField {
    /// Destination field identifier, written before the `=`
    pub name: String,

    /// Separator between the values of the sources
    #[serde(default = "default_separator")]
    pub separator: String,

    /// Sources in order
    #[serde(default, rename = "source")]
    pub sources: Vec<SourceSpec>,
}

impl OutputField {
    /// Create a field with the default separator and no sources.
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            separator: default_separator(),
            sources: Vec::new(),
        }
    }

    /// Set the separator.
    pub fn with_separator(mut self, separator: impl Into<String>) -> Self {
        self.separator = separator.into();
        self
    }

    /// Append a source.
    pub fn with_source(mut self, source: SourceSpec) -> Self {
        self.sources.push(source);
        self
    }

    pub(crate) fn normalize(&mut self) {
        self.separator = unescape_spaces(&self.separator);
        for source in &mut self.sources {
            source.normalize();
        }
    }
}

/// Where a value of an [`OutputField`] comes from.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "type")]
pub enum SourceSpec {
    /// Metadata of one or more structure nodes
    #[serde(rename = "metadata")]
    Metadata(MetadataSource),

    /// Label of the structure type(s) claiming the page
    #[serde(rename = "docstruct")]
    Docstruct(DocstructSource),

    /// Fixed text
    #[serde(rename = "staticText")]
    StaticText {
        /// Text to insert
        #[serde(default)]
        text: String,
    },

    /// Flat process property
    #[serde(rename = "processproperty")]
    ProcessProperty(PropertySource),

    /// Property of the process templates
    #[serde(rename = "templateproperty")]
    TemplateProperty(PropertySource),

    /// Property of the process workpieces
    #[serde(rename = "workpieceproperty")]
    WorkpieceProperty(PropertySource),

    /// Path or name of the image file
    #[serde(rename = "filename")]
    Filename {
        /// Use the full path instead of the file name
        #[serde(default = "default_true", alias = "useAbsolutePath")]
        use_absolute_path: bool,
    },

    /// Expression handed to the variable resolver
    #[serde(rename = "variable")]
    Variable {
        /// Expression, e.g. `{meta.TitleDocMain}`
        #[serde(rename = "value", alias = "expression")]
        expression: String,
    },
}

impl SourceSpec {
    /// Metadata source with default settings.
    pub fn metadata(name: impl Into<String>, scope: Scope) -> Self {
        SourceSpec::Metadata(MetadataSource::new(name, scope))
    }

    /// Docstruct source using the given language and selection.
    pub fn docstruct(language: impl Into<String>, usage: DocstructUse) -> Self {
        SourceSpec::Docstruct(DocstructSource::new(language, usage))
    }

    /// Static text source.
    pub fn text(text: impl Into<String>) -> Self {
        SourceSpec::StaticText { text: text.into() }
    }

    /// Variable source.
    pub fn variable(expression: impl Into<String>) -> Self {
        SourceSpec::Variable {
            expression: expression.into(),
        }
    }

    /// Filename source.
    pub fn filename(use_absolute_path: bool) -> Self {
        SourceSpec::Filename { use_absolute_path }
    }

    /// Short name of the source kind as used in configuration files.
    pub fn kind(&self) -> &'static str {
        match self {
            SourceSpec::Metadata(_) => "metadata",
            SourceSpec::Docstruct(_) => "docstruct",
            SourceSpec::StaticText { .. } => "staticText",
            SourceSpec::ProcessProperty(_) => "processproperty",
            SourceSpec::TemplateProperty(_) => "templateproperty",
            SourceSpec::WorkpieceProperty(_) => "workpieceproperty",
            SourceSpec::Filename { .. } => "filename",
            SourceSpec::Variable { .. } => "variable",
        }
    }

    fn normalize(&mut self) {
        match self {
            SourceSpec::Metadata(m) => {
                m.separator = unescape_spaces(&m.separator);
                m.prefix = unescape_spaces(&m.prefix);
                m.suffix = unescape_spaces(&m.suffix);
            }
            SourceSpec::Docstruct(d) => d.separator = unescape_spaces(&d.separator),
            SourceSpec::ProcessProperty(p)
            | SourceSpec::TemplateProperty(p)
            | SourceSpec::WorkpieceProperty(p) => p.separator = unescape_spaces(&p.separator),
            SourceSpec::StaticText { .. } | SourceSpec::Filename { .. } | SourceSpec::Variable { .. } => {}
        }
    }
}

/// Which nodes a metadata source reads from.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Scope {
    /// The physical root (e.g., physical location)
    Physical,
    /// The top logical node (e.g., main title)
    Logical,
    /// The anchor node, if any (e.g., series title)
    Anchor,
    /// The page node itself (e.g., page URN)
    Page,
    /// The deepest logical node claiming the page
    Current,
    /// The last claiming node that yields a value
    Last,
    /// All claiming nodes
    #[default]
    #[serde(alias = "all")]
    Any,
}

/// Metadata source settings.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct MetadataSource {
    /// Metadata type name
    pub name: String,

    /// Node selection
    #[serde(default, alias = "use")]
    pub scope: Scope,

    /// Stop at the first non-blank value
    #[serde(default = "default_true", alias = "useFirst")]
    pub use_first: bool,

    /// Separator between multiple values
    #[serde(default = "default_separator")]
    pub separator: String,

    /// Text placed before a non-blank value
    #[serde(default, alias = "staticPrefix")]
    pub prefix: String,

    /// Text placed after a non-blank value
    #[serde(default, alias = "staticSuffix")]
    pub suffix: String,
}

impl MetadataSource {
    /// Create a metadata source with default settings.
    pub fn new(name: impl Into<String>, scope: Scope) -> Self {
        Self {
            name: name.into(),
            scope,
            use_first: true,
            separator: default_separator(),
            prefix: String::new(),
            suffix: String::new(),
        }
    }

    /// Set the use-first flag.
    pub fn with_use_first(mut self, use_first: bool) -> Self {
        self.use_first = use_first;
        self
    }

    /// Set the value separator.
    pub fn with_separator(mut self, separator: impl Into<String>) -> Self {
        self.separator = separator.into();
        self
    }

    /// Set prefix and suffix.
    pub fn with_affixes(mut self, prefix: impl Into<String>, suffix: impl Into<String>) -> Self {
        self.prefix = prefix.into();
        self.suffix = suffix.into();
        self
    }
}

impl From<MetadataSource> for SourceSpec {
    fn from(source: MetadataSource) -> Self {
        SourceSpec::Metadata(source)
    }
}

/// Which claiming structure nodes a docstruct source names.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum DocstructUse {
    /// The outermost claim
    First,
    /// The innermost claim
    #[default]
    Last,
    /// Every claim
    All,
}

/// Docstruct source settings.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct DocstructSource {
    /// Language code for the type label
    #[serde(default)]
    pub language: String,

    /// Which claims to name
    #[serde(default, rename = "use")]
    pub usage: DocstructUse,

    /// Separator for [`DocstructUse::All`]
    #[serde(default = "default_separator")]
    pub separator: String,
}

impl DocstructSource {
    /// Create a docstruct source with the default separator.
    pub fn new(language: impl Into<String>, usage: DocstructUse) -> Self {
        Self {
            language: language.into(),
            usage,
            separator: default_separator(),
        }
    }

    /// Set the separator.
    pub fn with_separator(mut self, separator: impl Into<String>) -> Self {
        self.separator = separator.into();
        self
    }
}

impl From<DocstructSource> for SourceSpec {
    fn from(source: DocstructSource) -> Self {
        SourceSpec::Docstruct(source)
    }
}

/// Settings shared by the property sources.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PropertySource {
    /// Property title to match
    pub name: String,

    /// Stop at the first match
    #[serde(default = "default_true", alias = "useFirst")]
    pub use_first: bool,

    /// Separator between multiple matches
    #[serde(default = "default_separator")]
    pub separator: String,
}

impl PropertySource {
    /// Create a property source with default settings.
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            use_first: true,
            separator: default_separator(),
        }
    }

    /// Set the use-first flag.
    pub fn with_use_first(mut self, use_first: bool) -> Self {
        self.use_first = use_first;
        self
    }

    /// Set the separator.
    pub fn with_separator(mut self, separator: impl Into<String>) -> Self {
        self.separator = separator.into();
        self
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_defaults() {
        let source = MetadataSource::new("TitleDocMain", Scope::default());
        assert_eq!(source.scope, Scope::Any);
        assert!(source.use_first);
        assert_eq!(source.separator, " ");
        assert_eq!(DocstructUse::default(), DocstructUse::Last);
    }

    #[test]
    fn test_normalize_escaped_spaces() {
        let mut field = OutputField::new("-xmp-dc:subject")
            .with_separator("\\u0020-\\u0020")
            .with_source(
                MetadataSource::new("Subject", Scope::Logical)
                    .with_affixes("[\\u0020", "\\u0020]")
                    .into(),
            );
        field.normalize();

        assert_eq!(field.separator, " - ");
        match &field.sources[0] {
            SourceSpec::Metadata(m) => {
                assert_eq!(m.prefix, "[ ");
                assert_eq!(m.suffix, " ]");
            }
            other => panic!("unexpected source {:?}", other),
        }
    }

    #[test]
    fn test_kind_names() {
        assert_eq!(SourceSpec::text("x").kind(), "staticText");
        assert_eq!(SourceSpec::filename(true).kind(), "filename");
        assert_eq!(
            SourceSpec::ProcessProperty(PropertySource::new("a")).kind(),
            "processproperty"
        );
    }
}
