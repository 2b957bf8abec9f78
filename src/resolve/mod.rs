//! Field resolution.
//!
//! A [`Resolver`] turns one [`OutputField`] into its final string for one
//! image. Sources are evaluated in order and their non-empty results are
//! joined with the field separator.
//!
//! ```
//! use std::path::Path;
//! use xmpstamp::config::{OutputField, Scope, SourceSpec};
//! use xmpstamp::model::{DocStruct, DocumentStructure, MetadataType, ProcessProperties, Ruleset};
//! use xmpstamp::resolve::{Context, Resolver};
//! use xmpstamp::variables::VariableReplacer;
//!
//! let mut doc = DocumentStructure::new();
//! let book = doc.add_node(DocStruct::new("Monograph").with_metadata("TitleDocMain", "Faust"));
//! let root = doc.add_node(DocStruct::new("BoundBook"));
//! doc.set_logical_root(book);
//! doc.set_physical_root(root);
//!
//! let ruleset = Ruleset::new().with_metadata_type(MetadataType::new("TitleDocMain"));
//! let properties = ProcessProperties::new();
//! let variables = VariableReplacer::new();
//! let resolver = Resolver::new(&ruleset, &properties, &variables);
//!
//! let field = OutputField::new("-xmp-dc:title")
//!     .with_source(SourceSpec::metadata("TitleDocMain", Scope::Logical));
//! let top = doc.top_structs(&ruleset)?;
//! let ctx = Context::new(&doc, top, Path::new("/images/00000001.tif"));
//!
//! assert_eq!(resolver.token(&field, &ctx)?, "-xmp-dc:title=Faust");
//! # Ok::<(), xmpstamp::Error>(())
//! ```

mod context;
mod join;

pub use context::Context;
pub use join::{append_piece, collect_values, is_blank};

use crate::config::{
    DocstructSource, DocstructUse, MetadataSource, OutputField, PropertySource, Scope, SourceSpec,
};
use crate::error::{Error, Result};
use crate::model::{DocStruct, MetadataType, ProcessProperties, Ruleset};
use crate::variables::VariableResolver;
use log::{debug, trace};
use std::path::Path;

/// Resolves output fields against a document structure.
///
/// Holds only shared references; one resolver serves a whole run.
pub struct Resolver<'a> {
    ruleset: &'a Ruleset,
    properties: &'a ProcessProperties,
    variables: &'a dyn VariableResolver,
}

impl<'a> Resolver<'a> {
    /// Create a resolver.
    pub fn new(
        ruleset: &'a Ruleset,
        properties: &'a ProcessProperties,
        variables: &'a dyn VariableResolver,
    ) -> Self {
        Self {
            ruleset,
            properties,
            variables,
        }
    }

    /// Resolve the value of a field.
    pub fn resolve(&self, field: &OutputField, ctx: &Context<'_>) -> Result<String> {
        let mut value = String::new();
        for source in &field.sources {
            let piece = self.resolve_source(source, ctx)?;
            append_piece(&mut value, &piece, &field.separator);
        }
        debug!("content for field {} is: {}", field.name, value);
        Ok(value)
    }

    /// Resolve a field into its `name=value` token.
    pub fn token(&self, field: &OutputField, ctx: &Context<'_>) -> Result<String> {
        let value = self.resolve(field, ctx)?;
        Ok(format!("{}={}", field.name, value))
    }

    /// Resolve a single source.
    pub fn resolve_source(&self, source: &SourceSpec, ctx: &Context<'_>) -> Result<String> {
        let value = match source {
            SourceSpec::Metadata(m) => self.metadata(m, ctx)?,
            SourceSpec::Docstruct(d) => self.docstruct(d, ctx),
            SourceSpec::StaticText { text } => text.clone(),
            SourceSpec::ProcessProperty(p) => property(self.properties.process_values(&p.name), p),
            SourceSpec::TemplateProperty(p) => property(self.properties.template_values(&p.name), p),
            SourceSpec::WorkpieceProperty(p) => {
                property(self.properties.workpiece_values(&p.name), p)
            }
            SourceSpec::Filename { use_absolute_path } => filename(ctx.image, *use_absolute_path),
            SourceSpec::Variable { expression } => self.variables.replace(expression, ctx),
        };
        trace!("{} source resolved to '{}'", source.kind(), value);
        Ok(value)
    }

    fn metadata(&self, source: &MetadataSource, ctx: &Context<'_>) -> Result<String> {
        let mdt = self
            .ruleset
            .metadata_type(&source.name)
            .ok_or_else(|| Error::UnknownMetadataType(source.name.clone()))?;

        let node_value = |node: &DocStruct| -> String {
            collect_values(candidates(node, mdt), source.use_first, &source.separator)
        };

        let value = match source.scope {
            Scope::Physical => node_value(ctx.physical()),
            Scope::Logical => node_value(ctx.logical()),
            Scope::Anchor => ctx.anchor().map(node_value).unwrap_or_default(),
            Scope::Page => ctx.page().map(node_value).unwrap_or_default(),
            Scope::Current => ctx.references().last().map(node_value).unwrap_or_default(),
            Scope::Last => ctx
                .references()
                .map(node_value)
                .filter(|v| !is_blank(v))
                .last()
                .unwrap_or_default(),
            Scope::Any => collect_values(
                ctx.references().flat_map(|node| candidates(node, mdt)),
                source.use_first,
                &source.separator,
            ),
        };

        if is_blank(&value) {
            return Ok(String::new());
        }
        Ok(format!("{}{}{}", source.prefix, value, source.suffix))
    }

    fn docstruct(&self, source: &DocstructSource, ctx: &Context<'_>) -> String {
        let label = |node: &DocStruct| -> String {
            self.ruleset
                .label(&node.type_name, &source.language)
                .to_string()
        };

        if ctx.page.is_none() {
            return label(ctx.logical());
        }

        let mut refs = ctx.references();
        match source.usage {
            DocstructUse::First => refs.next().map(label).unwrap_or_default(),
            DocstructUse::Last => refs.next_back().map(label).unwrap_or_default(),
            DocstructUse::All => collect_values(refs.map(label), false, &source.separator),
        }
    }
}

/// Candidate values of a metadata type on one node, in document order.
fn candidates(node: &DocStruct, mdt: &MetadataType) -> Vec<String> {
    if mdt.person {
        node.persons_by_role(&mdt.name)
            .filter_map(|p| p.display_value())
            .collect()
    } else {
        node.metadata_values(&mdt.name).map(str::to_string).collect()
    }
}

fn property<'p>(values: impl Iterator<Item = &'p str>, source: &PropertySource) -> String {
    collect_values(values, source.use_first, &source.separator)
}

fn filename(image: &Path, use_absolute_path: bool) -> String {
    if use_absolute_path {
        image.to_string_lossy().into_owned()
    } else {
        image
            .file_name()
            .map(|n| n.to_string_lossy().into_owned())
            .unwrap_or_default()
    }
}
