//! Placeholder substitution for `variable` sources.

use crate::model::{DocStruct, ProcessProperties};
use crate::resolve::Context;
use regex::{Captures, Regex};
use std::collections::BTreeMap;

/// Expands the expression of a `variable` source.
///
/// The result is used as is; resolution never inspects it.
pub trait VariableResolver {
    /// Replace all placeholders in `expression` for the given context.
    fn replace(&self, expression: &str, ctx: &Context<'_>) -> String;
}

/// Default [`VariableResolver`] working on `{namespace.name}` placeholders.
///
/// Supported placeholders:
/// - `{meta.NAME}`: first value on the top logical node, then the anchor
/// - `{meta.topstruct.NAME}`: first value on the anchor, else the top logical node
/// - `{process.NAME}`, `{template.NAME}`, `{product.NAME}` or `{workpiece.NAME}`:
///   first value of the property
/// - any key registered with [`VariableReplacer::with_value`]
///
/// Placeholders of a known namespace without a value become empty. Anything
/// else is left untouched.
pub struct VariableReplacer {
    values: BTreeMap<String, String>,
    properties: ProcessProperties,
    placeholder: Regex,
}

impl Default for VariableReplacer {
    fn default() -> Self {
        Self::new()
    }
}

impl VariableReplacer {
    /// Create a replacer with no custom values and no properties.
    pub fn new() -> Self {
        Self {
            values: BTreeMap::new(),
            properties: ProcessProperties::default(),
            placeholder: Regex::new(r"\{([A-Za-z0-9_.\-]+)\}").unwrap(),
        }
    }

    /// Register a custom value, e.g. `processtitle`.
    pub fn with_value(mut self, key: impl Into<String>, value: impl Into<String>) -> Self {
        self.values.insert(key.into(), value.into());
        self
    }

    /// Use these property collections for the property namespaces.
    pub fn with_properties(mut self, properties: ProcessProperties) -> Self {
        self.properties = properties;
        self
    }

    fn lookup(&self, key: &str, ctx: &Context<'_>) -> Option<String> {
        if let Some(value) = self.values.get(key) {
            return Some(value.clone());
        }

        let (namespace, name) = key.split_once('.')?;
        let value = match namespace {
            "meta" => match name.strip_prefix("topstruct.") {
                Some(name) => first_metadata(ctx.anchor().unwrap_or(ctx.logical()), name),
                None => first_metadata(ctx.logical(), name)
                    .or_else(|| ctx.anchor().and_then(|a| first_metadata(a, name))),
            },
            "process" => first(self.properties.process_values(name)),
            "template" => first(self.properties.template_values(name)),
            "product" | "workpiece" => first(self.properties.workpiece_values(name)),
            _ => return None,
        };
        Some(value.unwrap_or_default())
    }
}

impl VariableResolver for VariableReplacer {
    fn replace(&self, expression: &str, ctx: &Context<'_>) -> String {
        self.placeholder
            .replace_all(expression, |caps: &Captures<'_>| {
                self.lookup(&caps[1], ctx)
                    .unwrap_or_else(|| caps[0].to_string())
            })
            .into_owned()
    }
}

fn first<'a>(mut values: impl Iterator<Item = &'a str>) -> Option<String> {
    values.find(|v| !v.trim().is_empty()).map(str::to_string)
}

fn first_metadata(node: &DocStruct, name: &str) -> Option<String> {
    first(node.metadata_values(name)).or_else(|| {
        node.persons_by_role(name)
            .filter_map(|p| p.display_value())
            .next()
    })
}
