//! Process, template and workpiece properties.

use crate::error::{Error, Result};
use serde::{Deserialize, Serialize};

/// A single named property.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Property {
    /// Property title
    pub name: String,

    /// Property value
    #[serde(default)]
    pub value: String,
}

impl Property {
    /// Create a property.
    pub fn new(name: impl Into<String>, value: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            value: value.into(),
        }
    }
}

/// A template or workpiece with its own properties.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct PropertyGroup {
    /// Properties in order
    #[serde(default)]
    pub properties: Vec<Property>,
}

impl PropertyGroup {
    /// Create a group from properties.
    pub fn new(properties: Vec<Property>) -> Self {
        Self { properties }
    }
}

/// All property collections of a process.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct ProcessProperties {
    /// Flat process properties
    #[serde(default)]
    pub process: Vec<Property>,

    /// Templates, each with its properties
    #[serde(default)]
    pub templates: Vec<PropertyGroup>,

    /// Workpieces, each with its properties
    #[serde(default)]
    pub workpieces: Vec<PropertyGroup>,
}

impl ProcessProperties {
    /// Create empty property collections.
    pub fn new() -> Self {
        Self::default()
    }

    /// Parse property collections from JSON.
    pub fn from_json(json: &str) -> Result<Self> {
        serde_json::from_str(json).map_err(|e| Error::MetadataRead(e.to_string()))
    }

    /// Add a process property.
    pub fn with_process_property(mut self, name: impl Into<String>, value: impl Into<String>) -> Self {
        self.process.push(Property::new(name, value));
        self
    }

    /// Add a template.
    pub fn with_template(mut self, group: PropertyGroup) -> Self {
        self.templates.push(group);
        self
    }

    /// Add a workpiece.
    pub fn with_workpiece(mut self, group: PropertyGroup) -> Self {
        self.workpieces.push(group);
        self
    }

    /// Values of process properties with a name, in order.
    pub fn process_values<'a>(&'a self, name: &'a str) -> impl Iterator<Item = &'a str> + 'a {
        matching(&self.process, name)
    }

    /// Values of template properties with a name, group by group.
    pub fn template_values<'a>(&'a self, name: &'a str) -> impl Iterator<Item = &'a str> + 'a {
        self.templates
            .iter()
            .flat_map(move |g| matching(&g.properties, name))
    }

    /// Values of workpiece properties with a name, group by group.
    pub fn workpiece_values<'a>(&'a self, name: &'a str) -> impl Iterator<Item = &'a str> + 'a {
        self.workpieces
            .iter()
            .flat_map(move |g| matching(&g.properties, name))
    }
}

fn matching<'a>(properties: &'a [Property], name: &'a str) -> impl Iterator<Item = &'a str> + 'a {
    properties
        .iter()
        .filter(move |p| p.name == name)
        .map(|p| p.value.as_str())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_nested_scan_order() {
        let props = ProcessProperties::new()
            .with_template(PropertyGroup::new(vec![
                Property::new("Shelfmark", "A 1"),
                Property::new("Other", "x"),
            ]))
            .with_template(PropertyGroup::new(vec![Property::new("Shelfmark", "B 2")]));

        let values: Vec<_> = props.template_values("Shelfmark").collect();
        assert_eq!(values, vec!["A 1", "B 2"]);
        assert_eq!(props.workpiece_values("Shelfmark").count(), 0);
    }

    #[test]
    fn test_from_json() {
        let json = r#"{"process": [{"name": "Rights", "value": "CC0"}], "workpieces": [{"properties": []}]}"#;
        let props = ProcessProperties::from_json(json).unwrap();
        assert_eq!(props.process_values("Rights").collect::<Vec<_>>(), vec!["CC0"]);
        assert_eq!(props.workpieces.len(), 1);
        assert!(props.templates.is_empty());
    }
}
