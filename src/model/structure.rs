//! Document structure arena.

use crate::error::{Error, Result};
use serde::{Deserialize, Serialize};

use super::Ruleset;

/// Stable identifier of a node inside a [`DocumentStructure`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(transparent)]
pub struct NodeId(pub usize);

impl NodeId {
    /// Index of the node in the arena.
    pub fn index(self) -> usize {
        self.0
    }
}

/// A single typed metadata value.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Metadata {
    /// Metadata type name (e.g., "TitleDocMain")
    #[serde(rename = "type")]
    pub type_name: String,

    /// Literal value
    pub value: String,
}

impl Metadata {
    /// Create a metadata entry.
    pub fn new(type_name: impl Into<String>, value: impl Into<String>) -> Self {
        Self {
            type_name: type_name.into(),
            value: value.into(),
        }
    }
}

/// A person entry (author, editor, ...).
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Person {
    /// Role, i.e. the person metadata type (e.g., "Author")
    #[serde(rename = "type")]
    pub role: String,

    /// First name
    #[serde(default)]
    pub first_name: Option<String>,

    /// Last name
    #[serde(default)]
    pub last_name: Option<String>,

    /// Preformatted display name
    #[serde(default)]
    pub display_name: Option<String>,
}

impl Person {
    /// Create a person with first and last name.
    pub fn new(
        role: impl Into<String>,
        first_name: impl Into<String>,
        last_name: impl Into<String>,
    ) -> Self {
        Self {
            role: role.into(),
            first_name: Some(first_name.into()),
            last_name: Some(last_name.into()),
            display_name: None,
        }
    }

    /// Set the display name.
    pub fn with_display_name(mut self, name: impl Into<String>) -> Self {
        self.display_name = Some(name.into());
        self
    }

    /// Name as written into headers.
    ///
    /// "last, first" when both parts are present, otherwise whichever part is
    /// present, otherwise the display name.
    pub fn display_value(&self) -> Option<String> {
        let first = non_blank(self.first_name.as_deref());
        let last = non_blank(self.last_name.as_deref());
        match (last, first) {
            (Some(last), Some(first)) => Some(format!("{}, {}", last, first)),
            (Some(last), None) => Some(last.to_string()),
            (None, Some(first)) => Some(first.to_string()),
            (None, None) => non_blank(self.display_name.as_deref()).map(str::to_string),
        }
    }
}

fn non_blank(value: Option<&str>) -> Option<&str> {
    value.filter(|v| !v.trim().is_empty())
}

/// A node of the structure tree: logical element, anchor, physical root or page.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct DocStruct {
    /// Structure type name (e.g., "Monograph", "Chapter", "page")
    #[serde(rename = "type")]
    pub type_name: String,

    /// Metadata entries in document order
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub metadata: Vec<Metadata>,

    /// Person entries in document order
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub persons: Vec<Person>,

    /// Child nodes in order
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub children: Vec<NodeId>,

    /// Logical nodes claiming this page, outermost first
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub references: Vec<NodeId>,
}

impl DocStruct {
    /// Create an empty node of the given type.
    pub fn new(type_name: impl Into<String>) -> Self {
        Self {
            type_name: type_name.into(),
            ..Default::default()
        }
    }

    /// Add a metadata entry.
    pub fn with_metadata(mut self, type_name: impl Into<String>, value: impl Into<String>) -> Self {
        self.metadata.push(Metadata::new(type_name, value));
        self
    }

    /// Add a person entry.
    pub fn with_person(mut self, person: Person) -> Self {
        self.persons.push(person);
        self
    }

    /// Values of all metadata entries of a type, in order.
    pub fn metadata_values<'a>(&'a self, type_name: &'a str) -> impl Iterator<Item = &'a str> + 'a {
        self.metadata
            .iter()
            .filter(move |m| m.type_name == type_name)
            .map(|m| m.value.as_str())
    }

    /// All persons with a role, in order.
    pub fn persons_by_role<'a>(&'a self, role: &'a str) -> impl Iterator<Item = &'a Person> + 'a {
        self.persons.iter().filter(move |p| p.role == role)
    }
}

/// The structure of one digitized work.
///
/// Nodes live in an arena and refer to each other by [`NodeId`]; the
/// logical root and the physical root are entry points into the arena.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct DocumentStructure {
    /// All nodes
    #[serde(default)]
    nodes: Vec<DocStruct>,

    /// Logical root (possibly an anchor)
    #[serde(default)]
    logical: Option<NodeId>,

    /// Physical root, parent of all pages
    #[serde(default)]
    physical: Option<NodeId>,
}

impl DocumentStructure {
    /// Create an empty structure.
    pub fn new() -> Self {
        Self::default()
    }

    /// Parse and validate a structure from JSON.
    pub fn from_json(json: &str) -> Result<Self> {
        let structure: Self =
            serde_json::from_str(json).map_err(|e| Error::MetadataRead(e.to_string()))?;
        structure.validate()?;
        Ok(structure)
    }

    /// Serialize the structure to pretty JSON.
    pub fn to_json(&self) -> Result<String> {
        serde_json::to_string_pretty(self).map_err(|e| Error::MetadataRead(e.to_string()))
    }

    /// Add a node and return its id.
    pub fn add_node(&mut self, node: DocStruct) -> NodeId {
        self.nodes.push(node);
        NodeId(self.nodes.len() - 1)
    }

    /// Append `child` to the children of `parent`.
    ///
    /// # Panics
    ///
    /// Panics if `parent` does not belong to this structure.
    pub fn add_child(&mut self, parent: NodeId, child: NodeId) {
        self.nodes[parent.0].children.push(child);
    }

    /// Record that `target` claims `page`.
    ///
    /// # Panics
    ///
    /// Panics if `page` does not belong to this structure.
    pub fn add_reference(&mut self, page: NodeId, target: NodeId) {
        self.nodes[page.0].references.push(target);
    }

    /// Set the logical root.
    pub fn set_logical_root(&mut self, id: NodeId) {
        self.logical = Some(id);
    }

    /// Set the physical root.
    pub fn set_physical_root(&mut self, id: NodeId) {
        self.physical = Some(id);
    }

    /// The logical root, if any.
    pub fn logical_root(&self) -> Option<NodeId> {
        self.logical
    }

    /// The physical root, if any.
    pub fn physical_root(&self) -> Option<NodeId> {
        self.physical
    }

    /// Get a node by id.
    pub fn get(&self, id: NodeId) -> Option<&DocStruct> {
        self.nodes.get(id.0)
    }

    /// Get a node by id.
    ///
    /// # Panics
    ///
    /// Panics if `id` does not belong to this structure.
    pub fn node(&self, id: NodeId) -> &DocStruct {
        &self.nodes[id.0]
    }

    /// Pages in physical order (children of the physical root).
    pub fn pages(&self) -> &[NodeId] {
        match self.physical.and_then(|id| self.get(id)) {
            Some(root) => &root.children,
            None => &[],
        }
    }

    /// Logical nodes claiming a page, outermost first.
    pub fn references(&self, page: NodeId) -> &[NodeId] {
        self.get(page).map(|p| p.references.as_slice()).unwrap_or(&[])
    }

    /// Number of nodes.
    pub fn len(&self) -> usize {
        self.nodes.len()
    }

    /// Check if the structure has no nodes.
    pub fn is_empty(&self) -> bool {
        self.nodes.is_empty()
    }

    /// Check that every root, child and reference id points into the arena.
    pub fn validate(&self) -> Result<()> {
        let len = self.nodes.len();
        let check = |id: NodeId, what: &str| {
            if id.0 < len {
                Ok(())
            } else {
                Err(Error::MetadataRead(format!(
                    "{} refers to node {} but the structure has {} nodes",
                    what, id.0, len
                )))
            }
        };

        if let Some(id) = self.logical {
            check(id, "logical root")?;
        }
        if let Some(id) = self.physical {
            check(id, "physical root")?;
        }
        for (index, node) in self.nodes.iter().enumerate() {
            for child in &node.children {
                check(*child, &format!("child of node {}", index))?;
            }
            for target in &node.references {
                check(*target, &format!("reference of node {}", index))?;
            }
        }
        Ok(())
    }

    /// Resolve the entry points used during a run.
    ///
    /// When the logical root is an anchor type in the ruleset, its first child
    /// becomes the top logical node and the root is kept as anchor.
    pub fn top_structs(&self, ruleset: &Ruleset) -> Result<TopStructs> {
        let root = self
            .logical
            .ok_or_else(|| Error::MetadataRead("no logical structure".to_string()))?;
        let physical = self
            .physical
            .ok_or_else(|| Error::MetadataRead("no physical structure".to_string()))?;

        let (logical, anchor) = if ruleset.is_anchor(&self.node(root).type_name) {
            let child = self.node(root).children.first().copied().ok_or_else(|| {
                Error::MetadataRead("anchor element has no child element".to_string())
            })?;
            (child, Some(root))
        } else {
            (root, None)
        };

        Ok(TopStructs {
            logical,
            anchor,
            physical,
        })
    }
}

/// The three entry points resolution works from.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct TopStructs {
    /// Top logical node (below the anchor, if there is one)
    pub logical: NodeId,
    /// Anchor node, when the work is part of a series
    pub anchor: Option<NodeId>,
    /// Physical root
    pub physical: NodeId,
}
