//! Document model types consumed by field resolution.
//!
//! The model is read-only during a run: a document structure arena with
//! logical, anchor, physical and page nodes, the ruleset that gives metadata
//! and structure types their meaning, and the process property collections.

mod properties;
mod ruleset;
mod structure;

pub use properties::{ProcessProperties, Property, PropertyGroup};
pub use ruleset::{MetadataType, Ruleset, StructureType};
pub use structure::{DocStruct, DocumentStructure, Metadata, NodeId, Person, TopStructs};
