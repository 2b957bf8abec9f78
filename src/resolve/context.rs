//! Resolution context: where in the work an image sits.

use std::path::Path;

use crate::model::{DocStruct, DocumentStructure, NodeId, TopStructs};

/// Everything a field is resolved against for one image.
///
/// `page` is `None` in default mode, when pages and images could not be
/// matched one to one.
#[derive(Debug, Clone, Copy)]
pub struct Context<'a> {
    /// The document structure
    pub structure: &'a DocumentStructure,
    /// Logical, anchor and physical entry points
    pub top: TopStructs,
    /// Page belonging to the image, if known
    pub page: Option<NodeId>,
    /// Image file being written
    pub image: &'a Path,
}

impl<'a> Context<'a> {
    /// Context for an image without a page.
    pub fn new(structure: &'a DocumentStructure, top: TopStructs, image: &'a Path) -> Self {
        Self {
            structure,
            top,
            page: None,
            image,
        }
    }

    /// Attach the page belonging to the image.
    pub fn with_page(mut self, page: NodeId) -> Self {
        self.page = Some(page);
        self
    }

    /// Top logical node.
    pub fn logical(&self) -> &'a DocStruct {
        self.structure.node(self.top.logical)
    }

    /// Anchor node, if the work has one.
    pub fn anchor(&self) -> Option<&'a DocStruct> {
        self.top.anchor.map(|id| self.structure.node(id))
    }

    /// Physical root.
    pub fn physical(&self) -> &'a DocStruct {
        self.structure.node(self.top.physical)
    }

    /// Page node, if known.
    pub fn page(&self) -> Option<&'a DocStruct> {
        self.page.map(|id| self.structure.node(id))
    }

    /// Logical nodes claiming the page, outermost first; empty without a page.
    pub fn references(&self) -> impl DoubleEndedIterator<Item = &'a DocStruct> + ExactSizeIterator + 'a {
        let structure = self.structure;
        let ids: &'a [NodeId] = match self.page {
            Some(page) => structure.references(page),
            None => &[],
        };
        ids.iter().map(move |id| structure.node(*id))
    }
}
