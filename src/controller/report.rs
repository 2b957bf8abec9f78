//! Run results.

use serde::Serialize;
use std::fmt;
use std::path::PathBuf;

use crate::model::NodeId;

/// How the images of a folder were matched to the structure.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub enum RenderMode {
    /// One page per image, in order
    PerPage,
    /// Counts differ; every image got the default fields
    Default,
}

impl fmt::Display for RenderMode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            RenderMode::PerPage => write!(f, "per page"),
            RenderMode::Default => write!(f, "default"),
        }
    }
}

/// Result for one folder.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct FolderReport {
    /// Folder identifier
    pub folder: String,
    /// Matching mode used
    pub mode: RenderMode,
    /// Number of images whose headers were written
    pub images_written: usize,
}

/// Result of a completed run.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct RunReport {
    /// Folders in processing order
    pub folders: Vec<FolderReport>,
}

impl RunReport {
    /// Total number of images written.
    pub fn images_written(&self) -> usize {
        self.folders.iter().map(|f| f.images_written).sum()
    }
}

/// Rendered tokens for one image, without writing anything.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ImagePreview {
    /// Image file
    pub image: PathBuf,
    /// Page matched to the image, `None` in default mode
    pub page: Option<NodeId>,
    /// Tokens in field order
    pub tokens: Vec<String>,
}
