//! Image listing per folder.

use crate::error::{Error, Result};
use log::debug;
use std::collections::BTreeMap;
use std::fs;
use std::path::{Path, PathBuf};

/// File extensions treated as images (lowercase).
pub const IMAGE_EXTENSIONS: &[&str] = &["tif", "tiff", "jpg", "jpeg", "png", "jp2", "gif"];

/// Lists the images of a folder identifier.
pub trait ImageSource {
    /// Image files of `folder`, in page order.
    fn list(&self, folder: &str) -> Result<Vec<PathBuf>>;
}

/// Lists images from directories on the local filesystem.
///
/// A folder identifier maps to an explicit directory when registered with
/// [`FolderImageSource::with_folder`], otherwise to `root/<identifier>`.
/// Images are sorted by file name.
#[derive(Debug, Clone)]
pub struct FolderImageSource {
    root: PathBuf,
    folders: BTreeMap<String, PathBuf>,
}

impl FolderImageSource {
    /// Create a source resolving folder identifiers below `root`.
    pub fn new(root: impl Into<PathBuf>) -> Self {
        Self {
            root: root.into(),
            folders: BTreeMap::new(),
        }
    }

    /// Map a folder identifier to a directory.
    pub fn with_folder(mut self, folder: impl Into<String>, path: impl Into<PathBuf>) -> Self {
        self.folders.insert(folder.into(), path.into());
        self
    }

    /// Directory a folder identifier maps to.
    pub fn directory(&self, folder: &str) -> PathBuf {
        self.folders
            .get(folder)
            .cloned()
            .unwrap_or_else(|| self.root.join(folder))
    }
}

impl ImageSource for FolderImageSource {
    fn list(&self, folder: &str) -> Result<Vec<PathBuf>> {
        let dir = self.directory(folder);
        let entries = fs::read_dir(&dir).map_err(|e| {
            Error::Io(std::io::Error::new(
                e.kind(),
                format!("cannot list folder {}: {}", dir.display(), e),
            ))
        })?;

        let mut images = Vec::new();
        for entry in entries {
            let path = entry?.path();
            if path.is_file() && is_image(&path) {
                images.push(path);
            }
        }
        images.sort();
        debug!("{} images in {}", images.len(), dir.display());
        Ok(images)
    }
}

/// Check if a path has an image extension.
pub fn is_image(path: &Path) -> bool {
    path.extension()
        .and_then(|e| e.to_str())
        .map(|e| IMAGE_EXTENSIONS.contains(&e.to_ascii_lowercase().as_str()))
        .unwrap_or(false)
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::fs::File;

    #[test]
    fn test_list_sorted_images() {
        let dir = tempfile::tempdir().unwrap();
        let media = dir.path().join("media");
        fs::create_dir(&media).unwrap();
        for name in ["00000002.tif", "00000001.TIF", "notes.txt", "00000003.jpg"] {
            File::create(media.join(name)).unwrap();
        }
        fs::create_dir(media.join("sub.tif")).unwrap();

        let source = FolderImageSource::new(dir.path());
        let images = source.list("media").unwrap();
        let names: Vec<_> = images
            .iter()
            .map(|p| p.file_name().unwrap().to_string_lossy().into_owned())
            .collect();
        assert_eq!(names, vec!["00000001.TIF", "00000002.tif", "00000003.jpg"]);
    }

    #[test]
    fn test_explicit_folder_mapping() {
        let dir = tempfile::tempdir().unwrap();
        File::create(dir.path().join("a.png")).unwrap();

        let source = FolderImageSource::new("/nonexistent").with_folder("master", dir.path());
        assert_eq!(source.list("master").unwrap().len(), 1);
    }

    #[test]
    fn test_missing_folder_is_io_error() {
        let source = FolderImageSource::new("/nonexistent/xmpstamp");
        let err = source.list("media").unwrap_err();
        assert!(matches!(err, Error::Io(_)));
    }
}
