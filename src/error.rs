//! Error types for xmpstamp.

use std::io;
use std::path::PathBuf;
use thiserror::Error;

/// Result type alias for xmpstamp operations.
pub type Result<T> = std::result::Result<T, Error>;

/// Errors that can occur while resolving fields or stamping images.
#[derive(Error, Debug)]
pub enum Error {
    /// I/O error from a collaborator (folder listing, journal file).
    #[error("I/O error: {0}")]
    Io(#[from] io::Error),

    /// The run configuration is missing or unusable.
    #[error("Configuration error: {0}")]
    Configuration(String),

    /// The configuration file could not be parsed.
    #[error("Cannot parse configuration: {0}")]
    ConfigParse(#[from] toml::de::Error),

    /// A configured metadata type is not declared in the ruleset.
    #[error("Cannot find metadata type {0}")]
    UnknownMetadataType(String),

    /// The document structure is unreadable or structurally invalid.
    #[error("Cannot read metadata: {0}")]
    MetadataRead(String),

    /// The physical structure has no pages.
    #[error("No pages are referenced in the document structure")]
    NoPages,

    /// Page count and image count differ and no default configuration exists.
    #[error("Different number of objects in folder '{folder}' ({images} images) and in the document structure ({pages} pages)")]
    DataMismatch {
        /// Folder identifier
        folder: String,
        /// Number of structural pages
        pages: usize,
        /// Number of image files in the folder
        images: usize,
    },

    /// The header writer returned a nonzero exit status.
    #[error("Header writer exited with status {code} for {}: {stderr}", image.display())]
    ExternalTool {
        /// Image being written
        image: PathBuf,
        /// Exit status reported by the tool
        code: i32,
        /// Captured standard error
        stderr: String,
    },

    /// The header writer could not be launched at all.
    #[error("Cannot launch {}: {source}", command.display())]
    Launch {
        /// Command that failed to start
        command: PathBuf,
        /// Underlying spawn error
        source: io::Error,
    },
}

/// Coarse classification of an [`Error`], used for reporting the abort reason of a run.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ErrorKind {
    /// Missing folders, unusable ruleset, unknown metadata type, bad config file
    Configuration,
    /// Document structure unreadable or invalid
    MetadataRead,
    /// Page and image counts cannot be reconciled
    DataMismatch,
    /// The header writer failed
    ExternalTool,
    /// Collaborator I/O failure
    Io,
}

impl Error {
    /// Classify this error.
    pub fn kind(&self) -> ErrorKind {
        match self {
            Error::Io(_) => ErrorKind::Io,
            Error::Configuration(_) | Error::ConfigParse(_) | Error::UnknownMetadataType(_) => {
                ErrorKind::Configuration
            }
            Error::MetadataRead(_) => ErrorKind::MetadataRead,
            Error::NoPages | Error::DataMismatch { .. } => ErrorKind::DataMismatch,
            Error::ExternalTool { .. } | Error::Launch { .. } => ErrorKind::ExternalTool,
        }
    }
}

impl std::fmt::Display for ErrorKind {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let name = match self {
            ErrorKind::Configuration => "configuration",
            ErrorKind::MetadataRead => "metadata read",
            ErrorKind::DataMismatch => "data mismatch",
            ErrorKind::ExternalTool => "external tool",
            ErrorKind::Io => "i/o",
        };
        f.write_str(name)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_error_display() {
        let err = Error::UnknownMetadataType("Autor".to_string());
        assert_eq!(err.to_string(), "Cannot find metadata type Autor");

        let err = Error::DataMismatch {
            folder: "media".to_string(),
            pages: 10,
            images: 9,
        };
        assert_eq!(
            err.to_string(),
            "Different number of objects in folder 'media' (9 images) and in the document structure (10 pages)"
        );
    }

    #[test]
    fn test_error_kinds() {
        assert_eq!(Error::NoPages.kind(), ErrorKind::DataMismatch);
        assert_eq!(
            Error::UnknownMetadataType("x".into()).kind(),
            ErrorKind::Configuration
        );
        let err = Error::ExternalTool {
            image: PathBuf::from("/tmp/a.tif"),
            code: 2,
            stderr: "bad".into(),
        };
        assert_eq!(err.kind(), ErrorKind::ExternalTool);
    }

    #[test]
    fn test_io_error_conversion() {
        let io_err = io::Error::new(io::ErrorKind::NotFound, "folder not found");
        let err: Error = io_err.into();
        assert!(matches!(err, Error::Io(_)));
        assert_eq!(err.kind(), ErrorKind::Io);
    }
}
