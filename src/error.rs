//! Error types for notepdf library.

use std::io;
use thiserror::Error;

/// Result type alias for notepdf operations.
pub type Result<T> = std::result::Result<T, Error>;

/// Error types that can occur while adding margins to a document.
#[derive(Error, Debug)]
pub enum Error {
    /// I/O error when reading or writing files.
    #[error("I/O error: {0}")]
    Io(#[from] io::Error),

    /// The input does not start with a PDF header.
    #[error("Unknown file format: not a valid PDF")]
    UnknownFormat,

    /// The PDF header carries a version string we cannot read.
    #[error("Unsupported PDF version: {0}")]
    UnsupportedVersion(String),

    /// The bytes could not be loaded as a PDF document.
    #[error("Failed to load document: {0}")]
    DocumentLoad(String),

    /// The PDF document is encrypted.
    #[error("Document is encrypted")]
    Encrypted,

    /// A single page could not be transcluded onto its new canvas.
    #[error("Page {page_index} could not be transplanted: {reason}")]
    PageTransplant {
        /// Zero-based index of the failing page.
        page_index: usize,
        /// What went wrong.
        reason: String,
    },

    /// The margin or fill configuration was rejected before any page was processed.
    #[error("Invalid margin configuration: {0}")]
    InvalidMargin(String),

    /// The assembled document could not be written out.
    #[error("Serialization error: {0}")]
    Serialization(String),

    /// The caller cancelled the run between two pages.
    #[error("Cancelled after {pages_done} pages")]
    Cancelled {
        /// Pages fully processed before the cancellation was observed.
        pages_done: usize,
    },
}

impl Error {
    /// Build a [`Error::PageTransplant`] for the given page.
    pub fn transplant(page_index: usize, reason: impl Into<String>) -> Self {
        Error::PageTransplant {
            page_index,
            reason: reason.into(),
        }
    }

    /// Whether this error means the input itself could not be loaded.
    pub fn is_load_error(&self) -> bool {
        matches!(
            self,
            Error::UnknownFormat
                | Error::UnsupportedVersion(_)
                | Error::DocumentLoad(_)
                | Error::Encrypted
        )
    }

    /// Page index carried by the error, if any.
    pub fn page_index(&self) -> Option<usize> {
        match self {
            Error::PageTransplant { page_index, .. } => Some(*page_index),
            _ => None,
        }
    }
}

impl From<lopdf::Error> for Error {
    fn from(err: lopdf::Error) -> Self {
        match err {
            lopdf::Error::IO(e) => Error::Io(e),
            lopdf::Error::Decryption(_) => Error::Encrypted,
            _ => Error::DocumentLoad(err.to_string()),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_error_display() {
        let err = Error::Encrypted;
        assert_eq!(err.to_string(), "Document is encrypted");

        let err = Error::transplant(4, "missing content stream");
        assert_eq!(
            err.to_string(),
            "Page 4 could not be transplanted: missing content stream"
        );

        let err = Error::Cancelled { pages_done: 12 };
        assert_eq!(err.to_string(), "Cancelled after 12 pages");
    }

    #[test]
    fn test_io_error_conversion() {
        let io_err = io::Error::new(io::ErrorKind::NotFound, "file not found");
        let err: Error = io_err.into();
        assert!(matches!(err, Error::Io(_)));
    }

    #[test]
    fn test_load_error_classification() {
        assert!(Error::UnknownFormat.is_load_error());
        assert!(Error::Encrypted.is_load_error());
        assert!(Error::DocumentLoad("bad xref".into()).is_load_error());
        assert!(!Error::InvalidMargin("no sides".into()).is_load_error());
        assert!(!Error::transplant(0, "x").is_load_error());
    }

    #[test]
    fn test_page_index() {
        assert_eq!(Error::transplant(7, "x").page_index(), Some(7));
        assert_eq!(Error::Serialization("x".into()).page_index(), None);
    }
}
