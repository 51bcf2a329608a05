//! Custom error types and result handling for comicmeta operations.
//!
//! All fallible operations return a [`Result<T>`] which is a type alias for
//! `std::result::Result<T, Error>`. Errors raised while processing a single
//! document never reach the batch level; the runner turns them into a counted
//! non-success.
//!
use std::path::PathBuf;

/// Type alias for Results with comicmeta errors.
pub type Result<T> = std::result::Result<T, Error>;

/// Comprehensive error type for all comicmeta operations.
#[derive(thiserror::Error, Debug)]
pub enum Error {
    /// I/O errors from the standard library
    #[error(transparent)]
    Io(#[from] std::io::Error),
    /// Comic container (ZIP) errors
    #[error(transparent)]
    Zip(#[from] zip::result::ZipError),
    /// ComicInfo.xml parsing errors
    #[error(transparent)]
    Xml(#[from] roxmltree::Error),
    /// Settings file (de)serialization errors
    #[error(transparent)]
    Json(#[from] serde_json::Error),
    /// Async task join errors, including panics inside an isolated task
    #[error(transparent)]
    Join(#[from] tokio::task::JoinError),
    #[error(transparent)]
    ConfigBuilder(#[from] crate::comicmeta::ComicMetaConfigBuilderError),
    /// Error for invalid file or directory paths
    #[error("The given path '{0:?}' is invalid: {1}")]
    InvalidPath(PathBuf, String),
    /// The container holds no comic metadata descriptor
    #[error("No comic metadata found in '{0:?}'")]
    MissingMetadata(PathBuf),
    /// The settings store for a document could not be opened or written
    #[error("Settings store for '{0:?}' failed: {1}")]
    Store(PathBuf, String),
    /// Error for unsupported operations or formats
    #[error("Unsupported: {0}")]
    Unsupported(String),
    /// Error for resources that couldn't be found
    #[error("Not found: {0}")]
    NotFound(String),
    /// Other errors that don't fit into specific categories
    #[error("Other error: {0}")]
    Other(String),
}

impl Error {
    /// True for unexpected faults (a panicking worker) as opposed to ordinary skips.
    pub fn is_fault(&self) -> bool {
        matches!(self, Error::Join(_))
    }
}

impl From<String> for Error {
    fn from(error: String) -> Self {
        Error::Other(error)
    }
}

impl From<&str> for Error {
    fn from(error: &str) -> Self {
        Error::Other(error.to_string())
    }
}

impl serde::Serialize for Error {
    fn serialize<S>(&self, serializer: S) -> std::result::Result<S::Ok, S::Error>
    where
        S: serde::Serializer,
    {
        serializer.serialize_str(self.to_string().as_ref())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::path::PathBuf;

    #[test]
    fn test_error_serializes_as_display_string() {
        let error = Error::MissingMetadata(PathBuf::from("a.cbz"));
        let json = serde_json::to_value(&error).unwrap();
        assert_eq!(json, serde_json::Value::String(error.to_string()));
    }
}
