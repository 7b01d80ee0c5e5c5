use std::path::PathBuf;

use thiserror::Error;

use crate::sniff::HeaderBytes;

#[derive(Error, Debug)]
pub enum DwrfError {
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    #[error("Format error: {0}")]
    Format(String),

    #[error("Codec error: {0}")]
    Codec(String),

    #[error("Schema error: {0}")]
    Schema(String),

    #[error("invalid value for {key}: {reason}")]
    Config { key: String, reason: String },

    /// The file does not start with the ORC magic at all.
    #[error("Input file = {} , header = {header}", path.display())]
    NotAnOrcFile { path: PathBuf, header: HeaderBytes },

    #[error("Failed to create record reader for file {}", path.display())]
    RecordReader {
        path: PathBuf,
        #[source]
        source: Box<DwrfError>,
    },

    #[error("record reader is closed")]
    Closed,
}

impl DwrfError {
    /// Failures that come from misreading the file's own structure (as opposed
    /// to the file system). Only these warrant sniffing the header.
    pub fn is_structural(&self) -> bool {
        matches!(self, DwrfError::Format(_) | DwrfError::Codec(_))
    }

    pub(crate) fn with_path(self, path: impl Into<PathBuf>) -> Self {
        DwrfError::RecordReader {
            path: path.into(),
            source: Box::new(self),
        }
    }
}

// Convenient crate-wide result type
pub type Result<T> = std::result::Result<T, DwrfError>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn only_format_and_codec_are_structural() {
        assert!(DwrfError::Format("bad footer".into()).is_structural());
        assert!(DwrfError::Codec("bad frame".into()).is_structural());
        assert!(!DwrfError::Io(std::io::ErrorKind::NotFound.into()).is_structural());
        assert!(!DwrfError::Closed.is_structural());
    }

    #[test]
    fn wrapped_error_keeps_path_and_cause() {
        let err = DwrfError::Format("postscript magic mismatch".into())
            .with_path("/warehouse/t/000000_0");
        assert_eq!(
            err.to_string(),
            "Failed to create record reader for file /warehouse/t/000000_0"
        );
        let source = std::error::Error::source(&err).map(|s| s.to_string());
        assert_eq!(
            source.as_deref(),
            Some("Format error: postscript magic mismatch")
        );
    }
}
