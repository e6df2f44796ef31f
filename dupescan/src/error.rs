//! All error types for the dupescan crate.
//!
//! Only configuration problems and report-writing failures surface as errors.
//! Unreadable registry documents, archives and overlay files are skipped by the
//! loaders and never reach the caller.

use std::path::PathBuf;

use thiserror::Error;

#[derive(Error, Debug)]
pub enum Error {
    #[error("parse error: {0}")]
    Parse(#[from] serde_json::Error),

    #[error("archive error: {0}")]
    Archive(#[from] zip::result::ZipError),

    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    #[error("unknown kind `{0}`")]
    UnknownKind(String),

    #[error("configuration error: {0}")]
    Config(String),

    #[error("failed to write {}: {source}", path.display())]
    Write {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
}

impl Error {
    /// Creates a new configuration error.
    pub fn config(message: impl Into<String>) -> Self {
        Error::Config(message.into())
    }

    /// Wraps an I/O failure that happened while producing `path`.
    pub fn write(path: impl Into<PathBuf>, source: std::io::Error) -> Self {
        Error::Write {
            path: path.into(),
            source,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io;

    #[test]
    fn test_parse_error() {
        let json_error = serde_json::from_str::<serde_json::Value>("{ invalid json }").unwrap_err();
        let error = Error::Parse(json_error);
        assert!(error.to_string().contains("parse error"));
    }

    #[test]
    fn test_io_error() {
        let io_error = io::Error::new(io::ErrorKind::NotFound, "File not found");
        let error = Error::Io(io_error);
        assert!(error.to_string().contains("I/O error"));
    }

    #[test]
    fn test_config_error() {
        let error = Error::config("registry root is not a directory");
        assert_eq!(
            error.to_string(),
            "configuration error: registry root is not a directory"
        );
    }

    #[test]
    fn test_write_error_names_path() {
        let error = Error::write(
            "out/BASELINE_duplicates.txt",
            io::Error::new(io::ErrorKind::PermissionDenied, "denied"),
        );
        let display = error.to_string();
        assert!(display.contains("out/BASELINE_duplicates.txt"));
        assert!(display.contains("denied"));
    }

    #[test]
    fn test_unknown_kind_error() {
        let error = Error::UnknownKind("fluid".to_string());
        assert_eq!(error.to_string(), "unknown kind `fluid`");
    }

    #[test]
    fn test_error_debug() {
        let error = Error::UnknownKind("test".to_string());
        let debug = format!("{:?}", error);
        assert!(debug.contains("UnknownKind"));
        assert!(debug.contains("test"));
    }
}
