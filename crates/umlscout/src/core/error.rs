//! Core error types for class-model extraction
//!
//! Only structural problems with the project root abort a run. Everything
//! that goes wrong for a single file or declaration is logged and skipped,
//! so most of these variants are reported, not propagated.

use std::path::PathBuf;
use thiserror::Error;

/// Core error types for the extraction pipeline
#[derive(Error, Debug)]
pub enum ScanError {
    #[error("IO error reading {}: {source}", path.display())]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("File is not valid UTF-8: {}", path.display())]
    Undecodable { path: PathBuf },

    #[error("Project root not found or not a directory: {}", path.display())]
    MissingProjectRoot { path: PathBuf },

    #[error("Expected '{marker}' in project root {}", root.display())]
    MissingExpectedMarker { root: PathBuf, marker: String },

    #[error("Unknown dialect: {name}")]
    UnknownDialect { name: String },

    #[error("Render error: {message}")]
    Render { message: String },
}

impl ScanError {
    /// Create a new IO error for a path
    pub fn io(path: impl Into<PathBuf>, source: std::io::Error) -> Self {
        Self::Io {
            path: path.into(),
            source,
        }
    }

    /// Create a new decoding error
    pub fn undecodable(path: impl Into<PathBuf>) -> Self {
        Self::Undecodable { path: path.into() }
    }

    /// Create a new missing-root error
    pub fn missing_root(path: impl Into<PathBuf>) -> Self {
        Self::MissingProjectRoot { path: path.into() }
    }

    /// Create a new missing-marker error
    pub fn missing_marker(root: impl Into<PathBuf>, marker: impl Into<String>) -> Self {
        Self::MissingExpectedMarker {
            root: root.into(),
            marker: marker.into(),
        }
    }

    /// Create a new render error
    pub fn render_error(message: String) -> Self {
        Self::Render { message }
    }

    /// Whether this error must abort the whole run
    pub fn is_fatal(&self) -> bool {
        matches!(
            self,
            ScanError::MissingProjectRoot { .. }
                | ScanError::MissingExpectedMarker { .. }
                | ScanError::UnknownDialect { .. }
        )
    }
}
