use std::io;

use thiserror::Error;

/// Library-wide error type for packdata operations.
#[derive(Debug, Error)]
pub enum AppError {
    /// Underlying I/O failure.
    #[error(transparent)]
    Io(#[from] io::Error),

    /// No bundled resource matches the requested name.
    #[error("Resource '{0}' not found in the data bundle")]
    ResourceNotFound(String),

    /// Resource name would escape the data root.
    #[error("Invalid resource name '{0}': must be a plain relative path")]
    InvalidResourceName(String),

    /// Bundled JSON could not be parsed.
    #[error("JSON parse error: {0}")]
    JsonParse(#[from] serde_json::Error),

    /// Report template rendering failed.
    #[error("Template error: {0}")]
    Template(#[from] minijinja::Error),

    /// Directory traversal failed during a source scan.
    #[error("Scan failed: {0}")]
    Scan(#[from] walkdir::Error),

    /// An import-matching pattern failed to compile.
    #[error("Invalid scan pattern: {0}")]
    Pattern(#[from] regex::Error),
}

impl AppError {
    /// Provide an `io::ErrorKind`-like view for callers mapping errors to exit codes.
    pub fn kind(&self) -> io::ErrorKind {
        match self {
            AppError::Io(err) => err.kind(),
            AppError::ResourceNotFound(_) => io::ErrorKind::NotFound,
            AppError::InvalidResourceName(_) => io::ErrorKind::InvalidInput,
            AppError::JsonParse(_) | AppError::Template(_) => io::ErrorKind::InvalidData,
            AppError::Scan(_) => io::ErrorKind::Other,
            AppError::Pattern(_) => io::ErrorKind::InvalidInput,
        }
    }
}
