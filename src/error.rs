use std::path::PathBuf;
use thiserror::Error;

/// Unified error type for changetool operations
#[derive(Error, Debug)]
pub enum ChangetoolError {
    #[error("Repository unavailable: {0}")]
    Repository(#[from] git2::Error),

    #[error("Unable to find desired tag {0}")]
    TagNotFound(String),

    #[error("File error on {}: {source}", path.display())]
    FileIo {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("Configuration error: {0}")]
    Config(String),

    #[error("Invalid pattern: {0}")]
    Pattern(#[from] regex::Error),

    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),
}

/// Convenience type alias for Results in changetool
pub type Result<T> = std::result::Result<T, ChangetoolError>;

impl ChangetoolError {
    /// Create a configuration error with context
    pub fn config(msg: impl Into<String>) -> Self {
        ChangetoolError::Config(msg.into())
    }

    /// Create a tag-not-found error for the named tag
    pub fn tag_not_found(name: impl Into<String>) -> Self {
        ChangetoolError::TagNotFound(name.into())
    }

    /// Wrap an I/O error with the file it happened on
    pub fn file_io(path: impl Into<PathBuf>, source: std::io::Error) -> Self {
        ChangetoolError::FileIo {
            path: path.into(),
            source,
        }
    }
}
