//! Error types for publish-fs

use std::path::PathBuf;

/// Result type for publish-fs operations
pub type Result<T> = std::result::Result<T, Error>;

/// Errors that can occur in publish-fs operations
#[derive(Debug, thiserror::Error)]
pub enum Error {
    #[error("I/O error at {path}: {source}")]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("Path '{path}' escapes its root")]
    PathEscape { path: String },

    #[error("File name at {path} is not valid UTF-8")]
    InvalidFileName { path: PathBuf },

    #[error("Encoding '{encoding}' is not line-oriented; newline normalization needs an ASCII-compatible encoding")]
    UnsupportedEncoding { encoding: String },

    #[error("Failed to parse {format} config at {path}: {message}")]
    ConfigParse {
        path: PathBuf,
        format: String,
        message: String,
    },

    #[error("Failed to serialize {format} config for {path}: {message}")]
    ConfigSerialize {
        path: PathBuf,
        format: String,
        message: String,
    },

    #[error("Unsupported config format: {extension}")]
    UnsupportedFormat { extension: String },
}

impl Error {
    pub fn io(path: impl Into<PathBuf>, source: std::io::Error) -> Self {
        Self::Io {
            path: path.into(),
            source,
        }
    }
}
