//! Error types for publish-scm

use std::path::PathBuf;

/// Result type for publish-scm operations
pub type Result<T> = std::result::Result<T, Error>;

/// Errors that can occur in publish-scm operations
#[derive(Debug, thiserror::Error)]
pub enum Error {
    #[error("Git error: {0}")]
    Git(#[from] git2::Error),

    #[error("Filesystem error: {0}")]
    Fs(#[from] publish_fs::Error),

    #[error("Invalid SCM URL '{url}': {reason}")]
    InvalidUrl { url: String, reason: String },

    #[error("No SCM provider for '{provider}'")]
    NoSuchProvider { provider: String },

    #[error("Operation '{operation}' is not supported by the {provider} provider")]
    Unsupported { operation: String, provider: String },

    #[error("HEAD of {path} is detached; a branch name is required")]
    DetachedHead { path: PathBuf },
}
