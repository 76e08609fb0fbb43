//! Error types for publish-core

use publish_scm::ScmResult;

/// Result type for publish-core operations
pub type Result<T> = std::result::Result<T, Error>;

/// Errors that can occur in publish-core operations
#[derive(Debug, thiserror::Error)]
pub enum Error {
    /// Invalid or missing configuration, detected before any backend call
    #[error("Configuration error: {message}")]
    Configuration { message: String },

    /// A backend operation returned a non-success result
    #[error("Failed to {step}: {message}")]
    Backend { step: String, message: String },

    // Transparent wrappers for underlying crate errors
    /// Filesystem error from publish-fs
    #[error(transparent)]
    Fs(#[from] publish_fs::Error),

    /// Backend error from publish-scm
    #[error(transparent)]
    Scm(#[from] publish_scm::Error),

    /// Standard I/O error
    #[error(transparent)]
    Io(#[from] std::io::Error),
}

/// Coarse classification of an [`Error`].
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ErrorKind {
    Configuration,
    Backend,
    Io,
}

impl Error {
    pub fn configuration(message: impl Into<String>) -> Self {
        Self::Configuration {
            message: message.into(),
        }
    }

    /// Build the error for a failed backend `step` from its result.
    pub fn backend(step: &str, result: &ScmResult) -> Self {
        let message = format!("{} {}", result.provider_message, result.command_output);
        Self::Backend {
            step: step.to_string(),
            message: message.trim().to_string(),
        }
    }

    pub fn kind(&self) -> ErrorKind {
        match self {
            Self::Configuration { .. } => ErrorKind::Configuration,
            Self::Backend { .. } => ErrorKind::Backend,
            Self::Fs(e) => fs_kind(e),
            Self::Scm(e) => match e {
                publish_scm::Error::InvalidUrl { .. } | publish_scm::Error::NoSuchProvider { .. } => {
                    ErrorKind::Configuration
                }
                publish_scm::Error::Fs(e) => fs_kind(e),
                _ => ErrorKind::Backend,
            },
            Self::Io(_) => ErrorKind::Io,
        }
    }
}

fn fs_kind(error: &publish_fs::Error) -> ErrorKind {
    match error {
        publish_fs::Error::Io { .. } | publish_fs::Error::InvalidFileName { .. } => ErrorKind::Io,
        _ => ErrorKind::Configuration,
    }
}
