//! Location of the working copy for one run

use std::path::{Path, PathBuf};

use tempfile::TempDir;

use crate::Result;

const PLACEHOLDER: &str = "${";

/// The working-copy directory of a publish run.
///
/// When the configured location still holds an unresolved `${...}`
/// placeholder a temporary directory is used instead. It is removed when
/// the value drops, on every exit path.
#[derive(Debug)]
pub struct WorkingCopy {
    path: PathBuf,
    // Removed on drop
    _temporary: Option<TempDir>,
}

impl WorkingCopy {
    pub fn resolve(configured: &str) -> Result<Self> {
        if configured.contains(PLACEHOLDER) {
            let temp = tempfile::Builder::new()
                .prefix("scm-publish.checkout")
                .tempdir()?;
            tracing::info!(
                configured = %configured,
                path = %temp.path().display(),
                "Checkout directory is unresolved: using a temporary directory"
            );
            return Ok(Self {
                path: temp.path().to_path_buf(),
                _temporary: Some(temp),
            });
        }

        Ok(Self {
            path: PathBuf::from(configured),
            _temporary: None,
        })
    }

    pub fn path(&self) -> &Path {
        &self.path
    }
}
