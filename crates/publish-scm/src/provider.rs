//! Backend trait and operation results

use std::path::Path;

use publish_fs::RelativePath;

use crate::{Error, GitProvider, Result, ScmRepository, ScmUrl};

/// Outcome of a single backend operation.
///
/// A non-success result is a regular return value, not an error: the
/// backend ran but refused or failed the operation.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ScmResult {
    pub success: bool,
    pub provider_message: String,
    pub command_output: String,
}

impl ScmResult {
    pub fn success(message: impl Into<String>) -> Self {
        Self {
            success: true,
            provider_message: message.into(),
            command_output: String::new(),
        }
    }

    pub fn failure(message: impl Into<String>, output: impl Into<String>) -> Self {
        Self {
            success: false,
            provider_message: message.into(),
            command_output: output.into(),
        }
    }

    pub fn is_success(&self) -> bool {
        self.success
    }
}

/// Outcome of a commit.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CheckInResult {
    pub result: ScmResult,
    /// Revision created by the commit, or the current one when nothing changed.
    pub revision: Option<String>,
    pub checked_in_files: Vec<RelativePath>,
}

impl CheckInResult {
    pub fn failure(result: ScmResult) -> Self {
        Self {
            result,
            revision: None,
            checked_in_files: Vec::new(),
        }
    }
}

/// Options of a staging `add`.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AddOptions {
    pub message: String,
    /// Stage paths even when the backend's own ignore rules exclude them.
    pub force: bool,
}

impl AddOptions {
    pub fn new(message: impl Into<String>) -> Self {
        Self {
            message: message.into(),
            force: false,
        }
    }

    pub fn forced(mut self) -> Self {
        self.force = true;
        self
    }
}

/// A version-control backend.
///
/// Paths handed to staging operations are relative to `working_dir`, the
/// root of the working copy.
///
/// `Err` means the backend could not run at all (transport, library or
/// filesystem failure). Callers treat it as transient where a retry makes
/// sense.
pub trait ScmProvider {
    /// Provider id, e.g. `git`.
    fn name(&self) -> &str;

    /// Name of the backend's private entry inside a working copy, if any.
    ///
    /// Reconciliation never lists or deletes it.
    fn metadata_entry_name(&self) -> Option<&str> {
        None
    }

    /// Fetch a fresh working copy into the existing, empty `working_dir`.
    fn checkout(
        &self,
        repository: &ScmRepository,
        working_dir: &Path,
        branch: Option<&str>,
    ) -> Result<ScmResult>;

    /// Bring an existing working copy up to date.
    fn update(
        &self,
        repository: &ScmRepository,
        working_dir: &Path,
        branch: Option<&str>,
    ) -> Result<ScmResult>;

    fn add(
        &self,
        repository: &ScmRepository,
        working_dir: &Path,
        paths: &[RelativePath],
        options: &AddOptions,
    ) -> Result<ScmResult>;

    /// Stage removal of `paths`, deleting them from the working copy.
    fn remove(
        &self,
        repository: &ScmRepository,
        working_dir: &Path,
        paths: &[RelativePath],
        message: &str,
    ) -> Result<ScmResult>;

    /// Commit every pending change of the working copy.
    fn commit(
        &self,
        repository: &ScmRepository,
        working_dir: &Path,
        branch: Option<&str>,
        message: &str,
    ) -> Result<CheckInResult>;

    /// Probe whether the remote location exists.
    ///
    /// `None` when the backend has no notion of a remote path.
    fn remote_exists(&self, _repository: &ScmRepository) -> Result<Option<bool>> {
        Ok(None)
    }

    /// Create the remote location.
    fn create_remote_path(&self, _repository: &ScmRepository, _message: &str) -> Result<ScmResult> {
        Err(Error::Unsupported {
            operation: "create remote path".into(),
            provider: self.name().to_string(),
        })
    }
}

/// Select the backend for a locator.
pub fn provider_for(url: &ScmUrl) -> Result<Box<dyn ScmProvider>> {
    let provider: Box<dyn ScmProvider> = match url.provider() {
        "git" => Box::new(GitProvider::new()),
        other => {
            return Err(Error::NoSuchProvider {
                provider: other.to_string(),
            });
        }
    };
    tracing::debug!(provider = provider.name(), url = %url, "Selected SCM provider");
    Ok(provider)
}
