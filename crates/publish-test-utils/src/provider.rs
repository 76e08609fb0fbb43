//! In-memory [`ScmProvider`] that records every call.

use std::cell::{Cell, RefCell};
use std::path::{Path, PathBuf};

use publish_fs::RelativePath;
use publish_scm::{AddOptions, CheckInResult, ScmProvider, ScmRepository, ScmResult};

/// One recorded backend call.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ProviderCall {
    Checkout {
        working_dir: PathBuf,
        branch: Option<String>,
    },
    Update {
        working_dir: PathBuf,
        branch: Option<String>,
    },
    Add {
        paths: Vec<String>,
        message: String,
        force: bool,
    },
    Remove {
        paths: Vec<String>,
        message: String,
    },
    Commit {
        branch: Option<String>,
        message: String,
    },
    RemoteExists,
    CreateRemotePath {
        message: String,
    },
}

impl ProviderCall {
    /// Whether the call stages or commits changes.
    pub fn is_mutation(&self) -> bool {
        matches!(
            self,
            Self::Add { .. } | Self::Remove { .. } | Self::Commit { .. }
        )
    }
}

/// Scripted backend for orchestration tests.
///
/// Checkout writes the configured remote files into the working directory.
/// Transient checkout failures and a step that reports failure can be
/// scripted up front.
#[derive(Debug, Default)]
pub struct ScriptedProvider {
    calls: RefCell<Vec<ProviderCall>>,
    checkout_errors: Cell<u32>,
    remote_exists: Option<bool>,
    remote_files: Vec<(String, String)>,
    failing_step: Option<String>,
    metadata_entry: Option<String>,
}

impl ScriptedProvider {
    pub fn new() -> Self {
        Self::default()
    }

    /// Fail the next `count` checkouts with a transient error.
    pub fn with_checkout_errors(self, count: u32) -> Self {
        self.checkout_errors.set(count);
        self
    }

    /// Answer remote-existence probes with `exists`.
    pub fn with_remote_exists(mut self, exists: bool) -> Self {
        self.remote_exists = Some(exists);
        self
    }

    /// Content a checkout materializes.
    pub fn with_remote_files(mut self, files: &[(&str, &str)]) -> Self {
        self.remote_files = files
            .iter()
            .map(|(p, c)| (p.to_string(), c.to_string()))
            .collect();
        self
    }

    /// Report a non-success result from `step` (`checkout`, `update`, `add`,
    /// `remove`, `commit` or `create`).
    pub fn failing(mut self, step: &str) -> Self {
        self.failing_step = Some(step.to_string());
        self
    }

    /// Private entry a checkout creates, reported as metadata.
    pub fn with_metadata_entry(mut self, name: &str) -> Self {
        self.metadata_entry = Some(name.to_string());
        self
    }

    pub fn calls(&self) -> Vec<ProviderCall> {
        self.calls.borrow().clone()
    }

    pub fn checkout_count(&self) -> usize {
        self.calls
            .borrow()
            .iter()
            .filter(|c| matches!(c, ProviderCall::Checkout { .. }))
            .count()
    }

    pub fn mutation_count(&self) -> usize {
        self.calls.borrow().iter().filter(|c| c.is_mutation()).count()
    }

    fn record(&self, call: ProviderCall) {
        self.calls.borrow_mut().push(call);
    }

    fn outcome(&self, step: &str) -> ScmResult {
        if self.failing_step.as_deref() == Some(step) {
            ScmResult::failure(format!("{step} refused"), format!("scripted {step} failure"))
        } else {
            ScmResult::success(format!("{step} ok"))
        }
    }

    fn staged_paths(&self) -> Vec<RelativePath> {
        self.calls
            .borrow()
            .iter()
            .flat_map(|call| match call {
                ProviderCall::Add { paths, .. } | ProviderCall::Remove { paths, .. } => {
                    paths.clone()
                }
                _ => Vec::new(),
            })
            .filter_map(|p| RelativePath::new(p).ok())
            .collect()
    }
}

fn strings(paths: &[RelativePath]) -> Vec<String> {
    paths.iter().map(|p| p.to_string()).collect()
}

impl ScmProvider for ScriptedProvider {
    fn name(&self) -> &str {
        "scripted"
    }

    fn metadata_entry_name(&self) -> Option<&str> {
        self.metadata_entry.as_deref()
    }

    fn checkout(
        &self,
        _repository: &ScmRepository,
        working_dir: &Path,
        branch: Option<&str>,
    ) -> publish_scm::Result<ScmResult> {
        self.record(ProviderCall::Checkout {
            working_dir: working_dir.to_path_buf(),
            branch: branch.map(String::from),
        });

        let remaining = self.checkout_errors.get();
        if remaining > 0 {
            self.checkout_errors.set(remaining - 1);
            return Err(publish_scm::Error::Git(git2::Error::from_str(
                "connection reset by peer",
            )));
        }

        let files: Vec<(&str, &str)> = self
            .remote_files
            .iter()
            .map(|(p, c)| (p.as_str(), c.as_str()))
            .collect();
        crate::tree::write_tree(working_dir, &files);
        if let Some(name) = &self.metadata_entry {
            let marker = format!("{name}/state");
            crate::tree::write_tree(working_dir, &[(marker.as_str(), "scripted")]);
        }
        Ok(self.outcome("checkout"))
    }

    fn update(
        &self,
        _repository: &ScmRepository,
        working_dir: &Path,
        branch: Option<&str>,
    ) -> publish_scm::Result<ScmResult> {
        self.record(ProviderCall::Update {
            working_dir: working_dir.to_path_buf(),
            branch: branch.map(String::from),
        });
        Ok(self.outcome("update"))
    }

    fn add(
        &self,
        _repository: &ScmRepository,
        _working_dir: &Path,
        paths: &[RelativePath],
        options: &AddOptions,
    ) -> publish_scm::Result<ScmResult> {
        self.record(ProviderCall::Add {
            paths: strings(paths),
            message: options.message.clone(),
            force: options.force,
        });
        Ok(self.outcome("add"))
    }

    fn remove(
        &self,
        _repository: &ScmRepository,
        _working_dir: &Path,
        paths: &[RelativePath],
        message: &str,
    ) -> publish_scm::Result<ScmResult> {
        self.record(ProviderCall::Remove {
            paths: strings(paths),
            message: message.to_string(),
        });
        Ok(self.outcome("remove"))
    }

    fn commit(
        &self,
        _repository: &ScmRepository,
        _working_dir: &Path,
        branch: Option<&str>,
        message: &str,
    ) -> publish_scm::Result<CheckInResult> {
        let checked_in_files = self.staged_paths();
        self.record(ProviderCall::Commit {
            branch: branch.map(String::from),
            message: message.to_string(),
        });
        let result = self.outcome("commit");
        if !result.is_success() {
            return Ok(CheckInResult::failure(result));
        }
        Ok(CheckInResult {
            result,
            revision: Some("r42".into()),
            checked_in_files,
        })
    }

    fn remote_exists(&self, _repository: &ScmRepository) -> publish_scm::Result<Option<bool>> {
        self.record(ProviderCall::RemoteExists);
        Ok(self.remote_exists)
    }

    fn create_remote_path(
        &self,
        _repository: &ScmRepository,
        message: &str,
    ) -> publish_scm::Result<ScmResult> {
        self.record(ProviderCall::CreateRemotePath {
            message: message.to_string(),
        });
        Ok(self.outcome("create"))
    }
}
