//! Git backend built on `git2`
//!
//! A checkout is a clone of the remote, a commit is followed by a push of the
//! branch to `origin`. Failures of everything but `checkout` are reported as
//! non-success [`ScmResult`]s so the caller sees the library message.

pub mod helpers;

use std::path::Path;

use git2::{IndexAddOption, Repository, build::RepoBuilder};
use publish_fs::RelativePath;
use publish_fs::io::EntryType;

use crate::{AddOptions, CheckInResult, Result, ScmProvider, ScmRepository, ScmResult};

/// Git backend.
#[derive(Debug, Default, Clone)]
pub struct GitProvider;

impl GitProvider {
    pub fn new() -> Self {
        Self
    }

    fn try_update(
        &self,
        repository: &ScmRepository,
        working_dir: &Path,
        branch: Option<&str>,
    ) -> Result<ScmResult> {
        let repo = Repository::open(working_dir)?;
        let branch = match branch {
            Some(b) => b.to_string(),
            None => helpers::current_branch(&repo)?,
        };

        Ok(
            match helpers::fetch_fast_forward(&repo, &branch, &repository.credentials)? {
                Ok(message) => ScmResult::success(message),
                Err(message) => ScmResult::failure("git update failed", message),
            },
        )
    }

    fn try_add(
        &self,
        working_dir: &Path,
        paths: &[RelativePath],
        options: &AddOptions,
    ) -> Result<ScmResult> {
        let repo = Repository::open(working_dir)?;
        let mut index = repo.index()?;
        let flags = if options.force {
            IndexAddOption::FORCE
        } else {
            IndexAddOption::DEFAULT
        };

        for path in paths {
            if helpers::is_directory(&path.to_native(working_dir))? {
                index.add_all([path.as_str()], flags, None)?;
            } else {
                index.add_path(Path::new(path.as_str()))?;
            }
        }
        index.write()?;

        Ok(ScmResult::success(format!("Added {} path(s)", paths.len())))
    }

    fn try_remove(&self, working_dir: &Path, paths: &[RelativePath]) -> Result<ScmResult> {
        let repo = Repository::open(working_dir)?;
        let mut index = repo.index()?;

        for path in paths {
            match publish_fs::io::entry_type_beneath(working_dir, path)? {
                Some(EntryType::Directory) => {
                    index.remove_dir(Path::new(path.as_str()), 0)?;
                }
                // Already gone, or reached through a replaced parent: index only
                None => {
                    index.remove_path(Path::new(path.as_str()))?;
                    continue;
                }
                Some(_) => index.remove_path(Path::new(path.as_str()))?,
            }
            publish_fs::io::remove_entry(&path.to_native(working_dir))?;
        }
        index.write()?;

        Ok(ScmResult::success(format!("Removed {} path(s)", paths.len())))
    }

    fn try_commit(
        &self,
        repository: &ScmRepository,
        working_dir: &Path,
        branch: Option<&str>,
        message: &str,
    ) -> Result<CheckInResult> {
        let repo = Repository::open(working_dir)?;

        // Modified tracked files were rewritten in place and are not staged yet
        let mut index = repo.index()?;
        index.update_all(["*"], None)?;
        index.write()?;

        let tree_id = index.write_tree()?;
        let tree = repo.find_tree(tree_id)?;
        let parent = helpers::head_commit(&repo)?;
        let changed = helpers::changed_paths(&repo, parent.as_ref(), &tree)?;

        if changed.is_empty() {
            return Ok(CheckInResult {
                result: ScmResult::success("Nothing to commit"),
                revision: parent.map(|c| c.id().to_string()),
                checked_in_files: Vec::new(),
            });
        }

        let signature = helpers::signature(&repo)?;
        let parents: Vec<&git2::Commit<'_>> = parent.iter().collect();
        let oid = repo.commit(Some("HEAD"), &signature, &signature, message, &tree, &parents)?;

        let branch = match branch {
            Some(b) => b.to_string(),
            None => helpers::current_branch(&repo)?,
        };
        helpers::push(&repo, &branch, &repository.credentials)?;

        tracing::debug!(revision = %oid, branch = %branch, files = changed.len(), "Pushed commit");
        Ok(CheckInResult {
            result: ScmResult::success(format!("Committed and pushed {}", oid)),
            revision: Some(oid.to_string()),
            checked_in_files: changed,
        })
    }
}

fn failed(operation: &str, e: crate::Error) -> ScmResult {
    ScmResult::failure(format!("git {} failed", operation), e.to_string())
}

impl ScmProvider for GitProvider {
    fn name(&self) -> &str {
        "git"
    }

    fn metadata_entry_name(&self) -> Option<&str> {
        Some(".git")
    }

    fn checkout(
        &self,
        repository: &ScmRepository,
        working_dir: &Path,
        branch: Option<&str>,
    ) -> Result<ScmResult> {
        let mut builder = RepoBuilder::new();
        if let Some(branch) = branch {
            builder.branch(branch);
        }
        builder.fetch_options(helpers::fetch_options(&repository.credentials));
        builder.clone(repository.url.address(), working_dir)?;

        Ok(ScmResult::success(format!(
            "Cloned {} into {}",
            repository.url.address(),
            working_dir.display()
        )))
    }

    fn update(
        &self,
        repository: &ScmRepository,
        working_dir: &Path,
        branch: Option<&str>,
    ) -> Result<ScmResult> {
        Ok(self
            .try_update(repository, working_dir, branch)
            .unwrap_or_else(|e| failed("update", e)))
    }

    fn add(
        &self,
        _repository: &ScmRepository,
        working_dir: &Path,
        paths: &[RelativePath],
        options: &AddOptions,
    ) -> Result<ScmResult> {
        Ok(self
            .try_add(working_dir, paths, options)
            .unwrap_or_else(|e| failed("add", e)))
    }

    fn remove(
        &self,
        _repository: &ScmRepository,
        working_dir: &Path,
        paths: &[RelativePath],
        _message: &str,
    ) -> Result<ScmResult> {
        Ok(self
            .try_remove(working_dir, paths)
            .unwrap_or_else(|e| failed("remove", e)))
    }

    fn commit(
        &self,
        repository: &ScmRepository,
        working_dir: &Path,
        branch: Option<&str>,
        message: &str,
    ) -> Result<CheckInResult> {
        Ok(self
            .try_commit(repository, working_dir, branch, message)
            .unwrap_or_else(|e| CheckInResult::failure(failed("commit", e))))
    }
}
