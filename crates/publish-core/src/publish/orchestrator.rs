//! End-to-end publish run

use std::fmt;
use std::fs;
use std::path::{Path, PathBuf};
use std::time::{Duration, Instant};

use publish_fs::{RelativePath, display_size, io, text};
use publish_scm::{AddOptions, ScmProvider, ScmRepository, ScmResult};
use serde::Serialize;

use super::retry::{Sleeper, ThreadSleeper};
use super::staging::StagingPlan;
use crate::config::PublishConfig;
use crate::materialize::EntryMaterializer;
use crate::reconcile::{ChangeSet, ContentComparator};
use crate::workdir::WorkingCopy;
use crate::{Error, Result};

/// Stage of a publish run.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PublishState {
    Idle,
    Acquiring,
    Reconciling,
    Materializing,
    Staging,
    Committing,
    Done,
    Aborted,
}

impl fmt::Display for PublishState {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            Self::Idle => "idle",
            Self::Acquiring => "acquiring",
            Self::Reconciling => "reconciling",
            Self::Materializing => "materializing",
            Self::Staging => "staging",
            Self::Committing => "committing",
            Self::Done => "done",
            Self::Aborted => "aborted",
        };
        f.write_str(name)
    }
}

/// Result of the commit step.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct CheckIn {
    pub revision: Option<String>,
    pub files: usize,
    pub elapsed_secs: u64,
}

/// What a completed run did.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct PublishReport {
    pub changes: ChangeSet,
    pub dry_run: bool,
    /// `None` for dry runs and when check-in is skipped.
    pub check_in: Option<CheckIn>,
}

/// Outcome of [`PublishOrchestrator::run`].
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum PublishOutcome {
    /// Deployment is disabled by configuration; nothing was touched.
    Skipped,
    Completed(PublishReport),
}

/// Drives one publish run against a backend.
///
/// The run walks `Idle -> Acquiring -> Reconciling -> Materializing ->
/// Staging -> Committing -> Done`; any error ends it in `Aborted`. Nothing is
/// rolled back: re-running recomputes the change set from scratch.
pub struct PublishOrchestrator<'a> {
    config: &'a PublishConfig,
    provider: &'a dyn ScmProvider,
    sleeper: &'a dyn Sleeper,
    state: PublishState,
}

impl<'a> PublishOrchestrator<'a> {
    pub fn new(config: &'a PublishConfig, provider: &'a dyn ScmProvider) -> Self {
        Self {
            config,
            provider,
            sleeper: &ThreadSleeper,
            state: PublishState::Idle,
        }
    }

    /// Replace the delay between checkout attempts.
    pub fn with_sleeper(mut self, sleeper: &'a dyn Sleeper) -> Self {
        self.sleeper = sleeper;
        self
    }

    pub fn state(&self) -> PublishState {
        self.state
    }

    pub fn run(&mut self) -> Result<PublishOutcome> {
        match self.execute() {
            Ok(outcome) => {
                self.enter(PublishState::Done);
                Ok(outcome)
            }
            Err(e) => {
                tracing::debug!(state = %self.state, error = %e, "Publish aborted");
                self.enter(PublishState::Aborted);
                Err(e)
            }
        }
    }

    fn enter(&mut self, state: PublishState) {
        tracing::debug!(from = %self.state, to = %state, "Publish state");
        self.state = state;
    }

    fn execute(&mut self) -> Result<PublishOutcome> {
        let config = self.config;
        if config.skip_deployment {
            tracing::info!("skip-deployment = true: Skipping site deployment");
            return Ok(PublishOutcome::Skipped);
        }

        // Everything that can be rejected is rejected before the backend runs
        let repository = config.repository()?;
        let content = validate_content(&config.content)?;
        let sub_directory = config.sub_directory()?;
        text::ensure_line_oriented(config.encoding())?;
        let policy = config.path_policy()?;
        let normalization = config.normalization_policy();

        let working_copy = WorkingCopy::resolve(&config.checkout_directory)?;
        let root = working_copy.path();

        self.enter(PublishState::Acquiring);
        self.acquire(&repository, root)?;

        self.enter(PublishState::Reconciling);
        let update_dir = sub_directory.to_native(root);
        if !sub_directory.is_root() {
            tracing::info!("Will copy content in sub-directory: {}", sub_directory);
            if !config.dry_run {
                io::ensure_dir(&update_dir)?;
            }
        }
        tracing::info!(
            "Updating checkout directory with actual content in {}",
            content.display()
        );
        let mut reconciliation =
            ContentComparator::new(&policy, self.provider.metadata_entry_name())
                .with_base(sub_directory)
                .compare(&update_dir, Some(&content))?;

        if config.dry_run {
            reconciliation.changes.stats = reconciliation.source_stats()?;
            log_summary(&reconciliation.changes);
            return Ok(PublishOutcome::Completed(PublishReport {
                changes: reconciliation.changes,
                dry_run: true,
                check_in: None,
            }));
        }

        self.enter(PublishState::Materializing);
        reconciliation.changes.stats =
            EntryMaterializer::new(&normalization).apply_all(&reconciliation.copies)?;
        log_summary(&reconciliation.changes);

        self.enter(PublishState::Staging);
        self.stage(
            &repository,
            root,
            &StagingPlan::from_changes(&reconciliation.changes),
        )?;

        self.enter(PublishState::Committing);
        let check_in = self.check_in(&repository, root)?;

        Ok(PublishOutcome::Completed(PublishReport {
            changes: reconciliation.changes,
            dry_run: false,
            check_in,
        }))
    }

    fn acquire(&self, repository: &ScmRepository, root: &Path) -> Result<()> {
        let config = self.config;
        let provider = self.provider;

        match provider.remote_exists(repository)? {
            Some(false) if config.automatic_remote_path_creation => {
                tracing::info!("Remote {} does not exist: creating.", repository.url);
                let message = format!("Automatic remote path creation: {}", repository.url);
                check(
                    provider.create_remote_path(repository, &message)?,
                    "create remote path",
                )?;
                // New remote, so the old working copy is stale
                io::remove_entry(root)?;
            }
            Some(false) => {
                tracing::warn!(
                    "Remote {} does not exist and automatic remote path creation disabled.",
                    repository.url
                );
            }
            Some(true) => {}
            None => tracing::debug!(provider = provider.name(), "Remote existence is not probed"),
        }

        tracing::info!(
            "{} the pub tree from {} into {}",
            if config.try_update { "Updating" } else { "Checking out" },
            repository.url,
            root.display()
        );

        if !config.try_update {
            io::remove_entry(root)?;
        }

        let mut force_checkout = false;
        if io::entry_type(root)?.is_none() {
            if config.try_update {
                tracing::info!(
                    "TryUpdate is configured but no local copy currently available: forcing checkout."
                );
            }
            create_dir(root)?;
            force_checkout = true;
        }

        let branch = config.scm_branch.as_deref();
        if config.try_update && !force_checkout {
            let result = provider.update(repository, root, branch)?;
            return check(result, "update from SCM");
        }

        let result = config
            .checkout_retry
            .run(self.sleeper, "Checkout", |attempt| -> Result<ScmResult> {
                if attempt > 1 {
                    io::remove_entry(root)?;
                    create_dir(root)?;
                }
                Ok(provider.checkout(repository, root, branch)?)
            })?;
        check(result, "check out from SCM")
    }

    fn stage(&self, repository: &ScmRepository, root: &Path, plan: &StagingPlan) -> Result<()> {
        let config = self.config;
        let provider = self.provider;

        if !plan.directories.is_empty() {
            if config.add_unique_directory {
                for dir in &plan.directories {
                    tracing::info!("scm add directory: {}", dir);
                    let result = provider.add(
                        repository,
                        root,
                        std::slice::from_ref(dir),
                        &AddOptions::new("Adding directory"),
                    )?;
                    check(result, "add directory to SCM")?;
                }
            } else {
                tracing::info!("scm add directories: {}", join(&plan.directories));
                let result = provider.add(
                    repository,
                    root,
                    &plan.directories,
                    &AddOptions::new("Adding directories"),
                )?;
                check(result, "add directories to SCM")?;
            }
        }

        if !plan.files.is_empty() {
            tracing::info!("scm add files: {}", join(&plan.files));
            let result = provider.add(
                repository,
                root,
                &plan.files,
                &AddOptions::new("Adding new site files.").forced(),
            )?;
            check(result, "add new files to SCM")?;
        }

        if !plan.deletions.is_empty() {
            if config.skip_deleted_files {
                tracing::info!("Deleting files is skipped.");
            } else {
                tracing::info!("Deleting files: {}", join(&plan.deletions));
                let result = provider.remove(
                    repository,
                    root,
                    &plan.deletions,
                    "Deleting obsolete site files.",
                )?;
                check(result, "delete files from SCM")?;
            }
        }

        Ok(())
    }

    fn check_in(&self, repository: &ScmRepository, root: &Path) -> Result<Option<CheckIn>> {
        let config = self.config;
        if config.skip_checkin {
            tracing::info!(
                "Check-in is skipped: staged changes are left in {}",
                root.display()
            );
            return Ok(None);
        }

        tracing::info!(
            "Checking in SCM, starting at {}...",
            chrono::Local::now().format("%Y-%m-%d %H:%M:%S")
        );
        let start = Instant::now();
        let result = self.provider.commit(
            repository,
            root,
            config.scm_branch.as_deref(),
            &config.checkin_comment,
        )?;
        check(result.result, "check-in files to SCM")?;

        let elapsed = start.elapsed();
        let revision = result.revision.unwrap_or_default();
        tracing::info!(
            "Checked in {} file(s) to revision {} in {}",
            result.checked_in_files.len(),
            revision,
            format_elapsed(elapsed)
        );

        Ok(Some(CheckIn {
            revision: (!revision.is_empty()).then_some(revision),
            files: result.checked_in_files.len(),
            elapsed_secs: elapsed.as_secs(),
        }))
    }
}

/// Format a duration as `H h M m S s`.
pub fn format_elapsed(elapsed: Duration) -> String {
    let secs = elapsed.as_secs();
    format!("{} h {} m {} s", secs / 3600, (secs % 3600) / 60, secs % 60)
}

fn check(result: ScmResult, step: &str) -> Result<()> {
    if result.is_success() {
        Ok(())
    } else {
        Err(Error::backend(step, &result))
    }
}

fn validate_content(content: &Path) -> Result<PathBuf> {
    if !content.is_dir() {
        return Err(Error::configuration(format!(
            "Configured content directory does not exist: {}",
            content.display()
        )));
    }
    if fs::read_dir(content).is_err() {
        return Err(Error::configuration(format!(
            "Can't read content directory: {}",
            content.display()
        )));
    }
    Ok(content.to_path_buf())
}

fn create_dir(path: &Path) -> Result<()> {
    fs::create_dir_all(path).map_err(|e| publish_fs::Error::io(path, e))?;
    Ok(())
}

fn join(paths: &[RelativePath]) -> String {
    paths
        .iter()
        .map(RelativePath::as_str)
        .collect::<Vec<_>>()
        .join(", ")
}

fn log_summary(changes: &ChangeSet) {
    tracing::info!(
        "Content consists of {} directories and {} files = {}",
        changes.stats.directories,
        changes.stats.files,
        display_size(changes.stats.total_bytes)
    );
    tracing::info!(
        "Publishing content to SCM will result in {} addition(s), {} update(s), {} delete(s)",
        changes.added.len(),
        changes.updated.len(),
        changes.deleted.len()
    );
}

#[cfg(test)]
mod tests {
    use super::*;
    use rstest::rstest;

    #[rstest]
    #[case(0, "0 h 0 m 0 s")]
    #[case(59, "0 h 0 m 59 s")]
    #[case(3_725, "1 h 2 m 5 s")]
    fn formats_elapsed_time(#[case] secs: u64, #[case] expected: &str) {
        assert_eq!(format_elapsed(Duration::from_secs(secs)), expected);
    }

    #[test]
    fn states_display_lowercase() {
        assert_eq!(PublishState::Materializing.to_string(), "materializing");
        assert_eq!(PublishState::Aborted.to_string(), "aborted");
    }
}
