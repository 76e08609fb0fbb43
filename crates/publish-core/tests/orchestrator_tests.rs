//! Publish runs against a scripted backend

use std::cell::RefCell;
use std::fs;
use std::path::{Path, PathBuf};
use std::time::Duration;

use pretty_assertions::assert_eq;
use publish_core::{
    ErrorKind, PublishConfig, PublishOrchestrator, PublishOutcome, PublishReport, PublishState,
    RetryPolicy, Sleeper,
};
use publish_test_utils::tree::{list_tree, write_tree};
use publish_test_utils::{ProviderCall, ScriptedProvider};
use tempfile::TempDir;

#[derive(Default)]
struct RecordingSleeper {
    delays: RefCell<Vec<Duration>>,
}

impl Sleeper for RecordingSleeper {
    fn sleep(&self, delay: Duration) {
        self.delays.borrow_mut().push(delay);
    }
}

struct Fixture {
    _temp: TempDir,
    content: PathBuf,
    checkout: PathBuf,
}

impl Fixture {
    fn new(content_files: &[(&str, &str)]) -> Self {
        let temp = TempDir::new().unwrap();
        let content = temp.path().join("site");
        fs::create_dir_all(&content).unwrap();
        write_tree(&content, content_files);
        let checkout = temp.path().join("checkout");
        Self {
            _temp: temp,
            content,
            checkout,
        }
    }

    fn config(&self) -> PublishConfig {
        PublishConfig {
            pub_scm_url: "scm:scripted:memory".into(),
            content: self.content.clone(),
            checkout_directory: self.checkout.to_string_lossy().into_owned(),
            output_encoding: Some("utf-8".into()),
            ..PublishConfig::default()
        }
    }
}

fn run(config: &PublishConfig, provider: &ScriptedProvider) -> publish_core::Result<PublishReport> {
    let sleeper = RecordingSleeper::default();
    let mut orchestrator = PublishOrchestrator::new(config, provider).with_sleeper(&sleeper);
    match orchestrator.run()? {
        PublishOutcome::Completed(report) => {
            assert_eq!(orchestrator.state(), PublishState::Done);
            Ok(report)
        }
        PublishOutcome::Skipped => panic!("run was skipped"),
    }
}

fn strings(list: &[&str]) -> Vec<String> {
    list.iter().map(|s| s.to_string()).collect()
}

fn mutations(provider: &ScriptedProvider) -> Vec<ProviderCall> {
    provider
        .calls()
        .into_iter()
        .filter(ProviderCall::is_mutation)
        .collect()
}

#[test]
fn test_publish_stages_and_commits_change_set() {
    let fixture = Fixture::new(&[("a.txt", "same"), ("new/c.txt", "c")]);
    let provider =
        ScriptedProvider::new().with_remote_files(&[("a.txt", "same"), ("old/b.txt", "b")]);

    let report = run(&fixture.config(), &provider).unwrap();

    assert_eq!(
        mutations(&provider),
        vec![
            ProviderCall::Add {
                paths: strings(&["new"]),
                message: "Adding directories".into(),
                force: false,
            },
            ProviderCall::Add {
                paths: strings(&["new/c.txt"]),
                message: "Adding new site files.".into(),
                force: true,
            },
            ProviderCall::Remove {
                paths: strings(&["old/b.txt", "old"]),
                message: "Deleting obsolete site files.".into(),
            },
            ProviderCall::Commit {
                branch: None,
                message: "Site checkin".into(),
            },
        ]
    );

    assert_eq!(report.changes.stats.directories, 1);
    assert_eq!(report.changes.stats.files, 2);
    assert_eq!(report.changes.stats.total_bytes, 5);
    let check_in = report.check_in.unwrap();
    assert_eq!(check_in.revision.as_deref(), Some("r42"));
    assert_eq!(check_in.files, 4);
    assert_eq!(
        fs::read_to_string(fixture.checkout.join("new/c.txt")).unwrap(),
        "c"
    );
}

#[test]
fn test_checkout_retried_after_transient_failures() {
    let fixture = Fixture::new(&[("index.html", "i")]);
    let provider = ScriptedProvider::new()
        .with_checkout_errors(2)
        .with_remote_files(&[("index.html", "old")]);
    let sleeper = RecordingSleeper::default();
    let config = fixture.config();

    let mut orchestrator = PublishOrchestrator::new(&config, &provider).with_sleeper(&sleeper);
    let outcome = orchestrator.run().unwrap();

    assert!(matches!(outcome, PublishOutcome::Completed(_)));
    assert_eq!(provider.checkout_count(), 3);
    assert_eq!(*sleeper.delays.borrow(), vec![Duration::from_secs(3); 2]);
}

#[test]
fn test_checkout_failing_every_attempt_aborts() {
    let fixture = Fixture::new(&[("index.html", "i")]);
    let provider = ScriptedProvider::new().with_checkout_errors(3);
    let sleeper = RecordingSleeper::default();
    let config = fixture.config();

    let mut orchestrator = PublishOrchestrator::new(&config, &provider).with_sleeper(&sleeper);
    let err = orchestrator.run().unwrap_err();

    assert_eq!(err.kind(), ErrorKind::Backend);
    assert_eq!(orchestrator.state(), PublishState::Aborted);
    assert_eq!(provider.checkout_count(), 3);
    assert_eq!(provider.mutation_count(), 0);
}

#[test]
fn test_checkout_failure_result_is_not_retried() {
    let fixture = Fixture::new(&[("index.html", "i")]);
    let provider = ScriptedProvider::new().failing("checkout");

    let err = run(&fixture.config(), &provider).unwrap_err();

    assert_eq!(
        err.to_string(),
        "Failed to check out from SCM: checkout refused scripted checkout failure"
    );
    assert_eq!(provider.checkout_count(), 1);
}

#[test]
fn test_retry_attempts_are_configurable() {
    let fixture = Fixture::new(&[("index.html", "i")]);
    let provider = ScriptedProvider::new().with_checkout_errors(4);
    let config = PublishConfig {
        checkout_retry: RetryPolicy {
            attempts: 5,
            delay_secs: 1,
        },
        ..fixture.config()
    };

    run(&config, &provider).unwrap();

    assert_eq!(provider.checkout_count(), 5);
}

#[test]
fn test_dry_run_makes_no_mutations() {
    let fixture = Fixture::new(&[("a.txt", "new content"), ("new/c.txt", "c")]);
    let provider =
        ScriptedProvider::new().with_remote_files(&[("a.txt", "old"), ("old/b.txt", "b")]);
    let config = PublishConfig {
        dry_run: true,
        ..fixture.config()
    };

    let report = run(&config, &provider).unwrap();

    assert!(report.dry_run);
    assert!(report.check_in.is_none());
    assert_eq!(report.changes.added.len(), 2);
    assert_eq!(report.changes.updated.len(), 1);
    assert_eq!(report.changes.deleted.len(), 2);
    assert_eq!(report.changes.stats.files, 2);
    assert_eq!(provider.mutation_count(), 0);
    // Working copy left exactly as checked out
    assert_eq!(
        list_tree(&fixture.checkout, &[]),
        strings(&["a.txt", "old", "old/b.txt"])
    );
    assert_eq!(
        fs::read_to_string(fixture.checkout.join("a.txt")).unwrap(),
        "old"
    );
}

#[test]
fn test_unique_directory_staging_adds_one_call_per_directory() {
    let fixture = Fixture::new(&[("x/y/z.txt", "z"), ("w/v.txt", "v")]);
    let provider = ScriptedProvider::new();
    let config = PublishConfig {
        add_unique_directory: true,
        ..fixture.config()
    };

    run(&config, &provider).unwrap();

    let directory_adds: Vec<Vec<String>> = provider
        .calls()
        .into_iter()
        .filter_map(|call| match call {
            ProviderCall::Add { paths, message, .. } if message == "Adding directory" => {
                Some(paths)
            }
            _ => None,
        })
        .collect();
    assert_eq!(
        directory_adds,
        vec![strings(&["w"]), strings(&["x"]), strings(&["x/y"])]
    );
}

#[test]
fn test_skip_deleted_files_issues_no_remove() {
    let fixture = Fixture::new(&[("index.html", "i")]);
    let provider = ScriptedProvider::new().with_remote_files(&[("obsolete.html", "o")]);
    let config = PublishConfig {
        skip_deleted_files: true,
        ..fixture.config()
    };

    let report = run(&config, &provider).unwrap();

    assert_eq!(report.changes.deleted.len(), 1);
    assert!(
        !provider
            .calls()
            .iter()
            .any(|c| matches!(c, ProviderCall::Remove { .. }))
    );
}

#[test]
fn test_skip_checkin_stages_without_commit() {
    let fixture = Fixture::new(&[("index.html", "i")]);
    let provider = ScriptedProvider::new();
    let config = PublishConfig {
        skip_checkin: true,
        ..fixture.config()
    };

    let report = run(&config, &provider).unwrap();

    assert!(report.check_in.is_none());
    let calls = provider.calls();
    assert!(calls.iter().any(|c| matches!(c, ProviderCall::Add { .. })));
    assert!(!calls.iter().any(|c| matches!(c, ProviderCall::Commit { .. })));
}

#[test]
fn test_skip_deployment_touches_nothing() {
    let fixture = Fixture::new(&[("index.html", "i")]);
    let provider = ScriptedProvider::new();
    let config = PublishConfig {
        skip_deployment: true,
        ..fixture.config()
    };

    let mut orchestrator = PublishOrchestrator::new(&config, &provider);
    let outcome = orchestrator.run().unwrap();

    assert_eq!(outcome, PublishOutcome::Skipped);
    assert!(provider.calls().is_empty());
    assert!(!fixture.checkout.exists());
}

#[test]
fn test_escaping_sub_directory_fails_before_backend() {
    let fixture = Fixture::new(&[("index.html", "i")]);
    let provider = ScriptedProvider::new();
    let config = PublishConfig {
        sub_directory: Some("../../etc".into()),
        ..fixture.config()
    };

    let err = run(&config, &provider).unwrap_err();

    assert_eq!(err.kind(), ErrorKind::Configuration);
    assert!(provider.calls().is_empty());
}

#[test]
fn test_missing_content_fails_before_backend() {
    let fixture = Fixture::new(&[]);
    let provider = ScriptedProvider::new();
    let config = PublishConfig {
        content: fixture.content.join("absent"),
        ..fixture.config()
    };

    let err = run(&config, &provider).unwrap_err();

    assert_eq!(err.kind(), ErrorKind::Configuration);
    assert!(err.to_string().contains("content directory does not exist"));
    assert!(provider.calls().is_empty());
}

#[test]
fn test_wide_encoding_is_rejected_before_backend() {
    let fixture = Fixture::new(&[("index.html", "i")]);
    let provider = ScriptedProvider::new();
    let config = PublishConfig {
        output_encoding: Some("UTF-16".into()),
        ..fixture.config()
    };

    let err = run(&config, &provider).unwrap_err();

    assert_eq!(err.kind(), ErrorKind::Configuration);
    assert!(provider.calls().is_empty());
}

#[test]
fn test_sub_directory_paths_are_relative_to_working_copy() {
    let fixture = Fixture::new(&[("index.html", "i")]);
    let provider =
        ScriptedProvider::new().with_remote_files(&[("docs/1.0/old.html", "o"), ("keep.txt", "k")]);
    let config = PublishConfig {
        sub_directory: Some("docs/1.0".into()),
        ..fixture.config()
    };

    let report = run(&config, &provider).unwrap();

    assert_eq!(report.changes.added[0].as_str(), "docs/1.0/index.html");
    assert_eq!(report.changes.deleted[0].as_str(), "docs/1.0/old.html");
    assert!(fixture.checkout.join("keep.txt").exists());
    assert!(fixture.checkout.join("docs/1.0/index.html").exists());
}

#[test]
fn test_try_update_updates_existing_working_copy() {
    let fixture = Fixture::new(&[("index.html", "i")]);
    write_tree(&fixture.checkout, &[("index.html", "previous")]);
    let provider = ScriptedProvider::new();
    let config = PublishConfig {
        try_update: true,
        scm_branch: Some("gh-pages".into()),
        ..fixture.config()
    };

    run(&config, &provider).unwrap();

    assert_eq!(provider.checkout_count(), 0);
    assert!(provider.calls().contains(&ProviderCall::Update {
        working_dir: fixture.checkout.clone(),
        branch: Some("gh-pages".into()),
    }));
}

#[test]
fn test_try_update_without_working_copy_forces_checkout() {
    let fixture = Fixture::new(&[("index.html", "i")]);
    let provider = ScriptedProvider::new();
    let config = PublishConfig {
        try_update: true,
        ..fixture.config()
    };

    run(&config, &provider).unwrap();

    assert_eq!(provider.checkout_count(), 1);
    assert!(
        !provider
            .calls()
            .iter()
            .any(|c| matches!(c, ProviderCall::Update { .. }))
    );
}

#[test]
fn test_update_failure_is_fatal_and_not_retried() {
    let fixture = Fixture::new(&[("index.html", "i")]);
    fs::create_dir_all(&fixture.checkout).unwrap();
    let provider = ScriptedProvider::new().failing("update");
    let config = PublishConfig {
        try_update: true,
        ..fixture.config()
    };

    let err = run(&config, &provider).unwrap_err();

    assert_eq!(err.kind(), ErrorKind::Backend);
    assert_eq!(provider.calls().len(), 2);
}

#[test]
fn test_previous_working_copy_is_replaced_without_try_update() {
    let fixture = Fixture::new(&[("index.html", "i")]);
    write_tree(&fixture.checkout, &[("leftover.txt", "l")]);
    let provider = ScriptedProvider::new();

    run(&fixture.config(), &provider).unwrap();

    assert!(!fixture.checkout.join("leftover.txt").exists());
}

#[test]
fn test_missing_remote_is_created_when_enabled() {
    let fixture = Fixture::new(&[("index.html", "i")]);
    let provider = ScriptedProvider::new().with_remote_exists(false);

    run(&fixture.config(), &provider).unwrap();

    let calls = provider.calls();
    assert_eq!(calls[0], ProviderCall::RemoteExists);
    assert_eq!(
        calls[1],
        ProviderCall::CreateRemotePath {
            message: "Automatic remote path creation: scm:scripted:memory".into(),
        }
    );
    assert!(matches!(calls[2], ProviderCall::Checkout { .. }));
}

#[test]
fn test_missing_remote_without_creation_proceeds_to_checkout() {
    let fixture = Fixture::new(&[("index.html", "i")]);
    let provider = ScriptedProvider::new().with_remote_exists(false);
    let config = PublishConfig {
        automatic_remote_path_creation: false,
        ..fixture.config()
    };

    run(&config, &provider).unwrap();

    let calls = provider.calls();
    assert!(
        !calls
            .iter()
            .any(|c| matches!(c, ProviderCall::CreateRemotePath { .. }))
    );
    assert_eq!(provider.checkout_count(), 1);
}

#[test]
fn test_failed_add_aborts_before_commit() {
    let fixture = Fixture::new(&[("index.html", "i")]);
    let provider = ScriptedProvider::new().failing("add");

    let err = run(&fixture.config(), &provider).unwrap_err();

    assert_eq!(
        err.to_string(),
        "Failed to add new files to SCM: add refused scripted add failure"
    );
    assert!(
        !provider
            .calls()
            .iter()
            .any(|c| matches!(c, ProviderCall::Commit { .. }))
    );
}

#[test]
fn test_failed_commit_is_fatal() {
    let fixture = Fixture::new(&[("index.html", "i")]);
    let provider = ScriptedProvider::new().failing("commit");

    let err = run(&fixture.config(), &provider).unwrap_err();

    assert!(err.to_string().starts_with("Failed to check-in files to SCM"));
}

#[test]
fn test_metadata_entry_survives_reconciliation() {
    let fixture = Fixture::new(&[("index.html", "i")]);
    let provider = ScriptedProvider::new().with_metadata_entry(".scm");

    let report = run(&fixture.config(), &provider).unwrap();

    assert!(report.changes.deleted.is_empty());
    assert!(fixture.checkout.join(".scm/state").exists());
}

#[test]
fn test_placeholder_checkout_directory_is_temporary() {
    let fixture = Fixture::new(&[("index.html", "i")]);
    let provider = ScriptedProvider::new();
    let config = PublishConfig {
        checkout_directory: "${project.build.directory}/scmpublish".into(),
        ..fixture.config()
    };

    run(&config, &provider).unwrap();

    let working_dir = provider
        .calls()
        .into_iter()
        .find_map(|c| match c {
            ProviderCall::Checkout { working_dir, .. } => Some(working_dir),
            _ => None,
        })
        .unwrap();
    assert!(!working_dir.exists());
    assert!(!Path::new("${project.build.directory}").exists());
}

#[test]
fn test_placeholder_checkout_directory_removed_on_failure() {
    let fixture = Fixture::new(&[("index.html", "i")]);
    let provider = ScriptedProvider::new().failing("add");
    let config = PublishConfig {
        checkout_directory: "${site.checkout}".into(),
        ..fixture.config()
    };

    assert!(run(&config, &provider).is_err());

    let working_dir = provider
        .calls()
        .into_iter()
        .find_map(|c| match c {
            ProviderCall::Checkout { working_dir, .. } => Some(working_dir),
            _ => None,
        })
        .unwrap();
    assert!(!working_dir.exists());
}
