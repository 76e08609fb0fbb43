//! GitProvider against real bare remotes on the local filesystem

use std::fs;
use std::path::{Path, PathBuf};

use publish_fs::RelativePath;
use publish_scm::{AddOptions, Credentials, GitProvider, ScmProvider, ScmRepository, ScmUrl};
use publish_test_utils::git::{GitRemote, configure_identity};
use publish_test_utils::tree::write_tree;
use tempfile::TempDir;

fn repository(remote: &GitRemote) -> ScmRepository {
    ScmRepository::new(
        ScmUrl::parse(&remote.scm_url()).unwrap(),
        Credentials::default(),
    )
}

fn checkout(remote: &GitRemote, temp: &TempDir, name: &str) -> PathBuf {
    let working_copy = temp.path().join(name);
    let result = GitProvider::new()
        .checkout(&repository(remote), &working_copy, Some("main"))
        .unwrap();
    assert!(result.is_success(), "{:?}", result);
    configure_identity(&working_copy);
    working_copy
}

fn paths(list: &[&str]) -> Vec<RelativePath> {
    list.iter().map(|p| RelativePath::new(p).unwrap()).collect()
}

fn commit(working_copy: &Path, remote: &GitRemote) -> publish_scm::CheckInResult {
    GitProvider::new()
        .commit(&repository(remote), working_copy, Some("main"), "Site checkin")
        .unwrap()
}

#[test]
fn test_checkout_clones_remote_content() {
    let remote = GitRemote::with_files(&[("index.html", "<h1>v1</h1>")]);
    let temp = TempDir::new().unwrap();

    let working_copy = checkout(&remote, &temp, "wc");

    assert_eq!(
        fs::read_to_string(working_copy.join("index.html")).unwrap(),
        "<h1>v1</h1>"
    );
    assert!(working_copy.join(".git").is_dir());
}

#[test]
fn test_checkout_of_missing_remote_is_an_error() {
    let temp = TempDir::new().unwrap();
    let url = format!("scm:git:{}", temp.path().join("nowhere.git").display());
    let repository = ScmRepository::new(ScmUrl::parse(&url).unwrap(), Credentials::default());

    let result = GitProvider::new().checkout(&repository, &temp.path().join("wc"), None);
    assert!(result.is_err());
}

#[test]
fn test_add_and_commit_pushes_new_files() {
    let remote = GitRemote::with_files(&[("index.html", "home")]);
    let temp = TempDir::new().unwrap();
    let working_copy = checkout(&remote, &temp, "wc");
    write_tree(&working_copy, &[("css/site.css", "body {}")]);

    let provider = GitProvider::new();
    let added = provider
        .add(
            &repository(&remote),
            &working_copy,
            &paths(&["css"]),
            &AddOptions::new("Adding new site files.").forced(),
        )
        .unwrap();
    assert!(added.is_success(), "{:?}", added);

    let checked_in = commit(&working_copy, &remote);
    assert!(checked_in.result.is_success(), "{:?}", checked_in.result);
    assert!(checked_in.revision.is_some());
    assert_eq!(checked_in.checked_in_files, paths(&["css/site.css"]));

    assert_eq!(remote.files(), vec!["css/site.css", "index.html"]);
    assert_eq!(remote.commit_count(), 2);
    assert_eq!(remote.head_message(), "Site checkin");
}

#[test]
fn test_forced_add_bypasses_gitignore() {
    let remote = GitRemote::with_files(&[(".gitignore", "*.log\n")]);
    let temp = TempDir::new().unwrap();
    let working_copy = checkout(&remote, &temp, "wc");
    write_tree(&working_copy, &[("reports/build.log", "ok")]);

    let provider = GitProvider::new();
    provider
        .add(
            &repository(&remote),
            &working_copy,
            &paths(&["reports"]),
            &AddOptions::new("Adding new site files.").forced(),
        )
        .unwrap();
    commit(&working_copy, &remote);

    assert!(remote.files().contains(&"reports/build.log".to_string()));
}

#[test]
fn test_commit_picks_up_rewritten_tracked_files() {
    let remote = GitRemote::with_files(&[("index.html", "old")]);
    let temp = TempDir::new().unwrap();
    let working_copy = checkout(&remote, &temp, "wc");
    fs::write(working_copy.join("index.html"), "new").unwrap();

    let checked_in = commit(&working_copy, &remote);

    assert!(checked_in.result.is_success());
    assert_eq!(checked_in.checked_in_files, paths(&["index.html"]));
    assert_eq!(remote.file_content("index.html"), "new");
}

#[test]
fn test_remove_deletes_leaf_first() {
    let remote = GitRemote::with_files(&[("a.txt", "a"), ("old/b.txt", "b")]);
    let temp = TempDir::new().unwrap();
    let working_copy = checkout(&remote, &temp, "wc");

    let removed = GitProvider::new()
        .remove(
            &repository(&remote),
            &working_copy,
            &paths(&["old/b.txt", "old"]),
            "Deleting obsolete site files.",
        )
        .unwrap();
    assert!(removed.is_success(), "{:?}", removed);
    assert!(!working_copy.join("old").exists());

    commit(&working_copy, &remote);
    assert_eq!(remote.files(), vec!["a.txt"]);
}

#[cfg(unix)]
#[test]
fn test_remove_below_replacing_link_keeps_link_target() {
    let remote = GitRemote::with_files(&[("current/index.html", "old"), ("v2/index.html", "new")]);
    let temp = TempDir::new().unwrap();
    let working_copy = checkout(&remote, &temp, "wc");
    fs::remove_dir_all(working_copy.join("current")).unwrap();
    std::os::unix::fs::symlink("v2", working_copy.join("current")).unwrap();

    let removed = GitProvider::new()
        .remove(
            &repository(&remote),
            &working_copy,
            &paths(&["current/index.html"]),
            "Deleting obsolete site files.",
        )
        .unwrap();
    assert!(removed.is_success(), "{:?}", removed);
    assert_eq!(fs::read_to_string(working_copy.join("v2/index.html")).unwrap(), "new");

    // The link itself is untracked until added
    commit(&working_copy, &remote);
    assert_eq!(remote.files(), vec!["v2/index.html"]);
}

#[test]
fn test_remove_below_replacing_file_succeeds() {
    let remote = GitRemote::with_files(&[("docs/a.html", "a"), ("index.html", "i")]);
    let temp = TempDir::new().unwrap();
    let working_copy = checkout(&remote, &temp, "wc");
    fs::remove_dir_all(working_copy.join("docs")).unwrap();
    fs::write(working_copy.join("docs"), "page").unwrap();

    let removed = GitProvider::new()
        .remove(
            &repository(&remote),
            &working_copy,
            &paths(&["docs/a.html"]),
            "Deleting obsolete site files.",
        )
        .unwrap();
    assert!(removed.is_success(), "{:?}", removed);
    assert_eq!(fs::read_to_string(working_copy.join("docs")).unwrap(), "page");
}

#[test]
fn test_commit_without_changes_reports_nothing() {
    let remote = GitRemote::with_files(&[("index.html", "same")]);
    let temp = TempDir::new().unwrap();
    let working_copy = checkout(&remote, &temp, "wc");
    fs::write(working_copy.join("index.html"), "same").unwrap();

    let checked_in = commit(&working_copy, &remote);

    assert!(checked_in.result.is_success());
    assert!(checked_in.checked_in_files.is_empty());
    assert_eq!(remote.commit_count(), 1);
}

#[test]
fn test_update_fast_forwards_to_remote() {
    let remote = GitRemote::with_files(&[("index.html", "v1")]);
    let temp = TempDir::new().unwrap();
    let first = checkout(&remote, &temp, "first");
    let second = checkout(&remote, &temp, "second");

    fs::write(first.join("index.html"), "v2").unwrap();
    commit(&first, &remote);

    let updated = GitProvider::new()
        .update(&repository(&remote), &second, None)
        .unwrap();

    assert!(updated.is_success(), "{:?}", updated);
    assert_eq!(fs::read_to_string(second.join("index.html")).unwrap(), "v2");
}

#[test]
fn test_update_outside_working_copy_is_a_failure_result() {
    let remote = GitRemote::with_files(&[]);
    let temp = TempDir::new().unwrap();

    let updated = GitProvider::new()
        .update(&repository(&remote), temp.path(), Some("main"))
        .unwrap();

    assert!(!updated.is_success());
    assert_eq!(updated.provider_message, "git update failed");
    assert!(!updated.command_output.is_empty());
}
