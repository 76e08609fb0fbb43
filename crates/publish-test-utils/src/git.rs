//! Bare git remotes for end-to-end publishing tests.
//!
//! Everything goes through `git2` with an explicit signature, so no git
//! binary or user configuration is needed.

use std::fs;
use std::path::Path;

use git2::{Repository, RepositoryInitOptions, Signature};
use tempfile::TempDir;

/// A bare remote with one commit on `main` holding `files`.
pub struct GitRemote {
    _dir: TempDir,
    bare: std::path::PathBuf,
}

impl GitRemote {
    /// Create the remote.
    ///
    /// # Panics
    /// Panics if any git or filesystem operation fails.
    pub fn with_files(files: &[(&str, &str)]) -> Self {
        let dir = TempDir::new().unwrap_or_else(|e| panic!("GitRemote: tempdir: {e}"));
        let bare = dir.path().join("remote.git");
        let seed = dir.path().join("seed");

        let mut bare_opts = RepositoryInitOptions::new();
        bare_opts.bare(true).initial_head("main");
        Repository::init_opts(&bare, &bare_opts)
            .unwrap_or_else(|e| panic!("GitRemote: init bare: {e}"));

        let mut seed_opts = RepositoryInitOptions::new();
        seed_opts.initial_head("main");
        let repo = Repository::init_opts(&seed, &seed_opts)
            .unwrap_or_else(|e| panic!("GitRemote: init seed: {e}"));
        crate::tree::write_tree(&seed, files);

        let mut index = repo.index().unwrap_or_else(|e| panic!("GitRemote: index: {e}"));
        index
            .add_all(["*"], git2::IndexAddOption::DEFAULT, None)
            .unwrap_or_else(|e| panic!("GitRemote: add: {e}"));
        index.write().unwrap_or_else(|e| panic!("GitRemote: write index: {e}"));
        let tree_id = index
            .write_tree()
            .unwrap_or_else(|e| panic!("GitRemote: write tree: {e}"));
        let tree = repo
            .find_tree(tree_id)
            .unwrap_or_else(|e| panic!("GitRemote: find tree: {e}"));
        let sig = test_signature();
        repo.commit(Some("HEAD"), &sig, &sig, "Initial site", &tree, &[])
            .unwrap_or_else(|e| panic!("GitRemote: commit: {e}"));

        let bare_url = bare.to_string_lossy().into_owned();
        let mut remote = repo
            .remote("origin", &bare_url)
            .unwrap_or_else(|e| panic!("GitRemote: add remote: {e}"));
        remote
            .push(&["refs/heads/main:refs/heads/main"], None)
            .unwrap_or_else(|e| panic!("GitRemote: push: {e}"));

        Self { _dir: dir, bare }
    }

    /// Path of the bare repository.
    pub fn path(&self) -> &Path {
        &self.bare
    }

    /// `scm:git:` locator of the remote.
    pub fn scm_url(&self) -> String {
        format!("scm:git:{}", self.bare.display())
    }

    /// Number of commits reachable from `main`.
    pub fn commit_count(&self) -> usize {
        let repo = self.open();
        let mut walk = repo.revwalk().unwrap_or_else(|e| panic!("revwalk: {e}"));
        walk.push_ref("refs/heads/main")
            .unwrap_or_else(|e| panic!("push_ref: {e}"));
        walk.count()
    }

    /// Message of the commit at the tip of `main`.
    pub fn head_message(&self) -> String {
        let repo = self.open();
        let commit = repo
            .find_reference("refs/heads/main")
            .and_then(|r| r.peel_to_commit())
            .unwrap_or_else(|e| panic!("head commit: {e}"));
        commit.message().unwrap_or_default().to_string()
    }

    /// Sorted file paths in the tree at the tip of `main`.
    pub fn files(&self) -> Vec<String> {
        let repo = self.open();
        let tree = repo
            .find_reference("refs/heads/main")
            .and_then(|r| r.peel_to_tree())
            .unwrap_or_else(|e| panic!("head tree: {e}"));
        let mut files = Vec::new();
        tree.walk(git2::TreeWalkMode::PreOrder, |root, entry| {
            if entry.kind() == Some(git2::ObjectType::Blob) {
                files.push(format!("{}{}", root, entry.name().unwrap_or_default()));
            }
            git2::TreeWalkResult::Ok
        })
        .unwrap_or_else(|e| panic!("tree walk: {e}"));
        files.sort();
        files
    }

    /// Content of `path` at the tip of `main`.
    pub fn file_content(&self, path: &str) -> String {
        let repo = self.open();
        let tree = repo
            .find_reference("refs/heads/main")
            .and_then(|r| r.peel_to_tree())
            .unwrap_or_else(|e| panic!("head tree: {e}"));
        let entry = tree
            .get_path(Path::new(path))
            .unwrap_or_else(|e| panic!("no {path} in remote: {e}"));
        let blob = repo
            .find_blob(entry.id())
            .unwrap_or_else(|e| panic!("blob {path}: {e}"));
        String::from_utf8_lossy(blob.content()).into_owned()
    }

    fn open(&self) -> Repository {
        Repository::open_bare(&self.bare).unwrap_or_else(|e| panic!("open bare: {e}"))
    }
}

/// Give a working copy a committer identity.
///
/// # Panics
/// Panics if the repository config cannot be written.
pub fn configure_identity(working_copy: &Path) {
    let repo = Repository::open(working_copy).unwrap_or_else(|e| panic!("open: {e}"));
    let mut config = repo.config().unwrap_or_else(|e| panic!("config: {e}"));
    config
        .set_str("user.name", "Test User")
        .unwrap_or_else(|e| panic!("user.name: {e}"));
    config
        .set_str("user.email", "test@example.com")
        .unwrap_or_else(|e| panic!("user.email: {e}"));
}

/// Whether `path` holds a git working copy.
pub fn is_working_copy(path: &Path) -> bool {
    fs::metadata(path.join(".git")).is_ok()
}

fn test_signature() -> Signature<'static> {
    Signature::now("Test User", "test@example.com")
        .unwrap_or_else(|e| panic!("signature: {e}"))
}
