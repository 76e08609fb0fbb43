//! Shared git2 plumbing for the git backend

use std::path::Path;

use git2::{
    Commit, Cred, CredentialType, ErrorCode, FetchOptions, PushOptions, RemoteCallbacks,
    Repository, Signature,
};
use publish_fs::RelativePath;

use crate::{Credentials, Error, Result};

/// Authentication attempts before giving up on a remote.
const MAX_AUTH_ATTEMPTS: u32 = 3;

/// Build callbacks answering credential requests from `credentials`.
///
/// Plaintext credentials are offered when both parts are known, the ssh
/// agent for ssh remotes, and the configured credential helper otherwise.
pub fn remote_callbacks(credentials: &Credentials) -> RemoteCallbacks<'_> {
    let mut callbacks = RemoteCallbacks::new();
    let mut attempts = 0;
    callbacks.credentials(move |url, username_from_url, allowed| {
        attempts += 1;
        if attempts > MAX_AUTH_ATTEMPTS {
            return Err(git2::Error::from_str("authentication failed"));
        }

        if allowed.contains(CredentialType::USER_PASS_PLAINTEXT)
            && let (Some(username), Some(password)) = (&credentials.username, &credentials.password)
        {
            return Cred::userpass_plaintext(username, password);
        }

        if allowed.contains(CredentialType::SSH_KEY) {
            let user = credentials
                .username
                .as_deref()
                .or(username_from_url)
                .unwrap_or("git");
            return Cred::ssh_key_from_agent(user);
        }

        let config = git2::Config::open_default()?;
        Cred::credential_helper(&config, url, username_from_url)
    });
    callbacks
}

pub fn fetch_options(credentials: &Credentials) -> FetchOptions<'_> {
    let mut options = FetchOptions::new();
    options.remote_callbacks(remote_callbacks(credentials));
    options
}

/// Name of the branch HEAD points at, born or not.
pub fn current_branch(repo: &Repository) -> Result<String> {
    let head = repo.find_reference("HEAD")?;
    match head.symbolic_target() {
        Some(target) => Ok(target.strip_prefix("refs/heads/").unwrap_or(target).to_string()),
        None => Err(Error::DetachedHead {
            path: repo.path().to_path_buf(),
        }),
    }
}

/// Commit HEAD points at; `None` on an unborn branch.
pub fn head_commit(repo: &Repository) -> Result<Option<Commit<'_>>> {
    match repo.head() {
        Ok(head) => Ok(Some(head.peel_to_commit()?)),
        Err(e) if matches!(e.code(), ErrorCode::UnbornBranch | ErrorCode::NotFound) => Ok(None),
        Err(e) => Err(e.into()),
    }
}

/// Fetch `branch` from `origin` and fast-forward the working copy onto it.
///
/// Returns a description of what happened, or an error message when the
/// local branch has diverged.
pub fn fetch_fast_forward(
    repo: &Repository,
    branch: &str,
    credentials: &Credentials,
) -> Result<std::result::Result<String, String>> {
    let mut remote = repo.find_remote("origin")?;
    remote.fetch(&[branch], Some(&mut fetch_options(credentials)), None)?;

    let fetch_head = repo.find_reference("FETCH_HEAD")?;
    let fetch_commit = fetch_head.peel_to_commit()?;
    let annotated = repo.find_annotated_commit(fetch_commit.id())?;
    let (analysis, _) = repo.merge_analysis(&[&annotated])?;

    if analysis.is_up_to_date() {
        return Ok(Ok(format!("{} is up to date", branch)));
    }

    if analysis.is_fast_forward() || analysis.is_unborn() {
        let refname = format!("refs/heads/{}", branch);
        repo.reference(
            &refname,
            fetch_commit.id(),
            true,
            &format!("update: fast-forward to {}", fetch_commit.id()),
        )?;
        repo.set_head(&refname)?;
        repo.checkout_head(Some(git2::build::CheckoutBuilder::default().force()))?;
        return Ok(Ok(format!(
            "Fast-forwarded {} to {}",
            branch,
            fetch_commit.id()
        )));
    }

    let local = head_commit(repo)?
        .map(|c| c.id().to_string())
        .unwrap_or_default();
    Ok(Err(format!(
        "Cannot fast-forward {} from {} to {}. Manual merge required.",
        branch,
        local,
        fetch_commit.id()
    )))
}

/// Push `branch` to `origin`, failing when the remote rejects the ref.
pub fn push(repo: &Repository, branch: &str, credentials: &Credentials) -> Result<()> {
    let mut remote = repo.find_remote("origin")?;
    let refspec = format!("refs/heads/{}:refs/heads/{}", branch, branch);

    let mut callbacks = remote_callbacks(credentials);
    callbacks.push_update_reference(|refname, status| match status {
        Some(message) => Err(git2::Error::from_str(&format!(
            "{} rejected: {}",
            refname, message
        ))),
        None => Ok(()),
    });

    let mut options = PushOptions::new();
    options.remote_callbacks(callbacks);
    remote.push(&[&refspec], Some(&mut options))?;
    Ok(())
}

/// Committer identity, falling back to a fixed one when git config has none.
pub fn signature(repo: &Repository) -> Result<Signature<'static>> {
    match repo.signature() {
        Ok(signature) => Ok(signature),
        Err(_) => Ok(Signature::now("scm-publish", "scm-publish@localhost")?),
    }
}

/// Paths that differ between `parent` and `tree`.
pub fn changed_paths(
    repo: &Repository,
    parent: Option<&Commit<'_>>,
    tree: &git2::Tree<'_>,
) -> Result<Vec<RelativePath>> {
    let parent_tree = parent.map(|c| c.tree()).transpose()?;
    let diff = repo.diff_tree_to_tree(parent_tree.as_ref(), Some(tree), None)?;

    let mut paths = Vec::new();
    for delta in diff.deltas() {
        let path = delta.new_file().path().or_else(|| delta.old_file().path());
        if let Some(path) = path {
            paths.push(RelativePath::new(path.to_string_lossy())?);
        }
    }
    Ok(paths)
}

/// Whether `path` is a real directory (links are not followed).
pub fn is_directory(path: &Path) -> Result<bool> {
    Ok(matches!(
        publish_fs::io::entry_type(path)?,
        Some(publish_fs::io::EntryType::Directory)
    ))
}
