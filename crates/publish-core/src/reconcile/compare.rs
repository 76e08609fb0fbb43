//! Lock-step walk of working copy and content

use std::collections::BTreeSet;
use std::path::Path;

use publish_fs::RelativePath;
use publish_fs::io::{self, EntryType};

use super::{CopyKind, Reconciliation, ScheduledCopy};
use crate::Result;
use crate::policy::PathPolicy;

/// Compares a destination directory against a source directory.
///
/// Links are never followed: a link is a leaf on both sides. Entries are
/// visited in name order, so results are deterministic.
#[derive(Debug, Clone)]
pub struct ContentComparator<'a> {
    policy: &'a PathPolicy,
    metadata_entry: Option<&'a str>,
    base: RelativePath,
}

impl<'a> ContentComparator<'a> {
    /// `metadata_entry` is the backend's private entry name; it is never
    /// listed, at any depth.
    pub fn new(policy: &'a PathPolicy, metadata_entry: Option<&'a str>) -> Self {
        Self {
            policy,
            metadata_entry,
            base: RelativePath::root(),
        }
    }

    /// Prefix every reported path with `base`, the location of the compared
    /// destination inside the working copy.
    ///
    /// Policy patterns still see paths relative to the compared directory.
    pub fn with_base(mut self, base: RelativePath) -> Self {
        self.base = base;
        self
    }

    /// Compare `destination` against `source`.
    ///
    /// A missing `source` stands for a removed tree: everything under
    /// `destination` becomes a deletion candidate. A missing `destination`
    /// lists as empty.
    pub fn compare(&self, destination: &Path, source: Option<&Path>) -> Result<Reconciliation> {
        let mut out = Reconciliation::default();
        self.walk(destination, source, &RelativePath::root(), &mut out)?;
        Ok(out)
    }

    fn walk(
        &self,
        destination: &Path,
        source: Option<&Path>,
        local: &RelativePath,
        out: &mut Reconciliation,
    ) -> Result<()> {
        let top_level = local.is_root();
        let dest_names = if top_level || is_directory(destination)? {
            self.list(destination)?
        } else {
            BTreeSet::new()
        };
        let src_names = match source {
            Some(dir) => self.list(dir)?,
            None => BTreeSet::new(),
        };

        for name in dest_names.difference(&src_names) {
            let local_path = local.join(name);
            let dest_path = destination.join(name);
            let is_dir = is_directory(&dest_path)?;

            if self.policy.is_deletion_ignored(&local_path) {
                tracing::debug!(path = %local_path, "Matches an ignore pattern: not deleted");
                continue;
            }
            if top_level && is_dir && self.policy.is_protected(&local_path) {
                tracing::debug!(path = %local_path, "Protected directory: not deleted");
                continue;
            }

            if is_dir {
                self.delete_tree(&dest_path, &local_path, out)?;
            } else {
                tracing::debug!(path = %local_path, "File marked for deletion");
                out.changes.deleted.push(self.anchored(&local_path));
            }
        }

        let Some(source) = source else {
            return Ok(());
        };

        for name in &src_names {
            let local_path = local.join(name);
            let src_path = source.join(name);
            let dest_path = destination.join(name);
            let dest_kind = if dest_names.contains(name) {
                io::entry_type(&dest_path)?
            } else {
                None
            };

            match io::entry_type(&src_path)? {
                Some(EntryType::Symlink) => {
                    match dest_kind {
                        None => out.changes.added.push(self.anchored(&local_path)),
                        Some(EntryType::Directory) => {
                            self.replace_tree(&dest_path, &local_path, out)?;
                            out.changes.added.push(self.anchored(&local_path));
                        }
                        Some(_) => {}
                    }
                    schedule(out, &src_path, &dest_path, CopyKind::Symlink);
                }
                Some(EntryType::Directory) => {
                    if dest_kind != Some(EntryType::Directory) {
                        out.changes.added.push(self.anchored(&local_path));
                    }
                    schedule(out, &src_path, &dest_path, CopyKind::Directory);
                    self.walk(&dest_path, Some(&src_path), &local_path, out)?;
                }
                Some(EntryType::File) => {
                    match dest_kind {
                        None => out.changes.added.push(self.anchored(&local_path)),
                        Some(EntryType::Directory) => {
                            self.replace_tree(&dest_path, &local_path, out)?;
                            out.changes.added.push(self.anchored(&local_path));
                        }
                        Some(_) => out.changes.updated.push(self.anchored(&local_path)),
                    }
                    schedule(out, &src_path, &dest_path, CopyKind::File);
                }
                // Vanished between listing and inspection
                None => {}
            }
        }

        Ok(())
    }

    /// Enumerate a destination directory absent from the source, leaf first.
    ///
    /// Returns whether the directory itself was marked: a directory keeping
    /// an ignored descendant survives.
    fn delete_tree(
        &self,
        destination: &Path,
        local: &RelativePath,
        out: &mut Reconciliation,
    ) -> Result<bool> {
        let complete = self.delete_children(destination, local, out)?;
        if complete {
            tracing::debug!(path = %local, "Directory marked for deletion");
            out.changes.deleted.push(self.anchored(local));
        } else {
            tracing::debug!(path = %local, "Directory keeps ignored entries: not deleted");
        }
        Ok(complete)
    }

    /// A destination directory whose source counterpart is a file or a link.
    ///
    /// Its contents are deletions; the name itself is re-added by the caller.
    fn replace_tree(
        &self,
        destination: &Path,
        local: &RelativePath,
        out: &mut Reconciliation,
    ) -> Result<()> {
        tracing::debug!(path = %local, "Directory replaced by a non-directory");
        if !self.delete_children(destination, local, out)? {
            tracing::warn!(
                path = %local,
                "Directory holding ignored entries is replaced: they are removed with it"
            );
        }
        Ok(())
    }

    /// Mark everything beneath `destination` for deletion, leaf first.
    ///
    /// Returns false when an ignored descendant was kept.
    fn delete_children(
        &self,
        destination: &Path,
        local: &RelativePath,
        out: &mut Reconciliation,
    ) -> Result<bool> {
        let mut complete = true;
        for name in self.list(destination)? {
            let local_path = local.join(&name);
            let dest_path = destination.join(&name);

            if self.policy.is_deletion_ignored(&local_path) {
                tracing::debug!(path = %local_path, "Matches an ignore pattern: not deleted");
                complete = false;
                continue;
            }

            if is_directory(&dest_path)? {
                complete &= self.delete_tree(&dest_path, &local_path, out)?;
            } else {
                tracing::debug!(path = %local_path, "File marked for deletion");
                out.changes.deleted.push(self.anchored(&local_path));
            }
        }
        Ok(complete)
    }

    fn list(&self, dir: &Path) -> Result<BTreeSet<String>> {
        let mut names = io::list_names(dir)?;
        if let Some(metadata) = self.metadata_entry {
            names.remove(metadata);
        }
        Ok(names)
    }

    fn anchored(&self, local: &RelativePath) -> RelativePath {
        if self.base.is_root() {
            local.clone()
        } else {
            self.base.join(local.as_str())
        }
    }
}

fn is_directory(path: &Path) -> Result<bool> {
    Ok(matches!(io::entry_type(path)?, Some(EntryType::Directory)))
}

fn schedule(out: &mut Reconciliation, source: &Path, destination: &Path, kind: CopyKind) {
    out.copies.push(ScheduledCopy {
        source: source.to_path_buf(),
        destination: destination.to_path_buf(),
        kind,
    });
}
