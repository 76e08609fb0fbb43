//! Translation of a change set into backend staging calls

use std::collections::BTreeSet;

use publish_fs::RelativePath;

use crate::reconcile::ChangeSet;

/// Paths to stage, split the way backends accept them.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct StagingPlan {
    /// New directories, sorted; staged before the files.
    pub directories: Vec<RelativePath>,
    /// Added entries that are not among `directories`.
    pub files: Vec<RelativePath>,
    /// Deleted entries, children before their directory.
    pub deletions: Vec<RelativePath>,
}

impl StagingPlan {
    pub fn from_changes(changes: &ChangeSet) -> Self {
        let mut seen: BTreeSet<RelativePath> = BTreeSet::new();
        let mut directories: BTreeSet<RelativePath> = BTreeSet::new();

        // Walk up from each addition, stopping at the first known ancestor
        for path in &changes.added {
            let mut ancestor = path.parent();
            while let Some(dir) = ancestor {
                if dir.is_root() || !seen.insert(dir.clone()) {
                    break;
                }
                ancestor = dir.parent();
                directories.insert(dir);
            }
        }

        let files = changes
            .added
            .iter()
            .filter(|p| !directories.contains(*p))
            .cloned()
            .collect();

        Self {
            directories: directories.into_iter().collect(),
            files,
            deletions: changes.deleted.clone(),
        }
    }

    pub fn is_empty(&self) -> bool {
        self.directories.is_empty() && self.files.is_empty() && self.deletions.is_empty()
    }
}
