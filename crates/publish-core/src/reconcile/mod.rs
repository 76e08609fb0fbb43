//! Reconciliation of a content tree against a working copy
//!
//! Comparison is pure: it classifies entries and schedules the copies that
//! would make the working copy match, without touching either tree. Applying
//! the schedule is the materializer's job, so a dry run never writes.

mod compare;

use std::path::PathBuf;

use publish_fs::RelativePath;
use serde::Serialize;

pub use compare::ContentComparator;

/// Aggregate counters of the published content.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize)]
pub struct ContentStats {
    pub directories: u64,
    pub files: u64,
    pub total_bytes: u64,
}

/// Classified entries of one reconciliation pass.
///
/// Every path is relative to the working-copy root. The three lists are
/// pairwise disjoint and keep traversal order.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct ChangeSet {
    pub added: Vec<RelativePath>,
    pub updated: Vec<RelativePath>,
    /// Children precede their directory.
    pub deleted: Vec<RelativePath>,
    pub stats: ContentStats,
}

impl ChangeSet {
    pub fn is_empty(&self) -> bool {
        self.added.is_empty() && self.updated.is_empty() && self.deleted.is_empty()
    }
}

/// What a scheduled copy creates.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum CopyKind {
    Directory,
    Symlink,
    File,
}

/// One entry to create or overwrite in the working copy.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ScheduledCopy {
    pub source: PathBuf,
    pub destination: PathBuf,
    pub kind: CopyKind,
}

/// Result of a comparison: the change set and the copies realizing it.
///
/// Directory copies precede the entries inside them.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Reconciliation {
    pub changes: ChangeSet,
    pub copies: Vec<ScheduledCopy>,
}

impl Reconciliation {
    /// Counters computed from the source side without copying.
    ///
    /// Sizes are those of the source files, before any normalization.
    pub fn source_stats(&self) -> publish_fs::Result<ContentStats> {
        let mut stats = ContentStats::default();
        for copy in &self.copies {
            match copy.kind {
                CopyKind::Directory => stats.directories += 1,
                CopyKind::File => {
                    stats.total_bytes += publish_fs::io::file_size(&copy.source)?;
                    stats.files += 1;
                }
                CopyKind::Symlink => {}
            }
        }
        Ok(stats)
    }
}
