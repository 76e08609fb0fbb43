//! Applying scheduled copies to the working copy

use publish_fs::io;

use crate::Result;
use crate::normalize::NormalizationPolicy;
use crate::reconcile::{ContentStats, CopyKind, ScheduledCopy};

/// Applies scheduled copies, one entry at a time.
///
/// Any I/O failure aborts; there is no partial-apply recovery.
#[derive(Debug, Clone)]
pub struct EntryMaterializer<'a> {
    normalization: &'a NormalizationPolicy,
}

impl<'a> EntryMaterializer<'a> {
    pub fn new(normalization: &'a NormalizationPolicy) -> Self {
        Self { normalization }
    }

    /// Apply one copy, updating `stats`.
    ///
    /// Directories are created when absent. Links are copied as links. Files
    /// whose extension is normalized are rewritten with the configured line
    /// ending, others are copied byte for byte.
    pub fn apply(&self, copy: &ScheduledCopy, stats: &mut ContentStats) -> Result<()> {
        match copy.kind {
            CopyKind::Directory => {
                io::ensure_dir(&copy.destination)?;
                stats.directories += 1;
            }
            CopyKind::Symlink => io::copy_symlink(&copy.source, &copy.destination)?,
            CopyKind::File => {
                let size = if self.normalization.applies_to(&copy.source) {
                    io::copy_normalized(
                        &copy.source,
                        &copy.destination,
                        self.normalization.line_ending(),
                    )?
                } else {
                    io::copy_file(&copy.source, &copy.destination)?
                };
                stats.files += 1;
                stats.total_bytes += size;
            }
        }
        Ok(())
    }

    /// Apply every copy in order.
    pub fn apply_all(&self, copies: &[ScheduledCopy]) -> Result<ContentStats> {
        let mut stats = ContentStats::default();
        for copy in copies {
            self.apply(copy, &mut stats)?;
        }
        tracing::debug!(
            directories = stats.directories,
            files = stats.files,
            bytes = stats.total_bytes,
            "Materialized content"
        );
        Ok(stats)
    }
}
