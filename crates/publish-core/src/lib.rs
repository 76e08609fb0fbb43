//! Tree reconciliation and publish orchestration for scm-publish
//!
//! This crate implements the engine that mirrors a generated content tree
//! into a version-controlled working copy:
//!
//! - **Reconciliation**: lock-step walk of working copy and content, producing
//!   a [`ChangeSet`] of additions, updates and deletions
//! - **Path policy**: deletion-ignore patterns and protected top-level names
//! - **Materialization**: link-preserving, newline-normalizing copies
//! - **Orchestration**: checkout/update, staging and commit through an
//!   [`publish_scm::ScmProvider`], with checkout retry and dry-run
//!
//! # Architecture
//!
//! ```text
//!                 publish-cli
//!                      |
//!                 publish-core
//!                      |
//!            +---------+---------+
//!            |                   |
//!       publish-fs          publish-scm
//! ```

pub mod config;
pub mod error;
pub mod materialize;
pub mod normalize;
pub mod policy;
pub mod publish;
pub mod reconcile;
pub mod workdir;

pub use config::{PublishConfig, Secret, Server, Settings};
pub use error::{Error, ErrorKind, Result};
pub use materialize::EntryMaterializer;
pub use normalize::NormalizationPolicy;
pub use policy::{DeletionPattern, PathPolicy, ProtectedSet};
pub use publish::{
    CheckIn, PublishOrchestrator, PublishOutcome, PublishReport, PublishState, RetryPolicy,
    Sleeper, StagingPlan, ThreadSleeper, format_elapsed,
};
pub use reconcile::{
    ChangeSet, ContentComparator, ContentStats, CopyKind, Reconciliation, ScheduledCopy,
};
pub use workdir::WorkingCopy;
