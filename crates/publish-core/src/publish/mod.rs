//! Publish orchestration
//!
//! - [`orchestrator`] - the state machine driving a run
//! - [`staging`] - how a change set becomes backend add/remove calls
//! - [`retry`] - bounded checkout retry with an injectable sleeper

mod orchestrator;
mod retry;
mod staging;

pub use orchestrator::{
    CheckIn, PublishOrchestrator, PublishOutcome, PublishReport, PublishState, format_elapsed,
};
pub use retry::{RetryPolicy, Sleeper, ThreadSleeper};
pub use staging::StagingPlan;
