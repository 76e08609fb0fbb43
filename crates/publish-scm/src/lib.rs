//! Version-control backends for scm-publish
//!
//! The publish engine talks to a repository only through [`ScmProvider`].
//! Repositories are addressed with `scm:<provider>:<address>` locators.

pub mod credentials;
pub mod error;
pub mod git;
pub mod provider;
pub mod url;

pub use credentials::{Credentials, ScmRepository};
pub use error::{Error, Result};
pub use git::GitProvider;
pub use provider::{AddOptions, CheckInResult, ScmProvider, ScmResult, provider_for};
pub use url::ScmUrl;
