//! Shared test utilities for the scm-publish workspace.
//!
//! A dev-dependency only, never published.
//!
//! # Modules
//!
//! - [`tree`] - build and list content trees on disk
//! - [`git`] - bare git remotes with history, for end-to-end publishing
//! - [`provider`] - [`ScriptedProvider`], an in-memory backend that records calls

pub mod git;
pub mod provider;
pub mod tree;

pub use provider::{ProviderCall, ScriptedProvider};
