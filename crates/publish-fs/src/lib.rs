//! Filesystem primitives for scm-publish
//!
//! Provides root-relative path handling, content-preserving copy operations
//! and format-agnostic configuration files.

pub mod config;
pub mod error;
pub mod io;
pub mod path;
pub mod size;
pub mod text;

pub use config::ConfigStore;
pub use error::{Error, Result};
pub use path::RelativePath;
pub use size::display_size;
pub use text::LineEnding;
