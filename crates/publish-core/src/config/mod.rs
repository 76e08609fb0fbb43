//! Configuration of a publish run
//!
//! Two files feed a run:
//!
//! 1. **Publish configuration** - `scm-publish.toml` (or `.json` / `.yaml`),
//!    every knob of a run; command-line flags override it
//! 2. **Settings** - `<config dir>/scm-publish/settings.toml`, per-user server
//!    credentials referenced by `server-id`

mod publish;
mod settings;

pub use publish::{DEFAULT_CONFIG_FILE, PublishConfig};
pub use settings::{Secret, Server, Settings};
