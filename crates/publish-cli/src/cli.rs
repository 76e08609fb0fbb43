//! CLI argument parsing using clap derive

use std::path::PathBuf;

use clap::{Args, Parser, Subcommand};
use clap_complete::Shell;

/// scm-publish - Mirror a generated content tree into a version-controlled repository
#[derive(Parser, Debug)]
#[command(name = "scm-publish")]
#[command(author, version, about, long_about = None)]
pub struct Cli {
    /// Enable verbose output
    #[arg(short, long, global = true)]
    pub verbose: bool,

    /// The command to run
    #[command(subcommand)]
    pub command: Option<Commands>,
}

/// Available commands
#[derive(Subcommand, Debug, Clone, PartialEq, Eq)]
pub enum Commands {
    /// Publish the content directory to the repository
    ///
    /// Checks out the repository, makes its content match the content
    /// directory and commits the difference.
    ///
    /// Examples:
    ///   scm-publish publish                       # Use ./scm-publish.toml
    ///   scm-publish publish --dry-run             # List changes only
    ///   scm-publish publish --url scm:git:/srv/site.git --content public
    Publish(PublishArgs),

    /// Write a starter scm-publish.toml in the current directory
    Init {
        /// Repository locator, `scm:<provider>:<address>`
        #[arg(long)]
        url: Option<String>,

        /// Content directory to publish
        #[arg(long)]
        content: Option<PathBuf>,

        /// Overwrite an existing configuration file
        #[arg(long)]
        force: bool,
    },

    /// Generate shell completions
    Completions {
        /// Shell to generate completions for
        #[arg(value_enum)]
        shell: Shell,
    },
}

/// Flags of the publish command. Each one overrides the configuration file.
#[derive(Args, Debug, Clone, Default, PartialEq, Eq)]
pub struct PublishArgs {
    /// Configuration file (default: ./scm-publish.toml when present)
    #[arg(short, long)]
    pub config: Option<PathBuf>,

    /// Settings file holding server credentials
    #[arg(long, env = "SCM_PUBLISH_SETTINGS")]
    pub settings: Option<PathBuf>,

    /// Repository locator, `scm:<provider>:<address>`
    #[arg(long, env = "SCM_PUBLISH_URL")]
    pub url: Option<String>,

    /// Content directory to publish
    #[arg(long)]
    pub content: Option<PathBuf>,

    /// Working-copy location
    #[arg(long)]
    pub checkout_directory: Option<String>,

    /// Directory inside the working copy receiving the content
    #[arg(long)]
    pub sub_directory: Option<String>,

    /// Update an existing working copy instead of checking out afresh
    #[arg(long)]
    pub try_update: bool,

    /// Compute and list the changes without touching the repository
    #[arg(long)]
    pub dry_run: bool,

    /// Stage the changes but do not commit them
    #[arg(long)]
    pub skip_checkin: bool,

    /// Do not stage deletions
    #[arg(long)]
    pub skip_deleted_files: bool,

    /// Stage new directories one at a time
    #[arg(long)]
    pub add_unique_directory: bool,

    /// Do not create a missing remote path
    #[arg(long)]
    pub no_remote_creation: bool,

    /// Branch to check out and commit to
    #[arg(long)]
    pub branch: Option<String>,

    /// Commit message
    #[arg(short, long)]
    pub message: Option<String>,

    #[arg(long, env = "SCM_PUBLISH_USERNAME")]
    pub username: Option<String>,

    #[arg(long, env = "SCM_PUBLISH_PASSWORD", hide_env_values = true)]
    pub password: Option<String>,

    /// Settings server entry providing credentials
    #[arg(long)]
    pub server_id: Option<String>,

    /// Working-copy path pattern never deleted (repeatable)
    #[arg(long = "ignore-path", value_name = "PATTERN")]
    pub ignore_paths: Vec<String>,

    /// Top-level directory kept even when absent from the content (repeatable)
    #[arg(long = "protect", value_name = "NAME")]
    pub protected_names: Vec<String>,

    /// Extra file extension whose line endings are normalized (repeatable)
    #[arg(long = "normalize-extension", value_name = "EXT")]
    pub normalize_extensions: Vec<String>,

    /// Output the report as JSON for scripting
    #[arg(long)]
    pub json: bool,
}
