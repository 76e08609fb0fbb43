//! The publish configuration file

use std::path::{Path, PathBuf};

use publish_fs::{ConfigStore, LineEnding, RelativePath};
use publish_scm::{Credentials, ScmRepository, ScmUrl};
use serde::{Deserialize, Serialize};

use super::settings::{Secret, Settings};
use crate::normalize::NormalizationPolicy;
use crate::policy::{PathPolicy, ProtectedSet};
use crate::publish::RetryPolicy;
use crate::{Error, Result};

/// File picked up from the current directory when no file is named.
pub const DEFAULT_CONFIG_FILE: &str = "scm-publish.toml";

const DEFAULT_ENCODING: &str = "utf-8";

fn default_content() -> PathBuf {
    PathBuf::from("target/staging")
}

fn default_checkout_directory() -> String {
    "target/scmpublish-checkout".to_string()
}

fn default_checkin_comment() -> String {
    "Site checkin".to_string()
}

/// Every setting of a publish run.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default, rename_all = "kebab-case")]
pub struct PublishConfig {
    /// Locator of the publication repository, `scm:<provider>:<address>`.
    pub pub_scm_url: String,

    /// Generated content to publish.
    pub content: PathBuf,

    /// Working-copy location. An unresolved `${...}` selects a temporary
    /// directory.
    pub checkout_directory: String,

    /// Directory inside the working copy receiving the content.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub sub_directory: Option<String>,

    /// Update an existing working copy instead of checking out afresh.
    pub try_update: bool,

    pub dry_run: bool,
    pub skip_deployment: bool,

    /// Stage changes but leave the commit to the user.
    pub skip_checkin: bool,
    pub checkin_comment: String,
    pub skip_deleted_files: bool,

    /// Stage new directories one backend call at a time.
    pub add_unique_directory: bool,

    /// Patterns of working-copy paths never deleted.
    pub ignore_paths_to_delete: Vec<String>,

    /// Top-level directories kept even when absent from the content.
    pub protected_names: Vec<String>,

    #[serde(skip_serializing_if = "Option::is_none")]
    pub scm_branch: Option<String>,
    pub automatic_remote_path_creation: bool,

    #[serde(skip_serializing_if = "Option::is_none")]
    pub output_encoding: Option<String>,
    pub extra_normalize_extensions: Vec<String>,
    pub line_ending: LineEnding,

    /// Server entry of the settings file providing credentials.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub server_id: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub username: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub password: Option<Secret>,

    pub checkout_retry: RetryPolicy,
}

impl Default for PublishConfig {
    fn default() -> Self {
        Self {
            pub_scm_url: String::new(),
            content: default_content(),
            checkout_directory: default_checkout_directory(),
            sub_directory: None,
            try_update: false,
            dry_run: false,
            skip_deployment: false,
            skip_checkin: false,
            checkin_comment: default_checkin_comment(),
            skip_deleted_files: false,
            add_unique_directory: false,
            ignore_paths_to_delete: Vec::new(),
            protected_names: Vec::new(),
            scm_branch: None,
            automatic_remote_path_creation: true,
            output_encoding: None,
            extra_normalize_extensions: Vec::new(),
            line_ending: LineEnding::default(),
            server_id: None,
            username: None,
            password: None,
            checkout_retry: RetryPolicy::default(),
        }
    }
}

impl PublishConfig {
    pub fn load(path: &Path) -> Result<Self> {
        Ok(ConfigStore::new().load(path)?)
    }

    /// Load `path`, or [`DEFAULT_CONFIG_FILE`] from `dir` when present, or
    /// fall back to defaults.
    pub fn load_or_default(path: Option<&Path>, dir: &Path) -> Result<Self> {
        if let Some(path) = path {
            return Self::load(path);
        }
        let candidate = dir.join(DEFAULT_CONFIG_FILE);
        if candidate.is_file() {
            tracing::debug!(path = %candidate.display(), "Loading publish configuration");
            return Self::load(&candidate);
        }
        Ok(Self::default())
    }

    pub fn save(&self, path: &Path) -> Result<()> {
        Ok(ConfigStore::new().save(path, self)?)
    }

    /// Fill unset credentials from the settings server named by `server-id`.
    pub fn apply_settings(&mut self, settings: &Settings) {
        let Some(id) = self.server_id.as_deref() else {
            return;
        };
        let Some(server) = settings.server(id) else {
            tracing::warn!(server_id = %id, "No server with this id in settings");
            return;
        };
        if self.username.is_none() {
            self.username = server.username.clone();
        }
        if self.password.is_none() {
            self.password = server.password.clone();
        }
    }

    /// Encoding used to read and write normalized text.
    pub fn encoding(&self) -> &str {
        match &self.output_encoding {
            Some(encoding) => encoding,
            None => {
                tracing::warn!("No output encoding, defaulting to UTF-8.");
                DEFAULT_ENCODING
            }
        }
    }

    /// Parsed sub-directory; the root when unset.
    pub fn sub_directory(&self) -> Result<RelativePath> {
        match &self.sub_directory {
            None => Ok(RelativePath::root()),
            Some(sub) => RelativePath::new(sub).map_err(|_| {
                Error::configuration(format!(
                    "sub-directory '{}' points outside of the checkout directory",
                    sub
                ))
            }),
        }
    }

    pub fn repository(&self) -> Result<ScmRepository> {
        if self.pub_scm_url.trim().is_empty() {
            return Err(Error::configuration("pub-scm-url is required"));
        }
        let url = ScmUrl::parse(&self.pub_scm_url)?;
        let credentials = Credentials::new(
            self.username.clone(),
            self.password.as_ref().map(|p| p.expose().to_string()),
        );
        Ok(ScmRepository::new(url, credentials))
    }

    pub fn path_policy(&self) -> Result<PathPolicy> {
        PathPolicy::from_patterns(
            &self.ignore_paths_to_delete,
            ProtectedSet::new(self.protected_names.iter().cloned()),
        )
    }

    pub fn normalization_policy(&self) -> NormalizationPolicy {
        NormalizationPolicy::with_extra(&self.extra_normalize_extensions)
            .with_line_ending(self.line_ending)
    }
}
