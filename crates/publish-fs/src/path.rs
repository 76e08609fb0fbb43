//! Root-relative path handling
//!
//! Version-control backends stage paths relative to the working-copy root,
//! never absolute filesystem paths. [`RelativePath`] is that currency.

use std::path::{Path, PathBuf};

use serde::Serialize;

use crate::{Error, Result};

/// A path relative to some root, stored with forward slashes.
///
/// The empty path denotes the root itself. Construction is lexical: `.` and
/// empty components are dropped, `..` pops a component, and any `..` that
/// would climb above the root is rejected.
#[derive(Debug, Clone, Default, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize)]
#[serde(transparent)]
pub struct RelativePath {
    inner: String,
}

impl RelativePath {
    /// The root itself.
    pub fn root() -> Self {
        Self::default()
    }

    /// Parse a relative path, cleaning it lexically.
    ///
    /// # Errors
    ///
    /// Returns [`Error::PathEscape`] for absolute paths and for `..`
    /// components that leave the root.
    pub fn new(path: impl AsRef<str>) -> Result<Self> {
        let raw = path.as_ref().replace('\\', "/");
        if raw.starts_with('/') || has_drive_prefix(&raw) {
            return Err(Error::PathEscape { path: raw });
        }

        let mut parts: Vec<&str> = Vec::new();
        for part in raw.split('/') {
            match part {
                "" | "." => continue,
                ".." => {
                    if parts.pop().is_none() {
                        return Err(Error::PathEscape { path: raw.clone() });
                    }
                }
                other => parts.push(other),
            }
        }

        Ok(Self {
            inner: parts.join("/"),
        })
    }

    /// Express `path` relative to `root`.
    pub fn strip_root(root: &Path, path: &Path) -> Result<Self> {
        let relative = path.strip_prefix(root).map_err(|_| Error::PathEscape {
            path: path.to_string_lossy().into_owned(),
        })?;
        Self::new(relative.to_string_lossy())
    }

    /// Get the internal forward-slash representation.
    pub fn as_str(&self) -> &str {
        &self.inner
    }

    pub fn is_root(&self) -> bool {
        self.inner.is_empty()
    }

    /// Append a single entry name.
    pub fn join(&self, name: &str) -> Self {
        let inner = if self.inner.is_empty() {
            name.to_string()
        } else {
            format!("{}/{}", self.inner, name)
        };
        Self { inner }
    }

    /// Get the parent path; `None` for the root.
    pub fn parent(&self) -> Option<Self> {
        if self.inner.is_empty() {
            return None;
        }
        match self.inner.rfind('/') {
            Some(idx) => Some(Self {
                inner: self.inner[..idx].to_string(),
            }),
            None => Some(Self::root()),
        }
    }

    /// Get the last component.
    pub fn file_name(&self) -> Option<&str> {
        if self.inner.is_empty() {
            None
        } else {
            self.inner.rsplit('/').next()
        }
    }

    pub fn components(&self) -> impl Iterator<Item = &str> {
        self.inner.split('/').filter(|c| !c.is_empty())
    }

    /// Resolve against `root` into a platform-native path.
    pub fn to_native(&self, root: &Path) -> PathBuf {
        let mut native = root.to_path_buf();
        for component in self.components() {
            native.push(component);
        }
        native
    }
}

fn has_drive_prefix(raw: &str) -> bool {
    let bytes = raw.as_bytes();
    bytes.len() >= 2 && bytes[0].is_ascii_alphabetic() && bytes[1] == b':'
}

impl AsRef<str> for RelativePath {
    fn as_ref(&self) -> &str {
        &self.inner
    }
}

impl AsRef<Path> for RelativePath {
    fn as_ref(&self) -> &Path {
        Path::new(&self.inner)
    }
}

impl std::fmt::Display for RelativePath {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.inner)
    }
}
