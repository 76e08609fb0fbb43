//! Deletion policy: ignore patterns and protected names
//!
//! Patterns are evaluated case-sensitively against the whole path relative to
//! the reconciliation root. Plain patterns are Ant-style globs; `%regex[...]`
//! wraps a regular expression and `%ant[...]` an explicit glob.

use std::collections::BTreeSet;

use glob::{MatchOptions, Pattern};
use publish_fs::RelativePath;
use regex::Regex;

use crate::{Error, Result};

const REGEX_PREFIX: &str = "%regex[";
const ANT_PREFIX: &str = "%ant[";

const GLOB_OPTIONS: MatchOptions = MatchOptions {
    case_sensitive: true,
    require_literal_separator: true,
    require_literal_leading_dot: false,
};

/// One deletion-ignore pattern.
#[derive(Debug, Clone)]
pub enum DeletionPattern {
    Glob {
        pattern: Pattern,
        /// Directory a trailing `/**` hangs off; it matches that directory too.
        root: Option<Pattern>,
    },
    Regex(Regex),
}

impl DeletionPattern {
    pub fn parse(raw: &str) -> Result<Self> {
        let raw = raw.trim();
        if let Some(inner) = wrapped(raw, REGEX_PREFIX) {
            let regex = Regex::new(&format!("^(?:{})$", inner)).map_err(|e| {
                Error::configuration(format!("invalid ignore pattern '{}': {}", raw, e))
            })?;
            return Ok(Self::Regex(regex));
        }

        let glob = wrapped(raw, ANT_PREFIX).unwrap_or(raw);
        Self::glob(raw, glob)
    }

    fn glob(raw: &str, glob: &str) -> Result<Self> {
        let mut glob = glob.replace('\\', "/");
        // Ant: a trailing separator stands for everything beneath
        if glob.ends_with('/') {
            glob.push_str("**");
        }
        let invalid =
            |e: glob::PatternError| Error::configuration(format!("invalid ignore pattern '{}': {}", raw, e));

        let root = match glob.strip_suffix("/**").filter(|r| !r.is_empty()) {
            Some(root) => Some(Pattern::new(root).map_err(invalid)?),
            None => None,
        };
        let pattern = Pattern::new(&glob).map_err(invalid)?;
        Ok(Self::Glob { pattern, root })
    }

    pub fn matches(&self, path: &RelativePath) -> bool {
        match self {
            Self::Glob { pattern, root } => {
                pattern.matches_with(path.as_str(), GLOB_OPTIONS)
                    || root
                        .as_ref()
                        .is_some_and(|r| r.matches_with(path.as_str(), GLOB_OPTIONS))
            }
            Self::Regex(regex) => regex.is_match(path.as_str()),
        }
    }
}

fn wrapped<'a>(raw: &'a str, prefix: &str) -> Option<&'a str> {
    raw.strip_prefix(prefix).and_then(|r| r.strip_suffix(']'))
}

/// Top-level directory names that survive even when absent from the content.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ProtectedSet {
    names: BTreeSet<String>,
}

impl ProtectedSet {
    pub fn new<I, S>(names: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        Self {
            names: names.into_iter().map(Into::into).collect(),
        }
    }

    pub fn contains(&self, name: &str) -> bool {
        self.names.contains(name)
    }
}

/// Decides which destination entries may be deleted.
#[derive(Debug, Clone, Default)]
pub struct PathPolicy {
    ignore: Vec<DeletionPattern>,
    protected: ProtectedSet,
}

impl PathPolicy {
    pub fn new(ignore: Vec<DeletionPattern>, protected: ProtectedSet) -> Self {
        Self { ignore, protected }
    }

    /// Parse raw ignore patterns.
    pub fn from_patterns<S: AsRef<str>>(patterns: &[S], protected: ProtectedSet) -> Result<Self> {
        let ignore = patterns
            .iter()
            .map(|p| DeletionPattern::parse(p.as_ref()))
            .collect::<Result<Vec<_>>>()?;
        Ok(Self::new(ignore, protected))
    }

    /// Whether `path` names a protected top-level entry.
    pub fn is_protected(&self, path: &RelativePath) -> bool {
        let mut components = path.components();
        match (components.next(), components.next()) {
            (Some(name), None) => self.protected.contains(name),
            _ => false,
        }
    }

    pub fn is_deletion_ignored(&self, path: &RelativePath) -> bool {
        self.ignore.iter().any(|p| p.matches(path))
    }
}
