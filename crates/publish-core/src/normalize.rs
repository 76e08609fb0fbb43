//! Which files are copied as text with normalized line endings

use std::collections::BTreeSet;
use std::path::Path;

use publish_fs::LineEnding;

/// Extensions normalized when nothing else is configured.
pub const DEFAULT_EXTENSIONS: [&str; 3] = ["html", "css", "js"];

/// Extension set (case-insensitive) selecting newline-normalizing copies.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct NormalizationPolicy {
    extensions: BTreeSet<String>,
    line_ending: LineEnding,
}

impl Default for NormalizationPolicy {
    fn default() -> Self {
        Self {
            extensions: DEFAULT_EXTENSIONS.iter().map(|e| e.to_string()).collect(),
            line_ending: LineEnding::default(),
        }
    }
}

impl NormalizationPolicy {
    /// Default extensions plus `extra` ones; a leading dot is optional.
    pub fn with_extra<I, S>(extra: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: AsRef<str>,
    {
        let mut policy = Self::default();
        policy.extensions.extend(
            extra
                .into_iter()
                .map(|e| e.as_ref().trim().trim_start_matches('.').to_ascii_lowercase())
                .filter(|e| !e.is_empty()),
        );
        policy
    }

    pub fn with_line_ending(mut self, ending: LineEnding) -> Self {
        self.line_ending = ending;
        self
    }

    pub fn line_ending(&self) -> LineEnding {
        self.line_ending
    }

    pub fn applies_to(&self, path: &Path) -> bool {
        path.extension()
            .and_then(|e| e.to_str())
            .is_some_and(|e| self.extensions.contains(&e.to_ascii_lowercase()))
    }
}
