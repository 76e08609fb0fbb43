//! `scm:` locator parsing

use std::fmt;

use crate::{Error, Result};

const PREFIX: &str = "scm:";

/// A parsed `scm:<provider><delimiter><address>` locator.
///
/// The delimiter is the first `:` or `|` after the `scm:` prefix.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ScmUrl {
    provider: String,
    address: String,
}

impl ScmUrl {
    pub fn parse(url: &str) -> Result<Self> {
        let invalid = |reason: &str| Error::InvalidUrl {
            url: url.to_string(),
            reason: reason.to_string(),
        };

        let rest = url
            .trim()
            .strip_prefix(PREFIX)
            .ok_or_else(|| invalid("must start with 'scm:'"))?;
        let split = rest
            .find([':', '|'])
            .ok_or_else(|| invalid("missing provider delimiter"))?;

        let provider = &rest[..split];
        let mut address = rest[split + 1..].to_string();
        if provider.is_empty() {
            return Err(invalid("empty provider"));
        }
        if address.is_empty() {
            return Err(invalid("empty address"));
        }

        // svn needs the three-slash form for local repositories
        if provider == "svn" && address.starts_with("file:/") && !address.starts_with("file:///") {
            address = format!("file:///{}", &address["file:/".len()..]);
        }

        Ok(Self {
            provider: provider.to_string(),
            address,
        })
    }

    /// Provider id, e.g. `git` or `svn`.
    pub fn provider(&self) -> &str {
        &self.provider
    }

    /// Provider-specific address.
    pub fn address(&self) -> &str {
        &self.address
    }
}

impl fmt::Display for ScmUrl {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}{}:{}", PREFIX, self.provider, self.address)
    }
}
