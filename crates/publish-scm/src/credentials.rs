//! Repository handle and credentials

use std::fmt;

use crate::ScmUrl;

/// Username and password handed to the backend.
#[derive(Clone, Default, PartialEq, Eq)]
pub struct Credentials {
    pub username: Option<String>,
    pub password: Option<String>,
}

impl Credentials {
    pub fn new(username: Option<String>, password: Option<String>) -> Self {
        Self { username, password }
    }

    pub fn is_empty(&self) -> bool {
        self.username.is_none() && self.password.is_none()
    }
}

impl fmt::Debug for Credentials {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Credentials")
            .field("username", &self.username)
            .field("password", &self.password.as_ref().map(|_| "********"))
            .finish()
    }
}

/// A repository locator together with the credentials to reach it.
#[derive(Debug, Clone)]
pub struct ScmRepository {
    pub url: ScmUrl,
    pub credentials: Credentials,
}

impl ScmRepository {
    pub fn new(url: ScmUrl, credentials: Credentials) -> Self {
        Self { url, credentials }
    }
}
