//! Run configuration.
//!
//! Built once by the composition root and passed by reference to every
//! component. No component reads process-wide state on its own.

use std::path::PathBuf;

/// Tracker API key. `Debug` and `Display` never reveal the value.
#[derive(Clone, PartialEq, Eq)]
pub struct ApiKey(String);

impl ApiKey {
    /// Wraps a key, returning `None` if it is empty.
    pub fn new(value: impl Into<String>) -> Option<Self> {
        let value = value.into();
        if value.is_empty() {
            None
        } else {
            Some(Self(value))
        }
    }

    /// The raw key, for building the auth header.
    pub fn expose(&self) -> &str {
        &self.0
    }
}

impl std::fmt::Debug for ApiKey {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str("ApiKey(<redacted>)")
    }
}

impl std::fmt::Display for ApiKey {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str("<redacted>")
    }
}

/// Where the tracker lives and how to authenticate to it.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TrackerConfig {
    /// Base URL, e.g. `https://tracker.example.org`.
    pub base_url: String,
    /// Key sent in the `X-Redmine-API-Key` header.
    pub api_key: ApiKey,
}

/// Everything a run needs besides the catalog.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RunConfig {
    /// Tracker endpoint and credentials.
    pub tracker: TrackerConfig,
    /// Base of the externally reachable pipeline URLs. Always ends with `/`.
    pub ci_base_url: String,
    /// Directory holding one artifact subtree per catalog folder.
    pub workspace_root: PathBuf,
    /// Display name of the training project.
    pub project_name: String,
    /// Display name of the student the workspace is provisioned for.
    pub student_name: String,
}

impl RunConfig {
    /// Normalises `ci_base_url` to end with exactly one trailing slash.
    #[must_use]
    pub fn normalized(mut self) -> Self {
        let trimmed = self.ci_base_url.trim_end_matches('/').to_string();
        self.ci_base_url = format!("{trimmed}/");
        self
    }
}
