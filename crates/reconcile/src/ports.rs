//! Port traits implemented by the infrastructure crates.
//!
//! The domain only ever reaches the tracker and the artifact workspace through
//! these two traits. `redmine` implements [`TrackerClient`]; `artifacts`
//! implements [`ArtifactScanner`].

use std::path::PathBuf;

use async_trait::async_trait;
use serde_json::Value;

use crate::{FolderName, TrackerResponse, TransportError};

/// Thin request/response access to the tracker REST API.
///
/// Paths are relative to the configured base URL (e.g. `"/issues.json"`).
/// Implementations attach authentication and content-type headers, never
/// retry, and return every HTTP status as a [`TrackerResponse`]; only a call
/// that could not complete yields [`TransportError`].
#[async_trait]
pub trait TrackerClient: Send + Sync {
    /// `GET path?query`.
    async fn get(
        &self,
        path: &str,
        query: &[(&str, String)],
    ) -> Result<TrackerResponse, TransportError>;

    /// `POST path` with a JSON body.
    async fn post(&self, path: &str, payload: &Value) -> Result<TrackerResponse, TransportError>;

    /// `DELETE path`.
    async fn delete(&self, path: &str) -> Result<TrackerResponse, TransportError>;
}

/// Enumerates candidate artifact files for a catalog folder.
pub trait ArtifactScanner: Send + Sync {
    /// Every regular file under the folder's subtree, recursively, in scan
    /// order. A missing or unreadable subtree yields no files.
    fn scan(&self, folder: &FolderName) -> Vec<PathBuf>;
}
