//! Academy sync build-artifact scanner.
//!
//! Implements [`reconcile::ArtifactScanner`] over the CI workspace: every
//! catalog folder maps to `<workspace_root>/<folder>`, and every regular file
//! below it (at any depth) is a candidate match.
//!
//! ## Architectural Layer
//!
//! **Infrastructure.** Directory traversal lives here; the matching rule
//! (base-name equality, last match wins) lives in [`reconcile::CatalogMatcher`].
//!
//! ## Scan order
//!
//! Depth-first, pre-order. Entries of each directory are visited in byte-wise
//! file-name order, and a subdirectory's contents are emitted where the
//! subdirectory sorts. The order is stable across runs and platforms, which
//! keeps "last match wins" reproducible.

use std::io::ErrorKind;
use std::path::{Path, PathBuf};

use reconcile::{ArtifactScanner, FolderName};
use tracing::{debug, warn};
use walkdir::WalkDir;

/// Scans `<root>/<folder>/**` on the local filesystem.
#[derive(Debug, Clone)]
pub struct FsArtifactScanner {
    root: PathBuf,
}

impl FsArtifactScanner {
    /// Creates a scanner rooted at the CI workspace directory.
    pub fn new(root: impl Into<PathBuf>) -> Self {
        Self { root: root.into() }
    }

    /// The workspace root.
    pub fn root(&self) -> &Path {
        &self.root
    }
}

impl ArtifactScanner for FsArtifactScanner {
    fn scan(&self, folder: &FolderName) -> Vec<PathBuf> {
        let base = self.root.join(folder.as_str());
        let mut files = Vec::new();

        // Follows symlinks; a link to a file counts as a file.
        for entry in WalkDir::new(&base).follow_links(true).sort_by_file_name() {
            match entry {
                Ok(entry) if entry.file_type().is_file() => files.push(entry.into_path()),
                Ok(_) => {}
                // A folder that has never been built has no workspace directory.
                Err(err) if err.depth() == 0 && is_not_found(&err) => {}
                Err(err) => {
                    warn!(dir = %base.display(), error = %err, "Skipping unreadable artifact entry");
                }
            }
        }

        debug!(dir = %base.display(), files = files.len(), "Artifact scan finished");
        files
    }
}

fn is_not_found(err: &walkdir::Error) -> bool {
    err.io_error()
        .is_some_and(|io| io.kind() == ErrorKind::NotFound)
}
