//! Job catalog loading.
//!
//! The catalog is an Ansible vars file. Only the `jenkins_jobs` key is read:
//!
//! ```yaml
//! jenkins_jobs:
//!   folders:
//!     - chapter5
//!   chapter5:
//!     - name: binutils-pass1
//!       description: Cross toolchain
//!       category: toolchain
//! ```
//!
//! Every folder listed under `folders` must have a job list. Other keys are
//! ignored.

use std::collections::HashMap;
use std::path::{Path, PathBuf};

use reconcile::{FolderName, JobCatalog, JobSpec};
use serde::Deserialize;
use thiserror::Error;

/// The catalog could not be loaded. Every variant stops the run before any
/// tracker call.
#[derive(Debug, Error)]
pub enum CatalogError {
    /// The file could not be read.
    #[error("Failed to read catalog {path}: {source}")]
    Read {
        /// Catalog path.
        path: PathBuf,
        /// Underlying I/O error.
        #[source]
        source: std::io::Error,
    },

    /// The document is not valid YAML or has no `jenkins_jobs.folders` list.
    #[error("Catalog is malformed: {0}")]
    Parse(#[from] serde_yaml::Error),

    /// A folder is listed but has no job list.
    #[error("Folder '{0}' is listed in jenkins_jobs.folders but has no job list")]
    MissingFolder(String),

    /// A folder's job list does not match the job schema.
    #[error("Job list for folder '{folder}' is invalid: {source}")]
    InvalidJobs {
        /// Folder name.
        folder: String,
        /// Decoder error.
        #[source]
        source: serde_yaml::Error,
    },

    /// An entry of `folders` is an empty string.
    #[error("jenkins_jobs.folders contains an empty folder name")]
    EmptyFolderName,
}

#[derive(Deserialize)]
struct CatalogDocument {
    jenkins_jobs: JenkinsJobs,
}

#[derive(Deserialize)]
struct JenkinsJobs {
    folders: Vec<String>,
    #[serde(flatten)]
    groups: HashMap<String, serde_yaml::Value>,
}

/// Parses a catalog document.
pub fn parse_catalog(yaml: &str) -> Result<JobCatalog, CatalogError> {
    let document: CatalogDocument = serde_yaml::from_str(yaml)?;
    let JenkinsJobs { folders, groups } = document.jenkins_jobs;

    let mut catalog = JobCatalog::new();
    for name in folders {
        let folder = FolderName::new(name.clone()).ok_or(CatalogError::EmptyFolderName)?;
        // A folder listed twice is processed twice.
        let group = groups
            .get(&name)
            .cloned()
            .ok_or_else(|| CatalogError::MissingFolder(name.clone()))?;
        let jobs: Vec<JobSpec> = serde_yaml::from_value(group)
            .map_err(|source| CatalogError::InvalidJobs {
                folder: name,
                source,
            })?;
        catalog.push_folder(folder, jobs);
    }
    Ok(catalog)
}

/// Reads and parses the catalog at `path`.
pub fn load_catalog(path: &Path) -> Result<JobCatalog, CatalogError> {
    let yaml = std::fs::read_to_string(path).map_err(|source| CatalogError::Read {
        path: path.to_path_buf(),
        source,
    })?;
    parse_catalog(&yaml)
}
