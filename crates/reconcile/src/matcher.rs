//! Catalog matching: find a job's build artifact and derive its pipeline URL.
//!
//! Matching compares the job name with artifact *base names* only, so nested
//! layouts produced by the build system still match. The scan never stops
//! early: when several files share the job name, the one enumerated last
//! decides the URL.

use std::path::PathBuf;

use percent_encoding::{utf8_percent_encode, AsciiSet, NON_ALPHANUMERIC};
use tracing::{debug, warn};

use crate::{ArtifactScanner, FolderName, JobSpec, ResolvedJobUrl};

/// Characters left literal in pipeline URLs: unreserved characters plus the
/// `:` and `/` separators.
const PIPELINE_URL_SAFE: &AsciiSet = &NON_ALPHANUMERIC
    .remove(b'_')
    .remove(b'.')
    .remove(b'-')
    .remove(b'~')
    .remove(b':')
    .remove(b'/');

/// Builds the percent-encoded pipeline URL for `job_name` in `folder`.
///
/// `ci_base_url` must end with `/`; the result is
/// `{ci_base_url}job/{folder}/job/{job_name}` with everything outside
/// [`PIPELINE_URL_SAFE`] escaped.
pub fn pipeline_url(ci_base_url: &str, folder: &FolderName, job_name: &str) -> String {
    let raw = format!("{ci_base_url}job/{folder}/job/{job_name}");
    utf8_percent_encode(&raw, PIPELINE_URL_SAFE).to_string()
}

/// The artifact a job resolved to.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ArtifactMatch {
    /// Path of the matching file, as enumerated by the scanner.
    pub path: PathBuf,
    /// Percent-encoded pipeline URL.
    pub url: String,
}

/// Resolves catalog jobs against scanned artifacts.
pub struct CatalogMatcher<'a> {
    scanner: &'a dyn ArtifactScanner,
    ci_base_url: &'a str,
}

impl<'a> CatalogMatcher<'a> {
    /// Creates a matcher producing URLs under `ci_base_url`.
    pub fn new(scanner: &'a dyn ArtifactScanner, ci_base_url: &'a str) -> Self {
        Self {
            scanner,
            ci_base_url,
        }
    }

    /// Scans `folder` and resolves `job`'s pipeline URL.
    ///
    /// The folder is rescanned on every call.
    pub fn resolve(&self, folder: &FolderName, job: &JobSpec) -> ResolvedJobUrl {
        match self.find_match(folder, job) {
            Some(found) => ResolvedJobUrl::Resolved(found.url),
            None => {
                warn!(folder = %folder, job = %job.name, "No pipeline URL found for job");
                ResolvedJobUrl::Unresolved
            }
        }
    }

    /// Returns the last scanned file whose base name equals `job.name`.
    pub fn find_match(&self, folder: &FolderName, job: &JobSpec) -> Option<ArtifactMatch> {
        let files = self.scanner.scan(folder);
        debug!(folder = %folder, files = files.len(), "Scanned artifact files");

        let mut found = None;
        for path in files {
            let Some(base_name) = path.file_name().and_then(|name| name.to_str()) else {
                continue;
            };
            if base_name == job.name {
                debug!(path = %path.display(), job = %job.name, "Artifact matches job");
                let url = pipeline_url(self.ci_base_url, folder, base_name);
                found = Some(ArtifactMatch { path, url });
            }
        }
        found
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    struct FixedScan(Vec<PathBuf>);

    impl ArtifactScanner for FixedScan {
        fn scan(&self, _folder: &FolderName) -> Vec<PathBuf> {
            self.0.clone()
        }
    }

    fn folder(name: &str) -> FolderName {
        FolderName::new(name).unwrap()
    }

    #[test]
    fn test_pipeline_url_encodes_space_but_keeps_separators() {
        let url = pipeline_url("https://ci.example.org/", &folder("My Folder"), "build.sh");
        assert_eq!(url, "https://ci.example.org/job/My%20Folder/job/build.sh");
    }

    #[test]
    fn test_pipeline_url_encodes_non_ascii_as_utf8() {
        let url = pipeline_url("https://ci.example.org/", &folder("più"), "a+b");
        assert_eq!(url, "https://ci.example.org/job/pi%C3%B9/job/a%2Bb");
    }

    #[test]
    fn test_last_enumerated_match_wins() {
        let scanner = FixedScan(vec![
            PathBuf::from("/ws/ch5/a/x.cfg"),
            PathBuf::from("/ws/ch5/other.txt"),
            PathBuf::from("/ws/ch5/b/x.cfg"),
        ]);
        let matcher = CatalogMatcher::new(&scanner, "https://ci.example.org/");

        let found = matcher.find_match(&folder("ch5"), &JobSpec::named("x.cfg")).unwrap();
        assert_eq!(found.path, PathBuf::from("/ws/ch5/b/x.cfg"));
        assert_eq!(found.url, "https://ci.example.org/job/ch5/job/x.cfg");
        assert_eq!(
            matcher.resolve(&folder("ch5"), &JobSpec::named("x.cfg")),
            ResolvedJobUrl::Resolved(found.url)
        );
    }

    #[test]
    fn test_match_compares_base_name_exactly() {
        let scanner = FixedScan(vec![
            PathBuf::from("/ws/ch5/Binutils"),
            PathBuf::from("/ws/ch5/binutils.log"),
            PathBuf::from("/ws/ch5/binutils/readme"),
        ]);
        let matcher = CatalogMatcher::new(&scanner, "https://ci.example.org/");
        assert_eq!(
            matcher.resolve(&folder("ch5"), &JobSpec::named("binutils")),
            ResolvedJobUrl::Unresolved
        );
    }

    #[test]
    fn test_no_files_is_unresolved() {
        let scanner = FixedScan(Vec::new());
        let matcher = CatalogMatcher::new(&scanner, "https://ci.example.org/");
        assert!(!matcher.resolve(&folder("ch5"), &JobSpec::named("gcc")).is_resolved());
    }
}
