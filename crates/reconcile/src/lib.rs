//! Core reconciliation domain for academy-sync.
//!
//! This crate provisions a training workspace in the issue tracker, drains its
//! previous backlog, and reconciles a declarative job catalog against build
//! artifacts, filing one issue per matched job. Infrastructure crates implement
//! the port traits defined here; they never add domain rules.
//!
//! ## Architectural Layer
//!
//! **Business logic + port definitions.** This crate has no I/O dependencies.
//! The tracker is reached through [`TrackerClient`] and the artifact workspace
//! through [`ArtifactScanner`].
//!
//! ## Module Layout
//!
//! | Module | Contents |
//! |--------|----------|
//! | [`identifiers`] | Newtype identifiers (`ProjectIdentifier`, `UserLogin`, `IssueId`, etc.) |
//! | [`types`] | Catalog, ordinal, URL, and tracker payload types |
//! | [`errors`] | Transport, run, and purge-abort error types |
//! | [`config`] | Explicit run configuration |
//! | [`ports`] | `TrackerClient` and `ArtifactScanner` traits |
//! | [`provision`] | Project, user, and membership creation |
//! | [`purge`] | Paginated listing and deletion of every issue |
//! | [`matcher`] | Artifact lookup and pipeline URL derivation |
//! | [`synthesize`] | Issue construction and submission |
//! | [`run`] | The provision → purge → reconcile driver |

pub mod config;
pub mod errors;
pub mod identifiers;
pub mod matcher;
pub mod ports;
pub mod provision;
pub mod purge;
pub mod run;
pub mod synthesize;
pub mod types;

// Re-export everything at the crate root for ergonomic usage by downstream crates.
pub use config::{ApiKey, RunConfig, TrackerConfig};
pub use errors::{PurgeAbort, RunError, TransportError};
pub use identifiers::{slugify, FolderName, IssueId, ProjectIdentifier, RoleId, RunId, UserLogin};
pub use matcher::{pipeline_url, ArtifactMatch, CatalogMatcher};
pub use ports::{ArtifactScanner, TrackerClient};
pub use provision::{
    one_time_password, ProvisionReport, ProvisionStep, StepOutcome, WorkspaceProvisioner,
};
pub use purge::{DeleteFailure, IssuePurger, PurgeReport};
pub use run::{JobOutcome, ReconcileReport, Reconciler, RunOutcome, RunPhase, RunReport};
pub use synthesize::{IssueSynthesizer, SubmissionOutcome};
pub use types::{
    CatalogFolder, IssuePage, IssueRef, JobCatalog, JobOrdinal, JobSpec, NewIssue, NewMembership,
    NewProject, NewUser, ResolvedJobUrl, Timestamp, TrackerResponse, ISSUE_PRIORITY_ID,
    ISSUE_TRACKER_ID, LIMITED_ROLE_ID,
};
