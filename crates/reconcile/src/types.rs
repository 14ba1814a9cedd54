//! Shared value types for the reconciliation domain.
//!
//! Unlike the newtype identifiers in [`crate::identifiers`], these types carry
//! values with invariants (ordinals start at 1, URLs are either resolved or
//! explicitly unresolved) and describe the request/response shapes exchanged
//! with the tracker.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use serde_json::{json, Value};

use crate::{FolderName, IssueId, ProjectIdentifier, RoleId, UserLogin};

/// Tracker classification applied to every synthesised issue.
pub const ISSUE_TRACKER_ID: u64 = 5;

/// Priority applied to every synthesised issue.
pub const ISSUE_PRIORITY_ID: u64 = 1;

/// Role granted to the student login on the training project.
pub const LIMITED_ROLE_ID: RoleId = RoleId::new(3);

// ---------------------------------------------------------------------------
// Job catalog
// ---------------------------------------------------------------------------

/// One declared job of a catalog folder.
///
/// `name` is the job's identity: it is compared by exact, case-sensitive string
/// equality against artifact base names.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct JobSpec {
    /// Job name; also the expected artifact base name.
    pub name: String,

    /// Free-text area description copied into the issue.
    #[serde(default)]
    pub description: Option<String>,

    /// Job category copied into the issue.
    #[serde(default)]
    pub category: Option<String>,
}

impl JobSpec {
    /// Creates a job with no description or category.
    pub fn named(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            description: None,
            category: None,
        }
    }

    /// Description shown in the issue, or `"No description"`.
    pub fn description_or_default(&self) -> &str {
        self.description.as_deref().unwrap_or("No description")
    }

    /// Category shown in the issue, or `"No category"`.
    pub fn category_or_default(&self) -> &str {
        self.category.as_deref().unwrap_or("No category")
    }
}

/// A folder together with its jobs in declared order.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CatalogFolder {
    /// Folder name.
    pub folder: FolderName,
    /// Jobs in declared order.
    pub jobs: Vec<JobSpec>,
}

/// Ordered mapping from folder to jobs.
///
/// Iteration order is the declared folder order; reconciliation depends on it
/// because a match failure stops every folder that comes after.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct JobCatalog {
    folders: Vec<CatalogFolder>,
}

impl JobCatalog {
    /// Creates an empty catalog.
    pub fn new() -> Self {
        Self::default()
    }

    /// Appends a folder after every folder already present.
    pub fn push_folder(&mut self, folder: FolderName, jobs: Vec<JobSpec>) {
        self.folders.push(CatalogFolder { folder, jobs });
    }

    /// Builder-style variant of [`JobCatalog::push_folder`].
    #[must_use]
    pub fn with_folder(mut self, folder: FolderName, jobs: Vec<JobSpec>) -> Self {
        self.push_folder(folder, jobs);
        self
    }

    /// Folders in declared order.
    pub fn folders(&self) -> &[CatalogFolder] {
        &self.folders
    }

    /// Total number of declared jobs across all folders.
    pub fn job_count(&self) -> usize {
        self.folders.iter().map(|f| f.jobs.len()).sum()
    }
}

// ---------------------------------------------------------------------------
// Reconciliation values
// ---------------------------------------------------------------------------

/// 1-based position of a job within its folder.
///
/// Reset for each folder and advanced once per job processed, whether or not
/// the job matched.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub struct JobOrdinal(u32);

impl JobOrdinal {
    /// The ordinal of the first job in a folder.
    pub fn first() -> Self {
        Self(1)
    }

    /// The ordinal of the following job.
    #[must_use]
    pub fn next(self) -> Self {
        Self(self.0 + 1)
    }

    /// Returns the underlying integer value.
    pub fn as_u32(self) -> u32 {
        self.0
    }
}

impl std::fmt::Display for JobOrdinal {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// Outcome of looking up a job's pipeline URL.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub enum ResolvedJobUrl {
    /// A matching artifact exists; the percent-encoded pipeline URL.
    Resolved(String),
    /// No artifact under the folder has the job's name.
    Unresolved,
}

impl ResolvedJobUrl {
    /// Returns the URL, or `None` when unresolved.
    pub fn as_url(&self) -> Option<&str> {
        match self {
            Self::Resolved(url) => Some(url),
            Self::Unresolved => None,
        }
    }

    /// Returns `true` if a matching artifact was found.
    pub fn is_resolved(&self) -> bool {
        matches!(self, Self::Resolved(_))
    }
}

// ---------------------------------------------------------------------------
// Tracker wire shapes
// ---------------------------------------------------------------------------

/// Raw outcome of one tracker call.
///
/// The client never turns a status into an error; callers decide policy.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TrackerResponse {
    /// HTTP status code.
    pub status: u16,
    /// Raw response body.
    pub body: String,
}

impl TrackerResponse {
    /// Creates a response value.
    pub fn new(status: u16, body: impl Into<String>) -> Self {
        Self {
            status,
            body: body.into(),
        }
    }

    /// `true` for any 2xx status.
    pub fn is_success(&self) -> bool {
        (200..300).contains(&self.status)
    }

    /// `true` for `201 Created`.
    pub fn is_created(&self) -> bool {
        self.status == 201
    }
}

/// A page of the issue listing.
///
/// Missing fields take the tracker's documented defaults.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
pub struct IssuePage {
    /// Issues on this page; only the id is used.
    #[serde(default)]
    pub issues: Vec<IssueRef>,
    /// Offset of the first issue on this page.
    #[serde(default)]
    pub offset: u64,
    /// Page size the tracker applied.
    #[serde(default = "IssuePage::default_limit")]
    pub limit: u64,
    /// Total issues visible, as reported on this page.
    #[serde(default)]
    pub total_count: u64,
}

impl IssuePage {
    fn default_limit() -> u64 {
        100
    }
}

/// Minimal projection of a listed issue.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Deserialize)]
pub struct IssueRef {
    /// Tracker-assigned id.
    pub id: IssueId,
}

/// `POST /projects.json` payload.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct NewProject {
    /// Display name.
    pub name: String,
    /// Derived identifier.
    pub identifier: ProjectIdentifier,
    /// Free-text description.
    pub description: String,
    /// Whether the project is visible to anonymous users.
    pub is_public: bool,
}

impl NewProject {
    /// Request body for the tracker.
    pub fn payload(&self) -> Value {
        json!({
            "project": {
                "name": self.name,
                "identifier": self.identifier.as_str(),
                "description": self.description,
                "is_public": self.is_public,
            }
        })
    }
}

/// `POST /users.json` payload.
///
/// `Debug` omits the password.
#[derive(Clone, PartialEq, Eq)]
pub struct NewUser {
    /// Login derived from the student name.
    pub login: UserLogin,
    /// Given name.
    pub firstname: String,
    /// Family name.
    pub lastname: String,
    /// Contact address.
    pub mail: String,
    /// One-time password.
    pub password: String,
}

impl NewUser {
    /// Request body for the tracker.
    pub fn payload(&self) -> Value {
        json!({
            "user": {
                "login": self.login.as_str(),
                "firstname": self.firstname,
                "lastname": self.lastname,
                "mail": self.mail,
                "password": self.password,
            }
        })
    }
}

impl std::fmt::Debug for NewUser {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("NewUser")
            .field("login", &self.login)
            .field("firstname", &self.firstname)
            .field("lastname", &self.lastname)
            .field("mail", &self.mail)
            .field("password", &"<redacted>")
            .finish()
    }
}

/// `POST /projects/{id}/memberships.json` payload.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct NewMembership {
    /// Login to grant the role to.
    pub login: UserLogin,
    /// Roles to grant.
    pub role_ids: Vec<RoleId>,
}

impl NewMembership {
    /// Request body for the tracker.
    pub fn payload(&self) -> Value {
        json!({
            "membership": {
                "user": { "login": self.login.as_str() },
                "role_ids": self.role_ids,
            }
        })
    }
}

/// `POST /issues.json` payload.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct NewIssue {
    /// Project the issue belongs to.
    pub project_id: ProjectIdentifier,
    /// One-line subject.
    pub subject: String,
    /// Multi-line description.
    pub description: String,
    /// Tracker classification.
    pub tracker_id: u64,
    /// Priority classification.
    pub priority_id: u64,
}

impl NewIssue {
    /// Request body for the tracker.
    pub fn payload(&self) -> Value {
        json!({
            "issue": {
                "project_id": self.project_id.as_str(),
                "subject": self.subject,
                "description": self.description,
                "tracker_id": self.tracker_id,
                "priority_id": self.priority_id,
            }
        })
    }
}

// ---------------------------------------------------------------------------
// Time
// ---------------------------------------------------------------------------

/// A UTC wall-clock timestamp.
///
/// Wraps [`chrono::DateTime<Utc>`] so callers never depend on `chrono` types
/// directly.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Serialize, Deserialize)]
pub struct Timestamp(DateTime<Utc>);

impl Timestamp {
    /// Returns the current UTC time as a [`Timestamp`].
    pub fn now() -> Self {
        Self(Utc::now())
    }

    /// Returns the underlying [`DateTime<Utc>`].
    pub fn as_datetime(self) -> DateTime<Utc> {
        self.0
    }
}

impl std::fmt::Display for Timestamp {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.0.to_rfc3339())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_issue_page_applies_defaults_for_missing_fields() {
        let page: IssuePage = serde_json::from_str(r#"{"issues":[{"id":7,"subject":"x"}]}"#).unwrap();
        assert_eq!(page.issues, vec![IssueRef { id: IssueId::new(7) }]);
        assert_eq!(page.offset, 0);
        assert_eq!(page.limit, 100);
        assert_eq!(page.total_count, 0);
    }

    #[test]
    fn test_job_spec_defaults_for_missing_metadata() {
        let job = JobSpec::named("binutils-pass1");
        assert_eq!(job.description_or_default(), "No description");
        assert_eq!(job.category_or_default(), "No category");
    }

    #[test]
    fn test_new_issue_payload_shape() {
        let issue = NewIssue {
            project_id: ProjectIdentifier::new("course_a").unwrap(),
            subject: "[1] - gcc".into(),
            description: "d".into(),
            tracker_id: ISSUE_TRACKER_ID,
            priority_id: ISSUE_PRIORITY_ID,
        };
        assert_eq!(
            issue.payload(),
            json!({"issue": {
                "project_id": "course_a",
                "subject": "[1] - gcc",
                "description": "d",
                "tracker_id": 5,
                "priority_id": 1
            }})
        );
    }

    #[test]
    fn test_membership_payload_nests_login() {
        let membership = NewMembership {
            login: UserLogin::new("student1").unwrap(),
            role_ids: vec![LIMITED_ROLE_ID],
        };
        assert_eq!(
            membership.payload(),
            json!({"membership": {"user": {"login": "student1"}, "role_ids": [3]}})
        );
    }

    #[test]
    fn test_new_user_debug_hides_password() {
        let user = NewUser {
            login: UserLogin::new("student1").unwrap(),
            firstname: "student1".into(),
            lastname: "User".into(),
            mail: "student1@example.com".into(),
            password: "deadbeefcafebabe".into(),
        };
        let rendered = format!("{user:?}");
        assert!(!rendered.contains("deadbeefcafebabe"));
        assert!(rendered.contains("<redacted>"));
    }

    #[test]
    fn test_ordinal_sequence_starts_at_one() {
        let first = JobOrdinal::first();
        assert_eq!(first.as_u32(), 1);
        assert_eq!(first.next().next().to_string(), "3");
    }

    #[test]
    fn test_response_classification() {
        assert!(TrackerResponse::new(204, "").is_success());
        assert!(!TrackerResponse::new(204, "").is_created());
        assert!(TrackerResponse::new(201, "{}").is_created());
        assert!(!TrackerResponse::new(422, "{}").is_success());
    }
}
