//! Issue synthesis: one tracker issue per matched job.
//!
//! No idempotency key is sent. Submitting the same job twice creates two
//! identical issues, which is why a run purges before reconciling.

use serde::{Deserialize, Serialize};
use tracing::{info, warn};

use crate::{
    FolderName, JobOrdinal, JobSpec, NewIssue, ProjectIdentifier, TrackerClient, TransportError,
    ISSUE_PRIORITY_ID, ISSUE_TRACKER_ID,
};

/// What the tracker said about an issue submission.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub enum SubmissionOutcome {
    /// `201 Created`.
    Created,
    /// Any other status; the job is skipped and the folder continues.
    Rejected {
        /// HTTP status returned by the tracker.
        status: u16,
        /// Raw response body.
        body: String,
    },
}

impl SubmissionOutcome {
    /// `true` for [`SubmissionOutcome::Created`].
    pub fn is_created(&self) -> bool {
        matches!(self, Self::Created)
    }
}

/// Builds and submits issues for one project.
pub struct IssueSynthesizer<'a> {
    client: &'a dyn TrackerClient,
    project_id: &'a ProjectIdentifier,
}

impl<'a> IssueSynthesizer<'a> {
    /// Creates a synthesizer filing issues under `project_id`.
    pub fn new(client: &'a dyn TrackerClient, project_id: &'a ProjectIdentifier) -> Self {
        Self { client, project_id }
    }

    /// Builds the issue for a matched job.
    pub fn build_issue(
        &self,
        ordinal: JobOrdinal,
        folder: &FolderName,
        job: &JobSpec,
        url: &str,
    ) -> NewIssue {
        NewIssue {
            project_id: self.project_id.clone(),
            subject: format!("[{ordinal}] - {}", job.name),
            description: format!(
                "Area Description: {}\nJob Category: {}\nLinux From Scratch Section: {folder}\nJenkins Job URL: {url}",
                job.description_or_default(),
                job.category_or_default(),
            ),
            tracker_id: ISSUE_TRACKER_ID,
            priority_id: ISSUE_PRIORITY_ID,
        }
    }

    /// Builds the issue and posts it to the tracker.
    pub async fn synthesize_and_submit(
        &self,
        ordinal: JobOrdinal,
        folder: &FolderName,
        job: &JobSpec,
        url: &str,
    ) -> Result<SubmissionOutcome, TransportError> {
        let issue = self.build_issue(ordinal, folder, job, url);
        let response = self.client.post("/issues.json", &issue.payload()).await?;

        if response.is_created() {
            info!(job = %job.name, subject = %issue.subject, "Issue created");
            Ok(SubmissionOutcome::Created)
        } else {
            warn!(
                job = %job.name,
                status = response.status,
                body = %response.body,
                "Failed to create issue"
            );
            Ok(SubmissionOutcome::Rejected {
                status: response.status,
                body: response.body,
            })
        }
    }
}
