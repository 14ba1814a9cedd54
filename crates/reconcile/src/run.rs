//! The run driver: provision, purge, then reconcile the catalog.
//!
//! ## Run state machine
//!
//! ```text
//! Provisioning -> Purging -> Reconciling(folder, job)* -> Done
//!                                   |
//!                                   +--> Aborted   (first unresolved job)
//! ```
//!
//! Provisioning and purging absorb every tracker rejection; they never lead to
//! `Aborted`. An unresolved job stops the whole run: the remaining jobs of its
//! folder and every later folder are left untouched, and nothing already
//! created is rolled back.

use serde::{Deserialize, Serialize};
use tracing::{error, info, info_span, instrument, Instrument};

use crate::{
    ArtifactScanner, CatalogFolder, CatalogMatcher, FolderName, IssuePurger, IssueSynthesizer,
    JobCatalog, JobOrdinal, ProjectIdentifier, ProvisionReport, PurgeReport, ResolvedJobUrl,
    RunConfig, RunError, RunId, SubmissionOutcome, Timestamp, TrackerClient, TransportError,
    WorkspaceProvisioner,
};

/// Phase of a run, as recorded in logs.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum RunPhase {
    /// Creating the project, user, and membership.
    Provisioning,
    /// Deleting the previous backlog.
    Purging,
    /// Matching jobs and creating issues.
    Reconciling,
    /// Every job was processed.
    Done,
    /// A job could not be matched; later jobs were skipped.
    Aborted,
}

impl std::fmt::Display for RunPhase {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let s = match self {
            Self::Provisioning => "provisioning",
            Self::Purging => "purging",
            Self::Reconciling => "reconciling",
            Self::Done => "done",
            Self::Aborted => "aborted",
        };
        f.write_str(s)
    }
}

/// What happened to one processed job.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct JobOutcome {
    /// Folder the job belongs to.
    pub folder: FolderName,
    /// Position of the job within its folder.
    pub ordinal: JobOrdinal,
    /// Job name.
    pub job: String,
    /// Pipeline URL lookup result.
    pub url: ResolvedJobUrl,
    /// Tracker answer; `None` when the job was not matched.
    pub submission: Option<SubmissionOutcome>,
}

/// How reconciliation ended.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub enum RunOutcome {
    /// Every declared job was processed.
    Completed,
    /// Reconciliation stopped at the first job without a matching artifact.
    Aborted {
        /// Folder of the unmatched job.
        folder: FolderName,
        /// Name of the unmatched job.
        job: String,
    },
}

impl RunOutcome {
    /// The terminal phase this outcome corresponds to.
    pub fn phase(&self) -> RunPhase {
        match self {
            Self::Completed => RunPhase::Done,
            Self::Aborted { .. } => RunPhase::Aborted,
        }
    }
}

/// Result of reconciling a catalog.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ReconcileReport {
    /// Every job processed, in processing order. Includes the unmatched job of
    /// an aborted run.
    pub jobs: Vec<JobOutcome>,
    /// Completed or aborted.
    pub outcome: RunOutcome,
}

impl ReconcileReport {
    /// Number of issues the tracker accepted.
    pub fn created_count(&self) -> usize {
        self.jobs
            .iter()
            .filter(|j| j.submission.as_ref().is_some_and(SubmissionOutcome::is_created))
            .count()
    }

    /// Number of issues the tracker rejected.
    pub fn rejected_count(&self) -> usize {
        self.jobs
            .iter()
            .filter(|j| j.submission.as_ref().is_some_and(|s| !s.is_created()))
            .count()
    }
}

/// Everything a full run did.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct RunReport {
    /// Correlation id of this run.
    pub run_id: RunId,
    /// When the run started.
    pub started_at: Timestamp,
    /// When the run finished (completed or aborted).
    pub finished_at: Timestamp,
    /// Provisioning step outcomes.
    pub provision: ProvisionReport,
    /// Purge outcome.
    pub purge: PurgeReport,
    /// Reconciliation outcome.
    pub reconcile: ReconcileReport,
}

impl RunReport {
    /// How the run ended.
    pub fn outcome(&self) -> &RunOutcome {
        &self.reconcile.outcome
    }
}

/// Drives one run against a tracker and an artifact workspace.
pub struct Reconciler<'a> {
    config: &'a RunConfig,
    tracker: &'a dyn TrackerClient,
    scanner: &'a dyn ArtifactScanner,
}

impl<'a> Reconciler<'a> {
    /// Creates a driver; nothing is sent until [`Reconciler::run`].
    pub fn new(
        config: &'a RunConfig,
        tracker: &'a dyn TrackerClient,
        scanner: &'a dyn ArtifactScanner,
    ) -> Self {
        Self {
            config,
            tracker,
            scanner,
        }
    }

    /// Provisions the workspace, purges existing issues, and reconciles
    /// `catalog`.
    ///
    /// Returns `Err` only for a transport failure. An unmatched job is reported as [`RunOutcome::Aborted`].
    pub async fn run(&self, catalog: &JobCatalog) -> Result<RunReport, RunError> {
        let run_id = RunId::new_random();
        let span = info_span!("run", run_id = %run_id);
        async move {
            let started_at = Timestamp::now();

            info!(phase = %RunPhase::Provisioning, project = %self.config.project_name, "Run phase");
            let provision = WorkspaceProvisioner::new(self.tracker)
                .provision(&self.config.project_name, &self.config.student_name)
                .await?;

            info!(phase = %RunPhase::Purging, "Run phase");
            let purge = IssuePurger::new(self.tracker).drain_all_issues().await?;

            info!(phase = %RunPhase::Reconciling, jobs = catalog.job_count(), "Run phase");
            let reconcile = self
                .reconcile(&provision.project_identifier, catalog)
                .await?;

            let report = RunReport {
                run_id,
                started_at,
                finished_at: Timestamp::now(),
                provision,
                purge,
                reconcile,
            };
            info!(
                phase = %report.outcome().phase(),
                provisioned = report.provision.is_complete(),
                purged = report.purge.deleted_count(),
                created = report.reconcile.created_count(),
                rejected = report.reconcile.rejected_count(),
                "Run finished"
            );
            Ok::<_, RunError>(report)
        }
        .instrument(span)
        .await
    }

    /// Matches every catalog job and files one issue per match under
    /// `project_id`.
    ///
    /// Stops at the first job without a matching artifact. Running this twice
    /// without purging in between files every issue twice.
    #[instrument(name = "reconcile", skip_all, fields(project = %project_id))]
    pub async fn reconcile(
        &self,
        project_id: &ProjectIdentifier,
        catalog: &JobCatalog,
    ) -> Result<ReconcileReport, TransportError> {
        let matcher = CatalogMatcher::new(self.scanner, &self.config.ci_base_url);
        let synthesizer = IssueSynthesizer::new(self.tracker, project_id);
        let mut jobs = Vec::with_capacity(catalog.job_count());

        for entry in catalog.folders() {
            let span = info_span!("folder", folder = %entry.folder);
            let aborted = reconcile_folder(&matcher, &synthesizer, entry, &mut jobs)
                .instrument(span)
                .await?;
            if let Some(outcome) = aborted {
                return Ok(ReconcileReport { jobs, outcome });
            }
        }

        Ok(ReconcileReport {
            jobs,
            outcome: RunOutcome::Completed,
        })
    }
}

/// Processes one folder, appending to `jobs`. Returns the abort outcome when a
/// job has no matching artifact.
async fn reconcile_folder(
    matcher: &CatalogMatcher<'_>,
    synthesizer: &IssueSynthesizer<'_>,
    entry: &CatalogFolder,
    jobs: &mut Vec<JobOutcome>,
) -> Result<Option<RunOutcome>, TransportError> {
    let folder = &entry.folder;
    info!(folder = %folder, jobs = entry.jobs.len(), "Processing folder");

    let mut ordinal = JobOrdinal::first();
    for job in &entry.jobs {
        let url = matcher.resolve(folder, job);
        let Some(link) = url.as_url().map(str::to_owned) else {
            error!(
                folder = %folder,
                job = %job.name,
                "No artifact for job; aborting reconciliation"
            );
            jobs.push(JobOutcome {
                folder: folder.clone(),
                ordinal,
                job: job.name.clone(),
                url,
                submission: None,
            });
            return Ok(Some(RunOutcome::Aborted {
                folder: folder.clone(),
                job: job.name.clone(),
            }));
        };

        info!(folder = %folder, job = %job.name, ordinal = %ordinal, url = %link, "Processing job");
        let submission = synthesizer
            .synthesize_and_submit(ordinal, folder, job, &link)
            .await?;
        jobs.push(JobOutcome {
            folder: folder.clone(),
            ordinal,
            job: job.name.clone(),
            url,
            submission: Some(submission),
        });
        ordinal = ordinal.next();
    }

    Ok(None)
}
