//! Issue purge: drain every issue visible to the API key before reconciling.
//!
//! Reconciliation sends no idempotency key, so re-running it on top of an
//! existing backlog would duplicate every issue. The purge removes the previous
//! run's issues first.
//!
//! ## Algorithm
//!
//! 1. List `/issues.json` page by page. The tracker's `offset`, `limit`, and
//!    `total_count` are re-read from every page; the next page starts at
//!    `offset + limit` and listing stops once that reaches `total_count`.
//! 2. Delete every collected issue sequentially. A rejected deletion is logged
//!    and the sweep moves on.
//!
//! The purge gives up without deleting anything when the first listing call is
//! rejected, when a page cannot be decoded, or when the cursor stops moving.
//! A rejected *later* page ends listing early; what was collected so far is
//! still deleted. None of these conditions fail the run.

use serde::{Deserialize, Serialize};
use tracing::{info, instrument, warn};

use crate::{IssueId, IssuePage, PurgeAbort, TrackerClient, TransportError};

const ISSUES_PATH: &str = "/issues.json";

/// A deletion the tracker refused.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct DeleteFailure {
    /// Issue that could not be deleted.
    pub issue_id: IssueId,
    /// Status returned by the tracker.
    pub status: u16,
    /// Raw response body.
    pub body: String,
}

/// What the purge did.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct PurgeReport {
    /// Number of issues collected from the listing.
    pub fetched: usize,
    /// Issues deleted, in deletion order.
    pub deleted: Vec<IssueId>,
    /// Issues the tracker refused to delete, in deletion order.
    pub failed: Vec<DeleteFailure>,
    /// Set when the purge stopped before deleting anything.
    pub aborted: Option<PurgeAbort>,
}

impl PurgeReport {
    fn aborted(reason: PurgeAbort) -> Self {
        Self {
            aborted: Some(reason),
            ..Self::default()
        }
    }

    /// Number of issues successfully deleted.
    pub fn deleted_count(&self) -> usize {
        self.deleted.len()
    }
}

enum ListingFailure {
    Transport(TransportError),
    Abort(PurgeAbort),
}

impl From<TransportError> for ListingFailure {
    fn from(err: TransportError) -> Self {
        Self::Transport(err)
    }
}

impl From<PurgeAbort> for ListingFailure {
    fn from(reason: PurgeAbort) -> Self {
        Self::Abort(reason)
    }
}

/// Deletes every issue the tracker lists.
pub struct IssuePurger<'a> {
    client: &'a dyn TrackerClient,
}

impl<'a> IssuePurger<'a> {
    /// Creates a purger over `client`.
    pub fn new(client: &'a dyn TrackerClient) -> Self {
        Self { client }
    }

    /// Lists and deletes every issue.
    ///
    /// Only a transport failure is returned as `Err`. Tracker rejections and
    /// pagination faults are reported in the returned [`PurgeReport`].
    #[instrument(name = "purge", skip(self))]
    pub async fn drain_all_issues(&self) -> Result<PurgeReport, TransportError> {
        let issue_ids = match self.collect_issue_ids().await {
            Ok(ids) => ids,
            Err(ListingFailure::Transport(err)) => return Err(err),
            Err(ListingFailure::Abort(reason)) => {
                warn!(reason = %reason, "Issue purge aborted before deleting anything");
                return Ok(PurgeReport::aborted(reason));
            }
        };

        info!(fetched = issue_ids.len(), "Total issues fetched");

        let mut report = PurgeReport {
            fetched: issue_ids.len(),
            ..PurgeReport::default()
        };
        for issue_id in issue_ids {
            let response = self
                .client
                .delete(&format!("/issues/{issue_id}.json"))
                .await?;
            if matches!(response.status, 200 | 204) {
                info!(issue_id = %issue_id, "Issue deleted");
                report.deleted.push(issue_id);
            } else {
                warn!(
                    issue_id = %issue_id,
                    status = response.status,
                    body = %response.body,
                    "Failed to delete issue"
                );
                report.failed.push(DeleteFailure {
                    issue_id,
                    status: response.status,
                    body: response.body,
                });
            }
        }

        info!(
            deleted = report.deleted.len(),
            failed = report.failed.len(),
            "Issue purge finished"
        );
        Ok(report)
    }

    async fn collect_issue_ids(&self) -> Result<Vec<IssueId>, ListingFailure> {
        let mut response = self.client.get(ISSUES_PATH, &[]).await?;
        if !response.is_success() {
            return Err(PurgeAbort::ListingRejected {
                status: response.status,
                body: response.body,
            }
            .into());
        }

        let mut ids = Vec::new();
        let mut requested_offset = 0;
        loop {
            let page: IssuePage =
                serde_json::from_str(&response.body).map_err(|e| PurgeAbort::MalformedPage {
                    message: e.to_string(),
                })?;
            ids.extend(page.issues.iter().map(|issue| issue.id));

            let next_offset = page.offset.saturating_add(page.limit);
            if next_offset >= page.total_count {
                break;
            }
            if next_offset <= requested_offset {
                return Err(PurgeAbort::PaginationNonProgress {
                    offset: page.offset,
                    limit: page.limit,
                }
                .into());
            }

            requested_offset = next_offset;
            response = self
                .client
                .get(ISSUES_PATH, &[("offset", next_offset.to_string())])
                .await?;
            if !response.is_success() {
                warn!(
                    offset = next_offset,
                    status = response.status,
                    body = %response.body,
                    "Issue listing page rejected; deleting the issues collected so far"
                );
                break;
            }
        }
        Ok(ids)
    }
}
