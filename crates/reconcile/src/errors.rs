//! Error types for the reconciliation domain.
//!
//! Only one condition leaves an operation through `Err`: a [`TransportError`],
//! meaning the tracker could not be reached at all. Nothing in the domain
//! handles it; it ends the run.
//!
//! Everything else (tracker rejections, purge aborts, unmatched jobs) is a
//! *reported* outcome carried in the operation's return value, so callers can
//! observe it without the process terminating.
//!
//! [`PurgeAbort`] lists the reasons the purge gives up before deleting
//! anything. It is returned inside [`crate::PurgeReport`], not as an error.

use serde::{Deserialize, Serialize};
use thiserror::Error;

/// An HTTP call to the tracker could not complete.
///
/// Produced by [`crate::TrackerClient`] implementations for connection,
/// TLS, and body-read failures. A non-2xx status is **not** a transport error.
#[derive(Debug, Clone, Error, PartialEq, Eq)]
#[error("Tracker request {method} {path} failed: {message}")]
pub struct TransportError {
    /// HTTP method of the failed call.
    pub method: String,
    /// Path relative to the tracker base URL.
    pub path: String,
    /// Description of the underlying failure.
    pub message: String,
}

impl TransportError {
    /// Creates a transport error for `method path`.
    pub fn new(
        method: impl Into<String>,
        path: impl Into<String>,
        message: impl Into<String>,
    ) -> Self {
        Self {
            method: method.into(),
            path: path.into(),
            message: message.into(),
        }
    }
}

/// Why the issue purge stopped before deleting anything.
#[derive(Debug, Clone, Error, PartialEq, Eq, Serialize, Deserialize)]
pub enum PurgeAbort {
    /// The first listing call was rejected by the tracker.
    #[error("Issue listing rejected with status {status}: {body}")]
    ListingRejected {
        /// HTTP status returned by the tracker.
        status: u16,
        /// Raw response body.
        body: String,
    },

    /// A page reported an offset/limit that does not move the cursor forward.
    ///
    /// Guards against looping forever when the tracker reports `limit = 0`.
    #[error("Issue pagination did not advance past offset {offset} (limit {limit})")]
    PaginationNonProgress {
        /// Offset reported by the offending page.
        offset: u64,
        /// Limit reported by the offending page.
        limit: u64,
    },

    /// A listing body could not be decoded as an issue page.
    #[error("Issue listing page could not be decoded: {message}")]
    MalformedPage {
        /// Decoder error message.
        message: String,
    },
}

/// Errors that end a run before it produces a [`crate::RunReport`].
///
/// An unmatched job is **not** one of these: it is reported as
/// [`crate::RunOutcome::Aborted`] so callers can inspect what was done first.
#[derive(Debug, Clone, Error, PartialEq, Eq)]
pub enum RunError {
    /// The tracker could not be reached.
    #[error(transparent)]
    Transport(#[from] TransportError),
}
