use thiserror::Error;

use crate::submission::{ActorRole, SubmissionId, SubmissionStatus};

use super::transition::Transition;

/// Everything a transition attempt can fail with. Each variant carries the
/// specific reason so callers can surface it verbatim.
#[derive(Debug, Error)]
pub enum WorkflowError {
    #[error("submission {id} not found")]
    NotFound { id: SubmissionId },

    #[error("role {role} is not permitted to perform {transition}")]
    Forbidden {
        role: ActorRole,
        transition: Transition,
    },

    #[error("no {transition} transition out of status {from}")]
    InvalidTransition {
        from: SubmissionStatus,
        transition: Transition,
    },

    /// Compare-and-set lost the race. Retried internally a bounded number of
    /// times; surfaced only once the retry limit is exhausted.
    #[error("transition on {id} lost the commit race after {attempts} attempts")]
    ConflictRetry { id: SubmissionId, attempts: u32 },

    /// External sealing collaborator failed. Status unchanged, retryable.
    #[error("sealing failed for {id}: {reason}")]
    SealingFailed { id: SubmissionId, reason: String },

    /// The audit append failed; the store mutation was rolled back. The
    /// engine never reports success without a durable audit entry.
    #[error("audit write failed for {id}: {reason}")]
    AuditWriteFailed { id: SubmissionId, reason: String },

    /// Record store backend fault outside the compare-and-set race.
    #[error("storage failure: {reason}")]
    Storage { reason: String },
}
