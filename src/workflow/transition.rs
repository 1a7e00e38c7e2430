use serde::{Deserialize, Serialize};

use crate::submission::{Stage, SubmissionStatus};

/// Named, role-scoped requests to move a submission forward.
///
/// Every transition has a fixed target status; which source statuses it may
/// fire from, and as which role, is the transition table's business.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Transition {
    /// Applied implicitly when the owner creates the submission.
    Submit,
    ReviewerApprove,
    AuthorityApprove,
    Seal,
    Reject,
}

impl Transition {
    pub const ALL: [Transition; 5] = [
        Transition::Submit,
        Transition::ReviewerApprove,
        Transition::AuthorityApprove,
        Transition::Seal,
        Transition::Reject,
    ];

    /// The status this transition lands on, independent of where it fires
    /// from. A request whose target already equals the current status is a
    /// duplicate and must be treated as an idempotent replay.
    pub fn target(&self) -> SubmissionStatus {
        match self {
            Transition::Submit => SubmissionStatus::UnderReview,
            Transition::ReviewerApprove => SubmissionStatus::ReviewerApproved,
            Transition::AuthorityApprove => SubmissionStatus::AuthorityApproved,
            Transition::Seal => SubmissionStatus::Sealed,
            Transition::Reject => SubmissionStatus::Rejected,
        }
    }

    /// Stage a comment accompanying this transition is filed under.
    /// Creation carries no comment slot.
    pub fn comment_stage(&self) -> Option<Stage> {
        match self {
            Transition::Submit => None,
            Transition::ReviewerApprove => Some(Stage::Review),
            Transition::AuthorityApprove | Transition::Seal => Some(Stage::Authorization),
            // A rejection is commented at whichever stage issued it; the
            // engine resolves this from the edge it traversed.
            Transition::Reject => None,
        }
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            Transition::Submit => "submit",
            Transition::ReviewerApprove => "reviewer_approve",
            Transition::AuthorityApprove => "authority_approve",
            Transition::Seal => "seal",
            Transition::Reject => "reject",
        }
    }
}

impl std::fmt::Display for Transition {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}
