// The state machine definition. A static edge list is the single source of
// truth: the engine, the tests, and any UI all read from here.

use crate::submission::{ActorRole, Stage, SubmissionStatus};

use super::transition::Transition;

/// One allowed traversal: from `from`, the named `transition`, performed by
/// exactly `role`, lands on `to`.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Edge {
    pub from: SubmissionStatus,
    pub transition: Transition,
    pub role: ActorRole,
    pub to: SubmissionStatus,
}

impl Edge {
    const fn new(
        from: SubmissionStatus,
        transition: Transition,
        role: ActorRole,
        to: SubmissionStatus,
    ) -> Self {
        Self {
            from,
            transition,
            role,
            to,
        }
    }

    /// Stage a comment on this edge belongs to. Rejections are commented at
    /// the stage of the actor who issued them.
    pub fn comment_stage(&self) -> Option<Stage> {
        self.transition.comment_stage().or(match self.role {
            ActorRole::Reviewer => Some(Stage::Review),
            ActorRole::Authority => Some(Stage::Authorization),
            ActorRole::Owner => None,
        })
    }
}

/// Every edge of the approval pipeline. `sealed` and `rejected` have no
/// outgoing edges; a rejected record re-enters the pipeline as a new
/// submission, never by replaying this one.
pub const EDGES: [Edge; 7] = [
    Edge::new(
        SubmissionStatus::Submitted,
        Transition::Submit,
        ActorRole::Owner,
        SubmissionStatus::UnderReview,
    ),
    Edge::new(
        SubmissionStatus::UnderReview,
        Transition::ReviewerApprove,
        ActorRole::Reviewer,
        SubmissionStatus::ReviewerApproved,
    ),
    Edge::new(
        SubmissionStatus::UnderReview,
        Transition::Reject,
        ActorRole::Reviewer,
        SubmissionStatus::Rejected,
    ),
    Edge::new(
        SubmissionStatus::ReviewerApproved,
        Transition::AuthorityApprove,
        ActorRole::Authority,
        SubmissionStatus::AuthorityApproved,
    ),
    Edge::new(
        SubmissionStatus::ReviewerApproved,
        Transition::Reject,
        ActorRole::Authority,
        SubmissionStatus::Rejected,
    ),
    Edge::new(
        SubmissionStatus::AuthorityApproved,
        Transition::Seal,
        ActorRole::Authority,
        SubmissionStatus::Sealed,
    ),
    Edge::new(
        SubmissionStatus::AuthorityApproved,
        Transition::Reject,
        ActorRole::Authority,
        SubmissionStatus::Rejected,
    ),
];

/// Lookup view over [`EDGES`].
#[derive(Debug, Clone, Copy, Default)]
pub struct TransitionTable;

impl TransitionTable {
    pub fn new() -> Self {
        Self
    }

    /// The edge leaving `from` via `transition`, if the table lists one.
    pub fn edge(&self, from: SubmissionStatus, transition: Transition) -> Option<Edge> {
        EDGES
            .iter()
            .find(|e| e.from == from && e.transition == transition)
            .copied()
    }

    /// All edges leaving `from`. Empty for terminal statuses.
    pub fn outgoing(&self, from: SubmissionStatus) -> Vec<Edge> {
        EDGES.iter().filter(|e| e.from == from).copied().collect()
    }
}
