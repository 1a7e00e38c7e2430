use serde::{Deserialize, Serialize};

/// Pipeline statuses for an internship record.
///
/// `Submitted` exists only as the from-status of the creation audit entry;
/// a stored submission is observable from `UnderReview` onwards. `Sealed`
/// and `Rejected` are terminal: no outgoing edges, ever.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum SubmissionStatus {
    Submitted,
    UnderReview,
    ReviewerApproved,
    AuthorityApproved,
    Sealed,
    Rejected,
}

impl SubmissionStatus {
    pub const ALL: [SubmissionStatus; 6] = [
        SubmissionStatus::Submitted,
        SubmissionStatus::UnderReview,
        SubmissionStatus::ReviewerApproved,
        SubmissionStatus::AuthorityApproved,
        SubmissionStatus::Sealed,
        SubmissionStatus::Rejected,
    ];

    pub fn is_terminal(&self) -> bool {
        matches!(self, SubmissionStatus::Sealed | SubmissionStatus::Rejected)
    }

    /// Wire name, matching the serde representation.
    pub fn as_str(&self) -> &'static str {
        match self {
            SubmissionStatus::Submitted => "submitted",
            SubmissionStatus::UnderReview => "under_review",
            SubmissionStatus::ReviewerApproved => "reviewer_approved",
            SubmissionStatus::AuthorityApproved => "authority_approved",
            SubmissionStatus::Sealed => "sealed",
            SubmissionStatus::Rejected => "rejected",
        }
    }

    /// Human-facing label. UI layers must use this lookup instead of
    /// re-deriving labels from the wire name.
    pub fn display_label(&self) -> &'static str {
        match self {
            SubmissionStatus::Submitted => "Submitted",
            SubmissionStatus::UnderReview => "Under Review",
            SubmissionStatus::ReviewerApproved => "Approved by Reviewer",
            SubmissionStatus::AuthorityApproved => "Approved by Department",
            SubmissionStatus::Sealed => "Sealed",
            SubmissionStatus::Rejected => "Rejected",
        }
    }

    /// Position along the pipeline. Terminal statuses rank above every
    /// intermediate one so committed transitions are strictly increasing.
    pub fn rank(&self) -> u8 {
        match self {
            SubmissionStatus::Submitted => 0,
            SubmissionStatus::UnderReview => 1,
            SubmissionStatus::ReviewerApproved => 2,
            SubmissionStatus::AuthorityApproved => 3,
            SubmissionStatus::Sealed => 4,
            SubmissionStatus::Rejected => 5,
        }
    }
}

impl std::fmt::Display for SubmissionStatus {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn terminal_statuses() {
        assert!(SubmissionStatus::Sealed.is_terminal());
        assert!(SubmissionStatus::Rejected.is_terminal());
        for status in [
            SubmissionStatus::Submitted,
            SubmissionStatus::UnderReview,
            SubmissionStatus::ReviewerApproved,
            SubmissionStatus::AuthorityApproved,
        ] {
            assert!(!status.is_terminal(), "{status} must not be terminal");
        }
    }

    #[test]
    fn wire_names_round_trip_through_serde() {
        for status in SubmissionStatus::ALL {
            let json = serde_json::to_string(&status).unwrap();
            assert_eq!(json, format!("\"{}\"", status.as_str()));
            let back: SubmissionStatus = serde_json::from_str(&json).unwrap();
            assert_eq!(back, status);
        }
    }

    #[test]
    fn every_status_has_a_distinct_label() {
        let labels: std::collections::HashSet<_> = SubmissionStatus::ALL
            .iter()
            .map(|s| s.display_label())
            .collect();
        assert_eq!(labels.len(), SubmissionStatus::ALL.len());
    }
}
