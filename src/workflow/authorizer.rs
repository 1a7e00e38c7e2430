// Role authorization, decoupled from the transition table: a pure, total
// lookup answering "may this role ever request this transition". The table
// then decides whether the specific edge is theirs.

use crate::submission::ActorRole;

use super::transition::Transition;

/// Fails closed: any pair not listed below is denied.
pub fn authorize(role: ActorRole, transition: Transition) -> bool {
    matches!(
        (role, transition),
        (ActorRole::Owner, Transition::Submit)
            | (ActorRole::Reviewer, Transition::ReviewerApprove)
            | (ActorRole::Reviewer, Transition::Reject)
            | (ActorRole::Authority, Transition::AuthorityApprove)
            | (ActorRole::Authority, Transition::Seal)
            | (ActorRole::Authority, Transition::Reject)
    )
}

#[cfg(test)]
mod tests {
    use super::*;

    // The full role x transition cross-product, pinned down pair by pair.
    #[test]
    fn exhaustive_cross_product() {
        let allowed: &[(ActorRole, Transition)] = &[
            (ActorRole::Owner, Transition::Submit),
            (ActorRole::Reviewer, Transition::ReviewerApprove),
            (ActorRole::Reviewer, Transition::Reject),
            (ActorRole::Authority, Transition::AuthorityApprove),
            (ActorRole::Authority, Transition::Seal),
            (ActorRole::Authority, Transition::Reject),
        ];

        for role in ActorRole::ALL {
            for transition in Transition::ALL {
                let expected = allowed.contains(&(role, transition));
                assert_eq!(
                    authorize(role, transition),
                    expected,
                    "authorize({role}, {transition})"
                );
            }
        }
    }

    #[test]
    fn owner_cannot_decide_any_stage() {
        assert!(!authorize(ActorRole::Owner, Transition::ReviewerApprove));
        assert!(!authorize(ActorRole::Owner, Transition::AuthorityApprove));
        assert!(!authorize(ActorRole::Owner, Transition::Seal));
        assert!(!authorize(ActorRole::Owner, Transition::Reject));
    }

    #[test]
    fn only_the_authority_seals() {
        assert!(authorize(ActorRole::Authority, Transition::Seal));
        assert!(!authorize(ActorRole::Reviewer, Transition::Seal));
        assert!(!authorize(ActorRole::Owner, Transition::Seal));
    }
}
