//! Concurrency guarantees: transition attempts on one submission are
//! serialized, duplicate storms collapse into a single commit, and the
//! sealing call stays single-flight no matter how many callers race it.

mod common;

use common::{harness, payload, payload_for};
use paper_trail::audit::AuditLog;
use paper_trail::store::RecordStore;
use paper_trail::submission::{ActorRole, SubmissionId, SubmissionStatus};
use paper_trail::workflow::{Transition, TransitionRequest};

fn seal_request(id: SubmissionId) -> TransitionRequest {
    TransitionRequest {
        submission_id: id,
        actor_id: "dept-admin".to_string(),
        actor_role: ActorRole::Authority,
        transition: Transition::Seal,
        comment: None,
    }
}

#[tokio::test]
async fn hundred_concurrent_seal_requests_invoke_sealing_once() {
    let h = harness();
    let submission = h.engine.create_submission("student-1", payload()).await.unwrap();

    for (role, actor, transition) in [
        (
            ActorRole::Reviewer,
            "jane.wilson@techcorp.com",
            Transition::ReviewerApprove,
        ),
        (ActorRole::Authority, "dept-admin", Transition::AuthorityApprove),
    ] {
        h.engine
            .apply_transition(TransitionRequest {
                submission_id: submission.id,
                actor_id: actor.to_string(),
                actor_role: role,
                transition,
                comment: None,
            })
            .await
            .unwrap();
    }

    let mut handles = Vec::new();
    for _ in 0..100 {
        let engine = h.engine.clone();
        let request = seal_request(submission.id);
        handles.push(tokio::spawn(async move {
            engine.apply_transition(request).await
        }));
    }

    let outcomes = futures::future::join_all(handles).await;
    let mut applied = 0;
    let mut replayed = 0;
    for joined in outcomes {
        let outcome = joined.unwrap().unwrap();
        assert_eq!(outcome.new_status, SubmissionStatus::Sealed);
        if outcome.applied_now {
            applied += 1;
        } else {
            replayed += 1;
        }
    }
    assert_eq!(applied, 1);
    assert_eq!(replayed, 99);

    // One sealing call ever, one seal ref, one audit entry for the seal.
    assert_eq!(h.sealer.call_count(), 1);
    assert_eq!(h.sealer.sealed_count().await, 1);
    let seals = h
        .audit
        .entries_for(submission.id)
        .await
        .into_iter()
        .filter(|e| e.transition == Transition::Seal)
        .count();
    assert_eq!(seals, 1);
}

#[tokio::test]
async fn concurrent_rejects_commit_exactly_once() {
    let h = harness();
    let submission = h.engine.create_submission("student-1", payload()).await.unwrap();

    let mut handles = Vec::new();
    for _ in 0..2 {
        let engine = h.engine.clone();
        let id = submission.id;
        handles.push(tokio::spawn(async move {
            engine
                .apply_transition(TransitionRequest {
                    submission_id: id,
                    actor_id: "jane.wilson@techcorp.com".to_string(),
                    actor_role: ActorRole::Reviewer,
                    transition: Transition::Reject,
                    comment: None,
                })
                .await
        }));
    }

    let outcomes: Vec<_> = futures::future::join_all(handles)
        .await
        .into_iter()
        .map(|j| j.unwrap().unwrap())
        .collect();

    let applied = outcomes.iter().filter(|o| o.applied_now).count();
    assert_eq!(applied, 1);
    for outcome in &outcomes {
        assert_eq!(outcome.new_status, SubmissionStatus::Rejected);
    }

    // Creation plus one reject; the losing duplicate left no trace.
    assert_eq!(h.audit.entries_for(submission.id).await.len(), 2);

    // One rejection notification to the owner, not two.
    let owner_events = h
        .dispatcher
        .events()
        .await
        .into_iter()
        .filter(|e| e.transition == Transition::Reject)
        .count();
    assert_eq!(owner_events, 1);
}

#[tokio::test]
async fn distinct_submissions_progress_in_parallel() {
    let h = harness();

    let mut handles = Vec::new();
    for i in 0..8 {
        let engine = h.engine.clone();
        handles.push(tokio::spawn(async move {
            let owner = format!("student-{i}");
            let supervisor = format!("supervisor-{i}@example.com");
            let submission = engine
                .create_submission(&owner, payload_for(&supervisor))
                .await
                .unwrap();
            engine
                .apply_transition(TransitionRequest {
                    submission_id: submission.id,
                    actor_id: supervisor,
                    actor_role: ActorRole::Reviewer,
                    transition: Transition::ReviewerApprove,
                    comment: None,
                })
                .await
                .unwrap();
            submission.id
        }));
    }

    for joined in futures::future::join_all(handles).await {
        let id = joined.unwrap();
        let stored = h.store.get(id).await.unwrap();
        assert_eq!(stored.status, SubmissionStatus::ReviewerApproved);
        assert_eq!(h.audit.entries_for(id).await.len(), 2);
    }
}
