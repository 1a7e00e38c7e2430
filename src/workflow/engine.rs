// Workflow engine: loads the submission under a per-id lock, authorizes the
// actor, applies the transition table, commits via compare-and-set, writes
// the audit entry, and emits the notification. All transition attempts for
// one submission are serialized; attempts on different ids run in parallel.

use std::collections::HashMap;
use std::sync::Arc;

use chrono::Utc;
use tokio::sync::Mutex;
use tracing::{info, warn, Instrument};

use crate::audit::{AuditEntry, AuditLog};
use crate::notify::{NotificationDispatcher, TransitionEvent};
use crate::seal::SealingService;
use crate::store::RecordStore;
use crate::submission::{ActorRole, Submission, SubmissionId, SubmissionPayload, SubmissionStatus};
use crate::telemetry::{create_transition_span, generate_correlation_id};

use super::authorizer::authorize;
use super::errors::WorkflowError;
use super::table::TransitionTable;
use super::transition::Transition;

const DEFAULT_CAS_RETRY_LIMIT: u32 = 3;

/// One transition attempt as received from a caller.
#[derive(Debug, Clone)]
pub struct TransitionRequest {
    pub submission_id: SubmissionId,
    pub actor_id: String,
    pub actor_role: ActorRole,
    pub transition: Transition,
    pub comment: Option<String>,
}

/// Result of a successful attempt. `applied_now` is false for an idempotent
/// replay: the submission already sat at the requested target, so nothing
/// was mutated, audited, or notified.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct TransitionOutcome {
    pub new_status: SubmissionStatus,
    pub applied_now: bool,
}

pub struct WorkflowEngine {
    store: Arc<dyn RecordStore>,
    audit: Arc<dyn AuditLog>,
    sealer: Arc<dyn SealingService>,
    dispatcher: Arc<dyn NotificationDispatcher>,
    table: TransitionTable,
    cas_retry_limit: u32,
    // Per-submission mutual exclusion. Entries are tiny and keyed by id, so
    // the map is left to grow with the set of touched submissions.
    locks: Mutex<HashMap<SubmissionId, Arc<Mutex<()>>>>,
}

impl WorkflowEngine {
    pub fn new(
        store: Arc<dyn RecordStore>,
        audit: Arc<dyn AuditLog>,
        sealer: Arc<dyn SealingService>,
        dispatcher: Arc<dyn NotificationDispatcher>,
    ) -> Self {
        Self {
            store,
            audit,
            sealer,
            dispatcher,
            table: TransitionTable::new(),
            cas_retry_limit: DEFAULT_CAS_RETRY_LIMIT,
            locks: Mutex::new(HashMap::new()),
        }
    }

    pub fn with_cas_retry_limit(mut self, limit: u32) -> Self {
        self.cas_retry_limit = limit.max(1);
        self
    }

    async fn lock_for(&self, id: SubmissionId) -> Arc<Mutex<()>> {
        let mut locks = self.locks.lock().await;
        locks
            .entry(id)
            .or_insert_with(|| Arc::new(Mutex::new(())))
            .clone()
    }

    /// Create a submission for `owner_id`. The `submitted -> under_review`
    /// hop is applied implicitly here: the stored record is already in the
    /// reviewer's queue, and the creation audit entry records the hop.
    pub async fn create_submission(
        &self,
        owner_id: &str,
        payload: SubmissionPayload,
    ) -> Result<Submission, WorkflowError> {
        let submission = Submission::new(owner_id.to_string(), payload);
        self.persist_new(submission, owner_id).await
    }

    /// Re-enter the pipeline after a rejection. The rejected record keeps
    /// its identity and terminal status; the retry is a new submission
    /// referencing it.
    pub async fn resubmit(
        &self,
        original_id: SubmissionId,
        owner_id: &str,
        payload: SubmissionPayload,
    ) -> Result<Submission, WorkflowError> {
        let original = self
            .store
            .get(original_id)
            .await
            .ok_or(WorkflowError::NotFound { id: original_id })?;

        if original.owner_id != owner_id {
            return Err(WorkflowError::Forbidden {
                role: ActorRole::Owner,
                transition: Transition::Submit,
            });
        }
        if original.status != SubmissionStatus::Rejected {
            return Err(WorkflowError::InvalidTransition {
                from: original.status,
                transition: Transition::Submit,
            });
        }

        let mut submission = Submission::new(owner_id.to_string(), payload);
        submission.resubmission_of = Some(original_id);
        self.persist_new(submission, owner_id).await
    }

    async fn persist_new(
        &self,
        submission: Submission,
        owner_id: &str,
    ) -> Result<Submission, WorkflowError> {
        let correlation_id = generate_correlation_id();
        let span = create_transition_span(
            "create_submission",
            Some(&submission.id.to_string()),
            Some(owner_id),
            Some(&correlation_id),
        );

        async {
            self.store
                .insert(submission.clone())
                .await
                .map_err(|e| WorkflowError::Storage {
                    reason: e.to_string(),
                })?;

            let entry = AuditEntry::new(
                submission.id,
                owner_id,
                ActorRole::Owner,
                Transition::Submit,
                SubmissionStatus::Submitted,
                SubmissionStatus::UnderReview,
                None,
            );
            if let Err(e) = self.audit.append(entry).await {
                // No record without its audit entry: unwind the insert.
                let _ = self.store.remove(submission.id).await;
                return Err(WorkflowError::AuditWriteFailed {
                    id: submission.id,
                    reason: e.to_string(),
                });
            }

            self.emit_best_effort(TransitionEvent::for_transition(
                &submission,
                Transition::Submit,
                SubmissionStatus::Submitted,
                None,
            ))
            .await;

            info!(
                submission_id = %submission.id,
                owner_id = %submission.owner_id,
                resubmission_of = ?submission.resubmission_of,
                "Submission created and queued for review"
            );
            Ok(submission)
        }
        .instrument(span)
        .await
    }

    /// Apply one named transition. See the module docs for the ordering
    /// guarantees; the short version: validate on the freshest committed
    /// status, seal before commit, audit with commit, notify after.
    pub async fn apply_transition(
        &self,
        request: TransitionRequest,
    ) -> Result<TransitionOutcome, WorkflowError> {
        let correlation_id = generate_correlation_id();
        let span = create_transition_span(
            request.transition.as_str(),
            Some(&request.submission_id.to_string()),
            Some(&request.actor_id),
            Some(&correlation_id),
        );

        let lock = self.lock_for(request.submission_id).await;
        async {
            let _guard = lock.lock().await;
            let mut attempts = 0;
            loop {
                match self.try_apply(&request).await? {
                    ApplyStep::Done(outcome) => return Ok(outcome),
                    ApplyStep::LostRace => {
                        attempts += 1;
                        if attempts >= self.cas_retry_limit {
                            return Err(WorkflowError::ConflictRetry {
                                id: request.submission_id,
                                attempts,
                            });
                        }
                        warn!(
                            submission_id = %request.submission_id,
                            attempts = attempts,
                            "Compare-and-set lost the race, reloading"
                        );
                    }
                }
            }
        }
        .instrument(span)
        .await
    }

    async fn try_apply(&self, request: &TransitionRequest) -> Result<ApplyStep, WorkflowError> {
        let submission = self
            .store
            .get(request.submission_id)
            .await
            .ok_or(WorkflowError::NotFound {
                id: request.submission_id,
            })?;
        let current = submission.status;
        let target = request.transition.target();

        // Terminal states admit only an idempotent replay of themselves.
        if current.is_terminal() && current != target {
            return Err(WorkflowError::InvalidTransition {
                from: current,
                transition: request.transition,
            });
        }

        if !authorize(request.actor_role, request.transition) {
            return Err(WorkflowError::Forbidden {
                role: request.actor_role,
                transition: request.transition,
            });
        }

        // Duplicate request carrying the already-applied target: succeed
        // without mutation, audit entry, or notification.
        if current == target {
            return Ok(ApplyStep::Done(TransitionOutcome {
                new_status: current,
                applied_now: false,
            }));
        }

        let edge = self.table.edge(current, request.transition).ok_or(
            WorkflowError::InvalidTransition {
                from: current,
                transition: request.transition,
            },
        )?;
        if edge.role != request.actor_role {
            return Err(WorkflowError::Forbidden {
                role: request.actor_role,
                transition: request.transition,
            });
        }

        // Sealing happens before the commit so a failure leaves the status
        // unchanged and the request retryable. The per-submission lock makes
        // the call single-flight; the service resolves replays to the
        // original reference.
        let seal_ref = if target == SubmissionStatus::Sealed {
            let digest = submission.payload.digest();
            let seal_ref = self
                .sealer
                .seal(submission.id, &digest)
                .await
                .map_err(|e| WorkflowError::SealingFailed {
                    id: submission.id,
                    reason: e.to_string(),
                })?;
            Some(seal_ref)
        } else {
            None
        };

        let now = Utc::now();
        let mut updated = submission.clone();
        updated.status = target;
        updated.updated_at = now;
        match target {
            SubmissionStatus::ReviewerApproved => updated.reviewed_at = Some(now),
            SubmissionStatus::AuthorityApproved => updated.approved_at = Some(now),
            SubmissionStatus::Sealed => {
                updated.sealed_at = Some(now);
                updated.seal_ref = seal_ref;
            }
            _ => {}
        }
        if let (Some(text), Some(stage)) = (&request.comment, edge.comment_stage()) {
            updated.comments.append(stage, text);
        }

        let swapped = self
            .store
            .compare_and_set(request.submission_id, current, updated.clone())
            .await
            .map_err(|e| WorkflowError::Storage {
                reason: e.to_string(),
            })?;
        if !swapped {
            return Ok(ApplyStep::LostRace);
        }

        let entry = AuditEntry::new(
            request.submission_id,
            &request.actor_id,
            request.actor_role,
            request.transition,
            current,
            target,
            request.comment.clone(),
        );
        if let Err(e) = self.audit.append(entry).await {
            // The audit write is the durability boundary: without it the
            // transition is not committed, so put the old record back.
            let _ = self
                .store
                .compare_and_set(request.submission_id, target, submission.clone())
                .await;
            return Err(WorkflowError::AuditWriteFailed {
                id: request.submission_id,
                reason: e.to_string(),
            });
        }

        self.emit_best_effort(TransitionEvent::for_transition(
            &updated,
            request.transition,
            current,
            request.comment.clone(),
        ))
        .await;

        info!(
            submission_id = %request.submission_id,
            actor_id = %request.actor_id,
            actor_role = %request.actor_role,
            transition = %request.transition,
            from_status = %current,
            to_status = %target,
            "Transition committed"
        );

        Ok(ApplyStep::Done(TransitionOutcome {
            new_status: target,
            applied_now: true,
        }))
    }

    async fn emit_best_effort(&self, event: TransitionEvent) {
        if let Err(e) = self.dispatcher.emit(event).await {
            warn!(error = %e, "Notification emission failed, dropping event");
        }
    }
}

enum ApplyStep {
    Done(TransitionOutcome),
    LostRace,
}

impl std::fmt::Debug for WorkflowEngine {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("WorkflowEngine")
            .field("table", &self.table)
            .field("cas_retry_limit", &self.cas_retry_limit)
            .finish()
    }
}
