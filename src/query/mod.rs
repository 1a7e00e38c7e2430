// Read-only projections for list and detail views. Reads take point-in-time
// snapshots and never block in-flight transitions; every returned record
// reflects its latest committed status.

use std::sync::Arc;

use crate::audit::{AuditEntry, AuditLog};
use crate::store::RecordStore;
use crate::submission::{ActorRole, Submission, SubmissionId, SubmissionStatus};

pub struct ReadView {
    store: Arc<dyn RecordStore>,
    audit: Arc<dyn AuditLog>,
}

impl ReadView {
    pub fn new(store: Arc<dyn RecordStore>, audit: Arc<dyn AuditLog>) -> Self {
        Self { store, audit }
    }

    pub async fn get(&self, id: SubmissionId) -> Option<Submission> {
        self.store.get(id).await
    }

    /// Submissions visible to `actor_id` acting as `role_scope`, newest
    /// first. Owners see their own records, reviewers the queue addressed
    /// to their email, the authority everything.
    pub async fn list_by_actor(
        &self,
        actor_id: &str,
        role_scope: ActorRole,
        status_filter: Option<SubmissionStatus>,
    ) -> Vec<Submission> {
        let mut visible: Vec<Submission> = self
            .store
            .list_all()
            .await
            .into_iter()
            .filter(|s| match role_scope {
                ActorRole::Owner => s.owner_id == actor_id,
                ActorRole::Reviewer => s.payload.supervisor_email == actor_id,
                ActorRole::Authority => true,
            })
            .filter(|s| status_filter.map(|f| s.status == f).unwrap_or(true))
            .collect();
        visible.sort_by(|a, b| b.submitted_at.cmp(&a.submitted_at));
        visible
    }

    /// The submission's history: its audit entries in commit order.
    pub async fn history(&self, id: SubmissionId) -> Vec<AuditEntry> {
        self.audit.entries_for(id).await
    }
}
