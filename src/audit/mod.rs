// Append-only ledger of committed transitions. The source of truth for
// "what happened, by whom, when"; nothing here is ever edited or deleted.

use std::sync::Arc;

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use thiserror::Error;
use tokio::sync::RwLock;
use uuid::Uuid;

use crate::submission::{ActorRole, SubmissionId, SubmissionStatus};
use crate::workflow::Transition;

/// One committed transition. Exactly one entry exists per status mutation.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct AuditEntry {
    pub id: Uuid,
    pub submission_id: SubmissionId,
    pub actor_id: String,
    pub actor_role: ActorRole,
    pub transition: Transition,
    pub from_status: SubmissionStatus,
    pub to_status: SubmissionStatus,
    pub comment: Option<String>,
    pub recorded_at: DateTime<Utc>,
}

impl AuditEntry {
    #[allow(clippy::too_many_arguments)]
    pub fn new(
        submission_id: SubmissionId,
        actor_id: &str,
        actor_role: ActorRole,
        transition: Transition,
        from_status: SubmissionStatus,
        to_status: SubmissionStatus,
        comment: Option<String>,
    ) -> Self {
        Self {
            id: Uuid::new_v4(),
            submission_id,
            actor_id: actor_id.to_string(),
            actor_role,
            transition,
            from_status,
            to_status,
            comment,
            recorded_at: Utc::now(),
        }
    }
}

#[derive(Debug, Error)]
pub enum AuditError {
    #[error("audit backend failure: {0}")]
    Backend(String),
}

/// Append never fails silently: a failure here aborts the transition before
/// it is considered committed.
#[async_trait]
pub trait AuditLog: Send + Sync {
    async fn append(&self, entry: AuditEntry) -> Result<(), AuditError>;

    /// Entries for one submission, in commit order. This is the submission's
    /// `history` view.
    async fn entries_for(&self, submission_id: SubmissionId) -> Vec<AuditEntry>;

    /// Most recent entries across all submissions, newest first.
    async fn recent(&self, limit: usize) -> Vec<AuditEntry>;
}

#[derive(Debug, Default)]
pub struct InMemoryAuditLog {
    entries: RwLock<Vec<AuditEntry>>,
}

impl InMemoryAuditLog {
    pub fn new() -> Arc<Self> {
        Arc::new(Self::default())
    }

    pub async fn len(&self) -> usize {
        self.entries.read().await.len()
    }

    pub async fn is_empty(&self) -> bool {
        self.entries.read().await.is_empty()
    }
}

#[async_trait]
impl AuditLog for InMemoryAuditLog {
    async fn append(&self, entry: AuditEntry) -> Result<(), AuditError> {
        tracing::debug!(
            submission_id = %entry.submission_id,
            actor_id = %entry.actor_id,
            transition = %entry.transition,
            from_status = %entry.from_status,
            to_status = %entry.to_status,
            "Audit entry appended"
        );
        self.entries.write().await.push(entry);
        Ok(())
    }

    async fn entries_for(&self, submission_id: SubmissionId) -> Vec<AuditEntry> {
        self.entries
            .read()
            .await
            .iter()
            .filter(|e| e.submission_id == submission_id)
            .cloned()
            .collect()
    }

    async fn recent(&self, limit: usize) -> Vec<AuditEntry> {
        let entries = self.entries.read().await;
        entries.iter().rev().take(limit).cloned().collect()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn entry(submission_id: SubmissionId) -> AuditEntry {
        AuditEntry::new(
            submission_id,
            "sup-1",
            ActorRole::Reviewer,
            Transition::ReviewerApprove,
            SubmissionStatus::UnderReview,
            SubmissionStatus::ReviewerApproved,
            None,
        )
    }

    #[tokio::test]
    async fn entries_are_scoped_by_submission_and_ordered() {
        let log = InMemoryAuditLog::new();
        let a = SubmissionId::new();
        let b = SubmissionId::new();

        log.append(entry(a)).await.unwrap();
        log.append(entry(b)).await.unwrap();
        log.append(entry(a)).await.unwrap();

        let for_a = log.entries_for(a).await;
        assert_eq!(for_a.len(), 2);
        assert!(for_a[0].recorded_at <= for_a[1].recorded_at);
        assert_eq!(log.entries_for(b).await.len(), 1);
        assert_eq!(log.len().await, 3);
    }

    #[tokio::test]
    async fn recent_returns_newest_first() {
        let log = InMemoryAuditLog::new();
        let a = SubmissionId::new();
        let b = SubmissionId::new();
        log.append(entry(a)).await.unwrap();
        log.append(entry(b)).await.unwrap();

        let recent = log.recent(1).await;
        assert_eq!(recent.len(), 1);
        assert_eq!(recent[0].submission_id, b);
    }
}
