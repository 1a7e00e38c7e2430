// Notification contract: one event per committed transition, fire and
// forget. Delivery is best-effort; a dispatch failure is logged and dropped,
// never blocking or reversing the transition that produced it.

use std::sync::Arc;

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use thiserror::Error;
use tokio::sync::RwLock;
use uuid::Uuid;

use crate::submission::{ActorRole, Submission, SubmissionId, SubmissionStatus};
use crate::workflow::Transition;

/// Event describing one committed transition, addressed to the actor whose
/// stage it unblocks.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TransitionEvent {
    pub recipient_role: ActorRole,
    /// Owner id for owner-directed events, the payload's supervisor email
    /// for reviewer-directed ones; the authority inbox is role-wide.
    pub recipient_id: Option<String>,
    pub submission_id: SubmissionId,
    pub transition: Transition,
    pub from_status: SubmissionStatus,
    pub to_status: SubmissionStatus,
    pub comment: Option<String>,
}

impl TransitionEvent {
    /// Who a committed transition unblocks. Creation lands in the reviewer's
    /// queue; reviewer decisions and the final seal go back to the owner;
    /// the authority is told its own next stage (the seal) is ready.
    pub fn for_transition(
        submission: &Submission,
        transition: Transition,
        from_status: SubmissionStatus,
        comment: Option<String>,
    ) -> Self {
        let (recipient_role, recipient_id) = match transition {
            Transition::Submit => (
                ActorRole::Reviewer,
                Some(submission.payload.supervisor_email.clone()),
            ),
            Transition::ReviewerApprove | Transition::Seal | Transition::Reject => {
                (ActorRole::Owner, Some(submission.owner_id.clone()))
            }
            Transition::AuthorityApprove => (ActorRole::Authority, None),
        };
        Self {
            recipient_role,
            recipient_id,
            submission_id: submission.id,
            transition,
            from_status,
            to_status: submission.status,
            comment,
        }
    }
}

#[derive(Debug, Error)]
pub enum NotifyError {
    #[error("notification channel unavailable: {0}")]
    ChannelDown(String),
}

#[async_trait]
pub trait NotificationDispatcher: Send + Sync {
    async fn emit(&self, event: TransitionEvent) -> Result<(), NotifyError>;
}

/// A delivered notification as list views render it.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Notification {
    pub id: Uuid,
    pub recipient_role: ActorRole,
    pub recipient_id: Option<String>,
    pub title: String,
    pub message: String,
    pub read: bool,
    pub created_at: DateTime<Utc>,
}

impl Notification {
    fn from_event(event: &TransitionEvent) -> Self {
        let title = format!("Submission {}", event.to_status.display_label());
        let mut message = format!(
            "Submission {} moved from {} to {}.",
            event.submission_id,
            event.from_status.display_label(),
            event.to_status.display_label()
        );
        if let Some(comment) = &event.comment {
            message.push_str(" Comment: ");
            message.push_str(comment);
        }
        Self {
            id: Uuid::new_v4(),
            recipient_role: event.recipient_role,
            recipient_id: event.recipient_id.clone(),
            title,
            message,
            read: false,
            created_at: Utc::now(),
        }
    }
}

/// In-memory dispatcher that also keeps the notification read model:
/// per-recipient listings with a read flag that only ever flips forward.
#[derive(Debug, Default)]
pub struct InMemoryDispatcher {
    events: RwLock<Vec<TransitionEvent>>,
    notifications: RwLock<Vec<Notification>>,
}

impl InMemoryDispatcher {
    pub fn new() -> Arc<Self> {
        Arc::new(Self::default())
    }

    /// Raw events in emission order, for assertions and debugging.
    pub async fn events(&self) -> Vec<TransitionEvent> {
        self.events.read().await.clone()
    }

    pub async fn notifications_for(&self, role: ActorRole, recipient_id: &str) -> Vec<Notification> {
        self.notifications
            .read()
            .await
            .iter()
            .filter(|n| {
                n.recipient_role == role
                    && n.recipient_id.as_deref().map(|id| id == recipient_id).unwrap_or(true)
            })
            .cloned()
            .collect()
    }

    pub async fn unread_for(&self, role: ActorRole, recipient_id: &str) -> usize {
        self.notifications_for(role, recipient_id)
            .await
            .iter()
            .filter(|n| !n.read)
            .count()
    }

    /// Returns false when the notification does not exist.
    pub async fn mark_as_read(&self, notification_id: Uuid) -> bool {
        let mut notifications = self.notifications.write().await;
        match notifications.iter_mut().find(|n| n.id == notification_id) {
            Some(notification) => {
                notification.read = true;
                true
            }
            None => false,
        }
    }
}

#[async_trait]
impl NotificationDispatcher for InMemoryDispatcher {
    async fn emit(&self, event: TransitionEvent) -> Result<(), NotifyError> {
        tracing::debug!(
            submission_id = %event.submission_id,
            recipient_role = %event.recipient_role,
            transition = %event.transition,
            "Notification emitted"
        );
        self.notifications
            .write()
            .await
            .push(Notification::from_event(&event));
        self.events.write().await.push(event);
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::submission::SubmissionPayload;
    use chrono::NaiveDate;

    fn submission() -> Submission {
        Submission::new(
            "student-7".to_string(),
            SubmissionPayload {
                company_name: "CloudTech Innovations".to_string(),
                company_address: "789 Cloud Street".to_string(),
                supervisor_name: "Sarah Davis".to_string(),
                supervisor_email: "sarah.davis@cloudtech.com".to_string(),
                position: "DevOps Engineer Intern".to_string(),
                start_date: NaiveDate::from_ymd_opt(2024, 7, 1).unwrap(),
                end_date: NaiveDate::from_ymd_opt(2024, 9, 30).unwrap(),
                description: "CI/CD pipelines".to_string(),
                documents: vec![],
            },
        )
    }

    #[test]
    fn creation_notifies_the_reviewer_queue() {
        let submission = submission();
        let event = TransitionEvent::for_transition(
            &submission,
            Transition::Submit,
            SubmissionStatus::Submitted,
            None,
        );
        assert_eq!(event.recipient_role, ActorRole::Reviewer);
        assert_eq!(
            event.recipient_id.as_deref(),
            Some("sarah.davis@cloudtech.com")
        );
    }

    #[test]
    fn reviewer_decisions_go_back_to_the_owner() {
        let mut submission = submission();
        submission.status = SubmissionStatus::ReviewerApproved;
        let event = TransitionEvent::for_transition(
            &submission,
            Transition::ReviewerApprove,
            SubmissionStatus::UnderReview,
            Some("solid report".to_string()),
        );
        assert_eq!(event.recipient_role, ActorRole::Owner);
        assert_eq!(event.recipient_id.as_deref(), Some("student-7"));
    }

    #[tokio::test]
    async fn read_flag_only_flips_forward() {
        let dispatcher = InMemoryDispatcher::new();
        let submission = submission();
        dispatcher
            .emit(TransitionEvent::for_transition(
                &submission,
                Transition::Submit,
                SubmissionStatus::Submitted,
                None,
            ))
            .await
            .unwrap();

        let inbox = dispatcher
            .notifications_for(ActorRole::Reviewer, "sarah.davis@cloudtech.com")
            .await;
        assert_eq!(inbox.len(), 1);
        assert!(!inbox[0].read);

        assert!(dispatcher.mark_as_read(inbox[0].id).await);
        assert_eq!(
            dispatcher
                .unread_for(ActorRole::Reviewer, "sarah.davis@cloudtech.com")
                .await,
            0
        );
        assert!(!dispatcher.mark_as_read(Uuid::new_v4()).await);
    }
}
