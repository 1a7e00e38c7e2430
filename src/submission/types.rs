// Core types for the approval pipeline: the tracked submission, its payload,
// the acting roles, and the one-time seal reference.

use chrono::{DateTime, NaiveDate, Utc};
use serde::{Deserialize, Serialize};
use sha2::{Digest, Sha256};
use uuid::Uuid;

use super::status::SubmissionStatus;

/// Opaque unique identifier for a submission. Assigned at creation, never
/// reused; a resubmission gets a fresh id referencing the old one.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct SubmissionId(pub Uuid);

impl SubmissionId {
    pub fn new() -> Self {
        Self(Uuid::new_v4())
    }
}

impl Default for SubmissionId {
    fn default() -> Self {
        Self::new()
    }
}

impl std::fmt::Display for SubmissionId {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        self.0.fmt(f)
    }
}

/// The three parties of the pipeline.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ActorRole {
    /// Submitting party (the student); creates and resubmits.
    Owner,
    /// Reviewing party (the supervisor); first-stage decision.
    Reviewer,
    /// Authorizing party (the department); final approval and seal.
    Authority,
}

impl ActorRole {
    pub const ALL: [ActorRole; 3] = [ActorRole::Owner, ActorRole::Reviewer, ActorRole::Authority];

    pub fn as_str(&self) -> &'static str {
        match self {
            ActorRole::Owner => "owner",
            ActorRole::Reviewer => "reviewer",
            ActorRole::Authority => "authority",
        }
    }
}

impl std::fmt::Display for ActorRole {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Stage a comment is attached to.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Stage {
    Review,
    Authorization,
}

/// Free-text comments keyed by stage. Comments are only ever appended;
/// a later comment at the same stage lands on a new line.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct StageComments {
    pub review: Option<String>,
    pub authorization: Option<String>,
}

impl StageComments {
    pub fn append(&mut self, stage: Stage, text: &str) {
        let slot = match stage {
            Stage::Review => &mut self.review,
            Stage::Authorization => &mut self.authorization,
        };
        match slot {
            Some(existing) => {
                existing.push('\n');
                existing.push_str(text);
            }
            None => *slot = Some(text.to_string()),
        }
    }

    pub fn get(&self, stage: Stage) -> Option<&str> {
        match stage {
            Stage::Review => self.review.as_deref(),
            Stage::Authorization => self.authorization.as_deref(),
        }
    }
}

/// Reference returned by the external sealing service. Set exactly once,
/// immutable thereafter.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SealRef {
    pub tx_id: String,
    pub sealed_at: DateTime<Utc>,
}

/// Descriptive data carried through the pipeline unchanged. The engine never
/// inspects it beyond computing the digest handed to the sealing service.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SubmissionPayload {
    pub company_name: String,
    pub company_address: String,
    pub supervisor_name: String,
    pub supervisor_email: String,
    pub position: String,
    pub start_date: NaiveDate,
    pub end_date: NaiveDate,
    pub description: String,
    pub documents: Vec<String>,
}

impl SubmissionPayload {
    /// Stable content digest fed to the sealing service. Derived from the
    /// canonical JSON form so two payloads with equal fields seal equal.
    pub fn digest(&self) -> String {
        let bytes = serde_json::to_vec(self).unwrap_or_default();
        let mut hasher = Sha256::new();
        hasher.update(&bytes);
        hex::encode(hasher.finalize())
    }
}

/// The tracked workflow entity.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Submission {
    pub id: SubmissionId,
    pub owner_id: String,
    pub status: SubmissionStatus,
    pub payload: SubmissionPayload,
    pub comments: StageComments,
    pub seal_ref: Option<SealRef>,
    /// Predecessor this submission retries, if it re-enters the pipeline
    /// after a rejection.
    pub resubmission_of: Option<SubmissionId>,
    pub submitted_at: DateTime<Utc>,
    pub reviewed_at: Option<DateTime<Utc>>,
    pub approved_at: Option<DateTime<Utc>>,
    pub sealed_at: Option<DateTime<Utc>>,
    pub updated_at: DateTime<Utc>,
}

impl Submission {
    /// A freshly created submission, already observable to the reviewer.
    /// The `submitted -> under_review` hop happens implicitly at creation;
    /// the creation audit entry records it.
    pub fn new(owner_id: String, payload: SubmissionPayload) -> Self {
        let now = Utc::now();
        Self {
            id: SubmissionId::new(),
            owner_id,
            status: SubmissionStatus::UnderReview,
            payload,
            comments: StageComments::default(),
            seal_ref: None,
            resubmission_of: None,
            submitted_at: now,
            reviewed_at: None,
            approved_at: None,
            sealed_at: None,
            updated_at: now,
        }
    }
}
