// Generic keyed persistence for submissions. The engine only needs
// read-modify-write with a compare-and-set on the status field; anything
// fancier lives behind this seam.

use std::collections::HashMap;
use std::sync::Arc;

use async_trait::async_trait;
use thiserror::Error;
use tokio::sync::RwLock;

use crate::submission::{Submission, SubmissionId, SubmissionStatus};

#[derive(Debug, Error)]
pub enum StoreError {
    #[error("submission {0} already exists")]
    AlreadyExists(SubmissionId),
    #[error("storage backend failure: {0}")]
    Backend(String),
}

#[async_trait]
pub trait RecordStore: Send + Sync {
    async fn get(&self, id: SubmissionId) -> Option<Submission>;

    async fn insert(&self, submission: Submission) -> Result<(), StoreError>;

    /// Replace the stored record only if its status still equals
    /// `expected_status`. Returns false when the guard fails; the caller
    /// reloads and retries.
    async fn compare_and_set(
        &self,
        id: SubmissionId,
        expected_status: SubmissionStatus,
        updated: Submission,
    ) -> Result<bool, StoreError>;

    /// Remove a record. Only used to unwind a creation whose audit entry
    /// could not be written; committed records are never removed.
    async fn remove(&self, id: SubmissionId) -> Result<(), StoreError>;

    /// Point-in-time snapshot for read views. Never blocks on writers
    /// beyond the read lock.
    async fn list_all(&self) -> Vec<Submission>;
}

/// In-memory store used by the demo wiring and the test suites.
#[derive(Debug, Default)]
pub struct InMemoryRecordStore {
    records: RwLock<HashMap<SubmissionId, Submission>>,
}

impl InMemoryRecordStore {
    pub fn new() -> Arc<Self> {
        Arc::new(Self::default())
    }
}

#[async_trait]
impl RecordStore for InMemoryRecordStore {
    async fn get(&self, id: SubmissionId) -> Option<Submission> {
        self.records.read().await.get(&id).cloned()
    }

    async fn insert(&self, submission: Submission) -> Result<(), StoreError> {
        let mut records = self.records.write().await;
        if records.contains_key(&submission.id) {
            return Err(StoreError::AlreadyExists(submission.id));
        }
        records.insert(submission.id, submission);
        Ok(())
    }

    async fn compare_and_set(
        &self,
        id: SubmissionId,
        expected_status: SubmissionStatus,
        updated: Submission,
    ) -> Result<bool, StoreError> {
        let mut records = self.records.write().await;
        match records.get(&id) {
            Some(current) if current.status == expected_status => {
                records.insert(id, updated);
                Ok(true)
            }
            _ => Ok(false),
        }
    }

    async fn remove(&self, id: SubmissionId) -> Result<(), StoreError> {
        self.records.write().await.remove(&id);
        Ok(())
    }

    async fn list_all(&self) -> Vec<Submission> {
        self.records.read().await.values().cloned().collect()
    }
}
