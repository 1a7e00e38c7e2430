// Boundary to the external sealing service (an opaque anchoring backend).
// The engine invokes it at most once per submission; a retry against an
// already-sealed submission must come back with the original reference.

use std::collections::HashMap;
use std::sync::atomic::{AtomicBool, AtomicU64, Ordering};
use std::sync::Arc;

use async_trait::async_trait;
use chrono::Utc;
use thiserror::Error;
use tokio::sync::Mutex;

use crate::submission::{SealRef, SubmissionId};

#[derive(Debug, Error)]
pub enum SealingError {
    #[error("sealing service unavailable: {0}")]
    Unavailable(String),
    #[error("sealing rejected for {0}: {1}")]
    Rejected(SubmissionId, String),
}

#[async_trait]
pub trait SealingService: Send + Sync {
    /// Seal the submission's content digest. Idempotent at the service:
    /// sealing an already-sealed submission returns the existing reference.
    async fn seal(
        &self,
        submission_id: SubmissionId,
        payload_digest: &str,
    ) -> Result<SealRef, SealingError>;
}

/// In-process sealer for the demo wiring and tests. Counts invocations and
/// can be switched into a failing mode to exercise rollback paths.
#[derive(Debug, Default)]
pub struct InProcessSealer {
    sealed: Mutex<HashMap<SubmissionId, SealRef>>,
    calls: AtomicU64,
    fail_next: AtomicBool,
}

impl InProcessSealer {
    pub fn new() -> Arc<Self> {
        Arc::new(Self::default())
    }

    /// Total seal calls that reached the service, including replays.
    pub fn call_count(&self) -> u64 {
        self.calls.load(Ordering::SeqCst)
    }

    /// Number of distinct submissions actually sealed.
    pub async fn sealed_count(&self) -> usize {
        self.sealed.lock().await.len()
    }

    /// Make the next seal call fail, then recover.
    pub fn fail_next(&self) {
        self.fail_next.store(true, Ordering::SeqCst);
    }
}

#[async_trait]
impl SealingService for InProcessSealer {
    async fn seal(
        &self,
        submission_id: SubmissionId,
        payload_digest: &str,
    ) -> Result<SealRef, SealingError> {
        self.calls.fetch_add(1, Ordering::SeqCst);

        let mut sealed = self.sealed.lock().await;
        if let Some(existing) = sealed.get(&submission_id) {
            tracing::debug!(
                submission_id = %submission_id,
                tx_id = %existing.tx_id,
                "Seal replay detected, returning existing reference"
            );
            return Ok(existing.clone());
        }

        if self.fail_next.swap(false, Ordering::SeqCst) {
            return Err(SealingError::Unavailable("injected failure".to_string()));
        }

        let seal_ref = SealRef {
            tx_id: format!("0x{}", &payload_digest[..payload_digest.len().min(16)]),
            sealed_at: Utc::now(),
        };
        sealed.insert(submission_id, seal_ref.clone());
        Ok(seal_ref)
    }
}
