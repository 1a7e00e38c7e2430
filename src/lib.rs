// paper-trail - approval pipeline engine for internship records
// This exposes the core components for testing and integration

pub mod audit;
pub mod config;
pub mod notify;
pub mod query;
pub mod seal;
pub mod store;
pub mod submission;
pub mod telemetry;
pub mod workflow;

// Re-export key types for easy access
pub use audit::{AuditEntry, AuditError, AuditLog, InMemoryAuditLog};
pub use config::{config, init_config, PaperTrailConfig};
pub use notify::{
    InMemoryDispatcher, Notification, NotificationDispatcher, NotifyError, TransitionEvent,
};
pub use query::ReadView;
pub use seal::{InProcessSealer, SealingError, SealingService};
pub use store::{InMemoryRecordStore, RecordStore, StoreError};
pub use submission::{
    ActorRole, SealRef, Stage, StageComments, Submission, SubmissionId, SubmissionPayload,
    SubmissionStatus,
};
pub use telemetry::{create_transition_span, generate_correlation_id, init_telemetry};
pub use workflow::{
    authorize, Edge, Transition, TransitionOutcome, TransitionRequest, TransitionTable,
    WorkflowError, WorkflowEngine,
};
