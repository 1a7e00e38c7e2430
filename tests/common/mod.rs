// Shared wiring for the integration suites: an engine over in-memory
// collaborators, plus payload fixtures.

use std::sync::Arc;

use chrono::NaiveDate;
use paper_trail::audit::InMemoryAuditLog;
use paper_trail::notify::InMemoryDispatcher;
use paper_trail::seal::InProcessSealer;
use paper_trail::store::InMemoryRecordStore;
use paper_trail::submission::SubmissionPayload;
use paper_trail::workflow::WorkflowEngine;

pub struct TestHarness {
    pub engine: Arc<WorkflowEngine>,
    pub store: Arc<InMemoryRecordStore>,
    pub audit: Arc<InMemoryAuditLog>,
    pub sealer: Arc<InProcessSealer>,
    pub dispatcher: Arc<InMemoryDispatcher>,
}

pub fn harness() -> TestHarness {
    let store = InMemoryRecordStore::new();
    let audit = InMemoryAuditLog::new();
    let sealer = InProcessSealer::new();
    let dispatcher = InMemoryDispatcher::new();
    let engine = Arc::new(WorkflowEngine::new(
        store.clone(),
        audit.clone(),
        sealer.clone(),
        dispatcher.clone(),
    ));
    TestHarness {
        engine,
        store,
        audit,
        sealer,
        dispatcher,
    }
}

pub fn payload() -> SubmissionPayload {
    payload_for("jane.wilson@techcorp.com")
}

pub fn payload_for(supervisor_email: &str) -> SubmissionPayload {
    SubmissionPayload {
        company_name: "TechCorp Solutions".to_string(),
        company_address: "123 Innovation Drive, Tech City".to_string(),
        supervisor_name: "Jane Wilson".to_string(),
        supervisor_email: supervisor_email.to_string(),
        position: "Frontend Developer Intern".to_string(),
        start_date: NaiveDate::from_ymd_opt(2024, 6, 1).unwrap(),
        end_date: NaiveDate::from_ymd_opt(2024, 8, 31).unwrap(),
        description: "Built internal web tooling.".to_string(),
        documents: vec!["/documents/internship-report.pdf".to_string()],
    }
}
