use anyhow::Result;
use clap::{Parser, Subcommand};
use std::path::Path;

use paper_trail::config::PaperTrailConfig;
use paper_trail::notify::InMemoryDispatcher;
use paper_trail::query::ReadView;
use paper_trail::seal::InProcessSealer;
use paper_trail::store::InMemoryRecordStore;
use paper_trail::submission::{ActorRole, SubmissionPayload};
use paper_trail::workflow::table::EDGES;
use paper_trail::workflow::{Transition, TransitionRequest, WorkflowEngine};
use paper_trail::{AuditLog, InMemoryAuditLog};

#[derive(Parser)]
#[command(name = "paper-trail")]
#[command(about = "Approval pipeline engine for internship records")]
#[command(
    long_about = "paper-trail tracks internship records through a fixed approval pipeline: \
                  the student submits, a supervisor reviews, and the department gives final \
                  approval and seals the record. Run 'paper-trail demo' to watch a record \
                  travel the whole pipeline."
)]
struct Cli {
    #[command(subcommand)]
    command: Option<Commands>,
}

#[derive(Subcommand)]
enum Commands {
    /// Run a full pipeline scenario in memory and print the audit trail
    Demo {
        /// Reject at the review stage instead of approving
        #[arg(long, help = "Exercise the rejection and resubmission path")]
        reject: bool,
    },
    /// Print the transition table: every allowed edge and its role
    Table,
    /// Write a default paper-trail.toml configuration file
    Init {
        /// Overwrite an existing configuration file
        #[arg(long, help = "Force initialization, overwriting existing configuration")]
        force: bool,
    },
}

fn main() -> Result<()> {
    let cli = Cli::parse();

    match cli.command {
        None => {
            show_usage();
            Ok(())
        }
        Some(Commands::Demo { reject }) => {
            tokio::runtime::Runtime::new()?.block_on(async { demo_command(reject).await })
        }
        Some(Commands::Table) => {
            table_command();
            Ok(())
        }
        Some(Commands::Init { force }) => init_command(force),
    }
}

fn show_usage() {
    println!("PAPER-TRAIL - Approval Pipeline for Internship Records");
    println!();
    println!("The pipeline:");
    println!("  submitted -> under_review -> reviewer_approved -> authority_approved -> sealed");
    println!("  (any reviewing or authorizing stage may instead reject)");
    println!();
    println!("Quick start:");
    println!("  paper-trail demo            Run the full approval scenario");
    println!("  paper-trail demo --reject   Watch a rejection and resubmission");
    println!("  paper-trail table           Show every allowed transition");
    println!("  paper-trail init            Write a default paper-trail.toml");
}

fn table_command() {
    println!("TRANSITION TABLE");
    println!("{:<20} {:<18} {:<10} {}", "FROM", "TRANSITION", "ROLE", "TO");
    for edge in EDGES {
        println!(
            "{:<20} {:<18} {:<10} {}",
            edge.from.as_str(),
            edge.transition.as_str(),
            edge.role.as_str(),
            edge.to.as_str()
        );
    }
}

fn init_command(force: bool) -> Result<()> {
    let path = "paper-trail.toml";
    if Path::new(path).exists() && !force {
        println!("{path} already exists (use --force to overwrite)");
        return Ok(());
    }
    PaperTrailConfig::default().save_to_file(path)?;
    println!("Wrote default configuration to {path}");
    Ok(())
}

fn demo_payload() -> SubmissionPayload {
    SubmissionPayload {
        company_name: "TechCorp Solutions".to_string(),
        company_address: "123 Innovation Drive, Tech City".to_string(),
        supervisor_name: "Jane Wilson".to_string(),
        supervisor_email: "jane.wilson@techcorp.com".to_string(),
        position: "Frontend Developer Intern".to_string(),
        start_date: chrono::NaiveDate::from_ymd_opt(2024, 6, 1).unwrap(),
        end_date: chrono::NaiveDate::from_ymd_opt(2024, 8, 31).unwrap(),
        description: "Built and shipped internal web tooling.".to_string(),
        documents: vec!["/documents/internship-report.pdf".to_string()],
    }
}

async fn demo_command(reject: bool) -> Result<()> {
    let store = InMemoryRecordStore::new();
    let audit = InMemoryAuditLog::new();
    let sealer = InProcessSealer::new();
    let dispatcher = InMemoryDispatcher::new();
    let engine = WorkflowEngine::new(
        store.clone(),
        audit.clone(),
        sealer.clone(),
        dispatcher.clone(),
    );

    println!("Creating submission for student-1...");
    let submission = engine.create_submission("student-1", demo_payload()).await?;
    println!("  id: {}  status: {}", submission.id, submission.status);

    if reject {
        println!("Supervisor rejects...");
        let outcome = engine
            .apply_transition(TransitionRequest {
                submission_id: submission.id,
                actor_id: "jane.wilson@techcorp.com".to_string(),
                actor_role: ActorRole::Reviewer,
                transition: Transition::Reject,
                comment: Some("Report is missing the evaluation form.".to_string()),
            })
            .await?;
        println!("  status: {}", outcome.new_status);

        println!("Student resubmits with a fresh record...");
        let retry = engine
            .resubmit(submission.id, "student-1", demo_payload())
            .await?;
        println!(
            "  id: {}  references: {}",
            retry.id,
            retry.resubmission_of.map(|id| id.to_string()).unwrap_or_default()
        );
    } else {
        let steps: [(&str, ActorRole, Transition, Option<&str>); 3] = [
            (
                "jane.wilson@techcorp.com",
                ActorRole::Reviewer,
                Transition::ReviewerApprove,
                Some("Strong report, well evidenced."),
            ),
            (
                "dept-admin",
                ActorRole::Authority,
                Transition::AuthorityApprove,
                None,
            ),
            ("dept-admin", ActorRole::Authority, Transition::Seal, None),
        ];
        for (actor_id, role, transition, comment) in steps {
            println!("{role} performs {transition}...");
            let outcome = engine
                .apply_transition(TransitionRequest {
                    submission_id: submission.id,
                    actor_id: actor_id.to_string(),
                    actor_role: role,
                    transition,
                    comment: comment.map(str::to_string),
                })
                .await?;
            println!("  status: {}", outcome.new_status);
        }

        let view = ReadView::new(store.clone(), audit.clone());
        if let Some(sealed) = view.get(submission.id).await {
            if let Some(seal_ref) = sealed.seal_ref {
                println!("Sealed with reference {}", seal_ref.tx_id);
            }
        }
    }

    println!();
    println!("AUDIT TRAIL");
    for entry in audit.entries_for(submission.id).await {
        println!(
            "  {}  {:<10} {:<18} {} -> {}",
            entry.recorded_at.format("%H:%M:%S"),
            entry.actor_role.as_str(),
            entry.transition.as_str(),
            entry.from_status.as_str(),
            entry.to_status.as_str()
        );
    }

    println!();
    println!("OWNER NOTIFICATIONS");
    for notification in dispatcher
        .notifications_for(ActorRole::Owner, "student-1")
        .await
    {
        println!("  {}: {}", notification.title, notification.message);
    }

    Ok(())
}
