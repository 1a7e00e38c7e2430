pub mod status;
pub mod types;

pub use status::SubmissionStatus;
pub use types::{
    ActorRole, SealRef, Stage, StageComments, Submission, SubmissionId, SubmissionPayload,
};
