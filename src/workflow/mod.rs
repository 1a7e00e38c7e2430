pub mod authorizer;
pub mod engine;
pub mod errors;
pub mod table;
pub mod transition;

pub use authorizer::authorize;
pub use engine::{TransitionOutcome, TransitionRequest, WorkflowEngine};
pub use errors::WorkflowError;
pub use table::{Edge, TransitionTable};
pub use transition::Transition;
