//! Error types for the report flow.

use thiserror::Error;

use super::submission::SubmissionError;
use super::validation::ValidationError;

/// Errors surfaced by flow operations
///
/// None of these are fatal: they are scoped to the single active flow and the
/// flow keeps its current step when one is returned.
#[derive(Error, Debug, Clone, PartialEq)]
pub enum FlowError {
    #[error("step {0} not found")]
    StepNotFound(u32),

    #[error("a submission is already in progress")]
    SubmissionInFlight,

    #[error(transparent)]
    Validation(#[from] ValidationError),

    #[error(transparent)]
    Submission(#[from] SubmissionError),
}

impl FlowError {
    /// Whether the user can fix this by editing input and resubmitting
    pub fn is_recoverable(&self) -> bool {
        matches!(self, FlowError::Validation(_) | FlowError::Submission(_))
    }
}
