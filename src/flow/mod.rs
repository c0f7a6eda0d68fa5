//! Multi-step report flow.
//!
//! ## Components
//!
//! - [`StepRegistry`]: static ordered list of [`StepDescriptor`]s
//! - [`FlowController`]: per-session open/advance/back/close state machine
//! - [`FormData`] and [`StepValidators`]: accumulated input and per-step checks
//! - [`SubmissionService`]: external persistence for the final step
//!
//! ```rust,ignore
//! let mut flow = FlowController::report();
//! flow.open(OpenOptions::new().prefill(FormData::new().with("category", "pothole")));
//! flow.submit_step(FormData::new())?; // category already prefilled
//! ```

pub mod controller;
pub mod error;
pub mod form;
pub mod steps;
pub mod submission;
pub mod validation;

pub use controller::{
    CompletionCallback, FlowController, FlowSnapshot, OpenOptions, PendingSubmission, Staged,
    StepOutcome,
};
pub use error::FlowError;
pub use form::{FieldValue, FormData};
pub use steps::{StepDescriptor, StepRegistry};
pub use submission::{
    submit_current_step, StoreSubmissionService, SubmissionError, SubmissionReceipt,
    SubmissionService,
};
pub use validation::{StepValidators, ValidationError, Validator};
