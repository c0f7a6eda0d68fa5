//! Flow controller: open/advance/back/close transitions for one session.
//!
//! The controller owns the only copy of the flow state. Views observe it
//! through [`FlowController::subscribe`], which yields a `watch` receiver of
//! [`FlowSnapshot`]s published after every transition.

use std::fmt;
use std::sync::Arc;

use schemars::JsonSchema;
use serde::{Deserialize, Serialize};
use tokio::sync::watch;
use tracing::{debug, info, warn};
use ts_rs::TS;

use super::error::FlowError;
use super::form::FormData;
use super::steps::{StepDescriptor, StepRegistry};
use super::submission::{SubmissionError, SubmissionReceipt};
use super::validation::StepValidators;


/// Zero-argument completion callback, invoked at most once per flow
pub type CompletionCallback = Box<dyn FnOnce() + Send + 'static>;

/// Options accepted by [`FlowController::open`]
#[derive(Default)]
pub struct OpenOptions {
    pub prefill: Option<FormData>,
    pub on_complete: Option<CompletionCallback>,
}

impl OpenOptions {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn prefill(mut self, prefill: FormData) -> Self {
        self.prefill = Some(prefill);
        self
    }

    pub fn on_complete(mut self, callback: impl FnOnce() + Send + 'static) -> Self {
        self.on_complete = Some(Box::new(callback));
        self
    }
}

impl fmt::Debug for OpenOptions {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("OpenOptions")
            .field("prefill", &self.prefill)
            .field("on_complete", &self.on_complete.is_some())
            .finish()
    }
}

/// Result of a transition request
#[derive(Debug, Clone, PartialEq)]
pub enum StepOutcome {
    /// Moved forward to the given step
    Advanced { step: u32 },
    /// Last step passed, callback fired, flow closed
    Completed,
    /// Final submission accepted by the service, flow closed
    Submitted(SubmissionReceipt),
    /// Flow was closed or the request was stale; nothing changed
    Ignored,
}

/// What [`FlowController::stage_step`] decided
#[derive(Debug, Clone, PartialEq)]
pub enum Staged {
    /// The step was handled entirely in memory
    Done(StepOutcome),
    /// The final step passed validation and must be sent to the submission service
    Submit(PendingSubmission),
}

/// A final-step submission waiting for the external service
#[derive(Debug, Clone, PartialEq)]
pub struct PendingSubmission {
    /// Flow generation the submission belongs to
    pub generation: u64,
    pub form: FormData,
}

/// Observable view of the flow state
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, TS, JsonSchema)]
#[ts(export)]
pub struct FlowSnapshot {
    pub is_open: bool,
    /// 1-based while open, 0 while closed
    pub current_step: u32,
    pub step_count: u32,
    pub prefill: Option<FormData>,
    pub form: FormData,
    pub last_error: Option<String>,
    pub submitting: bool,
}

#[derive(Default)]
struct FlowState {
    is_open: bool,
    current_step: u32,
    prefill: Option<FormData>,
    on_complete: Option<CompletionCallback>,
    form: FormData,
    last_error: Option<String>,
    submitting: bool,
}

/// Single shared controller for one session's report flow
pub struct FlowController {
    registry: Arc<StepRegistry>,
    validators: Arc<StepValidators>,
    state: FlowState,
    /// Bumped on every open/close so late submission results can be discarded
    generation: u64,
    tx: watch::Sender<FlowSnapshot>,
}

impl FlowController {
    pub fn new(registry: Arc<StepRegistry>, validators: Arc<StepValidators>) -> Self {
        if validators.len() != registry.list().len() {
            warn!(
                steps = registry.len(),
                validators = validators.len(),
                "step registry and validators differ in length"
            );
        }

        let state = FlowState::default();
        let (tx, _rx) = watch::channel(Self::snapshot_of(&state, &registry));
        Self {
            registry,
            validators,
            state,
            generation: 0,
            tx,
        }
    }

    /// Controller for the built-in report flow
    pub fn report() -> Self {
        Self::new(
            Arc::new(StepRegistry::report()),
            Arc::new(StepValidators::report()),
        )
    }

    // ─── Queries ────────────────────────────────────────────────────────────

    pub fn is_open(&self) -> bool {
        self.state.is_open
    }

    pub fn current_step(&self) -> u32 {
        self.state.current_step
    }

    /// Descriptor for the current step, if open
    pub fn current_descriptor(&self) -> Option<&StepDescriptor> {
        if !self.state.is_open {
            return None;
        }
        self.registry.get(self.state.current_step).ok()
    }

    pub fn form(&self) -> &FormData {
        &self.state.form
    }

    pub fn prefill(&self) -> Option<&FormData> {
        self.state.prefill.as_ref()
    }

    pub fn last_error(&self) -> Option<&str> {
        self.state.last_error.as_deref()
    }

    pub fn is_submitting(&self) -> bool {
        self.state.submitting
    }

    pub fn generation(&self) -> u64 {
        self.generation
    }

    pub fn registry(&self) -> &StepRegistry {
        &self.registry
    }

    pub fn snapshot(&self) -> FlowSnapshot {
        Self::snapshot_of(&self.state, &self.registry)
    }

    /// Subscribe to snapshots published after each transition
    pub fn subscribe(&self) -> watch::Receiver<FlowSnapshot> {
        self.tx.subscribe()
    }

    // ─── Transitions ────────────────────────────────────────────────────────

    /// Open the flow at step 1. Reopening replaces the previous options.
    pub fn open(&mut self, options: OpenOptions) {
        if self.registry.is_empty() {
            warn!("cannot open a flow with no steps");
            return;
        }
        if self.state.is_open {
            debug!(
                step = self.state.current_step,
                "reopening flow, previous options discarded"
            );
        }

        self.generation += 1;
        let form = options
            .prefill
            .as_ref()
            .map(|prefill| FormData::new().merged(prefill))
            .unwrap_or_default();
        self.state = FlowState {
            is_open: true,
            current_step: 1,
            prefill: options.prefill,
            on_complete: options.on_complete,
            form,
            last_error: None,
            submitting: false,
        };
        debug!(generation = self.generation, "flow opened");
        self.publish();
    }

    /// Close without completing. Never invokes the completion callback.
    pub fn close(&mut self) {
        if !self.state.is_open {
            return;
        }
        self.reset();
        debug!(generation = self.generation, "flow closed");
    }

    /// Move to the next step, completing the flow on the last one.
    /// No-op while a final submission is in flight.
    pub fn advance(&mut self) -> StepOutcome {
        if !self.state.is_open {
            debug!("advance ignored, flow is closed");
            return StepOutcome::Ignored;
        }
        if self.state.submitting {
            debug!("advance ignored while submission is in flight");
            return StepOutcome::Ignored;
        }
        let step = self.state.current_step;
        if !self.registry.contains(step) {
            warn!(step, "advance ignored, current step is outside the registry");
            return StepOutcome::Ignored;
        }

        if self.registry.is_last(step) {
            if let Some(callback) = self.state.on_complete.take() {
                callback();
            }
            self.reset();
            info!(generation = self.generation, "flow completed");
            StepOutcome::Completed
        } else {
            self.state.current_step = step + 1;
            self.publish();
            StepOutcome::Advanced {
                step: self.state.current_step,
            }
        }
    }

    /// Move back one step. No-op at step 1 or while a submission is in flight.
    pub fn go_back(&mut self) {
        if !self.state.is_open || self.state.current_step <= 1 {
            return;
        }
        if self.state.submitting {
            debug!("go_back ignored while submission is in flight");
            return;
        }
        if !self.registry.contains(self.state.current_step) {
            warn!(
                step = self.state.current_step,
                "go_back ignored, current step is outside the registry"
            );
            return;
        }
        self.state.current_step -= 1;
        self.publish();
    }

    /// Validate the current step against `edits`, merge and advance.
    ///
    /// The final step completes the flow directly; use [`Self::stage_step`]
    /// when the final step must go through a submission service.
    pub fn submit_step(&mut self, edits: FormData) -> Result<StepOutcome, FlowError> {
        match self.accept_edits(&edits)? {
            Some(_) => Ok(self.advance()),
            None => Ok(StepOutcome::Ignored),
        }
    }

    /// Like [`Self::submit_step`], but hands the final step back as a
    /// [`PendingSubmission`] instead of completing it
    pub fn stage_step(&mut self, edits: FormData) -> Result<Staged, FlowError> {
        let Some(step) = self.accept_edits(&edits)? else {
            return Ok(Staged::Done(StepOutcome::Ignored));
        };

        if self.registry.is_last(step) {
            self.state.submitting = true;
            self.publish();
            Ok(Staged::Submit(PendingSubmission {
                generation: self.generation,
                form: self.state.form.clone(),
            }))
        } else {
            Ok(Staged::Done(self.advance()))
        }
    }

    /// Apply the submission service's answer for a staged final step.
    ///
    /// Results for an older generation (flow closed or reopened in the
    /// meantime) are dropped. On failure the flow stays on the final step.
    pub fn finish_submission(
        &mut self,
        generation: u64,
        result: Result<SubmissionReceipt, SubmissionError>,
    ) -> Result<StepOutcome, FlowError> {
        if generation != self.generation || !self.state.is_open || !self.state.submitting {
            debug!(
                generation,
                current = self.generation,
                "discarding stale submission result"
            );
            return Ok(StepOutcome::Ignored);
        }
        self.state.submitting = false;

        match result {
            Ok(receipt) => {
                self.advance();
                Ok(StepOutcome::Submitted(receipt))
            }
            Err(err) => {
                warn!(error = %err, "report submission failed");
                self.state.last_error = Some(err.to_string());
                self.publish();
                Err(err.into())
            }
        }
    }

    // ─── Internals ──────────────────────────────────────────────────────────

    /// Validate merged edits for the current step; returns the step on success
    fn accept_edits(&mut self, edits: &FormData) -> Result<Option<u32>, FlowError> {
        if !self.state.is_open {
            debug!("step submission ignored, flow is closed");
            return Ok(None);
        }
        if self.state.submitting {
            return Err(FlowError::SubmissionInFlight);
        }
        let step = self.state.current_step;
        if !self.registry.contains(step) {
            warn!(step, "step submission ignored, current step is outside the registry");
            return Ok(None);
        }

        let candidate = self.state.form.merged(edits);
        if let Err(err) = self.validators.validate(step, &candidate) {
            debug!(step, error = %err, "step validation failed");
            self.state.last_error = Some(err.to_string());
            self.publish();
            return Err(err.into());
        }

        self.state.form = candidate;
        self.state.last_error = None;
        Ok(Some(step))
    }

    fn reset(&mut self) {
        self.generation += 1;
        self.state = FlowState::default();
        self.publish();
    }

    fn publish(&self) {
        self.tx.send_replace(self.snapshot());
    }

    fn snapshot_of(state: &FlowState, registry: &StepRegistry) -> FlowSnapshot {
        FlowSnapshot {
            is_open: state.is_open,
            current_step: state.current_step,
            step_count: registry.len(),
            prefill: state.prefill.clone(),
            form: state.form.clone(),
            last_error: state.last_error.clone(),
            submitting: state.submitting,
        }
    }
}

impl fmt::Debug for FlowController {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("FlowController")
            .field("snapshot", &self.snapshot())
            .field("generation", &self.generation)
            .finish_non_exhaustive()
    }
}
