//! Final-step submission to an external report service.

use std::sync::Arc;
use std::time::Duration;

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use schemars::JsonSchema;
use serde::{Deserialize, Serialize};
use thiserror::Error;
use tokio::sync::Mutex;
use ts_rs::TS;
use uuid::Uuid;

use super::controller::{FlowController, Staged, StepOutcome};
use super::error::FlowError;
use super::form::FormData;
use crate::reports::{NewReport, ReportStore};

/// Errors returned by a submission service
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum SubmissionError {
    #[error("report rejected: {0}")]
    Rejected(String),

    #[error("submission service unavailable: {0}")]
    Unavailable(String),
}

/// Acknowledgement for a stored report
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, TS, JsonSchema)]
#[ts(export)]
pub struct SubmissionReceipt {
    pub report_id: Uuid,
    pub submitted_at: DateTime<Utc>,
}

/// Persists the completed form of a report flow
#[async_trait]
pub trait SubmissionService: Send + Sync {
    async fn submit(&self, form: &FormData) -> Result<SubmissionReceipt, SubmissionError>;
}

/// Submission service backed by the in-memory report store
pub struct StoreSubmissionService {
    store: Arc<ReportStore>,
    delay: Duration,
}

impl StoreSubmissionService {
    pub fn new(store: Arc<ReportStore>, delay: Duration) -> Self {
        Self { store, delay }
    }
}

#[async_trait]
impl SubmissionService for StoreSubmissionService {
    async fn submit(&self, form: &FormData) -> Result<SubmissionReceipt, SubmissionError> {
        let new_report =
            NewReport::from_form(form).map_err(|e| SubmissionError::Rejected(e.to_string()))?;

        if !self.delay.is_zero() {
            tokio::time::sleep(self.delay).await;
        }

        let report = self.store.insert(new_report).await;
        tracing::info!(report_id = %report.id, category = %report.category, "report stored");
        Ok(SubmissionReceipt {
            report_id: report.id,
            submitted_at: report.created_at,
        })
    }
}

/// Submit the current step of `flow`, routing the final step through `service`.
///
/// The controller lock is released while the service call is awaited, so the
/// user may close the flow meanwhile; the late result is then discarded.
pub async fn submit_current_step(
    flow: &Mutex<FlowController>,
    service: &dyn SubmissionService,
    edits: FormData,
) -> Result<StepOutcome, FlowError> {
    let pending = match flow.lock().await.stage_step(edits)? {
        Staged::Done(outcome) => return Ok(outcome),
        Staged::Submit(pending) => pending,
    };

    let result = service.submit(&pending.form).await;
    flow.lock().await.finish_submission(pending.generation, result)
}
