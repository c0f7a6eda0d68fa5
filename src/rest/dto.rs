//! Data Transfer Objects for the REST API.

use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};
use utoipa::{IntoParams, ToSchema};
use uuid::Uuid;

use crate::flow::{FlowSnapshot, FormData, StepDescriptor, StepRegistry, SubmissionReceipt};
use crate::reports::{Report, ReportCategory, ReportStats};
use crate::session::Session;

// =============================================================================
// Health DTOs
// =============================================================================

/// Health check response
#[derive(Debug, Serialize, Deserialize, ToSchema)]
pub struct HealthResponse {
    pub status: String,
    pub version: String,
}

/// Service status response
#[derive(Debug, Serialize, Deserialize, ToSchema)]
pub struct StatusResponse {
    pub status: String,
    pub version: String,
    pub session_count: usize,
    pub report_count: usize,
    pub step_count: u32,
}

// =============================================================================
// Step & Category DTOs
// =============================================================================

/// A step of the report flow
#[derive(Debug, Clone, Serialize, Deserialize, ToSchema)]
pub struct StepResponse {
    pub order: u32,
    pub title: String,
    pub description: String,
    pub hint: String,
}

impl From<&StepDescriptor> for StepResponse {
    fn from(step: &StepDescriptor) -> Self {
        Self {
            order: step.order,
            title: step.title.clone(),
            description: step.description.clone(),
            hint: step.hint.clone(),
        }
    }
}

/// A selectable report category
#[derive(Debug, Serialize, Deserialize, ToSchema)]
pub struct CategoryResponse {
    pub key: String,
    pub label: String,
}

impl From<&ReportCategory> for CategoryResponse {
    fn from(category: &ReportCategory) -> Self {
        Self {
            key: category.key().to_string(),
            label: category.label().to_string(),
        }
    }
}

// =============================================================================
// Session & Flow DTOs
// =============================================================================

/// Current state of a session's report flow
#[derive(Debug, Serialize, Deserialize, ToSchema)]
pub struct FlowStateResponse {
    pub is_open: bool,
    /// 1-based while open, 0 while closed
    pub current_step: u32,
    pub step_count: u32,
    /// Descriptor of the current step, if open
    #[serde(skip_serializing_if = "Option::is_none")]
    pub step: Option<StepResponse>,
    #[schema(value_type = Option<Object>)]
    pub prefill: Option<FormData>,
    #[schema(value_type = Object)]
    pub form: FormData,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub last_error: Option<String>,
    pub submitting: bool,
}

impl FlowStateResponse {
    pub fn from_snapshot(snapshot: FlowSnapshot, steps: &StepRegistry) -> Self {
        let step = if snapshot.is_open {
            steps.get(snapshot.current_step).ok().map(StepResponse::from)
        } else {
            None
        };
        Self {
            is_open: snapshot.is_open,
            current_step: snapshot.current_step,
            step_count: snapshot.step_count,
            step,
            prefill: snapshot.prefill,
            form: snapshot.form,
            last_error: snapshot.last_error,
            submitting: snapshot.submitting,
        }
    }
}

/// A client session
#[derive(Debug, Serialize, Deserialize, ToSchema)]
pub struct SessionResponse {
    pub id: Uuid,
    pub created_at: String,
    pub completed_flows: u64,
    pub flow: FlowStateResponse,
}

impl SessionResponse {
    pub fn new(session: &Session, flow: FlowStateResponse) -> Self {
        Self {
            id: session.id,
            created_at: session.created_at.to_rfc3339(),
            completed_flows: session.completed_flows(),
            flow,
        }
    }
}

/// Request to open the report flow
#[derive(Debug, Default, Serialize, Deserialize, ToSchema)]
pub struct OpenFlowRequest {
    /// Fields to pre-populate, e.g. `{"category": "pothole"}`.
    /// Values are strings, booleans or numbers (stored as text).
    #[serde(default)]
    #[schema(value_type = Option<Object>)]
    pub prefill: Option<FormData>,
}

/// Request to submit the current step
#[derive(Debug, Default, Serialize, Deserialize, ToSchema)]
pub struct SubmitStepRequest {
    /// Field edits for this step: strings, booleans or numbers (stored as
    /// text); `null` clears a field
    #[serde(default)]
    #[schema(value_type = Object)]
    pub fields: FormData,
}

/// Acknowledgement of a stored report
#[derive(Debug, Serialize, Deserialize, ToSchema)]
pub struct ReceiptResponse {
    pub report_id: Uuid,
    pub submitted_at: String,
}

impl From<SubmissionReceipt> for ReceiptResponse {
    fn from(receipt: SubmissionReceipt) -> Self {
        Self {
            report_id: receipt.report_id,
            submitted_at: receipt.submitted_at.to_rfc3339(),
        }
    }
}

/// Result of submitting a step
#[derive(Debug, Serialize, Deserialize, ToSchema)]
pub struct SubmitStepResponse {
    /// One of: advanced, completed, submitted, ignored (flow was closed)
    pub outcome: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub receipt: Option<ReceiptResponse>,
    pub flow: FlowStateResponse,
}

// =============================================================================
// Report DTOs
// =============================================================================

/// A stored report
#[derive(Debug, Serialize, Deserialize, ToSchema)]
pub struct ReportResponse {
    pub id: Uuid,
    pub category: String,
    pub category_label: String,
    pub title: String,
    pub description: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub address: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub latitude: Option<f64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub longitude: Option<f64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub photo_url: Option<String>,
    pub status: String,
    pub anonymous: bool,
    pub created_at: String,
}

impl From<&Report> for ReportResponse {
    fn from(report: &Report) -> Self {
        Self {
            id: report.id,
            category: report.category.key().to_string(),
            category_label: report.category.label().to_string(),
            title: report.title.clone(),
            description: report.description.clone(),
            address: report.location.address.clone(),
            latitude: report.location.latitude,
            longitude: report.location.longitude,
            photo_url: report.photo_url.clone(),
            status: report.status.key().to_string(),
            anonymous: report.anonymous,
            created_at: report.created_at.to_rfc3339(),
        }
    }
}

/// Query parameters for listing reports
#[derive(Debug, Default, Deserialize, IntoParams)]
#[into_params(parameter_in = Query)]
pub struct ReportListQuery {
    /// Category key, e.g. `pothole`
    pub category: Option<String>,
    /// Status key, e.g. `in_review`
    pub status: Option<String>,
}

/// Request to change a report's status
#[derive(Debug, Serialize, Deserialize, ToSchema)]
pub struct UpdateStatusRequest {
    pub status: String,
}

// =============================================================================
// Admin DTOs
// =============================================================================

/// Aggregate numbers for the admin dashboard
#[derive(Debug, Serialize, Deserialize, ToSchema)]
pub struct DashboardResponse {
    pub total_reports: usize,
    pub open_reports: usize,
    pub by_status: BTreeMap<String, usize>,
    pub by_category: BTreeMap<String, usize>,
    pub active_sessions: usize,
}

impl DashboardResponse {
    pub fn new(stats: ReportStats, active_sessions: usize) -> Self {
        Self {
            total_reports: stats.total,
            open_reports: stats.open,
            by_status: stats
                .by_status
                .into_iter()
                .map(|(status, count)| (status.key().to_string(), count))
                .collect(),
            by_category: stats
                .by_category
                .into_iter()
                .map(|(category, count)| (category.key().to_string(), count))
                .collect(),
            active_sessions,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::reports::ReportStatus;

    #[test]
    fn test_flow_state_includes_current_step_when_open() {
        let steps = StepRegistry::report();
        let snapshot = FlowSnapshot {
            is_open: true,
            current_step: 2,
            step_count: 4,
            prefill: None,
            form: FormData::new(),
            last_error: None,
            submitting: false,
        };
        let response = FlowStateResponse::from_snapshot(snapshot, &steps);
        assert_eq!(response.step.unwrap().title, "Details");
    }

    #[test]
    fn test_flow_state_omits_step_when_closed() {
        let steps = StepRegistry::report();
        let snapshot = FlowSnapshot {
            is_open: false,
            current_step: 0,
            step_count: 4,
            prefill: None,
            form: FormData::new(),
            last_error: None,
            submitting: false,
        };
        let json =
            serde_json::to_value(FlowStateResponse::from_snapshot(snapshot, &steps)).unwrap();
        assert!(json.get("step").is_none());
        assert_eq!(json["current_step"], 0);
    }

    #[test]
    fn test_submit_request_accepts_null_fields() {
        let request: SubmitStepRequest =
            serde_json::from_str(r#"{"fields":{"photo_url":null,"confirmed":true}}"#).unwrap();
        assert_eq!(request.fields.flag("confirmed"), Some(true));

        let empty: SubmitStepRequest = serde_json::from_str("{}").unwrap();
        assert!(empty.fields.is_empty());
    }

    #[test]
    fn test_dashboard_uses_keys() {
        let mut stats = ReportStats {
            total: 3,
            open: 2,
            ..ReportStats::default()
        };
        stats.by_status.insert(ReportStatus::InReview, 2);
        stats.by_category.insert(ReportCategory::Streetlight, 3);

        let dashboard = DashboardResponse::new(stats, 1);
        assert_eq!(dashboard.by_status.get("in_review"), Some(&2));
        assert_eq!(dashboard.by_category.get("streetlight"), Some(&3));
    }
}
