//! Stored report endpoints.

use axum::{
    extract::{Path, Query, State},
    Json,
};
use uuid::Uuid;

use crate::reports::{ReportCategory, ReportFilter, ReportStatus};
use crate::rest::dto::{ReportListQuery, ReportResponse, UpdateStatusRequest};
use crate::rest::error::{ApiError, ErrorResponse};
use crate::rest::state::ApiState;

impl TryFrom<ReportListQuery> for ReportFilter {
    type Error = ApiError;

    fn try_from(query: ReportListQuery) -> Result<Self, Self::Error> {
        let category = query
            .category
            .as_deref()
            .map(str::parse::<ReportCategory>)
            .transpose()?;
        let status = query
            .status
            .as_deref()
            .map(str::parse::<ReportStatus>)
            .transpose()?;
        Ok(ReportFilter { category, status })
    }
}

/// List reports, newest first
#[utoipa::path(
    get,
    path = "/api/v1/reports",
    tag = "Reports",
    params(ReportListQuery),
    responses(
        (status = 200, description = "Matching reports", body = Vec<ReportResponse>),
        (status = 400, description = "Unknown category or status", body = ErrorResponse)
    )
)]
pub async fn list(
    State(state): State<ApiState>,
    Query(query): Query<ReportListQuery>,
) -> Result<Json<Vec<ReportResponse>>, ApiError> {
    let filter = ReportFilter::try_from(query)?;
    let reports = state.reports.list(&filter).await;
    Ok(Json(reports.iter().map(ReportResponse::from).collect()))
}

/// Get a single report
#[utoipa::path(
    get,
    path = "/api/v1/reports/{id}",
    tag = "Reports",
    params(
        ("id" = Uuid, Path, description = "Report ID")
    ),
    responses(
        (status = 200, description = "Report details", body = ReportResponse),
        (status = 404, description = "Report not found", body = ErrorResponse)
    )
)]
pub async fn get_one(
    State(state): State<ApiState>,
    Path(id): Path<Uuid>,
) -> Result<Json<ReportResponse>, ApiError> {
    let report = state.reports.get(id).await?;
    Ok(Json(ReportResponse::from(&report)))
}

/// Move a report to another status
#[utoipa::path(
    put,
    path = "/api/v1/reports/{id}/status",
    tag = "Reports",
    params(
        ("id" = Uuid, Path, description = "Report ID")
    ),
    request_body = UpdateStatusRequest,
    responses(
        (status = 200, description = "Report updated", body = ReportResponse),
        (status = 400, description = "Unknown status", body = ErrorResponse),
        (status = 404, description = "Report not found", body = ErrorResponse)
    )
)]
pub async fn update_status(
    State(state): State<ApiState>,
    Path(id): Path<Uuid>,
    Json(request): Json<UpdateStatusRequest>,
) -> Result<Json<ReportResponse>, ApiError> {
    let status: ReportStatus = request.status.parse()?;
    let report = state.reports.update_status(id, status).await?;
    tracing::info!(report_id = %id, status = %status, "Report status updated");
    Ok(Json(ReportResponse::from(&report)))
}
