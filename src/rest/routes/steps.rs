//! Step registry and category endpoints.

use axum::{
    extract::{Path, State},
    Json,
};

use crate::reports::ReportCategory;
use crate::rest::dto::{CategoryResponse, StepResponse};
use crate::rest::error::{ApiError, ErrorResponse};
use crate::rest::state::ApiState;

/// List the steps of the report flow, in order
#[utoipa::path(
    get,
    path = "/api/v1/steps",
    tag = "Steps",
    responses(
        (status = 200, description = "Ordered list of steps", body = Vec<StepResponse>)
    )
)]
pub async fn list(State(state): State<ApiState>) -> Json<Vec<StepResponse>> {
    Json(
        state
            .sessions
            .steps()
            .list()
            .iter()
            .map(StepResponse::from)
            .collect(),
    )
}

/// Get a single step by its order
#[utoipa::path(
    get,
    path = "/api/v1/steps/{order}",
    tag = "Steps",
    params(
        ("order" = u32, Path, description = "1-based step order")
    ),
    responses(
        (status = 200, description = "Step details", body = StepResponse),
        (status = 404, description = "Step not found", body = ErrorResponse)
    )
)]
pub async fn get_one(
    State(state): State<ApiState>,
    Path(order): Path<u32>,
) -> Result<Json<StepResponse>, ApiError> {
    let step = state.sessions.steps().get(order)?;
    Ok(Json(StepResponse::from(step)))
}

/// List report categories
#[utoipa::path(
    get,
    path = "/api/v1/categories",
    tag = "Steps",
    responses(
        (status = 200, description = "Selectable categories", body = Vec<CategoryResponse>)
    )
)]
pub async fn categories() -> Json<Vec<CategoryResponse>> {
    Json(
        ReportCategory::all()
            .iter()
            .map(CategoryResponse::from)
            .collect(),
    )
}
