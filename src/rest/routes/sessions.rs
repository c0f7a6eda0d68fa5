//! Session and report-flow endpoints.
//!
//! A client creates a session once, then drives its report flow with
//! open/submit/back/close. The final submit stores the report.

use std::sync::Arc;

use axum::{
    body::Bytes,
    extract::{Path, State},
    Json,
};
use uuid::Uuid;

use crate::flow::{submit_current_step, StepOutcome};
use crate::rest::dto::{
    FlowStateResponse, OpenFlowRequest, SessionResponse, SubmitStepRequest, SubmitStepResponse,
};
use crate::rest::error::{ApiError, ErrorResponse};
use crate::rest::state::ApiState;
use crate::session::Session;

async fn find_session(state: &ApiState, id: Uuid) -> Result<Arc<Session>, ApiError> {
    state
        .sessions
        .get(id)
        .await
        .ok_or_else(|| ApiError::NotFound(format!("Session '{}' not found", id)))
}

async fn flow_state(state: &ApiState, session: &Session) -> FlowStateResponse {
    let snapshot = session.flow.lock().await.snapshot();
    FlowStateResponse::from_snapshot(snapshot, state.sessions.steps())
}

/// Create a new session with a closed report flow
#[utoipa::path(
    post,
    path = "/api/v1/sessions",
    tag = "Sessions",
    responses(
        (status = 200, description = "Session created", body = SessionResponse)
    )
)]
pub async fn create(State(state): State<ApiState>) -> Json<SessionResponse> {
    let session = state.sessions.create().await;
    let flow = flow_state(&state, &session).await;
    Json(SessionResponse::new(&session, flow))
}

/// Get a session and its flow state
#[utoipa::path(
    get,
    path = "/api/v1/sessions/{id}",
    tag = "Sessions",
    params(
        ("id" = Uuid, Path, description = "Session ID")
    ),
    responses(
        (status = 200, description = "Session details", body = SessionResponse),
        (status = 404, description = "Session not found", body = ErrorResponse)
    )
)]
pub async fn get_one(
    State(state): State<ApiState>,
    Path(id): Path<Uuid>,
) -> Result<Json<SessionResponse>, ApiError> {
    let session = find_session(&state, id).await?;
    let flow = flow_state(&state, &session).await;
    Ok(Json(SessionResponse::new(&session, flow)))
}

/// End a session, discarding any open flow
#[utoipa::path(
    delete,
    path = "/api/v1/sessions/{id}",
    tag = "Sessions",
    params(
        ("id" = Uuid, Path, description = "Session ID")
    ),
    responses(
        (status = 200, description = "Session removed"),
        (status = 404, description = "Session not found", body = ErrorResponse)
    )
)]
pub async fn delete(
    State(state): State<ApiState>,
    Path(id): Path<Uuid>,
) -> Result<Json<serde_json::Value>, ApiError> {
    if !state.sessions.remove(id).await {
        return Err(ApiError::NotFound(format!("Session '{}' not found", id)));
    }
    Ok(Json(serde_json::json!({ "removed": id })))
}

/// Get the session's flow state
#[utoipa::path(
    get,
    path = "/api/v1/sessions/{id}/flow",
    tag = "Flow",
    params(
        ("id" = Uuid, Path, description = "Session ID")
    ),
    responses(
        (status = 200, description = "Flow state", body = FlowStateResponse),
        (status = 404, description = "Session not found", body = ErrorResponse)
    )
)]
pub async fn flow(
    State(state): State<ApiState>,
    Path(id): Path<Uuid>,
) -> Result<Json<FlowStateResponse>, ApiError> {
    let session = find_session(&state, id).await?;
    Ok(Json(flow_state(&state, &session).await))
}

/// Open (or restart) the report flow at step 1
#[utoipa::path(
    post,
    path = "/api/v1/sessions/{id}/flow/open",
    tag = "Flow",
    params(
        ("id" = Uuid, Path, description = "Session ID")
    ),
    request_body = OpenFlowRequest,
    responses(
        (status = 200, description = "Flow opened", body = FlowStateResponse),
        (status = 400, description = "Malformed request body", body = ErrorResponse),
        (status = 404, description = "Session not found", body = ErrorResponse)
    )
)]
pub async fn open(
    State(state): State<ApiState>,
    Path(id): Path<Uuid>,
    body: Bytes,
) -> Result<Json<FlowStateResponse>, ApiError> {
    // An empty body opens without prefill
    let request: OpenFlowRequest = if body.iter().all(u8::is_ascii_whitespace) {
        OpenFlowRequest::default()
    } else {
        serde_json::from_slice(&body)?
    };
    let session = find_session(&state, id).await?;
    session.open_flow(request.prefill).await;
    Ok(Json(flow_state(&state, &session).await))
}

/// Validate and submit the current step
///
/// On the final step the report is sent to the submission service and the
/// flow closes once it is stored.
#[utoipa::path(
    post,
    path = "/api/v1/sessions/{id}/flow/submit",
    tag = "Flow",
    params(
        ("id" = Uuid, Path, description = "Session ID")
    ),
    request_body = SubmitStepRequest,
    responses(
        (status = 200, description = "Step accepted", body = SubmitStepResponse),
        (status = 400, description = "Validation error, flow stays on the step", body = ErrorResponse),
        (status = 404, description = "Session not found", body = ErrorResponse),
        (status = 409, description = "Submission already in progress", body = ErrorResponse),
        (status = 502, description = "Submission failed, flow stays on the final step", body = ErrorResponse)
    )
)]
pub async fn submit(
    State(state): State<ApiState>,
    Path(id): Path<Uuid>,
    Json(request): Json<SubmitStepRequest>,
) -> Result<Json<SubmitStepResponse>, ApiError> {
    let session = find_session(&state, id).await?;
    let outcome =
        submit_current_step(&session.flow, state.submission.as_ref(), request.fields).await?;

    // Ignored covers late or duplicate submits on a closed flow
    let (outcome, receipt) = match outcome {
        StepOutcome::Advanced { .. } => ("advanced", None),
        StepOutcome::Completed => ("completed", None),
        StepOutcome::Submitted(receipt) => ("submitted", Some(receipt.into())),
        StepOutcome::Ignored => ("ignored", None),
    };

    Ok(Json(SubmitStepResponse {
        outcome: outcome.to_string(),
        receipt,
        flow: flow_state(&state, &session).await,
    }))
}

/// Go back one step (no-op on the first step)
#[utoipa::path(
    post,
    path = "/api/v1/sessions/{id}/flow/back",
    tag = "Flow",
    params(
        ("id" = Uuid, Path, description = "Session ID")
    ),
    responses(
        (status = 200, description = "Flow state after going back", body = FlowStateResponse),
        (status = 404, description = "Session not found", body = ErrorResponse)
    )
)]
pub async fn back(
    State(state): State<ApiState>,
    Path(id): Path<Uuid>,
) -> Result<Json<FlowStateResponse>, ApiError> {
    let session = find_session(&state, id).await?;
    session.flow.lock().await.go_back();
    Ok(Json(flow_state(&state, &session).await))
}

/// Close the flow without submitting
#[utoipa::path(
    post,
    path = "/api/v1/sessions/{id}/flow/close",
    tag = "Flow",
    params(
        ("id" = Uuid, Path, description = "Session ID")
    ),
    responses(
        (status = 200, description = "Flow closed", body = FlowStateResponse),
        (status = 404, description = "Session not found", body = ErrorResponse)
    )
)]
pub async fn close(
    State(state): State<ApiState>,
    Path(id): Path<Uuid>,
) -> Result<Json<FlowStateResponse>, ApiError> {
    let session = find_session(&state, id).await?;
    session.flow.lock().await.close();
    Ok(Json(flow_state(&state, &session).await))
}
