//! OpenAPI specification builder using utoipa.

use utoipa::OpenApi;

use crate::rest::dto::{
    CategoryResponse, DashboardResponse, FlowStateResponse, HealthResponse, OpenFlowRequest,
    ReceiptResponse, ReportResponse, SessionResponse, StatusResponse, StepResponse,
    SubmitStepRequest, SubmitStepResponse, UpdateStatusRequest,
};
use crate::rest::error::ErrorResponse;

/// OpenAPI documentation for the Reportflow REST API
#[derive(OpenApi)]
#[openapi(
    info(
        title = "Reportflow API",
        version = "0.1.0",
        description = "REST API for filing citizen issue reports through a guided multi-step flow.",
        license(name = "MIT")
    ),
    paths(
        // Health endpoints
        crate::rest::routes::health::health,
        crate::rest::routes::health::status,
        // Step endpoints
        crate::rest::routes::steps::list,
        crate::rest::routes::steps::get_one,
        crate::rest::routes::steps::categories,
        // Session endpoints
        crate::rest::routes::sessions::create,
        crate::rest::routes::sessions::get_one,
        crate::rest::routes::sessions::delete,
        // Flow endpoints
        crate::rest::routes::sessions::flow,
        crate::rest::routes::sessions::open,
        crate::rest::routes::sessions::submit,
        crate::rest::routes::sessions::back,
        crate::rest::routes::sessions::close,
        // Report endpoints
        crate::rest::routes::reports::list,
        crate::rest::routes::reports::get_one,
        crate::rest::routes::reports::update_status,
        // Admin endpoints
        crate::rest::routes::admin::dashboard,
    ),
    components(
        schemas(
            // Response types
            HealthResponse,
            StatusResponse,
            StepResponse,
            CategoryResponse,
            SessionResponse,
            FlowStateResponse,
            SubmitStepResponse,
            ReceiptResponse,
            ReportResponse,
            DashboardResponse,
            ErrorResponse,
            // Request types
            OpenFlowRequest,
            SubmitStepRequest,
            UpdateStatusRequest,
        )
    ),
    tags(
        (name = "Health", description = "Health check and status endpoints"),
        (name = "Steps", description = "Report flow steps and categories"),
        (name = "Sessions", description = "Client sessions"),
        (name = "Flow", description = "Driving a session's report flow"),
        (name = "Reports", description = "Stored reports"),
        (name = "Admin", description = "Dashboard numbers"),
    )
)]
pub struct ApiDoc;

impl ApiDoc {
    /// Generate the OpenAPI specification as a JSON string
    pub fn json() -> Result<String, serde_json::Error> {
        serde_json::to_string_pretty(&Self::openapi())
    }

    /// Generate the OpenAPI specification as a YAML string
    pub fn yaml() -> Result<String, serde_yaml::Error> {
        serde_yaml::to_string(&Self::openapi())
    }
}
