//! REST API for the citizen report flow.
//!
//! Clients create a session, drive its report flow step by step, and read
//! back stored reports. Swagger UI is served at `/swagger-ui`.

use std::net::SocketAddr;

use anyhow::Result;
use axum::{
    routing::{get, post, put},
    Router,
};
use tower_http::cors::{Any, CorsLayer};
use tower_http::trace::TraceLayer;
use utoipa::OpenApi;
use utoipa_swagger_ui::SwaggerUi;

pub mod dto;
pub mod error;
pub mod openapi;
pub mod routes;
pub mod state;

pub use openapi::ApiDoc;
pub use state::ApiState;

/// Default port for the REST API server
pub const DEFAULT_PORT: u16 = 7410;

/// Build the API router with all routes
pub fn build_router(state: ApiState) -> Router {
    let cors = CorsLayer::new()
        .allow_origin(Any)
        .allow_methods(Any)
        .allow_headers(Any);

    Router::new()
        // Health endpoints
        .route("/api/v1/health", get(routes::health::health))
        .route("/api/v1/status", get(routes::health::status))
        // Step registry endpoints
        .route("/api/v1/steps", get(routes::steps::list))
        .route("/api/v1/steps/:order", get(routes::steps::get_one))
        .route("/api/v1/categories", get(routes::steps::categories))
        // Session endpoints
        .route("/api/v1/sessions", post(routes::sessions::create))
        .route(
            "/api/v1/sessions/:id",
            get(routes::sessions::get_one).delete(routes::sessions::delete),
        )
        // Flow endpoints
        .route("/api/v1/sessions/:id/flow", get(routes::sessions::flow))
        .route(
            "/api/v1/sessions/:id/flow/open",
            post(routes::sessions::open),
        )
        .route(
            "/api/v1/sessions/:id/flow/submit",
            post(routes::sessions::submit),
        )
        .route(
            "/api/v1/sessions/:id/flow/back",
            post(routes::sessions::back),
        )
        .route(
            "/api/v1/sessions/:id/flow/close",
            post(routes::sessions::close),
        )
        // Report endpoints
        .route("/api/v1/reports", get(routes::reports::list))
        .route("/api/v1/reports/:id", get(routes::reports::get_one))
        .route(
            "/api/v1/reports/:id/status",
            put(routes::reports::update_status),
        )
        // Admin endpoints
        .route("/api/v1/admin/dashboard", get(routes::admin::dashboard))
        .merge(SwaggerUi::new("/swagger-ui").url("/api-docs/openapi.json", ApiDoc::openapi()))
        .layer(TraceLayer::new_for_http())
        .layer(cors)
        .with_state(state)
}

/// Start the REST API server, stopping on Ctrl-C
pub async fn serve(state: ApiState, host: &str, port: u16) -> Result<()> {
    let app = build_router(state);
    let addr: SocketAddr = format!("{}:{}", host, port).parse()?;

    tracing::info!("REST API listening on http://{}", addr);

    let listener = tokio::net::TcpListener::bind(addr).await?;
    axum::serve(listener, app)
        .with_graceful_shutdown(shutdown_signal())
        .await?;

    tracing::info!("REST API server stopped");
    Ok(())
}

async fn shutdown_signal() {
    if let Err(e) = tokio::signal::ctrl_c().await {
        tracing::error!("Failed to listen for shutdown signal: {}", e);
    }
}
