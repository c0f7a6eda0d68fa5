//! Integration tests for the REST API router
//!
//! Requests go through the full router (routing, extractors, error mapping)
//! via `tower::ServiceExt::oneshot`, without binding a port.

use axum::body::Body;
use axum::http::{Method, Request, StatusCode};
use axum::Router;
use http_body_util::BodyExt;
use serde_json::{json, Value};
use tower::ServiceExt;

use reportflow::config::Config;
use reportflow::rest::{build_router, ApiState};

// ─── Test Context ─────────────────────────────────────────────────────────────

/// Router over fresh state with instant submissions
fn test_router() -> Router {
    let mut config = Config::default();
    config.submission.simulated_delay_ms = 0;
    build_router(ApiState::new(config))
}

async fn send(router: &Router, method: Method, uri: &str, body: Option<Value>) -> (StatusCode, Value) {
    let builder = Request::builder().method(method).uri(uri);
    let request = match body {
        Some(body) => builder
            .header("content-type", "application/json")
            .body(Body::from(body.to_string()))
            .unwrap(),
        None => builder.body(Body::empty()).unwrap(),
    };

    let response = router.clone().oneshot(request).await.unwrap();
    let status = response.status();
    let bytes = response.into_body().collect().await.unwrap().to_bytes();
    let json = if bytes.is_empty() {
        Value::Null
    } else {
        serde_json::from_slice(&bytes).unwrap()
    };
    (status, json)
}

async fn create_session(router: &Router) -> String {
    let (status, body) = send(router, Method::POST, "/api/v1/sessions", None).await;
    assert_eq!(status, StatusCode::OK);
    body["id"].as_str().unwrap().to_string()
}

async fn submit(router: &Router, session: &str, fields: Value) -> (StatusCode, Value) {
    send(
        router,
        Method::POST,
        &format!("/api/v1/sessions/{}/flow/submit", session),
        Some(json!({ "fields": fields })),
    )
    .await
}

// ─── Tests ────────────────────────────────────────────────────────────────────

#[tokio::test]
async fn test_health_and_status() {
    let router = test_router();

    let (status, body) = send(&router, Method::GET, "/api/v1/health", None).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["status"], "ok");

    let (_, body) = send(&router, Method::GET, "/api/v1/status", None).await;
    assert_eq!(body["step_count"], 4);
    assert_eq!(body["report_count"], 4);
}

#[tokio::test]
async fn test_steps_endpoints() {
    let router = test_router();

    let (status, body) = send(&router, Method::GET, "/api/v1/steps", None).await;
    assert_eq!(status, StatusCode::OK);
    let titles: Vec<&str> = body
        .as_array()
        .unwrap()
        .iter()
        .map(|s| s["title"].as_str().unwrap())
        .collect();
    assert_eq!(titles, ["Category", "Details", "Location & photo", "Review"]);

    let (status, body) = send(&router, Method::GET, "/api/v1/steps/9", None).await;
    assert_eq!(status, StatusCode::NOT_FOUND);
    assert_eq!(body["error"], "not_found");
}

#[tokio::test]
async fn test_complete_report_flow_over_http() {
    let router = test_router();
    let session = create_session(&router).await;

    let (status, flow) = send(
        &router,
        Method::POST,
        &format!("/api/v1/sessions/{}/flow/open", session),
        Some(json!({ "prefill": { "category": "streetlight" } })),
    )
    .await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(flow["current_step"], 1);
    assert_eq!(flow["form"]["category"], "streetlight");

    let (status, body) = submit(&router, &session, json!({})).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["outcome"], "advanced");

    let (status, body) = submit(&router, &session, json!({ "title": "Dark" })).await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(body["error"], "validation_error");

    let (_, flow) = send(
        &router,
        Method::GET,
        &format!("/api/v1/sessions/{}/flow", session),
        None,
    )
    .await;
    assert_eq!(flow["current_step"], 2);
    assert!(flow["last_error"].is_string());

    submit(
        &router,
        &session,
        json!({ "title": "Lamp out", "description": "The lamp on Elm St is dark at night" }),
    )
    .await;
    submit(&router, &session, json!({ "address": "Elm St 12", "photo_url": null })).await;

    let (status, body) = submit(&router, &session, json!({ "confirmed": true })).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["outcome"], "submitted");
    assert_eq!(body["flow"]["is_open"], false);

    let report_id = body["receipt"]["report_id"].as_str().unwrap();
    let (status, report) = send(
        &router,
        Method::GET,
        &format!("/api/v1/reports/{}", report_id),
        None,
    )
    .await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(report["title"], "Lamp out");
    assert_eq!(report["status"], "submitted");

    let (_, session_body) = send(
        &router,
        Method::GET,
        &format!("/api/v1/sessions/{}", session),
        None,
    )
    .await;
    assert_eq!(session_body["completed_flows"], 1);
}

#[tokio::test]
async fn test_submit_while_closed_is_ignored() {
    let router = test_router();
    let session = create_session(&router).await;

    let (status, body) = submit(&router, &session, json!({})).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["outcome"], "ignored");
    assert_eq!(body["flow"]["is_open"], false);
}

#[tokio::test]
async fn test_open_with_malformed_prefill_is_bad_request() {
    let router = test_router();
    let session = create_session(&router).await;
    let open = format!("/api/v1/sessions/{}/flow/open", session);

    let (status, body) = send(
        &router,
        Method::POST,
        &open,
        Some(json!({ "prefill": { "category": { "nested": true } } })),
    )
    .await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(body["error"], "bad_request");

    let (status, flow) = send(
        &router,
        Method::POST,
        &open,
        Some(json!({ "prefill": { "category": "pothole", "latitude": 40.4 } })),
    )
    .await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(flow["form"]["latitude"], "40.4");
}

#[tokio::test]
async fn test_back_and_close_over_http() {
    let router = test_router();
    let session = create_session(&router).await;
    let base = format!("/api/v1/sessions/{}/flow", session);

    send(&router, Method::POST, &format!("{}/open", base), None).await;
    submit(&router, &session, json!({ "category": "noise" })).await;

    let (_, flow) = send(&router, Method::POST, &format!("{}/back", base), None).await;
    assert_eq!(flow["current_step"], 1);
    assert_eq!(flow["form"]["category"], "noise");

    let (_, flow) = send(&router, Method::POST, &format!("{}/close", base), None).await;
    assert_eq!(flow["is_open"], false);
    assert_eq!(flow["current_step"], 0);
}

#[tokio::test]
async fn test_reports_filter_and_dashboard() {
    let router = test_router();

    let (status, body) = send(&router, Method::GET, "/api/v1/reports?status=resolved", None).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body.as_array().unwrap().len(), 1);

    let (status, _) = send(&router, Method::GET, "/api/v1/reports?category=volcano", None).await;
    assert_eq!(status, StatusCode::BAD_REQUEST);

    let (status, body) = send(&router, Method::GET, "/api/v1/admin/dashboard", None).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["total_reports"], 4);
    assert_eq!(body["open_reports"], 3);
}

#[tokio::test]
async fn test_unknown_session_is_not_found() {
    let router = test_router();
    let (status, _) = send(
        &router,
        Method::GET,
        "/api/v1/sessions/00000000-0000-0000-0000-000000000000/flow",
        None,
    )
    .await;
    assert_eq!(status, StatusCode::NOT_FOUND);
}

#[tokio::test]
async fn test_openapi_document_is_served() {
    let router = test_router();
    let (status, body) = send(&router, Method::GET, "/api-docs/openapi.json", None).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["info"]["title"], "Reportflow API");
}
