//! Admin dashboard endpoint.

use axum::{extract::State, Json};

use crate::rest::dto::DashboardResponse;
use crate::rest::state::ApiState;

/// Report counts by status and category, plus active sessions
#[utoipa::path(
    get,
    path = "/api/v1/admin/dashboard",
    tag = "Admin",
    responses(
        (status = 200, description = "Dashboard numbers", body = DashboardResponse)
    )
)]
pub async fn dashboard(State(state): State<ApiState>) -> Json<DashboardResponse> {
    let stats = state.reports.stats().await;
    let active_sessions = state.sessions.count().await;
    Json(DashboardResponse::new(stats, active_sessions))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::Config;

    #[tokio::test]
    async fn test_dashboard_counts_sample_data() {
        let state = ApiState::new(Config::default());
        state.sessions.create().await;

        let dashboard = dashboard(State(state)).await;
        assert_eq!(dashboard.total_reports, 4);
        assert_eq!(dashboard.open_reports, 3);
        assert_eq!(dashboard.by_status.get("resolved"), Some(&1));
        assert_eq!(dashboard.active_sessions, 1);
    }
}
