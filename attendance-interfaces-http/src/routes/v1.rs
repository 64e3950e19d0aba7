use axum::Router;

use attendance_application::AppState;

use crate::handlers::{attendance_handlers, credential_handlers, ops_handlers};

pub fn build_router(state: AppState) -> Router {
    Router::new()
        .route(
            "/v1/credentials",
            axum::routing::post(credential_handlers::issue_credential),
        )
        .route(
            "/v1/attendance/scan",
            axum::routing::post(attendance_handlers::scan_attendance),
        )
        .route(
            "/v1/attendance/connectivity",
            axum::routing::get(attendance_handlers::check_connectivity),
        )
        .route(
            "/v1/ops/health/live",
            axum::routing::get(ops_handlers::health_live),
        )
        .route(
            "/v1/ops/metrics/prometheus",
            axum::routing::get(ops_handlers::metrics_prometheus),
        )
        .with_state(state)
}
