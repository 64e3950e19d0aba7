use axum::extract::State;
use axum::http::{HeaderMap, StatusCode};
use axum::Json;
use serde::{Deserialize, Serialize};
use tokio::time::{timeout, Duration};
use tracing::{error, warn};

use attendance_application::ops::ConnectivityMonitor;
use attendance_application::{AppError, AppState};
use attendance_domain::ports::IdentityProvider;
use attendance_domain::{decode_payload, AttendanceRecord, ConnectivityStatus};

use crate::error::HttpError;
use crate::middleware::{authorize, HeaderIdentity};

/// Text a scanner read from a credential.
#[derive(Debug, Deserialize)]
pub struct ScanSubmission {
    pub content: String,
}

#[derive(Debug, Serialize)]
pub struct ConnectivityReport {
    pub status: ConnectivityStatus,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub message: Option<String>,
}

/// Decodes scanned content and records attendance for it.
pub async fn scan_attendance(
    State(state): State<AppState>,
    headers: HeaderMap,
    Json(submission): Json<ScanSubmission>,
) -> Result<(StatusCode, Json<AttendanceRecord>), HttpError> {
    if !authorize(&state.config, &headers) {
        return Err(HttpError::Unauthorized);
    }

    let payload = decode_payload(&submission.content).map_err(|err| {
        warn!("rejected scanned content: {}", err);
        state.metrics.record_scan_rejected();
        AppError::from(err)
    })?;
    state.metrics.record_scan_decoded();

    let volunteer = HeaderIdentity::from_headers(&headers)
        .current_user()
        .unwrap_or_default();
    let cancel = state.shutdown.child_token();
    let record = state
        .recorder()
        .mark_attendance(&payload, &volunteer, &cancel)
        .await
        .map_err(AppError::from)?;
    Ok((StatusCode::CREATED, Json(record)))
}

/// Re-runs the datastore preflight and reports the outcome.
pub async fn check_connectivity(
    State(state): State<AppState>,
    headers: HeaderMap,
) -> Result<(StatusCode, Json<ConnectivityReport>), HttpError> {
    if !authorize(&state.config, &headers) {
        return Err(HttpError::Unauthorized);
    }

    let timeout_secs = state.config.request_timeout_seconds.max(1);
    let cancel = state.shutdown.child_token();
    let status = match timeout(
        Duration::from_secs(timeout_secs),
        state.recorder().check_connectivity(&cancel),
    )
    .await
    {
        Ok(status) => status,
        Err(_) => {
            error!("connectivity check timeout after {}s", timeout_secs);
            cancel.cancel();
            state
                .connectivity
                .mark_failed(&format!("no answer within {}s", timeout_secs))
                .await;
            ConnectivityStatus::Error
        }
    };

    let code = if status.is_connected() {
        StatusCode::OK
    } else {
        StatusCode::SERVICE_UNAVAILABLE
    };
    Ok((
        code,
        Json(ConnectivityReport {
            status,
            message: ConnectivityMonitor::banner(status).map(ToString::to_string),
        }),
    ))
}

#[cfg(test)]
mod tests {
    use std::sync::Arc;

    use super::*;
    use crate::test_support::{memory_state, state_with};
    use async_trait::async_trait;
    use attendance_domain::ports::AttendanceRepository;
    use attendance_domain::NewAttendanceRecord;
    use axum::http::HeaderValue;
    use axum::response::IntoResponse;

    const ADA: &str = r#"{"registrationNumber":"REG-001","name":"Ada Lovelace","event":"Inferno Verse 2025","timestamp":"2025-03-01T09:30:00.000Z"}"#;

    struct DownRepository;

    #[async_trait]
    impl AttendanceRepository for DownRepository {
        async fn insert(&self, _record: &NewAttendanceRecord) -> anyhow::Result<AttendanceRecord> {
            Err(anyhow::anyhow!("connection refused"))
        }

        async fn count(&self) -> anyhow::Result<u64> {
            Err(anyhow::anyhow!("connection refused"))
        }

        async fn find_by_registration(
            &self,
            _event_name: &str,
            _registration_number: &str,
        ) -> anyhow::Result<Option<AttendanceRecord>> {
            Ok(None)
        }
    }

    fn volunteer_headers() -> HeaderMap {
        let mut headers = HeaderMap::new();
        headers.insert("X-Volunteer-Name", HeaderValue::from_static("Grace Hopper"));
        headers
    }

    fn submission(content: &str) -> Json<ScanSubmission> {
        Json(ScanSubmission {
            content: content.to_string(),
        })
    }

    #[tokio::test]
    async fn scan_after_preflight_creates_record() {
        let dir = tempfile::tempdir().expect("tempdir");
        let (state, repo) = memory_state(dir.path());

        let (code, _) = check_connectivity(State(state.clone()), HeaderMap::new())
            .await
            .expect("preflight");
        assert_eq!(code, StatusCode::OK);

        let (code, Json(record)) =
            scan_attendance(State(state.clone()), volunteer_headers(), submission(ADA))
                .await
                .expect("marked");
        assert_eq!(code, StatusCode::CREATED);
        assert_eq!(record.registration_number, "REG-001");
        assert_eq!(record.marked_by_volunteer, "Grace Hopper");
        assert_eq!(repo.snapshot().await.len(), 1);
        assert_eq!(state.metrics.attendance_marked(), 1);
    }

    #[tokio::test]
    async fn scan_without_preflight_is_service_unavailable() {
        let dir = tempfile::tempdir().expect("tempdir");
        let (state, repo) = memory_state(dir.path());

        let err = scan_attendance(State(state), volunteer_headers(), submission(ADA))
            .await
            .expect_err("not connected");
        assert_eq!(err.into_response().status(), StatusCode::SERVICE_UNAVAILABLE);
        assert!(repo.snapshot().await.is_empty());
    }

    #[tokio::test]
    async fn unusable_content_is_unprocessable() {
        let dir = tempfile::tempdir().expect("tempdir");
        let (state, _) = memory_state(dir.path());

        let err = scan_attendance(State(state.clone()), HeaderMap::new(), submission("hello"))
            .await
            .expect_err("malformed");
        assert_eq!(err.into_response().status(), StatusCode::UNPROCESSABLE_ENTITY);

        let err = scan_attendance(
            State(state),
            HeaderMap::new(),
            submission(r#"{"name":"Ada"}"#),
        )
        .await
        .expect_err("incomplete");
        assert_eq!(err.into_response().status(), StatusCode::UNPROCESSABLE_ENTITY);
    }

    struct StalledRepository;

    #[async_trait]
    impl AttendanceRepository for StalledRepository {
        async fn insert(&self, _record: &NewAttendanceRecord) -> anyhow::Result<AttendanceRecord> {
            std::future::pending().await
        }

        async fn count(&self) -> anyhow::Result<u64> {
            std::future::pending().await
        }

        async fn find_by_registration(
            &self,
            _event_name: &str,
            _registration_number: &str,
        ) -> anyhow::Result<Option<AttendanceRecord>> {
            std::future::pending().await
        }
    }

    #[tokio::test(start_paused = true)]
    async fn timed_out_check_blocks_writes_as_error() {
        let dir = tempfile::tempdir().expect("tempdir");
        let state = state_with(Arc::new(StalledRepository), dir.path());

        let (code, Json(report)) = check_connectivity(State(state.clone()), HeaderMap::new())
            .await
            .expect("report");
        assert_eq!(code, StatusCode::SERVICE_UNAVAILABLE);
        assert_eq!(report.status, ConnectivityStatus::Error);
        assert_eq!(state.connectivity.status().await, ConnectivityStatus::Error);

        let err = scan_attendance(State(state), volunteer_headers(), submission(ADA))
            .await
            .expect_err("not connected");
        assert_eq!(err.into_response().status(), StatusCode::SERVICE_UNAVAILABLE);
    }

    #[tokio::test]
    async fn unreachable_datastore_reports_banner() {
        let dir = tempfile::tempdir().expect("tempdir");
        let state = state_with(Arc::new(DownRepository), dir.path());

        let (code, Json(report)) = check_connectivity(State(state), HeaderMap::new())
            .await
            .expect("report");
        assert_eq!(code, StatusCode::SERVICE_UNAVAILABLE);
        assert_eq!(report.status, ConnectivityStatus::Error);
        assert!(report.message.is_some());
    }

    #[tokio::test]
    async fn anonymous_scan_uses_placeholder_volunteer() {
        let dir = tempfile::tempdir().expect("tempdir");
        let (state, _) = memory_state(dir.path());
        let (code, _) = check_connectivity(State(state.clone()), HeaderMap::new())
            .await
            .expect("preflight");
        assert_eq!(code, StatusCode::OK);

        let (_, Json(record)) = scan_attendance(State(state), HeaderMap::new(), submission(ADA))
            .await
            .expect("marked");
        assert_eq!(record.marked_by_volunteer, "Unknown Volunteer");
    }
}
