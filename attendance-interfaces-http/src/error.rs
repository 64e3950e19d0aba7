use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use axum::Json;
use serde::Serialize;

use attendance_application::commands::{IssueError, RecorderError};
use attendance_application::AppError;

#[derive(Debug)]
pub enum HttpError {
    Unauthorized,
    BadRequest(String),
    Unprocessable(String),
    Conflict(String),
    ServiceUnavailable(String),
    BadGateway(String),
    Internal(String),
}

impl From<AppError> for HttpError {
    fn from(value: AppError) -> Self {
        let message = value.to_string();
        match value {
            AppError::Unauthorized => HttpError::Unauthorized,
            AppError::BadRequest(msg) => HttpError::BadRequest(msg),
            AppError::Decode(_) => HttpError::Unprocessable(message),
            AppError::Issue(IssueError::Validation { .. }) => HttpError::Unprocessable(message),
            AppError::Issue(IssueError::Cancelled) => HttpError::ServiceUnavailable(message),
            AppError::Issue(_) => HttpError::Internal(message),
            AppError::Recorder(RecorderError::NotConnected | RecorderError::Cancelled) => {
                HttpError::ServiceUnavailable(message)
            }
            AppError::Recorder(RecorderError::AlreadyMarked { .. }) => HttpError::Conflict(message),
            AppError::Recorder(RecorderError::Datastore(_)) => HttpError::BadGateway(message),
            AppError::Scan(_) | AppError::Internal(_) => HttpError::Internal(message),
        }
    }
}

#[derive(Serialize)]
struct ErrorBody {
    error: String,
}

impl IntoResponse for HttpError {
    fn into_response(self) -> Response {
        let (status, message) = match self {
            HttpError::Unauthorized => (StatusCode::UNAUTHORIZED, "unauthorized".to_string()),
            HttpError::BadRequest(msg) => (StatusCode::BAD_REQUEST, format!("bad request: {}", msg)),
            HttpError::Unprocessable(msg) => (StatusCode::UNPROCESSABLE_ENTITY, msg),
            HttpError::Conflict(msg) => (StatusCode::CONFLICT, msg),
            HttpError::ServiceUnavailable(msg) => (StatusCode::SERVICE_UNAVAILABLE, msg),
            HttpError::BadGateway(msg) => (StatusCode::BAD_GATEWAY, msg),
            HttpError::Internal(msg) => (StatusCode::INTERNAL_SERVER_ERROR, msg),
        };
        (status, Json(ErrorBody { error: message })).into_response()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use attendance_domain::DecodeError;

    fn status_of(err: AppError) -> StatusCode {
        HttpError::from(err).into_response().status()
    }

    #[test]
    fn maps_application_errors_to_statuses() {
        assert_eq!(
            status_of(AppError::Decode(DecodeError::Malformed)),
            StatusCode::UNPROCESSABLE_ENTITY
        );
        assert_eq!(
            status_of(AppError::Issue(IssueError::Validation { field: "name" })),
            StatusCode::UNPROCESSABLE_ENTITY
        );
        assert_eq!(
            status_of(AppError::Recorder(RecorderError::NotConnected)),
            StatusCode::SERVICE_UNAVAILABLE
        );
        assert_eq!(
            status_of(AppError::Recorder(RecorderError::AlreadyMarked {
                registration_number: "REG-001".to_string(),
                marked_by: "Grace Hopper".to_string(),
            })),
            StatusCode::CONFLICT
        );
        assert_eq!(
            status_of(AppError::Recorder(RecorderError::Datastore("boom".to_string()))),
            StatusCode::BAD_GATEWAY
        );
        assert_eq!(status_of(AppError::Unauthorized), StatusCode::UNAUTHORIZED);
    }
}
