use axum::extract::{Query, State};
use axum::http::{header, HeaderMap, HeaderName, HeaderValue, StatusCode};
use axum::response::{IntoResponse, Response};
use axum::Json;
use serde::Deserialize;
use tracing::error;

use attendance_application::commands::RegistrationForm;
use attendance_application::{AppError, AppState};

use crate::error::HttpError;
use crate::middleware::authorize;

pub const CREDENTIAL_LOCATION_HEADER: &str = "x-credential-location";

#[derive(Debug, Default, Deserialize)]
pub struct IssueQuery {
    /// Also keep a copy in the credential directory.
    #[serde(default)]
    pub retain: bool,
}

/// Issues a credential and returns it as a PNG download.
pub async fn issue_credential(
    State(state): State<AppState>,
    headers: HeaderMap,
    Query(query): Query<IssueQuery>,
    Json(form): Json<RegistrationForm>,
) -> Result<Response, HttpError> {
    if !authorize(&state.config, &headers) {
        return Err(HttpError::Unauthorized);
    }

    let mut issuer = state.issuer();
    let cancel = state.shutdown.child_token();
    let issued = issuer
        .submit(&form, &cancel)
        .await
        .map_err(AppError::from)?
        .clone();

    let mut response_headers = HeaderMap::new();
    response_headers.insert(header::CONTENT_TYPE, HeaderValue::from_static("image/png"));
    let disposition = format!("attachment; filename=\"{}\"", issued.file_name);
    if let Ok(value) = HeaderValue::from_str(&disposition) {
        response_headers.insert(header::CONTENT_DISPOSITION, value);
    }

    if query.retain {
        let location = issuer.retain().await.map_err(|err| {
            error!("failed to retain credential: {}", err);
            AppError::from(err)
        })?;
        if let Ok(value) = HeaderValue::from_str(&location) {
            response_headers.insert(HeaderName::from_static(CREDENTIAL_LOCATION_HEADER), value);
        }
    }

    Ok((StatusCode::OK, response_headers, issued.png).into_response())
}
