use attendance_domain::DecodeError;
use thiserror::Error;

use crate::commands::{IssueError, RecorderError};
use crate::ops::ScanError;

#[derive(Debug, Error)]
pub enum AppError {
    #[error("unauthorized")]
    Unauthorized,
    #[error("bad request: {0}")]
    BadRequest(String),
    #[error(transparent)]
    Decode(#[from] DecodeError),
    #[error(transparent)]
    Issue(#[from] IssueError),
    #[error(transparent)]
    Scan(#[from] ScanError),
    #[error(transparent)]
    Recorder(#[from] RecorderError),
    #[error(transparent)]
    Internal(#[from] anyhow::Error),
}
