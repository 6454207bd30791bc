//! Failures a request can end with and their rendering as an error envelope

use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use log::{error, warn};
use sea_orm::DbErr;
use thiserror::Error;

use crate::external_api::scan_control::ControlError;
use crate::web::response::ApiResponse;

pub type ApiResult<T> = Result<T, ApiError>;

#[derive(Debug, Error)]
pub enum ApiError {
    #[error("Invalid identifier: {0}")]
    InvalidIdentifier(String),
    #[error("Can't find using both name and hash")]
    AmbiguousQuery,
    #[error("Hash not supported")]
    UnsupportedHash,
    #[error("Invalid parameter: {0}")]
    InvalidParameter(String),
    #[error("Unknown scan id {0}")]
    UnknownScan(String),
    #[error("Unknown file {0}")]
    UnknownFile(String),
    #[error("Unknown probe(s): {0}")]
    UnknownProbe(String),
    #[error("Route {0} not found")]
    RouteNotFound(String),
    #[error("{0}")]
    InvalidState(String),
    #[error("Scan {0} has no files")]
    EmptyScan(String),
    #[error("File index {index} out of range, scan has {count} file(s)")]
    IndexOutOfRange { index: String, count: u64 },
    #[error("Backend unavailable: {0}")]
    BackendUnavailable(String),
    #[error("Backend timed out after {0} seconds")]
    BackendTimeout(u64),
    #[error("Database error: {0}")]
    Database(#[from] DbErr),
    #[error("Storage error: {0}")]
    Storage(#[from] std::io::Error),
}

/// Coarse class of an [ApiError], decides the HTTP status and the log level
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum ErrorKind {
    Validation,
    NotFound,
    State,
    IndexOutOfRange,
    Backend,
    Timeout,
    Internal,
}

impl ApiError {
    pub fn kind(&self) -> ErrorKind {
        match self {
            ApiError::InvalidIdentifier(_)
            | ApiError::AmbiguousQuery
            | ApiError::UnsupportedHash
            | ApiError::InvalidParameter(_) => ErrorKind::Validation,
            ApiError::UnknownScan(_)
            | ApiError::UnknownFile(_)
            | ApiError::UnknownProbe(_)
            | ApiError::RouteNotFound(_) => ErrorKind::NotFound,
            ApiError::InvalidState(_) | ApiError::EmptyScan(_) => ErrorKind::State,
            ApiError::IndexOutOfRange { .. } => ErrorKind::IndexOutOfRange,
            ApiError::BackendUnavailable(_) => ErrorKind::Backend,
            ApiError::BackendTimeout(_) => ErrorKind::Timeout,
            ApiError::Database(_) | ApiError::Storage(_) => ErrorKind::Internal,
        }
    }

    pub fn status_code(&self) -> StatusCode {
        match self.kind() {
            ErrorKind::Validation => StatusCode::BAD_REQUEST,
            ErrorKind::NotFound => StatusCode::NOT_FOUND,
            ErrorKind::State => StatusCode::CONFLICT,
            ErrorKind::IndexOutOfRange => StatusCode::RANGE_NOT_SATISFIABLE,
            ErrorKind::Backend => StatusCode::BAD_GATEWAY,
            ErrorKind::Timeout => StatusCode::GATEWAY_TIMEOUT,
            ErrorKind::Internal => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }
}

impl From<ControlError> for ApiError {
    fn from(err: ControlError) -> Self {
        match err {
            ControlError::Timeout(secs) => ApiError::BackendTimeout(secs),
            ControlError::Unavailable(msg) | ControlError::Rejected(msg) => {
                ApiError::BackendUnavailable(msg)
            }
        }
    }
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        match self.kind() {
            ErrorKind::Timeout => error!("Request timed out: {}", self),
            ErrorKind::Backend | ErrorKind::Internal => error!("Request failed: {}", self),
            _ => warn!("Request rejected: {}", self),
        }
        (self.status_code(), ApiResponse::error(self.to_string())).into_response()
    }
}

#[cfg(test)]
mod tests {
    use axum::http::StatusCode;
    use sea_orm::DbErr;

    use crate::errors::{ApiError, ErrorKind};
    use crate::external_api::scan_control::ControlError;

    #[test]
    fn status_per_kind() {
        assert_eq!(ApiError::AmbiguousQuery.status_code(), StatusCode::BAD_REQUEST);
        assert_eq!(
            ApiError::UnknownScan("x".to_owned()).status_code(),
            StatusCode::NOT_FOUND
        );
        assert_eq!(
            ApiError::InvalidState("launched".to_owned()).status_code(),
            StatusCode::CONFLICT
        );
        assert_eq!(
            ApiError::IndexOutOfRange {
                index: "3".to_owned(),
                count: 1
            }
            .status_code(),
            StatusCode::RANGE_NOT_SATISFIABLE
        );
        assert_eq!(
            ApiError::BackendTimeout(5).status_code(),
            StatusCode::GATEWAY_TIMEOUT
        );
        assert_eq!(
            ApiError::Database(DbErr::Custom("down".to_owned())).kind(),
            ErrorKind::Internal
        );
    }

    #[test]
    fn control_errors_convert() {
        assert!(matches!(
            ApiError::from(ControlError::Timeout(2)),
            ApiError::BackendTimeout(2)
        ));
        assert_eq!(
            ApiError::from(ControlError::Unavailable("refused".to_owned())).kind(),
            ErrorKind::Backend
        );
    }

    #[test]
    fn messages() {
        assert_eq!(
            ApiError::AmbiguousQuery.to_string(),
            "Can't find using both name and hash"
        );
        assert_eq!(ApiError::UnsupportedHash.to_string(), "Hash not supported");
    }
}
