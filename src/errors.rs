use axum::http::StatusCode;
use thiserror::Error;

#[derive(Debug)]
pub struct AppError {
    pub status: StatusCode,
    pub message: String,
}

impl AppError {
    pub fn internal(err: impl std::error::Error) -> Self {
        Self {
            status: StatusCode::INTERNAL_SERVER_ERROR,
            message: err.to_string(),
        }
    }
}

impl From<PeakError> for AppError {
    fn from(err: PeakError) -> Self {
        Self::internal(err)
    }
}

impl axum::response::IntoResponse for AppError {
    fn into_response(self) -> axum::response::Response {
        (self.status, self.message).into_response()
    }
}

#[derive(Debug, Error, PartialEq, Eq)]
pub enum PeakError {
    #[error("cannot find the peak of an empty dataset")]
    Empty,
}

/// Reasons an inbound counter payload is refused.
#[derive(Debug, Error)]
pub enum PayloadError {
    #[error("event carried no payload")]
    Missing,

    #[error("payload must be a JSON object")]
    NotAnObject,

    #[error("payload does not match the counter schema: {0}")]
    Schema(#[from] serde_json::Error),
}

#[derive(Debug, Error)]
pub enum StreamError {
    #[error("invalid event stream url: {0}")]
    InvalidUrl(String),

    #[error("TLS event streams are not supported: {0}")]
    TlsUnsupported(String),

    #[error("failed to connect to event stream: {0}")]
    Connect(String),

    #[error("event stream connection is closed")]
    Closed,

    #[error("malformed packet: {0}")]
    Protocol(String),
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn errors_render_readable_messages() {
        assert_eq!(
            PeakError::Empty.to_string(),
            "cannot find the peak of an empty dataset"
        );
        assert_eq!(
            StreamError::InvalidUrl("ftp://x".into()).to_string(),
            "invalid event stream url: ftp://x"
        );
    }

    #[test]
    fn peak_error_maps_to_internal_status() {
        let err: AppError = PeakError::Empty.into();
        assert_eq!(err.status, StatusCode::INTERNAL_SERVER_ERROR);
    }
}
