use axum::{
    Json,
    http::StatusCode,
    response::{IntoResponse, Response},
};
use serde_json::json;
use thiserror::Error;

/// Faults inside a lyrics provider.
///
/// These never reach HTTP clients: the provider logs them and reports
/// "lyrics not found" instead.
#[derive(Error, Debug)]
pub enum LyricsError {
    #[error("Network error: {0}")]
    Network(#[from] reqwest::Error),

    #[error("{stage} request returned HTTP {status}")]
    Status {
        stage: &'static str,
        status: reqwest::StatusCode,
    },

    #[error("No search hits for '{0}'")]
    NoHits(String),

    #[error("No lyrics container matched on {0}")]
    NoContainer(String),

    #[error("Placeholder text instead of lyrics on {0}")]
    Placeholder(String),
}

impl LyricsError {
    /// HTTP status of the upstream response, if the fault was a status fault
    pub fn status(&self) -> Option<u16> {
        match self {
            LyricsError::Status { status, .. } => Some(status.as_u16()),
            LyricsError::Network(e) => e.status().map(|s| s.as_u16()),
            _ => None,
        }
    }
}

/// Failures surfaced to HTTP clients
#[derive(Error, Debug)]
pub enum ApiError {
    #[error("Track not found")]
    TrackNotFound,

    #[error("Lyrics not found")]
    LyricsNotFound,

    #[error("Track information not provided")]
    MissingTrack,

    #[error("Auth code not found")]
    MissingAuthCode,

    #[error("Unknown or expired login state")]
    InvalidState,

    #[error("Streaming provider error: {0}")]
    Upstream(String),
}

impl ApiError {
    pub fn kind(&self) -> &'static str {
        match self {
            ApiError::TrackNotFound => "track_not_found",
            ApiError::LyricsNotFound => "lyrics_not_found",
            ApiError::MissingTrack => "missing_track",
            ApiError::MissingAuthCode => "missing_auth_code",
            ApiError::InvalidState => "invalid_state",
            ApiError::Upstream(_) => "upstream",
        }
    }

    pub fn status_code(&self) -> StatusCode {
        match self {
            ApiError::TrackNotFound | ApiError::LyricsNotFound => StatusCode::NOT_FOUND,
            ApiError::MissingTrack | ApiError::MissingAuthCode | ApiError::InvalidState => {
                StatusCode::BAD_REQUEST
            }
            ApiError::Upstream(_) => StatusCode::BAD_GATEWAY,
        }
    }
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        let body = Json(json!({
            "error": self.to_string(),
            "kind": self.kind(),
        }));
        (self.status_code(), body).into_response()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_not_found_kinds_are_distinct() {
        assert_ne!(ApiError::TrackNotFound.kind(), ApiError::LyricsNotFound.kind());
        assert_eq!(ApiError::TrackNotFound.status_code(), StatusCode::NOT_FOUND);
        assert_eq!(ApiError::MissingTrack.status_code(), StatusCode::BAD_REQUEST);
        assert_eq!(ApiError::MissingTrack.to_string(), "Track information not provided");
    }

    #[test]
    fn test_status_fault_reports_code() {
        let err = LyricsError::Status {
            stage: "search",
            status: reqwest::StatusCode::UNAUTHORIZED,
        };
        assert_eq!(err.status(), Some(401));
        assert_eq!(err.to_string(), "search request returned HTTP 401 Unauthorized");
        assert_eq!(LyricsError::NoHits("x".into()).status(), None);
    }
}
