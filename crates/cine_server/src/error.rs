use axum::{
    Json,
    extract::rejection::{JsonRejection, PathRejection, QueryRejection},
    http::StatusCode,
    response::{IntoResponse, Response},
};
use serde_json::json;
use tracing::{error, warn};

pub type Result<T> = std::result::Result<T, Error>;

#[derive(Debug, thiserror::Error)]
pub enum Error {
    #[error("{0}")]
    BadRequest(String),

    #[error("Unauthorized")]
    Unauthorized,

    #[error("{0} not found")]
    NotFound(&'static str),

    #[error("Store error: {0}")]
    Store(#[from] cine_store::Error),

    #[error("Paging error: {0}")]
    Pager(#[from] cine_pager::Error),

    #[error("TMDB error: {0}")]
    Tmdb(#[from] cine_tmdb::Error),

    #[error("Configuration error: {0}")]
    Config(String),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
}

impl Error {
    /// The status and client-facing message for this error.
    ///
    /// Internal details are only ever logged, never returned.
    fn status_and_message(&self) -> (StatusCode, String) {
        match self {
            Self::BadRequest(message) => (StatusCode::BAD_REQUEST, message.clone()),
            Self::Unauthorized => (StatusCode::UNAUTHORIZED, self.to_string()),
            Self::NotFound(_) => (StatusCode::NOT_FOUND, self.to_string()),
            Self::Store(cine_store::Error::Conflict(what)) => {
                (StatusCode::CONFLICT, format!("{what} already exists"))
            }
            Self::Pager(error @ cine_pager::Error::InvalidRequest { .. }) => {
                (StatusCode::BAD_REQUEST, error.to_string())
            }
            Self::Pager(cine_pager::Error::Upstream { .. }) => upstream_unavailable(),
            Self::Tmdb(error) => match error.status_code() {
                Some(status) if status.is_client_error() => {
                    let message = match error {
                        cine_tmdb::Error::Tmdb { source, .. } => source.message.clone(),
                        _ => error.to_string(),
                    };

                    (
                        StatusCode::from_u16(status.as_u16()).unwrap_or(StatusCode::BAD_GATEWAY),
                        message,
                    )
                }
                _ => upstream_unavailable(),
            },
            Self::Store(_) | Self::Config(_) | Self::Io(_) => (
                StatusCode::INTERNAL_SERVER_ERROR,
                "Internal server error".to_owned(),
            ),
        }
    }
}

fn upstream_unavailable() -> (StatusCode, String) {
    (
        StatusCode::BAD_GATEWAY,
        "Movie database is unavailable".to_owned(),
    )
}

impl IntoResponse for Error {
    fn into_response(self) -> Response {
        let (status, message) = self.status_and_message();

        if status.is_server_error() {
            error!(status = status.as_u16(), error = %self, "Request failed.");
        } else {
            warn!(status = status.as_u16(), error = %self, "Request rejected.");
        }

        (status, Json(json!({ "error": message }))).into_response()
    }
}

impl From<JsonRejection> for Error {
    fn from(rejection: JsonRejection) -> Self {
        Self::BadRequest(rejection.body_text())
    }
}

impl From<QueryRejection> for Error {
    fn from(rejection: QueryRejection) -> Self {
        Self::BadRequest(rejection.body_text())
    }
}

impl From<PathRejection> for Error {
    fn from(rejection: PathRejection) -> Self {
        Self::BadRequest(rejection.body_text())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn conflicts_map_to_409() {
        let (status, message) =
            Error::from(cine_store::Error::Conflict("note")).status_and_message();

        assert_eq!(status, StatusCode::CONFLICT);
        assert_eq!(message, "note already exists");
    }

    #[test]
    fn invalid_page_requests_map_to_400() {
        let error = cine_pager::Error::InvalidRequest {
            field: "page_number",
            value: 0,
        };

        assert_eq!(
            Error::from(error).status_and_message().0,
            StatusCode::BAD_REQUEST
        );
    }

    #[test]
    fn internal_details_are_not_exposed() {
        let error = Error::Config("secret `CINE_SESSION_SECRET` missing".to_owned());
        let (status, message) = error.status_and_message();

        assert_eq!(status, StatusCode::INTERNAL_SERVER_ERROR);
        assert!(!message.contains("CINE_SESSION_SECRET"));
    }
}
