pub type Result<T> = std::result::Result<T, Error>;

#[derive(Debug, thiserror::Error)]
pub enum Error {
    #[error("TMDB API error: {source}")]
    Tmdb {
        source: TmdbError,
        body: Option<String>,
    },

    #[error("HTTP client error: {0}")]
    Http(#[from] reqwest::Error),

    #[error("JSON parse error: {0}")]
    Json(#[from] serde_json::Error),

    #[error("invalid HTTP header value: {0}")]
    InvalidHeader(#[from] reqwest::header::InvalidHeaderValue),

    #[error("invalid base URL: {0}")]
    Url(#[from] url::ParseError),

    #[error("failed to build tmdb client: {0}")]
    Build(String),
}

impl Error {
    /// The upstream HTTP status, if the API answered with an error.
    #[must_use]
    pub const fn status_code(&self) -> Option<StatusCode> {
        match self {
            Self::Tmdb { source, .. } => Some(source.status_code),
            _ => None,
        }
    }

    #[must_use]
    pub fn is_timeout(&self) -> bool {
        matches!(self, Self::Http(error) if error.is_timeout())
    }
}

#[derive(Debug, Clone, thiserror::Error)]
#[error("{} ({})", message, status_code.as_u16())]
pub struct TmdbError {
    pub status_code: StatusCode,
    pub message: String,
}

#[derive(Debug, Clone, Copy, Eq, PartialEq)]
pub struct StatusCode(u16);

impl StatusCode {
    #[must_use]
    pub const fn as_u16(self) -> u16 {
        self.0
    }

    #[must_use]
    pub const fn is_client_error(self) -> bool {
        self.0 >= 400 && self.0 < 500
    }

    #[must_use]
    pub(crate) const fn new(value: u16) -> Self {
        Self(value)
    }
}

impl PartialEq<u16> for StatusCode {
    fn eq(&self, other: &u16) -> bool {
        self.0 == *other
    }
}
