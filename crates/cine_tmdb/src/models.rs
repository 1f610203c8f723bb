use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};

/// A page of results as TMDB returns it.
#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct ResultsPage<T> {
    #[serde(default)]
    pub page: u64,
    pub results: Vec<T>,
    #[serde(default)]
    pub total_pages: u64,
    #[serde(default)]
    pub total_results: u64,
}

/// A movie, show or person entry in a result list.
///
/// Only the id is interpreted, everything else is passed through as-is.
#[derive(Debug, Clone, PartialEq, Deserialize, Serialize)]
pub struct MediaItem {
    pub id: u64,
    #[serde(flatten)]
    pub fields: Map<String, Value>,
}

#[derive(Debug, Clone, PartialEq, Deserialize, Serialize)]
pub struct UpcomingMovie {
    #[serde(flatten)]
    pub movie: MediaItem,
    pub trailer: Option<String>,
}

#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct Video {
    pub key: String,
    pub site: String,
    #[serde(rename = "type")]
    pub r#type: String,
}

impl Video {
    #[must_use]
    pub fn is_youtube_trailer(&self) -> bool {
        self.r#type == "Trailer" && self.site == "YouTube"
    }

    #[must_use]
    pub fn embed_url(&self) -> String {
        format!("https://www.youtube.com/embed/{}", self.key)
    }
}

#[derive(Debug, Clone, Deserialize)]
pub(crate) struct Videos {
    pub results: Vec<Video>,
}

#[derive(Debug, Clone, Deserialize)]
pub(crate) struct Credits {
    #[serde(default)]
    pub cast: Vec<Value>,
}

/// Full movie details with the leading cast members attached.
#[derive(Debug, Clone, PartialEq, Deserialize, Serialize)]
pub struct MovieDetails {
    pub id: u64,
    #[serde(flatten)]
    pub fields: Map<String, Value>,
    pub cast: Vec<Value>,
}
