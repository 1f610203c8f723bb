use futures::future::join_all;
use serde_json::Value;
use tracing::{debug, warn};

use crate::{
    Client, Result,
    models::{Credits, MediaItem, MovieDetails, ResultsPage, UpcomingMovie, Videos},
    params::{Filters, Listing},
};

const UPCOMING_LIMIT: usize = 5;
const CAST_LIMIT: usize = 12;

pub struct MoviesHandler {
    pub(crate) client: Client,
}

impl MoviesHandler {
    /// One upstream page of `listing`.
    pub async fn listing(
        &self,
        listing: Listing,
        filters: &Filters,
        page: u64,
    ) -> Result<ResultsPage<MediaItem>> {
        let mut query = filters.to_query();
        query.push(("page".to_owned(), page.to_string()));

        self.client.get_json(listing.path(), &query).await
    }

    pub async fn search(&self, query: &str) -> Result<ResultsPage<MediaItem>> {
        self.client
            .get_json("/search/movie", &[("query".to_owned(), query.to_owned())])
            .await
    }

    pub async fn recommendations(&self, movie_id: u64) -> Result<ResultsPage<MediaItem>> {
        self.client
            .get_json(&format!("/movie/{movie_id}/recommendations"), &[])
            .await
    }

    pub async fn trending(&self) -> Result<ResultsPage<MediaItem>> {
        self.client.get_json("/trending/movie/week", &[]).await
    }

    pub async fn by_genre(&self, genre_id: &str) -> Result<ResultsPage<MediaItem>> {
        self.client
            .get_json("/discover/movie", &[(
                "with_genres".to_owned(),
                genre_id.to_owned(),
            )])
            .await
    }

    /// The next few releases, each with a trailer link when one exists.
    ///
    /// A failed trailer lookup leaves that movie without a trailer rather
    /// than failing the whole list.
    pub async fn upcoming(&self) -> Result<Vec<UpcomingMovie>> {
        let page: ResultsPage<MediaItem> = self.client.get_json("/movie/upcoming", &[]).await?;

        let lookups = page
            .results
            .into_iter()
            .take(UPCOMING_LIMIT)
            .map(|movie| async move {
                let trailer = match self.trailer(movie.id).await {
                    Ok(trailer) => trailer,
                    Err(error) => {
                        warn!(movie = movie.id, %error, "Trailer lookup failed.");
                        None
                    }
                };

                UpcomingMovie { movie, trailer }
            });

        Ok(join_all(lookups).await)
    }

    async fn trailer(&self, movie_id: u64) -> Result<Option<String>> {
        let videos: Videos = self
            .client
            .get_json(&format!("/movie/{movie_id}/videos"), &[])
            .await?;

        Ok(videos
            .results
            .iter()
            .find(|video| video.is_youtube_trailer())
            .map(crate::models::Video::embed_url))
    }

    /// Movie details with the leading cast members.
    pub async fn details(&self, movie_id: u64) -> Result<MovieDetails> {
        let movie: MediaItem = self
            .client
            .get_json(&format!("/movie/{movie_id}"), &[])
            .await?;

        let credits: Credits = self
            .client
            .get_json(&format!("/movie/{movie_id}/credits"), &[])
            .await?;

        let mut cast = credits.cast;
        cast.truncate(CAST_LIMIT);
        debug!(movie = movie_id, cast = cast.len(), "Fetched movie details.");

        Ok(MovieDetails {
            id: movie.id,
            fields: movie.fields,
            cast,
        })
    }
}

pub struct PeopleHandler {
    pub(crate) client: Client,
}

impl PeopleHandler {
    /// Person details including their movie and TV credits.
    pub async fn get(&self, person_id: u64) -> Result<Value> {
        self.client
            .get_json(&format!("/person/{person_id}"), &[(
                "append_to_response".to_owned(),
                "movie_credits,tv_credits".to_owned(),
            )])
            .await
    }
}
