use axum::{
    Json, Router,
    extract::State,
    routing::{delete, get},
};
use cine_pager::{VirtualPageRequest, get_page};
use cine_tmdb::{
    models::{MediaItem, MovieDetails, ResultsPage, UpcomingMovie},
    params::{Filters, Listing},
};
use serde::{Deserialize, Serialize};
use tracing::debug;

use super::{PathParam, QueryParams, watch_list};
use crate::{
    AppState,
    auth::MaybeUser,
    error::{Error, Result},
};

pub(super) fn router() -> Router<AppState> {
    Router::new()
        .route("/", get(list))
        .route("/search", get(search))
        .route("/trending", get(trending))
        .route("/upcoming", get(upcoming))
        .route("/recommendations/{movie_id}", get(recommendations))
        .route("/genre/{genre_id}", get(by_genre))
        .route("/watched", get(watch_list::list).post(watch_list::add))
        .route("/watched/{movie_id}", delete(watch_list::remove))
        .route("/total-watch-time", get(watch_list::total_watch_time))
        .route("/check", get(watch_list::check))
        .route("/{id}", get(details))
}

#[derive(Debug, Default, Deserialize)]
struct ListingQuery {
    #[serde(rename = "type")]
    listing: Option<String>,
    page: Option<String>,
    limit: Option<String>,
    genre: Option<String>,
    country: Option<String>,
    year: Option<String>,
}

impl ListingQuery {
    fn listing(&self) -> Result<Listing> {
        self.listing
            .as_deref()
            .unwrap_or_default()
            .parse()
            .map_err(|_| Error::BadRequest("Invalid type parameter".to_owned()))
    }

    fn request(&self, state: &AppState) -> Result<VirtualPageRequest> {
        let page_number = match non_empty(self.page.as_deref()) {
            Some(page) => page
                .parse()
                .map_err(|_| Error::BadRequest("Invalid page parameter".to_owned()))?,
            None => 1,
        };

        let page_size = match non_empty(self.limit.as_deref()) {
            Some(limit) => limit
                .parse()
                .ok()
                .filter(|limit| *limit <= state.pager.max_page_size)
                .ok_or_else(|| Error::BadRequest("Invalid limit parameter".to_owned()))?,
            None => state.pager.page_size,
        };

        Ok(VirtualPageRequest::new(page_size, page_number))
    }

    fn filters(&self) -> Result<Filters> {
        let year = non_empty(self.year.as_deref())
            .map(str::parse)
            .transpose()
            .map_err(|_| Error::BadRequest("Invalid year parameter".to_owned()))?;

        Ok(Filters {
            genre: non_empty(self.genre.as_deref()).map(str::to_owned),
            country: non_empty(self.country.as_deref()).map(str::to_owned),
            year,
        })
    }
}

fn non_empty(value: Option<&str>) -> Option<&str> {
    value.map(str::trim).filter(|value| !value.is_empty())
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
struct ListingResponse {
    results: Vec<MediaItem>,
    total_results: u64,
    total_pages: u64,
}

/// One page of a catalogue listing, in the configured page size.
///
/// For a signed-in user, movies already on their list are dropped from the
/// page after it is cut, so the page may come back short.
async fn list(
    State(state): State<AppState>,
    MaybeUser(user): MaybeUser,
    QueryParams(query): QueryParams<ListingQuery>,
) -> Result<Json<ListingResponse>> {
    let listing = query.listing()?;
    let request = query.request(&state)?;
    let source = state.tmdb.listing_source(listing, query.filters()?);

    let mut page = get_page(&source, request).await?;

    if let Some(user) = user {
        let excluded = state.store.watched_ids(user.id)?;
        let before = page.items.len();
        page = page.exclude(&excluded, |item| item.id);
        debug!(
            user = %user.id,
            excluded = before - page.items.len(),
            "Dropped listed movies from page."
        );
    }

    Ok(Json(ListingResponse {
        results: page.items,
        total_results: page.total_results,
        total_pages: page.total_pages,
    }))
}

#[derive(Debug, Deserialize)]
struct SearchQuery {
    query: Option<String>,
}

async fn search(
    State(state): State<AppState>,
    QueryParams(query): QueryParams<SearchQuery>,
) -> Result<Json<ResultsPage<MediaItem>>> {
    let query = non_empty(query.query.as_deref())
        .ok_or_else(|| Error::BadRequest("Query is required".to_owned()))?;

    Ok(Json(state.tmdb.movies().search(query).await?))
}

async fn trending(State(state): State<AppState>) -> Result<Json<ResultsPage<MediaItem>>> {
    Ok(Json(state.tmdb.movies().trending().await?))
}

#[derive(Debug, Serialize)]
struct UpcomingResponse {
    results: Vec<UpcomingMovie>,
}

async fn upcoming(State(state): State<AppState>) -> Result<Json<UpcomingResponse>> {
    let results = state.tmdb.movies().upcoming().await?;

    Ok(Json(UpcomingResponse { results }))
}

async fn recommendations(
    State(state): State<AppState>,
    PathParam(movie_id): PathParam<u64>,
) -> Result<Json<ResultsPage<MediaItem>>> {
    Ok(Json(state.tmdb.movies().recommendations(movie_id).await?))
}

async fn by_genre(
    State(state): State<AppState>,
    PathParam(genre_id): PathParam<String>,
) -> Result<Json<ResultsPage<MediaItem>>> {
    Ok(Json(state.tmdb.movies().by_genre(&genre_id).await?))
}

async fn details(
    State(state): State<AppState>,
    PathParam(movie_id): PathParam<u64>,
) -> Result<Json<MovieDetails>> {
    Ok(Json(state.tmdb.movies().details(movie_id).await?))
}
