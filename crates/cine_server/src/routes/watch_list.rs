//! The signed-in user's list of watched and wanted movies.
//!
//! Served both under `/watch-list` and, for the listing operations, under
//! `/movie/watched`; both read and write the same entries.

use axum::{
    Json, Router,
    extract::State,
    http::StatusCode,
    response::IntoResponse,
    routing::get,
};
use cine_store::{ListStatus, MovieId, NewWatchEntry, UserId, WatchEntry, WatchKind};
use serde::{Deserialize, Serialize};
use serde_json::json;

use super::{PathParam, Payload, QueryParams};
use crate::{
    AppState,
    auth::RequireUser,
    error::{Error, Result},
};

pub(super) fn router() -> Router<AppState> {
    Router::new()
        .route("/", get(list).post(add))
        .route("/{movie_id}", get(one).delete(remove))
}

#[derive(Debug, Serialize)]
pub(super) struct WatchListResponse {
    watchlist: Vec<WatchEntry>,
}

pub(super) async fn list(
    State(state): State<AppState>,
    RequireUser(user): RequireUser,
) -> Result<Json<WatchListResponse>> {
    let watchlist = state.store.watch_entries(user.id)?;

    Ok(Json(WatchListResponse { watchlist }))
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub(super) struct AddEntry {
    movie_id: MovieId,
    runtime: u32,
    #[serde(rename = "type")]
    kind: WatchKind,
}

pub(super) async fn add(
    State(state): State<AppState>,
    RequireUser(user): RequireUser,
    Payload(entry): Payload<AddEntry>,
) -> Result<impl IntoResponse> {
    let entry = state.store.add_watch_entry(user.id, NewWatchEntry {
        movie_id: entry.movie_id,
        runtime: entry.runtime,
        kind: entry.kind,
    })?;

    Ok((
        StatusCode::CREATED,
        Json(json!({ "message": "Movie added to your list", "entry": entry })),
    ))
}

async fn one(
    State(state): State<AppState>,
    RequireUser(user): RequireUser,
    PathParam(movie_id): PathParam<MovieId>,
) -> Result<Json<WatchEntry>> {
    state
        .store
        .watch_entry(user.id, movie_id)?
        .map(Json)
        .ok_or(Error::NotFound("Watch-list entry"))
}

pub(super) async fn remove(
    State(state): State<AppState>,
    RequireUser(user): RequireUser,
    PathParam(movie_id): PathParam<MovieId>,
) -> Result<impl IntoResponse> {
    let removed = state
        .store
        .remove_watch_entry(user.id, movie_id)?
        .ok_or(Error::NotFound("Watch-list entry"))?;

    Ok(Json(json!({
        "message": "Movie removed from your list",
        "deletedMovie": removed.movie_id,
    })))
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub(super) struct WatchTime {
    user_id: UserId,
    total_watch_time: u64,
}

pub(super) async fn total_watch_time(
    State(state): State<AppState>,
    RequireUser(user): RequireUser,
) -> Result<Json<WatchTime>> {
    Ok(Json(WatchTime {
        user_id: user.id,
        total_watch_time: state.store.total_watch_time(user.id)?,
    }))
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub(super) struct CheckQuery {
    movie_id: Option<MovieId>,
}

pub(super) async fn check(
    State(state): State<AppState>,
    RequireUser(user): RequireUser,
    QueryParams(query): QueryParams<CheckQuery>,
) -> Result<Json<ListStatus>> {
    let movie_id = query
        .movie_id
        .ok_or_else(|| Error::BadRequest("movieId is required".to_owned()))?;

    Ok(Json(state.store.list_status(user.id, movie_id)?))
}
