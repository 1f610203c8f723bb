use axum::{
    Json, Router,
    extract::State,
    http::StatusCode,
    response::IntoResponse,
    routing::get,
};
use cine_store::{MovieId, Note};
use serde::Deserialize;
use serde_json::json;

use super::{PathParam, Payload, message};
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

async fn list(
    State(state): State<AppState>,
    RequireUser(user): RequireUser,
) -> Result<Json<Vec<Note>>> {
    Ok(Json(state.store.notes(user.id)?))
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct AddNote {
    movie_id: MovieId,
    #[serde(default)]
    note: String,
}

async fn add(
    State(state): State<AppState>,
    RequireUser(user): RequireUser,
    Payload(body): Payload<AddNote>,
) -> Result<impl IntoResponse> {
    let text = body.note.trim();
    if text.is_empty() {
        return Err(Error::BadRequest("Note must not be empty".to_owned()));
    }

    let note = state.store.add_note(user.id, body.movie_id, text)?;

    Ok((
        StatusCode::CREATED,
        Json(json!({ "message": "Note added", "note": note })),
    ))
}

async fn one(
    State(state): State<AppState>,
    RequireUser(user): RequireUser,
    PathParam(movie_id): PathParam<MovieId>,
) -> Result<Json<Note>> {
    state
        .store
        .note(user.id, movie_id)?
        .map(Json)
        .ok_or(Error::NotFound("Note"))
}

async fn remove(
    State(state): State<AppState>,
    RequireUser(user): RequireUser,
    PathParam(movie_id): PathParam<MovieId>,
) -> Result<impl IntoResponse> {
    if !state.store.remove_note(user.id, movie_id)? {
        return Err(Error::NotFound("Note"));
    }

    Ok(message("Note deleted"))
}
