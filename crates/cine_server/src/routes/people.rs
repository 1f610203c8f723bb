use axum::{Json, Router, extract::State, routing::get};
use serde_json::Value;

use super::PathParam;
use crate::{AppState, auth::RequireUser, error::Result};

pub(super) fn router() -> Router<AppState> {
    Router::new().route("/{id}", get(person))
}

async fn person(
    State(state): State<AppState>,
    _: RequireUser,
    PathParam(person_id): PathParam<u64>,
) -> Result<Json<Value>> {
    Ok(Json(state.tmdb.people().get(person_id).await?))
}
