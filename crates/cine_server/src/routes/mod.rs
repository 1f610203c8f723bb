mod auth;
mod movies;
mod notes;
mod people;
mod watch_list;

use axum::{
    Router,
    extract::{FromRequest, FromRequestParts},
};

use crate::{AppState, error::Error};

/// Every route of the API, relative to its `/api` prefix.
pub(crate) fn router() -> Router<AppState> {
    Router::new()
        .nest("/auth", auth::router())
        .nest("/movie", movies::router())
        .nest("/watch-list", watch_list::router())
        .nest("/note", notes::router())
        .nest("/person", people::router())
}

/// A JSON body, rejected with a JSON error instead of axum's plain text.
#[derive(Debug, FromRequest)]
#[from_request(via(axum::Json), rejection(Error))]
pub(crate) struct Payload<T>(pub T);

#[derive(Debug, FromRequestParts)]
#[from_request(via(axum::extract::Query), rejection(Error))]
pub(crate) struct QueryParams<T>(pub T);

#[derive(Debug, FromRequestParts)]
#[from_request(via(axum::extract::Path), rejection(Error))]
pub(crate) struct PathParam<T>(pub T);

/// A short confirmation body.
pub(crate) fn message(text: &str) -> axum::Json<serde_json::Value> {
    axum::Json(serde_json::json!({ "message": text }))
}
