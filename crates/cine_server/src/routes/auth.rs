use axum::{
    Json, Router,
    extract::State,
    http::{StatusCode, header::SET_COOKIE},
    response::IntoResponse,
    routing::{get, post},
};
use cine_store::{User, UserId};
use serde::{Deserialize, Serialize};
use tracing::info;

use super::{Payload, message};
use crate::{
    AppState,
    auth::{MIN_PASSWORD_LEN, RequireUser, cookie_header},
    error::{Error, Result},
};

pub(super) fn router() -> Router<AppState> {
    Router::new()
        .route("/users", post(signup))
        .route("/sessions", post(login).delete(logout))
        .route("/check-auth", get(check_auth))
}

#[derive(Debug, Deserialize)]
struct Credentials {
    #[serde(default)]
    email: String,
    #[serde(default)]
    password: String,
}

impl Credentials {
    fn validate(&self) -> Result<()> {
        if self.email.trim().is_empty() || self.password.is_empty() {
            return Err(Error::BadRequest("All fields must be provided".to_owned()));
        }

        Ok(())
    }
}

#[derive(Debug, Serialize)]
struct UserResponse {
    #[serde(rename = "_id")]
    id: UserId,
    email: String,
}

impl From<User> for UserResponse {
    fn from(user: User) -> Self {
        Self {
            id: user.id,
            email: user.email,
        }
    }
}

/// The session cookie for `user` and the public view of it.
fn session(state: &AppState, user: User) -> Result<impl IntoResponse + use<>> {
    let token = state.auth.issue_token(user.id);
    let cookie = cookie_header(&state.auth.session_cookie(&token))?;

    Ok(([(SET_COOKIE, cookie)], Json(UserResponse::from(user))))
}

async fn signup(
    State(state): State<AppState>,
    Payload(credentials): Payload<Credentials>,
) -> Result<impl IntoResponse> {
    credentials.validate()?;
    if credentials.password.chars().count() < MIN_PASSWORD_LEN {
        return Err(Error::BadRequest(format!(
            "Password must be at least {MIN_PASSWORD_LEN} characters long"
        )));
    }

    let hash = state.auth.hash_password(&credentials.password);
    let user = state.store.create_user(credentials.email.trim(), &hash)?;
    info!(user = %user.id, "Signed up.");

    Ok((StatusCode::CREATED, session(&state, user)?))
}

async fn login(
    State(state): State<AppState>,
    Payload(credentials): Payload<Credentials>,
) -> Result<impl IntoResponse> {
    credentials.validate()?;

    let user = state.store.user_by_email(credentials.email.trim())?;
    let verified = state.auth.verify_login(
        &credentials.password,
        user.as_ref().map(|user| user.password_hash.as_str()),
    );
    let user = user.filter(|_| verified).ok_or(Error::Unauthorized)?;

    info!(user = %user.id, "Logged in.");
    session(&state, user)
}

async fn logout(State(state): State<AppState>) -> Result<impl IntoResponse> {
    let cookie = cookie_header(&state.auth.clear_cookie())?;

    Ok(([(SET_COOKIE, cookie)], message("Logged out")))
}

async fn check_auth(RequireUser(user): RequireUser) -> Json<UserResponse> {
    Json(user.into())
}
