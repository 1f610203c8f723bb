//! Password hashing, signed session tokens and the extractors that turn a
//! session cookie back into a user.
//!
//! Passwords are stored as
//! `pbkdf2-sha256$<iterations>$<salt, base64>$<hash, base64>`.
//!
//! A session token is `<user id>.<expiry, unix seconds>.<signature>`, where
//! the signature is an HMAC-SHA256 over the first two parts, encoded as
//! unpadded URL-safe base64. It travels in the [`SESSION_COOKIE`] cookie.

use axum::{
    extract::FromRequestParts,
    http::{HeaderMap, HeaderValue, header::COOKIE, request::Parts},
};
use base64::{
    Engine as _,
    engine::general_purpose::{STANDARD, URL_SAFE_NO_PAD},
};
use chrono::{TimeDelta, Utc};
use cine_store::{User, UserId};
use hmac::{Hmac, Mac as _};
use rand::{RngCore as _, rngs::OsRng};
use sha2::Sha256;
use subtle::ConstantTimeEq as _;
use tracing::{debug, trace};

use crate::{
    AppState,
    error::{Error, Result},
};

type HmacSha256 = Hmac<Sha256>;

pub const SESSION_COOKIE: &str = "jwt";

const HASH_SCHEME: &str = "pbkdf2-sha256";
const SALT_LEN: usize = 16;
const HASH_LEN: usize = 32;

/// Shortest password accepted at signup.
pub const MIN_PASSWORD_LEN: usize = 6;

#[derive(Clone)]
pub struct Auth {
    secret: Vec<u8>,
    session_ttl: TimeDelta,
    iterations: u32,
    secure_cookie: bool,

    /// Checked against when a login names no known account, so that both
    /// cases cost the same.
    decoy_hash: String,
}

impl std::fmt::Debug for Auth {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Auth")
            .field("secret", &"[redacted]")
            .field("session_ttl", &self.session_ttl)
            .field("iterations", &self.iterations)
            .field("secure_cookie", &self.secure_cookie)
            .finish_non_exhaustive()
    }
}

impl Auth {
    #[must_use]
    pub fn new(secret: impl Into<Vec<u8>>, session_days: u32, iterations: u32, dev: bool) -> Self {
        let mut auth = Self {
            secret: secret.into(),
            session_ttl: TimeDelta::days(i64::from(session_days)),
            iterations: iterations.max(1),
            secure_cookie: !dev,
            decoy_hash: String::new(),
        };

        let mut decoy = [0; SALT_LEN];
        OsRng.fill_bytes(&mut decoy);
        auth.decoy_hash = auth.hash_password(&URL_SAFE_NO_PAD.encode(decoy));
        auth
    }

    #[must_use]
    pub fn hash_password(&self, password: &str) -> String {
        let mut salt = [0; SALT_LEN];
        OsRng.fill_bytes(&mut salt);

        let hash = derive_key(password.as_bytes(), &salt, self.iterations);
        format!(
            "{HASH_SCHEME}${}${}${}",
            self.iterations,
            STANDARD.encode(salt),
            STANDARD.encode(hash)
        )
    }

    /// Check `password` against a stored hash. Malformed hashes never match.
    #[must_use]
    pub fn verify_password(&self, password: &str, stored: &str) -> bool {
        let mut parts = stored.split('$');
        let (Some(HASH_SCHEME), Some(iterations), Some(salt), Some(hash), None) = (
            parts.next(),
            parts.next(),
            parts.next(),
            parts.next(),
            parts.next(),
        ) else {
            return false;
        };

        let (Ok(iterations), Ok(salt), Ok(hash)) = (
            iterations.parse::<u32>(),
            STANDARD.decode(salt),
            STANDARD.decode(hash),
        ) else {
            return false;
        };

        if iterations == 0 {
            return false;
        }

        derive_key(password.as_bytes(), &salt, iterations)[..]
            .ct_eq(&hash[..])
            .into()
    }

    /// Check a login attempt against the stored hash of the account it
    /// names, or against a decoy hash when there is no such account.
    /// Either way the same key derivation runs.
    #[must_use]
    pub fn verify_login(&self, password: &str, stored: Option<&str>) -> bool {
        match stored {
            Some(stored) => self.verify_password(password, stored),
            None => {
                std::hint::black_box(self.verify_password(password, &self.decoy_hash));
                false
            }
        }
    }

    /// Sign a session token for `user`, valid for the configured lifetime.
    #[must_use]
    pub fn issue_token(&self, user: UserId) -> String {
        let expires_at = (Utc::now() + self.session_ttl).timestamp();
        let payload = format!("{user}.{expires_at}");
        let signature = self.mac(payload.as_bytes()).finalize().into_bytes();
        let signature = URL_SAFE_NO_PAD.encode(signature);

        format!("{payload}.{signature}")
    }

    /// The user a token was issued to, if its signature is valid and it has
    /// not expired.
    #[must_use]
    pub fn verify_token(&self, token: &str) -> Option<UserId> {
        let (payload, signature) = token.rsplit_once('.')?;
        let signature = URL_SAFE_NO_PAD.decode(signature).ok()?;
        self.mac(payload.as_bytes()).verify_slice(&signature).ok()?;

        let (user, expires_at) = payload.split_once('.')?;
        let expires_at = expires_at.parse::<i64>().ok()?;
        if expires_at <= Utc::now().timestamp() {
            trace!(expires_at, "Session token expired.");
            return None;
        }

        user.parse().ok().map(UserId::new)
    }

    /// `Set-Cookie` value carrying `token`.
    #[must_use]
    pub fn session_cookie(&self, token: &str) -> String {
        let mut cookie = format!(
            "{SESSION_COOKIE}={token}; HttpOnly; SameSite=Strict; Path=/; Max-Age={}",
            self.session_ttl.num_seconds()
        );
        if self.secure_cookie {
            cookie.push_str("; Secure");
        }

        cookie
    }

    /// `Set-Cookie` value that expires the session cookie.
    #[must_use]
    pub fn clear_cookie(&self) -> String {
        let mut cookie = format!("{SESSION_COOKIE}=; HttpOnly; SameSite=Strict; Path=/; Max-Age=0");
        if self.secure_cookie {
            cookie.push_str("; Secure");
        }

        cookie
    }

    fn mac(&self, data: &[u8]) -> HmacSha256 {
        let mut mac = <HmacSha256 as hmac::digest::KeyInit>::new_from_slice(&self.secret)
            .unwrap_or_else(|_| unreachable!("HMAC accepts keys of any length"));
        mac.update(data);
        mac
    }
}

/// PBKDF2-HMAC-SHA256.
fn derive_key(password: &[u8], salt: &[u8], iterations: u32) -> [u8; HASH_LEN] {
    let mut hash = [0; HASH_LEN];
    pbkdf2::pbkdf2_hmac::<Sha256>(password, salt, iterations, &mut hash);
    hash
}

/// The value of the session cookie, if the request carries one.
#[must_use]
pub fn session_token(headers: &HeaderMap) -> Option<&str> {
    headers
        .get_all(COOKIE)
        .iter()
        .filter_map(|value| value.to_str().ok())
        .flat_map(|value| value.split(';'))
        .filter_map(|pair| pair.trim().split_once('='))
        .find_map(|(name, value)| (name == SESSION_COOKIE && !value.is_empty()).then_some(value))
}

/// Resolve the session in `headers` to a stored user.
fn current_user(headers: &HeaderMap, state: &AppState) -> Result<Option<User>> {
    let Some(user) = session_token(headers).and_then(|token| state.auth.verify_token(token))
    else {
        return Ok(None);
    };

    let user = state.store.user_by_id(user)?;
    if user.is_none() {
        debug!("Session refers to an unknown user.");
    }

    Ok(user)
}

/// An authenticated user. Rejects the request with 401 otherwise.
#[derive(Debug, Clone)]
pub struct RequireUser(pub User);

impl FromRequestParts<AppState> for RequireUser {
    type Rejection = Error;

    async fn from_request_parts(parts: &mut Parts, state: &AppState) -> Result<Self> {
        current_user(&parts.headers, state)?
            .map(Self)
            .ok_or(Error::Unauthorized)
    }
}

/// The authenticated user, if any. Never rejects on a missing or invalid
/// session.
#[derive(Debug, Clone)]
pub struct MaybeUser(pub Option<User>);

impl FromRequestParts<AppState> for MaybeUser {
    type Rejection = Error;

    async fn from_request_parts(parts: &mut Parts, state: &AppState) -> Result<Self> {
        current_user(&parts.headers, state).map(Self)
    }
}

/// `Set-Cookie` header value, or an internal error if it is not a valid
/// header value.
pub(crate) fn cookie_header(cookie: &str) -> Result<HeaderValue> {
    HeaderValue::from_str(cookie)
        .map_err(|error| Error::Config(format!("invalid session cookie: {error}")))
}
