use std::fmt;

use chrono::{DateTime, Utc};
use rusqlite::{OptionalExtension as _, Row, params};
use serde::{Deserialize, Serialize};
use tracing::debug;

use crate::{
    Store,
    error::{Result, conflict_on_unique},
};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct UserId(i64);

impl UserId {
    #[must_use]
    pub const fn new(id: i64) -> Self {
        Self(id)
    }

    #[must_use]
    pub const fn get(self) -> i64 {
        self.0
    }
}

impl fmt::Display for UserId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        self.0.fmt(f)
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct User {
    pub id: UserId,
    pub email: String,
    pub password_hash: String,
    pub created_at: DateTime<Utc>,
}

impl User {
    fn from_row(row: &Row<'_>) -> rusqlite::Result<Self> {
        Ok(Self {
            id: UserId(row.get("id")?),
            email: row.get("email")?,
            password_hash: row.get("password_hash")?,
            created_at: row.get("created_at")?,
        })
    }
}

impl Store {
    pub fn create_user(&self, email: &str, password_hash: &str) -> Result<User> {
        let created_at = Utc::now();
        let conn = self.conn.lock();

        conn.execute(
            "INSERT INTO users (email, password_hash, created_at) VALUES (?1, ?2, ?3)",
            params![email, password_hash, created_at],
        )
        .map_err(conflict_on_unique("user"))?;

        let id = UserId(conn.last_insert_rowid());
        debug!(%id, "Created user.");

        Ok(User {
            id,
            email: email.to_owned(),
            password_hash: password_hash.to_owned(),
            created_at,
        })
    }

    pub fn user_by_email(&self, email: &str) -> Result<Option<User>> {
        self.conn
            .lock()
            .query_row(
                "SELECT id, email, password_hash, created_at FROM users WHERE email = ?1",
                params![email],
                User::from_row,
            )
            .optional()
            .map_err(Into::into)
    }

    pub fn user_by_id(&self, id: UserId) -> Result<Option<User>> {
        self.conn
            .lock()
            .query_row(
                "SELECT id, email, password_hash, created_at FROM users WHERE id = ?1",
                params![id.0],
                User::from_row,
            )
            .optional()
            .map_err(Into::into)
    }
}

#[cfg(test)]
mod tests {
    use test_log::test;

    use super::*;
    use crate::Error;

    #[test]
    fn created_users_can_be_found_by_email_and_id() {
        let store = Store::in_memory().unwrap();
        let user = store.create_user("neo@example.com", "hash").unwrap();

        let by_email = store.user_by_email("neo@example.com").unwrap().unwrap();
        assert_eq!(by_email.id, user.id);
        assert_eq!(by_email.password_hash, "hash");

        let by_id = store.user_by_id(user.id).unwrap().unwrap();
        assert_eq!(by_id.email, "neo@example.com");
        assert_eq!(store.user_by_email("trinity@example.com").unwrap(), None);
        assert_eq!(store.user_by_id(UserId::new(999)).unwrap(), None);
    }

    #[test]
    fn duplicate_email_is_a_conflict() {
        let store = Store::in_memory().unwrap();
        store.create_user("neo@example.com", "hash").unwrap();

        assert_eq!(
            store.create_user("neo@example.com", "other").unwrap_err(),
            Error::Conflict("user")
        );
    }
}
