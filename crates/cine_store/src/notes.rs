use chrono::{DateTime, Utc};
use rusqlite::{OptionalExtension as _, Row, params};
use serde::Serialize;
use tracing::debug;

use crate::{
    MovieId, Store, UserId,
    error::{Result, conflict_on_unique},
};

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct Note {
    #[serde(rename = "_id")]
    pub id: i64,
    pub user_id: UserId,
    pub movie_id: MovieId,
    pub note: String,
    pub created_at: DateTime<Utc>,
}

impl Note {
    fn from_row(row: &Row<'_>) -> rusqlite::Result<Self> {
        Ok(Self {
            id: row.get("id")?,
            user_id: UserId::new(row.get("user_id")?),
            movie_id: row.get("movie_id")?,
            note: row.get("note")?,
            created_at: row.get("created_at")?,
        })
    }
}

impl Store {
    /// Attach a note to a movie. A user has at most one note per movie.
    pub fn add_note(&self, user: UserId, movie_id: MovieId, note: &str) -> Result<Note> {
        let created_at = Utc::now();
        let conn = self.conn.lock();

        conn.execute(
            "INSERT INTO notes (user_id, movie_id, note, created_at) VALUES (?1, ?2, ?3, ?4)",
            params![user.get(), movie_id, note, created_at],
        )
        .map_err(conflict_on_unique("note"))?;

        let id = conn.last_insert_rowid();
        debug!(%user, %movie_id, id, "Added note.");

        Ok(Note {
            id,
            user_id: user,
            movie_id,
            note: note.to_owned(),
            created_at,
        })
    }

    pub fn notes(&self, user: UserId) -> Result<Vec<Note>> {
        let conn = self.conn.lock();
        let mut stmt = conn.prepare(
            "SELECT id, user_id, movie_id, note, created_at FROM notes
             WHERE user_id = ?1 ORDER BY id",
        )?;

        stmt.query_map(params![user.get()], Note::from_row)?
            .collect::<rusqlite::Result<Vec<_>>>()
            .map_err(Into::into)
    }

    pub fn note(&self, user: UserId, movie_id: MovieId) -> Result<Option<Note>> {
        self.conn
            .lock()
            .query_row(
                "SELECT id, user_id, movie_id, note, created_at FROM notes
                 WHERE user_id = ?1 AND movie_id = ?2",
                params![user.get(), movie_id],
                Note::from_row,
            )
            .optional()
            .map_err(Into::into)
    }

    /// Returns whether a note was removed.
    pub fn remove_note(&self, user: UserId, movie_id: MovieId) -> Result<bool> {
        let removed = self.conn.lock().execute(
            "DELETE FROM notes WHERE user_id = ?1 AND movie_id = ?2",
            params![user.get(), movie_id],
        )?;

        Ok(removed > 0)
    }
}
