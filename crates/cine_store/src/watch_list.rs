use std::{collections::HashSet, fmt, str::FromStr};

use chrono::{DateTime, Utc};
use rusqlite::{
    OptionalExtension as _, Row, ToSql, params,
    types::{FromSql, FromSqlError, FromSqlResult, ToSqlOutput, ValueRef},
};
use serde::{Deserialize, Serialize};
use tracing::debug;

use crate::{
    MovieId, Store, UserId,
    error::{Error, Result, conflict_on_unique},
};

/// Why a movie is on a user's list.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum WatchKind {
    Watched,
    Want,
}

impl WatchKind {
    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Watched => "watched",
            Self::Want => "want",
        }
    }
}

impl fmt::Display for WatchKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for WatchKind {
    type Err = Error;

    fn from_str(s: &str) -> Result<Self> {
        match s {
            "watched" => Ok(Self::Watched),
            "want" => Ok(Self::Want),
            _ => Err(Error::Corrupt(format!("unknown watch kind {s:?}"))),
        }
    }
}

impl ToSql for WatchKind {
    fn to_sql(&self) -> rusqlite::Result<ToSqlOutput<'_>> {
        Ok(self.as_str().into())
    }
}

impl FromSql for WatchKind {
    fn column_result(value: ValueRef<'_>) -> FromSqlResult<Self> {
        value
            .as_str()?
            .parse()
            .map_err(|error| FromSqlError::Other(Box::new(error)))
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct NewWatchEntry {
    pub movie_id: MovieId,
    /// Minutes.
    pub runtime: u32,
    pub kind: WatchKind,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct WatchEntry {
    pub user_id: UserId,
    pub movie_id: MovieId,
    pub runtime: u32,
    #[serde(rename = "type")]
    pub kind: WatchKind,
    pub created_at: DateTime<Utc>,
}

impl WatchEntry {
    fn from_row(row: &Row<'_>) -> rusqlite::Result<Self> {
        Ok(Self {
            user_id: UserId::new(row.get("user_id")?),
            movie_id: row.get("movie_id")?,
            runtime: row.get("runtime")?,
            kind: row.get("kind")?,
            created_at: row.get("created_at")?,
        })
    }
}

/// Whether a movie is on a user's list at all, and whether it is marked
/// as one they want to watch.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize)]
pub struct ListStatus {
    pub watched: bool,
    pub watchlist: bool,
}

const ENTRY_COLUMNS: &str = "user_id, movie_id, runtime, kind, created_at";

impl Store {
    pub fn add_watch_entry(&self, user: UserId, entry: NewWatchEntry) -> Result<WatchEntry> {
        let created_at = Utc::now();

        self.conn
            .lock()
            .execute(
                "INSERT INTO watch_entries (user_id, movie_id, runtime, kind, created_at)
                 VALUES (?1, ?2, ?3, ?4, ?5)",
                params![
                    user.get(),
                    entry.movie_id,
                    entry.runtime,
                    entry.kind,
                    created_at
                ],
            )
            .map_err(conflict_on_unique("watch-list entry"))?;

        debug!(%user, movie = %entry.movie_id, kind = %entry.kind, "Added watch-list entry.");

        Ok(WatchEntry {
            user_id: user,
            movie_id: entry.movie_id,
            runtime: entry.runtime,
            kind: entry.kind,
            created_at,
        })
    }

    /// All of a user's entries, oldest first.
    pub fn watch_entries(&self, user: UserId) -> Result<Vec<WatchEntry>> {
        let conn = self.conn.lock();
        let mut stmt = conn.prepare(&format!(
            "SELECT {ENTRY_COLUMNS} FROM watch_entries WHERE user_id = ?1 ORDER BY rowid"
        ))?;

        stmt.query_map(params![user.get()], WatchEntry::from_row)?
            .collect::<rusqlite::Result<Vec<_>>>()
            .map_err(Into::into)
    }

    pub fn watch_entry(&self, user: UserId, movie_id: MovieId) -> Result<Option<WatchEntry>> {
        self.conn
            .lock()
            .query_row(
                &format!(
                    "SELECT {ENTRY_COLUMNS} FROM watch_entries WHERE user_id = ?1 AND movie_id = ?2"
                ),
                params![user.get(), movie_id],
                WatchEntry::from_row,
            )
            .optional()
            .map_err(Into::into)
    }

    /// Remove an entry, returning it if it existed.
    pub fn remove_watch_entry(&self, user: UserId, movie_id: MovieId) -> Result<Option<WatchEntry>> {
        let removed = self
            .conn
            .lock()
            .query_row(
                &format!(
                    "DELETE FROM watch_entries WHERE user_id = ?1 AND movie_id = ?2
                     RETURNING {ENTRY_COLUMNS}"
                ),
                params![user.get(), movie_id],
                WatchEntry::from_row,
            )
            .optional()?;

        if removed.is_some() {
            debug!(%user, %movie_id, "Removed watch-list entry.");
        }

        Ok(removed)
    }

    /// Ids of every movie on the user's list, of any kind.
    pub fn watched_ids(&self, user: UserId) -> Result<HashSet<u64>> {
        let conn = self.conn.lock();
        let mut stmt = conn.prepare("SELECT movie_id FROM watch_entries WHERE user_id = ?1")?;

        stmt.query_map(params![user.get()], |row| row.get::<_, MovieId>(0))?
            .map(|id| id.map(MovieId::get))
            .collect::<rusqlite::Result<HashSet<_>>>()
            .map_err(Into::into)
    }

    /// Total minutes of everything the user has marked as watched.
    pub fn total_watch_time(&self, user: UserId) -> Result<u64> {
        let total: i64 = self.conn.lock().query_row(
            "SELECT COALESCE(SUM(runtime), 0) FROM watch_entries
             WHERE user_id = ?1 AND kind = ?2",
            params![user.get(), WatchKind::Watched],
            |row| row.get(0),
        )?;

        u64::try_from(total).map_err(|_| Error::Corrupt(format!("negative watch time {total}")))
    }

    pub fn list_status(&self, user: UserId, movie_id: MovieId) -> Result<ListStatus> {
        Ok(self
            .watch_entry(user, movie_id)?
            .map(|entry| ListStatus {
                watched: true,
                watchlist: entry.kind == WatchKind::Want,
            })
            .unwrap_or_default())
    }
}

#[cfg(test)]
mod tests {
    use assert_matches::assert_matches;
    use test_log::test;

    use super::*;

    fn store_with_user() -> (Store, UserId) {
        let store = Store::in_memory().unwrap();
        let user = store.create_user("neo@example.com", "hash").unwrap();
        (store, user.id)
    }

    fn movie(id: u64) -> MovieId {
        MovieId::try_from(id).unwrap()
    }

    fn entry(movie_id: u64, runtime: u32, kind: WatchKind) -> NewWatchEntry {
        NewWatchEntry {
            movie_id: movie(movie_id),
            runtime,
            kind,
        }
    }

    #[test]
    fn entries_are_listed_in_insertion_order() {
        let (store, user) = store_with_user();
        store
            .add_watch_entry(user, entry(603, 136, WatchKind::Watched))
            .unwrap();
        store
            .add_watch_entry(user, entry(604, 138, WatchKind::Want))
            .unwrap();

        let entries = store.watch_entries(user).unwrap();
        assert_eq!(
            entries.iter().map(|e| (e.movie_id.get(), e.kind)).collect::<Vec<_>>(),
            vec![(603, WatchKind::Watched), (604, WatchKind::Want)]
        );
    }

    #[test]
    fn adding_the_same_movie_twice_is_a_conflict() {
        let (store, user) = store_with_user();
        store
            .add_watch_entry(user, entry(603, 136, WatchKind::Watched))
            .unwrap();

        assert_matches!(
            store.add_watch_entry(user, entry(603, 136, WatchKind::Want)),
            Err(Error::Conflict(_))
        );
    }

    #[test]
    fn entries_are_scoped_per_user() {
        let (store, neo) = store_with_user();
        let trinity = store.create_user("trinity@example.com", "hash").unwrap().id;

        store
            .add_watch_entry(neo, entry(603, 136, WatchKind::Watched))
            .unwrap();
        store
            .add_watch_entry(trinity, entry(603, 136, WatchKind::Watched))
            .unwrap();

        assert_eq!(store.watch_entries(neo).unwrap().len(), 1);
        assert!(store.watch_entry(trinity, movie(604)).unwrap().is_none());
    }

    #[test]
    fn removing_returns_the_removed_entry() {
        let (store, user) = store_with_user();
        store
            .add_watch_entry(user, entry(603, 136, WatchKind::Watched))
            .unwrap();

        let removed = store.remove_watch_entry(user, movie(603)).unwrap();
        assert_eq!(removed.map(|e| e.movie_id.get()), Some(603));
        assert!(store.remove_watch_entry(user, movie(603)).unwrap().is_none());
        assert!(store.watch_entries(user).unwrap().is_empty());
    }

    #[test]
    fn exclusion_set_contains_every_listed_movie() {
        let (store, user) = store_with_user();
        store
            .add_watch_entry(user, entry(1, 90, WatchKind::Watched))
            .unwrap();
        store
            .add_watch_entry(user, entry(2, 90, WatchKind::Want))
            .unwrap();

        assert_eq!(store.watched_ids(user).unwrap(), HashSet::from([1, 2]));
    }

    #[test]
    fn total_watch_time_counts_only_watched_movies() {
        let (store, user) = store_with_user();
        assert_eq!(store.total_watch_time(user).unwrap(), 0);

        store
            .add_watch_entry(user, entry(1, 90, WatchKind::Watched))
            .unwrap();
        store
            .add_watch_entry(user, entry(2, 120, WatchKind::Watched))
            .unwrap();
        store
            .add_watch_entry(user, entry(3, 500, WatchKind::Want))
            .unwrap();

        assert_eq!(store.total_watch_time(user).unwrap(), 210);
    }

    #[test]
    fn list_status_distinguishes_wanted_movies() {
        let (store, user) = store_with_user();
        store
            .add_watch_entry(user, entry(1, 90, WatchKind::Watched))
            .unwrap();
        store
            .add_watch_entry(user, entry(2, 90, WatchKind::Want))
            .unwrap();

        assert_eq!(store.list_status(user, movie(1)).unwrap(), ListStatus {
            watched: true,
            watchlist: false,
        });
        assert_eq!(store.list_status(user, movie(2)).unwrap(), ListStatus {
            watched: true,
            watchlist: true,
        });
        assert_eq!(store.list_status(user, movie(3)).unwrap(), ListStatus::default());
    }

    #[test]
    fn kind_round_trips_through_its_name() {
        assert_eq!(WatchKind::Want.to_string(), "want");
        assert_eq!("watched".parse::<WatchKind>().unwrap(), WatchKind::Watched);
        assert_matches!("seen".parse::<WatchKind>(), Err(Error::Corrupt(_)));
    }
}
