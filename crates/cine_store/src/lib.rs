//! Per-user records: accounts, watch-list entries and movie notes.
//!
//! Everything lives in a single SQLite database. Movies themselves are
//! never stored, only their upstream ids.

pub mod error;
mod movie;
mod notes;
mod users;
mod watch_list;

use std::path::Path;

use parking_lot::Mutex;
use rusqlite::Connection;
use tracing::trace;

pub use error::{Error, Result};
pub use movie::MovieId;
pub use notes::Note;
pub use users::{User, UserId};
pub use watch_list::{ListStatus, NewWatchEntry, WatchEntry, WatchKind};

const SCHEMA: &str = "
    PRAGMA foreign_keys = ON;

    CREATE TABLE IF NOT EXISTS users (
        id            INTEGER PRIMARY KEY AUTOINCREMENT,
        email         TEXT NOT NULL UNIQUE,
        password_hash TEXT NOT NULL,
        created_at    TEXT NOT NULL
    );

    CREATE TABLE IF NOT EXISTS watch_entries (
        user_id    INTEGER NOT NULL REFERENCES users (id) ON DELETE CASCADE,
        movie_id   INTEGER NOT NULL,
        runtime    INTEGER NOT NULL,
        kind       TEXT NOT NULL,
        created_at TEXT NOT NULL,
        PRIMARY KEY (user_id, movie_id)
    );

    CREATE TABLE IF NOT EXISTS notes (
        id         INTEGER PRIMARY KEY AUTOINCREMENT,
        user_id    INTEGER NOT NULL REFERENCES users (id) ON DELETE CASCADE,
        movie_id   INTEGER NOT NULL,
        note       TEXT NOT NULL,
        created_at TEXT NOT NULL,
        UNIQUE (user_id, movie_id)
    );
";

#[derive(Debug)]
pub struct Store {
    conn: Mutex<Connection>,
}

impl Store {
    /// Open (and if needed create) the database at `path`.
    pub fn open(path: impl AsRef<Path>) -> Result<Self> {
        let path = path.as_ref();
        trace!(path = %path.display(), "Opening store.");

        Self::init(Connection::open(path)?)
    }

    /// A private database that disappears with the store.
    pub fn in_memory() -> Result<Self> {
        Self::init(Connection::open_in_memory()?)
    }

    fn init(conn: Connection) -> Result<Self> {
        conn.execute_batch(SCHEMA)?;

        Ok(Self {
            conn: Mutex::new(conn),
        })
    }
}
