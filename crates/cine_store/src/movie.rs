use std::{fmt, num::TryFromIntError};

use rusqlite::{
    ToSql,
    types::{FromSql, FromSqlError, FromSqlResult, ToSqlOutput, ValueRef},
};
use serde::{Deserialize, Serialize};

/// An upstream movie id.
///
/// SQLite integers are signed, so only ids up to `i64::MAX` can be stored.
/// Larger ids are rejected when the value is built, including when it is
/// deserialized from a request.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(try_from = "u64")]
pub struct MovieId(i64);

impl MovieId {
    #[must_use]
    pub const fn get(self) -> u64 {
        self.0.unsigned_abs()
    }
}

impl TryFrom<u64> for MovieId {
    type Error = TryFromIntError;

    fn try_from(id: u64) -> Result<Self, Self::Error> {
        i64::try_from(id).map(Self)
    }
}

impl From<MovieId> for u64 {
    fn from(id: MovieId) -> Self {
        id.get()
    }
}

impl fmt::Display for MovieId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        self.0.fmt(f)
    }
}

impl ToSql for MovieId {
    fn to_sql(&self) -> rusqlite::Result<ToSqlOutput<'_>> {
        Ok(self.0.into())
    }
}

impl FromSql for MovieId {
    fn column_result(value: ValueRef<'_>) -> FromSqlResult<Self> {
        match i64::column_result(value)? {
            id if id < 0 => Err(FromSqlError::OutOfRange(id)),
            id => Ok(Self(id)),
        }
    }
}
