use rusqlite::ErrorCode;

pub type Result<T> = std::result::Result<T, Error>;

#[derive(Debug, thiserror::Error)]
pub enum Error {
    #[error("Database error: {0}")]
    Sqlite(#[from] rusqlite::Error),

    #[error("{0} already exists")]
    Conflict(&'static str),

    #[error("Corrupt record: {0}")]
    Corrupt(String),
}

/// Map a unique-constraint violation to [`Error::Conflict`].
pub(crate) fn conflict_on_unique(what: &'static str) -> impl Fn(rusqlite::Error) -> Error {
    move |error| match error.sqlite_error_code() {
        Some(ErrorCode::ConstraintViolation) => Error::Conflict(what),
        _ => Error::Sqlite(error),
    }
}

#[cfg(test)]
impl PartialEq for Error {
    fn eq(&self, other: &Self) -> bool {
        if std::mem::discriminant(self) != std::mem::discriminant(other) {
            return false;
        }

        // Good enough for testing purposes
        format!("{self:?}") == format!("{other:?}")
    }
}
