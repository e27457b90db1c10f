use thiserror::Error;

#[derive(Debug, Error)]
pub enum Error {
    #[error("storage error: {0}")]
    Storage(rusqlite::Error),

    #[error("not found")]
    NotFound,

    /// `extended_code` is SQLite's extended result code, e.g.
    /// `SQLITE_CONSTRAINT_UNIQUE` or `SQLITE_CONSTRAINT_FOREIGNKEY`.
    #[error("constraint violation: {message}")]
    ConstraintViolation { extended_code: i32, message: String },

    #[error("forbidden")]
    Forbidden,

    #[error("io error: {0}")]
    Io(#[from] std::io::Error),

    #[error("invalid configuration: {0}")]
    Config(String),
}

impl From<rusqlite::Error> for Error {
    fn from(err: rusqlite::Error) -> Self {
        match err {
            rusqlite::Error::SqliteFailure(ref e, ref message)
                if e.code == rusqlite::ErrorCode::ConstraintViolation =>
            {
                Error::ConstraintViolation {
                    extended_code: e.extended_code,
                    message: message.clone().unwrap_or_else(|| e.to_string()),
                }
            }
            other => Error::Storage(other),
        }
    }
}

impl Error {
    /// True when a concurrent writer already produced the row this call tried
    /// to insert. Only unique-index failures qualify; foreign key, NOT NULL
    /// and trigger failures would fail the same way again.
    #[must_use]
    pub fn is_conflict(&self) -> bool {
        matches!(
            self,
            Error::ConstraintViolation { extended_code, .. }
                if *extended_code == rusqlite::ffi::SQLITE_CONSTRAINT_UNIQUE
        )
    }
}

pub type Result<T> = std::result::Result<T, Error>;

#[cfg(test)]
mod tests {
    use rusqlite::Connection;

    use super::*;

    fn failing_insert(sql: &str) -> Error {
        let conn = Connection::open_in_memory().unwrap();
        conn.execute_batch(
            "PRAGMA foreign_keys = ON;
             CREATE TABLE parents (id INTEGER PRIMARY KEY);
             CREATE TABLE children (
                 id INTEGER PRIMARY KEY,
                 parent_id INTEGER NOT NULL REFERENCES parents(id),
                 name TEXT UNIQUE
             );
             INSERT INTO parents (id) VALUES (1);
             INSERT INTO children (parent_id, name) VALUES (1, 'taken');",
        )
        .unwrap();
        Error::from(conn.execute(sql, []).unwrap_err())
    }

    #[test]
    fn test_unique_violation_is_conflict() {
        let err = failing_insert("INSERT INTO children (parent_id, name) VALUES (1, 'taken')");
        assert!(matches!(err, Error::ConstraintViolation { .. }));
        assert!(err.is_conflict());
    }

    #[test]
    fn test_other_constraints_are_not_conflicts() {
        let fk = failing_insert("INSERT INTO children (parent_id, name) VALUES (7, 'new')");
        assert!(matches!(fk, Error::ConstraintViolation { .. }));
        assert!(!fk.is_conflict());

        let not_null = failing_insert("INSERT INTO children (parent_id, name) VALUES (NULL, 'new')");
        assert!(matches!(not_null, Error::ConstraintViolation { .. }));
        assert!(!not_null.is_conflict());
    }
}
