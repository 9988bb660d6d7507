use thiserror::Error;

/// Errors surfaced by the store, kept close to the raw SQLite diagnostics:
/// callers branch on result codes (or the message, where SQLite only gives
/// a message) rather than on pre-digested categories.
#[derive(Debug, Error)]
pub enum StoreError {
    /// A single-row lookup matched nothing. The one negative outcome that
    /// duplicate-probe call sites treat as acceptable.
    #[error("no matching row")]
    NotFound,

    /// SQLite failure with its result codes carried through unmodified.
    #[error("{message} (code {extended_code})")]
    Sqlite {
        /// Primary result code (low byte of the extended code).
        code: i32,
        /// Extended result code, e.g. 2067 for a UNIQUE violation.
        extended_code: i32,
        message: String,
    },

    /// rusqlite-level failure with no SQLite code attached (type mismatch,
    /// invalid query shape, and similar).
    #[error("store error: {0}")]
    Internal(String),

    /// A connection lock was poisoned by a panicking thread.
    #[error("store lock poisoned")]
    Poisoned,
}

impl From<rusqlite::Error> for StoreError {
    fn from(err: rusqlite::Error) -> Self {
        match err {
            rusqlite::Error::QueryReturnedNoRows => StoreError::NotFound,
            rusqlite::Error::SqliteFailure(e, msg) => StoreError::Sqlite {
                code: e.extended_code & 0xff,
                extended_code: e.extended_code,
                message: msg.unwrap_or_else(|| e.to_string()),
            },
            other => StoreError::Internal(other.to_string()),
        }
    }
}

impl StoreError {
    /// Extended SQLite result code, if this error carries one.
    pub fn sqlite_code(&self) -> Option<i32> {
        match self {
            StoreError::Sqlite { extended_code, .. } => Some(*extended_code),
            _ => None,
        }
    }

    /// A UNIQUE or PRIMARY KEY constraint was violated.
    pub fn is_unique_violation(&self) -> bool {
        // SQLITE_CONSTRAINT_UNIQUE / SQLITE_CONSTRAINT_PRIMARYKEY
        matches!(self.sqlite_code(), Some(2067) | Some(1555))
    }

    /// "relation not found" class: the statement referenced a missing table.
    pub fn is_missing_table(&self) -> bool {
        matches!(self, StoreError::Sqlite { message, .. } if message.contains("no such table"))
    }

    /// "column not found" class: the table exists but lacks a column the
    /// statement referenced. SQLite phrases this two ways depending on
    /// whether the statement reads or writes.
    pub fn is_missing_column(&self) -> bool {
        matches!(
            self,
            StoreError::Sqlite { message, .. }
                if message.contains("no such column") || message.contains("has no column named")
        )
    }

    /// The UNIQUE constraint name SQLite reports, e.g. `users.username`.
    pub fn violated_constraint(&self) -> Option<&str> {
        match self {
            StoreError::Sqlite { message, .. } if self.is_unique_violation() => message
                .rsplit_once("constraint failed: ")
                .map(|(_, constraint)| constraint.trim()),
            _ => None,
        }
    }
}
