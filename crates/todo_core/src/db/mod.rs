//! Database layer behind the list document store.
//!
//! # Responsibility
//! - Hand out SQLite connections that are configured, migrated and ready
//!   for `SqliteDocumentStore::try_new`.
//! - Answer the health check run by binaries before serving commands.
//!
//! # Invariants
//! - `PRAGMA user_version` equals the highest applied migration.
//! - A connection is never returned before its migrations succeed.

use std::error::Error;
use std::fmt::{Display, Formatter};

pub mod migrations;
mod open;

pub use open::{open_db, open_db_in_memory, ping};

/// Failure while opening, migrating or checking a database.
#[derive(Debug)]
pub enum DbError {
    Sqlite(rusqlite::Error),
    /// The file was written by a newer build of this crate.
    UnsupportedSchemaVersion {
        db_version: u32,
        latest_supported: u32,
    },
    /// A health check query answered, but not with the expected value.
    Unhealthy {
        check: &'static str,
        answer: String,
    },
}

pub type DbResult<T> = Result<T, DbError>;

impl Display for DbError {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Sqlite(err) => write!(f, "sqlite: {err}"),
            Self::UnsupportedSchemaVersion {
                db_version,
                latest_supported,
            } => write!(
                f,
                "schema version {db_version} is newer than this build supports ({latest_supported})"
            ),
            Self::Unhealthy { check, answer } => {
                write!(f, "health check `{check}` answered `{answer}`")
            }
        }
    }
}

impl Error for DbError {
    fn source(&self) -> Option<&(dyn Error + 'static)> {
        if let Self::Sqlite(err) = self {
            return Some(err);
        }
        None
    }
}

impl From<rusqlite::Error> for DbError {
    fn from(value: rusqlite::Error) -> Self {
        Self::Sqlite(value)
    }
}
