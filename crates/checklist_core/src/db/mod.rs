//! SQLite storage bootstrap, schema migrations and write scopes.
//!
//! # Responsibility
//! - Open and configure SQLite connections for the checklist core.
//! - Apply schema migrations in deterministic order.
//! - Provide the single-document write scope used by every mutation.
//!
//! # Invariants
//! - Migration version is tracked via `PRAGMA user_version`.
//! - Core code must not read/write application data before migrations succeed.
//! - A write scope commits on `Ok` and rolls back on `Err` or unwind.

use std::error::Error;
use std::fmt::{Display, Formatter};

pub mod migrations;
mod open;
mod write_scope;

pub use open::{open_db, open_db_in_memory};
pub use write_scope::write_scope;

pub type DbResult<T> = Result<T, DbError>;

#[derive(Debug)]
pub enum DbError {
    Sqlite(rusqlite::Error),
    UnsupportedSchemaVersion {
        db_version: u32,
        latest_supported: u32,
    },
}

impl Display for DbError {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Sqlite(err) => write!(f, "{err}"),
            Self::UnsupportedSchemaVersion {
                db_version,
                latest_supported,
            } => write!(
                f,
                "database schema version {db_version} is newer than supported {latest_supported}"
            ),
        }
    }
}

impl Error for DbError {
    fn source(&self) -> Option<&(dyn Error + 'static)> {
        match self {
            Self::Sqlite(err) => Some(err),
            Self::UnsupportedSchemaVersion { .. } => None,
        }
    }
}

impl From<rusqlite::Error> for DbError {
    fn from(value: rusqlite::Error) -> Self {
        Self::Sqlite(value)
    }
}
