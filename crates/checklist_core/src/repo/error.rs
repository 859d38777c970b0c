//! Repository error taxonomy.
//!
//! # Responsibility
//! - Name the stored entity a lookup failed on.
//! - Separate semantic failures (`NotFound`, `DuplicateName`) from storage
//!   transport and schema-shape failures.
//!
//! # Invariants
//! - Every SQLite error reaches callers wrapped in `RepoError::Db`.

use crate::db::DbError;
use crate::model::boss::BossId;
use crate::model::category::CategoryId;
use crate::model::object::ObjectId;
use crate::model::quest::{QuestId, StepId};
use std::error::Error;
use std::fmt::{Display, Formatter};

/// Result type used by repository operations.
pub type RepoResult<T> = Result<T, RepoError>;

/// Typed reference to one stored entity, used in not-found reporting.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum EntityRef {
    Category(CategoryId),
    Object(ObjectId),
    Boss(BossId),
    Quest(QuestId),
    Step(StepId),
}

impl Display for EntityRef {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Category(id) => write!(f, "category {id}"),
            Self::Object(id) => write!(f, "object {id}"),
            Self::Boss(id) => write!(f, "boss {id}"),
            Self::Quest(id) => write!(f, "quest {id}"),
            Self::Step(id) => write!(f, "step {id}"),
        }
    }
}

/// Errors from repository operations.
#[derive(Debug)]
pub enum RepoError {
    /// Underlying SQLite/bootstrap error.
    Db(DbError),
    /// Target row does not exist.
    NotFound(EntityRef),
    /// Unique name constraint rejected the write.
    DuplicateName { entity: &'static str, name: String },
    /// One step id is embedded in more than one quest document.
    AmbiguousStepOwner(StepId),
    /// Connection schema is not at the expected migrated version.
    UninitializedConnection {
        expected_version: u32,
        actual_version: u32,
    },
    /// Required table is missing.
    MissingRequiredTable(&'static str),
    /// Required column is missing from expected table.
    MissingRequiredColumn {
        table: &'static str,
        column: &'static str,
    },
    /// Persisted data cannot be converted to a valid read model.
    InvalidData(String),
}

impl Display for RepoError {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Db(err) => write!(f, "{err}"),
            Self::NotFound(entity) => write!(f, "{entity} not found"),
            Self::DuplicateName { entity, name } => {
                write!(f, "{entity} name `{name}` is already taken")
            }
            Self::AmbiguousStepOwner(id) => {
                write!(f, "step {id} is embedded in more than one quest")
            }
            Self::UninitializedConnection {
                expected_version,
                actual_version,
            } => write!(
                f,
                "repository requires schema version {expected_version}, got {actual_version}"
            ),
            Self::MissingRequiredTable(table) => {
                write!(f, "repository requires table `{table}`")
            }
            Self::MissingRequiredColumn { table, column } => write!(
                f,
                "repository requires column `{column}` in table `{table}`"
            ),
            Self::InvalidData(message) => write!(f, "invalid persisted data: {message}"),
        }
    }
}

impl Error for RepoError {
    fn source(&self) -> Option<&(dyn Error + 'static)> {
        match self {
            Self::Db(err) => Some(err),
            _ => None,
        }
    }
}

impl From<DbError> for RepoError {
    fn from(value: DbError) -> Self {
        Self::Db(value)
    }
}

impl From<rusqlite::Error> for RepoError {
    fn from(value: rusqlite::Error) -> Self {
        Self::Db(DbError::Sqlite(value))
    }
}
