//! Repository layer abstractions and persistence implementations.
//!
//! # Responsibility
//! - Define per-aggregate data access contracts.
//! - Isolate SQLite query details from service orchestration.
//!
//! # Invariants
//! - Repository APIs return semantic errors (`NotFound`, `DuplicateName`) in
//!   addition to DB transport errors.
//! - Repositories handed to one service share one connection, so a write
//!   scope opened through any of them covers all of them.

use crate::db::DbError;

pub mod boss_repo;
pub mod category_repo;
mod error;
pub mod object_repo;
pub mod quest_repo;
mod support;

pub use error::{EntityRef, RepoError, RepoResult};

/// Access to the single-document write scope of the underlying connection.
pub trait WriteScope {
    /// Runs `body` inside one write transaction; see [`crate::db::write_scope`].
    fn write_scope<T, E, F>(&self, body: F) -> Result<T, E>
    where
        F: FnOnce() -> Result<T, E>,
        E: From<DbError>;
}
