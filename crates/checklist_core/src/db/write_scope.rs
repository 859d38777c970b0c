//! RAII write scope around one document mutation.
//!
//! # Invariants
//! - The scope is an IMMEDIATE transaction: the write lock is taken up front,
//!   so read-check-write sequences inside it cannot interleave with another
//!   writer.
//! - Dropping the transaction without commit rolls back, which covers every
//!   early `?` return and panics inside the closure.
//! - A scope opened while the connection is already inside a transaction
//!   joins the outer one instead of nesting.

use crate::db::DbError;
use rusqlite::{Connection, Transaction, TransactionBehavior};

/// Runs `body` inside one IMMEDIATE transaction on `conn`.
///
/// # Errors
/// - Returns the body error unchanged (after rollback).
/// - Returns `E::from(DbError)` when begin/commit fails.
pub fn write_scope<T, E, F>(conn: &Connection, body: F) -> Result<T, E>
where
    F: FnOnce() -> Result<T, E>,
    E: From<DbError>,
{
    if !conn.is_autocommit() {
        return body();
    }

    let tx = Transaction::new_unchecked(conn, TransactionBehavior::Immediate)
        .map_err(DbError::from)?;
    let value = body()?;
    tx.commit().map_err(DbError::from)?;
    Ok(value)
}
