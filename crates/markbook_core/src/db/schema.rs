//! Baseline schema provisioning.
//!
//! # Responsibility
//! - Create the `test_records` table and its query indexes when absent.
//!
//! # Invariants
//! - Every statement is `IF NOT EXISTS`; provisioning is idempotent.
//! - Ids are `AUTOINCREMENT` and therefore never reused after deletes.
//! - `test_date` is ISO-8601 `TEXT`, so lexicographic order equals
//!   chronological order; `score` is `INTEGER` hundredths of a point and
//!   constrained non-negative by the store.

use crate::db::DbResult;
use rusqlite::Connection;

const SCHEMA_SQL: &str = include_str!("schema.sql");

/// Applies the baseline schema on the provided connection.
///
/// This provisions a fixed layout; it is not migration. A database whose
/// tables already exist is left untouched.
pub fn ensure_schema(conn: &mut Connection) -> DbResult<()> {
    let tx = conn.transaction()?;
    tx.execute_batch(SCHEMA_SQL)?;
    tx.commit()?;
    Ok(())
}
