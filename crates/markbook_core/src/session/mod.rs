//! Session and transaction management for store operations.
//!
//! # Responsibility
//! - Own the store connection handle and bound its use to one logical
//!   operation at a time.
//! - Provide the begin/commit/rollback protocol for mutating operations.
//! - Guarantee session release on every exit path: success, business
//!   failure, or panic unwinding.
//!
//! # Invariants
//! - Each operation acquires exactly one [`Session`] and at most one
//!   [`SessionTransaction`]; neither outlives [`SessionManager::with_session`].
//! - Commit is the single point where changes become durable; a transaction
//!   dropped without commit rolls back.
//! - [`SessionManager::shutdown`] consumes the manager, so it can only be
//!   called once, and only after all repositories borrowing it are gone.
//!
//! State machine per operation:
//! `Idle -> SessionAcquired -> [TransactionOpen -> Committed |
//! TransactionOpen -> RolledBack] -> SessionReleased -> Idle`.
//! Read-only operations skip the transaction states.

use crate::db::{DbError, DbResult};
use log::{debug, error, info};
use rusqlite::{Connection, Transaction, TransactionBehavior};
use std::ops::Deref;

/// Owner of the store connection handle.
///
/// Constructed explicitly at startup and injected into repositories; there
/// is no process-wide connection state. The connection is handed out only as
/// scoped [`Session`] borrows.
pub struct SessionManager {
    conn: Connection,
}

impl SessionManager {
    /// Wraps an opened connection (see [`crate::db::open_db`]).
    pub fn new(conn: Connection) -> Self {
        Self { conn }
    }

    /// Runs one logical operation inside a bounded session.
    ///
    /// # Contract
    /// - The session is released when this returns, whether `operation`
    ///   succeeds, returns an error, or panics (release rides on `Drop`).
    /// - `operation` must not stash the `&Session` anywhere; the borrow
    ///   checker enforces that it cannot escape.
    pub fn with_session<T, E, F>(&self, op: &'static str, operation: F) -> Result<T, E>
    where
        F: FnOnce(&Session<'_>) -> Result<T, E>,
    {
        let session = Session::acquire(&self.conn, op);
        operation(&session)
    }

    /// Closes the connection and releases the store handle.
    ///
    /// The owning process calls this exactly once at exit; taking `self` by
    /// value makes a second call impossible. Repositories borrowing the
    /// manager must be dropped first.
    pub fn shutdown(self) -> DbResult<()> {
        info!("event=store_shutdown module=session status=start");
        match self.conn.close() {
            Ok(()) => {
                info!("event=store_shutdown module=session status=ok");
                Ok(())
            }
            Err((_conn, err)) => {
                error!(
                    "event=store_shutdown module=session status=error error_code=close_failed error={err}"
                );
                Err(DbError::Close(err))
            }
        }
    }
}

/// One bounded unit of connection use.
///
/// Obtained only through [`SessionManager::with_session`]. Dropping the
/// session (on any path out of the closure) releases it.
pub struct Session<'mgr> {
    conn: &'mgr Connection,
    op: &'static str,
}

impl<'mgr> Session<'mgr> {
    fn acquire(conn: &'mgr Connection, op: &'static str) -> Self {
        debug!("event=session_acquire module=session op={op}");
        Self { conn, op }
    }

    /// Read access for query operations, which skip the transaction states.
    pub fn connection(&self) -> &Connection {
        self.conn
    }

    /// Opens the session's single write transaction (`BEGIN IMMEDIATE`).
    ///
    /// # Errors
    /// - Returns the SQLite error when the database is unreachable or a
    ///   transaction is already open on this connection.
    pub fn begin_transaction(&self) -> DbResult<SessionTransaction<'_>> {
        let tx = Transaction::new_unchecked(self.conn, TransactionBehavior::Immediate)?;
        debug!("event=tx_begin module=session op={}", self.op);
        Ok(SessionTransaction { tx, op: self.op })
    }
}

impl Drop for Session<'_> {
    fn drop(&mut self) {
        debug!("event=session_release module=session op={}", self.op);
    }
}

/// Write transaction scoped to one session.
///
/// Derefs to [`rusqlite::Transaction`] for statement execution. Consuming it
/// via [`SessionTransaction::commit`] is the only way changes become
/// durable; [`SessionTransaction::rollback`] discards them explicitly, and
/// dropping it (the fault path) rolls back through the underlying
/// transaction's drop behavior.
pub struct SessionTransaction<'conn> {
    tx: Transaction<'conn>,
    op: &'static str,
}

impl SessionTransaction<'_> {
    /// Commits the batch, making it durable and visible to later reads.
    pub fn commit(self) -> DbResult<()> {
        self.tx.commit()?;
        debug!("event=tx_commit module=session op={}", self.op);
        Ok(())
    }

    /// Rolls the batch back explicitly ("no changes to apply" path).
    pub fn rollback(self) -> DbResult<()> {
        self.tx.rollback()?;
        debug!("event=tx_rollback module=session op={}", self.op);
        Ok(())
    }
}

impl<'conn> Deref for SessionTransaction<'conn> {
    type Target = Transaction<'conn>;

    fn deref(&self) -> &Self::Target {
        &self.tx
    }
}
