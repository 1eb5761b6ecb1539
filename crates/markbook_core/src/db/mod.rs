//! SQLite storage bootstrap entry points.
//!
//! # Responsibility
//! - Open and configure SQLite connections for the record store.
//! - Provision the baseline `test_records` schema idempotently.
//!
//! # Invariants
//! - Returned connections have pragmas applied and the schema in place.
//! - There is no migration machinery: the schema has exactly one shape and
//!   provisioning never alters existing tables.

use std::error::Error;
use std::fmt::{Display, Formatter};

mod open;
pub mod schema;

pub use open::{open_db, open_db_in_memory};

pub type DbResult<T> = Result<T, DbError>;

/// Database-transport failure.
#[derive(Debug)]
pub enum DbError {
    /// Underlying SQLite error from any statement or bootstrap step.
    Sqlite(rusqlite::Error),
    /// The connection could not be closed cleanly at shutdown.
    Close(rusqlite::Error),
}

impl Display for DbError {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Sqlite(err) => write!(f, "{err}"),
            Self::Close(err) => write!(f, "failed to close connection: {err}"),
        }
    }
}

impl Error for DbError {
    fn source(&self) -> Option<&(dyn Error + 'static)> {
        match self {
            Self::Sqlite(err) => Some(err),
            Self::Close(err) => Some(err),
        }
    }
}

impl From<rusqlite::Error> for DbError {
    fn from(value: rusqlite::Error) -> Self {
        Self::Sqlite(value)
    }
}
