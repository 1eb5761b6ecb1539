//! Test record domain model.
//!
//! # Responsibility
//! - Define the canonical record persisted in `test_records`.
//! - Enforce field validity before any write and after any read-back.
//!
//! # Invariants
//! - `id` is store-assigned: `None` until first persisted, then immutable.
//! - `first_name`/`last_name` are non-empty after trimming.
//! - `score` is the only field mutated after creation.

use crate::model::score::Score;
use chrono::NaiveDate;
use serde::{Deserialize, Serialize};
use std::error::Error;
use std::fmt::{Display, Formatter};

/// Store-assigned record identifier (SQLite rowid).
///
/// Kept as a type alias to make semantic intent explicit in signatures.
pub type RecordId = i64;

/// One student test result.
///
/// A student may have any number of records, and last names are not unique
/// across students; name-based lookups are ambiguous by design.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TestRecord {
    /// `None` for records not yet persisted; assigned by the store on create.
    pub id: Option<RecordId>,
    /// Student first name. Non-empty.
    pub first_name: String,
    /// Student last name. Non-empty. Matched byte-exact by name queries.
    pub last_name: String,
    /// Calendar date the test was administered (no time-of-day).
    pub test_date: NaiveDate,
    /// Earned score. Exact decimal; see [`Score`].
    pub score: Score,
}

/// Validation failure for a [`TestRecord`].
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RecordValidationError {
    /// First name is empty or whitespace only.
    EmptyFirstName,
    /// Last name is empty or whitespace only.
    EmptyLastName,
    /// A record that already carries a store-assigned id was offered for
    /// creation.
    IdAlreadyAssigned,
}

impl Display for RecordValidationError {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::EmptyFirstName => write!(f, "first name must not be empty"),
            Self::EmptyLastName => write!(f, "last name must not be empty"),
            Self::IdAlreadyAssigned => {
                write!(f, "record already has a store-assigned id")
            }
        }
    }
}

impl Error for RecordValidationError {}

impl TestRecord {
    /// Creates an in-memory record with no id.
    ///
    /// # Invariants
    /// - The record stays invisible to the store until persisted through a
    ///   repository, which assigns the id.
    pub fn new(
        first_name: impl Into<String>,
        last_name: impl Into<String>,
        score: Score,
        test_date: NaiveDate,
    ) -> Self {
        Self {
            id: None,
            first_name: first_name.into(),
            last_name: last_name.into(),
            test_date,
            score,
        }
    }

    /// Checks field validity shared by write paths and read-back paths.
    ///
    /// # Errors
    /// - [`RecordValidationError::EmptyFirstName`] /
    ///   [`RecordValidationError::EmptyLastName`] when a name is blank.
    pub fn validate(&self) -> Result<(), RecordValidationError> {
        if self.first_name.trim().is_empty() {
            return Err(RecordValidationError::EmptyFirstName);
        }
        if self.last_name.trim().is_empty() {
            return Err(RecordValidationError::EmptyLastName);
        }
        Ok(())
    }

    /// Returns whether the store has assigned an id yet.
    pub fn is_persisted(&self) -> bool {
        self.id.is_some()
    }
}
