//! Domain model for student test records.
//!
//! # Responsibility
//! - Define the canonical data structures used by the record store.
//! - Keep value semantics exact: calendar dates carry no time-of-day and
//!   scores carry no floating-point approximation.
//!
//! # Invariants
//! - Every persisted record is identified by a store-assigned `RecordId`.
//! - Deletion is permanent; there are no tombstones.

pub mod score;
pub mod test_record;
