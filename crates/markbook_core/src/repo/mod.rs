//! Repository layer abstractions and persistence implementations.
//!
//! # Responsibility
//! - Define use-case oriented data access contracts.
//! - Isolate SQLite query details from service/business orchestration.
//!
//! # Invariants
//! - Store writes must enforce `TestRecord::validate()` before persistence.
//! - Store APIs report "no match" as zero-count/empty results, never as
//!   errors.

pub mod test_record_repo;
