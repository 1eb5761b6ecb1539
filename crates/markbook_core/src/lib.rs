//! Core domain logic for Markbook.
//! This crate is the single source of truth for business invariants.

pub mod db;
pub mod logging;
pub mod model;
pub mod repo;
pub mod service;
pub mod session;

pub use logging::{default_log_level, init_logging, logging_status};
pub use model::score::{ParseScoreError, Score};
pub use model::test_record::{RecordId, RecordValidationError, TestRecord};
pub use repo::test_record_repo::{
    SqliteTestRecordRepository, StoreError, StoreResult, TestRecordRepository,
};
pub use service::record_service::RecordService;
pub use session::{Session, SessionManager, SessionTransaction};

/// Minimal health-check API for early integration.
pub fn ping() -> &'static str {
    "pong"
}

/// Returns the core crate version.
pub fn core_version() -> &'static str {
    env!("CARGO_PKG_VERSION")
}
