//! Record use-case service.
//!
//! # Responsibility
//! - Provide stable entry points for presentation-layer callers.
//! - Delegate persistence to the record store.
//! - Log operation boundaries with durations and outcome codes.
//!
//! # Invariants
//! - Service APIs never bypass store validation/persistence contracts.
//! - Log lines carry metadata only, never student names or scores.

use std::time::Instant;

use chrono::NaiveDate;
use log::{error, info};

use crate::model::score::Score;
use crate::model::test_record::{RecordId, TestRecord};
use crate::repo::test_record_repo::{StoreError, StoreResult, TestRecordRepository};

/// Use-case service wrapper for record store operations.
pub struct RecordService<R: TestRecordRepository> {
    repo: R,
}

impl<R: TestRecordRepository> RecordService<R> {
    /// Creates a service using the provided store implementation.
    pub fn new(repo: R) -> Self {
        Self { repo }
    }

    /// Records one test result from its fields.
    ///
    /// # Contract
    /// - Builds the record internally; the store assigns its id.
    /// - Returns the store-assigned id of the new record.
    pub fn create_record(
        &self,
        first_name: impl Into<String>,
        last_name: impl Into<String>,
        score: Score,
        test_date: NaiveDate,
    ) -> StoreResult<RecordId> {
        let started = Instant::now();
        info!("event=record_create module=service status=start");
        let record = TestRecord::new(first_name, last_name, score, test_date);
        match self.repo.create_record(&record) {
            Ok(id) => {
                info!(
                    "event=record_create module=service status=ok duration_ms={} id={id}",
                    started.elapsed().as_millis()
                );
                Ok(id)
            }
            Err(err) => {
                error!(
                    "event=record_create module=service status=error duration_ms={} error_code={} error={err}",
                    started.elapsed().as_millis(),
                    error_code(&err)
                );
                Err(err)
            }
        }
    }

    /// All records for an exact last name.
    pub fn find_by_last_name(&self, last_name: &str) -> StoreResult<Vec<TestRecord>> {
        let started = Instant::now();
        info!("event=record_find_by_last_name module=service status=start");
        match self.repo.find_by_last_name(last_name) {
            Ok(records) => {
                info!(
                    "event=record_find_by_last_name module=service status=ok duration_ms={} count={}",
                    started.elapsed().as_millis(),
                    records.len()
                );
                Ok(records)
            }
            Err(err) => {
                error!(
                    "event=record_find_by_last_name module=service status=error duration_ms={} error_code={} error={err}",
                    started.elapsed().as_millis(),
                    error_code(&err)
                );
                Err(err)
            }
        }
    }

    /// All records dated on or after `date`.
    pub fn find_by_date_on_or_after(&self, date: NaiveDate) -> StoreResult<Vec<TestRecord>> {
        let started = Instant::now();
        info!("event=record_find_by_date module=service status=start");
        match self.repo.find_by_date_on_or_after(date) {
            Ok(records) => {
                info!(
                    "event=record_find_by_date module=service status=ok duration_ms={} count={}",
                    started.elapsed().as_millis(),
                    records.len()
                );
                Ok(records)
            }
            Err(err) => {
                error!(
                    "event=record_find_by_date module=service status=error duration_ms={} error_code={} error={err}",
                    started.elapsed().as_millis(),
                    error_code(&err)
                );
                Err(err)
            }
        }
    }

    /// All records with scores in `[min, max]` inclusive.
    pub fn find_by_score_range(&self, min: Score, max: Score) -> StoreResult<Vec<TestRecord>> {
        let started = Instant::now();
        info!("event=record_find_by_score_range module=service status=start");
        match self.repo.find_by_score_range(min, max) {
            Ok(records) => {
                info!(
                    "event=record_find_by_score_range module=service status=ok duration_ms={} count={}",
                    started.elapsed().as_millis(),
                    records.len()
                );
                Ok(records)
            }
            Err(err) => {
                error!(
                    "event=record_find_by_score_range module=service status=error duration_ms={} error_code={} error={err}",
                    started.elapsed().as_millis(),
                    error_code(&err)
                );
                Err(err)
            }
        }
    }

    /// Atomically rescores every record matching a last name and date.
    ///
    /// Returns the number of records updated; `0` when nothing matched.
    pub fn update_score_by_last_name_and_date(
        &self,
        last_name: &str,
        test_date: NaiveDate,
        new_score: Score,
    ) -> StoreResult<usize> {
        let started = Instant::now();
        info!("event=record_update_score module=service status=start");
        match self
            .repo
            .update_score_by_last_name_and_date(last_name, test_date, new_score)
        {
            Ok(count) => {
                info!(
                    "event=record_update_score module=service status=ok duration_ms={} count={count}",
                    started.elapsed().as_millis()
                );
                Ok(count)
            }
            Err(err) => {
                error!(
                    "event=record_update_score module=service status=error duration_ms={} error_code={} error={err}",
                    started.elapsed().as_millis(),
                    error_code(&err)
                );
                Err(err)
            }
        }
    }

    /// Atomically deletes every record matching a last name.
    ///
    /// Returns the number of records deleted; `0` when nothing matched.
    pub fn delete_by_last_name(&self, last_name: &str) -> StoreResult<usize> {
        let started = Instant::now();
        info!("event=record_delete module=service status=start");
        match self.repo.delete_by_last_name(last_name) {
            Ok(count) => {
                info!(
                    "event=record_delete module=service status=ok duration_ms={} count={count}",
                    started.elapsed().as_millis()
                );
                Ok(count)
            }
            Err(err) => {
                error!(
                    "event=record_delete module=service status=error duration_ms={} error_code={} error={err}",
                    started.elapsed().as_millis(),
                    error_code(&err)
                );
                Err(err)
            }
        }
    }
}

/// Stable outcome code per error variant for log lines.
fn error_code(err: &StoreError) -> &'static str {
    match err {
        StoreError::Validation(_) => "validation_rejected",
        StoreError::Persistence(_) => "persistence_failed",
        StoreError::InvalidData(_) => "invalid_data",
        StoreError::MissingRequiredTable(_) | StoreError::MissingRequiredColumn { .. } => {
            "store_not_provisioned"
        }
    }
}
