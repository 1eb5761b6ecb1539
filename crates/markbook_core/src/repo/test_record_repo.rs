//! # Responsibility
//! Persistence for test records: create, targeted finds, and bulk
//! score/delete mutations keyed by student identity.
//!
//! # Invariants
//! - Every mutation runs inside a single immediate transaction; a batch
//!   either applies to every matched row or to none.
//! - Read paths reject invalid persisted state instead of masking it.
//! - Result ordering is deterministic: `test_date ASC, id ASC` for record
//!   queries, `id ASC` for the id scans that drive mutations.

use chrono::NaiveDate;
use rusqlite::{params, Connection, Row};

use crate::db::DbError;
use crate::model::score::Score;
use crate::model::test_record::{RecordId, RecordValidationError, TestRecord};
use crate::session::SessionManager;

/// Shared projection for all record reads so every query round-trips the
/// same columns in the same order.
const RECORD_SELECT_SQL: &str = "SELECT
    id,
    first_name,
    last_name,
    test_date,
    score
FROM test_records";

pub type StoreResult<T> = Result<T, StoreError>;

/// Errors surfaced by record store operations.
#[derive(Debug)]
pub enum StoreError {
    /// Caller-supplied record or arguments were rejected before touching
    /// the store.
    Validation(RecordValidationError),
    /// The underlying store failed: connection fault, statement failure,
    /// or a store constraint was violated.
    Persistence(DbError),
    /// A persisted row no longer satisfies the record invariants.
    InvalidData(String),
    /// The connection is not provisioned: a required table is absent.
    MissingRequiredTable(&'static str),
    /// The connection is not provisioned: a required column is absent.
    MissingRequiredColumn {
        table: &'static str,
        column: &'static str,
    },
}

impl std::fmt::Display for StoreError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            StoreError::Validation(err) => write!(f, "record validation failed: {err}"),
            StoreError::Persistence(err) => write!(f, "persistence failure: {err}"),
            StoreError::InvalidData(msg) => write!(f, "invalid persisted data: {msg}"),
            StoreError::MissingRequiredTable(table) => {
                write!(f, "required table `{table}` is missing")
            }
            StoreError::MissingRequiredColumn { table, column } => {
                write!(f, "required column `{table}.{column}` is missing")
            }
        }
    }
}

impl std::error::Error for StoreError {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        match self {
            StoreError::Validation(err) => Some(err),
            StoreError::Persistence(err) => Some(err),
            _ => None,
        }
    }
}

impl From<RecordValidationError> for StoreError {
    fn from(err: RecordValidationError) -> Self {
        StoreError::Validation(err)
    }
}

impl From<DbError> for StoreError {
    fn from(err: DbError) -> Self {
        StoreError::Persistence(err)
    }
}

impl From<rusqlite::Error> for StoreError {
    fn from(err: rusqlite::Error) -> Self {
        StoreError::Persistence(DbError::Sqlite(err))
    }
}

/// Store operations over test records.
///
/// All string matching is exact and case-sensitive (`BINARY` collation):
/// `"doe"` does not match `"Doe"`. All record queries return rows ordered
/// by `test_date ASC, id ASC`.
pub trait TestRecordRepository {
    /// Persists a new record and returns its store-assigned id.
    ///
    /// # Contract
    /// - `record.id` must be `None`; the store assigns identity.
    /// - The input record is not mutated. Callers wanting the persisted
    ///   form attach the returned id themselves.
    ///
    /// # Errors
    /// - `StoreError::Validation` when the record fails validation or
    ///   already carries an id.
    /// - `StoreError::Persistence` on statement failure or constraint
    ///   violation (the store rejects negative scores).
    fn create_record(&self, record: &TestRecord) -> StoreResult<RecordId>;

    /// All records whose last name equals `last_name` exactly.
    ///
    /// No match is an empty vector, not an error.
    fn find_by_last_name(&self, last_name: &str) -> StoreResult<Vec<TestRecord>>;

    /// All records whose test date is on or after `date` (inclusive).
    fn find_by_date_on_or_after(&self, date: NaiveDate) -> StoreResult<Vec<TestRecord>>;

    /// All records whose score lies in `[min, max]`, both ends inclusive.
    ///
    /// An empty range (`min > max`) matches nothing and is not an error.
    fn find_by_score_range(&self, min: Score, max: Score) -> StoreResult<Vec<TestRecord>>;

    /// Sets `new_score` on every record matching `last_name` and
    /// `test_date` exactly, atomically.
    ///
    /// # Contract
    /// - Returns the number of records updated; `0` when nothing matched.
    /// - Either every matched record receives the new score or none does.
    ///
    /// # Errors
    /// - `StoreError::Persistence` when any single update fails (for
    ///   example the store rejects a negative score); the whole batch is
    ///   rolled back and no record is changed.
    fn update_score_by_last_name_and_date(
        &self,
        last_name: &str,
        test_date: NaiveDate,
        new_score: Score,
    ) -> StoreResult<usize>;

    /// Deletes every record matching `last_name` exactly, atomically.
    ///
    /// Returns the number of records deleted; `0` when nothing matched.
    fn delete_by_last_name(&self, last_name: &str) -> StoreResult<usize>;
}

/// SQLite-backed record store.
///
/// Holds a reference to the session manager and checks out a session per
/// operation, so one store value serves any number of sequential calls.
pub struct SqliteTestRecordRepository<'s> {
    sessions: &'s SessionManager,
}

impl<'s> SqliteTestRecordRepository<'s> {
    /// Builds a store over `sessions` after verifying the connection is
    /// provisioned for record storage.
    ///
    /// # Errors
    /// - `StoreError::MissingRequiredTable` / `MissingRequiredColumn`
    ///   when the schema has not been provisioned on this connection.
    pub fn try_new(sessions: &'s SessionManager) -> StoreResult<Self> {
        sessions.with_session("store_ready", |session| {
            ensure_store_ready(session.connection())
        })?;
        Ok(Self { sessions })
    }
}

impl TestRecordRepository for SqliteTestRecordRepository<'_> {
    fn create_record(&self, record: &TestRecord) -> StoreResult<RecordId> {
        record.validate()?;
        if record.id.is_some() {
            return Err(StoreError::Validation(
                RecordValidationError::IdAlreadyAssigned,
            ));
        }

        self.sessions.with_session("create_record", |session| {
            let tx = session.begin_transaction()?;
            tx.execute(
                "INSERT INTO test_records (first_name, last_name, test_date, score)
                 VALUES (?1, ?2, ?3, ?4);",
                params![
                    record.first_name,
                    record.last_name,
                    record.test_date,
                    record.score.hundredths()
                ],
            )?;
            let id = tx.last_insert_rowid();
            tx.commit()?;
            Ok(id)
        })
    }

    fn find_by_last_name(&self, last_name: &str) -> StoreResult<Vec<TestRecord>> {
        self.sessions.with_session("find_by_last_name", |session| {
            select_records(
                session.connection(),
                &format!("{RECORD_SELECT_SQL} WHERE last_name = ?1 ORDER BY test_date ASC, id ASC;"),
                [last_name],
            )
        })
    }

    fn find_by_date_on_or_after(&self, date: NaiveDate) -> StoreResult<Vec<TestRecord>> {
        self.sessions
            .with_session("find_by_date_on_or_after", |session| {
                select_records(
                    session.connection(),
                    &format!(
                        "{RECORD_SELECT_SQL} WHERE test_date >= ?1 ORDER BY test_date ASC, id ASC;"
                    ),
                    params![date],
                )
            })
    }

    fn find_by_score_range(&self, min: Score, max: Score) -> StoreResult<Vec<TestRecord>> {
        self.sessions.with_session("find_by_score_range", |session| {
            select_records(
                session.connection(),
                &format!(
                    "{RECORD_SELECT_SQL} WHERE score >= ?1 AND score <= ?2 ORDER BY test_date ASC, id ASC;"
                ),
                params![min.hundredths(), max.hundredths()],
            )
        })
    }

    fn update_score_by_last_name_and_date(
        &self,
        last_name: &str,
        test_date: NaiveDate,
        new_score: Score,
    ) -> StoreResult<usize> {
        self.sessions
            .with_session("update_score_by_last_name_and_date", |session| {
                let tx = session.begin_transaction()?;
                let matched = matching_record_ids(&tx, last_name, Some(test_date))?;
                if matched.is_empty() {
                    tx.rollback()?;
                    return Ok(0);
                }
                for &id in &matched {
                    let changed = tx.execute(
                        "UPDATE test_records SET score = ?2 WHERE id = ?1;",
                        params![id, new_score.hundredths()],
                    )?;
                    if changed != 1 {
                        return Err(StoreError::InvalidData(format!(
                            "matched record {id} vanished mid-update in test_records"
                        )));
                    }
                }
                tx.commit()?;
                Ok(matched.len())
            })
    }

    fn delete_by_last_name(&self, last_name: &str) -> StoreResult<usize> {
        self.sessions
            .with_session("delete_by_last_name", |session| {
                let tx = session.begin_transaction()?;
                let matched = matching_record_ids(&tx, last_name, None)?;
                if matched.is_empty() {
                    tx.rollback()?;
                    return Ok(0);
                }
                for &id in &matched {
                    let changed = tx.execute(
                        "DELETE FROM test_records WHERE id = ?1;",
                        params![id],
                    )?;
                    if changed != 1 {
                        return Err(StoreError::InvalidData(format!(
                            "matched record {id} vanished mid-delete in test_records"
                        )));
                    }
                }
                tx.commit()?;
                Ok(matched.len())
            })
    }
}

fn select_records<P: rusqlite::Params>(
    conn: &Connection,
    sql: &str,
    params: P,
) -> StoreResult<Vec<TestRecord>> {
    let mut stmt = conn.prepare(sql)?;
    let mut rows = stmt.query(params)?;
    let mut records = Vec::new();
    while let Some(row) = rows.next()? {
        records.push(parse_record_row(row)?);
    }
    Ok(records)
}

/// Ids of the records a mutation will touch, scanned under the mutation's
/// own transaction. `test_date: None` matches on last name alone.
fn matching_record_ids(
    conn: &Connection,
    last_name: &str,
    test_date: Option<NaiveDate>,
) -> StoreResult<Vec<RecordId>> {
    let mut stmt;
    let mut rows = match test_date {
        Some(date) => {
            stmt = conn.prepare(
                "SELECT id FROM test_records
                 WHERE last_name = ?1 AND test_date = ?2 ORDER BY id ASC;",
            )?;
            stmt.query(params![last_name, date])?
        }
        None => {
            stmt = conn.prepare(
                "SELECT id FROM test_records WHERE last_name = ?1 ORDER BY id ASC;",
            )?;
            stmt.query([last_name])?
        }
    };
    let mut ids = Vec::new();
    while let Some(row) = rows.next()? {
        ids.push(row.get(0)?);
    }
    Ok(ids)
}

/// Maps one row of [`RECORD_SELECT_SQL`] to a record, rejecting persisted
/// state that no longer satisfies the record invariants.
fn parse_record_row(row: &Row<'_>) -> StoreResult<TestRecord> {
    let id: RecordId = row.get("id")?;

    let date_text: String = row.get("test_date")?;
    let test_date = NaiveDate::parse_from_str(&date_text, "%Y-%m-%d").map_err(|_| {
        StoreError::InvalidData(format!(
            "invalid date `{date_text}` in test_records.test_date"
        ))
    })?;

    let score_hundredths: i64 = row.get("score")?;
    if score_hundredths < 0 {
        return Err(StoreError::InvalidData(format!(
            "negative score `{score_hundredths}` in test_records.score"
        )));
    }

    let record = TestRecord {
        id: Some(id),
        first_name: row.get("first_name")?,
        last_name: row.get("last_name")?,
        test_date,
        score: Score::from_hundredths(score_hundredths),
    };
    record.validate().map_err(|err| {
        StoreError::InvalidData(format!("record {id} in test_records: {err}"))
    })?;
    Ok(record)
}

/// Verifies the table and columns this store depends on exist before any
/// operation runs against the connection.
fn ensure_store_ready(conn: &Connection) -> StoreResult<()> {
    if !table_exists(conn, "test_records")? {
        return Err(StoreError::MissingRequiredTable("test_records"));
    }

    for column in ["id", "first_name", "last_name", "test_date", "score"] {
        if !table_has_column(conn, "test_records", column)? {
            return Err(StoreError::MissingRequiredColumn {
                table: "test_records",
                column,
            });
        }
    }

    Ok(())
}

fn table_exists(conn: &Connection, table: &str) -> StoreResult<bool> {
    let exists: i64 = conn.query_row(
        "SELECT EXISTS(
            SELECT 1
            FROM sqlite_master
            WHERE type = 'table' AND name = ?1
        );",
        [table],
        |row| row.get(0),
    )?;
    Ok(exists == 1)
}

fn table_has_column(conn: &Connection, table: &str, column: &str) -> StoreResult<bool> {
    let mut stmt = conn.prepare(&format!("PRAGMA table_info({table});"))?;
    let mut rows = stmt.query([])?;
    while let Some(row) = rows.next()? {
        let current: String = row.get(1)?;
        if current == column {
            return Ok(true);
        }
    }
    Ok(false)
}
