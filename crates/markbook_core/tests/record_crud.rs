use chrono::NaiveDate;
use markbook_core::db::open_db_in_memory;
use markbook_core::{
    RecordService, RecordValidationError, Score, SessionManager, SqliteTestRecordRepository,
    StoreError, TestRecord, TestRecordRepository,
};
use rusqlite::Connection;

#[test]
fn create_and_find_roundtrip() {
    let sessions = session_manager();
    let store = SqliteTestRecordRepository::try_new(&sessions).unwrap();

    let jane = record("Jane", "Doe", "88.5", "2026-03-14");
    let id = store.create_record(&jane).unwrap();
    assert!(id > 0);
    assert_eq!(jane.id, None);

    let found = store.find_by_last_name("Doe").unwrap();
    assert_eq!(found.len(), 1);
    assert_eq!(found[0].id, Some(id));
    assert_eq!(found[0].first_name, "Jane");
    assert_eq!(found[0].last_name, "Doe");
    assert_eq!(found[0].test_date, date("2026-03-14"));
    assert_eq!(found[0].score, score("88.5"));
}

#[test]
fn create_assigns_distinct_increasing_ids() {
    let sessions = session_manager();
    let store = SqliteTestRecordRepository::try_new(&sessions).unwrap();

    let first = store
        .create_record(&record("Jane", "Doe", "88.5", "2026-03-14"))
        .unwrap();
    let second = store
        .create_record(&record("Jane", "Doe", "91.25", "2026-04-02"))
        .unwrap();

    assert_ne!(first, second);
    assert!(second > first);
}

#[test]
fn create_rejects_blank_names() {
    let sessions = session_manager();
    let store = SqliteTestRecordRepository::try_new(&sessions).unwrap();

    let blank_first = record("   ", "Doe", "70", "2026-03-14");
    let err = store.create_record(&blank_first).unwrap_err();
    assert!(matches!(
        err,
        StoreError::Validation(RecordValidationError::EmptyFirstName)
    ));

    let blank_last = record("Jane", "", "70", "2026-03-14");
    let err = store.create_record(&blank_last).unwrap_err();
    assert!(matches!(
        err,
        StoreError::Validation(RecordValidationError::EmptyLastName)
    ));

    assert_eq!(count_all(&sessions), 0);
}

#[test]
fn create_rejects_record_with_assigned_id() {
    let sessions = session_manager();
    let store = SqliteTestRecordRepository::try_new(&sessions).unwrap();

    let mut persisted = record("Jane", "Doe", "88.5", "2026-03-14");
    persisted.id = Some(7);

    let err = store.create_record(&persisted).unwrap_err();
    assert!(matches!(
        err,
        StoreError::Validation(RecordValidationError::IdAlreadyAssigned)
    ));
    assert_eq!(count_all(&sessions), 0);
}

#[test]
fn create_rejects_negative_score_at_store() {
    let sessions = session_manager();
    let store = SqliteTestRecordRepository::try_new(&sessions).unwrap();

    let err = store
        .create_record(&record("Jane", "Doe", "-1", "2026-03-14"))
        .unwrap_err();
    assert!(matches!(err, StoreError::Persistence(_)));
    assert_eq!(count_all(&sessions), 0);
}

#[test]
fn find_by_last_name_is_exact_and_case_sensitive() {
    let sessions = session_manager();
    let store = SqliteTestRecordRepository::try_new(&sessions).unwrap();

    store
        .create_record(&record("Jane", "Doe", "88.5", "2026-03-14"))
        .unwrap();
    store
        .create_record(&record("Jack", "doe", "71", "2026-03-14"))
        .unwrap();
    store
        .create_record(&record("Dana", "Doer", "82", "2026-03-14"))
        .unwrap();

    let exact = store.find_by_last_name("Doe").unwrap();
    assert_eq!(exact.len(), 1);
    assert_eq!(exact[0].first_name, "Jane");

    let lowercase = store.find_by_last_name("doe").unwrap();
    assert_eq!(lowercase.len(), 1);
    assert_eq!(lowercase[0].first_name, "Jack");

    assert!(store.find_by_last_name("DOE").unwrap().is_empty());
}

#[test]
fn find_by_date_on_or_after_includes_boundary_date() {
    let sessions = session_manager();
    let store = SqliteTestRecordRepository::try_new(&sessions).unwrap();

    store
        .create_record(&record("Early", "Student", "60", "2026-03-13"))
        .unwrap();
    store
        .create_record(&record("Boundary", "Student", "70", "2026-03-14"))
        .unwrap();
    store
        .create_record(&record("Late", "Student", "80", "2026-03-15"))
        .unwrap();

    let found = store.find_by_date_on_or_after(date("2026-03-14")).unwrap();
    assert_eq!(found.len(), 2);
    assert_eq!(found[0].test_date, date("2026-03-14"));
    assert_eq!(found[1].test_date, date("2026-03-15"));
}

#[test]
fn find_by_score_range_includes_both_bounds() {
    let sessions = session_manager();
    let store = SqliteTestRecordRepository::try_new(&sessions).unwrap();

    for (first_name, score_text) in [
        ("Below", "69.99"),
        ("AtMin", "70"),
        ("Middle", "85"),
        ("AtMax", "90"),
        ("Above", "90.01"),
    ] {
        store
            .create_record(&record(first_name, "Range", score_text, "2026-03-14"))
            .unwrap();
    }

    let found = store
        .find_by_score_range(score("70"), score("90"))
        .unwrap();
    let names: Vec<&str> = found
        .iter()
        .map(|item| item.first_name.as_str())
        .collect();
    assert_eq!(names, ["AtMin", "Middle", "AtMax"]);
}

#[test]
fn find_by_score_range_with_min_above_max_is_empty() {
    let sessions = session_manager();
    let store = SqliteTestRecordRepository::try_new(&sessions).unwrap();

    store
        .create_record(&record("Jane", "Doe", "80", "2026-03-14"))
        .unwrap();

    let found = store
        .find_by_score_range(score("90"), score("70"))
        .unwrap();
    assert!(found.is_empty());
}

#[test]
fn find_results_ordered_by_date_then_id() {
    let sessions = session_manager();
    let store = SqliteTestRecordRepository::try_new(&sessions).unwrap();

    let late = store
        .create_record(&record("Late", "Doe", "80", "2026-03-20"))
        .unwrap();
    let early_first = store
        .create_record(&record("EarlyFirst", "Doe", "81", "2026-03-10"))
        .unwrap();
    let early_second = store
        .create_record(&record("EarlySecond", "Doe", "82", "2026-03-10"))
        .unwrap();

    let found = store.find_by_last_name("Doe").unwrap();
    let ids: Vec<_> = found.iter().map(|item| item.id).collect();
    assert_eq!(
        ids,
        [Some(early_first), Some(early_second), Some(late)]
    );
}

#[test]
fn update_score_updates_every_match_atomically() {
    let sessions = session_manager();
    let store = SqliteTestRecordRepository::try_new(&sessions).unwrap();

    store
        .create_record(&record("Jane", "Doe", "88.5", "2026-03-14"))
        .unwrap();
    store
        .create_record(&record("Jack", "Doe", "79.25", "2026-03-14"))
        .unwrap();
    store
        .create_record(&record("June", "Doe", "91", "2026-04-02"))
        .unwrap();
    store
        .create_record(&record("John", "Smith", "75", "2026-03-14"))
        .unwrap();

    let updated = store
        .update_score_by_last_name_and_date("Doe", date("2026-03-14"), score("92"))
        .unwrap();
    assert_eq!(updated, 2);

    for found in store.find_by_last_name("Doe").unwrap() {
        if found.test_date == date("2026-03-14") {
            assert_eq!(found.score, score("92"));
        } else {
            assert_eq!(found.score, score("91"));
        }
    }
    let smith = store.find_by_last_name("Smith").unwrap();
    assert_eq!(smith[0].score, score("75"));
}

#[test]
fn update_score_returns_zero_without_matches() {
    let sessions = session_manager();
    let store = SqliteTestRecordRepository::try_new(&sessions).unwrap();

    store
        .create_record(&record("Jane", "Doe", "88.5", "2026-03-14"))
        .unwrap();

    let updated = store
        .update_score_by_last_name_and_date("Nobody", date("2026-03-14"), score("92"))
        .unwrap();
    assert_eq!(updated, 0);

    let updated = store
        .update_score_by_last_name_and_date("Doe", date("2026-01-01"), score("92"))
        .unwrap();
    assert_eq!(updated, 0);

    let found = store.find_by_last_name("Doe").unwrap();
    assert_eq!(found[0].score, score("88.5"));
}

#[test]
fn update_to_invalid_score_leaves_every_row_unchanged() {
    let sessions = session_manager();
    let store = SqliteTestRecordRepository::try_new(&sessions).unwrap();

    store
        .create_record(&record("Jane", "Doe", "88.5", "2026-03-14"))
        .unwrap();
    store
        .create_record(&record("Jack", "Doe", "91", "2026-03-14"))
        .unwrap();

    let err = store
        .update_score_by_last_name_and_date("Doe", date("2026-03-14"), score("-5"))
        .unwrap_err();
    assert!(matches!(err, StoreError::Persistence(_)));

    let scores: Vec<Score> = store
        .find_by_last_name("Doe")
        .unwrap()
        .into_iter()
        .map(|item| item.score)
        .collect();
    assert_eq!(scores, [score("88.5"), score("91")]);
}

#[test]
fn delete_removes_only_exact_last_name_matches() {
    let sessions = session_manager();
    let store = SqliteTestRecordRepository::try_new(&sessions).unwrap();

    store
        .create_record(&record("Jane", "Doe", "88.5", "2026-03-14"))
        .unwrap();
    store
        .create_record(&record("June", "Doe", "91", "2026-04-02"))
        .unwrap();
    store
        .create_record(&record("Jack", "doe", "71", "2026-03-14"))
        .unwrap();
    store
        .create_record(&record("John", "Smith", "75", "2026-03-14"))
        .unwrap();

    let deleted = store.delete_by_last_name("Doe").unwrap();
    assert_eq!(deleted, 2);

    assert!(store.find_by_last_name("Doe").unwrap().is_empty());
    assert_eq!(store.find_by_last_name("doe").unwrap().len(), 1);
    assert_eq!(store.find_by_last_name("Smith").unwrap().len(), 1);
    assert_eq!(count_all(&sessions), 2);
}

#[test]
fn delete_returns_zero_without_matches() {
    let sessions = session_manager();
    let store = SqliteTestRecordRepository::try_new(&sessions).unwrap();

    store
        .create_record(&record("Jane", "Doe", "88.5", "2026-03-14"))
        .unwrap();

    let deleted = store.delete_by_last_name("Nobody").unwrap();
    assert_eq!(deleted, 0);
    assert_eq!(count_all(&sessions), 1);
}

#[test]
fn add_query_update_and_cleanup_flow() {
    let sessions = session_manager();
    let store = SqliteTestRecordRepository::try_new(&sessions).unwrap();

    store
        .create_record(&record("Jane", "Doe", "88.5", "2026-03-14"))
        .unwrap();
    store
        .create_record(&record("John", "Smith", "75", "2026-03-14"))
        .unwrap();
    store
        .create_record(&record("Jane", "Doe", "91.25", "2026-04-02"))
        .unwrap();

    let does = store.find_by_last_name("Doe").unwrap();
    assert_eq!(does.len(), 2);

    let recent = store.find_by_date_on_or_after(date("2026-04-01")).unwrap();
    assert_eq!(recent.len(), 1);
    assert_eq!(recent[0].score, score("91.25"));

    let mid_band = store
        .find_by_score_range(score("80"), score("95"))
        .unwrap();
    assert_eq!(mid_band.len(), 2);

    let updated = store
        .update_score_by_last_name_and_date("Doe", date("2026-03-14"), score("92"))
        .unwrap();
    assert_eq!(updated, 1);
    let rescored = store
        .find_by_score_range(score("92"), score("92"))
        .unwrap();
    assert_eq!(rescored.len(), 1);
    assert_eq!(rescored[0].first_name, "Jane");

    let deleted = store.delete_by_last_name("Doe").unwrap();
    assert_eq!(deleted, 2);
    assert!(store.find_by_last_name("Doe").unwrap().is_empty());
    assert_eq!(store.find_by_last_name("Smith").unwrap().len(), 1);
}

#[test]
fn service_wraps_store_calls() {
    let sessions = session_manager();
    let store = SqliteTestRecordRepository::try_new(&sessions).unwrap();
    let service = RecordService::new(store);

    let id = service
        .create_record("Jane", "Doe", score("88.5"), date("2026-03-14"))
        .unwrap();

    let found = service.find_by_last_name("Doe").unwrap();
    assert_eq!(found.len(), 1);
    assert_eq!(found[0].id, Some(id));

    let updated = service
        .update_score_by_last_name_and_date("Doe", date("2026-03-14"), score("90"))
        .unwrap();
    assert_eq!(updated, 1);
    let rescored = service
        .find_by_score_range(score("90"), score("90"))
        .unwrap();
    assert_eq!(rescored.len(), 1);

    let deleted = service.delete_by_last_name("Doe").unwrap();
    assert_eq!(deleted, 1);
    assert!(service
        .find_by_date_on_or_after(date("2026-01-01"))
        .unwrap()
        .is_empty());
}

#[test]
fn store_rejects_unprovisioned_connection() {
    let sessions = SessionManager::new(Connection::open_in_memory().unwrap());

    let result = SqliteTestRecordRepository::try_new(&sessions);
    assert!(matches!(
        result,
        Err(StoreError::MissingRequiredTable("test_records"))
    ));
}

#[test]
fn store_rejects_connection_missing_required_column() {
    let conn = Connection::open_in_memory().unwrap();
    conn.execute_batch(
        "CREATE TABLE test_records (
            id INTEGER PRIMARY KEY AUTOINCREMENT,
            first_name TEXT NOT NULL,
            last_name TEXT NOT NULL,
            test_date TEXT NOT NULL
        );",
    )
    .unwrap();
    let sessions = SessionManager::new(conn);

    let result = SqliteTestRecordRepository::try_new(&sessions);
    assert!(matches!(
        result,
        Err(StoreError::MissingRequiredColumn {
            table: "test_records",
            column: "score"
        })
    ));
}

#[test]
fn read_rejects_corrupted_date_text() {
    let sessions = session_manager();
    let store = SqliteTestRecordRepository::try_new(&sessions).unwrap();

    sessions
        .with_session("corrupt_probe", |session| {
            session.connection().execute(
                "INSERT INTO test_records (first_name, last_name, test_date, score)
                 VALUES ('Jane', 'Doe', 'not-a-date', 8850);",
                [],
            )
        })
        .unwrap();

    let err = store.find_by_last_name("Doe").unwrap_err();
    assert!(matches!(err, StoreError::InvalidData(_)));
}

fn session_manager() -> SessionManager {
    SessionManager::new(open_db_in_memory().unwrap())
}

fn record(first_name: &str, last_name: &str, score_text: &str, date_text: &str) -> TestRecord {
    TestRecord::new(first_name, last_name, score(score_text), date(date_text))
}

fn score(text: &str) -> Score {
    text.parse().unwrap()
}

fn date(text: &str) -> NaiveDate {
    text.parse().unwrap()
}

fn count_all(sessions: &SessionManager) -> i64 {
    sessions
        .with_session("count_probe", |session| {
            session
                .connection()
                .query_row("SELECT COUNT(*) FROM test_records;", [], |row| row.get(0))
        })
        .unwrap()
}
