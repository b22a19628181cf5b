//! Integration tests for RailDB CLI commands.
//!
//! Uses tempfile for testing file-based operations.

// Allow unwrap and panic in tests - these are standard for test code
#![allow(clippy::unwrap_used, clippy::panic)]

use clap::Parser;
use raildb::cli::{Cli, Commands, cmd_fragility, cmd_import, cmd_init, cmd_summary, run};
use raildb_core::{GradeKey, GradeStore};
use std::path::PathBuf;
use tempfile::TempDir;

// =============================================================================
// HELPER FUNCTIONS
// =============================================================================

/// Create a temporary directory for tests.
fn create_temp_dir() -> TempDir {
    tempfile::tempdir().expect("Failed to create temp dir")
}

/// Create a grade payload wrapped in a JavaScript declaration.
fn create_grades_js(dir: &TempDir) -> PathBuf {
    let path = dir.path().join("betongrades.js");
    let content = r#"const betongrades = [
        {"AEM": 6609, "Test": "Test 1", "Grade": 7.5, "Year": 2024},
        {"AEM": 6609, "Test": "Test 2", "Grade": 10, "Year": 2024},
        {"AEM": 7012, "Test": "Test 1", "Grade": 4.25, "Year": 2023}
    ];"#;
    std::fs::write(&path, content).unwrap();
    path
}

// =============================================================================
// INIT COMMAND TESTS
// =============================================================================

#[test]
fn test_init_creates_database() {
    let temp = create_temp_dir();
    let db_path = temp.path().join("test.redb");

    let result = cmd_init(&db_path, false);
    assert!(result.is_ok());
    assert!(db_path.exists());
}

#[test]
fn test_init_fails_if_exists_without_force() {
    let temp = create_temp_dir();
    let db_path = temp.path().join("test.redb");

    cmd_init(&db_path, false).unwrap();

    let result = cmd_init(&db_path, false);
    assert!(result.is_err());
}

#[test]
fn test_init_with_force_empties_database() {
    let temp = create_temp_dir();
    let db_path = temp.path().join("test.redb");
    let grades = create_grades_js(&temp);

    cmd_init(&db_path, false).unwrap();
    cmd_import(&db_path, false, &grades).unwrap();

    cmd_init(&db_path, true).unwrap();
    let store = GradeStore::open(&db_path).unwrap();
    assert_eq!(store.count().unwrap(), 0);
}

// =============================================================================
// IMPORT COMMAND TESTS
// =============================================================================

#[test]
fn test_import_counts_inserts_and_updates() {
    let temp = create_temp_dir();
    let db_path = temp.path().join("test.redb");
    let grades = create_grades_js(&temp);

    let first = cmd_import(&db_path, false, &grades).unwrap();
    assert_eq!(first.inserted, 3);
    assert_eq!(first.updated, 0);
    assert_eq!(first.total, 3);

    let second = cmd_import(&db_path, true, &grades).unwrap();
    assert_eq!(second.inserted, 0);
    assert_eq!(second.updated, 3);

    let store = GradeStore::open(&db_path).unwrap();
    let record = store
        .get(&GradeKey::new(6609, "Test 2", 2024))
        .unwrap()
        .unwrap();
    assert_eq!(record.grade, 10.0);
}

#[test]
fn test_import_invalid_payload() {
    let temp = create_temp_dir();
    let db_path = temp.path().join("test.redb");
    let bad_file = temp.path().join("bad.json");
    std::fs::write(&bad_file, "not valid json").unwrap();

    let result = cmd_import(&db_path, false, &bad_file);
    assert!(result.is_err());
}

#[test]
fn test_import_invalid_record_aborts() {
    let temp = create_temp_dir();
    let db_path = temp.path().join("test.redb");
    let bad_file = temp.path().join("bad.json");
    std::fs::write(
        &bad_file,
        r#"[{"AEM": 1, "Test": "Test 1", "Grade": 5, "Year": 2024},
            {"AEM": 2, "Test": "Test 1", "Grade": 50, "Year": 2024}]"#,
    )
    .unwrap();

    let err = cmd_import(&db_path, false, &bad_file).unwrap_err();
    assert!(err.to_string().starts_with("record 1"));
    assert!(!db_path.exists() || GradeStore::open(&db_path).unwrap().count().unwrap() == 0);
}

#[test]
fn test_import_missing_file() {
    let temp = create_temp_dir();
    let db_path = temp.path().join("test.redb");
    let result = cmd_import(&db_path, false, &temp.path().join("missing.json"));
    assert!(result.is_err());
}

// =============================================================================
// SUMMARY COMMAND TESTS
// =============================================================================

#[test]
fn test_summary_empty_database() {
    let temp = create_temp_dir();
    let db_path = temp.path().join("test.redb");
    cmd_init(&db_path, false).unwrap();

    assert!(cmd_summary(&db_path, false, None).unwrap().is_none());
    assert!(cmd_summary(&db_path, true, None).unwrap().is_none());
}

#[test]
fn test_summary_after_import() {
    let temp = create_temp_dir();
    let db_path = temp.path().join("test.redb");
    let grades = create_grades_js(&temp);
    cmd_import(&db_path, false, &grades).unwrap();

    let report = cmd_summary(&db_path, false, None).unwrap().unwrap();
    assert_eq!(report.summary.total_records, 3);
    assert_eq!(report.perfect_scores.len(), 1);
    assert_eq!(report.perfect_scores[0].test, "Test 2");
    assert_eq!(report.year_breakdown.year, 2024);
    assert_eq!(report.year_breakdown.tests.len(), 2);
    assert!(report.top_students.is_empty());

    let test1 = report.test_stats.iter().find(|t| t.test == "Test 1").unwrap();
    assert_eq!(test1.passing_count, 1);
    assert_eq!(test1.std_dev, 2.3);

    assert!(cmd_summary(&db_path, true, None).unwrap().is_some());
}

#[test]
fn test_summary_year_breakdown() {
    let temp = create_temp_dir();
    let db_path = temp.path().join("test.redb");
    let grades = create_grades_js(&temp);
    cmd_import(&db_path, false, &grades).unwrap();

    let report = cmd_summary(&db_path, false, Some(2023)).unwrap().unwrap();
    assert_eq!(report.year_breakdown.year, 2023);
    assert_eq!(report.year_breakdown.tests.len(), 1);
    assert_eq!(report.year_breakdown.tests[0].passing_count, 0);

    let report = cmd_summary(&db_path, false, Some(1990)).unwrap().unwrap();
    assert!(report.year_breakdown.tests.is_empty());
}

// =============================================================================
// FRAGILITY COMMAND TESTS
// =============================================================================

#[test]
fn test_fragility_valid_parameters() {
    assert!(cmd_fragility(false, 0.1, 0.2, 0.5, "Light").is_ok());
    assert!(cmd_fragility(true, 0.2, 0.2, 0.5, "ds_i").is_ok());
}

#[test]
fn test_fragility_rejects_non_positive() {
    let err = cmd_fragility(false, -0.1, 0.2, 0.5, "ds_i").unwrap_err();
    assert!(err.to_string().contains("pga"));
    assert!(cmd_fragility(false, 0.1, 0.2, 0.0, "ds_i").is_err());
}

// =============================================================================
// DISPATCH TESTS
// =============================================================================

/// Variable source with a malformed `PORT` and the given database path.
fn broken_port_env(db_path: &std::path::Path) -> impl Fn(&str) -> Option<String> + use<> {
    let db_path = db_path.display().to_string();
    move |var| match var {
        "PORT" => Some("http".to_string()),
        "RAILDB_DB_PATH" => Some(db_path.clone()),
        _ => None,
    }
}

#[tokio::test]
async fn test_run_ignores_server_settings_outside_serve() {
    let temp = create_temp_dir();
    let db_path = temp.path().join("env.redb");
    let env = broken_port_env(&db_path);

    let cli = Cli::try_parse_from(["raildb", "init"]).unwrap();
    run(cli, &env).await.unwrap();
    assert!(db_path.exists());

    let cli = Cli::try_parse_from([
        "raildb", "fragility", "--pga", "0.1", "--pga-mean", "0.2", "--beta", "0.5",
    ])
    .unwrap();
    assert!(run(cli, &env).await.is_ok());
}

#[tokio::test]
async fn test_run_serve_rejects_invalid_port() {
    let temp = create_temp_dir();
    let env = broken_port_env(&temp.path().join("env.redb"));

    let cli = Cli::try_parse_from(["raildb", "serve"]).unwrap();
    let err = run(cli, &env).await.unwrap_err();
    assert!(err.to_string().starts_with("PORT"));
}

// =============================================================================
// ARGUMENT PARSING TESTS
// =============================================================================

#[test]
fn test_parse_global_flags() {
    let cli = Cli::try_parse_from(["raildb", "--db", "grades.redb", "--json", "summary"]).unwrap();
    assert_eq!(cli.db, Some(PathBuf::from("grades.redb")));
    assert!(cli.json);
    assert!(matches!(cli.command, Commands::Summary { year: None }));

    let cli = Cli::try_parse_from(["raildb", "summary", "--year", "2023"]).unwrap();
    assert!(matches!(cli.command, Commands::Summary { year: Some(2023) }));
}

#[test]
fn test_parse_fragility_defaults_damage_state() {
    let cli = Cli::try_parse_from([
        "raildb",
        "fragility",
        "--pga",
        "0.1",
        "--pga-mean",
        "0.2",
        "--beta",
        "0.5",
    ])
    .unwrap();

    match cli.command {
        Commands::Fragility { damage_state, .. } => assert_eq!(damage_state, "ds_i"),
        other => panic!("unexpected command: {other:?}"),
    }
}

#[test]
fn test_parse_negative_pga() {
    let cli = Cli::try_parse_from([
        "raildb", "fragility", "--pga", "-0.1", "--pga-mean", "0.2", "--beta", "0.5",
    ])
    .unwrap();
    assert!(matches!(cli.command, Commands::Fragility { pga, .. } if pga < 0.0));
}

#[test]
fn test_parse_serve_overrides() {
    let cli = Cli::try_parse_from([
        "raildb",
        "serve",
        "--host",
        "127.0.0.1",
        "--port",
        "9000",
        "--rate-limit",
        "5",
    ])
    .unwrap();

    match cli.command {
        Commands::Serve {
            host,
            port,
            rate_limit,
        } => {
            assert_eq!(host.as_deref(), Some("127.0.0.1"));
            assert_eq!(port, Some(9000));
            assert_eq!(rate_limit.map(|r| r.get()), Some(5));
        }
        other => panic!("unexpected command: {other:?}"),
    }

    assert!(Cli::try_parse_from(["raildb", "serve", "--rate-limit", "0"]).is_err());
}
