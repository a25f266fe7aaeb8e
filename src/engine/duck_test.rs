use std::path::{Path, PathBuf};

use duckdb::Connection;
use serde_json::{Value, json};

use super::duck::{cell_to_json, scan_parquet};
use crate::logging::init_for_tests;

/// Writes a Parquet fixture by running COPY over an arbitrary SELECT.
fn write_parquet(dir: &Path, name: &str, select_sql: &str) -> PathBuf {
    let path = dir.join(name);
    let conn = Connection::open_in_memory().unwrap();
    conn.execute_batch(&format!(
        "COPY ({select_sql}) TO '{}' (FORMAT PARQUET);",
        path.display()
    ))
    .unwrap();
    path
}

#[test]
fn scan_returns_columns_in_schema_order_and_rows_in_file_order() {
    init_for_tests();
    let dir = tempfile::tempdir().unwrap();
    let path = write_parquet(
        dir.path(),
        "t.parquet",
        "SELECT * FROM (VALUES (1, 'a', true), (2, 'b', false)) t(c1, c2, c3) ORDER BY c1",
    );

    let result = scan_parquet(&path).unwrap();

    assert_eq!(result.columns, vec!["c1", "c2", "c3"]);
    assert_eq!(result.rows.len(), 2);
    assert_eq!(result.rows[0], vec![json!(1), json!("a"), json!(true)]);
    assert_eq!(result.rows[1], vec![json!(2), json!("b"), json!(false)]);
}

#[test]
fn scan_of_empty_file_still_reports_schema() {
    init_for_tests();
    let dir = tempfile::tempdir().unwrap();
    let path = write_parquet(
        dir.path(),
        "empty.parquet",
        "SELECT 1 AS x, 'y' AS y WHERE 1 = 0",
    );

    let result = scan_parquet(&path).unwrap();

    assert_eq!(result.columns, vec!["x", "y"]);
    assert!(result.rows.is_empty());
}

#[test]
fn scan_preserves_nulls() {
    init_for_tests();
    let dir = tempfile::tempdir().unwrap();
    let path = write_parquet(
        dir.path(),
        "nulls.parquet",
        "SELECT * FROM (VALUES (1, NULL), (NULL, 'b')) t(a, b) ORDER BY a NULLS LAST",
    );

    let result = scan_parquet(&path).unwrap();

    assert_eq!(result.rows[0][1], Value::Null);
    assert_eq!(result.rows[1][0], Value::Null);
    assert_eq!(result.rows[1][1], json!("b"));
}

#[test]
fn scan_renders_temporal_values_as_sql_text() {
    init_for_tests();
    let dir = tempfile::tempdir().unwrap();
    let path = write_parquet(
        dir.path(),
        "temporal.parquet",
        "SELECT DATE '2024-01-02' AS d, TIMESTAMP '2024-01-02 03:04:05' AS ts",
    );

    let result = scan_parquet(&path).unwrap();

    assert_eq!(result.rows[0][0], json!("2024-01-02"));
    assert_eq!(result.rows[0][1], json!("2024-01-02 03:04:05"));
}

#[test]
fn scan_renders_decimals_exactly() {
    init_for_tests();
    let dir = tempfile::tempdir().unwrap();
    let path = write_parquet(
        dir.path(),
        "dec.parquet",
        "SELECT CAST('1234567890123456789.123456789' AS DECIMAL(28, 9)) AS wide, \
         CAST('1.50' AS DECIMAL(4, 2)) AS narrow",
    );

    let result = scan_parquet(&path).unwrap();

    // wider than an f64 mantissa, must not round
    assert_eq!(result.rows[0][0], json!("1234567890123456789.123456789"));
    assert_eq!(result.rows[0][1], json!("1.50"));
}

#[test]
fn scan_of_missing_file_is_an_engine_error() {
    init_for_tests();
    let dir = tempfile::tempdir().unwrap();
    let err = scan_parquet(&dir.path().join("nope.parquet")).unwrap_err();
    assert!(err.to_string().contains("query engine error"));
}

#[test]
fn scan_of_non_parquet_bytes_is_an_engine_error() {
    init_for_tests();
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("fake.parquet");
    std::fs::write(&path, b"this is not a parquet file").unwrap();

    assert!(scan_parquet(&path).is_err());
}

#[test]
fn scan_survives_quotes_in_the_path() {
    init_for_tests();
    let dir = tempfile::tempdir().unwrap();
    let staged = write_parquet(dir.path(), "q.parquet", "SELECT 42 AS answer");
    let sub = dir.path().join("it's data");
    std::fs::create_dir(&sub).unwrap();
    let path = sub.join("q.parquet");
    std::fs::rename(&staged, &path).unwrap();

    let result = scan_parquet(&path).unwrap();
    assert_eq!(result.rows, vec![vec![json!(42)]]);
}

#[test]
fn cell_mapping_covers_scalars() {
    use duckdb::types::Value as DuckValue;

    assert_eq!(cell_to_json(DuckValue::Null), Value::Null);
    assert_eq!(cell_to_json(DuckValue::Boolean(true)), json!(true));
    assert_eq!(cell_to_json(DuckValue::BigInt(-7)), json!(-7));
    assert_eq!(cell_to_json(DuckValue::Double(1.5)), json!(1.5));
    assert_eq!(
        cell_to_json(DuckValue::Text("hi".to_string())),
        json!("hi")
    );
    // 128-bit values that do not fit i64 degrade to strings
    assert_eq!(
        cell_to_json(DuckValue::HugeInt(i128::from(i64::MAX) + 1)),
        json!("9223372036854775808")
    );
    // blobs are base64
    assert_eq!(
        cell_to_json(DuckValue::Blob(vec![1, 2, 3])),
        json!("AQID")
    );
}
