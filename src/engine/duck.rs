use std::path::Path;

use base64::Engine as _;
use base64::engine::general_purpose::STANDARD as BASE64;
use duckdb::Connection;
use duckdb::types::{TimeUnit, Value as DuckValue};
use once_cell::sync::OnceCell;
use serde_json::{Map, Value, json};
use tracing::info;

use crate::engine::errors::EngineError;
use crate::shared::config::CONFIG;

static BOOTSTRAP: OnceCell<()> = OnceCell::new();

/// One-time engine initialization, run before the first request is
/// served. Installs and loads the httpfs extension so the engine can
/// resolve remote paths. Idempotent under the `OnceCell` guard.
pub fn bootstrap() -> Result<(), EngineError> {
    BOOTSTRAP
        .get_or_try_init(|| {
            if !CONFIG.engine.install_httpfs {
                info!("httpfs install disabled by config, skipping");
                return Ok(());
            }
            let conn = Connection::open_in_memory()?;
            conn.execute_batch("INSTALL httpfs; LOAD httpfs;")?;
            info!("httpfs extension installed and loaded");
            Ok(())
        })
        .map(|_| ())
}

/// Ordered column names plus row tuples in engine output order.
#[derive(Debug)]
pub struct ScanResult {
    pub columns: Vec<String>,
    pub rows: Vec<Vec<Value>>,
}

/// Runs `SELECT *` over a Parquet file on a connection private to this
/// call. The connection never outlives the scan, so concurrent requests
/// cannot share engine state.
pub fn scan_parquet(path: &Path) -> Result<ScanResult, EngineError> {
    let path_str = path.to_str().ok_or(EngineError::NonUtf8Path)?;
    let sql = format!(
        "SELECT * FROM read_parquet('{}')",
        path_str.replace('\'', "''")
    );

    let conn = Connection::open_in_memory()?;
    let mut stmt = conn.prepare(&sql)?;

    let mut out_rows: Vec<Vec<Value>> = Vec::new();
    {
        let mut rows = stmt.query([])?;
        while let Some(row) = rows.next()? {
            let stmt_ref: &duckdb::Statement = row.as_ref();
            let column_count = stmt_ref.column_count();
            let mut tuple = Vec::with_capacity(column_count);
            for idx in 0..column_count {
                let cell: DuckValue = row.get(idx)?;
                tuple.push(cell_to_json(cell));
            }
            out_rows.push(tuple);
        }
    }

    // Column metadata is available once the statement has executed,
    // including for zero-row results.
    let columns: Vec<String> = stmt.column_names().into_iter().map(String::from).collect();

    Ok(ScanResult {
        columns,
        rows: out_rows,
    })
}

/// Maps an engine cell to JSON. Temporal values and decimals render as
/// their SQL text form, blobs as base64, 128-bit integers degrade to
/// strings when they overflow i64.
pub(crate) fn cell_to_json(cell: DuckValue) -> Value {
    match cell {
        DuckValue::Null => Value::Null,
        DuckValue::Boolean(b) => Value::from(b),
        DuckValue::TinyInt(v) => Value::from(v),
        DuckValue::SmallInt(v) => Value::from(v),
        DuckValue::Int(v) => Value::from(v),
        DuckValue::BigInt(v) => Value::from(v),
        DuckValue::HugeInt(v) => i64::try_from(v)
            .map(Value::from)
            .unwrap_or_else(|_| Value::from(v.to_string())),
        DuckValue::UTinyInt(v) => Value::from(v),
        DuckValue::USmallInt(v) => Value::from(v),
        DuckValue::UInt(v) => Value::from(v),
        DuckValue::UBigInt(v) => Value::from(v),
        DuckValue::Float(v) => Value::from(f64::from(v)),
        DuckValue::Double(v) => Value::from(v),
        // f64 cannot carry wide decimals without rounding; the string
        // form keeps them exact
        DuckValue::Decimal(d) => Value::from(d.to_string()),
        DuckValue::Text(s) => Value::from(s),
        DuckValue::Enum(s) => Value::from(s),
        DuckValue::Blob(bytes) => Value::from(BASE64.encode(bytes)),
        DuckValue::Timestamp(unit, raw) => timestamp_to_json(&unit, raw),
        DuckValue::Date32(days) => {
            let epoch = chrono::NaiveDate::from_ymd_opt(1970, 1, 1).unwrap();
            Value::from((epoch + chrono::Duration::days(i64::from(days))).to_string())
        }
        DuckValue::Time64(unit, raw) => {
            let micros = to_micros(&unit, raw);
            let secs = (micros / 1_000_000) as u32;
            let nanos = ((micros % 1_000_000) * 1_000) as u32;
            match chrono::NaiveTime::from_num_seconds_from_midnight_opt(secs, nanos) {
                Some(t) => Value::from(t.to_string()),
                None => Value::Null,
            }
        }
        DuckValue::Interval {
            months,
            days,
            nanos,
        } => json!({ "months": months, "days": days, "nanos": nanos }),
        DuckValue::List(items) | DuckValue::Array(items) => {
            Value::from(items.into_iter().map(cell_to_json).collect::<Vec<Value>>())
        }
        DuckValue::Struct(fields) => {
            let mut obj = Map::new();
            for (name, value) in fields.keys().zip(fields.values()) {
                obj.insert(name.clone(), cell_to_json(value.clone()));
            }
            Value::Object(obj)
        }
        DuckValue::Map(entries) => {
            let mut obj = Map::new();
            for (key, value) in entries.keys().zip(entries.values()) {
                let key = match cell_to_json(key.clone()) {
                    Value::String(s) => s,
                    other => other.to_string(),
                };
                obj.insert(key, cell_to_json(value.clone()));
            }
            Value::Object(obj)
        }
        DuckValue::Union(inner) => cell_to_json(*inner),
    }
}

fn timestamp_to_json(unit: &TimeUnit, raw: i64) -> Value {
    let micros = to_micros(unit, raw);
    match chrono::DateTime::from_timestamp_micros(micros) {
        Some(ts) => Value::from(ts.naive_utc().to_string()),
        None => Value::Null,
    }
}

fn to_micros(unit: &TimeUnit, raw: i64) -> i64 {
    match unit {
        TimeUnit::Second => raw.saturating_mul(1_000_000),
        TimeUnit::Millisecond => raw.saturating_mul(1_000),
        TimeUnit::Microsecond => raw,
        TimeUnit::Nanosecond => raw / 1_000,
    }
}
