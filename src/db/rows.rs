//! Row normalization for store consumers
//!
//! Rows come back as plain JSON-style records keyed by column name. Columns
//! declared `TIMESTAMP` or `DATETIME` are rendered at second precision
//! (`YYYY-MM-DD HH:MM:SS`) no matter how SQLite stored them. `DATE` columns
//! are left as stored.

use chrono::{DateTime, NaiveDateTime};
use rusqlite::types::ValueRef;
use rusqlite::{Connection, Params};
use serde_json::Value;

/// One fetched row
pub type Record = serde_json::Map<String, Value>;

const DISPLAY_FORMAT: &str = "%Y-%m-%d %H:%M:%S";

/// Run `sql` and collect every row as a [`Record`]
pub fn fetch_all<P: Params>(
    conn: &Connection,
    sql: &str,
    params: P,
) -> Result<Vec<Record>, rusqlite::Error> {
    let mut stmt = conn.prepare(sql)?;

    let columns: Vec<(String, bool)> = stmt
        .columns()
        .iter()
        .map(|col| {
            let timestamp = col.decl_type().map(is_timestamp_type).unwrap_or(false);
            (col.name().to_string(), timestamp)
        })
        .collect();

    let mut rows = stmt.query(params)?;
    let mut records = vec![];

    while let Some(row) = rows.next()? {
        let mut record = Record::new();
        for (idx, (name, timestamp)) in columns.iter().enumerate() {
            let value = match row.get_ref(idx)? {
                ValueRef::Null => Value::Null,
                ValueRef::Integer(i) if *timestamp => from_unix(i),
                ValueRef::Integer(i) => Value::from(i),
                ValueRef::Real(f) => Value::from(f),
                ValueRef::Text(bytes) => {
                    let text = String::from_utf8_lossy(bytes);
                    if *timestamp {
                        Value::String(truncate_timestamp(&text))
                    } else {
                        Value::String(text.into_owned())
                    }
                }
                ValueRef::Blob(bytes) => Value::from(bytes.to_vec()),
            };
            record.insert(name.clone(), value);
        }
        records.push(record);
    }

    Ok(records)
}

fn is_timestamp_type(decl: &str) -> bool {
    let decl = decl.to_ascii_uppercase();
    decl.contains("TIMESTAMP") || decl.contains("DATETIME")
}

/// Second-precision display form of a stored timestamp.
///
/// Unparseable values are cut to their first 19 characters, the length of
/// the display form.
pub fn truncate_timestamp(raw: &str) -> String {
    let raw = raw.trim();

    for format in ["%Y-%m-%d %H:%M:%S%.f", "%Y-%m-%dT%H:%M:%S%.f"] {
        if let Ok(parsed) = NaiveDateTime::parse_from_str(raw, format) {
            return parsed.format(DISPLAY_FORMAT).to_string();
        }
    }
    if let Ok(parsed) = DateTime::parse_from_rfc3339(raw) {
        return parsed.naive_utc().format(DISPLAY_FORMAT).to_string();
    }

    raw.chars().take(19).collect()
}

fn from_unix(secs: i64) -> Value {
    match DateTime::from_timestamp(secs, 0) {
        Some(parsed) => Value::String(parsed.naive_utc().format(DISPLAY_FORMAT).to_string()),
        None => Value::from(secs),
    }
}
