//! # CSV Ingestion
//!
//! This module stages an uploaded CSV into a SQLite table so the chat
//! pipeline can query it like any other database. Column types are sniffed
//! from the first data row to give the generated queries something better
//! than all-TEXT columns to work with.

use crate::providers::db::sqlite::SqliteBackend;
use chrono::{NaiveDate, NaiveDateTime};
use thiserror::Error;
use tracing::{debug, info, warn};
use turso::{Connection, Value as TursoValue};

/// Custom error types for the CSV ingestion process.
#[derive(Error, Debug)]
pub enum IngestError {
    #[error("Database error: {0}")]
    Database(#[from] turso::Error),
    #[error("Failed to parse CSV: {0}")]
    Parse(#[from] csv::Error),
    #[error("Invalid table name: {0}")]
    InvalidTableName(String),
    #[error("The file has no data to ingest.")]
    NoData,
    #[error("Failed to get database connection: {0}")]
    Connection(String),
}

/// Sanitizes a user-supplied table name to a safe SQL identifier.
///
/// Lowercases, turns spaces into underscores, and strips everything that is
/// not alphanumeric or an underscore. Rejects names that end up empty or
/// start with a digit.
pub fn sanitize_table_name(name: &str) -> Result<String, IngestError> {
    let cleaned: String = name
        .trim()
        .to_lowercase()
        .replace(' ', "_")
        .chars()
        .filter(|c| c.is_ascii_alphanumeric() || *c == '_')
        .collect();

    if cleaned.is_empty() || cleaned.starts_with(|c: char| c.is_ascii_digit()) {
        return Err(IngestError::InvalidTableName(name.to_string()));
    }

    Ok(cleaned)
}

/// Parses CSV text and ingests it into a new table on the given backend.
///
/// The first data row drives type sniffing; every subsequent row is inserted
/// inside one transaction, so a malformed row aborts the whole load. Returns
/// the number of inserted rows.
pub async fn ingest_csv(
    backend: &SqliteBackend,
    table_name: &str,
    csv_text: &str,
) -> Result<usize, IngestError> {
    let conn = backend
        .connection()
        .map_err(|e| IngestError::Connection(e.to_string()))?;

    let mut reader = csv::Reader::from_reader(csv_text.as_bytes());
    let headers = reader.headers()?.clone();
    if headers.is_empty() {
        return Err(IngestError::NoData);
    }

    // Collect all records up front so the first row can be sniffed for types.
    let records: Vec<csv::StringRecord> = reader.records().collect::<Result<_, _>>()?;
    if records.is_empty() {
        return Err(IngestError::NoData);
    }

    // Sanitize headers for column names.
    let columns: Vec<String> = headers
        .iter()
        .map(|h| {
            h.trim()
                .to_lowercase()
                .replace(' ', "_")
                .replace(|c: char| !c.is_alphanumeric() && c != '_', "")
        })
        .collect();

    let sniffed: Vec<SniffedType> = records[0].iter().map(SniffedType::sniff).collect();
    create_table(&conn, table_name, &columns, &sniffed).await?;

    conn.execute("BEGIN TRANSACTION", ()).await?;
    let mut insert_count = 0;

    let column_list = columns
        .iter()
        .map(|c| format!("\"{c}\""))
        .collect::<Vec<_>>()
        .join(", ");
    let placeholders = (0..columns.len())
        .map(|_| "?")
        .collect::<Vec<_>>()
        .join(", ");
    let insert_sql =
        format!("INSERT INTO \"{table_name}\" ({column_list}) VALUES ({placeholders})");
    let mut stmt = conn.prepare(&insert_sql).await?;

    for record in records {
        let params: Vec<TursoValue> = record
            .iter()
            .zip(sniffed.iter())
            .map(|(field, kind)| kind.to_value(field))
            .collect();

        match stmt.execute(params).await {
            Ok(changes) => {
                if changes > 0 {
                    insert_count += 1;
                }
            }
            Err(e) => {
                warn!("Failed to insert row: {e:?}. Rolling back transaction.");
                conn.execute("ROLLBACK", ()).await?;
                return Err(IngestError::Database(e));
            }
        }
    }

    conn.execute("COMMIT", ()).await?;
    info!("Transaction committed. Ingested {insert_count} rows into '{table_name}'.");

    Ok(insert_count)
}

/// A column type inferred from the first data row, plus the parse format
/// needed to normalize date-like values on insert.
#[derive(Debug, Clone, Copy, PartialEq)]
enum SniffedType {
    Integer,
    Real,
    DateTime(&'static str),
    Date(&'static str),
    Text,
}

impl SniffedType {
    const DATETIME_FORMATS: [&'static str; 2] = ["%-m/%-d/%Y %-H:%M:%S", "%Y-%m-%d %H:%M:%S"];
    const DATE_FORMATS: [&'static str; 2] = ["%Y-%m-%d", "%-m/%-d/%Y"];

    fn sniff(field: &str) -> Self {
        if field.parse::<i64>().is_ok() {
            return Self::Integer;
        }
        if field.parse::<f64>().is_ok() {
            return Self::Real;
        }
        for fmt in Self::DATETIME_FORMATS {
            if NaiveDateTime::parse_from_str(field, fmt).is_ok() {
                return Self::DateTime(fmt);
            }
        }
        for fmt in Self::DATE_FORMATS {
            if NaiveDate::parse_from_str(field, fmt).is_ok() {
                return Self::Date(fmt);
            }
        }
        Self::Text
    }

    fn db_type(&self) -> &'static str {
        match self {
            Self::Integer => "INTEGER",
            Self::Real => "REAL",
            Self::DateTime(_) => "DATETIME",
            Self::Date(_) => "DATE",
            Self::Text => "TEXT",
        }
    }

    /// Converts a raw CSV field to the value inserted for this column.
    ///
    /// Sniffing only saw the first row, so later rows that no longer match
    /// fall back to plain text.
    fn to_value(&self, field: &str) -> TursoValue {
        match self {
            Self::Integer => field
                .parse::<i64>()
                .map(TursoValue::Integer)
                .unwrap_or_else(|_| TursoValue::Text(field.to_string())),
            Self::Real => field
                .parse::<f64>()
                .map(TursoValue::Real)
                .unwrap_or_else(|_| TursoValue::Text(field.to_string())),
            Self::DateTime(fmt) => NaiveDateTime::parse_from_str(field, fmt)
                .map(|dt| TursoValue::Text(dt.format("%Y-%m-%d %H:%M:%S").to_string()))
                .unwrap_or_else(|_| TursoValue::Text(field.to_string())),
            Self::Date(fmt) => NaiveDate::parse_from_str(field, fmt)
                .map(|d| TursoValue::Text(d.format("%Y-%m-%d").to_string()))
                .unwrap_or_else(|_| TursoValue::Text(field.to_string())),
            Self::Text => TursoValue::Text(field.to_string()),
        }
    }
}

/// Creates the staging table with the sniffed column types.
async fn create_table(
    conn: &Connection,
    table_name: &str,
    columns: &[String],
    types: &[SniffedType],
) -> Result<(), turso::Error> {
    let columns_def = columns
        .iter()
        .zip(types.iter())
        .map(|(c, t)| format!("\"{c}\" {db_type}", db_type = t.db_type()))
        .collect::<Vec<_>>()
        .join(", ");

    let create_sql = format!("CREATE TABLE IF NOT EXISTS \"{table_name}\" ({columns_def});");
    debug!("Executing CREATE TABLE statement: {create_sql}");
    conn.execute(&create_sql, ()).await?;
    Ok(())
}
