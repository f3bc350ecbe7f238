use crate::{errors::ChatError, providers::db::SqlBackend, types::ResultSet};
use async_trait::async_trait;
use serde_json::Value;
use std::fmt::{self, Debug};
use tracing::debug;
use turso::{Connection, Database, Value as TursoValue};

/// An in-process SQLite data source using Turso.
///
/// This backend holds a `Database` instance, which manages its own
/// connections. When cloned, it shares the same underlying database, so a
/// staged dataset and the session asking about it always see the same data.
#[derive(Clone)]
pub struct SqliteBackend {
    db: Database,
}

impl SqliteBackend {
    /// Creates a new `SqliteBackend` from a file path or in-memory.
    ///
    /// Use ":memory:" for a unique, isolated in-memory database. To share an
    /// in-memory database across handles (e.g., in tests), create one
    /// backend and `.clone()` it.
    pub async fn new(db_path: &str) -> Result<Self, ChatError> {
        let db = turso::Builder::new_local(db_path)
            .build()
            .await
            .map_err(|e| ChatError::Connection(e.to_string()))?;

        // WAL only matters for file-backed databases but is safe everywhere.
        let conn = db
            .connect()
            .map_err(|e| ChatError::Connection(e.to_string()))?;
        // Use `query` for PRAGMA statements that return a value to avoid
        // "unexpected row" errors.
        conn.query("PRAGMA journal_mode=WAL;", ())
            .await
            .map_err(|e| ChatError::Connection(e.to_string()))?;

        Ok(Self { db })
    }

    /// Executes multiple semicolon-separated statements, e.g. to seed a
    /// database with tables and rows.
    pub async fn execute_batch(&self, init_sql: &str) -> Result<(), ChatError> {
        let conn = self.connection()?;
        for statement in init_sql.split(';').filter(|s| !s.trim().is_empty()) {
            conn.execute(statement, ())
                .await
                .map_err(|e| ChatError::QueryExecution(e.to_string()))?;
        }
        Ok(())
    }

    pub(crate) fn connection(&self) -> Result<Connection, ChatError> {
        self.db
            .connect()
            .map_err(|e| ChatError::Connection(e.to_string()))
    }
}

impl Debug for SqliteBackend {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("SqliteBackend").finish_non_exhaustive()
    }
}

/// Converts a Turso value to a serde_json::Value.
fn turso_value_to_json(v: TursoValue) -> Value {
    match v {
        TursoValue::Null => Value::Null,
        TursoValue::Integer(i) => Value::Number(i.into()),
        TursoValue::Real(f) => serde_json::Number::from_f64(f)
            .map(Value::Number)
            .unwrap_or(Value::Null),
        TursoValue::Text(s) => Value::String(s),
        TursoValue::Blob(_) => Value::String("<blob>".to_string()),
    }
}

#[async_trait]
impl SqlBackend for SqliteBackend {
    fn dialect(&self) -> &str {
        "SQLite"
    }

    /// Builds the schema snapshot from the stored `CREATE TABLE` statements
    /// in `sqlite_master`.
    async fn table_info(&self) -> Result<String, ChatError> {
        let conn = self
            .db
            .connect()
            .map_err(|e| ChatError::SchemaUnavailable(e.to_string()))?;

        let mut rows = conn
            .query(
                "SELECT sql FROM sqlite_master \
                 WHERE type = 'table' AND name NOT LIKE 'sqlite_%' ORDER BY name",
                (),
            )
            .await
            .map_err(|e| ChatError::SchemaUnavailable(e.to_string()))?;

        let mut statements = Vec::new();
        while let Some(row) = rows
            .next()
            .await
            .map_err(|e| ChatError::SchemaUnavailable(e.to_string()))?
        {
            if let Ok(TursoValue::Text(sql)) = row.get_value(0) {
                statements.push(sql);
            }
        }

        Ok(statements.join("\n\n"))
    }

    async fn list_tables(&self) -> Result<Vec<String>, ChatError> {
        let conn = self
            .db
            .connect()
            .map_err(|e| ChatError::SchemaUnavailable(e.to_string()))?;

        let mut rows = conn
            .query(
                "SELECT name FROM sqlite_master \
                 WHERE type = 'table' AND name NOT LIKE 'sqlite_%' ORDER BY name",
                (),
            )
            .await
            .map_err(|e| ChatError::SchemaUnavailable(e.to_string()))?;

        let mut tables = Vec::new();
        while let Some(row) = rows
            .next()
            .await
            .map_err(|e| ChatError::SchemaUnavailable(e.to_string()))?
        {
            if let Ok(TursoValue::Text(name)) = row.get_value(0) {
                tables.push(name);
            }
        }

        Ok(tables)
    }

    /// Executes a statement on SQLite and collects the rows it returns.
    async fn run(&self, query: &str) -> Result<ResultSet, ChatError> {
        // An empty completion leaves turso with no statement to prepare.
        if query.trim().is_empty() {
            return Err(ChatError::QueryExecution("empty statement".to_string()));
        }

        debug!(query = %query, "--> Executing SQLite query");

        let conn = self
            .db
            .connect()
            .map_err(|e| ChatError::QueryExecution(e.to_string()))?;

        let mut stmt = conn
            .prepare(query)
            .await
            .map_err(|e| ChatError::QueryExecution(e.to_string()))?;

        let columns: Vec<String> = stmt
            .columns()
            .iter()
            .map(|c| c.name().to_string())
            .collect();

        let mut rows = stmt
            .query(())
            .await
            .map_err(|e| ChatError::QueryExecution(e.to_string()))?;

        let mut result_rows = Vec::new();
        while let Some(row) = rows
            .next()
            .await
            .map_err(|e| ChatError::QueryExecution(e.to_string()))?
        {
            let mut values = Vec::with_capacity(columns.len());
            for i in 0..columns.len() {
                let value = row
                    .get_value(i)
                    .map_err(|e| ChatError::QueryExecution(e.to_string()))?;
                values.push(turso_value_to_json(value));
            }
            result_rows.push(values);
        }

        Ok(ResultSet {
            columns,
            rows: result_rows,
        })
    }
}
