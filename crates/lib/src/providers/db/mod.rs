pub mod mysql;
pub mod sqlite;

use crate::errors::ChatError;
use crate::types::ResultSet;
use async_trait::async_trait;
use std::fmt::Debug;

/// A trait for interacting with a relational data source.
///
/// This trait defines a common interface for reading table definitions and
/// executing queries against different database engines (e.g., MySQL,
/// SQLite). A backend is a live handle: it is owned by exactly one session
/// and dropped when the session connects elsewhere.
#[async_trait]
pub trait SqlBackend: Send + Sync + Debug {
    /// The SQL dialect this source speaks, as named in prompts
    /// (e.g., "MySQL", "SQLite").
    fn dialect(&self) -> &str;

    /// Returns a textual snapshot of the current table definitions.
    ///
    /// The snapshot is recomputed on every call so that schema changes made
    /// between turns are visible to the next prompt. Nothing is cached.
    async fn table_info(&self) -> Result<String, ChatError>;

    /// Returns the user-visible table names.
    async fn list_tables(&self) -> Result<Vec<String>, ChatError>;

    /// Executes a single statement exactly as given and returns its rows.
    ///
    /// The statement is not inspected, rewritten, or limited on the way
    /// through; whatever the generated text does to the database is what
    /// happens. Callers are expected to point this at an account whose own
    /// privileges bound the blast radius.
    async fn run(&self, query: &str) -> Result<ResultSet, ChatError>;
}
