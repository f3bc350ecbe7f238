//! # Chat Session
//!
//! This module defines the session object that carries all per-conversation
//! state: the data source currently connected and the transcript built up
//! so far. Sessions are passed explicitly to every pipeline call; nothing
//! about a conversation lives in process-wide state.

use crate::agent::TabularSource;
use crate::errors::ChatError;
use crate::history::ChatHistory;
use crate::ingest;
use crate::providers::db::{
    mysql::{ConnectionParams, MySqlBackend},
    sqlite::SqliteBackend,
    SqlBackend,
};
use tracing::info;

/// The data source a session is currently pointed at.
#[derive(Debug)]
pub enum DataSource {
    /// A live relational database handle.
    Database(Box<dyn SqlBackend>),
    /// An uploaded dataset staged into in-process SQLite.
    Tabular(TabularSource),
}

/// One user's conversational session.
///
/// The session owns its data source exclusively: connecting elsewhere drops
/// the old handle. The transcript, by contrast, survives reconnects, so a
/// user can compare sources inside one conversation.
#[derive(Debug, Default)]
pub struct ChatSession {
    source: Option<DataSource>,
    history: ChatHistory,
}

impl ChatSession {
    /// Creates a session with no data source and an empty transcript.
    pub fn new() -> Self {
        Self::default()
    }

    /// Connects the session to a MySQL database, replacing whatever source
    /// was attached before.
    ///
    /// The old source is dropped before the attempt, so a failed connect
    /// leaves the session with no source rather than half of one.
    pub async fn connect_database(&mut self, params: &ConnectionParams) -> Result<(), ChatError> {
        self.source = None;

        let backend = MySqlBackend::connect(params).await?;
        info!(url = %params.display_url(), "Session connected to database");
        self.source = Some(DataSource::Database(Box::new(backend)));
        Ok(())
    }

    /// Attaches an already-open backend as the session's database source.
    ///
    /// Useful for embedded setups and tests that bring their own storage.
    pub fn attach_backend(&mut self, backend: Box<dyn SqlBackend>) {
        self.source = Some(DataSource::Database(backend));
    }

    /// Stages CSV text into a fresh in-memory table and points the session
    /// at it, replacing whatever source was attached before.
    ///
    /// Returns the number of ingested rows.
    pub async fn attach_csv(&mut self, table_name: &str, csv_text: &str) -> Result<usize, ChatError> {
        self.source = None;

        let table = ingest::sanitize_table_name(table_name)?;
        let backend = SqliteBackend::new(":memory:").await?;
        let rows = ingest::ingest_csv(&backend, &table, csv_text).await?;
        info!(table = %table, rows, "Session attached CSV dataset");

        self.source = Some(DataSource::Tabular(TabularSource {
            backend,
            table_name: table,
        }));
        Ok(rows)
    }

    /// The currently attached source, if any.
    pub fn source(&self) -> Option<&DataSource> {
        self.source.as_ref()
    }

    pub fn is_connected(&self) -> bool {
        self.source.is_some()
    }

    /// The transcript so far.
    pub fn history(&self) -> &ChatHistory {
        &self.history
    }

    /// Records a completed exchange. Only called once a turn has fully
    /// succeeded.
    pub(crate) fn record_exchange(&mut self, question: &str, answer: &str) {
        self.history.record_exchange(question, answer);
    }
}
