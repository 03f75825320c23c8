// src/store/mod.rs
// =============================================================================
// Persistent crawl state, one SQLite file per run date.
//
// Submodules:
// - schema: table definitions and pragmas
// - frontier: the append-only memo of every discovered app id
// - info: install metadata gathered by the backfill pass
//
// There is no run identifier. A run binds to the file named after the current
// date, so reruns on the same day share (and resume) state and a new day
// starts an empty graph.
//
// Rust concepts:
// - Lifetimes: FrontierStore<'a> and InfoStore<'a> borrow the connection,
//   so neither can outlive the Store that owns it
// - ToSql / FromSql: QueryState converts to and from the signed column
// =============================================================================

mod frontier;   // src/store/frontier.rs - pids_table operations
mod info;       // src/store/info.rs - info_table operations
pub mod schema; // src/store/schema.rs - DDL and pragmas

pub use frontier::{Discovery, FrontierEntry, FrontierStore};
pub use info::{InfoEntry, InfoStore};

use crate::error::StoreResult;
use chrono::{Datelike, NaiveDate};
use rusqlite::types::{FromSql, FromSqlResult, ToSql, ToSqlOutput, ValueRef};
use rusqlite::Connection;
use std::path::{Path, PathBuf};
use tracing::debug;

/// Traversal state of one frontier entry.
///
/// Stored as a single integer for compatibility, but handled as an explicit
/// three-way state in code. The only legal moves are out of `Unqueried`.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum QueryState {
    /// Discovered, neighbours not fetched yet
    Unqueried,
    /// Neighbours fetched and recorded
    Queried,
    /// Neighbour lookup failed; never retried
    Failed(i64),
}

impl QueryState {
    pub fn to_flag(self) -> i64 {
        match self {
            QueryState::Unqueried => 0,
            QueryState::Queried => 1,
            QueryState::Failed(code) => code,
        }
    }

    pub fn from_flag(flag: i64) -> Self {
        match flag {
            0 => QueryState::Unqueried,
            code if code < 0 => QueryState::Failed(code),
            _ => QueryState::Queried,
        }
    }
}

impl ToSql for QueryState {
    fn to_sql(&self) -> rusqlite::Result<ToSqlOutput<'_>> {
        Ok(ToSqlOutput::from(self.to_flag()))
    }
}

impl FromSql for QueryState {
    fn column_result(value: ValueRef<'_>) -> FromSqlResult<Self> {
        i64::column_result(value).map(QueryState::from_flag)
    }
}

/// Handle on one crawl database.
pub struct Store {
    conn: Connection,
    path: Option<PathBuf>,
}

impl Store {
    /// Opens (or creates) the store at `path` and makes sure both tables exist.
    pub fn open(path: &Path) -> StoreResult<Self> {
        let conn = Connection::open(path)?;
        schema::create(&conn)?;
        debug!(path = %path.display(), "Opened crawl store");
        Ok(Self {
            conn,
            path: Some(path.to_path_buf()),
        })
    }

    /// A throwaway store, used by tests.
    #[cfg(test)]
    pub fn in_memory() -> StoreResult<Self> {
        let conn = Connection::open_in_memory()?;
        schema::create(&conn)?;
        Ok(Self { conn, path: None })
    }

    pub fn path(&self) -> Option<&Path> {
        self.path.as_deref()
    }

    pub fn frontier(&self) -> FrontierStore<'_> {
        FrontierStore::new(&self.conn)
    }

    pub fn info(&self) -> InfoStore<'_> {
        InfoStore::new(&self.conn)
    }
}

/// `d-m-yyyy`, no zero padding, e.g. `7-3-2025`.
pub fn date_stamp(date: NaiveDate) -> String {
    format!("{}-{}-{}", date.day(), date.month(), date.year())
}

/// The store file a run on `date` binds to.
pub fn dated_store_path(dir: &Path, date: NaiveDate) -> PathBuf {
    dir.join(format!("{}.db", date_stamp(date)))
}
