// src/store/info.rs
// =============================================================================
// Install metadata for frontier apps, written once per id by the backfill
// pass. An id without a row here is exactly what the next backfill run picks
// up, so failures need no bookkeeping of their own.
// =============================================================================

use crate::error::{StoreError, StoreResult};
use crate::play::AppDetails;
use rusqlite::{params, params_from_iter, Connection};
#[cfg(test)]
use rusqlite::{OptionalExtension, Row};

/// One row of the info table.
#[derive(Debug, Clone, PartialEq)]
pub struct InfoEntry {
    pub id: String,
    /// Human-readable install bucket, e.g. "1,000,000+"
    pub installs_label: Option<String>,
    pub min_installs: Option<i64>,
    pub max_installs: Option<i64>,
    pub is_free: Option<bool>,
    pub raw_json: String,
}

impl InfoEntry {
    pub fn from_details(id: &str, details: &AppDetails) -> StoreResult<Self> {
        let raw_json = serde_json::to_string(details).map_err(|source| StoreError::Encode {
            id: id.to_string(),
            source,
        })?;
        Ok(Self {
            id: id.to_string(),
            installs_label: details.installs.clone(),
            min_installs: details.min_installs,
            max_installs: details.max_installs,
            is_free: details.free,
            raw_json,
        })
    }

    #[cfg(test)]
    fn from_row(row: &Row<'_>) -> rusqlite::Result<Self> {
        Ok(Self {
            id: row.get("package")?,
            installs_label: row.get("installs")?,
            min_installs: row.get("minInstalls")?,
            max_installs: row.get("maxInstalls")?,
            is_free: row.get("free")?,
            raw_json: row.get("json")?,
        })
    }
}

pub struct InfoStore<'a> {
    conn: &'a Connection,
}

impl<'a> InfoStore<'a> {
    pub(super) fn new(conn: &'a Connection) -> Self {
        Self { conn }
    }

    /// Plain insert: a second row for the same id is a constraint error.
    pub fn insert(&self, entry: &InfoEntry) -> StoreResult<()> {
        self.conn.execute(
            "INSERT INTO info_table (package, installs, minInstalls, maxInstalls, free, json)
             VALUES (?1, ?2, ?3, ?4, ?5, ?6)",
            params![
                entry.id,
                entry.installs_label,
                entry.min_installs,
                entry.max_installs,
                entry.is_free,
                entry.raw_json
            ],
        )?;
        Ok(())
    }

    #[cfg(test)]
    pub fn get(&self, id: &str) -> StoreResult<Option<InfoEntry>> {
        let entry = self
            .conn
            .query_row(
                "SELECT package, installs, minInstalls, maxInstalls, free, json
                 FROM info_table WHERE package = ?1",
                params![id],
                InfoEntry::from_row,
            )
            .optional()?;
        Ok(entry)
    }

    /// Frontier ids that have no info row yet.
    pub fn missing_ids(&self) -> StoreResult<Vec<String>> {
        self.ids(
            "SELECT package FROM pids_table
             WHERE package NOT IN (SELECT package FROM info_table)
             ORDER BY depth, package",
            None,
        )
    }

    /// Free apps whose lower install bound is at least `threshold`.
    pub fn free_at_least(&self, threshold: i64) -> StoreResult<Vec<String>> {
        self.ids(
            "SELECT package FROM info_table
             WHERE minInstalls >= ?1 AND free = 1
             ORDER BY package",
            Some(threshold),
        )
    }

    /// Free apps whose upper install bound is below `threshold`.
    pub fn free_below(&self, threshold: i64) -> StoreResult<Vec<String>> {
        self.ids(
            "SELECT package FROM info_table
             WHERE maxInstalls < ?1 AND free = 1
             ORDER BY package",
            Some(threshold),
        )
    }

    fn ids(&self, sql: &str, threshold: Option<i64>) -> StoreResult<Vec<String>> {
        let mut stmt = self.conn.prepare(sql)?;
        let rows = stmt.query_map(params_from_iter(threshold.iter()), |row| row.get(0))?;
        Ok(rows.collect::<Result<Vec<String>, _>>()?)
    }
}
