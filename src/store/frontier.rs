// src/store/frontier.rs
// =============================================================================
// The frontier: every app id the crawl has ever seen, with the BFS depth it
// was first seen at and whether its neighbours have been fetched.
//
// Rules this file enforces:
// - one row per id, guaranteed by the PRIMARY KEY, not by a read-then-write
// - depth is written once, at discovery, and never updated by the crawl
// - state only moves out of Unqueried (to Queried or Failed), never back
//
// Seeding is the one exception: it replaces depth-0 rows wholesale, which
// puts a re-seeded app back to Unqueried on purpose.
// =============================================================================

use super::QueryState;
use crate::error::{StoreError, StoreResult};
use crate::play::AppSummary;
use rusqlite::{params, Connection, OptionalExtension, Row};

/// One row of the frontier table.
#[derive(Debug, Clone, PartialEq)]
pub struct FrontierEntry {
    pub id: String,
    pub depth: u32,
    pub state: QueryState,
    /// The app summary as it looked when first discovered
    pub raw_json: Option<String>,
    /// Never filled in by the crawl; kept for the column
    pub downloads: Option<i64>,
}

impl FrontierEntry {
    /// A fresh entry with no captured metadata.
    pub fn unqueried(id: impl Into<String>, depth: u32) -> Self {
        Self {
            id: id.into(),
            depth,
            state: QueryState::Unqueried,
            raw_json: None,
            downloads: None,
        }
    }

    /// A newly discovered neighbour at `depth`, carrying its summary as JSON.
    pub fn discovered(app: &AppSummary, depth: u32) -> StoreResult<Self> {
        let raw = encode(app)?;
        Ok(Self {
            raw_json: Some(raw),
            ..Self::unqueried(app.app_id.clone(), depth)
        })
    }

    fn from_row(row: &Row<'_>) -> rusqlite::Result<Self> {
        Ok(Self {
            id: row.get("package")?,
            downloads: row.get("downloads")?,
            raw_json: row.get("json")?,
            depth: row.get("depth")?,
            state: row.get("similar_queried")?,
        })
    }
}

/// Outcome of `insert_if_absent`. A duplicate is a normal outcome, not an error.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Discovery {
    New,
    Duplicate,
}

/// Per-depth totals, used for progress logging and `stats`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct DepthCounts {
    pub depth: u32,
    pub total: u64,
    pub unqueried: u64,
    pub queried: u64,
    pub failed: u64,
}

/// Frontier operations over a borrowed connection.
pub struct FrontierStore<'a> {
    conn: &'a Connection,
}

const SELECT_COLUMNS: &str = "SELECT package, downloads, json, depth, similar_queried FROM pids_table";

impl<'a> FrontierStore<'a> {
    pub(super) fn new(conn: &'a Connection) -> Self {
        Self { conn }
    }

    /// Inserts `entry` unless its id is already present at any depth.
    ///
    /// The uniqueness check is the table's primary key: a conflicting insert
    /// is swallowed by `ON CONFLICT DO NOTHING` and reported as `Duplicate`,
    /// so the first writer's depth always wins.
    pub fn insert_if_absent(&self, entry: &FrontierEntry) -> StoreResult<Discovery> {
        let inserted = self.conn.execute(
            "INSERT INTO pids_table (package, downloads, json, depth, similar_queried)
             VALUES (?1, ?2, ?3, ?4, ?5)
             ON CONFLICT(package) DO NOTHING",
            params![
                entry.id,
                entry.downloads,
                entry.raw_json,
                entry.depth,
                entry.state
            ],
        )?;

        Ok(if inserted == 0 {
            Discovery::Duplicate
        } else {
            Discovery::New
        })
    }

    pub fn exists(&self, id: &str) -> StoreResult<bool> {
        let found = self
            .conn
            .query_row(
                "SELECT 1 FROM pids_table WHERE package = ?1",
                params![id],
                |_| Ok(()),
            )
            .optional()?;
        Ok(found.is_some())
    }

    pub fn get(&self, id: &str) -> StoreResult<Option<FrontierEntry>> {
        let entry = self
            .conn
            .query_row(
                &format!("{} WHERE package = ?1", SELECT_COLUMNS),
                params![id],
                FrontierEntry::from_row,
            )
            .optional()?;
        Ok(entry)
    }

    /// All entries at `depth` currently in `state`. Order is unspecified.
    pub fn entries_at_depth(&self, depth: u32, state: QueryState) -> StoreResult<Vec<FrontierEntry>> {
        let mut stmt = self.conn.prepare_cached(&format!(
            "{} WHERE depth = ?1 AND similar_queried = ?2",
            SELECT_COLUMNS
        ))?;
        let rows = stmt.query_map(params![depth, state], FrontierEntry::from_row)?;
        Ok(rows.collect::<Result<Vec<_>, _>>()?)
    }

    pub fn mark_queried(&self, id: &str) -> StoreResult<()> {
        self.leave_unqueried(id, QueryState::Queried)
    }

    /// Records a failed expansion. `code` must be negative.
    pub fn mark_failed(&self, id: &str, code: i64) -> StoreResult<()> {
        if code >= 0 {
            return Err(StoreError::InvalidFailureCode(code));
        }
        self.leave_unqueried(id, QueryState::Failed(code))
    }

    fn leave_unqueried(&self, id: &str, next: QueryState) -> StoreResult<()> {
        let changed = self.conn.execute(
            "UPDATE pids_table SET similar_queried = ?1 WHERE package = ?2 AND similar_queried = 0",
            params![next, id],
        )?;
        if changed > 0 {
            return Ok(());
        }

        match self.get(id)? {
            None => Err(StoreError::UnknownEntry(id.to_string())),
            Some(entry) => Err(StoreError::IllegalTransition {
                id: id.to_string(),
                current: entry.state,
            }),
        }
    }

    /// Replaces each app's row with a fresh depth-0, Unqueried one.
    ///
    /// `INSERT OR REPLACE` drops the old row first, so the state column falls
    /// back to its default. Rows not named in `apps` are left alone.
    pub fn upsert_seeds(&self, apps: &[AppSummary]) -> StoreResult<usize> {
        let tx = self.conn.unchecked_transaction()?;
        {
            let mut stmt = tx.prepare_cached(
                "INSERT OR REPLACE INTO pids_table (package, downloads, json, depth)
                 VALUES (?1, NULL, ?2, 0)",
            )?;
            for app in apps {
                stmt.execute(params![app.app_id, encode(app)?])?;
            }
        }
        tx.commit()?;
        Ok(apps.len())
    }

    pub fn depth_counts(&self) -> StoreResult<Vec<DepthCounts>> {
        let mut stmt = self.conn.prepare(
            "SELECT depth,
                    COUNT(*),
                    SUM(similar_queried = 0),
                    SUM(similar_queried > 0),
                    SUM(similar_queried < 0)
             FROM pids_table
             GROUP BY depth
             ORDER BY depth",
        )?;
        let rows = stmt.query_map([], |row| {
            Ok(DepthCounts {
                depth: row.get(0)?,
                total: count(row, 1)?,
                unqueried: count(row, 2)?,
                queried: count(row, 3)?,
                failed: count(row, 4)?,
            })
        })?;
        Ok(rows.collect::<Result<Vec<_>, _>>()?)
    }
}

fn count(row: &Row<'_>, idx: usize) -> rusqlite::Result<u64> {
    let value: Option<i64> = row.get(idx)?;
    Ok(value.unwrap_or(0).max(0) as u64)
}

fn encode(app: &AppSummary) -> StoreResult<String> {
    serde_json::to_string(app).map_err(|source| StoreError::Encode {
        id: app.app_id.clone(),
        source,
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::store::Store;

    fn summary(id: &str) -> AppSummary {
        AppSummary::new(id)
    }

    #[test]
    fn test_insert_if_absent_keeps_one_row() {
        let store = Store::in_memory().unwrap();
        let frontier = store.frontier();

        let first = frontier.insert_if_absent(&FrontierEntry::unqueried("a", 1)).unwrap();
        let second = frontier.insert_if_absent(&FrontierEntry::unqueried("a", 1)).unwrap();
        let third = frontier.insert_if_absent(&FrontierEntry::unqueried("a", 4)).unwrap();

        assert_eq!(first, Discovery::New);
        assert_eq!(second, Discovery::Duplicate);
        assert_eq!(third, Discovery::Duplicate);

        let rows: i64 = store
            .conn
            .query_row("SELECT COUNT(*) FROM pids_table WHERE package = 'a'", [], |r| r.get(0))
            .unwrap();
        assert_eq!(rows, 1);
    }

    #[test]
    fn test_first_depth_wins() {
        let store = Store::in_memory().unwrap();
        let frontier = store.frontier();

        frontier.insert_if_absent(&FrontierEntry::unqueried("c", 2)).unwrap();
        frontier.insert_if_absent(&FrontierEntry::unqueried("c", 1)).unwrap();

        assert_eq!(frontier.get("c").unwrap().unwrap().depth, 2);
    }

    #[test]
    fn test_exists() {
        let store = Store::in_memory().unwrap();
        let frontier = store.frontier();

        assert!(!frontier.exists("a").unwrap());
        frontier.insert_if_absent(&FrontierEntry::unqueried("a", 0)).unwrap();
        assert!(frontier.exists("a").unwrap());
    }

    #[test]
    fn test_discovered_entry_keeps_raw_metadata() {
        let store = Store::in_memory().unwrap();
        let frontier = store.frontier();

        let app: AppSummary =
            serde_json::from_str(r#"{"appId":"com.x","title":"X","score":4.5}"#).unwrap();
        let entry = FrontierEntry::discovered(&app, 3).unwrap();
        frontier.insert_if_absent(&entry).unwrap();

        let stored = frontier.get("com.x").unwrap().unwrap();
        assert_eq!(stored.depth, 3);
        assert_eq!(stored.state, QueryState::Unqueried);
        assert_eq!(stored.downloads, None);
        let back: AppSummary = serde_json::from_str(stored.raw_json.as_deref().unwrap()).unwrap();
        assert_eq!(back, app);
    }

    #[test]
    fn test_entries_at_depth_filters_depth_and_state() {
        let store = Store::in_memory().unwrap();
        let frontier = store.frontier();

        for (id, depth) in [("a", 0), ("b", 0), ("c", 1), ("d", 0)] {
            frontier.insert_if_absent(&FrontierEntry::unqueried(id, depth)).unwrap();
        }
        frontier.mark_queried("a").unwrap();
        frontier.mark_failed("d", -2).unwrap();

        let mut pending: Vec<String> = frontier
            .entries_at_depth(0, QueryState::Unqueried)
            .unwrap()
            .into_iter()
            .map(|e| e.id)
            .collect();
        pending.sort();
        assert_eq!(pending, vec!["b"]);

        let failed = frontier.entries_at_depth(0, QueryState::Failed(-2)).unwrap();
        assert_eq!(failed.len(), 1);
        assert_eq!(failed[0].id, "d");
    }

    #[test]
    fn test_state_never_leaves_terminal() {
        let store = Store::in_memory().unwrap();
        let frontier = store.frontier();
        frontier.insert_if_absent(&FrontierEntry::unqueried("a", 0)).unwrap();
        frontier.insert_if_absent(&FrontierEntry::unqueried("b", 0)).unwrap();

        frontier.mark_failed("a", -2).unwrap();
        frontier.mark_queried("b").unwrap();

        assert!(matches!(
            frontier.mark_queried("a"),
            Err(StoreError::IllegalTransition { current: QueryState::Failed(-2), .. })
        ));
        assert!(matches!(
            frontier.mark_failed("b", -2),
            Err(StoreError::IllegalTransition { current: QueryState::Queried, .. })
        ));
        assert_eq!(frontier.get("a").unwrap().unwrap().state, QueryState::Failed(-2));
        assert_eq!(frontier.get("b").unwrap().unwrap().state, QueryState::Queried);
    }

    #[test]
    fn test_mark_rejects_bad_input() {
        let store = Store::in_memory().unwrap();
        let frontier = store.frontier();
        frontier.insert_if_absent(&FrontierEntry::unqueried("a", 0)).unwrap();

        assert!(matches!(
            frontier.mark_failed("a", 0),
            Err(StoreError::InvalidFailureCode(0))
        ));
        assert!(matches!(
            frontier.mark_queried("ghost"),
            Err(StoreError::UnknownEntry(_))
        ));
        assert_eq!(frontier.get("a").unwrap().unwrap().state, QueryState::Unqueried);
    }

    #[test]
    fn test_upsert_seeds_resets_state() {
        let store = Store::in_memory().unwrap();
        let frontier = store.frontier();

        frontier.upsert_seeds(&[summary("a"), summary("b")]).unwrap();
        frontier.insert_if_absent(&FrontierEntry::unqueried("deep", 2)).unwrap();
        frontier.mark_queried("a").unwrap();
        frontier.mark_failed("b", -2).unwrap();
        frontier.mark_queried("deep").unwrap();

        let written = frontier.upsert_seeds(&[summary("a"), summary("b")]).unwrap();
        assert_eq!(written, 2);

        for id in ["a", "b"] {
            let entry = frontier.get(id).unwrap().unwrap();
            assert_eq!(entry.depth, 0);
            assert_eq!(entry.state, QueryState::Unqueried);
        }
        let deep = frontier.get("deep").unwrap().unwrap();
        assert_eq!(deep.depth, 2);
        assert_eq!(deep.state, QueryState::Queried);
    }

    #[test]
    fn test_depth_counts() {
        let store = Store::in_memory().unwrap();
        let frontier = store.frontier();
        for (id, depth) in [("a", 0), ("b", 0), ("c", 0), ("d", 1)] {
            frontier.insert_if_absent(&FrontierEntry::unqueried(id, depth)).unwrap();
        }
        frontier.mark_queried("a").unwrap();
        frontier.mark_failed("b", -2).unwrap();

        let counts = frontier.depth_counts().unwrap();
        assert_eq!(
            counts,
            vec![
                DepthCounts { depth: 0, total: 3, unqueried: 1, queried: 1, failed: 1 },
                DepthCounts { depth: 1, total: 1, unqueried: 1, queried: 0, failed: 0 },
            ]
        );
    }
}
