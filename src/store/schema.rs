// src/store/schema.rs
// =============================================================================
// SQLite schema for the crawl store.
//
// The two tables keep the exact column names and types other tooling reads
// (pids_table / info_table), so files written here stay interchangeable with
// them. The sign of similar_queried carries the traversal state:
//   0 = not yet expanded, 1 = expanded, negative = expansion failed (code)
// =============================================================================

use rusqlite::Connection;

const CREATE_FRONTIER_TABLE: &str = r#"
CREATE TABLE IF NOT EXISTS pids_table (
    package TEXT PRIMARY KEY,
    downloads INTEGER,
    json TEXT,
    depth INTEGER DEFAULT 0,
    similar_queried INTEGER DEFAULT 0
)
"#;

const CREATE_INFO_TABLE: &str = r#"
CREATE TABLE IF NOT EXISTS info_table (
    package TEXT PRIMARY KEY,
    installs TEXT,
    minInstalls INTEGER,
    maxInstalls INTEGER,
    free BOOLEAN,
    json TEXT
)
"#;

// Every BFS step scans one (depth, state) slice of the frontier
const CREATE_INDEXES: &[&str] = &[
    "CREATE INDEX IF NOT EXISTS idx_pids_depth_state ON pids_table(depth, similar_queried)",
];

const PRAGMAS: &str = r#"
PRAGMA synchronous = NORMAL;
PRAGMA busy_timeout = 5000;
"#;

/// Applies pragmas and creates both tables if they are missing.
pub fn create(conn: &Connection) -> rusqlite::Result<()> {
    conn.execute_batch(PRAGMAS)?;

    // WAL is refused by in-memory databases; they keep their default journal
    let _ = conn.execute_batch("PRAGMA journal_mode = WAL;");

    conn.execute_batch(CREATE_FRONTIER_TABLE)?;
    conn.execute_batch(CREATE_INFO_TABLE)?;
    for index in CREATE_INDEXES {
        conn.execute(index, [])?;
    }
    Ok(())
}
