// src/crawl/bfs.rs
// =============================================================================
// Breadth-first crawl over the store's "similar apps" relation.
//
// How it works:
// 1. For each depth d = 0 .. max_depth-1, load every Unqueried entry at d
// 2. Split them into groups of `rate_limit` and expand each group
//    concurrently, waiting for the whole group and pausing before the next
// 3. For each expanded entry, insert every neighbour at d+1 unless the id is
//    already in the frontier at any depth, then mark the entry Queried
// 4. If the lookup fails, mark the entry Failed instead and insert nothing
// 5. Move on to d+1 only after every group at d is done
//
// The loop never stops early: an empty depth just moves on to the next one,
// and there is no cap on the number of apps. Failed entries are never picked
// up again; they are out of every later Unqueried scan.
//
// Because all state lives in the store, a crawl interrupted mid-depth picks
// up from the remaining Unqueried entries the next time it runs.
// =============================================================================

use super::limiter::BatchWait;
use crate::error::{ClientError, StoreResult};
use crate::play::{AppSummary, StoreClient};
use crate::store::{Discovery, FrontierEntry, FrontierStore, QueryState, Store};
use std::time::Duration;
use tracing::{info, warn};

/// Code recorded for entries whose neighbour lookup failed.
pub const EXPANSION_FAILED: i64 = -2;

// A frontier entry paired with the outcome of its similar-apps lookup
type Lookup = (FrontierEntry, Result<Vec<AppSummary>, ClientError>);

/// Crawl pass settings.
#[derive(Debug, Clone)]
pub struct CrawlOptions {
    /// Depths 0 .. max_depth-1 are expanded
    pub max_depth: u32,
    /// Lookups issued together in one group
    pub rate_limit: usize,
    /// Pause between groups
    pub delay: Duration,
}

impl Default for CrawlOptions {
    fn default() -> Self {
        Self {
            max_depth: 9,
            rate_limit: 25,
            delay: Duration::from_millis(700),
        }
    }
}

/// What happened at one depth.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct DepthReport {
    pub depth: u32,
    pub pending: usize,
    pub expanded: usize,
    pub failed: usize,
    /// Neighbours that were new to the frontier
    pub discovered: usize,
    /// Neighbours already present at some depth
    pub duplicates: usize,
}

#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct CrawlSummary {
    pub depths: Vec<DepthReport>,
}

impl CrawlSummary {
    pub fn expanded(&self) -> usize {
        self.depths.iter().map(|d| d.expanded).sum()
    }

    pub fn failed(&self) -> usize {
        self.depths.iter().map(|d| d.failed).sum()
    }

    pub fn discovered(&self) -> usize {
        self.depths.iter().map(|d| d.discovered).sum()
    }
}

/// Runs the crawl from depth 0 up to (not including) `options.max_depth`.
pub async fn crawl_similar(
    client: &dyn StoreClient,
    store: &Store,
    options: &CrawlOptions,
) -> StoreResult<CrawlSummary> {
    let frontier = store.frontier();
    // one limiter for every depth, so the pause also separates depths
    let mut limiter = BatchWait::new(options.rate_limit, options.delay);
    let mut summary = CrawlSummary::default();

    info!(
        max_depth = options.max_depth,
        rate_limit = limiter.size(),
        "Starting crawl"
    );

    for depth in 0..options.max_depth {
        let pending = frontier.entries_at_depth(depth, QueryState::Unqueried)?;
        let mut report = DepthReport {
            depth,
            pending: pending.len(),
            ..DepthReport::default()
        };
        info!(depth, pending = pending.len(), "Expanding depth");

        limiter
            .run(
                pending,
                move |entry: FrontierEntry| async move {
                    let result = client.similar(&entry.id).await;
                    (entry, result)
                },
                |(entry, result): Lookup| record_expansion(&frontier, &entry, result, &mut report),
            )
            .await?;

        info!(
            depth,
            expanded = report.expanded,
            failed = report.failed,
            discovered = report.discovered,
            duplicates = report.duplicates,
            "Depth finished"
        );
        summary.depths.push(report);
    }

    info!(
        expanded = summary.expanded(),
        failed = summary.failed(),
        discovered = summary.discovered(),
        "Crawl finished"
    );
    Ok(summary)
}

// Applies one lookup result to the frontier.
//
// Neighbours go in before the parent is marked Queried, so a crash between
// the two only costs a repeated lookup on the next run.
fn record_expansion(
    frontier: &FrontierStore<'_>,
    parent: &FrontierEntry,
    result: Result<Vec<AppSummary>, ClientError>,
    report: &mut DepthReport,
) -> StoreResult<()> {
    match result {
        Ok(neighbours) => {
            for neighbour in &neighbours {
                let entry = FrontierEntry::discovered(neighbour, parent.depth + 1)?;
                match frontier.insert_if_absent(&entry)? {
                    Discovery::New => report.discovered += 1,
                    Discovery::Duplicate => report.duplicates += 1,
                }
            }
            frontier.mark_queried(&parent.id)?;
            report.expanded += 1;
        }
        Err(e) => {
            warn!(app = %parent.id, depth = parent.depth, error = %e, "Similar-apps lookup failed");
            frontier.mark_failed(&parent.id, EXPANSION_FAILED)?;
            report.failed += 1;
        }
    }
    Ok(())
}
