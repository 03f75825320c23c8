// src/crawl/seed.rs
// =============================================================================
// Seed pass: fill depth 0 of the frontier from the store's top charts.
//
// One list request per category/collection pair. Every returned app is
// written with INSERT OR REPLACE, so seeding is a refresh: an app that was
// already expanded (or failed) goes back to Unqueried at depth 0. Apps the
// charts no longer mention keep whatever state they had.
//
// A failed pair is logged and skipped. It is not retried.
// =============================================================================

use super::limiter::BatchWait;
use crate::error::{ClientError, StoreResult};
use crate::play::catalog::SeedPair;
use crate::play::{AppSummary, StoreClient};
use crate::store::Store;
use std::time::Duration;
use tracing::{info, warn};

/// Seed pass settings.
#[derive(Debug, Clone)]
pub struct SeedOptions {
    /// Apps requested per list call
    pub limit: usize,
    /// Pairs requested together
    pub batch_size: usize,
    /// Pause between batches
    pub delay: Duration,
}

impl Default for SeedOptions {
    fn default() -> Self {
        Self {
            limit: 200,
            batch_size: 10,
            delay: Duration::from_millis(1000),
        }
    }
}

#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct SeedSummary {
    pub pairs: usize,
    pub failed_pairs: usize,
    /// Rows written, counting an app once per pair that listed it
    pub upserted: usize,
    /// Apps that were not in the frontier before this pass
    pub new_apps: usize,
}

pub async fn seed_frontier(
    client: &dyn StoreClient,
    store: &Store,
    pairs: &[SeedPair],
    options: &SeedOptions,
) -> StoreResult<SeedSummary> {
    let frontier = store.frontier();
    let mut limiter = BatchWait::new(options.batch_size, options.delay);
    let limit = options.limit;
    let mut summary = SeedSummary {
        pairs: pairs.len(),
        ..SeedSummary::default()
    };

    info!(pairs = pairs.len(), limit, "Seeding frontier");

    limiter
        .run(
            pairs.to_vec(),
            move |pair| async move {
                let result = client.list(pair.category, pair.collection, limit).await;
                (pair, result)
            },
            |(pair, result): (SeedPair, Result<Vec<AppSummary>, ClientError>)| -> StoreResult<()> {
                match result {
                    Ok(apps) => {
                        for app in &apps {
                            if !frontier.exists(&app.app_id)? {
                                summary.new_apps += 1;
                            }
                        }
                        summary.upserted += frontier.upsert_seeds(&apps)?;
                        info!(
                            category = pair.category,
                            collection = pair.collection,
                            apps = apps.len(),
                            "Seeded pair"
                        );
                    }
                    Err(e) => {
                        summary.failed_pairs += 1;
                        warn!(
                            category = pair.category,
                            collection = pair.collection,
                            error = %e,
                            "Failed to list pair, skipping"
                        );
                    }
                }
                Ok(())
            },
        )
        .await?;

    info!(
        pairs = summary.pairs,
        failed = summary.failed_pairs,
        upserted = summary.upserted,
        new_apps = summary.new_apps,
        "Seeding finished"
    );
    Ok(summary)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::play::mock::MockClient;
    use crate::store::{FrontierEntry, QueryState};

    const TOOLS_FREE: SeedPair = SeedPair { category: "TOOLS", collection: "TOP_FREE" };
    const TOOLS_PAID: SeedPair = SeedPair { category: "TOOLS", collection: "TOP_PAID" };
    const GAME_FREE: SeedPair = SeedPair { category: "GAME", collection: "TOP_FREE" };

    fn client() -> MockClient {
        MockClient::new()
            .with_list("TOOLS", "TOP_FREE", &["a", "b"])
            .with_list("GAME", "TOP_FREE", &["b", "c"])
    }

    #[tokio::test(start_paused = true)]
    async fn test_seed_writes_depth_zero_unqueried() {
        let store = Store::in_memory().unwrap();
        let client = client();

        let summary = seed_frontier(&client, &store, &[TOOLS_FREE, GAME_FREE], &SeedOptions::default())
            .await
            .unwrap();

        assert_eq!(summary, SeedSummary { pairs: 2, failed_pairs: 0, upserted: 4, new_apps: 3 });
        let mut ids: Vec<String> = store
            .frontier()
            .entries_at_depth(0, QueryState::Unqueried)
            .unwrap()
            .into_iter()
            .map(|e| e.id)
            .collect();
        ids.sort();
        assert_eq!(ids, vec!["a", "b", "c"]);
    }

    #[tokio::test(start_paused = true)]
    async fn test_failed_pair_is_skipped() {
        let store = Store::in_memory().unwrap();
        let client = client();

        let summary = seed_frontier(
            &client,
            &store,
            &[TOOLS_PAID, TOOLS_FREE],
            &SeedOptions { batch_size: 1, ..SeedOptions::default() },
        )
        .await
        .unwrap();

        assert_eq!(summary.failed_pairs, 1);
        assert!(store.frontier().exists("a").unwrap());
        assert_eq!(client.calls_with_prefix("list:"), vec!["TOOLS/TOP_FREE", "TOOLS/TOP_PAID"]);
    }

    #[tokio::test(start_paused = true)]
    async fn test_reseed_resets_depth_zero_only() {
        let store = Store::in_memory().unwrap();
        let client = client();
        let frontier = store.frontier();

        seed_frontier(&client, &store, &[TOOLS_FREE], &SeedOptions::default())
            .await
            .unwrap();
        frontier.mark_queried("a").unwrap();
        frontier.mark_failed("b", -2).unwrap();
        frontier.insert_if_absent(&FrontierEntry::unqueried("x", 1)).unwrap();
        frontier.mark_queried("x").unwrap();

        let again = seed_frontier(&client, &store, &[TOOLS_FREE], &SeedOptions::default())
            .await
            .unwrap();

        assert_eq!(again.new_apps, 0);
        assert_eq!(frontier.get("a").unwrap().unwrap().state, QueryState::Unqueried);
        assert_eq!(frontier.get("b").unwrap().unwrap().state, QueryState::Unqueried);
        let x = frontier.get("x").unwrap().unwrap();
        assert_eq!((x.depth, x.state), (1, QueryState::Queried));
    }
}
