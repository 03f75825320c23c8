// src/crawl/backfill.rs
// =============================================================================
// Info backfill: fetch install metadata for every frontier app that has no
// info row yet.
//
// Requests go out through a WindowedDrain (a fixed number per tick, without
// waiting for earlier ticks), which is how this pass has always been paced.
//
// Failures are only logged. Nothing is written for a failed app, so it is
// still missing from the info table and the next backfill run tries it
// again. That is deliberately looser than the crawl, which gives up on an
// app for good after one failed lookup.
// =============================================================================

use super::limiter::WindowedDrain;
use crate::error::{ClientError, StoreResult};
use crate::play::{AppDetails, StoreClient};
use crate::store::{InfoEntry, Store};
use std::time::Duration;
use tracing::{info, warn};

/// Backfill pass settings.
#[derive(Debug, Clone)]
pub struct BackfillOptions {
    /// Requests started per tick
    pub rate_limit: usize,
    pub tick: Duration,
}

impl Default for BackfillOptions {
    fn default() -> Self {
        Self {
            rate_limit: 25,
            tick: Duration::from_secs(1),
        }
    }
}

#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct BackfillSummary {
    pub pending: usize,
    pub stored: usize,
    pub failed: usize,
}

pub async fn backfill_info(
    client: &dyn StoreClient,
    store: &Store,
    options: &BackfillOptions,
) -> StoreResult<BackfillSummary> {
    let info_store = store.info();
    let pending = info_store.missing_ids()?;
    let mut summary = BackfillSummary {
        pending: pending.len(),
        ..BackfillSummary::default()
    };
    info!(pending = summary.pending, "Backfilling install metadata");

    let drain = WindowedDrain::new(options.rate_limit, options.tick);
    drain
        .run(
            pending,
            move |id: String| async move {
                let result = client.details(&id).await;
                (id, result)
            },
            |(id, result): (String, Result<AppDetails, ClientError>)| -> StoreResult<()> {
                match result {
                    Ok(details) => {
                        info_store.insert(&InfoEntry::from_details(&id, &details)?)?;
                        summary.stored += 1;
                    }
                    Err(e) => {
                        warn!(app = %id, error = %e, "Failed to fetch app details, will retry next run");
                        summary.failed += 1;
                    }
                }
                Ok(())
            },
        )
        .await?;

    info!(
        stored = summary.stored,
        failed = summary.failed,
        "Backfill finished"
    );
    Ok(summary)
}
