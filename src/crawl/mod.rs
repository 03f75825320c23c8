// src/crawl/mod.rs
// =============================================================================
// The three passes over the crawl store, plus the rate limiters they use.
//
// - seed: depth-0 frontier from the store's top charts
// - bfs: depth-by-depth expansion through similar apps
// - backfill: install metadata for frontier apps
//
// Each pass is a plain async function taking the client, the store and its
// options, and returns a summary of what it did.
//
// Rust concepts:
// - Trait objects: passes take `&dyn StoreClient`, so tests plug in a mock
// - Borrowing: a pass borrows the Store; the limiters only hand results
//   back to the pass, so no Mutex is needed around the SQLite connection
// =============================================================================

mod backfill; // anti-join driven install metadata
mod bfs;      // depth-by-depth similar-apps expansion
mod limiter;  // BatchWait and WindowedDrain
mod seed;     // depth-0 frontier from the top charts

// Re-export the passes main.rs calls
pub use backfill::{backfill_info, BackfillOptions};
pub use bfs::{crawl_similar, CrawlOptions};
pub use seed::{seed_frontier, SeedOptions};
