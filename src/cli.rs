// src/cli.rs
// =============================================================================
// Command-line interface, defined with clap's derive API.
//
// Global options pick the store file, the store API and the locale. Each
// subcommand runs one pass and carries that pass's pacing knobs; the
// defaults are the values the crawl has always used.
// =============================================================================

use chrono::NaiveDate;
use clap::{Args, Parser, Subcommand};
use std::path::PathBuf;
use std::time::Duration;

use crate::store::{date_stamp, dated_store_path};

#[derive(Parser, Debug)]
#[command(
    name = "app-frontier",
    version,
    about = "Discover app ids by crawling a store's similar-apps graph",
    long_about = "app-frontier seeds a frontier from the store's top charts, expands it \
                  breadth-first through similar apps, and backfills install counts. \
                  All state lives in a SQLite file named after the current date."
)]
pub struct Cli {
    #[command(flatten)]
    pub global: GlobalArgs,

    #[command(subcommand)]
    pub command: Commands,
}

#[derive(Args, Debug)]
pub struct GlobalArgs {
    /// Store file to use instead of the date-stamped one
    #[arg(long, global = true)]
    pub db: Option<PathBuf>,

    /// Directory holding the date-stamped store files
    #[arg(long, global = true, default_value = ".")]
    pub data_dir: PathBuf,

    /// Directory for the date-stamped log files
    #[arg(long, global = true, default_value = ".")]
    pub log_dir: PathBuf,

    /// Base URL of the store API service
    #[arg(long, global = true, env = "PLAY_API_URL", default_value = "http://localhost:3000")]
    pub api_url: String,

    #[arg(long, global = true, default_value = "en")]
    pub lang: String,

    #[arg(long, global = true, default_value = "at")]
    pub country: String,

    /// Per-request timeout in seconds
    #[arg(long, global = true, default_value_t = 30)]
    pub timeout_secs: u64,

    /// Log at debug level (RUST_LOG still wins)
    #[arg(short, long, global = true)]
    pub verbose: bool,
}

impl GlobalArgs {
    /// The store file this run binds to.
    pub fn store_path(&self, today: NaiveDate) -> PathBuf {
        self.db
            .clone()
            .unwrap_or_else(|| dated_store_path(&self.data_dir, today))
    }

    pub fn timeout(&self) -> Duration {
        Duration::from_secs(self.timeout_secs)
    }
}

#[derive(Subcommand, Debug)]
pub enum Commands {
    /// Fill depth 0 from every category/collection top chart
    Seed {
        /// Apps requested per chart
        #[arg(long, default_value_t = 200)]
        limit: usize,

        /// Charts requested together
        #[arg(long, default_value_t = 10)]
        batch_size: usize,

        /// Pause between batches, in milliseconds
        #[arg(long, default_value_t = 1000)]
        delay_ms: u64,
    },

    /// Expand the frontier breadth-first through similar apps
    Crawl {
        /// Depths 0 .. max-depth-1 are expanded
        #[arg(long, default_value_t = 9)]
        max_depth: u32,

        /// Lookups issued together in one group
        #[arg(long, default_value_t = 25)]
        rate_limit: usize,

        /// Pause between groups, in milliseconds
        #[arg(long, default_value_t = 700)]
        delay_ms: u64,
    },

    /// Fetch install counts for frontier apps that don't have them yet
    Info {
        /// Requests started per tick
        #[arg(long, default_value_t = 25)]
        rate_limit: usize,

        #[arg(long, default_value_t = 1000)]
        tick_ms: u64,
    },

    /// Write the ids of free apps within an install range, one per line
    Report {
        /// Keep apps with at least this many installs
        #[arg(long, default_value_t = 0, conflicts_with = "below")]
        min_installs: i64,

        /// Keep apps with fewer than this many installs instead
        #[arg(long)]
        below: Option<i64>,

        /// Output file (default: <d>-<m>-<yyyy>-free.csv in the data dir)
        #[arg(long)]
        output: Option<PathBuf>,
    },

    /// Log how many apps sit at each depth and in which state
    Stats,
}

/// Default report file for a run on `today`.
pub fn default_report_path(data_dir: &std::path::Path, today: NaiveDate) -> PathBuf {
    data_dir.join(format!("{}-free.csv", date_stamp(today)))
}
