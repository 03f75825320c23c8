// src/main.rs
// =============================================================================
// Entry point of the app-frontier CLI.
//
// What happens here:
// 1. Parse command-line arguments using clap
// 2. Set up logging (stdout + date-stamped log file)
// 3. Open the store file this run binds to
// 4. Dispatch to the pass the subcommand names
// 5. Exit with a code: 0 = done, 1 = done but some apps/charts failed,
//    2 = the pass stopped on an error
//
// Rust concepts used:
// - async/await: every pass keeps several store requests in flight
// - anyhow::Result with .context(): errors carry what we were doing
// - Destructuring: `let Cli { global, command } = cli` splits the args
//   so each half can be borrowed or moved on its own
// =============================================================================

// Module declarations - one per source file or directory
mod cli;       // src/cli.rs - command-line parsing
mod crawl;     // src/crawl/ - seed, BFS and backfill passes
mod error;     // src/error.rs - StoreError / ClientError
mod logging;   // src/logging.rs - stdout + dated log file
mod play;      // src/play/ - talking to the app store
mod report;    // src/report.rs - id list output
mod store;     // src/store/ - the SQLite frontier

use anyhow::{Context, Result};
use chrono::{Local, NaiveDate};
use clap::Parser; // Parser trait enables Cli::parse()
use cli::{Cli, Commands, GlobalArgs};
use crawl::{BackfillOptions, CrawlOptions, SeedOptions};
use play::{catalog, PlayApiClient};
use std::time::Duration;
use store::Store;
use tracing::{error, info};

#[tokio::main]
async fn main() {
    let cli = Cli::parse();
    let today = Local::now().date_naive();

    // Logging has to come up before anything worth logging happens
    let _guard = match logging::init(&cli.global.log_dir, today, cli.global.verbose) {
        Ok(guard) => guard,
        Err(e) => {
            eprintln!("Error: {:#}", e);
            std::process::exit(2);
        }
    };

    let exit_code = match run(cli, today).await {
        Ok(code) => code,
        Err(e) => {
            error!("{:#}", e);
            2
        }
    };

    // Flush the file log before exiting; process::exit skips destructors
    drop(_guard);
    std::process::exit(exit_code);
}

async fn run(cli: Cli, today: NaiveDate) -> Result<i32> {
    let Cli { global, command } = cli;

    let path = global.store_path(today);
    if let Some(parent) = path.parent().filter(|p| !p.as_os_str().is_empty()) {
        std::fs::create_dir_all(parent)
            .with_context(|| format!("Failed to create {}", parent.display()))?;
    }
    let store = Store::open(&path)
        .with_context(|| format!("Failed to open store {}", path.display()))?;
    if let Some(file) = store.path() {
        info!(store = %file.display(), "Using store");
    }

    match command {
        Commands::Seed { limit, batch_size, delay_ms } => {
            let client = api_client(&global)?;
            let options = SeedOptions {
                limit,
                batch_size,
                delay: Duration::from_millis(delay_ms),
            };
            let summary =
                crawl::seed_frontier(&client, &store, &catalog::seed_pairs(), &options).await?;
            Ok(exit_code(summary.failed_pairs))
        }
        Commands::Crawl { max_depth, rate_limit, delay_ms } => {
            let client = api_client(&global)?;
            let options = CrawlOptions {
                max_depth,
                rate_limit,
                delay: Duration::from_millis(delay_ms),
            };
            let summary = crawl::crawl_similar(&client, &store, &options).await?;
            Ok(exit_code(summary.failed()))
        }
        Commands::Info { rate_limit, tick_ms } => {
            let client = api_client(&global)?;
            let options = BackfillOptions {
                rate_limit,
                tick: Duration::from_millis(tick_ms),
            };
            let summary = crawl::backfill_info(&client, &store, &options).await?;
            Ok(exit_code(summary.failed))
        }
        Commands::Report { min_installs, below, output } => {
            let info_store = store.info();
            let ids = match below {
                Some(threshold) => info_store.free_below(threshold)?,
                None => info_store.free_at_least(min_installs)?,
            };
            let output = output.unwrap_or_else(|| cli::default_report_path(&global.data_dir, today));
            report::write_id_list(&ids, &output)?;
            info!(apps = ids.len(), output = %output.display(), "Report written");
            Ok(0)
        }
        Commands::Stats => {
            let counts = store.frontier().depth_counts()?;
            if counts.is_empty() {
                info!("Frontier is empty");
            }
            for c in &counts {
                info!(
                    depth = c.depth,
                    total = c.total,
                    unqueried = c.unqueried,
                    queried = c.queried,
                    failed = c.failed,
                    "Depth"
                );
            }
            Ok(0)
        }
    }
}

fn api_client(global: &GlobalArgs) -> Result<PlayApiClient> {
    PlayApiClient::new(&global.api_url, &global.lang, &global.country, global.timeout())
        .with_context(|| format!("Invalid store API URL '{}'", global.api_url))
}

// Some per-app failures are expected on any real crawl; they only change the
// exit code, never abort the pass
fn exit_code(failures: usize) -> i32 {
    if failures > 0 {
        1
    } else {
        0
    }
}
