// src/crawl/limiter.rs
// =============================================================================
// The two throttling strategies the passes use. They look similar but behave
// differently, so each pass picks one explicitly:
//
// BatchWait (seed, crawl)
//   Start N tasks, wait for all N, pause, start the next N.
//   Caps both the request rate and the number of requests in flight.
//
// WindowedDrain (info backfill)
//   Every tick, take up to N queued tasks and start them, without waiting for
//   the previous window. Caps the request rate only; if the store is slow,
//   more than N requests can be outstanding at once.
//
// Each pass builds its own limiter when it starts and drops it when it ends;
// nothing is shared between passes.
//
// Rust concepts:
// - Generic closures: `task` builds a future per item, `on_done` consumes
//   each output and can stop the run with an error via `?`
// - FuturesUnordered + tokio::select!: wait on the next tick and the next
//   finished task at the same time
// =============================================================================

use futures::future::join_all;
use futures::stream::{FuturesUnordered, StreamExt};
use std::collections::VecDeque;
use std::future::Future;
use std::time::Duration;
use tokio::time::{self, Instant, MissedTickBehavior};
use tracing::debug;

/// Fixed-size groups, each fully awaited, with a pause in between.
///
/// The pause is owed by the limiter, not by a single `run`: a pass that calls
/// `run` several times (the crawl does once per depth) still waits `delay`
/// between the last group of one call and the first group of the next.
#[derive(Debug, Clone)]
pub struct BatchWait {
    size: usize,
    delay: Duration,
    // set once any group has gone out
    issued: bool,
}

impl BatchWait {
    pub fn new(size: usize, delay: Duration) -> Self {
        Self {
            size: size.max(1),
            delay,
            issued: false,
        }
    }

    pub fn size(&self) -> usize {
        self.size
    }

    /// Runs `task` over `items` group by group.
    ///
    /// `on_done` sees every output of a group before the pause that precedes
    /// the next group. Its first error stops the run. Returns the number of
    /// groups issued by this call.
    pub async fn run<I, T, E, F, Fut, H>(
        &mut self,
        items: Vec<I>,
        mut task: F,
        mut on_done: H,
    ) -> Result<usize, E>
    where
        F: FnMut(I) -> Fut,
        Fut: Future<Output = T>,
        H: FnMut(T) -> Result<(), E>,
    {
        let total = items.len();
        let mut items = items.into_iter().peekable();
        let mut groups = 0;

        while items.peek().is_some() {
            if self.issued {
                time::sleep(self.delay).await;
            }

            let group: Vec<Fut> = items.by_ref().take(self.size).map(&mut task).collect();
            debug!(group = groups + 1, size = group.len(), total, "Issuing batch");
            self.issued = true;

            for output in join_all(group).await {
                on_done(output)?;
            }
            groups += 1;
        }

        Ok(groups)
    }
}

/// Periodic windows drained from a queue, fired without waiting.
#[derive(Debug, Clone, Copy)]
pub struct WindowedDrain {
    window: usize,
    tick: Duration,
}

impl WindowedDrain {
    pub fn new(window: usize, tick: Duration) -> Self {
        Self {
            window: window.max(1),
            tick,
        }
    }

    /// Queues every item, then on each tick starts up to `window` of them.
    ///
    /// The first window goes out one tick after the call. Outputs reach
    /// `on_done` as tasks finish, in completion order; the run ends once the
    /// queue is empty and nothing is left in flight.
    pub async fn run<I, T, E, F, Fut, H>(
        &self,
        items: Vec<I>,
        mut task: F,
        mut on_done: H,
    ) -> Result<usize, E>
    where
        F: FnMut(I) -> Fut,
        Fut: Future<Output = T>,
        H: FnMut(T) -> Result<(), E>,
    {
        let mut queue: VecDeque<I> = items.into();
        let mut in_flight = FuturesUnordered::new();
        let mut windows = 0;

        let mut ticker = time::interval_at(Instant::now() + self.tick, self.tick);
        ticker.set_missed_tick_behavior(MissedTickBehavior::Delay);

        while !queue.is_empty() || !in_flight.is_empty() {
            tokio::select! {
                _ = ticker.tick(), if !queue.is_empty() => {
                    let take = self.window.min(queue.len());
                    for item in queue.drain(..take) {
                        in_flight.push(task(item));
                    }
                    windows += 1;
                    debug!(
                        window = windows,
                        started = take,
                        queued = queue.len(),
                        in_flight = in_flight.len(),
                        "Drained window"
                    );
                }
                Some(output) = in_flight.next(), if !in_flight.is_empty() => {
                    on_done(output)?;
                }
            }
        }

        Ok(windows)
    }
}
