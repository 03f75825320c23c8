// src/play/mock.rs
// A scripted StoreClient for the crawl pass tests. Anything not scripted
// answers with ClientError::NoResult, and every call is recorded.
// Similar-apps lookups can be given a latency; their start times and the
// peak number running at once are tracked for pacing tests.

use super::{AppDetails, AppSummary, StoreClient};
use crate::error::ClientError;
use async_trait::async_trait;
use serde_json::Map;
use std::collections::HashMap;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Mutex;
use std::time::Duration;
use tokio::time::Instant;

#[derive(Default)]
pub struct MockClient {
    lists: HashMap<(String, String), Vec<String>>,
    similar: HashMap<String, Vec<String>>,
    details: HashMap<String, AppDetails>,
    calls: Mutex<Vec<String>>,
    latency: Duration,
    similar_started: Mutex<Vec<(String, Instant)>>,
    in_flight: AtomicUsize,
    peak_in_flight: AtomicUsize,
}

impl MockClient {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_list(mut self, category: &str, collection: &str, ids: &[&str]) -> Self {
        self.lists.insert(
            (category.to_string(), collection.to_string()),
            ids.iter().map(|id| id.to_string()).collect(),
        );
        self
    }

    pub fn with_similar(mut self, id: &str, neighbours: &[&str]) -> Self {
        self.similar.insert(
            id.to_string(),
            neighbours.iter().map(|n| n.to_string()).collect(),
        );
        self
    }

    pub fn with_details(mut self, id: &str, min_installs: i64, free: bool) -> Self {
        self.details.insert(
            id.to_string(),
            AppDetails {
                installs: Some(format!("{}+", min_installs)),
                min_installs: Some(min_installs),
                max_installs: Some(min_installs * 5 - 1),
                free: Some(free),
                extra: Map::new(),
            },
        );
        self
    }

    /// Every similar-apps lookup takes this long.
    pub fn with_latency(mut self, latency: Duration) -> Self {
        self.latency = latency;
        self
    }

    /// When the similar-apps lookup for `id` was started.
    pub fn similar_started_at(&self, id: &str) -> Option<Instant> {
        self.similar_started
            .lock()
            .unwrap()
            .iter()
            .find(|(called, _)| called == id)
            .map(|(_, at)| *at)
    }

    /// Most similar-apps lookups running at the same time.
    pub fn peak_in_flight(&self) -> usize {
        self.peak_in_flight.load(Ordering::SeqCst)
    }

    /// Calls made so far, as "list:CAT/COLL", "similar:ID" or "details:ID".
    pub fn calls(&self) -> Vec<String> {
        self.calls.lock().unwrap().clone()
    }

    pub fn calls_with_prefix(&self, prefix: &str) -> Vec<String> {
        let mut calls: Vec<String> = self
            .calls()
            .into_iter()
            .filter_map(|c| c.strip_prefix(prefix).map(str::to_string))
            .collect();
        calls.sort();
        calls
    }

    fn record(&self, call: String) {
        self.calls.lock().unwrap().push(call);
    }
}

fn summaries(ids: &[String]) -> Vec<AppSummary> {
    ids.iter().map(AppSummary::new).collect()
}

#[async_trait]
impl StoreClient for MockClient {
    async fn list(
        &self,
        category: &str,
        collection: &str,
        _limit: usize,
    ) -> Result<Vec<AppSummary>, ClientError> {
        self.record(format!("list:{}/{}", category, collection));
        self.lists
            .get(&(category.to_string(), collection.to_string()))
            .map(|ids| summaries(ids))
            .ok_or_else(|| ClientError::NoResult(format!("{}/{}", category, collection)))
    }

    async fn similar(&self, app_id: &str) -> Result<Vec<AppSummary>, ClientError> {
        self.record(format!("similar:{}", app_id));
        self.similar_started
            .lock()
            .unwrap()
            .push((app_id.to_string(), Instant::now()));
        let running = self.in_flight.fetch_add(1, Ordering::SeqCst) + 1;
        self.peak_in_flight.fetch_max(running, Ordering::SeqCst);

        if self.latency.is_zero() {
            tokio::task::yield_now().await;
        } else {
            tokio::time::sleep(self.latency).await;
        }
        self.in_flight.fetch_sub(1, Ordering::SeqCst);
        self.similar
            .get(app_id)
            .map(|ids| summaries(ids))
            .ok_or_else(|| ClientError::NoResult(app_id.to_string()))
    }

    async fn details(&self, app_id: &str) -> Result<AppDetails, ClientError> {
        self.record(format!("details:{}", app_id));
        self.details
            .get(app_id)
            .cloned()
            .ok_or_else(|| ClientError::NoResult(app_id.to_string()))
    }
}
