// src/play/mod.rs
// =============================================================================
// Everything about talking to the app store.
//
// Submodules:
// - api: HTTP implementation of StoreClient against a store API service
// - catalog: the fixed category x collection list used for seeding
//
// The crawl passes only ever see the StoreClient trait, so tests can swap in
// a scripted client and the HTTP details stay in one file.
//
// Rust concepts:
// - async-trait: async methods on a trait that is used as `dyn StoreClient`
// - #[serde(flatten)]: unmodelled JSON fields land in `extra` and are
//   written back out unchanged
// =============================================================================

mod api;         // src/play/api.rs - reqwest client
pub mod catalog; // src/play/catalog.rs - categories x collections
#[cfg(test)]
pub mod mock;    // src/play/mock.rs - scripted client for tests

pub use api::PlayApiClient;

use crate::error::ClientError;
use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};

/// An app as it appears in list and similar-apps results.
///
/// Only the id is typed. Everything else the store returns is kept in
/// `extra` so it can be written back out unchanged.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct AppSummary {
    pub app_id: String,
    #[serde(flatten)]
    pub extra: Map<String, Value>,
}

#[cfg(test)]
impl AppSummary {
    pub fn new(app_id: impl Into<String>) -> Self {
        Self {
            app_id: app_id.into(),
            extra: Map::new(),
        }
    }
}

/// Full app details; the install fields are the ones the backfill stores.
///
/// The store leaves install fields out for some apps. They decode as `None`
/// and are stored as NULL rather than failing the app on every run.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct AppDetails {
    /// Install bucket label, e.g. "500,000+"
    #[serde(default)]
    pub installs: Option<String>,
    #[serde(default)]
    pub min_installs: Option<i64>,
    #[serde(default)]
    pub max_installs: Option<i64>,
    #[serde(default)]
    pub free: Option<bool>,
    #[serde(flatten)]
    pub extra: Map<String, Value>,
}

/// The three store calls the crawl needs.
#[async_trait]
pub trait StoreClient: Send + Sync {
    /// Top apps of one collection within one category.
    async fn list(
        &self,
        category: &str,
        collection: &str,
        limit: usize,
    ) -> Result<Vec<AppSummary>, ClientError>;

    /// Apps the store lists as similar to `app_id`.
    async fn similar(&self, app_id: &str) -> Result<Vec<AppSummary>, ClientError>;

    async fn details(&self, app_id: &str) -> Result<AppDetails, ClientError>;
}
