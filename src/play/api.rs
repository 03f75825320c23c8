// src/play/api.rs
// =============================================================================
// StoreClient over HTTP, talking to a google-play-api style REST service
// that fronts the store:
//
//   GET {base}/api/apps?category=..&collection=..&num=..   -> {"results": [...]}
//   GET {base}/api/apps/{id}/similar                      -> {"results": [...]}
//   GET {base}/api/apps/{id}                              -> {details}
//
// Every request also carries lang and country. Any non-2xx status is a
// failure, and a similar-apps response without results counts as "no result".
// =============================================================================

use super::{AppDetails, AppSummary, StoreClient};
use crate::error::ClientError;
use async_trait::async_trait;
use reqwest::Client;
use serde::de::DeserializeOwned;
use serde::Deserialize;
use std::time::Duration;
use tracing::debug;
use url::Url;

// List endpoints wrap their apps in a "results" field
#[derive(Debug, Deserialize)]
struct ResultsPage {
    #[serde(default)]
    results: Option<Vec<AppSummary>>,
}

/// HTTP store client. Cheap to clone; the underlying pool is shared.
#[derive(Debug, Clone)]
pub struct PlayApiClient {
    client: Client,
    base: Url,
    lang: String,
    country: String,
}

impl PlayApiClient {
    pub fn new(
        base_url: &str,
        lang: &str,
        country: &str,
        timeout: Duration,
    ) -> Result<Self, ClientError> {
        let base = Url::parse(base_url)?;
        if base.cannot_be_a_base() {
            return Err(ClientError::BaseUrl(base_url.to_string()));
        }

        // One client for the whole run so connections get reused
        let client = Client::builder().timeout(timeout).build()?;

        Ok(Self {
            client,
            base,
            lang: lang.to_string(),
            country: country.to_string(),
        })
    }

    // Builds {base}/api/apps/{segments...}?lang=..&country=..
    // Segments are percent-encoded, so odd ids can't escape the path.
    fn endpoint(&self, segments: &[&str]) -> Result<Url, ClientError> {
        let mut url = self.base.clone();
        url.path_segments_mut()
            .map_err(|_| ClientError::BaseUrl(self.base.to_string()))?
            .pop_if_empty()
            .extend(["api", "apps"])
            .extend(segments);
        url.query_pairs_mut()
            .append_pair("lang", &self.lang)
            .append_pair("country", &self.country);
        Ok(url)
    }

    async fn get_json<T: DeserializeOwned>(&self, url: Url) -> Result<T, ClientError> {
        debug!(%url, "GET");
        let response = self.client.get(url.clone()).send().await?;

        if !response.status().is_success() {
            return Err(ClientError::Status {
                status: response.status().as_u16(),
                url: url.to_string(),
            });
        }

        Ok(response.json::<T>().await?)
    }
}

#[async_trait]
impl StoreClient for PlayApiClient {
    async fn list(
        &self,
        category: &str,
        collection: &str,
        limit: usize,
    ) -> Result<Vec<AppSummary>, ClientError> {
        let mut url = self.endpoint(&[])?;
        url.query_pairs_mut()
            .append_pair("category", category)
            .append_pair("collection", collection)
            .append_pair("num", &limit.to_string());

        let page: ResultsPage = self.get_json(url).await?;
        page.results
            .ok_or_else(|| ClientError::NoResult(format!("{}/{}", category, collection)))
    }

    async fn similar(&self, app_id: &str) -> Result<Vec<AppSummary>, ClientError> {
        let url = self.endpoint(&[app_id, "similar"])?;
        let page: ResultsPage = self.get_json(url).await?;
        page.results
            .ok_or_else(|| ClientError::NoResult(app_id.to_string()))
    }

    async fn details(&self, app_id: &str) -> Result<AppDetails, ClientError> {
        let url = self.endpoint(&[app_id])?;
        self.get_json(url).await
    }
}
