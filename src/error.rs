// src/error.rs
// =============================================================================
// Typed errors for the two things that can go wrong underneath a pass:
// the SQLite store and the store API client.
//
// The passes treat them very differently:
// - StoreError is never recovered locally. It bubbles out and ends the pass.
// - ClientError is per-identifier. The pass logs it and moves on; what it
//   records (if anything) depends on which pass saw it.
// =============================================================================

use crate::store::QueryState;
use thiserror::Error;

/// Persistence failures. Always propagated to the caller.
#[derive(Error, Debug)]
pub enum StoreError {
    #[error("SQLite error: {0}")]
    Sqlite(#[from] rusqlite::Error),

    #[error("failed to encode metadata for {id}: {source}")]
    Encode {
        id: String,
        #[source]
        source: serde_json::Error,
    },

    /// Failure codes share a column with Unqueried (0) and Queried (1),
    /// so only negative values are accepted.
    #[error("failure code must be negative, got {0}")]
    InvalidFailureCode(i64),

    #[error("no frontier entry for {0}")]
    UnknownEntry(String),

    #[error("{id} already left Unqueried (currently {current:?})")]
    IllegalTransition { id: String, current: QueryState },
}

/// Failures talking to the store API.
#[derive(Error, Debug)]
pub enum ClientError {
    #[error("HTTP request failed: {0}")]
    Http(#[from] reqwest::Error),

    #[error("store API returned HTTP {status} for {url}")]
    Status { status: u16, url: String },

    /// The call succeeded at the transport level but carried no result.
    #[error("store API returned no result for {0}")]
    NoResult(String),

    #[error("invalid URL: {0}")]
    Url(#[from] url::ParseError),

    #[error("base URL cannot carry a path: {0}")]
    BaseUrl(String),
}

pub type StoreResult<T> = Result<T, StoreError>;
