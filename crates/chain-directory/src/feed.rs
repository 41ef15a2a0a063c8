//! One-shot download and decode of the public chain feed.
//!
//! No retry here: a failed pull is a fatal build error, and the store
//! decides whether a stale artifact can cover for it.

use std::io::{BufReader, Read};

use crate::error::DirectoryError;
use crate::types::ChainRecord;

/// The public chainlist feed: one JSON array of chain records.
pub const DEFAULT_FEED_URL: &str = "https://chainlist.org/rpcs.json";

/// Download and decode the full feed.
pub fn fetch_feed(agent: &ureq::Agent, url: &str) -> Result<Vec<ChainRecord>, DirectoryError> {
    tracing::debug!(%url, "fetching chain feed");
    let response = agent
        .get(url)
        .call()
        .map_err(|e| DirectoryError::FeedFetch(e.to_string()))?;
    let records = decode_feed(response.into_reader())?;
    tracing::debug!(records = records.len(), "chain feed decoded");
    Ok(records)
}

/// Decode a feed body into chain records.
pub fn decode_feed<R: Read>(reader: R) -> Result<Vec<ChainRecord>, DirectoryError> {
    serde_json::from_reader(BufReader::new(reader)).map_err(DirectoryError::FeedDecode)
}
