//! Error taxonomy for directory lookups and cache maintenance.

use std::path::PathBuf;
use thiserror::Error;

/// Everything that can go wrong while resolving a chain or maintaining the
/// cache artifact.
///
/// Rebuild failures are recovered inside the store when a stale artifact is
/// still on disk; every other variant propagates to the caller with the
/// offending query or path attached.
#[derive(Debug, Error)]
pub enum DirectoryError {
    /// Lookup miss, either by ID or after exhausting every name-matching tier.
    #[error("chain `{query}` does not exist or is not known to the directory")]
    ChainNotFound { query: String },

    /// A fuzzy name matched more than one alias; the caller has to pick.
    #[error("`{query}` matches multiple chains: {}. Use a more precise name", .matches.join(", "))]
    AmbiguousName { query: String, matches: Vec<String> },

    /// Transport failure or non-200 status while downloading the feed.
    #[error("failed to fetch chain feed: {0}")]
    FeedFetch(String),

    /// The feed body was not a valid chain record array.
    #[error("failed to decode chain feed: {0}")]
    FeedDecode(#[source] serde_json::Error),

    /// Disk read/write/permission failure on the cache artifact.
    #[error("cache i/o failed at {}: {source}", .path.display())]
    CacheIo {
        path: PathBuf,
        source: std::io::Error,
    },

    /// The artifact on disk is not a valid directory index document.
    #[error("cache artifact at {} is corrupt: {source}", .path.display())]
    CacheDecode {
        path: PathBuf,
        source: serde_json::Error,
    },
}

impl DirectoryError {
    pub(crate) fn cache_io(path: &std::path::Path, source: std::io::Error) -> Self {
        Self::CacheIo {
            path: path.to_path_buf(),
            source,
        }
    }

    pub(crate) fn cache_decode(path: &std::path::Path, source: serde_json::Error) -> Self {
        Self::CacheDecode {
            path: path.to_path_buf(),
            source,
        }
    }
}
