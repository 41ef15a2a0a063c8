//! Cached directory store.
//!
//! Owns the on-disk artifact: decides when it is stale, rebuilds it from the
//! feed, and exposes the two lookup entry points. All mutating operations
//! run under one exclusive lock so rebuilds never race, and a rebuilt index
//! lands via tmp-file-plus-rename so readers never see a torn document.

use std::fs;
use std::path::{Path, PathBuf};
use std::time::Duration;

use parking_lot::Mutex;

use crate::error::DirectoryError;
use crate::feed::{self, DEFAULT_FEED_URL};
use crate::index::build_index;
use crate::locate::find_record;
use crate::resolve::{load_name_index, resolve_name};
use crate::types::{ChainRecord, DirectoryIndex};

/// Age past which the artifact is rebuilt on the next lookup.
pub const CACHE_TTL: Duration = Duration::from_secs(30 * 24 * 60 * 60);

const ARTIFACT_FILE: &str = "directory.json";

/// Explicit store configuration. No process-wide flags; everything the cache
/// layer needs travels in here.
#[derive(Debug, Clone)]
pub struct StoreOptions {
    /// Directory holding the artifact. Defaults to
    /// `<platform cache dir>/rpcscout`, falling back to the temp dir.
    pub cache_dir: Option<PathBuf>,
    /// Feed to pull on rebuild.
    pub feed_url: String,
    /// Staleness threshold.
    pub ttl: Duration,
    /// Rebuild once before the next lookup even if the artifact is fresh.
    pub force_rebuild: bool,
}

impl Default for StoreOptions {
    fn default() -> Self {
        Self {
            cache_dir: None,
            feed_url: DEFAULT_FEED_URL.to_string(),
            ttl: CACHE_TTL,
            force_rebuild: false,
        }
    }
}

/// The platform cache directory for this tool.
pub fn default_cache_dir() -> PathBuf {
    dirs::cache_dir()
        .unwrap_or_else(std::env::temp_dir)
        .join("rpcscout")
}

#[derive(Debug, Default)]
struct BuildState {
    /// Set once a forced rebuild has happened, so repeated lookups on one
    /// store don't hammer the feed.
    force_spent: bool,
}

/// Cached, self-refreshing view of the chain directory.
pub struct DirectoryStore {
    artifact: PathBuf,
    feed_url: String,
    ttl: Duration,
    force_rebuild: bool,
    agent: ureq::Agent,
    build_lock: Mutex<BuildState>,
}

impl DirectoryStore {
    /// Open a store, creating the cache directory if needed.
    pub fn open(options: StoreOptions) -> Result<Self, DirectoryError> {
        let cache_dir = options.cache_dir.unwrap_or_else(default_cache_dir);
        fs::create_dir_all(&cache_dir).map_err(|e| DirectoryError::cache_io(&cache_dir, e))?;

        Ok(Self {
            artifact: cache_dir.join(ARTIFACT_FILE),
            feed_url: options.feed_url,
            ttl: options.ttl,
            force_rebuild: options.force_rebuild,
            agent: ureq::Agent::new(),
            build_lock: Mutex::new(BuildState::default()),
        })
    }

    /// Path of the persisted artifact.
    pub fn artifact_path(&self) -> &Path {
        &self.artifact
    }

    /// Look up a chain record by its numeric ID, refreshing the cache first.
    pub fn chain_by_id(&self, chain_id: u64) -> Result<ChainRecord, DirectoryError> {
        self.ensure_fresh()?;
        find_record(&self.artifact, chain_id)
    }

    /// Resolve a free-text identifier and fetch the full record.
    ///
    /// The name index only stores IDs, so the final fetch goes back through
    /// the streaming locator.
    pub fn chain_by_name(&self, name: &str) -> Result<ChainRecord, DirectoryError> {
        self.ensure_fresh()?;
        let names = load_name_index(&self.artifact)?;
        let chain_id = resolve_name(&names, name)?;
        find_record(&self.artifact, chain_id)
    }

    /// Make the artifact usable: present, within TTL, or freshly rebuilt.
    ///
    /// If the rebuild fails but a previous artifact is still on disk, the
    /// stale copy is kept and the failure downgraded to a warning.
    pub fn ensure_fresh(&self) -> Result<(), DirectoryError> {
        let mut state = self.build_lock.lock();
        let force = self.force_rebuild && !state.force_spent;

        if !force && self.is_fresh() {
            return Ok(());
        }

        match self.rebuild_locked() {
            Ok(()) => {
                state.force_spent = true;
                Ok(())
            }
            Err(err) if self.artifact.exists() => {
                tracing::warn!(error = %err, "failed to update chain directory, using existing cache");
                Ok(())
            }
            Err(err) => Err(err),
        }
    }

    /// Unconditionally rebuild the artifact from the feed.
    pub fn rebuild(&self) -> Result<(), DirectoryError> {
        let _guard = self.build_lock.lock();
        self.rebuild_locked()
    }

    /// Remove the artifact. Missing file is not an error.
    pub fn clean(&self) -> Result<(), DirectoryError> {
        let _guard = self.build_lock.lock();
        match fs::remove_file(&self.artifact) {
            Ok(()) => {
                tracing::debug!(path = %self.artifact.display(), "cache artifact removed");
                Ok(())
            }
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => Ok(()),
            Err(e) => Err(DirectoryError::cache_io(&self.artifact, e)),
        }
    }

    fn is_fresh(&self) -> bool {
        let Ok(metadata) = fs::metadata(&self.artifact) else {
            return false;
        };
        let Ok(modified) = metadata.modified() else {
            return false;
        };
        // A clock-skewed future mtime counts as fresh rather than stale.
        modified.elapsed().map(|age| age < self.ttl).unwrap_or(true)
    }

    fn rebuild_locked(&self) -> Result<(), DirectoryError> {
        tracing::info!(url = %self.feed_url, "rebuilding chain directory cache");
        let records = feed::fetch_feed(&self.agent, &self.feed_url)?;
        let index = build_index(records);
        self.persist(&index)?;
        tracing::info!(chains = index.by_id.len(), "chain directory cache rebuilt");
        Ok(())
    }

    /// Atomic full replacement: serialize to a sibling tmp file, then rename
    /// over the previous artifact.
    fn persist(&self, index: &DirectoryIndex) -> Result<(), DirectoryError> {
        let bytes =
            serde_json::to_vec(index).map_err(|e| DirectoryError::cache_decode(&self.artifact, e))?;
        let tmp = self.artifact.with_extension("json.tmp");
        fs::write(&tmp, &bytes).map_err(|e| DirectoryError::cache_io(&tmp, e))?;
        fs::rename(&tmp, &self.artifact).map_err(|e| DirectoryError::cache_io(&self.artifact, e))?;
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::{Read, Write};
    use std::net::TcpListener;

    /// Serve `body` as an HTTP 200 response to every connection until the
    /// listener is dropped, on a loopback port.
    fn serve_feed(body: String, status: &'static str) -> String {
        let listener = TcpListener::bind("127.0.0.1:0").unwrap();
        let addr = listener.local_addr().unwrap();
        std::thread::spawn(move || {
            for stream in listener.incoming() {
                let Ok(mut stream) = stream else { break };
                let body = body.clone();
                std::thread::spawn(move || {
                    // Consume the request head before answering.
                    let mut buf = [0u8; 4096];
                    let _ = stream.read(&mut buf);
                    let response = format!(
                        "HTTP/1.1 {status}\r\nContent-Type: application/json\r\nContent-Length: {}\r\nConnection: close\r\n\r\n{body}",
                        body.len(),
                    );
                    let _ = stream.write_all(response.as_bytes());
                });
            }
        });
        format!("http://{addr}/rpcs.json")
    }

    fn feed_json(chains: &[(&str, u64)]) -> String {
        let records: Vec<serde_json::Value> = chains
            .iter()
            .map(|(name, id)| {
                serde_json::json!({
                    "name": name,
                    "shortName": name,
                    "chainId": id,
                    "rpc": [{"url": format!("https://{name}.example.org")}],
                })
            })
            .collect();
        serde_json::to_string(&records).unwrap()
    }

    fn store_with(dir: &Path, feed_url: &str, ttl: Duration, force: bool) -> DirectoryStore {
        DirectoryStore::open(StoreOptions {
            cache_dir: Some(dir.to_path_buf()),
            feed_url: feed_url.to_string(),
            ttl,
            force_rebuild: force,
        })
        .unwrap()
    }

    #[test]
    fn builds_cache_on_first_lookup() {
        let dir = tempfile::tempdir().unwrap();
        let url = serve_feed(feed_json(&[("eth", 1), ("gnosis", 100)]), "200 OK");
        let store = store_with(dir.path(), &url, CACHE_TTL, false);

        let record = store.chain_by_id(100).unwrap();
        assert_eq!(record.name, "gnosis");
        assert!(store.artifact_path().exists());
    }

    #[test]
    fn fresh_artifact_is_served_without_the_feed() {
        let dir = tempfile::tempdir().unwrap();
        let url = serve_feed(feed_json(&[("eth", 1)]), "200 OK");
        store_with(dir.path(), &url, CACHE_TTL, false)
            .ensure_fresh()
            .unwrap();

        // New store pointed at a dead feed: the fresh artifact must carry it.
        let offline = store_with(dir.path(), "http://127.0.0.1:1/rpcs.json", CACHE_TTL, false);
        let record = offline.chain_by_id(1).unwrap();
        assert_eq!(record.name, "eth");
    }

    #[test]
    fn stale_artifact_triggers_rebuild() {
        let dir = tempfile::tempdir().unwrap();
        let first = serve_feed(feed_json(&[("eth", 1)]), "200 OK");
        store_with(dir.path(), &first, CACHE_TTL, false)
            .ensure_fresh()
            .unwrap();

        // Zero TTL makes the artifact immediately stale.
        let second = serve_feed(feed_json(&[("gnosis", 100)]), "200 OK");
        let store = store_with(dir.path(), &second, Duration::ZERO, false);
        let record = store.chain_by_id(100).unwrap();
        assert_eq!(record.name, "gnosis");
    }

    #[test]
    fn forced_rebuild_fully_replaces_the_artifact() {
        let dir = tempfile::tempdir().unwrap();
        let first = serve_feed(feed_json(&[("eth", 1)]), "200 OK");
        store_with(dir.path(), &first, CACHE_TTL, false)
            .ensure_fresh()
            .unwrap();

        let second = serve_feed(feed_json(&[("gnosis", 100)]), "200 OK");
        let store = store_with(dir.path(), &second, CACHE_TTL, true);
        assert_eq!(store.chain_by_id(100).unwrap().name, "gnosis");

        // Replacement, not merge: the old chain is gone.
        let err = store.chain_by_id(1).unwrap_err();
        assert!(matches!(err, DirectoryError::ChainNotFound { .. }));
    }

    #[test]
    fn failed_rebuild_falls_back_to_stale_artifact() {
        let dir = tempfile::tempdir().unwrap();
        let url = serve_feed(feed_json(&[("eth", 1)]), "200 OK");
        store_with(dir.path(), &url, CACHE_TTL, false)
            .ensure_fresh()
            .unwrap();

        // Stale artifact plus unreachable feed: lookups still succeed.
        let store = store_with(dir.path(), "http://127.0.0.1:1/rpcs.json", Duration::ZERO, false);
        let record = store.chain_by_id(1).unwrap();
        assert_eq!(record.name, "eth");
    }

    #[test]
    fn failed_rebuild_without_artifact_surfaces() {
        let dir = tempfile::tempdir().unwrap();
        let store = store_with(dir.path(), "http://127.0.0.1:1/rpcs.json", CACHE_TTL, false);
        let err = store.ensure_fresh().unwrap_err();
        assert!(matches!(err, DirectoryError::FeedFetch(_)));
    }

    #[test]
    fn non_200_feed_is_a_fetch_error() {
        let dir = tempfile::tempdir().unwrap();
        let url = serve_feed("oops".to_string(), "500 Internal Server Error");
        let store = store_with(dir.path(), &url, CACHE_TTL, false);
        let err = store.rebuild().unwrap_err();
        assert!(matches!(err, DirectoryError::FeedFetch(_)));
    }

    #[test]
    fn lookup_by_name_round_trips_through_the_locator() {
        let dir = tempfile::tempdir().unwrap();
        let url = serve_feed(feed_json(&[("eth", 1), ("gnosis", 100)]), "200 OK");
        let store = store_with(dir.path(), &url, CACHE_TTL, false);

        let by_name = store.chain_by_name("gnosis").unwrap();
        let by_id = store.chain_by_id(by_name.chain_id).unwrap();
        assert_eq!(by_name, by_id);
    }

    #[test]
    fn clean_removes_the_artifact_and_is_idempotent() {
        let dir = tempfile::tempdir().unwrap();
        let url = serve_feed(feed_json(&[("eth", 1)]), "200 OK");
        let store = store_with(dir.path(), &url, CACHE_TTL, false);
        store.ensure_fresh().unwrap();
        assert!(store.artifact_path().exists());

        store.clean().unwrap();
        assert!(!store.artifact_path().exists());
        store.clean().unwrap();
    }

    #[test]
    fn forced_rebuild_happens_once_per_store() {
        let dir = tempfile::tempdir().unwrap();
        let url = serve_feed(feed_json(&[("eth", 1)]), "200 OK");
        let store = store_with(dir.path(), &url, CACHE_TTL, true);
        store.ensure_fresh().unwrap();

        let first_mtime = fs::metadata(store.artifact_path()).unwrap().modified().unwrap();
        store.ensure_fresh().unwrap();
        let second_mtime = fs::metadata(store.artifact_path()).unwrap().modified().unwrap();
        assert_eq!(first_mtime, second_mtime);
    }
}
