//! Endpoint Prober
//!
//! Fan-out/fan-in validation of candidate RPC endpoints. One worker per
//! URL sends a single `eth_chainId` request (HTTP POST or WebSocket
//! exchange, chosen by scheme) and the collector accepts confirmations
//! until a single shared deadline fires or every worker has reported.
//!
//! A failing endpoint is data, not an error: individual probe outcomes are
//! booleans, and the only error either entry point returns is
//! [`ProbeError::AllEndpointsFailing`].
//!
//! # Example
//!
//! ```ignore
//! use std::time::Duration;
//!
//! let urls = vec!["https://eth.example.org".to_string()];
//! let url = rpc_probe::find_any_working(&urls, 1, Duration::from_millis(200)).await?;
//! ```

pub mod error;
pub mod jsonrpc;
pub mod transport;

pub use error::ProbeError;
pub use jsonrpc::{parse_chain_id, JsonRpcRequest, JsonRpcResponse};
pub use transport::is_websocket_url;

use std::time::Duration;

use rand::seq::SliceRandom;
use tokio::sync::mpsc;

/// All endpoints confirmed within the probe window, order-randomized for
/// load distribution across callers.
pub async fn find_all_working(
    urls: &[String],
    expected_chain_id: u64,
    timeout: Duration,
) -> Result<Vec<String>, ProbeError> {
    let mut working = collect_working(urls, expected_chain_id, timeout).await;
    if working.is_empty() {
        return Err(ProbeError::AllEndpointsFailing);
    }
    working.shuffle(&mut rand::thread_rng());
    Ok(working)
}

/// One endpoint picked uniformly at random from the confirmed set.
///
/// Deliberately runs the full collection rather than short-circuiting on the
/// first response: the random pick spreads load across endpoints instead of
/// always rewarding the fastest one.
pub async fn find_any_working(
    urls: &[String],
    expected_chain_id: u64,
    timeout: Duration,
) -> Result<String, ProbeError> {
    let working = collect_working(urls, expected_chain_id, timeout).await;
    working
        .choose(&mut rand::thread_rng())
        .cloned()
        .ok_or(ProbeError::AllEndpointsFailing)
}

/// The shared engine: launch one validation per URL, collect confirmations
/// until the deadline fires or all workers are done.
///
/// The same `timeout` bounds both the batch collection window and each
/// worker's own transport deadline. Workers still in flight when the window
/// closes are abandoned; their send lands in a closed channel and is
/// dropped.
async fn collect_working(urls: &[String], expected_chain_id: u64, timeout: Duration) -> Vec<String> {
    if urls.is_empty() {
        return Vec::new();
    }

    let client = reqwest::Client::new();
    let (tx, mut rx) = mpsc::channel::<String>(urls.len());

    for url in urls {
        let url = url.clone();
        let client = client.clone();
        let tx = tx.clone();
        tokio::spawn(async move {
            if transport::probe_endpoint(&client, &url, expected_chain_id, timeout).await {
                // Capacity equals the URL count and each worker sends at most
                // once, so this only fails after the collector has gone away.
                let _ = tx.try_send(url);
            }
        });
    }
    // The collector's `None` now means "every worker finished".
    drop(tx);

    let deadline = tokio::time::sleep(timeout);
    tokio::pin!(deadline);

    let mut working = Vec::new();
    loop {
        tokio::select! {
            _ = &mut deadline => {
                tracing::debug!(confirmed = working.len(), "probe window closed on deadline");
                break;
            }
            received = rx.recv() => match received {
                Some(url) => {
                    tracing::debug!(%url, "endpoint confirmed");
                    working.push(url);
                }
                // All workers done and the buffer drained.
                None => break,
            },
        }
    }
    working
}
