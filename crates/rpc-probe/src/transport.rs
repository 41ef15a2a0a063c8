//! Per-endpoint validation over the two wire protocols.
//!
//! Both transports run the same exchange: send the `eth_chainId` request,
//! decode one JSON-RPC response, compare the reported chain ID. Every
//! failure mode collapses to `false`; a probe never raises.

use std::time::Duration;

use futures::{SinkExt, StreamExt};
use tokio_tungstenite::tungstenite::Message;

use crate::jsonrpc::{JsonRpcRequest, JsonRpcResponse};

/// Whether a URL selects the WebSocket transport.
pub fn is_websocket_url(url: &str) -> bool {
    url.starts_with("ws://") || url.starts_with("wss://")
}

/// Validate one endpoint, choosing the transport by URL scheme.
pub(crate) async fn probe_endpoint(
    client: &reqwest::Client,
    url: &str,
    expected_chain_id: u64,
    timeout: Duration,
) -> bool {
    if is_websocket_url(url) {
        probe_websocket(url, expected_chain_id, timeout).await
    } else {
        probe_http(client, url, expected_chain_id, timeout).await
    }
}

/// Single HTTP POST with a request-scoped timeout.
async fn probe_http(
    client: &reqwest::Client,
    url: &str,
    expected_chain_id: u64,
    timeout: Duration,
) -> bool {
    let response = match client
        .post(url)
        .timeout(timeout)
        .json(&JsonRpcRequest::chain_id())
        .send()
        .await
    {
        Ok(response) => response,
        Err(_) => return false,
    };

    if !response.status().is_success() {
        return false;
    }

    match response.json::<JsonRpcResponse>().await {
        Ok(body) => body.confirms_chain_id(expected_chain_id),
        Err(_) => false,
    }
}

/// WebSocket dial-handshake-send-receive sequence, with the whole exchange
/// bounded by the probe timeout. The connection closes on drop.
async fn probe_websocket(url: &str, expected_chain_id: u64, timeout: Duration) -> bool {
    match tokio::time::timeout(timeout, websocket_chain_id(url)).await {
        Ok(Some(body)) => body.confirms_chain_id(expected_chain_id),
        _ => false,
    }
}

async fn websocket_chain_id(url: &str) -> Option<JsonRpcResponse> {
    let (mut stream, _) = tokio_tungstenite::connect_async(url).await.ok()?;

    let payload = serde_json::to_string(&JsonRpcRequest::chain_id()).ok()?;
    stream.send(Message::Text(payload)).await.ok()?;

    while let Some(frame) = stream.next().await {
        match frame.ok()? {
            Message::Text(text) => return serde_json::from_str(&text).ok(),
            Message::Binary(bytes) => return serde_json::from_slice(&bytes).ok(),
            // Control frames before the reply are fine, keep reading.
            Message::Ping(_) | Message::Pong(_) | Message::Frame(_) => {}
            Message::Close(_) => return None,
        }
    }
    None
}
