//! JSON-RPC envelope for the chain-identity check.

use serde::{Deserialize, Serialize};
use serde_json::Value;

/// The single request every probe sends:
/// `{"jsonrpc":"2.0","method":"eth_chainId","params":[],"id":1}`.
#[derive(Debug, Clone, Serialize)]
pub struct JsonRpcRequest {
    pub jsonrpc: &'static str,
    pub method: &'static str,
    pub params: Vec<Value>,
    pub id: u32,
}

impl JsonRpcRequest {
    pub fn chain_id() -> Self {
        Self {
            jsonrpc: "2.0",
            method: "eth_chainId",
            params: Vec::new(),
            id: 1,
        }
    }
}

#[derive(Debug, Deserialize)]
pub struct JsonRpcResponse {
    #[serde(default)]
    pub jsonrpc: String,
    #[serde(default)]
    pub result: Option<Value>,
    #[serde(default)]
    pub error: Option<JsonRpcErrorObject>,
    #[serde(default)]
    pub id: Option<Value>,
}

#[derive(Debug, Deserialize)]
pub struct JsonRpcErrorObject {
    pub code: i64,
    #[serde(default)]
    pub message: String,
}

impl JsonRpcResponse {
    /// Whether this response confirms the expected chain ID: no `error`
    /// field, a string `result`, and that string parsing to `expected`.
    pub fn confirms_chain_id(&self, expected: u64) -> bool {
        if self.error.is_some() {
            return false;
        }
        let Some(raw) = self.result.as_ref().and_then(Value::as_str) else {
            return false;
        };
        parse_chain_id(raw) == Some(expected)
    }
}

/// Parse a chain ID reported by an endpoint: `0x`-prefixed hex or decimal.
pub fn parse_chain_id(raw: &str) -> Option<u64> {
    if let Some(hex) = raw.strip_prefix("0x").or_else(|| raw.strip_prefix("0X")) {
        u64::from_str_radix(hex, 16).ok()
    } else {
        raw.parse().ok()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn response(raw: &str) -> JsonRpcResponse {
        serde_json::from_str(raw).unwrap()
    }

    #[test]
    fn parses_hex_and_decimal_ids() {
        assert_eq!(parse_chain_id("0x1"), Some(1));
        assert_eq!(parse_chain_id("0X64"), Some(100));
        assert_eq!(parse_chain_id("42161"), Some(42161));
        assert_eq!(parse_chain_id("0xzz"), None);
        assert_eq!(parse_chain_id(""), None);
        assert_eq!(parse_chain_id("-5"), None);
    }

    #[test]
    fn confirms_matching_chain_id() {
        assert!(response(r#"{"jsonrpc":"2.0","result":"0x1","id":1}"#).confirms_chain_id(1));
        assert!(response(r#"{"jsonrpc":"2.0","result":"100","id":1}"#).confirms_chain_id(100));
    }

    #[test]
    fn rejects_mismatch_error_and_malformed_results() {
        // Wrong chain.
        assert!(!response(r#"{"jsonrpc":"2.0","result":"0x2","id":1}"#).confirms_chain_id(1));
        // Present error field.
        assert!(!response(
            r#"{"jsonrpc":"2.0","error":{"code":-32601,"message":"nope"},"id":1}"#
        )
        .confirms_chain_id(1));
        // Non-string result.
        assert!(!response(r#"{"jsonrpc":"2.0","result":1,"id":1}"#).confirms_chain_id(1));
        // Missing result.
        assert!(!response(r#"{"jsonrpc":"2.0","id":1}"#).confirms_chain_id(1));
        // Unparseable integer.
        assert!(!response(r#"{"jsonrpc":"2.0","result":"mainnet","id":1}"#).confirms_chain_id(1));
    }

    #[test]
    fn request_serializes_to_the_canonical_body() {
        let body = serde_json::to_value(JsonRpcRequest::chain_id()).unwrap();
        assert_eq!(
            body,
            serde_json::json!({"jsonrpc":"2.0","method":"eth_chainId","params":[],"id":1})
        );
    }
}
