//! Feed record and directory index types.
//!
//! Field names follow the chainlist feed schema so records round-trip
//! through the persisted artifact unchanged.

use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

/// One RPC endpoint listed for a chain: a URL plus the feed's
/// tracking/privacy classification tag.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct RpcEndpoint {
    #[serde(default)]
    pub url: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub tracking: Option<String>,
}

/// Native currency descriptor for a chain.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct NativeCurrency {
    #[serde(default)]
    pub name: String,
    #[serde(default)]
    pub symbol: String,
    #[serde(default)]
    pub decimals: u32,
}

/// Block explorer link for a chain.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Explorer {
    #[serde(default)]
    pub name: String,
    #[serde(default)]
    pub url: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub standard: Option<String>,
}

/// One blockchain network's public metadata as published by the feed.
///
/// The numeric `chain_id` is the canonical key; `name`, `short_name` and
/// `chain_slug` are the lookup aliases.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ChainRecord {
    #[serde(default)]
    pub name: String,
    #[serde(default)]
    pub chain: String,
    #[serde(default)]
    pub rpc: Vec<RpcEndpoint>,
    #[serde(default)]
    pub native_currency: NativeCurrency,
    #[serde(default)]
    pub short_name: String,
    pub chain_id: u64,
    #[serde(default)]
    pub explorers: Vec<Explorer>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub chain_slug: Option<String>,
}

impl ChainRecord {
    /// Non-empty RPC URLs for this chain, in feed order.
    pub fn rpc_urls(&self) -> Vec<String> {
        self.rpc
            .iter()
            .filter(|endpoint| !endpoint.url.is_empty())
            .map(|endpoint| endpoint.url.clone())
            .collect()
    }
}

/// The persisted cache artifact: ID index plus name index, built together
/// and replaced together.
///
/// Invariant: every chain ID appearing in `by_name` has an entry in `by_id`.
/// `u64` map keys serialize as JSON strings, so the on-disk document has the
/// shape `{"byId": {"1": {...}}, "byName": {"ethereum": 1}}`.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct DirectoryIndex {
    #[serde(rename = "byId", default)]
    pub by_id: BTreeMap<u64, ChainRecord>,
    #[serde(rename = "byName", default)]
    pub by_name: BTreeMap<String, u64>,
}
