//! Chain Directory Index
//!
//! Turns the denormalized chainlist feed into fast local lookups.
//!
//! This crate provides:
//! - [`store`]: the cached directory store with TTL-based staleness, forced
//!   rebuild, and graceful fallback to a stale artifact
//! - [`feed`]: one-shot download and decode of the public chain feed
//! - [`index`]: the ID index + name index built from a feed pull
//! - [`locate`]: streaming by-ID record lookup over the persisted artifact
//! - [`resolve`]: tiered free-text name resolution against the name index
//!
//! # Example
//!
//! ```ignore
//! use chain_directory::{DirectoryStore, StoreOptions};
//!
//! let store = DirectoryStore::open(StoreOptions::default())?;
//! let record = store.chain_by_name("optimism")?;
//! println!("chain id {}", record.chain_id);
//! ```

pub mod error;
pub mod feed;
pub mod index;
pub mod locate;
pub mod normalize;
pub mod resolve;
pub mod store;
pub mod types;

// Re-export main types for convenience
pub use error::DirectoryError;
pub use store::{DirectoryStore, StoreOptions, CACHE_TTL};
pub use types::{ChainRecord, DirectoryIndex, Explorer, NativeCurrency, RpcEndpoint};
