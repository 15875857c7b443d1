//! Generic thread-safe cache with pluggable reclamation strategies
//!
//! This crate provides a concurrent key-value cache built around three
//! ideas: atomic get-or-compute (the producer for a key runs at most once
//! per population event), configurable automatic reclamation (strong,
//! weak, soft, and phantom modes), and exactly-once removal notification
//! (every entry that leaves the map is reported to an optional listener
//! with the single cause that removed it).
//!
//! # Features
//!
//! - **Thread-safe**: sharded concurrent map, all methods take `&self`
//! - **Generic**: works with any `K: Eq + Hash + Clone` and `V: Clone`
//! - **Reclamation modes**: strong (none), weak (not-recently-used
//!   sweep), soft (memory-watermark LRU), phantom (notification-only)
//! - **TTL support**: default and per-entry expiration, extendable
//! - **Null caching**: store "known absent" distinctly from "unmapped"
//! - **Removal listener**: exactly-once callbacks with a cause taxonomy
//! - **Metrics tracking**: optional hit/miss/removal statistics
//! - **Testable**: clock abstraction for deterministic time-based tests
//!
//! # Examples
//!
//! ## Get-or-compute
//! ```
//! use cellar_cache::{Cache, CacheConfig};
//!
//! let cache: Cache<String, i32> = Cache::new(CacheConfig::strong());
//! let value = cache.get_or_compute("key".to_string(), |_| 42);
//! assert_eq!(value, Some(42));
//! ```
//!
//! ## TTL-based cache
//! ```
//! use std::time::Duration;
//!
//! use cellar_cache::{Cache, CacheConfig};
//!
//! let cache: Cache<String, String> = Cache::new(CacheConfig::ttl(Duration::from_secs(3600)));
//! cache.put("session".to_string(), "data".to_string());
//! ```
//!
//! ## Removal listener with cause taxonomy
//! ```
//! use std::sync::Arc;
//!
//! use cellar_cache::{Cache, CacheConfig, RemovalCause};
//!
//! let listener = |key: &String, _value: Option<i32>, cause: RemovalCause| {
//!     println!("{key} removed: {cause}");
//! };
//! let cache: Cache<String, i32> =
//!     Cache::with_listener(CacheConfig::weak(), Arc::new(listener));
//!
//! cache.put("k".to_string(), 1);
//! cache.remove(&"k".to_string()); // prints "k removed: explicit"
//! ```
//!
//! ## Custom configuration with builder
//! ```
//! use std::time::Duration;
//!
//! use cellar_cache::{Cache, CacheConfig, ReclaimMode};
//!
//! let config = CacheConfig::builder()
//!     .mode(ReclaimMode::Soft)
//!     .watermark(10_000)
//!     .default_ttl(Duration::from_secs(300))
//!     .track_metrics(true)
//!     .build();
//! let cache: Cache<u64, Vec<u8>> = Cache::new(config);
//! ```

#![forbid(unsafe_code)]
#![warn(rust_2018_idioms)]
#![warn(clippy::all, clippy::perf, clippy::complexity, clippy::suspicious)]

mod cache;
mod clock;
mod config;
mod core;
mod entry;
mod listener;
mod policy;
mod queue;
mod stats;
pub mod utils;

pub use cache::Cache;
pub use clock::{Clock, MockClock, SystemClock};
pub use config::{CacheConfig, CacheConfigBuilder, ReclaimMode, DEFAULT_SOFT_WATERMARK};
pub use listener::{RemovalCause, RemovalListener, ValueInfo};
pub use stats::CacheStats;
