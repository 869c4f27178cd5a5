//! Dancing Pony cache: a key-value side cache for read paths.
//!
//! - [`CacheStore`]: the storage seam, keyed by string
//! - [`MokaCacheStore`]: in-process implementation with a fixed TTL
//! - [`keys`]: deterministic key builders and invalidation prefixes
//! - [`get_json`] / [`set_json`]: typed access over JSON payloads

mod error;
pub mod keys;
mod store;

pub use error::CacheError;
pub use store::{CacheStore, MokaCacheStore, get_json, set_json};
