//! TTL cache
//!
//! Process-wide, non-persistent mapping `cache_key → (value, expires_at)`.
//! Reads treat expired entries as misses; writes replace atomically at the
//! entry level with no cross-entry locking.

use std::collections::HashMap;
use std::time::{Duration, Instant};

use parking_lot::RwLock;
use serde_json::Value as JsonValue;

struct CacheEntry {
	value: JsonValue,
	expires_at: Instant,
}

/// In-process TTL cache for derived data-source values.
#[derive(Default)]
pub struct TtlCache {
	entries: RwLock<HashMap<String, CacheEntry>>,
}

impl TtlCache {
	/// Empty cache.
	pub fn new() -> Self {
		Self::default()
	}

	/// The cached value under `key`, unless absent or expired.
	pub fn get(&self, key: &str) -> Option<JsonValue> {
		let entries = self.entries.read();
		let entry = entries.get(key)?;
		if Instant::now() >= entry.expires_at {
			return None;
		}
		Some(entry.value.clone())
	}

	/// Store `value` under `key` for `ttl`. Replaces any previous entry,
	/// expired or not.
	pub fn insert(&self, key: impl Into<String>, value: JsonValue, ttl: Duration) {
		self.entries.write().insert(
			key.into(),
			CacheEntry {
				value,
				expires_at: Instant::now() + ttl,
			},
		);
	}

	/// Drop one entry.
	pub fn remove(&self, key: &str) {
		self.entries.write().remove(key);
	}

	/// Drop everything.
	pub fn clear(&self) {
		self.entries.write().clear();
	}

	/// Number of stored entries, expired ones included.
	pub fn len(&self) -> usize {
		self.entries.read().len()
	}

	/// Whether the cache holds no entries at all.
	pub fn is_empty(&self) -> bool {
		self.entries.read().is_empty()
	}
}

#[cfg(test)]
mod tests {
	use super::*;
	use rstest::*;
	use serde_json::json;

	#[rstest]
	fn test_hit_within_ttl() {
		let cache = TtlCache::new();
		cache.insert("k", json!([1, 2]), Duration::from_secs(60));

		assert_eq!(cache.get("k"), Some(json!([1, 2])));
	}

	#[rstest]
	fn test_expired_entry_is_a_miss() {
		let cache = TtlCache::new();
		cache.insert("k", json!(1), Duration::from_millis(0));

		// expires_at == now is already expired
		assert_eq!(cache.get("k"), None);
	}

	#[rstest]
	fn test_insert_replaces_entry() {
		let cache = TtlCache::new();
		cache.insert("k", json!(1), Duration::from_secs(60));
		cache.insert("k", json!(2), Duration::from_secs(60));

		assert_eq!(cache.get("k"), Some(json!(2)));
		assert_eq!(cache.len(), 1);
	}

	#[rstest]
	fn test_remove_and_clear() {
		let cache = TtlCache::new();
		cache.insert("a", json!(1), Duration::from_secs(60));
		cache.insert("b", json!(2), Duration::from_secs(60));

		cache.remove("a");
		assert_eq!(cache.get("a"), None);
		assert!(cache.get("b").is_some());

		cache.clear();
		assert!(cache.is_empty());
	}
}
