//! Registry storage seam
//!
//! The catalog persists through [`RegistryStore`]; the in-memory
//! implementation backs tests and single-process deployments, and the
//! relational driver implements the same trait out of tree.

use std::collections::HashMap;

use async_trait::async_trait;
use parking_lot::RwLock;

use atelier_core::manifest::ComponentKey;

use crate::entry::RegistryEntry;
use crate::error::RegistryResult;

/// Storage operations behind the component catalog.
///
/// Implementations serialize writes for the same key; `upsert_batch` is
/// atomic; either every entry lands or none do.
#[async_trait]
pub trait RegistryStore: Send + Sync {
	/// Insert or replace one entry.
	async fn upsert(&self, entry: RegistryEntry) -> RegistryResult<()>;

	/// Insert or replace several entries in one transaction.
	async fn upsert_batch(&self, entries: Vec<RegistryEntry>) -> RegistryResult<()>;

	/// Fetch one entry by key.
	async fn get(&self, key: &ComponentKey) -> RegistryResult<Option<RegistryEntry>>;

	/// All entries, unordered.
	async fn list(&self) -> RegistryResult<Vec<RegistryEntry>>;

	/// Remove one entry. Missing keys are a no-op.
	async fn delete(&self, key: &ComponentKey) -> RegistryResult<()>;
}

/// Process-local registry store.
#[derive(Default)]
pub struct InMemoryRegistryStore {
	rows: RwLock<HashMap<ComponentKey, RegistryEntry>>,
}

impl InMemoryRegistryStore {
	/// Empty store.
	pub fn new() -> Self {
		Self::default()
	}
}

#[async_trait]
impl RegistryStore for InMemoryRegistryStore {
	async fn upsert(&self, entry: RegistryEntry) -> RegistryResult<()> {
		self.rows.write().insert(entry.key(), entry);
		Ok(())
	}

	async fn upsert_batch(&self, entries: Vec<RegistryEntry>) -> RegistryResult<()> {
		let mut rows = self.rows.write();
		for entry in entries {
			rows.insert(entry.key(), entry);
		}
		Ok(())
	}

	async fn get(&self, key: &ComponentKey) -> RegistryResult<Option<RegistryEntry>> {
		Ok(self.rows.read().get(key).cloned())
	}

	async fn list(&self) -> RegistryResult<Vec<RegistryEntry>> {
		Ok(self.rows.read().values().cloned().collect())
	}

	async fn delete(&self, key: &ComponentKey) -> RegistryResult<()> {
		self.rows.write().remove(key);
		Ok(())
	}
}
