//! Catalog operations
//!
//! [`ComponentRegistry`] is the long-lived catalog value created at startup:
//! the lifecycle manager registers manifests through it, the HTTP surface
//! queries it, and deletion is guarded by the usage reverse-index.

use std::sync::Arc;

use tracing::{debug, info};

use atelier_core::category::ComponentCategory;
use atelier_core::manifest::{ComponentKey, ComponentManifest};

use crate::entry::RegistryEntry;
use crate::error::{RegistryError, RegistryResult};
use crate::store::RegistryStore;
use crate::usage::{PageRef, UsageScanner};

/// The component catalog.
pub struct ComponentRegistry {
	store: Arc<dyn RegistryStore>,
	usage: Arc<dyn UsageScanner>,
}

impl ComponentRegistry {
	/// Build a registry over a store and a usage scanner.
	pub fn new(store: Arc<dyn RegistryStore>, usage: Arc<dyn UsageScanner>) -> Self {
		Self { store, usage }
	}

	/// Register one manifest: upsert by `(plugin_id, component_id)`.
	///
	/// A fresh key creates a row; an existing key keeps its row id and
	/// first-registration time, replaces the manifest, and reactivates.
	pub async fn register(&self, manifest: ComponentManifest) -> RegistryResult<RegistryEntry> {
		manifest
			.validate()
			.map_err(|e| RegistryError::InvalidManifest(e.to_string()))?;

		let key = manifest.key();
		let entry = match self.store.get(&key).await? {
			Some(existing) => existing.updated_from(manifest),
			None => RegistryEntry::from_manifest(manifest),
		};
		self.store.upsert(entry.clone()).await?;
		info!(component = %key, category = %entry.category, "component registered");
		Ok(entry)
	}

	/// Register several manifests atomically.
	pub async fn register_batch(
		&self,
		manifests: Vec<ComponentManifest>,
	) -> RegistryResult<Vec<RegistryEntry>> {
		let mut entries = Vec::with_capacity(manifests.len());
		for manifest in manifests {
			manifest
				.validate()
				.map_err(|e| RegistryError::InvalidManifest(e.to_string()))?;
			let entry = match self.store.get(&manifest.key()).await? {
				Some(existing) => existing.updated_from(manifest),
				None => RegistryEntry::from_manifest(manifest),
			};
			entries.push(entry);
		}
		self.store.upsert_batch(entries.clone()).await?;
		Ok(entries)
	}

	/// One entry by key.
	pub async fn get(
		&self,
		plugin_id: &str,
		component_id: &str,
	) -> RegistryResult<Option<RegistryEntry>> {
		self.store
			.get(&ComponentKey::new(plugin_id, component_id))
			.await
	}

	/// The manifest of one entry.
	pub async fn get_manifest(
		&self,
		plugin_id: &str,
		component_id: &str,
	) -> RegistryResult<Option<ComponentManifest>> {
		Ok(self
			.get(plugin_id, component_id)
			.await?
			.map(|entry| entry.manifest))
	}

	/// Active entries, sorted for stable catalog listings.
	pub async fn list_active(&self) -> RegistryResult<Vec<RegistryEntry>> {
		let mut entries: Vec<_> = self
			.store
			.list()
			.await?
			.into_iter()
			.filter(|e| e.is_active)
			.collect();
		entries.sort_by(|a, b| a.key().cmp(&b.key()));
		Ok(entries)
	}

	/// Every entry, active or not.
	pub async fn list_all(&self) -> RegistryResult<Vec<RegistryEntry>> {
		let mut entries = self.store.list().await?;
		entries.sort_by(|a, b| a.key().cmp(&b.key()));
		Ok(entries)
	}

	/// Active entries in one category.
	pub async fn by_category(
		&self,
		category: ComponentCategory,
	) -> RegistryResult<Vec<RegistryEntry>> {
		Ok(self
			.list_active()
			.await?
			.into_iter()
			.filter(|e| e.category == category)
			.collect())
	}

	/// All entries contributed by one plugin.
	pub async fn by_plugin(&self, plugin_id: &str) -> RegistryResult<Vec<RegistryEntry>> {
		Ok(self
			.list_all()
			.await?
			.into_iter()
			.filter(|e| e.plugin_id == plugin_id)
			.collect())
	}

	/// Mark one entry active.
	pub async fn activate(
		&self,
		plugin_id: &str,
		component_id: &str,
	) -> RegistryResult<RegistryEntry> {
		self.set_active(plugin_id, component_id, true).await
	}

	/// Mark one entry inactive. Existing page instances keep rendering (with
	/// a warning); new placements are refused by the editor.
	pub async fn deactivate(
		&self,
		plugin_id: &str,
		component_id: &str,
	) -> RegistryResult<RegistryEntry> {
		self.set_active(plugin_id, component_id, false).await
	}

	/// Mark every entry of a plugin inactive. Called on plugin uninstall;
	/// entries survive the plugin leaving disk.
	pub async fn deactivate_plugin(&self, plugin_id: &str) -> RegistryResult<Vec<RegistryEntry>> {
		let entries = self.by_plugin(plugin_id).await?;
		let mut updated = Vec::with_capacity(entries.len());
		for mut entry in entries {
			if entry.is_active {
				entry.is_active = false;
				self.store.upsert(entry.clone()).await?;
			}
			updated.push(entry);
		}
		debug!(plugin = plugin_id, count = updated.len(), "plugin components deactivated");
		Ok(updated)
	}

	/// Remove one entry.
	///
	/// Fails with [`RegistryError::ComponentInUse`] while any page version
	/// (active or historical) references the component.
	pub async fn unregister(&self, plugin_id: &str, component_id: &str) -> RegistryResult<()> {
		let key = ComponentKey::new(plugin_id, component_id);
		if self.store.get(&key).await?.is_none() {
			return Err(RegistryError::NotFound(key.to_string()));
		}
		let pages = self.usage.pages_using(plugin_id, component_id).await?;
		if !pages.is_empty() {
			return Err(RegistryError::ComponentInUse { pages });
		}
		self.store.delete(&key).await?;
		info!(component = %key, "component unregistered");
		Ok(())
	}

	/// Remove every entry of a plugin; fails like [`Self::unregister`] if any
	/// component is in use (nothing is removed in that case).
	pub async fn unregister_plugin(&self, plugin_id: &str) -> RegistryResult<()> {
		let entries = self.by_plugin(plugin_id).await?;
		let mut in_use = Vec::new();
		for entry in &entries {
			in_use.extend(
				self.usage
					.pages_using(&entry.plugin_id, &entry.component_id)
					.await?,
			);
		}
		if !in_use.is_empty() {
			in_use.sort_by_key(|p| p.page_id);
			in_use.dedup_by_key(|p| p.page_id);
			return Err(RegistryError::ComponentInUse { pages: in_use });
		}
		for entry in entries {
			self.store.delete(&entry.key()).await?;
		}
		Ok(())
	}

	/// Pages whose versions reference the component.
	pub async fn find_pages_using(
		&self,
		plugin_id: &str,
		component_id: &str,
	) -> RegistryResult<Vec<PageRef>> {
		self.usage.pages_using(plugin_id, component_id).await
	}

	async fn set_active(
		&self,
		plugin_id: &str,
		component_id: &str,
		active: bool,
	) -> RegistryResult<RegistryEntry> {
		let key = ComponentKey::new(plugin_id, component_id);
		let mut entry = self
			.store
			.get(&key)
			.await?
			.ok_or_else(|| RegistryError::NotFound(key.to_string()))?;
		entry.is_active = active;
		self.store.upsert(entry.clone()).await?;
		Ok(entry)
	}
}
