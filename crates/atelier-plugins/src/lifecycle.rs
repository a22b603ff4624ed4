//! Plugin lifecycle
//!
//! The state machine per plugin id:
//!
//! ```text
//! Discovered ──load──▶ Loaded ──activate──▶ Active
//!                       ▲  │                  │
//!                       │  └──── activate ────┤
//!                       │      (Inactive) ◀───┘ deactivate
//!                       └───────uninstall──▶ Uninstalled (terminal)
//! ```
//!
//! Transitions for one plugin are serialized by its entry's async mutex;
//! different plugins transition independently. Per-plugin failures never
//! abort a directory scan. The lock order is lifecycle entry, then registry
//! transaction; no lifecycle lock is ever held across HTTP I/O.

use std::collections::HashMap;
use std::path::{Path, PathBuf};
use std::sync::Arc;
use std::time::Duration;

use chrono::{DateTime, Utc};
use parking_lot::RwLock;
use serde::Serialize;
use tokio::sync::Mutex;
use tracing::{error, info, warn};

use atelier_core::manifest::ComponentManifest;
use atelier_registry::ComponentRegistry;

use crate::context::PluginContext;
use crate::descriptor::{DESCRIPTOR_FILE, PackageMetadata, PackageReader};
use crate::error::{PluginError, PluginResult};
use crate::isolation::IsolationDomain;

/// Lifecycle state of one plugin.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum PluginState {
	/// Package seen on disk, metadata read, no code constructed
	Discovered,
	/// Entry constructed, `on_load` succeeded, components registered
	Loaded,
	/// `on_activate` succeeded
	Active,
	/// Deactivated after having been active
	Inactive,
	/// Terminal: torn down and forgotten
	Uninstalled,
}

impl std::fmt::Display for PluginState {
	fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
		let name = match self {
			PluginState::Discovered => "discovered",
			PluginState::Loaded => "loaded",
			PluginState::Active => "active",
			PluginState::Inactive => "inactive",
			PluginState::Uninstalled => "uninstalled",
		};
		f.write_str(name)
	}
}

/// Snapshot of one plugin for `list()` and the admin surface.
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct PluginStatus {
	pub plugin_id: String,
	pub state: PluginState,
	pub version: String,
	#[serde(skip_serializing_if = "Option::is_none")]
	pub loaded_at: Option<DateTime<Utc>>,
	#[serde(skip_serializing_if = "Option::is_none")]
	pub error: Option<String>,
}

struct LifecycleEntry {
	metadata: PackageMetadata,
	package_dir: PathBuf,
	state: PluginState,
	domain: Option<IsolationDomain>,
	context: PluginContext,
	manifests: Vec<ComponentManifest>,
	loaded_at: Option<DateTime<Utc>>,
	last_error: Option<String>,
}

impl LifecycleEntry {
	fn status(&self) -> PluginStatus {
		PluginStatus {
			plugin_id: self.metadata.plugin_id.clone(),
			state: self.state,
			version: self.metadata.version.to_string(),
			loaded_at: self.loaded_at,
			error: self.last_error.clone(),
		}
	}
}

/// Owns the live-plugin map and drives the state machine.
pub struct LifecycleManager {
	registry: Arc<ComponentRegistry>,
	plugin_root: PathBuf,
	validation_enabled: bool,
	entries: RwLock<HashMap<String, Arc<Mutex<LifecycleEntry>>>>,
}

impl LifecycleManager {
	/// Build a manager over the plugin root directory.
	pub fn new(registry: Arc<ComponentRegistry>, plugin_root: impl Into<PathBuf>) -> Self {
		Self {
			registry,
			plugin_root: plugin_root.into(),
			validation_enabled: true,
			entries: RwLock::new(HashMap::new()),
		}
	}

	/// Toggle manifest validation on load (`plugin.validation.enabled`).
	pub fn with_validation(mut self, enabled: bool) -> Self {
		self.validation_enabled = enabled;
		self
	}

	/// The directory packages are discovered in.
	pub fn plugin_root(&self) -> &Path {
		&self.plugin_root
	}

	/// Scan the plugin root and drive every package to `Active`.
	///
	/// Discovery is sequential; loads run concurrently, with each plugin's
	/// transitions serialized by its own lock. A failing package is recorded
	/// and skipped; the scan always continues.
	pub async fn discover_and_load_all(&self) -> PluginResult<Vec<PluginStatus>> {
		let discovered = self.discover()?;

		let activations = discovered
			.iter()
			.map(|plugin_id| self.load_and_activate(plugin_id));
		for outcome in futures::future::join_all(activations).await {
			if let Err(e) = outcome {
				// Recorded on the entry; the scan is not aborted.
				warn!(error = %e, "plugin failed to reach Active");
			}
		}
		self.list().await
	}

	/// Sequentially scan the root, reading metadata of every package
	/// directory and registering unknown ones as `Discovered`.
	fn discover(&self) -> PluginResult<Vec<String>> {
		let mut found = Vec::new();
		let read_dir = std::fs::read_dir(&self.plugin_root)?;
		let mut package_dirs: Vec<PathBuf> = read_dir
			.filter_map(|entry| entry.ok())
			.map(|entry| entry.path())
			.filter(|path| path.is_dir() && path.join(DESCRIPTOR_FILE).is_file())
			.collect();
		package_dirs.sort();

		for package_dir in package_dirs {
			match PackageReader::read_metadata(&package_dir) {
				Ok(metadata) => {
					let plugin_id = metadata.plugin_id.clone();
					if self.entries.read().contains_key(&plugin_id) {
						continue;
					}
					self.insert_discovered(metadata, package_dir);
					found.push(plugin_id);
				}
				Err(e) => {
					// A broken package never aborts the scan.
					error!(package = %package_dir.display(), error = %e, "skipping unreadable package");
				}
			}
		}
		Ok(found)
	}

	fn insert_discovered(&self, metadata: PackageMetadata, package_dir: PathBuf) {
		let context = PluginContext::new(
			metadata.plugin_id.clone(),
			metadata.version.to_string(),
			package_dir.join(crate::descriptor::DATA_DIR),
			metadata.config.clone(),
		);
		let entry = LifecycleEntry {
			metadata: metadata.clone(),
			package_dir,
			state: PluginState::Discovered,
			domain: None,
			context,
			manifests: Vec::new(),
			loaded_at: None,
			last_error: None,
		};
		self.entries
			.write()
			.insert(metadata.plugin_id, Arc::new(Mutex::new(entry)));
	}

	/// Copy a staged package into the root (atomic rename) and drive it to
	/// `Active`. On any failure the copied directory is removed again.
	pub async fn install_and_activate(&self, staged_dir: &Path) -> PluginResult<PluginStatus> {
		let metadata = PackageReader::read_metadata(staged_dir)?;
		let plugin_id = metadata.plugin_id.clone();
		if self.entries.read().contains_key(&plugin_id) {
			return Err(PluginError::MalformedPackage(format!(
				"plugin '{plugin_id}' is already installed"
			)));
		}

		std::fs::create_dir_all(&self.plugin_root)?;
		let dest = self.plugin_root.join(&plugin_id);
		std::fs::rename(staged_dir, &dest)?;

		self.insert_discovered(metadata, dest.clone());
		match self.load_and_activate(&plugin_id).await {
			Ok(status) => Ok(status),
			Err(e) => {
				self.entries.write().remove(&plugin_id);
				if let Err(cleanup) = std::fs::remove_dir_all(&dest) {
					warn!(plugin = %plugin_id, error = %cleanup, "failed to remove rejected package");
				}
				Err(e)
			}
		}
	}

	async fn load_and_activate(&self, plugin_id: &str) -> PluginResult<PluginStatus> {
		self.load(plugin_id).await?;
		self.activate(plugin_id).await
	}

	/// Drive `Discovered → Loaded`: construct the isolation domain, run
	/// `on_load`, and register the plugin's manifests.
	///
	/// A failing hook aborts the transition: the domain is torn down, the
	/// state stays `Discovered`, and the error is recorded on the entry.
	pub async fn load(&self, plugin_id: &str) -> PluginResult<PluginStatus> {
		let entry = self.entry(plugin_id)?;
		let mut entry = entry.lock().await;
		if entry.state != PluginState::Discovered {
			return Err(PluginError::InvalidTransition {
				plugin_id: plugin_id.to_string(),
				state: entry.state,
				operation: "load",
			});
		}

		let domain = match IsolationDomain::initialize(&entry.metadata, &entry.package_dir) {
			Ok(domain) => domain,
			Err(e) => {
				entry.last_error = Some(e.to_string());
				return Err(e);
			}
		};

		if let Err(hook) = domain.entry().on_load(&entry.context).await {
			let e = PluginError::LoadFailed {
				plugin_id: plugin_id.to_string(),
				reason: hook.to_string(),
			};
			entry.last_error = Some(e.to_string());
			// Domain dropped here; nothing of the package stays loaded.
			return Err(e);
		}

		let manifests = match self.collect_manifests(&entry.metadata, &domain) {
			Ok(manifests) => manifests,
			Err(e) => {
				entry.last_error = Some(e.to_string());
				return Err(e);
			}
		};

		self.registry.register_batch(manifests.clone()).await?;

		entry.domain = Some(domain);
		entry.manifests = manifests;
		entry.state = PluginState::Loaded;
		entry.loaded_at = Some(Utc::now());
		entry.last_error = None;
		info!(plugin = plugin_id, components = entry.manifests.len(), "plugin loaded");
		Ok(entry.status())
	}

	/// Drive `Loaded | Inactive → Active`.
	///
	/// A failing hook rolls the state back to where it was; registrations
	/// from load are retained so activation can be retried.
	pub async fn activate(&self, plugin_id: &str) -> PluginResult<PluginStatus> {
		let entry = self.entry(plugin_id)?;
		let mut entry = entry.lock().await;
		if !matches!(entry.state, PluginState::Loaded | PluginState::Inactive) {
			return Err(PluginError::InvalidTransition {
				plugin_id: plugin_id.to_string(),
				state: entry.state,
				operation: "activate",
			});
		}

		let domain = entry.domain.as_ref().expect("loaded plugin has a domain");
		if let Err(hook) = domain.entry().on_activate(&entry.context).await {
			let e = PluginError::ActivateFailed {
				plugin_id: plugin_id.to_string(),
				reason: hook.to_string(),
			};
			entry.last_error = Some(e.to_string());
			return Err(e);
		}

		entry.state = PluginState::Active;
		entry.last_error = None;
		info!(plugin = plugin_id, "plugin active");
		Ok(entry.status())
	}

	/// Drive `Active → Inactive`. Best-effort: a failing hook is recorded
	/// but the state still advances.
	pub async fn deactivate(&self, plugin_id: &str) -> PluginResult<PluginStatus> {
		let entry = self.entry(plugin_id)?;
		let mut entry = entry.lock().await;
		if entry.state != PluginState::Active {
			return Err(PluginError::InvalidTransition {
				plugin_id: plugin_id.to_string(),
				state: entry.state,
				operation: "deactivate",
			});
		}

		let domain = entry.domain.as_ref().expect("active plugin has a domain");
		if let Err(hook) = domain.entry().on_deactivate(&entry.context).await {
			warn!(plugin = plugin_id, error = %hook, "on_deactivate failed; deactivating anyway");
			entry.last_error = Some(hook.to_string());
		}

		entry.state = PluginState::Inactive;
		info!(plugin = plugin_id, "plugin inactive");
		Ok(entry.status())
	}

	/// Drive any live state to `Uninstalled` (terminal).
	///
	/// An active plugin is deactivated first. Shutdown hooks are
	/// best-effort. The plugin's registry entries are marked inactive (never
	/// deleted while pages reference them) and the map entry is cleared so
	/// the package's code can be collected.
	pub async fn uninstall(&self, plugin_id: &str) -> PluginResult<()> {
		let entry_arc = self.entry(plugin_id)?;
		{
			let mut entry = entry_arc.lock().await;
			if entry.state == PluginState::Uninstalled {
				return Err(PluginError::InvalidTransition {
					plugin_id: plugin_id.to_string(),
					state: entry.state,
					operation: "uninstall",
				});
			}

			if let Some(domain) = entry.domain.as_ref() {
				if entry.state == PluginState::Active {
					if let Err(hook) = domain.entry().on_deactivate(&entry.context).await {
						warn!(plugin = plugin_id, error = %hook, "on_deactivate failed during uninstall");
					}
				}
				if let Err(hook) = domain.entry().on_uninstall(&entry.context).await {
					warn!(plugin = plugin_id, error = %hook, "on_uninstall failed; continuing");
				}
			}

			entry.domain = None;
			entry.manifests.clear();
			entry.state = PluginState::Uninstalled;
		}

		self.registry.deactivate_plugin(plugin_id).await?;
		self.entries.write().remove(plugin_id);
		info!(plugin = plugin_id, "plugin uninstalled");
		Ok(())
	}

	/// Snapshot of every known plugin.
	pub async fn list(&self) -> PluginResult<Vec<PluginStatus>> {
		let entries: Vec<_> = self.entries.read().values().cloned().collect();
		let mut statuses = Vec::with_capacity(entries.len());
		for entry in entries {
			statuses.push(entry.lock().await.status());
		}
		statuses.sort_by(|a, b| a.plugin_id.cmp(&b.plugin_id));
		Ok(statuses)
	}

	/// One plugin's snapshot.
	pub async fn status(&self, plugin_id: &str) -> PluginResult<PluginStatus> {
		let entry = self.entry(plugin_id)?;
		let entry = entry.lock().await;
		Ok(entry.status())
	}

	/// Periodically rescan the plugin root, loading packages that appeared
	/// since the last scan. Packages removed from disk are NOT uninstalled.
	pub fn spawn_hot_reload(self: Arc<Self>, interval: Duration) -> tokio::task::JoinHandle<()> {
		tokio::spawn(async move {
			loop {
				tokio::time::sleep(interval).await;
				if let Err(e) = self.discover_and_load_all().await {
					error!(error = %e, "hot-reload scan failed");
				}
			}
		})
	}

	fn entry(&self, plugin_id: &str) -> PluginResult<Arc<Mutex<LifecycleEntry>>> {
		self.entries
			.read()
			.get(plugin_id)
			.cloned()
			.ok_or_else(|| PluginError::NotFound(plugin_id.to_string()))
	}

	/// Merge descriptor-declared manifests with the entry object's, the
	/// entry winning on key collisions, and enforce plugin identity.
	fn collect_manifests(
		&self,
		metadata: &PackageMetadata,
		domain: &IsolationDomain,
	) -> PluginResult<Vec<ComponentManifest>> {
		let mut by_key: HashMap<_, ComponentManifest> = metadata
			.components
			.iter()
			.map(|m| (m.key(), m.clone()))
			.collect();
		for manifest in domain.entry().component_manifests() {
			if manifest.plugin_id != metadata.plugin_id {
				return Err(PluginError::LoadFailed {
					plugin_id: metadata.plugin_id.clone(),
					reason: format!(
						"entry contributed a manifest for foreign plugin '{}'",
						manifest.plugin_id
					),
				});
			}
			by_key.insert(manifest.key(), manifest);
		}

		let mut manifests: Vec<_> = by_key.into_values().collect();
		manifests.sort_by_key(|m| m.key());

		if self.validation_enabled {
			for manifest in &manifests {
				manifest.validate().map_err(|e| PluginError::LoadFailed {
					plugin_id: metadata.plugin_id.clone(),
					reason: format!("manifest '{}': {e}", manifest.component_id),
				})?;
			}
		}
		Ok(manifests)
	}
}
