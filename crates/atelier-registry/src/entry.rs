//! Registry entries
//!
//! An entry is the persistent projection of a component manifest: the
//! catalog columns plus the manifest blob and an activation flag.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use atelier_core::category::ComponentCategory;
use atelier_core::manifest::{ComponentKey, ComponentManifest};

/// Persistent projection of a [`ComponentManifest`].
///
/// Created when a plugin loads; updated in place when the same
/// `(plugin_id, component_id)` registers again; deleted only when no page
/// version references the component.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RegistryEntry {
	/// Row identifier
	pub id: Uuid,
	/// Owning plugin
	pub plugin_id: String,
	/// Component identifier within the plugin
	pub component_id: String,
	/// Catalog display name (denormalized from the manifest)
	pub component_name: String,
	/// Catalog category (denormalized from the manifest)
	pub category: ComponentCategory,
	/// Icon identifier, if the manifest declares one
	#[serde(default, skip_serializing_if = "Option::is_none")]
	pub icon: Option<String>,
	/// The full manifest
	pub manifest: ComponentManifest,
	/// Renderer bundle path, opaque to the host
	#[serde(default, skip_serializing_if = "Option::is_none")]
	pub react_bundle_path: Option<String>,
	/// Whether instances of this component may be newly placed on pages
	pub is_active: bool,
	/// First registration time; preserved across re-registration
	pub registered_at: DateTime<Utc>,
}

impl RegistryEntry {
	/// Build a fresh entry from a manifest.
	pub fn from_manifest(manifest: ComponentManifest) -> Self {
		Self {
			id: Uuid::new_v4(),
			plugin_id: manifest.plugin_id.clone(),
			component_id: manifest.component_id.clone(),
			component_name: manifest.display_name.clone(),
			category: manifest.category,
			icon: manifest.icon.clone(),
			react_bundle_path: manifest.react_component_path.clone(),
			is_active: true,
			registered_at: Utc::now(),
			manifest,
		}
	}

	/// The `(plugin_id, component_id)` identity of this entry.
	pub fn key(&self) -> ComponentKey {
		ComponentKey::new(self.plugin_id.clone(), self.component_id.clone())
	}

	/// Replace the manifest while keeping row identity and first-registration
	/// time. Reactivates the entry.
	pub fn updated_from(&self, manifest: ComponentManifest) -> Self {
		Self {
			id: self.id,
			plugin_id: manifest.plugin_id.clone(),
			component_id: manifest.component_id.clone(),
			component_name: manifest.display_name.clone(),
			category: manifest.category,
			icon: manifest.icon.clone(),
			react_bundle_path: manifest.react_component_path.clone(),
			is_active: true,
			registered_at: self.registered_at,
			manifest,
		}
	}
}
