//! Integration test utilities for Atelier
//!
//! Shared fixtures for end-to-end tests across the platform crates: a
//! component-kit plugin registered in this binary's factory table, package
//! writers, and a fully wired [`AppState`].

use std::collections::BTreeMap;
use std::path::Path;

use async_trait::async_trait;

use atelier_core::category::ComponentCategory;
use atelier_core::manifest::{ComponentCapabilities, ComponentManifest};
use atelier_plugins::{EntryFactory, HookError, PluginContext, PluginEntry};
use atelier_server::{AppState, ServerConfig};

/// The plugin id every kit fixture package uses.
pub const KIT_PLUGIN_ID: &str = "test";

/// Manifest of the kit's plain row component.
pub fn row_manifest() -> ComponentManifest {
	ComponentManifest {
		plugin_id: KIT_PLUGIN_ID.to_string(),
		plugin_version: "1.0.0".to_string(),
		component_id: "HorizontalRow".to_string(),
		display_name: "Horizontal Row".to_string(),
		category: ComponentCategory::Ui,
		icon: Some("rows".to_string()),
		description: Some("Lays children out in a row".to_string()),
		default_props: BTreeMap::new(),
		default_styles: BTreeMap::from([("display".to_string(), "flex".to_string())]),
		configurable_props: Vec::new(),
		configurable_styles: Vec::new(),
		size_constraints: Default::default(),
		capabilities: ComponentCapabilities {
			can_have_children: true,
			is_container: true,
			..Default::default()
		},
		allowed_child_types: None,
		react_component_path: Some("bundles/row.js".to_string()),
	}
}

/// Manifest of the kit's repeater component.
pub fn repeater_manifest() -> ComponentManifest {
	ComponentManifest {
		plugin_id: KIT_PLUGIN_ID.to_string(),
		plugin_version: "1.0.0".to_string(),
		component_id: "ProductList".to_string(),
		display_name: "Product List".to_string(),
		category: ComponentCategory::Data,
		icon: None,
		description: None,
		default_props: BTreeMap::new(),
		default_styles: BTreeMap::new(),
		configurable_props: Vec::new(),
		configurable_styles: Vec::new(),
		size_constraints: Default::default(),
		capabilities: ComponentCapabilities {
			can_have_children: true,
			has_data_source: true,
			supports_template_bindings: true,
			..Default::default()
		},
		allowed_child_types: None,
		react_component_path: None,
	}
}

/// Entry object of the kit fixture plugin.
pub struct KitEntry;

#[async_trait]
impl PluginEntry for KitEntry {
	async fn on_load(&self, ctx: &PluginContext) -> Result<(), HookError> {
		ctx.log_info("component kit loaded");
		Ok(())
	}

	fn component_manifests(&self) -> Vec<ComponentManifest> {
		vec![row_manifest(), repeater_manifest()]
	}
}

inventory::submit! {
	EntryFactory::new("test::KitEntry", || Box::new(KitEntry))
}

/// Write a kit package directory under `root`.
pub fn write_kit_package(root: &Path) {
	let package_dir = root.join(KIT_PLUGIN_ID);
	std::fs::create_dir_all(package_dir.join("thumbnails")).expect("package dirs");
	std::fs::write(
		package_dir.join("plugin.toml"),
		format!(
			r#"
[plugin]
id = "{KIT_PLUGIN_ID}"
version = "1.0.0"
main_class = "test::KitEntry"
type = "component"
description = "Integration test component kit"
"#
		),
	)
	.expect("descriptor");
	std::fs::write(package_dir.join("thumbnails/row.png"), b"png").expect("thumbnail");
}

/// A fully wired platform over a plugin root, with in-memory stores.
pub fn platform(plugin_root: &Path) -> AppState {
	let mut config = ServerConfig::default();
	config.plugin.directory = plugin_root.to_path_buf();
	AppState::new(config)
}
