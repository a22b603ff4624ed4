//! Package descriptors
//!
//! A package is a directory dropped into the plugin root. It carries a
//! `plugin.toml` descriptor naming the plugin, its version, its entry class,
//! and optionally the component manifests it contributes, plus resource
//! files (renderer bundles, `thumbnails/`). Reading a descriptor never loads
//! code.
//!
//! ```toml
//! [plugin]
//! id = "test"
//! version = "1.0.0"
//! main_class = "test::Entry"
//! type = "component"
//! description = "Demo components"
//!
//! [plugin.dependencies]
//! base-kit = ">=1.0"
//!
//! [[component]]
//! componentId = "HorizontalRow"
//! displayName = "Horizontal Row"
//! category = "ui"
//! ```

use std::collections::BTreeMap;
use std::path::{Path, PathBuf};

use serde::{Deserialize, Serialize};

use atelier_core::manifest::ComponentManifest;

use crate::error::{PluginError, PluginResult};

/// File name of the descriptor inside a package directory.
pub const DESCRIPTOR_FILE: &str = "plugin.toml";

/// Directory inside a package reserved for the plugin's private state.
pub const DATA_DIR: &str = "data";

/// Recognized package kinds.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum PluginType {
	/// Contributes UI component manifests
	Component,
	/// Contributes server-side request handlers
	Handler,
	/// Contributes persistence extensions
	Persistence,
}

/// Parsed package metadata.
#[derive(Debug, Clone, PartialEq)]
pub struct PackageMetadata {
	/// Stable plugin identifier
	pub plugin_id: String,
	/// Package version
	pub version: semver::Version,
	/// Author, if declared
	pub author: Option<String>,
	/// Description, if declared
	pub description: Option<String>,
	/// Factory-table key of the entry object
	pub main_class: String,
	/// Package kind
	pub plugin_type: PluginType,
	/// Declared dependencies: plugin id to semver requirement
	pub dependencies: BTreeMap<String, semver::VersionReq>,
	/// Per-plugin configuration handed to lifecycle hooks
	pub config: BTreeMap<String, serde_json::Value>,
	/// Component manifests declared in the descriptor itself
	pub components: Vec<ComponentManifest>,
}

#[derive(Deserialize)]
struct RawDescriptor {
	plugin: RawPlugin,
	#[serde(default)]
	component: Vec<toml::Value>,
}

#[derive(Deserialize)]
struct RawPlugin {
	id: String,
	version: String,
	main_class: String,
	#[serde(rename = "type")]
	plugin_type: String,
	#[serde(default)]
	author: Option<String>,
	#[serde(default)]
	description: Option<String>,
	#[serde(default)]
	dependencies: BTreeMap<String, String>,
	#[serde(default)]
	config: toml::Table,
}

/// Reads package directories without loading any code.
pub struct PackageReader;

impl PackageReader {
	/// Read and validate the descriptor of a package directory.
	pub fn read_metadata(package_dir: &Path) -> PluginResult<PackageMetadata> {
		let descriptor_path = package_dir.join(DESCRIPTOR_FILE);
		let raw_text = std::fs::read_to_string(&descriptor_path).map_err(|e| {
			PluginError::MalformedPackage(format!(
				"descriptor {} unreadable: {e}",
				descriptor_path.display()
			))
		})?;

		// Syntax errors are malformed packages; shape errors are schema
		// violations.
		let value: toml::Value = toml::from_str(&raw_text)
			.map_err(|e| PluginError::MalformedPackage(format!("descriptor not valid TOML: {e}")))?;
		let raw: RawDescriptor = value
			.try_into()
			.map_err(|e| PluginError::SchemaViolation(e.to_string()))?;

		if raw.plugin.id.trim().is_empty() {
			return Err(PluginError::SchemaViolation(
				"plugin.id must not be empty".to_string(),
			));
		}
		if raw.plugin.main_class.trim().is_empty() {
			return Err(PluginError::SchemaViolation(
				"plugin.main_class must not be empty".to_string(),
			));
		}

		let version = semver::Version::parse(&raw.plugin.version).map_err(|e| {
			PluginError::SchemaViolation(format!(
				"plugin.version '{}' is not semver: {e}",
				raw.plugin.version
			))
		})?;

		let plugin_type = match raw.plugin.plugin_type.as_str() {
			"component" => PluginType::Component,
			"handler" => PluginType::Handler,
			"persistence" => PluginType::Persistence,
			other => return Err(PluginError::UnsupportedType(other.to_string())),
		};

		let mut dependencies = BTreeMap::new();
		for (dep_id, req) in raw.plugin.dependencies {
			let req = semver::VersionReq::parse(&req).map_err(|e| {
				PluginError::SchemaViolation(format!(
					"dependency '{dep_id}' requirement '{req}' is not semver: {e}"
				))
			})?;
			dependencies.insert(dep_id, req);
		}

		let mut config = BTreeMap::new();
		for (key, value) in raw.plugin.config {
			let value = serde_json::to_value(&value)
				.map_err(|e| PluginError::SchemaViolation(format!("plugin.config.{key}: {e}")))?;
			config.insert(key, value);
		}

		let components = raw
			.component
			.into_iter()
			.map(|value| parse_component(value, &raw.plugin.id, &raw.plugin.version))
			.collect::<PluginResult<Vec<_>>>()?;

		Ok(PackageMetadata {
			plugin_id: raw.plugin.id,
			version,
			author: raw.plugin.author,
			description: raw.plugin.description,
			main_class: raw.plugin.main_class,
			plugin_type,
			dependencies,
			config,
			components,
		})
	}

	/// Relative paths of the package's resource files: everything except
	/// the descriptor and the private data directory.
	pub fn list_resources(package_dir: &Path) -> PluginResult<Vec<String>> {
		let mut resources = Vec::new();
		let mut stack = vec![PathBuf::new()];
		while let Some(relative) = stack.pop() {
			let dir = package_dir.join(&relative);
			for dir_entry in std::fs::read_dir(&dir)? {
				let dir_entry = dir_entry?;
				let child = relative.join(dir_entry.file_name());
				if dir_entry.file_type()?.is_dir() {
					if relative.as_os_str().is_empty()
						&& dir_entry.file_name().to_str() == Some(DATA_DIR)
					{
						continue;
					}
					stack.push(child);
				} else if child.as_os_str().to_str() != Some(DESCRIPTOR_FILE) {
					resources.push(child.to_string_lossy().replace('\\', "/"));
				}
			}
		}
		resources.sort();
		Ok(resources)
	}
}

/// Descriptor-declared manifests may omit the plugin identity; it is
/// injected from the `[plugin]` block before parsing.
fn parse_component(
	value: toml::Value,
	plugin_id: &str,
	plugin_version: &str,
) -> PluginResult<ComponentManifest> {
	let mut json = serde_json::to_value(&value)
		.map_err(|e| PluginError::SchemaViolation(format!("component block: {e}")))?;
	if let Some(map) = json.as_object_mut() {
		map.entry("pluginId")
			.or_insert_with(|| serde_json::Value::from(plugin_id));
		map.entry("pluginVersion")
			.or_insert_with(|| serde_json::Value::from(plugin_version));
	}
	let manifest: ComponentManifest = serde_json::from_value(json)
		.map_err(|e| PluginError::SchemaViolation(format!("component block: {e}")))?;
	if manifest.plugin_id != plugin_id {
		return Err(PluginError::SchemaViolation(format!(
			"component '{}' declares pluginId '{}' but the package is '{}'",
			manifest.component_id, manifest.plugin_id, plugin_id
		)));
	}
	Ok(manifest)
}
