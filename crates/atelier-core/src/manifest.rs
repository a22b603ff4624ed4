//! Component manifests
//!
//! A manifest describes one component type contributed by a plugin: its
//! identity, editable props and styles, size constraints, capabilities, and
//! which child categories it accepts. Manifests are immutable per plugin
//! version and `(plugin_id, component_id)` is globally unique.

use std::collections::BTreeMap;
use std::collections::BTreeSet;

use serde::{Deserialize, Serialize};
use serde_json::Value as JsonValue;

use crate::category::ComponentCategory;
use crate::error::{ValidationError, ValidationResult};

/// Globally unique component identity: `(plugin_id, component_id)`.
#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub struct ComponentKey {
	/// Owning plugin identifier
	pub plugin_id: String,
	/// Component identifier, unique within the plugin
	pub component_id: String,
}

impl ComponentKey {
	/// Create a new key.
	pub fn new(plugin_id: impl Into<String>, component_id: impl Into<String>) -> Self {
		Self {
			plugin_id: plugin_id.into(),
			component_id: component_id.into(),
		}
	}
}

impl std::fmt::Display for ComponentKey {
	fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
		write!(f, "{}/{}", self.plugin_id, self.component_id)
	}
}

/// Type of a configurable prop, driving the editor widget shown for it.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum PropType {
	String,
	Number,
	Boolean,
	Select,
	Color,
	Url,
	Image,
	RichText,
	Json,
}

/// One choice offered by a [`PropType::Select`] prop.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SelectOption {
	/// Stored value
	pub value: JsonValue,
	/// Label shown in the editor
	pub label: String,
}

/// Definition of one editable prop.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PropDefinition {
	/// Prop name as it appears in instance `props`
	pub name: String,
	/// Editor widget type
	#[serde(rename = "type")]
	pub prop_type: PropType,
	/// Human-readable label
	pub label: String,
	/// Value used when an instance does not override the prop
	#[serde(default, skip_serializing_if = "Option::is_none")]
	pub default_value: Option<JsonValue>,
	/// Whether the editor requires a value
	#[serde(default)]
	pub required: bool,
	/// Choices, required iff `prop_type` is `Select`
	#[serde(default, skip_serializing_if = "Option::is_none")]
	pub options: Option<Vec<SelectOption>>,
	/// Hint shown next to the editor widget
	#[serde(default, skip_serializing_if = "Option::is_none")]
	pub help_text: Option<String>,
}

/// Type of a configurable style, driving the editor widget shown for it.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum StyleType {
	Size,
	Color,
	Select,
	Number,
	Shadow,
	Border,
	Spacing,
}

/// Definition of one editable style property.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct StyleDefinition {
	/// CSS property name
	pub property: String,
	/// Editor widget type
	#[serde(rename = "type")]
	pub style_type: StyleType,
	/// Human-readable label
	pub label: String,
	/// Value used when an instance does not override the style
	#[serde(default, skip_serializing_if = "Option::is_none")]
	pub default_value: Option<String>,
	/// Units the editor may offer (e.g. `px`, `%`, `rem`)
	#[serde(default, skip_serializing_if = "Option::is_none")]
	pub allowed_units: Option<Vec<String>>,
	/// Editor grouping (e.g. "Dimensions", "Appearance")
	pub category: String,
}

/// Size constraints of a component. Values are CSS length strings.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SizeConstraints {
	/// Whether the editor allows free resizing
	#[serde(default = "default_true")]
	pub resizable: bool,
	#[serde(default, skip_serializing_if = "Option::is_none")]
	pub default_width: Option<String>,
	#[serde(default, skip_serializing_if = "Option::is_none")]
	pub default_height: Option<String>,
	#[serde(default, skip_serializing_if = "Option::is_none")]
	pub min_width: Option<String>,
	#[serde(default, skip_serializing_if = "Option::is_none")]
	pub max_width: Option<String>,
	#[serde(default, skip_serializing_if = "Option::is_none")]
	pub min_height: Option<String>,
	#[serde(default, skip_serializing_if = "Option::is_none")]
	pub max_height: Option<String>,
	#[serde(default)]
	pub width_locked: bool,
	#[serde(default)]
	pub height_locked: bool,
	#[serde(default)]
	pub maintain_aspect_ratio: bool,
}

impl Default for SizeConstraints {
	fn default() -> Self {
		Self {
			resizable: true,
			default_width: None,
			default_height: None,
			min_width: None,
			max_width: None,
			min_height: None,
			max_height: None,
			width_locked: false,
			height_locked: false,
			maintain_aspect_ratio: false,
		}
	}
}

/// Capability flags of a component.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ComponentCapabilities {
	/// Whether instances may carry a non-empty `children` sequence
	#[serde(default)]
	pub can_have_children: bool,
	/// Whether the component is a layout container
	#[serde(default)]
	pub is_container: bool,
	/// Whether the component consumes a data source
	#[serde(default)]
	pub has_data_source: bool,
	/// Whether the component grows with its content
	#[serde(default)]
	pub auto_height: bool,
	/// Whether the editor offers resize handles
	#[serde(default)]
	pub is_resizable: bool,
	/// Whether string props may carry `{{path}}` tokens
	#[serde(default)]
	pub supports_template_bindings: bool,
}

fn default_true() -> bool {
	true
}

/// Immutable metadata describing one component type contributed by a plugin.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ComponentManifest {
	/// Stable owning-plugin identifier
	pub plugin_id: String,
	/// Semver version of the owning plugin
	pub plugin_version: String,
	/// Component identifier, unique within the plugin
	pub component_id: String,
	/// Catalog display name
	pub display_name: String,
	/// Catalog category
	pub category: ComponentCategory,
	/// Icon identifier shown in the catalog
	#[serde(default, skip_serializing_if = "Option::is_none")]
	pub icon: Option<String>,
	/// Catalog description
	#[serde(default, skip_serializing_if = "Option::is_none")]
	pub description: Option<String>,
	/// Props applied to new instances
	#[serde(default)]
	pub default_props: BTreeMap<String, JsonValue>,
	/// Styles applied to new instances
	#[serde(default)]
	pub default_styles: BTreeMap<String, String>,
	/// Editable props, in editor display order
	#[serde(default)]
	pub configurable_props: Vec<PropDefinition>,
	/// Editable styles, in editor display order
	#[serde(default)]
	pub configurable_styles: Vec<StyleDefinition>,
	/// Size constraints
	#[serde(default)]
	pub size_constraints: SizeConstraints,
	/// Capability flags
	#[serde(default)]
	pub capabilities: ComponentCapabilities,
	/// Categories accepted as children; `None` accepts any
	#[serde(default, skip_serializing_if = "Option::is_none")]
	pub allowed_child_types: Option<BTreeSet<ComponentCategory>>,
	/// Renderer bundle path, opaque to the host
	#[serde(default, skip_serializing_if = "Option::is_none")]
	pub react_component_path: Option<String>,
}

impl ComponentManifest {
	/// The `(plugin_id, component_id)` identity of this manifest.
	pub fn key(&self) -> ComponentKey {
		ComponentKey::new(self.plugin_id.clone(), self.component_id.clone())
	}

	/// Validate internal consistency.
	///
	/// Checks identity fields are non-empty, the plugin version parses as
	/// semver, and every `Select` prop carries options (and only `Select`
	/// props do).
	pub fn validate(&self) -> ValidationResult<()> {
		if self.plugin_id.trim().is_empty() {
			return Err(ValidationError::MissingField("pluginId"));
		}
		if self.component_id.trim().is_empty() {
			return Err(ValidationError::MissingField("componentId"));
		}
		if self.display_name.trim().is_empty() {
			return Err(ValidationError::MissingField("displayName"));
		}
		if semver::Version::parse(&self.plugin_version).is_err() {
			return Err(ValidationError::InvalidField {
				field: "pluginVersion",
				reason: format!("'{}' is not a valid semver version", self.plugin_version),
			});
		}
		for prop in &self.configurable_props {
			let has_options = prop.options.as_ref().is_some_and(|o| !o.is_empty());
			if prop.prop_type == PropType::Select && !has_options {
				return Err(ValidationError::InvalidField {
					field: "configurableProps",
					reason: format!("SELECT prop '{}' must declare options", prop.name),
				});
			}
			if prop.prop_type != PropType::Select && prop.options.is_some() {
				return Err(ValidationError::InvalidField {
					field: "configurableProps",
					reason: format!("prop '{}' declares options but is not SELECT", prop.name),
				});
			}
		}
		Ok(())
	}
}
