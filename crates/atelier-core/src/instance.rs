//! Component instances
//!
//! A page's content is a tree of component instances. The persisted form is
//! one JSON blob per page version; the in-memory form is parent-to-children
//! only, with `parent_id` kept on children for validation.

use serde::{Deserialize, Serialize};
use serde_json::Value as JsonValue;
use std::collections::BTreeMap;

use crate::datasource::DataSourceConfig;

/// Configuration of a repeater component: where the array lives in its data
/// source and the aliases its children's template tokens use.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct IteratorConfig {
	/// Path into the data-source value yielding the array; absent = the
	/// value itself
	#[serde(default, skip_serializing_if = "Option::is_none")]
	pub data_path: Option<String>,
	/// Root identifier bound to the current element
	#[serde(default = "default_item_alias")]
	pub item_alias: String,
	/// Root identifier bound to the current position
	#[serde(default = "default_index_alias")]
	pub index_alias: String,
	/// Path into each element yielding its diffing key; absent = index
	#[serde(default, skip_serializing_if = "Option::is_none")]
	pub key_path: Option<String>,
}

impl Default for IteratorConfig {
	fn default() -> Self {
		Self {
			data_path: None,
			item_alias: default_item_alias(),
			index_alias: default_index_alias(),
			key_path: None,
		}
	}
}

fn default_item_alias() -> String {
	"item".to_string()
}

fn default_index_alias() -> String {
	"index".to_string()
}

/// One node in a page tree.
///
/// `instance_id` is unique per page; siblings are totally ordered by
/// `(display_order, instance_id)`. String-valued props may carry `{{path}}`
/// template tokens resolved by the frontend renderer.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ComponentInstance {
	/// Identifier unique within the page
	pub instance_id: String,
	/// Owning plugin of the referenced component
	pub plugin_id: String,
	/// Referenced component
	pub component_id: String,
	/// Parent instance; `None` for root children of the page
	#[serde(default, skip_serializing_if = "Option::is_none")]
	pub parent_id: Option<String>,
	/// Sibling sort key
	#[serde(default)]
	pub display_order: i32,
	/// CSS position string
	#[serde(default, skip_serializing_if = "Option::is_none")]
	pub position: Option<String>,
	/// CSS size string
	#[serde(default, skip_serializing_if = "Option::is_none")]
	pub size: Option<String>,
	/// Prop values, possibly containing template tokens
	#[serde(default)]
	pub props: BTreeMap<String, JsonValue>,
	/// Style overrides
	#[serde(default)]
	pub styles: BTreeMap<String, String>,
	/// Child instances
	#[serde(default, skip_serializing_if = "Vec::is_empty")]
	pub children: Vec<ComponentInstance>,
	/// Data source consumed by this instance
	#[serde(default, skip_serializing_if = "Option::is_none")]
	pub data_source: Option<DataSourceConfig>,
	/// Repeater configuration
	#[serde(default, skip_serializing_if = "Option::is_none")]
	pub iterator_config: Option<IteratorConfig>,
	/// Event bindings, persisted as opaque JSON
	#[serde(default, skip_serializing_if = "Option::is_none")]
	pub events: Option<JsonValue>,
	/// PageLayout region this child opts into
	#[serde(default, skip_serializing_if = "Option::is_none")]
	pub slot: Option<String>,
}

impl ComponentInstance {
	/// Minimal instance referencing `(plugin_id, component_id)`.
	pub fn new(
		instance_id: impl Into<String>,
		plugin_id: impl Into<String>,
		component_id: impl Into<String>,
	) -> Self {
		Self {
			instance_id: instance_id.into(),
			plugin_id: plugin_id.into(),
			component_id: component_id.into(),
			parent_id: None,
			display_order: 0,
			position: None,
			size: None,
			props: BTreeMap::new(),
			styles: BTreeMap::new(),
			children: Vec::new(),
			data_source: None,
			iterator_config: None,
			events: None,
			slot: None,
		}
	}

	/// Depth-first iteration over this instance and all descendants.
	pub fn walk(&self) -> impl Iterator<Item = &ComponentInstance> {
		let mut stack = vec![self];
		std::iter::from_fn(move || {
			let node = stack.pop()?;
			stack.extend(node.children.iter().rev());
			Some(node)
		})
	}

	/// Sort `children` in place by `(display_order, instance_id)`, recursively.
	pub fn sort_children(&mut self) {
		self.children
			.sort_by(|a, b| (a.display_order, &a.instance_id).cmp(&(b.display_order, &b.instance_id)));
		for child in &mut self.children {
			child.sort_children();
		}
	}
}
