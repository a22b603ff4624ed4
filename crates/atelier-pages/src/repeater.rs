//! Repeater expansion
//!
//! A repeater clones its child subtree once per element of its data-source
//! array, resolving template tokens in each clone against a per-element
//! context. This is the library form of the render contract: the frontend
//! renderer performs the same expansion with the same semantics, and tests
//! exercise it here.

use serde_json::Value as JsonValue;
use tracing::warn;

use atelier_core::instance::{ComponentInstance, IteratorConfig};
use atelier_template::{DataContext, extract, resolve_props};

/// One expanded element: the cloned children plus the diffing key.
#[derive(Debug, Clone, PartialEq)]
pub struct ExpandedElement {
	/// Diffing identity: the `key_path` value when configured, else the index
	pub key: String,
	/// The repeater's children, cloned and resolved for this element
	pub children: Vec<ComponentInstance>,
}

/// Expand a repeater instance over its fetched data-source value.
///
/// Navigates `data_path` into `value` to find the array; a non-array result
/// expands to nothing (with a warning). Each element clones the repeater's
/// children and resolves every string-valued prop recursively against a
/// context binding `item` and `index` (under the configured aliases).
pub fn expand_repeater(
	repeater: &ComponentInstance,
	value: &JsonValue,
	base_ctx: &DataContext,
) -> Vec<ExpandedElement> {
	let config = repeater.iterator_config.clone().unwrap_or_default();

	let target = match &config.data_path {
		Some(path) => extract(value, path),
		None => Some(value),
	};
	let Some(JsonValue::Array(elements)) = target else {
		warn!(
			instance = %repeater.instance_id,
			data_path = config.data_path.as_deref().unwrap_or(""),
			"repeater data path did not yield an array; expanding to nothing"
		);
		return Vec::new();
	};

	elements
		.iter()
		.enumerate()
		.map(|(index, element)| {
			let mut ctx = base_ctx.for_element(element.clone(), index as i64);
			ctx.item_alias = Some(config.item_alias.clone());
			ctx.index_alias = Some(config.index_alias.clone());

			let children = repeater
				.children
				.iter()
				.map(|child| resolve_instance(child, &ctx))
				.collect();

			ExpandedElement {
				key: element_key(&config, element, index),
				children,
			}
		})
		.collect()
}

fn element_key(config: &IteratorConfig, element: &JsonValue, index: usize) -> String {
	config
		.key_path
		.as_deref()
		.and_then(|path| extract(element, path))
		.map(|key| match key {
			JsonValue::String(s) => s.clone(),
			other => other.to_string(),
		})
		.unwrap_or_else(|| index.to_string())
}

fn resolve_instance(instance: &ComponentInstance, ctx: &DataContext) -> ComponentInstance {
	let mut clone = instance.clone();
	clone.props = instance
		.props
		.iter()
		.map(|(name, value)| (name.clone(), resolve_props(value, ctx)))
		.collect();
	clone.children = instance
		.children
		.iter()
		.map(|child| resolve_instance(child, ctx))
		.collect();
	clone
}

#[cfg(test)]
mod tests {
	use super::*;
	use rstest::*;
	use serde_json::json;

	fn repeater_with_child(data_path: Option<&str>) -> ComponentInstance {
		let mut child = ComponentInstance::new("label-1", "test", "Text");
		child.parent_id = Some("rep".to_string());
		child
			.props
			.insert("label".to_string(), json!("{{item.name}}: {{item.price}}"));

		let mut repeater = ComponentInstance::new("rep", "test", "Repeater");
		repeater.iterator_config = Some(IteratorConfig {
			data_path: data_path.map(str::to_string),
			..IteratorConfig::default()
		});
		repeater.children.push(child);
		repeater
	}

	#[rstest]
	fn test_expands_one_clone_per_element() {
		// Given: a products payload and a repeater over its items
		let value = json!({"items": [{"name": "A", "price": 1.5}, {"name": "B", "price": 2}]});
		let repeater = repeater_with_child(Some("items"));

		// When
		let expanded = expand_repeater(&repeater, &value, &DataContext::new());

		// Then: two clones with resolved labels
		assert_eq!(expanded.len(), 2);
		assert_eq!(expanded[0].children[0].props["label"], json!("A: 1.5"));
		assert_eq!(expanded[1].children[0].props["label"], json!("B: 2"));
	}

	#[rstest]
	fn test_keys_default_to_index() {
		let value = json!([{"name": "A"}, {"name": "B"}]);
		let repeater = repeater_with_child(None);

		let expanded = expand_repeater(&repeater, &value, &DataContext::new());

		let keys: Vec<&str> = expanded.iter().map(|e| e.key.as_str()).collect();
		assert_eq!(keys, vec!["0", "1"]);
	}

	#[rstest]
	fn test_key_path_drives_identity() {
		let value = json!([{"sku": "X-1"}, {"sku": "X-2"}]);
		let mut repeater = repeater_with_child(None);
		repeater.iterator_config.as_mut().unwrap().key_path = Some("sku".to_string());

		let expanded = expand_repeater(&repeater, &value, &DataContext::new());

		let keys: Vec<&str> = expanded.iter().map(|e| e.key.as_str()).collect();
		assert_eq!(keys, vec!["X-1", "X-2"]);
	}

	#[rstest]
	fn test_non_array_expands_to_nothing() {
		let value = json!({"items": {"not": "an array"}});
		let repeater = repeater_with_child(Some("items"));

		let expanded = expand_repeater(&repeater, &value, &DataContext::new());

		assert!(expanded.is_empty());
	}

	#[rstest]
	fn test_index_alias_available_in_clones() {
		let value = json!(["a", "b", "c"]);
		let mut repeater = repeater_with_child(None);
		repeater.children[0]
			.props
			.insert("position".to_string(), json!("#{{index}}"));

		let expanded = expand_repeater(&repeater, &value, &DataContext::new());

		assert_eq!(expanded[2].children[0].props["position"], json!("#2"));
	}

	#[rstest]
	fn test_renamed_aliases_scope_nested_repeaters() {
		// Given: an outer repeater renaming its aliases so children can
		// still address the outer scope from inside an inner clone
		let value = json!([{"group": "G1"}]);
		let mut repeater = repeater_with_child(None);
		{
			let config = repeater.iterator_config.as_mut().unwrap();
			config.item_alias = "group".to_string();
			config.index_alias = "groupIndex".to_string();
		}
		repeater.children[0]
			.props
			.insert("label".to_string(), json!("{{group.group}}@{{groupIndex}}"));

		// When
		let expanded = expand_repeater(&repeater, &value, &DataContext::new());

		// Then
		assert_eq!(expanded[0].children[0].props["label"], json!("G1@0"));
	}

	#[rstest]
	fn test_resolution_reaches_grandchildren() {
		let value = json!([{"name": "deep"}]);
		let mut repeater = repeater_with_child(None);
		let mut grandchild = ComponentInstance::new("gc", "test", "Text");
		grandchild.parent_id = Some("label-1".to_string());
		grandchild
			.props
			.insert("text".to_string(), json!("{{item.name}}"));
		repeater.children[0].children.push(grandchild);

		let expanded = expand_repeater(&repeater, &value, &DataContext::new());

		assert_eq!(
			expanded[0].children[0].children[0].props["text"],
			json!("deep")
		);
	}
}
