//! Page trees
//!
//! The parsed form of a version's JSON blob, structural validation, and
//! PageLayout slot routing.

use std::collections::{BTreeMap, HashMap, HashSet};

use serde::{Deserialize, Serialize};

use atelier_core::instance::ComponentInstance;
use atelier_core::manifest::{ComponentKey, ComponentManifest};

use crate::error::{PageError, PageResult};

/// The tree of component instances stored inside one page version.
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PageTree {
	/// Root children of the page, ordered by `(display_order, instance_id)`
	#[serde(default)]
	pub components: Vec<ComponentInstance>,
}

/// The five PageLayout regions.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum SlotName {
	Header,
	Footer,
	Left,
	Right,
	Center,
}

impl SlotName {
	fn parse(value: &str) -> Option<Self> {
		match value {
			"header" => Some(SlotName::Header),
			"footer" => Some(SlotName::Footer),
			"left" => Some(SlotName::Left),
			"right" => Some(SlotName::Right),
			"center" => Some(SlotName::Center),
			_ => None,
		}
	}
}

impl PageTree {
	/// Parse a version's stored JSON blob.
	pub fn from_json(json: &str) -> PageResult<Self> {
		serde_json::from_str(json).map_err(|e| PageError::InvalidTree(e.to_string()))
	}

	/// Serialize for storage.
	pub fn to_json(&self) -> PageResult<String> {
		serde_json::to_string(self).map_err(|e| PageError::InvalidTree(e.to_string()))
	}

	/// Depth-first iteration over every instance in the tree.
	pub fn walk(&self) -> impl Iterator<Item = &ComponentInstance> {
		self.components.iter().flat_map(|root| root.walk())
	}

	/// The distinct `(plugin_id, component_id)` keys referenced by the tree.
	pub fn referenced_keys(&self) -> Vec<ComponentKey> {
		let mut keys: Vec<ComponentKey> = self
			.walk()
			.map(|node| ComponentKey::new(node.plugin_id.clone(), node.component_id.clone()))
			.collect();
		keys.sort();
		keys.dedup();
		keys
	}

	/// Whether any instance in the tree references the component.
	pub fn references(&self, plugin_id: &str, component_id: &str) -> bool {
		self.walk()
			.any(|node| node.plugin_id == plugin_id && node.component_id == component_id)
	}

	/// Structural validation: unique instance ids and consistent parent
	/// pointers throughout the tree.
	pub fn validate_structure(&self) -> PageResult<()> {
		let mut seen = HashSet::new();
		for root in &self.components {
			if root.parent_id.is_some() {
				return Err(PageError::InvalidTree(format!(
					"root instance '{}' carries a parentId",
					root.instance_id
				)));
			}
			validate_node(root, &mut seen)?;
		}
		Ok(())
	}

	/// Manifest-aware validation: child capability and category acceptance.
	///
	/// `manifests` maps referenced keys to their manifests; unknown keys are
	/// skipped here (the orchestrator reports them as warnings instead).
	pub fn validate_against_manifests(
		&self,
		manifests: &HashMap<ComponentKey, ComponentManifest>,
	) -> PageResult<()> {
		for node in self.walk() {
			let key = ComponentKey::new(node.plugin_id.clone(), node.component_id.clone());
			let Some(manifest) = manifests.get(&key) else {
				continue;
			};
			if !manifest.capabilities.can_have_children && !node.children.is_empty() {
				return Err(PageError::InvalidTree(format!(
					"component {key} cannot have children but instance '{}' has {}",
					node.instance_id,
					node.children.len()
				)));
			}
			if let Some(allowed) = &manifest.allowed_child_types {
				for child in &node.children {
					let child_key =
						ComponentKey::new(child.plugin_id.clone(), child.component_id.clone());
					let Some(child_manifest) = manifests.get(&child_key) else {
						continue;
					};
					if !allowed.contains(&child_manifest.category) {
						return Err(PageError::InvalidTree(format!(
							"component {key} does not accept '{}' children (instance '{}')",
							child_manifest.category, child.instance_id
						)));
					}
				}
			}
		}
		Ok(())
	}
}

fn validate_node<'a>(
	node: &'a ComponentInstance,
	seen: &mut HashSet<&'a str>,
) -> PageResult<()> {
	if !seen.insert(node.instance_id.as_str()) {
		return Err(PageError::InvalidTree(format!(
			"duplicate instance id '{}'",
			node.instance_id
		)));
	}
	for child in &node.children {
		if child.parent_id.as_deref() != Some(node.instance_id.as_str()) {
			return Err(PageError::InvalidTree(format!(
				"instance '{}' is a child of '{}' but its parentId says {:?}",
				child.instance_id, node.instance_id, child.parent_id
			)));
		}
		validate_node(child, seen)?;
	}
	Ok(())
}

/// Route a PageLayout's children into named regions.
///
/// Children without a `slot` prop land in `center`, as do children naming
/// an unknown region. Empty regions are omitted; the renderer expands
/// adjacent regions into freed space.
pub fn route_slots(layout: &ComponentInstance) -> BTreeMap<SlotName, Vec<&ComponentInstance>> {
	let mut regions: BTreeMap<SlotName, Vec<&ComponentInstance>> = BTreeMap::new();
	for child in &layout.children {
		let slot = child
			.slot
			.as_deref()
			.and_then(SlotName::parse)
			.unwrap_or(SlotName::Center);
		regions.entry(slot).or_default().push(child);
	}
	regions
}

#[cfg(test)]
mod tests {
	use super::*;
	use rstest::*;

	fn child_of(parent: &str, id: &str) -> ComponentInstance {
		let mut c = ComponentInstance::new(id, "test", "Text");
		c.parent_id = Some(parent.to_string());
		c
	}

	#[rstest]
	fn test_round_trip_preserves_bytes_semantics() {
		// Given: a tree with one root and one child
		let mut root = ComponentInstance::new("a", "test", "Row");
		root.children.push(child_of("a", "b"));
		let tree = PageTree {
			components: vec![root],
		};

		// When: serializing and parsing back
		let json = tree.to_json().unwrap();
		let back = PageTree::from_json(&json).unwrap();

		// Then
		assert_eq!(back, tree);
	}

	#[rstest]
	fn test_validate_structure_accepts_consistent_tree() {
		let mut root = ComponentInstance::new("a", "test", "Row");
		root.children.push(child_of("a", "b"));
		root.children.push(child_of("a", "c"));
		let tree = PageTree {
			components: vec![root],
		};

		assert!(tree.validate_structure().is_ok());
	}

	#[rstest]
	fn test_validate_structure_rejects_duplicate_ids() {
		let mut root = ComponentInstance::new("a", "test", "Row");
		root.children.push(child_of("a", "b"));
		root.children.push(child_of("a", "b"));
		let tree = PageTree {
			components: vec![root],
		};

		assert!(tree.validate_structure().is_err());
	}

	#[rstest]
	fn test_validate_structure_rejects_parent_mismatch() {
		let mut root = ComponentInstance::new("a", "test", "Row");
		// Child claims a different parent
		root.children.push(child_of("z", "b"));
		let tree = PageTree {
			components: vec![root],
		};

		assert!(tree.validate_structure().is_err());
	}

	#[rstest]
	fn test_validate_structure_rejects_parented_root() {
		let mut root = ComponentInstance::new("a", "test", "Row");
		root.parent_id = Some("ghost".to_string());
		let tree = PageTree {
			components: vec![root],
		};

		assert!(tree.validate_structure().is_err());
	}

	#[rstest]
	fn test_referenced_keys_deduplicates() {
		let mut root = ComponentInstance::new("a", "test", "Row");
		root.children.push(child_of("a", "b"));
		root.children.push(child_of("a", "c"));
		let tree = PageTree {
			components: vec![root],
		};

		let keys = tree.referenced_keys();

		assert_eq!(
			keys,
			vec![
				ComponentKey::new("test", "Row"),
				ComponentKey::new("test", "Text"),
			]
		);
	}

	fn manifest_for(
		component_id: &str,
		category: atelier_core::category::ComponentCategory,
		can_have_children: bool,
	) -> ComponentManifest {
		ComponentManifest {
			plugin_id: "test".to_string(),
			plugin_version: "1.0.0".to_string(),
			component_id: component_id.to_string(),
			display_name: component_id.to_string(),
			category,
			icon: None,
			description: None,
			default_props: Default::default(),
			default_styles: Default::default(),
			configurable_props: Vec::new(),
			configurable_styles: Vec::new(),
			size_constraints: Default::default(),
			capabilities: atelier_core::manifest::ComponentCapabilities {
				can_have_children,
				..Default::default()
			},
			allowed_child_types: None,
			react_component_path: None,
		}
	}

	#[rstest]
	fn test_manifest_validation_rejects_children_on_leaf() {
		use atelier_core::category::ComponentCategory;

		// Given: a leaf component carrying a child anyway
		let mut leaf = ComponentInstance::new("a", "test", "Text");
		leaf.children.push(child_of("a", "b"));
		let tree = PageTree {
			components: vec![leaf],
		};
		let manifests = HashMap::from([(
			ComponentKey::new("test", "Text"),
			manifest_for("Text", ComponentCategory::Ui, false),
		)]);

		// When / Then
		assert!(tree.validate_against_manifests(&manifests).is_err());
	}

	#[rstest]
	fn test_manifest_validation_enforces_child_categories() {
		use atelier_core::category::ComponentCategory;
		use std::collections::BTreeSet;

		// Given: a navbar container that only accepts navbar children,
		// holding a ui child
		let mut nav = ComponentInstance::new("nav", "test", "NavBar");
		let mut link = ComponentInstance::new("x", "test", "Text");
		link.parent_id = Some("nav".to_string());
		nav.children.push(link);
		let tree = PageTree {
			components: vec![nav],
		};

		let mut nav_manifest = manifest_for("NavBar", ComponentCategory::Navbar, true);
		nav_manifest.allowed_child_types = Some(BTreeSet::from([ComponentCategory::Navbar]));
		let manifests = HashMap::from([
			(ComponentKey::new("test", "NavBar"), nav_manifest),
			(
				ComponentKey::new("test", "Text"),
				manifest_for("Text", ComponentCategory::Ui, false),
			),
		]);

		// When / Then: the ui child is rejected
		assert!(tree.validate_against_manifests(&manifests).is_err());

		// Unknown children are skipped, not rejected
		let unknown_only = HashMap::from([(
			ComponentKey::new("test", "NavBar"),
			manifests[&ComponentKey::new("test", "NavBar")].clone(),
		)]);
		assert!(tree.validate_against_manifests(&unknown_only).is_ok());
	}

	#[rstest]
	fn test_route_slots_defaults_to_center() {
		// Given: a layout with one header child and two unslotted children
		let mut layout = ComponentInstance::new("layout", "test", "PageLayout");
		let mut header = child_of("layout", "h");
		header.slot = Some("header".to_string());
		let mut odd = child_of("layout", "x");
		odd.slot = Some("sidebar-ish".to_string()); // unknown region
		layout.children = vec![header, child_of("layout", "c"), odd];

		// When
		let regions = route_slots(&layout);

		// Then: unknown and missing slots land in center; empty regions absent
		assert_eq!(regions[&SlotName::Header].len(), 1);
		assert_eq!(regions[&SlotName::Center].len(), 2);
		assert!(!regions.contains_key(&SlotName::Footer));
	}
}
