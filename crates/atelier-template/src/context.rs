//! Data contexts
//!
//! The bindings available to template tokens: the current repeater `item`
//! and `index`, the page's fetched data sources, and ambient shared data.

use std::collections::BTreeMap;

use serde_json::Value as JsonValue;

/// Bindings used during template resolution.
///
/// The iterator aliases default to `item` / `index`; a repeater may rename
/// them through its iterator config so nested repeaters can address both
/// scopes.
#[derive(Debug, Clone, Default)]
pub struct DataContext {
	/// Current repeater element, if resolving inside a repeater clone
	pub item: Option<JsonValue>,
	/// Current repeater position
	pub index: Option<i64>,
	/// Fetched data sources, keyed by source name
	pub data_sources: BTreeMap<String, JsonValue>,
	/// Ambient shared values
	pub shared_data: BTreeMap<String, JsonValue>,
	/// Root identifier that resolves to `item`
	pub item_alias: Option<String>,
	/// Root identifier that resolves to `index`
	pub index_alias: Option<String>,
}

impl DataContext {
	/// Empty context; every token resolves to the empty string.
	pub fn new() -> Self {
		Self::default()
	}

	/// Context over fetched data sources only.
	pub fn with_data_sources(data_sources: BTreeMap<String, JsonValue>) -> Self {
		Self {
			data_sources,
			..Self::default()
		}
	}

	/// Derive the per-element context a repeater uses for one clone.
	///
	/// Keeps data sources and shared data, replaces the item/index bindings.
	pub fn for_element(&self, item: JsonValue, index: i64) -> Self {
		Self {
			item: Some(item),
			index: Some(index),
			data_sources: self.data_sources.clone(),
			shared_data: self.shared_data.clone(),
			item_alias: self.item_alias.clone(),
			index_alias: self.index_alias.clone(),
		}
	}

	/// The effective item alias (`item` unless overridden).
	pub fn item_alias(&self) -> &str {
		self.item_alias.as_deref().unwrap_or("item")
	}

	/// The effective index alias (`index` unless overridden).
	pub fn index_alias(&self) -> &str {
		self.index_alias.as_deref().unwrap_or("index")
	}
}
