//! Token resolution
//!
//! `{{ expression }}` tokens are substituted inside strings; props walk
//! recursively through arrays and nested mappings. Resolution never fails:
//! anything unresolvable becomes the empty string.

use serde_json::Value as JsonValue;

use crate::context::DataContext;
use crate::path::{PathSegment, navigate, parse_path};

/// Substitute every `{{ path }}` token in `input`.
///
/// Root identifiers resolve in this order: the iterator item alias, the
/// iterator index alias, a data source named by the root, then the full
/// path attempted against data sources, shared data, and the current item;
/// first non-null wins.
pub fn resolve_str(input: &str, ctx: &DataContext) -> String {
	let mut output = String::with_capacity(input.len());
	let mut rest = input;

	while let Some(open) = rest.find("{{") {
		output.push_str(&rest[..open]);
		let after_open = &rest[open + 2..];
		match after_open.find("}}") {
			Some(close) => {
				let expr = &after_open[..close];
				output.push_str(&resolve_expr(expr, ctx));
				rest = &after_open[close + 2..];
			}
			None => {
				// Unterminated token: keep the remainder literally.
				output.push_str(&rest[open..]);
				return output;
			}
		}
	}
	output.push_str(rest);
	output
}

/// Recursively resolve tokens inside a props value.
///
/// Strings are substituted, arrays element-wise, mappings per entry;
/// non-string scalars pass through untouched.
pub fn resolve_props(value: &JsonValue, ctx: &DataContext) -> JsonValue {
	match value {
		JsonValue::String(s) => JsonValue::String(resolve_str(s, ctx)),
		JsonValue::Array(items) => {
			JsonValue::Array(items.iter().map(|v| resolve_props(v, ctx)).collect())
		}
		JsonValue::Object(map) => JsonValue::Object(
			map.iter()
				.map(|(k, v)| (k.clone(), resolve_props(v, ctx)))
				.collect(),
		),
		other => other.clone(),
	}
}

fn resolve_expr(expr: &str, ctx: &DataContext) -> String {
	lookup(expr, ctx).map(render).unwrap_or_default()
}

fn lookup(expr: &str, ctx: &DataContext) -> Option<JsonValue> {
	let segments = parse_path(expr)?;
	let (root, rest) = segments.split_first()?;

	if let PathSegment::Field(name) = root {
		if name == ctx.item_alias() {
			let item = ctx.item.as_ref()?;
			return if rest.is_empty() {
				(!item.is_null()).then(|| item.clone())
			} else {
				navigate(item, rest).cloned()
			};
		}
		if name == ctx.index_alias() {
			// The index is an integer; trailing segments cannot apply.
			if !rest.is_empty() {
				return None;
			}
			return ctx.index.map(JsonValue::from);
		}
		if let Some(source) = ctx.data_sources.get(name) {
			return if rest.is_empty() {
				(!source.is_null()).then(|| source.clone())
			} else {
				navigate(source, rest).cloned()
			};
		}
	}

	// Fallback: the whole path against each container, first non-null wins.
	if let Some(hit) = navigate_map(&ctx.data_sources, &segments) {
		return Some(hit);
	}
	if let Some(hit) = navigate_map(&ctx.shared_data, &segments) {
		return Some(hit);
	}
	if let Some(item) = ctx.item.as_ref() {
		if let Some(hit) = navigate(item, &segments) {
			return Some(hit.clone());
		}
	}
	None
}

fn navigate_map(
	map: &std::collections::BTreeMap<String, JsonValue>,
	segments: &[PathSegment],
) -> Option<JsonValue> {
	let (root, rest) = segments.split_first()?;
	let PathSegment::Field(name) = root else {
		return None;
	};
	let value = map.get(name)?;
	if rest.is_empty() {
		(!value.is_null()).then(|| value.clone())
	} else {
		navigate(value, rest).cloned()
	}
}

fn render(value: JsonValue) -> String {
	match value {
		JsonValue::Null => String::new(),
		JsonValue::String(s) => s,
		JsonValue::Bool(b) => b.to_string(),
		JsonValue::Number(n) => n.to_string(),
		// Arrays and objects substitute as compact JSON.
		other => other.to_string(),
	}
}
