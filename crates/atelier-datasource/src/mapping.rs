//! Field mapping
//!
//! Projects a raw fetched value into `{target_field: value}` using the
//! shared path grammar for extraction, a fixed transform set, and per-field
//! fallbacks for null results. Unknown transform names are a no-op.

use std::collections::BTreeMap;

use serde_json::{Map, Value as JsonValue};
use tracing::warn;

use atelier_core::datasource::FieldMapping;
use atelier_template::extract;

/// Apply a field mapping to a raw value.
///
/// Per target field: extract along `path`, apply the transform if named,
/// and substitute the fallback when the result is null.
pub fn apply_field_mapping(
	raw: &JsonValue,
	mapping: &BTreeMap<String, FieldMapping>,
) -> JsonValue {
	let mut derived = Map::new();
	for (target, field) in mapping {
		let mut value = extract(raw, &field.path)
			.cloned()
			.unwrap_or(JsonValue::Null);
		if let Some(transform) = field.transform.as_deref() {
			value = apply_transform(value, transform);
		}
		if value.is_null() {
			if let Some(fallback) = &field.fallback {
				value = fallback.clone();
			}
		}
		derived.insert(target.clone(), value);
	}
	JsonValue::Object(derived)
}

/// Apply one named transform. Conversions that cannot apply yield null so
/// the fallback can take over; unknown names pass the value through.
pub fn apply_transform(value: JsonValue, transform: &str) -> JsonValue {
	match transform {
		"uppercase" => map_string(value, |s| s.to_uppercase()),
		"lowercase" => map_string(value, |s| s.to_lowercase()),
		"trim" => map_string(value, |s| s.trim().to_string()),
		"number" => to_number(&value).map(JsonValue::from).unwrap_or(JsonValue::Null),
		"integer" => to_number(&value)
			.map(|n| JsonValue::from(n as i64))
			.unwrap_or(JsonValue::Null),
		"boolean" => to_boolean(&value).map(JsonValue::from).unwrap_or(JsonValue::Null),
		"string" => to_string_value(value),
		other => {
			warn!(transform = other, "unknown transform; passing value through");
			value
		}
	}
}

fn map_string(value: JsonValue, f: impl Fn(&str) -> String) -> JsonValue {
	match value {
		JsonValue::String(s) => JsonValue::String(f(&s)),
		other => other,
	}
}

fn to_number(value: &JsonValue) -> Option<f64> {
	match value {
		JsonValue::Number(n) => n.as_f64(),
		JsonValue::String(s) => s.trim().parse().ok(),
		JsonValue::Bool(b) => Some(if *b { 1.0 } else { 0.0 }),
		_ => None,
	}
}

fn to_boolean(value: &JsonValue) -> Option<bool> {
	match value {
		JsonValue::Bool(b) => Some(*b),
		JsonValue::Number(n) => n.as_f64().map(|f| f != 0.0),
		JsonValue::String(s) => match s.trim().to_ascii_lowercase().as_str() {
			"true" | "1" | "yes" => Some(true),
			"false" | "0" | "no" => Some(false),
			_ => None,
		},
		_ => None,
	}
}

fn to_string_value(value: JsonValue) -> JsonValue {
	match value {
		JsonValue::Null => JsonValue::Null,
		JsonValue::String(s) => JsonValue::String(s),
		JsonValue::Number(n) => JsonValue::String(n.to_string()),
		JsonValue::Bool(b) => JsonValue::String(b.to_string()),
		other => JsonValue::String(other.to_string()),
	}
}

#[cfg(test)]
mod tests {
	use super::*;
	use rstest::*;
	use serde_json::json;

	fn field(path: &str, transform: Option<&str>, fallback: Option<JsonValue>) -> FieldMapping {
		FieldMapping {
			path: path.to_string(),
			transform: transform.map(str::to_string),
			fallback,
		}
	}

	#[rstest]
	fn test_mapping_with_transform_and_fallback() {
		// Given: the raw response and mapping from the render contract
		let raw = json!({"user": {"name": "Ada"}});
		let mapping = BTreeMap::from([
			("name".to_string(), field("user.name", Some("uppercase"), None)),
			("age".to_string(), field("user.age", None, Some(json!(0)))),
		]);

		// When
		let derived = apply_field_mapping(&raw, &mapping);

		// Then
		assert_eq!(derived, json!({"name": "ADA", "age": 0}));
	}

	#[rstest]
	#[case("uppercase", json!("ada"), json!("ADA"))]
	#[case("lowercase", json!("ADA"), json!("ada"))]
	#[case("trim", json!("  x  "), json!("x"))]
	#[case("number", json!("2.5"), json!(2.5))]
	#[case("number", json!(7), json!(7.0))]
	#[case("integer", json!("41.9"), json!(41))]
	#[case("boolean", json!("yes"), json!(true))]
	#[case("boolean", json!(0), json!(false))]
	#[case("string", json!(1.5), json!("1.5"))]
	fn test_transforms(#[case] name: &str, #[case] input: JsonValue, #[case] expected: JsonValue) {
		assert_eq!(apply_transform(input, name), expected);
	}

	#[rstest]
	fn test_unknown_transform_is_noop() {
		assert_eq!(apply_transform(json!("keep"), "rot13"), json!("keep"));
	}

	#[rstest]
	fn test_failed_conversion_falls_back() {
		let raw = json!({"age": "not a number"});
		let mapping = BTreeMap::from([(
			"age".to_string(),
			field("age", Some("integer"), Some(json!(-1))),
		)]);

		let derived = apply_field_mapping(&raw, &mapping);

		assert_eq!(derived, json!({"age": -1}));
	}

	#[rstest]
	fn test_missing_path_without_fallback_is_null() {
		let raw = json!({});
		let mapping = BTreeMap::from([("x".to_string(), field("a.b", None, None))]);

		let derived = apply_field_mapping(&raw, &mapping);

		assert_eq!(derived, json!({"x": null}));
	}

	#[rstest]
	fn test_quoted_path_extraction() {
		let raw = json!({"odd.key": {"inner": 3}});
		let mapping = BTreeMap::from([(
			"v".to_string(),
			field("['odd.key'].inner", None, None),
		)]);

		let derived = apply_field_mapping(&raw, &mapping);

		assert_eq!(derived, json!({"v": 3}));
	}
}
