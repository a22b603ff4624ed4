//! Data-source configuration
//!
//! Pages declare named data sources; the aggregation engine fetches them in
//! parallel at render time. A source is an HTTP endpoint, an embedded static
//! value, or a key read from the caller's request parameters.

use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};
use serde_json::Value as JsonValue;

use crate::error::{ValidationError, ValidationResult};

/// Kind of a data source.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum DataSourceType {
	/// HTTP endpoint, JSON response body
	Api,
	/// Literal value embedded in the config
	Static,
	/// Value read from the caller's request parameters
	Context,
}

/// HTTP method used by [`DataSourceType::Api`] sources.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum HttpMethod {
	#[default]
	Get,
	Post,
}

/// Mapping of one target field from a raw response.
///
/// `path` uses the same dotted/bracketed syntax as template tokens, applied
/// as pure extraction. `transform` is a name from the fixed transform set;
/// unknown names degrade to a no-op. `fallback` substitutes a null result.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct FieldMapping {
	/// Extraction path into the raw value
	pub path: String,
	/// Optional transform name (`uppercase`, `lowercase`, `trim`, `number`,
	/// `integer`, `boolean`, `string`)
	#[serde(default, skip_serializing_if = "Option::is_none")]
	pub transform: Option<String>,
	/// Value used when extraction yields null
	#[serde(default, skip_serializing_if = "Option::is_none")]
	pub fallback: Option<JsonValue>,
}

/// Declarative configuration of one named data source.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct DataSourceConfig {
	/// Source kind
	#[serde(rename = "type")]
	pub source_type: DataSourceType,
	/// Endpoint URL, required for `API`
	#[serde(default, skip_serializing_if = "Option::is_none")]
	pub endpoint: Option<String>,
	/// HTTP method for `API` sources
	#[serde(default)]
	pub method: HttpMethod,
	/// Extra request headers for `API` sources
	#[serde(default, skip_serializing_if = "BTreeMap::is_empty")]
	pub headers: BTreeMap<String, String>,
	/// Embedded value for `STATIC` sources
	#[serde(default, skip_serializing_if = "Option::is_none")]
	pub static_data: Option<JsonValue>,
	/// Request-parameter key for `CONTEXT` sources
	#[serde(default, skip_serializing_if = "Option::is_none")]
	pub context_key: Option<String>,
	/// Optional projection of the raw value into named fields
	#[serde(default, skip_serializing_if = "Option::is_none")]
	pub field_mapping: Option<BTreeMap<String, FieldMapping>>,
	/// Cache key; absent = no caching
	#[serde(default, skip_serializing_if = "Option::is_none")]
	pub cache_key: Option<String>,
	/// Cache TTL in milliseconds; engine default applies when absent
	#[serde(default, skip_serializing_if = "Option::is_none")]
	pub cache_ttl_ms: Option<u64>,
}

impl DataSourceConfig {
	/// Validate kind-specific required fields.
	pub fn validate(&self) -> ValidationResult<()> {
		match self.source_type {
			DataSourceType::Api => {
				if self.endpoint.as_deref().is_none_or(|e| e.trim().is_empty()) {
					return Err(ValidationError::MissingField("endpoint"));
				}
			}
			DataSourceType::Context => {
				if self
					.context_key
					.as_deref()
					.is_none_or(|k| k.trim().is_empty())
				{
					return Err(ValidationError::MissingField("contextKey"));
				}
			}
			DataSourceType::Static => {}
		}
		Ok(())
	}
}
