//! Aggregation engine
//!
//! Fetches every configured source of a page concurrently and settles them
//! all; one failing source never aborts its siblings. Successes land in
//! `data`, failures in `errors`, and the response always carries the page
//! meta and the wall-clock fetch time.

use std::collections::BTreeMap;
use std::time::{Duration, Instant};

use serde::{Deserialize, Serialize};
use serde_json::Value as JsonValue;
use tracing::{debug, warn};
use uuid::Uuid;

use atelier_core::datasource::{DataSourceConfig, DataSourceType, HttpMethod};

use crate::cache::TtlCache;
use crate::error::{DataSourceError, FetchResult};
use crate::mapping::apply_field_mapping;

/// Engine tuning, from host configuration.
#[derive(Debug, Clone)]
pub struct EngineConfig {
	/// TTL applied when a source names a cache key without its own TTL
	pub default_cache_ttl: Duration,
	/// Per-fetch timeout for API sources
	pub fetch_timeout: Duration,
}

impl Default for EngineConfig {
	fn default() -> Self {
		Self {
			default_cache_ttl: Duration::from_millis(60_000),
			fetch_timeout: Duration::from_millis(10_000),
		}
	}
}

/// Page identity echoed back with every aggregation.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PageMeta {
	pub page_id: Uuid,
	pub page_name: String,
	#[serde(default, skip_serializing_if = "Option::is_none")]
	pub title: Option<String>,
	#[serde(default, skip_serializing_if = "Option::is_none")]
	pub description: Option<String>,
	#[serde(default, skip_serializing_if = "Option::is_none")]
	pub path: Option<String>,
}

/// The aggregated response of a page-data request.
///
/// Invariant: `data` and `errors` key sets are disjoint, and together they
/// cover exactly the requested sources.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PageData {
	pub data: BTreeMap<String, JsonValue>,
	pub errors: BTreeMap<String, String>,
	pub page_meta: PageMeta,
	pub fetch_time_ms: u64,
}

/// Outcome of probing a single source configuration.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct DataSourceResult {
	pub success: bool,
	#[serde(default, skip_serializing_if = "Option::is_none")]
	pub status_code: Option<u16>,
	#[serde(default, skip_serializing_if = "Option::is_none")]
	pub data: Option<JsonValue>,
	#[serde(default, skip_serializing_if = "Option::is_none")]
	pub message: Option<String>,
}

/// The data-source aggregation engine. One long-lived instance per host.
pub struct DataSourceEngine {
	client: reqwest::Client,
	cache: TtlCache,
	config: EngineConfig,
}

impl DataSourceEngine {
	/// Build the engine; the HTTP client carries the per-fetch timeout.
	pub fn new(config: EngineConfig) -> Self {
		let client = reqwest::Client::builder()
			.timeout(config.fetch_timeout)
			.build()
			.unwrap_or_default();
		Self {
			client,
			cache: TtlCache::new(),
			config,
		}
	}

	/// Parse a page's `dataSources` JSON into named configs.
	pub fn parse_sources(json: &str) -> FetchResult<BTreeMap<String, DataSourceConfig>> {
		serde_json::from_str(json).map_err(|e| DataSourceError::InvalidConfig(e.to_string()))
	}

	/// Fetch every configured source in parallel and settle them all.
	pub async fn fetch_page_data(
		&self,
		page_meta: PageMeta,
		sources: &BTreeMap<String, DataSourceConfig>,
		params: &BTreeMap<String, String>,
	) -> PageData {
		let started = Instant::now();
		let fetches = sources.iter().map(|(key, config)| async move {
			(key.clone(), self.fetch_one(config, params).await)
		});
		let settled = futures::future::join_all(fetches).await;

		let mut data = BTreeMap::new();
		let mut errors = BTreeMap::new();
		for (key, outcome) in settled {
			match outcome {
				Ok(value) => {
					data.insert(key, value);
				}
				Err(e) => {
					warn!(source = %key, error = %e, "data source failed");
					errors.insert(key, e.to_string());
				}
			}
		}

		PageData {
			data,
			errors,
			page_meta,
			fetch_time_ms: (started.elapsed().as_millis() as u64).max(1),
		}
	}

	/// Fetch only the listed sources; unknown keys land in `errors`.
	pub async fn fetch_batch(
		&self,
		page_meta: PageMeta,
		sources: &BTreeMap<String, DataSourceConfig>,
		keys: &[String],
		params: &BTreeMap<String, String>,
	) -> PageData {
		let mut selected = BTreeMap::new();
		let mut missing = Vec::new();
		for key in keys {
			match sources.get(key) {
				Some(config) => {
					selected.insert(key.clone(), config.clone());
				}
				None => missing.push(key.clone()),
			}
		}
		let mut page_data = self.fetch_page_data(page_meta, &selected, params).await;
		for key in missing {
			page_data
				.errors
				.insert(key, "no data source configured under this key".to_string());
		}
		page_data
	}

	/// Probe one configuration with empty request parameters.
	pub async fn test_data_source(&self, config: &DataSourceConfig) -> DataSourceResult {
		match self.fetch_one(config, &BTreeMap::new()).await {
			Ok(value) => DataSourceResult {
				success: true,
				status_code: Some(200),
				data: Some(value),
				message: None,
			},
			Err(e) => DataSourceResult {
				success: false,
				status_code: match e {
					DataSourceError::Status(code) => Some(code),
					_ => None,
				},
				data: None,
				message: Some(e.to_string()),
			},
		}
	}

	/// Drop every cached value.
	pub fn clear_cache(&self) {
		self.cache.clear();
	}

	/// Drop one cached value.
	pub fn clear_cache_key(&self, key: &str) {
		self.cache.remove(key);
	}

	/// Fetch, map, and cache one source.
	async fn fetch_one(
		&self,
		config: &DataSourceConfig,
		params: &BTreeMap<String, String>,
	) -> FetchResult<JsonValue> {
		config
			.validate()
			.map_err(|e| DataSourceError::InvalidConfig(e.to_string()))?;

		if let Some(cache_key) = config.cache_key.as_deref() {
			if let Some(hit) = self.cache.get(cache_key) {
				debug!(cache_key, "data source served from cache");
				return Ok(hit);
			}
		}

		let raw = match config.source_type {
			DataSourceType::Api => self.fetch_api(config, params).await?,
			DataSourceType::Static => config.static_data.clone().unwrap_or(JsonValue::Null),
			DataSourceType::Context => {
				let key = config.context_key.as_deref().unwrap_or_default();
				params
					.get(key)
					.map(|v| JsonValue::String(v.clone()))
					.unwrap_or(JsonValue::Null)
			}
		};

		let derived = match &config.field_mapping {
			Some(mapping) => apply_field_mapping(&raw, mapping),
			None => raw,
		};

		if let Some(cache_key) = config.cache_key.as_deref() {
			let ttl = config
				.cache_ttl_ms
				.map(Duration::from_millis)
				.unwrap_or(self.config.default_cache_ttl);
			self.cache.insert(cache_key, derived.clone(), ttl);
		}

		Ok(derived)
	}

	async fn fetch_api(
		&self,
		config: &DataSourceConfig,
		params: &BTreeMap<String, String>,
	) -> FetchResult<JsonValue> {
		let endpoint = config.endpoint.as_deref().unwrap_or_default();
		let mut request = match config.method {
			HttpMethod::Get => self.client.get(endpoint),
			HttpMethod::Post => self.client.post(endpoint),
		};
		for (name, value) in &config.headers {
			request = request.header(name, value);
		}
		if !params.is_empty() {
			let query: Vec<(&str, &str)> = params
				.iter()
				.map(|(k, v)| (k.as_str(), v.as_str()))
				.collect();
			request = request.query(&query);
		}

		let response = request
			.send()
			.await
			.map_err(|e| DataSourceError::Transport(e.to_string()))?;
		let status = response.status();
		if !status.is_success() {
			return Err(DataSourceError::Status(status.as_u16()));
		}
		response
			.json()
			.await
			.map_err(|e| DataSourceError::Decode(e.to_string()))
	}
}

impl Default for DataSourceEngine {
	fn default() -> Self {
		Self::new(EngineConfig::default())
	}
}
