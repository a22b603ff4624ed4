//! Aggregation engine integration tests
//!
//! API sources run against a local wiremock server; static and context
//! sources need no network.

use std::collections::BTreeMap;
use std::time::Duration;

use rstest::*;
use serde_json::{Value as JsonValue, json};
use uuid::Uuid;
use wiremock::matchers::{method, path, query_param};
use wiremock::{Mock, MockServer, ResponseTemplate};

use atelier_core::datasource::{DataSourceConfig, DataSourceType, FieldMapping, HttpMethod};
use atelier_datasource::{DataSourceEngine, PageMeta};

fn page_meta() -> PageMeta {
	PageMeta {
		page_id: Uuid::new_v4(),
		page_name: "Home".to_string(),
		title: Some("Home".to_string()),
		description: None,
		path: Some("/".to_string()),
	}
}

fn api_source(endpoint: String) -> DataSourceConfig {
	DataSourceConfig {
		source_type: DataSourceType::Api,
		endpoint: Some(endpoint),
		method: HttpMethod::Get,
		headers: BTreeMap::new(),
		static_data: None,
		context_key: None,
		field_mapping: None,
		cache_key: None,
		cache_ttl_ms: None,
	}
}

fn static_source(value: JsonValue) -> DataSourceConfig {
	DataSourceConfig {
		source_type: DataSourceType::Static,
		endpoint: None,
		method: HttpMethod::Get,
		headers: BTreeMap::new(),
		static_data: Some(value),
		context_key: None,
		field_mapping: None,
		cache_key: None,
		cache_ttl_ms: None,
	}
}

fn context_source(key: &str) -> DataSourceConfig {
	DataSourceConfig {
		source_type: DataSourceType::Context,
		endpoint: None,
		method: HttpMethod::Get,
		headers: BTreeMap::new(),
		static_data: None,
		context_key: Some(key.to_string()),
		field_mapping: None,
		cache_key: None,
		cache_ttl_ms: None,
	}
}

#[rstest]
#[tokio::test]
async fn test_partial_failure_settles_all_sources() {
	// Given: one healthy and one failing endpoint
	let server = MockServer::start().await;
	Mock::given(method("GET"))
		.and(path("/good"))
		.respond_with(ResponseTemplate::new(200).set_body_json(json!([1, 2])))
		.mount(&server)
		.await;
	Mock::given(method("GET"))
		.and(path("/bad"))
		.respond_with(ResponseTemplate::new(500))
		.mount(&server)
		.await;

	let sources = BTreeMap::from([
		("good".to_string(), api_source(format!("{}/good", server.uri()))),
		("bad".to_string(), api_source(format!("{}/bad", server.uri()))),
	]);
	let engine = DataSourceEngine::default();

	// When
	let page_data = engine
		.fetch_page_data(page_meta(), &sources, &BTreeMap::new())
		.await;

	// Then: the good source landed in data, the bad one in errors
	assert_eq!(page_data.data["good"], json!([1, 2]));
	assert!(page_data.errors["bad"].contains("500"));
	assert!(page_data.fetch_time_ms > 0);
	// data and errors never share keys and together cover the config
	assert!(!page_data.data.contains_key("bad"));
	assert!(!page_data.errors.contains_key("good"));
	assert_eq!(page_data.data.len() + page_data.errors.len(), sources.len());
}

#[rstest]
#[tokio::test]
async fn test_request_params_forwarded_as_query() {
	let server = MockServer::start().await;
	Mock::given(method("GET"))
		.and(path("/items"))
		.and(query_param("userId", "42"))
		.respond_with(ResponseTemplate::new(200).set_body_json(json!({"ok": true})))
		.mount(&server)
		.await;

	let sources = BTreeMap::from([(
		"items".to_string(),
		api_source(format!("{}/items", server.uri())),
	)]);
	let params = BTreeMap::from([("userId".to_string(), "42".to_string())]);
	let engine = DataSourceEngine::default();

	let page_data = engine.fetch_page_data(page_meta(), &sources, &params).await;

	assert_eq!(page_data.data["items"], json!({"ok": true}));
}

#[rstest]
#[tokio::test]
async fn test_static_and_context_sources() {
	let sources = BTreeMap::from([
		("fixed".to_string(), static_source(json!({"n": 7}))),
		("who".to_string(), context_source("userId")),
		("absent".to_string(), context_source("missing")),
	]);
	let params = BTreeMap::from([("userId".to_string(), "u-9".to_string())]);
	let engine = DataSourceEngine::default();

	let page_data = engine.fetch_page_data(page_meta(), &sources, &params).await;

	assert_eq!(page_data.data["fixed"], json!({"n": 7}));
	assert_eq!(page_data.data["who"], json!("u-9"));
	// A missing context key resolves to null rather than an error
	assert_eq!(page_data.data["absent"], JsonValue::Null);
	assert!(page_data.errors.is_empty());
}

#[rstest]
#[tokio::test]
async fn test_field_mapping_applied_to_response() {
	// Given: the raw response and mapping of the render contract
	let server = MockServer::start().await;
	Mock::given(method("GET"))
		.and(path("/user"))
		.respond_with(ResponseTemplate::new(200).set_body_json(json!({"user": {"name": "Ada"}})))
		.mount(&server)
		.await;

	let mut source = api_source(format!("{}/user", server.uri()));
	source.field_mapping = Some(BTreeMap::from([
		(
			"name".to_string(),
			FieldMapping {
				path: "user.name".to_string(),
				transform: Some("uppercase".to_string()),
				fallback: None,
			},
		),
		(
			"age".to_string(),
			FieldMapping {
				path: "user.age".to_string(),
				transform: None,
				fallback: Some(json!(0)),
			},
		),
	]));
	let sources = BTreeMap::from([("user".to_string(), source)]);
	let engine = DataSourceEngine::default();

	// When
	let page_data = engine
		.fetch_page_data(page_meta(), &sources, &BTreeMap::new())
		.await;

	// Then
	assert_eq!(page_data.data["user"], json!({"name": "ADA", "age": 0}));
}

#[rstest]
#[tokio::test]
async fn test_cache_serves_second_read_and_expires() {
	// Given: an endpoint that counts calls via mock expectations
	let server = MockServer::start().await;
	Mock::given(method("GET"))
		.and(path("/counted"))
		.respond_with(ResponseTemplate::new(200).set_body_json(json!(1)))
		.expect(2)
		.mount(&server)
		.await;

	let mut source = api_source(format!("{}/counted", server.uri()));
	source.cache_key = Some("counted".to_string());
	source.cache_ttl_ms = Some(50);
	let sources = BTreeMap::from([("counted".to_string(), source)]);
	let engine = DataSourceEngine::default();

	// When: two immediate fetches, then one after expiry
	engine
		.fetch_page_data(page_meta(), &sources, &BTreeMap::new())
		.await;
	engine
		.fetch_page_data(page_meta(), &sources, &BTreeMap::new())
		.await;
	tokio::time::sleep(Duration::from_millis(80)).await;
	engine
		.fetch_page_data(page_meta(), &sources, &BTreeMap::new())
		.await;

	// Then: the endpoint saw exactly two calls (second read was cached)
	server.verify().await;
}

#[rstest]
#[tokio::test]
async fn test_clear_cache_forces_refetch() {
	let server = MockServer::start().await;
	Mock::given(method("GET"))
		.and(path("/v"))
		.respond_with(ResponseTemplate::new(200).set_body_json(json!("x")))
		.expect(2)
		.mount(&server)
		.await;

	let mut source = api_source(format!("{}/v", server.uri()));
	source.cache_key = Some("v".to_string());
	let sources = BTreeMap::from([("v".to_string(), source)]);
	let engine = DataSourceEngine::default();

	engine
		.fetch_page_data(page_meta(), &sources, &BTreeMap::new())
		.await;
	engine.clear_cache_key("v");
	engine
		.fetch_page_data(page_meta(), &sources, &BTreeMap::new())
		.await;

	server.verify().await;
}

#[rstest]
#[tokio::test]
async fn test_fetch_batch_restricts_to_requested_keys() {
	let sources = BTreeMap::from([
		("a".to_string(), static_source(json!(1))),
		("b".to_string(), static_source(json!(2))),
	]);
	let engine = DataSourceEngine::default();

	let page_data = engine
		.fetch_batch(
			page_meta(),
			&sources,
			&["a".to_string(), "ghost".to_string()],
			&BTreeMap::new(),
		)
		.await;

	assert_eq!(page_data.data.len(), 1);
	assert_eq!(page_data.data["a"], json!(1));
	assert!(page_data.errors["ghost"].contains("no data source"));
	assert!(!page_data.data.contains_key("b"));
}

#[rstest]
#[tokio::test]
async fn test_test_data_source_reports_status() {
	let server = MockServer::start().await;
	Mock::given(method("GET"))
		.and(path("/probe"))
		.respond_with(ResponseTemplate::new(200).set_body_json(json!({"alive": true})))
		.mount(&server)
		.await;
	let engine = DataSourceEngine::default();

	let ok = engine
		.test_data_source(&api_source(format!("{}/probe", server.uri())))
		.await;
	assert!(ok.success);
	assert_eq!(ok.status_code, Some(200));
	assert_eq!(ok.data, Some(json!({"alive": true})));

	let err = engine
		.test_data_source(&api_source(format!("{}/nowhere", server.uri())))
		.await;
	assert!(!err.success);
	assert_eq!(err.status_code, Some(404));
	assert!(err.message.is_some());
}

#[rstest]
#[tokio::test]
async fn test_invalid_config_becomes_source_error() {
	// An API source without an endpoint is a per-source error, not a panic
	let broken = DataSourceConfig {
		source_type: DataSourceType::Api,
		endpoint: None,
		method: HttpMethod::Get,
		headers: BTreeMap::new(),
		static_data: None,
		context_key: None,
		field_mapping: None,
		cache_key: None,
		cache_ttl_ms: None,
	};
	let sources = BTreeMap::from([("broken".to_string(), broken)]);
	let engine = DataSourceEngine::default();

	let page_data = engine
		.fetch_page_data(page_meta(), &sources, &BTreeMap::new())
		.await;

	assert!(page_data.data.is_empty());
	assert!(page_data.errors["broken"].contains("invalid data source config"));
}

#[rstest]
#[tokio::test]
async fn test_decode_error_reported_per_source() {
	let server = MockServer::start().await;
	Mock::given(method("GET"))
		.and(path("/html"))
		.respond_with(ResponseTemplate::new(200).set_body_string("<html>nope</html>"))
		.mount(&server)
		.await;
	let sources = BTreeMap::from([(
		"html".to_string(),
		api_source(format!("{}/html", server.uri())),
	)]);
	let engine = DataSourceEngine::default();

	let page_data = engine
		.fetch_page_data(page_meta(), &sources, &BTreeMap::new())
		.await;

	assert!(page_data.errors["html"].contains("decode"));
}
