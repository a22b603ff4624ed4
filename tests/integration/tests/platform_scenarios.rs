//! End-to-end platform scenarios
//!
//! Each test wires the whole platform; plugin host, registry, page stores,
//! data-source engine, HTTP surface; and drives one user-visible flow.

use std::collections::BTreeMap;

use axum::body::Body;
use axum::http::{Request, StatusCode, header};
use http_body_util::BodyExt;
use rstest::*;
use serde_json::{Value as JsonValue, json};
use tempfile::TempDir;
use tower::ServiceExt;
use wiremock::matchers::{method, path};
use wiremock::{Mock, MockServer, ResponseTemplate};

use atelier_core::instance::ComponentInstance;
use atelier_integration_tests::{KIT_PLUGIN_ID, platform, write_kit_package};
use atelier_pages::repeater::expand_repeater;
use atelier_pages::service::{NewPage, NewSite};
use atelier_plugins::PluginState;
use atelier_server::AppState;
use atelier_server::routes::router;
use atelier_template::DataContext;

async fn call(state: &AppState, request: Request<Body>) -> (StatusCode, JsonValue) {
	let response = router(state.clone()).oneshot(request).await.unwrap();
	let status = response.status();
	let bytes = response.into_body().collect().await.unwrap().to_bytes();
	let body = if bytes.is_empty() {
		JsonValue::Null
	} else {
		serde_json::from_slice(&bytes).unwrap_or(JsonValue::Null)
	};
	(status, body)
}

fn get(uri: &str) -> Request<Body> {
	Request::builder().uri(uri).body(Body::empty()).unwrap()
}

fn request(method: &str, uri: &str, body: Option<&JsonValue>) -> Request<Body> {
	let builder = Request::builder().method(method).uri(uri);
	match body {
		Some(body) => builder
			.header(header::CONTENT_TYPE, "application/json")
			.body(Body::from(body.to_string()))
			.unwrap(),
		None => builder.body(Body::empty()).unwrap(),
	}
}

/// Boot the platform with the kit package installed and active.
async fn booted_platform(root: &TempDir) -> AppState {
	write_kit_package(root.path());
	let state = platform(root.path());
	state.lifecycle.discover_and_load_all().await.unwrap();
	state
}

async fn seed_page(
	state: &AppState,
	data_sources_json: Option<String>,
) -> (uuid::Uuid, uuid::Uuid) {
	let site = state
		.pages
		.create_site(NewSite {
			site_name: "Demo".to_string(),
			site_slug: None,
			site_mode: None,
			owner_user_id: "owner-1".to_string(),
			domain_name: None,
			favicon_url: None,
		})
		.await
		.unwrap();
	let page = state
		.pages
		.create_page(
			site.id,
			NewPage {
				page_name: "Home".to_string(),
				data_sources_json,
				..NewPage::default()
			},
		)
		.await
		.unwrap();
	(site.id, page.id)
}

fn row_tree() -> JsonValue {
	json!({
		"components": [{
			"instanceId": "row-1",
			"pluginId": KIT_PLUGIN_ID,
			"componentId": "HorizontalRow"
		}]
	})
}

#[rstest]
#[tokio::test]
async fn test_lifecycle_happy_path_populates_catalog() {
	// Given: a kit package dropped into the plugin directory
	let root = TempDir::new().unwrap();

	// When: the platform boots
	let state = booted_platform(&root).await;

	// Then: the plugin is active and both components are in the catalog
	let plugins = state.lifecycle.list().await.unwrap();
	assert_eq!(plugins.len(), 1);
	assert_eq!(plugins[0].state, PluginState::Active);

	let (status, list) = call(&state, get("/components")).await;
	assert_eq!(status, StatusCode::OK);
	let ids: Vec<&str> = list
		.as_array()
		.unwrap()
		.iter()
		.map(|e| e["componentId"].as_str().unwrap())
		.collect();
	assert_eq!(ids, vec!["HorizontalRow", "ProductList"]);
	assert!(list[0]["isActive"].as_bool().unwrap());
}

#[rstest]
#[tokio::test]
async fn test_component_in_use_guards_deletion() {
	// Given: a page version referencing the row component
	let root = TempDir::new().unwrap();
	let state = booted_platform(&root).await;
	let (site_id, page_id) = seed_page(&state, None).await;
	state
		.pages
		.save_version(site_id, page_id, row_tree().to_string(), None, None)
		.await
		.unwrap();

	// When: hard-deleting the component
	let (status, body) = call(
		&state,
		request(
			"DELETE",
			&format!("/admin/components/{KIT_PLUGIN_ID}/HorizontalRow"),
			None,
		),
	)
	.await;

	// Then: 400 naming the page
	assert_eq!(status, StatusCode::BAD_REQUEST);
	assert_eq!(body["error"], "component_in_use");
	assert_eq!(body["affectedPages"][0]["pageId"], json!(page_id));

	// When: deactivating instead
	let (status, body) = call(
		&state,
		request(
			"PATCH",
			&format!("/admin/components/{KIT_PLUGIN_ID}/HorizontalRow/deactivate"),
			None,
		),
	)
	.await;

	// Then: 200 with the page list, and the render degrades to a warning
	assert_eq!(status, StatusCode::OK);
	assert_eq!(body["affectedPages"][0]["pageId"], json!(page_id));
	let rendered = state
		.orchestrator
		.render_page(page_id, &BTreeMap::new())
		.await
		.unwrap();
	assert_eq!(rendered.warnings.len(), 1);
	assert!(rendered.warnings[0].contains("inactive"));
}

#[rstest]
#[tokio::test]
async fn test_template_over_repeater() {
	// Given: a products endpoint and a page binding a repeater to it
	let server = MockServer::start().await;
	Mock::given(method("GET"))
		.and(path("/products"))
		.respond_with(ResponseTemplate::new(200).set_body_json(
			json!({"items": [{"name": "A", "price": 1.5}, {"name": "B", "price": 2}]}),
		))
		.mount(&server)
		.await;

	let root = TempDir::new().unwrap();
	let state = booted_platform(&root).await;
	let sources = json!({
		"products": {"type": "API", "endpoint": format!("{}/products", server.uri())}
	});
	let (site_id, page_id) = seed_page(&state, Some(sources.to_string())).await;

	let tree = json!({
		"components": [{
			"instanceId": "list-1",
			"pluginId": KIT_PLUGIN_ID,
			"componentId": "ProductList",
			"iteratorConfig": {"dataPath": "items"},
			"children": [{
				"instanceId": "label-1",
				"parentId": "list-1",
				"pluginId": KIT_PLUGIN_ID,
				"componentId": "HorizontalRow",
				"props": {"label": "{{item.name}}: {{item.price}}"}
			}]
		}]
	});
	state
		.pages
		.save_version(site_id, page_id, tree.to_string(), None, None)
		.await
		.unwrap();

	// When: rendering the page and expanding the repeater the way the
	// frontend renderer does
	let rendered = state
		.orchestrator
		.render_page(page_id, &BTreeMap::new())
		.await
		.unwrap();
	assert!(rendered.errors.is_empty());
	assert!(rendered.warnings.is_empty());

	let repeater: &ComponentInstance = &rendered.tree.components[0];
	let ctx = DataContext::with_data_sources(rendered.data.clone());
	let expanded = expand_repeater(repeater, &rendered.data["products"], &ctx);

	// Then: two clones with resolved labels
	assert_eq!(expanded.len(), 2);
	assert_eq!(expanded[0].children[0].props["label"], json!("A: 1.5"));
	assert_eq!(expanded[1].children[0].props["label"], json!("B: 2"));
}

#[rstest]
#[tokio::test]
async fn test_partial_data_failure_keeps_page_alive() {
	// Given: one healthy and one broken source
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

	let root = TempDir::new().unwrap();
	let state = booted_platform(&root).await;
	let sources = json!({
		"good": {"type": "API", "endpoint": format!("{}/good", server.uri())},
		"bad": {"type": "API", "endpoint": format!("{}/bad", server.uri())}
	});
	let (_site_id, page_id) = seed_page(&state, Some(sources.to_string())).await;

	// When
	let (status, body) = call(&state, get(&format!("/pages/{page_id}/data"))).await;

	// Then: 200 with the good value and the bad error side by side
	assert_eq!(status, StatusCode::OK);
	assert_eq!(body["data"]["good"], json!([1, 2]));
	assert!(body["errors"]["bad"].as_str().unwrap().contains("500"));
	assert!(body["fetchTimeMs"].as_u64().unwrap() > 0);
}

#[rstest]
#[tokio::test]
async fn test_uninstall_keeps_catalog_rows_inactive() {
	// Given: a booted platform with a page using the kit
	let root = TempDir::new().unwrap();
	let state = booted_platform(&root).await;
	let (site_id, page_id) = seed_page(&state, None).await;
	state
		.pages
		.save_version(site_id, page_id, row_tree().to_string(), None, None)
		.await
		.unwrap();

	// When: uninstalling the plugin
	state.lifecycle.uninstall(KIT_PLUGIN_ID).await.unwrap();

	// Then: the plugin is gone, catalog rows survive inactive, pages render
	assert!(state.lifecycle.list().await.unwrap().is_empty());
	let all = state.registry.list_all().await.unwrap();
	assert_eq!(all.len(), 2);
	assert!(all.iter().all(|entry| !entry.is_active));

	let rendered = state
		.orchestrator
		.render_page(page_id, &BTreeMap::new())
		.await
		.unwrap();
	assert_eq!(rendered.tree.components.len(), 1);
	assert!(rendered.warnings[0].contains("inactive"));
}

#[rstest]
#[tokio::test]
async fn test_hot_reload_loads_new_package() {
	// Given: a platform watching an empty plugin directory
	let root = TempDir::new().unwrap();
	let state = platform(root.path());
	state.lifecycle.discover_and_load_all().await.unwrap();
	assert!(state.lifecycle.list().await.unwrap().is_empty());
	let handle = std::sync::Arc::clone(&state.lifecycle)
		.spawn_hot_reload(std::time::Duration::from_millis(50));

	// When: a package appears on disk
	write_kit_package(root.path());
	tokio::time::sleep(std::time::Duration::from_millis(300)).await;

	// Then: the rescan loaded and activated it
	let plugins = state.lifecycle.list().await.unwrap();
	assert_eq!(plugins.len(), 1);
	assert_eq!(plugins[0].state, PluginState::Active);
	handle.abort();
}
