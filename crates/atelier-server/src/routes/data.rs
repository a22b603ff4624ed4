//! Page-data endpoints

use std::collections::BTreeMap;

use axum::Json;
use axum::extract::{Path, Query, State};
use uuid::Uuid;

use atelier_core::datasource::DataSourceConfig;
use atelier_datasource::{DataSourceResult, PageData};

use crate::error::ApiResult;
use crate::state::AppState;

/// `GET /pages/{pageId}/data?...`: aggregate every configured source.
/// Query parameters become the request parameters sources see.
pub async fn page_data(
	State(state): State<AppState>,
	Path(page_id): Path<Uuid>,
	Query(params): Query<BTreeMap<String, String>>,
) -> ApiResult<Json<PageData>> {
	let page_meta = state.orchestrator.page_meta(page_id).await?;
	let sources = state.orchestrator.page_sources(page_id).await?;
	Ok(Json(
		state
			.engine
			.fetch_page_data(page_meta, &sources, &params)
			.await,
	))
}

/// `GET /pages/{pageId}/data/batch?keys=a,b`: refresh only the listed
/// sources. Remaining query parameters pass through as request parameters.
pub async fn batch(
	State(state): State<AppState>,
	Path(page_id): Path<Uuid>,
	Query(mut params): Query<BTreeMap<String, String>>,
) -> ApiResult<Json<PageData>> {
	let page_meta = state.orchestrator.page_meta(page_id).await?;
	let sources = state.orchestrator.page_sources(page_id).await?;
	let keys: Vec<String> = params
		.remove("keys")
		.unwrap_or_default()
		.split(',')
		.map(str::trim)
		.filter(|k| !k.is_empty())
		.map(str::to_string)
		.collect();
	Ok(Json(
		state
			.engine
			.fetch_batch(page_meta, &sources, &keys, &params)
			.await,
	))
}

/// `GET /pages/{pageId}/data/{key}?...`: one source, reported as a result
/// with its status.
pub async fn single(
	State(state): State<AppState>,
	Path((page_id, key)): Path<(Uuid, String)>,
	Query(params): Query<BTreeMap<String, String>>,
) -> ApiResult<Json<DataSourceResult>> {
	let page_meta = state.orchestrator.page_meta(page_id).await?;
	let sources = state.orchestrator.page_sources(page_id).await?;
	let page_data = state
		.engine
		.fetch_batch(page_meta, &sources, std::slice::from_ref(&key), &params)
		.await;

	let result = match page_data.data.get(&key) {
		Some(value) => DataSourceResult {
			success: true,
			status_code: Some(200),
			data: Some(value.clone()),
			message: None,
		},
		None => DataSourceResult {
			success: false,
			status_code: None,
			data: None,
			message: page_data.errors.get(&key).cloned(),
		},
	};
	Ok(Json(result))
}

/// `POST /pages/data/validate`: probe one configuration.
pub async fn validate(
	State(state): State<AppState>,
	Json(config): Json<DataSourceConfig>,
) -> Json<DataSourceResult> {
	Json(state.engine.test_data_source(&config).await)
}
