//! Page, version, and render endpoints

use std::collections::BTreeMap;

use axum::Json;
use axum::extract::{Path, Query, State};
use axum::http::{HeaderMap, StatusCode};
use serde::Deserialize;
use uuid::Uuid;

use atelier_pages::model::{PageDefinition, PageVersion};

use crate::error::{ApiError, ApiResult};
use crate::render::RenderedPage;
use crate::routes::{caller_id, require_caller};
use crate::state::AppState;

/// `GET /pages/{pageId}`
pub async fn get_page(
	State(state): State<AppState>,
	Path(page_id): Path<Uuid>,
) -> ApiResult<Json<PageDefinition>> {
	Ok(Json(state.pages.get_page(page_id).await?))
}

#[derive(Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct UpdatePageBody {
	pub page_name: Option<String>,
	pub title: Option<String>,
	pub description: Option<String>,
	pub path: Option<String>,
	pub data_sources: Option<serde_json::Value>,
	pub layout_id: Option<String>,
	pub parent_page_id: Option<Uuid>,
	pub published: Option<bool>,
}

/// `PUT /pages/{pageId}`: metadata edits; the slug never changes here.
pub async fn update_page(
	State(state): State<AppState>,
	Path(page_id): Path<Uuid>,
	headers: HeaderMap,
	Json(body): Json<UpdatePageBody>,
) -> ApiResult<Json<PageDefinition>> {
	let mut page = require_owned_page(&state, page_id, &headers).await?;
	if let Some(page_name) = body.page_name {
		page.page_name = page_name;
	}
	if let Some(title) = body.title {
		page.title = Some(title);
	}
	if let Some(description) = body.description {
		page.description = Some(description);
	}
	if let Some(path) = body.path {
		page.path = Some(path);
	}
	if let Some(data_sources) = body.data_sources {
		page.data_sources_json = Some(data_sources.to_string());
	}
	if let Some(layout_id) = body.layout_id {
		page.layout_id = Some(layout_id);
	}
	if let Some(parent_page_id) = body.parent_page_id {
		page.parent_page_id = Some(parent_page_id);
	}
	if let Some(published) = body.published {
		page.published = published;
		if published {
			page.published_at = Some(chrono::Utc::now());
		}
	}
	Ok(Json(state.pages.update_page(page).await?))
}

/// `DELETE /pages/{pageId}`: cascades to versions.
pub async fn delete_page(
	State(state): State<AppState>,
	Path(page_id): Path<Uuid>,
	headers: HeaderMap,
) -> ApiResult<StatusCode> {
	require_owned_page(&state, page_id, &headers).await?;
	state.pages.delete_page(page_id).await?;
	Ok(StatusCode::NO_CONTENT)
}

#[derive(Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SaveVersionBody {
	pub site_id: Uuid,
	/// The tree, as the editor's JSON
	pub page_definition: serde_json::Value,
	pub change_description: Option<String>,
}

/// `POST /pages/{pageId}/versions`: append and activate a new version.
pub async fn save_version(
	State(state): State<AppState>,
	Path(page_id): Path<Uuid>,
	headers: HeaderMap,
	Json(body): Json<SaveVersionBody>,
) -> ApiResult<(StatusCode, Json<PageVersion>)> {
	let caller = require_caller(&headers)?;
	let version = state
		.pages
		.save_version(
			body.site_id,
			page_id,
			body.page_definition.to_string(),
			body.change_description,
			Some(caller),
		)
		.await?;
	Ok((StatusCode::CREATED, Json(version)))
}

/// `GET /pages/{pageId}/versions`: history, newest first.
pub async fn history(
	State(state): State<AppState>,
	Path(page_id): Path<Uuid>,
) -> ApiResult<Json<Vec<PageVersion>>> {
	Ok(Json(state.pages.version_history(page_id).await?))
}

/// `POST /pages/{pageId}/versions/{versionId}/restore`
pub async fn restore(
	State(state): State<AppState>,
	Path((page_id, version_id)): Path<(Uuid, Uuid)>,
	headers: HeaderMap,
) -> ApiResult<(StatusCode, Json<PageVersion>)> {
	let version = state
		.pages
		.restore_version(page_id, version_id, caller_id(&headers))
		.await?;
	Ok((StatusCode::CREATED, Json(version)))
}

/// `DELETE /pages/{pageId}/versions/{versionId}`: non-active only.
pub async fn delete_version(
	State(state): State<AppState>,
	Path((page_id, version_id)): Path<(Uuid, Uuid)>,
	headers: HeaderMap,
) -> ApiResult<StatusCode> {
	require_owned_page(&state, page_id, &headers).await?;
	state.pages.delete_version(page_id, version_id).await?;
	Ok(StatusCode::NO_CONTENT)
}

/// `GET /pages/{pageId}/render?...`: the full render bundle.
pub async fn render(
	State(state): State<AppState>,
	Path(page_id): Path<Uuid>,
	Query(params): Query<BTreeMap<String, String>>,
) -> ApiResult<Json<RenderedPage>> {
	Ok(Json(state.orchestrator.render_page(page_id, &params).await?))
}

async fn require_owned_page(
	state: &AppState,
	page_id: Uuid,
	headers: &HeaderMap,
) -> ApiResult<PageDefinition> {
	let caller = require_caller(headers)?;
	let page = state.pages.get_page(page_id).await?;
	let site = state.pages.get_site(page.site_id).await?;
	if site.owner_user_id != caller {
		return Err(ApiError::Forbidden(format!(
			"page {page_id} belongs to another user"
		)));
	}
	Ok(page)
}
