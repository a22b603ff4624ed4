//! Site endpoints and site-scoped page endpoints
//!
//! Mutating a site requires the caller to own it; a missing caller id is
//! 401, a foreign caller 403.

use axum::Json;
use axum::extract::{Path, State};
use axum::http::{HeaderMap, StatusCode};
use serde::Deserialize;
use uuid::Uuid;

use atelier_pages::model::{PageDefinition, Site};
use atelier_pages::service::{NewPage, NewSite};

use crate::error::{ApiError, ApiResult};
use crate::routes::require_caller;
use crate::state::AppState;

async fn require_owned_site(
	state: &AppState,
	site_id: Uuid,
	headers: &HeaderMap,
) -> ApiResult<Site> {
	let caller = require_caller(headers)?;
	let site = state.pages.get_site(site_id).await?;
	if site.owner_user_id != caller {
		return Err(ApiError::Forbidden(format!(
			"site {site_id} belongs to another user"
		)));
	}
	Ok(site)
}

/// `GET /sites`
pub async fn list(State(state): State<AppState>) -> ApiResult<Json<Vec<Site>>> {
	Ok(Json(state.pages.list_sites().await?))
}

#[derive(Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CreateSiteBody {
	pub site_name: String,
	pub site_slug: Option<String>,
	pub site_mode: Option<String>,
	pub domain_name: Option<String>,
	pub favicon_url: Option<String>,
}

/// `POST /sites`: the caller becomes the owner.
pub async fn create(
	State(state): State<AppState>,
	headers: HeaderMap,
	Json(body): Json<CreateSiteBody>,
) -> ApiResult<(StatusCode, Json<Site>)> {
	let caller = require_caller(&headers)?;
	let site = state
		.pages
		.create_site(NewSite {
			site_name: body.site_name,
			site_slug: body.site_slug,
			site_mode: body.site_mode,
			owner_user_id: caller,
			domain_name: body.domain_name,
			favicon_url: body.favicon_url,
		})
		.await?;
	Ok((StatusCode::CREATED, Json(site)))
}

#[derive(Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct UpdateSiteBody {
	pub site_name: Option<String>,
	pub site_mode: Option<String>,
	pub domain_name: Option<String>,
	pub favicon_url: Option<String>,
}

/// `PUT /sites/{id}`
pub async fn update(
	State(state): State<AppState>,
	Path(site_id): Path<Uuid>,
	headers: HeaderMap,
	Json(body): Json<UpdateSiteBody>,
) -> ApiResult<Json<Site>> {
	let mut site = require_owned_site(&state, site_id, &headers).await?;
	if let Some(site_name) = body.site_name {
		site.site_name = site_name;
	}
	if let Some(site_mode) = body.site_mode {
		site.site_mode = Some(site_mode);
	}
	if let Some(domain_name) = body.domain_name {
		site.domain_name = Some(domain_name);
	}
	if let Some(favicon_url) = body.favicon_url {
		site.favicon_url = Some(favicon_url);
	}
	Ok(Json(state.pages.update_site(site).await?))
}

/// `DELETE /sites/{id}`: cascades to pages and versions.
pub async fn remove(
	State(state): State<AppState>,
	Path(site_id): Path<Uuid>,
	headers: HeaderMap,
) -> ApiResult<StatusCode> {
	require_owned_site(&state, site_id, &headers).await?;
	state.pages.delete_site(site_id).await?;
	Ok(StatusCode::NO_CONTENT)
}

/// `POST /sites/{id}/publish`
pub async fn publish(
	State(state): State<AppState>,
	Path(site_id): Path<Uuid>,
	headers: HeaderMap,
) -> ApiResult<Json<Site>> {
	require_owned_site(&state, site_id, &headers).await?;
	Ok(Json(state.pages.publish_site(site_id).await?))
}

/// `POST /sites/{id}/unpublish`
pub async fn unpublish(
	State(state): State<AppState>,
	Path(site_id): Path<Uuid>,
	headers: HeaderMap,
) -> ApiResult<Json<Site>> {
	require_owned_site(&state, site_id, &headers).await?;
	Ok(Json(state.pages.unpublish_site(site_id).await?))
}

/// `GET /sites/{siteId}/pages`
pub async fn list_pages(
	State(state): State<AppState>,
	Path(site_id): Path<Uuid>,
) -> ApiResult<Json<Vec<PageDefinition>>> {
	Ok(Json(state.pages.list_pages(site_id).await?))
}

#[derive(Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CreatePageBody {
	pub page_name: String,
	pub title: Option<String>,
	pub description: Option<String>,
	pub path: Option<String>,
	/// Data-source configs as a JSON object `{name: config}`
	pub data_sources: Option<serde_json::Value>,
	pub layout_id: Option<String>,
	pub parent_page_id: Option<Uuid>,
}

/// `POST /sites/{siteId}/pages`
pub async fn create_page(
	State(state): State<AppState>,
	Path(site_id): Path<Uuid>,
	headers: HeaderMap,
	Json(body): Json<CreatePageBody>,
) -> ApiResult<(StatusCode, Json<PageDefinition>)> {
	require_owned_site(&state, site_id, &headers).await?;
	let page = state
		.pages
		.create_page(
			site_id,
			NewPage {
				page_name: body.page_name,
				title: body.title,
				description: body.description,
				path: body.path,
				data_sources_json: body.data_sources.map(|v| v.to_string()),
				layout_id: body.layout_id,
				parent_page_id: body.parent_page_id,
			},
		)
		.await?;
	Ok((StatusCode::CREATED, Json(page)))
}

#[derive(Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ReorderBody {
	pub ordered_ids: Vec<Uuid>,
}

/// `POST /sites/{siteId}/pages/reorder`
pub async fn reorder_pages(
	State(state): State<AppState>,
	Path(site_id): Path<Uuid>,
	headers: HeaderMap,
	Json(body): Json<ReorderBody>,
) -> ApiResult<Json<Vec<PageDefinition>>> {
	require_owned_site(&state, site_id, &headers).await?;
	state.pages.reorder_pages(site_id, &body.ordered_ids).await?;
	Ok(Json(state.pages.list_pages(site_id).await?))
}
