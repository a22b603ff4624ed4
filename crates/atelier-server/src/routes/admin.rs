//! Admin endpoints: component registration, package install, plugin
//! lifecycle, and cache maintenance.

use std::path::PathBuf;

use axum::Json;
use axum::extract::{Path, Query, State};
use axum::http::StatusCode;
use serde::{Deserialize, Serialize};

use atelier_core::manifest::ComponentManifest;
use atelier_plugins::PluginStatus;
use atelier_registry::RegistryEntry;
use atelier_registry::usage::PageRef;

use crate::error::ApiResult;
use crate::state::AppState;

/// `POST /admin/components/register`: register from manifest JSON.
pub async fn register_component(
	State(state): State<AppState>,
	Json(manifest): Json<ComponentManifest>,
) -> ApiResult<(StatusCode, Json<RegistryEntry>)> {
	let entry = state.registry.register(manifest).await?;
	Ok((StatusCode::CREATED, Json(entry)))
}

#[derive(Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct UploadBody {
	/// Package directory staged by the upload edge
	pub staged_path: PathBuf,
}

#[derive(Serialize)]
#[serde(rename_all = "camelCase")]
pub struct UploadResponse {
	pub plugin_id: String,
	pub version: String,
}

/// `POST /admin/components/upload`: install and activate a staged package.
///
/// The external HTTP edge parses the multipart upload and unpacks it to a
/// staging directory; this endpoint receives that path.
pub async fn upload_package(
	State(state): State<AppState>,
	Json(body): Json<UploadBody>,
) -> ApiResult<(StatusCode, Json<UploadResponse>)> {
	let status = state.lifecycle.install_and_activate(&body.staged_path).await?;
	Ok((
		StatusCode::CREATED,
		Json(UploadResponse {
			plugin_id: status.plugin_id,
			version: status.version,
		}),
	))
}

/// `PATCH /admin/components/{p}/{c}/activate`
pub async fn activate_component(
	State(state): State<AppState>,
	Path((plugin_id, component_id)): Path<(String, String)>,
) -> ApiResult<Json<RegistryEntry>> {
	Ok(Json(
		state.registry.activate(&plugin_id, &component_id).await?,
	))
}

#[derive(Serialize)]
#[serde(rename_all = "camelCase")]
pub struct DeactivateResponse {
	pub entry: RegistryEntry,
	pub affected_pages: Vec<PageRef>,
}

/// `PATCH /admin/components/{p}/{c}/deactivate`: deactivate and report the
/// pages still referencing the component.
pub async fn deactivate_component(
	State(state): State<AppState>,
	Path((plugin_id, component_id)): Path<(String, String)>,
) -> ApiResult<Json<DeactivateResponse>> {
	let entry = state.registry.deactivate(&plugin_id, &component_id).await?;
	let affected_pages = state
		.registry
		.find_pages_using(&plugin_id, &component_id)
		.await?;
	Ok(Json(DeactivateResponse {
		entry,
		affected_pages,
	}))
}

/// `DELETE /admin/components/{p}/{c}`: hard delete; 400 while in use.
pub async fn delete_component(
	State(state): State<AppState>,
	Path((plugin_id, component_id)): Path<(String, String)>,
) -> ApiResult<StatusCode> {
	state.registry.unregister(&plugin_id, &component_id).await?;
	Ok(StatusCode::NO_CONTENT)
}

/// `GET /admin/plugins`: lifecycle snapshot.
pub async fn list_plugins(State(state): State<AppState>) -> ApiResult<Json<Vec<PluginStatus>>> {
	Ok(Json(state.lifecycle.list().await?))
}

/// `POST /admin/plugins/{id}/activate`
pub async fn activate_plugin(
	State(state): State<AppState>,
	Path(plugin_id): Path<String>,
) -> ApiResult<Json<PluginStatus>> {
	Ok(Json(state.lifecycle.activate(&plugin_id).await?))
}

/// `POST /admin/plugins/{id}/deactivate`
pub async fn deactivate_plugin(
	State(state): State<AppState>,
	Path(plugin_id): Path<String>,
) -> ApiResult<Json<PluginStatus>> {
	Ok(Json(state.lifecycle.deactivate(&plugin_id).await?))
}

/// `DELETE /admin/plugins/{id}`: uninstall; registry entries survive as
/// inactive rows.
pub async fn uninstall_plugin(
	State(state): State<AppState>,
	Path(plugin_id): Path<String>,
) -> ApiResult<StatusCode> {
	state.lifecycle.uninstall(&plugin_id).await?;
	Ok(StatusCode::NO_CONTENT)
}

#[derive(Deserialize)]
pub struct CacheClearQuery {
	pub key: Option<String>,
}

/// `POST /admin/datasource/cache/clear[?key=]`
pub async fn clear_cache(
	State(state): State<AppState>,
	Query(query): Query<CacheClearQuery>,
) -> StatusCode {
	match query.key.as_deref() {
		Some(key) => state.engine.clear_cache_key(key),
		None => state.engine.clear_cache(),
	}
	StatusCode::NO_CONTENT
}
