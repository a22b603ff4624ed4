//! Catalog endpoints

use axum::Json;
use axum::extract::{Path, State};

use atelier_core::category::ComponentCategory;
use atelier_core::manifest::ComponentManifest;
use atelier_registry::RegistryEntry;

use crate::error::{ApiError, ApiResult};
use crate::state::AppState;

/// `GET /components`: active catalog entries.
pub async fn list_active(State(state): State<AppState>) -> ApiResult<Json<Vec<RegistryEntry>>> {
	Ok(Json(state.registry.list_active().await?))
}

/// `GET /components/category/{category}`: active entries of one category.
pub async fn by_category(
	State(state): State<AppState>,
	Path(category): Path<String>,
) -> ApiResult<Json<Vec<RegistryEntry>>> {
	let category = ComponentCategory::parse(&category)
		.ok_or_else(|| ApiError::BadRequest(format!("unknown category '{category}'")))?;
	Ok(Json(state.registry.by_category(category).await?))
}

/// `GET /components/{plugin_id}/{component_id}`: one entry.
pub async fn get_entry(
	State(state): State<AppState>,
	Path((plugin_id, component_id)): Path<(String, String)>,
) -> ApiResult<Json<RegistryEntry>> {
	state
		.registry
		.get(&plugin_id, &component_id)
		.await?
		.map(Json)
		.ok_or_else(|| ApiError::NotFound(format!("component {plugin_id}/{component_id}")))
}

/// `GET /components/{plugin_id}/{component_id}/manifest`: the manifest blob.
pub async fn get_manifest(
	State(state): State<AppState>,
	Path((plugin_id, component_id)): Path<(String, String)>,
) -> ApiResult<Json<ComponentManifest>> {
	state
		.registry
		.get_manifest(&plugin_id, &component_id)
		.await?
		.map(Json)
		.ok_or_else(|| ApiError::NotFound(format!("component {plugin_id}/{component_id}")))
}
