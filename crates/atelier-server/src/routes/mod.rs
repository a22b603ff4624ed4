//! HTTP surface
//!
//! JSON endpoints over the catalog, sites and pages, version history, the
//! plugin lifecycle, and page-data aggregation. Caller identity arrives as
//! the `x-user-id` header injected by the external authentication edge.

pub mod admin;
pub mod components;
pub mod data;
pub mod pages;
pub mod sites;

use axum::Router;
use axum::http::HeaderMap;
use axum::routing::{delete, get, patch, post, put};

use crate::error::{ApiError, ApiResult};
use crate::state::AppState;

/// Header carrying the authenticated caller's id.
pub const USER_ID_HEADER: &str = "x-user-id";

/// Build the full router.
pub fn router(state: AppState) -> Router {
	Router::new()
		// Catalog
		.route("/components", get(components::list_active))
		.route("/components/category/{category}", get(components::by_category))
		.route(
			"/components/{plugin_id}/{component_id}",
			get(components::get_entry),
		)
		.route(
			"/components/{plugin_id}/{component_id}/manifest",
			get(components::get_manifest),
		)
		// Admin: components and packages
		.route("/admin/components/register", post(admin::register_component))
		.route("/admin/components/upload", post(admin::upload_package))
		.route(
			"/admin/components/{plugin_id}/{component_id}/activate",
			patch(admin::activate_component),
		)
		.route(
			"/admin/components/{plugin_id}/{component_id}/deactivate",
			patch(admin::deactivate_component),
		)
		.route(
			"/admin/components/{plugin_id}/{component_id}",
			delete(admin::delete_component),
		)
		// Admin: plugin lifecycle
		.route("/admin/plugins", get(admin::list_plugins))
		.route("/admin/plugins/{plugin_id}/activate", post(admin::activate_plugin))
		.route(
			"/admin/plugins/{plugin_id}/deactivate",
			post(admin::deactivate_plugin),
		)
		.route("/admin/plugins/{plugin_id}", delete(admin::uninstall_plugin))
		.route("/admin/datasource/cache/clear", post(admin::clear_cache))
		// Sites and their pages
		.route("/sites", get(sites::list).post(sites::create))
		.route("/sites/{site_id}", put(sites::update).delete(sites::remove))
		.route("/sites/{site_id}/publish", post(sites::publish))
		.route("/sites/{site_id}/unpublish", post(sites::unpublish))
		.route(
			"/sites/{site_id}/pages",
			get(sites::list_pages).post(sites::create_page),
		)
		.route("/sites/{site_id}/pages/reorder", post(sites::reorder_pages))
		// Pages, versions, render
		.route(
			"/pages/{page_id}",
			get(pages::get_page).put(pages::update_page).delete(pages::delete_page),
		)
		.route(
			"/pages/{page_id}/versions",
			get(pages::history).post(pages::save_version),
		)
		.route(
			"/pages/{page_id}/versions/{version_id}",
			delete(pages::delete_version),
		)
		.route(
			"/pages/{page_id}/versions/{version_id}/restore",
			post(pages::restore),
		)
		.route("/pages/{page_id}/render", get(pages::render))
		// Page data
		.route("/pages/data/validate", post(data::validate))
		.route("/pages/{page_id}/data", get(data::page_data))
		.route("/pages/{page_id}/data/batch", get(data::batch))
		.route("/pages/{page_id}/data/{key}", get(data::single))
		.with_state(state)
}

/// The caller's id, when the edge forwarded one.
pub(crate) fn caller_id(headers: &HeaderMap) -> Option<String> {
	headers
		.get(USER_ID_HEADER)
		.and_then(|v| v.to_str().ok())
		.map(str::to_string)
		.filter(|s| !s.is_empty())
}

/// The caller's id, or 401.
pub(crate) fn require_caller(headers: &HeaderMap) -> ApiResult<String> {
	caller_id(headers).ok_or_else(|| {
		ApiError::Unauthorized(format!("missing {USER_ID_HEADER} header"))
	})
}
