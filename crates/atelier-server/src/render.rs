//! Render orchestrator
//!
//! For one page request: load the renderable version, parse its tree,
//! cross-check referenced components against the registry (warnings, never
//! failures), and aggregate the page's data sources. Template tokens are
//! NOT evaluated here; the frontend renderer resolves them against the
//! returned data bundle.

use std::collections::BTreeMap;
use std::sync::Arc;

use serde::Serialize;
use serde_json::Value as JsonValue;
use tracing::debug;
use uuid::Uuid;

use atelier_datasource::{DataSourceEngine, PageMeta};
use atelier_pages::{PageService, PageTree};
use atelier_registry::ComponentRegistry;

use crate::error::{ApiError, ApiResult};

/// The bundle a page request returns: the unresolved tree plus resolved
/// data, per-source errors, and registry warnings.
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct RenderedPage {
	pub tree: PageTree,
	pub data: BTreeMap<String, JsonValue>,
	pub errors: BTreeMap<String, String>,
	pub warnings: Vec<String>,
	pub page_meta: PageMeta,
	pub fetch_time_ms: u64,
}

/// Long-lived orchestrator over the page service, registry, and engine.
pub struct RenderOrchestrator {
	pages: Arc<PageService>,
	registry: Arc<ComponentRegistry>,
	engine: Arc<DataSourceEngine>,
}

impl RenderOrchestrator {
	/// Build the orchestrator.
	pub fn new(
		pages: Arc<PageService>,
		registry: Arc<ComponentRegistry>,
		engine: Arc<DataSourceEngine>,
	) -> Self {
		Self {
			pages,
			registry,
			engine,
		}
	}

	/// Page meta as echoed in data responses.
	pub async fn page_meta(&self, page_id: Uuid) -> ApiResult<PageMeta> {
		let page = self.pages.get_page(page_id).await?;
		Ok(PageMeta {
			page_id: page.id,
			page_name: page.page_name,
			title: page.title,
			description: page.description,
			path: page.path,
		})
	}

	/// The page's configured data sources, parsed.
	pub async fn page_sources(
		&self,
		page_id: Uuid,
	) -> ApiResult<BTreeMap<String, atelier_core::datasource::DataSourceConfig>> {
		let page = self.pages.get_page(page_id).await?;
		match page.data_sources_json.as_deref() {
			None | Some("") => Ok(BTreeMap::new()),
			Some(json) => DataSourceEngine::parse_sources(json)
				.map_err(|e| ApiError::BadRequest(e.to_string())),
		}
	}

	/// Assemble the full render bundle for a page.
	pub async fn render_page(
		&self,
		page_id: Uuid,
		params: &BTreeMap<String, String>,
	) -> ApiResult<RenderedPage> {
		let page_meta = self.page_meta(page_id).await?;

		let tree = match self.pages.renderable_version(page_id).await? {
			Some(version) => PageTree::from_json(&version.page_definition_json)?,
			None => PageTree::default(),
		};

		let mut warnings = Vec::new();
		for key in tree.referenced_keys() {
			match self.registry.get(&key.plugin_id, &key.component_id).await? {
				None => warnings.push(format!("unknown component {key}")),
				Some(entry) if !entry.is_active => {
					warnings.push(format!("component {key} is inactive"));
				}
				Some(_) => {}
			}
		}

		let sources = self.page_sources(page_id).await?;
		let page_data = self
			.engine
			.fetch_page_data(page_meta, &sources, params)
			.await;

		debug!(
			page = %page_id,
			sources = sources.len(),
			warnings = warnings.len(),
			"page rendered"
		);
		Ok(RenderedPage {
			tree,
			data: page_data.data,
			errors: page_data.errors,
			warnings,
			page_meta: page_data.page_meta,
			fetch_time_ms: page_data.fetch_time_ms,
		})
	}
}
