//! Shared application state
//!
//! The long-lived values created once at startup and handed to every
//! request handler, instead of container-managed singletons.

use std::sync::Arc;

use atelier_datasource::{DataSourceEngine, EngineConfig};
use atelier_pages::{
	InMemoryPageStore, InMemorySiteStore, InMemoryVersionStore, PageService,
};
use atelier_plugins::LifecycleManager;
use atelier_registry::{ComponentRegistry, InMemoryRegistryStore};

use crate::config::ServerConfig;
use crate::render::RenderOrchestrator;

/// Everything a request handler can reach.
#[derive(Clone)]
pub struct AppState {
	pub config: Arc<ServerConfig>,
	pub registry: Arc<ComponentRegistry>,
	pub lifecycle: Arc<LifecycleManager>,
	pub pages: Arc<PageService>,
	pub engine: Arc<DataSourceEngine>,
	pub orchestrator: Arc<RenderOrchestrator>,
}

impl AppState {
	/// Wire the host from configuration with in-memory stores.
	///
	/// The relational driver swaps in by constructing the same services
	/// over its own store implementations.
	pub fn new(config: ServerConfig) -> Self {
		let pages = Arc::new(PageService::new(
			Arc::new(InMemorySiteStore::new()),
			Arc::new(InMemoryPageStore::new()),
			Arc::new(InMemoryVersionStore::new()),
		));
		let registry = Arc::new(ComponentRegistry::new(
			Arc::new(InMemoryRegistryStore::new()),
			pages.clone(),
		));
		let lifecycle = Arc::new(
			LifecycleManager::new(registry.clone(), config.plugin.directory.clone())
				.with_validation(config.plugin.validation.enabled),
		);
		let engine = Arc::new(DataSourceEngine::new(EngineConfig {
			default_cache_ttl: config.default_cache_ttl(),
			fetch_timeout: config.fetch_timeout(),
		}));
		let orchestrator = Arc::new(RenderOrchestrator::new(
			pages.clone(),
			registry.clone(),
			engine.clone(),
		));
		Self {
			config: Arc::new(config),
			registry,
			lifecycle,
			pages,
			engine,
			orchestrator,
		}
	}
}
