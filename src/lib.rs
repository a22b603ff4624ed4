//! # Atelier
//!
//! A plugin-hosting site platform. Third-party packages contribute UI
//! component manifests, lifecycle hooks, and persistence extensions; the
//! host catalogs their components, stores versioned page trees, and serves
//! render bundles with data aggregated from per-page declarative sources.
//!
//! This facade re-exports the workspace members:
//!
//! - [`core`]: manifests, instance trees, data-source configs
//! - [`template`]: `{{path}}` token resolution over data contexts
//! - [`plugins`]: package discovery, isolation, lifecycle
//! - [`registry`]: the durable component catalog
//! - [`pages`]: sites, pages, versions, repeater semantics
//! - [`datasource`]: parallel fetch, mapping, TTL cache
//! - [`server`]: render orchestrator and HTTP surface
//!
//! ## Quick start
//!
//! ```rust,no_run
//! use atelier::server::routes;
//! use atelier::server::{AppState, ServerConfig};
//!
//! #[tokio::main]
//! async fn main() {
//!     let state = AppState::new(ServerConfig::default());
//!     state.lifecycle.discover_and_load_all().await.unwrap();
//!     let router = routes::router(state);
//!     let listener = tokio::net::TcpListener::bind(("0.0.0.0", 8080)).await.unwrap();
//!     axum::serve(listener, router).await.unwrap();
//! }
//! ```

pub use atelier_core as core;
pub use atelier_datasource as datasource;
pub use atelier_pages as pages;
pub use atelier_plugins as plugins;
pub use atelier_registry as registry;
pub use atelier_server as server;
pub use atelier_template as template;

pub mod prelude {
	//! Commonly used items in one import

	pub use atelier_core::prelude::*;
	pub use atelier_datasource::{DataSourceEngine, PageData, PageMeta};
	pub use atelier_pages::{PageService, PageTree};
	pub use atelier_plugins::{
		EntryFactory, HookError, LifecycleManager, PluginContext, PluginEntry, PluginState,
	};
	pub use atelier_registry::{ComponentRegistry, RegistryEntry};
	pub use atelier_template::{DataContext, resolve_props, resolve_str};
}
