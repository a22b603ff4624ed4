//! Plugin entry objects
//!
//! A package's code is reached through exactly one entry object implementing
//! [`PluginEntry`]. The host resolves the descriptor's `main_class` against
//! a process-wide factory table populated with [`inventory`] (an explicit
//! registration, not a reflective scan).
//!
//! ```rust,ignore
//! struct DemoEntry;
//!
//! #[async_trait::async_trait]
//! impl PluginEntry for DemoEntry {
//!     fn component_manifests(&self) -> Vec<ComponentManifest> {
//!         vec![row_manifest()]
//!     }
//! }
//!
//! inventory::submit! {
//!     EntryFactory::new("demo::Entry", || Box::new(DemoEntry))
//! }
//! ```

use async_trait::async_trait;
use thiserror::Error;

use atelier_core::manifest::ComponentManifest;

use crate::context::PluginContext;

/// Failure returned by a lifecycle hook.
///
/// Hooks return a plain message; the host wraps it with the plugin identity
/// and decides the transition outcome.
#[derive(Debug, Error)]
#[error("{message}")]
pub struct HookError {
	/// Human-readable failure description
	pub message: String,
}

impl HookError {
	/// Build a hook error from any displayable message.
	pub fn new(message: impl Into<String>) -> Self {
		Self {
			message: message.into(),
		}
	}
}

/// The object a package exposes to the host.
///
/// All hooks default to no-ops so a plugin implements only what it needs;
/// a component plugin typically only overrides [`component_manifests`].
///
/// [`component_manifests`]: PluginEntry::component_manifests
#[async_trait]
pub trait PluginEntry: Send + Sync {
	/// Called once when the package loads, before registration.
	async fn on_load(&self, _ctx: &PluginContext) -> Result<(), HookError> {
		Ok(())
	}

	/// Called when the plugin becomes active.
	async fn on_activate(&self, _ctx: &PluginContext) -> Result<(), HookError> {
		Ok(())
	}

	/// Called when the plugin is deactivated. Shutdown is best-effort: an
	/// error is recorded but the transition still happens.
	async fn on_deactivate(&self, _ctx: &PluginContext) -> Result<(), HookError> {
		Ok(())
	}

	/// Called once before the package is torn down. Best-effort like
	/// deactivation.
	async fn on_uninstall(&self, _ctx: &PluginContext) -> Result<(), HookError> {
		Ok(())
	}

	/// The component manifests this plugin contributes. A single-component
	/// plugin returns a one-element vector.
	fn component_manifests(&self) -> Vec<ComponentManifest> {
		Vec::new()
	}
}

/// One row of the entry factory table.
pub struct EntryFactory {
	/// Key the descriptor's `main_class` must match
	pub main_class: &'static str,
	/// Constructor of the entry object
	pub construct: fn() -> Box<dyn PluginEntry>,
}

impl EntryFactory {
	/// Build a factory row.
	pub const fn new(main_class: &'static str, construct: fn() -> Box<dyn PluginEntry>) -> Self {
		Self {
			main_class,
			construct,
		}
	}
}

inventory::collect!(EntryFactory);

/// Look up the factory registered under `main_class`.
pub fn resolve_factory(main_class: &str) -> Option<&'static EntryFactory> {
	inventory::iter::<EntryFactory>().find(|f| f.main_class == main_class)
}
