//! # Atelier Plugins
//!
//! The plugin host: package discovery on disk, descriptor parsing, per-
//! package isolation domains, and the lifecycle state machine
//! `Discovered → Loaded → Active ⇄ Inactive → Uninstalled`.
//!
//! ```text
//! atelier-plugins
//! ├── descriptor - plugin.toml reading and validation
//! ├── entry      - the entry-object trait and the static factory table
//! ├── context    - per-plugin context handed to lifecycle hooks
//! ├── isolation  - per-package scope owning the entry object
//! └── lifecycle  - the state machine and the live-plugin map
//! ```
//!
//! Entry objects are resolved through an explicit factory table keyed by the
//! descriptor's `main_class`: packages register an [`entry::EntryFactory`]
//! and the host never scans for annotated classes.

#![warn(rustdoc::broken_intra_doc_links)]

pub mod context;
pub mod descriptor;
pub mod entry;
pub mod isolation;
pub mod lifecycle;

pub use context::PluginContext;
pub use descriptor::{PackageMetadata, PackageReader, PluginType};
pub use entry::{EntryFactory, HookError, PluginEntry};
pub use isolation::IsolationDomain;
pub use lifecycle::{LifecycleManager, PluginState, PluginStatus};

/// Plugin error types
pub mod error {
	use thiserror::Error;

	use crate::lifecycle::PluginState;

	/// Errors surfaced by the plugin host
	#[derive(Error, Debug)]
	pub enum PluginError {
		/// The package descriptor is missing or unparsable
		#[error("malformed package: {0}")]
		MalformedPackage(String),

		/// The descriptor parses but violates the schema
		#[error("descriptor schema violation: {0}")]
		SchemaViolation(String),

		/// The descriptor names an unrecognized plugin type
		#[error("unsupported plugin type: {0}")]
		UnsupportedType(String),

		/// The isolation domain could not construct the entry object
		#[error("isolation init failed for '{plugin_id}': {reason}")]
		IsolationInitFailed {
			plugin_id: String,
			reason: String,
		},

		/// The plugin's on_load hook failed
		#[error("load failed for '{plugin_id}': {reason}")]
		LoadFailed {
			plugin_id: String,
			reason: String,
		},

		/// The plugin's on_activate hook failed
		#[error("activate failed for '{plugin_id}': {reason}")]
		ActivateFailed {
			plugin_id: String,
			reason: String,
		},

		/// The requested transition is not legal from the current state
		#[error("plugin '{plugin_id}' cannot {operation} while {state}")]
		InvalidTransition {
			plugin_id: String,
			state: PluginState,
			operation: &'static str,
		},

		/// No plugin with the given id is known to the host
		#[error("plugin not found: {0}")]
		NotFound(String),

		/// Component registration failed
		#[error(transparent)]
		Registry(#[from] atelier_registry::error::RegistryError),

		/// Filesystem access failed
		#[error("plugin io error: {0}")]
		Io(#[from] std::io::Error),
	}

	/// Result type for plugin-host operations
	pub type PluginResult<T> = Result<T, PluginError>;
}
