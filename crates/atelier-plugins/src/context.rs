//! Plugin contexts
//!
//! Each lifecycle hook receives a context scoped to its plugin: identity,
//! a private directory for on-disk state, a configuration mapping, and a
//! logging facade that stamps every event with the plugin id.

use std::collections::BTreeMap;
use std::path::{Path, PathBuf};

use serde_json::Value as JsonValue;
use tracing::{debug, error, info, warn};

/// Per-plugin context handed to lifecycle hooks.
#[derive(Debug, Clone)]
pub struct PluginContext {
	plugin_id: String,
	version: String,
	data_dir: PathBuf,
	config: BTreeMap<String, JsonValue>,
}

impl PluginContext {
	/// Build a context. The data directory is created lazily by
	/// [`PluginContext::data_dir`] callers writing into it.
	pub fn new(
		plugin_id: impl Into<String>,
		version: impl Into<String>,
		data_dir: PathBuf,
		config: BTreeMap<String, JsonValue>,
	) -> Self {
		Self {
			plugin_id: plugin_id.into(),
			version: version.into(),
			data_dir,
			config,
		}
	}

	/// The plugin's stable identifier.
	pub fn plugin_id(&self) -> &str {
		&self.plugin_id
	}

	/// The plugin's package version.
	pub fn version(&self) -> &str {
		&self.version
	}

	/// Directory reserved for this plugin's private state.
	pub fn data_dir(&self) -> &Path {
		&self.data_dir
	}

	/// One configuration value, if present.
	pub fn config_value(&self, key: &str) -> Option<&JsonValue> {
		self.config.get(key)
	}

	/// The full configuration mapping.
	pub fn config(&self) -> &BTreeMap<String, JsonValue> {
		&self.config
	}

	/// Log at info level under this plugin's identity.
	pub fn log_info(&self, message: &str) {
		info!(plugin = %self.plugin_id, "{message}");
	}

	/// Log at debug level under this plugin's identity.
	pub fn log_debug(&self, message: &str) {
		debug!(plugin = %self.plugin_id, "{message}");
	}

	/// Log at warn level under this plugin's identity.
	pub fn log_warn(&self, message: &str) {
		warn!(plugin = %self.plugin_id, "{message}");
	}

	/// Log at error level under this plugin's identity.
	pub fn log_error(&self, message: &str) {
		error!(plugin = %self.plugin_id, "{message}");
	}
}
