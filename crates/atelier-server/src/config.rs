//! Host configuration
//!
//! Options load from an optional TOML file and are overridden by
//! `ATELIER_*` environment variables. Invalid configuration is a fatal
//! startup error.
//!
//! ```toml
//! [plugin]
//! directory = "./plugins"
//!
//! [plugin.hot-reload]
//! enabled = false
//! interval-ms = 30000
//!
//! [plugin.validation]
//! enabled = true
//!
//! [datasource]
//! fetch-timeout-ms = 10000
//!
//! [datasource.cache]
//! default-ttl-ms = 60000
//!
//! [server]
//! port = 8080
//! ```

use std::path::{Path, PathBuf};
use std::time::Duration;

use serde::Deserialize;
use thiserror::Error;

/// Configuration loading failures. Fatal at startup (exit code 1).
#[derive(Error, Debug)]
pub enum ConfigError {
	#[error("config file {path} unreadable: {source}")]
	Unreadable {
		path: PathBuf,
		source: std::io::Error,
	},

	#[error("config file {path} invalid: {reason}")]
	Invalid { path: PathBuf, reason: String },

	#[error("environment override {variable} invalid: {reason}")]
	BadOverride { variable: String, reason: String },
}

/// Top-level host configuration.
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct ServerConfig {
	pub plugin: PluginSection,
	pub datasource: DatasourceSection,
	pub server: ServerSection,
}

/// `[plugin]` options.
#[derive(Debug, Clone, Deserialize)]
#[serde(default, deny_unknown_fields, rename_all = "kebab-case")]
pub struct PluginSection {
	/// Directory scanned for packages
	pub directory: PathBuf,
	pub hot_reload: HotReloadSection,
	pub validation: ValidationSection,
}

impl Default for PluginSection {
	fn default() -> Self {
		Self {
			directory: PathBuf::from("./plugins"),
			hot_reload: HotReloadSection::default(),
			validation: ValidationSection::default(),
		}
	}
}

/// `[plugin.hot-reload]` options.
#[derive(Debug, Clone, Deserialize)]
#[serde(default, deny_unknown_fields, rename_all = "kebab-case")]
pub struct HotReloadSection {
	pub enabled: bool,
	pub interval_ms: u64,
}

impl Default for HotReloadSection {
	fn default() -> Self {
		Self {
			enabled: false,
			interval_ms: 30_000,
		}
	}
}

/// `[plugin.validation]` options.
#[derive(Debug, Clone, Deserialize)]
#[serde(default, deny_unknown_fields, rename_all = "kebab-case")]
pub struct ValidationSection {
	pub enabled: bool,
}

impl Default for ValidationSection {
	fn default() -> Self {
		Self { enabled: true }
	}
}

/// `[datasource]` options.
#[derive(Debug, Clone, Deserialize)]
#[serde(default, deny_unknown_fields, rename_all = "kebab-case")]
pub struct DatasourceSection {
	pub fetch_timeout_ms: u64,
	pub cache: CacheSection,
}

impl Default for DatasourceSection {
	fn default() -> Self {
		Self {
			fetch_timeout_ms: 10_000,
			cache: CacheSection::default(),
		}
	}
}

/// `[datasource.cache]` options.
#[derive(Debug, Clone, Deserialize)]
#[serde(default, deny_unknown_fields, rename_all = "kebab-case")]
pub struct CacheSection {
	pub default_ttl_ms: u64,
}

impl Default for CacheSection {
	fn default() -> Self {
		Self {
			default_ttl_ms: 60_000,
		}
	}
}

/// `[server]` options.
#[derive(Debug, Clone, Deserialize)]
#[serde(default, deny_unknown_fields, rename_all = "kebab-case")]
pub struct ServerSection {
	pub port: u16,
}

impl Default for ServerSection {
	fn default() -> Self {
		Self { port: 8080 }
	}
}

impl ServerConfig {
	/// Load from an optional file, then apply `ATELIER_*` environment
	/// overrides from the process environment.
	pub fn load(path: Option<&Path>) -> Result<Self, ConfigError> {
		let mut config = match path {
			Some(path) => Self::from_file(path)?,
			None => Self::default(),
		};
		config.apply_env_overrides(|variable| std::env::var(variable).ok())?;
		Ok(config)
	}

	/// Parse one TOML file.
	pub fn from_file(path: &Path) -> Result<Self, ConfigError> {
		let text = std::fs::read_to_string(path).map_err(|source| ConfigError::Unreadable {
			path: path.to_path_buf(),
			source,
		})?;
		toml::from_str(&text).map_err(|e| ConfigError::Invalid {
			path: path.to_path_buf(),
			reason: e.to_string(),
		})
	}

	/// Apply environment overrides through a lookup function (injected so
	/// tests need not mutate the process environment).
	pub fn apply_env_overrides(
		&mut self,
		lookup: impl Fn(&str) -> Option<String>,
	) -> Result<(), ConfigError> {
		if let Some(value) = lookup("ATELIER_PLUGIN_DIRECTORY") {
			self.plugin.directory = PathBuf::from(value);
		}
		if let Some(value) = lookup("ATELIER_PLUGIN_HOT_RELOAD_ENABLED") {
			self.plugin.hot_reload.enabled = parse_bool("ATELIER_PLUGIN_HOT_RELOAD_ENABLED", &value)?;
		}
		if let Some(value) = lookup("ATELIER_PLUGIN_VALIDATION_ENABLED") {
			self.plugin.validation.enabled = parse_bool("ATELIER_PLUGIN_VALIDATION_ENABLED", &value)?;
		}
		if let Some(value) = lookup("ATELIER_DATASOURCE_FETCH_TIMEOUT_MS") {
			self.datasource.fetch_timeout_ms = parse_u64("ATELIER_DATASOURCE_FETCH_TIMEOUT_MS", &value)?;
		}
		if let Some(value) = lookup("ATELIER_DATASOURCE_CACHE_DEFAULT_TTL_MS") {
			self.datasource.cache.default_ttl_ms =
				parse_u64("ATELIER_DATASOURCE_CACHE_DEFAULT_TTL_MS", &value)?;
		}
		if let Some(value) = lookup("ATELIER_SERVER_PORT") {
			self.server.port = parse_u64("ATELIER_SERVER_PORT", &value)?
				.try_into()
				.map_err(|_| ConfigError::BadOverride {
					variable: "ATELIER_SERVER_PORT".to_string(),
					reason: format!("'{value}' is not a valid port"),
				})?;
		}
		Ok(())
	}

	/// Per-fetch timeout as a duration.
	pub fn fetch_timeout(&self) -> Duration {
		Duration::from_millis(self.datasource.fetch_timeout_ms)
	}

	/// Default cache TTL as a duration.
	pub fn default_cache_ttl(&self) -> Duration {
		Duration::from_millis(self.datasource.cache.default_ttl_ms)
	}

	/// Hot-reload scan interval as a duration.
	pub fn hot_reload_interval(&self) -> Duration {
		Duration::from_millis(self.plugin.hot_reload.interval_ms)
	}
}

fn parse_bool(variable: &str, value: &str) -> Result<bool, ConfigError> {
	match value.trim().to_ascii_lowercase().as_str() {
		"true" | "1" | "yes" => Ok(true),
		"false" | "0" | "no" => Ok(false),
		_ => Err(ConfigError::BadOverride {
			variable: variable.to_string(),
			reason: format!("'{value}' is not a boolean"),
		}),
	}
}

fn parse_u64(variable: &str, value: &str) -> Result<u64, ConfigError> {
	value.trim().parse().map_err(|_| ConfigError::BadOverride {
		variable: variable.to_string(),
		reason: format!("'{value}' is not an integer"),
	})
}

#[cfg(test)]
mod tests {
	use super::*;
	use rstest::*;
	use std::io::Write;

	#[rstest]
	fn test_defaults_match_documented_values() {
		let config = ServerConfig::default();

		assert_eq!(config.plugin.directory, PathBuf::from("./plugins"));
		assert!(!config.plugin.hot_reload.enabled);
		assert!(config.plugin.validation.enabled);
		assert_eq!(config.datasource.cache.default_ttl_ms, 60_000);
		assert_eq!(config.datasource.fetch_timeout_ms, 10_000);
		assert_eq!(config.server.port, 8080);
	}

	#[rstest]
	fn test_file_values_override_defaults() {
		let mut file = tempfile::NamedTempFile::new().unwrap();
		write!(
			file,
			r#"
[plugin]
directory = "/srv/plugins"

[plugin.hot-reload]
enabled = true
interval-ms = 5000

[server]
port = 9090
"#
		)
		.unwrap();

		let config = ServerConfig::from_file(file.path()).unwrap();

		assert_eq!(config.plugin.directory, PathBuf::from("/srv/plugins"));
		assert!(config.plugin.hot_reload.enabled);
		assert_eq!(config.plugin.hot_reload.interval_ms, 5000);
		assert_eq!(config.server.port, 9090);
		// Untouched sections keep their defaults
		assert_eq!(config.datasource.fetch_timeout_ms, 10_000);
	}

	#[rstest]
	fn test_unknown_keys_rejected() {
		let mut file = tempfile::NamedTempFile::new().unwrap();
		write!(file, "[server]\nprot = 9090\n").unwrap();

		let err = ServerConfig::from_file(file.path()).unwrap_err();

		assert!(matches!(err, ConfigError::Invalid { .. }));
	}

	#[rstest]
	fn test_env_overrides_win() {
		let mut config = ServerConfig::default();

		config
			.apply_env_overrides(|variable| match variable {
				"ATELIER_SERVER_PORT" => Some("7070".to_string()),
				"ATELIER_PLUGIN_VALIDATION_ENABLED" => Some("false".to_string()),
				_ => None,
			})
			.unwrap();

		assert_eq!(config.server.port, 7070);
		assert!(!config.plugin.validation.enabled);
	}

	#[rstest]
	fn test_bad_env_override_is_fatal() {
		let mut config = ServerConfig::default();

		let err = config
			.apply_env_overrides(|variable| {
				(variable == "ATELIER_SERVER_PORT").then(|| "not-a-port".to_string())
			})
			.unwrap_err();

		assert!(matches!(err, ConfigError::BadOverride { .. }));
	}
}
