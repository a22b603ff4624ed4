//! Isolation domains
//!
//! One domain per loaded package. The domain owns the entry object and the
//! package's private data directory; it can see the host's published types
//! (the manifest and context crates) and nothing else of the host. Two
//! domains never share mutable state through the host; each constructs its
//! own entry instance. Dropping the domain releases every host-side
//! reference to the package's code.

use std::panic::{AssertUnwindSafe, catch_unwind};
use std::path::{Path, PathBuf};

use crate::descriptor::{DATA_DIR, PackageMetadata};
use crate::entry::{PluginEntry, resolve_factory};
use crate::error::{PluginError, PluginResult};

/// Per-package code-loading scope.
pub struct IsolationDomain {
	plugin_id: String,
	entry: Box<dyn PluginEntry>,
	data_dir: PathBuf,
}

impl std::fmt::Debug for IsolationDomain {
	fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
		f.debug_struct("IsolationDomain")
			.field("plugin_id", &self.plugin_id)
			.field("data_dir", &self.data_dir)
			.finish()
	}
}

impl IsolationDomain {
	/// Resolve the package's declared entry class and construct its entry
	/// object.
	///
	/// Fails with [`PluginError::IsolationInitFailed`] when no factory is
	/// registered under the descriptor's `main_class` or when the
	/// constructor panics.
	pub fn initialize(metadata: &PackageMetadata, package_dir: &Path) -> PluginResult<Self> {
		let factory = resolve_factory(&metadata.main_class).ok_or_else(|| {
			PluginError::IsolationInitFailed {
				plugin_id: metadata.plugin_id.clone(),
				reason: format!(
					"no entry factory registered for main_class '{}'",
					metadata.main_class
				),
			}
		})?;

		let entry = catch_unwind(AssertUnwindSafe(factory.construct)).map_err(|panic| {
			PluginError::IsolationInitFailed {
				plugin_id: metadata.plugin_id.clone(),
				reason: format!("entry constructor panicked: {}", panic_message(&panic)),
			}
		})?;

		let data_dir = package_dir.join(DATA_DIR);
		std::fs::create_dir_all(&data_dir)?;

		Ok(Self {
			plugin_id: metadata.plugin_id.clone(),
			entry,
			data_dir,
		})
	}

	/// The owning plugin's identifier.
	pub fn plugin_id(&self) -> &str {
		&self.plugin_id
	}

	/// The entry object. The lifecycle manager is the only caller; nothing
	/// else in the host holds a reference into the package.
	pub fn entry(&self) -> &dyn PluginEntry {
		self.entry.as_ref()
	}

	/// The package's private data directory.
	pub fn data_dir(&self) -> &Path {
		&self.data_dir
	}
}

fn panic_message(panic: &Box<dyn std::any::Any + Send>) -> String {
	if let Some(s) = panic.downcast_ref::<&str>() {
		(*s).to_string()
	} else if let Some(s) = panic.downcast_ref::<String>() {
		s.clone()
	} else {
		"non-string panic payload".to_string()
	}
}

#[cfg(test)]
mod tests {
	use super::*;
	use crate::entry::EntryFactory;
	use async_trait::async_trait;
	use rstest::*;
	use std::collections::BTreeMap;
	use tempfile::TempDir;

	struct QuietEntry;

	#[async_trait]
	impl PluginEntry for QuietEntry {}

	inventory::submit! {
		EntryFactory::new("isolation-tests::Quiet", || Box::new(QuietEntry))
	}

	inventory::submit! {
		EntryFactory::new("isolation-tests::Panics", || panic!("constructor exploded"))
	}

	fn metadata(main_class: &str) -> PackageMetadata {
		PackageMetadata {
			plugin_id: "iso-test".to_string(),
			version: semver::Version::new(1, 0, 0),
			author: None,
			description: None,
			main_class: main_class.to_string(),
			plugin_type: crate::descriptor::PluginType::Component,
			dependencies: BTreeMap::new(),
			config: BTreeMap::new(),
			components: Vec::new(),
		}
	}

	#[rstest]
	fn test_initialize_creates_data_dir() {
		// Given: a package directory and a registered factory
		let dir = TempDir::new().unwrap();

		// When
		let domain =
			IsolationDomain::initialize(&metadata("isolation-tests::Quiet"), dir.path()).unwrap();

		// Then: the private directory exists and the entry is reachable
		assert!(domain.data_dir().is_dir());
		assert_eq!(domain.plugin_id(), "iso-test");
		assert!(domain.entry().component_manifests().is_empty());
	}

	#[rstest]
	fn test_unknown_main_class_fails_init() {
		let dir = TempDir::new().unwrap();

		let err =
			IsolationDomain::initialize(&metadata("isolation-tests::Nope"), dir.path()).unwrap_err();

		assert!(matches!(err, PluginError::IsolationInitFailed { .. }));
	}

	#[rstest]
	fn test_panicking_constructor_fails_init() {
		let dir = TempDir::new().unwrap();

		let err = IsolationDomain::initialize(&metadata("isolation-tests::Panics"), dir.path())
			.unwrap_err();

		match err {
			PluginError::IsolationInitFailed { reason, .. } => {
				assert!(reason.contains("constructor exploded"));
			}
			other => panic!("expected IsolationInitFailed, got {other}"),
		}
	}

	#[rstest]
	fn test_domains_do_not_share_entries() {
		// Two domains over the same factory hold distinct entry instances.
		let dir_a = TempDir::new().unwrap();
		let dir_b = TempDir::new().unwrap();
		let meta = metadata("isolation-tests::Quiet");

		let a = IsolationDomain::initialize(&meta, dir_a.path()).unwrap();
		let b = IsolationDomain::initialize(&meta, dir_b.path()).unwrap();

		let ptr_a = a.entry() as *const dyn PluginEntry as *const ();
		let ptr_b = b.entry() as *const dyn PluginEntry as *const ();
		assert_ne!(ptr_a, ptr_b);
	}
}
