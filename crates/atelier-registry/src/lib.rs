//! # Atelier Registry
//!
//! The durable component catalog. Plugins contribute component manifests on
//! load; the registry persists them as entries with an activation flag,
//! serves catalog queries (active set, by category, by plugin), and refuses
//! to delete components that page versions still reference.
//!
//! ```text
//! atelier-registry
//! ├── entry    - persistent projection of a manifest
//! ├── store    - storage seam (async trait + in-memory implementation)
//! ├── usage    - reverse-index contract: which pages use a component
//! └── registry - the catalog operations
//! ```
//!
//! The relational driver is an external collaborator: it implements
//! [`store::RegistryStore`] and the host never sees SQL.

#![warn(rustdoc::broken_intra_doc_links)]

pub mod entry;
pub mod registry;
pub mod store;
pub mod usage;

pub use entry::RegistryEntry;
pub use registry::ComponentRegistry;
pub use store::{InMemoryRegistryStore, RegistryStore};
pub use usage::{PageRef, UsageScanner};

/// Registry error types
pub mod error {
	use thiserror::Error;

	use crate::usage::PageRef;

	/// Errors surfaced by catalog operations
	#[derive(Error, Debug)]
	pub enum RegistryError {
		/// No entry exists for the requested key
		#[error("component not registered: {0}")]
		NotFound(String),

		/// The component is referenced by page versions and cannot be removed
		#[error("component is in use by {} page(s)", pages.len())]
		ComponentInUse {
			/// Pages whose versions reference the component
			pages: Vec<PageRef>,
		},

		/// The manifest failed validation before registration
		#[error("invalid manifest: {0}")]
		InvalidManifest(String),

		/// The storage driver failed
		#[error("registry storage error: {0}")]
		Storage(String),
	}

	/// Result type for catalog operations
	pub type RegistryResult<T> = Result<T, RegistryError>;
}
