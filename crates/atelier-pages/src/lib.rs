//! # Atelier Pages
//!
//! Page and site management for the platform: metadata rows, slug
//! derivation, the append-only version store (exactly one active version
//! per page), component-tree validation, PageLayout slot routing, and the
//! repeater expansion contract.
//!
//! ```text
//! atelier-pages
//! ├── model    - Site, PageDefinition, PageVersion rows
//! ├── slug     - slug derivation and collision suffixing
//! ├── store    - storage seams + in-memory implementations
//! ├── service  - high-level operations (save/restore/cascade/reorder)
//! ├── tree     - parsed page trees, validation, slot routing
//! └── repeater - per-element subtree cloning with template resolution
//! ```
//!
//! The authoritative tree lives inside the active version's JSON blob;
//! `PageDefinition` rows hold metadata only, and editing never mutates an
//! existing version.

#![warn(rustdoc::broken_intra_doc_links)]

pub mod model;
pub mod repeater;
pub mod service;
pub mod slug;
pub mod store;
pub mod tree;

pub use model::{PageDefinition, PageVersion, Site};
pub use service::PageService;
pub use store::{
	InMemoryPageStore, InMemorySiteStore, InMemoryVersionStore, PageStore, SiteStore, VersionStore,
};
pub use tree::PageTree;

/// Page error types
pub mod error {
	use thiserror::Error;
	use uuid::Uuid;

	/// Errors surfaced by page, site, and version operations
	#[derive(Error, Debug)]
	pub enum PageError {
		/// No site with the given id
		#[error("site not found: {0}")]
		SiteNotFound(Uuid),

		/// No page with the given id (or not in the given site)
		#[error("page not found: {0}")]
		PageNotFound(Uuid),

		/// No version with the given id for the page
		#[error("page version not found: {0}")]
		VersionNotFound(Uuid),

		/// A site slug is already taken
		#[error("site slug already in use: {0}")]
		SiteSlugTaken(String),

		/// The active version cannot be deleted
		#[error("cannot delete the active version of page {0}")]
		ActiveVersionDelete(Uuid),

		/// The stored tree JSON is unusable
		#[error("invalid page tree: {0}")]
		InvalidTree(String),

		/// The storage driver failed
		#[error("page storage error: {0}")]
		Storage(String),
	}

	/// Result type for page operations
	pub type PageResult<T> = Result<T, PageError>;
}
