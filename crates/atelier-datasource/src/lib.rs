//! # Atelier Datasource
//!
//! The data-source aggregation engine. A page declares named sources (HTTP
//! endpoint, embedded static value, or request-context key); at render time
//! every source fetches in parallel, raw values project through field
//! mappings and transforms, and derived values cache in-process under a TTL.
//!
//! Per-source failures never abort the aggregation: each source lands in
//! either `data[key]` or `errors[key]`, and the two key sets never overlap.
//!
//! ```text
//! atelier-datasource
//! ├── cache   - process-wide TTL cache with entry-level replace
//! ├── mapping - field extraction, transforms, fallbacks
//! └── engine  - parallel fetch and aggregation
//! ```

#![warn(rustdoc::broken_intra_doc_links)]

pub mod cache;
pub mod engine;
pub mod mapping;

pub use cache::TtlCache;
pub use engine::{DataSourceEngine, DataSourceResult, EngineConfig, PageData, PageMeta};
pub use mapping::apply_field_mapping;

/// Data-source error types
pub mod error {
	use thiserror::Error;

	/// Per-source failure. Never escapes the engine: each failure becomes a
	/// human-readable entry in `PageData.errors`.
	#[derive(Error, Debug)]
	pub enum DataSourceError {
		/// The config is unusable (missing endpoint, bad sources JSON)
		#[error("invalid data source config: {0}")]
		InvalidConfig(String),

		/// The HTTP request could not complete
		#[error("fetch failed: {0}")]
		Transport(String),

		/// The endpoint answered outside 2xx
		#[error("endpoint returned status {0}")]
		Status(u16),

		/// The response body is not valid JSON
		#[error("response decode failed: {0}")]
		Decode(String),
	}

	/// Result type for single-source fetches
	pub type FetchResult<T> = Result<T, DataSourceError>;
}
