//! # Atelier Core
//!
//! Shared data shapes for the Atelier plugin-hosting site platform.
//!
//! Every other layer of the platform speaks in these types:
//!
//! ```text
//! atelier-core
//! ├── category   - the fixed component category set
//! ├── manifest   - component manifests contributed by plugins
//! ├── instance   - component-instance trees persisted per page
//! └── datasource - declarative data-source configuration
//! ```
//!
//! Manifests are immutable per plugin version and round-trip through JSON
//! without loss; instance trees are the parsed form of a page version's
//! stored JSON blob.

#![warn(rustdoc::broken_intra_doc_links)]

pub mod category;
pub mod datasource;
pub mod instance;
pub mod manifest;

pub mod prelude {
	//! Convenient re-exports of commonly used items

	pub use crate::category::ComponentCategory;
	pub use crate::datasource::{DataSourceConfig, DataSourceType, FieldMapping, HttpMethod};
	pub use crate::instance::{ComponentInstance, IteratorConfig};
	pub use crate::manifest::{
		ComponentCapabilities, ComponentKey, ComponentManifest, PropDefinition, PropType,
		SizeConstraints, StyleDefinition, StyleType,
	};
}

/// Core validation errors
pub mod error {
	use thiserror::Error;

	/// Errors raised while validating core data shapes
	#[derive(Error, Debug)]
	pub enum ValidationError {
		/// A required field is absent or empty
		#[error("missing required field: {0}")]
		MissingField(&'static str),

		/// A field value is inconsistent with the rest of the shape
		#[error("invalid field {field}: {reason}")]
		InvalidField {
			/// Offending field name
			field: &'static str,
			/// Why the value was rejected
			reason: String,
		},
	}

	/// Result type for core validation
	pub type ValidationResult<T> = Result<T, ValidationError>;
}
