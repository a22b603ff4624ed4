//! # Atelier Template
//!
//! Resolution of `{{ path }}` tokens inside component props against a
//! [`DataContext`]. The resolver is a pure, total function: missing paths,
//! out-of-range indexes, and type mismatches yield the empty string, and no
//! error ever escapes. The same dotted/bracketed path grammar is reused by
//! the data-source engine for field extraction.

pub mod context;
pub mod path;
pub mod resolver;

pub use context::DataContext;
pub use path::{PathSegment, extract, navigate, parse_path};
pub use resolver::{resolve_props, resolve_str};
