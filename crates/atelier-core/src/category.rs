//! Component categories
//!
//! The category set is fixed; registry rows and manifests only ever carry
//! one of these six values.

use serde::{Deserialize, Serialize};

/// Category of a component, used for catalog grouping and child-acceptance
/// checks on container components.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ComponentCategory {
	/// General UI building blocks (text, images, buttons)
	Ui,
	/// Containers and positioning components (rows, grids, layouts)
	Layout,
	/// Input and form components
	Form,
	/// Self-contained interactive widgets
	Widget,
	/// Navigation bars and menus
	Navbar,
	/// Data-bound components (lists, repeaters, tables)
	Data,
}

impl ComponentCategory {
	/// All categories, in catalog display order.
	pub const ALL: [ComponentCategory; 6] = [
		ComponentCategory::Ui,
		ComponentCategory::Layout,
		ComponentCategory::Form,
		ComponentCategory::Widget,
		ComponentCategory::Navbar,
		ComponentCategory::Data,
	];

	/// The lowercase wire name of this category.
	pub fn as_str(&self) -> &'static str {
		match self {
			ComponentCategory::Ui => "ui",
			ComponentCategory::Layout => "layout",
			ComponentCategory::Form => "form",
			ComponentCategory::Widget => "widget",
			ComponentCategory::Navbar => "navbar",
			ComponentCategory::Data => "data",
		}
	}

	/// Parse a lowercase wire name into a category.
	pub fn parse(value: &str) -> Option<Self> {
		Self::ALL.iter().copied().find(|c| c.as_str() == value)
	}
}

impl std::fmt::Display for ComponentCategory {
	fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
		f.write_str(self.as_str())
	}
}
