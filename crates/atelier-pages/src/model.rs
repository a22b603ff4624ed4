//! Page, site, and version rows
//!
//! Sites own pages (cascade delete); pages own versions (cascade delete).
//! The tree itself lives in [`PageVersion::page_definition_json`].

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// A site: the top-level container pages hang off.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Site {
	/// Row identifier
	pub id: Uuid,
	/// Display name
	pub site_name: String,
	/// Unique slug used in URLs
	pub site_slug: String,
	/// Presentation mode, opaque to the host (e.g. "live", "preview")
	#[serde(default, skip_serializing_if = "Option::is_none")]
	pub site_mode: Option<String>,
	/// Owner identity from the external auth edge
	pub owner_user_id: String,
	/// Whether the site is publicly visible
	pub published: bool,
	/// When the site was last published
	#[serde(default, skip_serializing_if = "Option::is_none")]
	pub published_at: Option<DateTime<Utc>>,
	/// Custom domain, if any
	#[serde(default, skip_serializing_if = "Option::is_none")]
	pub domain_name: Option<String>,
	/// Favicon URL, if any
	#[serde(default, skip_serializing_if = "Option::is_none")]
	pub favicon_url: Option<String>,
	pub created_at: DateTime<Utc>,
	pub updated_at: DateTime<Utc>,
}

/// Page metadata row. `(site_id, slug)` is unique.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PageDefinition {
	/// Row identifier
	pub id: Uuid,
	/// Owning site
	pub site_id: Uuid,
	/// Display name the slug derives from
	pub page_name: String,
	/// URL slug, unique within the site
	pub slug: String,
	/// Browser title
	#[serde(default, skip_serializing_if = "Option::is_none")]
	pub title: Option<String>,
	/// Meta description
	#[serde(default, skip_serializing_if = "Option::is_none")]
	pub description: Option<String>,
	/// Route path the frontend serves the page under
	#[serde(default, skip_serializing_if = "Option::is_none")]
	pub path: Option<String>,
	/// Declarative data sources: JSON object `{name: DataSourceConfig}`
	#[serde(default, skip_serializing_if = "Option::is_none")]
	pub data_sources_json: Option<String>,
	/// Layout this page renders inside, opaque to the host
	#[serde(default, skip_serializing_if = "Option::is_none")]
	pub layout_id: Option<String>,
	/// Parent page for hierarchical navigation
	#[serde(default, skip_serializing_if = "Option::is_none")]
	pub parent_page_id: Option<Uuid>,
	/// Sort key among sibling pages
	#[serde(default)]
	pub display_order: i32,
	/// Whether the page is publicly visible
	pub published: bool,
	/// When the page was last published
	#[serde(default, skip_serializing_if = "Option::is_none")]
	pub published_at: Option<DateTime<Utc>>,
	pub created_at: DateTime<Utc>,
	pub updated_at: DateTime<Utc>,
}

/// Append-only snapshot of a page's tree.
///
/// `version_number` strictly increases per page starting at 1; for each
/// page with any version, exactly one row has `is_active = true`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PageVersion {
	/// Row identifier
	pub id: Uuid,
	/// Owning page
	pub page_id: Uuid,
	/// Monotonic per-page number, starting at 1
	pub version_number: i32,
	/// The serialized tree
	pub page_definition_json: String,
	/// Editor-supplied change note
	#[serde(default, skip_serializing_if = "Option::is_none")]
	pub change_description: Option<String>,
	/// Author identity from the external auth edge
	#[serde(default, skip_serializing_if = "Option::is_none")]
	pub created_by_user_id: Option<String>,
	pub created_at: DateTime<Utc>,
	/// Whether this is the version the renderer serves
	pub is_active: bool,
}
