//! Component usage reverse-index
//!
//! Unregistering a component must fail while any page version still
//! references it. The registry does not own page storage, so the lookup is
//! a trait implemented by the page-version store: it scans stored tree JSON
//! on demand; no coherence protocol is needed.

use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::error::RegistryResult;

/// A page referencing a component.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PageRef {
	/// Referencing page
	pub page_id: Uuid,
	/// Its display name
	pub page_name: String,
	/// Owning site
	pub site_id: Uuid,
}

/// Reverse lookup from a component to the pages whose versions reference it.
#[async_trait]
pub trait UsageScanner: Send + Sync {
	/// Pages with any version containing an instance of the component,
	/// deduplicated by page.
	async fn pages_using(&self, plugin_id: &str, component_id: &str)
	-> RegistryResult<Vec<PageRef>>;
}

/// Scanner for hosts without page storage; reports nothing in use.
pub struct NoUsage;

#[async_trait]
impl UsageScanner for NoUsage {
	async fn pages_using(
		&self,
		_plugin_id: &str,
		_component_id: &str,
	) -> RegistryResult<Vec<PageRef>> {
		Ok(Vec::new())
	}
}
