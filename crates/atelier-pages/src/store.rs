//! Page storage seams
//!
//! Sites, pages, and versions persist through these traits; the in-memory
//! implementations back tests and single-process deployments, and the
//! relational driver implements the same traits out of tree.
//!
//! Version writes for one page are serialized by the store (the in-memory
//! store's write lock plays the role of the deactivate-then-insert
//! transaction); readers never observe two active rows.

use std::collections::HashMap;

use async_trait::async_trait;
use chrono::Utc;
use parking_lot::RwLock;
use uuid::Uuid;

use crate::error::{PageError, PageResult};
use crate::model::{PageDefinition, PageVersion, Site};

/// Storage operations for sites.
#[async_trait]
pub trait SiteStore: Send + Sync {
	async fn insert(&self, site: Site) -> PageResult<()>;
	async fn update(&self, site: Site) -> PageResult<()>;
	async fn get(&self, id: Uuid) -> PageResult<Option<Site>>;
	async fn by_slug(&self, slug: &str) -> PageResult<Option<Site>>;
	async fn list(&self) -> PageResult<Vec<Site>>;
	async fn delete(&self, id: Uuid) -> PageResult<()>;
}

/// Storage operations for page metadata rows.
#[async_trait]
pub trait PageStore: Send + Sync {
	async fn insert(&self, page: PageDefinition) -> PageResult<()>;
	async fn update(&self, page: PageDefinition) -> PageResult<()>;
	async fn get(&self, id: Uuid) -> PageResult<Option<PageDefinition>>;
	async fn list_by_site(&self, site_id: Uuid) -> PageResult<Vec<PageDefinition>>;
	async fn delete(&self, id: Uuid) -> PageResult<()>;
}

/// Storage operations for page versions.
#[async_trait]
pub trait VersionStore: Send + Sync {
	/// Append a new version: number = `1 + max(existing)`, every other row
	/// of the page deactivated and the new row active, in one transaction.
	async fn append(
		&self,
		page_id: Uuid,
		page_definition_json: String,
		change_description: Option<String>,
		created_by_user_id: Option<String>,
	) -> PageResult<PageVersion>;

	/// The active version of a page, if any.
	async fn active(&self, page_id: Uuid) -> PageResult<Option<PageVersion>>;

	/// The highest-numbered version of a page, if any.
	async fn latest(&self, page_id: Uuid) -> PageResult<Option<PageVersion>>;

	/// One version by id, scoped to the page.
	async fn get(&self, page_id: Uuid, version_id: Uuid) -> PageResult<Option<PageVersion>>;

	/// All versions of a page, newest first.
	async fn history(&self, page_id: Uuid) -> PageResult<Vec<PageVersion>>;

	/// Delete one non-active version. Deleting the active version fails.
	async fn delete(&self, page_id: Uuid, version_id: Uuid) -> PageResult<()>;

	/// Drop every version of a page (cascade from page deletion).
	async fn delete_for_page(&self, page_id: Uuid) -> PageResult<()>;

	/// Every stored version of every page, for usage scans.
	async fn all(&self) -> PageResult<Vec<PageVersion>>;
}

/// Process-local site store.
#[derive(Default)]
pub struct InMemorySiteStore {
	rows: RwLock<HashMap<Uuid, Site>>,
}

impl InMemorySiteStore {
	pub fn new() -> Self {
		Self::default()
	}
}

#[async_trait]
impl SiteStore for InMemorySiteStore {
	async fn insert(&self, site: Site) -> PageResult<()> {
		self.rows.write().insert(site.id, site);
		Ok(())
	}

	async fn update(&self, site: Site) -> PageResult<()> {
		let mut rows = self.rows.write();
		if !rows.contains_key(&site.id) {
			return Err(PageError::SiteNotFound(site.id));
		}
		rows.insert(site.id, site);
		Ok(())
	}

	async fn get(&self, id: Uuid) -> PageResult<Option<Site>> {
		Ok(self.rows.read().get(&id).cloned())
	}

	async fn by_slug(&self, slug: &str) -> PageResult<Option<Site>> {
		Ok(self
			.rows
			.read()
			.values()
			.find(|s| s.site_slug == slug)
			.cloned())
	}

	async fn list(&self) -> PageResult<Vec<Site>> {
		let mut sites: Vec<_> = self.rows.read().values().cloned().collect();
		sites.sort_by(|a, b| a.created_at.cmp(&b.created_at));
		Ok(sites)
	}

	async fn delete(&self, id: Uuid) -> PageResult<()> {
		self.rows.write().remove(&id);
		Ok(())
	}
}

/// Process-local page store.
#[derive(Default)]
pub struct InMemoryPageStore {
	rows: RwLock<HashMap<Uuid, PageDefinition>>,
}

impl InMemoryPageStore {
	pub fn new() -> Self {
		Self::default()
	}
}

#[async_trait]
impl PageStore for InMemoryPageStore {
	async fn insert(&self, page: PageDefinition) -> PageResult<()> {
		self.rows.write().insert(page.id, page);
		Ok(())
	}

	async fn update(&self, page: PageDefinition) -> PageResult<()> {
		let mut rows = self.rows.write();
		if !rows.contains_key(&page.id) {
			return Err(PageError::PageNotFound(page.id));
		}
		rows.insert(page.id, page);
		Ok(())
	}

	async fn get(&self, id: Uuid) -> PageResult<Option<PageDefinition>> {
		Ok(self.rows.read().get(&id).cloned())
	}

	async fn list_by_site(&self, site_id: Uuid) -> PageResult<Vec<PageDefinition>> {
		let mut pages: Vec<_> = self
			.rows
			.read()
			.values()
			.filter(|p| p.site_id == site_id)
			.cloned()
			.collect();
		pages.sort_by(|a, b| (a.display_order, a.created_at).cmp(&(b.display_order, b.created_at)));
		Ok(pages)
	}

	async fn delete(&self, id: Uuid) -> PageResult<()> {
		self.rows.write().remove(&id);
		Ok(())
	}
}

/// Process-local version store.
///
/// The single write lock stands in for the per-page transaction: append
/// reads the max number, deactivates, and inserts without releasing it.
#[derive(Default)]
pub struct InMemoryVersionStore {
	rows: RwLock<HashMap<Uuid, Vec<PageVersion>>>,
}

impl InMemoryVersionStore {
	pub fn new() -> Self {
		Self::default()
	}
}

#[async_trait]
impl VersionStore for InMemoryVersionStore {
	async fn append(
		&self,
		page_id: Uuid,
		page_definition_json: String,
		change_description: Option<String>,
		created_by_user_id: Option<String>,
	) -> PageResult<PageVersion> {
		let mut rows = self.rows.write();
		let versions = rows.entry(page_id).or_default();
		let next_number = versions.iter().map(|v| v.version_number).max().unwrap_or(0) + 1;
		for version in versions.iter_mut() {
			version.is_active = false;
		}
		let version = PageVersion {
			id: Uuid::new_v4(),
			page_id,
			version_number: next_number,
			page_definition_json,
			change_description,
			created_by_user_id,
			created_at: Utc::now(),
			is_active: true,
		};
		versions.push(version.clone());
		Ok(version)
	}

	async fn active(&self, page_id: Uuid) -> PageResult<Option<PageVersion>> {
		Ok(self
			.rows
			.read()
			.get(&page_id)
			.and_then(|versions| versions.iter().find(|v| v.is_active).cloned()))
	}

	async fn latest(&self, page_id: Uuid) -> PageResult<Option<PageVersion>> {
		Ok(self.rows.read().get(&page_id).and_then(|versions| {
			versions
				.iter()
				.max_by_key(|v| v.version_number)
				.cloned()
		}))
	}

	async fn get(&self, page_id: Uuid, version_id: Uuid) -> PageResult<Option<PageVersion>> {
		Ok(self
			.rows
			.read()
			.get(&page_id)
			.and_then(|versions| versions.iter().find(|v| v.id == version_id).cloned()))
	}

	async fn history(&self, page_id: Uuid) -> PageResult<Vec<PageVersion>> {
		let mut versions = self
			.rows
			.read()
			.get(&page_id)
			.cloned()
			.unwrap_or_default();
		versions.sort_by(|a, b| b.version_number.cmp(&a.version_number));
		Ok(versions)
	}

	async fn delete(&self, page_id: Uuid, version_id: Uuid) -> PageResult<()> {
		let mut rows = self.rows.write();
		let versions = rows
			.get_mut(&page_id)
			.ok_or(PageError::VersionNotFound(version_id))?;
		let target = versions
			.iter()
			.find(|v| v.id == version_id)
			.ok_or(PageError::VersionNotFound(version_id))?;
		if target.is_active {
			return Err(PageError::ActiveVersionDelete(page_id));
		}
		versions.retain(|v| v.id != version_id);
		Ok(())
	}

	async fn delete_for_page(&self, page_id: Uuid) -> PageResult<()> {
		self.rows.write().remove(&page_id);
		Ok(())
	}

	async fn all(&self) -> PageResult<Vec<PageVersion>> {
		Ok(self.rows.read().values().flatten().cloned().collect())
	}
}

#[cfg(test)]
mod tests {
	use super::*;
	use rstest::*;

	#[rstest]
	#[tokio::test]
	async fn test_append_numbers_and_activates() {
		// Given: an empty version store
		let store = InMemoryVersionStore::new();
		let page_id = Uuid::new_v4();

		// When: appending two versions
		let v1 = store
			.append(page_id, "{}".to_string(), None, None)
			.await
			.unwrap();
		let v2 = store
			.append(page_id, "{}".to_string(), Some("edit".to_string()), None)
			.await
			.unwrap();

		// Then: numbers start at 1 and only the latest is active
		assert_eq!(v1.version_number, 1);
		assert_eq!(v2.version_number, 2);
		let history = store.history(page_id).await.unwrap();
		assert_eq!(history.iter().filter(|v| v.is_active).count(), 1);
		assert!(history[0].is_active);
		assert_eq!(history[0].version_number, 2);
	}

	#[rstest]
	#[tokio::test]
	async fn test_delete_active_version_forbidden() {
		let store = InMemoryVersionStore::new();
		let page_id = Uuid::new_v4();
		let v1 = store
			.append(page_id, "{}".to_string(), None, None)
			.await
			.unwrap();

		let err = store.delete(page_id, v1.id).await.unwrap_err();

		assert!(matches!(err, PageError::ActiveVersionDelete(_)));
	}

	#[rstest]
	#[tokio::test]
	async fn test_delete_inactive_version_leaves_gap() {
		let store = InMemoryVersionStore::new();
		let page_id = Uuid::new_v4();
		let v1 = store
			.append(page_id, "{}".to_string(), None, None)
			.await
			.unwrap();
		store
			.append(page_id, "{}".to_string(), None, None)
			.await
			.unwrap();

		store.delete(page_id, v1.id).await.unwrap();

		// Numbering continues from the max, not from the gap
		let v3 = store
			.append(page_id, "{}".to_string(), None, None)
			.await
			.unwrap();
		assert_eq!(v3.version_number, 3);
	}

	#[rstest]
	#[tokio::test]
	async fn test_history_is_newest_first() {
		let store = InMemoryVersionStore::new();
		let page_id = Uuid::new_v4();
		for _ in 0..3 {
			store
				.append(page_id, "{}".to_string(), None, None)
				.await
				.unwrap();
		}

		let history = store.history(page_id).await.unwrap();

		let numbers: Vec<i32> = history.iter().map(|v| v.version_number).collect();
		assert_eq!(numbers, vec![3, 2, 1]);
	}
}
