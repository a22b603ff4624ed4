//! Page service
//!
//! High-level operations over the site, page, and version stores: slugged
//! page creation, cascade deletion, publication, reordering, version save
//! and restore. Also implements the registry's usage reverse-index by
//! scanning stored version JSON.

use std::collections::HashSet;
use std::sync::Arc;

use async_trait::async_trait;
use chrono::Utc;
use tracing::{info, warn};
use uuid::Uuid;

use atelier_registry::error::{RegistryError, RegistryResult};
use atelier_registry::usage::{PageRef, UsageScanner};

use crate::error::{PageError, PageResult};
use crate::model::{PageDefinition, PageVersion, Site};
use crate::slug::{slugify, unique_slug};
use crate::store::{PageStore, SiteStore, VersionStore};
use crate::tree::PageTree;

/// Fields for creating a site.
#[derive(Debug, Clone)]
pub struct NewSite {
	pub site_name: String,
	/// Explicit slug; derived from the name when absent
	pub site_slug: Option<String>,
	pub site_mode: Option<String>,
	pub owner_user_id: String,
	pub domain_name: Option<String>,
	pub favicon_url: Option<String>,
}

/// Fields for creating a page.
#[derive(Debug, Clone, Default)]
pub struct NewPage {
	pub page_name: String,
	pub title: Option<String>,
	pub description: Option<String>,
	pub path: Option<String>,
	pub data_sources_json: Option<String>,
	pub layout_id: Option<String>,
	pub parent_page_id: Option<Uuid>,
}

/// High-level page/site/version operations.
pub struct PageService {
	sites: Arc<dyn SiteStore>,
	pages: Arc<dyn PageStore>,
	versions: Arc<dyn VersionStore>,
}

impl PageService {
	/// Build the service over its stores.
	pub fn new(
		sites: Arc<dyn SiteStore>,
		pages: Arc<dyn PageStore>,
		versions: Arc<dyn VersionStore>,
	) -> Self {
		Self {
			sites,
			pages,
			versions,
		}
	}

	// ─── Sites ───────────────────────────────────────────────────────────

	/// Create a site. The slug must be free.
	pub async fn create_site(&self, new: NewSite) -> PageResult<Site> {
		let slug = new
			.site_slug
			.unwrap_or_else(|| slugify(&new.site_name));
		if self.sites.by_slug(&slug).await?.is_some() {
			return Err(PageError::SiteSlugTaken(slug));
		}
		let now = Utc::now();
		let site = Site {
			id: Uuid::new_v4(),
			site_name: new.site_name,
			site_slug: slug,
			site_mode: new.site_mode,
			owner_user_id: new.owner_user_id,
			published: false,
			published_at: None,
			domain_name: new.domain_name,
			favicon_url: new.favicon_url,
			created_at: now,
			updated_at: now,
		};
		self.sites.insert(site.clone()).await?;
		info!(site = %site.id, slug = %site.site_slug, "site created");
		Ok(site)
	}

	/// One site by id.
	pub async fn get_site(&self, site_id: Uuid) -> PageResult<Site> {
		self.sites
			.get(site_id)
			.await?
			.ok_or(PageError::SiteNotFound(site_id))
	}

	/// All sites.
	pub async fn list_sites(&self) -> PageResult<Vec<Site>> {
		self.sites.list().await
	}

	/// Persist edits to a site row.
	pub async fn update_site(&self, mut site: Site) -> PageResult<Site> {
		site.updated_at = Utc::now();
		self.sites.update(site.clone()).await?;
		Ok(site)
	}

	/// Delete a site and cascade to its pages and their versions.
	pub async fn delete_site(&self, site_id: Uuid) -> PageResult<()> {
		let site = self.get_site(site_id).await?;
		for page in self.pages.list_by_site(site.id).await? {
			self.versions.delete_for_page(page.id).await?;
			self.pages.delete(page.id).await?;
		}
		self.sites.delete(site.id).await?;
		info!(site = %site_id, "site deleted");
		Ok(())
	}

	/// Mark a site published.
	pub async fn publish_site(&self, site_id: Uuid) -> PageResult<Site> {
		let mut site = self.get_site(site_id).await?;
		site.published = true;
		site.published_at = Some(Utc::now());
		self.update_site(site).await
	}

	/// Mark a site unpublished. The publication timestamp is kept as a
	/// record of the last publish.
	pub async fn unpublish_site(&self, site_id: Uuid) -> PageResult<Site> {
		let mut site = self.get_site(site_id).await?;
		site.published = false;
		self.update_site(site).await
	}

	// ─── Pages ───────────────────────────────────────────────────────────

	/// Create a page in a site. The slug derives from the page name and is
	/// suffixed `-N` on collision within the site.
	pub async fn create_page(&self, site_id: Uuid, new: NewPage) -> PageResult<PageDefinition> {
		self.get_site(site_id).await?;

		let siblings = self.pages.list_by_site(site_id).await?;
		let taken: HashSet<String> = siblings.iter().map(|p| p.slug.clone()).collect();
		let slug = unique_slug(&slugify(&new.page_name), |s| taken.contains(s));
		let display_order = siblings
			.iter()
			.map(|p| p.display_order)
			.max()
			.map_or(0, |max| max + 1);

		let now = Utc::now();
		let page = PageDefinition {
			id: Uuid::new_v4(),
			site_id,
			page_name: new.page_name,
			slug,
			title: new.title,
			description: new.description,
			path: new.path,
			data_sources_json: new.data_sources_json,
			layout_id: new.layout_id,
			parent_page_id: new.parent_page_id,
			display_order,
			published: false,
			published_at: None,
			created_at: now,
			updated_at: now,
		};
		self.pages.insert(page.clone()).await?;
		info!(page = %page.id, site = %site_id, slug = %page.slug, "page created");
		Ok(page)
	}

	/// One page by id.
	pub async fn get_page(&self, page_id: Uuid) -> PageResult<PageDefinition> {
		self.pages
			.get(page_id)
			.await?
			.ok_or(PageError::PageNotFound(page_id))
	}

	/// Pages of a site, ordered for navigation.
	pub async fn list_pages(&self, site_id: Uuid) -> PageResult<Vec<PageDefinition>> {
		self.get_site(site_id).await?;
		self.pages.list_by_site(site_id).await
	}

	/// Persist edits to a page row.
	pub async fn update_page(&self, mut page: PageDefinition) -> PageResult<PageDefinition> {
		page.updated_at = Utc::now();
		self.pages.update(page.clone()).await?;
		Ok(page)
	}

	/// Delete a page and its versions.
	pub async fn delete_page(&self, page_id: Uuid) -> PageResult<()> {
		let page = self.get_page(page_id).await?;
		self.versions.delete_for_page(page.id).await?;
		self.pages.delete(page.id).await?;
		info!(page = %page_id, "page deleted");
		Ok(())
	}

	/// Reorder a site's pages: `ordered_ids` lists every page of the site in
	/// the desired order.
	pub async fn reorder_pages(&self, site_id: Uuid, ordered_ids: &[Uuid]) -> PageResult<()> {
		let pages = self.list_pages(site_id).await?;
		for page in pages {
			let Some(position) = ordered_ids.iter().position(|id| *id == page.id) else {
				continue;
			};
			if page.display_order != position as i32 {
				let mut updated = page;
				updated.display_order = position as i32;
				self.update_page(updated).await?;
			}
		}
		Ok(())
	}

	// ─── Versions ────────────────────────────────────────────────────────

	/// Append a new version of a page's tree and make it active.
	///
	/// The tree JSON must parse and pass structural validation; the page
	/// must belong to the site.
	pub async fn save_version(
		&self,
		site_id: Uuid,
		page_id: Uuid,
		tree_json: String,
		change_description: Option<String>,
		created_by_user_id: Option<String>,
	) -> PageResult<PageVersion> {
		let page = self.get_page(page_id).await?;
		if page.site_id != site_id {
			return Err(PageError::PageNotFound(page_id));
		}
		let tree = PageTree::from_json(&tree_json)?;
		tree.validate_structure()?;

		let version = self
			.versions
			.append(page_id, tree_json, change_description, created_by_user_id)
			.await?;
		info!(
			page = %page_id,
			version = version.version_number,
			"page version saved"
		);
		Ok(version)
	}

	/// Restore a historical version by re-appending its tree as a new
	/// active version. Historical rows are never modified.
	pub async fn restore_version(
		&self,
		page_id: Uuid,
		version_id: Uuid,
		restored_by_user_id: Option<String>,
	) -> PageResult<PageVersion> {
		let page = self.get_page(page_id).await?;
		let target = self
			.versions
			.get(page_id, version_id)
			.await?
			.ok_or(PageError::VersionNotFound(version_id))?;

		let version = self
			.versions
			.append(
				page.id,
				target.page_definition_json.clone(),
				Some(format!("Restored from version {}", target.version_number)),
				restored_by_user_id,
			)
			.await?;
		info!(
			page = %page_id,
			from = target.version_number,
			to = version.version_number,
			"page version restored"
		);
		Ok(version)
	}

	/// Version history of a page, newest first.
	pub async fn version_history(&self, page_id: Uuid) -> PageResult<Vec<PageVersion>> {
		self.get_page(page_id).await?;
		self.versions.history(page_id).await
	}

	/// The version the renderer should serve: the active one, falling back
	/// to the highest-numbered when no row is flagged active.
	pub async fn renderable_version(&self, page_id: Uuid) -> PageResult<Option<PageVersion>> {
		if let Some(active) = self.versions.active(page_id).await? {
			return Ok(Some(active));
		}
		let latest = self.versions.latest(page_id).await?;
		if latest.is_some() {
			warn!(page = %page_id, "no active version; falling back to latest");
		}
		Ok(latest)
	}

	/// Delete one non-active version.
	pub async fn delete_version(&self, page_id: Uuid, version_id: Uuid) -> PageResult<()> {
		self.versions.delete(page_id, version_id).await
	}
}

#[async_trait]
impl UsageScanner for PageService {
	/// Scan every stored version's JSON for instances of the component.
	///
	/// Rebuilt on demand; version blobs that fail to parse are skipped.
	async fn pages_using(
		&self,
		plugin_id: &str,
		component_id: &str,
	) -> RegistryResult<Vec<PageRef>> {
		let versions = self
			.versions
			.all()
			.await
			.map_err(|e| RegistryError::Storage(e.to_string()))?;

		let mut page_ids: Vec<Uuid> = versions
			.iter()
			.filter(|version| {
				PageTree::from_json(&version.page_definition_json)
					.map(|tree| tree.references(plugin_id, component_id))
					.unwrap_or(false)
			})
			.map(|version| version.page_id)
			.collect();
		page_ids.sort();
		page_ids.dedup();

		let mut refs = Vec::with_capacity(page_ids.len());
		for page_id in page_ids {
			let Some(page) = self
				.pages
				.get(page_id)
				.await
				.map_err(|e| RegistryError::Storage(e.to_string()))?
			else {
				continue;
			};
			refs.push(PageRef {
				page_id: page.id,
				page_name: page.page_name,
				site_id: page.site_id,
			});
		}
		Ok(refs)
	}
}
