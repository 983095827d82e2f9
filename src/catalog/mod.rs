//! The content catalog: snapshot-pinned reads over the club's content tree.
//!
//! A [`Catalog`] owns the resolved snapshot and the manifest cache as an
//! explicit object with a defined lifecycle: constructed at startup,
//! invalidated only by [`Catalog::refresh`]. Every read it performs is
//! threaded with one snapshot id, so a page render never observes two
//! different tree states.

pub mod aggregate;
pub mod item;
pub mod manifest;
pub mod search;

use std::sync::Arc;

use futures::future::join_all;
use serde::de::DeserializeOwned;
use tracing::{debug, warn};

use crate::config::Config;
use crate::generation::{Generation, GenerationCounter};
use crate::store::{ContentStore, GithubStore, Snapshot};

use aggregate::{walk_category, METADATA_FILE};
use item::{parse_metadata, ContentItem, RawMetadata};
use manifest::ManifestIndex;
use search::SearchIndex;

/// The category roots aggregated on the landing page
pub const CATEGORY_ROOTS: [&str; 5] =
    ["articles", "workshops", "videos", "competitions", "research"];

/// Output of one category aggregation
#[derive(Debug, Clone)]
pub struct CategoryListing {
    /// Category root path
    pub root: String,

    /// Ordered item summaries, newest first
    pub items: Vec<ContentItem>,

    /// Set exactly once per failing call site when the listing could not
    /// be produced; the UI shows a non-blocking notice
    pub degraded: bool,

    /// Catalog generation this listing was built under
    pub generation: Generation,
}

/// Per-section counts for the landing page
#[derive(Debug, Clone)]
pub struct SectionCount {
    pub root: String,
    pub items: usize,
    pub degraded: bool,
}

/// Snapshot-pinned content catalog
pub struct Catalog {
    store: Arc<dyn ContentStore>,
    branch: String,
    snapshot: tokio::sync::Mutex<Option<Snapshot>>,
    manifest: ManifestIndex,
    generation: GenerationCounter,
}

impl Catalog {
    /// Create a catalog over any content store
    pub fn new(store: Arc<dyn ContentStore>, branch: impl Into<String>) -> Self {
        Self {
            store,
            branch: branch.into(),
            snapshot: tokio::sync::Mutex::new(None),
            manifest: ManifestIndex::new(),
            generation: GenerationCounter::new(),
        }
    }

    /// Create a GitHub-backed catalog from configuration
    pub fn from_config(config: &Config) -> Self {
        Self::new(Arc::new(GithubStore::from_config(config)), config.branch.clone())
    }

    /// The generation tag callers record to detect stale results
    pub fn generation(&self) -> Generation {
        self.generation.current()
    }

    /// Whether a recorded generation tag is still current
    pub fn is_current(&self, generation: Generation) -> bool {
        self.generation.is_current(generation)
    }

    /// The active snapshot, resolving the branch on first use.
    ///
    /// Resolution failure returns `None` and every dependent read degrades;
    /// nothing here is fatal to the hosting process.
    pub async fn snapshot(&self) -> Option<Snapshot> {
        let mut guard = self.snapshot.lock().await;
        if let Some(snapshot) = guard.as_ref() {
            return Some(snapshot.clone());
        }

        match self.store.resolve_branch(&self.branch).await {
            Ok(id) => {
                debug!(branch = %self.branch, snapshot = %id, "snapshot resolved");
                let snapshot = Snapshot::new(id, self.branch.clone());
                *guard = Some(snapshot.clone());
                Some(snapshot)
            }
            Err(e) => {
                warn!(branch = %self.branch, error = %e, "snapshot resolution failed");
                None
            }
        }
    }

    /// Drop the resolved snapshot and every cached manifest, then resolve
    /// anew. The only way a catalog ever changes tree versions.
    pub async fn refresh(&self) -> Option<Snapshot> {
        {
            let mut guard = self.snapshot.lock().await;
            *guard = None;
        }
        self.manifest.invalidate().await;
        self.generation.advance();
        self.snapshot().await
    }

    /// All file paths in the active snapshot, or `None` when unavailable
    pub async fn all_paths(&self) -> Option<Arc<Vec<String>>> {
        let snapshot = self.snapshot().await?;
        match self.manifest.all_paths(self.store.as_ref(), &snapshot).await {
            Ok(paths) => Some(paths),
            Err(e) => {
                warn!(error = %e, "manifest build failed");
                None
            }
        }
    }

    /// Locate a logical id's body file in the manifest
    pub async fn find_by_id(&self, id: &str) -> Option<String> {
        let snapshot = self.snapshot().await?;
        self.manifest
            .find_by_id(self.store.as_ref(), &snapshot, id)
            .await
    }

    /// Resolve one content item by id.
    ///
    /// Locates the markdown body through the manifest, then probes for a
    /// metadata document first colocated with the body, then one directory
    /// up. Missing or malformed metadata degrades to defaults; the item is
    /// returned either way. Absent ids return `None` and never error.
    pub async fn resolve_item(&self, id: &str) -> Option<ContentItem> {
        let snapshot = self.snapshot().await?;
        let path = self
            .manifest
            .find_by_id(self.store.as_ref(), &snapshot, id)
            .await?;

        let meta = self.locate_metadata(&snapshot, &path).await;
        let mut item = ContentItem::from_metadata(id, &path, meta);

        if item.kind.needs_body() {
            // A failed body fetch leaves a placeholder, not an error.
            item.body = match self.store.get_text(&snapshot.id, &path).await {
                Ok(body) => Some(body),
                Err(e) => {
                    warn!(path = %path, error = %e, "body unavailable");
                    None
                }
            };
        } else if item.kind.uses_viewer() && item.external_url.is_none() {
            item.external_url = Some(self.store.asset_url(&snapshot.id, &path));
        }

        Some(item)
    }

    /// Two-level metadata fallback: same directory, then its parent.
    ///
    /// Candidates are checked against the manifest before any fetch, so a
    /// category that shares one metadata document a level up costs no extra
    /// failed requests.
    async fn locate_metadata(&self, snapshot: &Snapshot, body_path: &str) -> RawMetadata {
        let paths = match self.manifest.all_paths(self.store.as_ref(), snapshot).await {
            Ok(paths) => paths,
            Err(_) => return RawMetadata::default(),
        };

        let dir = parent_dir(body_path);
        let mut candidates = vec![join_path(dir, METADATA_FILE)];
        if !dir.is_empty() {
            candidates.push(join_path(parent_dir(dir), METADATA_FILE));
        }

        for candidate in candidates {
            if paths.binary_search(&candidate).is_err() {
                continue;
            }
            match self.store.get_text(&snapshot.id, &candidate).await {
                Ok(text) => {
                    if let Some(meta) = parse_metadata(&text) {
                        return meta;
                    }
                    debug!(path = %candidate, "unparseable metadata, trying next level");
                }
                Err(e) => {
                    debug!(path = %candidate, error = %e, "metadata fetch failed");
                }
            }
        }

        RawMetadata::default()
    }

    /// Ordered item summaries for one category root.
    ///
    /// Never errors: an unreachable snapshot or root produces an empty,
    /// degraded listing.
    pub async fn list_category(&self, root: &str) -> CategoryListing {
        let generation = self.generation.current();

        let Some(snapshot) = self.snapshot().await else {
            return CategoryListing {
                root: root.to_string(),
                items: Vec::new(),
                degraded: true,
                generation,
            };
        };

        let (items, degraded) = walk_category(self.store.as_ref(), &snapshot, root).await;
        CategoryListing {
            root: root.to_string(),
            items,
            degraded,
            generation,
        }
    }

    /// Landing-page counts across the standard roots, aggregated
    /// concurrently since the subtrees are disjoint
    pub async fn overview(&self) -> Vec<SectionCount> {
        let listings = join_all(CATEGORY_ROOTS.iter().map(|root| self.list_category(root))).await;

        listings
            .into_iter()
            .map(|listing| SectionCount {
                items: listing.items.len(),
                degraded: listing.degraded,
                root: listing.root,
            })
            .collect()
    }

    /// Build the cross-category search index over the given roots
    pub async fn search_index(&self, roots: &[&str]) -> SearchIndex {
        let listings = join_all(roots.iter().map(|root| self.list_category(root))).await;

        SearchIndex::from_categories(
            listings
                .into_iter()
                .map(|listing| (listing.root, listing.items)),
        )
    }

    /// Raw text fetch within the active snapshot, for the auxiliary
    /// `data/` files. `None` means temporarily unavailable.
    pub async fn get_text(&self, path: &str) -> Option<String> {
        let snapshot = self.snapshot().await?;
        match self.store.get_text(&snapshot.id, path).await {
            Ok(text) => Some(text),
            Err(e) => {
                warn!(path, error = %e, "text fetch failed");
                None
            }
        }
    }

    /// Typed JSON fetch over [`Catalog::get_text`]
    pub async fn get_json<T: DeserializeOwned>(&self, path: &str) -> Option<T> {
        let text = self.get_text(path).await?;
        match serde_json::from_str(&text) {
            Ok(value) => Some(value),
            Err(e) => {
                warn!(path, error = %e, "malformed JSON document");
                None
            }
        }
    }

    /// Deterministic raw URL for an asset in the active snapshot
    pub async fn asset_url(&self, path: &str) -> Option<String> {
        let snapshot = self.snapshot().await?;
        Some(self.store.asset_url(&snapshot.id, path))
    }
}

/// Containing directory of a path, "" for top-level entries
fn parent_dir(path: &str) -> &str {
    path.rsplit_once('/').map(|(dir, _)| dir).unwrap_or("")
}

fn join_path(dir: &str, name: &str) -> String {
    if dir.is_empty() {
        name.to_string()
    } else {
        format!("{}/{}", dir, name)
    }
}
