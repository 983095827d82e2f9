//! Per-snapshot manifest of every file path in the tree.
//!
//! The first request for a snapshot's manifest performs a full traversal
//! (the bulk tree listing when the remote supports it, per-directory
//! accumulation otherwise) and memoizes the result. Concurrent requests
//! while a build is underway share the one in-flight build; duplicate
//! traversals against the remote are a correctness and cost bug.

use std::collections::{HashMap, VecDeque};
use std::sync::Arc;

use tokio::sync::{Mutex, OnceCell};
use tracing::{debug, warn};

use crate::store::{ContentStore, EntryKind, Snapshot, StoreError};

type ManifestCell = Arc<OnceCell<Arc<Vec<String>>>>;

/// Memoized path manifests, keyed by snapshot id.
///
/// Entries live until [`ManifestIndex::invalidate`]; switching snapshots
/// starts a fresh entry and never merges with an old one.
#[derive(Default)]
pub struct ManifestIndex {
    entries: Mutex<HashMap<String, ManifestCell>>,
}

impl ManifestIndex {
    pub fn new() -> Self {
        Self::default()
    }

    /// All file paths in the snapshot, sorted. Cache hit after first build.
    pub async fn all_paths(
        &self,
        store: &dyn ContentStore,
        snapshot: &Snapshot,
    ) -> Result<Arc<Vec<String>>, StoreError> {
        let cell = {
            let mut entries = self.entries.lock().await;
            entries.entry(snapshot.id.clone()).or_default().clone()
        };

        // OnceCell serializes initialization: concurrent callers for the
        // same snapshot wait on the one in-flight build. A failed build
        // caches nothing, so a later call may retry.
        cell.get_or_try_init(|| async {
            let paths = build_manifest(store, &snapshot.id).await?;
            debug!(snapshot = %snapshot.id, files = paths.len(), "manifest built");
            Ok::<_, StoreError>(Arc::new(paths))
        })
        .await
        .map(Arc::clone)
    }

    /// Locate the body file for a logical id: first path in manifest order
    /// whose basename is `<id>.md`. Duplicate ids resolve to the first
    /// match. Returns `None` when the id is absent or the manifest is
    /// unavailable.
    pub async fn find_by_id(
        &self,
        store: &dyn ContentStore,
        snapshot: &Snapshot,
        id: &str,
    ) -> Option<String> {
        let paths = match self.all_paths(store, snapshot).await {
            Ok(paths) => paths,
            Err(e) => {
                warn!(snapshot = %snapshot.id, error = %e, "manifest unavailable");
                return None;
            }
        };

        let wanted = format!("{}.md", id);
        paths
            .iter()
            .find(|path| path.rsplit('/').next() == Some(wanted.as_str()))
            .cloned()
    }

    /// Drop every cached manifest. Called on explicit refresh only.
    pub async fn invalidate(&self) {
        self.entries.lock().await.clear();
    }
}

/// Full traversal of one snapshot's tree
async fn build_manifest(store: &dyn ContentStore, snapshot: &str) -> Result<Vec<String>, StoreError> {
    let listing = store.list_tree(snapshot).await?;

    let mut paths = if listing.truncated {
        walk_directories(store, snapshot).await?
    } else {
        listing.paths
    };

    paths.sort();
    Ok(paths)
}

/// Breadth-first accumulation of per-directory listings, for remotes
/// without a usable bulk listing
async fn walk_directories(
    store: &dyn ContentStore,
    snapshot: &str,
) -> Result<Vec<String>, StoreError> {
    let mut paths = Vec::new();
    let mut queue = VecDeque::from([String::new()]);

    while let Some(dir) = queue.pop_front() {
        for entry in store.list_dir(snapshot, &dir).await? {
            match entry.kind {
                EntryKind::File => paths.push(entry.path),
                EntryKind::Dir => queue.push_back(entry.path),
            }
        }
    }

    Ok(paths)
}
