//! In-memory content store.
//!
//! Used by the test suite and by local development. Files are registered
//! per snapshot, branches map onto snapshot ids, and every remote-shaped
//! call is counted so tests can assert on traversal behavior. The store can
//! be switched "offline" to simulate a transport outage.

use std::collections::{BTreeMap, BTreeSet, HashMap};
use std::sync::atomic::{AtomicBool, AtomicUsize, Ordering};
use std::sync::RwLock;

use async_trait::async_trait;

use super::{ContentStore, DirectoryEntry, EntryKind, StoreError, TreeListing};

/// Content store holding everything in memory
#[derive(Default)]
pub struct MemoryStore {
    /// branch name -> snapshot id
    branches: RwLock<HashMap<String, String>>,

    /// snapshot id -> (path -> body)
    files: RwLock<HashMap<String, BTreeMap<String, String>>>,

    /// Simulated transport outage
    offline: AtomicBool,

    /// Whether the bulk tree listing is available
    tree_supported: AtomicBool,

    /// Remote call counters
    pub tree_calls: AtomicUsize,
    pub dir_calls: AtomicUsize,
    pub text_calls: AtomicUsize,
}

impl MemoryStore {
    pub fn new() -> Self {
        let store = Self::default();
        store.tree_supported.store(true, Ordering::SeqCst);
        store
    }

    /// Register a branch pointing at a snapshot id
    pub fn add_branch(&self, branch: impl Into<String>, snapshot: impl Into<String>) {
        self.branches
            .write()
            .expect("branches lock")
            .insert(branch.into(), snapshot.into());
    }

    /// Register a file body within a snapshot
    pub fn add_file(
        &self,
        snapshot: impl Into<String>,
        path: impl Into<String>,
        body: impl Into<String>,
    ) {
        self.files
            .write()
            .expect("files lock")
            .entry(snapshot.into())
            .or_default()
            .insert(path.into(), body.into());
    }

    /// Simulate a transport outage for all subsequent calls
    pub fn set_offline(&self, offline: bool) {
        self.offline.store(offline, Ordering::SeqCst);
    }

    /// Disable the bulk tree listing to force per-directory accumulation
    pub fn set_tree_supported(&self, supported: bool) {
        self.tree_supported.store(supported, Ordering::SeqCst);
    }

    fn check_online(&self) -> Result<(), StoreError> {
        if self.offline.load(Ordering::SeqCst) {
            Err(StoreError::Network("simulated outage".to_string()))
        } else {
            Ok(())
        }
    }

    fn snapshot_files(&self, snapshot: &str) -> Result<BTreeMap<String, String>, StoreError> {
        self.files
            .read()
            .expect("files lock")
            .get(snapshot)
            .cloned()
            .ok_or_else(|| StoreError::NotFound(format!("snapshot '{}'", snapshot)))
    }
}

#[async_trait]
impl ContentStore for MemoryStore {
    fn name(&self) -> &str {
        "memory"
    }

    async fn resolve_branch(&self, branch: &str) -> Result<String, StoreError> {
        self.check_online()?;

        self.branches
            .read()
            .expect("branches lock")
            .get(branch)
            .cloned()
            .ok_or_else(|| StoreError::NotFound(format!("branch '{}'", branch)))
    }

    async fn list_tree(&self, snapshot: &str) -> Result<TreeListing, StoreError> {
        self.check_online()?;
        self.tree_calls.fetch_add(1, Ordering::SeqCst);

        if !self.tree_supported.load(Ordering::SeqCst) {
            // Remote without bulk listing support reports a truncated tree.
            return Ok(TreeListing {
                paths: Vec::new(),
                truncated: true,
            });
        }

        let files = self.snapshot_files(snapshot)?;
        Ok(TreeListing {
            paths: files.keys().cloned().collect(),
            truncated: false,
        })
    }

    async fn list_dir(
        &self,
        snapshot: &str,
        path: &str,
    ) -> Result<Vec<DirectoryEntry>, StoreError> {
        self.check_online()?;
        self.dir_calls.fetch_add(1, Ordering::SeqCst);

        let files = self.snapshot_files(snapshot)?;

        if !path.is_empty() && files.contains_key(path) {
            return Err(StoreError::NotADirectory(path.to_string()));
        }

        let prefix = if path.is_empty() {
            String::new()
        } else {
            format!("{}/", path)
        };

        let mut dirs = BTreeSet::new();
        let mut entries = Vec::new();
        let mut seen_any = false;

        for (file_path, body) in &files {
            let Some(rest) = file_path.strip_prefix(&prefix) else {
                continue;
            };
            seen_any = true;

            match rest.split_once('/') {
                // Direct child file
                None => entries.push(DirectoryEntry {
                    name: rest.to_string(),
                    path: file_path.clone(),
                    kind: EntryKind::File,
                    sha: format!("sha-{}", file_path),
                    size: body.len() as u64,
                }),
                // Child directory, deduplicated
                Some((dir, _)) => {
                    dirs.insert(dir.to_string());
                }
            }
        }

        if !seen_any && !path.is_empty() {
            return Err(StoreError::NotFound(format!("directory '{}'", path)));
        }

        for dir in dirs {
            entries.push(DirectoryEntry {
                name: dir.clone(),
                path: format!("{}{}", prefix, dir),
                kind: EntryKind::Dir,
                sha: String::new(),
                size: 0,
            });
        }

        entries.sort_by(|a, b| a.name.cmp(&b.name));
        Ok(entries)
    }

    async fn get_text(&self, snapshot: &str, path: &str) -> Result<String, StoreError> {
        self.check_online()?;
        self.text_calls.fetch_add(1, Ordering::SeqCst);

        self.snapshot_files(snapshot)?
            .get(path)
            .cloned()
            .ok_or_else(|| StoreError::NotFound(format!("file '{}'", path)))
    }

    fn asset_url(&self, snapshot: &str, path: &str) -> String {
        format!("memory://{}/{}", snapshot, path)
    }
}
