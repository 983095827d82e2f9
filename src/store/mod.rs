//! Backing store interface for the content tree.
//!
//! The content tree lives in a public, commit-addressed file store. Every
//! read is parameterized by a snapshot id so that a whole page render sees
//! one consistent version of the tree even while contributors push to it.

pub mod github;
pub mod memory;

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use thiserror::Error;

pub use github::GithubStore;
pub use memory::MemoryStore;

/// Errors from the backing store
#[derive(Debug, Error)]
pub enum StoreError {
    #[error("network error: {0}")]
    Network(String),

    #[error("not found: {0}")]
    NotFound(String),

    #[error("not a directory: {0}")]
    NotADirectory(String),

    #[error("malformed payload at {path}: {message}")]
    Parse { path: String, message: String },
}

/// An immutable point-in-time identifier for the content tree.
///
/// Once resolved, a snapshot is never mutated; every subsequent directory
/// and file read carries its id.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Snapshot {
    /// Opaque version token (commit sha)
    pub id: String,

    /// The branch this snapshot was resolved from
    pub branch: String,

    /// When the resolution happened
    pub resolved_at: DateTime<Utc>,
}

impl Snapshot {
    pub fn new(id: impl Into<String>, branch: impl Into<String>) -> Self {
        Self {
            id: id.into(),
            branch: branch.into(),
            resolved_at: Utc::now(),
        }
    }
}

/// Kind of a directory entry
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum EntryKind {
    File,
    Dir,
}

/// One entry in a directory listing
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct DirectoryEntry {
    /// File or folder name (no path)
    pub name: String,

    /// Full path from the tree root
    pub path: String,

    /// File or directory
    pub kind: EntryKind,

    /// Content hash as reported by the store
    pub sha: String,

    /// Size in bytes (0 for directories)
    pub size: u64,
}

/// Result of a bulk tree listing.
///
/// `truncated` means the remote could not return the whole tree in one
/// response and the caller must fall back to per-directory accumulation.
#[derive(Debug, Clone)]
pub struct TreeListing {
    /// All file paths in the tree (directories excluded)
    pub paths: Vec<String>,

    /// Whether the listing was cut short by the remote
    pub truncated: bool,
}

/// Trait for commit-addressed content stores.
///
/// Each operation performs exactly one remote attempt; there is no built-in
/// retry. Failures surface as [`StoreError`] and the layers above degrade
/// to placeholders rather than aborting.
#[async_trait]
pub trait ContentStore: Send + Sync {
    /// Human-readable store name
    fn name(&self) -> &str;

    /// Resolve a branch name to an immutable snapshot id
    async fn resolve_branch(&self, branch: &str) -> Result<String, StoreError>;

    /// List every file path in the tree at once, if the remote supports it
    async fn list_tree(&self, snapshot: &str) -> Result<TreeListing, StoreError>;

    /// List the entries of one directory
    async fn list_dir(&self, snapshot: &str, path: &str)
        -> Result<Vec<DirectoryEntry>, StoreError>;

    /// Fetch a UTF-8 text file body
    async fn get_text(&self, snapshot: &str, path: &str) -> Result<String, StoreError>;

    /// Deterministic URL for a raw asset. Pure computation, no network call.
    fn asset_url(&self, snapshot: &str, path: &str) -> String;
}
