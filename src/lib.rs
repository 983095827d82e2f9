//! club-content - Snapshot-pinned content catalog for the club website
//!
//! The club's content lives in a public, commit-versioned file tree that
//! outside contributors push to between requests. This crate turns that
//! tree into a consistent, queryable catalog:
//!
//! - A branch is resolved once to an immutable snapshot id, and every
//!   directory listing and file fetch is pinned to it, so a page render
//!   never observes two different tree states.
//! - The flattened path manifest is built once per snapshot and memoized,
//!   with a single-flight guarantee for concurrent builders.
//! - Items are reconstructed from a markdown body plus a metadata document
//!   probed in the body's directory and then one level up; missing or
//!   malformed metadata degrades to defaults instead of dropping the item.
//! - Category roots aggregate into ordered summaries, and all categories
//!   feed one cross-category search index.
//!
//! # Modules
//!
//! - `store`: Backing store primitives (GitHub, in-memory)
//! - `catalog`: Manifest, item resolution, aggregation, search
//! - `config`: Environment-driven repository coordinates
//! - `generation`: Stale-result detection for superseded requests
//! - `cli`: Command-line interface
//!
//! # Usage
//!
//! ```bash
//! # Resolve the active snapshot
//! club-content snapshot
//!
//! # List a category
//! club-content category workshops
//!
//! # Search everything
//! club-content search rosie --source videos
//! ```

pub mod catalog;
pub mod cli;
pub mod config;
pub mod generation;
pub mod store;

// Re-export main types at crate root for convenience
pub use catalog::item::{ContentItem, ContentKind};
pub use catalog::search::{RankedResult, SearchIndex, SourceFilter};
pub use catalog::{Catalog, CategoryListing, SectionCount, CATEGORY_ROOTS};
pub use config::Config;
pub use generation::{Generation, GenerationCounter};
pub use store::{
    ContentStore, DirectoryEntry, EntryKind, GithubStore, MemoryStore, Snapshot, StoreError,
};
