//! Category aggregation: one generic walk shared by every category kind
//! (workshops, videos, competitions, research, articles).
//!
//! Subfolders under a category root are the leaf items. A leaf is included
//! only when it holds exactly one markdown file and a metadata file;
//! anything else is an incomplete contribution and is skipped silently
//! rather than failing the walk. A folder with no markdown but with
//! subfolders of its own is a nested category level (the videos and
//! competitions trees group their leaves by category) and is descended
//! into, one level deep.

use std::cmp::Ordering;
use std::collections::VecDeque;

use tracing::{debug, warn};

use super::item::{parse_metadata, ContentItem, RawMetadata};
use crate::store::{ContentStore, EntryKind, Snapshot};

/// Name of the metadata document inside a leaf folder
pub const METADATA_FILE: &str = "metadata.json";

/// How many nested category levels sit between a root and its leaves
/// (`videos/<category>/<slug>` has one)
const NESTED_LEVELS: u32 = 1;

/// Walk one category root and produce its ordered item summaries.
///
/// Returns the items plus a degraded flag: true exactly when the root
/// listing itself was unavailable.
pub(crate) async fn walk_category(
    store: &dyn ContentStore,
    snapshot: &Snapshot,
    root: &str,
) -> (Vec<ContentItem>, bool) {
    let entries = match store.list_dir(&snapshot.id, root).await {
        Ok(entries) => entries,
        Err(e) => {
            warn!(root, error = %e, "category root unavailable");
            return (Vec::new(), true);
        }
    };

    let mut queue: VecDeque<(String, u32)> = entries
        .into_iter()
        .filter(|entry| entry.kind == EntryKind::Dir)
        .map(|entry| (entry.path, 0))
        .collect();

    let mut items = Vec::new();

    while let Some((leaf, depth)) = queue.pop_front() {
        let entries = match store.list_dir(&snapshot.id, &leaf).await {
            Ok(entries) => entries,
            Err(e) => {
                debug!(leaf = %leaf, error = %e, "leaf listing unavailable, skipped");
                continue;
            }
        };

        let markdown: Vec<_> = entries
            .iter()
            .filter(|e| e.kind == EntryKind::File && e.name.ends_with(".md"))
            .collect();
        let metadata = entries
            .iter()
            .find(|e| e.kind == EntryKind::File && e.name == METADATA_FILE);

        match (markdown.as_slice(), metadata) {
            // Exactly one body plus a metadata document: a complete leaf.
            ([body_entry], Some(metadata_entry)) => {
                let meta = match store.get_text(&snapshot.id, &metadata_entry.path).await {
                    Ok(text) => parse_metadata(&text).unwrap_or_default(),
                    Err(e) => {
                        debug!(leaf = %leaf, error = %e, "metadata fetch failed, using defaults");
                        RawMetadata::default()
                    }
                };

                let id = body_entry.name.trim_end_matches(".md");
                items.push(ContentItem::from_metadata(id, &body_entry.path, meta));
            }

            // No markdown at all but subfolders present: a nested category
            // level, descend into its leaves.
            ([], _) if depth < NESTED_LEVELS => {
                let subdirs: Vec<_> = entries
                    .iter()
                    .filter(|e| e.kind == EntryKind::Dir)
                    .collect();
                if subdirs.is_empty() {
                    debug!(leaf = %leaf, "incomplete leaf, skipped");
                } else {
                    for dir in subdirs {
                        queue.push_back((dir.path.clone(), depth + 1));
                    }
                }
            }

            _ => {
                debug!(leaf = %leaf, "incomplete leaf, skipped");
            }
        }
    }

    sort_items(&mut items);
    (items, false)
}

/// Newest date first; undated items after all dated ones; ties break
/// alphabetically by title.
pub(crate) fn sort_items(items: &mut [ContentItem]) {
    items.sort_by(|a, b| match (a.date, b.date) {
        (Some(x), Some(y)) => y.cmp(&x).then_with(|| a.title.cmp(&b.title)),
        (Some(_), None) => Ordering::Less,
        (None, Some(_)) => Ordering::Greater,
        (None, None) => a.title.cmp(&b.title),
    });
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::catalog::item::ContentKind;
    use crate::store::MemoryStore;

    fn seeded() -> (MemoryStore, Snapshot) {
        let store = MemoryStore::new();
        store.add_branch("main", "snap1");

        store.add_file(
            "snap1",
            "workshops/intro-nlp/intro-nlp.md",
            "# Intro to NLP",
        );
        store.add_file(
            "snap1",
            "workshops/intro-nlp/metadata.json",
            r#"{"title":"Intro to NLP","date":"2024-03-01","categories":"NLP"}"#,
        );

        store.add_file("snap1", "workshops/vision/vision.md", "# Vision");
        store.add_file(
            "snap1",
            "workshops/vision/metadata.json",
            r#"{"title":"Vision Workshop","date":"2024-05-01"}"#,
        );

        // Incomplete: markdown but no metadata.
        store.add_file("snap1", "workshops/draft/draft.md", "# Draft");

        // Incomplete: metadata but no markdown.
        store.add_file("snap1", "workshops/empty/metadata.json", "{}");

        (store, Snapshot::new("snap1", "main"))
    }

    #[tokio::test]
    async fn test_walk_includes_complete_leaves_only() {
        let (store, snapshot) = seeded();

        let (items, degraded) = walk_category(&store, &snapshot, "workshops").await;

        assert!(!degraded);
        let titles: Vec<_> = items.iter().map(|i| i.title.as_str()).collect();
        // Newest first.
        assert_eq!(titles, vec!["Vision Workshop", "Intro to NLP"]);
    }

    #[tokio::test]
    async fn test_walk_missing_root_is_degraded() {
        let (store, snapshot) = seeded();

        let (items, degraded) = walk_category(&store, &snapshot, "competitions").await;

        assert!(items.is_empty());
        assert!(degraded);
    }

    #[tokio::test]
    async fn test_leaf_with_two_markdown_files_is_skipped() {
        let (store, snapshot) = seeded();
        store.add_file("snap1", "workshops/double/a.md", "a");
        store.add_file("snap1", "workshops/double/b.md", "b");
        store.add_file("snap1", "workshops/double/metadata.json", "{}");

        let (items, _) = walk_category(&store, &snapshot, "workshops").await;
        assert!(items.iter().all(|i| !i.path.starts_with("workshops/double")));
    }

    #[tokio::test]
    async fn test_nested_category_level_is_descended() {
        let (store, snapshot) = seeded();
        // videos/<category>/<slug>/ layout: one grouping level between the
        // root and the leaves.
        store.add_file("snap1", "videos/talks/rosie/rosie.md", "");
        store.add_file(
            "snap1",
            "videos/talks/rosie/metadata.json",
            r#"{"title":"Rosie","type":"video"}"#,
        );
        store.add_file("snap1", "videos/tutorials/pandas/pandas.md", "");
        store.add_file(
            "snap1",
            "videos/tutorials/pandas/metadata.json",
            r#"{"title":"Pandas"}"#,
        );

        let (items, degraded) = walk_category(&store, &snapshot, "videos").await;

        assert!(!degraded);
        let titles: Vec<_> = items.iter().map(|i| i.title.as_str()).collect();
        assert_eq!(titles, vec!["Pandas", "Rosie"]);
    }

    #[tokio::test]
    async fn test_descent_stops_after_one_nested_level() {
        let (store, snapshot) = seeded();
        // A leaf buried two grouping levels down is out of layout and
        // stays invisible.
        store.add_file("snap1", "videos/a/b/c/deep.md", "");
        store.add_file("snap1", "videos/a/b/c/metadata.json", "{}");

        let (items, _) = walk_category(&store, &snapshot, "videos").await;
        assert!(items.is_empty());
    }

    #[tokio::test]
    async fn test_malformed_metadata_degrades_to_defaults() {
        let (store, snapshot) = seeded();
        store.add_file("snap1", "workshops/broken/broken.md", "# body");
        store.add_file("snap1", "workshops/broken/metadata.json", "{not json");

        let (items, degraded) = walk_category(&store, &snapshot, "workshops").await;

        assert!(!degraded);
        let broken = items.iter().find(|i| i.id == "broken").unwrap();
        assert_eq!(broken.title, "broken");
        assert_eq!(broken.kind, ContentKind::Md);
    }

    #[tokio::test]
    async fn test_sort_undated_after_dated_ties_by_title() {
        let mut items = vec![
            ContentItem::from_metadata("b", "x/b.md", RawMetadata::default()),
            ContentItem::from_metadata(
                "old",
                "x/old.md",
                parse_metadata(r#"{"title":"Old","date":"2020-01-01"}"#).unwrap(),
            ),
            ContentItem::from_metadata("a", "x/a.md", RawMetadata::default()),
            ContentItem::from_metadata(
                "new",
                "x/new.md",
                parse_metadata(r#"{"title":"New","date":"2024-01-01"}"#).unwrap(),
            ),
        ];

        sort_items(&mut items);

        let order: Vec<_> = items.iter().map(|i| i.title.as_str()).collect();
        assert_eq!(order, vec!["New", "Old", "a", "b"]);
    }
}
