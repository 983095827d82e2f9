//! Degradation Integration Tests
//!
//! A transport outage or missing branch must never panic or abort a page
//! render: every call degrades to an empty result with a single degraded
//! indicator per call site, and superseded results identify themselves
//! through the generation counter.

use std::sync::Arc;

use club_content::{Catalog, MemoryStore, SourceFilter};

fn seeded_store() -> Arc<MemoryStore> {
    let store = MemoryStore::new();
    store.add_branch("main", "snap1");
    store.add_file("snap1", "workshops/intro/intro.md", "# Intro");
    store.add_file("snap1", "workshops/intro/metadata.json", r#"{"title":"Intro"}"#);
    Arc::new(store)
}

#[tokio::test]
async fn test_outage_degrades_every_call_site() {
    let store = seeded_store();
    store.set_offline(true);
    let catalog = Catalog::new(store, "main");

    assert!(catalog.snapshot().await.is_none());
    assert!(catalog.all_paths().await.is_none());
    assert!(catalog.resolve_item("intro").await.is_none());
    assert!(catalog.get_text("workshops/intro/intro.md").await.is_none());

    // Each aggregator call returns an empty list with exactly one
    // degraded indicator, never an error.
    for root in ["workshops", "videos", "articles"] {
        let listing = catalog.list_category(root).await;
        assert!(listing.items.is_empty());
        assert!(listing.degraded);
    }

    let sections = catalog.overview().await;
    assert!(sections.iter().all(|s| s.degraded && s.items == 0));

    // Search over a degraded catalog is empty but well-formed.
    let index = catalog.search_index(&["workshops"]).await;
    assert!(index.search("intro", &SourceFilter::all()).is_empty());
}

#[tokio::test]
async fn test_missing_branch_degrades() {
    let store = seeded_store();
    let catalog = Catalog::new(store, "no-such-branch");

    assert!(catalog.snapshot().await.is_none());
    let listing = catalog.list_category("workshops").await;
    assert!(listing.items.is_empty());
    assert!(listing.degraded);
}

#[tokio::test]
async fn test_recovery_after_outage() {
    let store = seeded_store();
    store.set_offline(true);
    let catalog = Catalog::new(store.clone(), "main");

    assert!(catalog.snapshot().await.is_none());

    // A failed resolution is not cached; the next call retries.
    store.set_offline(false);
    let snapshot = catalog.snapshot().await.unwrap();
    assert_eq!(snapshot.id, "snap1");
    assert!(!catalog.list_category("workshops").await.degraded);
}

#[tokio::test]
async fn test_stale_results_detected_by_generation() {
    let store = seeded_store();
    let catalog = Catalog::new(store.clone(), "main");

    // A request starts under the current generation...
    let listing = catalog.list_category("workshops").await;
    assert!(catalog.is_current(listing.generation));

    // ...then the user forces a refresh before applying it.
    store.add_branch("main", "snap1");
    catalog.refresh().await;

    // The suspended result now identifies itself as stale and must be
    // discarded rather than overwrite newer state.
    assert!(!catalog.is_current(listing.generation));

    let fresh = catalog.list_category("workshops").await;
    assert!(catalog.is_current(fresh.generation));
}
