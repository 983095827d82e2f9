//! Aggregation and Search Integration Tests
//!
//! Category walks, ordering, and the cross-category search index built
//! from them.

use std::sync::Arc;

use club_content::{Catalog, MemoryStore, SourceFilter, CATEGORY_ROOTS};

fn seeded_store() -> Arc<MemoryStore> {
    let store = MemoryStore::new();
    store.add_branch("main", "snap1");

    store.add_file("snap1", "videos/talks/rosie-intro/rosie-intro.md", "");
    store.add_file(
        "snap1",
        "videos/talks/rosie-intro/metadata.json",
        r#"{"title":"Rosie: An Introduction","date":"2024-02-10","type":"video","categories":"Robotics, NLP"}"#,
    );

    store.add_file("snap1", "videos/talks/graphs/graphs.md", "");
    store.add_file(
        "snap1",
        "videos/talks/graphs/metadata.json",
        r#"{"title":"Graph Methods","date":"2024-06-01","type":"video"}"#,
    );

    store.add_file("snap1", "workshops/rosie-lab/rosie-lab.md", "# Lab");
    store.add_file(
        "snap1",
        "workshops/rosie-lab/metadata.json",
        r#"{"title":"Rosie Lab Session","authors":"Rosie","categories":["Robotics","NLP"]}"#,
    );

    store.add_file("snap1", "competitions/kaggle/spring/spring.md", "");
    store.add_file(
        "snap1",
        "competitions/kaggle/spring/metadata.json",
        r#"{"title":"Spring Challenge","date":"2023-04-01"}"#,
    );

    Arc::new(store)
}

#[tokio::test]
async fn test_category_listing_order() {
    let store = seeded_store();
    let catalog = Catalog::new(store, "main");

    // videos/talks is the walkable root here: its subfolders are leaves.
    let listing = catalog.list_category("videos/talks").await;

    assert!(!listing.degraded);
    let titles: Vec<_> = listing.items.iter().map(|i| i.title.as_str()).collect();
    assert_eq!(titles, vec!["Graph Methods", "Rosie: An Introduction"]);
}

#[tokio::test]
async fn test_categories_normalized_identically_across_encodings() {
    let store = seeded_store();
    let catalog = Catalog::new(store, "main");

    let video = catalog.resolve_item("rosie-intro").await.unwrap();
    let workshop = catalog.resolve_item("rosie-lab").await.unwrap();

    // Delimited string and native list both normalize to the same list.
    assert_eq!(video.categories, vec!["Robotics", "NLP"]);
    assert_eq!(video.categories, workshop.categories);
}

#[tokio::test]
async fn test_search_filtered_by_source() {
    let store = seeded_store();
    let catalog = Catalog::new(store, "main");

    let index = catalog
        .search_index(&["videos/talks", "workshops", "competitions/kaggle"])
        .await;

    let all = index.search("rosie", &SourceFilter::all());
    assert_eq!(all.len(), 2);

    let videos_only = index.search("rosie", &SourceFilter::only(["videos/talks"]));
    assert_eq!(videos_only.len(), 1);
    assert_eq!(videos_only[0].item.title, "Rosie: An Introduction");
    assert!(videos_only.iter().all(|r| r.source == "videos/talks"));
}

#[tokio::test]
async fn test_empty_query_is_suppressed() {
    let store = seeded_store();
    let catalog = Catalog::new(store, "main");

    let index = catalog.search_index(&["videos/talks"]).await;
    assert!(index.search("", &SourceFilter::all()).is_empty());
    assert!(!index.is_empty());
}

#[tokio::test]
async fn test_overview_counts_standard_roots() {
    let store = seeded_store();
    // Make the five standard roots listable.
    store.add_file("snap1", "articles/news/a.md", "");
    store.add_file("snap1", "articles/metadata.json", "{}");
    store.add_file("snap1", "research/ml/paper/paper.md", "");
    store.add_file("snap1", "research/ml/paper/metadata.json", "{}");
    let catalog = Catalog::new(store, "main");

    let sections = catalog.overview().await;

    assert_eq!(sections.len(), CATEGORY_ROOTS.len());
    let roots: Vec<_> = sections.iter().map(|s| s.root.as_str()).collect();
    assert_eq!(roots, CATEGORY_ROOTS.to_vec());
    assert!(sections.iter().all(|s| !s.degraded));

    let count = |root: &str| sections.iter().find(|s| s.root == root).unwrap().items;

    // workshops has one direct leaf; videos, competitions and research
    // group their leaves one category level down and must still count.
    assert_eq!(count("workshops"), 1);
    assert_eq!(count("videos"), 2);
    assert_eq!(count("competitions"), 1);
    assert_eq!(count("research"), 1);
}

#[tokio::test]
async fn test_search_over_standard_roots_reaches_nested_items() {
    let store = seeded_store();
    let catalog = Catalog::new(store, "main");

    // videos/<category>/<slug> items are found from the standard roots.
    let index = catalog.search_index(&CATEGORY_ROOTS).await;
    let results = index.search("rosie", &SourceFilter::all());

    assert_eq!(results.len(), 2);
    assert!(results
        .iter()
        .any(|r| r.source == "videos" && r.item.title == "Rosie: An Introduction"));
    assert!(results
        .iter()
        .any(|r| r.source == "workshops" && r.item.title == "Rosie Lab Session"));
}
