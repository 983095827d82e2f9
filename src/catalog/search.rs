//! Cross-category search over aggregated item summaries.
//!
//! The index is a plain concatenation of every category aggregator's
//! output, tagged by source. Search itself is synchronous and stateless
//! per call; debouncing fast input is the caller's job.

use std::collections::HashSet;

use super::item::ContentItem;

/// One indexed entry: an item plus the category root it came from
#[derive(Debug, Clone)]
pub struct SearchEntry {
    /// Source category root (e.g. "videos")
    pub source: String,

    /// The item summary
    pub item: ContentItem,
}

/// A search hit with its relevance score
#[derive(Debug, Clone)]
pub struct RankedResult {
    pub source: String,
    pub score: u32,
    pub item: ContentItem,
}

/// Which source categories are enabled. `all()` disables nothing.
#[derive(Debug, Clone, Default)]
pub struct SourceFilter {
    enabled: Option<HashSet<String>>,
}

impl SourceFilter {
    /// Every source enabled
    pub fn all() -> Self {
        Self::default()
    }

    /// Only the named sources enabled
    pub fn only<I, S>(sources: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        Self {
            enabled: Some(sources.into_iter().map(Into::into).collect()),
        }
    }

    pub fn allows(&self, source: &str) -> bool {
        match &self.enabled {
            None => true,
            Some(set) => set.contains(source),
        }
    }
}

/// Queryable index over all categories
#[derive(Debug, Clone, Default)]
pub struct SearchIndex {
    entries: Vec<SearchEntry>,
}

impl SearchIndex {
    /// Build from per-category aggregator outputs
    pub fn from_categories<I>(categories: I) -> Self
    where
        I: IntoIterator<Item = (String, Vec<ContentItem>)>,
    {
        let entries = categories
            .into_iter()
            .flat_map(|(source, items)| {
                items.into_iter().map(move |item| SearchEntry {
                    source: source.clone(),
                    item,
                })
            })
            .collect();

        Self { entries }
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// Case-insensitive substring search over title, summary and authors.
    ///
    /// An empty query yields no results. The filter is a pure post-filter:
    /// a hit must both match the query and come from an enabled source.
    /// Title hits outrank summary hits outrank author hits; ties break
    /// alphabetically by title.
    pub fn search(&self, query: &str, filter: &SourceFilter) -> Vec<RankedResult> {
        let query = query.trim().to_lowercase();
        if query.is_empty() {
            return Vec::new();
        }

        let mut results: Vec<RankedResult> = self
            .entries
            .iter()
            .filter(|entry| filter.allows(&entry.source))
            .filter_map(|entry| {
                let score = score(&entry.item, &query)?;
                Some(RankedResult {
                    source: entry.source.clone(),
                    score,
                    item: entry.item.clone(),
                })
            })
            .collect();

        results.sort_by(|a, b| {
            b.score
                .cmp(&a.score)
                .then_with(|| a.item.title.cmp(&b.item.title))
        });
        results
    }
}

/// Field-weighted relevance: title 4, summary 2, authors 1
fn score(item: &ContentItem, query: &str) -> Option<u32> {
    let mut score = 0;

    if item.title.to_lowercase().contains(query) {
        score += 4;
    }
    if item.summary.to_lowercase().contains(query) {
        score += 2;
    }
    if item.authors.to_lowercase().contains(query) {
        score += 1;
    }

    (score > 0).then_some(score)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::catalog::item::{parse_metadata, ContentItem};

    fn item(id: &str, json: &str) -> ContentItem {
        ContentItem::from_metadata(id, &format!("x/{}.md", id), parse_metadata(json).unwrap())
    }

    fn index() -> SearchIndex {
        SearchIndex::from_categories([
            (
                "videos".to_string(),
                vec![
                    item("talk1", r#"{"title":"Rosie on Robotics"}"#),
                    item("talk2", r#"{"title":"Graph Learning","authors":"Rosie"}"#),
                ],
            ),
            (
                "articles".to_string(),
                vec![item(
                    "news1",
                    r#"{"title":"Club News","summary":"Rosie wins the competition"}"#,
                )],
            ),
        ])
    }

    #[test]
    fn test_empty_query_yields_nothing() {
        let index = index();
        assert!(index.search("", &SourceFilter::all()).is_empty());
        assert!(index.search("   ", &SourceFilter::all()).is_empty());
    }

    #[test]
    fn test_case_insensitive_match_over_all_fields() {
        let index = index();
        let results = index.search("ROSIE", &SourceFilter::all());

        assert_eq!(results.len(), 3);
        // Title hit ranks above summary hit ranks above author hit.
        assert_eq!(results[0].item.title, "Rosie on Robotics");
        assert_eq!(results[1].item.title, "Club News");
        assert_eq!(results[2].item.title, "Graph Learning");
    }

    #[test]
    fn test_source_filter_is_a_pure_post_filter() {
        let index = index();
        let results = index.search("rosie", &SourceFilter::only(["videos"]));

        assert_eq!(results.len(), 2);
        assert!(results.iter().all(|r| r.source == "videos"));
    }

    #[test]
    fn test_no_match() {
        let index = index();
        assert!(index.search("quantum", &SourceFilter::all()).is_empty());
    }
}
