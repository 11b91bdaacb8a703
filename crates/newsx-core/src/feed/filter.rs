use std::cmp::Ordering;
use std::fmt;
use std::str::FromStr;

use super::models::Article;
use crate::Error;

/// Ordering applied to the visible articles
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum SortOrder {
    #[default]
    Newest,
    Oldest,
    Title,
}

impl SortOrder {
    pub const ALL: [SortOrder; 3] = [SortOrder::Newest, SortOrder::Oldest, SortOrder::Title];

    pub fn as_str(&self) -> &'static str {
        match self {
            SortOrder::Newest => "newest",
            SortOrder::Oldest => "oldest",
            SortOrder::Title => "title",
        }
    }

    fn compare(&self, a: &Article, b: &Article) -> Ordering {
        match self {
            SortOrder::Newest => b.published_at.cmp(&a.published_at),
            SortOrder::Oldest => a.published_at.cmp(&b.published_at),
            SortOrder::Title => a.title.to_lowercase().cmp(&b.title.to_lowercase()),
        }
    }
}

impl fmt::Display for SortOrder {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for SortOrder {
    type Err = Error;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "newest" | "new" | "latest" => Ok(SortOrder::Newest),
            "oldest" | "old" => Ok(SortOrder::Oldest),
            "title" | "az" | "a-z" => Ok(SortOrder::Title),
            other => Err(Error::Config(format!(
                "Unknown sort order '{}', expected newest, oldest or title",
                other
            ))),
        }
    }
}

/// Whether `article` matches `query` (case-insensitive, title or description)
pub fn matches_query(article: &Article, query: &str) -> bool {
    let needle = query.trim().to_lowercase();
    needle.is_empty() || contains_lowercase(article, &needle)
}

fn contains_lowercase(article: &Article, needle: &str) -> bool {
    article.title.to_lowercase().contains(needle) || article.description.to_lowercase().contains(needle)
}

/// Articles whose title or description contains `query`; an empty query keeps everything
pub fn filter_articles<'a>(articles: &'a [Article], query: &str) -> Vec<&'a Article> {
    let needle = query.trim().to_lowercase();
    if needle.is_empty() {
        return articles.iter().collect();
    }

    articles
        .iter()
        .filter(|a| contains_lowercase(a, &needle))
        .collect()
}

/// Stable sort; equal keys keep their original relative order
pub fn sort_articles(articles: &mut [&Article], order: SortOrder) {
    articles.sort_by(|a, b| order.compare(a, b));
}

/// Filter then sort, the full recomputation behind a view
pub fn visible_articles<'a>(articles: &'a [Article], query: &str, order: SortOrder) -> Vec<&'a Article> {
    let mut visible = filter_articles(articles, query);
    sort_articles(&mut visible, order);
    visible
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::feed::Category;
    use chrono::{Duration, TimeZone, Utc};

    fn article(i: usize, title: &str, description: &str, hours: i64) -> Article {
        Article {
            id: format!("general-{}-0", i),
            title: title.to_string(),
            description: description.to_string(),
            url: None,
            image_url: None,
            published_at: Utc.with_ymd_and_hms(2024, 11, 5, 0, 0, 0).unwrap() + Duration::hours(hours),
            category: Category::General,
            source: "Test".to_string(),
        }
    }

    fn batch_of_ten() -> Vec<Article> {
        vec![
            article(0, "Election night live", "Results as they come in", 9),
            article(1, "Weather warning", "Storms expected", 3),
            article(2, "Markets steady", "Stocks flat", 7),
            article(3, "New phone launched", "Specs and price", 1),
            article(4, "Football final", "Late winner", 5),
            article(5, "Recipe of the week", "Soup", 2),
            article(6, "Who won the ELECTION?", "Analysis", 8),
            article(7, "Traffic update", "Roadworks", 4),
            article(8, "Museum reopens", "After renovation", 6),
            article(9, "Space launch delayed", "Weather again", 0),
        ]
    }

    fn ids(articles: &[&Article]) -> Vec<String> {
        articles.iter().map(|a| a.id.clone()).collect()
    }

    #[test]
    fn test_search_is_case_insensitive() {
        let batch = batch_of_ten();
        let found = filter_articles(&batch, "election");
        assert_eq!(ids(&found), vec!["general-0-0", "general-6-0"]);
    }

    #[test]
    fn test_search_matches_description() {
        let batch = batch_of_ten();
        let found = filter_articles(&batch, "WEATHER");
        assert_eq!(ids(&found), vec!["general-1-0", "general-9-0"]);
    }

    #[test]
    fn test_empty_query_returns_everything() {
        let batch = batch_of_ten();
        assert_eq!(filter_articles(&batch, "").len(), 10);
        assert_eq!(filter_articles(&batch, "   ").len(), 10);
    }

    #[test]
    fn test_filter_is_idempotent() {
        let batch = batch_of_ten();
        let once: Vec<Article> = filter_articles(&batch, "e").into_iter().cloned().collect();
        let twice = filter_articles(&once, "e");
        assert_eq!(twice.len(), once.len());
        assert!(twice.iter().zip(once.iter()).all(|(a, b)| a.id == b.id));
    }

    #[test]
    fn test_newest_reversed_is_oldest() {
        let batch = batch_of_ten();
        let mut newest = filter_articles(&batch, "");
        sort_articles(&mut newest, SortOrder::Newest);
        let mut oldest = filter_articles(&batch, "");
        sort_articles(&mut oldest, SortOrder::Oldest);

        newest.reverse();
        assert_eq!(ids(&newest), ids(&oldest));
        assert_eq!(oldest[0].id, "general-9-0");
    }

    #[test]
    fn test_title_sort_twice_is_identical() {
        let batch = batch_of_ten();
        let once = visible_articles(&batch, "", SortOrder::Title);
        let mut twice = once.clone();
        sort_articles(&mut twice, SortOrder::Title);

        assert_eq!(ids(&once), ids(&twice));
        assert_eq!(once[0].title, "Election night live");
        assert_eq!(once[9].title, "Who won the ELECTION?");
    }

    #[test]
    fn test_sort_is_stable_for_ties() {
        let batch = vec![
            article(0, "Same", "a", 1),
            article(1, "same", "b", 1),
            article(2, "Alpha", "c", 1),
            article(3, "SAME", "d", 1),
        ];

        let by_title = visible_articles(&batch, "", SortOrder::Title);
        assert_eq!(ids(&by_title), vec!["general-2-0", "general-0-0", "general-1-0", "general-3-0"]);

        let by_date = visible_articles(&batch, "", SortOrder::Newest);
        assert_eq!(ids(&by_date), vec!["general-0-0", "general-1-0", "general-2-0", "general-3-0"]);
    }

    #[test]
    fn test_parse_sort_order() {
        assert_eq!("Newest".parse::<SortOrder>().unwrap(), SortOrder::Newest);
        assert_eq!("oldest".parse::<SortOrder>().unwrap(), SortOrder::Oldest);
        assert_eq!(" title ".parse::<SortOrder>().unwrap(), SortOrder::Title);
        assert!("random".parse::<SortOrder>().is_err());
        assert_eq!(SortOrder::default(), SortOrder::Newest);
    }

    #[test]
    fn test_matches_query() {
        let a = article(0, "Rust 2.0", "Systems language news", 0);
        assert!(matches_query(&a, "rust"));
        assert!(matches_query(&a, "LANGUAGE"));
        assert!(matches_query(&a, ""));
        assert!(!matches_query(&a, "python"));
    }
}
