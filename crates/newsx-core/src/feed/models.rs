use std::fmt;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// Number of cards in a full page; a batch at least this large may have more upstream
pub const PAGE_SIZE: usize = 20;

/// Image shown when an article has none of its own
pub const PLACEHOLDER_IMAGE: &str = "https://via.placeholder.com/360x200?text=No+Image+Available";

const TITLE_MAX_CHARS: usize = 80;
const DESCRIPTION_MAX_CHARS: usize = 120;

/// News topic steering which source endpoint is queried
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Category {
    #[default]
    General,
    Technology,
    Business,
    Health,
    Sports,
    Entertainment,
}

impl Category {
    pub const ALL: [Category; 6] = [
        Category::General,
        Category::Technology,
        Category::Business,
        Category::Health,
        Category::Sports,
        Category::Entertainment,
    ];

    pub fn as_str(&self) -> &'static str {
        match self {
            Category::General => "general",
            Category::Technology => "technology",
            Category::Business => "business",
            Category::Health => "health",
            Category::Sports => "sports",
            Category::Entertainment => "entertainment",
        }
    }

    /// Resolve a user-supplied name, falling back to `General` for anything unknown
    pub fn resolve(name: &str) -> Self {
        let name = name.trim();
        Self::ALL
            .into_iter()
            .find(|c| c.as_str().eq_ignore_ascii_case(name))
            .unwrap_or_else(|| {
                tracing::debug!("Unknown category '{}', using general", name);
                Category::General
            })
    }

    /// Capitalized label for menus and headers
    pub fn label(&self) -> String {
        let name = self.as_str();
        let mut chars = name.chars();
        match chars.next() {
            Some(first) => first.to_uppercase().chain(chars).collect(),
            None => String::new(),
        }
    }
}

impl fmt::Display for Category {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Which kind of upstream produced a batch
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum SourceKind {
    Rest,
    Rss,
}

/// A normalized news article
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Article {
    pub id: String,
    pub title: String,
    pub description: String,
    pub url: Option<String>,
    pub image_url: Option<String>,
    pub published_at: DateTime<Utc>,
    pub category: Category,
    pub source: String,
}

impl Article {
    /// Title for display, truncated, with a stand-in when the source gave none
    pub fn display_title(&self) -> String {
        if self.title.trim().is_empty() {
            "No Title Available".to_string()
        } else {
            truncate_chars(&self.title, TITLE_MAX_CHARS)
        }
    }

    /// Description for display, truncated, with a stand-in when empty
    pub fn display_description(&self) -> String {
        if self.description.trim().is_empty() {
            "No description available for this news article.".to_string()
        } else {
            truncate_chars(&self.description, DESCRIPTION_MAX_CHARS)
        }
    }

    pub fn image_or_placeholder(&self) -> &str {
        self.image_url
            .as_deref()
            .filter(|u| !u.is_empty())
            .unwrap_or(PLACEHOLDER_IMAGE)
    }

    /// Link target if the article can be opened at all
    pub fn read_more_url(&self) -> Option<&str> {
        self.url.as_deref().filter(|u| !u.trim().is_empty())
    }
}

/// The ordered set of articles produced by one fetch+normalize cycle
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Batch {
    pub category: Category,
    pub source_kind: SourceKind,
    pub fetched_at: DateTime<Utc>,
    pub articles: Vec<Article>,
}

impl Batch {
    pub fn len(&self) -> usize {
        self.articles.len()
    }

    pub fn is_empty(&self) -> bool {
        self.articles.is_empty()
    }

    /// A full page came back, so the upstream likely holds more
    pub fn has_more(&self) -> bool {
        self.articles.len() >= PAGE_SIZE
    }
}

/// Cut `text` to at most `max_chars` characters, appending "..." when shortened
pub fn truncate_chars(text: &str, max_chars: usize) -> String {
    match text.char_indices().nth(max_chars) {
        None => text.to_string(),
        Some((end, _)) => format!("{}...", &text[..end]),
    }
}
