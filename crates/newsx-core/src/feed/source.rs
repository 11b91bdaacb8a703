use url::Url;

use super::models::Category;
use crate::config::{SourceConfig, SourceMode};
use crate::{Error, Result};

/// NewsAPI top-headlines request for one category
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RestQuery {
    pub base_url: String,
    pub category: Category,
    pub country: String,
    pub api_key: String,
}

impl RestQuery {
    /// Full request URL with category, country and key parameters
    pub fn url(&self) -> Result<Url> {
        let base = self.base_url.trim_end_matches('/');
        let mut url = Url::parse(&format!("{}/v2/top-headlines", base))?;
        url.query_pairs_mut()
            .append_pair("category", self.category.as_str())
            .append_pair("country", &self.country)
            .append_pair("apiKey", &self.api_key);
        Ok(url)
    }
}

/// A category's RSS feed
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RssFeed {
    pub category: Category,
    pub feed_url: &'static str,
}

/// Where the articles for a category come from
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SourceDescriptor {
    Rest(RestQuery),
    Rss(RssFeed),
}

impl SourceDescriptor {
    pub fn category(&self) -> Category {
        match self {
            SourceDescriptor::Rest(q) => q.category,
            SourceDescriptor::Rss(f) => f.category,
        }
    }
}

/// Fixed per-category feed table
pub fn feed_url(category: Category) -> &'static str {
    match category {
        Category::General => "https://feeds.bbci.co.uk/news/rss.xml",
        Category::Technology => "https://feeds.bbci.co.uk/news/technology/rss.xml",
        Category::Business => "https://feeds.bbci.co.uk/news/business/rss.xml",
        Category::Health => "https://feeds.bbci.co.uk/news/health/rss.xml",
        Category::Sports => "https://feeds.bbci.co.uk/sport/rss.xml",
        Category::Entertainment => "https://feeds.bbci.co.uk/news/entertainment_and_arts/rss.xml",
    }
}

/// Maps categories to source descriptors according to the configured mode
#[derive(Debug, Clone)]
pub struct SourceSelector {
    mode: SourceMode,
    api_base_url: String,
    country: String,
    api_key: Option<String>,
}

impl SourceSelector {
    pub fn new(config: &SourceConfig) -> Self {
        Self {
            mode: config.mode,
            api_base_url: config.api_base_url.clone(),
            country: config.country.clone(),
            api_key: config.api_key.clone(),
        }
    }

    /// Pick the source for `category`
    ///
    /// The only failure is REST mode without an API key, which is a configuration
    /// problem rather than something the category could cause.
    pub fn select(&self, category: Category) -> Result<SourceDescriptor> {
        match self.mode {
            SourceMode::Rss => Ok(SourceDescriptor::Rss(RssFeed {
                category,
                feed_url: feed_url(category),
            })),
            SourceMode::Rest => {
                let api_key = self
                    .api_key
                    .clone()
                    .filter(|k| !k.is_empty())
                    .ok_or_else(|| {
                        Error::Config(format!(
                            "NewsAPI key missing: set {} or [source] api_key",
                            crate::config::API_KEY_ENV
                        ))
                    })?;

                Ok(SourceDescriptor::Rest(RestQuery {
                    base_url: self.api_base_url.clone(),
                    category,
                    country: self.country.clone(),
                    api_key,
                }))
            }
        }
    }

    /// Select by name; unknown names resolve to `General`
    pub fn select_by_name(&self, name: &str) -> Result<SourceDescriptor> {
        self.select(Category::resolve(name))
    }
}
