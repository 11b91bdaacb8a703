use chrono::Utc;

use super::fetcher::NewsFetcher;
use super::models::{Batch, Category, SourceKind};
use super::parser::normalize;
use super::retry::{retry_with_policy, CancelToken, RetryPolicy};
use super::source::{SourceDescriptor, SourceSelector};
use crate::config::AppConfig;
use crate::{Error, Result};

/// Anything that can produce a batch of articles for a category
#[async_trait::async_trait]
pub trait ArticleSource: Send + Sync {
    /// Load a full batch, honoring `cancel` at every await point
    async fn load(&self, category: Category, cancel: &CancelToken) -> Result<Batch>;
}

/// The fetch, normalize and retry pipeline
pub struct NewsService {
    selector: SourceSelector,
    fetcher: NewsFetcher,
    policy: RetryPolicy,
}

impl NewsService {
    pub fn new(config: &AppConfig) -> Result<Self> {
        Ok(Self {
            selector: SourceSelector::new(&config.source),
            fetcher: NewsFetcher::new(config)?,
            policy: RetryPolicy::from_config(&config.fetch),
        })
    }

    pub fn with_policy(mut self, policy: RetryPolicy) -> Self {
        self.policy = policy;
        self
    }

    /// One fetch+normalize pass; parse failures collapse into an empty result
    async fn load_once(&self, descriptor: &SourceDescriptor, attempt: u32) -> Result<Batch> {
        let category = descriptor.category();
        tracing::debug!(category = %category, attempt = attempt, "Loading batch");

        let payload = self.fetcher.fetch(descriptor).await?;
        let fetched_at = Utc::now();

        let articles = match normalize(payload, category, fetched_at) {
            Ok(articles) => articles,
            Err(Error::Parse(e)) => {
                tracing::warn!("Could not parse {} feed: {}", category, e);
                Vec::new()
            }
            Err(e) => return Err(e),
        };

        if articles.is_empty() {
            return Err(Error::EmptyResult(category));
        }

        let source_kind = match descriptor {
            SourceDescriptor::Rest(_) => SourceKind::Rest,
            SourceDescriptor::Rss(_) => SourceKind::Rss,
        };

        tracing::info!("Loaded {} {} articles", articles.len(), category);

        Ok(Batch {
            category,
            source_kind,
            fetched_at,
            articles,
        })
    }
}

#[async_trait::async_trait]
impl ArticleSource for NewsService {
    async fn load(&self, category: Category, cancel: &CancelToken) -> Result<Batch> {
        let descriptor = self.selector.select(category)?;
        let descriptor = &descriptor;

        retry_with_policy(self.policy, cancel, |attempt| self.load_once(descriptor, attempt)).await
    }
}
