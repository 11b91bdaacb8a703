mod fetcher;
mod filter;
mod models;
mod parser;
mod retry;
mod service;
mod source;

pub use fetcher::{proxied_url, NewsFetcher};
pub use filter::{filter_articles, matches_query, sort_articles, visible_articles, SortOrder};
pub use models::{truncate_chars, Article, Batch, Category, SourceKind, PAGE_SIZE, PLACEHOLDER_IMAGE};
pub use parser::{
    decode_news_api, extract_first_image_url, normalize, normalize_feed, normalize_news_api,
    strip_markup, NewsApiArticle, NewsApiResponse, RawPayload,
};
pub use retry::{retry_with_policy, CancelHandle, CancelToken, RetryPolicy};
pub use service::{ArticleSource, NewsService};
pub use source::{feed_url, RestQuery, RssFeed, SourceDescriptor, SourceSelector};
