use std::time::Duration;

use bytes::Bytes;
use reqwest::header::{HeaderMap, HeaderValue, ACCEPT, ACCEPT_LANGUAGE, USER_AGENT};
use reqwest::{Client, Proxy};
use url::Url;

use super::parser::{decode_news_api, NewsApiResponse, RawPayload};
use super::source::{RestQuery, RssFeed, SourceDescriptor};
use crate::config::{AppConfig, ProxyEndpoint};
use crate::{Error, Result};

const MAX_RESPONSE_BYTES: usize = 5 * 1024 * 1024;
const APP_USER_AGENT: &str = concat!("newsx/", env!("CARGO_PKG_VERSION"));

/// Performs the network side of a load: one NewsAPI request, or an RSS
/// document fetched through the first relay that answers
pub struct NewsFetcher {
    client: Client,
    proxies: Vec<ProxyEndpoint>,
}

impl NewsFetcher {
    /// Create a new fetcher with configuration
    pub fn new(config: &AppConfig) -> Result<Self> {
        let client = Self::build_client(config.fetch.request_timeout_secs, &config.fetch.proxy_url)?;

        Ok(Self {
            client,
            proxies: config.rss.proxies.clone(),
        })
    }

    /// Build HTTP client with optional outbound proxy
    fn build_client(timeout_secs: u64, proxy_url: &Option<String>) -> Result<Client> {
        let mut builder = Client::builder()
            .timeout(Duration::from_secs(timeout_secs))
            .default_headers(Self::build_headers())
            .gzip(true)
            .deflate(true)
            .brotli(true)
            .redirect(reqwest::redirect::Policy::limited(10));

        if let Some(ref proxy) = proxy_url {
            let proxy = Proxy::all(proxy)
                .map_err(|e| Error::Config(format!("Invalid proxy URL: {}", e)))?;
            builder = builder.proxy(proxy);
            tracing::info!("Using HTTP proxy for news fetching");
        }

        builder.build().map_err(Error::Network)
    }

    fn build_headers() -> HeaderMap {
        let mut headers = HeaderMap::new();
        headers.insert(
            ACCEPT,
            HeaderValue::from_static(
                "application/json,application/rss+xml,application/atom+xml,application/xml;q=0.9,*/*;q=0.8",
            ),
        );
        headers.insert(ACCEPT_LANGUAGE, HeaderValue::from_static("en-US,en;q=0.9"));
        headers.insert(USER_AGENT, HeaderValue::from_static(APP_USER_AGENT));
        headers
    }

    /// Fetch the raw payload for a source descriptor
    pub async fn fetch(&self, descriptor: &SourceDescriptor) -> Result<RawPayload> {
        match descriptor {
            SourceDescriptor::Rest(query) => self.fetch_rest(query).await.map(RawPayload::NewsApi),
            SourceDescriptor::Rss(feed) => self.fetch_rss(feed).await,
        }
    }

    /// Single NewsAPI request; any error status or error body becomes `Error::Api`
    async fn fetch_rest(&self, query: &RestQuery) -> Result<NewsApiResponse> {
        let url = query.url()?;
        tracing::info!("Fetching {} headlines from NewsAPI", query.category);

        let response = self.client.get(url).send().await?;
        let status = response.status();
        let body = response.bytes().await?;
        self.ensure_content_size(body.len())?;

        if !status.is_success() {
            // NewsAPI reports failures as JSON with code/message; keep them when present
            return Err(match decode_news_api(&body) {
                Err(api_err @ Error::Api { .. }) => api_err,
                _ => Error::Api {
                    code: status.as_u16().to_string(),
                    message: status
                        .canonical_reason()
                        .unwrap_or("Unexpected response status")
                        .to_string(),
                },
            });
        }

        decode_news_api(&body)
    }

    /// Try each relay in order until one returns the feed document
    async fn fetch_rss(&self, feed: &RssFeed) -> Result<RawPayload> {
        let endpoints = self.relay_urls(feed.feed_url)?;
        let attempts = endpoints.len();
        let mut last_error = None;

        for (index, url) in endpoints.into_iter().enumerate() {
            tracing::info!("Fetching {} feed via endpoint {}/{}: {}", feed.category, index + 1, attempts, url);

            match self.get_bytes(url).await {
                Ok(body) => {
                    return Ok(RawPayload::Feed {
                        body,
                        feed_url: feed.feed_url.to_string(),
                    })
                }
                Err(e) => {
                    tracing::warn!("Endpoint {}/{} failed for {}: {}", index + 1, attempts, feed.feed_url, e);
                    last_error = Some(e);
                }
            }
        }

        Err(Error::AllProxiesFailed {
            attempts,
            last_error: last_error
                .map(|e| e.to_string())
                .unwrap_or_else(|| "no endpoints configured".to_string()),
        })
    }

    /// Request URLs for a feed, one per relay, or the feed itself with no relays
    pub fn relay_urls(&self, feed_url: &str) -> Result<Vec<Url>> {
        if self.proxies.is_empty() {
            return Ok(vec![Url::parse(feed_url)?]);
        }
        self.proxies
            .iter()
            .map(|proxy| proxied_url(proxy, feed_url))
            .collect()
    }

    async fn get_bytes(&self, url: Url) -> Result<Bytes> {
        let response = self.client.get(url.clone()).send().await?;
        let status = response.status();

        if !status.is_success() {
            return Err(Error::HttpStatus {
                status: status.as_u16(),
                url: url.to_string(),
            });
        }

        let body = response.bytes().await?;
        self.ensure_content_size(body.len())?;
        Ok(body)
    }

    fn ensure_content_size(&self, size: usize) -> Result<()> {
        if size > MAX_RESPONSE_BYTES {
            return Err(Error::ResponseTooLarge(size));
        }
        Ok(())
    }
}

/// `{base}?{param}={encoded feed url}`
pub fn proxied_url(proxy: &ProxyEndpoint, feed_url: &str) -> Result<Url> {
    let mut url = Url::parse(&proxy.base)?;
    url.query_pairs_mut().append_pair(&proxy.param, feed_url);
    Ok(url)
}
