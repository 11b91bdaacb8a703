use std::sync::OnceLock;

use bytes::Bytes;
use chrono::{DateTime, Utc};
use feed_rs::parser;
use regex::Regex;
use serde::Deserialize;

use super::models::{Article, Category};
use crate::{Error, Result};

/// Raw body produced by the fetcher, before normalization
#[derive(Debug, Clone)]
pub enum RawPayload {
    /// Decoded NewsAPI response that reported `status: ok`
    NewsApi(NewsApiResponse),
    /// RSS/Atom document and the feed URL it came from
    Feed { body: Bytes, feed_url: String },
}

#[derive(Debug, Clone, Deserialize)]
pub struct NewsApiResponse {
    pub status: String,
    #[serde(default)]
    pub code: Option<String>,
    #[serde(default)]
    pub message: Option<String>,
    #[serde(default)]
    pub articles: Vec<NewsApiArticle>,
}

#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct NewsApiArticle {
    #[serde(default)]
    pub source: Option<NewsApiSource>,
    #[serde(default)]
    pub title: Option<String>,
    #[serde(default)]
    pub description: Option<String>,
    #[serde(default)]
    pub url: Option<String>,
    #[serde(default)]
    pub url_to_image: Option<String>,
    #[serde(default)]
    pub published_at: Option<String>,
}

#[derive(Debug, Clone, Deserialize)]
pub struct NewsApiSource {
    #[serde(default)]
    pub name: Option<String>,
}

/// Decode a NewsAPI body, turning `status: "error"` into `Error::Api`
pub fn decode_news_api(body: &[u8]) -> Result<NewsApiResponse> {
    let response: NewsApiResponse = serde_json::from_slice(body)?;
    if response.status.eq_ignore_ascii_case("error") {
        return Err(Error::Api {
            code: response.code.unwrap_or_else(|| "unknown".to_string()),
            message: response.message.unwrap_or_else(|| "API Error".to_string()),
        });
    }
    Ok(response)
}

/// Normalize any payload into articles for `category`
pub fn normalize(payload: RawPayload, category: Category, fetched_at: DateTime<Utc>) -> Result<Vec<Article>> {
    match payload {
        RawPayload::NewsApi(response) => Ok(normalize_news_api(response, category, fetched_at)),
        RawPayload::Feed { body, feed_url } => {
            let fallback_source = url::Url::parse(&feed_url)
                .ok()
                .and_then(|u| u.host_str().map(str::to_string))
                .unwrap_or(feed_url);
            normalize_feed(&body, category, fetched_at, &fallback_source)
        }
    }
}

/// Map NewsAPI entries one to one onto articles
pub fn normalize_news_api(
    response: NewsApiResponse,
    category: Category,
    fetched_at: DateTime<Utc>,
) -> Vec<Article> {
    response
        .articles
        .into_iter()
        .enumerate()
        .map(|(index, entry)| {
            let published_at = entry
                .published_at
                .as_deref()
                .and_then(|s| DateTime::parse_from_rfc3339(s).ok())
                .map(|dt| dt.with_timezone(&Utc))
                .unwrap_or(fetched_at);

            Article {
                id: article_id(category, index, fetched_at),
                title: entry.title.unwrap_or_default(),
                description: entry.description.as_deref().map(strip_markup).unwrap_or_default(),
                url: entry.url.filter(|u| !u.is_empty()),
                image_url: entry.url_to_image.filter(|u| !u.is_empty()),
                published_at,
                category,
                source: entry
                    .source
                    .and_then(|s| s.name)
                    .unwrap_or_else(|| "NewsAPI".to_string()),
            }
        })
        .collect()
}

/// Parse an RSS/Atom document into articles, preserving item order
pub fn normalize_feed(
    content: &[u8],
    category: Category,
    fetched_at: DateTime<Utc>,
    fallback_source: &str,
) -> Result<Vec<Article>> {
    let feed = parser::parse(content).map_err(|e| Error::Parse(e.to_string()))?;

    let source = feed
        .title
        .map(|t| t.content.trim().to_string())
        .filter(|t| !t.is_empty())
        .unwrap_or_else(|| fallback_source.to_string());

    let articles = feed
        .entries
        .into_iter()
        .enumerate()
        .map(|(index, entry)| {
            let title = entry
                .title
                .map(|t| t.content.trim().to_string())
                .unwrap_or_default();

            let url = entry.links.first().map(|l| l.href.clone());

            let raw_description = entry.summary.map(|s| s.content);
            let raw_content = entry.content.and_then(|c| c.body);

            let description = raw_description
                .as_deref()
                .or(raw_content.as_deref())
                .map(strip_markup)
                .unwrap_or_default();

            let published_at = entry
                .published
                .or(entry.updated)
                .unwrap_or(fetched_at);

            // Structured media first, then whatever the markup embeds
            let image_url = entry
                .media
                .iter()
                .flat_map(|m| m.thumbnails.iter())
                .map(|t| t.image.uri.clone())
                .next()
                .or_else(|| {
                    entry
                        .media
                        .iter()
                        .flat_map(|m| m.content.iter())
                        .filter(|c| {
                            c.content_type
                                .as_ref()
                                .map(|mime| mime.to_string().starts_with("image/"))
                                .unwrap_or(true)
                        })
                        .find_map(|c| c.url.as_ref().map(|u| u.to_string()))
                })
                .or_else(|| raw_description.as_deref().and_then(extract_first_image_url))
                .or_else(|| raw_content.as_deref().and_then(extract_first_image_url));

            Article {
                id: article_id(category, index, fetched_at),
                title,
                description,
                url,
                image_url,
                published_at,
                category,
                source: source.clone(),
            }
        })
        .collect();

    Ok(articles)
}

fn article_id(category: Category, index: usize, fetched_at: DateTime<Utc>) -> String {
    format!("{}-{}-{}", category, index, fetched_at.timestamp_millis())
}

fn img_src_regex() -> &'static Regex {
    static RE: OnceLock<Regex> = OnceLock::new();
    RE.get_or_init(|| {
        Regex::new(r#"(?i)<img\b[^>]*?\bsrc\s*=\s*(?:"([^"]+)"|'([^']+)'|([^\s"'>]+))"#)
            .expect("valid img regex")
    })
}

fn tag_regex() -> &'static Regex {
    static RE: OnceLock<Regex> = OnceLock::new();
    // A bare `<` followed by a space or digit is text, not a tag
    RE.get_or_init(|| Regex::new(r"(?s)<[A-Za-z/!?][^>]*>").expect("valid tag regex"))
}

fn entity_regex() -> &'static Regex {
    static RE: OnceLock<Regex> = OnceLock::new();
    RE.get_or_init(|| Regex::new(r"&#?[A-Za-z0-9]+;").expect("valid entity regex"))
}

fn whitespace_regex() -> &'static Regex {
    static RE: OnceLock<Regex> = OnceLock::new();
    RE.get_or_init(|| Regex::new(r"\s+").expect("valid whitespace regex"))
}

/// First `<img src>` in the markup, skipping tracking pixels
pub fn extract_first_image_url(html: &str) -> Option<String> {
    img_src_regex()
        .captures_iter(html)
        .filter_map(|caps| caps.get(1).or_else(|| caps.get(2)).or_else(|| caps.get(3)))
        .map(|m| m.as_str().trim().to_string())
        .find(|url| {
            !url.is_empty() && !url.contains("1x1") && !url.contains("pixel") && !url.contains("tracking")
        })
}

/// Remove tags, decode entities and collapse whitespace
pub fn strip_markup(html: &str) -> String {
    let without_tags = tag_regex().replace_all(html, " ");
    let decoded = entity_regex().replace_all(&without_tags, |caps: &regex::Captures| {
        let entity = &caps[0];
        quick_xml::escape::unescape_with(entity, resolve_html_entity)
            .map(|s| s.into_owned())
            .unwrap_or_else(|_| entity.to_string())
    });
    whitespace_regex().replace_all(&decoded, " ").trim().to_string()
}

fn resolve_html_entity(entity: &str) -> Option<&'static str> {
    match entity {
        "lt" => Some("<"),
        "gt" => Some(">"),
        "amp" => Some("&"),
        "apos" => Some("'"),
        "quot" => Some("\""),
        "nbsp" => Some(" "),
        "ndash" => Some("\u{2013}"),
        "mdash" => Some("\u{2014}"),
        "hellip" => Some("\u{2026}"),
        "lsquo" => Some("\u{2018}"),
        "rsquo" => Some("\u{2019}"),
        "ldquo" => Some("\u{201C}"),
        "rdquo" => Some("\u{201D}"),
        "copy" => Some("\u{00A9}"),
        "reg" => Some("\u{00AE}"),
        "trade" => Some("\u{2122}"),
        "euro" => Some("\u{20AC}"),
        "pound" => Some("\u{00A3}"),
        _ => None,
    }
}
