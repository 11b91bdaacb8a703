use thiserror::Error;

use crate::feed::Category;

/// Message shown to the reader once every retry has been spent
pub const USER_FACING_MESSAGE: &str = "Failed to fetch news articles. Please try again later.";

#[derive(Error, Debug)]
pub enum Error {
    #[error("Network error: {0}")]
    Network(#[from] reqwest::Error),

    #[error("HTTP {status} for URL: {url}")]
    HttpStatus { status: u16, url: String },

    #[error("News API error ({code}): {message}")]
    Api { code: String, message: String },

    #[error("All {attempts} proxy endpoints failed, last error: {last_error}")]
    AllProxiesFailed { attempts: usize, last_error: String },

    #[error("No articles found for category '{0}'")]
    EmptyResult(Category),

    #[error("Feed parsing error: {0}")]
    Parse(String),

    #[error("Response too large ({0} bytes)")]
    ResponseTooLarge(usize),

    #[error("Fetch cancelled")]
    Cancelled,

    #[error("Configuration error: {0}")]
    Config(String),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("URL parsing error: {0}")]
    UrlParse(#[from] url::ParseError),

    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),
}

impl Error {
    /// Whether another attempt at the same fetch could reasonably succeed
    pub fn is_transient(&self) -> bool {
        matches!(
            self,
            Error::Network(_)
                | Error::HttpStatus { .. }
                | Error::AllProxiesFailed { .. }
                | Error::EmptyResult(_)
                | Error::Parse(_)
        )
    }
}

pub type Result<T> = std::result::Result<T, Error>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_transient_classification() {
        assert!(Error::EmptyResult(Category::Health).is_transient());
        assert!(Error::Parse("bad xml".into()).is_transient());
        assert!(Error::AllProxiesFailed {
            attempts: 3,
            last_error: "HTTP 502".into()
        }
        .is_transient());

        assert!(!Error::Api {
            code: "apiKeyInvalid".into(),
            message: "Your API key is invalid".into()
        }
        .is_transient());
        assert!(!Error::Cancelled.is_transient());
        assert!(!Error::Config("missing key".into()).is_transient());
    }

    #[test]
    fn test_empty_result_message_names_category() {
        let err = Error::EmptyResult(Category::Technology);
        assert_eq!(err.to_string(), "No articles found for category 'technology'");
    }
}
