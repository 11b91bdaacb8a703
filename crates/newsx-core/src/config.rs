use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};

/// Environment variable holding the NewsAPI key
pub const API_KEY_ENV: &str = "NEWS_API_KEY";
/// Environment variable overriding `source.mode` ("rest" or "rss")
pub const SOURCE_MODE_ENV: &str = "NEWSX_SOURCE";

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct AppConfig {
    #[serde(default)]
    pub general: GeneralConfig,
    #[serde(default)]
    pub source: SourceConfig,
    #[serde(default)]
    pub rss: RssConfig,
    #[serde(default)]
    pub fetch: FetchConfig,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct GeneralConfig {
    /// Log level used when RUST_LOG is not set
    #[serde(default = "default_log_level")]
    pub log_level: String,
}

impl Default for GeneralConfig {
    fn default() -> Self {
        Self {
            log_level: default_log_level(),
        }
    }
}

/// Upstream kind used for every category
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum SourceMode {
    /// NewsAPI top-headlines
    Rest,
    /// Per-category RSS feed
    #[default]
    Rss,
}

impl std::str::FromStr for SourceMode {
    type Err = crate::Error;

    fn from_str(s: &str) -> crate::Result<Self> {
        match s.trim().to_ascii_lowercase().as_str() {
            "rest" | "api" | "newsapi" => Ok(SourceMode::Rest),
            "rss" | "feed" => Ok(SourceMode::Rss),
            other => Err(crate::Error::Config(format!("Unknown source mode: {}", other))),
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SourceConfig {
    /// "rest" for NewsAPI, "rss" for feeds
    #[serde(default)]
    pub mode: SourceMode,
    /// NewsAPI base URL
    #[serde(default = "default_api_base_url")]
    pub api_base_url: String,
    /// Country code passed to NewsAPI
    #[serde(default = "default_country")]
    pub country: String,
    /// NewsAPI key (also read from NEWS_API_KEY)
    #[serde(default)]
    pub api_key: Option<String>,
}

impl Default for SourceConfig {
    fn default() -> Self {
        Self {
            mode: SourceMode::default(),
            api_base_url: default_api_base_url(),
            country: default_country(),
            api_key: None,
        }
    }
}

/// A relay that fetches a URL on our behalf: `{base}?{param}={encoded url}`
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ProxyEndpoint {
    pub base: String,
    #[serde(default = "default_proxy_param")]
    pub param: String,
}

impl ProxyEndpoint {
    pub fn new(base: impl Into<String>, param: impl Into<String>) -> Self {
        Self {
            base: base.into(),
            param: param.into(),
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RssConfig {
    /// Relays tried in order; empty means fetch feeds directly
    #[serde(default = "default_proxies")]
    pub proxies: Vec<ProxyEndpoint>,
}

impl Default for RssConfig {
    fn default() -> Self {
        Self {
            proxies: default_proxies(),
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct FetchConfig {
    /// Request timeout in seconds
    #[serde(default = "default_timeout")]
    pub request_timeout_secs: u64,
    /// Additional attempts after the first one fails or comes back empty
    #[serde(default = "default_max_retries")]
    pub max_retries: u32,
    /// Retry n waits n times this long
    #[serde(default = "default_retry_base_delay")]
    pub retry_base_delay_ms: u64,
    /// Outbound HTTP proxy (e.g., "http://127.0.0.1:7890" or "socks5://127.0.0.1:1080")
    #[serde(default)]
    pub proxy_url: Option<String>,
}

impl Default for FetchConfig {
    fn default() -> Self {
        Self {
            request_timeout_secs: default_timeout(),
            max_retries: default_max_retries(),
            retry_base_delay_ms: default_retry_base_delay(),
            proxy_url: None,
        }
    }
}

fn default_log_level() -> String {
    "warn".to_string()
}

fn default_api_base_url() -> String {
    "https://newsapi.org".to_string()
}

fn default_country() -> String {
    "us".to_string()
}

fn default_proxy_param() -> String {
    "url".to_string()
}

fn default_proxies() -> Vec<ProxyEndpoint> {
    vec![
        ProxyEndpoint::new("https://api.allorigins.win/raw", "url"),
        ProxyEndpoint::new("https://corsproxy.io/", "url"),
        ProxyEndpoint::new("https://api.codetabs.com/v1/proxy/", "quest"),
    ]
}

fn default_timeout() -> u64 {
    30
}

fn default_max_retries() -> u32 {
    2
}

fn default_retry_base_delay() -> u64 {
    1000
}

impl AppConfig {
    /// Load configuration from the default path, then apply environment overrides
    pub fn load() -> crate::Result<Self> {
        let mut config = Self::load_from(&Self::config_path())?;
        config.apply_env_overrides(|key| std::env::var(key).ok())?;
        Ok(config)
    }

    /// Load configuration from a specific file, or defaults if it does not exist
    pub fn load_from(path: &Path) -> crate::Result<Self> {
        if path.exists() {
            let content = std::fs::read_to_string(path)?;
            Self::from_toml(&content)
        } else {
            Ok(Self::default())
        }
    }

    pub fn from_toml(content: &str) -> crate::Result<Self> {
        toml::from_str(content).map_err(|e| crate::Error::Config(e.to_string()))
    }

    /// Overlay values from the environment; `lookup` stands in for `std::env::var`
    pub fn apply_env_overrides<F>(&mut self, lookup: F) -> crate::Result<()>
    where
        F: Fn(&str) -> Option<String>,
    {
        if let Some(key) = lookup(API_KEY_ENV).filter(|k| !k.trim().is_empty()) {
            self.source.api_key = Some(key.trim().to_string());
        }
        if let Some(mode) = lookup(SOURCE_MODE_ENV) {
            self.source.mode = mode.parse()?;
        }
        Ok(())
    }

    /// Save configuration to file
    pub fn save(&self) -> crate::Result<()> {
        self.save_to(&Self::config_path())
    }

    pub fn save_to(&self, path: &Path) -> crate::Result<()> {
        if let Some(parent) = path.parent() {
            std::fs::create_dir_all(parent)?;
        }

        let content =
            toml::to_string_pretty(self).map_err(|e| crate::Error::Config(e.to_string()))?;
        std::fs::write(path, content)?;

        Ok(())
    }

    /// Get the configuration file path
    /// Always uses ~/.config/newsx/config.toml on all platforms
    pub fn config_path() -> PathBuf {
        dirs::home_dir()
            .unwrap_or_else(|| PathBuf::from("."))
            .join(".config")
            .join("newsx")
            .join("config.toml")
    }
}
