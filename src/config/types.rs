use serde::Deserialize;

/// Main configuration structure for Domain-Trawler
#[derive(Debug, Clone, Deserialize)]
pub struct Config {
    pub job: JobConfig,
    #[serde(default)]
    pub fetch: FetchConfig,
    #[serde(default)]
    pub store: StoreConfig,
    /// Present when the target is a paginated search index
    #[serde(default)]
    pub search: Option<SearchConfig>,
    /// Present when pages should be trimmed before they are written
    #[serde(default)]
    pub page: Option<PageConfig>,
}

/// The crawl job: where to start, where to write, what to follow
#[derive(Debug, Clone, Deserialize)]
pub struct JobConfig {
    /// Starting URL; its host becomes the crawl's domain
    #[serde(rename = "start-url")]
    pub start_url: String,

    /// Existing directory that receives pages, images, and the error log
    #[serde(rename = "download-path")]
    pub download_path: String,

    /// Substrings an href must contain to be followed (empty = any)
    #[serde(default)]
    pub allow: Vec<String>,

    /// Substrings that exclude a path (overrules `allow`)
    #[serde(default)]
    pub avoid: Vec<String>,

    /// Disable to only drain an already-populated frontier
    #[serde(rename = "find-more-links", default = "default_true")]
    pub find_more_links: bool,

    /// Total pages to process before stopping
    #[serde(default = "default_limit")]
    pub limit: u64,
}

/// Transport behaviour
#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct FetchConfig {
    /// Politeness delay between requests (milliseconds)
    #[serde(rename = "delay-ms")]
    pub delay_ms: u64,

    #[serde(rename = "connect-timeout-secs")]
    pub connect_timeout_secs: u64,

    #[serde(rename = "read-timeout-secs")]
    pub read_timeout_secs: u64,

    /// Total attempts per URL, including the first
    #[serde(rename = "max-attempts")]
    pub max_attempts: u32,

    /// Redirect hops followed (same host only)
    #[serde(rename = "max-redirects")]
    pub max_redirects: usize,

    #[serde(rename = "user-agent")]
    pub user_agent: String,

    pub accept: String,

    #[serde(rename = "accept-language")]
    pub accept_language: String,
}

impl Default for FetchConfig {
    fn default() -> Self {
        Self {
            delay_ms: 1000,
            connect_timeout_secs: 10,
            read_timeout_secs: 10,
            max_attempts: 3,
            max_redirects: 1,
            user_agent: "Mozilla/5.0 (Macintosh; Intel Mac OS X 11_2_0) AppleWebKit/537.36 \
                         (KHTML, like Gecko) Chrome/89.0.4389.90 Safari/537.36"
                .to_string(),
            accept: "text/html,application/xhtml+xml,application/xml;q=0.9,image/avif,\
                     image/webp,image/apng,*/*;q=0.8,application/signed-exchange;v=b3;q=0.9"
                .to_string(),
            accept_language: "en-US,en;q=0.9".to_string(),
        }
    }
}

/// Which frontier backend to use
#[derive(Debug, Clone, Copy, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum StoreBackend {
    Redis,
    Sqlite,
    Memory,
}

/// Frontier store configuration
#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct StoreConfig {
    pub backend: StoreBackend,

    #[serde(rename = "redis-url")]
    pub redis_url: String,

    #[serde(rename = "sqlite-path")]
    pub sqlite_path: String,
}

impl Default for StoreConfig {
    fn default() -> Self {
        Self {
            backend: StoreBackend::Redis,
            redis_url: "redis://127.0.0.1/".to_string(),
            sqlite_path: "frontier.db".to_string(),
        }
    }
}

/// Paginated search mode
#[derive(Debug, Clone, Deserialize)]
pub struct SearchConfig {
    /// Search page path; `{page}` is replaced with the page number
    #[serde(rename = "path-template", default = "default_path_template")]
    pub path_template: String,

    #[serde(rename = "start-page", default = "default_start_page")]
    pub start_page: u32,

    /// Hard ceiling in case the end-of-results page changes
    #[serde(rename = "max-page", default = "default_max_page")]
    pub max_page: u32,

    /// CSS selector of the element that marks the end of results
    #[serde(rename = "sentinel-selector")]
    pub sentinel_selector: String,

    /// Regex the sentinel element's text must match
    #[serde(rename = "sentinel-pattern")]
    pub sentinel_pattern: String,
}

/// Trimmed page persistence
#[derive(Debug, Clone, Deserialize)]
pub struct PageConfig {
    /// CSS selector of the element to keep
    #[serde(rename = "content-selector")]
    pub content_selector: String,

    /// CSS selector of the page's image, if one should be downloaded
    #[serde(rename = "image-selector", default)]
    pub image_selector: Option<String>,

    /// Attribute holding the image URL
    #[serde(rename = "image-attr", default = "default_image_attr")]
    pub image_attr: String,
}

fn default_true() -> bool {
    true
}

fn default_limit() -> u64 {
    1000
}

fn default_path_template() -> String {
    "/search?page={page}".to_string()
}

fn default_start_page() -> u32 {
    1
}

fn default_max_page() -> u32 {
    2500
}

fn default_image_attr() -> String {
    "src".to_string()
}
