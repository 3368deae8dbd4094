use crate::config::JobConfig;
use crate::url::{absolute_url, parse_url, same_domain};
use crate::{ConfigError, ConfigResult};
use std::path::{Path, PathBuf};

/// A single-domain crawl job
///
/// The job holds only the domain key; the frontier itself lives in the
/// store, so a new job over the same domain resumes where the last left off.
#[derive(Debug, Clone)]
pub struct CrawlJob {
    pub start_url: String,
    pub scheme: String,
    /// Host as given in the start URL (a leading `www.` is kept here and
    /// ignored only when comparing)
    pub domain: String,
    /// `scheme://domain`, prefixed to every frontier path
    pub base_url: String,
    pub start_path: String,
    pub download_dir: PathBuf,
    pub allow: Vec<String>,
    pub avoid: Vec<String>,
    pub find_more_links: bool,
    pub page_limit: u64,
    page_count: u64,
    budget_start: u64,
}

impl CrawlJob {
    /// Builds a job from the `[job]` table
    ///
    /// # Errors
    ///
    /// * `ConfigError::MissingDirectory` if the download directory does not exist
    /// * `ConfigError::InvalidUrl` if no domain can be read from the start URL
    pub fn new(config: &JobConfig) -> ConfigResult<Self> {
        let download_dir = PathBuf::from(&config.download_path);
        if !download_dir.is_dir() {
            return Err(ConfigError::MissingDirectory(config.download_path.clone()));
        }

        let parts = parse_url(&config.start_url);
        let domain = parts
            .domain
            .filter(|d| !d.is_empty())
            .ok_or_else(|| ConfigError::InvalidUrl(config.start_url.clone()))?;
        let scheme = parts
            .scheme
            .map(|s| s.to_lowercase())
            .unwrap_or_else(|| "https".to_string());
        let start_path = parts.path.unwrap_or_else(|| "/".to_string());

        Ok(Self {
            start_url: config.start_url.clone(),
            base_url: format!("{}://{}", scheme, domain),
            scheme,
            domain,
            start_path,
            download_dir,
            allow: config.allow.clone(),
            avoid: config.avoid.clone(),
            find_more_links: config.find_more_links,
            page_limit: config.limit,
            page_count: 0,
            budget_start: 0,
        })
    }

    /// Absolute URL for a frontier path
    pub fn url_for(&self, path: &str) -> String {
        absolute_url(&self.base_url, path)
    }

    pub fn is_same_domain(&self, candidate: Option<&str>) -> bool {
        same_domain(&self.domain, candidate)
    }

    pub fn download_dir(&self) -> &Path {
        &self.download_dir
    }

    /// Paths processed so far, successful or not
    pub fn page_count(&self) -> u64 {
        self.page_count
    }

    /// True once the current loop has processed `page_limit` paths
    pub fn limit_reached(&self) -> bool {
        self.page_count - self.budget_start >= self.page_limit
    }

    /// Starts a fresh page budget for the next crawl loop
    ///
    /// `page_count` keeps running across loops.
    pub(crate) fn start_budget(&mut self) {
        self.budget_start = self.page_count;
    }

    pub(crate) fn record_page(&mut self) {
        self.page_count += 1;
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    fn job_config(start_url: &str, download_path: &str) -> JobConfig {
        JobConfig {
            start_url: start_url.to_string(),
            download_path: download_path.to_string(),
            allow: vec![],
            avoid: vec![],
            find_more_links: true,
            limit: 10,
        }
    }

    #[test]
    fn test_new_job() {
        let dir = TempDir::new().unwrap();
        let config = job_config(
            "https://www.website.com/search/?page=1",
            dir.path().to_str().unwrap(),
        );
        let job = CrawlJob::new(&config).unwrap();

        assert_eq!(job.scheme, "https");
        assert_eq!(job.domain, "www.website.com");
        assert_eq!(job.base_url, "https://www.website.com");
        assert_eq!(job.start_path, "/search/?page=1");
        assert_eq!(job.url_for("/recipes"), "https://www.website.com/recipes");
        assert_eq!(job.page_count(), 0);
    }

    #[test]
    fn test_bare_origin() {
        let dir = TempDir::new().unwrap();
        let config = job_config("https://website.com", dir.path().to_str().unwrap());
        let job = CrawlJob::new(&config).unwrap();

        assert_eq!(job.domain, "website.com");
        assert_eq!(job.start_path, "/");
    }

    #[test]
    fn test_missing_directory() {
        let config = job_config("https://website.com/home", "/definitely/not/here");
        let result = CrawlJob::new(&config);
        assert!(matches!(result, Err(ConfigError::MissingDirectory(_))));
    }

    #[test]
    fn test_missing_domain() {
        let dir = TempDir::new().unwrap();
        let config = job_config("home", dir.path().to_str().unwrap());
        let result = CrawlJob::new(&config);
        assert!(matches!(result, Err(ConfigError::InvalidUrl(_))));
    }

    #[test]
    fn test_page_accounting() {
        let dir = TempDir::new().unwrap();
        let mut config = job_config("https://website.com/home", dir.path().to_str().unwrap());
        config.limit = 2;
        let mut job = CrawlJob::new(&config).unwrap();

        job.record_page();
        assert!(!job.limit_reached());
        job.record_page();
        assert!(job.limit_reached());
        assert_eq!(job.page_count(), 2);
    }

    #[test]
    fn test_budget_restarts_per_loop() {
        let dir = TempDir::new().unwrap();
        let mut config = job_config("https://website.com/home", dir.path().to_str().unwrap());
        config.limit = 2;
        let mut job = CrawlJob::new(&config).unwrap();

        job.record_page();
        job.record_page();
        job.record_page();
        assert!(job.limit_reached());

        job.start_budget();
        assert!(!job.limit_reached());
        job.record_page();
        job.record_page();
        assert!(job.limit_reached());
        assert_eq!(job.page_count(), 5);
    }

    #[test]
    fn test_same_domain_ignores_www() {
        let dir = TempDir::new().unwrap();
        let config = job_config("https://www.website.com/home", dir.path().to_str().unwrap());
        let job = CrawlJob::new(&config).unwrap();

        assert!(job.is_same_domain(Some("website.com")));
        assert!(job.is_same_domain(None));
        assert!(!job.is_same_domain(Some("other.com")));
    }
}
