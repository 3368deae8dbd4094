//! Crawl loops
//!
//! [`Crawler`] drives the per-path fetch cycle over the shared frontier:
//!
//! - [`Crawler::crawl_domain`]: breadth-first over every in-scope link
//! - [`Crawler::crawl_search`]: walks numbered search result pages until a
//!   sentinel page appears
//! - [`Crawler::drain`]: fetches whatever is already queued, without
//!   seeding or following links
//!
//! One fetch is in flight at a time. Every path taken from the frontier is
//! accounted for exactly once, in `finished` or `errored`.

use crate::config::{Config, SearchConfig};
use crate::crawler::document::Document;
use crate::crawler::handler::{PageContext, PageHandler, RawPage, TrimmedPage};
use crate::crawler::links::{discover_links, link_candidates};
use crate::crawler::redirect::consolidate_redirect;
use crate::crawler::search::{search_path, Sentinel};
use crate::crawler::transport::{FetchResponse, HttpTransport, Transport};
use crate::crawler::CrawlJob;
use crate::output::{ErrorLog, PageWriter};
use crate::state::{CrawlReport, FrontierSet, PageOutcome, StopReason};
use crate::storage::{is_settled, FrontierStore};
use crate::{CrawlError, Result};
use std::sync::Arc;
use std::time::Duration;

/// Depth samples are taken every this many processed pages
const SAMPLE_INTERVAL: u64 = 10;

/// Switches for one run of the frontier loop
#[derive(Debug, Clone, Copy)]
struct LoopOptions {
    /// Queue the start path when the frontier is empty
    seed: bool,
    /// Follow links found on fetched pages
    discover: bool,
}

/// A crawler bound to one job, one store, and one transport
pub struct Crawler {
    job: CrawlJob,
    store: Arc<dyn FrontierStore>,
    transport: Arc<dyn Transport>,
    handler: Box<dyn PageHandler>,
    writer: PageWriter,
    errors: ErrorLog,
    delay: Duration,
}

impl Crawler {
    /// Creates a crawler that writes raw pages with a one second delay
    pub fn new(job: CrawlJob, store: Arc<dyn FrontierStore>, transport: Arc<dyn Transport>) -> Self {
        let writer = PageWriter::new(job.download_dir());
        let errors = ErrorLog::new(job.download_dir());
        Self {
            job,
            store,
            transport,
            handler: Box::new(RawPage),
            writer,
            errors,
            delay: Duration::from_secs(1),
        }
    }

    /// Creates a crawler from a loaded configuration
    ///
    /// Uses the HTTP transport, the `[fetch]` delay, and a trimmed page
    /// handler when `[page]` is present.
    pub fn from_config(config: &Config, store: Arc<dyn FrontierStore>) -> Result<Self> {
        let job = CrawlJob::new(&config.job)?;
        let transport = HttpTransport::new(&config.fetch).map_err(|source| CrawlError::Transport {
            url: job.base_url.clone(),
            source,
        })?;

        let mut crawler = Self::new(job, store, Arc::new(transport))
            .with_delay(Duration::from_millis(config.fetch.delay_ms));

        if let Some(page) = &config.page {
            crawler = crawler.with_handler(Box::new(TrimmedPage::new(page)?));
        }

        Ok(crawler)
    }

    pub fn with_handler(mut self, handler: Box<dyn PageHandler>) -> Self {
        self.handler = handler;
        self
    }

    pub fn with_delay(mut self, delay: Duration) -> Self {
        self.delay = delay;
        self
    }

    pub fn job(&self) -> &CrawlJob {
        &self.job
    }

    pub fn store(&self) -> &Arc<dyn FrontierStore> {
        &self.store
    }

    pub fn error_log(&self) -> &ErrorLog {
        &self.errors
    }

    /// Crawls the job's domain until the frontier empties or the page
    /// limit is reached
    pub async fn crawl_domain(&mut self) -> Result<CrawlReport> {
        let options = LoopOptions {
            seed: true,
            discover: self.job.find_more_links,
        };
        self.run_frontier(options).await
    }

    /// Fetches every queued path without seeding or following links
    pub async fn drain(&mut self) -> Result<CrawlReport> {
        let options = LoopOptions {
            seed: false,
            discover: false,
        };
        self.run_frontier(options).await
    }

    /// Walks search result pages from `start_page` until the sentinel page
    ///
    /// Pages already finished are skipped without a request. The page limit
    /// does not apply here; `max_page` bounds the walk instead.
    pub async fn crawl_search(&mut self, search: &SearchConfig) -> Result<CrawlReport> {
        let sentinel = Sentinel::new(search)?;
        let mut report = CrawlReport::new();
        let mut cursor = Some(search.start_page);

        tracing::info!(
            "Starting search crawl of {} at page {}",
            self.job.domain,
            search.start_page
        );

        loop {
            let Some(page) = cursor.filter(|page| *page <= search.max_page) else {
                tracing::warn!(
                    "Page limit {} reached before finding the end of results",
                    search.max_page
                );
                report.stop_reason = StopReason::PageLimitExceeded {
                    last_page: search.max_page,
                };
                break;
            };
            cursor = page.checked_add(1);

            let path = search_path(&search.path_template, page);
            if self
                .store
                .contains(&self.job.domain, FrontierSet::Finished, &path)
                .await?
            {
                tracing::debug!("Search page {} already finished", path);
                report.skipped += 1;
                continue;
            }

            let response = match self.fetch(&path).await {
                Ok(response) => response,
                Err(error) => {
                    let outcome = self.fail(&path, error).await?;
                    report.record(&outcome);
                    continue;
                }
            };

            if sentinel.is_present(&response.body) {
                tracing::info!("Reached the final search page at {}", path);
                report.stop_reason = StopReason::SentinelReached;
                break;
            }

            let discover = self.job.find_more_links;
            let outcome = self.process(path, response, discover).await?;
            report.record(&outcome);

            tokio::time::sleep(self.delay).await;
        }

        Ok(report)
    }

    /// Runs one fetch cycle for `path`, which must already be out of
    /// `in_progress` or about to leave it
    ///
    /// Per-path failures come back as `PageOutcome::Failed`; only fatal
    /// errors are returned as `Err`.
    pub async fn fetch_cycle(&mut self, path: &str, discover: bool) -> Result<PageOutcome> {
        match self.fetch(path).await {
            Ok(response) => self.process(path.to_string(), response, discover).await,
            Err(error) => self.fail(path, error).await,
        }
    }

    async fn run_frontier(&mut self, options: LoopOptions) -> Result<CrawlReport> {
        let domain = self.job.domain.clone();
        let mut report = CrawlReport::new();
        self.job.start_budget();

        if options.seed && self.store.count(&domain, FrontierSet::InProgress).await? == 0 {
            if is_settled(self.store.as_ref(), &domain, &self.job.start_path).await? {
                tracing::info!("{} was already crawled; nothing to seed", self.job.start_path);
            } else {
                tracing::info!("Seeding frontier with {}", self.job.start_path);
                self.store
                    .add(&domain, FrontierSet::InProgress, &self.job.start_path)
                    .await?;
            }
        }

        loop {
            let queued = self.store.count(&domain, FrontierSet::InProgress).await?;
            if queued == 0 {
                tracing::info!("Frontier for {} is empty", domain);
                break;
            }

            if self.job.page_count() % SAMPLE_INTERVAL == 0 {
                tracing::info!("{} paths in progress", queued);
                self.store.append_sample(&domain, queued).await?;
            }

            let Some(path) = self
                .store
                .take_arbitrary(&domain, FrontierSet::InProgress)
                .await?
            else {
                // Another process emptied the frontier between count and take
                break;
            };

            let outcome = match self.fetch_cycle(&path, options.discover).await {
                Ok(outcome) => outcome,
                Err(e) => {
                    self.release(&path).await;
                    return Err(e);
                }
            };
            report.record(&outcome);

            if self.job.limit_reached() {
                self.store
                    .remove(&domain, FrontierSet::InProgress, outcome.current_path())
                    .await?;
                tracing::info!("Page limit of {} reached", self.job.page_limit);
                report.stop_reason = StopReason::PageLimit;
                break;
            }

            tokio::time::sleep(self.delay).await;
        }

        Ok(report)
    }

    /// Requests a path; non-2xx responses count as failures
    async fn fetch(&self, path: &str) -> std::result::Result<FetchResponse, CrawlError> {
        let url = self.job.url_for(path);
        let response = self
            .transport
            .fetch(&url)
            .await
            .map_err(|source| CrawlError::Transport {
                url: url.clone(),
                source,
            })?;

        tracing::info!("{} {}", response.status, path);

        if !response.is_success() {
            return Err(CrawlError::HttpStatus {
                url,
                status: response.status,
            });
        }

        Ok(response)
    }

    /// Consolidates redirects, follows links, persists, and completes
    async fn process(
        &mut self,
        path: String,
        response: FetchResponse,
        discover: bool,
    ) -> Result<PageOutcome> {
        let domain = self.job.domain.clone();

        let redirected_from = if response.redirect_count == 1 {
            Some(path.clone())
        } else {
            None
        };
        let current = match &redirected_from {
            Some(old_path) => {
                consolidate_redirect(self.store.as_ref(), &domain, old_path, &response.final_url)
                    .await?
            }
            None => path,
        };

        if discover {
            let candidates = {
                let document = Document::parse(&response.body);
                link_candidates(&document, &self.job.allow)
            };
            let added = discover_links(self.store.as_ref(), &self.job, candidates).await?;
            tracing::debug!("Found {} new links on {}", added, current);
        }

        let ctx = PageContext {
            job: &self.job,
            writer: &self.writer,
            errors: &self.errors,
            transport: self.transport.as_ref(),
        };
        let persisted = self.handler.persist(&ctx, &current, &response.body).await;
        let bytes = match persisted {
            Ok(bytes) => bytes,
            Err(error) => return self.fail(&current, error).await,
        };

        self.complete(&current).await?;
        tracing::info!("Completed download of {}", current);

        Ok(match redirected_from {
            Some(old_path) => PageOutcome::Redirected {
                old_path,
                new_path: current,
                bytes,
            },
            None => PageOutcome::Downloaded {
                path: current,
                bytes,
            },
        })
    }

    /// Moves a path to `finished`, clearing any earlier failure
    async fn complete(&mut self, path: &str) -> Result<()> {
        self.job.record_page();
        self.settle(path, FrontierSet::Finished).await
    }

    /// Logs a per-path failure and moves the path to `errored`
    ///
    /// Fatal errors are handed back instead.
    async fn fail(&mut self, path: &str, error: CrawlError) -> Result<PageOutcome> {
        if error.is_fatal() {
            return Err(error);
        }

        self.errors.record(path, &error, None);
        self.settle(path, FrontierSet::Errored).await?;
        self.job.record_page();

        Ok(PageOutcome::Failed {
            path: path.to_string(),
            error_kind: error.kind().to_string(),
            error_detail: error.to_string(),
        })
    }

    /// Adds `path` to `target` and removes it from the other two sets
    async fn settle(&self, path: &str, target: FrontierSet) -> Result<()> {
        self.store.add(&self.job.domain, target, path).await?;
        for set in FrontierSet::all() {
            if set != target {
                self.store.remove(&self.job.domain, set, path).await?;
            }
        }
        Ok(())
    }

    /// Puts a taken path back after a fatal error
    async fn release(&self, path: &str) {
        if let Err(e) = self
            .store
            .add(&self.job.domain, FrontierSet::InProgress, path)
            .await
        {
            tracing::error!("Could not return {} to the frontier: {}", path, e);
        }
    }
}
