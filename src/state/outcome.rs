//! Per-page outcomes and per-run reports

/// Result of one fetch cycle
///
/// Produced once per loop iteration and consumed immediately; nothing
/// retains it beyond the report counters.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum PageOutcome {
    /// The page was fetched and persisted under `path`
    Downloaded { path: String, bytes: usize },

    /// The request followed a single redirect; the page was persisted
    /// under `new_path` and `old_path` was marked finished
    Redirected {
        old_path: String,
        new_path: String,
        bytes: usize,
    },

    /// The fetch failed and `path` was moved to the errored set
    Failed {
        path: String,
        error_kind: String,
        error_detail: String,
    },
}

impl PageOutcome {
    /// The path the cycle ended on (the redirect target for redirects)
    pub fn current_path(&self) -> &str {
        match self {
            Self::Downloaded { path, .. } => path,
            Self::Redirected { new_path, .. } => new_path,
            Self::Failed { path, .. } => path,
        }
    }
}

/// Why a crawl loop stopped
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum StopReason {
    /// The in-progress set emptied
    FrontierExhausted,

    /// The job's page budget was spent
    PageLimit,

    /// Search mode found its end-of-results marker
    SentinelReached,

    /// Search mode passed its page-number ceiling without seeing the marker
    PageLimitExceeded { last_page: u32 },
}

/// Summary of a single crawl loop invocation
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CrawlReport {
    pub pages_processed: u64,
    pub downloaded: u64,
    pub redirected: u64,
    pub failed: u64,
    pub skipped: u64,
    pub stop_reason: StopReason,
}

impl CrawlReport {
    pub(crate) fn new() -> Self {
        Self {
            pages_processed: 0,
            downloaded: 0,
            redirected: 0,
            failed: 0,
            skipped: 0,
            stop_reason: StopReason::FrontierExhausted,
        }
    }

    pub(crate) fn record(&mut self, outcome: &PageOutcome) {
        self.pages_processed += 1;
        match outcome {
            PageOutcome::Downloaded { .. } => self.downloaded += 1,
            PageOutcome::Redirected { .. } => self.redirected += 1,
            PageOutcome::Failed { .. } => self.failed += 1,
        }
    }
}
