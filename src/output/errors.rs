//! JSON lines error log
//!
//! One record per failed path, appended to `crawler_errors.jsonl` in the
//! download directory so a run's failures can be loaded as a table later.

use crate::CrawlError;
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::fs::OpenOptions;
use std::io::{self, Write};
use std::path::{Path, PathBuf};

/// File name of the error log inside the download directory
pub const ERROR_LOG_FILE: &str = "crawler_errors.jsonl";

/// One line of the error log
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ErrorRecord {
    pub path: String,
    pub error_kind: String,
    pub error_detail: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub note: Option<String>,
    pub logged_at: DateTime<Utc>,
}

impl ErrorRecord {
    pub fn new(path: &str, error: &CrawlError, note: Option<&str>) -> Self {
        Self {
            path: path.to_string(),
            error_kind: error.kind().to_string(),
            error_detail: error.to_string(),
            note: note.map(str::to_string),
            logged_at: Utc::now(),
        }
    }
}

/// Append-only error log
#[derive(Debug, Clone)]
pub struct ErrorLog {
    file: PathBuf,
}

impl ErrorLog {
    /// Error log inside `dir`
    pub fn new(dir: &Path) -> Self {
        Self {
            file: dir.join(ERROR_LOG_FILE),
        }
    }

    pub fn file(&self) -> &Path {
        &self.file
    }

    /// Appends a record as a single JSON line
    pub fn append(&self, record: &ErrorRecord) -> io::Result<()> {
        let line = serde_json::to_string(record)?;
        let mut file = OpenOptions::new()
            .create(true)
            .append(true)
            .open(&self.file)?;
        writeln!(file, "{}", line)
    }

    /// Records a failure for `path` on the console and in the log
    ///
    /// A log that cannot be written is reported but never stops the crawl.
    pub fn record(&self, path: &str, error: &CrawlError, note: Option<&str>) {
        tracing::warn!("{}: {}: {}", error.kind(), error, path);

        let record = ErrorRecord::new(path, error, note);
        if let Err(e) = self.append(&record) {
            tracing::error!(
                "Failed to write error log {}: {}",
                self.file.display(),
                e
            );
        }
    }

    /// Reads every record back, skipping lines that do not parse
    pub fn read_all(&self) -> io::Result<Vec<ErrorRecord>> {
        let content = match std::fs::read_to_string(&self.file) {
            Ok(content) => content,
            Err(e) if e.kind() == io::ErrorKind::NotFound => return Ok(Vec::new()),
            Err(e) => return Err(e),
        };

        Ok(content
            .lines()
            .filter_map(|line| serde_json::from_str(line).ok())
            .collect())
    }
}
