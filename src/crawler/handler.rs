//! Page persistence strategies
//!
//! The crawl loops hand every successfully fetched page to a
//! [`PageHandler`]. [`RawPage`] writes the body untouched; [`TrimmedPage`]
//! keeps one content element and downloads the page's image alongside it.

use crate::config::PageConfig;
use crate::crawler::document::{parse_selector, Document};
use crate::crawler::transport::Transport;
use crate::crawler::CrawlJob;
use crate::output::{ErrorLog, PageWriter};
use crate::url::parse_url;
use crate::{CrawlError, Result};
use async_trait::async_trait;
use scraper::Selector;

/// What a handler may touch while persisting a page
pub struct PageContext<'a> {
    pub job: &'a CrawlJob,
    pub writer: &'a PageWriter,
    pub errors: &'a ErrorLog,
    pub transport: &'a dyn Transport,
}

#[async_trait]
pub trait PageHandler: Send + Sync {
    /// Persists the page fetched for `path`, returning the bytes written
    async fn persist(&self, ctx: &PageContext<'_>, path: &str, body: &[u8]) -> Result<usize>;
}

/// Writes the response body as-is
#[derive(Debug, Default, Clone, Copy)]
pub struct RawPage;

#[async_trait]
impl PageHandler for RawPage {
    async fn persist(&self, ctx: &PageContext<'_>, path: &str, body: &[u8]) -> Result<usize> {
        Ok(ctx.writer.write_page(path, body)?)
    }
}

/// Writes only the content element and fetches the page's image
pub struct TrimmedPage {
    content: Selector,
    image: Option<Selector>,
    image_attr: String,
}

impl TrimmedPage {
    pub fn new(config: &PageConfig) -> Result<Self> {
        Ok(Self {
            content: parse_selector(&config.content_selector)?,
            image: config
                .image_selector
                .as_deref()
                .map(parse_selector)
                .transpose()?,
            image_attr: config.image_attr.clone(),
        })
    }

    /// Pulls the content HTML and the image reference out of the body
    ///
    /// The image is looked up inside the content element only.
    fn extract(&self, path: &str, body: &[u8]) -> (String, Option<String>) {
        let document = Document::parse(body);
        let content = document.first_html(&self.content).unwrap_or_else(|| {
            tracing::warn!("No content element in {}, keeping the whole page", path);
            document.html()
        });

        let image = self.image.as_ref().and_then(|selector| {
            Document::parse(content.as_bytes())
                .first_attr(selector, &self.image_attr)
                .filter(|src| !src.trim().is_empty())
        });

        (content, image)
    }

    async fn download_image(&self, ctx: &PageContext<'_>, path: &str, src: &str) {
        let parts = parse_url(src.trim());
        let Some(image_path) = parts.path else {
            return;
        };

        if ctx.writer.image_file(path, &image_path).exists() {
            tracing::debug!("Image for {} already downloaded", path);
            return;
        }

        let image_url = match parts.domain {
            Some(domain) => format!(
                "{}://{}{}",
                parts.scheme.as_deref().unwrap_or(&ctx.job.scheme),
                domain,
                image_path
            ),
            None => ctx.job.url_for(&image_path),
        };

        let response = match ctx.transport.fetch(&image_url).await {
            Ok(response) if response.is_success() => response,
            Ok(response) => {
                let error = CrawlError::HttpStatus {
                    url: image_url,
                    status: response.status,
                };
                ctx.errors.record(path, &error, Some("image"));
                return;
            }
            Err(source) => {
                let error = CrawlError::Transport {
                    url: image_url,
                    source,
                };
                ctx.errors.record(path, &error, Some("image"));
                return;
            }
        };

        if let Err(e) = ctx.writer.write_image(path, &image_path, &response.body) {
            ctx.errors.record(path, &CrawlError::Io(e), Some("image"));
        }
    }
}

#[async_trait]
impl PageHandler for TrimmedPage {
    async fn persist(&self, ctx: &PageContext<'_>, path: &str, body: &[u8]) -> Result<usize> {
        let (content, image) = self.extract(path, body);

        if let Some(src) = image {
            self.download_image(ctx, path, &src).await;
        }

        Ok(ctx.writer.write_page(path, content.as_bytes())?)
    }
}
