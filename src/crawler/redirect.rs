use crate::state::FrontierSet;
use crate::storage::{is_settled, FrontierStore};
use crate::url::parse_url;
use crate::{CrawlError, Result};

/// Reconciles a followed redirect with the frontier
///
/// The requested path is marked finished and the path of `final_url` is
/// queued in its place, unless the target already sits in `finished` or
/// `errored`. Returns the new path, which the caller carries on processing.
///
/// # Errors
///
/// `CrawlError::MissingRedirectTarget` if no path can be read from
/// `final_url`. This is fatal to the crawl.
pub async fn consolidate_redirect(
    store: &dyn FrontierStore,
    domain: &str,
    old_path: &str,
    final_url: &str,
) -> Result<String> {
    let new_path = parse_url(final_url)
        .path
        .ok_or_else(|| CrawlError::MissingRedirectTarget {
            path: old_path.to_string(),
            final_url: final_url.to_string(),
        })?;

    store.remove(domain, FrontierSet::InProgress, old_path).await?;
    store.add(domain, FrontierSet::Finished, old_path).await?;
    if is_settled(store, domain, &new_path).await? {
        tracing::debug!("Redirect target {} was already attempted", new_path);
    } else {
        store.add(domain, FrontierSet::InProgress, &new_path).await?;
    }

    tracing::info!("Redirected {} -> {}", old_path, new_path);
    Ok(new_path)
}
