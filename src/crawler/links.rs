//! Link discovery and filtering
//!
//! Candidate collection runs synchronously against a [`Document`]; the
//! store lookups that follow run on owned [`LinkElement`]s.

use crate::crawler::document::{Document, LinkElement};
use crate::crawler::CrawlJob;
use crate::state::FrontierSet;
use crate::storage::FrontierStore;
use crate::url::resolve_href;
use crate::Result;

/// Paths longer than this are not followed
pub const MAX_PATH_LEN: usize = 120;

/// Elements marked hidden (other than by an `overflow-hidden` class) are
/// usually crawler traps
pub fn is_hidden_element(outer_html: &str) -> bool {
    let lowered = outer_html.to_lowercase();
    lowered.contains("hidden") && !lowered.contains("overflow-hidden")
}

/// Paths with an embedded URL are usually tracking or share links
pub fn is_messy_path(path: &str) -> bool {
    path.contains("http")
}

pub fn is_avoided(path: &str, avoid: &[String]) -> bool {
    avoid.iter().any(|substring| path.contains(substring.as_str()))
}

/// Collects the anchors worth resolving
///
/// Without `allow`, every anchor with an href and non-empty text. With
/// `allow`, for each substring every anchor whose href contains it.
pub fn link_candidates(document: &Document, allow: &[String]) -> Vec<LinkElement> {
    let anchors = document.anchors();

    if allow.is_empty() {
        return anchors
            .into_iter()
            .filter(|a| !a.text.is_empty())
            .collect();
    }

    allow
        .iter()
        .flat_map(|substring| {
            anchors
                .iter()
                .filter(move |a| a.href.contains(substring.as_str()))
                .cloned()
        })
        .collect()
}

/// Filters candidates and adds the survivors to `in_progress`
///
/// Returns the number of paths newly added to the frontier.
pub async fn discover_links(
    store: &dyn FrontierStore,
    job: &CrawlJob,
    candidates: Vec<LinkElement>,
) -> Result<usize> {
    let mut added = 0;

    for link in candidates {
        if is_hidden_element(&link.outer_html) || link.href.is_empty() {
            continue;
        }

        let candidate = match resolve_href(&link.href) {
            Ok(candidate) => candidate,
            Err(e) => {
                tracing::debug!("Dropping link: {}", e);
                continue;
            }
        };

        if should_skip(store, job, candidate.domain.as_deref(), &candidate.path).await? {
            tracing::trace!("Skipping link {}", link.href);
            continue;
        }

        if store
            .add(&job.domain, FrontierSet::InProgress, &candidate.path)
            .await?
        {
            tracing::debug!("Queued {}", candidate.path);
            added += 1;
        }
    }

    Ok(added)
}

async fn should_skip(
    store: &dyn FrontierStore,
    job: &CrawlJob,
    domain: Option<&str>,
    path: &str,
) -> Result<bool> {
    if path.is_empty() || path.chars().count() > MAX_PATH_LEN || !job.is_same_domain(domain) {
        return Ok(true);
    }

    if is_avoided(path, &job.avoid) || is_messy_path(path) {
        return Ok(true);
    }

    for set in [FrontierSet::Finished, FrontierSet::Errored] {
        if store.contains(&job.domain, set, path).await? {
            return Ok(true);
        }
    }

    Ok(false)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::JobConfig;
    use crate::storage::MemoryStore;
    use tempfile::TempDir;

    fn test_job(dir: &TempDir, allow: &[&str], avoid: &[&str]) -> CrawlJob {
        CrawlJob::new(&JobConfig {
            start_url: "https://www.website.com/home".to_string(),
            download_path: dir.path().to_str().unwrap().to_string(),
            allow: allow.iter().map(|s| s.to_string()).collect(),
            avoid: avoid.iter().map(|s| s.to_string()).collect(),
            find_more_links: true,
            limit: 100,
        })
        .unwrap()
    }

    fn link(href: &str, text: &str) -> LinkElement {
        LinkElement {
            href: href.to_string(),
            text: text.to_string(),
            outer_html: format!("<a href=\"{}\">{}</a>", href, text),
        }
    }

    #[test]
    fn test_is_hidden_element() {
        assert!(is_hidden_element("<a class=\"Hidden\" href=\"/x\">x</a>"));
        assert!(!is_hidden_element("<a class=\"overflow-hidden\" href=\"/x\">x</a>"));
        assert!(!is_hidden_element("<a href=\"/x\">x</a>"));
    }

    #[test]
    fn test_is_messy_path() {
        assert!(is_messy_path("/share?u=https://website.com"));
        assert!(!is_messy_path("/recipes/cake"));
    }

    #[test]
    fn test_is_avoided() {
        let avoid = vec!["/login".to_string(), "print".to_string()];
        assert!(is_avoided("/login?next=/", &avoid));
        assert!(is_avoided("/recipes/cake/print", &avoid));
        assert!(!is_avoided("/recipes/cake", &avoid));
        assert!(!is_avoided("/recipes/cake", &[]));
    }

    #[test]
    fn test_candidates_require_text_without_allow() {
        let doc = Document::parse(
            br#"<a href="/one">One</a><a href="/two"></a><a href="/three">Three</a>"#,
        );
        let candidates = link_candidates(&doc, &[]);
        let hrefs: Vec<_> = candidates.iter().map(|c| c.href.as_str()).collect();
        assert_eq!(hrefs, vec!["/one", "/three"]);
    }

    #[test]
    fn test_candidates_with_allow_ignore_text() {
        let doc = Document::parse(
            br#"<a href="/recipes/cake"></a><a href="/about">About</a><a href="/recipes/pie">Pie</a>"#,
        );
        let candidates = link_candidates(&doc, &["recipes/".to_string()]);
        let hrefs: Vec<_> = candidates.iter().map(|c| c.href.as_str()).collect();
        assert_eq!(hrefs, vec!["/recipes/cake", "/recipes/pie"]);
    }

    #[tokio::test]
    async fn test_discover_links_filters() {
        let dir = TempDir::new().unwrap();
        let job = test_job(&dir, &[], &["/login"]);
        let store = MemoryStore::new();
        store
            .add(&job.domain, FrontierSet::Finished, "/done")
            .await
            .unwrap();
        store
            .add(&job.domain, FrontierSet::Errored, "/broken")
            .await
            .unwrap();

        let long = format!("/{}", "a".repeat(MAX_PATH_LEN));
        let candidates = vec![
            link("/recipes/cake", "Cake"),
            link("https://website.com/recipes/pie", "Pie"),
            link("//www.website.com/recipes/tart", "Tart"),
            link("https://other.com/recipes/bread", "Bread"),
            link("/done", "Done"),
            link("/broken", "Broken"),
            link("/login", "Login"),
            link("/go?to=http://x.com", "Out"),
            link(&long, "Long"),
            link("", "Empty"),
            link("//x", "Malformed"),
            LinkElement {
                href: "/trap".to_string(),
                text: "Trap".to_string(),
                outer_html: "<a href=\"/trap\" style=\"visibility:hidden\">Trap</a>".to_string(),
            },
        ];

        let added = discover_links(&store, &job, candidates).await.unwrap();
        assert_eq!(added, 3);

        let mut queued = store
            .members(&job.domain, FrontierSet::InProgress)
            .await
            .unwrap();
        queued.sort();
        assert_eq!(
            queued,
            vec!["/recipes/cake", "/recipes/pie", "/recipes/tart"]
        );
    }

    #[tokio::test]
    async fn test_path_length_counts_characters() {
        let dir = TempDir::new().unwrap();
        let job = test_job(&dir, &[], &[]);
        let store = MemoryStore::new();

        // 101 characters but over 200 bytes
        let accented = format!("/{}", "é".repeat(100));
        assert!(accented.len() > MAX_PATH_LEN);
        let too_long = format!("/{}", "é".repeat(MAX_PATH_LEN));

        let added = discover_links(
            &store,
            &job,
            vec![link(&accented, "Accented"), link(&too_long, "Too long")],
        )
        .await
        .unwrap();

        assert_eq!(added, 1);
        assert!(store
            .contains(&job.domain, FrontierSet::InProgress, &accented)
            .await
            .unwrap());
    }

    #[tokio::test]
    async fn test_discover_links_is_idempotent() {
        let dir = TempDir::new().unwrap();
        let job = test_job(&dir, &[], &[]);
        let store = MemoryStore::new();

        let added = discover_links(
            &store,
            &job,
            vec![link("/a", "A"), link("/a", "A again")],
        )
        .await
        .unwrap();

        assert_eq!(added, 1);
        assert_eq!(
            store.count(&job.domain, FrontierSet::InProgress).await.unwrap(),
            1
        );
    }
}
