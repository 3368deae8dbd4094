use crate::url::parse::parse_url;
use crate::CrawlError;
use regex::Regex;
use std::sync::OnceLock;

/// Protocol-relative href: `//host/path`
const PROTOCOL_RELATIVE_PATTERN: &str = r"(?i)//(?P<domain>[^/]{3,})(?P<path>/.*)";

fn protocol_relative_regex() -> &'static Regex {
    static RE: OnceLock<Regex> = OnceLock::new();
    RE.get_or_init(|| {
        Regex::new(PROTOCOL_RELATIVE_PATTERN).expect("protocol-relative pattern is valid")
    })
}

/// A link pulled out of an href attribute
///
/// `domain` is `None` when the href is relative to the current host.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct LinkCandidate {
    pub domain: Option<String>,
    pub path: String,
}

/// Resolves an href attribute into a (domain, path) pair
///
/// | href shape      | result                                   |
/// |-----------------|------------------------------------------|
/// | `//host/path`   | host and path, `MalformedLink` if absent |
/// | `/../path`      | leading `/..` dropped                    |
/// | `/path`         | path on the current host                 |
/// | anything else   | parsed with [`parse_url`]                |
///
/// # Examples
///
/// ```
/// use domain_trawler::url::resolve_href;
///
/// let link = resolve_href("//cdn.website.com/img/cake.png").unwrap();
/// assert_eq!(link.domain.as_deref(), Some("cdn.website.com"));
/// assert_eq!(link.path, "/img/cake.png");
///
/// let link = resolve_href("/../recipes/cake").unwrap();
/// assert_eq!(link.domain, None);
/// assert_eq!(link.path, "/recipes/cake");
/// ```
pub fn resolve_href(href: &str) -> Result<LinkCandidate, CrawlError> {
    if href.starts_with("//") {
        let captures = protocol_relative_regex()
            .captures(href)
            .ok_or_else(|| CrawlError::MalformedLink(href.to_string()))?;
        return Ok(LinkCandidate {
            domain: captures.name("domain").map(|m| m.as_str().to_string()),
            path: captures
                .name("path")
                .map(|m| m.as_str().to_string())
                .unwrap_or_default(),
        });
    }

    if href.starts_with("/../") {
        return Ok(LinkCandidate {
            domain: None,
            path: href[3..].to_string(),
        });
    }

    if href.starts_with('/') {
        return Ok(LinkCandidate {
            domain: None,
            path: href.to_string(),
        });
    }

    let parts = parse_url(href);
    Ok(LinkCandidate {
        domain: parts.domain,
        path: parts.path.unwrap_or_default(),
    })
}
