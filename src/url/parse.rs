use regex::Regex;
use std::sync::OnceLock;
use url::Url;

/// Absolute form: optional http(s) scheme, a dotted host, then a path
const ABSOLUTE_URL_PATTERN: &str =
    r"(?i)(?:(?P<scheme>https?)://)?(?P<host>(?:www\.)?[^/]+\.[^/]+)(?P<path>/.*)";

fn absolute_url_regex() -> &'static Regex {
    static RE: OnceLock<Regex> = OnceLock::new();
    RE.get_or_init(|| Regex::new(ABSOLUTE_URL_PATTERN).expect("absolute URL pattern is valid"))
}

/// The pieces of a URL the crawler cares about
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct UrlParts {
    /// `http` or `https`, when the input carried one
    pub scheme: Option<String>,

    /// Host (with port, if any), when the input carried one
    pub domain: Option<String>,

    /// Path including query and fragment
    pub path: Option<String>,
}

/// Splits a URL (or a bare path) into scheme, domain, and path
///
/// # Rules
///
/// 1. If the input contains a dotted host followed by a path, the host and
///    everything after it are extracted (scheme only if `http`/`https`).
/// 2. If it is an `http(s)` URL with a host but no path at all, the path
///    is `/`.
/// 3. Otherwise the whole input is a path on the current host; a leading
///    `/` is added when missing.
///
/// An empty input yields no path.
///
/// # Examples
///
/// ```
/// use domain_trawler::url::parse_url;
///
/// let parts = parse_url("https://www.website.com/recipes/cake?page=2");
/// assert_eq!(parts.scheme.as_deref(), Some("https"));
/// assert_eq!(parts.domain.as_deref(), Some("www.website.com"));
/// assert_eq!(parts.path.as_deref(), Some("/recipes/cake?page=2"));
///
/// let parts = parse_url("recipes/cake");
/// assert_eq!(parts.domain, None);
/// assert_eq!(parts.path.as_deref(), Some("/recipes/cake"));
/// ```
pub fn parse_url(input: &str) -> UrlParts {
    if input.is_empty() {
        return UrlParts::default();
    }

    if let Some(captures) = absolute_url_regex().captures(input) {
        return UrlParts {
            scheme: captures.name("scheme").map(|m| m.as_str().to_string()),
            domain: captures.name("host").map(|m| m.as_str().to_string()),
            path: captures.name("path").map(|m| m.as_str().to_string()),
        };
    }

    // Bare origins such as "https://example.com" have no path segment for
    // the pattern to anchor on
    if let Ok(url) = Url::parse(input) {
        if matches!(url.scheme(), "http" | "https") {
            if let Some(host) = url.host_str() {
                let domain = match url.port() {
                    Some(port) => format!("{}:{}", host, port),
                    None => host.to_string(),
                };
                return UrlParts {
                    scheme: Some(url.scheme().to_string()),
                    domain: Some(domain),
                    path: Some("/".to_string()),
                };
            }
        }
    }

    let path = if input.starts_with('/') {
        input.to_string()
    } else {
        format!("/{}", input)
    };

    UrlParts {
        scheme: None,
        domain: None,
        path: Some(path),
    }
}
