/// Drops a leading `www.` and any trailing slashes from a domain
///
/// The `www.` strip is a plain prefix strip, not a hostname-aware one.
///
/// # Examples
///
/// ```
/// use domain_trawler::url::comparable_domain;
///
/// assert_eq!(comparable_domain("www.website.com/"), "website.com");
/// assert_eq!(comparable_domain("shop.website.com"), "shop.website.com");
/// ```
pub fn comparable_domain(domain: &str) -> &str {
    let domain = domain.strip_prefix("www.").unwrap_or(domain);
    domain.trim_end_matches('/')
}

/// Checks whether a link's domain belongs to the crawl's domain
///
/// Relative links (no domain) always belong. Otherwise both domains are
/// compared after [`comparable_domain`]; the comparison is case-sensitive.
///
/// # Examples
///
/// ```
/// use domain_trawler::url::same_domain;
///
/// assert!(same_domain("example.com", Some("www.example.com")));
/// assert!(same_domain("example.com", None));
/// assert!(!same_domain("example.com", Some("other.com")));
/// ```
pub fn same_domain(crawl_domain: &str, candidate: Option<&str>) -> bool {
    match candidate {
        None => true,
        Some(candidate) => comparable_domain(crawl_domain) == comparable_domain(candidate),
    }
}
