/// Frontier set definitions
///
/// Every path known to a domain's crawl lives in at most one of these sets.
use std::fmt;

/// One of the three disjoint sets that make up a domain's frontier
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum FrontierSet {
    /// Paths waiting to be fetched (or pending a retry)
    InProgress,

    /// Paths downloaded successfully, including redirect sources
    Finished,

    /// Paths that were attempted and failed
    Errored,
}

impl FrontierSet {
    /// Converts the set to the name used in store keys and database rows
    pub fn to_db_string(&self) -> &'static str {
        match self {
            Self::InProgress => "in_progress",
            Self::Finished => "finished",
            Self::Errored => "errored",
        }
    }

    /// Returns all frontier sets
    pub fn all() -> [Self; 3] {
        [Self::InProgress, Self::Finished, Self::Errored]
    }

    /// Builds the shared-store key for this set of a domain
    pub fn key(&self, domain: &str) -> String {
        format!("{}:{}", domain, self.to_db_string())
    }
}

impl fmt::Display for FrontierSet {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.to_db_string())
    }
}

/// Key of the append-only depth sample list for a domain
///
/// The `count` suffix is kept for compatibility with existing stores even
/// though the key holds a list of samples rather than a scalar.
pub fn samples_key(domain: &str) -> String {
    format!("{}:count", domain)
}
