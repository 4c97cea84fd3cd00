//! Live web-search settings for one request.

use crate::types::{SearchMode, SearchParameters, SearchSource};

/// Legal-reference sites the search may consult.
pub const ALLOWED_DOMAINS: [&str; 4] = [
    "legifrance.gouv.fr",
    "juricaf.org",
    "conseil-etat.fr",
    "service-public.fr",
];

/// Most sources a single answer may consult; keeps the search cost predictable.
pub const MAX_RESULTS: u32 = 6;

/// Search configuration built fresh for every request.
///
/// Only the mode and the citation toggle vary; the domain whitelist and the result cap are
/// fixed.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SearchConfig {
    mode: SearchMode,
    return_citations: bool,
    allowed_domains: Vec<String>,
    max_results: u32,
}

impl SearchConfig {
    /// Create a configuration for `mode`.
    pub fn new(mode: SearchMode, return_citations: bool) -> Self {
        Self {
            mode,
            return_citations,
            allowed_domains: ALLOWED_DOMAINS.iter().map(|d| d.to_string()).collect(),
            max_results: MAX_RESULTS,
        }
    }

    /// The search mode.
    pub fn mode(&self) -> SearchMode {
        self.mode
    }

    /// Whether citations are requested.
    pub fn return_citations(&self) -> bool {
        self.return_citations
    }

    /// Sites the search may consult.
    pub fn allowed_domains(&self) -> &[String] {
        &self.allowed_domains
    }

    /// Most sources the search may consult.
    pub fn max_results(&self) -> u32 {
        self.max_results
    }

    /// The request's `search_parameters`, or `None` when search is off.
    pub fn to_parameters(&self) -> Option<SearchParameters> {
        if self.mode == SearchMode::Off {
            return None;
        }
        Some(SearchParameters {
            mode: self.mode,
            return_citations: self.return_citations,
            sources: vec![SearchSource::web(self.allowed_domains.iter().cloned())],
            max_search_results: self.max_results,
        })
    }
}

impl Default for SearchConfig {
    fn default() -> Self {
        Self::new(SearchMode::On, true)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn off_produces_no_parameters() {
        assert!(SearchConfig::new(SearchMode::Off, true).to_parameters().is_none());
    }

    #[test]
    fn on_and_auto_attach_all_fields() {
        for mode in [SearchMode::On, SearchMode::Auto] {
            let params = SearchConfig::new(mode, false).to_parameters().unwrap();
            assert_eq!(params.mode, mode);
            assert!(!params.return_citations);
            assert_eq!(params.max_search_results, 6);
            assert_eq!(
                params.sources,
                vec![SearchSource::web(ALLOWED_DOMAINS)]
            );
        }
    }

    #[test]
    fn whitelist_and_cap_are_fixed() {
        let config = SearchConfig::new(SearchMode::Auto, true);
        assert_eq!(config.allowed_domains().len(), 4);
        assert!(config.allowed_domains().iter().any(|d| d == "legifrance.gouv.fr"));
        assert_eq!(config.max_results(), MAX_RESULTS);
        assert_eq!(SearchConfig::default().mode(), SearchMode::On);
        assert!(SearchConfig::default().return_citations());
    }
}
