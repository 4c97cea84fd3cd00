use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};

use crate::Error;

/// Whether the remote side may augment an answer with live web search.
#[derive(Debug, Copy, Clone, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum SearchMode {
    /// Always search.
    #[default]
    On,

    /// Let the model decide.
    Auto,

    /// Never search; the request carries no search parameters at all.
    Off,
}

impl fmt::Display for SearchMode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            SearchMode::On => write!(f, "on"),
            SearchMode::Auto => write!(f, "auto"),
            SearchMode::Off => write!(f, "off"),
        }
    }
}

impl FromStr for SearchMode {
    type Err = Error;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "on" => Ok(SearchMode::On),
            "auto" => Ok(SearchMode::Auto),
            "off" => Ok(SearchMode::Off),
            other => Err(Error::validation(
                format!("unknown search mode {other:?}; expected on, auto or off"),
                Some("search_mode".to_string()),
            )),
        }
    }
}

/// A place the remote search may consult.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
#[serde(tag = "type", rename_all = "lowercase")]
pub enum SearchSource {
    /// Web pages, restricted to the listed sites.
    Web {
        /// Hostnames the search is allowed to visit.
        allowed_websites: Vec<String>,
    },
}

impl SearchSource {
    /// Create a web source limited to `allowed_websites`.
    pub fn web<I, S>(allowed_websites: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        SearchSource::Web {
            allowed_websites: allowed_websites.into_iter().map(Into::into).collect(),
        }
    }
}

/// The `search_parameters` object of a chat-completions request.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct SearchParameters {
    /// Search mode.
    pub mode: SearchMode,

    /// Whether the response should list the sources it used.
    pub return_citations: bool,

    /// Sources the search may consult.
    pub sources: Vec<SearchSource>,

    /// Upper bound on the number of sources consulted.
    pub max_search_results: u32,
}
