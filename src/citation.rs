//! Citations attached to an answer.
//!
//! The service reports the sources behind an answer either as structured records
//! (`{"title", "url", "snippet"}`) or as bare strings, and may mix both in one list.  They
//! are normalized into [`Citation`] once, right where the response is received, so nothing
//! downstream ever inspects raw JSON.

use std::fmt;

use serde::{Deserialize, Serialize};
use serde_json::Value;

/// Title shown for a structured citation that carries none.
pub const DEFAULT_TITLE: &str = "Source";

/// Link used for a structured citation that carries none.
pub const DEFAULT_URL: &str = "#";

/// One source behind an answer.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum Citation {
    /// A record with a title and a link.
    Structured {
        /// Title of the source.
        title: String,
        /// Link to the source.
        url: String,
        /// Excerpt supporting the answer.
        #[serde(default, skip_serializing_if = "Option::is_none")]
        snippet: Option<String>,
    },
    /// Anything else, kept as display text.
    Plain {
        /// Text of the citation.
        text: String,
    },
}

impl Citation {
    /// Create a structured citation.
    pub fn structured(
        title: impl Into<String>,
        url: impl Into<String>,
        snippet: Option<String>,
    ) -> Self {
        Citation::Structured {
            title: title.into(),
            url: url.into(),
            snippet,
        }
    }

    /// Create a plain citation.
    pub fn plain(text: impl Into<String>) -> Self {
        Citation::Plain { text: text.into() }
    }

    /// Normalize one raw entry.
    ///
    /// Objects become [`Citation::Structured`], filling a missing title or URL with
    /// [`DEFAULT_TITLE`] / [`DEFAULT_URL`]; blank snippets are treated as absent.  Strings
    /// become [`Citation::Plain`].  Any other JSON value is kept as its JSON text so that
    /// nothing is lost.
    pub fn from_value(value: &Value) -> Self {
        match value {
            Value::String(text) => Citation::plain(text.clone()),
            Value::Object(record) => {
                let field = |name: &str| -> Option<String> {
                    match record.get(name)? {
                        Value::String(s) => Some(s.clone()),
                        Value::Null => None,
                        other => Some(other.to_string()),
                    }
                };
                Citation::Structured {
                    title: field("title").unwrap_or_else(|| DEFAULT_TITLE.to_string()),
                    url: field("url").unwrap_or_else(|| DEFAULT_URL.to_string()),
                    snippet: field("snippet").filter(|s| !s.trim().is_empty()),
                }
            }
            other => Citation::plain(other.to_string()),
        }
    }

    /// Text a view should show for this citation.
    pub fn display_text(&self) -> &str {
        match self {
            Citation::Structured { title, .. } => title,
            Citation::Plain { text } => text,
        }
    }

    /// Link of a structured citation.
    pub fn url(&self) -> Option<&str> {
        match self {
            Citation::Structured { url, .. } => Some(url),
            Citation::Plain { .. } => None,
        }
    }

    /// Snippet of a structured citation.
    pub fn snippet(&self) -> Option<&str> {
        match self {
            Citation::Structured { snippet, .. } => snippet.as_deref(),
            Citation::Plain { .. } => None,
        }
    }
}

impl fmt::Display for Citation {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Citation::Structured { title, url, .. } => write!(f, "[{title}]({url})"),
            Citation::Plain { text } => write!(f, "{text}"),
        }
    }
}

/// Normalize the citation list of a response.
///
/// Order and count are preserved.  An absent list and an empty list both yield an empty
/// vector.
pub fn normalize_citations(raw: Option<&[Value]>) -> Vec<Citation> {
    raw.unwrap_or_default()
        .iter()
        .map(Citation::from_value)
        .collect()
}
