use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};

/// Identifies the chat model a request is addressed to.
///
/// This can be a model the crate knows about or a custom string value for models released
/// after this crate was built.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(untagged)]
pub enum Model {
    /// Known model versions
    Known(KnownModel),

    /// Custom model identifier
    Custom(String),
}

/// Known Grok model versions
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum KnownModel {
    /// Grok 4, the reasoning model used by default.
    #[serde(rename = "grok-4")]
    Grok4,

    /// Grok 3
    #[serde(rename = "grok-3")]
    Grok3,

    /// Grok 3 mini
    #[serde(rename = "grok-3-mini")]
    Grok3Mini,
}

impl KnownModel {
    fn as_str(&self) -> &'static str {
        match self {
            KnownModel::Grok4 => "grok-4",
            KnownModel::Grok3 => "grok-3",
            KnownModel::Grok3Mini => "grok-3-mini",
        }
    }
}

impl Default for Model {
    fn default() -> Self {
        Model::Known(KnownModel::Grok4)
    }
}

impl fmt::Display for Model {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Model::Known(known_model) => write!(f, "{known_model}"),
            Model::Custom(custom) => write!(f, "{custom}"),
        }
    }
}

impl fmt::Display for KnownModel {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for Model {
    type Err = std::convert::Infallible;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let known = [KnownModel::Grok4, KnownModel::Grok3, KnownModel::Grok3Mini]
            .into_iter()
            .find(|model| model.as_str() == s);
        Ok(match known {
            Some(model) => Model::Known(model),
            None => Model::Custom(s.to_string()),
        })
    }
}

impl From<KnownModel> for Model {
    fn from(model: KnownModel) -> Self {
        Model::Known(model)
    }
}
