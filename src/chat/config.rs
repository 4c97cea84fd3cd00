//! Configuration types for the chat application.
//!
//! This module provides CLI argument parsing via `arrrg` and configuration
//! structures for controlling chat behavior.

use arrrg_derive::CommandLine;

use crate::Result;
use crate::types::{Model, SearchMode};

/// System instructions sent first in every request.
pub const LEGAL_ASSISTANT_PROMPT: &str = "\
Vous êtes un assistant juridique spécialisé dans le droit français. Vous devez :

1. **Politesse** : Pour les simples salutations, répondez naturellement sans avertissement juridique.

2. **Expertise** : Fournir des informations précises sur le droit français (civil, pénal, commercial, administratif, du travail, etc.)

3. **Sources** : Toujours citer vos sources (Code civil, Code pénal, jurisprudence, etc.) et utiliser la recherche web pour les informations récentes

4. **Structure** : Organiser vos réponses juridiques de manière claire avec :
   - Le principe juridique général
   - Les textes de loi applicables
   - La jurisprudence pertinente si applicable
   - Les exceptions ou cas particuliers
   - Les démarches pratiques si nécessaire
   - Quand pertinent, lister les avantages et inconvénients d'une situation juridique

5. **Actualité** : Mentionner si des réformes récentes peuvent affecter la réponse

6. **Langue** : Répondre exclusivement en français avec la terminologie juridique appropriée pour les questions juridiques
";

/// Command-line arguments for the juriste-chat tool.
#[derive(CommandLine, Debug, Default, PartialEq, Eq)]
pub struct ChatArgs {
    /// Model to use for chat.
    #[arrrg(optional, "Model to use (default: grok-4)", "MODEL")]
    pub model: Option<String>,

    /// Live search mode.
    #[arrrg(optional, "Web search mode: on, auto or off (default: on)", "MODE")]
    pub search: Option<String>,

    /// Do not ask for citations.
    #[arrrg(flag, "Do not request citations")]
    pub no_citations: bool,

    /// Alternate API endpoint.
    #[arrrg(optional, "API base URL (default: https://api.x.ai/v1/)", "URL")]
    pub base_url: Option<String>,

    /// Disable ANSI colors and styles.
    #[arrrg(flag, "Disable ANSI colors/styles")]
    pub no_color: bool,

    /// Log requests and stream progress.
    #[arrrg(flag, "Enable debug logging")]
    pub verbose: bool,
}

/// Configuration for a chat session.
///
/// This struct holds the resolved configuration values after processing
/// command-line arguments with appropriate defaults.
#[derive(Debug, Clone, PartialEq)]
pub struct ChatConfig {
    /// The model to use for generating responses.
    pub model: Model,

    /// System instructions sent first in every request.
    pub system_prompt: String,

    /// Live search mode for the next request.
    pub search_mode: SearchMode,

    /// Whether citations are requested.
    pub return_citations: bool,

    /// API base URL; `None` uses the client's default.
    pub base_url: Option<String>,

    /// Whether to use ANSI colors and styles in output.
    pub use_color: bool,

    /// Whether debug logging is enabled.
    pub verbose: bool,
}

impl ChatConfig {
    /// Creates a new ChatConfig with default values.
    ///
    /// Defaults:
    /// - Model: grok-4
    /// - System prompt: [`LEGAL_ASSISTANT_PROMPT`]
    /// - Search: on, with citations
    /// - Color: enabled
    pub fn new() -> Self {
        Self {
            model: Model::default(),
            system_prompt: LEGAL_ASSISTANT_PROMPT.to_string(),
            search_mode: SearchMode::On,
            return_citations: true,
            base_url: None,
            use_color: true,
            verbose: false,
        }
    }

    /// Sets the model to use.
    pub fn with_model(mut self, model: Model) -> Self {
        self.model = model;
        self
    }

    /// Replaces the system prompt.
    pub fn with_system_prompt(mut self, prompt: impl Into<String>) -> Self {
        self.system_prompt = prompt.into();
        self
    }

    /// Sets the search mode.
    pub fn with_search_mode(mut self, mode: SearchMode) -> Self {
        self.search_mode = mode;
        self
    }

    /// Sets whether citations are requested.
    pub fn with_citations(mut self, return_citations: bool) -> Self {
        self.return_citations = return_citations;
        self
    }

    /// Sets the API base URL.
    pub fn with_base_url(mut self, base_url: Option<String>) -> Self {
        self.base_url = base_url;
        self
    }

    /// Disables ANSI color output.
    pub fn without_color(mut self) -> Self {
        self.use_color = false;
        self
    }

    /// Resolve command-line arguments.
    ///
    /// Fails when `--search` is not one of `on`, `auto` or `off`.
    pub fn from_args(args: ChatArgs) -> Result<Self> {
        let search_mode = match args.search {
            Some(mode) => mode.parse::<SearchMode>()?,
            None => SearchMode::On,
        };
        let model = match args.model {
            Some(model) => model.parse::<Model>().unwrap_or(Model::Custom(model)),
            None => Model::default(),
        };
        Ok(ChatConfig {
            model,
            search_mode,
            return_citations: !args.no_citations,
            base_url: args.base_url,
            use_color: !args.no_color,
            verbose: args.verbose,
            ..ChatConfig::new()
        })
    }
}

impl Default for ChatConfig {
    fn default() -> Self {
        Self::new()
    }
}
