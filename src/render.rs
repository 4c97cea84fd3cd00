//! Output rendering for streamed answers.
//!
//! The gateway hands a renderer the whole answer received so far on every streaming event.
//! A renderer replaces what it displayed with that text rather than appending to it.

use std::io::{self, Stdout, Write};

use crate::citation::Citation;
use crate::cost::{CostBreakdown, UsageReport, UsageSource};

/// ANSI escape code for dim text (used for reasoning traces and cost lines).
const ANSI_DIM: &str = "\x1b[2m";

/// ANSI escape code for italic text (used for reasoning traces and snippets).
const ANSI_ITALIC: &str = "\x1b[3m";

/// ANSI escape code to reset all styling.
const ANSI_RESET: &str = "\x1b[0m";

/// ANSI escape code for cyan text (used for section headers).
const ANSI_CYAN: &str = "\x1b[36m";

/// ANSI escape code for red text (used for errors).
const ANSI_RED: &str = "\x1b[31m";

/// Trait for rendering a chat turn.
///
/// This abstraction allows for different rendering strategies:
/// - Plain text with ANSI styling
/// - Plain text without styling (for piping/redirecting)
/// - Recording renderers in tests
pub trait Renderer: Send {
    /// Show the answer received so far.
    ///
    /// `text` is cumulative: it replaces whatever the previous call displayed.
    fn print_partial(&mut self, text: &str);

    /// Print the model's reasoning trace for the finished answer.
    fn print_reasoning(&mut self, reasoning: &str);

    /// Called when an answer is complete.
    ///
    /// Used to ensure proper newlines and cleanup after streaming.
    fn finish_response(&mut self);

    /// Print the sources behind the answer.
    fn print_citations(&mut self, citations: &[Citation]);

    /// Print the token counts and the cost estimate of the answer.
    fn print_cost(&mut self, usage: &UsageReport, cost: &CostBreakdown);

    /// Print an error message.
    fn print_error(&mut self, error: &str);

    /// Print an informational message.
    fn print_info(&mut self, info: &str);
}

/// Plain text renderer with optional ANSI styling.
///
/// A terminal cannot take back what it printed, so the overwrite protocol is rendered by
/// printing only the unseen suffix when the new text extends the displayed one, and by
/// printing the new text on a fresh line otherwise.
pub struct PlainTextRenderer {
    stdout: Stdout,
    use_color: bool,
    shown: String,
}

impl PlainTextRenderer {
    /// Creates a new PlainTextRenderer with ANSI colors enabled.
    pub fn new() -> Self {
        Self::with_color(true)
    }

    /// Creates a new PlainTextRenderer with specified color setting.
    pub fn with_color(use_color: bool) -> Self {
        Self {
            stdout: io::stdout(),
            use_color,
            shown: String::new(),
        }
    }

    /// Flushes stdout to ensure immediate display of streamed content.
    fn flush(&mut self) {
        let _ = self.stdout.flush();
    }

    fn styled(&self, style: &str, text: &str) -> String {
        if self.use_color {
            format!("{style}{text}{ANSI_RESET}")
        } else {
            text.to_string()
        }
    }
}

impl Default for PlainTextRenderer {
    fn default() -> Self {
        Self::new()
    }
}

impl Renderer for PlainTextRenderer {
    fn print_partial(&mut self, text: &str) {
        match unseen_suffix(&self.shown, text) {
            Some("") => return,
            Some(suffix) => print!("{suffix}"),
            None => print!("\n{text}"),
        }
        self.shown.clear();
        self.shown.push_str(text);
        self.flush();
    }

    fn print_reasoning(&mut self, reasoning: &str) {
        let header = self.styled(ANSI_CYAN, "Raisonnement du modèle");
        println!("\n{header}");
        if self.use_color {
            println!("{ANSI_DIM}{ANSI_ITALIC}{reasoning}{ANSI_RESET}");
        } else {
            println!("{reasoning}");
        }
        self.flush();
    }

    fn finish_response(&mut self) {
        if !self.shown.is_empty() {
            println!();
        }
        self.shown.clear();
        self.flush();
    }

    fn print_citations(&mut self, citations: &[Citation]) {
        if citations.is_empty() {
            return;
        }
        let header = self.styled(ANSI_CYAN, "Sources");
        println!("\n{header}");
        print!("{}", format_citations(citations, self.use_color));
        self.flush();
    }

    fn print_cost(&mut self, usage: &UsageReport, cost: &CostBreakdown) {
        let text = format_cost(usage, cost);
        if self.use_color {
            print!("\n{ANSI_DIM}{text}{ANSI_RESET}");
        } else {
            print!("\n{text}");
        }
        self.flush();
    }

    fn print_error(&mut self, error: &str) {
        let line = self.styled(ANSI_RED, error);
        eprintln!("\n{line}");
    }

    fn print_info(&mut self, info: &str) {
        println!("{info}");
        self.flush();
    }
}

/// The part of `text` not yet displayed when `shown` is on screen, or `None` when `text`
/// does not extend `shown` and has to be displayed anew.
pub fn unseen_suffix<'a>(shown: &str, text: &'a str) -> Option<&'a str> {
    text.strip_prefix(shown)
}

/// Numbered citation list, one entry per line.
///
/// Structured citations render as a markdown link followed by their snippet, if any, on an
/// indented italic line.
pub fn format_citations(citations: &[Citation], use_color: bool) -> String {
    let mut out = String::new();
    for (index, citation) in citations.iter().enumerate() {
        out.push_str(&format!("{}. {citation}\n", index + 1));
        if let Some(snippet) = citation.snippet() {
            if use_color {
                out.push_str(&format!("   {ANSI_ITALIC}{snippet}{ANSI_RESET}\n"));
            } else {
                out.push_str(&format!("   _{snippet}_\n"));
            }
        }
    }
    out
}

/// Cost summary of one answer.
pub fn format_cost(usage: &UsageReport, cost: &CostBreakdown) -> String {
    let estimated = match usage.source {
        UsageSource::Reported => "",
        UsageSource::Estimated => " (estimation)",
    };
    let reasoning = match usage.reasoning_tokens {
        0 => String::new(),
        tokens => format!(" + {tokens} raisonnement"),
    };
    format!(
        "Tokens: {} ({} entrée / {} sortie{reasoning}){estimated}\n\
         Sources consultées: {} (${:.3})\n\
         Coût total: ${:.4} (tokens ${:.4})\n",
        usage.total_tokens(),
        usage.input_tokens,
        usage.completion_tokens,
        usage.num_sources,
        cost.search_cost,
        cost.total_cost,
        cost.token_cost,
    )
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::cost::Pricing;
    use crate::types::CompletionUsage;

    #[test]
    fn renderer_default_has_color() {
        let renderer = PlainTextRenderer::new();
        assert!(renderer.use_color);
    }

    #[test]
    fn renderer_without_color() {
        let renderer = PlainTextRenderer::with_color(false);
        assert!(!renderer.use_color);
        assert_eq!(renderer.styled(ANSI_RED, "x"), "x");
    }

    #[test]
    fn suffix_of_an_extension() {
        assert_eq!(unseen_suffix("", "Le "), Some("Le "));
        assert_eq!(unseen_suffix("Le ", "Le principe"), Some("principe"));
        assert_eq!(unseen_suffix("Le principe", "Le principe"), Some(""));
        assert_eq!(unseen_suffix("Le principe", "La règle"), None);
    }

    #[test]
    fn partial_updates_track_displayed_text() {
        let mut renderer = PlainTextRenderer::with_color(false);
        renderer.print_partial("Le ");
        renderer.print_partial("Le principe");
        assert_eq!(renderer.shown, "Le principe");
        renderer.print_partial("Autre chose");
        assert_eq!(renderer.shown, "Autre chose");
        renderer.finish_response();
        assert!(renderer.shown.is_empty());
    }

    #[test]
    fn citations_are_numbered() {
        let citations = vec![
            Citation::structured(
                "Code civil",
                "https://legifrance.gouv.fr/x",
                Some("Article 1240".to_string()),
            ),
            Citation::plain("Raw text ref"),
        ];
        assert_eq!(
            format_citations(&citations, false),
            "1. [Code civil](https://legifrance.gouv.fr/x)\n   _Article 1240_\n2. Raw text ref\n"
        );
    }

    #[test]
    fn cost_summary() {
        let usage = UsageReport::build(
            "Bonjour, comment allez-vous",
            "un deux trois quatre cinq six sept huit neuf dix",
            None,
            4,
        );
        let cost = Pricing::default().estimate(&usage);
        let text = format_cost(&usage, &cost);
        assert!(text.contains("Tokens: 42 (12 entrée / 30 sortie) (estimation)"));
        assert!(text.contains("Sources consultées: 4 ($0.100)"));
        assert!(text.contains("Coût total: $0.1005 (tokens $0.0005)"));
    }

    #[test]
    fn cost_summary_counts_reasoning_tokens() {
        let counters = CompletionUsage::new(200).with_reasoning_tokens(100);
        let usage = UsageReport::build("a b", "ignored", Some(&counters), 0);
        let cost = Pricing::default().estimate(&usage);
        let text = format_cost(&usage, &cost);
        assert!(text.starts_with("Tokens: 306 (6 entrée / 200 sortie + 100 raisonnement)\n"));
        assert!(text.contains("Coût total: $0.0045 (tokens $0.0045)"));
    }
}
