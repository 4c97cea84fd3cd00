//! Interactive legal assistant for French law.
//!
//! This binary provides a streaming REPL interface for asking legal questions
//! to Grok models via the xAI API, with live search restricted to French
//! legal sources.
//!
//! # Usage
//!
//! ```bash
//! # Basic usage with default settings (reads GROK_API_KEY)
//! juriste-chat
//!
//! # Let the model decide when to search
//! juriste-chat --search auto
//!
//! # Fastest and cheapest: no web search
//! juriste-chat --search off
//!
//! # Disable colors (useful for piping output)
//! juriste-chat --no-color
//! ```
//!
//! # Commands
//!
//! While chatting, you can use slash commands:
//! - `/help` - Show available commands
//! - `/search on|auto|off` - Change the search mode
//! - `/citations on|off` - Show or hide sources
//! - `/pricing` - Show prices
//! - `/stats` - Show session statistics
//! - `/quit` - Exit the application

use arrrg::CommandLine;
use rustyline::DefaultEditor;
use rustyline::error::ReadlineError;

use juriste::chat::{
    ChatArgs, ChatCommand, ChatConfig, ChatSession, PlainTextRenderer, Renderer, help_text,
    parse_command,
};
use juriste::search::MAX_RESULTS;
use juriste::{MessageRole, XaiClient};

/// Main entry point for the juriste-chat application.
#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    let (args, _) = ChatArgs::from_command_line_relaxed("juriste-chat [OPTIONS]");
    let config = ChatConfig::from_args(args)?;

    let mut env_filter = tracing_subscriber::EnvFilter::from_default_env()
        .add_directive(tracing::Level::WARN.into());
    if config.verbose {
        for directive in ["juriste=debug", "juriste_chat=debug"] {
            if let Ok(parsed) = directive.parse() {
                env_filter = env_filter.add_directive(parsed);
            }
        }
    }
    tracing_subscriber::fmt()
        .with_env_filter(env_filter)
        .with_writer(std::io::stderr)
        .init();

    let client = XaiClient::with_options(None, config.base_url.clone(), None)?;
    let mut session = ChatSession::new(client, &config);
    let mut renderer = PlainTextRenderer::with_color(config.use_color);
    let mut rl = DefaultEditor::new()?;

    println!("Assistant Juridique Français (model: {})", session.model());
    println!(
        "Search: {}, citations: {}",
        session.search_mode(),
        on_off(session.return_citations())
    );
    println!("Type /help for commands, /quit to exit\n");

    loop {
        let readline = rl.readline("Vous: ");

        match readline {
            Ok(line) => {
                let line = line.trim();
                if line.is_empty() {
                    continue;
                }

                let _ = rl.add_history_entry(line);

                if let Some(cmd) = parse_command(line) {
                    match cmd {
                        ChatCommand::Quit => {
                            println!("Au revoir !");
                            break;
                        }
                        ChatCommand::Help => {
                            for line in help_text().lines() {
                                println!("    {}", line);
                            }
                        }
                        ChatCommand::Search(mode) => {
                            session.set_search_mode(mode);
                            renderer.print_info(&format!("Search mode set to {mode}"));
                        }
                        ChatCommand::Citations(enabled) => {
                            session.set_citations(enabled);
                            renderer.print_info(&format!("Citations {}", on_off(enabled)));
                        }
                        ChatCommand::History => print_history(&session),
                        ChatCommand::Pricing => print_pricing(&session),
                        ChatCommand::Stats => print_stats(&session),
                        ChatCommand::Invalid(message) => {
                            renderer.print_error(&message);
                        }
                    }
                    continue;
                }

                println!("Grok:");
                session.submit(line, &mut renderer).await;
            }
            Err(ReadlineError::Interrupted) => {
                // Ctrl+C at prompt - soft interrupt
                println!();
                continue;
            }
            Err(ReadlineError::Eof) => {
                // Ctrl+D - exit
                println!("\nAu revoir !");
                break;
            }
            Err(err) => {
                renderer.print_error(&format!("Input error: {}", err));
                break;
            }
        }
    }

    Ok(())
}

fn on_off(value: bool) -> &'static str {
    if value { "on" } else { "off" }
}

fn print_history(session: &ChatSession<XaiClient>) {
    if session.history().is_empty() {
        println!("    (no messages yet)");
        return;
    }
    for message in session.history() {
        let who = match message.role() {
            MessageRole::User => "Vous",
            MessageRole::Assistant => "Grok",
            MessageRole::System => "Système",
        };
        println!("    {who}: {}", message.content());
        if let Some(citations) = message.citations() {
            for (index, citation) in citations.iter().enumerate() {
                println!("      {}. {citation}", index + 1);
            }
        }
    }
}

fn print_pricing(session: &ChatSession<XaiClient>) {
    let pricing = session.pricing();
    println!("    Prix des tokens:");
    println!("      Input: {}$ / 1M tokens", pricing.input_per_million);
    println!("      Output: {}$ / 1M tokens", pricing.output_per_million);
    println!("    Prix de recherche:");
    println!("      {}$ par source consultée", pricing.per_source);
    println!(
        "      Maximum {} sources = {:.2}$ max",
        MAX_RESULTS,
        pricing.max_search_cost(MAX_RESULTS)
    );
}

fn print_stats(session: &ChatSession<XaiClient>) {
    let stats = session.stats();
    println!("    Session Statistics:");
    println!("      Model: {}", stats.model);
    println!("      Messages: {}", stats.message_count);
    println!(
        "      Turns: {} completed / {} failed",
        stats.completed_turns, stats.failed_turns
    );
    println!("      Search mode: {}", stats.search_mode);
    println!("      Citations: {}", on_off(stats.return_citations));
    println!("      Estimated cost: ${:.4}", stats.total_cost);
}
