//! confab - terminal chat client for a remote conversational API

mod config;
mod ui;

use std::sync::Arc;

use clap::Parser;
use confab_core::{DispatchOutcome, Dispatcher, HttpTransport, Role};
use confab_tui::Theme;

/// Endpoint used when neither the CLI nor the config names one.
const DEFAULT_BASE_URL: &str = "http://127.0.0.1:8000";

/// confab - chat with a remote AI backend from your terminal
#[derive(Parser, Debug)]
#[command(name = "confab")]
#[command(author, version, about, long_about = None)]
struct Args {
    /// Base URL of the chat backend (confab sends POST <base_url>/chat)
    #[arg(short, long)]
    base_url: Option<String>,

    /// Color theme (dark, light)
    #[arg(short, long)]
    theme: Option<String>,

    /// Path to a config file (default: platform config dir)
    #[arg(short, long)]
    config: Option<std::path::PathBuf>,

    /// Verbose output
    #[arg(short, long)]
    verbose: bool,

    /// Disable TUI mode (use simple stdin/stdout)
    #[arg(long)]
    no_tui: bool,

    /// Initialize config file
    #[arg(long)]
    init_config: bool,
}

fn parse_theme(s: &str) -> Theme {
    match s.to_lowercase().as_str() {
        "light" => Theme::light(),
        _ => Theme::dark(),
    }
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let args = Args::parse();

    // Setup tracing
    if args.verbose {
        tracing_subscriber::fmt()
            .with_env_filter("confab=debug")
            .init();
    }

    // Initialize config and exit
    if args.init_config {
        match config::Config::init() {
            Ok(path) => {
                println!("Config file created at: {}", path.display());
                println!("\nExample config:\n{}", config::example_config());
            }
            Err(e) => {
                eprintln!("Error creating config: {}", e);
                std::process::exit(1);
            }
        }
        return Ok(());
    }

    // Load config file
    let cfg = match &args.config {
        Some(path) => config::Config::load_from(path),
        None => config::Config::load(),
    };

    // Merge config with CLI args (CLI takes precedence)
    let base_url = args
        .base_url
        .or(cfg.base_url.clone())
        .unwrap_or_else(|| DEFAULT_BASE_URL.to_string());

    let theme = args
        .theme
        .or(cfg.theme.clone())
        .map(|s| parse_theme(&s))
        .unwrap_or_default();

    let use_tui = !args.no_tui && cfg.tui.unwrap_or(true);

    tracing::debug!(%base_url, use_tui, "starting");

    let transport = Arc::new(HttpTransport::new(base_url.clone()));
    let mut dispatcher = Dispatcher::new(transport);

    if use_tui {
        return ui::run_tui(&mut dispatcher, theme, &base_url).await;
    }

    run_line_mode(&mut dispatcher, &base_url).await
}

/// Simple stdin/stdout mode for non-TTY use.
async fn run_line_mode(dispatcher: &mut Dispatcher, base_url: &str) -> anyhow::Result<()> {
    use std::io::{self, IsTerminal, Write};

    // Show minimal startup info (only if TTY)
    if io::stderr().is_terminal() {
        eprintln!("confab ({})", base_url);
        eprintln!();
    }

    // The seeded welcome message
    if let Some(welcome) = dispatcher.transcript().messages().first() {
        println!("{}", welcome.content);
        println!();
    }

    loop {
        print!("> ");
        io::stdout().flush()?;

        let mut input = String::new();
        if io::stdin().read_line(&mut input)? == 0 {
            // EOF
            break;
        }

        let input = input.trim();
        if input.is_empty() {
            continue;
        }

        // Handle slash commands
        match input {
            "/quit" | "/exit" => break,
            "/reset" => {
                dispatcher.reset();
                println!("Conversation reset.");
                println!();
                continue;
            }
            _ => {}
        }

        println!();

        let outcome = dispatcher.send(input).await;

        if let Some(reply) = dispatcher
            .transcript()
            .messages()
            .iter()
            .rev()
            .find(|m| m.role == Role::Assistant)
        {
            println!("{}", reply.content);
        }
        if outcome == DispatchOutcome::Failed {
            if let Some(error) = dispatcher.transcript().error() {
                eprintln!("[{}]", error);
            }
            dispatcher.dismiss_error();
        }

        println!();
    }

    Ok(())
}
