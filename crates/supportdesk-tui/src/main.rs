use std::path::{Path, PathBuf};

use anyhow::Result;
use clap::{Parser, Subcommand};
use supportdesk_core::{AnalyticsSource, Config, Gateway};

mod app;
mod cli;
mod handler;
mod logging;
mod tui;
mod ui;

use app::App;
use logging::LogTarget;

#[derive(Parser)]
#[command(name = "supportdesk")]
#[command(version, about = "Terminal console for the support question-answering service")]
struct Cli {
    /// Backend base URL (overrides SUPPORTDESK_API_URL and the config file)
    #[arg(long, global = true)]
    api_url: Option<String>,

    #[command(subcommand)]
    command: Option<Commands>,
}

#[derive(Subcommand)]
enum Commands {
    /// Interactive console with chat, agent assist and admin screens (default)
    Tui,
    /// Ask a single question
    Ask {
        /// Your question
        question: String,
    },
    /// Upload a document to the knowledge base
    Ingest {
        /// File to upload
        file: PathBuf,
    },
    /// Check whether the backend is reachable
    Health,
    /// Smoke-test a deployment: wait for health, ingest, then query
    Verify {
        /// Document to ingest
        #[arg(short, long, default_value = "test_doc.txt")]
        file: PathBuf,
        /// Question that should be answered from the document
        #[arg(short, long, default_value = "What causes Error 504 on the payment gateway?")]
        question: String,
        /// Word the answer or its sources should mention
        #[arg(short, long, default_value = "timeout")]
        keyword: String,
        /// Health checks to try, two seconds apart
        #[arg(short, long, default_value = "30")]
        attempts: u32,
    },
    /// Show or update the saved configuration
    Config {
        /// Backend base URL to save
        #[arg(long)]
        set_api_url: Option<String>,
        /// Admin data source: static or remote
        #[arg(long)]
        analytics_source: Option<String>,
        /// Default log filter, e.g. info or supportdesk_core=debug
        #[arg(long)]
        log_level: Option<String>,
    },
}

#[tokio::main]
async fn main() -> Result<()> {
    let args = Cli::parse();
    let command = args.command.unwrap_or(Commands::Tui);

    // `config` must still run when the file is broken, since it is how the file gets fixed
    let repairing = matches!(command, Commands::Config { .. });
    let (mut config, load_error) = load_config(&Config::get_config_path()?, repairing)?;

    let target = match command {
        Commands::Tui => LogTarget::File,
        _ => LogTarget::Stderr,
    };
    logging::init_tracing(config.log_level(), target)?;
    if let Some(e) = load_error {
        tracing::warn!(error = %e, "ignoring unreadable config file, starting from defaults");
    }

    let base_url = args.api_url.unwrap_or_else(|| config.api_base_url());
    let gateway = Gateway::new(&base_url);
    tracing::debug!(url = gateway.base_url(), "using backend");

    match command {
        Commands::Tui => run_tui(gateway, config.analytics_source()).await?,
        Commands::Ask { question } => cli::ask(&gateway, &question).await?,
        Commands::Ingest { file } => cli::ingest(&gateway, &file).await?,
        Commands::Health => {
            if !cli::health(&gateway).await {
                std::process::exit(1);
            }
        }
        Commands::Verify {
            file,
            question,
            keyword,
            attempts,
        } => {
            let options = cli::VerifyOptions {
                file: &file,
                question: &question,
                keyword: &keyword,
                attempts,
            };
            cli::verify(&gateway, options).await?
        }
        Commands::Config {
            set_api_url,
            analytics_source,
            log_level,
        } => cli::configure(
            &mut config,
            cli::ConfigUpdate {
                api_url: set_api_url,
                analytics_source,
                log_level,
            },
        )?,
    }

    Ok(())
}

/// Load the config file. With `fall_back_to_defaults`, a parse failure yields
/// the default config plus the error instead of aborting.
fn load_config(path: &Path, fall_back_to_defaults: bool) -> Result<(Config, Option<anyhow::Error>)> {
    match Config::load_from(path) {
        Ok(config) => Ok((config, None)),
        Err(e) if fall_back_to_defaults => Ok((Config::new(), Some(e))),
        Err(e) => Err(e),
    }
}

async fn run_tui(gateway: Gateway, analytics_source: AnalyticsSource) -> Result<()> {
    tui::install_panic_hook();
    let mut terminal = tui::init()?;

    let mut app = App::new(gateway, analytics_source);
    app.check_health();

    let result = run_loop(&mut terminal, &mut app).await;

    tui::restore()?;
    result
}

async fn run_loop(terminal: &mut tui::Tui, app: &mut App) -> Result<()> {
    let mut events = tui::EventHandler::new();

    while !app.should_quit {
        terminal.draw(|frame| ui::render(app, frame))?;

        match events.next().await {
            Some(event) => handler::handle_event(app, event).await?,
            None => break,
        }
    }

    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_broken_config_blocks_regular_commands() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("config.json");
        std::fs::write(&path, "{ not json").unwrap();

        assert!(load_config(&path, false).is_err());
    }

    #[test]
    fn test_broken_config_can_be_repaired() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("config.json");
        std::fs::write(&path, "{ not json").unwrap();

        let (config, error) = load_config(&path, true).unwrap();
        assert_eq!(config, Config::new());
        assert!(error.is_some());
    }

    #[test]
    fn test_valid_config_loads_without_warning() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("config.json");
        std::fs::write(&path, r#"{"api_base_url":"http://qa.internal:9000"}"#).unwrap();

        let (config, error) = load_config(&path, true).unwrap();
        assert_eq!(config.api_base_url.as_deref(), Some("http://qa.internal:9000"));
        assert!(error.is_none());
    }

    #[test]
    fn test_cli_parses_config_subcommand() {
        let args = Cli::try_parse_from(["supportdesk", "config", "--set-api-url", "http://x:1"]).unwrap();
        assert!(matches!(
            args.command,
            Some(Commands::Config { set_api_url: Some(ref url), .. }) if url == "http://x:1"
        ));
    }
}
