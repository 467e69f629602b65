use clap::Parser;
use colored::*;
use std::fs;
use std::path::PathBuf;
use tracing::{info, warn};

use wren_terminal::core::config::Config;
use wren_terminal::core::history::CommandHistory;
use wren_terminal::core::logging::{init_logging, LoggingConfig};
use wren_terminal::core::WrenResult;
use wren_terminal::services::ai::{api_key_from_env, GrokClient};
use wren_terminal::services::platform;
use wren_terminal::services::{
    ChatSession, Dispatcher, DuckDuckGoSearch, ExecutionPolicy, JsonHistoryFile, SafeExecutor, SessionStore,
    TokioProcessRunner,
};
use wren_terminal::ui::terminal::WrenTerminal;

#[derive(Parser)]
#[command(name = "wren", version)]
#[command(about = "Terminal assistant that runs safe system commands from plain-language requests")]
struct Cli {
    /// Settings file (default: <config dir>/wren/config.json)
    #[arg(long)]
    config: Option<PathBuf>,

    /// Directory for history, session and log files
    #[arg(long)]
    data_dir: Option<PathBuf>,

    /// Chat model for this run only
    #[arg(long)]
    model: Option<String>,

    /// Log filter, e.g. "debug" or "wren_terminal=trace"
    #[arg(long)]
    log_level: Option<String>,
}

#[tokio::main]
async fn main() {
    let cli = Cli::parse();
    if let Err(e) = run(cli).await {
        eprintln!("{} {}", "Error:".red().bold(), e);
        std::process::exit(1);
    }
}

async fn run(cli: Cli) -> WrenResult<()> {
    let config_path = match cli.config {
        Some(path) => path,
        None => Config::default_path()?,
    };
    let (config, config_problem) = Config::load_or_default(&config_path)?;

    let data_dir = match cli.data_dir {
        Some(dir) => dir,
        None => Config::default_data_dir()?,
    };
    fs::create_dir_all(&data_dir)?;

    let logging = LoggingConfig {
        level: cli.log_level.unwrap_or_else(|| config.log_level.clone()),
        file_enabled: config.log_file,
    };
    let _guard = init_logging(&logging, &data_dir)?;
    info!(config = %config_path.display(), data_dir = %data_dir.display(), "starting wren");
    if let Some(e) = config_problem {
        warn!("{}; using default settings", e);
        eprintln!("{} {}", "Warning:".yellow().bold(), format!("{}; using default settings", e).yellow());
    }

    let history_file = JsonHistoryFile::in_dir(&data_dir);
    let history =
        CommandHistory::with_entries(config.max_history, history_file.load()).with_sink(Box::new(history_file));
    let executor = SafeExecutor::new(
        platform::native(),
        Box::new(TokioProcessRunner),
        ExecutionPolicy::from_config(&config),
        history,
    );

    let chat = GrokClient::new(config.api_url.clone(), api_key_from_env(), config.api_timeout())?;
    let has_api_key = chat.has_api_key();
    let search = DuckDuckGoSearch::new(config.search_url.clone(), config.api_timeout())?;

    let mut session = ChatSession::from_config(&config).with_store(SessionStore::in_dir(&data_dir));
    if let Some(model) = cli.model {
        session.model = model;
    }

    let dispatcher = Dispatcher::new(executor, Box::new(chat), Box::new(search), session);
    let mut terminal = WrenTerminal::new(dispatcher, config, config_path, has_api_key)?;
    terminal.run().await;
    Ok(())
}
