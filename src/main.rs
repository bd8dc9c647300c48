use std::fs::{self, OpenOptions};
use std::path::PathBuf;
use std::sync::{Arc, Mutex};

use anyhow::Result;
use clap::Parser;
use tracing::info;
use tracing_subscriber::EnvFilter;

mod app;
mod config;
mod dispatcher;
mod error;
mod handler;
mod header;
mod markdown;
mod openai;
mod spinner;
mod state;
mod theme;
mod transcript;
mod tui;
mod ui;
mod viewport;

use app::App;
use config::{Config, Overrides};
use dispatcher::Dispatcher;
use openai::OpenAIClient;
use tui::{EventHandler, Tui};

#[derive(Parser)]
#[command(name = "chatterm")]
#[command(about = "Chat with an OpenAI-compatible model from the terminal")]
struct Cli {
    /// Model to use (overrides the config file)
    #[arg(short, long)]
    model: Option<String>,
    /// Base URL of an OpenAI-compatible API
    #[arg(long)]
    base_url: Option<String>,
    /// Transcript text width in columns
    #[arg(short, long)]
    width: Option<u16>,
    /// Config file to read instead of the default location
    #[arg(short, long)]
    config: Option<PathBuf>,
    /// Where to write the log
    #[arg(long)]
    log_file: Option<PathBuf>,
}

#[tokio::main]
async fn main() -> Result<()> {
    let cli = Cli::parse();

    init_logging(cli.log_file.clone());

    // Missing secret is fatal, before the terminal is touched
    let api_key = config::load_api_key()?;
    let file_config = match &cli.config {
        Some(path) => Config::load_from(path)?,
        None => Config::load()?,
    };
    let settings = file_config.resolve(
        Overrides {
            model: cli.model,
            base_url: cli.base_url,
            width: cli.width,
        },
        api_key,
    );
    info!(model = %settings.model, base_url = %settings.base_url, "starting");

    let client = OpenAIClient::new(&settings.api_key, &settings.base_url, &settings.model);
    let mut app = App::new(&settings);

    tui::install_panic_hook();
    let mut terminal = tui::init()?;

    let result = run(&mut terminal, &mut app, Arc::new(client)).await;

    tui::restore()?;
    result?;

    if let Some(output) = app.quit_output.take() {
        info!(input = %output, "exiting");
        println!("{}", output);
    }
    Ok(())
}

async fn run(terminal: &mut Tui, app: &mut App, client: Arc<OpenAIClient>) -> Result<()> {
    let mut events = EventHandler::new();
    let dispatcher = Dispatcher::new(client, events.sender());

    app.resize(terminal.size()?.height);
    dispatcher.dispatch_all(app.init_commands());

    while !app.should_quit {
        terminal.draw(|frame| ui::render(app, frame))?;

        let Some(event) = events.next().await else {
            break;
        };
        let commands = handler::handle_event(app, event);
        dispatcher.dispatch_all(commands);
    }

    Ok(())
}

/// Log to a file; the terminal belongs to the UI. Logging is skipped if the
/// file cannot be opened.
fn init_logging(path: Option<PathBuf>) {
    let Some(path) = path.or_else(default_log_path) else {
        return;
    };
    if let Some(parent) = path.parent() {
        let _ = fs::create_dir_all(parent);
    }
    let file = match OpenOptions::new().create(true).append(true).open(&path) {
        Ok(file) => file,
        Err(_) => return,
    };

    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")),
        )
        .with_writer(Mutex::new(file))
        .with_ansi(false)
        .init();
}

fn default_log_path() -> Option<PathBuf> {
    dirs::data_local_dir().map(|dir| dir.join("chatterm").join("chatterm.log"))
}
