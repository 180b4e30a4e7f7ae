use std::fs::File;
use std::sync::Mutex;

use anyhow::Result;
use tracing::info;
use tracing_subscriber::EnvFilter;

mod app;
mod concept;
mod config;
mod handler;
mod locale;
mod navigation;
mod render;
mod service;
mod tui;
mod ui;

use app::App;
use config::Config;
use service::ConceptClient;

#[tokio::main]
async fn main() -> Result<()> {
    let config = Config::load().unwrap_or_default();

    let mut args = std::env::args().skip(1);
    let mut initial_keyword = config.default_keyword.clone();
    let mut check_only = false;

    for arg in &mut args {
        match arg.as_str() {
            "--check" => check_only = true,
            other => initial_keyword = Some(other.to_string()),
        }
    }

    if check_only {
        return check_service(&config).await;
    }

    init_logging()?;
    info!(base_url = %config.base_url, "starting fractal explorer");

    tui::install_panic_hook();
    let mut terminal = tui::init()?;

    let result = run(&mut terminal, &config, initial_keyword).await;

    tui::restore()?;
    result
}

/// Liveness probe against the configured concept service.
async fn check_service(config: &Config) -> Result<()> {
    let client = ConceptClient::new(&config.base_url, config.timeout_secs);
    match client.health().await {
        Ok(()) => {
            println!("concept service at {} is up", config.base_url);
            Ok(())
        }
        Err(err) => {
            eprintln!("concept service at {} is unreachable: {err}", config.base_url);
            std::process::exit(1);
        }
    }
}

/// Diagnostics go to a file; stderr belongs to the TUI.
fn init_logging() -> Result<()> {
    let log_dir = Config::log_dir()?;
    std::fs::create_dir_all(&log_dir)?;
    let log_file = File::create(log_dir.join("fractal.log"))?;

    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")),
        )
        .with_writer(Mutex::new(log_file))
        .with_ansi(false)
        .init();

    Ok(())
}

async fn run(
    terminal: &mut tui::Tui,
    config: &Config,
    initial_keyword: Option<String>,
) -> Result<()> {
    let (mut app, mut results_rx) = App::new(config);
    let mut events = tui::EventHandler::new();

    app.start(initial_keyword.as_deref());

    loop {
        terminal.draw(|frame| ui::render(&mut app, frame))?;

        tokio::select! {
            event = events.next() => {
                match event {
                    Some(event) => handler::handle_event(&mut app, event),
                    None => break,
                }
            }
            outcome = results_rx.recv() => {
                if let Some((seq, result)) = outcome {
                    app.apply_fetch(seq, result);
                }
            }
        }

        if app.should_quit {
            break;
        }
    }

    Ok(())
}
