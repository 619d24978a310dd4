//! Checkmate - an offline-first checklist TUI.
//!
//! This application renders tabbed checklists from a published bundle,
//! tracks per-item done state and a day/night theme across runs, and keeps
//! the bundle available offline through a generation-versioned cache with
//! stale-while-revalidate refresh.

mod app;
mod cache;
mod config;
mod models;
mod store;
mod ui;

use std::io;
use std::sync::Arc;
use std::time::Duration;

use anyhow::{Context, Result};
use crossterm::{
    event::{self, Event, KeyCode, KeyModifiers},
    execute,
    terminal::{disable_raw_mode, enable_raw_mode, EnterAlternateScreen, LeaveAlternateScreen},
};
use ratatui::{backend::CrosstermBackend, Terminal};
use reqwest::Url;
use tracing::info;
use tracing_subscriber::{fmt, prelude::*, EnvFilter};

use app::{App, AppState};
use cache::{CacheController, HttpOrigin, NullOrigin, Origin};
use config::Config;
use store::StateStore;
use ui::input::handle_input;
use ui::render::render;

// ============================================================================
// Constants
// ============================================================================

/// Timeout for polling terminal events (in milliseconds)
const EVENT_POLL_TIMEOUT_MS: u64 = 100;

/// Log file name, written under the cache root so the TUI screen stays clean
const LOG_FILE: &str = "checkmate.log";

/// Initialize the tracing subscriber, logging to a file under the cache
/// root. Use RUST_LOG to control the level (e.g. RUST_LOG=debug).
fn init_tracing(config: &Config) -> Option<tracing_appender::non_blocking::WorkerGuard> {
    let log_dir = config.cache_root().ok()?;
    let _ = std::fs::create_dir_all(&log_dir);

    let appender = tracing_appender::rolling::never(log_dir, LOG_FILE);
    let (writer, guard) = tracing_appender::non_blocking(appender);

    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("warn"));

    tracing_subscriber::registry()
        .with(fmt::layer().with_writer(writer).with_ansi(false))
        .with(filter)
        .init();

    Some(guard)
}

/// Build the network origin: HTTP when a bundle URL is configured and
/// offline mode is off, otherwise the cache-only null origin.
fn build_origin(config: &Config, offline: bool) -> Result<Arc<dyn Origin>> {
    if offline {
        return Ok(Arc::new(NullOrigin));
    }
    match config.bundle_url {
        Some(ref url) => {
            // A trailing slash keeps relative joins inside the bundle
            let mut base = url.clone();
            if !base.ends_with('/') {
                base.push('/');
            }
            let base = Url::parse(&base).with_context(|| format!("Invalid bundle URL: {}", url))?;
            Ok(Arc::new(HttpOrigin::new(base)?))
        }
        None => Ok(Arc::new(NullOrigin)),
    }
}

#[tokio::main]
async fn main() -> Result<()> {
    // Load .env file if present (silently ignore if not found)
    let _ = dotenvy::dotenv();

    let config = Config::load().unwrap_or_default();
    let _log_guard = init_tracing(&config);

    let args: Vec<String> = std::env::args().collect();
    let offline = args.iter().any(|a| a == "--offline");

    // Headless pre-seed: install the bundle, clean up old generations, exit
    if args.iter().any(|a| a == "--seed") {
        return seed_cache(&config).await;
    }

    info!("Checkmate starting");

    let origin = build_origin(&config, offline)?;
    let cache = CacheController::new(config.cache_root()?, origin)?;
    let store = StateStore::open(config.state_path()?)?;

    // Setup terminal
    enable_raw_mode()?;
    let mut stdout = io::stdout();
    execute!(stdout, EnterAlternateScreen)?;
    let backend = CrosstermBackend::new(stdout);
    let mut terminal = Terminal::new(backend)?;

    let mut app = App::new(store, cache);
    app.bootstrap();

    let result = run_app(&mut terminal, &mut app);

    // Restore terminal
    disable_raw_mode()?;
    execute!(terminal.backend_mut(), LeaveAlternateScreen)?;
    terminal.show_cursor()?;

    if let Err(e) = result {
        eprintln!("Error: {}", e);
    }

    info!("Checkmate shutting down");
    Ok(())
}

/// Install the bundle and activate the current generation without the TUI.
async fn seed_cache(config: &Config) -> Result<()> {
    let origin = build_origin(config, false)?;
    let cache = CacheController::new(config.cache_root()?, origin)?;

    eprintln!("Seeding bundle into {}...", cache.generation());
    cache.install().await?;
    let purged = cache.activate()?;
    eprintln!("Done. Purged {} old generation(s).", purged);
    Ok(())
}

fn run_app(terminal: &mut Terminal<CrosstermBackend<io::Stdout>>, app: &mut App) -> Result<()> {
    loop {
        terminal.draw(|f| render(f, app))?;

        // Poll with timeout so background cache events keep flowing
        if event::poll(Duration::from_millis(EVENT_POLL_TIMEOUT_MS))? {
            if let Event::Key(key) = event::read()? {
                // Ctrl+C to quit
                if key.code == KeyCode::Char('c') && key.modifiers.contains(KeyModifiers::CONTROL) {
                    return Ok(());
                }

                if handle_input(app, key)? {
                    return Ok(());
                }
            }
        }

        app.check_cache_events();

        if matches!(app.state, AppState::Quitting) {
            return Ok(());
        }
    }
}
