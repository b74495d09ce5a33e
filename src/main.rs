#![allow(clippy::missing_errors_doc)] // Internal functions don't need # Errors docs
#![allow(clippy::module_name_repetitions)] // e.g., ToastlineConfig in config module is fine
#![allow(clippy::doc_markdown)] // Don't require backticks around HX-Trigger, JSON, etc.
#![allow(clippy::cast_possible_truncation)] // Color blending and millis are bounded
#![allow(clippy::cast_sign_loss)] // Clamped before casting

//! Toastline - terminal page for URL-shortener events
//!
//! A single Rust binary that provides both:
//! - Page mode: renders the page and shows a self-dismissing toast for every
//!   `urlAdded` event it receives
//! - Dispatch mode: sends a custom event (or a raw HX-Trigger header) to the
//!   running page over its Unix socket
//!
//! Usage:
//!   toastline                                  # Run the page (default)
//!   toastline dispatch urlAdded                # Announce a shortened URL
//!   toastline dispatch --hx-trigger 'urlAdded' # Forward a server header

mod app;
mod cli;
mod config;
mod dom;
mod errors;
mod event;
mod toast;
mod tui;
mod ui;

use app::App;
use clap::Parser;
use cli::{Cli, Commands};
use color_eyre::eyre::WrapErr;
use color_eyre::Result;
use event::{CustomEvent, EventMessage};
use std::path::{Path, PathBuf};
use tokio::sync::mpsc;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

/// Get the log directory path
fn get_log_dir() -> PathBuf {
    directories::BaseDirs::new().map_or_else(
        || PathBuf::from("/tmp/toastline/logs"),
        |dirs| dirs.cache_dir().join("toastline").join("logs"),
    )
}

/// Send events to a running page
///
/// Silently succeeds when no page is listening, so it can be wired into
/// form-submission hooks without failing them.
async fn handle_dispatch(
    socket_path: &Path,
    event_name: Option<String>,
    detail: Option<String>,
    hx_trigger: Option<String>,
) -> Result<()> {
    let events = match (event_name, hx_trigger) {
        (_, Some(header)) => event::parse_hx_trigger(&header)?,
        (Some(name), None) => {
            let mut custom = CustomEvent::new(name);
            if let Some(detail) = detail {
                let value: serde_json::Value = serde_json::from_str(&detail)
                    .map_err(|e| color_eyre::eyre::eyre!("--detail is not valid JSON: {}", e))?;
                custom = custom.with_detail(value);
            }
            vec![custom]
        }
        (None, None) => return Err(color_eyre::eyre::eyre!("No event to dispatch")),
    };

    for custom in &events {
        let message = EventMessage::new(custom);
        message
            .validate()
            .wrap_err_with(|| format!("Cannot dispatch '{}'", message.event))?;

        if !event::socket::send(socket_path, &message).await? {
            tracing::debug!("No page listening, dropping '{}'", message.event);
            return Ok(());
        }
    }

    Ok(())
}

#[tokio::main(flavor = "current_thread")]
async fn main() -> Result<()> {
    let cli = Cli::parse();

    match cli.command {
        Some(Commands::Dispatch {
            event,
            detail,
            hx_trigger,
        }) => {
            return handle_dispatch(&cli.socket, event, detail, hx_trigger).await;
        }
        Some(Commands::Config) => {
            print!("{}", config::ToastlineConfig::example());
            return Ok(());
        }
        Some(Commands::Completions { shell }) => {
            cli::print_completions(shell);
            return Ok(());
        }
        None => {
            // Page mode: continue with full setup
        }
    }

    color_eyre::install()?;

    // Setup file logging with rotation (stderr belongs to the terminal UI)
    let log_dir = get_log_dir();
    std::fs::create_dir_all(&log_dir)?;

    let file_appender = tracing_appender::rolling::daily(&log_dir, "toastline.log");
    let (non_blocking, _guard) = tracing_appender::non_blocking(file_appender);

    let log_filter = format!("toastline={}", cli.log_level);
    tracing_subscriber::registry()
        .with(tracing_subscriber::EnvFilter::new(&log_filter))
        .with(
            tracing_subscriber::fmt::layer()
                .with_target(true)
                .with_ansi(false)
                .with_writer(non_blocking),
        )
        .init();

    tracing::info!("Starting toastline v{}", env!("CARGO_PKG_VERSION"));
    tracing::info!("Log directory: {:?}", log_dir);
    tracing::debug!("Socket path: {:?}", cli.socket);

    let mut config = config::ToastlineConfig::load();
    if let Some(rate) = cli.tick_rate.filter(|r| r.is_finite() && *r > 0.0) {
        config.ui.tick_rate = rate;
    }
    if let Some(rate) = cli.frame_rate.filter(|r| r.is_finite() && *r > 0.0) {
        config.ui.frame_rate = rate;
    }

    let (event_tx, event_rx) = mpsc::channel(100);

    let socket_path = cli.socket.clone();
    let socket_tx = event_tx.clone();
    let socket_handle = tokio::spawn(async move {
        if let Err(e) = event::socket::listen(socket_tx, &socket_path).await {
            tracing::error!("Socket listener error: {}", e);
        }
    });

    let result = run_page(event_tx, event_rx, &config, cli.socket.clone(), cli.debug).await;

    socket_handle.abort();

    if cli.socket.exists() {
        let _ = std::fs::remove_file(&cli.socket);
    }

    result
}

async fn run_page(
    event_tx: mpsc::Sender<event::Event>,
    mut event_rx: mpsc::Receiver<event::Event>,
    config: &config::ToastlineConfig,
    socket: PathBuf,
    debug_mode: bool,
) -> Result<()> {
    use std::time::{Duration, Instant};
    use tokio_util::sync::CancellationToken;

    let tick_duration = Duration::from_secs_f64(1.0 / config.ui.tick_rate);
    let frame_duration = Duration::from_secs_f64(1.0 / config.ui.frame_rate);

    tracing::info!(
        "Page starting: {:.1} FPS, {:.1} ticks/sec",
        config.ui.frame_rate,
        config.ui.tick_rate
    );

    let mut terminal = tui::init()?;

    // RAII guard ensures terminal is restored on panic or early return
    let _guard = tui::TerminalGuard;

    let mut app = App::new(config, socket, debug_mode);

    // The page structure is on screen before anything may decorate it
    terminal.draw(|f| ui::render(f, &app))?;
    app.rendered();
    app.page_loaded();

    let cancel = CancellationToken::new();
    let input_tx = event_tx.clone();
    let input_cancel = cancel.clone();
    let input_handle = tokio::spawn(async move {
        event::input::listen(input_tx, input_cancel).await;
    });

    let mut last_frame = Instant::now();

    loop {
        let now = Instant::now();
        if app.needs_render && now.duration_since(last_frame) >= frame_duration {
            terminal.draw(|f| ui::render(f, &app))?;
            app.rendered();
            last_frame = now;
        }

        tokio::select! {
            Some(event) = event_rx.recv() => {
                app.handle_event(event);
            }
            () = tokio::time::sleep(tick_duration) => {
                app.tick();
            }
        }

        if app.should_quit {
            break;
        }
    }

    tracing::debug!("Shutting down page");
    app.shutdown();
    cancel.cancel();
    input_handle.abort();

    tui::restore()?;
    terminal.show_cursor()?;

    Ok(())
}
