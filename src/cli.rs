//! CLI argument parsing
//!
//! Uses clap for argument parsing with derive macros.

use clap::{CommandFactory, Parser, Subcommand};
use clap_complete::{generate, Shell};
use std::io;
use std::path::PathBuf;

/// Get default socket path, preferring XDG_RUNTIME_DIR on Linux
fn default_socket_path() -> PathBuf {
    if let Ok(runtime_dir) = std::env::var("XDG_RUNTIME_DIR") {
        return PathBuf::from(runtime_dir).join("toastline.sock");
    }
    PathBuf::from("/tmp/toastline.sock")
}

/// Terminal page that acknowledges URL-shortener events with self-dismissing toasts
#[derive(Parser, Debug)]
#[command(name = "toastline")]
#[command(author, version, about, long_about = None)]
#[command(propagate_version = true)]
pub struct Cli {
    #[command(subcommand)]
    pub command: Option<Commands>,

    /// Socket the page listens on (default: $XDG_RUNTIME_DIR/toastline.sock or /tmp/toastline.sock)
    #[arg(
        short,
        long,
        env = "TOASTLINE_SOCKET",
        default_value_os_t = default_socket_path(),
        global = true
    )]
    pub socket: PathBuf,

    /// Log level (trace, debug, info, warn, error)
    #[arg(short, long, env = "RUST_LOG", default_value = "info", global = true)]
    pub log_level: String,

    /// Show the dispatched event log
    #[arg(short, long, default_value_t = false, global = true)]
    pub debug: bool,

    /// Tick rate in ticks per second (overrides config)
    #[arg(short = 't', long, global = true)]
    pub tick_rate: Option<f64>,

    /// Frame rate in frames per second (overrides config)
    #[arg(short = 'F', long, global = true)]
    pub frame_rate: Option<f64>,
}

#[derive(Subcommand, Debug)]
pub enum Commands {
    /// Dispatch a custom event on a running page
    ///
    /// Either name the event directly or pass the raw HX-Trigger header the
    /// server responded with.
    Dispatch {
        /// Event name (e.g. urlAdded)
        #[arg(required_unless_present = "hx_trigger", conflicts_with = "hx_trigger")]
        event: Option<String>,

        /// JSON payload attached as the event detail
        #[arg(long, requires = "event")]
        detail: Option<String>,

        /// HX-Trigger header value: `urlAdded` or `{"urlAdded": {...}}`
        #[arg(long)]
        hx_trigger: Option<String>,
    },

    /// Print an example configuration file
    Config,

    /// Generate shell completions
    Completions {
        /// Shell to generate completions for
        #[arg(value_enum)]
        shell: Shell,
    },
}

/// Generate shell completions and print to stdout
pub fn print_completions(shell: Shell) {
    let mut cmd = Cli::command();
    generate(shell, &mut cmd, "toastline", &mut io::stdout());
}
