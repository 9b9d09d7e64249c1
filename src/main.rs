//! rbac-dashboard binary entry point.
//!
//! Parses the command line, sets up file logging, seeds the store, initializes
//! the terminal in raw mode, runs the TUI event loop, and restores the terminal
//! state on exit.
//!
use anyhow::{Context, Result};
use clap::Parser;
use crossterm::event::{DisableMouseCapture, EnableMouseCapture};
use crossterm::execute;
use crossterm::terminal::{
    EnterAlternateScreen, LeaveAlternateScreen, disable_raw_mode, enable_raw_mode,
};
use ratatui::Terminal;
use ratatui::backend::CrosstermBackend;
use std::path::{Path, PathBuf};
use std::sync::{Arc, Mutex};
use tracing::{error, info};
use tracing_subscriber::EnvFilter;

use rbac_dashboard::app::{self, AppState, NoticeKind};
use rbac_dashboard::service::Services;
use rbac_dashboard::store::MemoryStore;

/// Terminal dashboard for users, roles and permissions.
#[derive(Parser, Debug)]
#[command(name = "rbac-dashboard", version, about)]
struct Cli {
    /// Directory holding theme.conf, keybinds.conf and filter.conf
    #[arg(long, env = "RBAC_DASHBOARD_CONFIG_DIR")]
    config_dir: Option<PathBuf>,

    /// Log file [default: <config-dir>/rbac-dashboard.log]
    #[arg(long)]
    log_file: Option<PathBuf>,

    /// Start with no users and no roles
    #[arg(long)]
    empty: bool,
}

/// Logs go to a file; the terminal belongs to the TUI.
fn init_logging(path: &Path) -> Result<()> {
    if let Some(dir) = path.parent().filter(|d| !d.as_os_str().is_empty()) {
        std::fs::create_dir_all(dir).with_context(|| format!("create log dir {}", dir.display()))?;
    }
    let file = std::fs::OpenOptions::new()
        .create(true)
        .append(true)
        .open(path)
        .with_context(|| format!("open log file {}", path.display()))?;
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")))
        .with_writer(Mutex::new(file))
        .with_ansi(false)
        .init();
    Ok(())
}

/// Initialize a Crossterm-backed `ratatui` terminal in raw mode.
fn init_terminal() -> Result<Terminal<CrosstermBackend<std::io::Stdout>>> {
    enable_raw_mode()?;
    let mut stdout = std::io::stdout();
    execute!(stdout, EnterAlternateScreen, EnableMouseCapture)?;
    let backend = CrosstermBackend::new(stdout);
    let terminal = Terminal::new(backend)?;
    Ok(terminal)
}

/// Program entry point: run the TUI and report any top-level error to stderr.
#[tokio::main(flavor = "current_thread")]
async fn main() -> Result<()> {
    let cli = Cli::parse();
    let config_dir = cli.config_dir.unwrap_or_else(app::default_config_dir);
    let log_file = cli.log_file.unwrap_or_else(|| config_dir.join("rbac-dashboard.log"));
    init_logging(&log_file)?;

    let store = if cli.empty { MemoryStore::new() } else { MemoryStore::seeded() };
    let services = Services::in_memory(Arc::new(store));
    let mut state = AppState::with_config(services, &config_dir);
    if let Err(e) = state.refresh().await {
        error!(error = %e, "initial fetch failed");
        state.notify(NoticeKind::Error, "Unable to fetch users");
    }
    info!(config_dir = %config_dir.display(), seeded = !cli.empty, "starting rbac-dashboard");

    let mut terminal = init_terminal().context("init terminal")?;

    let res = app::run(&mut terminal, state).await;

    disable_raw_mode().ok();
    execute!(
        terminal.backend_mut(),
        LeaveAlternateScreen,
        DisableMouseCapture
    )
    .ok();
    terminal.show_cursor().ok();

    if let Err(err) = res {
        error!(error = %err, "application error");
        eprintln!("application error: {err:#}");
    }
    Ok(())
}
