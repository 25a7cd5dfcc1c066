//! # dctop — live container dashboard
//!
//! Starts the containers window on the current terminal, backed by the
//! synthetic sample runtime. All diagnostics go to a log file because
//! the dashboard owns the terminal for its whole lifetime.

use std::fs::File;
use std::path::{Path, PathBuf};
use std::sync::Arc;
use std::time::Duration;

use clap::Parser;
use crossterm::event::{Event, KeyCode, KeyEventKind, KeyModifiers};
use dctop_common::config::DctopConfig;
use dctop_runtime::sample::SampleRuntime;
use dctop_tui::containers::{ContainersWindow, WindowHandle};
use dctop_tui::notify::ViewMessage;
use dctop_tui::screen::{Screen, TerminalScreen};
use dctop_tui::window::Bounds;
use tracing::{debug, error, info, warn};
use tracing_subscriber::EnvFilter;

/// dctop — live terminal dashboard for containers.
#[derive(Parser, Debug)]
#[command(name = "dctop", version, about, long_about = None)]
struct Cli {
    /// Path to the configuration file.
    #[arg(long, default_value_os_t = dctop_common::constants::default_config_file())]
    config: PathBuf,

    /// Log file; overrides the configured path.
    #[arg(long)]
    log_file: Option<PathBuf>,

    /// Number of synthetic containers to seed; overrides the
    /// configured count.
    #[arg(long)]
    demo_containers: Option<usize>,

    /// Extra pacing between refresh cycles, in milliseconds. Zero polls
    /// continuously, gated only by the previous cycle's round trip.
    #[arg(long, default_value_t = 0)]
    refresh_ms: u64,
}

fn init_logging(path: &Path) -> anyhow::Result<()> {
    if let Some(parent) = path.parent() {
        std::fs::create_dir_all(parent)?;
    }
    let file = File::create(path)?;
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::from_default_env())
        .with_writer(Arc::new(file))
        .with_ansi(false)
        .init();
    Ok(())
}

/// Blocks on terminal input on a plain OS thread and translates events
/// into window messages. A detached thread rather than a blocking tokio
/// task: `event::read` has no cancellation point, and the runtime must
/// not wait for it at shutdown.
fn spawn_event_pump(handle: WindowHandle) {
    drop(std::thread::spawn(move || {
        loop {
            match crossterm::event::read() {
                Ok(Event::Key(key)) if key.kind == KeyEventKind::Press => {
                    let ctrl = key.modifiers.contains(KeyModifiers::CONTROL);
                    if ctrl && matches!(key.code, KeyCode::Char('c') | KeyCode::Char('q')) {
                        handle.stop();
                        break;
                    }
                    handle.key(key);
                }
                Ok(Event::Mouse(mouse)) => handle.mouse(mouse),
                Ok(Event::Resize(columns, rows)) => {
                    handle.resize(Bounds::from_screen(columns, rows));
                }
                Ok(_) => {}
                Err(err) => {
                    error!(error = %err, "terminal event read failed");
                    handle.stop();
                    break;
                }
            }
        }
    }));
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let cli = Cli::parse();
    let mut config = DctopConfig::load_or_default(&cli.config)?;
    if let Some(log_file) = cli.log_file {
        config.log_file = log_file;
    }
    if let Some(count) = cli.demo_containers {
        config.demo_containers = count;
    }
    init_logging(&config.log_file)?;
    info!(config = %cli.config.display(), containers = config.demo_containers, "starting dctop");

    let runtime = Arc::new(SampleRuntime::new(config.demo_containers));
    let screen = TerminalScreen::new()?;
    let (columns, rows) = screen.size();
    let (window, handle, mut view_messages) = ContainersWindow::new(
        runtime,
        Box::new(screen),
        Bounds::from_screen(columns, rows),
        (config.sort.primary, config.sort.secondary),
        Duration::from_millis(cli.refresh_ms),
    );

    spawn_event_pump(handle.clone());
    let window_task = tokio::spawn(window.run());

    // The channel closes when the window stops, which ends this loop.
    while let Some(message) = view_messages.recv().await {
        match message {
            ViewMessage::ShowLogs(id) => {
                warn!(id = %id, "logs view is not available in this build");
            }
            ViewMessage::ShowShell(id) => {
                warn!(id = %id, "shell view is not available in this build");
            }
            ViewMessage::SwitchToDefault => {
                debug!("already showing the default view");
            }
        }
    }

    handle.stopped().await;
    let _ = window_task.await;
    info!("dctop stopped");
    Ok(())
}
